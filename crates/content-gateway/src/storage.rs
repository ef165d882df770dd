//! Blob upload to the gateway's object storage.

use crate::http::expect_success;
use crate::{GatewayResult, RestGateway};
use tracing::{debug, info};
use uuid::Uuid;

/// Bucket holding post and comment images.
pub const IMAGE_BUCKET: &str = "blog-images";

/// Logical folder an uploaded image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    Posts,
    Comments,
}

impl ImageFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFolder::Posts => "posts",
            ImageFolder::Comments => "comments",
        }
    }
}

/// A stored blob and its durable public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub path: String,
    pub public_url: String,
}

/// Object key for a new upload, unique per call so uploads never collide.
fn object_path(owner_id: &str, folder: ImageFolder, file_name: &str) -> String {
    let ext = file_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty() && *ext != file_name)
        .unwrap_or("png");
    format!("{}/{}/{}.{}", owner_id, folder.as_str(), Uuid::new_v4(), ext)
}

impl RestGateway {
    /// Upload an image and resolve its public URL.
    ///
    /// Insert-only: `x-upsert: false` makes the storage service reject a
    /// write to an existing object key.
    pub async fn upload_image(
        &self,
        owner_id: &str,
        folder: ImageFolder,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
        access_token: &str,
    ) -> GatewayResult<UploadedImage> {
        let config = self.config()?;
        let path = object_path(owner_id, folder, file_name);
        let url = config.object_url(IMAGE_BUCKET, &path);

        debug!(path = %path, size = bytes.len(), "Uploading image");

        let mut request = self
            .http_client()
            .post(&url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("cache-control", "3600")
            .header("x-upsert", "false")
            .body(bytes);
        if let Some(content_type) = content_type {
            request = request.header("Content-Type", content_type);
        }

        let response = request.send().await?;
        expect_success(response, "Failed to upload image").await?;

        let public_url = config.public_object_url(IMAGE_BUCKET, &path);
        info!(path = %path, "Image uploaded");
        Ok(UploadedImage { path, public_url })
    }
}
