//! REST implementation of the content gateway.
//!
//! Queries follow the row store's URL grammar: equality filters as
//! `?column=eq.value` query parameters, ordering via `order=`, pagination via
//! `Range` headers with `Prefer: count=exact` for the total.

use crate::http::expect_success;
use crate::{
    CommentChanges, CommentRecord, ContentGateway, GatewayConfig, GatewayError, GatewayResult,
    NewComment, NewPost, PostChanges, PostPage, PostRecord,
};
use async_trait::async_trait;
use tracing::debug;

/// Column list fetched for post rows.
const POST_COLUMNS: &str = "id,user_id,username,title,content,image_url,created_at,updated_at";

/// Column list fetched for comment rows.
const COMMENT_COLUMNS: &str = "id,post_id,user_id,username,content,image_url,created_at";

/// REST client for the content tables and blob storage.
#[derive(Clone)]
pub struct RestGateway {
    http_client: reqwest::Client,
    config: Option<GatewayConfig>,
}

impl RestGateway {
    /// Create a new gateway over an optional endpoint configuration.
    ///
    /// With `None`, every operation fails fast with
    /// [`GatewayError::NotConfigured`] before touching the network.
    pub fn new(config: Option<GatewayConfig>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }

    /// Build a gateway straight from the client configuration.
    pub fn from_config(config: &client_core::Config) -> GatewayResult<Self> {
        Ok(Self::new(GatewayConfig::from_config(config)?))
    }

    /// Whether an endpoint configuration is present.
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub(crate) fn config(&self) -> GatewayResult<&GatewayConfig> {
        self.config.as_ref().ok_or(GatewayError::NotConfigured)
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// GET with anonymous credentials.
    fn read(&self, config: &GatewayConfig, url: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {}", config.anon_key()))
            .header("Accept", "application/json")
    }

    fn first_row<T>(rows: Vec<T>) -> GatewayResult<T> {
        rows.into_iter().next().ok_or(GatewayError::NotFound)
    }
}

/// Parse the total row count out of a `Content-Range` value (`0-4/12`,
/// `*/0`). A `*` total means the remote could not count; treat as zero.
fn parse_content_range_total(value: &str) -> GatewayResult<u64> {
    let (_, total) = value
        .rsplit_once('/')
        .ok_or_else(|| GatewayError::Malformed(format!("content-range `{value}`")))?;
    if total == "*" {
        return Ok(0);
    }
    total
        .parse::<u64>()
        .map_err(|_| GatewayError::Malformed(format!("content-range total `{total}`")))
}

#[async_trait]
impl ContentGateway for RestGateway {
    async fn list_posts(&self, from: u64, to: u64) -> GatewayResult<PostPage> {
        let config = self.config()?;
        let url = format!(
            "{}?select={}&order=created_at.desc",
            config.rest_url("posts"),
            POST_COLUMNS
        );

        debug!(from, to, "Listing posts");

        let response = self
            .read(config, &url)
            .header("Range-Unit", "items")
            .header("Range", format!("{from}-{to}"))
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = expect_success(response, "Failed to list posts").await?;

        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Malformed("missing content-range header".to_string()))?;
        let total = parse_content_range_total(&content_range)?;

        let items: Vec<PostRecord> = response.json().await?;
        debug!(count = items.len(), total, "Fetched post page");
        Ok(PostPage { items, total })
    }

    async fn fetch_post(&self, id: &str) -> GatewayResult<PostRecord> {
        let config = self.config()?;
        let url = format!(
            "{}?id=eq.{}&select={}&limit=1",
            config.rest_url("posts"),
            id,
            POST_COLUMNS
        );

        debug!(post_id = %id, "Fetching post");

        let response = self.read(config, &url).send().await?;
        let response = expect_success(response, "Failed to fetch post").await?;
        let rows: Vec<PostRecord> = response.json().await?;
        Self::first_row(rows)
    }

    async fn insert_post(&self, draft: NewPost, access_token: &str) -> GatewayResult<PostRecord> {
        let config = self.config()?;
        let url = format!("{}?select={}", config.rest_url("posts"), POST_COLUMNS);

        debug!(author_id = %draft.author_id, "Inserting post");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&draft)
            .send()
            .await?;
        let response = expect_success(response, "Failed to insert post").await?;
        let rows: Vec<PostRecord> = response.json().await?;
        Self::first_row(rows)
    }

    async fn update_post(
        &self,
        id: &str,
        owner_id: &str,
        changes: PostChanges,
        access_token: &str,
    ) -> GatewayResult<PostRecord> {
        let config = self.config()?;
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}&select={}",
            config.rest_url("posts"),
            id,
            owner_id,
            POST_COLUMNS
        );

        debug!(post_id = %id, "Updating post");

        let response = self
            .http_client
            .patch(&url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&changes.payload())
            .send()
            .await?;
        let response = expect_success(response, "Failed to update post").await?;
        // Zero matched rows means the id does not exist or belongs to
        // somebody else; the owner predicate never errors, it just matches
        // nothing.
        let rows: Vec<PostRecord> = response.json().await?;
        Self::first_row(rows)
    }

    async fn delete_post(
        &self,
        id: &str,
        owner_id: &str,
        access_token: &str,
    ) -> GatewayResult<()> {
        let config = self.config()?;
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}",
            config.rest_url("posts"),
            id,
            owner_id
        );

        debug!(post_id = %id, "Deleting post");

        let response = self
            .http_client
            .delete(&url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        expect_success(response, "Failed to delete post").await?;
        Ok(())
    }

    async fn list_comments(&self, post_id: &str) -> GatewayResult<Vec<CommentRecord>> {
        let config = self.config()?;
        let url = format!(
            "{}?post_id=eq.{}&select={}&order=created_at.asc",
            config.rest_url("comments"),
            post_id,
            COMMENT_COLUMNS
        );

        debug!(post_id = %post_id, "Listing comments");

        let response = self.read(config, &url).send().await?;
        let response = expect_success(response, "Failed to list comments").await?;
        let comments: Vec<CommentRecord> = response.json().await?;
        debug!(post_id = %post_id, count = comments.len(), "Fetched comments");
        Ok(comments)
    }

    async fn insert_comment(
        &self,
        draft: NewComment,
        access_token: &str,
    ) -> GatewayResult<CommentRecord> {
        let config = self.config()?;
        let url = format!("{}?select={}", config.rest_url("comments"), COMMENT_COLUMNS);

        debug!(post_id = %draft.post_id, "Inserting comment");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&draft)
            .send()
            .await?;
        let response = expect_success(response, "Failed to insert comment").await?;
        let rows: Vec<CommentRecord> = response.json().await?;
        Self::first_row(rows)
    }

    async fn update_comment(
        &self,
        id: &str,
        owner_id: &str,
        changes: CommentChanges,
        access_token: &str,
    ) -> GatewayResult<CommentRecord> {
        let config = self.config()?;
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}&select={}",
            config.rest_url("comments"),
            id,
            owner_id,
            COMMENT_COLUMNS
        );

        debug!(comment_id = %id, "Updating comment");

        let response = self
            .http_client
            .patch(&url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&changes.payload())
            .send()
            .await?;
        let response = expect_success(response, "Failed to update comment").await?;
        let rows: Vec<CommentRecord> = response.json().await?;
        Self::first_row(rows)
    }

    async fn delete_comment(
        &self,
        id: &str,
        owner_id: &str,
        access_token: &str,
    ) -> GatewayResult<()> {
        let config = self.config()?;
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}",
            config.rest_url("comments"),
            id,
            owner_id
        );

        debug!(comment_id = %id, "Deleting comment");

        let response = self
            .http_client
            .delete(&url)
            .header("apikey", config.anon_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        expect_success(response, "Failed to delete comment").await?;
        Ok(())
    }
}
