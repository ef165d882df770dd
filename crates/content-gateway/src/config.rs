//! Gateway endpoint configuration.

use crate::GatewayResult;
use url::Url;

/// Resolved endpoint configuration for the remote gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    base_url: String,
    anon_key: String,
}

impl GatewayConfig {
    /// Create a new gateway configuration.
    ///
    /// # Arguments
    /// * `base_url` - The project API URL (e.g., `https://xyz.supabase.co`)
    /// * `anon_key` - The publishable (anonymous) API key
    pub fn new(base_url: impl AsRef<str>, anon_key: impl Into<String>) -> GatewayResult<Self> {
        let trimmed = base_url.as_ref().trim_end_matches('/');
        Url::parse(trimmed)?;
        Ok(Self {
            base_url: trimmed.to_string(),
            anon_key: anon_key.into(),
        })
    }

    /// Build from the client configuration.
    ///
    /// Returns `None` when the endpoint or key is absent; callers keep the
    /// `None` and fail fast per operation.
    pub fn from_config(config: &client_core::Config) -> GatewayResult<Option<Self>> {
        match config.gateway_credentials() {
            Some((url, key)) => Ok(Some(Self::new(url, key)?)),
            None => Ok(None),
        }
    }

    /// The publishable API key.
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Build the REST API URL for a table.
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Build an auth endpoint URL.
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Build the storage URL for an object.
    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    /// Build the public (unauthenticated) URL for an object.
    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}
