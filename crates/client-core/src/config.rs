//! Configuration for the Driftline client.

use serde::{Deserialize, Serialize};

/// Default gateway URL (can be set at compile time via the DRIFTLINE_SUPABASE_URL env var).
pub const DEFAULT_GATEWAY_URL: Option<&str> = option_env!("DRIFTLINE_SUPABASE_URL");

/// Default gateway publishable key (compile time via DRIFTLINE_SUPABASE_ANON_KEY).
pub const DEFAULT_GATEWAY_ANON_KEY: Option<&str> = option_env!("DRIFTLINE_SUPABASE_ANON_KEY");

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Gateway project URL.
    #[serde(default)]
    pub gateway_url: Option<String>,
    /// Gateway publishable API key (public, safe to expose).
    #[serde(default)]
    pub gateway_anon_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.map(|s| s.to_string()),
            gateway_anon_key: DEFAULT_GATEWAY_ANON_KEY.map(|s| s.to_string()),
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("DRIFTLINE_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(url) = std::env::var("DRIFTLINE_SUPABASE_URL") {
            self.gateway_url = Some(url);
        }
        if let Ok(key) = std::env::var("DRIFTLINE_SUPABASE_ANON_KEY") {
            self.gateway_anon_key = Some(key);
        }
    }

    /// Whether the remote gateway endpoint and key are both set.
    ///
    /// When false, every gateway-backed operation fails fast with a
    /// configuration error instead of attempting a network call.
    pub fn is_gateway_configured(&self) -> bool {
        self.gateway_credentials().is_some()
    }

    /// The gateway URL and key together, when both are present and non-empty.
    pub fn gateway_credentials(&self) -> Option<(&str, &str)> {
        let url = self.gateway_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self
            .gateway_anon_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())?;
        Some((url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_configured_when_both_present() {
        let config = Config {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            gateway_url: Some("https://test.supabase.co".to_string()),
            gateway_anon_key: Some("anon-key".to_string()),
        };
        assert!(config.is_gateway_configured());
        assert_eq!(
            config.gateway_credentials(),
            Some(("https://test.supabase.co", "anon-key"))
        );
    }

    #[test]
    fn test_unconfigured_when_key_missing() {
        let config = Config {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            gateway_url: Some("https://test.supabase.co".to_string()),
            gateway_anon_key: None,
        };
        assert!(!config.is_gateway_configured());
        assert!(config.gateway_credentials().is_none());
    }

    #[test]
    fn test_blank_values_count_as_unconfigured() {
        let config = Config {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            gateway_url: Some("   ".to_string()),
            gateway_anon_key: Some("anon-key".to_string()),
        };
        assert!(!config.is_gateway_configured());
    }
}
