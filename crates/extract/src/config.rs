//! Configuration for HTML feature extraction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Browser-like user agent sent with stylesheet requests. Some CDNs refuse
/// requests that do not look like they come from a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// Settings for the extraction stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractConfig {
    /// Configuration schema version.
    pub version: u32,
    /// Whether `<link rel="stylesheet">` targets are fetched over HTTP.
    ///
    /// When `false` only inline styles contribute to the style text and no
    /// network access happens.
    pub fetch_external_styles: bool,
    /// Per-request timeout for stylesheet fetches, in seconds.
    pub fetch_timeout_secs: u64,
    /// `User-Agent` header sent with stylesheet requests.
    pub user_agent: String,
}

impl ExtractConfig {
    /// Create a new configuration with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable fetching of external stylesheets.
    pub fn with_fetch_external_styles(mut self, enabled: bool) -> Self {
        self.fetch_external_styles = enabled;
        self
    }

    /// Set the per-request fetch timeout in seconds.
    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    /// Set the user agent used for stylesheet requests.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.version < 1 {
            return Err(ExtractError::InvalidConfig(format!(
                "version must be >= 1 (got {})",
                self.version
            )));
        }
        if self.fetch_external_styles && self.fetch_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "fetch_timeout_secs must be >= 1 when fetching is enabled".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "user_agent must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            version: 1,
            fetch_external_styles: true,
            fetch_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
