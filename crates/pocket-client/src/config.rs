//! Configuration for the backend client.
//!
//! Resolution order, lowest to highest precedence:
//!
//! 1. [`ClientConfig::default`]
//! 2. `~/.pocket/client.yaml` (or an explicit `--config` path)
//! 3. `POCKET_BASE_URL` environment variable
//! 4. `--base-url` on the command line (applied by the binary)

use std::path::{Path, PathBuf};

use pocket_core::{PocketError, pocket_home};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "POCKET_BASE_URL";

/// Greeting seeded as the first transcript entry.
pub const DEFAULT_GREETING: &str = "Hello! I am Pocket AI. How can I help you today?";

/// Backend client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the Pocket AI HTTP API (no trailing slash needed)
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Assistant greeting shown when a session starts
    pub greeting: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl ClientConfig {
    /// Path of the default config file, `~/.pocket/client.yaml`.
    pub fn default_path() -> pocket_core::Result<PathBuf> {
        Ok(pocket_home()?.join("client.yaml"))
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> pocket_core::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no client config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PocketError::io("reading client config", path, e))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| PocketError::config_invalid(path, e.to_string()))?;
        config.validate()?;

        debug!(path = %path.display(), base_url = %config.base_url, "loaded client config");
        Ok(config)
    }

    /// Load the default file, then apply environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> pocket_core::Result<Self> {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        let mut config = Self::load_from(&path)?;

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values no request could be built from.
    pub fn validate(&self) -> pocket_core::Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PocketError::config_validation(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(PocketError::config_validation("timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set custom request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set custom greeting.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Base URL without trailing slashes, ready for path joining.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
