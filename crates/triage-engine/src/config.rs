//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use triage_policy::ApprovalPolicy;

/// Tunables for the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Retries after the first failed backend call.
    pub backend_retries: u32,
    /// Base backoff between retries, multiplied by the attempt number.
    pub retry_backoff_ms: u64,
    /// Upper bound for a single backend call.
    pub phase_timeout_secs: u64,
    /// Approval policy evaluated in the Analyzing phase.
    pub policy: ApprovalPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend_retries: 2,
            retry_backoff_ms: 500,
            phase_timeout_secs: 60,
            policy: ApprovalPolicy::default(),
        }
    }
}

/// Configuration file problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The payload did not describe a configuration.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    /// Create the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the approval policy.
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cap backend retries.
    #[inline]
    #[must_use]
    pub fn with_backend_retries(mut self, retries: u32) -> Self {
        self.backend_retries = retries;
        self
    }

    /// Parse a configuration from TOML.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Parse`] when it is not valid TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Backoff before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms * u64::from(attempt))
    }

    /// Per-call timeout as a [`Duration`].
    #[must_use]
    pub fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.phase_timeout_secs)
    }
}
