//! Backend failure classification.

/// Why an investigation call failed.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated by the caller if oversized.
        message: String,
    },

    /// The response body was not a valid investigation report.
    #[error("undecodable investigation report: {0}")]
    Decode(#[source] serde_json::Error),

    /// The scripted backend ran out of queued outcomes.
    #[error("no investigation outcome queued")]
    Exhausted,
}

impl BackendError {
    /// Whether retrying the same call may succeed.
    ///
    /// Transport failures and server-side errors are worth retrying;
    /// client errors and undecodable bodies are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Transport(_) => true,
            BackendError::Api { status, .. } => *status >= 500 || *status == 429,
            BackendError::Decode(_) | BackendError::Exhausted => false,
        }
    }
}
