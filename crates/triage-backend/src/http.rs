//! HTTP implementation of the backend seam.

use crate::api::InvestigationBackend;
use crate::error::BackendError;
use crate::types::{InvestigationReport, InvestigationRequest};
use std::time::Duration;
use tracing::debug;

const INVESTIGATE_PATH: &str = "/api/v1/investigate";

/// Longest error body kept verbatim in a [`BackendError::Api`].
const MAX_ERROR_BODY: usize = 2048;

/// JSON-over-HTTP client for the investigation service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    /// Create a client against `base_url` with a 60 second call timeout.
    ///
    /// # Errors
    /// Returns the underlying builder error when the TLS stack cannot be
    /// initialized.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, Duration::from_secs(60))
    }

    /// Create a client with an explicit per-call timeout.
    ///
    /// # Errors
    /// Returns the underlying builder error when the TLS stack cannot be
    /// initialized.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Attach a bearer token sent on every call.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn investigate_url(&self) -> String {
        format!("{}{INVESTIGATE_PATH}", self.base_url)
    }
}

#[async_trait::async_trait]
impl InvestigationBackend for HttpBackend {
    async fn investigate(
        &self,
        request: &InvestigationRequest,
    ) -> Result<InvestigationReport, BackendError> {
        let url = self.investigate_url();
        debug!(analysis_id = %request.analysis_id, %url, "posting investigation request");

        let mut call = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().await?;
        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(MAX_ERROR_BODY);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(BackendError::Decode)
    }

    fn name(&self) -> &str {
        "http"
    }
}
