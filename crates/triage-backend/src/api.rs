//! The backend seam.

use crate::error::BackendError;
use crate::types::{InvestigationReport, InvestigationRequest};

/// An AI service that investigates a signal and recommends remediation.
///
/// Implementations must be safe to call concurrently; the engine may run
/// several analyses at once against one shared backend.
#[async_trait::async_trait]
pub trait InvestigationBackend: Send + Sync {
    /// Investigate one signal and return the recommended remediation.
    async fn investigate(
        &self,
        request: &InvestigationRequest,
    ) -> Result<InvestigationReport, BackendError>;

    /// Short label for logs, e.g. `"http"` or `"scripted"`.
    fn name(&self) -> &str;
}
