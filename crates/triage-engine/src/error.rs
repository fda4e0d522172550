//! Engine error type.

use crate::config::ConfigError;
use crate::phase::IllegalTransition;
use crate::types::AnalysisId;
use triage_backend::BackendError;
use triage_plan::{ActionId, PlanError};

/// Why an analysis (or an engine operation) failed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The backend failed after every allowed retry.
    #[error("investigation failed: {0}")]
    Backend(#[from] BackendError),

    /// A backend call outran the phase timeout.
    #[error("investigation timed out after {duration_secs}s")]
    Timeout {
        /// Configured bound that was hit.
        duration_secs: u64,
    },

    /// The recommended plan failed validation.
    #[error("rejected remediation plan: {0}")]
    Plan(#[from] PlanError),

    /// The selected action names no recommendation in the report.
    #[error("selected action {action} is not in the recommendation list")]
    SelectedUnknown {
        /// The dangling identifier.
        action: ActionId,
    },

    /// A phase movement the state machine forbids.
    #[error(transparent)]
    Phase(#[from] IllegalTransition),

    /// Status lookup for an identifier the registry has never seen.
    #[error("unknown analysis: {id}")]
    UnknownAnalysis {
        /// The unrecognized identifier.
        id: AnalysisId,
    },

    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Whether retrying the analysis may succeed.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Backend(e) => e.is_retryable(),
            EngineError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Whether the failure needs a human rather than a retry.
    ///
    /// A rejected plan or a dangling selection is a contract violation
    /// by the backend; retrying the same investigation will not fix it.
    #[inline]
    #[must_use]
    pub fn requires_human(&self) -> bool {
        matches!(
            self,
            EngineError::Plan(_) | EngineError::SelectedUnknown { .. }
        )
    }
}
