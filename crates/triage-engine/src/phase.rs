//! Phase state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisPhase {
    /// Admitted, not yet sent to the backend.
    Pending,
    /// Waiting on the investigation backend.
    Investigating,
    /// Validating the plan and evaluating approval.
    Analyzing,
    /// Terminal: remediation selected and approval decided.
    Completed,
    /// Terminal: the analysis could not finish.
    Failed,
}

impl AnalysisPhase {
    /// Whether no further transition is possible.
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisPhase::Completed | AnalysisPhase::Failed)
    }

    /// Compact numeric form used by the audit hash.
    #[must_use]
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            AnalysisPhase::Pending => 0,
            AnalysisPhase::Investigating => 1,
            AnalysisPhase::Analyzing => 2,
            AnalysisPhase::Completed => 3,
            AnalysisPhase::Failed => 4,
        }
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Rejected phase movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal phase transition: {from} -> {to}")]
pub struct IllegalTransition {
    /// Current phase.
    pub from: AnalysisPhase,
    /// Requested phase.
    pub to: AnalysisPhase,
}

/// Phases reachable from `from` in one step.
#[must_use]
pub fn allowed_transitions(from: AnalysisPhase) -> Vec<AnalysisPhase> {
    use AnalysisPhase::{Analyzing, Completed, Failed, Investigating, Pending};
    match from {
        Pending => vec![Investigating, Failed],
        Investigating => vec![Analyzing, Failed],
        Analyzing => vec![Completed, Failed],
        Completed | Failed => vec![],
    }
}

/// Validate a single phase movement.
///
/// # Errors
/// [`IllegalTransition`] when `to` is not reachable from `from`.
pub fn validate_transition(
    from: AnalysisPhase,
    to: AnalysisPhase,
) -> Result<(), IllegalTransition> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(IllegalTransition { from, to })
    }
}
