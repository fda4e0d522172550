//! Engine-facing request and status types.

use crate::phase::AnalysisPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_backend::{EnrichmentContext, RecoveryContext, SignalSummary, TargetResource};
use triage_plan::ActionId;
use triage_policy::ApprovalDecision;
use ulid::Ulid;

/// Unique analysis identifier (ULID for sortability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnalysisId(pub Ulid);

impl AnalysisId {
    /// Generate a new identifier.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One analysis to run: the signal, its target, and whatever the
/// upstream producer supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The object under analysis.
    pub target: TargetResource,
    /// The triggering signal.
    pub signal: SignalSummary,
    /// Upstream enrichment, possibly empty.
    #[serde(default)]
    pub context: EnrichmentContext,
    /// Recovery counters for retried signals.
    #[serde(default)]
    pub recovery: RecoveryContext,
}

/// Recovery posture derived from the request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// First analysis of the signal.
    NotRecovering,
    /// A retry with attempts left.
    InProgress {
        /// Current attempt number, starting at 1.
        attempt: u32,
    },
    /// The attempt ceiling was reached.
    Exhausted,
}

impl RecoveryStatus {
    /// Map the request's counters onto a posture.
    #[must_use]
    pub fn from_context(recovery: &RecoveryContext) -> Self {
        if !recovery.is_recovery() {
            RecoveryStatus::NotRecovering
        } else if recovery.is_exhausted() {
            RecoveryStatus::Exhausted
        } else {
            RecoveryStatus::InProgress {
                attempt: recovery.attempt,
            }
        }
    }
}

/// Observable state of one analysis.
///
/// Optional fields stay unset until the phase that establishes them has
/// run; a backend that omits an optional field leaves it unset rather
/// than failing the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStatus {
    /// Identifier assigned at admission.
    pub id: AnalysisId,
    /// Current phase.
    pub phase: AnalysisPhase,
    /// Investigation summary, once available.
    #[serde(default)]
    pub summary: Option<String>,
    /// Root cause, when the backend isolated one.
    #[serde(default)]
    pub root_cause: Option<String>,
    /// The action picked as the remediation entry point.
    #[serde(default)]
    pub selected_action: Option<ActionId>,
    /// Overall backend confidence.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Approval decision, once policy evaluation has run.
    #[serde(default)]
    pub approval: Option<ApprovalDecision>,
    /// Parallel batches of the validated plan.
    #[serde(default)]
    pub execution_waves: Option<Vec<Vec<ActionId>>>,
    /// Recovery posture of the request.
    pub recovery: RecoveryStatus,
    /// Terminal failure description, set only in `Failed`.
    #[serde(default)]
    pub failure: Option<String>,
    /// When the analysis was admitted.
    pub started_at: DateTime<Utc>,
    /// When a terminal phase was reached.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisStatus {
    /// Fresh status for a newly admitted request.
    #[must_use]
    pub fn admitted(id: AnalysisId, recovery: RecoveryStatus) -> Self {
        Self {
            id,
            phase: AnalysisPhase::Pending,
            summary: None,
            root_cause: None,
            selected_action: None,
            confidence: None,
            approval: None,
            execution_waves: None,
            recovery,
            failure: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_status_mapping() {
        let fresh = RecoveryContext::default();
        assert_eq!(
            RecoveryStatus::from_context(&fresh),
            RecoveryStatus::NotRecovering
        );

        let retrying = RecoveryContext {
            attempt: 2,
            max_attempts: 5,
            prior_failures: Vec::new(),
        };
        assert_eq!(
            RecoveryStatus::from_context(&retrying),
            RecoveryStatus::InProgress { attempt: 2 }
        );

        let exhausted = RecoveryContext {
            attempt: 5,
            max_attempts: 5,
            prior_failures: Vec::new(),
        };
        assert_eq!(
            RecoveryStatus::from_context(&exhausted),
            RecoveryStatus::Exhausted
        );
    }

    #[test]
    fn admitted_status_has_no_findings() {
        let status = AnalysisStatus::admitted(AnalysisId::new(), RecoveryStatus::NotRecovering);
        assert_eq!(status.phase, AnalysisPhase::Pending);
        assert!(status.summary.is_none());
        assert!(status.approval.is_none());
        assert!(status.completed_at.is_none());
    }
}
