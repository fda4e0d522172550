//! Wire types shared by every backend implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_plan::{ActionId, Recommendation};

/// The object the analysis is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResource {
    /// Resource kind, e.g. `"Deployment"`.
    pub kind: String,
    /// Resource name.
    pub name: String,
    /// Namespace, empty for cluster-scoped resources.
    #[serde(default)]
    pub namespace: String,
}

impl TargetResource {
    /// Convenience constructor.
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// The alert or signal that triggered the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSummary {
    /// Signal name, e.g. `"PodOOMKilled"`.
    pub name: String,
    /// Severity label as emitted by the source.
    pub severity: String,
    /// Deduplication fingerprint, when the source provides one.
    #[serde(default)]
    pub fingerprint: Option<String>,
    /// Free-form message from the source.
    #[serde(default)]
    pub message: String,
}

/// Context supplied by the upstream producer.
///
/// Every field is optional. A missing field degrades the investigation
/// rather than failing it, so absence is always representable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentContext {
    /// Recent events on the target, newest first.
    #[serde(default)]
    pub recent_events: Vec<String>,
    /// Tail of the relevant container log.
    #[serde(default)]
    pub log_excerpt: Option<String>,
    /// One-line metrics summary (cpu, memory, restarts).
    #[serde(default)]
    pub metrics_summary: Option<String>,
}

impl EnrichmentContext {
    /// Whether the producer supplied anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent_events.is_empty()
            && self.log_excerpt.is_none()
            && self.metrics_summary.is_none()
    }
}

/// Recovery attempt counters carried on the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryContext {
    /// Zero for a first analysis, incremented per retry of the signal.
    pub attempt: u32,
    /// Attempt ceiling configured for the signal.
    pub max_attempts: u32,
    /// Summaries of prior failed remediations, oldest first.
    #[serde(default)]
    pub prior_failures: Vec<String>,
}

impl RecoveryContext {
    /// Whether this request retries an earlier failed remediation.
    #[must_use]
    pub fn is_recovery(&self) -> bool {
        self.attempt > 0
    }

    /// Whether the attempt ceiling has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

/// Everything the backend needs to investigate one signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationRequest {
    /// Identifier of the analysis this request belongs to.
    pub analysis_id: String,
    /// The object under analysis.
    pub target: TargetResource,
    /// The triggering signal.
    pub signal: SignalSummary,
    /// Upstream enrichment, possibly empty.
    #[serde(default)]
    pub context: EnrichmentContext,
    /// Recovery counters and prior-failure summaries.
    #[serde(default)]
    pub recovery: RecoveryContext,
    /// When the request was assembled.
    pub requested_at: DateTime<Utc>,
}

/// The backend's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationReport {
    /// Narrative summary of the investigation.
    pub summary: String,
    /// Root cause, when the backend could isolate one.
    #[serde(default)]
    pub root_cause: Option<String>,
    /// Recommended actions with their dependency lists. Not yet
    /// validated; the engine runs the plan validation pass on these.
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// The action the backend picked as the remediation entry point.
    #[serde(default)]
    pub selected: Option<ActionId>,
    /// Overall confidence in the selected remediation, 0.0 to 1.0.
    pub confidence: f64,
}
