//! Testing utilities for the Triage workspace
//!
//! Shared fixtures: recommendation lists for the four execution
//! patterns, request builders, and canned reports.

#![allow(missing_docs)]

use triage_backend::{
    InvestigationReport, RecoveryContext, ScriptedBackend, SignalSummary, TargetResource,
};
use triage_engine::{AnalysisEngine, AnalysisRequest, EngineConfig};
use triage_plan::{ActionId, Recommendation};

fn rec(id: &str, action: &str, deps: &[&str]) -> Recommendation {
    Recommendation::new(id, action).depends_on(deps.iter().copied())
}

/// rec-001 then rec-002 then rec-003.
pub fn chain_recommendations() -> Vec<Recommendation> {
    vec![
        rec("rec-001", "cordon-node", &[]),
        rec("rec-002", "drain-node", &["rec-001"]),
        rec("rec-003", "restart-kubelet", &["rec-002"]),
    ]
}

/// rec-002 and rec-003 both fan out from rec-001.
pub fn fork_recommendations() -> Vec<Recommendation> {
    vec![
        rec("rec-001", "scale-deployment", &[]),
        rec("rec-002", "restart-pod", &["rec-001"]),
        rec("rec-003", "flush-cache", &["rec-001"]),
    ]
}

/// rec-005 joins on three independent prerequisites.
pub fn join_recommendations() -> Vec<Recommendation> {
    vec![
        rec("rec-002", "backup-volume", &[]),
        rec("rec-003", "rotate-credentials", &[]),
        rec("rec-004", "quiesce-writes", &[]),
        rec("rec-005", "failover-database", &["rec-002", "rec-003", "rec-004"]),
    ]
}

/// Fork from rec-001 converging into rec-004.
pub fn diamond_recommendations() -> Vec<Recommendation> {
    vec![
        rec("rec-001", "increase-memory-limit", &[]),
        rec("rec-002", "restart-pod", &["rec-001"]),
        rec("rec-003", "update-hpa", &["rec-001"]),
        rec("rec-004", "verify-rollout", &["rec-002", "rec-003"]),
    ]
}

/// A crash-looping deployment with no enrichment and no recovery history.
pub fn sample_request() -> AnalysisRequest {
    AnalysisRequest {
        target: TargetResource::new("Deployment", "checkout", "shop"),
        signal: SignalSummary {
            name: "PodCrashLooping".into(),
            severity: "critical".into(),
            fingerprint: Some("f9c2a1".into()),
            message: "back-off 5m restarting failed container".into(),
        },
        context: Default::default(),
        recovery: RecoveryContext::default(),
    }
}

/// A report selecting the first recommendation of `recommendations`.
pub fn report_with(
    recommendations: Vec<Recommendation>,
    confidence: f64,
) -> InvestigationReport {
    let selected = recommendations.first().map(|r| r.id.clone());
    InvestigationReport {
        summary: "container killed under memory pressure".into(),
        root_cause: Some("memory limit below observed working set".into()),
        recommendations,
        selected,
        confidence,
    }
}

/// A report selecting an explicit action id.
pub fn report_selecting(
    recommendations: Vec<Recommendation>,
    selected: &str,
    confidence: f64,
) -> InvestigationReport {
    InvestigationReport {
        summary: "container killed under memory pressure".into(),
        root_cause: None,
        recommendations,
        selected: Some(ActionId::new(selected)),
        confidence,
    }
}

/// Engine with default configuration over the given scripted backend.
pub fn setup_test_engine(backend: std::sync::Arc<ScriptedBackend>) -> AnalysisEngine {
    AnalysisEngine::new(EngineConfig::default(), backend)
}
