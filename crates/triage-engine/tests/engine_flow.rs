//! End-to-end flows through the engine against a scripted backend.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use triage_backend::{BackendError, RecoveryContext, ScriptedBackend};
use triage_engine::{AnalysisEngine, AnalysisPhase, EngineConfig, EngineError, RecoveryStatus};
use triage_policy::{ApprovalDecision, ApprovalPolicy};
use triage_test_utils::{
    diamond_recommendations, fork_recommendations, report_selecting, report_with, sample_request,
    setup_test_engine,
};

fn fast_config() -> EngineConfig {
    EngineConfig {
        retry_backoff_ms: 10,
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn confident_diamond_plan_completes_and_auto_approves() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_report(report_with(diamond_recommendations(), 0.92));
    let engine = setup_test_engine(backend.clone());

    let status = engine.run(sample_request()).await.unwrap();

    assert_eq!(status.phase, AnalysisPhase::Completed);
    assert_eq!(status.selected_action.as_ref().unwrap().as_str(), "rec-001");
    assert_eq!(status.confidence, Some(0.92));
    assert_eq!(status.approval, Some(ApprovalDecision::AutoApprove));
    assert!(status.completed_at.is_some());

    // Diamond: entry, two parallel branches, then the join.
    let waves = status.execution_waves.unwrap();
    assert_eq!(waves.len(), 3);
    assert_eq!(waves[1].len(), 2);

    // The backend saw exactly one call carrying the analysis id.
    let seen = backend.seen_requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].analysis_id, status.id.to_string());
}

#[tokio::test]
async fn audit_log_records_the_full_phase_walk() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_report(report_with(fork_recommendations(), 0.9));
    let engine = setup_test_engine(backend);

    let status = engine.run(sample_request()).await.unwrap();

    let events = engine.audit().events_for(status.id);
    let walk: Vec<(AnalysisPhase, AnalysisPhase)> =
        events.iter().map(|e| (e.from, e.to)).collect();
    assert_eq!(
        walk,
        vec![
            (AnalysisPhase::Pending, AnalysisPhase::Investigating),
            (AnalysisPhase::Investigating, AnalysisPhase::Analyzing),
            (AnalysisPhase::Analyzing, AnalysisPhase::Completed),
        ]
    );
    engine.audit().verify_integrity().unwrap();
}

#[tokio::test]
async fn low_confidence_completes_with_manual_review() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_report(report_with(fork_recommendations(), 0.4));
    let engine = setup_test_engine(backend);

    let status = engine.run(sample_request()).await.unwrap();

    assert_eq!(status.phase, AnalysisPhase::Completed);
    match status.approval.unwrap() {
        ApprovalDecision::ManualReview { reasons } => {
            assert!(reasons.iter().any(|r| r.contains("below threshold")));
        }
        ApprovalDecision::AutoApprove => panic!("expected manual review"),
    }
}

#[tokio::test]
async fn cyclic_plan_fails_the_analysis_but_keeps_findings() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut recs = fork_recommendations();
    // Close the loop: the root now depends on one of its branches.
    recs[0].dependencies.push("rec-003".into());
    backend.push_report(report_selecting(recs, "rec-001", 0.95));
    let engine = setup_test_engine(backend);

    let err = engine.run(sample_request()).await.unwrap_err();
    assert!(matches!(err, EngineError::Plan(_)));
    assert!(err.requires_human());

    let status = engine.list().pop().unwrap();
    assert_eq!(status.phase, AnalysisPhase::Failed);
    assert!(status.failure.unwrap().contains("cycle"));
    // Findings recorded before validation survive the failure.
    assert_eq!(status.confidence, Some(0.95));
    assert!(status.summary.is_some());
    assert!(status.execution_waves.is_none());
}

#[tokio::test]
async fn dangling_selection_is_a_contract_violation() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_report(report_selecting(fork_recommendations(), "rec-999", 0.9));
    let engine = setup_test_engine(backend);

    let err = engine.run(sample_request()).await.unwrap_err();
    assert!(matches!(err, EngineError::SelectedUnknown { ref action } if action.as_str() == "rec-999"));

    let status = engine.list().pop().unwrap();
    assert_eq!(status.phase, AnalysisPhase::Failed);
}

#[tokio::test]
async fn retryable_backend_failure_is_retried_to_success() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_error(BackendError::Api {
        status: 503,
        message: "overloaded".into(),
    });
    backend.push_report(report_with(fork_recommendations(), 0.9));
    let engine = AnalysisEngine::new(fast_config(), backend.clone());

    let status = engine.run(sample_request()).await.unwrap();
    assert_eq!(status.phase, AnalysisPhase::Completed);
    assert_eq!(backend.seen_requests().len(), 2);
}

#[tokio::test]
async fn client_error_fails_without_retry() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_error(BackendError::Api {
        status: 400,
        message: "unknown signal shape".into(),
    });
    let engine = AnalysisEngine::new(fast_config(), backend.clone());

    let err = engine.run(sample_request()).await.unwrap_err();
    assert!(matches!(err, EngineError::Backend(_)));
    assert!(!err.is_retryable());
    assert_eq!(backend.seen_requests().len(), 1);

    let status = engine.list().pop().unwrap();
    assert_eq!(status.phase, AnalysisPhase::Failed);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_error() {
    let backend = Arc::new(ScriptedBackend::new());
    for _ in 0..3 {
        backend.push_error(BackendError::Api {
            status: 503,
            message: "still overloaded".into(),
        });
    }
    let engine = AnalysisEngine::new(fast_config(), backend.clone());

    let err = engine.run(sample_request()).await.unwrap_err();
    assert!(matches!(err, EngineError::Backend(BackendError::Api { status: 503, .. })));
    // First call plus the two configured retries.
    assert_eq!(backend.seen_requests().len(), 3);
}

#[tokio::test]
async fn exhausted_recovery_forces_manual_review() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_report(report_with(fork_recommendations(), 0.95));
    let engine = setup_test_engine(backend);

    let mut request = sample_request();
    request.recovery = RecoveryContext {
        attempt: 3,
        max_attempts: 3,
        prior_failures: vec!["restart-pod did not clear the signal".into()],
    };

    let status = engine.run(request).await.unwrap();
    assert_eq!(status.phase, AnalysisPhase::Completed);
    assert_eq!(status.recovery, RecoveryStatus::Exhausted);
    match status.approval.unwrap() {
        ApprovalDecision::ManualReview { reasons } => {
            assert!(reasons.iter().any(|r| r.contains("recovery")));
        }
        ApprovalDecision::AutoApprove => panic!("expected escalation to a human"),
    }
}

#[tokio::test]
async fn degraded_report_completes_without_a_plan() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_report(report_with(Vec::new(), 0.9));
    let engine = setup_test_engine(backend);

    let status = engine.run(sample_request()).await.unwrap();

    // Nothing recommended: the analysis still terminates cleanly, with
    // the absent fields left unset and approval withheld.
    assert_eq!(status.phase, AnalysisPhase::Completed);
    assert!(status.selected_action.is_none());
    assert_eq!(status.execution_waves.as_deref(), Some(&[][..]));
    assert!(!status.approval.unwrap().is_auto());
}

#[tokio::test]
async fn custom_policy_flows_through_the_config() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_report(report_with(fork_recommendations(), 0.95));

    let policy = ApprovalPolicy {
        manual_actions: vec!["restart-pod".into()],
        ..ApprovalPolicy::default()
    };
    let engine = AnalysisEngine::new(
        EngineConfig::default().with_policy(policy),
        backend,
    );

    let status = engine.run(sample_request()).await.unwrap();
    assert!(!status.approval.unwrap().is_auto());
}
