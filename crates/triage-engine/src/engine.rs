//! The reconciler.
//!
//! One engine instance serves many analyses. Each `run` call walks a
//! single request through the phase machine, talking to the backend
//! through the seam and recording every transition in the audit log.
//! Downstream consumers observe terminal state through the registry.

use crate::audit::PhaseLog;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::phase::{validate_transition, AnalysisPhase};
use crate::types::{AnalysisId, AnalysisRequest, AnalysisStatus, RecoveryStatus};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use triage_backend::{InvestigationBackend, InvestigationReport, InvestigationRequest};

/// Drives analysis requests to a terminal phase.
pub struct AnalysisEngine {
    config: EngineConfig,
    backend: Arc<dyn InvestigationBackend>,
    statuses: DashMap<AnalysisId, AnalysisStatus>,
    audit: PhaseLog,
}

impl AnalysisEngine {
    /// Create an engine over the given backend.
    #[must_use]
    pub fn new(config: EngineConfig, backend: Arc<dyn InvestigationBackend>) -> Self {
        Self {
            config,
            backend,
            statuses: DashMap::new(),
            audit: PhaseLog::default(),
        }
    }

    /// Admit a request and register its `Pending` status.
    pub fn submit(&self, request: &AnalysisRequest) -> AnalysisId {
        let id = AnalysisId::new();
        let recovery = RecoveryStatus::from_context(&request.recovery);
        self.statuses
            .insert(id, AnalysisStatus::admitted(id, recovery));
        tracing::info!(
            "Admitted analysis {} for {}/{} ({})",
            id,
            request.target.kind,
            request.target.name,
            request.signal.name
        );
        id
    }

    /// Run one analysis to a terminal phase.
    ///
    /// On success the returned status is `Completed` and carries the
    /// selected action, confidence, approval decision, and execution
    /// waves. On failure the status is moved to `Failed` (keeping any
    /// fields established before the failure) and the error is returned.
    ///
    /// # Errors
    /// [`EngineError::Backend`] or [`EngineError::Timeout`] when every
    /// retry is spent, [`EngineError::Plan`] or
    /// [`EngineError::SelectedUnknown`] when the backend violates the
    /// recommendation contract.
    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisStatus, EngineError> {
        let id = self.submit(&request);
        match self.drive(id, &request).await {
            Ok(()) => self
                .status(id)
                .ok_or(EngineError::UnknownAnalysis { id }),
            Err(err) => {
                tracing::error!("Analysis {} failed: {}", id, err);
                self.mark_failed(id, &err);
                Err(err)
            }
        }
    }

    /// Current status of one analysis.
    #[must_use]
    pub fn status(&self, id: AnalysisId) -> Option<AnalysisStatus> {
        self.statuses.get(&id).map(|s| s.clone())
    }

    /// Snapshot of every registered analysis.
    #[must_use]
    pub fn list(&self) -> Vec<AnalysisStatus> {
        self.statuses.iter().map(|s| s.clone()).collect()
    }

    /// The audit log of phase transitions.
    #[must_use]
    pub fn audit(&self) -> &PhaseLog {
        &self.audit
    }

    async fn drive(&self, id: AnalysisId, request: &AnalysisRequest) -> Result<(), EngineError> {
        self.transition(id, AnalysisPhase::Investigating, "dispatched to backend")?;
        let report = self.investigate(id, request).await?;

        self.transition(id, AnalysisPhase::Analyzing, "report received")?;
        self.record_findings(id, &report);

        // Validation runs once per report, before any batching is derived.
        let plan = triage_plan::validate(report.recommendations.clone())?;
        if let Some(selected) = &report.selected {
            if !plan.contains(selected) {
                return Err(EngineError::SelectedUnknown {
                    action: selected.clone(),
                });
            }
        }

        let decision = self.config.policy.evaluate(&report, &request.recovery);
        if let Some(mut status) = self.statuses.get_mut(&id) {
            status.execution_waves = Some(plan.execution_waves().to_vec());
            status.approval = Some(decision.clone());
        }

        let note = if decision.is_auto() {
            "auto-approved"
        } else {
            "manual review required"
        };
        self.transition(id, AnalysisPhase::Completed, note)?;
        Ok(())
    }

    /// Call the backend with bounded retries.
    ///
    /// Each call is capped by the phase timeout. Retryable failures back
    /// off linearly; anything else is surfaced immediately.
    async fn investigate(
        &self,
        id: AnalysisId,
        request: &AnalysisRequest,
    ) -> Result<InvestigationReport, EngineError> {
        let wire = self.wire_request(id, request);
        let mut attempt: u32 = 0;
        loop {
            let outcome = timeout(self.config.phase_timeout(), self.backend.investigate(&wire))
                .await
                .map_err(|_| EngineError::Timeout {
                    duration_secs: self.config.phase_timeout_secs,
                })
                .and_then(|r| r.map_err(EngineError::from));

            match outcome {
                Ok(report) => return Ok(report),
                Err(err) if err.is_retryable() && attempt < self.config.backend_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Analysis {}: backend call failed ({}), retry {} of {}",
                        id,
                        err,
                        attempt,
                        self.config.backend_retries
                    );
                    sleep(self.config.backoff_for(attempt)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Copy whatever the report established onto the status.
    ///
    /// Runs before plan validation so a later rejection keeps the
    /// summary and confidence already learned. Optional fields the
    /// backend omitted stay unset.
    fn record_findings(&self, id: AnalysisId, report: &InvestigationReport) {
        if let Some(mut status) = self.statuses.get_mut(&id) {
            status.summary = Some(report.summary.clone());
            status.root_cause = report.root_cause.clone();
            status.selected_action = report.selected.clone();
            status.confidence = Some(report.confidence);
        }
    }

    fn transition(
        &self,
        id: AnalysisId,
        to: AnalysisPhase,
        note: &str,
    ) -> Result<(), EngineError> {
        let mut status = self
            .statuses
            .get_mut(&id)
            .ok_or(EngineError::UnknownAnalysis { id })?;
        let from = status.phase;
        validate_transition(from, to)?;
        status.phase = to;
        if to.is_terminal() {
            status.completed_at = Some(Utc::now());
        }
        drop(status);

        self.audit.append(id, from, to, note);
        tracing::info!("Analysis {} moved {} -> {} ({})", id, from, to, note);
        Ok(())
    }

    fn mark_failed(&self, id: AnalysisId, err: &EngineError) {
        if let Some(mut status) = self.statuses.get_mut(&id) {
            status.failure = Some(err.to_string());
        }
        if let Err(transition_err) = self.transition(id, AnalysisPhase::Failed, &err.to_string()) {
            tracing::warn!(
                "Analysis {}: could not record failure: {}",
                id,
                transition_err
            );
        }
    }

    fn wire_request(&self, id: AnalysisId, request: &AnalysisRequest) -> InvestigationRequest {
        InvestigationRequest {
            analysis_id: id.to_string(),
            target: request.target.clone(),
            signal: request.signal.clone(),
            context: request.context.clone(),
            recovery: request.recovery.clone(),
            requested_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_backend::{ScriptedBackend, SignalSummary, TargetResource};

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            target: TargetResource::new("Deployment", "checkout", "shop"),
            signal: SignalSummary {
                name: "PodCrashLooping".into(),
                severity: "critical".into(),
                fingerprint: None,
                message: String::new(),
            },
            context: Default::default(),
            recovery: Default::default(),
        }
    }

    #[test]
    fn submit_registers_pending_status() {
        let engine = AnalysisEngine::new(
            EngineConfig::default(),
            Arc::new(ScriptedBackend::new()),
        );
        let id = engine.submit(&request());

        let status = engine.status(id).unwrap();
        assert_eq!(status.phase, AnalysisPhase::Pending);
        assert_eq!(engine.list().len(), 1);
    }

    #[test]
    fn status_of_unknown_analysis_is_none() {
        let engine = AnalysisEngine::new(
            EngineConfig::default(),
            Arc::new(ScriptedBackend::new()),
        );
        assert!(engine.status(AnalysisId::new()).is_none());
    }

    #[test]
    fn transition_rejects_unknown_analysis() {
        let engine = AnalysisEngine::new(
            EngineConfig::default(),
            Arc::new(ScriptedBackend::new()),
        );
        let err = engine
            .transition(AnalysisId::new(), AnalysisPhase::Investigating, "")
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownAnalysis { .. }));
    }
}
