//! Approval policy.
//!
//! After an investigation produces a validated plan, the policy decides
//! whether the selected remediation may run unattended or needs a human.
//! The policy is declarative data (loadable from TOML), evaluated against
//! the report and the request's recovery counters. Every rule that fires
//! contributes a reason, so a manual-review decision explains itself.

use serde::{Deserialize, Serialize};
use triage_backend::{InvestigationReport, RecoveryContext};

/// Tunable approval rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalPolicy {
    /// Reports below this overall confidence go to manual review.
    pub min_confidence: f64,
    /// Action kinds that always need a human, regardless of confidence.
    pub manual_actions: Vec<String>,
    /// Recovery attempts at or beyond this count go to manual review.
    pub max_recovery_attempts: u32,
    /// Whether a report without a selected action goes to manual review.
    pub require_manual_on_degraded: bool,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.8,
            manual_actions: Vec::new(),
            max_recovery_attempts: 3,
            require_manual_on_degraded: true,
        }
    }
}

/// The outcome of policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// The remediation may run without a human in the loop.
    AutoApprove,
    /// A human must confirm; every fired rule is listed.
    ManualReview {
        /// Why automatic approval was withheld.
        reasons: Vec<String>,
    },
}

impl ApprovalDecision {
    /// Whether the decision permits unattended execution.
    #[inline]
    #[must_use]
    pub fn is_auto(&self) -> bool {
        matches!(self, ApprovalDecision::AutoApprove)
    }
}

/// Policy file problems.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The TOML payload did not describe a policy.
    #[error("invalid policy: {0}")]
    Invalid(#[from] toml::de::Error),

    /// A field value is outside its meaningful range.
    #[error("policy rejected: {0}")]
    OutOfRange(String),
}

impl ApprovalPolicy {
    /// Parse a policy from TOML and range-check it.
    ///
    /// # Errors
    /// [`PolicyError::Invalid`] on malformed TOML, [`PolicyError::OutOfRange`]
    /// when `min_confidence` leaves the unit interval.
    pub fn from_toml_str(raw: &str) -> Result<Self, PolicyError> {
        let policy: Self = toml::from_str(raw)?;
        if !(0.0..=1.0).contains(&policy.min_confidence) {
            return Err(PolicyError::OutOfRange(format!(
                "min_confidence must be within [0, 1], got {}",
                policy.min_confidence
            )));
        }
        Ok(policy)
    }

    /// Evaluate the report against this policy.
    ///
    /// Rules accumulate: the decision lists every reason that applies,
    /// not just the first one.
    #[must_use]
    pub fn evaluate(
        &self,
        report: &InvestigationReport,
        recovery: &RecoveryContext,
    ) -> ApprovalDecision {
        let mut reasons = Vec::new();

        if self.require_manual_on_degraded {
            if report.recommendations.is_empty() {
                reasons.push("backend returned no recommendations".to_string());
            } else if report.selected.is_none() {
                reasons.push("backend selected no remediation".to_string());
            }
        }

        if report.confidence < self.min_confidence {
            reasons.push(format!(
                "confidence {:.2} below threshold {:.2}",
                report.confidence, self.min_confidence
            ));
        }

        for rec in &report.recommendations {
            if self.manual_actions.iter().any(|a| *a == rec.action) {
                reasons.push(format!(
                    "action {} ({}) requires manual approval",
                    rec.id, rec.action
                ));
            }
        }

        if recovery.attempt >= self.max_recovery_attempts {
            reasons.push(format!(
                "recovery attempt {} reached policy ceiling {}",
                recovery.attempt, self.max_recovery_attempts
            ));
        } else if recovery.is_exhausted() {
            reasons.push(format!(
                "recovery attempts exhausted ({} of {})",
                recovery.attempt, recovery.max_attempts
            ));
        }

        if reasons.is_empty() {
            ApprovalDecision::AutoApprove
        } else {
            ApprovalDecision::ManualReview { reasons }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_plan::{ActionId, Recommendation};

    fn report(confidence: f64) -> InvestigationReport {
        InvestigationReport {
            summary: "memory limit too low".into(),
            root_cause: Some("OOMKilled under peak load".into()),
            recommendations: vec![
                Recommendation::new("rec-001", "increase-memory-limit"),
                Recommendation::new("rec-002", "restart-pod").depends_on(["rec-001"]),
            ],
            selected: Some(ActionId::new("rec-001")),
            confidence,
        }
    }

    #[test]
    fn confident_report_auto_approves() {
        let policy = ApprovalPolicy::default();
        let decision = policy.evaluate(&report(0.92), &RecoveryContext::default());
        assert!(decision.is_auto());
    }

    #[test]
    fn low_confidence_needs_a_human() {
        let policy = ApprovalPolicy::default();
        let decision = policy.evaluate(&report(0.55), &RecoveryContext::default());
        match decision {
            ApprovalDecision::ManualReview { reasons } => {
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].contains("below threshold"));
            }
            ApprovalDecision::AutoApprove => panic!("expected manual review"),
        }
    }

    #[test]
    fn listed_actions_force_manual_review() {
        let policy = ApprovalPolicy {
            manual_actions: vec!["restart-pod".into()],
            ..ApprovalPolicy::default()
        };
        let decision = policy.evaluate(&report(0.95), &RecoveryContext::default());
        assert!(!decision.is_auto());
    }

    #[test]
    fn exhausted_recovery_escalates() {
        let policy = ApprovalPolicy::default();
        let recovery = RecoveryContext {
            attempt: 3,
            max_attempts: 5,
            prior_failures: vec!["restart did not help".into()],
        };
        let decision = policy.evaluate(&report(0.95), &recovery);
        match decision {
            ApprovalDecision::ManualReview { reasons } => {
                assert!(reasons.iter().any(|r| r.contains("policy ceiling")));
            }
            ApprovalDecision::AutoApprove => panic!("expected escalation"),
        }
    }

    #[test]
    fn degraded_report_never_auto_approves() {
        let policy = ApprovalPolicy::default();
        let degraded = InvestigationReport {
            summary: "insufficient data".into(),
            root_cause: None,
            recommendations: Vec::new(),
            selected: None,
            confidence: 0.99,
        };
        let decision = policy.evaluate(&degraded, &RecoveryContext::default());
        assert!(!decision.is_auto());
    }

    #[test]
    fn reasons_accumulate() {
        let policy = ApprovalPolicy {
            manual_actions: vec!["restart-pod".into()],
            ..ApprovalPolicy::default()
        };
        let recovery = RecoveryContext {
            attempt: 4,
            max_attempts: 4,
            prior_failures: Vec::new(),
        };
        let decision = policy.evaluate(&report(0.2), &recovery);
        match decision {
            ApprovalDecision::ManualReview { reasons } => assert_eq!(reasons.len(), 3),
            ApprovalDecision::AutoApprove => panic!("expected manual review"),
        }
    }

    #[test]
    fn parses_policy_file() {
        let raw = r#"
            min_confidence = 0.7
            manual_actions = ["delete-pvc", "scale-to-zero"]
            max_recovery_attempts = 2
        "#;
        let policy = ApprovalPolicy::from_toml_str(raw).unwrap();
        assert_eq!(policy.min_confidence, 0.7);
        assert_eq!(policy.manual_actions.len(), 2);
        assert!(policy.require_manual_on_degraded);
    }

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        let err = ApprovalPolicy::from_toml_str("min_confidence = 1.5").unwrap_err();
        assert!(matches!(err, PolicyError::OutOfRange(_)));
    }
}
