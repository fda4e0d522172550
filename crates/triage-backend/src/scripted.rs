//! Scripted backend for tests and offline replay.

use crate::api::InvestigationBackend;
use crate::error::BackendError;
use crate::types::{InvestigationReport, InvestigationRequest};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A backend that replays queued outcomes in order.
///
/// Each `investigate` call pops one outcome. An empty queue yields
/// [`BackendError::Exhausted`], which keeps a test that forgets to queue
/// enough outcomes loud instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<InvestigationReport, BackendError>>>,
    seen: Mutex<Vec<InvestigationRequest>>,
}

impl ScriptedBackend {
    /// Create an empty scripted backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful report.
    pub fn push_report(&self, report: InvestigationReport) {
        self.outcomes.lock().push_back(Ok(report));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: BackendError) {
        self.outcomes.lock().push_back(Err(error));
    }

    /// Queue the same report for every remaining call in a test.
    pub fn push_reports<I: IntoIterator<Item = InvestigationReport>>(&self, reports: I) {
        let mut outcomes = self.outcomes.lock();
        outcomes.extend(reports.into_iter().map(Ok));
    }

    /// Requests received so far, in call order.
    #[must_use]
    pub fn seen_requests(&self) -> Vec<InvestigationRequest> {
        self.seen.lock().clone()
    }

    /// Number of outcomes still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.outcomes.lock().len()
    }
}

#[async_trait::async_trait]
impl InvestigationBackend for ScriptedBackend {
    async fn investigate(
        &self,
        request: &InvestigationRequest,
    ) -> Result<InvestigationReport, BackendError> {
        self.seen.lock().push(request.clone());
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or(Err(BackendError::Exhausted))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
