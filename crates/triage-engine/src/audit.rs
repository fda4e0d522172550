//! Hash-chained audit log of phase transitions.
//!
//! Each event links to its predecessor through a SHA-256 chain, so any
//! after-the-fact edit of a recorded transition is detectable.

use crate::phase::AnalysisPhase;
use crate::types::AnalysisId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Unique audit event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a new event identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// One recorded phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEvent {
    /// Event identifier.
    pub event_id: EventId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// The analysis this transition belongs to.
    pub analysis_id: AnalysisId,
    /// Phase left.
    pub from: AnalysisPhase,
    /// Phase entered.
    pub to: AnalysisPhase,
    /// Short free-form context, e.g. the failure reason.
    pub note: String,
    /// Hash of the previous event, zero for the first.
    pub prev_hash: [u8; 32],
    /// Hash over this event's fields and `prev_hash`.
    pub hash: [u8; 32],
}

/// Append-only transition log.
#[derive(Debug, Default)]
pub struct PhaseLog {
    inner: Mutex<Vec<PhaseEvent>>,
}

/// Chain verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("audit chain integrity violation")]
pub struct IntegrityViolation;

impl PhaseLog {
    /// Record one transition and return its event id.
    pub fn append(
        &self,
        analysis_id: AnalysisId,
        from: AnalysisPhase,
        to: AnalysisPhase,
        note: impl Into<String>,
    ) -> EventId {
        let mut guard = self.inner.lock();
        let prev_hash = guard.last().map_or([0u8; 32], |e| e.hash);
        let mut event = PhaseEvent {
            event_id: EventId::new(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            analysis_id,
            from,
            to,
            note: note.into(),
            prev_hash,
            hash: [0u8; 32],
        };
        event.hash = compute_hash(&event);
        let id = event.event_id;
        guard.push(event);
        id
    }

    /// Snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<PhaseEvent> {
        self.inner.lock().clone()
    }

    /// Events belonging to one analysis, in record order.
    #[must_use]
    pub fn events_for(&self, analysis_id: AnalysisId) -> Vec<PhaseEvent> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.analysis_id == analysis_id)
            .cloned()
            .collect()
    }

    /// Walk the chain and re-derive every hash.
    ///
    /// # Errors
    /// [`IntegrityViolation`] when any link or hash does not match.
    pub fn verify_integrity(&self) -> Result<(), IntegrityViolation> {
        let guard = self.inner.lock();
        let mut prev = [0u8; 32];
        for event in guard.iter() {
            if event.prev_hash != prev {
                return Err(IntegrityViolation);
            }
            if event.hash != compute_hash(event) {
                return Err(IntegrityViolation);
            }
            prev = event.hash;
        }
        Ok(())
    }
}

fn compute_hash(event: &PhaseEvent) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(event.event_id.0.as_bytes());
    hasher.update(event.timestamp.to_le_bytes());
    hasher.update(event.analysis_id.0.to_bytes());
    hasher.update([event.from.as_u8(), event.to.as_u8()]);
    hasher.update(event.note.as_bytes());
    hasher.update([0]);
    hasher.update(event.prev_hash);
    hasher.finalize().into()
}
