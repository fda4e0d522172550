//! Analysis engine.
//!
//! Drives an analysis request through its phases:
//! Pending, Investigating, Analyzing, Completed (or Failed from any
//! non-terminal phase). Investigation goes through the backend seam with
//! bounded retries; the Analyzing phase validates the recommended plan,
//! re-checks the selected action, and evaluates the approval policy.
//! Terminal state is served from an in-memory registry, and every phase
//! transition lands in a hash-chained audit log.

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod phase;
pub mod types;

pub use audit::{PhaseEvent, PhaseLog};
pub use config::EngineConfig;
pub use engine::AnalysisEngine;
pub use error::EngineError;
pub use phase::AnalysisPhase;
pub use types::{AnalysisId, AnalysisRequest, AnalysisStatus, RecoveryStatus};
