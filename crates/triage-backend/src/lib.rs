//! Investigation backend contract.
//!
//! The engine never talks to the AI service directly; it goes through the
//! [`InvestigationBackend`] trait. Two implementations ship here:
//!
//! - [`HttpBackend`]: JSON over HTTP against the real service
//! - [`ScriptedBackend`]: a queue of canned outcomes for tests and replay
//!
//! The request carries the signal under analysis, whatever enrichment
//! context the upstream producer supplied, and the recovery counters. The
//! report carries the recommended actions with their dependency lists,
//! the selected action, and an overall confidence score.

pub mod api;
pub mod error;
pub mod http;
pub mod scripted;
pub mod types;

pub use api::InvestigationBackend;
pub use error::BackendError;
pub use http::HttpBackend;
pub use scripted::ScriptedBackend;
pub use types::{
    EnrichmentContext, InvestigationReport, InvestigationRequest, RecoveryContext, SignalSummary,
    TargetResource,
};
