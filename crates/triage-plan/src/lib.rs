//! Remediation plan dependency graph
//!
//! An AI investigation returns a list of recommended remediation actions.
//! Each action carries a stable identifier and the identifiers of the
//! actions it depends on. Before any ordering or batching logic runs, the
//! whole list goes through a single validation pass that rejects:
//!
//! - references to identifiers that do not exist in the same list
//! - actions that depend on themselves
//! - duplicated identifiers
//! - any cycle in the dependency relation
//!
//! A list that survives validation becomes a [`ValidatedPlan`], a sealed
//! type that cannot be constructed any other way. The plan exposes a
//! topological order and execution waves: actions sharing a satisfied
//! dependency run as one parallel batch, and an action with several
//! dependencies becomes eligible only once all of them are complete.

/// Rejection reasons.
pub mod error;
/// The sealed plan type.
pub mod plan;
/// Wire-facing action items.
pub mod recommendation;
/// The validation pass.
pub mod validate;

pub use error::PlanError;
pub use plan::ValidatedPlan;
pub use recommendation::{ActionId, Recommendation};
pub use validate::validate;
