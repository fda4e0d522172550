//! Rejection reasons for malformed recommendation lists.

use crate::recommendation::ActionId;

/// Why a recommendation list failed validation.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Payload was not a valid recommendation list.
    #[error("unparseable recommendation list: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same identifier appears on more than one item.
    #[error("duplicate action id: {id}")]
    DuplicateAction {
        /// The repeated identifier.
        id: ActionId,
    },

    /// A dependency names an identifier absent from the list.
    #[error("action {action} depends on unknown action {missing}")]
    UnknownDependency {
        /// The item carrying the bad reference.
        action: ActionId,
        /// The identifier that does not exist.
        missing: ActionId,
    },

    /// An item lists its own identifier as a dependency.
    #[error("action {action} depends on itself")]
    SelfDependency {
        /// The offending item.
        action: ActionId,
    },

    /// The dependency relation contains a cycle.
    #[error("dependency cycle between actions: {}", members.iter().map(ActionId::as_str).collect::<Vec<_>>().join(", "))]
    CycleDetected {
        /// Identifiers participating in one detected cycle.
        members: Vec<ActionId>,
    },
}
