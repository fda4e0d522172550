//! Proof-carrying plan type.
//!
//! A [`ValidatedPlan`] can only be produced by [`crate::validate`], so any
//! plan reaching scheduling or approval logic has already passed the
//! reference, self-dependency, and cycle checks.

use crate::recommendation::{ActionId, Recommendation};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// A recommendation list that passed validation.
///
/// The type is sealed: it has no public constructor, and fields stay
/// private so the stored order and waves cannot drift from the list.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedPlan {
    recommendations: Vec<Recommendation>,
    #[serde(skip)]
    by_id: IndexMap<ActionId, usize>,
    order: Vec<ActionId>,
    waves: Vec<Vec<ActionId>>,
}

impl ValidatedPlan {
    /// Internal constructor, called from the validation pass only.
    pub(crate) fn seal(
        recommendations: Vec<Recommendation>,
        by_id: IndexMap<ActionId, usize>,
        order: Vec<ActionId>,
        waves: Vec<Vec<ActionId>>,
    ) -> Self {
        Self {
            recommendations,
            by_id,
            order,
            waves,
        }
    }

    /// All recommendations, in their original list order.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[Recommendation] {
        &self.recommendations
    }

    /// Number of actions in the plan.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    /// Whether the plan holds no actions at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    /// Look up one action by identifier.
    #[must_use]
    pub fn get(&self, id: &ActionId) -> Option<&Recommendation> {
        self.by_id.get(id).map(|&pos| &self.recommendations[pos])
    }

    /// Whether the plan contains the given identifier.
    #[must_use]
    pub fn contains(&self, id: &ActionId) -> bool {
        self.by_id.contains_key(id)
    }

    /// A dependency-respecting total order over the actions.
    #[inline]
    #[must_use]
    pub fn topological_order(&self) -> &[ActionId] {
        &self.order
    }

    /// Parallel execution batches.
    ///
    /// Wave 0 holds the entry actions. Each later wave holds actions whose
    /// dependencies all sit in earlier waves, so the members of one wave
    /// carry no ordering between them.
    #[inline]
    #[must_use]
    pub fn execution_waves(&self) -> &[Vec<ActionId>] {
        &self.waves
    }

    /// Actions with no dependencies.
    #[must_use]
    pub fn entry_actions(&self) -> Vec<&ActionId> {
        self.recommendations
            .iter()
            .filter(|r| r.dependencies.is_empty())
            .map(|r| &r.id)
            .collect()
    }

    /// Actions nothing else depends on.
    #[must_use]
    pub fn exit_actions(&self) -> Vec<&ActionId> {
        let referenced: HashSet<&ActionId> = self
            .recommendations
            .iter()
            .flat_map(|r| r.dependencies.iter())
            .collect();
        self.recommendations
            .iter()
            .filter(|r| !referenced.contains(&r.id))
            .map(|r| &r.id)
            .collect()
    }

    /// Actions whose dependencies are all satisfied by `completed` and
    /// which are not themselves in `completed`.
    #[must_use]
    pub fn eligible_after(&self, completed: &HashSet<ActionId>) -> Vec<&ActionId> {
        self.recommendations
            .iter()
            .filter(|r| !completed.contains(&r.id))
            .filter(|r| r.dependencies.iter().all(|d| completed.contains(d)))
            .map(|r| &r.id)
            .collect()
    }
}
