//! The validation pass.
//!
//! Runs once per incoming list, before any ordering or batching logic.
//! Builds an index-based directed graph (edge from dependency to
//! dependent) keyed by stable identifiers, then checks references,
//! self-dependencies, and acyclicity.

use crate::error::PlanError;
use crate::plan::ValidatedPlan;
use crate::recommendation::{ActionId, Recommendation};
use indexmap::IndexMap;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

/// Validate a recommendation list and seal it into a [`ValidatedPlan`].
///
/// # Errors
/// - [`PlanError::DuplicateAction`] when an identifier repeats
/// - [`PlanError::SelfDependency`] when an item references itself
/// - [`PlanError::UnknownDependency`] when a referenced identifier is
///   absent from the list
/// - [`PlanError::CycleDetected`] when the dependency relation is cyclic
pub fn validate(recommendations: Vec<Recommendation>) -> Result<ValidatedPlan, PlanError> {
    let mut index: IndexMap<ActionId, NodeIndex> = IndexMap::with_capacity(recommendations.len());
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(recommendations.len(), 0);

    for (pos, rec) in recommendations.iter().enumerate() {
        if index.contains_key(&rec.id) {
            return Err(PlanError::DuplicateAction { id: rec.id.clone() });
        }
        index.insert(rec.id.clone(), graph.add_node(pos));
    }

    for rec in &recommendations {
        let to = index[&rec.id];
        for dep in &rec.dependencies {
            if *dep == rec.id {
                return Err(PlanError::SelfDependency {
                    action: rec.id.clone(),
                });
            }
            let Some(&from) = index.get(dep) else {
                return Err(PlanError::UnknownDependency {
                    action: rec.id.clone(),
                    missing: dep.clone(),
                });
            };
            graph.add_edge(from, to, ());
        }
    }

    let order = match toposort(&graph, None) {
        Ok(order) => order,
        Err(_) => {
            return Err(PlanError::CycleDetected {
                members: cycle_members(&graph, &index),
            })
        }
    };

    let order: Vec<ActionId> = order
        .into_iter()
        .map(|ix| recommendations[graph[ix]].id.clone())
        .collect();
    let waves = layer_waves(&graph, &recommendations, &index);

    let by_id: IndexMap<ActionId, usize> = recommendations
        .iter()
        .enumerate()
        .map(|(pos, rec)| (rec.id.clone(), pos))
        .collect();
    Ok(ValidatedPlan::seal(recommendations, by_id, order, waves))
}

/// Identifiers of one strongly connected component with more than one
/// member. Self-loops never reach this point.
fn cycle_members(
    graph: &DiGraph<usize, ()>,
    index: &IndexMap<ActionId, NodeIndex>,
) -> Vec<ActionId> {
    let scc = tarjan_scc(graph);
    let component = scc
        .into_iter()
        .find(|component| component.len() > 1)
        .unwrap_or_default();

    let mut members: Vec<ActionId> = index
        .iter()
        .filter(|(_, ix)| component.contains(ix))
        .map(|(id, _)| id.clone())
        .collect();
    members.sort();
    members
}

/// Kahn layering. Wave 0 holds every action with no dependencies; wave k
/// holds actions whose dependencies all sit in earlier waves. Actions in
/// the same wave are mutually independent and may run as one batch.
fn layer_waves(
    graph: &DiGraph<usize, ()>,
    recommendations: &[Recommendation],
    index: &IndexMap<ActionId, NodeIndex>,
) -> Vec<Vec<ActionId>> {
    let mut depth = vec![0usize; recommendations.len()];
    let mut max_depth = 0usize;

    // toposort cannot fail here: the caller already rejected cycles.
    let order = toposort(graph, None).expect("layering runs on acyclic graphs only");
    for ix in order {
        let pos = graph[ix];
        let d = recommendations[pos]
            .dependencies
            .iter()
            .map(|dep| depth[graph[index[dep]]] + 1)
            .max()
            .unwrap_or(0);
        depth[pos] = d;
        max_depth = max_depth.max(d);
    }

    let mut waves = vec![Vec::new(); if recommendations.is_empty() { 0 } else { max_depth + 1 }];
    for (pos, rec) in recommendations.iter().enumerate() {
        waves[depth[pos]].push(rec.id.clone());
    }
    waves
}
