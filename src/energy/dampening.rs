//! Dampening resolution.
//!
//! Two passes over the activated dampeners:
//!
//! 1. A dampener is silenced when a neighboring activated dampener can
//!    flow into it.
//! 2. Dampeners that survived pass 1 silence every neighbor they can flow
//!    into.
//!
//! Only immediate neighbors are affected; nothing cascades past one hop.

use hashbrown::HashSet;

use crate::graph::{AdjacencyMap, can_energy_flow};
use crate::model::{Connection, EnergyType, Node, NodeId};

/// One connection that carried dampening, oriented dampener → dampened.
#[derive(Debug, Clone, Copy)]
pub(super) struct DampeningLink<'a> {
    pub edge: &'a Connection,
    pub source: &'a NodeId,
    pub target: &'a NodeId,
}

#[derive(Debug, Default)]
pub(super) struct Dampening<'a> {
    pub dampened: HashSet<&'a NodeId>,
    /// In discovery order; a later link over the same connection wins.
    pub links: Vec<DampeningLink<'a>>,
}

impl<'a> Dampening<'a> {
    fn silence(&mut self, edge: Option<&'a Connection>, source: &'a NodeId, target: &'a NodeId) {
        self.dampened.insert(target);
        if let Some(edge) = edge {
            self.links.push(DampeningLink { edge, source, target });
        }
    }
}

pub(super) fn resolve<'a>(nodes: &'a [Node], adjacency: &AdjacencyMap<'a>) -> Dampening<'a> {
    let active: Vec<&'a NodeId> = nodes
        .iter()
        .filter(|n| n.is_active_source(EnergyType::Dampener))
        .map(|n| &n.id)
        .collect();
    let active_set: HashSet<&'a NodeId> = active.iter().copied().collect();

    let mut dampening = Dampening::default();

    // Pass 1: dampener on dampener.
    for &dampener in &active {
        for peer in adjacency.neighbors(dampener) {
            if !active_set.contains(peer) {
                continue;
            }
            let edge = adjacency.edge_between(peer, dampener);
            if can_energy_flow(edge, peer, dampener) {
                dampening.silence(edge, peer, dampener);
            }
        }
    }

    // Pass 2: survivors silence their neighbors.
    let survivors: Vec<&'a NodeId> = active
        .iter()
        .copied()
        .filter(|id| !dampening.dampened.contains(*id))
        .collect();

    for dampener in survivors {
        for neighbor in adjacency.neighbors(dampener) {
            let edge = adjacency.edge_between(dampener, neighbor);
            if can_energy_flow(edge, dampener, neighbor) {
                dampening.silence(edge, dampener, neighbor);
            }
        }
    }

    tracing::debug!(
        active = active.len(),
        dampened = dampening.dampened.len(),
        "resolved dampening"
    );

    dampening
}
