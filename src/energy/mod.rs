//! # Energy Distance Calculator
//!
//! Computes, for one scope, how far exciter energy travels from the
//! activated exciters and which nodes are silenced by activated dampeners.
//!
//! ```text
//! nodes + connections
//!   → adjacency (in-scope connections only)
//!   → dampening (peer pass, then survivor pass)
//!   → exciter seeding (activated, not dampened)
//!   → wave propagation (2 per hop, capped passes)
//!   → connection distances (mean of both endpoints)
//! ```
//!
//! Every call is a pure function of its inputs. Nothing is retained
//! between calls.

mod dampening;
mod propagation;
pub mod animation;

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::graph::AdjacencyMap;
use crate::model::{Connection, ConnectionId, EnergyType, Node, NodeId, Snapshot};

pub use animation::animated_connections;

/// Distance added per hop. Node distances are therefore even, and a
/// connection between two successive wave fronts gets an odd mean.
pub const HOP: u32 = 2;

/// Default ceiling on propagation passes.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

// ============================================================================
// Configuration
// ============================================================================

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

/// Tuning for [`EnergyDistanceCalculator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyConfig {
    /// Maximum number of wave passes before the calculator gives up and
    /// returns what it has.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self { max_iterations: DEFAULT_MAX_ITERATIONS }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Distance per energy type, ordered by type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceMap(BTreeMap<EnergyType, u32>);

impl DistanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ty: EnergyType) -> Option<u32> {
        self.0.get(&ty).copied()
    }

    pub fn set(&mut self, ty: EnergyType, distance: u32) {
        self.0.insert(ty, distance);
    }

    pub fn exciter(&self) -> Option<u32> {
        self.get(EnergyType::Exciter)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnergyType, u32)> + '_ {
        self.0.iter().map(|(ty, d)| (*ty, *d))
    }
}

impl FromIterator<(EnergyType, u32)> for DistanceMap {
    fn from_iter<I: IntoIterator<Item = (EnergyType, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Render a distance map as space-separated `<initial>:<distance>` tokens,
/// sorted by energy type name. `{exciter: 4}` renders as `e:4`.
pub fn format_for_display(distances: &DistanceMap) -> String {
    let mut entries: Vec<(EnergyType, u32)> = distances.iter().collect();
    entries.sort_by_key(|(ty, _)| ty.name());
    entries
        .iter()
        .map(|(ty, d)| format!("{}:{}", ty.initial(), d))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A connection that carried dampening, oriented dampener → dampened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DampenerEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Everything the rendering layer needs to draw the energy state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyResult {
    /// One entry per in-scope node; empty when nothing reached it.
    pub node_distances: HashMap<NodeId, DistanceMap>,
    pub dampened_nodes: HashSet<NodeId>,
    pub dampener_edges: HashMap<ConnectionId, DampenerEdge>,
    pub edge_distances: HashMap<ConnectionId, DistanceMap>,
    /// Wave passes spent on exciter propagation.
    pub passes: usize,
    /// Propagation stopped at the pass cap; distances may be incomplete.
    pub truncated: bool,
}

impl EnergyResult {
    pub fn exciter_distance(&self, id: &NodeId) -> Option<u32> {
        self.node_distances.get(id).and_then(DistanceMap::exciter)
    }

    pub fn edge_exciter_distance(&self, id: &ConnectionId) -> Option<u32> {
        self.edge_distances.get(id).and_then(DistanceMap::exciter)
    }

    pub fn is_dampened(&self, id: &NodeId) -> bool {
        self.dampened_nodes.contains(id)
    }

    /// Display label for a node, or `None` when it holds no distance.
    pub fn label(&self, id: &NodeId) -> Option<String> {
        self.node_distances
            .get(id)
            .filter(|d| !d.is_empty())
            .map(format_for_display)
    }
}

// ============================================================================
// Calculator
// ============================================================================

/// Stateless calculator. Holding one only pins the configuration.
#[derive(Debug, Clone, Default)]
pub struct EnergyDistanceCalculator {
    config: EnergyConfig,
}

impl EnergyDistanceCalculator {
    pub fn new(config: EnergyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnergyConfig {
        &self.config
    }

    pub fn compute_snapshot(&self, snapshot: &Snapshot) -> EnergyResult {
        self.compute(&snapshot.nodes, &snapshot.connections)
    }

    /// Run every phase over `nodes` and `edges`. Connections with an
    /// endpoint outside `nodes` are ignored.
    pub fn compute(&self, nodes: &[Node], edges: &[Connection]) -> EnergyResult {
        let adjacency = AdjacencyMap::build(nodes, edges);

        let dampening = dampening::resolve(nodes, &adjacency);

        let wave = propagation::propagate(
            EnergyType::Exciter,
            nodes,
            &adjacency,
            &dampening.dampened,
            self.config.max_iterations,
        );

        let node_distances: HashMap<NodeId, DistanceMap> = nodes
            .iter()
            .map(|node| {
                let mut distances = DistanceMap::new();
                if let Some(&d) = wave.distances.get(&node.id) {
                    distances.set(EnergyType::Exciter, d);
                }
                (node.id.clone(), distances)
            })
            .collect();

        let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|n| (&n.id, n)).collect();
        let mut edge_distances = HashMap::new();
        for edge in edges {
            let (Some(a), Some(b)) = (by_id.get(&edge.entity1), by_id.get(&edge.entity2)) else {
                continue;
            };
            if dampening.dampened.contains(&a.id) || dampening.dampened.contains(&b.id) {
                continue;
            }
            let (Some(&da), Some(&db)) = (wave.distances.get(&a.id), wave.distances.get(&b.id)) else {
                continue;
            };
            if !a.can_propagate(EnergyType::Exciter) && !b.can_propagate(EnergyType::Exciter) {
                continue;
            }
            let mut distances = DistanceMap::new();
            distances.set(EnergyType::Exciter, (da + db) / 2);
            edge_distances.insert(edge.id.clone(), distances);
        }

        let mut dampener_edges = HashMap::new();
        for link in &dampening.links {
            dampener_edges.insert(
                link.edge.id.clone(),
                DampenerEdge { source: link.source.clone(), target: link.target.clone() },
            );
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            reached = wave.distances.len(),
            dampened = dampening.dampened.len(),
            "computed energy distances"
        );

        EnergyResult {
            node_distances,
            dampened_nodes: dampening.dampened.into_iter().cloned().collect(),
            dampener_edges,
            edge_distances,
            passes: wave.passes,
            truncated: wave.truncated,
        }
    }
}

/// [`EnergyDistanceCalculator::compute`] with the default configuration.
pub fn compute_energy_distances(nodes: &[Node], edges: &[Connection]) -> EnergyResult {
    EnergyDistanceCalculator::default().compute(nodes, edges)
}
