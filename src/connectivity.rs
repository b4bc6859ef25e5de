//! Connected-component search behind the "select connected" gestures.
//!
//! Traversal is undirected and only follows visible connections between
//! in-scope nodes. The walk uses an explicit stack, so graph depth never
//! touches the call stack.

use hashbrown::HashSet;

use crate::graph::AdjacencyMap;
use crate::model::{Connection, Node, NodeId};

/// Every node reachable from `start`, including `start` itself.
///
/// Returns an empty set when `start` is not among `nodes`.
pub fn find_connected_component(
    start: &NodeId,
    nodes: &[Node],
    edges: &[Connection],
) -> HashSet<NodeId> {
    let adjacency = AdjacencyMap::build_filtered(nodes, edges, |e| e.is_visible);
    let Some(start) = nodes.iter().map(|n| &n.id).find(|id| *id == start) else {
        return HashSet::new();
    };

    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        for next in adjacency.neighbors(current) {
            if !visited.contains(next) {
                stack.push(next);
            }
        }
    }

    visited.into_iter().cloned().collect()
}

/// The component of `start` without `start` itself, i.e. what a multi-select
/// adds on top of the primary selection.
pub fn find_connected_others(
    start: &NodeId,
    nodes: &[Node],
    edges: &[Connection],
) -> HashSet<NodeId> {
    let mut component = find_connected_component(start, nodes, edges);
    component.remove(start);
    component
}
