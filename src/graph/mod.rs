//! # Adjacency
//!
//! Per-call adjacency map shared by the connectivity search and the energy
//! calculator. It borrows from the snapshot it was built from and is
//! rebuilt on every invocation; nothing is cached between calls.

use hashbrown::HashMap;

use crate::model::{Connection, Directionality, Node, NodeId};

// ============================================================================
// Adjacency
// ============================================================================

/// Neighbors of one node, in the order their connections were first seen.
#[derive(Debug, Default)]
pub struct Adjacency<'a> {
    neighbors: Vec<&'a NodeId>,
    /// neighbor → the connection linking it. A later connection between
    /// the same pair replaces an earlier one.
    edge_by_neighbor: HashMap<&'a NodeId, &'a Connection>,
}

impl<'a> Adjacency<'a> {
    fn link(&mut self, neighbor: &'a NodeId, edge: &'a Connection) {
        if self.edge_by_neighbor.insert(neighbor, edge).is_none() {
            self.neighbors.push(neighbor);
        }
    }

    pub fn neighbors(&self) -> impl Iterator<Item = &'a NodeId> + '_ {
        self.neighbors.iter().copied()
    }

    pub fn edge_to(&self, neighbor: &NodeId) -> Option<&'a Connection> {
        self.edge_by_neighbor.get(neighbor).copied()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

// ============================================================================
// AdjacencyMap
// ============================================================================

/// Undirected adjacency restricted to a node set.
#[derive(Debug, Default)]
pub struct AdjacencyMap<'a> {
    entries: HashMap<&'a NodeId, Adjacency<'a>>,
}

impl<'a> AdjacencyMap<'a> {
    /// Build from every connection whose endpoints are both in `nodes`.
    pub fn build(nodes: &'a [Node], edges: &'a [Connection]) -> Self {
        Self::build_filtered(nodes, edges, |_| true)
    }

    /// Build from the connections accepted by `keep` whose endpoints are
    /// both in `nodes`. Connections referencing unknown nodes are dropped.
    pub fn build_filtered<F>(nodes: &'a [Node], edges: &'a [Connection], keep: F) -> Self
    where
        F: Fn(&Connection) -> bool,
    {
        let mut entries: HashMap<&'a NodeId, Adjacency<'a>> = nodes
            .iter()
            .map(|n| (&n.id, Adjacency::default()))
            .collect();

        for edge in edges.iter().filter(|e| keep(e)) {
            if !entries.contains_key(&edge.entity1) || !entries.contains_key(&edge.entity2) {
                tracing::trace!(edge = %edge.id, "dropping connection with out-of-scope endpoint");
                continue;
            }
            if let Some(adj) = entries.get_mut(&edge.entity1) {
                adj.link(&edge.entity2, edge);
            }
            if let Some(adj) = entries.get_mut(&edge.entity2) {
                adj.link(&edge.entity1, edge);
            }
        }

        Self { entries }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Adjacency<'a>> {
        self.entries.get(id)
    }

    /// Neighbors of `id`; empty for unknown nodes.
    pub fn neighbors<'s>(&'s self, id: &NodeId) -> impl Iterator<Item = &'a NodeId> + use<'s, 'a> {
        self.entries.get(id).into_iter().flat_map(|adj| adj.neighbors())
    }

    pub fn edge_between(&self, a: &NodeId, b: &NodeId) -> Option<&'a Connection> {
        self.entries.get(a).and_then(|adj| adj.edge_to(b))
    }

    pub fn node_count(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// Flow permission
// ============================================================================

/// Whether energy may travel `from -> to` across `edge`.
///
/// A missing edge (an implicit relationship) never blocks. `Out` admits
/// only entity1 → entity2 and `In` only entity2 → entity1.
pub fn can_energy_flow(edge: Option<&Connection>, from: &NodeId, to: &NodeId) -> bool {
    let Some(edge) = edge else {
        return true;
    };
    match edge.directionality {
        Directionality::None | Directionality::Both => true,
        Directionality::Out => *from == edge.entity1 && *to == edge.entity2,
        Directionality::In => *from == edge.entity2 && *to == edge.entity1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| Node::circle(*id, "doc")).collect()
    }

    #[test]
    fn test_build_drops_out_of_scope_edges() {
        let nodes = nodes(&["a", "b"]);
        let edges = vec![Connection::new("ab", "a", "b"), Connection::new("ax", "a", "x")];
        let adj = AdjacencyMap::build(&nodes, &edges);

        let a: Vec<_> = adj.neighbors(&"a".into()).cloned().collect();
        assert_eq!(a, vec![NodeId::from("b")]);
        assert!(!adj.contains(&"x".into()));
        assert_eq!(adj.node_count(), 2);
    }

    #[test]
    fn test_isolated_node_has_empty_entry() {
        let nodes = nodes(&["a"]);
        let adj = AdjacencyMap::build(&nodes, &[]);
        assert!(adj.get(&"a".into()).is_some_and(|e| e.is_empty()));
    }

    #[test]
    fn test_parallel_edges_keep_last() {
        let nodes = nodes(&["a", "b"]);
        let edges = vec![Connection::new("first", "a", "b"), Connection::new("second", "b", "a")];
        let adj = AdjacencyMap::build(&nodes, &edges);

        assert_eq!(adj.get(&"a".into()).map(|e| e.len()), Some(1));
        assert_eq!(adj.edge_between(&"a".into(), &"b".into()).map(|e| e.id.0.as_str()), Some("second"));
    }

    #[test]
    fn test_filtered_build() {
        let nodes = nodes(&["a", "b"]);
        let edges = vec![Connection::new("ab", "a", "b").hidden()];
        let adj = AdjacencyMap::build_filtered(&nodes, &edges, |e| e.is_visible);
        assert_eq!(adj.neighbors(&"a".into()).count(), 0);
    }

    #[test]
    fn test_flow_rules() {
        let a = NodeId::from("a");
        let b = NodeId::from("b");
        let both = Connection::new("e", "a", "b").with_directionality(Directionality::Both);
        let out = Connection::new("e", "a", "b").with_directionality(Directionality::Out);
        let inward = Connection::new("e", "a", "b").with_directionality(Directionality::In);

        assert!(can_energy_flow(None, &a, &b));
        assert!(can_energy_flow(Some(&both), &b, &a));
        assert!(can_energy_flow(Some(&out), &a, &b));
        assert!(!can_energy_flow(Some(&out), &b, &a));
        assert!(can_energy_flow(Some(&inward), &b, &a));
        assert!(!can_energy_flow(Some(&inward), &a, &b));
    }
}
