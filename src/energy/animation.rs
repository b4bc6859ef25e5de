//! Which connections should show flowing energy.
//!
//! A connection animates when it carries an exciter distance, except
//! between members of the same group: two nodes sharing a group, or a
//! group node and one of its members.

use hashbrown::HashMap;

use crate::model::{Connection, ConnectionId, Node, NodeId};
use super::EnergyResult;

fn same_group(a: &Node, b: &Node) -> bool {
    match (&a.belongs_to, &b.belongs_to) {
        (Some(ga), Some(gb)) if ga == gb => true,
        (Some(ga), _) if *ga == b.id => true,
        (_, Some(gb)) if *gb == a.id => true,
        _ => false,
    }
}

/// Connections to animate, in input order.
pub fn animated_connections(
    result: &EnergyResult,
    nodes: &[Node],
    edges: &[Connection],
) -> Vec<ConnectionId> {
    let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|n| (&n.id, n)).collect();

    edges
        .iter()
        .filter(|edge| result.edge_exciter_distance(&edge.id).is_some())
        .filter(|edge| match (by_id.get(&edge.entity1), by_id.get(&edge.entity2)) {
            (Some(a), Some(b)) => !same_group(a, b),
            _ => false,
        })
        .map(|edge| edge.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::compute_energy_distances;

    #[test]
    fn test_group_members_do_not_animate() {
        let nodes = vec![
            Node::circle("src", "doc").exciter().activated(),
            Node::circle("a", "doc").exciter().in_group("g"),
            Node::circle("b", "doc").exciter().in_group("g"),
            Node::circle("g", "doc").exciter(),
            Node::circle("far", "doc").exciter(),
        ];
        let edges = vec![
            Connection::new("src-a", "src", "a"),
            Connection::new("a-b", "a", "b"),
            Connection::new("b-g", "b", "g"),
            Connection::new("g-far", "g", "far"),
        ];
        let result = compute_energy_distances(&nodes, &edges);
        let animated = animated_connections(&result, &nodes, &edges);

        assert_eq!(animated, vec![ConnectionId::from("src-a"), ConnectionId::from("g-far")]);
    }

    #[test]
    fn test_nothing_animates_without_energy() {
        let nodes = vec![Node::circle("a", "doc").exciter(), Node::circle("b", "doc").exciter()];
        let edges = vec![Connection::new("ab", "a", "b")];
        let result = compute_energy_distances(&nodes, &edges);
        assert!(animated_connections(&result, &nodes, &edges).is_empty());
    }
}
