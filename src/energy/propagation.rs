//! Wave propagation.
//!
//! Breadth-first by increasing distance, two units per hop. Each pass
//! expands the nodes sitting exactly at the current distance; the loop
//! ends on the first pass that changes nothing or when the pass cap is
//! reached.

use hashbrown::{HashMap, HashSet};

use crate::graph::{AdjacencyMap, can_energy_flow};
use crate::model::{EnergyType, Node, NodeId};
use super::HOP;

#[derive(Debug, Default)]
pub(super) struct Wave<'a> {
    pub distances: HashMap<&'a NodeId, u32>,
    pub passes: usize,
    /// The pass cap stopped the loop while it was still making progress.
    pub truncated: bool,
}

pub(super) fn propagate<'a>(
    ty: EnergyType,
    nodes: &'a [Node],
    adjacency: &AdjacencyMap<'a>,
    dampened: &HashSet<&'a NodeId>,
    max_passes: usize,
) -> Wave<'a> {
    let by_id: HashMap<&'a NodeId, &'a Node> = nodes.iter().map(|n| (&n.id, n)).collect();
    let mut wave = Wave::default();

    for node in nodes {
        if node.is_active_source(ty) && !dampened.contains(&node.id) {
            wave.distances.insert(&node.id, 0);
        }
    }

    let mut current = 0u32;
    loop {
        if wave.passes >= max_passes {
            wave.truncated = true;
            tracing::warn!(
                energy = %ty,
                passes = wave.passes,
                reached = wave.distances.len(),
                "propagation hit its pass cap; returning partial distances"
            );
            break;
        }
        wave.passes += 1;

        let frontier: Vec<&'a NodeId> = nodes
            .iter()
            .map(|n| &n.id)
            .filter(|id| wave.distances.get(*id) == Some(&current))
            .collect();

        let next_distance = current + HOP;
        let mut changed = false;

        for id in frontier {
            if dampened.contains(id) {
                continue;
            }
            let Some(node) = by_id.get(id) else { continue };
            if !node.can_propagate(ty) {
                continue;
            }

            for next in adjacency.neighbors(id) {
                if dampened.contains(next) {
                    continue;
                }
                if !can_energy_flow(adjacency.edge_between(id, next), id, next) {
                    continue;
                }
                let closer = wave.distances.get(next).is_none_or(|&d| d > next_distance);
                if closer {
                    wave.distances.insert(next, next_distance);
                    changed = true;
                }
            }
        }

        current = next_distance;
        if !changed {
            break;
        }
    }

    tracing::debug!(
        energy = %ty,
        passes = wave.passes,
        reached = wave.distances.len(),
        "propagation finished"
    );

    wave
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Connection;

    fn chain(len: usize) -> (Vec<Node>, Vec<Connection>) {
        let nodes = (0..len)
            .map(|i| {
                let node = Node::circle(format!("n{i}"), "doc").exciter();
                if i == 0 { node.activated() } else { node }
            })
            .collect();
        let edges = (1..len)
            .map(|i| Connection::new(format!("e{i}"), format!("n{}", i - 1), format!("n{i}")))
            .collect();
        (nodes, edges)
    }

    #[test]
    fn test_chain_distances() {
        let (nodes, edges) = chain(4);
        let adj = AdjacencyMap::build(&nodes, &edges);
        let wave = propagate(EnergyType::Exciter, &nodes, &adj, &HashSet::new(), 100);

        for (i, node) in nodes.iter().enumerate() {
            assert_eq!(wave.distances.get(&node.id), Some(&(i as u32 * 2)));
        }
        assert!(!wave.truncated);
        // three productive passes plus the one that found nothing new
        assert_eq!(wave.passes, 4);
    }

    #[test]
    fn test_no_sources_single_pass() {
        let nodes = vec![Node::circle("a", "doc").exciter()];
        let adj = AdjacencyMap::build(&nodes, &[]);
        let wave = propagate(EnergyType::Exciter, &nodes, &adj, &HashSet::new(), 100);
        assert!(wave.distances.is_empty());
        assert_eq!(wave.passes, 1);
    }

    #[test]
    fn test_cap_truncates() {
        let (nodes, edges) = chain(10);
        let adj = AdjacencyMap::build(&nodes, &edges);
        let wave = propagate(EnergyType::Exciter, &nodes, &adj, &HashSet::new(), 3);

        assert!(wave.truncated);
        assert_eq!(wave.passes, 3);
        assert_eq!(wave.distances.get(&NodeId::from("n3")), Some(&6));
        assert_eq!(wave.distances.get(&NodeId::from("n4")), None);
    }

    #[test]
    fn test_inert_node_stops_wave() {
        let (mut nodes, edges) = chain(3);
        nodes[1] = nodes[1].clone().inert();
        let adj = AdjacencyMap::build(&nodes, &edges);
        let wave = propagate(EnergyType::Exciter, &nodes, &adj, &HashSet::new(), 100);

        assert_eq!(wave.distances.get(&NodeId::from("n1")), Some(&2));
        assert_eq!(wave.distances.get(&NodeId::from("n2")), None);
    }

    #[test]
    fn test_shortest_distance_wins() {
        // a - b - c - d and a - d: d is one hop from a.
        let nodes: Vec<Node> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| Node::circle(*id, "doc").exciter())
            .map(|n| if n.id.0 == "a" { n.activated() } else { n })
            .collect();
        let edges = vec![
            Connection::new("ab", "a", "b"),
            Connection::new("bc", "b", "c"),
            Connection::new("cd", "c", "d"),
            Connection::new("ad", "a", "d"),
        ];
        let adj = AdjacencyMap::build(&nodes, &edges);
        let wave = propagate(EnergyType::Exciter, &nodes, &adj, &HashSet::new(), 100);

        assert_eq!(wave.distances.get(&NodeId::from("d")), Some(&2));
        assert_eq!(wave.distances.get(&NodeId::from("c")), Some(&4));
    }
}
