//! Snapshot: the node and connection lists handed to the core.

use serde::{Deserialize, Serialize};
use hashbrown::HashSet;

use super::{Connection, Container, DocumentId, Node, NodeId};
use crate::Result;

/// Which nodes take part in a computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// The circles of one document.
    Document(DocumentId),
    /// The squares attached to one circle.
    Circle(NodeId),
}

impl Scope {
    pub fn contains(&self, node: &Node) -> bool {
        match (self, &node.container) {
            (Scope::Document(doc), Container::Document(owner)) => doc == owner,
            (Scope::Circle(circle), Container::Circle(owner)) => circle == owner,
            _ => false,
        }
    }
}

/// Nodes and connections of one scope at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self { nodes, connections }
    }

    /// Decode a snapshot serialized by the rendering layer.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restrict to the nodes in `scope` and the connections touching at
    /// least one of them.
    pub fn scoped(&self, scope: &Scope) -> Snapshot {
        let nodes: Vec<Node> = self.nodes.iter().filter(|n| scope.contains(n)).cloned().collect();
        let connections = {
            let ids: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
            self.connections
                .iter()
                .filter(|c| ids.contains(&c.entity1) || ids.contains(&c.entity2))
                .cloned()
                .collect()
        };
        Snapshot { nodes, connections }
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
