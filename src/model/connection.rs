//! Connection (edge) between two nodes.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Opaque connection identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        ConnectionId(s.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        ConnectionId(s)
    }
}

/// Flow constraint of a connection, relative to its stored
/// `entity1 -> entity2` orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directionality {
    #[default]
    None,
    Both,
    /// entity1 -> entity2 only.
    Out,
    /// entity2 -> entity1 only.
    In,
}

fn visible_by_default() -> bool {
    true
}

/// A connection between two nodes. Endpoint order matters for
/// [`Directionality::Out`] and [`Directionality::In`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    #[serde(rename = "entity1Id")]
    pub entity1: NodeId,
    #[serde(rename = "entity2Id")]
    pub entity2: NodeId,
    #[serde(default)]
    pub directionality: Directionality,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
}

impl Connection {
    pub fn new(id: impl Into<ConnectionId>, entity1: impl Into<NodeId>, entity2: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            entity1: entity1.into(),
            entity2: entity2.into(),
            directionality: Directionality::None,
            is_visible: true,
        }
    }

    pub fn with_directionality(mut self, directionality: Directionality) -> Self {
        self.directionality = directionality;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }
}
