//! In-memory canvas store.
//!
//! This is the reference implementation of `SnapshotProvider`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No history**: every mutation is applied immediately; there is no
//!   undo and no persistence.
//! - **Per-collection locks**: multi-step edits (e.g. detach-delete) are
//!   not atomic with respect to concurrent readers. A snapshot taken in
//!   the middle may still list a connection whose node is already gone,
//!   which the core tolerates.
//!
//! Snapshots are sorted by id so repeated computations see the same input
//! order.
//!
//! Lock order is always nodes, then connections, then adjacency.

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::{Error, Result};
use super::SnapshotProvider;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory canvas state. Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    nodes: RwLock<HashMap<NodeId, Node>>,
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    /// node id → ids of connections touching it
    adjacency: RwLock<HashMap<NodeId, Vec<ConnectionId>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding everything in `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let store = Self::new();
        for node in snapshot.nodes {
            store.insert_node(node)?;
        }
        for connection in snapshot.connections {
            store.insert_connection(connection)?;
        }
        Ok(store)
    }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    pub fn insert_node(&self, node: Node) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        if nodes.contains_key(&node.id) {
            return Err(Error::ConstraintViolation(format!("Node {} already exists", node.id)));
        }
        self.inner.adjacency.write().insert(node.id.clone(), Vec::new());
        nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn get_node(&self, id: &NodeId) -> Option<Node> {
        self.inner.nodes.read().get(id).cloned()
    }

    fn update_node<F>(&self, id: &NodeId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Node),
    {
        let mut nodes = self.inner.nodes.write();
        let node = nodes.get_mut(id).ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
        f(node);
        Ok(())
    }

    pub fn set_activation(&self, id: &NodeId, activation: Option<Activation>) -> Result<()> {
        self.update_node(id, |node| node.activation = activation)
    }

    pub fn set_energy_types(&self, id: &NodeId, energy_types: EnergyTypes) -> Result<()> {
        self.update_node(id, |node| node.energy_types = energy_types)
    }

    pub fn set_group(&self, id: &NodeId, group: Option<NodeId>) -> Result<()> {
        self.update_node(id, |node| node.belongs_to = group)
    }

    /// Delete a node. Returns true if it existed.
    /// Fails while the node still has connections.
    pub fn delete_node(&self, id: &NodeId) -> Result<bool> {
        let mut nodes = self.inner.nodes.write();
        let mut adj = self.inner.adjacency.write();
        if let Some(conns) = adj.get(id) {
            if !conns.is_empty() {
                return Err(Error::ConstraintViolation(format!(
                    "Cannot delete node {id} with {} connections. Delete connections first.",
                    conns.len()
                )));
            }
        }

        adj.remove(id);
        Ok(nodes.remove(id).is_some())
    }

    /// Delete a node together with all of its connections.
    pub fn detach_delete_node(&self, id: &NodeId) -> Result<bool> {
        let conns = self.inner.adjacency.read().get(id).cloned().unwrap_or_default();
        for conn in &conns {
            self.delete_connection(conn)?;
        }
        self.delete_node(id)
    }

    // ========================================================================
    // Connection CRUD
    // ========================================================================

    /// Add a connection. Both endpoints must already exist.
    ///
    /// The node map stays read-locked until the connection is recorded, so
    /// a concurrent `delete_node` cannot strand it.
    pub fn insert_connection(&self, connection: Connection) -> Result<()> {
        let nodes = self.inner.nodes.read();
        if !nodes.contains_key(&connection.entity1) {
            return Err(Error::NotFound(format!("Node {}", connection.entity1)));
        }
        if !nodes.contains_key(&connection.entity2) {
            return Err(Error::NotFound(format!("Node {}", connection.entity2)));
        }

        let mut conns = self.inner.connections.write();
        if conns.contains_key(&connection.id) {
            return Err(Error::ConstraintViolation(format!(
                "Connection {} already exists",
                connection.id
            )));
        }

        let mut adj = self.inner.adjacency.write();
        adj.entry(connection.entity1.clone()).or_default().push(connection.id.clone());
        if connection.entity1 != connection.entity2 {
            adj.entry(connection.entity2.clone()).or_default().push(connection.id.clone());
        }
        conns.insert(connection.id.clone(), connection);
        Ok(())
    }

    pub fn get_connection(&self, id: &ConnectionId) -> Option<Connection> {
        self.inner.connections.read().get(id).cloned()
    }

    fn update_connection<F>(&self, id: &ConnectionId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Connection),
    {
        let mut conns = self.inner.connections.write();
        let conn = conns.get_mut(id).ok_or_else(|| Error::NotFound(format!("Connection {id}")))?;
        f(conn);
        Ok(())
    }

    pub fn set_directionality(&self, id: &ConnectionId, directionality: Directionality) -> Result<()> {
        self.update_connection(id, |conn| conn.directionality = directionality)
    }

    pub fn set_visibility(&self, id: &ConnectionId, is_visible: bool) -> Result<()> {
        self.update_connection(id, |conn| conn.is_visible = is_visible)
    }

    /// Delete a connection. Returns true if it existed.
    pub fn delete_connection(&self, id: &ConnectionId) -> Result<bool> {
        let removed = self.inner.connections.write().remove(id);
        if let Some(conn) = &removed {
            let mut adj = self.inner.adjacency.write();
            for end in [&conn.entity1, &conn.entity2] {
                if let Some(conns) = adj.get_mut(end) {
                    conns.retain(|cid| cid != id);
                }
            }
        }
        Ok(removed.is_some())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.read().len()
    }
}

// ============================================================================
// SnapshotProvider impl
// ============================================================================

#[async_trait]
impl SnapshotProvider for MemoryStore {
    async fn snapshot(&self, scope: &Scope) -> Result<Snapshot> {
        let mut nodes: Vec<Node> = self
            .inner
            .nodes
            .read()
            .values()
            .filter(|n| scope.contains(n))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let connections: Vec<Connection> = {
            let conns = self.inner.connections.read();
            let adj = self.inner.adjacency.read();
            let mut ids: Vec<&ConnectionId> = nodes
                .iter()
                .filter_map(|n| adj.get(&n.id))
                .flatten()
                .collect();
            ids.sort();
            ids.dedup();
            ids.into_iter().filter_map(|id| conns.get(id).cloned()).collect()
        };

        Ok(Snapshot { nodes, connections })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_pair() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_node(Node::circle("a", "doc")).unwrap();
        store.insert_node(Node::circle("b", "doc")).unwrap();
        store.insert_connection(Connection::new("ab", "a", "b")).unwrap();
        store
    }

    #[test]
    fn test_insert_and_get_node() {
        let store = MemoryStore::new();
        store.insert_node(Node::circle("a", "doc").exciter()).unwrap();

        let node = store.get_node(&"a".into()).unwrap();
        assert!(node.has_energy(EnergyType::Exciter));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let store = MemoryStore::new();
        store.insert_node(Node::circle("a", "doc")).unwrap();
        assert!(matches!(
            store.insert_node(Node::circle("a", "doc")),
            Err(Error::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_connection_requires_endpoints() {
        let store = MemoryStore::new();
        store.insert_node(Node::circle("a", "doc")).unwrap();
        assert!(matches!(
            store.insert_connection(Connection::new("ax", "a", "x")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_cannot_delete_connected_node() {
        let store = store_with_pair();
        assert!(store.delete_node(&"a".into()).is_err());
    }

    #[test]
    fn test_detach_delete_node() {
        let store = store_with_pair();
        assert!(store.detach_delete_node(&"a".into()).unwrap());
        assert!(store.get_node(&"a".into()).is_none());
        assert_eq!(store.connection_count(), 0);
        // b is now free to go
        assert!(store.delete_node(&"b".into()).unwrap());
    }

    #[test]
    fn test_update_connection() {
        let store = store_with_pair();
        let id = ConnectionId::from("ab");
        store.set_directionality(&id, Directionality::In).unwrap();
        store.set_visibility(&id, false).unwrap();

        let conn = store.get_connection(&id).unwrap();
        assert_eq!(conn.directionality, Directionality::In);
        assert!(!conn.is_visible);
        assert!(store.set_visibility(&"missing".into(), true).is_err());
    }

    #[test]
    fn test_update_missing_node() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set_activation(&"nope".into(), Some(Activation::Activated)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_node_after_connection_removed() {
        let store = store_with_pair();
        assert!(store.delete_connection(&"ab".into()).unwrap());
        assert!(!store.delete_connection(&"ab".into()).unwrap());
        assert!(store.delete_node(&"a".into()).unwrap());
        assert!(!store.delete_node(&"a".into()).unwrap());
        assert!(matches!(
            store.insert_connection(Connection::new("ab", "a", "b")),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_writes_and_snapshots_interleave() {
        let store = store_with_pair();
        let scope = Scope::Document("doc".into());

        let writer = {
            let store = store.clone();
            tokio::task::spawn_blocking(move || {
                for i in 0..5_000 {
                    let id = ConnectionId::from(format!("w{i}"));
                    store.insert_connection(Connection::new(id.clone(), "a", "b")).unwrap();
                    store.delete_connection(&id).unwrap();
                }
            })
        };
        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..5_000 {
                    let snap = store.snapshot(&scope).await.unwrap();
                    assert_eq!(snap.nodes.len(), 2);
                    assert!(snap.connections.iter().any(|c| c.id.0 == "ab"));
                }
            })
        };

        let both = async {
            writer.await.unwrap();
            reader.await.unwrap();
        };
        tokio::time::timeout(std::time::Duration::from_secs(60), both)
            .await
            .expect("writer and reader did not finish");
        assert_eq!(store.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_scoped_and_sorted() {
        let store = MemoryStore::new();
        store.insert_node(Node::circle("c", "doc")).unwrap();
        store.insert_node(Node::circle("a", "doc")).unwrap();
        store.insert_node(Node::circle("b", "other")).unwrap();
        store.insert_node(Node::square("s1", "a")).unwrap();
        store.insert_connection(Connection::new("z", "a", "c")).unwrap();
        store.insert_connection(Connection::new("y", "c", "b")).unwrap();
        store.insert_connection(Connection::new("x", "a", "s1")).unwrap();

        let snap = store.snapshot(&Scope::Document("doc".into())).await.unwrap();
        let node_ids: Vec<&str> = snap.nodes.iter().map(|n| n.id.0.as_str()).collect();
        let conn_ids: Vec<&str> = snap.connections.iter().map(|c| c.id.0.as_str()).collect();
        assert_eq!(node_ids, vec!["a", "c"]);
        assert_eq!(conn_ids, vec!["x", "y", "z"]);

        let squares = store.snapshot(&Scope::Circle("a".into())).await.unwrap();
        assert_eq!(squares.nodes.len(), 1);

        let empty = store.snapshot(&Scope::Document("nowhere".into())).await.unwrap();
        assert!(empty.is_empty());
    }
}
