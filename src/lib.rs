//! # chakra-graph — Energy & Connectivity Core for Chakra Canvases
//!
//! The graph logic behind a diagramming canvas of circles (concepts) and
//! squares (attributes): which nodes are connected, and how far exciter
//! energy travels from activated sources before dampeners silence it.
//!
//! ## Design Principles
//!
//! 1. **Pure core**: `connectivity` and `energy` are functions of a
//!    snapshot; no state survives between calls
//! 2. **Trait-first**: `SnapshotProvider` is the contract between the core
//!    and whatever holds the canvas
//! 3. **Degrade, don't fail**: bad references are dropped and runaway
//!    propagation is capped; the algorithms never return errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chakra_graph::{Canvas, Connection, Node, Scope};
//!
//! # async fn example() -> chakra_graph::Result<()> {
//! let canvas = Canvas::open_memory();
//! canvas.store().insert_node(Node::circle("root", "doc").exciter().activated())?;
//! canvas.store().insert_node(Node::circle("heart", "doc").exciter())?;
//! canvas.store().insert_connection(Connection::new("c1", "root", "heart"))?;
//!
//! let energy = canvas.energy(&Scope::Document("doc".into())).await?;
//! assert_eq!(energy.label(&"heart".into()).as_deref(), Some("e:2"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod graph;
pub mod connectivity;
pub mod energy;
pub mod storage;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Node, NodeId, NodeKind, DocumentId, Container,
    Activation, EnergyType, EnergyTypes,
    Connection, ConnectionId, Directionality,
    Snapshot, Scope,
};

// ============================================================================
// Re-exports: Algorithms
// ============================================================================

pub use connectivity::{find_connected_component, find_connected_others};
pub use energy::{
    EnergyDistanceCalculator, EnergyConfig, EnergyResult,
    DistanceMap, DampenerEdge,
    compute_energy_distances, format_for_display, animated_connections,
};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{SnapshotProvider, MemoryStore};

use hashbrown::HashSet;

// ============================================================================
// Top-level Canvas handle
// ============================================================================

/// The primary entry point. A `Canvas` wraps a snapshot provider and runs
/// the core over fresh snapshots on demand.
pub struct Canvas<S: SnapshotProvider> {
    store: S,
    calculator: EnergyDistanceCalculator,
}

impl<S: SnapshotProvider> Canvas<S> {
    /// Create a Canvas over the given provider.
    pub fn with_store(store: S) -> Self {
        Self { store, calculator: EnergyDistanceCalculator::default() }
    }

    pub fn with_config(store: S, config: EnergyConfig) -> Self {
        Self { store, calculator: EnergyDistanceCalculator::new(config) }
    }

    /// Energy distances and dampening for one scope.
    pub async fn energy(&self, scope: &Scope) -> Result<EnergyResult> {
        let snapshot = self.store.snapshot(scope).await?;
        Ok(self.calculator.compute_snapshot(&snapshot))
    }

    /// Everything connected to `start` within `scope`, `start` included.
    pub async fn select_connected(&self, scope: &Scope, start: &NodeId) -> Result<HashSet<NodeId>> {
        let snapshot = self.store.snapshot(scope).await?;
        Ok(find_connected_component(start, &snapshot.nodes, &snapshot.connections))
    }

    /// Like [`Canvas::select_connected`] without `start` itself.
    pub async fn select_connected_others(&self, scope: &Scope, start: &NodeId) -> Result<HashSet<NodeId>> {
        let snapshot = self.store.snapshot(scope).await?;
        Ok(find_connected_others(start, &snapshot.nodes, &snapshot.connections))
    }

    /// Connections in `scope` that should show flowing energy.
    pub async fn animated_connections(&self, scope: &Scope) -> Result<Vec<ConnectionId>> {
        let snapshot = self.store.snapshot(scope).await?;
        let result = self.calculator.compute_snapshot(&snapshot);
        Ok(animated_connections(&result, &snapshot.nodes, &snapshot.connections))
    }

    /// Access the underlying provider.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn calculator(&self) -> &EnergyDistanceCalculator {
        &self.calculator
    }
}

/// In-memory canvas for testing and embedding.
impl Canvas<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Snapshot decode error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
