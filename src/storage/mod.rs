//! # Snapshot Provider
//!
//! The contract between the core and whatever holds the canvas state.
//! The core only ever reads: it asks for the nodes and connections of one
//! scope, computes, and hands results back to the caller.
//!
//! ## Implementations
//!
//! | Provider | Module | Description |
//! |----------|--------|-------------|
//! | `MemoryStore` | `memory` | Mutable in-memory canvas for embedding/testing |
//! | `Snapshot` | `model::snapshot` | A fixed snapshot, e.g. decoded from JSON |

pub mod memory;

use async_trait::async_trait;

use crate::model::{Scope, Snapshot};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// SnapshotProvider Trait
// ============================================================================

/// Source of scoped node/connection snapshots.
///
/// A scoped snapshot holds the nodes in the scope and the connections
/// touching at least one of them. Connections whose other endpoint lies
/// outside the scope are tolerated; the core drops them.
#[async_trait]
pub trait SnapshotProvider: Send + Sync + 'static {
    /// Nodes and connections of `scope`. An unknown scope yields an empty
    /// snapshot, not an error.
    async fn snapshot(&self, scope: &Scope) -> Result<Snapshot>;
}

#[async_trait]
impl SnapshotProvider for Snapshot {
    async fn snapshot(&self, scope: &Scope) -> Result<Snapshot> {
        Ok(self.scoped(scope))
    }
}
