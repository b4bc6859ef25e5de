//! # Canvas Model
//!
//! Plain data for circles, squares and the connections between them.
//! These types cross every boundary: store ↔ core ↔ rendering layer.
//!
//! Nothing here performs I/O or holds state between calls.

pub mod node;
pub mod connection;
pub mod snapshot;

pub use node::{
    Node, NodeId, NodeKind, DocumentId, Container,
    Activation, EnergyType, EnergyTypes,
};
pub use connection::{Connection, ConnectionId, Directionality};
pub use snapshot::{Snapshot, Scope};
