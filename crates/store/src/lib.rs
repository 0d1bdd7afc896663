//! Graph storage seam for trellis
//!
//! This crate defines the transactional property-graph abstraction the
//! workflow engine runs against:
//! - `GraphStore` / `GraphTxn` / `GraphView`: the storage traits
//! - `Node` / `Edge` / `NodeKind` / `EdgeKind`: typed graph records
//! - `MemoryGraph`: in-memory implementation with atomic, serialized
//!   write transactions
//!
//! A production deployment would implement `GraphStore` over a real graph
//! database client; the engine is generic over the trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod memory;
pub mod traits;

pub use graph::{Edge, EdgeKind, Node, NodeKind, Props};
pub use memory::MemoryGraph;
pub use traits::{GraphStore, GraphTxn, GraphView};
