//! Storage abstraction for the graph seam
//!
//! These traits are the engine's only view of storage. They enable swapping
//! the in-memory implementation for a real graph database client without
//! touching the workflow layer.
//!
//! Transactions use a closure API: commit on `Ok`, full rollback on `Err`.
//! Callers observe complete success or no effect, never partial state.

use crate::graph::{Edge, EdgeKind, Node, NodeKind, Props};
use trellis_core::{EdgeId, NodeId, Result};

/// Read-only pattern access to the graph
///
/// All reads inside a transaction see that transaction's own writes.
pub trait GraphView {
    /// Fetch a node by id
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Fetch an edge by id
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn edge(&self, id: EdgeId) -> Result<Option<Edge>>;

    /// All edges of `kind` leaving `from`
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn edges_from(&self, from: NodeId, kind: EdgeKind) -> Result<Vec<Edge>>;

    /// All edges of `kind` arriving at `to`
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn edges_to(&self, to: NodeId, kind: EdgeKind) -> Result<Vec<Edge>>;

    /// All nodes of a kind
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>>;
}

/// Mutating access within a transaction
pub trait GraphTxn: GraphView {
    /// Create a node, returning its id
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    fn create_node(&mut self, kind: NodeKind, props: Props) -> Result<NodeId>;

    /// Replace a node's properties
    ///
    /// # Errors
    /// `NotFound` if the node does not exist.
    fn update_node(&mut self, id: NodeId, props: Props) -> Result<()>;

    /// Delete a node and every edge incident to it
    ///
    /// # Errors
    /// `NotFound` if the node does not exist.
    fn delete_node(&mut self, id: NodeId) -> Result<()>;

    /// Create an edge with a fresh id
    ///
    /// # Errors
    /// `NotFound` if either endpoint does not exist.
    fn create_edge(
        &mut self,
        kind: EdgeKind,
        from: NodeId,
        to: NodeId,
        props: Props,
    ) -> Result<EdgeId>;

    /// Create an edge reusing a caller-supplied id
    ///
    /// Used by the approval merge to restore relation edges under their
    /// remembered original ids.
    ///
    /// # Errors
    /// `NotFound` if either endpoint does not exist; `Conflict` if the id
    /// is already in use.
    fn create_edge_with_id(
        &mut self,
        id: EdgeId,
        kind: EdgeKind,
        from: NodeId,
        to: NodeId,
        props: Props,
    ) -> Result<()>;

    /// Delete an edge
    ///
    /// # Errors
    /// `NotFound` if the edge does not exist.
    fn delete_edge(&mut self, id: EdgeId) -> Result<()>;
}

/// Transactional property-graph store
///
/// Concurrency control is delegated entirely to the implementation's
/// transaction isolation; the engine adds no locking of its own.
pub trait GraphStore: Send + Sync {
    /// Run a read-only closure against a consistent view
    ///
    /// # Errors
    /// Propagates the closure's error.
    fn read<T>(&self, f: impl FnOnce(&dyn GraphView) -> Result<T>) -> Result<T>;

    /// Run a mutating closure inside one atomic transaction
    ///
    /// Commits if the closure returns `Ok`; otherwise every write is
    /// discarded and the error is returned unchanged.
    ///
    /// # Errors
    /// Propagates the closure's error.
    fn transaction<T>(&self, f: impl FnOnce(&mut dyn GraphTxn) -> Result<T>) -> Result<T>;
}
