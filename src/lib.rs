//! Trellis - Hierarchical content workflow engine
//!
//! Trellis manages a tree of content items over a transactional graph
//! store: capability-based permissions, automatic version archiving,
//! a pending-suggestion workflow with moderated approval, transparent
//! chunking of oversized text fields, and a minor-edit classifier that
//! keeps small fixes fast for trusted-but-limited roles.
//!
//! # Quick Start
//!
//! ```ignore
//! use trellis::{Actor, Engine, Grant, GrantSet, MemoryGraph, NewItem, UserId};
//!
//! let engine = Engine::new(MemoryGraph::new());
//! let admin = UserId::new();
//! let root = engine.bootstrap_root("root", admin)?;
//!
//! let actor = Actor::new(admin, GrantSet::from_grants([Grant::Superuser]));
//! let outcome = engine.create(
//!     root,
//!     &actor,
//!     NewItem {
//!         title: "Physical".into(),
//!         ..Default::default()
//!     },
//! )?;
//! ```
//!
//! # Architecture
//!
//! The [`Engine`] wraps a [`GraphStore`] implementation and runs every
//! mutation inside one atomic transaction. Storage is a seam: the bundled
//! [`MemoryGraph`] serves tests and embedding, and any transactional
//! property-graph client can stand in behind the same traits.

pub use trellis_core::{
    is_minor, is_minor_with, Actor, ChunkedField, DetailFields, Error, Grant, GrantSet, ItemFields,
    ItemStatus, Limits, MinorEditConfig, MutationAction, NodeId, Position, RelationRef, Result,
    UserId,
};
pub use trellis_engine::{
    ApprovalOutcome, Engine, EngineConfig, ItemView, MutationDecision, MutationOutcome, NewItem,
    OutcomeStatus, ReadAccess,
};
pub use trellis_store::{
    Edge, EdgeKind, GraphStore, GraphTxn, GraphView, MemoryGraph, Node, NodeKind, Props,
};
