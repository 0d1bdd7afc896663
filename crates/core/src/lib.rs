//! Core types for the trellis content workflow engine
//!
//! This crate defines the foundational types used throughout the system:
//! - NodeId / EdgeId / UserId: identifiers
//! - ItemStatus, Position: content lifecycle and hierarchy position
//! - Grant / GrantSet / Actor: the tagged capability model
//! - RelationRef: committed vs pending relationship references
//! - Error: the caller-visible error taxonomy
//! - ChunkedField: oversized-field codec
//! - change_spans / is_minor: the minor-edit heuristic
//! - Limits: frozen size and depth constants

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod classifier;
pub mod diff;
pub mod error;
pub mod limits;
pub mod types;

pub use chunk::ChunkedField;
pub use classifier::{is_minor, is_minor_with, MinorEditConfig};
pub use diff::{change_spans, ChangeSpan};
pub use error::{Error, Result};
pub use limits::{Limits, DEFAULT_CHUNK_LIMIT, DEFAULT_DEEP_LEVEL, DEFAULT_HISTORY_PAGE};
pub use types::{
    Actor, DetailFields, EdgeId, Grant, GrantSet, ItemFields, ItemStatus, MutationAction, NodeId,
    Position, RelationRef, UserId, DOMAIN_ROOT_LEVEL, ROOT_LEVEL,
};
