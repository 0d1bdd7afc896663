//! Hierarchical content workflow engine
//!
//! Orchestrates the edit workflow over a transactional graph store:
//! position resolution, the permission matrix, version archiving, the
//! pending-suggestion path, and approval processing. The storage seam is
//! the `trellis-store` trait layer; everything here is storage-agnostic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod approval;
pub mod archive;
pub mod config;
mod engine;
pub mod item;
pub mod permissions;
pub mod resolver;
pub mod workflow;

pub use approval::{ApprovalOutcome, ApprovalProcessor};
pub use config::EngineConfig;
pub use engine::Engine;
pub use item::{ItemRecord, ItemView};
pub use permissions::{MutationDecision, PermissionEngine, ReadAccess};
pub use workflow::{EditWorkflow, MutationOutcome, NewItem, OutcomeStatus};
