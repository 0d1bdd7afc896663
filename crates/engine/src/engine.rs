//! Engine facade
//!
//! One value owning the store and the workflow machinery. Every public
//! mutation opens a single transaction around the corresponding workflow
//! or approval operation; every read checks the actor's read grants before
//! touching the graph.

use tracing::info;

use trellis_core::{
    Actor, DetailFields, Error, ItemFields, ItemStatus, NodeId, Position, RelationRef, Result,
    UserId,
};
use trellis_store::{EdgeKind, GraphStore, NodeKind};

use crate::approval::{ApprovalOutcome, ApprovalProcessor};
use crate::archive;
use crate::config::EngineConfig;
use crate::item::{load_details, load_item, load_relations, ItemRecord, ItemView};
use crate::resolver::resolve;
use crate::workflow::{EditWorkflow, MutationOutcome, NewItem};

/// The content workflow engine over a transactional graph store
pub struct Engine<S: GraphStore> {
    store: S,
    config: EngineConfig,
    workflow: EditWorkflow,
    approvals: ApprovalProcessor,
}

impl<S: GraphStore> Engine<S> {
    /// Engine with production defaults
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Engine with explicit configuration
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        let workflow = EditWorkflow::new(config.limits.clone(), config.classifier.clone());
        let approvals = ApprovalProcessor::new(workflow.permissions().clone());
        Engine {
            store,
            config,
            workflow,
            approvals,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the absolute root
    ///
    /// Runs once per graph, before any actor exists, so it takes a bare
    /// creator id instead of an [`Actor`].
    ///
    /// # Errors
    /// `Conflict` if a live root already exists.
    pub fn bootstrap_root(&self, title: &str, creator: UserId) -> Result<NodeId> {
        if title.trim().is_empty() {
            return Err(Error::invalid_input("title must not be empty"));
        }
        let id = self.store.transaction(|txn| {
            for node in txn.nodes_by_kind(NodeKind::Item)? {
                let record = ItemRecord::from_node(&node)?;
                if record.status == ItemStatus::Archived {
                    continue;
                }
                if !txn.edges_to(node.id, EdgeKind::Child)?.is_empty() {
                    continue;
                }
                if !txn.edges_from(node.id, EdgeKind::Pending)?.is_empty() {
                    continue;
                }
                return Err(Error::Conflict(format!("root {} already exists", node.id)));
            }
            let record = ItemRecord::new(
                title.to_string(),
                "",
                None,
                "",
                creator,
                self.config.limits.chunk_limit,
            )?;
            txn.create_node(NodeKind::Item, record.to_props()?)
        })?;
        info!(%id, "bootstrapped root");
        Ok(id)
    }

    /// Create an item under `parent`
    ///
    /// # Errors
    /// See [`EditWorkflow::create`].
    pub fn create(&self, parent: NodeId, actor: &Actor, item: NewItem) -> Result<MutationOutcome> {
        let outcome = self
            .store
            .transaction(|txn| self.workflow.create(txn, parent, actor, item))?;
        info!(id = %outcome.id, status = ?outcome.status, actor = %actor.id, "create");
        Ok(outcome)
    }

    /// Patch an item's fields
    ///
    /// # Errors
    /// See [`EditWorkflow::patch`].
    pub fn patch(&self, item: NodeId, actor: &Actor, fields: &ItemFields) -> Result<MutationOutcome> {
        let outcome = self
            .store
            .transaction(|txn| self.workflow.patch(txn, item, actor, fields))?;
        info!(id = %outcome.id, status = ?outcome.status, actor = %actor.id, "patch");
        Ok(outcome)
    }

    /// Delete an item and its subtree
    ///
    /// # Errors
    /// See [`EditWorkflow::delete`].
    pub fn delete(&self, item: NodeId, actor: &Actor) -> Result<MutationOutcome> {
        let outcome = self
            .store
            .transaction(|txn| self.workflow.delete(txn, item, actor))?;
        info!(id = %outcome.id, actor = %actor.id, "delete");
        Ok(outcome)
    }

    /// Re-parent an item
    ///
    /// # Errors
    /// See [`EditWorkflow::move_item`].
    pub fn move_item(&self, item: NodeId, new_parent: NodeId, actor: &Actor) -> Result<MutationOutcome> {
        let outcome = self
            .store
            .transaction(|txn| self.workflow.move_item(txn, item, new_parent, actor))?;
        info!(id = %outcome.id, %new_parent, actor = %actor.id, "move");
        Ok(outcome)
    }

    /// Approve a pending shadow, merging it into its target
    ///
    /// # Errors
    /// See [`ApprovalProcessor::approve`].
    pub fn approve(&self, shadow: NodeId, approver: &Actor) -> Result<ApprovalOutcome> {
        let outcome = self
            .store
            .transaction(|txn| self.approvals.approve(txn, shadow, approver))?;
        info!(shadow = %outcome.id, original = %outcome.original_id, actor = %approver.id, "approve");
        Ok(outcome)
    }

    /// Reject a pending shadow, discarding it
    ///
    /// # Errors
    /// See [`ApprovalProcessor::reject`].
    pub fn reject(&self, shadow: NodeId, approver: &Actor) -> Result<ApprovalOutcome> {
        let outcome = self
            .store
            .transaction(|txn| self.approvals.reject(txn, shadow, approver))?;
        info!(shadow = %outcome.id, original = %outcome.original_id, actor = %approver.id, "reject");
        Ok(outcome)
    }

    /// Fetch one item
    ///
    /// # Errors
    /// `PermissionDenied` without the read grant; `NotFound` if absent.
    pub fn item(&self, id: NodeId, actor: &Actor) -> Result<ItemView> {
        self.ensure_read(actor)?;
        self.store.read(|view| {
            let (_, record) = load_item(view, id)?;
            ItemView::from_record(id, &record)
        })
    }

    /// Fetch an item's ordered details
    ///
    /// # Errors
    /// `PermissionDenied` without the read grant; `NotFound` if absent.
    pub fn details(&self, id: NodeId, actor: &Actor) -> Result<Vec<DetailFields>> {
        self.ensure_read(actor)?;
        self.store.read(|view| {
            load_item(view, id)?;
            load_details(view, id)
        })
    }

    /// Fetch an item's relationship statements
    ///
    /// # Errors
    /// `PermissionDenied` without the read grant; `NotFound` if absent.
    pub fn relations(&self, id: NodeId, actor: &Actor) -> Result<Vec<RelationRef>> {
        self.ensure_read(actor)?;
        self.store.read(|view| {
            load_item(view, id)?;
            load_relations(view, id)
        })
    }

    /// Fetch an item's non-pending children
    ///
    /// Items awaiting approval never appear in listings.
    ///
    /// # Errors
    /// `PermissionDenied` without the read grant; `NotFound` if the parent
    /// is absent.
    pub fn children(&self, parent: NodeId, actor: &Actor) -> Result<Vec<ItemView>> {
        self.ensure_read(actor)?;
        self.store.read(|view| {
            load_item(view, parent)?;
            let mut children = Vec::new();
            for edge in view.edges_from(parent, EdgeKind::Child)? {
                let (_, record) = load_item(view, edge.to)?;
                if record.status.is_pending() {
                    continue;
                }
                children.push(ItemView::from_record(edge.to, &record)?);
            }
            Ok(children)
        })
    }

    /// One page of an item's version history, newest first
    ///
    /// # Errors
    /// `PermissionDenied` without the history grant; `NotFound` if absent.
    pub fn history(&self, item: NodeId, actor: &Actor, page: usize) -> Result<Vec<ItemView>> {
        let access = self.workflow.permissions().check_read(&actor.grants);
        if !access.can_history {
            return Err(Error::denied("version history"));
        }
        let size = self.config.limits.history_page_size;
        self.store
            .read(|view| archive::history(view, item, page * size, size))
    }

    /// Resolve an item's current level and domain
    ///
    /// # Errors
    /// `PermissionDenied` without the read grant; `NotFound` if absent.
    pub fn resolve_position(&self, item: NodeId, actor: &Actor) -> Result<Position> {
        self.ensure_read(actor)?;
        self.store.read(|view| resolve(view, item))
    }

    fn ensure_read(&self, actor: &Actor) -> Result<()> {
        if !self.workflow.permissions().check_read(&actor.grants).can_read {
            return Err(Error::denied("read access"));
        }
        Ok(())
    }
}
