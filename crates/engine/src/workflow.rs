//! Edit workflow
//!
//! Orchestrates create, patch, delete, and move. Every operation resolves
//! the target's position from the live hierarchy, evaluates the permission
//! matrix against it, and then either mutates directly (archiving first)
//! or routes through the pending-suggestion path. All checks and writes
//! happen inside the caller's transaction, so a failure at any point rolls
//! back completely.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;
use trellis_core::{
    is_minor_with, Actor, DetailFields, Error, ItemFields, ItemStatus, Limits, MinorEditConfig,
    NodeId, RelationRef, Result,
};
use trellis_store::{EdgeKind, GraphTxn, NodeKind, Props};

use crate::archive;
use crate::item::{
    delete_details, load_details, load_item, load_relations, write_details,
    write_pending_relation, ItemRecord,
};
use crate::permissions::{MutationDecision, PermissionEngine};
use crate::resolver::{is_self_or_descendant, resolve};

/// Caller-visible result status of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// A new live item exists
    Created,
    /// The item was mutated in place
    Updated,
    /// The change awaits approval (new pending item or pending shadow)
    Pending,
    /// The item and its subtree are gone
    Deleted,
    /// The item has a new parent
    Moved,
}

/// Result of a workflow mutation
///
/// For the pending-update path, `id` names the shadow, not the live item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// The created/updated/shadow/deleted/moved node
    pub id: NodeId,
    /// What happened
    pub status: OutcomeStatus,
}

/// Payload for creating a new item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    /// Title (required, non-blank)
    pub title: String,
    /// Body text
    #[serde(default)]
    pub body: String,
    /// Structured-data payload
    #[serde(default)]
    pub data: Option<Value>,
    /// Summary text
    #[serde(default)]
    pub summary: String,
    /// Ordered sub-entities
    #[serde(default)]
    pub details: Vec<DetailFields>,
}

/// The edit-workflow state machine
#[derive(Debug, Clone)]
pub struct EditWorkflow {
    permissions: PermissionEngine,
    limits: Limits,
    classifier: MinorEditConfig,
}

impl EditWorkflow {
    /// Workflow with the given thresholds
    pub fn new(limits: Limits, classifier: MinorEditConfig) -> Self {
        EditWorkflow {
            permissions: PermissionEngine::new(limits.deep_level),
            limits,
            classifier,
        }
    }

    /// The permission engine this workflow consults
    pub fn permissions(&self) -> &PermissionEngine {
        &self.permissions
    }

    /// Create an item under `parent`
    ///
    /// A pending-only decision still creates the item and attaches its
    /// hierarchy edge (so later approval can resolve its position) but
    /// tags it `pending_new`; listings must exclude pending statuses.
    pub fn create(
        &self,
        txn: &mut dyn GraphTxn,
        parent: NodeId,
        actor: &Actor,
        item: NewItem,
    ) -> Result<MutationOutcome> {
        ensure_active(actor)?;
        if item.title.trim().is_empty() {
            return Err(Error::invalid_input("title must not be empty"));
        }

        let (_, parent_record) = load_item(txn, parent)?;
        ensure_attachable(txn, parent, &parent_record)?;
        let parent_pos = resolve(txn, parent)?;

        let level = parent_pos.level + 1;
        let domain = if parent_pos.is_root() {
            item.title.to_uppercase()
        } else {
            parent_pos
                .domain
                .clone()
                .ok_or_else(|| Error::integrity(format!("parent {parent} resolved without domain")))?
        };

        let decision = self
            .permissions
            .check_create(&actor.grants, level, Some(&domain))?;
        debug!(%parent, level, domain = %domain, ?decision, "create decision");

        let pending = match decision {
            MutationDecision::Direct => false,
            MutationDecision::PendingOnly => true,
            _ => {
                return Err(Error::denied(format!(
                    "create at level {level} in {domain}"
                )))
            }
        };

        let mut record = ItemRecord::new(
            item.title,
            &item.body,
            item.data.as_ref(),
            &item.summary,
            actor.id,
            self.limits.chunk_limit,
        )?;
        if pending {
            record.status = ItemStatus::PendingNew;
        }

        let id = txn.create_node(NodeKind::Item, record.to_props()?)?;
        txn.create_edge(EdgeKind::Child, parent, id, Props::new())?;
        write_details(txn, id, &item.details)?;

        Ok(MutationOutcome {
            id,
            status: if pending {
                OutcomeStatus::Pending
            } else {
                OutcomeStatus::Created
            },
        })
    }

    /// Patch an item's fields
    ///
    /// Direct edits archive the pre-mutation state first. The pending path
    /// clones the live item into a shadow (or collapses onto the existing
    /// one) and applies the change there, leaving the live item untouched.
    pub fn patch(
        &self,
        txn: &mut dyn GraphTxn,
        item: NodeId,
        actor: &Actor,
        fields: &ItemFields,
    ) -> Result<MutationOutcome> {
        ensure_active(actor)?;
        if fields.is_empty() {
            return Err(Error::invalid_input("patch changes nothing"));
        }

        let (_, record) = load_item(txn, item)?;
        if record.status == ItemStatus::Archived {
            return Err(Error::Conflict(format!("item {item} is an immutable archive")));
        }
        if is_shadow(txn, item)? {
            return Err(Error::Conflict(format!(
                "item {item} is a pending shadow; patch its target instead"
            )));
        }
        if record.status == ItemStatus::PendingNew {
            return self.patch_pending_new(txn, item, actor, record, fields);
        }

        let pos = resolve(txn, item)?;
        let decision = self
            .permissions
            .check_edit(&actor.grants, pos.level, pos.domain.as_deref())?;
        debug!(%item, level = pos.level, ?decision, "edit decision");

        let direct = match decision {
            MutationDecision::Direct => true,
            MutationDecision::MinorOnly => {
                // Downgrade through the classifier: a change too large for
                // the minor-direct role falls through to the pending path.
                let mut candidate = record.clone();
                candidate.apply_fields(fields, self.limits.chunk_limit)?;
                is_minor_with(
                    &record.combined_text(),
                    &candidate.combined_text(),
                    &self.classifier,
                )
            }
            MutationDecision::PendingOnly => false,
            MutationDecision::Denied => {
                return Err(Error::denied(format!(
                    "edit at level {} in {}",
                    pos.level,
                    pos.domain.as_deref().unwrap_or("<root>")
                )))
            }
        };

        if direct {
            self.patch_direct(txn, item, actor, record, fields)
        } else {
            self.patch_pending(txn, item, actor, record, fields)
        }
    }

    fn patch_direct(
        &self,
        txn: &mut dyn GraphTxn,
        item: NodeId,
        actor: &Actor,
        mut record: ItemRecord,
        fields: &ItemFields,
    ) -> Result<MutationOutcome> {
        archive::snapshot(txn, item)?;
        record.apply_fields(fields, self.limits.chunk_limit)?;
        record.status = record.content_status();
        record.updated_at = chrono::Utc::now();
        record.creator = actor.id;
        txn.update_node(item, record.to_props()?)?;
        Ok(MutationOutcome {
            id: item,
            status: OutcomeStatus::Updated,
        })
    }

    /// A `pending_new` item is itself the proposal: any permitted editor
    /// updates it in place. Its status stays pending and nothing is
    /// archived; finalization belongs to the approval path alone.
    fn patch_pending_new(
        &self,
        txn: &mut dyn GraphTxn,
        item: NodeId,
        actor: &Actor,
        mut record: ItemRecord,
        fields: &ItemFields,
    ) -> Result<MutationOutcome> {
        let pos = resolve(txn, item)?;
        let decision = self
            .permissions
            .check_edit(&actor.grants, pos.level, pos.domain.as_deref())?;
        debug!(%item, level = pos.level, ?decision, "pending-new edit decision");
        if !decision.permits_anything() {
            return Err(Error::denied(format!(
                "edit at level {} in {}",
                pos.level,
                pos.domain.as_deref().unwrap_or("<root>")
            )));
        }
        record.apply_fields(fields, self.limits.chunk_limit)?;
        record.updated_at = chrono::Utc::now();
        record.creator = actor.id;
        txn.update_node(item, record.to_props()?)?;
        Ok(MutationOutcome {
            id: item,
            status: OutcomeStatus::Pending,
        })
    }

    fn patch_pending(
        &self,
        txn: &mut dyn GraphTxn,
        item: NodeId,
        actor: &Actor,
        live_record: ItemRecord,
        fields: &ItemFields,
    ) -> Result<MutationOutcome> {
        let existing = txn.edges_to(item, EdgeKind::Pending)?;
        if existing.len() > 1 {
            return Err(Error::integrity(format!(
                "item {item} has {} pending shadows",
                existing.len()
            )));
        }

        if let Some(edge) = existing.first() {
            // Collapse onto the existing shadow: at most one per target.
            let shadow = edge.from;
            let (_, mut shadow_record) = load_item(txn, shadow)?;
            shadow_record.apply_fields(fields, self.limits.chunk_limit)?;
            shadow_record.updated_at = chrono::Utc::now();
            shadow_record.creator = actor.id;
            txn.update_node(shadow, shadow_record.to_props()?)?;
            return Ok(MutationOutcome {
                id: shadow,
                status: OutcomeStatus::Pending,
            });
        }

        // Full structural clone at suggestion time, changes applied to the
        // clone only.
        let mut shadow_record = live_record;
        shadow_record.apply_fields(fields, self.limits.chunk_limit)?;
        shadow_record.status = ItemStatus::PendingUpdate;
        let now = chrono::Utc::now();
        shadow_record.created_at = now;
        shadow_record.updated_at = now;
        shadow_record.creator = actor.id;

        let shadow = txn.create_node(NodeKind::Item, shadow_record.to_props()?)?;
        let details = load_details(txn, item)?;
        write_details(txn, shadow, &details)?;
        for relation in load_relations(txn, item)? {
            if let RelationRef::Committed { kind, edge, target } = relation {
                write_pending_relation(txn, shadow, &kind, edge, target)?;
            }
        }
        txn.create_edge(EdgeKind::Pending, shadow, item, Props::new())?;

        Ok(MutationOutcome {
            id: shadow,
            status: OutcomeStatus::Pending,
        })
    }

    /// Delete an item, its entire archive chain, and its owned subtree
    ///
    /// Irreversible. Shadows targeting any deleted item go with it, so no
    /// pending edge can dangle.
    pub fn delete(
        &self,
        txn: &mut dyn GraphTxn,
        item: NodeId,
        actor: &Actor,
    ) -> Result<MutationOutcome> {
        ensure_active(actor)?;
        let (_, record) = load_item(txn, item)?;
        if record.status == ItemStatus::Archived {
            return Err(Error::Conflict(format!(
                "archive {item} is deleted with its owner, not directly"
            )));
        }
        if is_shadow(txn, item)? {
            return Err(Error::Conflict(format!(
                "item {item} is a pending shadow; reject it instead"
            )));
        }

        let pos = resolve(txn, item)?;
        let decision = self
            .permissions
            .check_delete(&actor.grants, pos.level, pos.domain.as_deref())?;
        if decision != MutationDecision::Direct {
            return Err(Error::denied(format!(
                "delete at level {} in {}",
                pos.level,
                pos.domain.as_deref().unwrap_or("<root>")
            )));
        }

        for node in collect_subtree(txn, item)? {
            delete_one(txn, node)?;
        }
        Ok(MutationOutcome {
            id: item,
            status: OutcomeStatus::Deleted,
        })
    }

    /// Re-parent an item
    ///
    /// The cycle check runs against the same transaction that re-parents,
    /// and detach/attach happen together, so the tree is never observed
    /// headless and no check-then-act race can introduce a cycle.
    pub fn move_item(
        &self,
        txn: &mut dyn GraphTxn,
        item: NodeId,
        new_parent: NodeId,
        actor: &Actor,
    ) -> Result<MutationOutcome> {
        ensure_active(actor)?;
        let (_, record) = load_item(txn, item)?;
        if record.status == ItemStatus::Archived || is_shadow(txn, item)? {
            return Err(Error::Conflict(format!("item {item} is not a live hierarchy member")));
        }
        let (_, parent_record) = load_item(txn, new_parent)?;
        ensure_attachable(txn, new_parent, &parent_record)?;

        let pos = resolve(txn, item)?;
        if pos.is_root() {
            return Err(Error::invalid_input("the absolute root cannot be moved"));
        }
        let parent_pos = resolve(txn, new_parent)?;
        let to_domain = if parent_pos.is_root() {
            // Landing directly under the root promotes the item to a domain
            // root, gated the same way create guards level 0.
            let domain = record.title.to_uppercase();
            if !actor.grants.is_superuser() && !actor.grants.is_domain_admin(&domain) {
                return Err(Error::denied(format!(
                    "promoting item {item} to domain root {domain}"
                )));
            }
            Some(domain)
        } else {
            parent_pos.domain.clone()
        };

        let allowed = self.permissions.check_move(
            &actor.grants,
            pos.domain.as_deref(),
            to_domain.as_deref(),
        )?;
        if !allowed {
            return Err(Error::denied(format!(
                "move from {} to {}",
                pos.domain.as_deref().unwrap_or("<root>"),
                to_domain.as_deref().unwrap_or("<root>")
            )));
        }

        if is_self_or_descendant(txn, new_parent, item)? {
            return Err(Error::Circular(format!(
                "{new_parent} is {item} or lies beneath it"
            )));
        }

        let parent_edges = txn.edges_to(item, EdgeKind::Child)?;
        match parent_edges.as_slice() {
            [edge] => txn.delete_edge(edge.id)?,
            [] => {
                return Err(Error::integrity(format!(
                    "non-root item {item} has no hierarchy parent"
                )))
            }
            _ => {
                return Err(Error::integrity(format!(
                    "item {item} has multiple hierarchy parents"
                )))
            }
        }
        txn.create_edge(EdgeKind::Child, new_parent, item, Props::new())?;

        Ok(MutationOutcome {
            id: item,
            status: OutcomeStatus::Moved,
        })
    }
}

/// Suspended actors are vetoed before the permission matrix runs
fn ensure_active(actor: &Actor) -> Result<()> {
    if actor.suspended {
        return Err(Error::denied(format!("actor {} is suspended", actor.id)));
    }
    Ok(())
}

/// True if the node is a pending shadow (carries a pending edge to a target)
pub(crate) fn is_shadow(txn: &dyn GraphTxn, id: NodeId) -> Result<bool> {
    Ok(!txn.edges_from(id, EdgeKind::Pending)?.is_empty())
}

/// Parents for new hierarchy edges must be live hierarchy members
fn ensure_attachable(txn: &dyn GraphTxn, parent: NodeId, record: &ItemRecord) -> Result<()> {
    if record.status == ItemStatus::Archived {
        return Err(Error::Conflict(format!("parent {parent} is an archive")));
    }
    if record.status.is_pending() {
        return Err(Error::Conflict(format!("parent {parent} awaits approval")));
    }
    if is_shadow(txn, parent)? {
        return Err(Error::Conflict(format!("parent {parent} is a pending shadow")));
    }
    Ok(())
}

/// Collect an item and every owned descendant, guarding against cycles
fn collect_subtree(txn: &dyn GraphTxn, root: NodeId) -> Result<Vec<NodeId>> {
    let mut order = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            return Err(Error::integrity(format!("hierarchy cycle through item {node}")));
        }
        order.push(node);
        for edge in txn.edges_from(node, EdgeKind::Child)? {
            stack.push(edge.to);
        }
    }
    Ok(order)
}

/// Delete one item together with its archive chain, details, and any
/// shadow targeting it
fn delete_one(txn: &mut dyn GraphTxn, item: NodeId) -> Result<()> {
    for edge in txn.edges_to(item, EdgeKind::Pending)? {
        let shadow = edge.from;
        delete_details(txn, shadow)?;
        txn.delete_node(shadow)?;
    }
    for archived in archive::chain_ids(txn, item)? {
        delete_details(txn, archived)?;
        txn.delete_node(archived)?;
    }
    delete_details(txn, item)?;
    txn.delete_node(item)?;
    Ok(())
}
