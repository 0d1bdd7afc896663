//! Approval processing
//!
//! Consumes a pending shadow: on approval the original is archived exactly
//! as a direct edit would archive it, every field, detail, and relation is
//! copied from the shadow onto the original (placeholders restored to real
//! typed edges under their remembered ids), and the shadow is deleted, all
//! inside one transaction. Rejection is the degenerate case: the shadow is
//! deleted without merging.
//!
//! Items created through the pending path (`pending_new`) have no shadow;
//! approving one simply finalizes its status in place, and rejecting one
//! deletes it.

use serde::{Deserialize, Serialize};
use trellis_core::{Actor, Error, ItemStatus, NodeId, RelationRef, Result};
use trellis_store::{EdgeKind, GraphTxn};

use crate::archive;
use crate::item::{
    delete_details, load_details, load_item, load_relations, write_committed_relation,
    write_details, ItemRecord,
};
use crate::permissions::PermissionEngine;
use crate::resolver::resolve;

/// Result of an approval or rejection
///
/// For a pending-new item the two ids coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    /// The consumed shadow or finalized pending-new item
    pub id: NodeId,
    /// The live item the suggestion targeted
    pub original_id: NodeId,
}

/// What a pending node turned out to be
#[derive(Clone, Copy)]
enum PendingTarget {
    /// A shadow carrying proposed changes for `original`
    Shadow { original: NodeId },
    /// A directly created item awaiting its first approval
    NewItem,
}

/// Merges or discards pending suggestions
#[derive(Debug, Clone)]
pub struct ApprovalProcessor {
    permissions: PermissionEngine,
}

impl ApprovalProcessor {
    /// Processor sharing the workflow's permission engine
    pub fn new(permissions: PermissionEngine) -> Self {
        ApprovalProcessor { permissions }
    }

    /// Approve a pending suggestion
    ///
    /// For a shadow, position is resolved from the original target, never
    /// from the shadow; the merged item's creator is reattributed to the
    /// shadow's author and its status recomputed from content emptiness.
    /// For a pending-new item the status is finalized in place.
    pub fn approve(
        &self,
        txn: &mut dyn GraphTxn,
        pending_id: NodeId,
        approver: &Actor,
    ) -> Result<ApprovalOutcome> {
        let (target, pending_record) = self.authorize(txn, pending_id, approver)?;
        let original = match target {
            PendingTarget::Shadow { original } => original,
            PendingTarget::NewItem => {
                let mut record = pending_record;
                record.status = record.content_status();
                record.updated_at = chrono::Utc::now();
                txn.update_node(pending_id, record.to_props()?)?;
                return Ok(ApprovalOutcome {
                    id: pending_id,
                    original_id: pending_id,
                });
            }
        };

        archive::snapshot(txn, original)?;

        let (_, original_record) = load_item(txn, original)?;
        let mut merged = pending_record.clone();
        merged.status = merged.content_status();
        merged.created_at = original_record.created_at;
        merged.updated_at = chrono::Utc::now();
        merged.creator = pending_record.creator;
        txn.update_node(original, merged.to_props()?)?;

        delete_details(txn, original)?;
        let details = load_details(txn, pending_id)?;
        write_details(txn, original, &details)?;

        // Replace the original's relation set with the shadow's, restoring
        // placeholders to committed edges under their remembered ids.
        let shadow_relations = load_relations(txn, pending_id)?;
        for relation in load_relations(txn, original)? {
            if let RelationRef::Committed { edge, .. } = relation {
                txn.delete_edge(edge)?;
            }
        }
        for relation in shadow_relations {
            match relation {
                RelationRef::Pending {
                    original_kind,
                    original_edge,
                    target,
                } => write_committed_relation(txn, original, &original_kind, original_edge, target)?,
                RelationRef::Committed { kind, edge, target } => {
                    write_committed_relation(txn, original, &kind, edge, target)?
                }
            }
        }

        self.discard(txn, pending_id)?;
        Ok(ApprovalOutcome {
            id: pending_id,
            original_id: original,
        })
    }

    /// Reject a pending suggestion, deleting it without merging
    pub fn reject(
        &self,
        txn: &mut dyn GraphTxn,
        pending_id: NodeId,
        approver: &Actor,
    ) -> Result<ApprovalOutcome> {
        let (target, _) = self.authorize(txn, pending_id, approver)?;
        let original_id = match target {
            PendingTarget::Shadow { original } => original,
            PendingTarget::NewItem => pending_id,
        };
        self.discard(txn, pending_id)?;
        Ok(ApprovalOutcome {
            id: pending_id,
            original_id,
        })
    }

    /// Classify the pending node and run the moderator check against the
    /// position it would land at
    fn authorize(
        &self,
        txn: &mut dyn GraphTxn,
        pending_id: NodeId,
        approver: &Actor,
    ) -> Result<(PendingTarget, ItemRecord)> {
        if approver.suspended {
            return Err(Error::denied(format!("actor {} is suspended", approver.id)));
        }
        let (_, record) = load_item(txn, pending_id)?;
        let pending = txn.edges_from(pending_id, EdgeKind::Pending)?;
        let (target, position_of) = match pending.as_slice() {
            [edge] => (PendingTarget::Shadow { original: edge.to }, edge.to),
            [] if record.status == ItemStatus::PendingNew => (PendingTarget::NewItem, pending_id),
            [] => {
                return Err(Error::Conflict(format!(
                    "item {pending_id} is not awaiting approval"
                )))
            }
            _ => {
                return Err(Error::integrity(format!(
                    "shadow {pending_id} targets multiple items"
                )))
            }
        };
        if let PendingTarget::Shadow { original } = target {
            if txn.node(original)?.is_none() {
                return Err(Error::integrity(format!(
                    "shadow {pending_id} targets missing item {original}"
                )));
            }
        }

        let pos = resolve(txn, position_of)?;
        let allowed = self.permissions.check_moderator(
            &approver.grants,
            approver.id,
            record.creator,
            pos.level,
            pos.domain.as_deref(),
        )?;
        if !allowed {
            return Err(Error::denied(format!(
                "approval at level {} in {}",
                pos.level,
                pos.domain.as_deref().unwrap_or("<root>")
            )));
        }
        Ok((target, record))
    }

    /// Delete a pending node and everything it owns; its pending and
    /// placeholder edges cascade with the node
    fn discard(&self, txn: &mut dyn GraphTxn, pending_id: NodeId) -> Result<()> {
        delete_details(txn, pending_id)?;
        txn.delete_node(pending_id)
    }
}
