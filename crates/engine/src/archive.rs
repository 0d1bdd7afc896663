//! Version archiving
//!
//! Before any direct mutation, the live item's scalar fields and ordered
//! details are copied into a fresh `Archived` node linked as the new head
//! of the item's archive chain (live → newest → older → ...). Archive
//! copies are never mutated after creation; the chain only grows.

use trellis_core::{Error, ItemStatus, NodeId, Result};
use trellis_store::{EdgeKind, GraphTxn, GraphView, Props};

use crate::item::{load_details, load_item, write_details, ItemRecord, ItemView};

/// Snapshot `live` into a new immutable archive record, relinking the chain
///
/// The new archive preserves the original creator and timestamps; only its
/// status changes to `Archived`. Returns the archive node's id.
///
/// # Errors
/// `NotFound` if the live item is absent; `DataIntegrity` if the chain
/// head is ambiguous.
pub fn snapshot(txn: &mut dyn GraphTxn, live: NodeId) -> Result<NodeId> {
    let (node, mut record) = load_item(txn, live)?;
    record.status = ItemStatus::Archived;

    let archive = txn.create_node(node.kind, record.to_props()?)?;
    let details = load_details(txn, live)?;
    write_details(txn, archive, &details)?;

    let heads = txn.edges_from(live, EdgeKind::Archive)?;
    if heads.len() > 1 {
        return Err(Error::integrity(format!(
            "item {live} has {} archive heads",
            heads.len()
        )));
    }
    if let Some(head) = heads.first() {
        let previous = head.to;
        txn.delete_edge(head.id)?;
        txn.create_edge(EdgeKind::Archive, archive, previous, Props::new())?;
    }
    txn.create_edge(EdgeKind::Archive, live, archive, Props::new())?;
    Ok(archive)
}

/// Collect the ids of an item's archive chain, newest first
///
/// # Errors
/// `DataIntegrity` on an ambiguous or cyclic chain.
pub fn chain_ids<V: GraphView + ?Sized>(view: &V, item: NodeId) -> Result<Vec<NodeId>> {
    let mut ids = Vec::new();
    let mut current = item;
    loop {
        let next = view.edges_from(current, EdgeKind::Archive)?;
        if next.len() > 1 {
            return Err(Error::integrity(format!(
                "archive chain forks at {current}"
            )));
        }
        let Some(edge) = next.first() else {
            break;
        };
        if ids.contains(&edge.to) || edge.to == item {
            return Err(Error::integrity(format!("archive chain cycles at {current}")));
        }
        ids.push(edge.to);
        current = edge.to;
    }
    Ok(ids)
}

/// Walk an item's archive chain newest first, paginated
///
/// # Errors
/// `NotFound` if the item is absent; `DataIntegrity` on a corrupted chain.
pub fn history<V: GraphView + ?Sized>(
    view: &V,
    item: NodeId,
    offset: usize,
    limit: usize,
) -> Result<Vec<ItemView>> {
    load_item(view, item)?;
    let ids = chain_ids(view, item)?;
    ids.into_iter()
        .skip(offset)
        .take(limit)
        .map(|id| {
            let node = view
                .node(id)?
                .ok_or_else(|| Error::integrity(format!("archive {id} vanished from its chain")))?;
            ItemView::from_record(id, &ItemRecord::from_node(&node)?)
        })
        .collect()
}
