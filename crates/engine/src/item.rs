//! Item and detail records as stored on graph nodes
//!
//! `ItemRecord` is the serde image of an item node's property map. Large
//! fields (body, structured payload, summary) are independent chunked
//! pairs; the structured payload is chunked over its serialized JSON form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trellis_core::{
    ChunkedField, DetailFields, EdgeId, Error, ItemFields, ItemStatus, NodeId, RelationRef,
    Result, UserId,
};
use trellis_store::{EdgeKind, GraphTxn, GraphView, Node, NodeKind, Props};

/// Edge property holding a relation's type name
const PROP_KIND: &str = "kind";
/// Edge property holding a placeholder's remembered original edge id
const PROP_ORIGINAL: &str = "original";
/// Edge property holding a detail's position
const PROP_ORDER: &str = "order";

/// Stored scalar state of a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Item title; domain roots name their domain with this, uppercased
    pub title: String,
    /// Lifecycle status
    pub status: ItemStatus,
    /// Body text, chunked when oversized
    pub body: ChunkedField,
    /// Structured-data payload, serialized to JSON then chunked
    pub data: ChunkedField,
    /// Summary text, chunked when oversized
    pub summary: ChunkedField,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
    /// Creator; reattributed to the editor on direct edits
    pub creator: UserId,
}

impl ItemRecord {
    /// Build a fresh record, encoding the large fields
    pub fn new(
        title: String,
        body: &str,
        data: Option<&Value>,
        summary: &str,
        creator: UserId,
        chunk_limit: usize,
    ) -> Result<Self> {
        let now = Utc::now();
        let mut record = ItemRecord {
            title,
            status: ItemStatus::Stub,
            body: ChunkedField::encode(body, chunk_limit)?,
            data: encode_data(data, chunk_limit)?,
            summary: ChunkedField::encode(summary, chunk_limit)?,
            created_at: now,
            updated_at: now,
            creator,
        };
        record.status = record.content_status();
        Ok(record)
    }

    /// Deserialize a record from an item node
    ///
    /// # Errors
    /// `DataIntegrity` if the node's properties do not form a valid record.
    pub fn from_node(node: &Node) -> Result<Self> {
        serde_json::from_value(Value::Object(node.props.clone()))
            .map_err(|e| Error::integrity(format!("malformed item node {}: {e}", node.id)))
    }

    /// Serialize the record into a node property map
    pub fn to_props(&self) -> Result<Props> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::Storage("item record serialized to non-object".into())),
            Err(e) => Err(Error::Storage(format!("item record serialization: {e}"))),
        }
    }

    /// Status implied by content emptiness (for live items)
    pub fn content_status(&self) -> ItemStatus {
        if self.body.is_empty() && self.data.is_empty() {
            ItemStatus::Stub
        } else {
            ItemStatus::Complete
        }
    }

    /// Apply a partial field update, re-encoding changed large fields
    pub fn apply_fields(&mut self, fields: &ItemFields, chunk_limit: usize) -> Result<()> {
        if let Some(title) = &fields.title {
            if title.trim().is_empty() {
                return Err(Error::invalid_input("title must not be empty"));
            }
            self.title = title.clone();
        }
        if let Some(body) = &fields.body {
            self.body = ChunkedField::encode(body, chunk_limit)?;
        }
        if let Some(data) = &fields.data {
            self.data = encode_data(Some(data), chunk_limit)?;
        }
        if let Some(summary) = &fields.summary {
            self.summary = ChunkedField::encode(summary, chunk_limit)?;
        }
        Ok(())
    }

    /// All text fields concatenated, for the minor-edit comparison
    pub fn combined_text(&self) -> String {
        [
            self.title.clone(),
            self.summary.decode(),
            self.body.decode(),
            self.data.decode(),
        ]
        .join("\n")
    }
}

fn encode_data(data: Option<&Value>, chunk_limit: usize) -> Result<ChunkedField> {
    match data {
        None => ChunkedField::encode("", chunk_limit),
        Some(value) => {
            let serialized = serde_json::to_string(value)
                .map_err(|e| Error::invalid_input(format!("unserializable data payload: {e}")))?;
            ChunkedField::encode(&serialized, chunk_limit)
        }
    }
}

/// Decoded, caller-facing view of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    /// Node id
    pub id: NodeId,
    /// Title
    pub title: String,
    /// Decoded body text
    pub body: String,
    /// Parsed structured-data payload
    pub data: Option<Value>,
    /// Decoded summary
    pub summary: String,
    /// Lifecycle status
    pub status: ItemStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
    /// Creator
    pub creator: UserId,
}

impl ItemView {
    /// Decode a stored record into a view
    pub fn from_record(id: NodeId, record: &ItemRecord) -> Result<Self> {
        let raw = record.data.decode();
        let data = if raw.is_empty() {
            None
        } else {
            Some(serde_json::from_str(&raw).map_err(|e| {
                Error::integrity(format!("malformed data payload on {id}: {e}"))
            })?)
        };
        Ok(ItemView {
            id,
            title: record.title.clone(),
            body: record.body.decode(),
            data,
            summary: record.summary.decode(),
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            creator: record.creator,
        })
    }
}

/// Load an item node, failing `NotFound` when absent or not an item
pub fn load_item<V: GraphView + ?Sized>(view: &V, id: NodeId) -> Result<(Node, ItemRecord)> {
    let node = view
        .node(id)?
        .filter(|n| n.kind == NodeKind::Item)
        .ok_or_else(|| Error::not_found(format!("item {id}")))?;
    let record = ItemRecord::from_node(&node)?;
    Ok((node, record))
}

/// Load an item's ordered details
pub fn load_details<V: GraphView + ?Sized>(view: &V, item: NodeId) -> Result<Vec<DetailFields>> {
    let mut edges = view.edges_from(item, EdgeKind::Detail)?;
    edges.sort_by_key(|e| e.int_prop(PROP_ORDER).unwrap_or(i64::MAX));
    let mut details = Vec::with_capacity(edges.len());
    for edge in edges {
        let node = view
            .node(edge.to)?
            .ok_or_else(|| Error::integrity(format!("detail edge {} targets missing node", edge.id)))?;
        let detail: DetailFields = serde_json::from_value(Value::Object(node.props.clone()))
            .map_err(|e| Error::integrity(format!("malformed detail node {}: {e}", node.id)))?;
        details.push(detail);
    }
    Ok(details)
}

/// Create detail nodes and ordered edges under an item
pub fn write_details(txn: &mut dyn GraphTxn, item: NodeId, details: &[DetailFields]) -> Result<()> {
    for (order, detail) in details.iter().enumerate() {
        let props = match serde_json::to_value(detail) {
            Ok(Value::Object(map)) => map,
            _ => return Err(Error::Storage("detail serialized to non-object".into())),
        };
        let node = txn.create_node(NodeKind::Detail, props)?;
        let mut edge_props = Props::new();
        edge_props.insert(PROP_ORDER.into(), Value::from(order as i64));
        txn.create_edge(EdgeKind::Detail, item, node, edge_props)?;
    }
    Ok(())
}

/// Delete an item's detail nodes (their edges cascade)
pub fn delete_details(txn: &mut dyn GraphTxn, item: NodeId) -> Result<()> {
    for edge in txn.edges_from(item, EdgeKind::Detail)? {
        txn.delete_node(edge.to)?;
    }
    Ok(())
}

/// Load an item's relationship statements, committed and pending alike
pub fn load_relations<V: GraphView + ?Sized>(view: &V, item: NodeId) -> Result<Vec<RelationRef>> {
    let mut relations = Vec::new();
    for edge in view.edges_from(item, EdgeKind::Relation)? {
        let kind = edge
            .str_prop(PROP_KIND)
            .ok_or_else(|| Error::integrity(format!("relation edge {} lacks a kind", edge.id)))?
            .to_string();
        relations.push(RelationRef::Committed {
            kind,
            edge: edge.id,
            target: edge.to,
        });
    }
    for edge in view.edges_from(item, EdgeKind::PendingRelation)? {
        let original_kind = edge
            .str_prop(PROP_KIND)
            .ok_or_else(|| Error::integrity(format!("placeholder edge {} lacks a kind", edge.id)))?
            .to_string();
        let original_edge = edge
            .str_prop(PROP_ORIGINAL)
            .and_then(EdgeId::from_string)
            .ok_or_else(|| {
                Error::integrity(format!("placeholder edge {} lacks its original id", edge.id))
            })?;
        relations.push(RelationRef::Pending {
            original_kind,
            original_edge,
            target: edge.to,
        });
    }
    Ok(relations)
}

/// Attach a committed relation edge with a stable id
pub fn write_committed_relation(
    txn: &mut dyn GraphTxn,
    from: NodeId,
    kind: &str,
    edge: EdgeId,
    target: NodeId,
) -> Result<()> {
    let mut props = Props::new();
    props.insert(PROP_KIND.into(), Value::from(kind));
    txn.create_edge_with_id(edge, EdgeKind::Relation, from, target, props)
}

/// Attach a shadow-side placeholder remembering the original edge
pub fn write_pending_relation(
    txn: &mut dyn GraphTxn,
    shadow: NodeId,
    original_kind: &str,
    original_edge: EdgeId,
    target: NodeId,
) -> Result<()> {
    let mut props = Props::new();
    props.insert(PROP_KIND.into(), Value::from(original_kind));
    props.insert(PROP_ORIGINAL.into(), Value::from(original_edge.to_string()));
    txn.create_edge(EdgeKind::PendingRelation, shadow, target, props)?;
    Ok(())
}
