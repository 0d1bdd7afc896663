//! Property-graph records
//!
//! Nodes and edges carry typed kinds plus a JSON property map. The engine
//! layers its item/detail models over these records; the store itself knows
//! nothing about content semantics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trellis_core::{EdgeId, NodeId};

/// Property map attached to nodes and edges
pub type Props = Map<String, Value>;

/// Node discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A content item: live, archive copy, or pending shadow
    /// (distinguished by status and edges, not by kind)
    Item,
    /// An ordered sub-entity owned by an item
    Detail,
}

/// Edge discriminator
///
/// Payload data (relation type names, remembered original edge ids, detail
/// ordering) lives in edge properties so kinds stay directly comparable in
/// pattern reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Hierarchy containment: parent → child
    Child,
    /// Version history: live → newest archive, archive → older archive
    Archive,
    /// Suggestion link: shadow → live target
    Pending,
    /// Ownership of an ordered sub-entity: item → detail
    Detail,
    /// Typed relationship statement between two items
    Relation,
    /// Shadow-side placeholder for a relation on the original
    PendingRelation,
}

/// A graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node id
    pub id: NodeId,
    /// Node discriminator
    pub kind: NodeKind,
    /// JSON property map
    pub props: Props,
}

impl Node {
    /// String property, if present and a string
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

/// A graph edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Stable edge id
    pub id: EdgeId,
    /// Edge discriminator
    pub kind: EdgeKind,
    /// Source node
    pub from: NodeId,
    /// Target node
    pub to: NodeId,
    /// JSON property map
    pub props: Props,
}

impl Edge {
    /// String property, if present and a string
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Integer property, if present and an integer
    pub fn int_prop(&self, key: &str) -> Option<i64> {
        self.props.get(key).and_then(Value::as_i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prop_accessors() {
        let mut props = Props::new();
        props.insert("kind".into(), json!("references"));
        props.insert("order".into(), json!(3));
        let edge = Edge {
            id: EdgeId::new(),
            kind: EdgeKind::Relation,
            from: NodeId::new(),
            to: NodeId::new(),
            props,
        };
        assert_eq!(edge.str_prop("kind"), Some("references"));
        assert_eq!(edge.int_prop("order"), Some(3));
        assert_eq!(edge.str_prop("missing"), None);
        assert_eq!(edge.int_prop("kind"), None);
    }

    #[test]
    fn kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&EdgeKind::PendingRelation).unwrap(),
            "\"pending_relation\""
        );
        assert_eq!(serde_json::to_string(&NodeKind::Item).unwrap(), "\"item\"");
    }
}
