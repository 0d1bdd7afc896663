//! Core types for the trellis workflow engine
//!
//! This module defines the foundational types:
//! - NodeId / EdgeId: graph entity identifiers
//! - UserId: actor identifier (actors are not stored as graph nodes)
//! - ItemStatus: content lifecycle states
//! - Position: resolved hierarchy position (level + domain)
//! - ItemFields / DetailFields: mutation payloads
//! - RelationRef: committed vs pending relationship references
//! - Grant / GrantSet / Actor: the tagged capability model

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a graph node (content item, archive copy,
/// pending shadow, or detail)
///
/// A NodeId wraps a UUID v4. Live items, their immutable archive copies and
/// their pending shadows all carry NodeIds; what a node *is* follows from
/// its status and edges, not from its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new random NodeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a NodeId from its string representation
    ///
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a graph edge
///
/// Relationship edges keep a stable EdgeId across the pending-shadow
/// round-trip: a shadow's placeholder remembers the original edge id so the
/// approval merge can restore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(Uuid);

impl EdgeId {
    /// Create a new random EdgeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an EdgeId from its string representation
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random UserId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a UserId from its string representation
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a content item
///
/// `Stub`/`Complete` track content emptiness for live items. `PendingNew`
/// marks an item created through the suggestion path; `PendingUpdate` marks
/// a shadow awaiting approval. `Archived` marks an immutable history copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Live item with no substantive content yet
    Stub,
    /// Live item with content
    Complete,
    /// Item created via the suggestion path, awaiting approval
    PendingNew,
    /// Shadow copy carrying a proposed update, awaiting approval
    PendingUpdate,
    /// Immutable archive copy; never mutated after creation
    Archived,
}

impl ItemStatus {
    /// True for the two approval-gated statuses
    pub fn is_pending(&self) -> bool {
        matches!(self, ItemStatus::PendingNew | ItemStatus::PendingUpdate)
    }

    /// True for statuses a normal listing should include
    pub fn is_live(&self) -> bool {
        matches!(self, ItemStatus::Stub | ItemStatus::Complete)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Stub => "stub",
            ItemStatus::Complete => "complete",
            ItemStatus::PendingNew => "pending_new",
            ItemStatus::PendingUpdate => "pending_update",
            ItemStatus::Archived => "archived",
        };
        write!(f, "{s}")
    }
}

/// Hierarchy level of the absolute root
pub const ROOT_LEVEL: i32 = -1;

/// Hierarchy level of a domain root (direct child of the absolute root)
pub const DOMAIN_ROOT_LEVEL: i32 = 0;

/// Resolved structural position of an item
///
/// Derived solely from current hierarchy edges, recomputed per check and
/// never cached. `domain` is the level-0 ancestor's title, uppercased;
/// None only for the absolute root itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Depth: −1 absolute root, 0 domain root, n≥1 depth within a domain
    pub level: i32,
    /// Uppercased title of the level-0 ancestor; None for the root
    pub domain: Option<String>,
}

impl Position {
    /// Position of the absolute root
    pub fn root() -> Self {
        Position {
            level: ROOT_LEVEL,
            domain: None,
        }
    }

    /// True if this is the absolute root
    pub fn is_root(&self) -> bool {
        self.level == ROOT_LEVEL
    }

    /// True if this is a domain root
    pub fn is_domain_root(&self) -> bool {
        self.level == DOMAIN_ROOT_LEVEL
    }
}

/// Partial field update for a content item
///
/// `None` means "leave unchanged". An all-`None` patch is rejected as
/// `InvalidInput` before any permission check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body text (chunked in storage when oversized)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// New structured-data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// New summary text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ItemFields {
    /// True when no field is being changed
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.data.is_none()
            && self.summary.is_none()
    }
}

/// Content of an ordered sub-entity ("detail") owned by an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFields {
    /// Detail heading
    pub title: String,
    /// Detail body text
    pub body: String,
}

/// Reference to a typed relationship between two items
///
/// Live items carry `Committed` relations: real typed edges with stable
/// ids. A pending shadow clones each relation as a `Pending` placeholder
/// remembering the original kind and edge id, so the approval merge is a
/// total function over this variant instead of synthetic-type string
/// matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RelationRef {
    /// A live typed edge
    Committed {
        /// Relationship type name
        kind: String,
        /// Stable edge id
        edge: EdgeId,
        /// The related item
        target: NodeId,
    },
    /// A shadow-side placeholder for a relation that exists on the original
    Pending {
        /// Relationship type of the original edge
        original_kind: String,
        /// Edge id of the original edge, reused on approval
        original_edge: EdgeId,
        /// The related item
        target: NodeId,
    },
}

impl RelationRef {
    /// The related item, regardless of variant
    pub fn target(&self) -> NodeId {
        match self {
            RelationRef::Committed { target, .. } => *target,
            RelationRef::Pending { target, .. } => *target,
        }
    }
}

/// Mutation verb distinguished by the permission matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    /// Creating a child under a parent
    Create,
    /// Editing an item in place
    Edit,
    /// Deleting an item and its subtree
    Delete,
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MutationAction::Create => "create",
            MutationAction::Edit => "edit",
            MutationAction::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// A single capability grant
///
/// Free-form role strings are reinterpreted as this finite tagged model:
/// domain-scoped grants carry a (domain, level-ceiling) pair, flat grants
/// apply to deep content, and `NoEdit` is an explicit veto. No string
/// pattern matching happens at check time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cap", rename_all = "snake_case")]
pub enum Grant {
    /// Grants everything; overrides all other grants except suspension
    Superuser,
    /// Vetoes every mutation regardless of other grants
    NoEdit,
    /// Read access to content
    Read,
    /// Read access to version history (requires `Read`)
    ReadHistory,
    /// Export access (requires `Read`)
    ReadExport,
    /// Domain-scoped mutation grant: authorizes `action` at levels
    /// 1..=ceiling within `domain`
    Scoped {
        /// Which mutation verb this grant covers
        action: MutationAction,
        /// Uppercased domain name
        domain: String,
        /// Deepest level covered (monotonic with depth)
        ceiling: i32,
    },
    /// Required for any level-0 (domain-root) mutation in `domain`
    DomainAdmin {
        /// Uppercased domain name
        domain: String,
    },
    /// Flat deep-content grant: full direct edit at level ≥ deep threshold
    MajorDirect,
    /// Flat deep-content grant: direct edit gated by the minor-edit classifier
    MinorDirect,
    /// Suggestion grant: yields the pending path where direct capability is absent
    Suggest,
    /// Same-domain move grant
    MoveWithin,
    /// Cross-domain move grant (implies same-domain moves)
    MoveAcross,
    /// Approval grant; derivative of edit capability, checked separately
    Approve,
}

/// An actor's complete capability set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrantSet {
    grants: Vec<Grant>,
}

impl GrantSet {
    /// Empty grant set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grant set from a list of grants
    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        Self {
            grants: grants.into_iter().collect(),
        }
    }

    /// Add a grant
    pub fn grant(&mut self, g: Grant) -> &mut Self {
        self.grants.push(g);
        self
    }

    /// True if the set contains the exact grant
    pub fn has(&self, g: &Grant) -> bool {
        self.grants.contains(g)
    }

    /// True if the superuser grant is present
    pub fn is_superuser(&self) -> bool {
        self.has(&Grant::Superuser)
    }

    /// True if the explicit no-edit veto is present
    pub fn has_no_edit(&self) -> bool {
        self.has(&Grant::NoEdit)
    }

    /// Deepest level covered by a domain-scoped grant for `action` in
    /// `domain`, if any
    pub fn ceiling(&self, action: MutationAction, domain: &str) -> Option<i32> {
        self.grants
            .iter()
            .filter_map(|g| match g {
                Grant::Scoped {
                    action: a,
                    domain: d,
                    ceiling,
                } if *a == action && d == domain => Some(*ceiling),
                _ => None,
            })
            .max()
    }

    /// True if the set holds domain-admin for `domain`
    pub fn is_domain_admin(&self, domain: &str) -> bool {
        self.grants
            .iter()
            .any(|g| matches!(g, Grant::DomainAdmin { domain: d } if d == domain))
    }

    /// Iterate over all grants
    pub fn iter(&self) -> impl Iterator<Item = &Grant> {
        self.grants.iter()
    }
}

/// The acting user for a workflow request
///
/// Suspension vetoes everything before the permission matrix runs; a
/// suspended actor cannot even suggest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor id, recorded as creator on direct edits
    pub id: UserId,
    /// The actor's capability set
    pub grants: GrantSet,
    /// Suspension/ban state
    pub suspended: bool,
}

impl Actor {
    /// Actor in good standing with the given grants
    pub fn new(id: UserId, grants: GrantSet) -> Self {
        Actor {
            id,
            grants,
            suspended: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_round_trips_through_string() {
        let id = NodeId::new();
        let parsed = NodeId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn node_id_rejects_garbage() {
        assert!(NodeId::from_string("not-a-uuid").is_none());
    }

    #[test]
    fn status_classification() {
        assert!(ItemStatus::PendingNew.is_pending());
        assert!(ItemStatus::PendingUpdate.is_pending());
        assert!(!ItemStatus::Complete.is_pending());
        assert!(ItemStatus::Stub.is_live());
        assert!(!ItemStatus::Archived.is_live());
    }

    #[test]
    fn status_serializes_snake_case() {
        let s = serde_json::to_string(&ItemStatus::PendingUpdate).unwrap();
        assert_eq!(s, "\"pending_update\"");
    }

    #[test]
    fn position_root() {
        let p = Position::root();
        assert!(p.is_root());
        assert_eq!(p.domain, None);
    }

    #[test]
    fn empty_fields_detected() {
        assert!(ItemFields::default().is_empty());
        let f = ItemFields {
            title: Some("t".into()),
            ..Default::default()
        };
        assert!(!f.is_empty());
    }

    #[test]
    fn ceiling_takes_the_deepest_grant() {
        let grants = GrantSet::from_grants([
            Grant::Scoped {
                action: MutationAction::Edit,
                domain: "PHYSICAL".into(),
                ceiling: 3,
            },
            Grant::Scoped {
                action: MutationAction::Edit,
                domain: "PHYSICAL".into(),
                ceiling: 6,
            },
            Grant::Scoped {
                action: MutationAction::Create,
                domain: "PHYSICAL".into(),
                ceiling: 9,
            },
        ]);
        assert_eq!(grants.ceiling(MutationAction::Edit, "PHYSICAL"), Some(6));
        assert_eq!(grants.ceiling(MutationAction::Edit, "SOCIAL"), None);
        assert_eq!(grants.ceiling(MutationAction::Delete, "PHYSICAL"), None);
    }

    #[test]
    fn relation_ref_target_is_variant_independent() {
        let target = NodeId::new();
        let committed = RelationRef::Committed {
            kind: "references".into(),
            edge: EdgeId::new(),
            target,
        };
        let pending = RelationRef::Pending {
            original_kind: "references".into(),
            original_edge: EdgeId::new(),
            target,
        };
        assert_eq!(committed.target(), target);
        assert_eq!(pending.target(), target);
    }
}
