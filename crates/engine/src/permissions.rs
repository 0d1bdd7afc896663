//! Permission engine
//!
//! Stateless decision functions over a capability grant set and a resolved
//! position. Nothing in here touches storage and nothing errors except on
//! malformed input, so every check is trivially re-runnable inside a
//! transaction.
//!
//! Decision order for mutations:
//! 1. superuser grants everything
//! 2. the explicit no-edit flag vetoes everything else
//! 3. the absolute root is only mutable by a superuser
//! 4. level 0 requires the separate domain-admin grant
//! 5. a domain-scoped grant covers levels 1..=ceiling in its domain
//! 6. at or beyond the deep threshold the flat roles apply
//!    (major-direct, minor-direct for edits)
//! 7. the generic suggest grant yields the pending path instead of denial
//!    (creates and edits only; deletions are never suggestable)

use serde::{Deserialize, Serialize};
use trellis_core::{
    Error, Grant, GrantSet, MutationAction, Result, UserId, DEFAULT_DEEP_LEVEL, ROOT_LEVEL,
};

/// Read-side access flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAccess {
    /// May read content at all
    pub can_read: bool,
    /// May list version history (requires `can_read`)
    pub can_history: bool,
    /// May export (requires `can_read`)
    pub can_export: bool,
}

/// Outcome of a mutation permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationDecision {
    /// Apply the mutation in place
    Direct,
    /// Apply directly only if the minor-edit classifier agrees
    MinorOnly,
    /// Route through the pending-suggestion path
    PendingOnly,
    /// Reject before any write
    Denied,
}

impl MutationDecision {
    /// True for decisions that permit some form of the mutation
    pub fn permits_anything(&self) -> bool {
        !matches!(self, MutationDecision::Denied)
    }
}

/// Stateless permission checks parameterized by the deep-level threshold
#[derive(Debug, Clone)]
pub struct PermissionEngine {
    deep_level: i32,
}

impl Default for PermissionEngine {
    fn default() -> Self {
        PermissionEngine {
            deep_level: DEFAULT_DEEP_LEVEL,
        }
    }
}

impl PermissionEngine {
    /// Permission engine with an explicit deep-level threshold
    pub fn new(deep_level: i32) -> Self {
        PermissionEngine { deep_level }
    }

    /// Read-side flags; history and export are sub-capabilities of read
    pub fn check_read(&self, grants: &GrantSet) -> ReadAccess {
        let can_read = grants.is_superuser() || grants.has(&Grant::Read);
        ReadAccess {
            can_read,
            can_history: can_read && (grants.is_superuser() || grants.has(&Grant::ReadHistory)),
            can_export: can_read && (grants.is_superuser() || grants.has(&Grant::ReadExport)),
        }
    }

    /// Decision for creating a child at (level, domain)
    ///
    /// # Errors
    /// `InvalidInput` on a level below the root or a missing domain below it.
    pub fn check_create(
        &self,
        grants: &GrantSet,
        level: i32,
        domain: Option<&str>,
    ) -> Result<MutationDecision> {
        self.check_mutation(grants, MutationAction::Create, level, domain)
    }

    /// Decision for editing an item at (level, domain)
    ///
    /// # Errors
    /// `InvalidInput` on a level below the root or a missing domain below it.
    pub fn check_edit(
        &self,
        grants: &GrantSet,
        level: i32,
        domain: Option<&str>,
    ) -> Result<MutationDecision> {
        self.check_mutation(grants, MutationAction::Edit, level, domain)
    }

    /// Decision for deleting an item at (level, domain)
    ///
    /// # Errors
    /// `InvalidInput` on a level below the root or a missing domain below it.
    pub fn check_delete(
        &self,
        grants: &GrantSet,
        level: i32,
        domain: Option<&str>,
    ) -> Result<MutationDecision> {
        self.check_mutation(grants, MutationAction::Delete, level, domain)
    }

    fn check_mutation(
        &self,
        grants: &GrantSet,
        action: MutationAction,
        level: i32,
        domain: Option<&str>,
    ) -> Result<MutationDecision> {
        if level < ROOT_LEVEL {
            return Err(Error::invalid_input(format!("level {level} out of range")));
        }
        if grants.is_superuser() {
            return Ok(MutationDecision::Direct);
        }
        if grants.has_no_edit() {
            return Ok(MutationDecision::Denied);
        }
        if level == ROOT_LEVEL {
            return Ok(MutationDecision::Denied);
        }
        let domain = domain.ok_or_else(|| {
            Error::invalid_input(format!("domain required for {action} at level {level}"))
        })?;

        if level == 0 {
            return Ok(if grants.is_domain_admin(domain) {
                MutationDecision::Direct
            } else {
                MutationDecision::Denied
            });
        }

        if let Some(ceiling) = grants.ceiling(action, domain) {
            if level <= ceiling {
                return Ok(MutationDecision::Direct);
            }
        }

        if level >= self.deep_level {
            if grants.has(&Grant::MajorDirect) {
                return Ok(MutationDecision::Direct);
            }
            if action == MutationAction::Edit && grants.has(&Grant::MinorDirect) {
                return Ok(MutationDecision::MinorOnly);
            }
        }

        if action != MutationAction::Delete && grants.has(&Grant::Suggest) {
            return Ok(MutationDecision::PendingOnly);
        }

        Ok(MutationDecision::Denied)
    }

    /// Whether a move between the two domains is allowed
    ///
    /// Same-domain moves need the lighter grant; cross-domain moves the
    /// heavier one, which also covers same-domain.
    ///
    /// # Errors
    /// `InvalidInput` if either domain is null.
    pub fn check_move(
        &self,
        grants: &GrantSet,
        from_domain: Option<&str>,
        to_domain: Option<&str>,
    ) -> Result<bool> {
        let from = from_domain.ok_or_else(|| Error::invalid_input("move source has no domain"))?;
        let to = to_domain.ok_or_else(|| Error::invalid_input("move target has no domain"))?;
        if grants.is_superuser() {
            return Ok(true);
        }
        if grants.has_no_edit() {
            return Ok(false);
        }
        if from == to {
            Ok(grants.has(&Grant::MoveWithin) || grants.has(&Grant::MoveAcross))
        } else {
            Ok(grants.has(&Grant::MoveAcross))
        }
    }

    /// Whether `requester` may approve a suggestion authored by `author`
    /// for an item at (level, domain)
    ///
    /// Approval is derivative of edit capability: it needs the approval
    /// grant, no self-approval, and an independent direct create/edit
    /// capability at the target position.
    ///
    /// # Errors
    /// `InvalidInput` on malformed level/domain.
    pub fn check_moderator(
        &self,
        grants: &GrantSet,
        requester: UserId,
        author: UserId,
        level: i32,
        domain: Option<&str>,
    ) -> Result<bool> {
        if requester == author {
            return Ok(false);
        }
        if !grants.has(&Grant::Approve) && !grants.is_superuser() {
            return Ok(false);
        }
        let edit = self.check_edit(grants, level, domain)?;
        if matches!(edit, MutationDecision::Direct | MutationDecision::MinorOnly) {
            return Ok(true);
        }
        let create = self.check_create(grants, level, domain)?;
        Ok(create == MutationDecision::Direct)
    }
}
