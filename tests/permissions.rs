//! Permission matrix behavior observed through the engine: scoped grants,
//! deep-level flat roles, the minor-edit downgrade, and read-side gating.

mod common;

use common::{actor, body_patch, grow_chain, item, scoped, seed_tree};
use trellis::{Error, Grant, ItemStatus, MutationAction, OutcomeStatus};

#[test]
fn read_only_role_cannot_mutate() {
    let tree = seed_tree();
    let reader = actor([Grant::Read]);

    let before = tree.engine.item(tree.atoms, &reader).unwrap();
    for err in [
        tree.engine
            .patch(tree.atoms, &reader, &body_patch("no"))
            .unwrap_err(),
        tree.engine
            .create(tree.atoms, &reader, item("no", ""))
            .unwrap_err(),
        tree.engine.delete(tree.atoms, &reader).unwrap_err(),
    ] {
        assert!(matches!(err, Error::PermissionDenied(_)));
    }
    // Nothing changed and no archive was written.
    let after = tree.engine.item(tree.atoms, &tree.admin).unwrap();
    assert_eq!(before, after);
    assert!(tree
        .engine
        .history(tree.atoms, &tree.admin, 0)
        .unwrap()
        .is_empty());
}

#[test]
fn scoped_editor_works_within_ceiling_and_domain() {
    let tree = seed_tree();
    let editor = actor([Grant::Read, scoped(MutationAction::Edit, "PHYSICAL", 3)]);

    let outcome = tree
        .engine
        .patch(tree.atoms, &editor, &body_patch("within ceiling"))
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Updated);

    // Level 0 needs the separate domain-admin grant.
    let err = tree
        .engine
        .patch(tree.physical, &editor, &body_patch("no"))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
}

#[test]
fn scoped_grant_does_not_cross_domains() {
    let tree = seed_tree();
    let social = tree
        .engine
        .create(tree.root, &tree.admin, item("Social", "the social domain"))
        .unwrap()
        .id;
    let norms = tree
        .engine
        .create(social, &tree.admin, item("Norms", "shared expectations"))
        .unwrap()
        .id;

    let editor = actor([scoped(MutationAction::Edit, "PHYSICAL", 9)]);
    let err = tree
        .engine
        .patch(norms, &editor, &body_patch("no"))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
}

#[test]
fn domain_admin_edits_the_domain_root() {
    let tree = seed_tree();
    let admin = actor([Grant::DomainAdmin {
        domain: "PHYSICAL".into(),
    }]);
    let outcome = tree
        .engine
        .patch(tree.physical, &admin, &body_patch("domain root edit"))
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Updated);
}

#[test]
fn nobody_but_a_superuser_touches_the_root() {
    let tree = seed_tree();
    let strong = actor([
        Grant::DomainAdmin {
            domain: "PHYSICAL".into(),
        },
        Grant::MajorDirect,
        scoped(MutationAction::Edit, "PHYSICAL", 9),
        Grant::Suggest,
    ]);
    let err = tree
        .engine
        .patch(tree.root, &strong, &body_patch("no"))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));

    tree.engine
        .patch(tree.root, &tree.admin, &body_patch("root edit"))
        .unwrap();
}

#[test]
fn major_direct_applies_only_at_deep_levels() {
    let tree = seed_tree();
    // Atoms sits at level 2; five more links reach level 7.
    let deep = grow_chain(&tree, tree.atoms, 5);
    let major = actor([Grant::MajorDirect]);

    let outcome = tree
        .engine
        .patch(deep, &major, &body_patch("a full rewrite of the deep item"))
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Updated);

    let err = tree
        .engine
        .patch(tree.atoms, &major, &body_patch("too shallow"))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
}

#[test]
fn minor_direct_small_fix_is_applied_in_place() {
    let tree = seed_tree();
    let deep = grow_chain(&tree, tree.atoms, 5);
    let minor = actor([Grant::MinorDirect]);

    let outcome = tree
        .engine
        .patch(deep, &minor, &body_patch("chain body."))
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert_eq!(outcome.id, deep);
}

#[test]
fn minor_direct_large_change_routes_to_pending() {
    let tree = seed_tree();
    let deep = grow_chain(&tree, tree.atoms, 5);
    let minor = actor([Grant::MinorDirect]);

    let outcome = tree
        .engine
        .patch(
            deep,
            &minor,
            &body_patch("an entirely different paragraph replacing the old body wholesale"),
        )
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Pending);
    assert_ne!(outcome.id, deep);

    // The live item is untouched.
    let live = tree.engine.item(deep, &tree.admin).unwrap();
    assert_eq!(live.body, "chain body");
}

#[test]
fn no_edit_flag_vetoes_everything_else() {
    let tree = seed_tree();
    let vetoed = actor([
        Grant::NoEdit,
        Grant::MajorDirect,
        scoped(MutationAction::Edit, "PHYSICAL", 9),
        Grant::Suggest,
    ]);
    let err = tree
        .engine
        .patch(tree.atoms, &vetoed, &body_patch("no"))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
}

#[test]
fn deletion_is_never_suggestable() {
    let tree = seed_tree();
    let suggester = actor([Grant::Read, Grant::Suggest]);
    let err = tree.engine.delete(tree.atoms, &suggester).unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
    assert!(tree.engine.item(tree.atoms, &tree.admin).is_ok());
}

#[test]
fn read_gates_every_read_surface() {
    let tree = seed_tree();
    let blind = actor([Grant::Suggest]);
    assert!(matches!(
        tree.engine.item(tree.atoms, &blind),
        Err(Error::PermissionDenied(_))
    ));
    assert!(matches!(
        tree.engine.children(tree.matter, &blind),
        Err(Error::PermissionDenied(_))
    ));
    assert!(matches!(
        tree.engine.resolve_position(tree.atoms, &blind),
        Err(Error::PermissionDenied(_))
    ));
}

#[test]
fn history_needs_its_own_grant() {
    let tree = seed_tree();
    tree.engine
        .patch(tree.atoms, &tree.admin, &body_patch("v1"))
        .unwrap();

    let reader = actor([Grant::Read]);
    assert!(matches!(
        tree.engine.history(tree.atoms, &reader, 0),
        Err(Error::PermissionDenied(_))
    ));

    let historian = actor([Grant::Read, Grant::ReadHistory]);
    let page = tree.engine.history(tree.atoms, &historian, 0).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].status, ItemStatus::Archived);
}
