//! End-to-end workflow behavior: create, patch, delete, and the archive
//! trail each direct mutation leaves behind.

mod common;

use common::{body_patch, item, seed_tree, superuser};
use trellis::{
    Engine, Error, ItemFields, ItemStatus, MemoryGraph, NewItem, OutcomeStatus,
};

#[test]
fn bootstrap_is_one_shot() {
    let engine = Engine::new(MemoryGraph::new());
    let admin = superuser();
    engine.bootstrap_root("root", admin.id).unwrap();
    let err = engine.bootstrap_root("another root", admin.id).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn create_under_root_opens_a_domain() {
    let tree = seed_tree();
    let pos = tree
        .engine
        .resolve_position(tree.physical, &tree.admin)
        .unwrap();
    assert_eq!(pos.level, 0);
    assert_eq!(pos.domain.as_deref(), Some("PHYSICAL"));

    let deep = tree.engine.resolve_position(tree.atoms, &tree.admin).unwrap();
    assert_eq!(deep.level, 2);
    assert_eq!(deep.domain.as_deref(), Some("PHYSICAL"));
}

#[test]
fn status_tracks_content_emptiness() {
    let tree = seed_tree();
    let stub = tree
        .engine
        .create(tree.matter, &tree.admin, item("Empty", ""))
        .unwrap();
    assert_eq!(
        tree.engine.item(stub.id, &tree.admin).unwrap().status,
        ItemStatus::Stub
    );

    tree.engine
        .patch(stub.id, &tree.admin, &body_patch("now it has content"))
        .unwrap();
    assert_eq!(
        tree.engine.item(stub.id, &tree.admin).unwrap().status,
        ItemStatus::Complete
    );
}

#[test]
fn direct_patch_archives_the_previous_version() {
    let tree = seed_tree();
    let before = tree.engine.item(tree.atoms, &tree.admin).unwrap();

    let outcome = tree
        .engine
        .patch(tree.atoms, &tree.admin, &body_patch("revised body"))
        .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert_eq!(outcome.id, tree.atoms);

    let live = tree.engine.item(tree.atoms, &tree.admin).unwrap();
    assert_eq!(live.body, "revised body");

    // Exactly one archive, and its fields equal the pre-patch live fields.
    let history = tree.engine.history(tree.atoms, &tree.admin, 0).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, ItemStatus::Archived);
    assert_eq!(history[0].title, before.title);
    assert_eq!(history[0].body, before.body);
    assert_eq!(history[0].creator, before.creator);
}

#[test]
fn each_patch_grows_the_chain_newest_first() {
    let tree = seed_tree();
    for i in 1..=3 {
        tree.engine
            .patch(tree.atoms, &tree.admin, &body_patch(&format!("v{i}")))
            .unwrap();
    }
    let history = tree.engine.history(tree.atoms, &tree.admin, 0).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].body, "v2");
    assert_eq!(history[1].body, "v1");
    assert_eq!(history[2].body, "smallest chemical units");
}

#[test]
fn empty_patch_is_rejected_before_any_check() {
    let tree = seed_tree();
    let err = tree
        .engine
        .patch(tree.atoms, &tree.admin, &ItemFields::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn blank_title_is_rejected() {
    let tree = seed_tree();
    let err = tree
        .engine
        .create(tree.matter, &tree.admin, item("   ", "body"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = tree
        .engine
        .patch(
            tree.atoms,
            &tree.admin,
            &ItemFields {
                title: Some("  ".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn archives_are_immutable() {
    let tree = seed_tree();
    tree.engine
        .patch(tree.atoms, &tree.admin, &body_patch("v1"))
        .unwrap();
    let archive = tree.engine.history(tree.atoms, &tree.admin, 0).unwrap()[0].id;

    let err = tree
        .engine
        .patch(archive, &tree.admin, &body_patch("tamper"))
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = tree.engine.delete(archive, &tree.admin).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn delete_cascades_subtree_and_archives() {
    let tree = seed_tree();
    tree.engine
        .patch(tree.atoms, &tree.admin, &body_patch("archived once"))
        .unwrap();
    let archive = tree.engine.history(tree.atoms, &tree.admin, 0).unwrap()[0].id;

    let outcome = tree.engine.delete(tree.matter, &tree.admin).unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Deleted);

    for id in [tree.matter, tree.atoms, archive] {
        let err = tree.engine.item(id, &tree.admin).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{id} should be gone");
    }
    // The parent survives with no dangling children.
    assert!(tree
        .engine
        .children(tree.physical, &tree.admin)
        .unwrap()
        .is_empty());
}

#[test]
fn patch_reattributes_creator_to_the_editor() {
    let tree = seed_tree();
    let editor = superuser();
    tree.engine
        .patch(tree.atoms, &editor, &body_patch("edited"))
        .unwrap();
    let live = tree.engine.item(tree.atoms, &tree.admin).unwrap();
    assert_eq!(live.creator, editor.id);

    // The archive keeps the original creator.
    let history = tree.engine.history(tree.atoms, &tree.admin, 0).unwrap();
    assert_eq!(history[0].creator, tree.admin.id);
}

#[test]
fn suspended_actor_cannot_mutate() {
    let tree = seed_tree();
    let mut banned = superuser();
    banned.suspended = true;
    let err = tree
        .engine
        .patch(tree.atoms, &banned, &body_patch("never"))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));

    let err = tree
        .engine
        .create(tree.matter, &banned, item("never", ""))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
}

#[test]
fn details_survive_archiving() {
    let tree = seed_tree();
    let with_details = tree
        .engine
        .create(
            tree.matter,
            &tree.admin,
            NewItem {
                title: "Detailed".into(),
                body: "v1".into(),
                details: vec![
                    trellis::DetailFields {
                        title: "first".into(),
                        body: "alpha".into(),
                    },
                    trellis::DetailFields {
                        title: "second".into(),
                        body: "beta".into(),
                    },
                ],
                ..Default::default()
            },
        )
        .unwrap()
        .id;

    tree.engine
        .patch(with_details, &tree.admin, &body_patch("v2"))
        .unwrap();
    let archive = tree.engine.history(with_details, &tree.admin, 0).unwrap()[0].id;
    let archived_details = tree.engine.details(archive, &tree.admin).unwrap();
    assert_eq!(archived_details.len(), 2);
    assert_eq!(archived_details[0].title, "first");
    assert_eq!(archived_details[1].title, "second");
}
