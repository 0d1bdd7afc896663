//! Shared fixtures for the integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use trellis::{
    Actor, Engine, Grant, GrantSet, ItemFields, MemoryGraph, MutationAction, NewItem, NodeId,
    UserId,
};

/// A seeded engine with a small three-level hierarchy under one domain:
/// root → Physical (level 0) → Matter (level 1) → Atoms (level 2).
pub struct Tree {
    pub engine: Engine<MemoryGraph>,
    pub admin: Actor,
    pub root: NodeId,
    pub physical: NodeId,
    pub matter: NodeId,
    pub atoms: NodeId,
}

pub fn superuser() -> Actor {
    Actor::new(UserId::new(), GrantSet::from_grants([Grant::Superuser]))
}

pub fn actor(grants: impl IntoIterator<Item = Grant>) -> Actor {
    Actor::new(UserId::new(), GrantSet::from_grants(grants))
}

pub fn scoped(action: MutationAction, domain: &str, ceiling: i32) -> Grant {
    Grant::Scoped {
        action,
        domain: domain.into(),
        ceiling,
    }
}

pub fn item(title: &str, body: &str) -> NewItem {
    NewItem {
        title: title.into(),
        body: body.into(),
        ..Default::default()
    }
}

pub fn body_patch(body: &str) -> ItemFields {
    ItemFields {
        body: Some(body.into()),
        ..Default::default()
    }
}

pub fn seed_tree() -> Tree {
    let engine = Engine::new(MemoryGraph::new());
    let admin = superuser();
    let root = engine.bootstrap_root("root", admin.id).unwrap();
    let physical = engine
        .create(root, &admin, item("Physical", "the physical domain"))
        .unwrap()
        .id;
    let matter = engine
        .create(physical, &admin, item("Matter", "states of matter"))
        .unwrap()
        .id;
    let atoms = engine
        .create(matter, &admin, item("Atoms", "smallest chemical units"))
        .unwrap()
        .id;
    Tree {
        engine,
        admin,
        root,
        physical,
        matter,
        atoms,
    }
}

/// Grow a single chain of `count` items below `from`, returning the deepest.
pub fn grow_chain(tree: &Tree, from: NodeId, count: usize) -> NodeId {
    let mut parent = from;
    for i in 0..count {
        parent = tree
            .engine
            .create(parent, &tree.admin, item(&format!("link {i}"), "chain body"))
            .unwrap()
            .id;
    }
    parent
}
