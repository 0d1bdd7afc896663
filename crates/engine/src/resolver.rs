//! Hierarchy position resolution
//!
//! Walks incoming hierarchy edges from an item to a parentless ancestor.
//! Level is the walk length minus one (−1 for the root itself, 0 for a
//! domain root); domain is the uppercased title of the level-0 ancestor.
//!
//! Every downstream permission check acts on the result, so a corrupted
//! tree (multiple parents, a hierarchy edge from a missing node, or a
//! cycle) fails `DataIntegrity` instead of guessing. The walk carries an
//! explicit visited set even though the tree invariant should preclude
//! cycles.

use std::collections::HashSet;
use trellis_core::{Error, NodeId, Position, Result};
use trellis_store::{EdgeKind, GraphView, NodeKind};

/// Resolve an item's level and domain from current hierarchy edges
///
/// Never cached: callers re-resolve per check so a move is visible
/// immediately.
///
/// # Errors
/// `NotFound` if the item does not exist; `DataIntegrity` if the tree is
/// corrupted along the ancestor path.
pub fn resolve<V: GraphView + ?Sized>(view: &V, item: NodeId) -> Result<Position> {
    view.node(item)?
        .filter(|n| n.kind == NodeKind::Item)
        .ok_or_else(|| Error::not_found(format!("item {item}")))?;

    let mut chain = vec![item];
    let mut visited: HashSet<NodeId> = HashSet::from([item]);
    let mut current = item;

    loop {
        let parents = view.edges_to(current, EdgeKind::Child)?;
        if parents.len() > 1 {
            return Err(Error::integrity(format!(
                "item {current} has {} hierarchy parents",
                parents.len()
            )));
        }
        let Some(edge) = parents.first() else {
            break;
        };
        let parent = edge.from;
        if !visited.insert(parent) {
            return Err(Error::integrity(format!(
                "hierarchy cycle through item {parent}"
            )));
        }
        if view.node(parent)?.is_none() {
            return Err(Error::integrity(format!(
                "hierarchy edge {} from missing node {parent}",
                edge.id
            )));
        }
        chain.push(parent);
        current = parent;
    }

    if chain.len() == 1 {
        return Ok(Position::root());
    }

    // The level-0 ancestor is the child of the parentless root on the path.
    let domain_node = chain[chain.len() - 2];
    let title = view
        .node(domain_node)?
        .and_then(|n| n.str_prop("title").map(str::to_string))
        .ok_or_else(|| Error::integrity(format!("domain root {domain_node} has no title")))?;

    Ok(Position {
        level: chain.len() as i32 - 2,
        domain: Some(title.to_uppercase()),
    })
}

/// True if `candidate` is `ancestor` itself or lies underneath it
///
/// Used by move's cycle check; re-run inside the re-parenting transaction
/// so concurrent moves cannot slip a cycle past it.
pub fn is_self_or_descendant<V: GraphView + ?Sized>(
    view: &V,
    candidate: NodeId,
    ancestor: NodeId,
) -> Result<bool> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut current = candidate;
    loop {
        if current == ancestor {
            return Ok(true);
        }
        if !visited.insert(current) {
            return Err(Error::integrity(format!(
                "hierarchy cycle through item {current}"
            )));
        }
        let parents = view.edges_to(current, EdgeKind::Child)?;
        match parents.first() {
            Some(edge) if parents.len() == 1 => current = edge.from,
            Some(_) => {
                return Err(Error::integrity(format!(
                    "item {current} has multiple hierarchy parents"
                )))
            }
            None => return Ok(false),
        }
    }
}
