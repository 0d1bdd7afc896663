//! In-memory graph store
//!
//! `MemoryGraph` keeps the whole graph behind a `parking_lot::RwLock` and
//! serializes write transactions: a transaction holds the writer lock for
//! its closure, buffers every write, and applies the buffer only when the
//! closure returns `Ok`. An `Err` drops the buffer, so callers never see
//! partial state. Reads within a transaction overlay the buffer on the
//! committed graph (read-your-writes).

use crate::graph::{Edge, EdgeKind, Node, NodeKind, Props};
use crate::traits::{GraphStore, GraphTxn, GraphView};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use trellis_core::{EdgeId, Error, NodeId, Result};

/// Committed graph state
#[derive(Debug, Default)]
struct GraphState {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
}

impl GraphView for GraphState {
    fn node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn edge(&self, id: EdgeId) -> Result<Option<Edge>> {
        Ok(self.edges.get(&id).cloned())
    }

    fn edges_from(&self, from: NodeId, kind: EdgeKind) -> Result<Vec<Edge>> {
        Ok(self
            .edges
            .values()
            .filter(|e| e.from == from && e.kind == kind)
            .cloned()
            .collect())
    }

    fn edges_to(&self, to: NodeId, kind: EdgeKind) -> Result<Vec<Edge>> {
        Ok(self
            .edges
            .values()
            .filter(|e| e.to == to && e.kind == kind)
            .cloned()
            .collect())
    }

    fn nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>> {
        Ok(self
            .nodes
            .values()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect())
    }
}

/// Buffered write set: `None` marks a deletion
#[derive(Debug, Default)]
struct WriteSet {
    nodes: HashMap<NodeId, Option<Node>>,
    edges: HashMap<EdgeId, Option<Edge>>,
}

impl WriteSet {
    fn apply(self, state: &mut GraphState) {
        for (id, entry) in self.nodes {
            match entry {
                Some(node) => {
                    state.nodes.insert(id, node);
                }
                None => {
                    state.nodes.remove(&id);
                }
            }
        }
        for (id, entry) in self.edges {
            match entry {
                Some(edge) => {
                    state.edges.insert(id, edge);
                }
                None => {
                    state.edges.remove(&id);
                }
            }
        }
    }
}

/// A write transaction over the in-memory graph
struct MemoryTxn<'a> {
    base: &'a GraphState,
    writes: WriteSet,
}

impl<'a> MemoryTxn<'a> {
    fn new(base: &'a GraphState) -> Self {
        MemoryTxn {
            base,
            writes: WriteSet::default(),
        }
    }

    fn node_exists(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_some())
    }
}

impl GraphView for MemoryTxn<'_> {
    fn node(&self, id: NodeId) -> Result<Option<Node>> {
        match self.writes.nodes.get(&id) {
            Some(entry) => Ok(entry.clone()),
            None => self.base.node(id),
        }
    }

    fn edge(&self, id: EdgeId) -> Result<Option<Edge>> {
        match self.writes.edges.get(&id) {
            Some(entry) => Ok(entry.clone()),
            None => self.base.edge(id),
        }
    }

    fn edges_from(&self, from: NodeId, kind: EdgeKind) -> Result<Vec<Edge>> {
        let mut edges: Vec<Edge> = self
            .base
            .edges
            .values()
            .filter(|e| !self.writes.edges.contains_key(&e.id))
            .chain(self.writes.edges.values().filter_map(Option::as_ref))
            .filter(|e| e.from == from && e.kind == kind)
            .cloned()
            .collect();
        edges.sort_by_key(|e| e.id);
        Ok(edges)
    }

    fn edges_to(&self, to: NodeId, kind: EdgeKind) -> Result<Vec<Edge>> {
        let mut edges: Vec<Edge> = self
            .base
            .edges
            .values()
            .filter(|e| !self.writes.edges.contains_key(&e.id))
            .chain(self.writes.edges.values().filter_map(Option::as_ref))
            .filter(|e| e.to == to && e.kind == kind)
            .cloned()
            .collect();
        edges.sort_by_key(|e| e.id);
        Ok(edges)
    }

    fn nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>> {
        let mut nodes: Vec<Node> = self
            .base
            .nodes
            .values()
            .filter(|n| !self.writes.nodes.contains_key(&n.id))
            .chain(self.writes.nodes.values().filter_map(Option::as_ref))
            .filter(|n| n.kind == kind)
            .cloned()
            .collect();
        nodes.sort_by_key(|n| n.id);
        Ok(nodes)
    }
}

impl GraphTxn for MemoryTxn<'_> {
    fn create_node(&mut self, kind: NodeKind, props: Props) -> Result<NodeId> {
        let id = NodeId::new();
        self.writes.nodes.insert(id, Some(Node { id, kind, props }));
        Ok(id)
    }

    fn update_node(&mut self, id: NodeId, props: Props) -> Result<()> {
        let mut node = self
            .node(id)?
            .ok_or_else(|| Error::not_found(format!("node {id}")))?;
        node.props = props;
        self.writes.nodes.insert(id, Some(node));
        Ok(())
    }

    fn delete_node(&mut self, id: NodeId) -> Result<()> {
        if !self.node_exists(id)? {
            return Err(Error::not_found(format!("node {id}")));
        }
        // Edges incident to a node never outlive it.
        let incident: Vec<EdgeId> = self
            .base
            .edges
            .values()
            .filter(|e| !self.writes.edges.contains_key(&e.id))
            .chain(self.writes.edges.values().filter_map(Option::as_ref))
            .filter(|e| e.from == id || e.to == id)
            .map(|e| e.id)
            .collect();
        for edge_id in incident {
            self.writes.edges.insert(edge_id, None);
        }
        self.writes.nodes.insert(id, None);
        Ok(())
    }

    fn create_edge(
        &mut self,
        kind: EdgeKind,
        from: NodeId,
        to: NodeId,
        props: Props,
    ) -> Result<EdgeId> {
        let id = EdgeId::new();
        self.create_edge_with_id(id, kind, from, to, props)?;
        Ok(id)
    }

    fn create_edge_with_id(
        &mut self,
        id: EdgeId,
        kind: EdgeKind,
        from: NodeId,
        to: NodeId,
        props: Props,
    ) -> Result<()> {
        if !self.node_exists(from)? {
            return Err(Error::not_found(format!("edge source {from}")));
        }
        if !self.node_exists(to)? {
            return Err(Error::not_found(format!("edge target {to}")));
        }
        if self.edge(id)?.is_some() {
            return Err(Error::Conflict(format!("edge id {id} already in use")));
        }
        self.writes.edges.insert(
            id,
            Some(Edge {
                id,
                kind,
                from,
                to,
                props,
            }),
        );
        Ok(())
    }

    fn delete_edge(&mut self, id: EdgeId) -> Result<()> {
        if self.edge(id)?.is_none() {
            return Err(Error::not_found(format!("edge {id}")));
        }
        self.writes.edges.insert(id, None);
        Ok(())
    }
}

/// In-memory transactional property-graph store
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
}

impl MemoryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphStore for MemoryGraph {
    fn read<T>(&self, f: impl FnOnce(&dyn GraphView) -> Result<T>) -> Result<T> {
        let state = self.state.read();
        f(&*state)
    }

    fn transaction<T>(&self, f: impl FnOnce(&mut dyn GraphTxn) -> Result<T>) -> Result<T> {
        let mut state = self.state.write();
        let (out, writes) = {
            let mut txn = MemoryTxn::new(&state);
            let out = f(&mut txn)?;
            (out, txn.writes)
        };
        writes.apply(&mut state);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(title: &str) -> Props {
        let mut p = Props::new();
        p.insert("title".into(), json!(title));
        p
    }

    #[test]
    fn commit_persists_writes() {
        let store = MemoryGraph::new();
        let id = store
            .transaction(|txn| txn.create_node(NodeKind::Item, props("a")))
            .unwrap();
        let found = store.read(|view| view.node(id)).unwrap().unwrap();
        assert_eq!(found.str_prop("title"), Some("a"));
    }

    #[test]
    fn error_rolls_back_everything() {
        let store = MemoryGraph::new();
        let result: Result<()> = store.transaction(|txn| {
            txn.create_node(NodeKind::Item, props("doomed"))?;
            Err(Error::Conflict("abort".into()))
        });
        assert!(result.is_err());
        let items = store
            .read(|view| view.nodes_by_kind(NodeKind::Item))
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn reads_see_own_writes() {
        let store = MemoryGraph::new();
        store
            .transaction(|txn| {
                let a = txn.create_node(NodeKind::Item, props("a"))?;
                let b = txn.create_node(NodeKind::Item, props("b"))?;
                txn.create_edge(EdgeKind::Child, a, b, Props::new())?;
                let children = txn.edges_from(a, EdgeKind::Child)?;
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].to, b);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn delete_node_cascades_incident_edges() {
        let store = MemoryGraph::new();
        let (a, b) = store
            .transaction(|txn| {
                let a = txn.create_node(NodeKind::Item, props("a"))?;
                let b = txn.create_node(NodeKind::Item, props("b"))?;
                txn.create_edge(EdgeKind::Child, a, b, Props::new())?;
                Ok((a, b))
            })
            .unwrap();
        store.transaction(|txn| txn.delete_node(b)).unwrap();
        let children = store
            .read(|view| view.edges_from(a, EdgeKind::Child))
            .unwrap();
        assert!(children.is_empty());
    }

    #[test]
    fn edge_requires_both_endpoints() {
        let store = MemoryGraph::new();
        let result = store.transaction(|txn| {
            let a = txn.create_node(NodeKind::Item, props("a"))?;
            txn.create_edge(EdgeKind::Child, a, NodeId::new(), Props::new())
        });
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn deleted_edge_invisible_within_txn() {
        let store = MemoryGraph::new();
        store
            .transaction(|txn| {
                let a = txn.create_node(NodeKind::Item, props("a"))?;
                let b = txn.create_node(NodeKind::Item, props("b"))?;
                let e = txn.create_edge(EdgeKind::Relation, a, b, Props::new())?;
                txn.delete_edge(e)?;
                assert!(txn.edge(e)?.is_none());
                assert!(txn.edges_from(a, EdgeKind::Relation)?.is_empty());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn edge_id_reuse_conflicts() {
        let store = MemoryGraph::new();
        let result = store.transaction(|txn| {
            let a = txn.create_node(NodeKind::Item, props("a"))?;
            let b = txn.create_node(NodeKind::Item, props("b"))?;
            let e = txn.create_edge(EdgeKind::Relation, a, b, Props::new())?;
            txn.create_edge_with_id(e, EdgeKind::Relation, a, b, Props::new())
        });
        assert!(matches!(result, Err(Error::Conflict(_))));
    }
}
