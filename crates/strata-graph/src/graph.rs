//! The arena graph container.
//!
//! This module contains the core `Graph` container plus a small set of traversal helpers
//! exported as `strata_graph::alg`.

use crate::error::{GraphError, Result};
use rustc_hash::FxBuildHasher;

pub mod alg;
mod entries;
mod ids;

use entries::{EdgeEntry, NodeEntry};
pub use ids::{EdgeId, NodeId};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Directed multigraph with stable integer handles.
///
/// Edges can be *detached*: a detached edge keeps its slot, label and endpoints but is absent
/// from every adjacency list, so traversals skip it until it is attached again.
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Vec<Option<NodeEntry<N>>>,
    edges: Vec<Option<EdgeEntry<E>>>,
    live_nodes: usize,
    live_edges: usize,

    // Attached edges per ordered endpoint pair, in attach order.
    pairs: HashMap<(NodeId, NodeId), Vec<EdgeId>>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            live_nodes: 0,
            live_edges: 0,
            pairs: HashMap::default(),
        }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
            live_nodes: 0,
            live_edges: 0,
            pairs: HashMap::default(),
        }
    }

    fn node_entry(&self, v: NodeId) -> Option<&NodeEntry<N>> {
        self.nodes.get(v.index()).and_then(|n| n.as_ref())
    }

    fn node_entry_mut(&mut self, v: NodeId) -> Option<&mut NodeEntry<N>> {
        self.nodes.get_mut(v.index()).and_then(|n| n.as_mut())
    }

    fn edge_entry(&self, e: EdgeId) -> Option<&EdgeEntry<E>> {
        self.edges.get(e.index()).and_then(|n| n.as_ref())
    }

    fn edge_entry_mut(&mut self, e: EdgeId) -> Option<&mut EdgeEntry<E>> {
        self.edges.get_mut(e.index()).and_then(|n| n.as_mut())
    }

    /// Upper bound (exclusive) of node slot indices; handy for side tables indexed by
    /// [`NodeId::index`].
    pub fn node_bound(&self) -> usize {
        self.nodes.len()
    }

    /// Upper bound (exclusive) of edge slot indices.
    pub fn edge_bound(&self) -> usize {
        self.edges.len()
    }

    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    pub fn contains_node(&self, v: NodeId) -> bool {
        self.node_entry(v).is_some()
    }

    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edge_entry(e).is_some()
    }

    pub fn add_node(&mut self, label: N) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(NodeEntry::new(label)));
        self.live_nodes += 1;
        id
    }

    /// Removes `v` together with every edge touching it (attached or detached).
    pub fn remove_node(&mut self, v: NodeId) -> Option<N> {
        let incident = self.node_entry(v)?.incident.clone();
        for e in incident {
            let _ = self.remove_edge(e);
        }
        let entry = self.nodes.get_mut(v.index())?.take()?;
        self.live_nodes -= 1;
        Some(entry.label)
    }

    pub fn node(&self, v: NodeId) -> Option<&N> {
        self.node_entry(v).map(|n| &n.label)
    }

    pub fn node_mut(&mut self, v: NodeId) -> Option<&mut N> {
        self.node_entry_mut(v).map(|n| &mut n.label)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(ix, _)| NodeId(ix as u32))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(ix, n)| n.as_ref().map(|n| (NodeId(ix as u32), &n.label)))
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(NodeId, &mut N),
    {
        for (ix, n) in self.nodes.iter_mut().enumerate() {
            if let Some(n) = n {
                f(NodeId(ix as u32), &mut n.label);
            }
        }
    }

    /// Adds an attached edge `v -> w`. Parallel edges and self-loops are allowed.
    pub fn add_edge(&mut self, v: NodeId, w: NodeId, label: E) -> Result<EdgeId> {
        if !self.contains_node(v) {
            return Err(GraphError::MissingNode(v));
        }
        if !self.contains_node(w) {
            return Err(GraphError::MissingNode(w));
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(EdgeEntry {
            v,
            w,
            label,
            attached: false,
        }));
        self.live_edges += 1;
        if let Some(n) = self.node_entry_mut(v) {
            n.incident.push(id);
        }
        if v != w {
            if let Some(n) = self.node_entry_mut(w) {
                n.incident.push(id);
            }
        }
        self.link(id, v, w);
        Ok(id)
    }

    pub fn remove_edge(&mut self, e: EdgeId) -> Option<E> {
        let (v, w, attached) = {
            let entry = self.edge_entry(e)?;
            (entry.v, entry.w, entry.attached)
        };
        if attached {
            self.unlink(e, v, w);
        }
        for end in [v, w] {
            if let Some(n) = self.node_entry_mut(end) {
                n.incident.retain(|&x| x != e);
            }
        }
        let entry = self.edges.get_mut(e.index())?.take()?;
        self.live_edges -= 1;
        Some(entry.label)
    }

    fn link(&mut self, e: EdgeId, v: NodeId, w: NodeId) {
        if let Some(n) = self.node_entry_mut(v) {
            n.out.push(e);
        }
        if let Some(n) = self.node_entry_mut(w) {
            n.in_.push(e);
        }
        self.pairs.entry((v, w)).or_default().push(e);
        if let Some(entry) = self.edge_entry_mut(e) {
            entry.attached = true;
        }
    }

    fn unlink(&mut self, e: EdgeId, v: NodeId, w: NodeId) {
        if let Some(n) = self.node_entry_mut(v) {
            n.out.retain(|&x| x != e);
        }
        if let Some(n) = self.node_entry_mut(w) {
            n.in_.retain(|&x| x != e);
        }
        if let Some(list) = self.pairs.get_mut(&(v, w)) {
            list.retain(|&x| x != e);
            if list.is_empty() {
                self.pairs.remove(&(v, w));
            }
        }
        if let Some(entry) = self.edge_entry_mut(e) {
            entry.attached = false;
        }
    }

    /// Takes `e` out of the adjacency lists while keeping its slot. No-op when already detached.
    pub fn detach_edge(&mut self, e: EdgeId) -> Result<()> {
        let (v, w, attached) = {
            let entry = self.edge_entry(e).ok_or(GraphError::MissingEdge(e))?;
            (entry.v, entry.w, entry.attached)
        };
        if attached {
            self.unlink(e, v, w);
        }
        Ok(())
    }

    /// Puts a detached edge back at the end of its endpoints' adjacency lists.
    pub fn attach_edge(&mut self, e: EdgeId) -> Result<()> {
        let (v, w, attached) = {
            let entry = self.edge_entry(e).ok_or(GraphError::MissingEdge(e))?;
            (entry.v, entry.w, entry.attached)
        };
        if !attached {
            self.link(e, v, w);
        }
        Ok(())
    }

    pub fn is_attached(&self, e: EdgeId) -> bool {
        self.edge_entry(e).is_some_and(|e| e.attached)
    }

    /// Swaps the endpoints of `e` in place. The handle and label are preserved; an attached edge
    /// moves from `v.out`/`w.in` to `w.out`/`v.in`.
    pub fn reverse_edge(&mut self, e: EdgeId) -> Result<()> {
        let (v, w, attached) = {
            let entry = self.edge_entry(e).ok_or(GraphError::MissingEdge(e))?;
            (entry.v, entry.w, entry.attached)
        };
        if attached {
            self.unlink(e, v, w);
        }
        if let Some(entry) = self.edge_entry_mut(e) {
            entry.v = w;
            entry.w = v;
        }
        if attached {
            self.link(e, w, v);
        }
        Ok(())
    }

    pub fn edge(&self, e: EdgeId) -> Option<&E> {
        self.edge_entry(e).map(|e| &e.label)
    }

    pub fn edge_mut(&mut self, e: EdgeId) -> Option<&mut E> {
        self.edge_entry_mut(e).map(|e| &mut e.label)
    }

    pub fn endpoints(&self, e: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edge_entry(e).map(|e| (e.v, e.w))
    }

    pub fn source(&self, e: EdgeId) -> Option<NodeId> {
        self.edge_entry(e).map(|e| e.v)
    }

    pub fn target(&self, e: EdgeId) -> Option<NodeId> {
        self.edge_entry(e).map(|e| e.w)
    }

    /// Every live edge, attached or not, in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(ix, _)| EdgeId(ix as u32))
    }

    pub fn attached_edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.as_ref().is_some_and(|e| e.attached))
            .map(|(ix, _)| EdgeId(ix as u32))
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(EdgeId, &mut E),
    {
        for (ix, e) in self.edges.iter_mut().enumerate() {
            if let Some(e) = e {
                f(EdgeId(ix as u32), &mut e.label);
            }
        }
    }

    pub fn out_edges(&self, v: NodeId) -> &[EdgeId] {
        self.node_entry(v).map(|n| n.out.as_slice()).unwrap_or(&[])
    }

    pub fn in_edges(&self, v: NodeId) -> &[EdgeId] {
        self.node_entry(v).map(|n| n.in_.as_slice()).unwrap_or(&[])
    }

    pub fn out_degree(&self, v: NodeId) -> usize {
        self.out_edges(v).len()
    }

    pub fn in_degree(&self, v: NodeId) -> usize {
        self.in_edges(v).len()
    }

    /// Successor per attached out-edge (a node appears once per parallel edge).
    pub fn successors(&self, v: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(v)
            .iter()
            .filter_map(move |&e| self.target(e))
    }

    /// Predecessor per attached in-edge (a node appears once per parallel edge).
    pub fn predecessors(&self, v: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges(v).iter().filter_map(move |&e| self.source(e))
    }

    /// Attached edges from `v` to `w`, in attach order.
    pub fn edges_between(&self, v: NodeId, w: NodeId) -> &[EdgeId] {
        self.pairs.get(&(v, w)).map(|l| l.as_slice()).unwrap_or(&[])
    }

    pub fn has_edge_between(&self, v: NodeId, w: NodeId) -> bool {
        !self.edges_between(v, w).is_empty()
    }

    /// Nodes without attached in-edges, in slot order.
    pub fn sources(&self) -> Vec<NodeId> {
        self.node_ids().filter(|&v| self.in_degree(v) == 0).collect()
    }
}
