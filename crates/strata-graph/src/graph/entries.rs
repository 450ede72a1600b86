//! Internal storage entries for [`Graph`](super::Graph).

use super::{EdgeId, NodeId};

#[derive(Debug, Clone)]
pub(in crate::graph) struct NodeEntry<N> {
    pub(in crate::graph) label: N,
    pub(in crate::graph) out: Vec<EdgeId>,
    pub(in crate::graph) in_: Vec<EdgeId>,
    // Every live edge touching the node, attached or detached.
    pub(in crate::graph) incident: Vec<EdgeId>,
}

impl<N> NodeEntry<N> {
    pub(in crate::graph) fn new(label: N) -> Self {
        Self {
            label,
            out: Vec::new(),
            in_: Vec::new(),
            incident: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(in crate::graph) struct EdgeEntry<E> {
    pub(in crate::graph) v: NodeId,
    pub(in crate::graph) w: NodeId,
    pub(in crate::graph) label: E,
    pub(in crate::graph) attached: bool,
}
