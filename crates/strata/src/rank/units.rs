//! Connection groups: nodes tied together by connection slots share one depth.

use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};

#[derive(Debug, Clone, Default)]
pub struct Units {
    unit_of: Vec<Option<usize>>,
    pub members: Vec<Vec<NodeId>>,
}

impl Units {
    pub fn unit_of(&self, v: NodeId) -> Option<usize> {
        self.unit_of.get(v.index()).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Groups nodes by the connected components of their connection slots, in slot order of each
/// group's first node.
pub fn build(g: &Graph<NodeLabel, EdgeLabel>) -> Units {
    let mut unit_of: Vec<Option<usize>> = vec![None; g.node_bound()];
    let mut members: Vec<Vec<NodeId>> = Vec::new();
    for start in g.node_ids() {
        if unit_of[start.index()].is_some() {
            continue;
        }
        let unit = members.len();
        let mut group: Vec<NodeId> = Vec::new();
        let mut stack: Vec<NodeId> = vec![start];
        unit_of[start.index()] = Some(unit);
        while let Some(v) = stack.pop() {
            group.push(v);
            let Some(label) = g.node(v) else {
                continue;
            };
            for p in label.partners() {
                if g.contains_node(p) && unit_of[p.index()].is_none() {
                    unit_of[p.index()] = Some(unit);
                    stack.push(p);
                }
            }
        }
        group.sort();
        members.push(group);
    }
    Units { unit_of, members }
}
