use super::chains;
use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::session::Layer;

/// Initial layer order from a depth-first walk over successors, starting at the shallowest
/// nodes in slot order. A node pulls its whole connection chain into the layer with it, so
/// chains start out contiguous. Order hints are applied afterwards.
pub fn init_order(g: &Graph<NodeLabel, EdgeLabel>, layers: &[Layer]) -> Vec<Vec<NodeId>> {
    let mut out: Vec<Vec<NodeId>> = layers
        .iter()
        .map(|l| Vec::with_capacity(l.len()))
        .collect();
    let mut visited = vec![false; g.node_bound()];
    let mut stack: Vec<NodeId> = Vec::new();

    for start in layers.iter().flat_map(|l| l.nodes.iter().copied()) {
        if visited[start.index()] {
            continue;
        }
        stack.push(start);
        while let Some(v) = stack.pop() {
            if visited[v.index()] {
                continue;
            }
            for member in chains::chain_of(g, v) {
                if visited[member.index()] {
                    continue;
                }
                visited[member.index()] = true;
                let depth = g.node(member).and_then(|n| n.depth).unwrap_or(0);
                if let Some(layer) = out.get_mut(depth) {
                    layer.push(member);
                }
                // Reverse so the first successor is visited first.
                let succ: Vec<NodeId> = g.successors(member).collect();
                stack.extend(succ.into_iter().rev());
            }
        }
    }

    for layer in &mut out {
        chains::apply_hints(g, layer);
    }
    out
}
