//! Barycenter reordering of one layer against a fixed neighbour layer.

use super::chains;
use super::cross_count::{self, edge_weight};
use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::session::{CrossScratch, Layer};

/// Weighted mean slot of the block's neighbours in layer `fixed`, or `None` when the block has
/// no edge into that layer.
pub fn barycenter(
    g: &Graph<NodeLabel, EdgeLabel>,
    block: &[NodeId],
    fixed: &[NodeId],
    downward: bool,
    weighted: bool,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut weight = 0.0;
    for &v in block {
        let edges = if downward { g.in_edges(v) } else { g.out_edges(v) };
        for &e in edges {
            let other = if downward { g.source(e) } else { g.target(e) };
            let (Some(other), Some(label)) = (other, g.edge(e)) else {
                continue;
            };
            let Some(slot) = cross_count::slot_in(g, fixed, other) else {
                continue;
            };
            let w = edge_weight(label, weighted) as f64;
            sum += w * slot as f64;
            weight += w;
        }
    }
    (weight > 0.0).then(|| sum / weight)
}

/// Reorders layer `i` by the barycenters of its blocks relative to the layer above
/// (`downward`) or below. Blocks without neighbours there keep their slots. Afterwards order
/// hints are re-applied and each chain keeps the orientation with fewer local crossings.
pub fn reorder_layer(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    layers: &mut [Layer],
    i: usize,
    downward: bool,
    weighted: bool,
    s: &mut CrossScratch,
) {
    let fixed_ix = if downward { i.checked_sub(1) } else { Some(i + 1) };
    let Some(fixed_ix) = fixed_ix.filter(|&f| f < layers.len()) else {
        return;
    };

    let mut bs = chains::blocks(g, &layers[i].nodes);
    let fixed = &layers[fixed_ix].nodes;
    let mut movable: Vec<(usize, f64)> = Vec::new();
    for (slot, block) in bs.iter().enumerate() {
        if let Some(b) = barycenter(g, block, fixed, downward, weighted) {
            movable.push((slot, b));
        }
    }
    let slots: Vec<usize> = movable.iter().map(|&(slot, _)| slot).collect();
    movable.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    let mut taken: Vec<Vec<NodeId>> = movable
        .iter()
        .map(|&(slot, _)| std::mem::take(&mut bs[slot]))
        .collect();
    for (&slot, block) in slots.iter().zip(taken.drain(..)) {
        bs[slot] = block;
    }

    let layer = &mut layers[i];
    layer.nodes = bs.concat();
    if layer.needs_resort {
        chains::apply_hints(g, &mut layer.nodes);
    }
    chains::sync(g, &layers[i].nodes);

    orient_chains(g, layers, i, weighted, s);
}

/// Crossings between layer `i` and both of its neighbours.
pub(super) fn local_crossings(
    g: &Graph<NodeLabel, EdgeLabel>,
    layers: &[Layer],
    i: usize,
    weighted: bool,
    s: &mut CrossScratch,
) -> u64 {
    cross_count::range(g, layers, i.saturating_sub(1), i, weighted, s)
}

/// Tries every chain of layer `i` in reverse and keeps the reversal only when it strictly
/// lowers the local crossing count.
fn orient_chains(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    layers: &mut [Layer],
    i: usize,
    weighted: bool,
    s: &mut CrossScratch,
) {
    let spans: Vec<(usize, usize)> = {
        let mut spans = Vec::new();
        let mut start = 0;
        for block in chains::blocks(g, &layers[i].nodes) {
            if block.len() > 1 {
                spans.push((start, start + block.len()));
            }
            start += block.len();
        }
        spans
    };
    for (from, to) in spans {
        let before = local_crossings(g, layers, i, weighted, s);
        layers[i].nodes[from..to].reverse();
        chains::sync(g, &layers[i].nodes);
        let after = local_crossings(g, layers, i, weighted, s);
        if after >= before {
            layers[i].nodes[from..to].reverse();
            chains::sync(g, &layers[i].nodes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layered(
        edges: &[(usize, usize)],
        top: usize,
        bottom: usize,
    ) -> (Graph<NodeLabel, EdgeLabel>, Vec<Layer>) {
        let mut g: Graph<NodeLabel, EdgeLabel> = Graph::new();
        let mut layers = vec![Layer::default(), Layer::default()];
        for (depth, count) in [(0, top), (1, bottom)] {
            for order in 0..count {
                let v = g.add_node(NodeLabel {
                    depth: Some(depth),
                    order,
                    ..Default::default()
                });
                layers[depth].nodes.push(v);
            }
        }
        let top_ids = layers[0].nodes.clone();
        let bottom_ids = layers[1].nodes.clone();
        for &(a, b) in edges {
            g.add_edge(top_ids[a], bottom_ids[b], EdgeLabel::default()).unwrap();
        }
        (g, layers)
    }

    #[test]
    fn barycenter_is_weighted_mean_slot() {
        let (g, layers) = layered(&[(0, 0), (2, 0)], 3, 1);
        let b = barycenter(&g, &layers[1].nodes[..1], &layers[0].nodes, true, true);
        assert_eq!(b, Some(1.0));
    }

    #[test]
    fn downward_reorder_removes_a_simple_crossing() {
        let (mut g, mut layers) = layered(&[(0, 1), (1, 0)], 2, 2);
        let mut s = CrossScratch::default();
        assert_eq!(cross_count::refresh(&g, &mut layers, true, &mut s), 1);
        reorder_layer(&mut g, &mut layers, 1, true, true, &mut s);
        assert_eq!(cross_count::refresh(&g, &mut layers, true, &mut s), 0);
    }

    #[test]
    fn isolated_nodes_keep_their_slot() {
        let (mut g, mut layers) = layered(&[(0, 2), (1, 0)], 2, 3);
        let isolated = layers[1].nodes[1];
        let mut s = CrossScratch::default();
        reorder_layer(&mut g, &mut layers, 1, true, true, &mut s);
        assert_eq!(layers[1].nodes[1], isolated);
    }
}
