//! Adjacent exchange: swap neighbouring nodes while that strictly lowers the crossings with
//! both adjacent layers.

use super::cross_count::{edge_weight, slot_in};
use crate::budget::Budget;
use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::session::Layer;

fn neighbour_slots(
    g: &Graph<NodeLabel, EdgeLabel>,
    v: NodeId,
    layer: &[NodeId],
    above: bool,
    weighted: bool,
) -> Vec<(usize, u64)> {
    let edges = if above { g.in_edges(v) } else { g.out_edges(v) };
    edges
        .iter()
        .filter_map(|&e| {
            let other = if above { g.source(e)? } else { g.target(e)? };
            Some((slot_in(g, layer, other)?, edge_weight(g.edge(e)?, weighted)))
        })
        .collect()
}

/// Crossings among the edges of `a` and `b` with `a` left of `b`, and with the two swapped.
pub fn pair_costs(
    g: &Graph<NodeLabel, EdgeLabel>,
    layers: &[Layer],
    i: usize,
    a: NodeId,
    b: NodeId,
    weighted: bool,
) -> (u64, u64) {
    let mut ab = 0;
    let mut ba = 0;
    let neighbours = [(i.checked_sub(1), true), (Some(i + 1), false)];
    for (ix, above) in neighbours {
        let Some(layer) = ix.and_then(|ix| layers.get(ix)) else {
            continue;
        };
        let na = neighbour_slots(g, a, &layer.nodes, above, weighted);
        let nb = neighbour_slots(g, b, &layer.nodes, above, weighted);
        for &(sa, wa) in &na {
            for &(sb, wb) in &nb {
                if sa > sb {
                    ab += wa * wb;
                } else if sa < sb {
                    ba += wa * wb;
                }
            }
        }
    }
    (ab, ba)
}

fn swappable(g: &Graph<NodeLabel, EdgeLabel>, a: NodeId, b: NodeId) -> bool {
    let (Some(na), Some(nb)) = (g.node(a), g.node(b)) else {
        return false;
    };
    if na.connection_count() > 0 || nb.connection_count() > 0 {
        return false;
    }
    !(na.order_hint.is_some() && nb.order_hint.is_some())
}

/// Runs exchange passes over every layer until none improves. Returns the number of swaps.
/// Chain members and pairs of hinted nodes never move.
pub fn transpose(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    layers: &mut [Layer],
    weighted: bool,
    budget: &Budget,
) -> usize {
    let mut swaps = 0;
    for i in 0..layers.len() {
        loop {
            let mut improved = false;
            for j in 0..layers[i].len().saturating_sub(1) {
                let (a, b) = (layers[i].nodes[j], layers[i].nodes[j + 1]);
                if !swappable(g, a, b) {
                    continue;
                }
                let (ab, ba) = pair_costs(g, layers, i, a, b, weighted);
                if ba < ab {
                    layers[i].nodes.swap(j, j + 1);
                    if let Some(n) = g.node_mut(a) {
                        n.order = j + 1;
                    }
                    if let Some(n) = g.node_mut(b) {
                        n.order = j;
                    }
                    improved = true;
                    swaps += 1;
                }
            }
            if !improved || budget.expired() {
                break;
            }
        }
    }
    swaps
}
