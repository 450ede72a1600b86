//! Unwinding of crossed pendant runs.
//!
//! Two neighbouring nodes whose outgoing edges cross, and that each continue downwards through
//! a run of single-in single-out nodes, are swapped together with the runs. The adjacent
//! exchange cannot find this because swapping only the heads moves the crossing one layer
//! down. A swap is kept only when the crossings over the affected layers strictly drop.

use super::chains;
use super::cross_count;
use super::transpose::pair_costs;
use crate::budget::Budget;
use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::session::{CrossScratch, Layer};

fn plain(n: &NodeLabel) -> bool {
    n.connection_count() == 0 && n.order_hint.is_none()
}

/// Nodes below `v` reached through single out-edges into single-in nodes.
fn run_below(g: &Graph<NodeLabel, EdgeLabel>, v: NodeId) -> Vec<NodeId> {
    let mut run = Vec::new();
    let mut cur = v;
    while g.out_degree(cur) == 1 {
        let Some(next) = g.successors(cur).next() else {
            break;
        };
        if g.in_degree(next) != 1 || !g.node(next).is_some_and(plain) {
            break;
        }
        run.push(next);
        cur = next;
    }
    run
}

/// Returns the number of kept swaps.
pub fn unwind(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    layers: &mut [Layer],
    weighted: bool,
    s: &mut CrossScratch,
    budget: &Budget,
) -> usize {
    let mut kept = 0;
    for i in 0..layers.len() {
        let mut j = 0;
        while j + 1 < layers[i].len() {
            if budget.expired() {
                return kept;
            }
            let (a, b) = (layers[i].nodes[j], layers[i].nodes[j + 1]);
            j += 1;
            if !(g.node(a).is_some_and(plain) && g.node(b).is_some_and(plain)) {
                continue;
            }
            let (ab, _) = pair_costs(g, layers, i, a, b, weighted);
            if ab == 0 {
                continue;
            }
            let (ra, rb) = (run_below(g, a), run_below(g, b));
            let mut pairs: Vec<(usize, NodeId, NodeId)> = vec![(i, a, b)];
            for (t, (&x, &y)) in ra.iter().zip(&rb).enumerate() {
                let depth = i + t + 1;
                let (Some(nx), Some(ny)) = (g.node(x), g.node(y)) else {
                    break;
                };
                if nx.depth != Some(depth)
                    || ny.depth != Some(depth)
                    || nx.order.abs_diff(ny.order) != 1
                {
                    break;
                }
                pairs.push((depth, x, y));
            }
            if pairs.len() < 2 {
                continue;
            }
            let last = i + pairs.len() - 1;
            let from = i.saturating_sub(1);
            let before = cross_count::range(g, layers, from, last, weighted, s);
            swap_all(g, layers, &pairs);
            let after = cross_count::range(g, layers, from, last, weighted, s);
            if after < before {
                kept += 1;
            } else {
                swap_all(g, layers, &pairs);
            }
        }
    }
    kept
}

fn swap_all(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    layers: &mut [Layer],
    pairs: &[(usize, NodeId, NodeId)],
) {
    for &(depth, x, y) in pairs {
        let (Some(ox), Some(oy)) = (g.node(x).map(|n| n.order), g.node(y).map(|n| n.order))
        else {
            continue;
        };
        layers[depth].nodes.swap(ox, oy);
        chains::sync(g, &layers[depth].nodes);
    }
}
