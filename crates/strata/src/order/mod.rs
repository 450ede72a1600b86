//! Node ordering / crossing minimization.
//!
//! Layers are swept alternately downwards and upwards, each layer reordered by the barycenters
//! of its blocks against the layer just fixed. The best ordering seen is kept. Adjacent
//! exchange and run unwinding polish the result; both only accept strict improvements, so the
//! final count never exceeds the count this phase started from.

pub mod barycenter;
pub mod chains;
pub mod cross_count;
mod init_order;
pub mod transpose;
pub mod unwind;

pub use init_order::init_order;

use crate::error::Result;
use crate::graph::{NodeId, alg};
use crate::session::{Layer, LayoutSession};
use tracing::{debug, trace};

fn snapshot(layers: &[Layer]) -> Vec<Vec<NodeId>> {
    layers.iter().map(|l| l.nodes.clone()).collect()
}

fn restore(session: &mut LayoutSession, snap: &[Vec<NodeId>]) {
    for (layer, nodes) in session.layers.iter_mut().zip(snap) {
        layer.nodes.clone_from(nodes);
        chains::sync(&mut session.graph, &layer.nodes);
    }
}

fn count(session: &mut LayoutSession) -> u64 {
    let weighted = session.config.crossing.weight_by_priority;
    cross_count::refresh(
        &session.graph,
        &mut session.layers,
        weighted,
        &mut session.scratch.cross,
    )
}

pub fn run(session: &mut LayoutSession) -> Result<()> {
    let opts = session.config.crossing.clone();
    let weighted = opts.weight_by_priority;

    let initial = count(session);
    let mut best_snap = snapshot(&session.layers);
    let mut best = initial;

    let seeded = init_order(&session.graph, &session.layers);
    restore(session, &seeded);
    let c = count(session);
    if c <= best {
        best = c;
        best_snap = seeded;
    } else {
        restore(session, &best_snap);
    }
    debug!(initial, seeded = c, "initial order");

    let mut stale = 0;
    let mut iter = 0;
    while best > 0 && iter < opts.max_iterations && stale < opts.patience {
        if session.budget.expired() {
            session.stats.timed_out.crossings = true;
            break;
        }
        let downward = iter % 2 == 0;
        sweep(session, downward, weighted);
        let c = count(session);
        trace!(iter, downward, crossings = c, "sweep");
        if c < best {
            best = c;
            best_snap = snapshot(&session.layers);
            stale = 0;
        } else {
            stale += 1;
        }
        iter += 1;
    }
    restore(session, &best_snap);

    if opts.transpose && best > 0 {
        let swaps = transpose::transpose(
            &mut session.graph,
            &mut session.layers,
            weighted,
            &session.budget,
        );
        trace!(swaps, "adjacent exchange");
    }
    if opts.unwind && best > 0 {
        let kept = unwind::unwind(
            &mut session.graph,
            &mut session.layers,
            weighted,
            &mut session.scratch.cross,
            &session.budget,
        );
        trace!(kept, "unwound runs");
    }

    let groups = group_components(session);
    let total = count(session);
    session.stats.crossings = total;
    debug!(initial, crossings = total, sweeps = iter, groups, "ordered layers");
    Ok(())
}

/// Weakly connected components (hierarchical edges plus connection links), ranked by where
/// they first appear when the layers are read top to bottom, left to right.
pub fn components(session: &LayoutSession) -> Vec<Vec<NodeId>> {
    let g = &session.graph;
    let links: Vec<(NodeId, NodeId)> = g
        .nodes()
        .flat_map(|(v, n)| n.partners().map(move |p| (v, p)))
        .collect();
    let comps = alg::components_with_links(g, &links);
    let mut comp_of = vec![usize::MAX; g.node_bound()];
    for (i, comp) in comps.iter().enumerate() {
        for &v in comp {
            comp_of[v.index()] = i;
        }
    }
    let mut rank = vec![usize::MAX; comps.len()];
    let mut next = 0;
    for v in session.layers.iter().flat_map(|l| l.nodes.iter()) {
        let c = comp_of[v.index()];
        if c != usize::MAX && rank[c] == usize::MAX {
            rank[c] = next;
            next += 1;
        }
    }
    let mut ranked: Vec<(usize, Vec<NodeId>)> = rank.into_iter().zip(comps).collect();
    ranked.sort_by_key(|(r, _)| *r);
    ranked.into_iter().map(|(_, comp)| comp).collect()
}

/// Makes every component contiguous in each layer, in component rank order. Order inside a
/// component is kept, so its crossings do not change and no crossings remain between
/// components. Returns the number of components.
fn group_components(session: &mut LayoutSession) -> usize {
    let comps = components(session);
    if comps.len() < 2 {
        return comps.len();
    }
    let mut rank = vec![0; session.graph.node_bound()];
    for (i, comp) in comps.iter().enumerate() {
        for &v in comp {
            rank[v.index()] = i;
        }
    }
    for layer in &mut session.layers {
        layer.nodes.sort_by_key(|v| rank[v.index()]);
        chains::sync(&mut session.graph, &layer.nodes);
    }
    comps.len()
}

fn sweep(session: &mut LayoutSession, downward: bool, weighted: bool) {
    let n = session.layers.len();
    let g = &mut session.graph;
    let layers = &mut session.layers;
    let s = &mut session.scratch.cross;
    if downward {
        for i in 1..n {
            barycenter::reorder_layer(g, layers, i, true, weighted, s);
        }
    } else {
        for i in (0..n.saturating_sub(1)).rev() {
            barycenter::reorder_layer(g, layers, i, false, weighted, s);
        }
    }
}
