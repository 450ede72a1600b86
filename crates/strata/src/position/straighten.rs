//! Straight-line tuning for pass-through runs.
//!
//! A run is a maximal vertical path of nodes with exactly one predecessor, one successor and no
//! connection partners (typically the dummies of one long edge). The whole run is moved to one
//! x when every member fits there between its layer neighbours. Candidates are the x of the
//! node above the run, of the node below it, then the median of the run. When none fits, the
//! longest prefix from either end that does fit is aligned to that end.

use super::Spacing;
use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::session::{Layer, LayoutSession};
use tracing::debug;

const EPS: f64 = 1e-6;

fn pass_through(g: &Graph<NodeLabel, EdgeLabel>, v: NodeId) -> bool {
    g.in_degree(v) == 1
        && g.out_degree(v) == 1
        && g.node(v).is_some_and(|n| n.connection_count() == 0)
}

/// Maximal runs, top-down, in layer then slot order.
pub fn runs(g: &Graph<NodeLabel, EdgeLabel>, layers: &[Layer]) -> Vec<Vec<NodeId>> {
    let mut out = Vec::new();
    for layer in layers {
        for &v in &layer.nodes {
            if !pass_through(g, v) {
                continue;
            }
            let starts_run = g.predecessors(v).next().is_none_or(|u| !pass_through(g, u));
            if !starts_run {
                continue;
            }
            let mut run = vec![v];
            let mut cur = v;
            while let Some(next) = g.successors(cur).next().filter(|&w| pass_through(g, w)) {
                run.push(next);
                cur = next;
            }
            out.push(run);
        }
    }
    out
}

/// Whether `v` can sit at `x` between its current layer neighbours.
fn fits(
    g: &Graph<NodeLabel, EdgeLabel>,
    layers: &[Layer],
    spacing: &Spacing,
    v: NodeId,
    x: f64,
) -> bool {
    let Some(n) = g.node(v) else {
        return false;
    };
    let Some(layer) = n.depth.and_then(|d| layers.get(d)) else {
        return false;
    };
    let slot = n.order;
    if let Some(&left) = slot.checked_sub(1).and_then(|s| layer.nodes.get(s)) {
        let lx = g.node(left).map_or(f64::NEG_INFINITY, |l| l.x);
        if x < lx + spacing.gap(g, left, v) - EPS {
            return false;
        }
    }
    if let Some(&right) = layer.nodes.get(slot + 1) {
        let rx = g.node(right).map_or(f64::INFINITY, |r| r.x);
        if x > rx - spacing.gap(g, v, right) + EPS {
            return false;
        }
    }
    true
}

fn aligned_prefix<'a>(
    g: &Graph<NodeLabel, EdgeLabel>,
    layers: &[Layer],
    spacing: &Spacing,
    x: Option<f64>,
    nodes: impl Iterator<Item = &'a NodeId>,
) -> usize {
    x.map_or(0, |x| {
        nodes
            .take_while(|&&v| fits(g, layers, spacing, v, x))
            .count()
    })
}

fn set_x(g: &mut Graph<NodeLabel, EdgeLabel>, nodes: &[NodeId], x: f64) {
    for &v in nodes {
        if let Some(n) = g.node_mut(v) {
            n.x = x;
        }
    }
}

pub fn run(session: &mut LayoutSession, spacing: &Spacing) {
    let all = runs(&session.graph, &session.layers);
    let mut whole = 0;
    let mut partial = 0;
    for run in &all {
        if session.budget.expired() {
            session.stats.timed_out.straight_lines = true;
            break;
        }
        let g = &session.graph;
        let layers = &session.layers;
        let x_of = |v: Option<NodeId>| v.and_then(|v| g.node(v)).map(|n| n.x);
        let top = x_of(run.first().and_then(|&v| g.predecessors(v).next()));
        let bottom = x_of(run.last().and_then(|&v| g.successors(v).next()));
        let mut xs: Vec<f64> = run.iter().filter_map(|&v| x_of(Some(v))).collect();
        xs.sort_by(f64::total_cmp);
        let median = xs.get(xs.len() / 2).copied();

        let chosen = [top, bottom, median]
            .into_iter()
            .flatten()
            .find(|&x| run.iter().all(|&v| fits(g, layers, spacing, v, x)));
        if let Some(x) = chosen {
            set_x(&mut session.graph, run, x);
            whole += 1;
            continue;
        }

        let from_top = aligned_prefix(g, layers, spacing, top, run.iter());
        let from_bottom = aligned_prefix(g, layers, spacing, bottom, run.iter().rev());
        if from_top == 0 && from_bottom == 0 {
            continue;
        }
        partial += 1;
        if from_top >= from_bottom {
            if let Some(x) = top {
                set_x(&mut session.graph, &run[..from_top], x);
            }
        } else if let Some(x) = bottom {
            set_x(&mut session.graph, &run[run.len() - from_bottom..], x);
        }
    }
    debug!(runs = all.len(), whole, partial, "straightened runs");
}
