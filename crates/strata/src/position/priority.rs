//! Priority sweeps for horizontal placement.
//!
//! A layer is treated as a row of items (single nodes or whole connection chains with fixed
//! internal offsets). Each item wants to sit at the weighted mean x of its neighbours in the
//! reference layer(s). Items are placed in decreasing priority: a placed item never moves again
//! within the pass, and an item being placed pushes unplaced items aside as far as the nearest
//! placed one allows.

use super::Spacing;
use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::order::chains;
use crate::session::LayoutSession;
use std::cmp::Reverse;
use tracing::trace;

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Report {
    pub rounds: usize,
    pub misalignment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
    Both,
}

#[derive(Debug, Clone)]
struct Item {
    members: Vec<NodeId>,
    /// Member x relative to the first member.
    offsets: Vec<f64>,
    priority: usize,
}

impl Item {
    fn new(g: &Graph<NodeLabel, EdgeLabel>, members: Vec<NodeId>, spacing: &Spacing) -> Self {
        let mut offsets = Vec::with_capacity(members.len());
        let mut acc = 0.0;
        for (k, &v) in members.iter().enumerate() {
            if k > 0 {
                acc += spacing.gap(g, members[k - 1], v);
            }
            offsets.push(acc);
        }
        let priority = members.iter().map(|&v| node_priority(g, v)).max().unwrap_or(0);
        Self {
            members,
            offsets,
            priority,
        }
    }

    fn first(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    fn last(&self) -> Option<NodeId> {
        self.members.last().copied()
    }

    fn span(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }
}

/// Pass-through and isolated nodes yield to everything else.
pub fn node_priority(g: &Graph<NodeLabel, EdgeLabel>, v: NodeId) -> usize {
    match (g.in_degree(v), g.out_degree(v)) {
        (1, 1) | (0, 0) => 0,
        (i, o) => i + o,
    }
}

/// Sum over hierarchical edges of `weight * |dx|`.
pub fn misalignment(g: &Graph<NodeLabel, EdgeLabel>) -> f64 {
    g.attached_edge_ids()
        .filter_map(|e| {
            let (v, w) = g.endpoints(e)?;
            let dx = g.node(v)?.x - g.node(w)?.x;
            Some(g.edge(e)?.weight() * dx.abs())
        })
        .sum()
}

pub fn run(session: &mut LayoutSession, spacing: &Spacing) -> Result<Report> {
    let rows: Vec<Vec<Item>> = session
        .layers
        .iter()
        .map(|layer| {
            chains::blocks(&session.graph, &layer.nodes)
                .into_iter()
                .map(|block| Item::new(&session.graph, block, spacing))
                .collect()
        })
        .collect();
    let g = &mut session.graph;

    let bound = g.node_bound();
    let save = |g: &Graph<NodeLabel, EdgeLabel>, xs: &mut Vec<f64>| {
        xs.clear();
        xs.resize(bound, 0.0);
        for (v, n) in g.nodes() {
            xs[v.index()] = n.x;
        }
    };
    let mut best_x: Vec<f64> = Vec::new();
    best_x.try_reserve(bound)?;
    save(g, &mut best_x);
    let mut best = misalignment(g);

    let opts = &session.config.position;
    let n = rows.len();
    let mut stale = 0;
    let mut rounds = 0;
    while rounds < opts.max_sweeps && stale < opts.patience && best > EPS {
        if session.budget.expired() {
            session.stats.timed_out.coordinates = true;
            break;
        }
        let side = [Side::Above, Side::Below, Side::Both][rounds % 3];
        let rtl = rounds % 2 == 1;
        let mut moved = 0.0;
        match side {
            Side::Above => {
                for i in 1..n {
                    moved += place_row(g, &rows, i, side, rtl, spacing);
                }
            }
            Side::Below => {
                for i in (0..n.saturating_sub(1)).rev() {
                    moved += place_row(g, &rows, i, side, rtl, spacing);
                }
            }
            Side::Both => {
                for i in 0..n {
                    moved += place_row(g, &rows, i, side, rtl, spacing);
                }
            }
        }
        rounds += 1;
        let m = misalignment(g);
        trace!(round = rounds, ?side, moved, misalignment = m, "priority sweep");
        if m < best - EPS {
            best = m;
            save(g, &mut best_x);
            stale = 0;
        } else {
            stale += 1;
        }
        if moved < EPS {
            break;
        }
    }

    g.for_each_node_mut(|v, node| node.x = best_x[v.index()]);
    Ok(Report {
        rounds,
        misalignment: best,
    })
}

fn target(g: &Graph<NodeLabel, EdgeLabel>, item: &Item, depth: usize, side: Side) -> Option<f64> {
    let mut sum = 0.0;
    let mut weight = 0.0;
    for (&v, &off) in item.members.iter().zip(&item.offsets) {
        let above = matches!(side, Side::Above | Side::Both);
        let below = matches!(side, Side::Below | Side::Both);
        let ins = g.in_edges(v).iter().filter(|_| above).filter_map(|&e| {
            let u = g.node(g.source(e)?)?;
            (u.depth? + 1 == depth).then_some((u.x, g.edge(e)?.weight()))
        });
        let outs = g.out_edges(v).iter().filter(|_| below).filter_map(|&e| {
            let w = g.node(g.target(e)?)?;
            (w.depth? == depth + 1).then_some((w.x, g.edge(e)?.weight()))
        });
        for (x, w) in ins.chain(outs) {
            sum += w * (x - off);
            weight += w;
        }
    }
    (weight > 0.0).then(|| sum / weight)
}

/// Places the items of row `i`. Returns the total distance moved.
fn place_row(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    rows: &[Vec<Item>],
    i: usize,
    side: Side,
    rtl: bool,
    spacing: &Spacing,
) -> f64 {
    let row = &rows[i];
    if row.is_empty() {
        return 0.0;
    }
    let x_of = |g: &Graph<NodeLabel, EdgeLabel>, item: &Item| {
        item.first().and_then(|v| g.node(v)).map_or(0.0, |n| n.x)
    };
    let mut xs: Vec<f64> = row.iter().map(|item| x_of(g, item)).collect();
    let before = xs.clone();
    // Minimum distance from item k to item k + 1.
    let dist: Vec<f64> = row
        .windows(2)
        .map(|w| match (w[0].last(), w[1].first()) {
            (Some(a), Some(b)) => w[0].span() + spacing.gap(g, a, b),
            _ => 0.0,
        })
        .collect();

    let mut order: Vec<usize> = (0..row.len()).collect();
    if rtl {
        order.sort_by_key(|&k| (Reverse(row[k].priority), Reverse(k)));
    } else {
        order.sort_by_key(|&k| (Reverse(row[k].priority), k));
    }

    let mut placed = vec![false; row.len()];
    for k in order {
        let want = target(g, &row[k], i, side).unwrap_or(xs[k]);

        let mut lo = f64::NEG_INFINITY;
        let mut acc = 0.0;
        for j in (0..k).rev() {
            acc += dist[j];
            if placed[j] {
                lo = xs[j] + acc;
                break;
            }
        }
        let mut hi = f64::INFINITY;
        let mut acc = 0.0;
        for j in k + 1..row.len() {
            acc += dist[j - 1];
            if placed[j] {
                hi = xs[j] - acc;
                break;
            }
        }
        xs[k] = if lo > hi { lo } else { want.clamp(lo, hi) };
        placed[k] = true;

        for j in k + 1..row.len() {
            let min = xs[j - 1] + dist[j - 1];
            if xs[j] >= min - EPS {
                break;
            }
            xs[j] = min;
        }
        for j in (0..k).rev() {
            let max = xs[j + 1] - dist[j];
            if xs[j] <= max + EPS {
                break;
            }
            xs[j] = max;
        }
    }

    let mut moved = 0.0;
    for (k, item) in row.iter().enumerate() {
        moved += (xs[k] - before[k]).abs();
        for (&v, &off) in item.members.iter().zip(&item.offsets) {
            if let Some(n) = g.node_mut(v) {
                n.x = xs[k] + off;
            }
        }
    }
    moved
}
