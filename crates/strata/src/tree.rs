//! Tree layout.
//!
//! When the oriented hierarchy is a rooted tree, nodes are placed in one post-order pass:
//! leaves go left to right from the margin and each parent is centred over its outermost
//! children. A parent wider than its children is moved right and its subtree gets a lazy
//! offset, applied in a second pre-order pass. Sibling subtrees occupy disjoint x intervals.
//! Connection satellites (nodes that only hang off a tree node through connection links) travel
//! in one block with that node.

use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::order::chains;
use crate::position::{self, Spacing, raster};
use crate::rank::units::{self, Units};
use crate::session::{Layer, LayoutSession};
use tracing::debug;

/// Shape of a tree found in the session graph.
#[derive(Debug, Clone)]
pub struct TreePlan {
    pub root: NodeId,
    /// Children in out-edge order, by node index.
    pub children: Vec<Vec<NodeId>>,
    /// Tree depth by node index; satellites share their anchor's depth.
    pub depth: Vec<usize>,
    /// Tree nodes in pre-order.
    pub preorder: Vec<NodeId>,
    units: Units,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeReport {
    /// Placement visits; one per tree node.
    pub calls: usize,
    pub max_depth: usize,
}

/// Checks whether the attached (hierarchical) edges form one rooted tree that covers every
/// node except connection satellites, with no labelled edges and no conflicting depth hint.
pub fn applicable(g: &Graph<NodeLabel, EdgeLabel>) -> Option<TreePlan> {
    let labelled = g
        .edge_ids()
        .any(|e| g.edge(e).is_some_and(|l| l.label.is_some()));
    if g.node_count() == 0 || labelled {
        return None;
    }
    let units = units::build(g);
    let satellite = |v: NodeId| {
        g.in_degree(v) == 0
            && g.out_degree(v) == 0
            && g.node(v).is_some_and(|n| n.connection_count() > 0)
    };

    let mut root: Option<NodeId> = None;
    for v in g.node_ids() {
        if satellite(v) {
            continue;
        }
        match g.in_degree(v) {
            0 if root.is_none() => root = Some(v),
            1 => {}
            _ => return None,
        }
    }
    let root = root?;

    let bound = g.node_bound();
    let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); bound];
    let mut depth = vec![0; bound];
    let mut preorder: Vec<NodeId> = Vec::with_capacity(g.node_count());
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        preorder.push(v);
        let kids: Vec<NodeId> = g.successors(v).collect();
        for &c in &kids {
            depth[c.index()] = depth[v.index()] + 1;
        }
        stack.extend(kids.iter().rev());
        children[v.index()] = kids;
    }

    // Each group holds exactly one tree node; the rest are satellites.
    let mut tree_members = vec![0usize; units.len()];
    for &v in &preorder {
        if let Some(u) = units.unit_of(v) {
            tree_members[u] += 1;
        }
    }
    if tree_members.iter().any(|&c| c != 1) {
        return None;
    }
    let mut covered = preorder.len();
    for v in g.node_ids() {
        if !satellite(v) {
            continue;
        }
        let anchor = units
            .unit_of(v)
            .and_then(|u| units.members[u].iter().copied().find(|&m| !satellite(m)))?;
        depth[v.index()] = depth[anchor.index()];
        covered += 1;
    }
    if covered != g.node_count() {
        return None;
    }
    let hints_ok = g
        .nodes()
        .all(|(v, n)| n.depth_hint.is_none_or(|h| h == depth[v.index()]));
    if !hints_ok {
        return None;
    }

    Some(TreePlan {
        root,
        children,
        depth,
        preorder,
        units,
    })
}

/// A tree node and its satellites, in chain order, with x offsets relative to the tree node.
struct Block {
    members: Vec<NodeId>,
    offsets: Vec<f64>,
    left: f64,
    right: f64,
}

fn block(g: &Graph<NodeLabel, EdgeLabel>, v: NodeId, spacing: &Spacing) -> Block {
    let members = chains::chain_of(g, v);
    let anchor = members.iter().position(|&m| m == v).unwrap_or(0);
    let mut raw = Vec::with_capacity(members.len());
    let mut acc = 0.0;
    for (k, &m) in members.iter().enumerate() {
        if k > 0 {
            acc += spacing.gap(g, members[k - 1], m);
        }
        raw.push(acc);
    }
    let base = raw[anchor];
    let offsets: Vec<f64> = raw.iter().map(|r| r - base).collect();
    let mut left = 0.0_f64;
    let mut right = 0.0_f64;
    for (&m, &off) in members.iter().zip(&offsets) {
        let Some(n) = g.node(m) else {
            continue;
        };
        let room = spacing.loop_room.get(m.index()).copied().unwrap_or(0.0);
        left = left.max(n.width / 2.0 - off);
        right = right.max(off + n.width / 2.0 + room);
    }
    Block {
        members,
        offsets,
        left,
        right,
    }
}

/// Places the tree described by `plan`, builds the layers and assigns y.
pub fn run(session: &mut LayoutSession, plan: &TreePlan) -> TreeReport {
    let mut spacing = Spacing::new(&session.graph, &session.config);
    let sep = (session.config.node_sep * session.config.tree.spread_factor).max(0.0);
    spacing.node_sep = sep;

    let g = &session.graph;
    let bound = g.node_bound();
    let max_depth = plan.preorder.iter().map(|v| plan.depth[v.index()]).max().unwrap_or(0);
    let mut x = vec![0.0_f64; bound];
    let mut offset = vec![0.0_f64; bound];
    // Cursor value when each subtree was entered.
    let mut start = vec![0.0_f64; bound];
    let blocks: Vec<Option<Block>> = {
        let mut bs: Vec<Option<Block>> = (0..bound).map(|_| None).collect();
        for &v in &plan.preorder {
            bs[v.index()] = Some(block(g, v, &spacing));
        }
        bs
    };

    // Explicit post-order: a node is placed once all of its children are. `cursor` is the
    // leftmost x still free; every finished subtree lies entirely left of it. Once the budget
    // runs out, parents are no longer centred and simply take the next free slot.
    let mut calls = 0;
    let mut hurried = false;
    let mut cursor = 0.0_f64;
    let mut stack: Vec<(NodeId, bool)> = vec![(plan.root, false)];
    while let Some((v, expanded)) = stack.pop() {
        let kids = &plan.children[v.index()];
        if !expanded {
            start[v.index()] = cursor;
            stack.push((v, true));
            stack.extend(kids.iter().rev().map(|&c| (c, false)));
            continue;
        }
        if !hurried && calls % 64 == 0 && session.budget.expired() {
            hurried = true;
        }
        calls += 1;
        let Some(b) = blocks[v.index()].as_ref() else {
            continue;
        };
        let min = start[v.index()] + b.left;
        let xv = match (kids.first(), kids.last()) {
            (Some(_), Some(_)) if hurried => min.max(cursor + b.left),
            (Some(first), Some(last)) => {
                let centred = (x[first.index()] + x[last.index()]) / 2.0;
                if centred < min {
                    let delta = min - centred;
                    offset[v.index()] += delta;
                    cursor += delta;
                    min
                } else {
                    centred
                }
            }
            _ => min,
        };
        x[v.index()] = xv;
        cursor = cursor.max(xv + b.right + sep);
    }

    // Resolve offsets top-down.
    let mut acc = vec![0.0_f64; bound];
    for &v in &plan.preorder {
        let carried = acc[v.index()] + offset[v.index()];
        for &c in &plan.children[v.index()] {
            acc[c.index()] = carried;
        }
    }

    let mut layers: Vec<Layer> = vec![Layer::default(); max_depth + 2];
    let mut placed: Vec<(NodeId, f64, usize)> = Vec::with_capacity(session.graph.node_count());
    for &v in &plan.preorder {
        let Some(b) = blocks[v.index()].as_ref() else {
            continue;
        };
        let anchor_x = x[v.index()] + acc[v.index()];
        for (&m, &off) in b.members.iter().zip(&b.offsets) {
            placed.push((m, anchor_x + off, plan.depth[v.index()]));
        }
    }
    let mut packed = vec![0.0; bound];
    for &(m, mx, d) in &placed {
        if let Some(n) = session.graph.node_mut(m) {
            n.x = mx;
            n.depth = Some(d);
        }
        packed[m.index()] = mx;
        layers[d].nodes.push(m);
    }
    for layer in &mut layers {
        let g = &session.graph;
        layer.nodes.sort_by(|&a, &b| {
            let ax = g.node(a).map_or(0.0, |n| n.x);
            let bx = g.node(b).map_or(0.0, |n| n.x);
            ax.total_cmp(&bx)
        });
        chains::sync(&mut session.graph, &layer.nodes);
    }
    session.layers = layers;
    session.stats.max_depth = max_depth;
    session.stats.timed_out.tree |= hurried;
    session.stats.crossings = 0;

    position::vertical(session);
    raster::snap_x(session, &spacing, &packed);
    debug!(calls, max_depth, hurried, groups = plan.units.len(), "placed tree");
    TreeReport { calls, max_depth }
}
