//! Normalize long edges by inserting dummy nodes.
//!
//! Every hierarchical edge spanning more than one layer is detached and replaced by a chain of
//! short edges through one synthetic node per intermediate layer, so ordering and positioning
//! only ever see edges between adjacent layers. A labelled edge gets a label node at its
//! midpoint layer. [`undo`] stitches the hop routes back onto the original edge.

use crate::error::Result;
use crate::graph::{EdgeId, NodeId};
use crate::model::{EdgeKind, EdgeLabel, NodeKind, NodeLabel, Point, Segment};
use crate::session::LayoutSession;
use tracing::debug;

pub fn run(session: &mut LayoutSession) -> Result<()> {
    let label_sep = session.config.label_sep;
    let edges: Vec<EdgeId> = session.graph.attached_edge_ids().collect();
    for e in edges {
        normalize_edge(session, e, label_sep)?;
    }
    session.stats.dummy_nodes = session
        .graph
        .nodes()
        .filter(|(_, n)| n.is_synthetic())
        .count();
    debug!(dummies = session.stats.dummy_nodes, "expanded long edges");
    Ok(())
}

fn normalize_edge(session: &mut LayoutSession, e: EdgeId, label_sep: f64) -> Result<()> {
    let g = &mut session.graph;
    let Some((v, w)) = g.endpoints(e) else {
        return Ok(());
    };
    let (Some(v_depth), Some(w_depth)) = (
        g.node(v).and_then(|n| n.depth),
        g.node(w).and_then(|n| n.depth),
    ) else {
        return Ok(());
    };
    if w_depth <= v_depth + 1 {
        return Ok(());
    }
    let Some(parent) = g.edge(e).cloned() else {
        return Ok(());
    };
    let label_depth = parent
        .label
        .as_ref()
        .map(|_| v_depth + (w_depth - v_depth) / 2);

    g.detach_edge(e)?;
    let hop = EdgeLabel {
        kind: parent.kind,
        priority: parent.priority,
        style: parent.style,
        parent: Some(e),
        ..Default::default()
    };

    let mut chain: Vec<EdgeId> = Vec::with_capacity(w_depth - v_depth);
    let mut prev = v;
    for depth in v_depth + 1..w_depth {
        let mut node = NodeLabel {
            kind: NodeKind::Dummy,
            depth: Some(depth),
            origin: Some(e),
            ..Default::default()
        };
        if label_depth == Some(depth) {
            if let Some(text) = parent.label.as_ref() {
                node.kind = NodeKind::Label;
                node.width = text.width + 2.0 * label_sep;
                node.height = text.height + 2.0 * label_sep;
            }
        }
        let d = g.add_node(node);
        if let Some(layer) = session.layers.get_mut(depth) {
            if let Some(n) = g.node_mut(d) {
                n.order = layer.nodes.len();
            }
            layer.nodes.push(d);
        }
        chain.push(g.add_edge(prev, d, hop.clone())?);
        prev = d;
    }
    chain.push(g.add_edge(prev, w, hop)?);

    if let Some(label) = g.edge_mut(e) {
        label.chain = chain;
    }
    Ok(())
}

/// Reverses a route in place: segment order and the points inside each segment.
pub fn reverse_route(route: &mut [Segment]) {
    route.reverse();
    for seg in route.iter_mut() {
        seg.points.reverse();
    }
}

/// Concatenates hop routes onto their original edges, records label positions, removes every
/// synthetic node and turns reversed edges back to their input direction.
pub fn undo(session: &mut LayoutSession) -> Result<()> {
    let g = &mut session.graph;

    let mut label_pos: Vec<(EdgeId, Point)> = Vec::new();
    for (_, n) in g.nodes() {
        if let (NodeKind::Label, Some(origin)) = (n.kind, n.origin) {
            label_pos.push((origin, Point::new(n.x, n.y)));
        }
    }

    // Hops are created after their parent, so newest first: a hop that was itself expanded
    // (the way out or back of a labelled self-loop) is whole before its parent reads it.
    let mut parents: Vec<EdgeId> = g
        .edge_ids()
        .filter(|&e| g.edge(e).is_some_and(|l| !l.chain.is_empty()))
        .collect();
    parents.sort_unstable_by(|a, b| b.cmp(a));
    for e in parents {
        let Some(parent) = g.edge(e) else {
            continue;
        };
        let parent_kind = parent.kind;
        let chain = parent.chain.clone();
        let mut route: Vec<Segment> = Vec::new();
        for h in chain {
            let Some(hop) = g.edge(h) else {
                continue;
            };
            let mut segments = hop.route.clone();
            // A hop that was reversed on its own (the way back of a labelled self-loop) runs
            // against its parent.
            if hop.kind == EdgeKind::Reversed && parent_kind != EdgeKind::Reversed {
                reverse_route(&mut segments);
            }
            route.extend(segments);
        }
        if let Some(label) = g.edge_mut(e) {
            label.route = route;
            label.chain.clear();
        }
        if parent_kind.is_hierarchical() {
            g.attach_edge(e)?;
        }
    }
    for (e, p) in label_pos {
        if let Some(label) = g.edge_mut(e) {
            label.label_pos = Some(p);
        }
    }

    let synthetic: Vec<NodeId> = g
        .nodes()
        .filter(|(_, n)| n.is_synthetic())
        .map(|(v, _)| v)
        .collect();
    for v in &synthetic {
        g.remove_node(*v);
    }
    for layer in &mut session.layers {
        layer.nodes.retain(|&v| g.contains_node(v));
        for (i, &v) in layer.nodes.iter().enumerate() {
            if let Some(n) = g.node_mut(v) {
                n.order = i;
            }
        }
    }

    let reversed: Vec<EdgeId> = g
        .edge_ids()
        .filter(|&e| g.edge(e).is_some_and(|l| l.kind == EdgeKind::Reversed))
        .collect();
    for e in reversed {
        g.reverse_edge(e)?;
        if let Some(label) = g.edge_mut(e) {
            std::mem::swap(&mut label.source_arrow, &mut label.target_arrow);
            reverse_route(&mut label.route);
            std::mem::swap(&mut label.source_orientation, &mut label.target_orientation);
        }
    }
    Ok(())
}
