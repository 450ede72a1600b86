//! Component pull-together and final translation.

use super::Spacing;
use super::raster::snap_up;
use crate::order;
use crate::session::LayoutSession;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Bounds {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Bounds {
    fn shares_rows(&self, other: &Bounds) -> bool {
        self.top < other.bottom && other.top < self.bottom
    }
}

/// Moves weakly connected components (hierarchical edges plus connection links) next to each
/// other: in rank order, each component sits `node_sep` right of every earlier component it
/// shares rows with, or at the common left edge when it shares none. Ordering leaves components
/// contiguous and in rank order in every layer, so translating them keeps x in layer order.
pub fn pull_components(session: &mut LayoutSession, spacing: &Spacing) {
    let comps = order::components(session);
    if comps.len() < 2 {
        return;
    }
    let g = &session.graph;

    let boxes: Vec<(usize, Bounds)> = comps
        .iter()
        .enumerate()
        .filter_map(|(i, comp)| {
            let mut b = Bounds {
                left: f64::INFINITY,
                right: f64::NEG_INFINITY,
                top: f64::INFINITY,
                bottom: f64::NEG_INFINITY,
            };
            for &v in comp {
                let n = g.node(v)?;
                let room = spacing.loop_room.get(v.index()).copied().unwrap_or(0.0);
                b.left = b.left.min(n.left());
                b.right = b.right.max(n.right() + room);
                b.top = b.top.min(n.top());
                b.bottom = b.bottom.max(n.bottom());
            }
            Some((i, b))
        })
        .collect();
    let base = boxes
        .iter()
        .map(|(_, b)| b.left)
        .fold(f64::INFINITY, f64::min);
    if !base.is_finite() {
        return;
    }

    let raster = session.config.raster_x();
    let node_sep = spacing.node_sep;
    let mut placed: Vec<Bounds> = Vec::with_capacity(boxes.len());
    let mut shifts: Vec<(usize, f64)> = Vec::with_capacity(boxes.len());
    for (i, b) in boxes {
        let want = placed
            .iter()
            .filter(|p| p.shares_rows(&b))
            .map(|p| p.right + node_sep)
            .fold(base, f64::max);
        let shift = snap_up(want - b.left, raster);
        placed.push(Bounds {
            left: b.left + shift,
            right: b.right + shift,
            ..b
        });
        shifts.push((i, shift));
    }

    let g = &mut session.graph;
    for (i, shift) in shifts {
        for &v in &comps[i] {
            if let Some(n) = g.node_mut(v) {
                n.x += shift;
            }
        }
    }
    debug!(components = comps.len(), "pulled components together");
}

/// Shifts nodes, routes and label positions by `(dx, dy)`.
pub fn translate(session: &mut LayoutSession, dx: f64, dy: f64) {
    session.graph.for_each_node_mut(|_, n| {
        n.x += dx;
        n.y += dy;
    });
    session.graph.for_each_edge_mut(|_, e| {
        for seg in &mut e.route {
            for p in &mut seg.points {
                p.x += dx;
                p.y += dy;
            }
        }
        if let Some(p) = e.label_pos.as_mut() {
            p.x += dx;
            p.y += dy;
        }
    });
}

/// Translates the drawing so its top-left corner lands on the margins. The shift is rounded up
/// to the raster so snapped coordinates stay snapped.
pub fn to_margin(session: &mut LayoutSession) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for (_, n) in session.graph.nodes() {
        min_x = min_x.min(n.left());
        min_y = min_y.min(n.top());
    }
    for e in session.graph.edge_ids() {
        let Some(label) = session.graph.edge(e) else {
            continue;
        };
        for p in label.route.iter().flat_map(|s| s.points.iter()) {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
        }
    }
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }
    let dx = snap_up(session.config.margin_x - min_x, session.config.raster_x());
    let dy = snap_up(session.config.margin_y - min_y, session.config.raster_y());
    translate(session, dx, dy);
}
