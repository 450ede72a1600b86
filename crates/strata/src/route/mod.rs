//! Edge routing.
//!
//! Runs on the expanded graph, so every hierarchical edge spans exactly one layer gap and gets
//! exactly one segment. Detached edges are routed by kind: connection links and flat edges
//! through side or top ports, self-loops on the right side of their node. Duplicates are
//! copied from their primary once the chains have been stitched back (see [`duplicates`]).

pub mod bend_rows;
pub mod orientation;
pub mod ports;

use crate::config::EdgeStyle;
use crate::error::Result;
use crate::geometry;
use crate::graph::{EdgeId, Graph, NodeId};
use crate::model::{EdgeKind, EdgeLabel, NodeLabel, Point, Segment};
use crate::normalize::reverse_route;
use crate::position::raster::snap_up;
use crate::session::{Layer, LayoutSession};
use bend_rows::Run;
use ports::PortOffsets;
use rustc_hash::FxHashMap;
use tracing::debug;

const EPS: f64 = 1e-6;

/// Row assignment of one orthogonal hop.
#[derive(Debug, Clone, Copy)]
struct RowSlot {
    gap: usize,
    row: usize,
    rows: usize,
}

/// Top and bottom of the nodes in a layer.
fn extent(g: &Graph<NodeLabel, EdgeLabel>, layer: &Layer) -> Option<(f64, f64)> {
    let nodes = layer.nodes.iter().filter_map(|&v| g.node(v));
    let mut out: Option<(f64, f64)> = None;
    for n in nodes {
        let (top, bottom) = out.unwrap_or((n.top(), n.bottom()));
        out = Some((top.min(n.top()), bottom.max(n.bottom())));
    }
    out
}

pub fn run(session: &mut LayoutSession) -> Result<()> {
    let ports = PortOffsets::compute(&session.graph, session.config.port_sharing);
    let hops: Vec<EdgeId> = session.graph.attached_edge_ids().collect();
    let slots = match session.config.edge_style {
        EdgeStyle::Orthogonal => plan_rows(session, &ports, &hops),
        EdgeStyle::Polyline => FxHashMap::default(),
    };

    let g = &session.graph;
    let mut routes: Vec<(EdgeId, Vec<Point>)> = Vec::with_capacity(hops.len());
    for &e in &hops {
        let (Some(s), Some(t)) = (ports.source_point(g, e), ports.target_point(g, e)) else {
            continue;
        };
        let points = match slots.get(&e) {
            Some(slot) => {
                let y = row_y(g, &session.layers, *slot);
                vec![s, Point::new(s.x, y), Point::new(t.x, y), t]
            }
            None => vec![s, t],
        };
        routes.push((e, points));
    }
    routes.extend(route_detached(session));

    let g = &mut session.graph;
    let count = routes.len();
    for (e, points) in routes {
        if let Some(label) = g.edge_mut(e) {
            label.route = vec![Segment::new(points)];
        }
    }
    place_link_labels(g, session.config.label_sep);
    debug!(routes = count, bend_rows = slots.len(), "routed edges");
    Ok(())
}

/// Packs the horizontal runs of orthogonal hops into rows per layer gap and pushes lower
/// layers down where a gap is too small for its rows.
fn plan_rows(
    session: &mut LayoutSession,
    ports: &PortOffsets,
    hops: &[EdgeId],
) -> FxHashMap<EdgeId, RowSlot> {
    let bend_sep = session.config.bend_sep;
    let raster = session.config.raster_y();
    let mut slots: FxHashMap<EdgeId, RowSlot> = FxHashMap::default();
    let gaps = session.layers.len().saturating_sub(1);
    let mut per_gap: Vec<Vec<Run>> = vec![Vec::new(); gaps];
    for &e in hops {
        let g = &session.graph;
        let Some(depth) = g.source(e).and_then(|v| g.node(v)).and_then(|n| n.depth) else {
            continue;
        };
        let (Some(sx), Some(tx)) = (ports.source_x(g, e), ports.target_x(g, e)) else {
            continue;
        };
        if (sx - tx).abs() > EPS && depth < gaps {
            per_gap[depth].push(Run::new(e, sx, tx));
        }
    }

    for (d, runs) in per_gap.iter().enumerate() {
        if runs.is_empty() {
            continue;
        }
        let (row_of, rows) = bend_rows::allocate(runs, bend_sep);
        for (run, row) in runs.iter().zip(row_of) {
            slots.insert(run.edge, RowSlot { gap: d, row, rows });
        }
        let g = &session.graph;
        let (Some((_, bottom)), Some((top, _))) = (
            extent(g, &session.layers[d]),
            extent(g, &session.layers[d + 1]),
        ) else {
            continue;
        };
        let needed = bend_rows::required_gap(rows, bend_sep);
        if top - bottom + EPS < needed {
            let delta = snap_up(needed - (top - bottom), raster);
            let g = &mut session.graph;
            for layer in &session.layers[d + 1..] {
                for &v in &layer.nodes {
                    if let Some(n) = g.node_mut(v) {
                        n.y += delta;
                    }
                }
            }
            debug!(gap = d, rows, delta, "widened layer gap for bend rows");
        }
    }
    slots
}

fn row_y(g: &Graph<NodeLabel, EdgeLabel>, layers: &[Layer], slot: RowSlot) -> f64 {
    let bottom = layers
        .get(slot.gap)
        .and_then(|l| extent(g, l))
        .map_or(0.0, |(_, b)| b);
    let top = layers
        .get(slot.gap + 1)
        .and_then(|l| extent(g, l))
        .map_or(bottom, |(t, _)| t);
    bottom + (top - bottom) * (slot.row as f64 + 1.0) / (slot.rows as f64 + 1.0)
}

/// Routes for connection links, flat edges and unlabelled self-loops.
fn route_detached(session: &LayoutSession) -> Vec<(EdgeId, Vec<Point>)> {
    let g = &session.graph;
    let text = &session.config.text;
    let bend_sep = session.config.bend_sep;
    let loop_size = session.config.loop_size;
    let mut detours: FxHashMap<usize, usize> = FxHashMap::default();
    let mut loops: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut out = Vec::new();

    for e in g.edge_ids() {
        if g.is_attached(e) {
            continue;
        }
        let (Some((v, w)), Some(label)) = (g.endpoints(e), g.edge(e)) else {
            continue;
        };
        let (Some(nv), Some(nw)) = (g.node(v), g.node(w)) else {
            continue;
        };
        let points = match label.kind {
            EdgeKind::SelfLoop if label.chain.is_empty() => {
                let k = loops.entry(v).or_insert(0);
                *k += 1;
                let x = nv.right() + loop_size * *k as f64;
                let dy = nv.height / 4.0;
                vec![
                    geometry::side_port(nv, -dy, true),
                    Point::new(x, nv.y - dy),
                    Point::new(x, nv.y + dy),
                    geometry::side_port(nv, dy, true),
                ]
            }
            EdgeKind::Near | EdgeKind::Anchor(_) => {
                let row = match label.kind {
                    EdgeKind::Anchor(line) => (nv.top()
                        + text.padding
                        + text.line_height * (f64::from(line) + 0.5))
                        .clamp(nv.top(), nv.bottom()),
                    _ => nv.y,
                };
                let right = nw.x > nv.x;
                vec![
                    geometry::side_port(nv, row - nv.y, right),
                    geometry::side_port(nw, row - nw.y, !right),
                ]
            }
            EdgeKind::Normal | EdgeKind::Reversed if label.flat => {
                if nv.order.abs_diff(nw.order) == 1 {
                    let right = nw.x > nv.x;
                    vec![
                        geometry::side_port(nv, 0.0, right),
                        geometry::side_port(nw, 0.0, !right),
                    ]
                } else {
                    let depth = nv.depth.unwrap_or(0);
                    let top = session
                        .layers
                        .get(depth)
                        .and_then(|l| extent(g, l))
                        .map_or(nv.top(), |(t, _)| t);
                    let k = detours.entry(depth).or_insert(0);
                    *k += 1;
                    let y = top - bend_sep * *k as f64;
                    let (s, t) = (geometry::top_port(nv, 0.0), geometry::top_port(nw, 0.0));
                    vec![s, Point::new(s.x, y), Point::new(t.x, y), t]
                }
            }
            _ => continue,
        };
        out.push((e, points));
    }
    out
}

/// Label positions for labelled edges drawn without a label node: centred above the middle of
/// the route.
fn place_link_labels(g: &mut Graph<NodeLabel, EdgeLabel>, label_sep: f64) {
    g.for_each_edge_mut(|_, label| {
        let Some(text) = label.label.as_ref() else {
            return;
        };
        if !label.chain.is_empty() || label.route.is_empty() || label.parent.is_some() {
            return;
        }
        let Some(seg) = label.route.first() else {
            return;
        };
        let mid = match seg.points.as_slice() {
            [a, b] => Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
            [_, b, c, _] => Point::new((b.x + c.x) / 2.0, (b.y + c.y) / 2.0),
            pts => pts.first().copied().unwrap_or_default(),
        };
        label.label_pos = Some(Point::new(mid.x, mid.y - text.height / 2.0 - label_sep));
    });
}

/// Gives every parallel duplicate a copy of its primary's route, offset by `edge_sep` per
/// duplicate. End points slide along the side of the node they touch.
pub fn duplicates(session: &mut LayoutSession) -> Result<()> {
    let edge_sep = session.config.edge_sep;
    let g = &mut session.graph;
    let dups: Vec<(EdgeId, EdgeId)> = g
        .edge_ids()
        .filter_map(|e| match g.edge(e)?.kind {
            EdgeKind::Duplicate(p) => Some((e, p)),
            _ => None,
        })
        .collect();

    let mut seen: FxHashMap<EdgeId, usize> = FxHashMap::default();
    for (e, p) in dups {
        let (Some((v, w)), Some((pv, _))) = (g.endpoints(e), g.endpoints(p)) else {
            continue;
        };
        let Some(mut route) = g.edge(p).map(|l| l.route.clone()) else {
            continue;
        };
        if route.is_empty() {
            continue;
        }
        if pv != v {
            reverse_route(&mut route);
        }
        let k = seen.entry(p).or_insert(0);
        *k += 1;
        let shift = edge_sep * *k as f64;
        let (first, last) = (route[0].first(), route[route.len() - 1].last());
        let horizontal = (last.x - first.x).abs() > (last.y - first.y).abs();

        let total: usize = route.iter().map(|s| s.points.len()).sum();
        let mut idx = 0;
        for seg in &mut route {
            for pt in &mut seg.points {
                let node = if idx == 0 {
                    Some(v)
                } else if idx + 1 == total {
                    Some(w)
                } else {
                    None
                };
                *pt = match node.and_then(|n| g.node(n)) {
                    Some(n) => geometry::slide_port(n, *pt, shift),
                    None if horizontal => Point::new(pt.x, pt.y + shift),
                    None => Point::new(pt.x + shift, pt.y),
                };
                idx += 1;
            }
        }
        if let Some(label) = g.edge_mut(e) {
            label.route = route;
        }
    }
    Ok(())
}
