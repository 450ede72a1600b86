//! Arrowhead orientation at both ends of every route.

use crate::graph::{EdgeId, Graph, NodeId};
use crate::model::{Compass, EdgeLabel, NodeLabel, Point};
use rustc_hash::FxHashMap;

fn polyline(label: &EdgeLabel) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::new();
    for p in label.route.iter().flat_map(|s| s.points.iter().copied()) {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    out
}

/// Direction pointing into the node at each end: for the source from the second point to the
/// first, for the target from the second-to-last point to the last.
pub fn end_vectors(label: &EdgeLabel) -> Option<((f64, f64), (f64, f64))> {
    let pts = polyline(label);
    let [first, second, ..] = pts.as_slice() else {
        return None;
    };
    let [.., before, last] = pts.as_slice() else {
        return None;
    };
    Some((
        (first.x - second.x, first.y - second.y),
        (last.x - before.x, last.y - before.y),
    ))
}

/// Assigns `source_orientation` and `target_orientation` to every routed edge. When
/// `shared_ports` is set, the ends meeting one node at the same point all get the direction of
/// their summed vectors.
pub fn assign(g: &mut Graph<NodeLabel, EdgeLabel>, shared_ports: bool) {
    // (edge, at source, vector)
    let mut ends: Vec<(EdgeId, bool, (f64, f64))> = Vec::new();
    let mut groups: FxHashMap<(NodeId, i64, i64), Vec<usize>> = FxHashMap::default();
    for e in g.edge_ids() {
        let (Some((v, w)), Some(label)) = (g.endpoints(e), g.edge(e)) else {
            continue;
        };
        let Some((src, tgt)) = end_vectors(label) else {
            continue;
        };
        let pts = (
            label.route.first().map(|s| s.first()),
            label.route.last().map(|s| s.last()),
        );
        for (node, at_source, vec, p) in [(v, true, src, pts.0), (w, false, tgt, pts.1)] {
            let i = ends.len();
            ends.push((e, at_source, vec));
            if let Some(p) = p {
                let key = (node, p.x.round() as i64, p.y.round() as i64);
                groups.entry(key).or_default().push(i);
            }
        }
    }

    let mut dirs: Vec<Compass> = ends
        .iter()
        .map(|&(_, _, (dx, dy))| Compass::from_vector(dx, dy))
        .collect();
    if shared_ports {
        for members in groups.values().filter(|m| m.len() > 1) {
            let (sx, sy) = members.iter().fold((0.0, 0.0), |(sx, sy), &i| {
                let (_, _, (dx, dy)) = ends[i];
                (sx + dx, sy + dy)
            });
            let dir = Compass::from_vector(sx, sy);
            for &i in members {
                dirs[i] = dir;
            }
        }
    }

    for (&(e, at_source, _), dir) in ends.iter().zip(dirs) {
        if let Some(label) = g.edge_mut(e) {
            if at_source {
                label.source_orientation = Some(dir);
            } else {
                label.target_orientation = Some(dir);
            }
        }
    }
}
