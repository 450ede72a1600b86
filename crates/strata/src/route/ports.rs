//! Port offsets: where along a node's top or bottom side each hierarchical edge attaches.

use crate::geometry;
use crate::graph::{EdgeId, Graph, NodeId};
use crate::model::{EdgeLabel, NodeKind, NodeLabel, Point};

/// Horizontal offsets from the node centre, indexed by edge index.
#[derive(Debug, Clone, Default)]
pub struct PortOffsets {
    pub source: Vec<f64>,
    pub target: Vec<f64>,
}

impl PortOffsets {
    /// With `sharing` every edge uses the centre port. Otherwise a real node's edges are spread
    /// evenly along the side in the order of their opposite endpoint's x. Edges pass label nodes
    /// along their left side.
    pub fn compute(g: &Graph<NodeLabel, EdgeLabel>, sharing: bool) -> Self {
        let mut ports = Self {
            source: vec![0.0; g.edge_bound()],
            target: vec![0.0; g.edge_bound()],
        };
        for (v, n) in g.nodes() {
            match n.kind {
                NodeKind::Dummy => {}
                NodeKind::Label => {
                    for &e in g.out_edges(v) {
                        ports.source[e.index()] = -n.width / 2.0;
                    }
                    for &e in g.in_edges(v) {
                        ports.target[e.index()] = -n.width / 2.0;
                    }
                }
                NodeKind::Real if sharing => {}
                NodeKind::Real => {
                    spread(g, n, g.out_edges(v), |e| g.target(e), &mut ports.source);
                    spread(g, n, g.in_edges(v), |e| g.source(e), &mut ports.target);
                }
            }
        }
        ports
    }

    pub fn source_point(&self, g: &Graph<NodeLabel, EdgeLabel>, e: EdgeId) -> Option<Point> {
        let n = g.node(g.source(e)?)?;
        Some(geometry::bottom_port(n, self.source[e.index()]))
    }

    pub fn target_point(&self, g: &Graph<NodeLabel, EdgeLabel>, e: EdgeId) -> Option<Point> {
        let n = g.node(g.target(e)?)?;
        Some(geometry::top_port(n, self.target[e.index()]))
    }

    /// Port x without touching y; valid before layers are moved vertically.
    pub fn source_x(&self, g: &Graph<NodeLabel, EdgeLabel>, e: EdgeId) -> Option<f64> {
        self.source_point(g, e).map(|p| p.x)
    }

    pub fn target_x(&self, g: &Graph<NodeLabel, EdgeLabel>, e: EdgeId) -> Option<f64> {
        self.target_point(g, e).map(|p| p.x)
    }
}

fn spread(
    g: &Graph<NodeLabel, EdgeLabel>,
    n: &NodeLabel,
    edges: &[EdgeId],
    other: impl Fn(EdgeId) -> Option<NodeId>,
    out: &mut [f64],
) {
    let mut sorted: Vec<(f64, usize, EdgeId)> = edges
        .iter()
        .filter_map(|&e| {
            let o = g.node(other(e)?)?;
            Some((o.x, o.order, e))
        })
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
    let m = sorted.len() as f64;
    for (k, &(_, _, e)) in sorted.iter().enumerate() {
        out[e.index()] = -n.width / 2.0 + n.width * (k as f64 + 1.0) / (m + 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unshared_ports_follow_opposite_x() {
        let mut g: Graph<NodeLabel, EdgeLabel> = Graph::new();
        let top = g.add_node(NodeLabel {
            width: 30.0,
            height: 10.0,
            ..Default::default()
        });
        let left = g.add_node(NodeLabel {
            x: -100.0,
            y: 50.0,
            ..Default::default()
        });
        let right = g.add_node(NodeLabel {
            x: 100.0,
            y: 50.0,
            ..Default::default()
        });
        let to_right = g.add_edge(top, right, EdgeLabel::default()).unwrap();
        let to_left = g.add_edge(top, left, EdgeLabel::default()).unwrap();

        let shared = PortOffsets::compute(&g, true);
        assert_eq!(shared.source[to_left.index()], 0.0);

        let spread = PortOffsets::compute(&g, false);
        assert!(spread.source[to_left.index()] < spread.source[to_right.index()]);
        let p = spread.source_point(&g, to_left).unwrap();
        assert_eq!(p, Point::new(-15.0 + 10.0, 5.0));
    }
}
