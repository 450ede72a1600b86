//! Coordinate assignment.
//!
//! Layers are stacked top to bottom. Inside a layer nodes are packed left to right at their
//! minimum spacing, then moved towards their neighbours by priority sweeps, straightened and
//! snapped to the raster. Every x assignment keeps the layer order and the spacing limits.

pub mod compact;
pub mod priority;
pub mod raster;
pub mod straighten;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::model::{EdgeKind, EdgeLabel, NodeKind, NodeLabel};
use crate::session::{Layer, LayoutSession};
use tracing::debug;

/// Minimum centre distances between neighbouring nodes of one layer.
#[derive(Debug, Clone)]
pub struct Spacing {
    pub node_sep: f64,
    pub edge_sep: f64,
    pub near_sep: f64,
    /// Extra room right of each node for its side loops, by node index.
    pub loop_room: Vec<f64>,
}

impl Spacing {
    pub fn new(g: &Graph<NodeLabel, EdgeLabel>, config: &LayoutConfig) -> Self {
        let mut loop_room = vec![0.0; g.node_bound()];
        for e in g.edge_ids() {
            let (Some((v, _)), Some(label)) = (g.endpoints(e), g.edge(e)) else {
                continue;
            };
            if label.kind == EdgeKind::SelfLoop && label.chain.is_empty() {
                loop_room[v.index()] += config.loop_size;
            }
        }
        Self {
            node_sep: config.node_sep,
            edge_sep: config.edge_sep,
            near_sep: config.near_sep,
            loop_room,
        }
    }

    /// Smallest allowed `x(b) - x(a)` when `a` sits directly left of `b`.
    pub fn gap(&self, g: &Graph<NodeLabel, EdgeLabel>, a: NodeId, b: NodeId) -> f64 {
        let (Some(na), Some(nb)) = (g.node(a), g.node(b)) else {
            return self.node_sep;
        };
        let sep = if na.is_connected_to(b) {
            self.near_sep
        } else if na.kind == NodeKind::Dummy || nb.kind == NodeKind::Dummy {
            self.edge_sep
        } else {
            self.node_sep
        };
        let room = self.loop_room.get(a.index()).copied().unwrap_or(0.0);
        na.width / 2.0 + sep + room + nb.width / 2.0
    }
}

/// Centre y per layer: each layer starts `rank_sep` below the previous one's bottom, and the
/// centre is snapped up to the vertical raster.
pub fn vertical(session: &mut LayoutSession) {
    let raster = session.config.raster_y();
    let rank_sep = session.config.rank_sep;
    let mut top = 0.0;
    for layer in &session.layers {
        let height = layer
            .nodes
            .iter()
            .filter_map(|&v| session.graph.node(v))
            .map(|n| n.height)
            .fold(0.0_f64, f64::max);
        let y = raster::snap_up(top + height / 2.0, raster);
        for &v in &layer.nodes {
            if let Some(n) = session.graph.node_mut(v) {
                n.y = y;
            }
        }
        top = y + height / 2.0 + rank_sep;
    }
}

/// Packs every layer left to right at minimum spacing. Returns the packed x by node index.
pub fn pack(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    layers: &[Layer],
    spacing: &Spacing,
) -> Vec<f64> {
    let mut packed = vec![0.0; g.node_bound()];
    for layer in layers {
        let mut prev: Option<(NodeId, f64)> = None;
        for &v in &layer.nodes {
            let x = match prev {
                Some((u, ux)) => ux + spacing.gap(g, u, v),
                None => g.node(v).map_or(0.0, |n| n.width / 2.0),
            };
            if let Some(n) = g.node_mut(v) {
                n.x = x;
            }
            packed[v.index()] = x;
            prev = Some((v, x));
        }
    }
    packed
}

pub fn run(session: &mut LayoutSession) -> Result<()> {
    vertical(session);
    let spacing = Spacing::new(&session.graph, &session.config);
    let packed = pack(&mut session.graph, &session.layers, &spacing);

    let report = priority::run(session, &spacing)?;
    if session.config.position.straight_lines {
        straighten::run(session, &spacing);
    }
    raster::snap_x(session, &spacing, &packed);
    if session.config.position.pull_components {
        compact::pull_components(session, &spacing);
    }
    debug!(
        rounds = report.rounds,
        misalignment = report.misalignment,
        "assigned coordinates"
    );
    Ok(())
}
