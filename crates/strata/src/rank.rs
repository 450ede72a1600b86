//! Layer assignment.
//!
//! Longest-path leveling over connection groups: a group sits at least `minlen` below every
//! predecessor group and never above its depth hint. Residual cycles between groups are
//! contracted first (see [`residual`]).

pub mod residual;
pub mod units;
pub mod variants;

use crate::config::LayoutVariant;
use crate::error::Result;
use crate::graph::{EdgeId, Graph, NodeId, alg};
use crate::model::{EdgeLabel, NodeLabel};
use crate::session::{Layer, LayoutSession};
use tracing::{debug, warn};
use units::Units;

/// Group-graph edge standing for one hierarchical edge of the layout graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitEdge {
    pub edge: EdgeId,
    pub minlen: usize,
}

#[derive(Debug, Clone)]
pub struct Leveling {
    pub units: Units,
    pub graph: Graph<usize, UnitEdge>,
    /// Group-graph node per group index.
    pub handles: Vec<NodeId>,
    pub hints: Vec<Option<usize>>,
    /// Depth per group index.
    pub depth: Vec<usize>,
    pub max_depth: usize,
    /// Edges reversed while contracting residual cycles.
    pub reversed: usize,
}

impl Leveling {
    pub fn depth_of(&self, v: NodeId) -> Option<usize> {
        self.units.unit_of(v).map(|u| self.depth[u])
    }

    /// Sum of depth differences over all hierarchical edges.
    pub fn total_span(&self) -> usize {
        self.graph
            .attached_edge_ids()
            .filter_map(|e| {
                let (a, b) = self.graph.endpoints(e)?;
                let (a, b) = (*self.graph.node(a)?, *self.graph.node(b)?);
                Some(self.depth[b].saturating_sub(self.depth[a]))
            })
            .sum()
    }
}

pub fn run(session: &mut LayoutSession) -> Result<()> {
    let mut leveling = level(&mut session.graph, true)?;
    if session.config.variant == LayoutVariant::MinDepth {
        variants::tighten(&mut leveling);
    }
    assign(session, &leveling);
    debug!(
        max_depth = leveling.max_depth,
        groups = leveling.units.len(),
        residual_reversals = leveling.reversed,
        "assigned layers"
    );
    Ok(())
}

/// Computes group depths for the current orientation of `g`. Residual cycles are reversed in
/// `g` as a side effect. Hint conflicts are logged only when `log` is set.
pub fn level(g: &mut Graph<NodeLabel, EdgeLabel>, log: bool) -> Result<Leveling> {
    let units = units::build(g);
    let hints = group_hints(g, &units, log);

    let mut graph: Graph<usize, UnitEdge> = Graph::with_capacity(units.len(), g.edge_count());
    let handles: Vec<NodeId> = (0..units.len()).map(|u| graph.add_node(u)).collect();
    let edges: Vec<EdgeId> = g.attached_edge_ids().collect();
    for e in edges {
        let (Some((v, w)), Some(label)) = (g.endpoints(e), g.edge(e)) else {
            continue;
        };
        let (Some(a), Some(b)) = (units.unit_of(v), units.unit_of(w)) else {
            continue;
        };
        if a == b {
            continue;
        }
        let minlen = label.min_span();
        graph.add_edge(handles[a], handles[b], UnitEdge { edge: e, minlen })?;
    }

    let reversed = residual::resolve(g, &mut graph)?;

    let order = match alg::topological_order(&graph) {
        Some(order) => order,
        None => {
            warn!("group graph still cyclic after contraction; leveling in slot order");
            graph.node_ids().collect()
        }
    };
    let mut depth: Vec<usize> = hints.iter().map(|h| h.unwrap_or(0)).collect();
    for u in order {
        let Some(&ui) = graph.node(u) else {
            continue;
        };
        for &e in graph.out_edges(u) {
            let (Some(w), Some(edge)) = (graph.target(e), graph.edge(e)) else {
                continue;
            };
            let Some(&wi) = graph.node(w) else {
                continue;
            };
            depth[wi] = depth[wi].max(depth[ui] + edge.minlen);
        }
    }
    let max_depth = depth.iter().copied().max().unwrap_or(0);

    Ok(Leveling {
        units,
        graph,
        handles,
        hints,
        depth,
        max_depth,
        reversed,
    })
}

/// One hint per group; members that disagree cancel the group's hint.
fn group_hints(g: &Graph<NodeLabel, EdgeLabel>, units: &Units, log: bool) -> Vec<Option<usize>> {
    units
        .members
        .iter()
        .map(|members| {
            let mut hint: Option<usize> = None;
            for &v in members {
                let Some(h) = g.node(v).and_then(|n| n.depth_hint) else {
                    continue;
                };
                match hint {
                    None => hint = Some(h),
                    Some(prev) if prev == h => {}
                    Some(_) => {
                        if log {
                            let ids: Vec<&str> = members
                                .iter()
                                .filter_map(|&m| g.node(m).map(|n| n.id.as_str()))
                                .collect();
                            warn!(
                                nodes = ?ids,
                                "conflicting depth hints in a connection group; ignoring them"
                            );
                        }
                        return None;
                    }
                }
            }
            hint
        })
        .collect()
}

/// Writes depths onto the nodes and rebuilds the layer array (`max_depth + 2` entries, the last
/// one an empty bottom boundary).
pub fn assign(session: &mut LayoutSession, leveling: &Leveling) {
    let max_depth = leveling.depth.iter().copied().max().unwrap_or(0);
    let mut layers: Vec<Layer> = vec![Layer::default(); max_depth + 2];
    session.graph.for_each_node_mut(|v, n| {
        let depth = leveling.depth_of(v).unwrap_or(0);
        n.depth = Some(depth);
        layers[depth].nodes.push(v);
        if n.order_hint.is_some() {
            layers[depth].needs_resort = true;
        }
    });
    for layer in &mut layers {
        for (i, &v) in layer.nodes.iter().enumerate() {
            if let Some(n) = session.graph.node_mut(v) {
                n.order = i;
            }
        }
    }
    session.layers = layers;
    session.stats.max_depth = max_depth;
}
