//! The layout session: graph, configuration, layers and scratch state of one computation.

use crate::budget::{Budget, CancelToken};
use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::model::{
    Arrow, Compass, EdgeKind, EdgeLabel, EdgeText, LineStyle, NodeLabel, Point, Segment, Shape,
};
use crate::stats::LayoutStats;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One horizontal row of the drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub nodes: Vec<NodeId>,
    /// Weighted crossings between this layer and the next one.
    pub crossings: u64,
    /// Set when a node of the layer carries an order hint.
    pub needs_resort: bool,
}

impl Layer {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Reusable buffers for the crossing counter.
#[derive(Debug, Clone, Default)]
pub struct CrossScratch {
    pub(crate) upper: Vec<usize>,
    pub(crate) lower: Vec<usize>,
    pub(crate) weight: Vec<u64>,
    pub(crate) by_upper: Vec<Vec<usize>>,
    pub(crate) by_lower: Vec<Vec<usize>>,
    pub(crate) prev: Vec<usize>,
    pub(crate) next: Vec<usize>,
}

/// Buffers owned by the session and reused across phases and iterations.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    pub(crate) cross: CrossScratch,
}

impl Scratch {
    /// Makes sure the crossing counter can hold `edges` entries without reallocating mid-phase.
    pub(crate) fn prepare(&mut self, edges: usize) -> Result<()> {
        self.cross.upper.try_reserve(edges)?;
        self.cross.lower.try_reserve(edges)?;
        self.cross.weight.try_reserve(edges)?;
        self.cross.prev.try_reserve(edges)?;
        self.cross.next.try_reserve(edges)?;
        Ok(())
    }
}

/// A node as handed in by the caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub id: String,
    /// Text shown inside the node; the id is used when empty.
    pub title: String,
    pub shape: Shape,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth_hint: Option<usize>,
    pub order_hint: Option<usize>,
    pub invisible: bool,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn depth_hint(mut self, depth: usize) -> Self {
        self.depth_hint = Some(depth);
        self
    }

    pub fn order_hint(mut self, order: usize) -> Self {
        self.order_hint = Some(order);
        self
    }

    pub fn invisible(mut self) -> Self {
        self.invisible = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSpecKind {
    #[default]
    Normal,
    Near,
    /// Same-rank link leaving the source at the given text line.
    Anchor(u16),
}

/// An edge as handed in by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeSpec {
    pub id: Option<String>,
    pub kind: EdgeSpecKind,
    pub priority: u32,
    pub style: LineStyle,
    pub color: Option<String>,
    pub source_arrow: Arrow,
    pub target_arrow: Arrow,
    pub label: Option<String>,
}

impl Default for EdgeSpec {
    fn default() -> Self {
        Self {
            id: None,
            kind: EdgeSpecKind::Normal,
            priority: 1,
            style: LineStyle::Solid,
            color: None,
            source_arrow: Arrow::none(),
            target_arrow: Arrow::default(),
            label: None,
        }
    }
}

impl EdgeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn near(mut self) -> Self {
        self.kind = EdgeSpecKind::Near;
        self
    }

    pub fn anchor(mut self, line: u16) -> Self {
        self.kind = EdgeSpecKind::Anchor(line);
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeInput {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub spec: EdgeSpec,
}

/// Whole-graph input keyed by string ids, as produced by a parser.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutInput {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRoute {
    pub segments: Vec<Segment>,
    pub source_orientation: Option<Compass>,
    pub target_orientation: Option<Compass>,
    pub label_pos: Option<Point>,
}

impl EdgeRoute {
    /// The route as one polyline; the shared joint between consecutive segments appears once.
    pub fn points(&self) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        for seg in &self.segments {
            for &p in &seg.points {
                if out.last() != Some(&p) {
                    out.push(p);
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResult {
    pub id: String,
    #[serde(flatten)]
    pub geometry: NodeGeometry,
    pub depth: Option<usize>,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeResult {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub route: EdgeRoute,
}

/// Snapshot of a finished layout, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeResult>,
    pub edges: Vec<EdgeResult>,
    pub stats: LayoutStats,
}

/// Owns everything one layout computation touches.
#[derive(Debug, Clone)]
pub struct LayoutSession {
    pub graph: Graph<NodeLabel, EdgeLabel>,
    pub config: LayoutConfig,
    pub layers: Vec<Layer>,
    pub stats: LayoutStats,
    pub(crate) scratch: Scratch,
    pub(crate) budget: Budget,
    cancel: Option<CancelToken>,
    ids: FxHashMap<String, NodeId>,
    computed: bool,
}

impl LayoutSession {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            graph: Graph::new(),
            config,
            layers: Vec::new(),
            stats: LayoutStats::default(),
            scratch: Scratch::default(),
            budget: Budget::unlimited(),
            cancel: None,
            ids: FxHashMap::default(),
            computed: false,
        }
    }

    /// Builds a session from string-keyed input, rejecting duplicate ids and dangling edges.
    pub fn from_input(input: LayoutInput, config: LayoutConfig) -> Result<Self> {
        let mut session = Self::new(config);
        for node in input.nodes {
            if session.ids.contains_key(&node.id) {
                return Err(LayoutError::DuplicateNode { id: node.id });
            }
            session.add_node(node);
        }
        for edge in input.edges {
            let name = edge
                .spec
                .id
                .clone()
                .unwrap_or_else(|| format!("{}->{}", edge.source, edge.target));
            let lookup = |id: &str| {
                session.node_id(id).ok_or_else(|| LayoutError::MissingNode {
                    edge: name.clone(),
                    node: id.to_string(),
                })
            };
            let v = lookup(&edge.source)?;
            let w = lookup(&edge.target)?;
            session.add_edge(v, w, edge.spec)?;
        }
        Ok(session)
    }

    pub fn add_node(&mut self, spec: NodeSpec) -> NodeId {
        let title = if spec.title.is_empty() {
            spec.id.clone()
        } else {
            spec.title
        };
        let id = self.graph.add_node(NodeLabel {
            id: spec.id.clone(),
            title,
            shape: spec.shape,
            invisible: spec.invisible,
            width: spec.width.unwrap_or(0.0),
            height: spec.height.unwrap_or(0.0),
            fixed_width: spec.width.is_some(),
            fixed_height: spec.height.is_some(),
            depth_hint: spec.depth_hint,
            order_hint: spec.order_hint,
            ..Default::default()
        });
        self.ids.entry(spec.id).or_insert(id);
        id
    }

    pub fn add_edge(&mut self, source: NodeId, target: NodeId, spec: EdgeSpec) -> Result<EdgeId> {
        for end in [source, target] {
            if !self.graph.contains_node(end) {
                return Err(LayoutError::MissingNode {
                    edge: spec.id.clone().unwrap_or_else(|| format!("{source}->{target}")),
                    node: end.to_string(),
                });
            }
        }
        let kind = match spec.kind {
            EdgeSpecKind::Normal => EdgeKind::Normal,
            EdgeSpecKind::Near => EdgeKind::Near,
            EdgeSpecKind::Anchor(line) => EdgeKind::Anchor(line),
        };
        let label = EdgeLabel {
            id: spec.id,
            kind,
            priority: spec.priority,
            style: spec.style,
            color: spec.color,
            source_arrow: spec.source_arrow,
            target_arrow: spec.target_arrow,
            label: spec.label.map(|text| EdgeText {
                text,
                ..Default::default()
            }),
            ..Default::default()
        };
        Ok(self.graph.add_edge(source, target, label)?)
    }

    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Lets a host thread abort the heuristic phases of this session's run.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Runs the whole pipeline. A session lays out at most once.
    pub fn run(&mut self) -> Result<LayoutStats> {
        crate::pipeline::layout(self)
    }

    pub(crate) fn begin(&mut self) -> Result<()> {
        if self.computed {
            return Err(LayoutError::AlreadyComputed);
        }
        self.computed = true;
        let mut budget = match self.config.time_budget_ms {
            Some(ms) => Budget::with_timeout(Duration::from_millis(ms)),
            None => Budget::unlimited(),
        };
        if let Some(token) = self.cancel.clone() {
            budget = budget.with_cancel(token);
        }
        self.budget = budget;
        self.scratch.prepare(self.graph.edge_bound())
    }

    pub fn stats(&self) -> &LayoutStats {
        &self.stats
    }

    pub fn max_depth(&self) -> usize {
        self.layers.len().saturating_sub(2)
    }

    pub fn node_geometry(&self, v: NodeId) -> Option<NodeGeometry> {
        let n = self.graph.node(v)?;
        Some(NodeGeometry {
            x: n.x,
            y: n.y,
            width: n.width,
            height: n.height,
        })
    }

    pub fn edge_route(&self, e: EdgeId) -> Option<EdgeRoute> {
        let label = self.graph.edge(e)?;
        Some(EdgeRoute {
            segments: label.route.clone(),
            source_orientation: label.source_orientation,
            target_orientation: label.target_orientation,
            label_pos: label.label_pos,
        })
    }

    pub fn result(&self) -> LayoutResult {
        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        let nodes: Vec<NodeResult> = self
            .graph
            .nodes()
            .map(|(_, n)| {
                width = width.max(n.right());
                height = height.max(n.bottom());
                NodeResult {
                    id: n.id.clone(),
                    geometry: NodeGeometry {
                        x: n.x,
                        y: n.y,
                        width: n.width,
                        height: n.height,
                    },
                    depth: n.depth,
                    order: n.order,
                }
            })
            .collect();

        let mut edges: Vec<EdgeResult> = Vec::with_capacity(self.graph.edge_count());
        for e in self.graph.edge_ids() {
            let (Some((v, w)), Some(route)) = (self.graph.endpoints(e), self.edge_route(e)) else {
                continue;
            };
            let name = |n: NodeId| self.graph.node(n).map(|l| l.id.clone()).unwrap_or_default();
            let points = route.points();
            for p in &points {
                width = width.max(p.x);
                height = height.max(p.y);
            }
            edges.push(EdgeResult {
                id: self.graph.edge(e).and_then(|l| l.id.clone()),
                source: name(v),
                target: name(w),
                points,
                route,
            });
        }

        LayoutResult {
            width: width + self.config.margin_x,
            height: height + self.config.margin_y,
            nodes,
            edges,
            stats: self.stats.clone(),
        }
    }
}
