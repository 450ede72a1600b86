//! Node and edge label types and geometry primitives.
//!
//! These are the payloads stored in the session's [`Graph`](crate::graph::Graph). They are
//! `Clone`-friendly so phases can snapshot state cheaply.

use crate::graph::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Box,
    Rhombus,
    Ellipse,
    Triangle,
}

/// Where a triangle's apex points in the frame the node is currently laid out in. Drawings
/// always show the apex up; the layout frame of other directions sees it turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Apex {
    #[default]
    Up,
    Down,
    Left,
}

/// Real nodes come from the caller. Dummy and label nodes are inserted while long edges are
/// expanded and are gone once routing finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    Real,
    Dummy,
    Label,
}

/// One same-rank link of a node: the partner and the near/anchor edge realizing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub partner: NodeId,
    pub edge: EdgeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeLabel {
    /// External identifier (as produced by the parser); synthetic nodes leave it empty.
    pub id: String,
    pub title: String,
    pub shape: Shape,
    pub apex: Apex,
    pub kind: NodeKind,
    pub invisible: bool,

    pub width: f64,
    pub height: f64,
    /// Set per dimension the caller supplied; measurement only fills in the others.
    pub fixed_width: bool,
    pub fixed_height: bool,

    pub depth_hint: Option<usize>,
    pub order_hint: Option<usize>,

    pub depth: Option<usize>,
    pub order: usize,
    pub x: f64,
    pub y: f64,

    pub connections: [Option<Connection>; 2],
    /// For dummy and label nodes: the edge they were created for.
    pub origin: Option<EdgeId>,
}

impl NodeLabel {
    pub fn is_synthetic(&self) -> bool {
        !matches!(self.kind, NodeKind::Real)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().flatten().count()
    }

    pub fn partners(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.connections.iter().flatten().map(|c| c.partner)
    }

    pub fn is_connected_to(&self, other: NodeId) -> bool {
        self.partners().any(|p| p == other)
    }

    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    #[default]
    Normal,
    /// Hierarchical edge whose endpoints were swapped to break a cycle.
    Reversed,
    /// Self-loop kept out of the hierarchy and drawn with side ports.
    SelfLoop,
    /// Same-rank link realized through connection slots.
    Near,
    /// Same-rank link attached to a given text line of the source node.
    Anchor(u16),
    /// Parallel copy of an earlier edge between the same pair; drawn beside the primary.
    Duplicate(EdgeId),
}

impl EdgeKind {
    pub fn is_same_rank(self) -> bool {
        matches!(self, EdgeKind::Near | EdgeKind::Anchor(_))
    }

    pub fn is_hierarchical(self) -> bool {
        matches!(self, EdgeKind::Normal | EdgeKind::Reversed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Invisible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowStyle {
    None,
    #[default]
    Solid,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arrow {
    pub style: ArrowStyle,
    pub size: f64,
    pub color: Option<String>,
}

impl Default for Arrow {
    fn default() -> Self {
        Self {
            style: ArrowStyle::Solid,
            size: 10.0,
            color: None,
        }
    }
}

impl Arrow {
    pub fn none() -> Self {
        Self {
            style: ArrowStyle::None,
            size: 0.0,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeText {
    pub text: String,
    pub width: f64,
    pub height: f64,
}

/// The eight compass directions an arrowhead can point to (screen coordinates, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Compass {
    const CLOCKWISE_FROM_EAST: [Compass; 8] = [
        Compass::E,
        Compass::SE,
        Compass::S,
        Compass::SW,
        Compass::W,
        Compass::NW,
        Compass::N,
        Compass::NE,
    ];

    /// Closest direction to the vector `(dx, dy)`. A zero vector maps to `S`.
    pub fn from_vector(dx: f64, dy: f64) -> Self {
        if dx == 0.0 && dy == 0.0 {
            return Compass::S;
        }
        let angle = dy.atan2(dx);
        let sector = (angle / std::f64::consts::FRAC_PI_4).round() as i64;
        Self::CLOCKWISE_FROM_EAST[sector.rem_euclid(8) as usize]
    }

    pub fn vector(self) -> (f64, f64) {
        let d = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            Compass::N => (0.0, -1.0),
            Compass::NE => (d, -d),
            Compass::E => (1.0, 0.0),
            Compass::SE => (d, d),
            Compass::S => (0.0, 1.0),
            Compass::SW => (-d, d),
            Compass::W => (-1.0, 0.0),
            Compass::NW => (-d, -d),
        }
    }

    /// Mirror across the horizontal axis (y ↦ -y).
    pub fn flip_vertical(self) -> Self {
        let (dx, dy) = self.vector();
        Self::from_vector(dx, -dy)
    }

    /// Mirror across the main diagonal (x ↔ y).
    pub fn transpose(self) -> Self {
        let (dx, dy) = self.vector();
        Self::from_vector(dy, dx)
    }
}

/// One hop of a route: 2 to 4 points spanning one layer gap (or one port hop).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Segment {
    pub points: Vec<Point>,
}

impl Segment {
    pub fn new(points: Vec<Point>) -> Self {
        debug_assert!((2..=4).contains(&points.len()));
        Self { points }
    }

    pub fn first(&self) -> Point {
        self.points.first().copied().unwrap_or_default()
    }

    pub fn last(&self) -> Point {
        self.points.last().copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    pub id: Option<String>,
    pub kind: EdgeKind,
    pub priority: u32,
    pub style: LineStyle,
    pub color: Option<String>,
    pub source_arrow: Arrow,
    pub target_arrow: Arrow,
    pub label: Option<EdgeText>,

    /// Same-depth hierarchical edge (both ends fell into one connection group). Routed through
    /// ports.
    pub flat: bool,
    /// Short edges that realize this edge while it is expanded, in source-to-target order.
    pub chain: Vec<EdgeId>,
    /// The expanded edge this short edge belongs to.
    pub parent: Option<EdgeId>,

    pub route: Vec<Segment>,
    pub source_orientation: Option<Compass>,
    pub target_orientation: Option<Compass>,
    pub label_pos: Option<Point>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            id: None,
            kind: EdgeKind::Normal,
            priority: 1,
            style: LineStyle::Solid,
            color: None,
            source_arrow: Arrow::none(),
            target_arrow: Arrow::default(),
            label: None,
            flat: false,
            chain: Vec::new(),
            parent: None,
            route: Vec::new(),
            source_orientation: None,
            target_orientation: None,
            label_pos: None,
        }
    }
}

impl EdgeLabel {
    pub fn is_invisible(&self) -> bool {
        self.style == LineStyle::Invisible
    }

    /// Minimum depth difference this edge asks for: labelled edges leave room for a label
    /// layer.
    pub fn min_span(&self) -> usize {
        if self.label.is_some() { 2 } else { 1 }
    }

    /// Weight used by the crossing and coordinate heuristics.
    pub fn weight(&self) -> f64 {
        self.priority.max(1) as f64
    }
}
