//! Layout parameters.
//!
//! Every field has a default so hosts can deserialize partial configurations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutVariant {
    #[default]
    Standard,
    MinDepth,
    MaxDepth,
    MaxDownward,
    Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    #[default]
    Polyline,
    Orthogonal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingOptions {
    pub max_iterations: usize,
    /// Consecutive non-improving sweeps tolerated before stopping.
    pub patience: usize,
    pub weight_by_priority: bool,
    pub transpose: bool,
    pub unwind: bool,
}

impl Default for CrossingOptions {
    fn default() -> Self {
        Self {
            max_iterations: 64,
            patience: 4,
            weight_by_priority: true,
            transpose: true,
            unwind: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOptions {
    pub max_sweeps: usize,
    pub patience: usize,
    pub straight_lines: bool,
    pub pull_components: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            max_sweeps: 40,
            patience: 3,
            straight_lines: true,
            pull_components: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Multiplier on the gap between sibling subtrees; below 1.0 packs children tighter under
    /// their parent.
    pub spread_factor: f64,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { spread_factor: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 16.0,
            padding: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rankdir: RankDir,
    /// Horizontal gap between neighbouring real nodes.
    pub node_sep: f64,
    /// Vertical gap between layers.
    pub rank_sep: f64,
    /// Horizontal gap next to dummy nodes and between parallel duplicates.
    pub edge_sep: f64,
    /// Horizontal gap between connection partners.
    pub near_sep: f64,
    /// Padding around edge label boxes.
    pub label_sep: f64,
    /// Vertical distance between stacked bend rows.
    pub bend_sep: f64,
    /// Horizontal reach of self-loops.
    pub loop_size: f64,
    pub raster_x: f64,
    pub raster_y: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub variant: LayoutVariant,
    pub crossing: CrossingOptions,
    pub position: PositionOptions,
    pub tree: TreeOptions,
    pub text: TextMetrics,
    /// Wall-clock budget shared by all heuristic phases of one run.
    pub time_budget_ms: Option<u64>,
    pub near_edges: bool,
    pub port_sharing: bool,
    pub edge_style: EdgeStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            node_sep: 50.0,
            rank_sep: 50.0,
            edge_sep: 20.0,
            near_sep: 20.0,
            label_sep: 4.0,
            bend_sep: 8.0,
            loop_size: 24.0,
            raster_x: 1.0,
            raster_y: 1.0,
            margin_x: 0.0,
            margin_y: 0.0,
            variant: LayoutVariant::Standard,
            crossing: CrossingOptions::default(),
            position: PositionOptions::default(),
            tree: TreeOptions::default(),
            text: TextMetrics::default(),
            time_budget_ms: None,
            near_edges: true,
            port_sharing: true,
            edge_style: EdgeStyle::Polyline,
        }
    }
}

impl LayoutConfig {
    pub(crate) fn raster_x(&self) -> f64 {
        if self.raster_x.is_finite() && self.raster_x > 0.0 {
            self.raster_x
        } else {
            1.0
        }
    }

    pub(crate) fn raster_y(&self) -> f64 {
        if self.raster_y.is_finite() && self.raster_y > 0.0 {
            self.raster_y
        } else {
            1.0
        }
    }
}
