use serde::Serialize;

/// Which placement strategy produced the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Layered,
    Tree,
}

/// Phases that stopped early because the budget ran out; their best state was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimedOut {
    pub crossings: bool,
    pub coordinates: bool,
    pub straight_lines: bool,
    pub tree: bool,
}

impl TimedOut {
    pub fn any(&self) -> bool {
        self.crossings || self.coordinates || self.straight_lines || self.tree
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutStats {
    pub max_depth: usize,
    pub crossings: u64,
    pub visible_nodes: usize,
    pub invisible_nodes: usize,
    pub visible_edges: usize,
    pub invisible_edges: usize,
    pub reversed_edges: usize,
    /// Dummy and label nodes created while long edges were expanded.
    pub dummy_nodes: usize,
    pub strategy: Strategy,
    pub timed_out: TimedOut,
}
