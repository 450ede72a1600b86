//! Layered drawing of directed graphs.
//!
//! A [`LayoutSession`] owns the graph and runs the pipeline: cycle resolution, layer
//! assignment over connection groups, crossing reduction, coordinate assignment and edge
//! routing. Rooted trees can take a dedicated placement instead of the layered phases.

#![forbid(unsafe_code)]

pub use strata_graph as graph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod budget;
pub mod config;
pub mod coordinate_system;
pub mod cycles;
pub mod error;
pub mod geometry;
pub mod greedy_fas;
pub mod measure;
pub mod model;
pub mod normalize;
pub mod order;
pub mod pipeline;
pub mod position;
pub mod rank;
pub mod route;
pub mod session;
pub mod stats;
pub mod tree;

pub use budget::{Budget, CancelToken};
pub use config::{
    CrossingOptions, EdgeStyle, LayoutConfig, LayoutVariant, PositionOptions, RankDir,
    TextMetrics, TreeOptions,
};
pub use error::{LayoutError, Result};
pub use model::{
    Apex, Arrow, ArrowStyle, Compass, EdgeKind, EdgeLabel, LineStyle, NodeKind, NodeLabel, Point,
    Segment, Shape,
};
pub use session::{
    EdgeInput, EdgeRoute, EdgeSpec, EdgeSpecKind, LayoutInput, LayoutResult, LayoutSession,
    NodeGeometry, NodeSpec,
};
pub use stats::{LayoutStats, Strategy, TimedOut};

/// Lays out string-keyed input in one call.
pub fn layout(input: LayoutInput, config: LayoutConfig) -> Result<LayoutResult> {
    let mut session = LayoutSession::from_input(input, config)?;
    session.run()?;
    Ok(session.result())
}
