//! The layout pipeline.
//!
//! Phases run in a fixed order on one session. The tree strategy replaces layering, ordering
//! and positioning when the oriented graph is a rooted tree; everything before and after is
//! shared.

use crate::config::LayoutVariant;
use crate::error::Result;
use crate::model::EdgeKind;
use crate::session::LayoutSession;
use crate::stats::{LayoutStats, Strategy};
use crate::{coordinate_system, cycles, measure, normalize, order, position, rank, route, tree};
use tracing::debug;

pub fn layout(session: &mut LayoutSession) -> Result<LayoutStats> {
    session.begin()?;
    measure::run(session);
    coordinate_system::adjust(session);
    cycles::run(session)?;

    let plan = match session.config.variant {
        LayoutVariant::Tree => tree::applicable(&session.graph),
        _ => None,
    };
    match plan {
        Some(plan) if !session.budget.expired() => {
            tree::run(session, &plan);
            session.stats.strategy = Strategy::Tree;
        }
        plan => {
            if plan.is_some() {
                session.stats.timed_out.tree = true;
            }
            rank::run(session)?;
            normalize::run(session)?;
            order::run(session)?;
            position::run(session)?;
            session.stats.strategy = Strategy::Layered;
        }
    }

    route::run(session)?;
    normalize::undo(session)?;
    route::duplicates(session)?;
    route::orientation::assign(&mut session.graph, session.config.port_sharing);
    coordinate_system::undo(session);
    position::compact::to_margin(session);

    finish_stats(session);
    debug!(
        strategy = ?session.stats.strategy,
        max_depth = session.stats.max_depth,
        crossings = session.stats.crossings,
        reversed = session.stats.reversed_edges,
        "layout finished"
    );
    Ok(session.stats.clone())
}

fn finish_stats(session: &mut LayoutSession) {
    let g = &session.graph;
    let stats = &mut session.stats;
    stats.visible_nodes = g.nodes().filter(|(_, n)| !n.invisible).count();
    stats.invisible_nodes = g.node_count() - stats.visible_nodes;
    stats.visible_edges = 0;
    stats.invisible_edges = 0;
    stats.reversed_edges = 0;
    for e in g.edge_ids() {
        let Some(label) = g.edge(e) else {
            continue;
        };
        if label.is_invisible() {
            stats.invisible_edges += 1;
        } else {
            stats.visible_edges += 1;
        }
        if label.kind == EdgeKind::Reversed {
            stats.reversed_edges += 1;
        }
    }
}
