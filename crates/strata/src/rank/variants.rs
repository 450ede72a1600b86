//! Orientation candidates for the depth-driven layout variants.

use super::{Leveling, level};
use crate::config::LayoutVariant;
use crate::cycles;
use crate::error::Result;
use crate::graph::{EdgeId, Graph, alg};
use crate::greedy_fas::greedy_fas;
use crate::model::{EdgeLabel, NodeLabel};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Score {
    max_depth: usize,
    reversed: usize,
}

/// Evaluates the insertion-order DFS, the sources-first DFS and the greedy feedback arc set on
/// copies of `g` and returns the edge set the variant prefers. Ties go to the earlier
/// candidate.
pub fn choose_orientation(
    g: &Graph<NodeLabel, EdgeLabel>,
    variant: LayoutVariant,
) -> Result<Vec<EdgeId>> {
    let insertion: Vec<_> = g.node_ids().collect();
    let candidates: [(&str, Vec<EdgeId>); 3] = [
        ("insertion", cycles::dfs_back_edges(g, &insertion)),
        ("sources-first", cycles::dfs_back_edges(g, &cycles::sources_first(g))),
        ("greedy", greedy_fas(g, |e| i64::from(e.priority.max(1)))),
    ];

    let mut best: Option<(usize, Score)> = None;
    for (i, (name, fas)) in candidates.iter().enumerate() {
        let mut trial = g.clone();
        cycles::reverse_all(&mut trial, fas)?;
        let leveling = level(&mut trial, false)?;
        let score = Score {
            max_depth: leveling.max_depth,
            reversed: fas.len() + leveling.reversed,
        };
        debug!(
            candidate = *name,
            max_depth = score.max_depth,
            reversed = score.reversed,
            "orientation candidate"
        );
        let better = match best {
            None => true,
            Some((_, b)) => rank_key(variant, score) < rank_key(variant, b),
        };
        if better {
            best = Some((i, score));
        }
    }

    let chosen = best.map(|(i, _)| i).unwrap_or(0);
    let [(_, a), (_, b), (_, c)] = candidates;
    Ok(match chosen {
        0 => a,
        1 => b,
        _ => c,
    })
}

fn rank_key(variant: LayoutVariant, s: Score) -> (usize, usize) {
    match variant {
        LayoutVariant::MaxDepth => (usize::MAX - s.max_depth, s.reversed),
        LayoutVariant::MaxDownward => (s.reversed, s.max_depth),
        _ => (s.max_depth, s.reversed),
    }
}

/// Pulls source groups down next to their shallowest successor. Kept only when it shortens
/// the total edge span.
pub fn tighten(leveling: &mut Leveling) {
    let before = leveling.total_span();
    let saved = leveling.depth.clone();

    let order = alg::topological_order(&leveling.graph).unwrap_or_default();
    for &u in order.iter().rev() {
        let Some(&ui) = leveling.graph.node(u) else {
            continue;
        };
        if leveling.hints[ui].is_some() || leveling.graph.in_degree(u) > 0 {
            continue;
        }
        let lowest = leveling
            .graph
            .out_edges(u)
            .iter()
            .filter_map(|&e| {
                let w = *leveling.graph.node(leveling.graph.target(e)?)?;
                let minlen = leveling.graph.edge(e)?.minlen;
                leveling.depth[w].checked_sub(minlen)
            })
            .min();
        if let Some(lowest) = lowest {
            if lowest > leveling.depth[ui] {
                leveling.depth[ui] = lowest;
            }
        }
    }

    if leveling.hints.iter().all(Option::is_none) {
        let shift = leveling.depth.iter().copied().min().unwrap_or(0);
        for d in &mut leveling.depth {
            *d -= shift;
        }
    }

    if leveling.total_span() < before {
        leveling.max_depth = leveling.depth.iter().copied().max().unwrap_or(0);
        debug!(before, after = leveling.total_span(), "pulled sources down");
    } else {
        leveling.depth = saved;
    }
}
