//! Make the hierarchy acyclic.
//!
//! Self-loops, parallel duplicates and same-rank links are taken out of the adjacency lists
//! first; what remains is oriented by reversing a feedback arc set chosen per layout variant.

use crate::config::LayoutVariant;
use crate::error::{LayoutError, Result};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::model::{Connection, EdgeKind, EdgeLabel, NodeKind, NodeLabel};
use crate::rank::units;
use crate::session::LayoutSession;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

pub fn run(session: &mut LayoutSession) -> Result<()> {
    split_special_edges(session)?;
    validate_connections(&session.graph)?;
    mark_flat_edges(&mut session.graph)?;

    let fas = match session.config.variant {
        LayoutVariant::Standard | LayoutVariant::Tree => {
            let roots: Vec<NodeId> = session.graph.node_ids().collect();
            dfs_back_edges(&session.graph, &roots)
        }
        LayoutVariant::MinDepth | LayoutVariant::MaxDepth | LayoutVariant::MaxDownward => {
            crate::rank::variants::choose_orientation(&session.graph, session.config.variant)?
        }
    };
    reverse_all(&mut session.graph, &fas)?;
    debug!(reversed = fas.len(), "oriented hierarchy");
    Ok(())
}

/// Reverses `e` in place: endpoints and arrowheads swap, the kind records the reversal.
pub fn reverse(g: &mut Graph<NodeLabel, EdgeLabel>, e: EdgeId) -> Result<()> {
    g.reverse_edge(e)?;
    if let Some(label) = g.edge_mut(e) {
        std::mem::swap(&mut label.source_arrow, &mut label.target_arrow);
        label.kind = match label.kind {
            EdgeKind::Normal => EdgeKind::Reversed,
            EdgeKind::Reversed => EdgeKind::Normal,
            other => other,
        };
    }
    Ok(())
}

pub fn reverse_all(g: &mut Graph<NodeLabel, EdgeLabel>, edges: &[EdgeId]) -> Result<()> {
    for &e in edges {
        reverse(g, e)?;
    }
    Ok(())
}

/// Edges pointing back onto the DFS recursion stack, visiting roots in the given order.
pub fn dfs_back_edges(g: &Graph<NodeLabel, EdgeLabel>, roots: &[NodeId]) -> Vec<EdgeId> {
    const FRESH: u8 = 0;
    const ACTIVE: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![FRESH; g.node_bound()];
    let mut fas: Vec<EdgeId> = Vec::new();
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    for &root in roots {
        if !g.contains_node(root) || state[root.index()] != FRESH {
            continue;
        }
        state[root.index()] = ACTIVE;
        stack.push((root, 0));
        while let Some((v, next)) = stack.last_mut() {
            let out = g.out_edges(*v);
            if *next >= out.len() {
                state[v.index()] = DONE;
                stack.pop();
                continue;
            }
            let e = out[*next];
            *next += 1;
            let Some(w) = g.target(e) else {
                continue;
            };
            match state[w.index()] {
                FRESH => {
                    state[w.index()] = ACTIVE;
                    stack.push((w, 0));
                }
                ACTIVE => fas.push(e),
                _ => {}
            }
        }
    }
    fas
}

/// DFS roots: sources by decreasing out-degree, then every node in insertion order.
pub fn sources_first(g: &Graph<NodeLabel, EdgeLabel>) -> Vec<NodeId> {
    let mut roots = g.sources();
    roots.sort_by_key(|&v| std::cmp::Reverse(g.out_degree(v)));
    roots.extend(g.node_ids());
    roots
}

fn split_special_edges(session: &mut LayoutSession) -> Result<()> {
    let near_enabled = session.config.near_edges;
    let label_sep = session.config.label_sep;
    let g = &mut session.graph;

    let mut primary: FxHashMap<(NodeId, NodeId), EdgeId> = FxHashMap::default();
    let edges: Vec<EdgeId> = g.edge_ids().collect();
    for e in edges {
        let Some((v, w)) = g.endpoints(e) else {
            continue;
        };
        let Some(label) = g.edge(e) else {
            continue;
        };
        let labelled = label.label.is_some();
        let same_rank = label.kind.is_same_rank();

        if v == w {
            split_self_loop(g, e, v, label_sep)?;
            continue;
        }

        let key = (v.min(w), v.max(w));
        if !labelled {
            if let Some(&p) = primary.get(&key) {
                g.detach_edge(e)?;
                if let Some(label) = g.edge_mut(e) {
                    label.kind = EdgeKind::Duplicate(p);
                }
                continue;
            }
        }
        primary.entry(key).or_insert(e);

        if same_rank && !near_enabled {
            if let Some(label) = g.edge_mut(e) {
                label.kind = EdgeKind::Normal;
            }
        } else if same_rank {
            link(g, e, v, w)?;
        }
    }
    Ok(())
}

fn split_self_loop(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    e: EdgeId,
    v: NodeId,
    label_sep: f64,
) -> Result<()> {
    g.detach_edge(e)?;
    let Some(label) = g.edge_mut(e) else {
        return Ok(());
    };
    label.kind = EdgeKind::SelfLoop;
    let Some(text) = label.label.clone() else {
        return Ok(());
    };
    let hop = EdgeLabel {
        priority: label.priority,
        style: label.style,
        parent: Some(e),
        ..Default::default()
    };

    // A labelled loop runs down to a label node and back up again.
    let l = g.add_node(NodeLabel {
        kind: NodeKind::Label,
        width: text.width + 2.0 * label_sep,
        height: text.height + 2.0 * label_sep,
        origin: Some(e),
        ..Default::default()
    });
    let down = g.add_edge(v, l, hop.clone())?;
    let up = g.add_edge(l, v, hop)?;
    if let Some(label) = g.edge_mut(e) {
        label.chain = vec![down, up];
    }
    Ok(())
}

/// Turns a same-rank edge into a pair of connection slots, or leaves it hierarchical when the
/// slots are full or the link would close a ring.
fn link(g: &mut Graph<NodeLabel, EdgeLabel>, e: EdgeId, v: NodeId, w: NodeId) -> Result<()> {
    let full = |n: NodeId| g.node(n).is_none_or(|l| l.connection_count() >= 2);
    let reason = if full(v) || full(w) {
        Some("connection slots are full")
    } else if chain_contains(g, v, w) {
        Some("link would close a ring")
    } else {
        None
    };
    if let Some(reason) = reason {
        let (a, b) = (node_name(g, v), node_name(g, w));
        warn!(source = %a, target = %b, reason, "same-rank edge kept as a hierarchical edge");
        if let Some(label) = g.edge_mut(e) {
            label.kind = EdgeKind::Normal;
        }
        return Ok(());
    }

    g.detach_edge(e)?;
    for (n, partner) in [(v, w), (w, v)] {
        if let Some(label) = g.node_mut(n) {
            if let Some(slot) = label.connections.iter_mut().find(|s| s.is_none()) {
                *slot = Some(Connection { partner, edge: e });
            }
        }
    }
    Ok(())
}

fn chain_contains(g: &Graph<NodeLabel, EdgeLabel>, start: NodeId, needle: NodeId) -> bool {
    let mut seen: Vec<NodeId> = vec![start];
    let mut stack: Vec<NodeId> = vec![start];
    while let Some(v) = stack.pop() {
        let Some(label) = g.node(v) else {
            continue;
        };
        for p in label.partners() {
            if p == needle {
                return true;
            }
            if !seen.contains(&p) {
                seen.push(p);
                stack.push(p);
            }
        }
    }
    false
}

fn node_name(g: &Graph<NodeLabel, EdgeLabel>, v: NodeId) -> String {
    match g.node(v) {
        Some(n) if !n.id.is_empty() => n.id.clone(),
        _ => v.to_string(),
    }
}

/// Checks that every connection slot is mirrored by its partner through the same edge.
pub fn validate_connections(g: &Graph<NodeLabel, EdgeLabel>) -> Result<()> {
    for (v, label) in g.nodes() {
        let broken = |reason: String| LayoutError::ConnectionSlot {
            node: node_name(g, v),
            reason,
        };
        if let [Some(a), Some(b)] = label.connections {
            if a.partner == b.partner {
                return Err(broken(format!("both slots point at {}", node_name(g, a.partner))));
            }
        }
        for c in label.connections.iter().flatten() {
            if c.partner == v {
                return Err(broken("slot points at the node itself".to_string()));
            }
            let mirrored = g.node(c.partner).is_some_and(|p| {
                p.connections
                    .iter()
                    .flatten()
                    .any(|back| back.partner == v && back.edge == c.edge)
            });
            if !mirrored {
                return Err(broken(format!(
                    "slot towards {} is not reciprocal",
                    node_name(g, c.partner)
                )));
            }
        }
    }
    Ok(())
}

/// Hierarchical edges inside one connection group cannot span layers; they are drawn flat.
fn mark_flat_edges(g: &mut Graph<NodeLabel, EdgeLabel>) -> Result<()> {
    let groups = units::build(g);
    let flat: Vec<EdgeId> = g
        .attached_edge_ids()
        .filter(|&e| {
            g.endpoints(e)
                .is_some_and(|(v, w)| groups.unit_of(v) == groups.unit_of(w))
        })
        .collect();
    for e in flat {
        g.detach_edge(e)?;
        if let Some(label) = g.edge_mut(e) {
            label.flat = true;
        }
    }
    Ok(())
}
