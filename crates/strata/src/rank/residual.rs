//! Cycles that survive orientation because connection groups tie mutually reachable nodes to
//! one depth.
//!
//! Each strongly connected component of the group graph gets a representative whose incoming
//! edges from inside the component are reversed; the remainder is searched again until no
//! component is left.

use super::UnitEdge;
use crate::error::Result;
use crate::graph::{Graph, NodeId, alg};
use crate::model::{EdgeLabel, NodeLabel};
use std::cmp::Reverse;
use tracing::trace;

/// Breaks every cycle of `units`, mirroring each reversal on `g`. Returns the number of
/// reversed edges.
pub fn resolve(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    units: &mut Graph<usize, UnitEdge>,
) -> Result<usize> {
    let mut reversed = 0;
    let mut work: Vec<Vec<NodeId>> = alg::strongly_connected(units, None)
        .into_iter()
        .filter(|c| c.len() > 1)
        .collect();

    while let Some(set) = work.pop() {
        for scc in alg::strongly_connected(units, Some(&set)) {
            if scc.len() < 2 {
                continue;
            }
            let rep = representative(units, &scc);
            let incoming: Vec<_> = units
                .in_edges(rep)
                .iter()
                .copied()
                .filter(|&e| units.source(e).is_some_and(|s| scc.binary_search(&s).is_ok()))
                .collect();
            trace!(size = scc.len(), reversing = incoming.len(), "contracting component");
            for ue in incoming {
                if let Some(original) = units.edge(ue).map(|l| l.edge) {
                    crate::cycles::reverse(g, original)?;
                }
                units.reverse_edge(ue)?;
                reversed += 1;
            }
            work.push(scc);
        }
    }
    Ok(reversed)
}

/// Picks the component member with the fewest incoming edges from inside, then the most
/// outgoing ones, then the busiest predecessors, then the lowest handle.
pub fn representative(units: &Graph<usize, UnitEdge>, scc: &[NodeId]) -> NodeId {
    let inside = |v: NodeId| scc.binary_search(&v).is_ok();
    let in_deg = |v: NodeId| units.predecessors(v).filter(|&p| inside(p)).count();
    let out_deg = |v: NodeId| units.successors(v).filter(|&s| inside(s)).count();
    let pred_load =
        |v: NodeId| -> usize { units.predecessors(v).filter(|&p| inside(p)).map(in_deg).sum() };

    let key = |v: NodeId| (in_deg(v), Reverse(out_deg(v)), Reverse(pred_load(v)));

    let mut best = scc[0];
    let mut best_key = key(best);
    for &v in &scc[1..] {
        let key = key(v);
        if key < best_key {
            best = v;
            best_key = key;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeId;

    fn unit_graph(n: usize, edges: &[(usize, usize)]) -> (Graph<usize, UnitEdge>, Vec<NodeId>) {
        let mut g: Graph<usize, UnitEdge> = Graph::new();
        let ids: Vec<NodeId> = (0..n).map(|i| g.add_node(i)).collect();
        let mut host: Graph<NodeLabel, EdgeLabel> = Graph::new();
        let hv: Vec<NodeId> = (0..n).map(|_| host.add_node(NodeLabel::default())).collect();
        for &(a, b) in edges {
            let e: EdgeId = host.add_edge(hv[a], hv[b], EdgeLabel::default()).unwrap();
            g.add_edge(ids[a], ids[b], UnitEdge { edge: e, minlen: 1 }).unwrap();
        }
        (g, ids)
    }

    #[test]
    fn representative_prefers_few_predecessors_then_many_successors() {
        // 0 -> 1 -> 2 -> 0 plus 2 -> 1: nodes 0 and 2 have one inner predecessor each, node 2
        // has two successors.
        let (g, ids) = unit_graph(3, &[(0, 1), (1, 2), (2, 0), (2, 1)]);
        assert_eq!(representative(&g, &ids), ids[2]);
    }

    #[test]
    fn representative_breaks_ties_by_handle() {
        let (g, ids) = unit_graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(representative(&g, &ids), ids[0]);
    }
}
