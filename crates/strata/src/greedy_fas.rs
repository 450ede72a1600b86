//! Greedy feedback arc set (FAS) selection (Eades, Lin and Smyth).
//!
//! Sinks and sources are peeled off repeatedly; when neither exists, the node with the largest
//! `out - in` weight difference is removed and its incoming edges join the arc set.

use crate::graph::{EdgeId, Graph, NodeId};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Attached edges whose reversal makes `g` acyclic, weighting each edge by `weight_fn`.
/// Parallel edges are aggregated and reported together. Self-loops are ignored.
pub fn greedy_fas<N, E>(g: &Graph<N, E>, weight_fn: impl Fn(&E) -> i64) -> Vec<EdgeId> {
    if g.node_count() <= 1 {
        return Vec::new();
    }

    // Aggregate multi-edges into a simple graph with summed weights, keeping the order in which
    // each endpoint pair first appears.
    let bound = g.node_bound();
    let mut in_w: Vec<i64> = vec![0; bound];
    let mut out_w: Vec<i64> = vec![0; bound];
    let mut pair_ix: FxHashMap<(NodeId, NodeId), usize> = FxHashMap::default();
    let mut pairs: Vec<(NodeId, NodeId, i64)> = Vec::new();
    for e in g.attached_edge_ids() {
        let (Some((v, w)), Some(label)) = (g.endpoints(e), g.edge(e)) else {
            continue;
        };
        if v == w {
            continue;
        }
        let wt = weight_fn(label);
        match pair_ix.get(&(v, w)) {
            Some(&i) => pairs[i].2 += wt,
            None => {
                pair_ix.insert((v, w), pairs.len());
                pairs.push((v, w, wt));
            }
        }
        out_w[v.index()] += wt;
        in_w[w.index()] += wt;
    }
    let max_out = out_w.iter().copied().max().unwrap_or(0);
    let max_in = in_w.iter().copied().max().unwrap_or(0);

    let mut ins: Vec<Vec<(NodeId, i64)>> = vec![Vec::new(); bound];
    let mut outs: Vec<Vec<(NodeId, i64)>> = vec![Vec::new(); bound];
    for &(v, w, wt) in &pairs {
        outs[v.index()].push((w, wt));
        ins[w.index()].push((v, wt));
    }

    let mut work = Work {
        alive: vec![false; bound],
        buckets: vec![VecDeque::new(); (max_out + max_in + 3).max(3) as usize],
        bucket_of: vec![None; bound],
        zero_idx: max_in + 1,
        in_w,
        out_w,
    };
    let nodes: Vec<NodeId> = g.node_ids().collect();
    for &v in &nodes {
        work.alive[v.index()] = true;
    }
    for &v in &nodes {
        work.assign_bucket(v);
    }

    let mut remaining = nodes.len();
    let mut results: Vec<(NodeId, NodeId)> = Vec::new();
    while remaining > 0 {
        while let Some(v) = work.pop_bucket(0) {
            work.remove(v, &ins, &outs, None);
            remaining -= 1;
        }
        let last = work.buckets.len() - 1;
        while let Some(v) = work.pop_bucket(last) {
            work.remove(v, &ins, &outs, None);
            remaining -= 1;
        }
        if remaining == 0 {
            break;
        }

        let picked = (1..last).rev().find_map(|i| work.pop_bucket(i));
        let v = match picked {
            Some(v) => v,
            None => match nodes.iter().copied().find(|v| work.alive[v.index()]) {
                Some(v) => v,
                None => break,
            },
        };
        work.remove(v, &ins, &outs, Some(&mut results));
        remaining -= 1;
    }

    let mut out: Vec<EdgeId> = Vec::new();
    for (v, w) in results {
        out.extend_from_slice(g.edges_between(v, w));
    }
    out
}

struct Work {
    alive: Vec<bool>,
    buckets: Vec<VecDeque<NodeId>>,
    bucket_of: Vec<Option<usize>>,
    zero_idx: i64,
    in_w: Vec<i64>,
    out_w: Vec<i64>,
}

impl Work {
    fn pop_bucket(&mut self, idx: usize) -> Option<NodeId> {
        while let Some(v) = self.buckets[idx].pop_back() {
            if self.alive[v.index()] && self.bucket_of[v.index()] == Some(idx) {
                self.bucket_of[v.index()] = None;
                return Some(v);
            }
        }
        None
    }

    fn assign_bucket(&mut self, v: NodeId) {
        let vi = v.index();
        if let Some(prev) = self.bucket_of[vi] {
            if let Some(pos) = self.buckets[prev].iter().position(|&x| x == v) {
                self.buckets[prev].remove(pos);
            }
        }
        let last = self.buckets.len() - 1;
        let idx = if self.out_w[vi] == 0 {
            0
        } else if self.in_w[vi] == 0 {
            last
        } else {
            (self.out_w[vi] - self.in_w[vi] + self.zero_idx).clamp(0, last as i64) as usize
        };
        self.buckets[idx].push_front(v);
        self.bucket_of[vi] = Some(idx);
    }

    fn remove(
        &mut self,
        v: NodeId,
        ins: &[Vec<(NodeId, i64)>],
        outs: &[Vec<(NodeId, i64)>],
        mut collect: Option<&mut Vec<(NodeId, NodeId)>>,
    ) {
        if !self.alive[v.index()] {
            return;
        }
        self.alive[v.index()] = false;
        self.bucket_of[v.index()] = None;

        for &(u, wt) in &ins[v.index()] {
            if !self.alive[u.index()] {
                continue;
            }
            if let Some(results) = collect.as_deref_mut() {
                results.push((u, v));
            }
            self.out_w[u.index()] -= wt;
            self.assign_bucket(u);
        }
        for &(w, wt) in &outs[v.index()] {
            if !self.alive[w.index()] {
                continue;
            }
            self.in_w[w.index()] -= wt;
            self.assign_bucket(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::alg;

    fn graph(n: usize, edges: &[(usize, usize)]) -> (Graph<(), i64>, Vec<NodeId>) {
        let mut g: Graph<(), i64> = Graph::new();
        let ids: Vec<NodeId> = (0..n).map(|_| g.add_node(())).collect();
        for &(a, b) in edges {
            g.add_edge(ids[a], ids[b], 1).unwrap();
        }
        (g, ids)
    }

    fn break_cycles(g: &mut Graph<(), i64>, fas: &[EdgeId]) {
        for &e in fas {
            g.reverse_edge(e).unwrap();
        }
    }

    #[test]
    fn acyclic_graphs_need_no_reversals() {
        let (g, _) = graph(4, &[(0, 1), (1, 2), (0, 3), (3, 2)]);
        assert!(greedy_fas(&g, |w| *w).is_empty());
    }

    #[test]
    fn single_cycle_loses_one_edge() {
        let (mut g, _) = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let fas = greedy_fas(&g, |w| *w);
        assert_eq!(fas.len(), 1);
        break_cycles(&mut g, &fas);
        assert!(alg::is_acyclic(&g));
    }

    #[test]
    fn heavy_edges_are_kept() {
        let mut g: Graph<(), i64> = Graph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let heavy = g.add_edge(a, b, 10).unwrap();
        let light = g.add_edge(b, a, 1).unwrap();
        let fas = greedy_fas(&g, |w| *w);
        assert_eq!(fas, vec![light]);
        assert!(!fas.contains(&heavy));
    }

    #[test]
    fn interleaved_cycles_become_acyclic() {
        let (mut g, _) = graph(
            6,
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3), (4, 1)],
        );
        let fas = greedy_fas(&g, |w| *w);
        break_cycles(&mut g, &fas);
        assert!(alg::is_acyclic(&g));
    }
}
