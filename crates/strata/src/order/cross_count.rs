//! Weighted crossing count between two adjacent layers.
//!
//! Both layers are walked in lock step (upper slot `p`, then lower slot `p`). An edge opens at
//! whichever endpoint is reached first and closes at the other. Each open-edge list stays
//! sorted by the position of its opening endpoint, so a closing edge only scans the prefix of
//! entries it actually crosses; the rest of the crossings come from the opposite list's total
//! weight. Cost is proportional to edges plus crossings.

use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};
use crate::session::{CrossScratch, Layer};

const NIL: usize = usize::MAX;

pub fn edge_weight(label: &EdgeLabel, weighted: bool) -> u64 {
    if weighted {
        u64::from(label.priority.max(1))
    } else {
        1
    }
}

/// Slot of `v` in `layer`, trusting the node's `order` field.
pub(crate) fn slot_in(
    g: &Graph<NodeLabel, EdgeLabel>,
    layer: &[NodeId],
    v: NodeId,
) -> Option<usize> {
    let order = g.node(v)?.order;
    (layer.get(order) == Some(&v)).then_some(order)
}

#[derive(Debug, Clone, Copy)]
struct OpenList {
    head: usize,
    tail: usize,
    weight: u64,
}

impl OpenList {
    fn new() -> Self {
        Self {
            head: NIL,
            tail: NIL,
            weight: 0,
        }
    }

    fn push(&mut self, i: usize, w: u64, prev: &mut [usize], next: &mut [usize]) {
        prev[i] = self.tail;
        next[i] = NIL;
        if self.tail == NIL {
            self.head = i;
        } else {
            next[self.tail] = i;
        }
        self.tail = i;
        self.weight += w;
    }

    fn unlink(&mut self, i: usize, w: u64, prev: &mut [usize], next: &mut [usize]) {
        let (p, n) = (prev[i], next[i]);
        if p == NIL {
            self.head = n;
        } else {
            next[p] = n;
        }
        if n == NIL {
            self.tail = p;
        } else {
            prev[n] = p;
        }
        self.weight -= w;
    }
}

/// Crossings between the edges leaving `upper` and entering `lower`. Two crossing edges
/// contribute the product of their weights.
pub fn between(
    g: &Graph<NodeLabel, EdgeLabel>,
    upper: &[NodeId],
    lower: &[NodeId],
    weighted: bool,
    s: &mut CrossScratch,
) -> u64 {
    s.upper.clear();
    s.lower.clear();
    s.weight.clear();
    s.by_upper.iter_mut().for_each(Vec::clear);
    s.by_lower.iter_mut().for_each(Vec::clear);
    if s.by_upper.len() < upper.len() {
        s.by_upper.resize_with(upper.len(), Vec::new);
    }
    if s.by_lower.len() < lower.len() {
        s.by_lower.resize_with(lower.len(), Vec::new);
    }

    for (pu, &u) in upper.iter().enumerate() {
        for &e in g.out_edges(u) {
            let (Some(w), Some(label)) = (g.target(e), g.edge(e)) else {
                continue;
            };
            let Some(pl) = slot_in(g, lower, w) else {
                continue;
            };
            let i = s.upper.len();
            s.upper.push(pu);
            s.lower.push(pl);
            s.weight.push(edge_weight(label, weighted));
            s.by_upper[pu].push(i);
            s.by_lower[pl].push(i);
        }
    }
    let m = s.upper.len();
    if m < 2 {
        return 0;
    }
    s.prev.clear();
    s.prev.resize(m, NIL);
    s.next.clear();
    s.next.resize(m, NIL);

    // `up` holds edges opened at their upper end, `low` those opened at their lower end.
    let mut up = OpenList::new();
    let mut low = OpenList::new();
    let mut crossings: u64 = 0;

    for p in 0..upper.len().max(lower.len()) {
        if p < upper.len() {
            for &i in &s.by_upper[p] {
                if s.lower[i] < p {
                    low.unlink(i, s.weight[i], &mut s.prev, &mut s.next);
                }
            }
            for &i in &s.by_upper[p] {
                if s.lower[i] >= p {
                    continue;
                }
                crossings += s.weight[i] * up.weight;
                let mut j = low.head;
                while j != NIL && s.lower[j] < s.lower[i] {
                    crossings += s.weight[i] * s.weight[j];
                    j = s.next[j];
                }
            }
            for &i in &s.by_upper[p] {
                if s.lower[i] >= p {
                    up.push(i, s.weight[i], &mut s.prev, &mut s.next);
                }
            }
        }

        if p < lower.len() {
            for &i in &s.by_lower[p] {
                if s.upper[i] <= p {
                    up.unlink(i, s.weight[i], &mut s.prev, &mut s.next);
                }
            }
            for &i in &s.by_lower[p] {
                if s.upper[i] > p {
                    continue;
                }
                crossings += s.weight[i] * low.weight;
                let mut j = up.head;
                while j != NIL && s.upper[j] < s.upper[i] {
                    crossings += s.weight[i] * s.weight[j];
                    j = s.next[j];
                }
            }
            for &i in &s.by_lower[p] {
                if s.upper[i] > p {
                    low.push(i, s.weight[i], &mut s.prev, &mut s.next);
                }
            }
        }
    }
    crossings
}

/// Recounts every adjacent layer pair, caching each count on the upper layer. Returns the sum.
pub fn refresh(
    g: &Graph<NodeLabel, EdgeLabel>,
    layers: &mut [Layer],
    weighted: bool,
    s: &mut CrossScratch,
) -> u64 {
    let mut total = 0;
    for i in 0..layers.len() {
        let c = match layers.get(i + 1) {
            Some(next) => between(g, &layers[i].nodes, &next.nodes, weighted, s),
            None => 0,
        };
        layers[i].crossings = c;
        total += c;
    }
    total
}

/// Sum of the counts between layers `from..=to` and their successors, without caching.
pub fn range(
    g: &Graph<NodeLabel, EdgeLabel>,
    layers: &[Layer],
    from: usize,
    to: usize,
    weighted: bool,
    s: &mut CrossScratch,
) -> u64 {
    (from..=to)
        .filter(|&i| i + 1 < layers.len())
        .map(|i| between(g, &layers[i].nodes, &layers[i + 1].nodes, weighted, s))
        .sum()
}

/// Pairwise reference count; quadratic in the number of edges.
pub fn brute_force(
    g: &Graph<NodeLabel, EdgeLabel>,
    upper: &[NodeId],
    lower: &[NodeId],
    weighted: bool,
) -> u64 {
    let mut edges: Vec<(usize, usize, u64)> = Vec::new();
    for (pu, &u) in upper.iter().enumerate() {
        for &e in g.out_edges(u) {
            let (Some(w), Some(label)) = (g.target(e), g.edge(e)) else {
                continue;
            };
            if let Some(pl) = lower.iter().position(|&x| x == w) {
                edges.push((pu, pl, edge_weight(label, weighted)));
            }
        }
    }
    let mut c = 0;
    for (i, a) in edges.iter().enumerate() {
        for b in &edges[i + 1..] {
            if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                c += a.2 * b.2;
            }
        }
    }
    c
}
