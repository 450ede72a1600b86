//! Traversal helpers over [`Graph`].
//!
//! Every traversal allocates its own visitation table sized to the graph's slot bound; nothing
//! is recorded on the nodes themselves.

use super::{Graph, NodeId};
use std::collections::VecDeque;

/// Weakly connected components where `links` adds extra undirected adjacency (for example
/// detached same-rank links that still bind two nodes together).
pub fn components_with_links<N, E>(
    g: &Graph<N, E>,
    links: &[(NodeId, NodeId)],
) -> Vec<Vec<NodeId>> {
    let mut extra: Vec<Vec<NodeId>> = vec![Vec::new(); g.node_bound()];
    for &(a, b) in links {
        if g.contains_node(a) && g.contains_node(b) {
            extra[a.index()].push(b);
            extra[b.index()].push(a);
        }
    }

    let mut seen = vec![false; g.node_bound()];
    let mut out: Vec<Vec<NodeId>> = Vec::new();
    for start in g.node_ids() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut comp: Vec<NodeId> = Vec::new();
        let mut q: VecDeque<NodeId> = VecDeque::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(v);
            let neighbours = g
                .successors(v)
                .chain(g.predecessors(v))
                .chain(extra[v.index()].iter().copied());
            for n in neighbours {
                if !seen[n.index()] {
                    seen[n.index()] = true;
                    q.push_back(n);
                }
            }
        }
        out.push(comp);
    }
    out
}

/// Strongly connected components (Tarjan), restricted to `within` when given.
///
/// Components come out in reverse topological order of the condensation; nodes inside a
/// component are sorted by handle. The walk keeps its own frame stack so long chains do not
/// grow the call stack.
pub fn strongly_connected<N, E>(g: &Graph<N, E>, within: Option<&[NodeId]>) -> Vec<Vec<NodeId>> {
    let bound = g.node_bound();
    let mut allowed = vec![false; bound];
    let roots: Vec<NodeId> = match within {
        Some(subset) => {
            for &v in subset {
                if g.contains_node(v) {
                    allowed[v.index()] = true;
                }
            }
            let mut roots: Vec<NodeId> = subset
                .iter()
                .copied()
                .filter(|v| allowed[v.index()])
                .collect();
            roots.sort();
            roots.dedup();
            roots
        }
        None => {
            for v in g.node_ids() {
                allowed[v.index()] = true;
            }
            g.node_ids().collect()
        }
    };

    let mut next = 0usize;
    let mut indices: Vec<Option<usize>> = vec![None; bound];
    let mut lowlink: Vec<usize> = vec![0; bound];
    let mut on_stack = vec![false; bound];
    let mut stack: Vec<NodeId> = Vec::new();
    let mut sccs: Vec<Vec<NodeId>> = Vec::new();
    // (node, its allowed successors, next successor to look at)
    let mut frames: Vec<(NodeId, Vec<NodeId>, usize)> = Vec::new();

    for root in roots {
        if indices[root.index()].is_some() {
            continue;
        }
        let ri = root.index();
        indices[ri] = Some(next);
        lowlink[ri] = next;
        next += 1;
        stack.push(root);
        on_stack[ri] = true;
        let succ: Vec<NodeId> = g.successors(root).filter(|w| allowed[w.index()]).collect();
        frames.push((root, succ, 0));

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            let vi = v.index();
            if frame.2 < frame.1.len() {
                let w = frame.1[frame.2];
                frame.2 += 1;
                let wi = w.index();
                match indices[wi] {
                    None => {
                        indices[wi] = Some(next);
                        lowlink[wi] = next;
                        next += 1;
                        stack.push(w);
                        on_stack[wi] = true;
                        let succ: Vec<NodeId> =
                            g.successors(w).filter(|x| allowed[x.index()]).collect();
                        frames.push((w, succ, 0));
                    }
                    Some(w_idx) if on_stack[wi] => {
                        lowlink[vi] = lowlink[vi].min(w_idx);
                    }
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if let Some(parent) = frames.last() {
                let pi = parent.0.index();
                lowlink[pi] = lowlink[pi].min(lowlink[vi]);
            }
            if Some(lowlink[vi]) == indices[vi] {
                let mut scc: Vec<NodeId> = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w.index()] = false;
                    scc.push(w);
                    if w == v {
                        break;
                    }
                }
                scc.sort();
                sccs.push(scc);
            }
        }
    }
    sccs
}

/// True when no cycle (self-loops included) remains over attached edges.
pub fn is_acyclic<N, E>(g: &Graph<N, E>) -> bool {
    topological_order(g).is_some()
}

/// Kahn topological order over attached edges; `None` when a cycle remains.
pub fn topological_order<N, E>(g: &Graph<N, E>) -> Option<Vec<NodeId>> {
    let mut indegree: Vec<usize> = vec![0; g.node_bound()];
    for v in g.node_ids() {
        indegree[v.index()] = g.in_degree(v);
    }
    let mut q: VecDeque<NodeId> = g.node_ids().filter(|v| indegree[v.index()] == 0).collect();
    let mut out: Vec<NodeId> = Vec::with_capacity(g.node_count());
    while let Some(v) = q.pop_front() {
        out.push(v);
        for w in g.successors(v) {
            indegree[w.index()] -= 1;
            if indegree[w.index()] == 0 {
                q.push_back(w);
            }
        }
    }
    (out.len() == g.node_count()).then_some(out)
}
