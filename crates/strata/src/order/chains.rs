//! Connection chains and order hints inside one layer.
//!
//! Nodes linked through connection slots must stay contiguous, in path order. The ordering
//! heuristics therefore move whole blocks: a block is a single node or one complete chain.

use crate::graph::{Graph, NodeId};
use crate::model::{EdgeLabel, NodeLabel};

/// The chain through `v` in path order, starting from the end that is reached first when
/// walking away from `v` through its first slot. Unconnected nodes yield `[v]`.
pub fn chain_of(g: &Graph<NodeLabel, EdgeLabel>, v: NodeId) -> Vec<NodeId> {
    let Some(n) = g.node(v) else {
        return Vec::new();
    };
    if n.connection_count() == 0 {
        return vec![v];
    }

    // Walk to one end.
    let mut end = v;
    let mut prev: Option<NodeId> = None;
    loop {
        let next = g
            .node(end)
            .and_then(|n| n.partners().find(|&p| Some(p) != prev));
        match next {
            Some(p) if p != v => {
                prev = Some(end);
                end = p;
            }
            _ => break,
        }
    }

    let mut chain = vec![end];
    let mut prev: Option<NodeId> = None;
    let mut cur = end;
    while let Some(next) = g
        .node(cur)
        .and_then(|n| n.partners().find(|&p| Some(p) != prev))
    {
        if chain.contains(&next) {
            break;
        }
        chain.push(next);
        prev = Some(cur);
        cur = next;
    }
    chain
}

/// Splits a layer into blocks in current order. Each chain appears once, at the slot of its
/// leftmost member, oriented so that this member comes first.
pub fn blocks(g: &Graph<NodeLabel, EdgeLabel>, layer: &[NodeId]) -> Vec<Vec<NodeId>> {
    let mut out: Vec<Vec<NodeId>> = Vec::with_capacity(layer.len());
    let mut taken: Vec<NodeId> = Vec::new();
    for &v in layer {
        let connected = g.node(v).is_some_and(|n| n.connection_count() > 0);
        if !connected {
            out.push(vec![v]);
            continue;
        }
        if taken.contains(&v) {
            continue;
        }
        let mut chain = chain_of(g, v);
        if chain.last() == Some(&v) {
            chain.reverse();
        } else if chain.first() != Some(&v) {
            // `v` sits inside the chain: keep the orientation whose head is further left.
            let head = chain.first().and_then(|&h| g.node(h)).map_or(0, |n| n.order);
            let tail = chain.last().and_then(|&t| g.node(t)).map_or(0, |n| n.order);
            if tail < head {
                chain.reverse();
            }
        }
        taken.extend_from_slice(&chain);
        out.push(chain);
    }
    out
}

/// Smallest order hint among the block's members.
pub fn block_hint(g: &Graph<NodeLabel, EdgeLabel>, block: &[NodeId]) -> Option<usize> {
    block
        .iter()
        .filter_map(|&v| g.node(v).and_then(|n| n.order_hint))
        .min()
}

/// Re-sorts the hinted blocks of a layer by hint, inside the slots they already occupy.
/// Unhinted blocks keep their slots.
pub fn apply_hints(g: &Graph<NodeLabel, EdgeLabel>, layer: &mut Vec<NodeId>) {
    let mut bs = blocks(g, layer);
    let slots: Vec<usize> = (0..bs.len())
        .filter(|&i| block_hint(g, &bs[i]).is_some())
        .collect();
    if slots.len() < 2 {
        return;
    }
    let mut hinted: Vec<Vec<NodeId>> = slots
        .iter()
        .map(|&i| std::mem::take(&mut bs[i]))
        .collect();
    hinted.sort_by_key(|b| block_hint(g, b));
    for (slot, block) in slots.into_iter().zip(hinted) {
        bs[slot] = block;
    }
    *layer = bs.concat();
}

/// Writes slot indices back onto the nodes.
pub fn sync(g: &mut Graph<NodeLabel, EdgeLabel>, layer: &[NodeId]) {
    for (i, &v) in layer.iter().enumerate() {
        if let Some(n) = g.node_mut(v) {
            n.order = i;
        }
    }
}
