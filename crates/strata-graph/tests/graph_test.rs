use strata_graph::{Graph, GraphError};

fn graph_with(n: usize) -> (Graph<&'static str, u32>, Vec<strata_graph::NodeId>) {
    let mut g: Graph<&'static str, u32> = Graph::new();
    let ids = (0..n).map(|_| g.add_node("n")).collect();
    (g, ids)
}

#[test]
fn add_edge_rejects_missing_endpoints() {
    let (mut g, ids) = graph_with(2);
    let (mut other, _) = graph_with(5);
    let far = other.add_node("far");
    assert_eq!(
        g.add_edge(ids[0], far, 1).unwrap_err(),
        GraphError::MissingNode(far)
    );
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn adjacency_lists_keep_insertion_order() {
    let (mut g, n) = graph_with(4);
    let e1 = g.add_edge(n[0], n[2], 1).unwrap();
    let e2 = g.add_edge(n[0], n[1], 2).unwrap();
    let e3 = g.add_edge(n[0], n[3], 3).unwrap();

    assert_eq!(g.out_edges(n[0]), &[e1, e2, e3]);
    assert_eq!(g.successors(n[0]).collect::<Vec<_>>(), vec![n[2], n[1], n[3]]);
    assert_eq!(g.predecessors(n[1]).collect::<Vec<_>>(), vec![n[0]]);
}

#[test]
fn parallel_edges_are_tracked_per_pair() {
    let (mut g, n) = graph_with(2);
    let e1 = g.add_edge(n[0], n[1], 1).unwrap();
    let e2 = g.add_edge(n[0], n[1], 2).unwrap();
    assert_eq!(g.edges_between(n[0], n[1]), &[e1, e2]);
    assert!(g.edges_between(n[1], n[0]).is_empty());
}

#[test]
fn reverse_edge_moves_adjacency_and_keeps_label() {
    let (mut g, n) = graph_with(2);
    let e = g.add_edge(n[0], n[1], 7).unwrap();
    g.reverse_edge(e).unwrap();

    assert_eq!(g.endpoints(e), Some((n[1], n[0])));
    assert_eq!(g.edge(e), Some(&7));
    assert!(g.out_edges(n[0]).is_empty());
    assert_eq!(g.out_edges(n[1]), &[e]);
    assert_eq!(g.in_edges(n[0]), &[e]);
    assert_eq!(g.edges_between(n[1], n[0]), &[e]);
}

#[test]
fn remove_node_drops_attached_and_detached_incident_edges() {
    let (mut g, n) = graph_with(3);
    let a = g.add_edge(n[0], n[1], 1).unwrap();
    let b = g.add_edge(n[1], n[2], 2).unwrap();
    let c = g.add_edge(n[2], n[0], 3).unwrap();
    g.detach_edge(b).unwrap();

    assert_eq!(g.remove_node(n[1]), Some("n"));
    assert!(!g.contains_edge(a));
    assert!(!g.contains_edge(b));
    assert!(g.contains_edge(c));
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
    assert!(g.out_edges(n[0]).is_empty());
}

#[test]
fn handles_are_not_reused_after_removal() {
    let (mut g, n) = graph_with(2);
    g.remove_node(n[1]);
    let fresh = g.add_node("fresh");
    assert_ne!(fresh, n[1]);
    assert!(g.node(n[1]).is_none());
}

#[test]
fn sources_ignore_detached_edges() {
    let (mut g, n) = graph_with(3);
    g.add_edge(n[0], n[1], 1).unwrap();
    let back = g.add_edge(n[2], n[0], 2).unwrap();
    assert_eq!(g.sources(), vec![n[2]]);
    g.detach_edge(back).unwrap();
    assert_eq!(g.sources(), vec![n[0], n[2]]);
}
