use strata_graph::{Graph, NodeId, alg};

fn path(g: &mut Graph<(), ()>, nodes: &[NodeId]) {
    for w in nodes.windows(2) {
        g.add_edge(w[0], w[1], ()).unwrap();
    }
}

fn nodes(g: &mut Graph<(), ()>, n: usize) -> Vec<NodeId> {
    (0..n).map(|_| g.add_node(())).collect()
}

#[test]
fn components_honour_extra_links() {
    let mut g: Graph<(), ()> = Graph::new();
    let n = nodes(&mut g, 4);
    path(&mut g, &[n[0], n[1]]);
    path(&mut g, &[n[2], n[3]]);

    assert_eq!(alg::components_with_links(&g, &[]).len(), 2);
    let joined = alg::components_with_links(&g, &[(n[1], n[2])]);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].len(), 4);
}

#[test]
fn strongly_connected_finds_nested_cycles() {
    let mut g: Graph<(), ()> = Graph::new();
    let n = nodes(&mut g, 5);
    path(&mut g, &[n[0], n[1], n[2], n[0]]);
    path(&mut g, &[n[2], n[3], n[4]]);

    let mut sccs = alg::strongly_connected(&g, None);
    sccs.sort_by_key(|c| std::cmp::Reverse(c.len()));
    assert_eq!(sccs[0], vec![n[0], n[1], n[2]]);
    assert_eq!(sccs.len(), 3);
}

#[test]
fn strongly_connected_can_be_restricted_to_a_subset() {
    let mut g: Graph<(), ()> = Graph::new();
    let n = nodes(&mut g, 3);
    path(&mut g, &[n[0], n[1], n[2], n[0]]);

    let sccs = alg::strongly_connected(&g, Some(&[n[0], n[1]]));
    assert!(sccs.iter().all(|c| c.len() == 1));
}

#[test]
fn self_loops_are_not_acyclic() {
    let mut g: Graph<(), ()> = Graph::new();
    let n = nodes(&mut g, 2);
    assert!(alg::is_acyclic(&g));
    g.add_edge(n[1], n[1], ()).unwrap();
    assert!(!alg::is_acyclic(&g));
    let sccs = alg::strongly_connected(&g, None);
    assert_eq!(sccs.len(), 2);
}

#[test]
fn strongly_connected_handles_long_chains() {
    let mut g: Graph<(), ()> = Graph::new();
    let n = nodes(&mut g, 200_000);
    path(&mut g, &n);
    let back = g.add_edge(n[n.len() - 1], n[0], ()).unwrap();

    let sccs = alg::strongly_connected(&g, None);
    assert_eq!(sccs.len(), 1);
    assert_eq!(sccs[0].len(), n.len());

    g.detach_edge(back).unwrap();
    let sccs = alg::strongly_connected(&g, None);
    assert_eq!(sccs.len(), n.len());
    assert_eq!(sccs[0], vec![n[n.len() - 1]]);
}

#[test]
fn topological_order_fails_on_cycles() {
    let mut g: Graph<(), ()> = Graph::new();
    let n = nodes(&mut g, 3);
    path(&mut g, &[n[0], n[1], n[2]]);
    assert_eq!(alg::topological_order(&g), Some(vec![n[0], n[1], n[2]]));
    g.add_edge(n[2], n[0], ()).unwrap();
    assert_eq!(alg::topological_order(&g), None);
}
