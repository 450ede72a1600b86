use strata::graph::NodeId;
use strata::{
    CancelToken, EdgeSpec, LayoutConfig, LayoutSession, LayoutVariant, NodeGeometry, NodeSpec,
    Strategy, cycles, tree,
};

fn tree_config() -> LayoutConfig {
    LayoutConfig {
        variant: LayoutVariant::Tree,
        ..Default::default()
    }
}

/// `edges` as (parent, child) indices into `n` nodes named `t0..`.
fn build(n: usize, edges: &[(usize, usize)], config: LayoutConfig) -> (LayoutSession, Vec<NodeId>) {
    let mut s = LayoutSession::new(config);
    let ids: Vec<NodeId> = (0..n)
        .map(|i| s.add_node(NodeSpec::new(format!("t{i}")).size(40.0, 20.0)))
        .collect();
    for &(p, c) in edges {
        s.add_edge(ids[p], ids[c], EdgeSpec::new()).unwrap();
    }
    (s, ids)
}

const WIDE: &[(usize, usize)] = &[
    (0, 1),
    (0, 2),
    (0, 3),
    (1, 4),
    (1, 5),
    (1, 6),
    (3, 7),
    (7, 8),
    (7, 9),
    (7, 10),
    (2, 11),
];

fn geometry(s: &LayoutSession, v: NodeId) -> NodeGeometry {
    s.node_geometry(v).unwrap()
}

/// Left and right edge of the subtree below `v`.
fn extent(s: &LayoutSession, children: &[Vec<usize>], ids: &[NodeId], v: usize) -> (f64, f64) {
    let g = geometry(s, ids[v]);
    let mut out = (g.x - g.width / 2.0, g.x + g.width / 2.0);
    for &c in &children[v] {
        let (l, r) = extent(s, children, ids, c);
        out = (out.0.min(l), out.1.max(r));
    }
    out
}

#[test]
fn tree_variant_uses_the_tree_strategy() {
    let (mut s, _) = build(12, WIDE, tree_config());
    let stats = s.run().unwrap();
    assert_eq!(stats.strategy, Strategy::Tree);
    assert_eq!(stats.max_depth, 3);
    assert_eq!(stats.crossings, 0);
    assert!(!stats.timed_out.any());
}

#[test]
fn sibling_subtrees_do_not_overlap() {
    let config = tree_config();
    let node_sep = config.node_sep;
    let (mut s, ids) = build(12, WIDE, config);
    s.run().unwrap();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); 12];
    for &(p, c) in WIDE {
        children[p].push(c);
    }
    for kids in &children {
        let mut spans: Vec<(f64, f64)> = kids
            .iter()
            .map(|&c| extent(&s, &children, &ids, c))
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        for w in spans.windows(2) {
            // Snapping rounds each node by less than one raster step.
            assert!(w[1].0 - w[0].1 >= node_sep - 1.0, "{spans:?}");
        }
    }

    for (p, kids) in children.iter().enumerate() {
        let parent = geometry(&s, ids[p]);
        for &c in kids {
            assert!(geometry(&s, ids[c]).y > parent.y);
        }
    }
}

#[test]
fn parents_sit_over_their_children() {
    let (mut s, ids) = build(4, &[(0, 1), (0, 2), (0, 3)], tree_config());
    s.run().unwrap();
    let xs: Vec<f64> = ids.iter().map(|&v| geometry(&s, v).x).collect();
    let (lo, hi) = (xs[1].min(xs[3]), xs[1].max(xs[3]));
    assert!((xs[0] - (lo + hi) / 2.0).abs() <= 1.0);
}

#[test]
fn spread_factor_narrows_the_tree() {
    let (mut wide, _) = build(12, WIDE, tree_config());
    let mut config = tree_config();
    config.tree.spread_factor = 0.5;
    let (mut narrow, _) = build(12, WIDE, config);
    let wide = {
        wide.run().unwrap();
        wide.result().width
    };
    let narrow = {
        narrow.run().unwrap();
        narrow.result().width
    };
    assert!(narrow < wide, "{narrow} >= {wide}");
}

#[test]
fn tree_placement_visits_every_node_once() {
    let (mut s, _) = build(12, WIDE, tree_config());
    cycles::run(&mut s).unwrap();
    let plan = tree::applicable(&s.graph).unwrap();
    assert_eq!(plan.preorder.len(), 12);
    let report = tree::run(&mut s, &plan);
    assert_eq!(report.calls, 12);
    assert_eq!(report.max_depth, 3);
}

#[test]
fn deep_chains_do_not_recurse() {
    let n = 20_000;
    let edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
    let (mut s, _) = build(n, &edges, tree_config());
    cycles::run(&mut s).unwrap();
    let plan = tree::applicable(&s.graph).unwrap();
    let report = tree::run(&mut s, &plan);
    assert_eq!(report.calls, n);
    assert_eq!(report.max_depth, n - 1);
}

#[test]
fn non_trees_fall_back_to_layers() {
    // Diamond: one node has two parents.
    let (mut s, _) = build(4, &[(0, 1), (0, 2), (1, 3), (2, 3)], tree_config());
    assert_eq!(s.run().unwrap().strategy, Strategy::Layered);

    // Two roots.
    let (mut s, _) = build(4, &[(0, 1), (2, 3)], tree_config());
    assert_eq!(s.run().unwrap().strategy, Strategy::Layered);

    // Labelled edges need label layers.
    let mut s = LayoutSession::new(tree_config());
    let a = s.add_node(NodeSpec::new("a").size(40.0, 20.0));
    let b = s.add_node(NodeSpec::new("b").size(40.0, 20.0));
    s.add_edge(a, b, EdgeSpec::new().label("x")).unwrap();
    assert_eq!(s.run().unwrap().strategy, Strategy::Layered);

    // A depth hint the tree cannot honour.
    let mut s = LayoutSession::new(tree_config());
    let a = s.add_node(NodeSpec::new("a").size(40.0, 20.0));
    let b = s.add_node(NodeSpec::new("b").size(40.0, 20.0).depth_hint(3));
    s.add_edge(a, b, EdgeSpec::new()).unwrap();
    assert_eq!(s.run().unwrap().strategy, Strategy::Layered);
}

#[test]
fn standard_variant_never_uses_the_tree_strategy() {
    let (mut s, _) = build(12, WIDE, LayoutConfig::default());
    assert_eq!(s.run().unwrap().strategy, Strategy::Layered);
}

#[test]
fn satellites_travel_with_their_tree_node() {
    let (mut s, ids) = build(3, &[(0, 1), (0, 2)], tree_config());
    let sat = s.add_node(NodeSpec::new("sat").size(40.0, 20.0));
    s.add_edge(ids[1], sat, EdgeSpec::new().near()).unwrap();
    let stats = s.run().unwrap();
    assert_eq!(stats.strategy, Strategy::Tree);

    let (a, m) = (geometry(&s, ids[1]), geometry(&s, sat));
    assert_eq!(a.y, m.y);
    assert!(((a.x - m.x).abs() - 60.0).abs() <= 1.0);
    let other = geometry(&s, ids[2]);
    let (lo, hi) = (a.x.min(m.x), a.x.max(m.x));
    assert!(other.x < lo || other.x > hi);
}

#[test]
fn expired_budget_skips_the_tree_placement() {
    let (mut s, _) = build(12, WIDE, tree_config());
    let token = CancelToken::new();
    token.cancel();
    s.set_cancel_token(token);
    let stats = s.run().unwrap();
    assert_eq!(stats.strategy, Strategy::Layered);
    assert!(stats.timed_out.tree);
    // The layered fallback still produces a complete drawing.
    assert_eq!(s.result().nodes.len(), 12);
}
