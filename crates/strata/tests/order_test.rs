use strata::graph::{Graph, NodeId};
use strata::order::{self, cross_count};
use strata::session::CrossScratch;
use strata::{EdgeLabel, EdgeSpec, LayoutConfig, LayoutSession, NodeLabel, NodeSpec};
use strata::{cycles, normalize, rank};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn random_dag(seed: u64, nodes: usize, edges: usize) -> LayoutSession {
    let mut rng = Lcg(seed);
    let mut s = LayoutSession::new(LayoutConfig::default());
    let ids: Vec<NodeId> = (0..nodes)
        .map(|i| s.add_node(NodeSpec::new(format!("n{i}")).size(30.0, 20.0)))
        .collect();
    for _ in 0..edges {
        let a = rng.below(nodes as u64) as usize;
        let b = rng.below(nodes as u64) as usize;
        if a == b {
            continue;
        }
        let (v, w) = (ids[a.min(b)], ids[a.max(b)]);
        let priority = 1 + rng.below(3) as u32;
        s.add_edge(v, w, EdgeSpec::new().priority(priority)).unwrap();
    }
    s
}

fn brute_total(s: &LayoutSession, weighted: bool) -> u64 {
    s.layers
        .windows(2)
        .map(|w| cross_count::brute_force(&s.graph, &w[0].nodes, &w[1].nodes, weighted))
        .sum()
}

fn prepare(s: &mut LayoutSession) {
    cycles::run(s).unwrap();
    rank::run(s).unwrap();
    normalize::run(s).unwrap();
}

#[test]
fn cross_count_matches_the_pairwise_count() {
    for seed in 1..40 {
        let mut rng = Lcg(seed);
        let mut g: Graph<NodeLabel, EdgeLabel> = Graph::new();
        let upper_len = 1 + rng.below(7) as usize;
        let lower_len = 1 + rng.below(7) as usize;
        let mut layer = |len: usize| -> Vec<NodeId> {
            (0..len)
                .map(|order| {
                    g.add_node(NodeLabel {
                        order,
                        ..Default::default()
                    })
                })
                .collect()
        };
        let upper = layer(upper_len);
        let lower = layer(lower_len);
        for _ in 0..rng.below(16) {
            let u = upper[rng.below(upper_len as u64) as usize];
            let l = lower[rng.below(lower_len as u64) as usize];
            let label = EdgeLabel {
                priority: 1 + rng.below(4) as u32,
                ..Default::default()
            };
            g.add_edge(u, l, label).unwrap();
        }

        let mut scratch = CrossScratch::default();
        for weighted in [false, true] {
            assert_eq!(
                cross_count::between(&g, &upper, &lower, weighted, &mut scratch),
                cross_count::brute_force(&g, &upper, &lower, weighted),
                "seed {seed}, weighted {weighted}"
            );
        }
    }
}

#[test]
fn cross_count_weights_multiply() {
    let mut g: Graph<NodeLabel, EdgeLabel> = Graph::new();
    let a = g.add_node(NodeLabel::default());
    let b = g.add_node(NodeLabel {
        order: 1,
        ..Default::default()
    });
    let c = g.add_node(NodeLabel::default());
    let d = g.add_node(NodeLabel {
        order: 1,
        ..Default::default()
    });
    let heavy = |priority| EdgeLabel {
        priority,
        ..Default::default()
    };
    g.add_edge(a, d, heavy(3)).unwrap();
    g.add_edge(b, c, heavy(5)).unwrap();
    let mut scratch = CrossScratch::default();
    assert_eq!(cross_count::between(&g, &[a, b], &[c, d], true, &mut scratch), 15);
    assert_eq!(cross_count::between(&g, &[a, b], &[c, d], false, &mut scratch), 1);
    assert_eq!(cross_count::between(&g, &[a, b], &[], false, &mut scratch), 0);
}

#[test]
fn ordering_never_increases_crossings() {
    for seed in 1..25 {
        let mut s = random_dag(seed, 14, 26);
        prepare(&mut s);
        let weighted = s.config.crossing.weight_by_priority;
        let before = brute_total(&s, weighted);
        order::run(&mut s).unwrap();
        let after = brute_total(&s, weighted);
        assert!(after <= before, "seed {seed}: {before} -> {after}");
        assert_eq!(s.stats.crossings, after, "seed {seed}");
    }
}

#[test]
fn ordering_keeps_layers_and_order_fields_in_sync() {
    let mut s = random_dag(7, 12, 22);
    prepare(&mut s);
    order::run(&mut s).unwrap();
    for (depth, layer) in s.layers.iter().enumerate() {
        for (i, &v) in layer.nodes.iter().enumerate() {
            let n = s.graph.node(v).unwrap();
            assert_eq!(n.order, i);
            assert_eq!(n.depth, Some(depth));
        }
    }
}

#[test]
fn ordering_honours_order_hints() {
    let mut s = LayoutSession::new(LayoutConfig::default());
    let r = s.add_node(NodeSpec::new("r").size(30.0, 20.0));
    let a = s.add_node(NodeSpec::new("a").size(30.0, 20.0).order_hint(2));
    let b = s.add_node(NodeSpec::new("b").size(30.0, 20.0).order_hint(0));
    let c = s.add_node(NodeSpec::new("c").size(30.0, 20.0).order_hint(1));
    for v in [a, b, c] {
        s.add_edge(r, v, EdgeSpec::new()).unwrap();
    }
    prepare(&mut s);
    order::run(&mut s).unwrap();
    assert_eq!(s.layers[1].nodes, vec![b, c, a]);
}

#[test]
fn connection_chains_stay_contiguous() {
    let mut s = random_dag(11, 10, 16);
    let ids: Vec<NodeId> = ["p", "q", "r"]
        .iter()
        .map(|id| s.add_node(NodeSpec::new(*id).size(30.0, 20.0)))
        .collect();
    let n = |s: &LayoutSession, id: &str| s.node_id(id).unwrap();
    let (n0, n1, n9) = (n(&s, "n0"), n(&s, "n1"), n(&s, "n9"));
    s.add_edge(n0, ids[0], EdgeSpec::new()).unwrap();
    s.add_edge(n1, ids[2], EdgeSpec::new()).unwrap();
    s.add_edge(ids[1], n9, EdgeSpec::new()).unwrap();
    s.add_edge(ids[0], ids[1], EdgeSpec::new().near()).unwrap();
    s.add_edge(ids[1], ids[2], EdgeSpec::new().near()).unwrap();
    prepare(&mut s);
    order::run(&mut s).unwrap();

    let orders: Vec<usize> = ids.iter().map(|&v| s.graph.node(v).unwrap().order).collect();
    let depth = s.graph.node(ids[0]).unwrap().depth;
    assert!(ids.iter().all(|&v| s.graph.node(v).unwrap().depth == depth));
    let (lo, hi) = (
        *orders.iter().min().unwrap(),
        *orders.iter().max().unwrap(),
    );
    assert_eq!(hi - lo, 2);
    // The middle partner stays in the middle.
    assert!(orders[1] > lo && orders[1] < hi);
}

#[test]
fn ordering_finds_a_crossing_free_drawing_of_a_tree() {
    let mut s = LayoutSession::new(LayoutConfig::default());
    let ids: Vec<NodeId> = (0..10)
        .map(|i| s.add_node(NodeSpec::new(format!("t{i}")).size(30.0, 20.0)))
        .collect();
    // Children listed so the insertion order interleaves subtrees.
    for (p, c) in [(0, 1), (0, 2), (1, 3), (2, 4), (1, 5), (2, 6), (3, 7), (4, 8), (5, 9)] {
        s.add_edge(ids[p], ids[c], EdgeSpec::new()).unwrap();
    }
    prepare(&mut s);
    order::run(&mut s).unwrap();
    assert_eq!(s.stats.crossings, 0);
}
