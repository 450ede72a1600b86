use strata::graph::EdgeId;
use strata::geometry;
use strata::{
    Compass, EdgeSpec, EdgeStyle, LayoutConfig, LayoutSession, LayoutVariant, NodeSpec, Point,
    RankDir, Shape,
};

const EPS: f64 = 1e-6;

fn build(ids: &[&str], config: LayoutConfig) -> LayoutSession {
    let mut s = LayoutSession::new(config);
    for id in ids {
        s.add_node(NodeSpec::new(*id).size(40.0, 20.0));
    }
    s
}

fn edge(s: &mut LayoutSession, v: &str, w: &str, spec: EdgeSpec) -> EdgeId {
    let (v, w) = (s.node_id(v).unwrap(), s.node_id(w).unwrap());
    s.add_edge(v, w, spec).unwrap()
}

fn points(s: &LayoutSession, e: EdgeId) -> Vec<Point> {
    s.edge_route(e).unwrap().points()
}

#[test]
fn self_loop_goes_around_the_right_side() {
    let mut s = build(&["a"], LayoutConfig::default());
    let e = edge(&mut s, "a", "a", EdgeSpec::new());
    s.run().unwrap();

    let a = s.node_geometry(s.node_id("a").unwrap()).unwrap();
    let pts = points(&s, e);
    assert_eq!(pts.len(), 4);
    assert_eq!(pts[0].x, a.x + a.width / 2.0);
    assert_eq!(pts[3].x, a.x + a.width / 2.0);
    assert!(pts[1].x > a.x + a.width / 2.0);
    assert!(pts[0].y < pts[3].y);
    assert_eq!(s.stats().reversed_edges, 0);
}

#[test]
fn self_loop_reserves_room_next_to_its_node() {
    let config = LayoutConfig::default();
    let (node_sep, loop_size) = (config.node_sep, config.loop_size);
    let mut s = build(&["r", "a", "b"], config);
    edge(&mut s, "r", "a", EdgeSpec::new());
    edge(&mut s, "r", "b", EdgeSpec::new());
    edge(&mut s, "a", "a", EdgeSpec::new());
    edge(&mut s, "b", "b", EdgeSpec::new());
    s.run().unwrap();

    let a = s.node_geometry(s.node_id("a").unwrap()).unwrap();
    let b = s.node_geometry(s.node_id("b").unwrap()).unwrap();
    let (left, right) = if a.x < b.x { (a, b) } else { (b, a) };
    let gap = (right.x - right.width / 2.0) - (left.x + left.width / 2.0);
    assert!(gap >= node_sep + loop_size - EPS, "gap {gap}");
}

#[test]
fn labelled_self_loop_runs_through_its_label() {
    let mut s = build(&["a"], LayoutConfig::default());
    let e = edge(&mut s, "a", "a", EdgeSpec::new().label("again"));
    let stats = s.run().unwrap();

    assert_eq!(stats.max_depth, 1);
    assert_eq!(s.graph.node_count(), 1);
    let a = s.node_geometry(s.node_id("a").unwrap()).unwrap();
    let route = s.edge_route(e).unwrap();
    assert_eq!(route.segments.len(), 2);
    let pts = route.points();
    let (first, last) = (pts[0], pts[pts.len() - 1]);
    assert!((first.y - (a.y + a.height / 2.0)).abs() < EPS);
    assert!((last.y - (a.y + a.height / 2.0)).abs() < EPS);
    let label = route.label_pos.unwrap();
    assert!(label.y > a.y + a.height / 2.0);
}

#[test]
fn labelled_self_loop_keeps_its_route_under_every_variant() {
    for variant in [
        LayoutVariant::Standard,
        LayoutVariant::MinDepth,
        LayoutVariant::MaxDepth,
        LayoutVariant::MaxDownward,
    ] {
        let config = LayoutConfig {
            variant,
            ..Default::default()
        };
        let mut s = build(&["n0", "n1", "n2", "n3"], config);
        edge(&mut s, "n2", "n1", EdgeSpec::new());
        let looped = edge(&mut s, "n3", "n3", EdgeSpec::new().label("again"));
        edge(&mut s, "n0", "n3", EdgeSpec::new().label("in"));
        edge(&mut s, "n0", "n2", EdgeSpec::new().anchor(1));
        edge(&mut s, "n3", "n2", EdgeSpec::new());
        s.run().unwrap();

        let n3 = s.node_geometry(s.node_id("n3").unwrap()).unwrap();
        let route = s.edge_route(looped).unwrap();
        assert!(route.label_pos.is_some(), "{variant:?}");
        assert!(route.segments.iter().all(|seg| !seg.points.is_empty()), "{variant:?}");
        let pts = route.points();
        assert!(pts.len() >= 3, "{variant:?}: {pts:?}");
        for p in [pts[0], pts[pts.len() - 1]] {
            assert!((p.x - n3.x).abs() <= n3.width / 2.0 + EPS, "{variant:?}: {p:?}");
            assert!((p.y - n3.y).abs() <= n3.height / 2.0 + EPS, "{variant:?}: {p:?}");
        }
        for e in s.graph.edge_ids() {
            assert!(!points(&s, e).is_empty(), "{variant:?}: edge {e} has no route");
        }
    }
}

#[test]
fn labelled_edge_gets_a_label_position_between_its_ends() {
    let mut s = build(&["a", "b"], LayoutConfig::default());
    let e = edge(&mut s, "a", "b", EdgeSpec::new().label("yes"));
    let stats = s.run().unwrap();
    assert_eq!(stats.dummy_nodes, 1);

    let a = s.node_geometry(s.node_id("a").unwrap()).unwrap();
    let b = s.node_geometry(s.node_id("b").unwrap()).unwrap();
    let label = s.edge_route(e).unwrap().label_pos.unwrap();
    assert!(a.y < label.y && label.y < b.y);
}

#[test]
fn duplicate_edges_run_beside_their_primary() {
    let config = LayoutConfig::default();
    let edge_sep = config.edge_sep;
    let mut s = LayoutSession::new(config);
    s.add_node(NodeSpec::new("a").size(100.0, 20.0));
    s.add_node(NodeSpec::new("b").size(100.0, 20.0));
    let primary = edge(&mut s, "a", "b", EdgeSpec::new());
    let copy = edge(&mut s, "a", "b", EdgeSpec::new());
    let back = edge(&mut s, "b", "a", EdgeSpec::new());
    s.run().unwrap();

    let p = points(&s, primary);
    let c = points(&s, copy);
    let r = points(&s, back);
    assert_eq!(p.len(), c.len());
    assert_eq!(c[0].x - p[0].x, edge_sep);
    assert_eq!(c[0].y, p[0].y);
    assert_eq!(c[1].y, p[1].y);
    // The reverse copy starts at `b`.
    assert_eq!(r[0].y, p[1].y);
    assert_eq!(r[1].y, p[0].y);
    assert_eq!(r[0].x - p[1].x, 2.0 * edge_sep);
}

#[test]
fn orthogonal_routes_use_axis_parallel_segments() {
    let config = LayoutConfig {
        edge_style: EdgeStyle::Orthogonal,
        port_sharing: false,
        ..Default::default()
    };
    let mut s = build(&["r", "a", "b", "c", "d"], config);
    let edges = [
        edge(&mut s, "r", "a", EdgeSpec::new()),
        edge(&mut s, "r", "b", EdgeSpec::new()),
        edge(&mut s, "r", "c", EdgeSpec::new()),
        edge(&mut s, "r", "d", EdgeSpec::new()),
    ];
    s.run().unwrap();

    let mut bent = 0;
    for e in edges {
        let pts = points(&s, e);
        assert!(pts.len() == 2 || pts.len() == 4);
        if pts.len() == 4 {
            bent += 1;
        }
        for w in pts.windows(2) {
            let (dx, dy) = ((w[1].x - w[0].x).abs(), (w[1].y - w[0].y).abs());
            assert!(dx < EPS || dy < EPS, "diagonal step {w:?}");
        }
    }
    assert!(bent >= 2);

    // Bend rows inside one gap are stacked, not merged.
    let mut rows: Vec<f64> = edges
        .iter()
        .map(|&e| points(&s, e))
        .filter(|p| p.len() == 4)
        .map(|p| p[1].y)
        .collect();
    rows.sort_by(f64::total_cmp);
    rows.dedup();
    assert!(rows.len() >= 2);
}

#[test]
fn spread_ports_stay_on_the_node_outline() {
    let config = LayoutConfig {
        port_sharing: false,
        ..Default::default()
    };
    let mut s = build(&["r", "a", "b", "c"], config);
    let edges = [
        edge(&mut s, "r", "a", EdgeSpec::new()),
        edge(&mut s, "r", "b", EdgeSpec::new()),
        edge(&mut s, "r", "c", EdgeSpec::new()),
    ];
    s.run().unwrap();

    let r = s.node_geometry(s.node_id("r").unwrap()).unwrap();
    let mut starts: Vec<f64> = edges.iter().map(|&e| points(&s, e)[0].x).collect();
    starts.sort_by(f64::total_cmp);
    starts.dedup();
    assert_eq!(starts.len(), 3);
    for x in starts {
        assert!((x - r.x).abs() <= r.width / 2.0 + EPS);
    }
}

#[test]
fn arrowheads_point_into_their_nodes() {
    let mut s = build(&["a", "b"], LayoutConfig::default());
    let e = edge(&mut s, "a", "b", EdgeSpec::new());
    s.run().unwrap();
    let route = s.edge_route(e).unwrap();
    assert_eq!(route.source_orientation, Some(Compass::N));
    assert_eq!(route.target_orientation, Some(Compass::S));

    let config = LayoutConfig {
        rankdir: RankDir::LR,
        ..Default::default()
    };
    let mut s = build(&["a", "b"], config);
    let e = edge(&mut s, "a", "b", EdgeSpec::new());
    s.run().unwrap();
    let route = s.edge_route(e).unwrap();
    assert_eq!(route.source_orientation, Some(Compass::W));
    assert_eq!(route.target_orientation, Some(Compass::E));
}

#[test]
fn reversed_edges_keep_their_input_direction() {
    let mut s = build(&["a", "b"], LayoutConfig::default());
    let down = edge(&mut s, "a", "b", EdgeSpec::new().label("x"));
    // Labelled, so it is not folded into a duplicate of `down`.
    let up = edge(&mut s, "b", "a", EdgeSpec::new().label("y"));
    let stats = s.run().unwrap();
    assert_eq!(stats.reversed_edges, 1);

    let a = s.node_geometry(s.node_id("a").unwrap()).unwrap();
    let b = s.node_geometry(s.node_id("b").unwrap()).unwrap();
    let (d, u) = (points(&s, down), points(&s, up));
    assert!((d[0].y - (a.y + a.height / 2.0)).abs() < EPS);
    assert!((u[0].y - (b.y - b.height / 2.0)).abs() < EPS);
    assert!((u[u.len() - 1].y - (a.y + a.height / 2.0)).abs() < EPS);
    let route = s.edge_route(up).unwrap();
    assert_eq!(route.target_orientation, Some(Compass::N));
}

#[test]
fn triangle_ports_follow_the_drawn_outline_in_every_direction() {
    for rankdir in [RankDir::TB, RankDir::BT, RankDir::LR, RankDir::RL] {
        let config = LayoutConfig {
            rankdir,
            port_sharing: false,
            ..Default::default()
        };
        let mut s = LayoutSession::new(config);
        s.add_node(NodeSpec::new("p").size(40.0, 20.0));
        s.add_node(NodeSpec::new("t").shape(Shape::Triangle).size(60.0, 30.0));
        s.add_node(NodeSpec::new("a").size(40.0, 20.0));
        s.add_node(NodeSpec::new("b").size(40.0, 20.0));
        let into = edge(&mut s, "p", "t", EdgeSpec::new());
        let out = [
            edge(&mut s, "t", "a", EdgeSpec::new()),
            edge(&mut s, "t", "b", EdgeSpec::new()),
        ];
        s.run().unwrap();

        let t = s.graph.node(s.node_id("t").unwrap()).unwrap();
        let end = points(&s, into);
        let last = end[end.len() - 1];
        assert!(geometry::on_boundary(t, last, EPS), "{rankdir:?} in: {last:?}");
        for e in out {
            let first = points(&s, e)[0];
            assert!(geometry::on_boundary(t, first, EPS), "{rankdir:?} out: {first:?}");
        }
    }
}
