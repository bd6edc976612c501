use super::*;
use crate::edge::{EdgeId, NodeId};
use crate::store::{Bias, EdgeStore, Suppress};
use crate::waypoint::{normalize, Filter, FilterOrder, Normalized};

fn store(n: usize, edges: &[(usize, usize, u32)]) -> EdgeStore {
    let mut adj = vec![Vec::new(); n];
    for &(u, v, c) in edges {
        adj[u].push((NodeId(v), c));
    }
    let mut s = EdgeStore::new(n);
    s.set_edges(&adj).unwrap();
    s
}

fn norm(s: &EdgeStore, start: usize, end: usize, filters: &[Filter]) -> Normalized {
    normalize(s, NodeId(start), NodeId(end), filters, FilterOrder::Unordered)
        .unwrap()
        .unwrap()
}

fn id(s: &EdgeStore, u: usize, v: usize) -> EdgeId {
    s.find_edge(NodeId(u), NodeId(v)).unwrap()
}

fn diamond() -> EdgeStore {
    store(4, &[(0, 1, 1), (0, 2, 5), (1, 3, 1), (2, 3, 1)])
}

#[test]
fn endpoints_and_self_loops_are_suppressed() {
    let mut s = store(3, &[(0, 1, 1), (1, 0, 1), (1, 1, 1), (1, 2, 1), (2, 1, 1)]);
    let n = norm(&s, 0, 2, &[]);
    let before = s.snapshot();
    {
        let mut g = Suppress::new(&mut s);
        let plan = prepare(&mut g, &n, false, true).unwrap();
        assert!(!g.edge(id(&g, 1, 0)).is_active());
        assert!(!g.edge(id(&g, 2, 1)).is_active());
        assert!(!g.edge(id(&g, 1, 1)).is_active());
        assert!(g.edge(id(&g, 0, 1)).is_active());
        assert_eq!(plan.routes.len(), 1);
        assert_eq!(plan.routes[0].edges.len(), 2);
    }
    assert_eq!(s.snapshot(), before);
}

#[test]
fn transit_with_single_neighbours_forces_a_jump_route() {
    let mut s = diamond();
    let n = norm(&s, 0, 3, &[Filter::Node(NodeId(2))]);
    let mut g = Suppress::new(&mut s);
    let plan = prepare(&mut g, &n, true, true).unwrap();
    let route = plan.jump_at(NodeId(0)).unwrap();
    assert_eq!(route.edges, vec![id(&g, 0, 2), id(&g, 2, 3)]);
    assert_eq!(route.tail, NodeId(3));
    assert_eq!(route.consumes, vec![(0, 0)]);
    assert!(!g.edge(id(&g, 0, 1)).is_active());
    assert!(!g.edge(id(&g, 1, 3)).is_active());
    assert!(plan.mandatory[2] && !plan.mandatory[1]);
}

#[test]
fn jump_routes_can_be_switched_off() {
    let mut s = diamond();
    let n = norm(&s, 0, 3, &[Filter::Node(NodeId(2))]);
    let mut g = Suppress::new(&mut s);
    let plan = prepare(&mut g, &n, true, false).unwrap();
    assert!(plan.routes.is_empty());
    assert!(plan.jump_at(NodeId(0)).is_none());
}

#[test]
fn transit_without_in_edges_is_infeasible() {
    let mut s = store(4, &[(0, 1, 1), (1, 3, 1), (2, 3, 1)]);
    let n = norm(&s, 0, 3, &[Filter::Node(NodeId(2))]);
    let before = s.snapshot();
    {
        let mut g = Suppress::new(&mut s);
        assert!(prepare(&mut g, &n, true, true).is_none());
    }
    assert_eq!(s.snapshot(), before);
}

#[test]
fn forced_cycle_is_infeasible() {
    let mut s = store(4, &[(0, 3, 1), (1, 2, 1), (2, 1, 1), (1, 3, 1)]);
    let n = norm(&s, 0, 3, &[Filter::Node(NodeId(1))]);
    let mut g = Suppress::new(&mut s);
    assert!(prepare(&mut g, &n, false, true).is_none());
}

#[test]
fn pass_through_node_with_cheaper_shortcut_is_dropped_for_shortest_only() {
    let mut s = store(4, &[(0, 1, 1), (1, 2, 1), (0, 2, 1), (0, 3, 9), (2, 3, 1)]);
    let n = norm(&s, 0, 3, &[]);
    {
        let mut g = Suppress::new(&mut s);
        prepare(&mut g, &n, false, true).unwrap();
        assert!(g.edge(id(&g, 0, 1)).is_active());
    }
    let mut g = Suppress::new(&mut s);
    prepare(&mut g, &n, true, true).unwrap();
    assert!(!g.edge(id(&g, 0, 1)).is_active());
    assert!(!g.edge(id(&g, 1, 2)).is_active());
    assert!(g.edge(id(&g, 0, 2)).is_active());
}

#[test]
fn dead_ends_are_dropped_for_shortest() {
    let mut s = store(4, &[(0, 1, 1), (1, 3, 1), (0, 2, 1)]);
    let n = norm(&s, 0, 3, &[]);
    let mut g = Suppress::new(&mut s);
    prepare(&mut g, &n, true, true).unwrap();
    assert!(!g.edge(id(&g, 0, 2)).is_active());
}

#[test]
fn required_edge_suppresses_its_siblings() {
    let mut s = store(
        5,
        &[(0, 1, 1), (0, 2, 1), (1, 2, 1), (1, 3, 1), (2, 3, 1), (3, 4, 1), (2, 4, 1)],
    );
    let n = norm(&s, 0, 4, &[Filter::Edge(NodeId(1), NodeId(2))]);
    let mut g = Suppress::new(&mut s);
    let plan = prepare(&mut g, &n, false, true).unwrap();
    assert!(g.edge(id(&g, 1, 2)).is_active());
    assert!(!g.edge(id(&g, 1, 3)).is_active());
    assert!(!g.edge(id(&g, 0, 2)).is_active());
    assert!(plan.mandatory[1] && plan.mandatory[2]);
    assert_eq!(plan.transit_of[2], Some(0));
}

#[test]
fn bias_is_a_constant_shift_and_is_restored() {
    let mut s = diamond();
    let n = norm(&s, 0, 3, &[Filter::Node(NodeId(2))]);
    let before = s.snapshot();
    {
        let mut g = Suppress::new(&mut s);
        prepare(&mut g, &n, true, true).unwrap();
        let mut b = Bias::new(&mut g);
        let discount = apply_bias(&mut b, &n);
        // relaxed: in(2) takes all of 0 → 2, in(3) all of 2 → 3, out(2) = 0
        assert_eq!(discount, 6000);
        assert_eq!(b.edge(id(&b, 0, 2)).calc_cost(), 0);
        assert_eq!(b.edge(id(&b, 2, 3)).calc_cost(), 0);
    }
    assert_eq!(s.snapshot(), before);
}

#[test]
fn bias_never_goes_negative() {
    let mut s = store(
        5,
        &[(0, 1, 4), (0, 2, 1), (1, 2, 1), (2, 1, 7), (1, 4, 2), (2, 4, 9), (2, 3, 1), (3, 4, 1)],
    );
    let n = norm(&s, 0, 4, &[Filter::Node(NodeId(1)), Filter::Node(NodeId(2))]);
    let mut g = Suppress::new(&mut s);
    prepare(&mut g, &n, false, true).unwrap();
    let raw: Vec<u64> = g.edges().map(|e| e.calc_cost()).collect();
    let mut b = Bias::new(&mut g);
    apply_bias(&mut b, &n);
    for (e, &r) in b.edges().zip(&raw) {
        assert!(e.calc_cost() <= r);
    }
}

#[test]
fn relaxed_bias_shifts_every_compliant_route_by_the_discount() {
    let mut s = store(
        5,
        &[(0, 1, 4), (0, 2, 1), (1, 2, 1), (2, 1, 7), (1, 4, 2), (2, 4, 9), (2, 3, 1), (3, 4, 1)],
    );
    let n = norm(&s, 0, 4, &[Filter::Node(NodeId(1)), Filter::Node(NodeId(2))]);
    let mut g = Suppress::new(&mut s);
    prepare(&mut g, &n, false, true).unwrap();
    let raw: Vec<u64> = g.edges().map(|e| e.calc_cost()).collect();
    let mut b = Bias::new(&mut g);
    let discount = apply_bias(&mut b, &n);
    // The seed gives in(1) half of 0 → 1; relaxing hands it the rest.
    assert_eq!(discount, 7000);
    for route in [&[0, 2, 1, 4][..], &[0, 1, 2, 3, 4], &[0, 1, 2, 4]] {
        let ids: Vec<EdgeId> = route.windows(2).map(|w| id(&b, w[0], w[1])).collect();
        let before: u64 = ids.iter().map(|e| raw[e.0]).sum();
        let after: u64 = ids.iter().map(|&e| b.edge(e).calc_cost()).sum();
        assert_eq!(after + discount, before, "{route:?}");
    }
}
