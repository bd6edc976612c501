use super::*;
use crate::error::RouteError;
use crate::edge::EdgeId;

fn engine(n: usize, edges: &[(usize, usize, u32)]) -> RouteEngine {
    let mut adj = vec![Vec::new(); n];
    for &(u, v, c) in edges {
        adj[u].push((NodeId(v), c));
    }
    RouteEngine::from_adjacency(&adj).unwrap()
}

fn diamond() -> RouteEngine {
    engine(4, &[(0, 1, 1), (0, 2, 5), (1, 3, 1), (2, 3, 1)])
}

/// 0 -> 2 is expensive; 1 and 2 are linked both ways.
fn crossed() -> RouteEngine {
    engine(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (0, 2, 5), (2, 1, 1), (1, 3, 1)])
}

fn hops(route: &Route) -> Vec<(usize, usize)> {
    route.steps.iter().map(|s| (s.from.0, s.to.0)).collect()
}

#[test]
fn diamond_shortest_route() {
    let e = diamond();
    let r = e.shortest_route(NodeId(0), NodeId(3)).unwrap().unwrap();
    assert_eq!(hops(&r), vec![(0, 1), (1, 3)]);
    assert_eq!(r.cost, 2);
    assert_eq!(r.nodes(), vec![NodeId(0), NodeId(1), NodeId(3)]);
}

#[test]
fn diamond_through_node_two() {
    let mut e = diamond();
    let r = e
        .shortest_route_with_waypoints(
            NodeId(0),
            NodeId(3),
            &[Filter::Node(NodeId(2))],
            FilterOrder::Unordered,
        )
        .unwrap()
        .unwrap();
    assert_eq!(hops(&r), vec![(0, 2), (2, 3)]);
    assert_eq!(r.cost, 6);
}

#[test]
fn disconnected_pair() {
    let e = engine(4, &[(0, 1, 1), (2, 3, 1)]);
    assert!(!e.is_reachable(NodeId(0), NodeId(3)).unwrap());
    assert!(e.shortest_route(NodeId(0), NodeId(3)).unwrap().is_none());
}

#[test]
fn triangle_all_routes() {
    let mut e = engine(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 3)]);
    let routes = e.all_routes(NodeId(0), NodeId(2)).unwrap();
    let found: Vec<_> = routes.iter().map(hops).collect();
    assert_eq!(found, vec![vec![(0, 1), (1, 2)], vec![(0, 2)]]);
    assert_eq!(routes[0].cost, 2);
    assert_eq!(routes[1].cost, 3);
}

#[test]
fn route_limits_are_inclusive() {
    let mut e = engine(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 3)]);
    let cheap = e
        .all_routes_with_waypoints(NodeId(0), NodeId(2), &[], FilterOrder::Unordered, RouteLimits::new(2, usize::MAX))
        .unwrap();
    assert_eq!(cheap.iter().map(hops).collect::<Vec<_>>(), vec![vec![(0, 1), (1, 2)]]);
    let short = e
        .all_routes_with_waypoints(NodeId(0), NodeId(2), &[], FilterOrder::Unordered, RouteLimits::new(u64::MAX, 1))
        .unwrap();
    assert_eq!(short.iter().map(hops).collect::<Vec<_>>(), vec![vec![(0, 2)]]);
    let none = e
        .all_routes_with_waypoints(NodeId(0), NodeId(2), &[], FilterOrder::Unordered, RouteLimits::new(1, 5))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn all_routes_through_a_node() {
    let mut e = crossed();
    let routes = e
        .all_routes_with_waypoints(
            NodeId(0),
            NodeId(3),
            &[Filter::Node(NodeId(2))],
            FilterOrder::Unordered,
            RouteLimits::default(),
        )
        .unwrap();
    let costs: Vec<u64> = routes.iter().map(|r| r.cost).collect();
    assert_eq!(costs, vec![3, 6, 7]);
    assert!(routes.iter().all(|r| r.visits(NodeId(2))));
}

#[test]
fn ordered_filters_change_the_optimum() {
    let mut e = crossed();
    let filters = [Filter::Node(NodeId(2)), Filter::Node(NodeId(1))];
    let any = e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &filters, FilterOrder::Unordered)
        .unwrap()
        .unwrap();
    assert_eq!(hops(&any), vec![(0, 1), (1, 2), (2, 3)]);
    let ordered = e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &filters, FilterOrder::Ordered)
        .unwrap()
        .unwrap();
    assert_eq!(hops(&ordered), vec![(0, 2), (2, 1), (1, 3)]);
    assert_eq!(ordered.cost, 7);
}

#[test]
fn required_edge_into_end_is_folded() {
    let mut e = diamond();
    let r = e
        .shortest_route_with_waypoints(
            NodeId(0),
            NodeId(3),
            &[Filter::Edge(NodeId(2), NodeId(3))],
            FilterOrder::Unordered,
        )
        .unwrap()
        .unwrap();
    assert_eq!(hops(&r), vec![(0, 2), (2, 3)]);
    assert!(r.traverses(NodeId(2), NodeId(3)));
}

#[test]
fn required_edge_in_the_middle() {
    let mut e = crossed();
    let r = e
        .shortest_route_with_waypoints(
            NodeId(0),
            NodeId(3),
            &[Filter::Edge(NodeId(2), NodeId(1))],
            FilterOrder::Unordered,
        )
        .unwrap()
        .unwrap();
    assert_eq!(hops(&r), vec![(0, 2), (2, 1), (1, 3)]);
}

#[test]
fn contradictions_and_missing_edges_give_empty_results() {
    let mut e = diamond();
    let dup = [Filter::Node(NodeId(1)), Filter::Node(NodeId(1))];
    assert!(e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &dup, FilterOrder::Unordered)
        .unwrap()
        .is_none());
    let missing = [Filter::Edge(NodeId(1), NodeId(2))];
    assert!(e
        .all_routes_with_waypoints(NodeId(0), NodeId(3), &missing, FilterOrder::Unordered, RouteLimits::default())
        .unwrap()
        .is_empty());
    let both = [Filter::Node(NodeId(1)), Filter::Node(NodeId(2))];
    assert!(e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &both, FilterOrder::Unordered)
        .unwrap()
        .is_none());
}

#[test]
fn start_equal_to_end_has_no_route() {
    let mut e = diamond();
    assert!(e.shortest_route(NodeId(1), NodeId(1)).unwrap().is_none());
    assert!(!e.is_reachable(NodeId(1), NodeId(1)).unwrap());
    assert!(e.all_routes(NodeId(1), NodeId(1)).unwrap().is_empty());
}

#[test]
fn out_of_range_nodes_are_errors() {
    let mut e = diamond();
    assert_eq!(
        e.shortest_route(NodeId(0), NodeId(7)).unwrap_err(),
        RouteError::NodeOutOfRange { node: 7, count: 4 }
    );
    assert!(e.is_reachable(NodeId(9), NodeId(0)).is_err());
    assert!(e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &[Filter::Node(NodeId(4))], FilterOrder::Unordered)
        .is_err());
    assert!(e.set_edge(NodeId(0), NodeId(4), Some(1)).is_err());
}

#[test]
fn searches_restore_edge_state() {
    let mut e = crossed();
    let before = e.store().snapshot();
    let filters = [Filter::Node(NodeId(2)), Filter::Node(NodeId(1))];
    for order in [FilterOrder::Unordered, FilterOrder::Ordered] {
        e.shortest_route_with_waypoints(NodeId(0), NodeId(3), &filters, order)
            .unwrap();
        e.all_routes_with_waypoints(NodeId(0), NodeId(3), &filters, order, RouteLimits::new(6, 3))
            .unwrap();
        assert_eq!(e.store().snapshot(), before);
    }
}

#[test]
fn node_and_edge_into_it_count_as_one_filter() {
    let mut e = crossed();
    let filters = [Filter::Node(NodeId(1)), Filter::Edge(NodeId(2), NodeId(1))];
    for order in [FilterOrder::Unordered, FilterOrder::Ordered] {
        let r = e
            .shortest_route_with_waypoints(NodeId(0), NodeId(3), &filters, order)
            .unwrap()
            .unwrap();
        assert_eq!(hops(&r), vec![(0, 2), (2, 1), (1, 3)], "{order:?}");
    }
}

/// Out and in rows of every node, in store order.
fn rows(e: &RouteEngine) -> Vec<(Vec<EdgeId>, Vec<EdgeId>)> {
    (0..e.node_count())
        .map(|i| {
            let n = NodeId(i);
            (e.store().out_row(n).to_vec(), e.store().in_row(n).to_vec())
        })
        .collect()
}

#[test]
fn searches_leave_rows_in_their_original_order() {
    // Pruning suppresses 0 → 1 while the bias lowers 0 → 2 below it.
    let mut e = diamond();
    e.disable_node(NodeId(1), Direction::Out).unwrap();
    let before = rows(&e);
    let through_two = [Filter::Node(NodeId(2))];
    let first = e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &through_two, FilterOrder::Unordered)
        .unwrap();
    assert_eq!(rows(&e), before);
    let second = e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &through_two, FilterOrder::Unordered)
        .unwrap();
    assert_eq!(first, second);
    e.enable_node(NodeId(1), Direction::Out).unwrap();
    e.enable_node(NodeId(1), Direction::Out).unwrap();
    let fresh = diamond();
    assert_eq!(rows(&e), rows(&fresh));
    assert_eq!(e.store().snapshot(), fresh.store().snapshot());
}

#[test]
fn graph_edits_are_seen_by_queries() {
    let mut e = diamond();
    e.set_edge(NodeId(1), NodeId(3), None).unwrap();
    let r = e.shortest_route(NodeId(0), NodeId(3)).unwrap().unwrap();
    assert_eq!(r.cost, 6);
    e.set_edge(NodeId(0), NodeId(3), Some(2)).unwrap();
    assert_eq!(e.shortest_route(NodeId(0), NodeId(3)).unwrap().unwrap().cost, 2);
    let extra = e.add_node();
    e.set_edge(NodeId(3), extra, Some(1)).unwrap();
    assert!(e.is_reachable(NodeId(0), extra).unwrap());
    e.remove_node(NodeId(3)).unwrap();
    assert_eq!(e.node_count(), 4);
    assert!(!e.is_reachable(NodeId(0), NodeId(3)).unwrap());
}

#[test]
fn disabled_nodes_are_avoided_until_enabled() {
    let mut e = diamond();
    e.disable_node(NodeId(1), Direction::In).unwrap();
    assert_eq!(e.shortest_route(NodeId(0), NodeId(3)).unwrap().unwrap().cost, 6);
    e.enable_node(NodeId(1), Direction::In).unwrap();
    assert_eq!(e.shortest_route(NodeId(0), NodeId(3)).unwrap().unwrap().cost, 2);
}

#[test]
fn fully_folded_filters_return_the_fixed_route() {
    let mut e = diamond();
    let filters = [Filter::Edge(NodeId(0), NodeId(1)), Filter::Edge(NodeId(1), NodeId(3))];
    let r = e
        .shortest_route_with_waypoints(NodeId(0), NodeId(3), &filters, FilterOrder::Ordered)
        .unwrap()
        .unwrap();
    assert_eq!(hops(&r), vec![(0, 1), (1, 3)]);
    let limited = e
        .all_routes_with_waypoints(NodeId(0), NodeId(3), &filters, FilterOrder::Ordered, RouteLimits::new(1, 5))
        .unwrap();
    assert!(limited.is_empty());
}
