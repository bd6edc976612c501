use super::*;
use crate::edge::NodeId;
use crate::engine::RouteEngine;
use crate::gen::{draw_adjacency, GraphCfg, NodeCount, ReplayToken};
use crate::waypoint::{Filter, FilterOrder};

fn engine(n: usize, edges: &[(usize, usize, u32)]) -> RouteEngine {
    let mut adj = vec![Vec::new(); n];
    for &(u, v, c) in edges {
        adj[u].push((NodeId(v), c));
    }
    RouteEngine::from_adjacency(&adj).unwrap()
}

fn ablations() -> Vec<SearchCfg> {
    let full = SearchCfg::default();
    vec![
        full,
        SearchCfg::plain(),
        SearchCfg { cost_bias: false, ..full },
        SearchCfg { jump_routes: false, ..full },
        SearchCfg { skip_duplicates: false, ..full },
        SearchCfg { bottleneck_check: false, ..full },
        SearchCfg { exact_order_limit: 0, ..full },
    ]
}

fn n(i: usize) -> NodeId {
    NodeId(i)
}

#[test]
fn route_helpers() {
    let e = engine(3, &[(0, 1, 2), (1, 2, 3)]);
    let r = e.shortest_route(n(0), n(2)).unwrap().unwrap();
    assert_eq!(r.len(), 2);
    assert!(!r.is_empty());
    assert_eq!(r.cost, 5);
    assert_eq!(r.nodes(), vec![n(0), n(1), n(2)]);
    assert!(r.visits(n(1)));
    assert!(r.traverses(n(1), n(2)));
    assert!(!r.traverses(n(2), n(1)));
    assert!(Route::default().nodes().is_empty());
}

#[test]
fn default_cfg_enables_every_acceleration() {
    let cfg = SearchCfg::default();
    assert!(cfg.cost_bias && cfg.jump_routes && cfg.skip_duplicates && cfg.bottleneck_check);
    assert_eq!(cfg.exact_order_limit, 3);
    let limits = RouteLimits::default();
    assert_eq!((limits.cost_max, limits.hop_max), (u64::MAX, usize::MAX));
}

/// Reaching 2 and leaving it both have to pass node 1.
fn shared_bottleneck() -> RouteEngine {
    engine(
        12,
        &[
            (0, 5, 1),
            (0, 6, 1),
            (5, 1, 1),
            (6, 1, 1),
            (1, 8, 1),
            (1, 9, 1),
            (8, 2, 1),
            (9, 2, 1),
            (2, 3, 1),
            (2, 4, 1),
            (3, 1, 1),
            (4, 1, 1),
            (1, 10, 1),
            (1, 11, 1),
            (10, 7, 1),
            (11, 7, 1),
        ],
    )
}

#[test]
fn bottleneck_through_the_filter_has_no_simple_route() {
    let mut e = shared_bottleneck();
    let filters = [Filter::Node(n(2))];
    for cfg in ablations() {
        e.set_cfg(cfg);
        let best = e
            .shortest_route_with_waypoints(n(0), n(7), &filters, FilterOrder::Unordered)
            .unwrap();
        assert!(best.is_none(), "{cfg:?}");
        let all = e
            .all_routes_with_waypoints(n(0), n(7), &filters, FilterOrder::Unordered, RouteLimits::default())
            .unwrap();
        assert!(all.is_empty(), "{cfg:?}");
    }
    assert_eq!(e.shortest_route(n(0), n(7)).unwrap().unwrap().cost, 4);
}

#[test]
fn forced_chain_is_followed_to_the_end() {
    // 0 -> 1 -> 2 -> 3 -> 6 is the only way through 2; 4 and 5 are detours.
    let mut e = engine(
        7,
        &[(0, 1, 2), (1, 2, 2), (2, 3, 2), (3, 6, 2), (0, 4, 1), (4, 6, 1), (0, 5, 1), (5, 3, 1)],
    );
    for cfg in ablations() {
        e.set_cfg(cfg);
        let r = e
            .shortest_route_with_waypoints(n(0), n(6), &[Filter::Node(n(2))], FilterOrder::Unordered)
            .unwrap()
            .unwrap();
        assert_eq!(r.nodes(), vec![n(0), n(1), n(2), n(3), n(6)], "{cfg:?}");
        assert_eq!(r.cost, 8);
    }
}

#[test]
fn complete_graph_search_agrees_across_configs() {
    // Uniform costs make every detour a duplicate of a shorter route.
    let size = 7;
    let mut edges = Vec::new();
    for u in 0..size {
        for v in 0..size {
            if u != v {
                edges.push((u, v, 1));
            }
        }
    }
    let mut e = engine(size, &edges);
    let filters = [Filter::Node(n(2)), Filter::Node(n(4)), Filter::Node(n(5))];
    for cfg in ablations() {
        e.set_cfg(cfg);
        let r = e
            .shortest_route_with_waypoints(n(0), n(6), &filters, FilterOrder::Unordered)
            .unwrap()
            .unwrap();
        assert_eq!(r.cost, 4, "{cfg:?}");
        assert!(filters.iter().all(|f| r.visits(f.transit())));
    }
}

#[test]
fn ordered_mode_respects_the_list_in_all_routes() {
    let mut e = engine(
        4,
        &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (0, 2, 5), (2, 1, 1), (1, 3, 1)],
    );
    let filters = [Filter::Node(n(2)), Filter::Node(n(1))];
    let routes = e
        .all_routes_with_waypoints(n(0), n(3), &filters, FilterOrder::Ordered, RouteLimits::default())
        .unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].nodes(), vec![n(0), n(2), n(1), n(3)]);
    let any = e
        .all_routes_with_waypoints(n(0), n(3), &filters, FilterOrder::Unordered, RouteLimits::default())
        .unwrap();
    assert_eq!(any.len(), 2);
}

#[test]
fn random_graphs_agree_across_configs() {
    let cfg = GraphCfg {
        nodes: NodeCount::Fixed(9),
        density: 0.3,
        cost_min: 1,
        cost_max: 9,
        backbone: true,
    };
    for index in 0..25 {
        let adj = draw_adjacency(cfg, ReplayToken::new(11, index));
        let mut e = RouteEngine::from_adjacency(&adj).unwrap();
        let filters = [Filter::Node(n(3)), Filter::Node(n(6))];
        for order in [FilterOrder::Unordered, FilterOrder::Ordered] {
            let mut costs = Vec::new();
            let mut sets = Vec::new();
            for search in ablations() {
                e.set_cfg(search);
                let best = e
                    .shortest_route_with_waypoints(n(0), n(8), &filters, order)
                    .unwrap()
                    .map(|r| r.cost);
                costs.push(best);
                let mut all: Vec<_> = e
                    .all_routes_with_waypoints(n(0), n(8), &filters, order, RouteLimits::new(30, 6))
                    .unwrap()
                    .into_iter()
                    .map(|r| r.nodes())
                    .collect();
                all.sort();
                sets.push(all);
            }
            assert!(costs.windows(2).all(|w| w[0] == w[1]), "index {index}: {costs:?}");
            assert!(sets.windows(2).all(|w| w[0] == w[1]), "index {index}");
        }
    }
}

#[test]
fn detour_through_skipped_nodes_keeps_the_optimum() {
    // 0 → 1 → 2 → 3 → 4 is beaten by 0 → 2 → 4, which skips 1 and 3.
    let mut e = engine(
        7,
        &[
            (0, 1, 1),
            (1, 2, 1),
            (2, 3, 1),
            (3, 4, 1),
            (0, 2, 1),
            (2, 4, 1),
            (4, 5, 1),
            (5, 6, 1),
            (3, 5, 4),
        ],
    );
    let filters = [Filter::Node(n(5))];
    for cfg in ablations() {
        e.set_cfg(cfg);
        let r = e
            .shortest_route_with_waypoints(n(0), n(6), &filters, FilterOrder::Ordered)
            .unwrap()
            .unwrap();
        assert_eq!(r.cost, 4, "{cfg:?}");
        assert_eq!(r.nodes(), vec![n(0), n(2), n(4), n(5), n(6)], "{cfg:?}");
    }
}

#[test]
fn dense_ordered_queries_agree_with_plain_search() {
    let cfg = GraphCfg {
        nodes: NodeCount::Fixed(11),
        density: 0.55,
        cost_min: 1,
        cost_max: 20,
        backbone: true,
    };
    let filters = [
        Filter::Node(n(7)),
        Filter::Node(n(2)),
        Filter::Node(n(9)),
        Filter::Node(n(4)),
        Filter::Node(n(5)),
    ];
    for index in 0..6 {
        let adj = draw_adjacency(cfg, ReplayToken::new(29, index));
        let mut e = RouteEngine::from_adjacency(&adj).unwrap();
        for order in [FilterOrder::Ordered, FilterOrder::Unordered] {
            let costs: Vec<_> = ablations()
                .into_iter()
                .map(|search| {
                    e.set_cfg(search);
                    e.shortest_route_with_waypoints(n(0), n(10), &filters, order)
                        .unwrap()
                        .map(|r| r.cost)
                })
                .collect();
            assert!(costs.windows(2).all(|w| w[0] == w[1]), "index {index} {order:?}: {costs:?}");
        }
    }
}
