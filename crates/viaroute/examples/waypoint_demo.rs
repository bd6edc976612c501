//! Waypoint search on one replayable random graph.
//!
//! Draws a 30-node graph, then prints the plain shortest route, the cheapest
//! route through three transit nodes in any order and in list order, and the
//! number of bounded routes through the first transit node, with timings.
//!
//! Run:
//! `cargo run -p viaroute --example waypoint_demo`

use std::time::Instant;

use viaroute::prelude::*;

fn main() {
    let cfg = GraphCfg {
        nodes: NodeCount::Fixed(30),
        density: 0.15,
        ..GraphCfg::default()
    };
    let store = draw_graph(cfg, ReplayToken::new(2024, 0)).expect("graph draw succeeds");
    let mut engine = RouteEngine::from_store(store);
    let (s, e) = (NodeId(0), NodeId(29));
    let filters = [Filter::Node(NodeId(21)), Filter::Node(NodeId(4)), Filter::Node(NodeId(13))];

    let plain = engine.shortest_route(s, e).expect("valid nodes");
    println!("plain: {}", describe(plain.as_ref()));

    for order in [FilterOrder::Unordered, FilterOrder::Ordered] {
        let t0 = Instant::now();
        let route = engine
            .shortest_route_with_waypoints(s, e, &filters, order)
            .expect("valid nodes");
        let ms = t0.elapsed().as_secs_f64() * 1e3;
        println!("{order:?}: {} time_ms={ms:.3}", describe(route.as_ref()));
    }

    let limits = RouteLimits::new(80, 10);
    let t0 = Instant::now();
    let routes = engine
        .all_routes_with_waypoints(s, e, &filters[..1], FilterOrder::Unordered, limits)
        .expect("valid nodes");
    let ms = t0.elapsed().as_secs_f64() * 1e3;
    println!(
        "all via {}: count={} cheapest={:?} time_ms={ms:.3}",
        filters[0].transit().0,
        routes.len(),
        routes.first().map(|r| r.cost)
    );
}

fn describe(route: Option<&Route>) -> String {
    match route {
        None => "none".to_string(),
        Some(r) => {
            let nodes: Vec<String> = r.nodes().iter().map(|n| n.0.to_string()).collect();
            format!("cost={} hops={} path={}", r.cost, r.len(), nodes.join("->"))
        }
    }
}
