//! Constrained route search over a mutable weighted digraph.
//!
//! Given a start and an end node, find the single cheapest simple route or
//! every simple route within a cost and hop budget, optionally required to
//! visit transit nodes or traverse specific edges, in list order or any order.
//!
//! Layout
//! - `edge`, `store`: the edge model and the adjacency store with its scoped
//!   suppression and bias guards.
//! - `paths`: Dijkstra and BFS primitives reused throughout a search.
//! - `waypoint`: filters and their normalization.
//! - `prune`: per-search suppression, forced edges, jump routes, cost bias.
//! - `search`: the enumerator and its route and configuration types.
//! - `engine`: the public façade.
//!
//! A search borrows its engine mutably for its whole duration; temporary edge
//! state is restored before it returns.

pub mod api;
pub mod edge;
pub mod engine;
pub mod error;
pub mod gen;
pub mod paths;
mod prune;
pub mod search;
pub mod store;
pub mod waypoint;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use edge::{Cost, NodeId, COST_MAX, SCALE};
pub use engine::RouteEngine;
pub use error::{Result, RouteError};
pub use search::{Route, RouteLimits, SearchCfg, Step};
pub use store::{Direction, EdgeStore};
pub use waypoint::{Filter, FilterOrder};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::edge::{Cost, NodeId};
    pub use crate::engine::RouteEngine;
    pub use crate::gen::{draw_graph, GraphCfg, NodeCount, ReplayToken};
    pub use crate::search::{Route, RouteLimits, SearchCfg};
    pub use crate::store::Direction;
    pub use crate::waypoint::{Filter, FilterOrder};
}
