//! Curated surface for callers outside the crate (CLI, benches, demos).
//!
//! Grouped by concern; prefer these over reaching into modules.

// Graph model
pub use crate::edge::{Cost, Edge, EdgeId, NodeId, COST_MAX, DIST_INF, SCALE};
pub use crate::store::{Direction, EdgeStore};
// Queries
pub use crate::engine::RouteEngine;
pub use crate::search::{Route, RouteLimits, SearchCfg, Step};
pub use crate::waypoint::{Filter, FilterOrder};
// Primitives
pub use crate::paths::{Reach, ShortestPaths, Sweep};
// Random graphs
pub use crate::gen::{draw_adjacency, draw_graph, GraphCfg, NodeCount, ReplayToken as GraphReplay};
// Errors
pub use crate::error::{Result, RouteError};
