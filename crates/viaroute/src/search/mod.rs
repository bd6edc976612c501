//! Path Enumerator: backtracking search over simple routes through filters.
//!
//! Purpose
//! - Find the cheapest route through the open filters, or every route within
//!   a cost and hop budget, after the normalizer and the prune pass have cut
//!   the problem down.
//!
//! Pruning, in the order a call applies it
//! - Hop ceiling and the no-filters fast path (plain Dijkstra to the end).
//! - Reachability of every open transit node and the end, then a per-filter
//!   detour bound from fresh Dijkstra tables.
//! - Stitching independent shortest legs when they already form a valid route.
//! - Bottleneck nodes that both reaching and leaving a filter must cross.
//! - Jump routes over forced chains.
//! - Per-edge lower bounds from the precomputed tables in `bound`, and
//!   duplicate detours an ancestor can shortcut, directly or through path
//!   nodes the detour skipped.
//! - A cache of settled states (node, visited set, satisfied filters) with
//!   the cheapest arrival, so a later arrival at no lower cost stops.

mod bound;
mod dfs;
mod memo;
mod types;

pub(crate) use dfs::enumerate;
pub use types::{Route, RouteLimits, SearchCfg, Step};

/// What the enumerator is after. Budgets are in biased `calc_cost` units and
/// hops of the searched part only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Goal {
    Shortest,
    All { budget: u64, hops: usize },
}

#[cfg(test)]
mod tests;
