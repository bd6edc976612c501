//! Shortest-path and reachability primitives over the current (suppressed) store.
//!
//! Both are re-run many times per search, so they own their buffers and
//! reinitialize in O(N) instead of allocating.

mod dijkstra;
mod reach;

pub use dijkstra::ShortestPaths;
pub use reach::Reach;
pub(crate) use reach::hops_to;

/// Which way a sweep follows edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sweep {
    /// From a root along `local → remote`.
    Forward,
    /// Towards a root, walking reverse rows.
    Backward,
}
