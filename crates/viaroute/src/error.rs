//! Structural faults raised by the public API.
//!
//! Unreachability and contradictory waypoint lists are not errors: they come
//! back as an empty result. Only inputs that would corrupt the adjacency rows
//! are rejected here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("node {node} is out of range for a graph with {count} nodes")]
    NodeOutOfRange { node: usize, count: usize },
    #[error("cost scale factor must be positive and keep route costs within u64")]
    InvalidScale,
}

pub type Result<T> = std::result::Result<T, RouteError>;
