//! Route values, search configuration and budgets.

use crate::edge::{Cost, EdgeId, NodeId};
use crate::store::EdgeStore;

/// One traversed edge with its base cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub from: NodeId,
    pub to: NodeId,
    pub cost: Cost,
}

/// A simple path `start ⇝ end` as consecutive steps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Route {
    pub steps: Vec<Step>,
    /// Sum of base costs.
    pub cost: u64,
}

impl Route {
    pub(crate) fn from_edges<'e>(store: &EdgeStore, ids: impl IntoIterator<Item = &'e EdgeId>) -> Self {
        let steps: Vec<Step> = ids
            .into_iter()
            .map(|&id| {
                let e = store.edge(id);
                Step {
                    from: e.local,
                    to: e.remote,
                    cost: e.cost(),
                }
            })
            .collect();
        let cost = steps.iter().map(|s| u64::from(s.cost)).sum();
        Self { steps, cost }
    }

    /// Visited nodes in order, start and end included. Empty for an empty route.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self.steps.first() {
            None => Vec::new(),
            Some(first) => std::iter::once(first.from)
                .chain(self.steps.iter().map(|s| s.to))
                .collect(),
        }
    }

    /// Hop count.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn visits(&self, n: NodeId) -> bool {
        self.steps.iter().any(|s| s.from == n || s.to == n)
    }

    pub fn traverses(&self, u: NodeId, v: NodeId) -> bool {
        self.steps.iter().any(|s| s.from == u && s.to == v)
    }
}

/// Search configuration.
///
/// Every acceleration preserves results: the optimum of the shortest searches
/// and the route set of the bounded enumeration. The switches exist for
/// ablations and for cross-checking in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchCfg {
    /// Discount edges around transit nodes to steer the search towards them.
    pub cost_bias: bool,
    /// Take chains of forced edges in one step.
    pub jump_routes: bool,
    /// Skip an edge when an ancestor reaches its head at no higher cost while
    /// bypassing only non-mandatory nodes, and stop at states already settled
    /// at no higher cost (shortest searches only).
    pub skip_duplicates: bool,
    /// Reject branches where a filter can only be reached and left through the
    /// same node.
    pub bottleneck_check: bool,
    /// Up to this many open filters the lower bound tries every visiting order.
    pub exact_order_limit: usize,
}

impl Default for SearchCfg {
    fn default() -> Self {
        Self {
            cost_bias: true,
            jump_routes: true,
            skip_duplicates: true,
            bottleneck_check: true,
            exact_order_limit: 3,
        }
    }
}

impl SearchCfg {
    /// Plain backtracking with only the cost and reachability bounds.
    pub fn plain() -> Self {
        Self {
            cost_bias: false,
            jump_routes: false,
            skip_duplicates: false,
            bottleneck_check: false,
            exact_order_limit: 0,
        }
    }
}

/// Budgets of the bounded enumeration, in base cost and hops. Inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteLimits {
    pub cost_max: u64,
    pub hop_max: usize,
}

impl Default for RouteLimits {
    fn default() -> Self {
        Self {
            cost_max: u64::MAX,
            hop_max: usize::MAX,
        }
    }
}

impl RouteLimits {
    pub fn new(cost_max: u64, hop_max: usize) -> Self {
        Self { cost_max, hop_max }
    }

    pub(crate) fn admits(&self, route: &Route) -> bool {
        route.cost <= self.cost_max && route.len() <= self.hop_max
    }
}
