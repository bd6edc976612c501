//! Directed edge with a scaled working cost and a reentrant suppression counter.
//!
//! All path arithmetic uses `calc_cost = cost * scale`. The scale keeps the
//! temporary fractional discounts applied by the cost-bias pass in integers.

use std::cmp::Ordering;

/// Raw edge cost as supplied by callers.
pub type Cost = u32;

/// "No connection". Edges with this cost are never stored.
pub const COST_MAX: Cost = Cost::MAX;

/// Default multiplier from `cost` to `calc_cost`.
pub const SCALE: u64 = 1000;

/// Unreachable marker for distance tables.
pub const DIST_INF: u64 = u64::MAX;

/// Dense node index in `[0, node_count)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Slot of an edge inside an `EdgeStore`. Stable until the next structural mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub local: NodeId,
    pub remote: NodeId,
    cost: Cost,
    calc_cost: u64,
    suppression: i32,
}

impl Edge {
    pub(crate) fn new(local: NodeId, remote: NodeId, cost: Cost, scale: u64) -> Self {
        Self {
            local,
            remote,
            cost,
            calc_cost: u64::from(cost) * scale,
            suppression: 0,
        }
    }

    #[inline]
    pub fn cost(&self) -> Cost {
        self.cost
    }

    #[inline]
    pub fn calc_cost(&self) -> u64 {
        self.calc_cost
    }

    /// Current value of the suppression counter; the edge is usable iff it is `<= 0`.
    #[inline]
    pub fn suppression(&self) -> i32 {
        self.suppression
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.suppression <= 0
    }

    #[inline]
    pub(crate) fn disable(&mut self) {
        self.suppression += 1;
    }

    #[inline]
    pub(crate) fn enable(&mut self) {
        debug_assert!(self.suppression > 0, "enable without a matching disable");
        self.suppression -= 1;
    }

    /// Replace the raw cost; the working cost follows. Suppression is kept.
    pub(crate) fn set_cost(&mut self, cost: Cost, scale: u64) {
        self.cost = cost;
        self.calc_cost = u64::from(cost) * scale;
    }

    #[inline]
    pub(crate) fn set_calc_cost(&mut self, calc_cost: u64) {
        self.calc_cost = calc_cost;
    }
}

/// Row order for a forward adjacency row: active first, then `calc_cost`, then `remote`.
pub(crate) fn out_order(a: &Edge, b: &Edge) -> Ordering {
    b.is_active()
        .cmp(&a.is_active())
        .then(a.calc_cost.cmp(&b.calc_cost))
        .then(a.remote.cmp(&b.remote))
}

/// Row order for a reverse adjacency row; ties break on `local`.
pub(crate) fn in_order(a: &Edge, b: &Edge) -> Ordering {
    b.is_active()
        .cmp(&a.is_active())
        .then(a.calc_cost.cmp(&b.calc_cost))
        .then(a.local.cmp(&b.local))
}
