//! Lower bounds on the cost and hop count still needed from a node.
//!
//! Tables are computed once, after suppression and bias, before the first
//! step. Later steps only add suppressions, so distances can only grow and the
//! tables stay valid lower bounds for the whole search.

use crate::edge::{NodeId, DIST_INF};
use crate::paths::{hops_to, ShortestPaths};
use crate::store::EdgeStore;
use crate::waypoint::Normalized;

/// Beyond this many open filters, visiting orders are never enumerated.
const EXACT_ORDER_CAP: usize = 6;

#[derive(Clone, Debug)]
pub(crate) struct Tables {
    transit: Vec<NodeId>,
    /// Per filter: distances into its transit node.
    to: Vec<ShortestPaths>,
    /// Per filter: distances out of its transit node.
    from: Vec<ShortestPaths>,
    hops_to: Vec<Vec<usize>>,
    to_end: ShortestPaths,
    hops_to_end: Vec<usize>,
    ordered: bool,
    exact_limit: usize,
}

impl Tables {
    pub(crate) fn build(store: &EdgeStore, norm: &Normalized, exact_limit: usize) -> Self {
        let transit: Vec<NodeId> = norm.filters.iter().map(|t| t.node).collect();
        Self {
            to: transit.iter().map(|&t| ShortestPaths::to(store, t)).collect(),
            from: transit.iter().map(|&t| ShortestPaths::from(store, t)).collect(),
            hops_to: transit.iter().map(|&t| hops_to(store, t)).collect(),
            to_end: ShortestPaths::to(store, norm.end),
            hops_to_end: hops_to(store, norm.end),
            transit,
            ordered: norm.order == crate::waypoint::FilterOrder::Ordered,
            exact_limit: exact_limit.min(EXACT_ORDER_CAP),
        }
    }

    /// Cost from `v` through every filter in `open` (listed in filter order) to
    /// the end. `DIST_INF` when no such walk exists.
    pub(crate) fn cost_lb(&self, v: NodeId, open: &[usize]) -> u64 {
        let Some((&first, _)) = open.split_first() else {
            return self.to_end.dist(v);
        };
        if self.ordered {
            let mut total = self.to[first].dist(v);
            for w in open.windows(2) {
                total = total.saturating_add(self.from[w[0]].dist(self.transit[w[1]]));
            }
            let last = open[open.len() - 1];
            return total.saturating_add(self.to_end.dist(self.transit[last]));
        }
        if open.len() <= self.exact_limit {
            return self.best_order(v, None, open, 0);
        }
        open.iter().fold(self.to_end.dist(v), |acc, &f| {
            let through = self.to[f].dist(v).saturating_add(self.to_end.dist(self.transit[f]));
            acc.max(through)
        })
    }

    fn best_order(&self, v: NodeId, prev: Option<usize>, open: &[usize], used: u32) -> u64 {
        if used.count_ones() as usize == open.len() {
            return match prev {
                Some(p) => self.to_end.dist(self.transit[p]),
                None => self.to_end.dist(v),
            };
        }
        let mut best = DIST_INF;
        for (i, &f) in open.iter().enumerate() {
            if used & (1 << i) != 0 {
                continue;
            }
            let leg = match prev {
                Some(p) => self.from[p].dist(self.transit[f]),
                None => self.to[f].dist(v),
            };
            if leg == DIST_INF {
                continue;
            }
            let rest = self.best_order(v, Some(f), open, used | (1 << i));
            best = best.min(leg.saturating_add(rest));
        }
        best
    }

    /// Hops from `v` through every filter in `open` to the end.
    pub(crate) fn hop_lb(&self, v: NodeId, open: &[usize]) -> usize {
        open.iter().fold(self.hops_to_end[v.0], |acc, &f| {
            let through = self.hops_to[f][v.0].saturating_add(self.hops_to_end[self.transit[f].0]);
            acc.max(through)
        })
    }
}
