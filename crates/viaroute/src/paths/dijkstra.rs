//! Single-source Dijkstra on `calc_cost`, pivoting by array scan.
//!
//! Node counts handled by the enumerator are small, and a linear scan for the
//! next pivot beats a heap there. Ties keep the first strictly-better
//! relaxation, so results follow the row order of the store.

use super::Sweep;
use crate::edge::{EdgeId, NodeId, DIST_INF};
use crate::store::EdgeStore;

#[derive(Clone, Debug)]
pub struct ShortestPaths {
    dist: Vec<u64>,
    pred: Vec<Option<EdgeId>>,
    settled: Vec<bool>,
    root: Option<NodeId>,
    sweep: Sweep,
}

impl Default for ShortestPaths {
    fn default() -> Self {
        Self {
            dist: Vec::new(),
            pred: Vec::new(),
            settled: Vec::new(),
            root: None,
            sweep: Sweep::Forward,
        }
    }
}

impl ShortestPaths {
    /// Distances from `start` to every node.
    pub fn from(store: &EdgeStore, start: NodeId) -> Self {
        let mut sp = Self::default();
        sp.run(store, start, Sweep::Forward, None);
        sp
    }

    /// Distances from every node to `end`.
    pub fn to(store: &EdgeStore, end: NodeId) -> Self {
        let mut sp = Self::default();
        sp.run(store, end, Sweep::Backward, None);
        sp
    }

    /// Recompute in place. With `target`, stops as soon as it is settled.
    pub fn run(&mut self, store: &EdgeStore, root: NodeId, sweep: Sweep, target: Option<NodeId>) {
        let n = store.node_count();
        self.dist.clear();
        self.dist.resize(n, DIST_INF);
        self.pred.clear();
        self.pred.resize(n, None);
        self.settled.clear();
        self.settled.resize(n, false);
        self.root = Some(root);
        self.sweep = sweep;
        self.dist[root.0] = 0;
        loop {
            let mut pivot = None;
            let mut best = DIST_INF;
            for (i, &d) in self.dist.iter().enumerate() {
                if d < best && !self.settled[i] {
                    best = d;
                    pivot = Some(i);
                }
            }
            let Some(u) = pivot else { break };
            self.settled[u] = true;
            if target == Some(NodeId(u)) {
                break;
            }
            let row = match sweep {
                Sweep::Forward => store.out_row(NodeId(u)),
                Sweep::Backward => store.in_row(NodeId(u)),
            };
            for &id in row {
                let e = store.edge(id);
                if !e.is_active() {
                    continue;
                }
                let w = match sweep {
                    Sweep::Forward => e.remote.0,
                    Sweep::Backward => e.local.0,
                };
                if self.settled[w] {
                    continue;
                }
                let nd = best.saturating_add(e.calc_cost());
                if nd < self.dist[w] {
                    self.dist[w] = nd;
                    self.pred[w] = Some(id);
                }
            }
        }
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Distance in `calc_cost` units; `DIST_INF` when unreachable.
    #[inline]
    pub fn dist(&self, n: NodeId) -> u64 {
        self.dist[n.0]
    }

    #[inline]
    pub fn reaches(&self, n: NodeId) -> bool {
        self.dist[n.0] != DIST_INF
    }

    /// Edge through which `n` was reached (forward) or leaves towards the root (backward).
    #[inline]
    pub fn pred(&self, n: NodeId) -> Option<EdgeId> {
        self.pred[n.0]
    }

    /// Edges of the best path between the root and `n`, in travel order.
    pub fn path(&self, store: &EdgeStore, n: NodeId) -> Option<Vec<EdgeId>> {
        if !self.reaches(n) {
            return None;
        }
        let mut edges = Vec::new();
        let mut cur = n;
        while let Some(id) = self.pred[cur.0] {
            edges.push(id);
            let e = store.edge(id);
            cur = match self.sweep {
                Sweep::Forward => e.local,
                Sweep::Backward => e.remote,
            };
        }
        if self.sweep == Sweep::Forward {
            edges.reverse();
        }
        Some(edges)
    }
}
