//! Cost-free reachability: bidirectional BFS and one-sided sweeps.

use std::collections::VecDeque;

use super::Sweep;
use crate::edge::NodeId;
use crate::store::EdgeStore;

/// Reusable BFS state. Marks are epoch-stamped so a query never clears arrays.
#[derive(Clone, Debug, Default)]
pub struct Reach {
    fwd: Vec<u32>,
    bwd: Vec<u32>,
    epoch: u32,
    fq: VecDeque<NodeId>,
    bq: VecDeque<NodeId>,
}

impl Reach {
    pub fn new(node_count: usize) -> Self {
        Self {
            fwd: vec![0; node_count],
            bwd: vec![0; node_count],
            ..Self::default()
        }
    }

    fn next_epoch(&mut self, n: usize) {
        if self.fwd.len() != n {
            self.fwd = vec![0; n];
            self.bwd = vec![0; n];
            self.epoch = 0;
        }
        if self.epoch == u32::MAX {
            self.fwd.iter_mut().for_each(|m| *m = 0);
            self.bwd.iter_mut().for_each(|m| *m = 0);
            self.epoch = 0;
        }
        self.epoch += 1;
        self.fq.clear();
        self.bq.clear();
    }

    /// Is there an active path `start ⇝ end`?
    ///
    /// `seed_fwd` may list nodes already known reachable from `start`, and
    /// `seed_bwd` nodes already known to reach `end`; both frontiers start from
    /// them. Expansion alternates one node per side and stops as soon as the
    /// frontiers touch.
    pub fn reachable(
        &mut self,
        store: &EdgeStore,
        start: NodeId,
        end: NodeId,
        seed_fwd: &[NodeId],
        seed_bwd: &[NodeId],
    ) -> bool {
        if start == end {
            return true;
        }
        self.next_epoch(store.node_count());
        let ep = self.epoch;
        for &n in std::iter::once(&start).chain(seed_fwd) {
            if self.fwd[n.0] != ep {
                self.fwd[n.0] = ep;
                self.fq.push_back(n);
            }
        }
        for &n in std::iter::once(&end).chain(seed_bwd) {
            if self.fwd[n.0] == ep {
                return true;
            }
            if self.bwd[n.0] != ep {
                self.bwd[n.0] = ep;
                self.bq.push_back(n);
            }
        }
        while !self.fq.is_empty() && !self.bq.is_empty() {
            if let Some(u) = self.fq.pop_front() {
                for e in store.out_edges(u) {
                    if !e.is_active() {
                        continue;
                    }
                    let w = e.remote.0;
                    if self.bwd[w] == ep {
                        return true;
                    }
                    if self.fwd[w] != ep {
                        self.fwd[w] = ep;
                        self.fq.push_back(e.remote);
                    }
                }
            }
            if let Some(u) = self.bq.pop_front() {
                for e in store.in_edges(u) {
                    if !e.is_active() {
                        continue;
                    }
                    let w = e.local.0;
                    if self.fwd[w] == ep {
                        return true;
                    }
                    if self.bwd[w] != ep {
                        self.bwd[w] = ep;
                        self.bq.push_back(e.local);
                    }
                }
            }
        }
        false
    }

    /// Mark every node reachable from (`Forward`) or reaching (`Backward`) `root`.
    /// Query the result with `marked`.
    pub fn sweep(&mut self, store: &EdgeStore, root: NodeId, sweep: Sweep) {
        self.next_epoch(store.node_count());
        let ep = self.epoch;
        self.fwd[root.0] = ep;
        self.fq.push_back(root);
        while let Some(u) = self.fq.pop_front() {
            match sweep {
                Sweep::Forward => {
                    for e in store.out_edges(u) {
                        if e.is_active() && self.fwd[e.remote.0] != ep {
                            self.fwd[e.remote.0] = ep;
                            self.fq.push_back(e.remote);
                        }
                    }
                }
                Sweep::Backward => {
                    for e in store.in_edges(u) {
                        if e.is_active() && self.fwd[e.local.0] != ep {
                            self.fwd[e.local.0] = ep;
                            self.fq.push_back(e.local);
                        }
                    }
                }
            }
        }
    }

    /// Result of the last `sweep`.
    #[inline]
    pub fn marked(&self, n: NodeId) -> bool {
        self.fwd[n.0] == self.epoch
    }
}

/// Hop distances to `root` along active reverse rows; `usize::MAX` when unreachable.
pub(crate) fn hops_to(store: &EdgeStore, root: NodeId) -> Vec<usize> {
    let mut hops = vec![usize::MAX; store.node_count()];
    let mut queue = VecDeque::new();
    hops[root.0] = 0;
    queue.push_back(root);
    while let Some(u) = queue.pop_front() {
        for e in store.in_edges(u) {
            if e.is_active() && hops[e.local.0] == usize::MAX {
                hops[e.local.0] = hops[u.0] + 1;
                queue.push_back(e.local);
            }
        }
    }
    hops
}
