//! Scoped suppression and cost-bias guards.
//!
//! A guard borrows the store mutably, records every change it makes and undoes
//! them in reverse order when dropped, so early returns and unwinding cannot
//! leave a counter unbalanced. Guards deref to `EdgeStore`; nesting a guard
//! inside another borrows through the outer one, which fixes the undo order.

use std::ops::{Deref, DerefMut};

use super::{Direction, EdgeStore};
use crate::edge::{EdgeId, NodeId};

pub(crate) struct Suppress<'s> {
    store: &'s mut EdgeStore,
    disabled: Vec<EdgeId>,
}

impl<'s> Suppress<'s> {
    pub(crate) fn new(store: &'s mut EdgeStore) -> Self {
        Self {
            store,
            disabled: Vec::new(),
        }
    }

    pub(crate) fn suppress_edge(&mut self, id: EdgeId) {
        self.store.edge_mut(id).disable();
        self.disabled.push(id);
    }

    /// Suppress the currently active in-edges of `n`.
    pub(crate) fn suppress_in_edges(&mut self, n: NodeId) {
        for i in 0..self.store.in_row(n).len() {
            let id = self.store.in_row(n)[i];
            if self.store.edge(id).is_active() {
                self.suppress_edge(id);
            }
        }
    }

    /// Suppress the currently active out-edges of `n`.
    pub(crate) fn suppress_out_edges(&mut self, n: NodeId) {
        for i in 0..self.store.out_row(n).len() {
            let id = self.store.out_row(n)[i];
            if self.store.edge(id).is_active() {
                self.suppress_edge(id);
            }
        }
    }

    pub(crate) fn suppress_node(&mut self, n: NodeId, dir: Direction) {
        if dir.has_in() {
            self.suppress_in_edges(n);
        }
        if dir.has_out() {
            self.suppress_out_edges(n);
        }
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.disabled.len()
    }
}

impl Deref for Suppress<'_> {
    type Target = EdgeStore;
    fn deref(&self) -> &EdgeStore {
        self.store
    }
}

impl DerefMut for Suppress<'_> {
    fn deref_mut(&mut self) -> &mut EdgeStore {
        self.store
    }
}

impl Drop for Suppress<'_> {
    fn drop(&mut self) {
        for &id in self.disabled.iter().rev() {
            self.store.edge_mut(id).enable();
        }
    }
}

/// Temporary `calc_cost` discounts. Rows touched are re-sorted on `settle` and
/// put back exactly as they were on drop, whatever else is suppressed meanwhile.
pub(crate) struct Bias<'s> {
    store: &'s mut EdgeStore,
    saved: Vec<(EdgeId, u64)>,
    out_rows: Vec<(NodeId, Vec<EdgeId>)>,
    in_rows: Vec<(NodeId, Vec<EdgeId>)>,
}

impl<'s> Bias<'s> {
    pub(crate) fn new(store: &'s mut EdgeStore) -> Self {
        Self {
            store,
            saved: Vec::new(),
            out_rows: Vec::new(),
            in_rows: Vec::new(),
        }
    }

    /// Lower the working cost of `id` by `by` (clamped at zero).
    pub(crate) fn lower(&mut self, id: EdgeId, by: u64) {
        if by == 0 {
            return;
        }
        let edge = self.store.edge_mut(id);
        let old = edge.calc_cost();
        edge.set_calc_cost(old.saturating_sub(by));
        self.saved.push((id, old));
    }

    /// Re-sort the rows of every edge changed so far.
    pub(crate) fn settle(&mut self) {
        let mut outs: Vec<NodeId> = self.saved.iter().map(|&(id, _)| self.store.edge(id).local).collect();
        let mut ins: Vec<NodeId> = self.saved.iter().map(|&(id, _)| self.store.edge(id).remote).collect();
        outs.sort_unstable();
        outs.dedup();
        ins.sort_unstable();
        ins.dedup();
        for n in outs {
            if !self.out_rows.iter().any(|(m, _)| *m == n) {
                self.out_rows.push((n, self.store.out_row(n).to_vec()));
            }
            self.store.sort_out_row(n);
        }
        for n in ins {
            if !self.in_rows.iter().any(|(m, _)| *m == n) {
                self.in_rows.push((n, self.store.in_row(n).to_vec()));
            }
            self.store.sort_in_row(n);
        }
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.saved.len()
    }
}

impl Deref for Bias<'_> {
    type Target = EdgeStore;
    fn deref(&self) -> &EdgeStore {
        self.store
    }
}

impl DerefMut for Bias<'_> {
    fn deref_mut(&mut self) -> &mut EdgeStore {
        self.store
    }
}

impl Drop for Bias<'_> {
    fn drop(&mut self) {
        for &(id, old) in self.saved.iter().rev() {
            self.store.edge_mut(id).set_calc_cost(old);
        }
        for (n, row) in self.out_rows.drain(..) {
            self.store.restore_out_row(n, row);
        }
        for (n, row) in self.in_rows.drain(..) {
            self.store.restore_in_row(n, row);
        }
    }
}
