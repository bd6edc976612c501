//! Edge Store: owns the directed edges and the forward/reverse adjacency rows.
//!
//! Purpose
//! - Keep every edge in exactly one forward row (`local`) and one reverse row
//!   (`remote`), both sorted by the edge order (active first, then cheapest,
//!   then lowest opposite endpoint). Search loops walk rows front to back and
//!   stop caring about order once they skip suppressed edges.
//!
//! Why this design
//! - Node ids are dense. `add_node`/`remove_node` rebuild the tables, which is
//!   O(N·E) for removal; graphs handled by the enumerator are small and the
//!   flat rows are what the hot loops want.
//! - Edges live in one slab addressed by `EdgeId`, so per-search side tables
//!   can be plain vectors indexed by edge id.
//!
//! Temporary suppression and cost changes made during a search go through the
//! scoped guards in `guard`; the public `disable_node`/`enable_node` here are
//! the caller-facing, unscoped variant.

mod guard;

pub(crate) use guard::{Bias, Suppress};

use crate::edge::{in_order, out_order, Cost, Edge, EdgeId, NodeId, COST_MAX, SCALE};
use crate::error::{Result, RouteError};

/// Which incident edges of a node an operation touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    In,
    Out,
    #[default]
    Both,
}

impl Direction {
    #[inline]
    fn has_in(self) -> bool {
        matches!(self, Direction::In | Direction::Both)
    }
    #[inline]
    fn has_out(self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }
}

#[derive(Clone, Debug)]
pub struct EdgeStore {
    scale: u64,
    edges: Vec<Edge>,
    out_rows: Vec<Vec<EdgeId>>,
    in_rows: Vec<Vec<EdgeId>>,
}

impl Default for EdgeStore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EdgeStore {
    /// Empty store with `node_count` isolated nodes and the default scale.
    pub fn new(node_count: usize) -> Self {
        Self {
            scale: SCALE,
            edges: Vec::new(),
            out_rows: vec![Vec::new(); node_count],
            in_rows: vec![Vec::new(); node_count],
        }
    }

    /// Custom `calc_cost` multiplier. A route of `node_count` maximal edges must
    /// still fit in `u64`.
    pub fn with_scale(node_count: usize, scale: u64) -> Result<Self> {
        let widest = u64::from(COST_MAX)
            .checked_mul(scale)
            .and_then(|c| c.checked_mul(node_count.max(1) as u64));
        if scale == 0 || widest.is_none() {
            return Err(RouteError::InvalidScale);
        }
        let mut store = Self::new(node_count);
        store.scale = scale;
        Ok(store)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.out_rows.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn scale(&self) -> u64 {
        self.scale
    }

    pub fn check_node(&self, n: NodeId) -> Result<()> {
        if n.0 < self.node_count() {
            Ok(())
        } else {
            Err(RouteError::NodeOutOfRange {
                node: n.0,
                count: self.node_count(),
            })
        }
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    #[inline]
    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }

    /// Forward row of `n` (edges with `local == n`), in edge order.
    #[inline]
    pub fn out_row(&self, n: NodeId) -> &[EdgeId] {
        &self.out_rows[n.0]
    }

    /// Reverse row of `n` (edges with `remote == n`), in edge order.
    #[inline]
    pub fn in_row(&self, n: NodeId) -> &[EdgeId] {
        &self.in_rows[n.0]
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    pub fn out_edges(&self, n: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.out_rows[n.0].iter().map(move |&id| &self.edges[id.0])
    }

    pub fn in_edges(&self, n: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.in_rows[n.0].iter().map(move |&id| &self.edges[id.0])
    }

    /// Linear scan of row `u` for the edge `u → v`.
    pub fn find_edge(&self, u: NodeId, v: NodeId) -> Option<EdgeId> {
        self.out_rows
            .get(u.0)?
            .iter()
            .copied()
            .find(|&id| self.edges[id.0].remote == v)
    }

    pub fn get_edge(&self, u: NodeId, v: NodeId) -> Option<&Edge> {
        self.find_edge(u, v).map(|id| &self.edges[id.0])
    }

    /// Replace the whole graph. Row `i` of `adjacency` lists `(remote, cost)` for node `i`.
    ///
    /// Entries with `COST_MAX` are skipped; a repeated `u → v` keeps the cheaper cost.
    pub fn set_edges(&mut self, adjacency: &[Vec<(NodeId, Cost)>]) -> Result<()> {
        let count = adjacency.len();
        let mut edges: Vec<Edge> = Vec::new();
        let mut seen: Vec<Option<usize>> = vec![None; count];
        for (u, row) in adjacency.iter().enumerate() {
            for &(v, cost) in row {
                if v.0 >= count {
                    return Err(RouteError::NodeOutOfRange { node: v.0, count });
                }
                if cost == COST_MAX {
                    continue;
                }
                match seen[v.0] {
                    Some(slot) if edges[slot].local == NodeId(u) => {
                        if cost < edges[slot].cost() {
                            edges[slot].set_cost(cost, self.scale);
                        }
                    }
                    _ => {
                        seen[v.0] = Some(edges.len());
                        edges.push(Edge::new(NodeId(u), v, cost, self.scale));
                    }
                }
            }
        }
        self.rebuild(count, edges);
        Ok(())
    }

    /// Insert, replace or delete (`None` or `COST_MAX`) the single edge `u → v`.
    pub fn set_edge(&mut self, u: NodeId, v: NodeId, cost: Option<Cost>) -> Result<()> {
        self.check_node(u)?;
        self.check_node(v)?;
        let cost = cost.filter(|&c| c != COST_MAX);
        match (self.find_edge(u, v), cost) {
            (Some(id), Some(c)) => {
                let scale = self.scale;
                self.edges[id.0].set_cost(c, scale);
            }
            (Some(id), None) => {
                self.delete_edge(id);
                return Ok(());
            }
            (None, Some(c)) => {
                let id = EdgeId(self.edges.len());
                self.edges.push(Edge::new(u, v, c, self.scale));
                self.out_rows[u.0].push(id);
                self.in_rows[v.0].push(id);
            }
            (None, None) => return Ok(()),
        }
        self.sort_out_row(u);
        self.sort_in_row(v);
        Ok(())
    }

    /// Append an isolated node and return its id.
    pub fn add_node(&mut self) -> NodeId {
        self.out_rows.push(Vec::new());
        self.in_rows.push(Vec::new());
        NodeId(self.out_rows.len() - 1)
    }

    /// Remove `n` and every edge touching it; ids above `n` shift down by one.
    pub fn remove_node(&mut self, n: NodeId) -> Result<()> {
        self.check_node(n)?;
        let shift = |x: NodeId| if x.0 > n.0 { NodeId(x.0 - 1) } else { x };
        let kept: Vec<Edge> = std::mem::take(&mut self.edges)
            .into_iter()
            .filter(|e| e.local != n && e.remote != n)
            .map(|mut e| {
                e.local = shift(e.local);
                e.remote = shift(e.remote);
                e
            })
            .collect();
        let count = self.node_count() - 1;
        self.rebuild(count, kept);
        Ok(())
    }

    /// Bump the suppression counter of the incident edges selected by `dir`.
    pub fn disable_node(&mut self, n: NodeId, dir: Direction) -> Result<()> {
        self.check_node(n)?;
        self.adjust_node(n, dir, Edge::disable);
        Ok(())
    }

    /// Undo one `disable_node` with the same direction. Edges that are not
    /// disabled are left alone, so the counters never drop below zero.
    pub fn enable_node(&mut self, n: NodeId, dir: Direction) -> Result<()> {
        self.check_node(n)?;
        self.adjust_node(n, dir, |e| {
            if !e.is_active() {
                e.enable();
            }
        });
        Ok(())
    }

    fn adjust_node(&mut self, n: NodeId, dir: Direction, op: fn(&mut Edge)) {
        let mut touched_out = Vec::new();
        let mut touched_in = Vec::new();
        if dir.has_in() {
            for i in 0..self.in_rows[n.0].len() {
                let id = self.in_rows[n.0][i];
                op(&mut self.edges[id.0]);
                touched_out.push(self.edges[id.0].local);
            }
            touched_in.push(n);
        }
        if dir.has_out() {
            for i in 0..self.out_rows[n.0].len() {
                let id = self.out_rows[n.0][i];
                op(&mut self.edges[id.0]);
                touched_in.push(self.edges[id.0].remote);
            }
            touched_out.push(n);
        }
        for u in touched_out {
            self.sort_out_row(u);
        }
        for v in touched_in {
            self.sort_in_row(v);
        }
    }

    fn delete_edge(&mut self, id: EdgeId) {
        let (u, v) = (self.edges[id.0].local, self.edges[id.0].remote);
        self.out_rows[u.0].retain(|&x| x != id);
        self.in_rows[v.0].retain(|&x| x != id);
        let last = EdgeId(self.edges.len() - 1);
        self.edges.swap_remove(id.0);
        if id != last {
            let (mu, mv) = (self.edges[id.0].local, self.edges[id.0].remote);
            for slot in self.out_rows[mu.0].iter_mut().chain(self.in_rows[mv.0].iter_mut()) {
                if *slot == last {
                    *slot = id;
                }
            }
        }
    }

    fn rebuild(&mut self, count: usize, edges: Vec<Edge>) {
        self.edges = edges;
        self.out_rows = vec![Vec::new(); count];
        self.in_rows = vec![Vec::new(); count];
        for (i, e) in self.edges.iter().enumerate() {
            self.out_rows[e.local.0].push(EdgeId(i));
            self.in_rows[e.remote.0].push(EdgeId(i));
        }
        for n in 0..count {
            self.sort_out_row(NodeId(n));
            self.sort_in_row(NodeId(n));
        }
    }

    pub(crate) fn sort_out_row(&mut self, n: NodeId) {
        let edges = &self.edges;
        self.out_rows[n.0].sort_by(|a, b| out_order(&edges[a.0], &edges[b.0]));
    }

    pub(crate) fn sort_in_row(&mut self, n: NodeId) {
        let edges = &self.edges;
        self.in_rows[n.0].sort_by(|a, b| in_order(&edges[a.0], &edges[b.0]));
    }

    /// Put back a row saved by a guard; it holds the same edge ids.
    pub(crate) fn restore_out_row(&mut self, n: NodeId, row: Vec<EdgeId>) {
        debug_assert_eq!(row.len(), self.out_rows[n.0].len());
        self.out_rows[n.0] = row;
    }

    pub(crate) fn restore_in_row(&mut self, n: NodeId, row: Vec<EdgeId>) {
        debug_assert_eq!(row.len(), self.in_rows[n.0].len());
        self.in_rows[n.0] = row;
    }

    /// Active out-degree, self-loops excluded.
    pub(crate) fn active_out_degree(&self, n: NodeId) -> usize {
        self.out_edges(n)
            .filter(|e| e.is_active() && e.remote != n)
            .count()
    }

    pub(crate) fn active_in_degree(&self, n: NodeId) -> usize {
        self.in_edges(n)
            .filter(|e| e.is_active() && e.local != n)
            .count()
    }

    /// Per-edge `(suppression, calc_cost)`; searches compare it on entry and exit.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn snapshot(&self) -> Vec<(i32, u64)> {
        self.edges
            .iter()
            .map(|e| (e.suppression(), e.calc_cost()))
            .collect()
    }
}
