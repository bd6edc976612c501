//! Depth-first enumeration of simple routes through the open filters.
//!
//! The runner walks from the effective start, suppressing the in-edges of
//! every node it enters so routes stay simple. Each call level owns its own
//! `Suppress` guard for the edges it prunes; the guard and the filter marks
//! are undone before the call returns.

use super::bound::Tables;
use super::memo::{Judgments, StateBits};
use super::{Goal, SearchCfg};
use crate::edge::{EdgeId, NodeId, DIST_INF};
use crate::paths::{Reach, ShortestPaths, Sweep};
use crate::prune::{JumpRoute, Plan};
use crate::store::{Direction, EdgeStore, Suppress};
use crate::waypoint::{FilterOrder, Normalized};

/// Counters reported at the end of a search.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Stats {
    pub calls: u64,
    pub bound_prunes: u64,
    pub duplicate_skips: u64,
    pub reconverged: u64,
    pub memo_hits: u64,
    pub jumps: u64,
    pub stitched: u64,
    pub bottlenecks: u64,
    pub found: u64,
}

/// How stepping into a node relates to the filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Entry {
    Blocked,
    Plain,
    Satisfies(usize),
}

/// Run the enumerator from `norm.start`. Paths cover the searched part only,
/// without the fixed prefix and suffix.
#[tracing::instrument(level = "debug", skip_all, fields(
    start = norm.start.0,
    end = norm.end.0,
    filters = norm.filters.len(),
))]
pub(crate) fn enumerate(
    store: &mut EdgeStore,
    norm: &Normalized,
    plan: &Plan,
    cfg: SearchCfg,
    goal: Goal,
) -> Vec<Vec<EdgeId>> {
    let tables = Tables::build(store, norm, cfg.exact_order_limit);
    let mut runner = Runner::new(store, norm, plan, cfg, goal, tables);
    runner.state.toggle_node(norm.start);
    runner.visit(store, norm.start);
    let s = runner.stats;
    tracing::debug!(
        calls = s.calls,
        bound_prunes = s.bound_prunes,
        duplicate_skips = s.duplicate_skips,
        reconverged = s.reconverged,
        memo_hits = s.memo_hits,
        memo_states = runner.memo.len(),
        jumps = s.jumps,
        stitched = s.stitched,
        bottlenecks = s.bottlenecks,
        found = s.found,
        "enumeration finished"
    );
    match goal {
        Goal::Shortest if runner.best != DIST_INF => vec![runner.best_path],
        Goal::Shortest => Vec::new(),
        Goal::All { .. } => runner.found,
    }
}

/// Most states the judgment cache remembers in one search.
const MEMO_CAP: usize = 1 << 18;

/// Longest run of skipped path nodes an N-hop reconvergence may reuse.
const RECONVERGE_WINDOW: usize = 6;

struct Runner<'a> {
    norm: &'a Normalized,
    plan: &'a Plan,
    cfg: SearchCfg,
    goal: Goal,
    tables: Tables,
    ordered: bool,
    satisfied: Vec<bool>,
    remaining: usize,
    acc: u64,
    path: Vec<EdgeId>,
    /// Edges usable when the enumeration started; the duplicate checks look
    /// at alternatives the path itself has suppressed.
    base_active: Vec<bool>,
    state: StateBits,
    memo: Judgments,
    /// Scratch for `reconverges`: skipped path nodes and their distances.
    window: Vec<NodeId>,
    window_dist: Vec<u64>,
    best: u64,
    best_path: Vec<EdgeId>,
    found: Vec<Vec<EdgeId>>,
    fwd: ShortestPaths,
    bwd: ShortestPaths,
    leg: ShortestPaths,
    reach: Reach,
    mark: Vec<bool>,
    open: Vec<usize>,
    stats: Stats,
}

impl<'a> Runner<'a> {
    fn new(
        store: &EdgeStore,
        norm: &'a Normalized,
        plan: &'a Plan,
        cfg: SearchCfg,
        goal: Goal,
        tables: Tables,
    ) -> Self {
        let n = store.node_count();
        Self {
            norm,
            plan,
            cfg,
            goal,
            tables,
            ordered: norm.order == FilterOrder::Ordered,
            satisfied: vec![false; norm.filters.len()],
            remaining: norm.filters.len(),
            acc: 0,
            path: Vec::new(),
            base_active: store.edges().map(|e| e.is_active()).collect(),
            state: StateBits::new(n, norm.filters.len()),
            memo: Judgments::new(MEMO_CAP),
            window: Vec::with_capacity(RECONVERGE_WINDOW),
            window_dist: Vec::with_capacity(RECONVERGE_WINDOW + 1),
            best: DIST_INF,
            best_path: Vec::new(),
            found: Vec::new(),
            fwd: ShortestPaths::default(),
            bwd: ShortestPaths::default(),
            leg: ShortestPaths::default(),
            reach: Reach::new(n),
            mark: vec![false; n],
            open: Vec::with_capacity(norm.filters.len()),
            stats: Stats::default(),
        }
    }

    fn shortest(&self) -> bool {
        matches!(self.goal, Goal::Shortest)
    }

    fn hop_budget(&self) -> usize {
        match self.goal {
            Goal::Shortest => usize::MAX,
            Goal::All { hops, .. } => hops,
        }
    }

    /// Would a route of (biased) cost at least `total` be useless?
    fn over(&self, total: u64) -> bool {
        match self.goal {
            Goal::Shortest => total >= self.best,
            Goal::All { budget, .. } => total == DIST_INF || total > budget,
        }
    }

    /// Open filters in list order, minus `skip`, into `self.open`.
    fn collect_open(&mut self, skip: Option<usize>) {
        self.open.clear();
        for (i, &done) in self.satisfied.iter().enumerate() {
            if !done && Some(i) != skip {
                self.open.push(i);
            }
        }
    }

    fn satisfy(&mut self, f: usize) {
        debug_assert!(!self.satisfied[f]);
        self.satisfied[f] = true;
        self.remaining -= 1;
        self.state.toggle_filter(f);
    }

    fn unsatisfy(&mut self, f: usize) {
        debug_assert!(self.satisfied[f]);
        self.satisfied[f] = false;
        self.remaining += 1;
        self.state.toggle_filter(f);
    }

    fn entry(&self, via: EdgeId, v: NodeId) -> Entry {
        match self.plan.transit_of[v.0] {
            Some(f) if !self.satisfied[f] => {
                if self.ordered && f != self.satisfied.len() - self.remaining {
                    return Entry::Blocked;
                }
                if self.norm.filters[f].edge.is_some_and(|req| req != via) {
                    return Entry::Blocked;
                }
                Entry::Satisfies(f)
            }
            Some(_) => Entry::Blocked,
            None if v == self.norm.end && self.remaining > 0 => Entry::Blocked,
            None => Entry::Plain,
        }
    }

    fn record(&mut self) {
        match self.goal {
            Goal::Shortest => {
                if self.acc < self.best {
                    self.best = self.acc;
                    self.best_path.clone_from(&self.path);
                    self.stats.found += 1;
                }
            }
            Goal::All { .. } => {
                if !self.over(self.acc) {
                    self.found.push(self.path.clone());
                    self.stats.found += 1;
                }
            }
        }
    }

    fn visit(&mut self, store: &mut EdgeStore, cur: NodeId) {
        self.stats.calls += 1;
        let end = self.norm.end;
        if cur == end {
            if self.remaining == 0 {
                self.record();
            }
            return;
        }
        if self.path.len() >= self.hop_budget() {
            return;
        }
        if self.shortest() && self.cfg.skip_duplicates && self.memo.covered(cur, &self.state, self.acc) {
            self.stats.memo_hits += 1;
            return;
        }
        if self.remaining == 0 {
            if self.shortest() {
                self.finish_direct(store, cur);
                return;
            }
            if !self.reach.reachable(store, cur, end, &[], &[]) {
                return;
            }
        } else {
            if !self.filters_reachable(store, cur) {
                return;
            }
            if self.shortest() && self.try_stitch(store, cur) {
                return;
            }
            if self.cfg.bottleneck_check && self.bottlenecked(store, cur) {
                self.stats.bottlenecks += 1;
                return;
            }
        }
        let plan = self.plan;
        if let Some(route) = plan.jump_at(cur) {
            self.take_jump(store, route);
            return;
        }
        self.expand(store, cur);
    }

    /// No filters left: the shortest completion is a plain shortest path.
    fn finish_direct(&mut self, store: &EdgeStore, cur: NodeId) {
        let end = self.norm.end;
        self.leg.run(store, cur, Sweep::Forward, Some(end));
        let total = self.acc.saturating_add(self.leg.dist(end));
        if self.over(total) {
            return;
        }
        if let Some(rest) = self.leg.path(store, end) {
            self.best = total;
            self.best_path.clone_from(&self.path);
            self.best_path.extend(rest);
            self.stats.found += 1;
        }
    }

    /// Every open transit node and the end must be reachable from `cur`, and
    /// the cheapest detour through each transit must fit the bound.
    /// Leaves `fwd` rooted at `cur` and `bwd` at the end.
    fn filters_reachable(&mut self, store: &EdgeStore, cur: NodeId) -> bool {
        let end = self.norm.end;
        self.reach.sweep(store, cur, Sweep::Forward);
        if !self.reach.marked(end) {
            return false;
        }
        let transits: Vec<NodeId> = self
            .norm
            .filters
            .iter()
            .zip(&self.satisfied)
            .filter(|(_, done)| !**done)
            .map(|(t, _)| t.node)
            .collect();
        if transits.iter().any(|&t| !self.reach.marked(t)) {
            return false;
        }
        self.reach.sweep(store, end, Sweep::Backward);
        if transits.iter().any(|&t| !self.reach.marked(t)) {
            return false;
        }
        self.fwd.run(store, cur, Sweep::Forward, None);
        self.bwd.run(store, end, Sweep::Backward, None);
        for &t in &transits {
            let through = self
                .acc
                .saturating_add(self.fwd.dist(t))
                .saturating_add(self.bwd.dist(t));
            if self.over(through) {
                return false;
            }
        }
        if !self.shortest() {
            self.collect_open(None);
            let hops = self.tables.hop_lb(cur, &self.open);
            if self.path.len().saturating_add(hops) > self.hop_budget() {
                return false;
            }
        }
        true
    }

    /// Chain independent shortest legs through the open filters (one filter,
    /// or any number in ordered mode). Their total bounds every completion
    /// from here; if the legs form a simple route that meets no other open
    /// transit, it is the best completion. `true` when the branch is settled.
    fn try_stitch(&mut self, store: &EdgeStore, cur: NodeId) -> bool {
        self.collect_open(None);
        if !(self.open.len() == 1 || self.ordered) {
            return false;
        }
        let end = self.norm.end;
        let targets: Vec<NodeId> = self
            .open
            .iter()
            .map(|&f| self.norm.filters[f].node)
            .chain([end])
            .collect();
        let mut total = self.acc;
        let mut legs: Vec<EdgeId> = Vec::new();
        let mut from = cur;
        let mut simple = true;
        self.mark[cur.0] = true;
        let mut touched = vec![cur];
        for &t in &targets {
            self.leg.run(store, from, Sweep::Forward, Some(t));
            let Some(path) = self.leg.path(store, t) else {
                total = DIST_INF;
                break;
            };
            total = total.saturating_add(self.leg.dist(t));
            for &id in &path {
                let w = store.edge(id).remote;
                let foreign = w != t && (w == end || self.plan.transit_of[w.0].is_some());
                if foreign || self.mark[w.0] {
                    simple = false;
                }
                if !self.mark[w.0] {
                    self.mark[w.0] = true;
                    touched.push(w);
                }
            }
            legs.extend(path);
            from = t;
        }
        for w in touched {
            self.mark[w.0] = false;
        }
        if self.over(total) {
            return true;
        }
        if !simple {
            return false;
        }
        self.best = total;
        self.best_path.clone_from(&self.path);
        self.best_path.extend(legs);
        self.stats.stitched += 1;
        self.stats.found += 1;
        true
    }

    /// Is some open filter reachable from `cur`, and able to reach the end,
    /// only through one and the same node? Uses `fwd`/`bwd` as left by
    /// `filters_reachable`.
    fn bottlenecked(&mut self, store: &mut EdgeStore, cur: NodeId) -> bool {
        let end = self.norm.end;
        self.collect_open(None);
        let open = std::mem::take(&mut self.open);
        let mut dead = false;
        for &f in &open {
            let t = self.norm.filters[f].node;
            let (Some(p), Some(q)) = (self.fwd.path(store, t), self.bwd.path(store, t)) else {
                continue;
            };
            let p_nodes: Vec<NodeId> = std::iter::once(cur)
                .chain(p.iter().map(|&id| store.edge(id).remote))
                .collect();
            let q_nodes: Vec<NodeId> = std::iter::once(t)
                .chain(q.iter().map(|&id| store.edge(id).remote))
                .collect();
            let q_inner = &q_nodes[1..q_nodes.len() - 1];
            for &w in q_inner {
                self.mark[w.0] = true;
            }
            for i in 1..p_nodes.len().saturating_sub(1) {
                let b = p_nodes[i];
                if !self.mark[b.0] {
                    continue;
                }
                let j = q_nodes.iter().position(|&w| w == b).unwrap_or(0);
                let mut g = Suppress::new(store);
                g.suppress_node(b, Direction::Both);
                let around_p = self
                    .reach
                    .reachable(&g, cur, t, &p_nodes[..i], &p_nodes[i + 1..]);
                let around_q = around_p
                    || self
                        .reach
                        .reachable(&g, t, end, &q_nodes[..j], &q_nodes[j + 1..]);
                drop(g);
                if !around_p && !around_q {
                    dead = true;
                    break;
                }
            }
            for &w in q_inner {
                self.mark[w.0] = false;
            }
            if dead {
                break;
            }
        }
        self.open = open;
        dead
    }

    fn take_jump(&mut self, store: &mut EdgeStore, route: &JumpRoute) {
        if route.edges.iter().any(|&id| !store.edge(id).is_active()) {
            return;
        }
        if self.path.len().saturating_add(route.edges.len()) > self.hop_budget() {
            return;
        }
        let (saved_acc, saved_len) = (self.acc, self.path.len());
        let mut consumed = Vec::new();
        let mut g = Suppress::new(store);
        let mut ok = true;
        for &id in &route.edges {
            let v = g.edge(id).remote;
            match self.entry(id, v) {
                Entry::Blocked => {
                    ok = false;
                    break;
                }
                Entry::Satisfies(f) => {
                    self.satisfy(f);
                    consumed.push(f);
                }
                Entry::Plain => {}
            }
            self.acc = self.acc.saturating_add(g.edge(id).calc_cost());
            self.path.push(id);
            self.state.toggle_node(v);
            g.suppress_in_edges(v);
        }
        if ok {
            self.collect_open(None);
            let lb = self.tables.cost_lb(route.tail, &self.open);
            let hops = self.tables.hop_lb(route.tail, &self.open);
            let fits = !self.over(self.acc.saturating_add(lb))
                && self.path.len().saturating_add(hops) <= self.hop_budget();
            if fits {
                self.stats.jumps += 1;
                self.visit(&mut g, route.tail);
            }
        }
        for f in consumed.into_iter().rev() {
            self.unsatisfy(f);
        }
        for &id in &self.path[saved_len..] {
            self.state.toggle_node(g.edge(id).remote);
        }
        self.path.truncate(saved_len);
        self.acc = saved_acc;
    }

    fn expand(&mut self, store: &mut EdgeStore, cur: NodeId) {
        let ids: Vec<EdgeId> = store
            .out_row(cur)
            .iter()
            .copied()
            .filter(|&id| store.edge(id).is_active())
            .collect();
        let mut level = Suppress::new(store);
        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            let v = level.edge(id).remote;
            let entry = self.entry(id, v);
            let skip = match entry {
                Entry::Blocked => continue,
                Entry::Satisfies(f) => Some(f),
                Entry::Plain => None,
            };
            self.collect_open(skip);
            let rest = level
                .edge(id)
                .calc_cost()
                .saturating_add(self.tables.cost_lb(v, &self.open));
            let hops = self.tables.hop_lb(v, &self.open);
            let too_long = self.path.len().saturating_add(1).saturating_add(hops) > self.hop_budget();
            if self.over(self.acc.saturating_add(rest)) || too_long {
                level.suppress_edge(id);
                self.stats.bound_prunes += 1;
                continue;
            }
            candidates.push((id, v, entry, rest));
        }
        for (id, v, entry, rest) in candidates {
            if !level.edge(id).is_active() || self.over(self.acc.saturating_add(rest)) {
                continue;
            }
            if self.shortest() && self.cfg.skip_duplicates && self.dominated(&level, cur, id, v) {
                self.stats.duplicate_skips += 1;
                continue;
            }
            self.step(&mut level, id, v, entry);
        }
    }

    fn step(&mut self, store: &mut EdgeStore, id: EdgeId, v: NodeId, entry: Entry) {
        let cost = store.edge(id).calc_cost();
        let mut g = Suppress::new(store);
        g.suppress_in_edges(v);
        if let Entry::Satisfies(f) = entry {
            self.satisfy(f);
        }
        let saved_acc = self.acc;
        self.acc = self.acc.saturating_add(cost);
        self.path.push(id);
        self.state.toggle_node(v);
        self.visit(&mut g, v);
        self.state.toggle_node(v);
        self.path.pop();
        self.acc = saved_acc;
        if let Entry::Satisfies(f) = entry {
            self.unsatisfy(f);
        }
    }

    /// Can an ancestor reach `v` at no higher cost while bypassing `cur` and
    /// only non-mandatory nodes of the current path? Either directly, or
    /// through some of the path nodes skipped in between. The alternative
    /// visits a strict subset of the nodes, so every completion through
    /// `cur → v` is matched by one explored from that ancestor.
    fn dominated(&mut self, store: &EdgeStore, cur: NodeId, id: EdgeId, v: NodeId) -> bool {
        let mut via = store.edge(id).calc_cost();
        let mut skipped = cur;
        self.window.clear();
        for i in (0..self.path.len()).rev() {
            let pid = self.path[i];
            if self.plan.mandatory[skipped.0] {
                return false;
            }
            let e = store.edge(pid);
            via = via.saturating_add(e.calc_cost());
            let a = e.local;
            if let Some(alt) = store.find_edge(a, v) {
                if self.base_active[alt.0] && store.edge(alt).calc_cost() <= via {
                    return true;
                }
            }
            if !self.window.is_empty() && self.reconverges(store, a, v, via) {
                self.stats.reconverged += 1;
                return true;
            }
            if skipped != cur {
                if self.window.len() == RECONVERGE_WINDOW {
                    self.window.remove(0);
                }
                self.window.push(skipped);
            }
            skipped = a;
        }
        false
    }

    /// Shortest `a ⇝ v` over edges usable at the start of the enumeration whose
    /// interior lies in `window`. Bellman-Ford on at most `window.len() + 1`
    /// nodes; `true` when it costs at most `via`.
    fn reconverges(&mut self, store: &EdgeStore, a: NodeId, v: NodeId, via: u64) -> bool {
        let k = self.window.len();
        let edge_cost = |x: NodeId, y: NodeId| -> Option<u64> {
            let id = store.find_edge(x, y)?;
            self.base_active[id.0].then(|| store.edge(id).calc_cost())
        };
        // Index 0..k: window nodes; index k: v.
        let mut dist = std::mem::take(&mut self.window_dist);
        dist.clear();
        for i in 0..=k {
            let y = if i == k { v } else { self.window[i] };
            dist.push(edge_cost(a, y).unwrap_or(DIST_INF));
        }
        for _ in 0..k {
            let mut changed = false;
            for x in 0..k {
                if dist[x] == DIST_INF {
                    continue;
                }
                for y in 0..=k {
                    if y == x {
                        continue;
                    }
                    let to = if y == k { v } else { self.window[y] };
                    if let Some(c) = edge_cost(self.window[x], to) {
                        let d = dist[x].saturating_add(c);
                        if d < dist[y] {
                            dist[y] = d;
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        let found = dist[k] <= via;
        self.window_dist = dist;
        found
    }
}
