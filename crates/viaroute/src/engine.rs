//! Public façade: owns the store and dispatches queries.

use crate::edge::{Cost, NodeId, DIST_INF};
use crate::error::Result;
use crate::paths::{Reach, ShortestPaths, Sweep};
use crate::prune::{apply_bias, prepare};
use crate::search::{enumerate, Goal, Route, RouteLimits, SearchCfg};
use crate::store::{Bias, Direction, EdgeStore, Suppress};
use crate::waypoint::{normalize, Filter, FilterOrder, Normalized};

/// Route queries over one mutable graph.
///
/// Filtered searches suppress and re-bias edges of the owned store while they
/// run and restore them before returning, so they take `&mut self`.
#[derive(Clone, Debug, Default)]
pub struct RouteEngine {
    store: EdgeStore,
    cfg: SearchCfg,
}

#[derive(Clone, Copy, Debug)]
enum Query {
    Shortest,
    All(RouteLimits),
}

impl RouteEngine {
    pub fn new(node_count: usize) -> Self {
        Self::from_store(EdgeStore::new(node_count))
    }

    pub fn with_cfg(node_count: usize, cfg: SearchCfg) -> Self {
        Self {
            store: EdgeStore::new(node_count),
            cfg,
        }
    }

    pub fn from_store(store: EdgeStore) -> Self {
        Self {
            store,
            cfg: SearchCfg::default(),
        }
    }

    /// Build from per-node adjacency lists `(remote, cost)`.
    pub fn from_adjacency(adjacency: &[Vec<(NodeId, Cost)>]) -> Result<Self> {
        let mut store = EdgeStore::new(adjacency.len());
        store.set_edges(adjacency)?;
        Ok(Self::from_store(store))
    }

    #[inline]
    pub fn store(&self) -> &EdgeStore {
        &self.store
    }

    #[inline]
    pub fn cfg(&self) -> SearchCfg {
        self.cfg
    }

    pub fn set_cfg(&mut self, cfg: SearchCfg) {
        self.cfg = cfg;
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    pub fn set_edges(&mut self, adjacency: &[Vec<(NodeId, Cost)>]) -> Result<()> {
        self.store.set_edges(adjacency)
    }

    /// Replace, insert or (with `None`) delete the edge `u → v`.
    pub fn set_edge(&mut self, u: NodeId, v: NodeId, cost: Option<Cost>) -> Result<()> {
        self.store.set_edge(u, v, cost)
    }

    pub fn add_node(&mut self) -> NodeId {
        self.store.add_node()
    }

    /// Remove `n` and its edges; higher ids shift down by one.
    pub fn remove_node(&mut self, n: NodeId) -> Result<()> {
        self.store.remove_node(n)
    }

    pub fn disable_node(&mut self, n: NodeId, dir: Direction) -> Result<()> {
        self.store.disable_node(n, dir)
    }

    pub fn enable_node(&mut self, n: NodeId, dir: Direction) -> Result<()> {
        self.store.enable_node(n, dir)
    }

    /// Cheapest route over the active edges. `None` when unreachable or `start == end`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn shortest_route(&self, start: NodeId, end: NodeId) -> Result<Option<Route>> {
        self.store.check_node(start)?;
        self.store.check_node(end)?;
        if start == end {
            return Ok(None);
        }
        let mut sp = ShortestPaths::default();
        sp.run(&self.store, start, Sweep::Forward, Some(end));
        Ok(sp
            .path(&self.store, end)
            .map(|ids| Route::from_edges(&self.store, &ids)))
    }

    /// Cheapest route satisfying every filter.
    #[tracing::instrument(level = "debug", skip(self, filters), fields(filters = filters.len()))]
    pub fn shortest_route_with_waypoints(
        &mut self,
        start: NodeId,
        end: NodeId,
        filters: &[Filter],
        order: FilterOrder,
    ) -> Result<Option<Route>> {
        let routes = self.search(start, end, filters, order, Query::Shortest)?;
        Ok(routes.into_iter().next())
    }

    /// Every simple route `start ⇝ end`, sorted by cost then hop count.
    pub fn all_routes(&mut self, start: NodeId, end: NodeId) -> Result<Vec<Route>> {
        self.all_routes_with_waypoints(start, end, &[], FilterOrder::Unordered, RouteLimits::default())
    }

    /// Every simple route satisfying the filters within `limits`, sorted by
    /// cost then hop count.
    #[tracing::instrument(level = "debug", skip(self, filters), fields(filters = filters.len()))]
    pub fn all_routes_with_waypoints(
        &mut self,
        start: NodeId,
        end: NodeId,
        filters: &[Filter],
        order: FilterOrder,
        limits: RouteLimits,
    ) -> Result<Vec<Route>> {
        let mut routes = self.search(start, end, filters, order, Query::All(limits))?;
        routes.retain(|r| limits.admits(r));
        routes.sort_by_key(|r| (r.cost, r.len()));
        Ok(routes)
    }

    /// Is there an active path `start ⇝ end`? `false` for `start == end`.
    pub fn is_reachable(&self, start: NodeId, end: NodeId) -> Result<bool> {
        self.store.check_node(start)?;
        self.store.check_node(end)?;
        if start == end {
            return Ok(false);
        }
        let mut reach = Reach::new(self.store.node_count());
        Ok(reach.reachable(&self.store, start, end, &[], &[]))
    }

    fn search(
        &mut self,
        start: NodeId,
        end: NodeId,
        filters: &[Filter],
        order: FilterOrder,
        query: Query,
    ) -> Result<Vec<Route>> {
        let Some(norm) = normalize(&self.store, start, end, filters, order)? else {
            return Ok(Vec::new());
        };
        #[cfg(debug_assertions)]
        let before = self.store.snapshot();
        let routes = run(&mut self.store, &norm, self.cfg, query);
        #[cfg(debug_assertions)]
        debug_assert!(
            before == self.store.snapshot(),
            "search left suppression or cost changes behind"
        );
        Ok(routes)
    }
}

/// Suppress, bias, enumerate. Guards restore the store on every return path.
fn run(store: &mut EdgeStore, norm: &Normalized, cfg: SearchCfg, query: Query) -> Vec<Route> {
    if norm.start == norm.end {
        let route = Route::from_edges(store, norm.head.iter().chain(&norm.tail));
        return match query {
            Query::All(limits) if !limits.admits(&route) => Vec::new(),
            _ => vec![route],
        };
    }
    let fixed = norm.head.iter().chain(&norm.tail);
    let fixed_calc: u64 = fixed.clone().map(|&id| store.edge(id).calc_cost()).sum();
    let fixed_hops = fixed.count();

    let mut sup = Suppress::new(store);
    let shortest = matches!(query, Query::Shortest);
    let Some(plan) = prepare(&mut sup, norm, shortest, cfg.jump_routes) else {
        return Vec::new();
    };
    let mut bias = Bias::new(&mut sup);
    let discount = if cfg.cost_bias {
        apply_bias(&mut bias, norm)
    } else {
        0
    };
    let goal = match query {
        Query::Shortest => Goal::Shortest,
        Query::All(limits) => {
            let Some(hops) = limits.hop_max.checked_sub(fixed_hops) else {
                return Vec::new();
            };
            let budget = match limits.cost_max.checked_mul(bias.scale()) {
                None => DIST_INF,
                Some(cap) => match cap.checked_sub(fixed_calc.saturating_add(discount)) {
                    Some(budget) => budget,
                    None => return Vec::new(),
                },
            };
            Goal::All { budget, hops }
        }
    };
    let paths = enumerate(&mut bias, norm, &plan, cfg, goal);
    paths
        .iter()
        .map(|p| Route::from_edges(&bias, norm.head.iter().chain(p).chain(&norm.tail)))
        .collect()
}

#[cfg(test)]
mod tests;
