//! Validation and prefix/suffix folding of a filter list.

use super::{Filter, FilterOrder};
use crate::edge::{EdgeId, NodeId};
use crate::error::Result;
use crate::store::EdgeStore;

/// A filter left for the enumerator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Transit {
    pub filter: Filter,
    pub node: NodeId,
    /// The required edge for `Filter::Edge`.
    pub edge: Option<EdgeId>,
}

/// Outcome of normalization: fixed head and tail plus the filters still open.
#[derive(Clone, Debug)]
pub(crate) struct Normalized {
    /// Effective start (last node of `head`, or the original start).
    pub start: NodeId,
    /// Effective end (first node of `tail`, or the original end).
    pub end: NodeId,
    pub head: Vec<EdgeId>,
    pub tail: Vec<EdgeId>,
    pub filters: Vec<Transit>,
    pub order: FilterOrder,
}

impl Normalized {
    /// Nodes fixed by `head` and `tail` other than the effective endpoints.
    pub(crate) fn fixed_nodes<'a>(&'a self, store: &'a EdgeStore) -> impl Iterator<Item = NodeId> + 'a {
        let head = self.head.iter().map(move |&id| store.edge(id).local);
        let tail = self.tail.iter().map(move |&id| store.edge(id).remote);
        head.chain(tail)
    }
}

/// Validate `filters` and fold what is anchored at `start` or `end`.
///
/// `Ok(None)` means the list cannot be satisfied by any simple route
/// (contradiction, missing required edge, or `start == end`).
pub(crate) fn normalize(
    store: &EdgeStore,
    start: NodeId,
    end: NodeId,
    filters: &[Filter],
    order: FilterOrder,
) -> Result<Option<Normalized>> {
    store.check_node(start)?;
    store.check_node(end)?;
    for f in filters {
        for n in f.nodes() {
            store.check_node(n)?;
        }
    }
    match fold(store, start, end, filters, order) {
        Ok(norm) => Ok(Some(norm)),
        Err(reason) => {
            tracing::debug!(start = start.0, end = end.0, reason, "waypoints rejected");
            Ok(None)
        }
    }
}

fn fold(
    store: &EdgeStore,
    start: NodeId,
    end: NodeId,
    filters: &[Filter],
    order: FilterOrder,
) -> std::result::Result<Normalized, &'static str> {
    if start == end {
        return Err("start equals end");
    }
    let ordered = order == FilterOrder::Ordered;
    let merged = merge_implied(filters, ordered)?;
    let filters = &merged[..];
    let n = store.node_count();
    let mut transit_seen = vec![false; n];
    let mut tail_seen = vec![false; n];
    let mut open: Vec<Transit> = Vec::with_capacity(filters.len());
    for (i, f) in filters.iter().enumerate() {
        let t = f.transit();
        if std::mem::replace(&mut transit_seen[t.0], true) {
            return Err("node required twice");
        }
        match *f {
            Filter::Node(v) if v == start => {
                if ordered && i != 0 {
                    return Err("start required after another filter");
                }
            }
            Filter::Node(v) if v == end => {
                if ordered && i + 1 != filters.len() {
                    return Err("end required before another filter");
                }
            }
            Filter::Node(v) => open.push(Transit {
                filter: *f,
                node: v,
                edge: None,
            }),
            Filter::Edge(u, v) => {
                if u == v {
                    return Err("required self-loop");
                }
                if v == start {
                    return Err("required edge enters start");
                }
                if u == end {
                    return Err("required edge leaves end");
                }
                if ordered && v == end && i + 1 != filters.len() {
                    return Err("end required before another filter");
                }
                if std::mem::replace(&mut tail_seen[u.0], true) {
                    return Err("two required edges leave the same node");
                }
                let id = match store.find_edge(u, v) {
                    Some(id) if store.edge(id).is_active() => id,
                    _ => return Err("required edge unavailable"),
                };
                if ordered && !edge_in_sequence(filters, i, start) {
                    return Err("required edge out of order");
                }
                open.push(Transit {
                    filter: *f,
                    node: v,
                    edge: Some(id),
                });
            }
        }
    }

    // Prefix anchored at start.
    let mut head = Vec::new();
    let mut cur = start;
    loop {
        let pick = if ordered {
            open.first()
                .filter(|t| leaves(t, cur, store))
                .map(|_| 0)
        } else {
            open.iter().position(|t| leaves(t, cur, store))
        };
        let Some(i) = pick else { break };
        let t = open.remove(i);
        head.extend(t.edge);
        cur = t.node;
    }

    // Suffix anchored at end.
    let mut tail = Vec::new();
    let mut last = end;
    loop {
        let pick = if ordered {
            open.len()
                .checked_sub(1)
                .filter(|&i| open[i].node == last && open[i].edge.is_some())
        } else {
            open.iter()
                .position(|t| t.node == last && t.edge.is_some())
        };
        let Some(i) = pick else { break };
        let t = open.remove(i);
        let Some(id) = t.edge else { break };
        tail.push(id);
        last = store.edge(id).local;
        let node_here = if ordered {
            open.len()
                .checked_sub(1)
                .filter(|&i| open[i].node == last && open[i].edge.is_none())
        } else {
            open.iter().position(|t| t.node == last && t.edge.is_none())
        };
        if let Some(i) = node_here {
            open.remove(i);
        }
    }
    tail.reverse();

    let mut on_head = vec![false; n];
    on_head[start.0] = true;
    for &id in &head {
        on_head[store.edge(id).remote.0] = true;
    }
    let mut on_tail = vec![false; n];
    let tail_nodes = tail.iter().map(|&id| store.edge(id).local).chain([end]);
    for v in tail_nodes {
        if on_head[v.0] && !(v == cur && v == last) {
            return Err("fixed prefix and suffix overlap");
        }
        on_tail[v.0] = true;
    }
    if open.iter().any(|t| on_head[t.node.0] || on_tail[t.node.0]) {
        return Err("filter lies on the fixed prefix or suffix");
    }
    if cur == last && !open.is_empty() {
        return Err("filters left after prefix meets suffix");
    }
    Ok(Normalized {
        start: cur,
        end: last,
        head,
        tail,
        filters: open,
        order,
    })
}

/// Drop `Node(v)` when the list also requires an edge into `v`; traversing
/// the edge visits `v`. In ordered mode the two must be neighbours in the
/// list. A second `Node(v)` is kept so the duplicate is still reported.
fn merge_implied(filters: &[Filter], ordered: bool) -> std::result::Result<Vec<Filter>, &'static str> {
    let mut merged = Vec::with_capacity(filters.len());
    let mut dropped: Vec<NodeId> = Vec::new();
    for (i, f) in filters.iter().enumerate() {
        if let Filter::Node(v) = *f {
            let into = filters
                .iter()
                .position(|g| matches!(*g, Filter::Edge(_, w) if w == v));
            if let Some(j) = into.filter(|_| !dropped.contains(&v)) {
                if ordered && i.abs_diff(j) != 1 {
                    return Err("node and the edge into it split by another filter");
                }
                dropped.push(v);
                continue;
            }
        }
        merged.push(*f);
    }
    Ok(merged)
}

fn leaves(t: &Transit, node: NodeId, store: &EdgeStore) -> bool {
    t.edge.is_some_and(|id| store.edge(id).local == node)
}

/// In ordered mode, `Edge(u, v)` at position `i` must directly follow whatever
/// puts the route at `u`: the filter whose transit is `u`, or the route start.
fn edge_in_sequence(filters: &[Filter], i: usize, start: NodeId) -> bool {
    let Filter::Edge(u, _) = filters[i] else {
        return true;
    };
    if u == start {
        return filters[..i]
            .iter()
            .all(|f| matches!(f, Filter::Node(v) if *v == start));
    }
    match filters.iter().position(|f| f.transit() == u) {
        Some(j) => j + 1 == i,
        None => true,
    }
}
