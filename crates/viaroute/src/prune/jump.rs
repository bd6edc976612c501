//! Chains of forced edges.

use super::Forced;
use crate::edge::{EdgeId, NodeId};
use crate::store::Suppress;

/// A maximal chain of forced edges, taken by the enumerator in one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct JumpRoute {
    pub head: NodeId,
    pub tail: NodeId,
    pub edges: Vec<EdgeId>,
    /// `(hop, filter)`: the filter whose transit node the hop enters.
    pub consumes: Vec<(usize, usize)>,
}

/// Walk every forced chain from its head. A forced edge not covered by any
/// walk lies on a cycle, which no simple route can contain: `None`.
///
/// An edge from a chain's tail back to its head can never be used either, so
/// it is suppressed here.
pub(super) fn chains(
    store: &mut Suppress<'_>,
    forced: &Forced,
    transit_of: &[Option<usize>],
) -> Option<Vec<JumpRoute>> {
    let n = store.node_count();
    let total = forced.out_of.iter().flatten().count();
    let mut covered = 0;
    let mut routes = Vec::new();
    for head in (0..n).map(NodeId) {
        if forced.out_of[head.0].is_none() || forced.into[head.0].is_some() {
            continue;
        }
        let mut route = JumpRoute {
            head,
            tail: head,
            edges: Vec::new(),
            consumes: Vec::new(),
        };
        while let Some(id) = forced.out_of[route.tail.0] {
            if !store.edge(id).is_active() {
                return None;
            }
            let v = store.edge(id).remote;
            if let Some(f) = transit_of[v.0] {
                route.consumes.push((route.edges.len(), f));
            }
            route.edges.push(id);
            route.tail = v;
        }
        covered += route.edges.len();
        if let Some(back) = store.find_edge(route.tail, head) {
            if store.edge(back).is_active() {
                store.suppress_edge(back);
            }
        }
        routes.push(route);
    }
    if covered != total {
        tracing::debug!(cycle_edges = total - covered, "forced edges close a cycle");
        return None;
    }
    Some(routes)
}
