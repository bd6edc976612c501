//! Constant-shift cost bias around transit nodes.

use crate::edge::{EdgeId, NodeId};
use crate::store::{Bias, EdgeStore};
use crate::waypoint::Normalized;

fn cheapest_in(store: &EdgeStore, v: NodeId) -> u64 {
    store
        .in_edges(v)
        .filter(|e| e.is_active())
        .map(|e| e.calc_cost())
        .min()
        .unwrap_or(0)
}

/// Largest out-discount of `t` that keeps every active out-edge non-negative.
fn max_out(store: &EdgeStore, t: NodeId, d_in: &[u64]) -> u64 {
    store
        .out_edges(t)
        .filter(|e| e.is_active())
        .map(|e| e.calc_cost().saturating_sub(d_in[e.remote.0]))
        .min()
        .unwrap_or(0)
}

/// Largest in-discount of `v` that keeps every active in-edge non-negative.
fn max_in(store: &EdgeStore, v: NodeId, d_out: &[u64]) -> u64 {
    store
        .in_edges(v)
        .filter(|e| e.is_active())
        .map(|e| e.calc_cost().saturating_sub(d_out[e.local.0]))
        .min()
        .unwrap_or(0)
}

/// Discount the active edges around each open transit node and `end`.
///
/// Seeds each transit node with half of its cheapest active in-edge as an
/// in-discount and `end` with all of it. Relaxation rounds then raise the
/// out-discounts of transit nodes and the in-discounts of transit nodes and
/// `end` to the slack their edges leave, until nothing moves or the round cap
/// (one per filter, plus one) is hit. Every edge `u → v` is lowered by
/// `d_out[u] + d_in[v]` and stays non-negative. Returns the total discount
/// every compliant route collects.
pub(crate) fn apply_bias(store: &mut Bias<'_>, norm: &Normalized) -> u64 {
    let n = store.node_count();
    let mut d_in = vec![0u64; n];
    let mut d_out = vec![0u64; n];
    let mut targets: Vec<NodeId> = norm.filters.iter().map(|t| t.node).collect();
    for &t in &targets {
        d_in[t.0] = cheapest_in(store, t) / 2;
    }
    d_in[norm.end.0] = cheapest_in(store, norm.end);
    targets.push(norm.end);

    let rounds = norm.filters.len() + 1;
    let mut total = 0;
    for round in 0..rounds {
        for t in &norm.filters {
            d_out[t.node.0] = max_out(store, t.node, &d_in);
        }
        for &v in &targets {
            d_in[v.0] = max_in(store, v, &d_out);
        }
        let next = norm
            .filters
            .iter()
            .map(|t| d_out[t.node.0])
            .chain(targets.iter().map(|v| d_in[v.0]))
            .sum::<u64>();
        if round > 0 && next == total {
            break;
        }
        total = next;
    }

    for i in 0..store.edge_count() {
        let e = store.edge(EdgeId(i));
        if e.is_active() {
            let by = d_out[e.local.0] + d_in[e.remote.0];
            store.lower(EdgeId(i), by);
        }
    }
    store.settle();
    tracing::trace!(discount = total, biased = store.count(), "cost bias applied");
    total
}
