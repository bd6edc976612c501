//! Pre-search suppression, forced-edge deduction and cost bias.
//!
//! `prepare` runs once per filtered search, inside a `Suppress` guard owned by
//! the caller. It disables every edge that no compliant simple route can use:
//! edges into the start and out of the end, self-loops, the fixed prefix and
//! suffix, siblings of required edges, and whatever the forced-edge fixed point
//! proves unusable. Chains of forced edges become jump routes.
//!
//! `apply_bias` then discounts edges around the remaining transit nodes. Every
//! compliant route crosses each transit node exactly once, so the discount it
//! collects is the same constant for all of them and optimality is unchanged.

mod bias;
mod jump;

pub(crate) use bias::apply_bias;
pub(crate) use jump::JumpRoute;

use crate::edge::{EdgeId, NodeId};
use crate::store::{Direction, EdgeStore, Suppress};
use crate::waypoint::Normalized;

/// Call-scoped facts the enumerator reads.
#[derive(Clone, Debug, Default)]
pub(crate) struct Plan {
    /// Nodes every compliant route must visit.
    pub mandatory: Vec<bool>,
    /// Filter index whose transit node this is.
    pub transit_of: Vec<Option<usize>>,
    /// Jump route starting at a node, as an index into `routes`.
    pub jumps: Vec<Option<usize>>,
    pub routes: Vec<JumpRoute>,
}

impl Plan {
    pub(crate) fn jump_at(&self, n: NodeId) -> Option<&JumpRoute> {
        self.jumps[n.0].map(|i| &self.routes[i])
    }
}

/// Suppress what cannot take part in a compliant route and derive the plan.
///
/// `shortest` enables the pass-through elimination, which only preserves the
/// optimum, not the full route set. `None` means no compliant route exists.
pub(crate) fn prepare(
    store: &mut Suppress<'_>,
    norm: &Normalized,
    shortest: bool,
    jump_routes: bool,
) -> Option<Plan> {
    let n = store.node_count();
    let (start, end) = (norm.start, norm.end);

    store.suppress_in_edges(start);
    store.suppress_out_edges(end);
    for i in 0..store.edge_count() {
        let e = store.edge(EdgeId(i));
        if e.local == e.remote && e.is_active() {
            store.suppress_edge(EdgeId(i));
        }
    }
    let fixed: Vec<NodeId> = norm.fixed_nodes(store).collect();
    for v in fixed {
        if v != start && v != end {
            store.suppress_node(v, Direction::Both);
        }
    }

    let mut mandatory = vec![false; n];
    let mut transit_of = vec![None; n];
    let mut forced = Forced::new(n);
    mandatory[start.0] = true;
    mandatory[end.0] = true;
    for (i, t) in norm.filters.iter().enumerate() {
        mandatory[t.node.0] = true;
        transit_of[t.node.0] = Some(i);
        if let Some(id) = t.edge {
            if !store.edge(id).is_active() {
                return None;
            }
            mandatory[store.edge(id).local.0] = true;
            if !forced.force(store, id) {
                return None;
            }
        }
    }

    let mut rounds = 0usize;
    loop {
        rounds += 1;
        debug_assert!(rounds <= 2 * n + store.edge_count() + 2, "forcing did not converge");
        let mut changed = false;
        for m in (0..n).map(NodeId) {
            if !mandatory[m.0] {
                continue;
            }
            if m != start && forced.into[m.0].is_none() {
                match sole_edge(store, m, Direction::In) {
                    Sole::None => return None,
                    Sole::One(id) => {
                        mandatory[store.edge(id).local.0] = true;
                        if !forced.force(store, id) {
                            return None;
                        }
                        changed = true;
                    }
                    Sole::Many => {}
                }
            }
            if m != end && forced.out_of[m.0].is_none() {
                match sole_edge(store, m, Direction::Out) {
                    Sole::None => return None,
                    Sole::One(id) => {
                        mandatory[store.edge(id).remote.0] = true;
                        if !forced.force(store, id) {
                            return None;
                        }
                        changed = true;
                    }
                    Sole::Many => {}
                }
            }
        }
        if shortest {
            for m in (0..n).map(NodeId) {
                if !mandatory[m.0] && drop_pass_through(store, m) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut jumps = vec![None; n];
    let routes = jump::chains(store, &forced, &transit_of)?;
    let routes: Vec<JumpRoute> = if jump_routes {
        routes.into_iter().filter(|r| r.edges.len() >= 2).collect()
    } else {
        Vec::new()
    };
    for (i, r) in routes.iter().enumerate() {
        jumps[r.head.0] = Some(i);
    }
    tracing::trace!(
        suppressed = store.count(),
        jump_routes = routes.len(),
        "search prepared"
    );
    Some(Plan {
        mandatory,
        transit_of,
        jumps,
        routes,
    })
}

/// Forced edges by endpoint.
#[derive(Clone, Debug)]
pub(crate) struct Forced {
    pub out_of: Vec<Option<EdgeId>>,
    pub into: Vec<Option<EdgeId>>,
}

impl Forced {
    fn new(n: usize) -> Self {
        Self {
            out_of: vec![None; n],
            into: vec![None; n],
        }
    }

    /// Record `id` as the only way out of its tail and into its head, and
    /// suppress the siblings. `false` on a conflicting earlier deduction.
    fn force(&mut self, store: &mut Suppress<'_>, id: EdgeId) -> bool {
        let (u, v) = (store.edge(id).local, store.edge(id).remote);
        match (self.out_of[u.0], self.into[v.0]) {
            (Some(a), _) if a != id => return false,
            (_, Some(b)) if b != id => return false,
            _ => {}
        }
        self.out_of[u.0] = Some(id);
        self.into[v.0] = Some(id);
        for i in 0..store.out_row(u).len() {
            let other = store.out_row(u)[i];
            if other != id && store.edge(other).is_active() {
                store.suppress_edge(other);
            }
        }
        for i in 0..store.in_row(v).len() {
            let other = store.in_row(v)[i];
            if other != id && store.edge(other).is_active() {
                store.suppress_edge(other);
            }
        }
        true
    }
}

enum Sole {
    None,
    One(EdgeId),
    Many,
}

fn sole_edge(store: &EdgeStore, n: NodeId, dir: Direction) -> Sole {
    let row = match dir {
        Direction::In => store.in_row(n),
        _ => store.out_row(n),
    };
    let mut found = Sole::None;
    for &id in row {
        if !store.edge(id).is_active() {
            continue;
        }
        found = match found {
            Sole::None => Sole::One(id),
            _ => return Sole::Many,
        };
    }
    found
}

/// Dead ends, and pass-through nodes `a → m → b` where going straight `a → b`
/// is no more expensive (or `a == b`). Only valid for `m` not mandatory.
fn drop_pass_through(store: &mut Suppress<'_>, m: NodeId) -> bool {
    let (din, dout) = (store.active_in_degree(m), store.active_out_degree(m));
    if din + dout == 0 {
        return false;
    }
    if din == 0 || dout == 0 {
        store.suppress_node(m, Direction::Both);
        return true;
    }
    if din != 1 || dout != 1 {
        return false;
    }
    let (Sole::One(ein), Sole::One(eout)) = (
        sole_edge(store, m, Direction::In),
        sole_edge(store, m, Direction::Out),
    ) else {
        return false;
    };
    let a = store.edge(ein).local;
    let b = store.edge(eout).remote;
    let via = store.edge(ein).calc_cost().saturating_add(store.edge(eout).calc_cost());
    let direct = a == b
        || store
            .find_edge(a, b)
            .is_some_and(|id| store.edge(id).is_active() && store.edge(id).calc_cost() <= via);
    if direct {
        store.suppress_edge(ein);
        store.suppress_edge(eout);
    }
    direct
}

#[cfg(test)]
mod tests;
