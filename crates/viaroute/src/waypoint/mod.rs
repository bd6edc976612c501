//! Transit conditions (filters) and their normalization.
//!
//! A filter is either a node the route must visit or an edge it must traverse.
//! Before any search the list is validated and every condition that can be
//! satisfied by a fixed prefix from `start` or suffix into `end` is folded
//! into the route directly, so the enumerator only backtracks over what is left.

mod normalize;

pub(crate) use normalize::{normalize, Normalized};

use crate::edge::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Visit this node.
    Node(NodeId),
    /// Traverse the edge `local → remote`.
    Edge(NodeId, NodeId),
}

impl Filter {
    /// Node at which the condition counts as satisfied.
    #[inline]
    pub fn transit(&self) -> NodeId {
        match *self {
            Filter::Node(n) => n,
            Filter::Edge(_, v) => v,
        }
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = NodeId> {
        let (a, b) = match *self {
            Filter::Node(n) => (n, None),
            Filter::Edge(u, v) => (u, Some(v)),
        };
        std::iter::once(a).chain(b)
    }
}

impl From<NodeId> for Filter {
    fn from(n: NodeId) -> Self {
        Filter::Node(n)
    }
}

/// Whether filters must be satisfied in list order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FilterOrder {
    #[default]
    Unordered,
    Ordered,
}
