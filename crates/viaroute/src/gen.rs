//! Random sparse digraphs (seeded, replayable).
//!
//! Purpose
//! - Deterministic inputs for benches, the demo and cross-check tests.
//!
//! Model
//! - Every ordered pair `u → v` (`u != v`) is present independently with
//!   probability `density`; costs are uniform in `cost_min..=cost_max`.
//! - With `backbone`, the chain `0 → 1 → … → n-1` is always present, so every
//!   later node is reachable from node 0.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::edge::{Cost, NodeId};
use crate::error::Result;
use crate::store::EdgeStore;

/// Node count distribution.
#[derive(Clone, Copy, Debug)]
pub enum NodeCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}

impl NodeCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            NodeCount::Fixed(n) => n.max(2),
            NodeCount::Uniform { min, max } => {
                let lo = min.max(2);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GraphCfg {
    pub nodes: NodeCount,
    /// Probability of each ordered pair being connected. Clamped to [0, 1].
    pub density: f64,
    pub cost_min: Cost,
    pub cost_max: Cost,
    pub backbone: bool,
}

impl Default for GraphCfg {
    fn default() -> Self {
        Self {
            nodes: NodeCount::Fixed(12),
            density: 0.25,
            cost_min: 1,
            cost_max: 20,
            backbone: true,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Per-node adjacency lists `(remote, cost)`, ready for `EdgeStore::set_edges`.
pub fn draw_adjacency(cfg: GraphCfg, tok: ReplayToken) -> Vec<Vec<(NodeId, Cost)>> {
    let mut rng = tok.to_std_rng();
    let n = cfg.nodes.sample(&mut rng);
    let p = cfg.density.clamp(0.0, 1.0);
    let lo = cfg.cost_min.min(cfg.cost_max);
    let hi = cfg.cost_max.max(lo).min(Cost::MAX - 1);
    let mut adj = vec![Vec::new(); n];
    for (u, row) in adj.iter_mut().enumerate() {
        for v in 0..n {
            if u == v {
                continue;
            }
            let forced = cfg.backbone && v == u + 1;
            if forced || rng.gen_bool(p) {
                row.push((NodeId(v), rng.gen_range(lo..=hi)));
            }
        }
    }
    adj
}

/// Draw a store with the default scale.
pub fn draw_graph(cfg: GraphCfg, tok: ReplayToken) -> Result<EdgeStore> {
    let adj = draw_adjacency(cfg, tok);
    let mut store = EdgeStore::new(adj.len());
    store.set_edges(&adj)?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_token_same_graph() {
        let cfg = GraphCfg::default();
        let a = draw_adjacency(cfg, ReplayToken::new(7, 3));
        let b = draw_adjacency(cfg, ReplayToken::new(7, 3));
        let c = draw_adjacency(cfg, ReplayToken::new(7, 4));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn backbone_and_cost_range_hold() {
        let cfg = GraphCfg {
            nodes: NodeCount::Uniform { min: 5, max: 9 },
            density: 0.4,
            cost_min: 3,
            cost_max: 5,
            backbone: true,
        };
        for index in 0..20 {
            let adj = draw_adjacency(cfg, ReplayToken::new(1, index));
            assert!((5..=9).contains(&adj.len()));
            for (u, row) in adj.iter().enumerate() {
                if u + 1 < adj.len() {
                    assert!(row.iter().any(|&(v, _)| v.0 == u + 1));
                }
                for &(v, c) in row {
                    assert_ne!(v.0, u);
                    assert!((3..=5).contains(&c));
                }
            }
        }
    }

    #[test]
    fn draw_graph_builds_the_store() {
        let cfg = GraphCfg {
            density: 0.0,
            nodes: NodeCount::Fixed(6),
            ..GraphCfg::default()
        };
        let store = draw_graph(cfg, ReplayToken::new(0, 0)).unwrap();
        assert_eq!(store.node_count(), 6);
        assert_eq!(store.edge_count(), 5);
    }
}
