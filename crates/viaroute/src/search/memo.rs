//! Per-search cache of settled branch states (shortest searches only).
//!
//! A state is the current node, the set of visited nodes and the set of
//! satisfied filters. Everything below a state depends only on those three
//! (suppression follows the visited set), so a second arrival at no lower
//! cost can be dropped.

use std::collections::HashMap;

use crate::edge::NodeId;

const WORD: usize = 64;

/// Visited nodes and satisfied filters as one bit set.
#[derive(Clone, Debug)]
pub(super) struct StateBits {
    words: Vec<u64>,
    filter_base: usize,
}

impl StateBits {
    pub(super) fn new(node_count: usize, filter_count: usize) -> Self {
        let bits = node_count + filter_count;
        Self {
            words: vec![0; bits.div_ceil(WORD)],
            filter_base: node_count,
        }
    }

    #[inline]
    fn flip(&mut self, bit: usize) {
        self.words[bit / WORD] ^= 1 << (bit % WORD);
    }

    /// Toggle node `n`; called once on entry and once on exit.
    #[inline]
    pub(super) fn toggle_node(&mut self, n: NodeId) {
        self.flip(n.0);
    }

    #[inline]
    pub(super) fn toggle_filter(&mut self, f: usize) {
        self.flip(self.filter_base + f);
    }
}

/// Cheapest arrival seen per state, up to `cap` entries.
#[derive(Debug)]
pub(super) struct Judgments {
    seen: HashMap<(usize, Vec<u64>), u64>,
    cap: usize,
}

impl Judgments {
    pub(super) fn new(cap: usize) -> Self {
        Self {
            seen: HashMap::new(),
            cap,
        }
    }

    /// Has an earlier branch reached `(at, bits)` at cost `<= acc`? Otherwise
    /// record `acc` for it.
    pub(super) fn covered(&mut self, at: NodeId, bits: &StateBits, acc: u64) -> bool {
        let key = (at.0, bits.words.clone());
        match self.seen.get_mut(&key) {
            Some(best) if *best <= acc => true,
            Some(best) => {
                *best = acc;
                false
            }
            None => {
                if self.seen.len() < self.cap {
                    self.seen.insert(key, acc);
                }
                false
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.seen.len()
    }
}
