//! Transposition table keyed by Zobrist hash.
//!
//! The table grows without bound for the life of an engine; `clear` resets
//! it between games. Same-key stores prefer the deeper result.

use chess_core::Move;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score lay strictly inside the window.
    Exact,
    /// A beta cutoff: the true score is at least this.
    Lower,
    /// No move raised alpha: the true score is at most this.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
    stats: TtStats,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = TtStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> TtStats {
        self.stats
    }

    pub fn probe(&mut self, key: u64) -> Option<TtEntry> {
        self.stats.probes += 1;
        let hit = self.entries.get(&key).copied();
        if hit.is_some() {
            self.stats.hits += 1;
        }
        hit
    }

    pub fn store(&mut self, key: u64, entry: TtEntry) {
        self.stats.stores += 1;
        self.entries
            .entry(key)
            .and_modify(|existing| {
                if entry.depth >= existing.depth {
                    *existing = entry;
                }
            })
            .or_insert(entry);
    }
}
