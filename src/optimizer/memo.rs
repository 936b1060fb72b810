//! Per-solve memoization table
//!
//! Maps a `(state, stage)` pair to its already-computed optimal
//! sub-result. The state component is an exact integer representation, so
//! key equality never depends on raw float comparison: the reservoir
//! variant uses the tick index on the spec's quantization grid (its
//! transition puts every state on-grid), while the allocation variant
//! uses the bit pattern of the exact remaining amount. A table is built
//! and discarded within one solve; the only exception is the budget
//! sweep, which may reuse one table across budgets because an entry's
//! value depends only on its key.

use std::collections::HashMap;

/// Memo key: (exact state representation, stage index)
pub type MemoKey = (u64, usize);

/// Optimal sub-result at a `(state, stage)` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoEntry {
    /// Best achievable benefit from this point onward.
    /// `f64::NEG_INFINITY` marks a dead end with no feasible continuation.
    pub best_benefit: f64,

    /// Index (into the declared choice order) of the choice achieving
    /// `best_benefit`. `None` at a dead end, or when the zero-default
    /// policy won out over every declared choice.
    pub best_choice: Option<usize>,
}

/// Memoization table with hit/miss accounting
#[derive(Debug, Default)]
pub struct Memo {
    entries: HashMap<MemoKey, MemoEntry>,

    /// Lookups answered from the table
    pub hits: u64,

    /// Lookups that required computing a new entry
    pub misses: u64,
}

impl Memo {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key, recording a hit or miss
    pub fn lookup(&mut self, key: MemoKey) -> Option<MemoEntry> {
        let entry = self.entries.get(&key).copied();
        if entry.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        entry
    }

    /// Read a key without touching the statistics (trace reconstruction)
    pub fn get(&self, key: MemoKey) -> Option<MemoEntry> {
        self.entries.get(&key).copied()
    }

    /// Store the sub-result for a key
    pub fn insert(&mut self, key: MemoKey, entry: MemoEntry) {
        self.entries.insert(key, entry);
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Fraction of lookups answered from the table
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
