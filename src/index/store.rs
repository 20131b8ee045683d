//! Index store implementation
//!
//! BTreeMap + dirty flag behind one RwLock.

use parking_lot::RwLock;

use super::{IndexTable, Position};

/// State guarded by the store lock
#[derive(Debug, Default)]
struct IndexState {
    table: IndexTable,
    dirty: bool,
}

/// Concurrent rotation index
///
/// ## Concurrency:
/// - `peek` and accessors take the read lock (many concurrent readers)
/// - `advance*`, `snapshot_if_dirty` and `mark_dirty` take the write lock
/// - All methods use `&self`; share it through an `Arc`
#[derive(Debug, Default)]
pub struct IndexStore {
    state: RwLock<IndexState>,
}

impl IndexStore {
    /// Create an empty, clean store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from loaded state (clean)
    pub fn from_table(table: IndexTable) -> Self {
        Self {
            state: RwLock::new(IndexState { table, dirty: false }),
        }
    }

    /// Current position for `key`, 0 if the key was never advanced
    pub fn peek(&self, key: &str) -> Position {
        self.state.read().table.get(key).copied().unwrap_or(0)
    }

    /// Read-then-increment
    ///
    /// Returns the position to use for this request, then stores
    /// `(current + 1) % candidate_count` and marks the table dirty.
    /// A zero count is ignored: the current position is returned unchanged.
    pub fn advance(&self, key: &str, candidate_count: usize) -> Position {
        self.advance_chain(key, &[candidate_count])
    }

    /// Apply one advance per entry of `counts` under a single write lock
    ///
    /// Returns the position observed before the first advance. Zero counts
    /// are skipped. Nothing is stored (and the table stays clean) when no
    /// count is usable.
    pub fn advance_chain(&self, key: &str, counts: &[usize]) -> Position {
        let mut state = self.state.write();
        let current = state.table.get(key).copied().unwrap_or(0);

        let mut next = current;
        let mut advanced = false;
        for &count in counts.iter().filter(|&&c| c > 0) {
            let count = count as Position;
            // Reduce first: a loaded position may be far outside the list
            next = (next % count + 1) % count;
            advanced = true;
        }

        if advanced {
            state.table.insert(key.to_string(), next);
            state.dirty = true;
        }

        current
    }

    /// Take a consistent copy for flushing
    ///
    /// Returns `None` when clean. Otherwise the dirty flag is cleared and the
    /// copy is returned; the caller must call `mark_dirty` if persisting it
    /// fails.
    pub fn snapshot_if_dirty(&self) -> Option<IndexTable> {
        let mut state = self.state.write();
        if !state.dirty {
            return None;
        }
        state.dirty = false;
        Some(state.table.clone())
    }

    /// Flag the table as diverged from disk (used after a failed write)
    pub fn mark_dirty(&self) {
        self.state.write().dirty = true;
    }

    /// Whether there are advances not yet flushed
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Copy of the whole table
    pub fn table(&self) -> IndexTable {
        self.state.read().table.clone()
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.state.read().table.len()
    }

    /// Whether no key has been tracked yet
    pub fn is_empty(&self) -> bool {
        self.state.read().table.is_empty()
    }
}
