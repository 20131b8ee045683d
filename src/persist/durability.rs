//! Durability manager
//!
//! Load at startup, flush when dirty. Never fatal for the request path.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::index::{IndexStore, IndexTable};

use super::snapshot::{decode_snapshot, encode_snapshot};
use super::store::{FileStore, SnapshotStore};

/// What `load` found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No snapshot yet (cold start)
    Missing,

    /// Snapshot parsed successfully
    Loaded { entries: usize },

    /// Snapshot exists but could not be read
    Unreadable,

    /// Snapshot exists but could not be parsed; left on disk until the next
    /// successful flush overwrites it
    Corrupt,
}

/// Result of loading the snapshot
#[derive(Debug)]
pub struct LoadReport {
    /// Table to start from (empty unless `Loaded`)
    pub table: IndexTable,

    /// How the snapshot looked
    pub status: LoadStatus,
}

/// What `flush_if_dirty` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing changed since the last flush; no write issued
    Clean,

    /// Snapshot written with this many keys
    Written { entries: usize },
}

/// Owns the snapshot storage and flush discipline
///
/// ## Concurrency:
/// - `flush_lock` serializes flushes so a manual flush never interleaves
///   with the background flusher on the same temp file
/// - The index lock is only held while copying the table
#[derive(Debug)]
pub struct Durability {
    store: Arc<dyn SnapshotStore>,
    flush_lock: Mutex<()>,
}

impl Durability {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            store,
            flush_lock: Mutex::new(()),
        }
    }

    /// Durability backed by a snapshot file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(path)))
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Ensure the snapshot location exists
    ///
    /// Returns false (after logging) if it could not be provisioned; startup
    /// continues and later writes fail and retry.
    pub fn prepare(&self) -> bool {
        match self.store.prepare() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Could not provision snapshot location {}: {}",
                    self.store.describe(),
                    e
                );
                false
            }
        }
    }

    /// Load the snapshot, degrading to an empty table on any failure
    pub fn load(&self) -> LoadReport {
        let bytes = match self.store.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!("No index snapshot at {}, starting empty", self.store.describe());
                return LoadReport {
                    table: IndexTable::new(),
                    status: LoadStatus::Missing,
                };
            }
            Err(e) => {
                tracing::error!("Error reading index snapshot {}: {}", self.store.describe(), e);
                return LoadReport {
                    table: IndexTable::new(),
                    status: LoadStatus::Unreadable,
                };
            }
        };

        match decode_snapshot(&bytes) {
            Ok(table) => {
                let entries = table.len();
                tracing::debug!(
                    "Loaded {} rotation positions from {}",
                    entries,
                    self.store.describe()
                );
                LoadReport {
                    table,
                    status: LoadStatus::Loaded { entries },
                }
            }
            Err(e) => {
                tracing::error!("Error parsing index snapshot {}: {}", self.store.describe(), e);
                LoadReport {
                    table: IndexTable::new(),
                    status: LoadStatus::Corrupt,
                }
            }
        }
    }

    /// Persist the index if it has unflushed advances
    ///
    /// The dirty flag is cleared when the copy is taken and restored if
    /// encoding or writing fails, so the next call retries.
    pub fn flush_if_dirty(&self, index: &IndexStore) -> Result<FlushOutcome> {
        let _flush_guard = self.flush_lock.lock();

        let Some(table) = index.snapshot_if_dirty() else {
            return Ok(FlushOutcome::Clean);
        };

        let written = encode_snapshot(&table).and_then(|bytes| self.store.write(&bytes));
        if let Err(e) = written {
            index.mark_dirty();
            return Err(e);
        }

        tracing::debug!(
            "Flushed {} rotation positions to {}",
            table.len(),
            self.store.describe()
        );
        Ok(FlushOutcome::Written {
            entries: table.len(),
        })
    }

    /// Flush and log instead of returning the error (background path)
    pub fn flush_logged(&self, index: &IndexStore) -> Option<FlushOutcome> {
        match self.flush_if_dirty(index) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(
                    "Error writing index snapshot {}: {} (will retry)",
                    self.store.describe(),
                    e
                );
                None
            }
        }
    }
}
