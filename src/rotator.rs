//! Rotator Module
//!
//! The component a request handler holds on to.
//!
//! ## Responsibilities
//! - Provision the snapshot location and load persisted positions
//! - Serve rotations to any number of concurrent request threads
//! - Run the periodic flusher
//! - Flush once more on shutdown, then stop

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::index::{IndexStore, IndexTable, Position};
use crate::persist::{Durability, FlushOutcome, Flusher, LoadStatus, SnapshotStore};
use crate::rotation::{CredentialHeaders, Rotation, Scheme, Selection, Selector};

/// Credential rotation state engine
///
/// ## Lifecycle
/// `open` (provision → load → spawn flusher) → `rotate`… → `close`
/// (stop flusher → final flush). Dropping an open rotator performs the same
/// shutdown and logs any failure.
///
/// ## Concurrency Model
/// - `rotate`/`select_*`/`peek` take `&self`; wrap in `Arc` to share
/// - The index store lock linearizes advances per key
/// - Only the flusher thread, `flush` and shutdown touch the disk
pub struct Rotator {
    config: Config,

    index: Arc<IndexStore>,

    durability: Arc<Durability>,

    selector: Selector,

    flusher: Flusher,

    /// How the snapshot looked at startup
    load_status: LoadStatus,

    /// Set once the final flush has run
    closed: bool,
}

impl Rotator {
    /// Open a rotator backed by `config.index_path`
    ///
    /// On startup:
    /// 1. Create the snapshot's parent directory (failure is only logged)
    /// 2. Load persisted positions (missing or corrupt → empty)
    /// 3. Start the background flusher
    pub fn open(config: Config) -> Result<Self> {
        let durability = Durability::file(&config.index_path);
        Self::start(config, durability)
    }

    /// Open a rotator backed by a custom snapshot store
    pub fn open_with_store(config: Config, store: Arc<dyn SnapshotStore>) -> Result<Self> {
        Self::start(config, Durability::new(store))
    }

    fn start(config: Config, durability: Durability) -> Result<Self> {
        config.validate()?;

        // Step 1: Provision the snapshot location
        durability.prepare();

        // Step 2: Load persisted positions
        let report = durability.load();
        let index = Arc::new(IndexStore::from_table(report.table));

        // Step 3: Start the flusher
        let durability = Arc::new(durability);
        let flusher = Flusher::spawn(
            Arc::clone(&durability),
            Arc::clone(&index),
            config.flush_interval,
        )?;

        let selector = Selector::new(Arc::clone(&index), config.key_scope, config.trim_candidates);

        tracing::info!(
            "Rotator ready: {} keys from {}, flush every {:?}",
            index.len(),
            durability.store().describe(),
            config.flush_interval
        );

        Ok(Self {
            config,
            index,
            durability,
            selector,
            flusher,
            load_status: report.status,
            closed: false,
        })
    }

    /// Rotate the credential headers of one request
    pub fn rotate(&self, key: &str, headers: &CredentialHeaders<'_>) -> Rotation {
        let rotation = self.selector.rotate(key, headers);
        tracing::trace!(
            "Rotated {}: authorization={:?} api_key={:?}",
            key,
            rotation.authorization.as_ref().map(|s| s.index),
            rotation.api_key.as_ref().map(|s| s.index)
        );
        rotation
    }

    /// Rotate only an `Authorization` value
    pub fn select_authorization(&self, key: &str, raw: &str) -> Option<Selection> {
        self.selector.select_authorization(key, raw)
    }

    /// Rotate only an API key value
    pub fn select_api_key(&self, key: &str, raw: &str) -> Option<Selection> {
        self.selector.select_api_key(key, raw)
    }

    /// Position the next request for `key` will use under `scheme`
    pub fn peek(&self, key: &str, scheme: Scheme) -> Position {
        self.selector.peek(key, scheme)
    }

    /// Flush now if dirty (does not wait for the next tick)
    pub fn flush(&self) -> Result<FlushOutcome> {
        self.durability.flush_if_dirty(&self.index)
    }

    /// Stop the flusher and perform the final flush
    pub fn close(mut self) -> Result<FlushOutcome> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<FlushOutcome> {
        if self.closed {
            return Ok(FlushOutcome::Clean);
        }
        self.closed = true;

        let stopped = self.flusher.stop();
        let flushed = self.durability.flush_if_dirty(&self.index);

        stopped?;
        let outcome = flushed?;
        tracing::info!("Rotator closed ({:?})", outcome);
        Ok(outcome)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// How the snapshot looked at startup
    pub fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    /// Whether advances are waiting to be flushed
    pub fn is_dirty(&self) -> bool {
        self.index.is_dirty()
    }

    /// Copy of the in-memory table
    pub fn table(&self) -> IndexTable {
        self.index.table()
    }

    /// Shared handle to the index store
    pub fn index(&self) -> &Arc<IndexStore> {
        &self.index
    }

    /// Header name API keys are read from and written to
    pub fn api_key_header(&self) -> &str {
        &self.config.api_key_header
    }
}

impl Drop for Rotator {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!("Error during rotator shutdown: {}", e);
        }
    }
}
