//! Persistence Module
//!
//! Keeps the on-disk snapshot eventually consistent with the index store.
//!
//! ## Responsibilities
//! - Provision the snapshot directory
//! - Load the snapshot at startup, degrading to an empty table
//! - Flush only when the index is dirty, restoring the flag on failure
//! - Run the periodic flusher and stop it on shutdown
//!
//! ## File Format
//! A flat JSON object, keys in sorted order:
//! ```text
//! {
//!   "/v1/models": 2,
//!   "/v1/chat/completions": 0
//! }
//! ```
//! Writes go to `<path>.tmp` and are renamed over the snapshot.

mod durability;
mod flusher;
mod snapshot;
mod store;

pub use durability::{Durability, FlushOutcome, LoadReport, LoadStatus};
pub use flusher::Flusher;
pub use snapshot::{decode_snapshot, encode_snapshot};
pub use store::{FileStore, MemoryStore, SnapshotStore};
