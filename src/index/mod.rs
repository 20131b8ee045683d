//! Index Module
//!
//! In-memory rotation positions keyed by logical key.
//!
//! ## Responsibilities
//! - Serve peek/advance under arbitrary concurrent callers
//! - Track whether the table diverged from the last snapshot (dirty flag)
//! - Hand out consistent copies for flushing
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in a single parking_lot RwLock together with the dirty
//! flag:
//! - Ordered keys keep snapshots stable on disk
//! - One lock means a flush never sees a half-applied advance

mod store;

pub use store::IndexStore;

use std::collections::BTreeMap;

/// Zero-based rotation counter for a logical key
pub type Position = u64;

/// Logical key → position mapping, also the shape of the snapshot
pub type IndexTable = BTreeMap<String, Position>;
