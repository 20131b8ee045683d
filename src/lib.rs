//! # keyrotate
//!
//! Round-robin credential rotation with:
//! - A concurrent rotation index keyed by logical endpoint
//! - Read-then-increment advances linearized per key
//! - Debounced, crash-tolerant persistence of rotation positions
//! - Explicit lifecycle with a final flush on shutdown
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Request Handlers                          │
//! │         (logical key + comma-separated credentials)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Rotator / Selector                          │
//! │          (parse candidates, pick position % count)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐        ┌─────────────────┐
//!               │  IndexStore   │◄───────│     Flusher     │
//!               │ (RwLock+dirty)│        │ (every 30s/exit)│
//!               └───────────────┘        └────────┬────────┘
//!                                                 │
//!                                                 ▼
//!                                        ┌─────────────────┐
//!                                        │  indexes.json   │
//!                                        └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod index;
pub mod persist;
pub mod rotation;
pub mod rotator;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RotateError, Result};
pub use config::{Config, KeyScope};
pub use rotation::{CredentialHeaders, Rotation, Selection};
pub use rotator::Rotator;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of keyrotate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
