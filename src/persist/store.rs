//! Snapshot storage
//!
//! Where snapshot bytes live. The file store is what runs in production;
//! the memory store backs tests and diagnostics.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::Result;

/// Durable home of the index snapshot
///
/// Implementations must be safe to share across threads. Writes replace the
/// whole snapshot.
pub trait SnapshotStore: Send + Sync + fmt::Debug {
    /// Make sure the location can be written (e.g. create directories)
    fn prepare(&self) -> Result<()>;

    /// Read the snapshot, `Ok(None)` if none was ever written
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the snapshot with `bytes`
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Human readable location for logs
    fn describe(&self) -> String;
}

// =============================================================================
// File Store
// =============================================================================

/// Snapshot stored in a single file, replaced atomically via rename
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp file used for atomic replacement
    /// "state/indexes.json" → "state/indexes.json.tmp"
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "indexes".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileStore {
    fn prepare(&self) -> Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir)?;
                Ok(())
            }
            // Bare file name: lives in the working directory
            _ => Ok(()),
        }
    }

    fn read(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        let tmp = self.tmp_path();

        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });

        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory snapshot store for tests and diagnostics
///
/// Counts writes and can be told to fail them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with snapshot bytes
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::default();
        *store.contents.lock() = Some(bytes.into());
        store
    }

    /// Make subsequent writes fail (true) or succeed (false)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current snapshot bytes
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents.lock().clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure").into());
        }
        *self.contents.lock() = Some(bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
