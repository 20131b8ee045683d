//! Background flusher
//!
//! One named thread ticking on a fixed interval until shut down.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{Result, RotateError};
use crate::index::IndexStore;

use super::Durability;

/// Handle to the periodic flush thread
///
/// Dropping the handle stops the thread. Neither `stop` nor drop performs
/// the final flush; the owner does that after the thread has exited.
pub struct Flusher {
    /// Dropping the sender disconnects the channel and wakes the thread
    shutdown_tx: Option<Sender<()>>,

    handle: Option<JoinHandle<()>>,
}

impl Flusher {
    const THREAD_NAME: &'static str = "keyrotate-flusher";

    /// Start flushing `index` through `durability` every `interval`
    pub fn spawn(
        durability: Arc<Durability>,
        index: Arc<IndexStore>,
        interval: Duration,
    ) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name(Self::THREAD_NAME.to_string())
            .spawn(move || run(durability, index, interval, shutdown_rx))?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Signal shutdown and wait for the thread to exit (idempotent)
    pub fn stop(&mut self) -> Result<()> {
        drop(self.shutdown_tx.take());

        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| RotateError::Worker("flusher thread panicked".to_string())),
            None => Ok(()),
        }
    }

    /// Whether the thread has not been stopped yet
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Flusher {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::error!("Error stopping flusher: {}", e);
        }
    }
}

fn run(
    durability: Arc<Durability>,
    index: Arc<IndexStore>,
    interval: Duration,
    shutdown_rx: Receiver<()>,
) {
    tracing::debug!("Flusher started, interval {:?}", interval);
    let ticker = channel::tick(interval);

    loop {
        crossbeam::select! {
            recv(ticker) -> _ => {
                durability.flush_logged(&index);
            }
            // Message or disconnect both mean shutdown
            recv(shutdown_rx) -> _ => break,
        }
    }

    tracing::debug!("Flusher stopped");
}
