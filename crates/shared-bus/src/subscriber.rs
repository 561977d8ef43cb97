//! # Event Subscriber
//!
//! Defines the consuming side of an event queue: the dispatch thread loop.

use crate::BusError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// What happens to queued events when a queue is stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPolicy {
    /// Dispatch everything already queued, then exit.
    #[default]
    Drain,
    /// Drop everything still queued, then exit.
    Discard,
}

/// Counters maintained by a queue and its dispatch thread.
#[derive(Debug, Default)]
pub struct DispatchStats {
    submitted: AtomicU64,
    dispatched: AtomicU64,
    discarded: AtomicU64,
    panicked: AtomicU64,
}

impl DispatchStats {
    /// Events accepted by `submit()`.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Events handed to the handler that returned normally.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Events dropped without being handled.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Events whose handler panicked.
    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }

    /// Events still waiting for the dispatch thread.
    pub fn pending(&self) -> u64 {
        self.submitted()
            .saturating_sub(self.dispatched() + self.discarded() + self.panicked())
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, count: u64) {
        self.discarded.fetch_add(count, Ordering::Relaxed);
    }
}

/// Spawn the single consumer for a queue.
///
/// The loop ends when every sender is gone and the channel is empty.
pub(crate) fn spawn_dispatcher<E, F>(
    name: String,
    mut receiver: mpsc::UnboundedReceiver<E>,
    mut handler: F,
    stats: Arc<DispatchStats>,
    discard: Arc<AtomicBool>,
) -> Result<JoinHandle<()>, BusError>
where
    E: Send + 'static,
    F: FnMut(E) + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            while let Some(event) = receiver.blocking_recv() {
                if discard.load(Ordering::Acquire) {
                    stats.record_discarded(1);
                    continue;
                }

                match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                    Ok(()) => {
                        stats.dispatched.fetch_add(1, Ordering::Relaxed);
                        trace!(queue = %name, "Event dispatched");
                    }
                    Err(payload) => {
                        stats.panicked.fetch_add(1, Ordering::Relaxed);
                        error!(
                            queue = %name,
                            panic = %panic_message(payload.as_ref()),
                            "Event handler panicked; continuing with next event"
                        );
                    }
                }
            }
            debug!(queue = %name, "Dispatch thread exiting");
        })
        .map_err(|e| BusError::Spawn(e.to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
