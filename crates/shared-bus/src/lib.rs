//! # Shared Bus - Single-Consumer Event Queues
//!
//! In-process queues that decouple producers from a single consumer running on
//! its own dedicated thread.
//!
//! ## Dispatch Rules
//!
//! - **Any number of producers** may call `submit()` concurrently; it never blocks
//!   beyond the cost of enqueueing.
//! - **Exactly one consumer** drains each queue, in strict FIFO order.
//! - Handlers run on the dispatch thread only, never on the producer's thread.
//! - A panicking handler is caught and logged; the dispatch thread keeps going.
//!
//! ```text
//! ┌────────────┐  submit()   ┌──────────────┐  handler(e)  ┌──────────────┐
//! │ Producer A │ ──────────► │              │ ───────────► │   Dispatch   │
//! ├────────────┤             │  EventQueue  │   (FIFO)     │    thread    │
//! │ Producer B │ ──────────► │              │              │              │
//! └────────────┘             └──────────────┘              └──────────────┘
//! ```
//!
//! Queues are unbounded: producers never see backpressure.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod publisher;
pub mod subscriber;

pub use publisher::{EventPublisher, EventQueue};
pub use subscriber::{DispatchStats, ShutdownPolicy};

use thiserror::Error;

/// Errors from queue operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The queue no longer accepts submissions.
    #[error("Event queue '{0}' is closed")]
    Closed(String),

    /// `start()` was called on a queue that already has a consumer.
    #[error("Event queue '{0}' already has a dispatch thread")]
    AlreadyStarted(String),

    /// The dispatch thread could not be spawned.
    #[error("Failed to spawn dispatch thread: {0}")]
    Spawn(String),

    /// The dispatch thread terminated abnormally while being joined.
    #[error("Dispatch thread for '{0}' terminated abnormally")]
    Join(String),
}
