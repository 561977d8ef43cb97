//! # Event Publisher
//!
//! Defines the producing side of an event queue.

use crate::subscriber::{spawn_dispatcher, DispatchStats, ShutdownPolicy};
use crate::BusError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Trait for submitting events to a queue.
pub trait EventPublisher<E>: Send + Sync {
    /// Enqueue an event for the consumer.
    ///
    /// Never runs the consumer on the caller's thread.
    fn submit(&self, event: E) -> Result<(), BusError>;

    /// Total number of events accepted so far.
    fn events_submitted(&self) -> u64;
}

/// An unbounded multi-producer, single-consumer queue drained by one
/// dedicated thread.
///
/// The queue is created first and started later, so that events submitted
/// before `start()` are buffered and delivered once the consumer runs.
pub struct EventQueue<E> {
    /// Queue name, also used as the dispatch thread name.
    name: String,

    /// Producer handle; `None` once closed.
    sender: Mutex<Option<mpsc::UnboundedSender<E>>>,

    /// Consumer handle, taken by the dispatch thread on `start()`.
    receiver: Mutex<Option<mpsc::UnboundedReceiver<E>>>,

    /// Dispatch thread, taken when joined.
    worker: Mutex<Option<JoinHandle<()>>>,

    /// Set to drop queued events instead of dispatching them.
    discard: Arc<AtomicBool>,

    /// Counters shared with the dispatch thread.
    stats: Arc<DispatchStats>,
}

impl<E: Send + 'static> EventQueue<E> {
    /// Create a new, not yet started queue.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            name: name.into(),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            worker: Mutex::new(None),
            discard: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(DispatchStats::default()),
        }
    }

    /// Spawn the dispatch thread, which calls `handler` once per event in
    /// submission order.
    pub fn start<F>(&self, handler: F) -> Result<(), BusError>
    where
        F: FnMut(E) + Send + 'static,
    {
        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| BusError::AlreadyStarted(self.name.clone()))?;

        let handle = spawn_dispatcher(
            self.name.clone(),
            receiver,
            handler,
            self.stats.clone(),
            self.discard.clone(),
        )?;
        *self.worker.lock() = Some(handle);

        debug!(queue = %self.name, "Dispatch thread started");
        Ok(())
    }

    /// Queue name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Is a dispatch thread attached and not yet joined?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    /// Has the queue stopped accepting submissions?
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Events accepted but not yet dispatched, discarded or failed.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.stats.pending()
    }

    /// Dispatch counters.
    #[must_use]
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Stop accepting submissions. Already queued events stay queued.
    pub fn close(&self) {
        if self.sender.lock().take().is_some() {
            debug!(queue = %self.name, "Event queue closed");
        }
    }

    /// Close the queue and join the dispatch thread.
    ///
    /// With [`ShutdownPolicy::Drain`] every queued event is dispatched before
    /// the thread exits; with [`ShutdownPolicy::Discard`] queued events are
    /// dropped. Calling this from the queue's own dispatch thread closes the
    /// queue without joining.
    pub fn stop(&self, policy: ShutdownPolicy) -> Result<(), BusError> {
        if policy == ShutdownPolicy::Discard {
            self.discard.store(true, Ordering::Release);
        }
        self.close();

        let Some(handle) = self.worker.lock().take() else {
            // Never started: nothing will ever consume what is buffered.
            if let Some(mut receiver) = self.receiver.lock().take() {
                let mut dropped = 0u64;
                while receiver.try_recv().is_ok() {
                    dropped += 1;
                }
                self.stats.record_discarded(dropped);
                if dropped > 0 {
                    warn!(queue = %self.name, dropped, "Queue stopped before start; events dropped");
                }
            }
            return Ok(());
        };

        if handle.thread().id() == thread::current().id() {
            warn!(queue = %self.name, "stop() called from the dispatch thread; not joining");
            return Ok(());
        }

        handle
            .join()
            .map_err(|_| BusError::Join(self.name.clone()))?;
        debug!(queue = %self.name, policy = ?policy, "Dispatch thread joined");
        Ok(())
    }
}

impl<E: Send + 'static> EventPublisher<E> for EventQueue<E> {
    fn submit(&self, event: E) -> Result<(), BusError> {
        let guard = self.sender.lock();
        let sender = guard
            .as_ref()
            .ok_or_else(|| BusError::Closed(self.name.clone()))?;

        self.stats.record_submitted();
        sender.send(event).map_err(|_| {
            // Receiver gone: the dispatch thread has exited.
            self.stats.record_discarded(1);
            BusError::Closed(self.name.clone())
        })
    }

    fn events_submitted(&self) -> u64 {
        self.stats.submitted()
    }
}

impl<E> Drop for EventQueue<E> {
    fn drop(&mut self) {
        // Dropping the sender lets the dispatch thread finish on its own.
        self.sender.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    fn collecting_queue() -> (EventQueue<u32>, Arc<Mutex<Vec<u32>>>) {
        let queue = EventQueue::new("test-queue");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        queue.start(move |e| sink.lock().push(e)).unwrap();
        (queue, seen)
    }

    #[test]
    fn test_fifo_delivery() {
        let (queue, seen) = collecting_queue();
        for i in 0..100 {
            queue.submit(i).unwrap();
        }
        queue.stop(ShutdownPolicy::Drain).unwrap();

        assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
        assert_eq!(queue.events_submitted(), 100);
        assert_eq!(queue.stats().dispatched(), 100);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_submit_after_close_fails() {
        let (queue, _seen) = collecting_queue();
        queue.close();
        assert!(queue.is_closed());
        assert_eq!(
            queue.submit(1),
            Err(BusError::Closed("test-queue".to_string()))
        );
        queue.stop(ShutdownPolicy::Drain).unwrap();
    }

    #[test]
    fn test_start_twice_fails() {
        let (queue, _seen) = collecting_queue();
        let result = queue.start(|_| {});
        assert!(matches!(result, Err(BusError::AlreadyStarted(_))));
        queue.stop(ShutdownPolicy::Drain).unwrap();
    }

    #[test]
    fn test_events_buffered_before_start() {
        let queue = EventQueue::new("late-start");
        queue.submit(1u32).unwrap();
        queue.submit(2u32).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        queue.start(move |e| sink.lock().push(e)).unwrap();
        queue.stop(ShutdownPolicy::Drain).unwrap();

        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_handler_runs_on_dispatch_thread() {
        let queue = EventQueue::new("thread-check");
        let (tx, rx) = std_mpsc::channel();
        queue
            .start(move |_: u32| {
                let _ = tx.send(thread::current().name().map(str::to_string));
            })
            .unwrap();
        queue.submit(7).unwrap();

        let name = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(name.as_deref(), Some("thread-check"));
        queue.stop(ShutdownPolicy::Drain).unwrap();
    }

    #[test]
    fn test_panicking_handler_does_not_stop_dispatch() {
        let queue = EventQueue::new("panicky");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        queue
            .start(move |e: u32| {
                if e == 2 {
                    panic!("bad event");
                }
                sink.lock().push(e);
            })
            .unwrap();

        for i in 1..=4 {
            queue.submit(i).unwrap();
        }
        queue.stop(ShutdownPolicy::Drain).unwrap();

        assert_eq!(*seen.lock(), vec![1, 3, 4]);
        assert_eq!(queue.stats().panicked(), 1);
    }

    #[test]
    fn test_discard_policy_drops_queued_events() {
        let queue = EventQueue::new("discarding");
        let (gate_tx, gate_rx) = std_mpsc::channel::<()>();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        queue
            .start(move |e: u32| {
                if e == 0 {
                    // Hold the consumer until the queue has been told to discard.
                    let _ = gate_rx.recv_timeout(Duration::from_secs(2));
                }
                sink.lock().push(e);
            })
            .unwrap();

        for i in 0..10 {
            queue.submit(i).unwrap();
        }
        queue.discard.store(true, Ordering::Release);
        gate_tx.send(()).unwrap();
        queue.stop(ShutdownPolicy::Discard).unwrap();

        assert_eq!(*seen.lock(), vec![0]);
        assert_eq!(queue.stats().discarded(), 9);
    }

    #[test]
    fn test_stop_before_start_drops_buffer() {
        let queue = EventQueue::new("never-started");
        queue.submit(1u32).unwrap();
        queue.stop(ShutdownPolicy::Drain).unwrap();
        assert_eq!(queue.stats().discarded(), 1);
        assert!(!queue.is_running());
    }

    #[test]
    fn test_concurrent_producers_keep_per_producer_order() {
        let queue = Arc::new(EventQueue::new("multi-producer"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        queue.start(move |e: (u32, u32)| sink.lock().push(e)).unwrap();

        let producers: Vec<_> = (0..4u32)
            .map(|p| {
                let q = queue.clone();
                thread::spawn(move || {
                    for i in 0..250u32 {
                        q.submit((p, i)).unwrap();
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }
        queue.stop(ShutdownPolicy::Drain).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1000);
        for p in 0..4u32 {
            let order: Vec<u32> = seen.iter().filter(|(q, _)| *q == p).map(|(_, i)| *i).collect();
            assert_eq!(order, (0..250).collect::<Vec<_>>());
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_delivery_matches_submission(events in proptest::collection::vec(proptest::num::u32::ANY, 0..64)) {
            let (queue, seen) = collecting_queue();
            for e in &events {
                queue.submit(*e).unwrap();
            }
            queue.stop(ShutdownPolicy::Drain).unwrap();
            proptest::prop_assert_eq!(&*seen.lock(), &events);
        }
    }
}
