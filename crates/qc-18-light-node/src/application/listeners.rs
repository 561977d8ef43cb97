//! # Listener Registry & Dispatch
//!
//! Registered listeners and the delivery of one [`ListenerEvent`] to all of
//! them. Delivery runs on the listener dispatch thread with the node lock
//! released.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::error;

use super::node::LightNode;
use crate::domain::{ListenerEvent, ListenerId};
use crate::ports::LightNodeListener;

/// Ordered listener list. Registration order is delivery order.
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn LightNodeListener>>,
}

impl ListenerRegistry {
    /// Create an empty registry with room for `capacity` listeners.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            listeners: Vec::with_capacity(capacity),
        }
    }

    /// Append a listener.
    pub fn register(&mut self, listener: Arc<dyn LightNodeListener>) -> ListenerId {
        self.listeners.push(listener);
        ListenerId::new((self.listeners.len() - 1) as u32)
    }

    /// Copy of the current list, for delivery outside the lock.
    pub fn snapshot(&self) -> Vec<Arc<dyn LightNodeListener>> {
        self.listeners.clone()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Current allocated capacity.
    pub fn capacity(&self) -> usize {
        self.listeners.capacity()
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

/// Invoke the capability matching `event` on each listener, in order.
///
/// A listener that panics is logged and skipped; the remaining listeners
/// still receive the event.
pub(crate) fn deliver(node: &LightNode, listeners: &[Arc<dyn LightNodeListener>], event: &ListenerEvent) {
    for (position, listener) in listeners.iter().enumerate() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            deliver_one(node, listener.as_ref(), event)
        }));
        if outcome.is_err() {
            error!(
                listener = position,
                category = event.category(),
                "[qc-18] Listener panicked while handling event"
            );
        }
    }
}

fn deliver_one(node: &LightNode, listener: &dyn LightNodeListener, event: &ListenerEvent) {
    match event {
        ListenerEvent::Node {
            event,
            status,
            error,
        } => listener.on_node_event(node, *event, *status, error.as_deref()),
        ListenerEvent::Peer {
            event,
            status,
            error,
        } => listener.on_peer_event(node, *event, *status, error.as_deref()),
        ListenerEvent::Wallet {
            wallet,
            event,
            status,
            error,
        } => listener.on_wallet_event(node, *wallet, *event, *status, error.as_deref()),
        ListenerEvent::Block {
            block,
            event,
            status,
            error,
        } => listener.on_block_event(node, *block, *event, *status, error.as_deref()),
        ListenerEvent::Transaction {
            wallet,
            transaction,
            event,
            status,
            error,
        } => listener.on_transaction_event(
            node,
            *wallet,
            *transaction,
            *event,
            *status,
            error.as_deref(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl LightNodeListener for Silent {}

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut registry = ListenerRegistry::with_capacity(3);
        assert_eq!(registry.register(Arc::new(Silent)), ListenerId::new(0));
        assert_eq!(registry.register(Arc::new(Silent)), ListenerId::new(1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut registry = ListenerRegistry::with_capacity(3);
        for _ in 0..5 {
            registry.register(Arc::new(Silent));
        }
        assert_eq!(registry.len(), 5);
        assert!(registry.capacity() >= 5);
        assert_eq!(registry.snapshot().len(), 5);
    }

    #[test]
    fn test_clear() {
        let mut registry = ListenerRegistry::with_capacity(1);
        registry.register(Arc::new(Silent));
        registry.clear();
        assert!(registry.is_empty());
    }
}
