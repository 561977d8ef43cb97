//! Listener that forwards every event into a tokio channel, for async
//! applications that want to `.await` node events instead of implementing
//! callbacks.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::application::LightNode;
use crate::domain::{
    BlockEvent, BlockId, ListenerEvent, NodeEvent, PeerEvent, Status, TransactionEvent,
    TransactionId, WalletEvent, WalletId,
};
use crate::ports::LightNodeListener;

/// Forwards listener callbacks as [`ListenerEvent`]s.
pub struct ChannelListener {
    sender: UnboundedSender<ListenerEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel.
    pub fn new() -> (Self, UnboundedReceiver<ListenerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn forward(&self, event: ListenerEvent) {
        if self.sender.send(event).is_err() {
            trace!("[qc-18] Channel listener receiver dropped");
        }
    }
}

impl LightNodeListener for ChannelListener {
    fn on_node_event(&self, _node: &LightNode, event: NodeEvent, status: Status, error: Option<&str>) {
        self.forward(ListenerEvent::Node {
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_peer_event(&self, _node: &LightNode, event: PeerEvent, status: Status, error: Option<&str>) {
        self.forward(ListenerEvent::Peer {
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_wallet_event(
        &self,
        _node: &LightNode,
        wallet: WalletId,
        event: WalletEvent,
        status: Status,
        error: Option<&str>,
    ) {
        self.forward(ListenerEvent::Wallet {
            wallet,
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_block_event(
        &self,
        _node: &LightNode,
        block: BlockId,
        event: BlockEvent,
        status: Status,
        error: Option<&str>,
    ) {
        self.forward(ListenerEvent::Block {
            block,
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_transaction_event(
        &self,
        _node: &LightNode,
        wallet: WalletId,
        transaction: TransactionId,
        event: TransactionEvent,
        status: Status,
        error: Option<&str>,
    ) {
        self.forward(ListenerEvent::Transaction {
            wallet,
            transaction,
            event,
            status,
            error: error.map(str::to_owned),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightNodeConfig;
    use crate::domain::{Account, NodeState};
    use crate::ports::{MockClient, ProtocolResultSink};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_forwards_events_in_order() {
        let node = LightNode::create(
            LightNodeConfig::for_testing(),
            Arc::new(MockClient::default()),
            Account::new([1u8; 20]),
        )
        .unwrap();
        let (listener, mut events) = ChannelListener::new();
        node.add_listener(Arc::new(listener));

        node.connect().unwrap();
        node.handle_connected().unwrap();

        let first = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap();
        assert_eq!(
            first,
            Some(ListenerEvent::node(NodeEvent::StateChanged(NodeState::Connecting)))
        );
        assert_eq!(
            second,
            Some(ListenerEvent::node(NodeEvent::StateChanged(NodeState::Connected)))
        );
    }

    #[test]
    fn test_dropped_receiver_is_harmless() {
        let node = LightNode::create(
            LightNodeConfig::for_testing(),
            Arc::new(MockClient::default()),
            Account::new([1u8; 20]),
        )
        .unwrap();
        let (listener, receiver) = ChannelListener::new();
        drop(receiver);
        listener.on_peer_event(&node, PeerEvent::Discovered, Status::Success, None);
    }
}
