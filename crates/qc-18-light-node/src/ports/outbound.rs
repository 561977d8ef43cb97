//! # Outbound Ports
//!
//! Collaborators the node calls out to:
//! - [`LightNodeClient`]: the network/protocol layer.
//! - [`LightNodeListener`]: application callbacks.

use crate::application::LightNode;
use crate::domain::{
    Address, Asset, BlockEvent, BlockId, ClientError, NodeEvent, PeerEvent, RequestId, Status,
    Transaction, TransactionEvent, TransactionId, WalletEvent, WalletId,
};
use parking_lot::Mutex;

/// Network/protocol collaborator.
///
/// Every call only initiates work and must return promptly; results come back
/// asynchronously through [`ProtocolResultSink`](super::ProtocolResultSink),
/// correlated by `request_id`.
pub trait LightNodeClient: Send + Sync {
    /// Begin establishing connectivity. Confirm with `handle_connected()`.
    fn connect(&self, request_id: RequestId) -> Result<(), ClientError>;

    /// Begin tearing connectivity down. Acknowledge with `handle_disconnected()`.
    fn disconnect(&self, request_id: RequestId) -> Result<(), ClientError>;

    /// Fetch the balance of `asset` held by `address`.
    fn get_balance(
        &self,
        wallet: WalletId,
        address: Address,
        asset: Asset,
        request_id: RequestId,
    ) -> Result<(), ClientError>;

    /// Fetch the account nonce.
    fn get_nonce(&self, address: Address, request_id: RequestId) -> Result<(), ClientError>;

    /// Fetch the current gas price for a wallet.
    fn get_gas_price(&self, wallet: WalletId, request_id: RequestId) -> Result<(), ClientError>;

    /// Estimate gas for a transaction.
    fn estimate_gas(
        &self,
        wallet: WalletId,
        transaction_id: TransactionId,
        transaction: &Transaction,
        request_id: RequestId,
    ) -> Result<(), ClientError>;

    /// Submit a signed transaction.
    fn submit_transaction(
        &self,
        wallet: WalletId,
        transaction_id: TransactionId,
        raw: &[u8],
        request_id: RequestId,
    ) -> Result<(), ClientError>;
}

/// Application listener.
///
/// Five independent capabilities; each defaults to doing nothing, so a
/// listener only implements the categories it cares about. Callbacks run on
/// the node's listener dispatch thread, never on the thread that caused the
/// event, and may call back into the node.
#[allow(unused_variables)]
pub trait LightNodeListener: Send + Sync {
    /// Node lifecycle and height events.
    fn on_node_event(&self, node: &LightNode, event: NodeEvent, status: Status, error: Option<&str>) {}

    /// Peer events.
    fn on_peer_event(&self, node: &LightNode, event: PeerEvent, status: Status, error: Option<&str>) {}

    /// Wallet events.
    fn on_wallet_event(
        &self,
        node: &LightNode,
        wallet: WalletId,
        event: WalletEvent,
        status: Status,
        error: Option<&str>,
    ) {
    }

    /// Block events.
    fn on_block_event(
        &self,
        node: &LightNode,
        block: BlockId,
        event: BlockEvent,
        status: Status,
        error: Option<&str>,
    ) {
    }

    /// Transaction events.
    fn on_transaction_event(
        &self,
        node: &LightNode,
        wallet: WalletId,
        transaction: TransactionId,
        event: TransactionEvent,
        status: Status,
        error: Option<&str>,
    ) {
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A request recorded by [`MockClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientRequest {
    /// `connect`
    Connect(RequestId),
    /// `disconnect`
    Disconnect(RequestId),
    /// `get_balance`
    GetBalance {
        /// Target wallet.
        wallet: WalletId,
        /// Asset queried.
        asset: Asset,
        /// Correlation id.
        request_id: RequestId,
    },
    /// `get_nonce`
    GetNonce(RequestId),
    /// `get_gas_price`
    GetGasPrice {
        /// Target wallet.
        wallet: WalletId,
        /// Correlation id.
        request_id: RequestId,
    },
    /// `estimate_gas`
    EstimateGas {
        /// Owning wallet.
        wallet: WalletId,
        /// Target transaction.
        transaction: TransactionId,
        /// Correlation id.
        request_id: RequestId,
    },
    /// `submit_transaction`
    Submit {
        /// Owning wallet.
        wallet: WalletId,
        /// Target transaction.
        transaction: TransactionId,
        /// Raw bytes submitted.
        raw: Vec<u8>,
        /// Correlation id.
        request_id: RequestId,
    },
}

/// Client that records every request and answers nothing.
#[derive(Default)]
pub struct MockClient {
    /// Requests in call order.
    pub requests: Mutex<Vec<ClientRequest>>,
    /// When set, every call fails with this error.
    pub fail_with: Mutex<Option<ClientError>>,
}

impl MockClient {
    /// Make every subsequent call fail with `error`.
    pub fn fail_with(&self, error: ClientError) {
        *self.fail_with.lock() = Some(error);
    }

    /// Snapshot of recorded requests.
    pub fn recorded(&self) -> Vec<ClientRequest> {
        self.requests.lock().clone()
    }

    fn record(&self, request: ClientRequest) -> Result<(), ClientError> {
        if let Some(err) = self.fail_with.lock().clone() {
            return Err(err);
        }
        self.requests.lock().push(request);
        Ok(())
    }
}

impl LightNodeClient for MockClient {
    fn connect(&self, request_id: RequestId) -> Result<(), ClientError> {
        self.record(ClientRequest::Connect(request_id))
    }

    fn disconnect(&self, request_id: RequestId) -> Result<(), ClientError> {
        self.record(ClientRequest::Disconnect(request_id))
    }

    fn get_balance(
        &self,
        wallet: WalletId,
        _address: Address,
        asset: Asset,
        request_id: RequestId,
    ) -> Result<(), ClientError> {
        self.record(ClientRequest::GetBalance {
            wallet,
            asset,
            request_id,
        })
    }

    fn get_nonce(&self, _address: Address, request_id: RequestId) -> Result<(), ClientError> {
        self.record(ClientRequest::GetNonce(request_id))
    }

    fn get_gas_price(&self, wallet: WalletId, request_id: RequestId) -> Result<(), ClientError> {
        self.record(ClientRequest::GetGasPrice { wallet, request_id })
    }

    fn estimate_gas(
        &self,
        wallet: WalletId,
        transaction_id: TransactionId,
        _transaction: &Transaction,
        request_id: RequestId,
    ) -> Result<(), ClientError> {
        self.record(ClientRequest::EstimateGas {
            wallet,
            transaction: transaction_id,
            request_id,
        })
    }

    fn submit_transaction(
        &self,
        wallet: WalletId,
        transaction_id: TransactionId,
        raw: &[u8],
        request_id: RequestId,
    ) -> Result<(), ClientError> {
        self.record(ClientRequest::Submit {
            wallet,
            transaction: transaction_id,
            raw: raw.to_vec(),
            request_id,
        })
    }
}
