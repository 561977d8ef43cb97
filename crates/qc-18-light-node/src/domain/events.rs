//! # Domain Events
//!
//! The two kinds of queued events:
//! - [`ListenerEvent`]: state changes announced to application listeners.
//! - [`ProtocolResult`]: responses and announcements from the network layer,
//!   consumed by the node itself.

use super::entities::Transaction;
use super::ids::{BlockId, TransactionId, WalletId};
use super::value_objects::{
    Amount, BlockHeader, Hash, NodeState, TransactionReceipt, TransactionStatusReport,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Outcome attached to every listener event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Nothing went wrong.
    Success,
    /// A referenced wallet is not registered.
    ErrorUnknownWallet,
    /// A referenced transaction is not registered.
    ErrorUnknownTransaction,
    /// The operation needs a connected node.
    ErrorNodeNotConnected,
    /// The network reported the transaction as failed.
    ErrorTransactionFailed,
    /// The client collaborator failed.
    ErrorClient,
    /// Malformed data from the network layer.
    ErrorMalformedResult,
}

impl Status {
    /// Is this `Success`?
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

/// Node-level event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeEvent {
    /// The lifecycle state changed to the carried state.
    StateChanged(NodeState),
    /// `block_height` increased to the carried value.
    BlockHeightUpdated(u64),
}

/// Peer-level event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerEvent {
    /// A peer was discovered.
    Discovered,
    /// A peer session was established.
    Connected,
    /// A peer session ended.
    Disconnected,
}

/// Wallet-level event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletEvent {
    /// The wallet was registered.
    Created,
    /// The balance changed.
    BalanceUpdated,
    /// The default gas price changed.
    DefaultGasPriceUpdated,
    /// The default gas limit changed.
    DefaultGasLimitUpdated,
}

/// Block-level event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockEvent {
    /// The block was registered.
    Created,
    /// Header data was added to a known block.
    Chained,
}

/// Transaction-level event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionEvent {
    /// The transaction was registered.
    Created,
    /// The transaction was handed to the network.
    Submitted,
    /// The transaction was included in a block.
    Blocked,
    /// The transaction failed.
    Errored,
    /// A new gas estimate arrived.
    GasEstimateUpdated,
    /// The chain grew past the containing block.
    BlockConfirmationsUpdated,
}

/// A state change queued for delivery to every registered listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerEvent {
    /// Node lifecycle or height.
    Node {
        /// What happened.
        event: NodeEvent,
        /// Outcome.
        status: Status,
        /// Human-readable error, if any.
        error: Option<String>,
    },
    /// Peer connectivity.
    Peer {
        /// What happened.
        event: PeerEvent,
        /// Outcome.
        status: Status,
        /// Human-readable error, if any.
        error: Option<String>,
    },
    /// A wallet changed.
    Wallet {
        /// Target wallet.
        wallet: WalletId,
        /// What happened.
        event: WalletEvent,
        /// Outcome.
        status: Status,
        /// Human-readable error, if any.
        error: Option<String>,
    },
    /// A block changed.
    Block {
        /// Target block.
        block: BlockId,
        /// What happened.
        event: BlockEvent,
        /// Outcome.
        status: Status,
        /// Human-readable error, if any.
        error: Option<String>,
    },
    /// A transaction changed.
    Transaction {
        /// Owning wallet.
        wallet: WalletId,
        /// Target transaction.
        transaction: TransactionId,
        /// What happened.
        event: TransactionEvent,
        /// Outcome.
        status: Status,
        /// Human-readable error, if any.
        error: Option<String>,
    },
}

impl ListenerEvent {
    /// Successful node event.
    pub fn node(event: NodeEvent) -> Self {
        ListenerEvent::Node {
            event,
            status: Status::Success,
            error: None,
        }
    }

    /// Successful wallet event.
    pub fn wallet(wallet: WalletId, event: WalletEvent) -> Self {
        ListenerEvent::Wallet {
            wallet,
            event,
            status: Status::Success,
            error: None,
        }
    }

    /// Successful block event.
    pub fn block(block: BlockId, event: BlockEvent) -> Self {
        ListenerEvent::Block {
            block,
            event,
            status: Status::Success,
            error: None,
        }
    }

    /// Successful transaction event.
    pub fn transaction(wallet: WalletId, transaction: TransactionId, event: TransactionEvent) -> Self {
        ListenerEvent::Transaction {
            wallet,
            transaction,
            event,
            status: Status::Success,
            error: None,
        }
    }

    /// Outcome carried by the event.
    pub fn status(&self) -> Status {
        match self {
            ListenerEvent::Node { status, .. }
            | ListenerEvent::Peer { status, .. }
            | ListenerEvent::Wallet { status, .. }
            | ListenerEvent::Block { status, .. }
            | ListenerEvent::Transaction { status, .. } => *status,
        }
    }

    /// Category label for logs.
    pub fn category(&self) -> &'static str {
        match self {
            ListenerEvent::Node { .. } => "node",
            ListenerEvent::Peer { .. } => "peer",
            ListenerEvent::Wallet { .. } => "wallet",
            ListenerEvent::Block { .. } => "block",
            ListenerEvent::Transaction { .. } => "transaction",
        }
    }
}

/// One response or announcement from the network layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolResult {
    /// Balance of one asset held by the account.
    Balance(Amount),
    /// Account nonce.
    Nonce(u64),
    /// Gas price for a wallet's future transactions.
    GasPrice {
        /// Target wallet.
        wallet: WalletId,
        /// Price per gas unit.
        gas_price: U256,
    },
    /// Gas estimate for a transaction.
    GasEstimate {
        /// Owning wallet.
        wallet: WalletId,
        /// Target transaction.
        transaction: TransactionId,
        /// Estimated gas.
        gas: u64,
    },
    /// Status of a transaction, by hash.
    TransactionStatus {
        /// Transaction hash.
        hash: Hash,
        /// Reported status.
        status: TransactionStatusReport,
    },
    /// Receipt for a transaction in a block.
    TransactionReceipt {
        /// Containing block.
        block_hash: Hash,
        /// The receipt.
        receipt: TransactionReceipt,
        /// Position of the transaction in the block.
        index: u32,
    },
    /// New chain head.
    Announce {
        /// Head hash.
        head_hash: Hash,
        /// Head number.
        head_number: u64,
        /// Total difficulty at the head.
        head_total_difficulty: U256,
    },
    /// A block header.
    BlockHeader(BlockHeader),
    /// A block's transactions and ommers.
    BlockBodies {
        /// The block.
        block_hash: Hash,
        /// Contained transactions.
        transactions: Vec<Transaction>,
        /// Ommer hashes.
        ommers: Vec<Hash>,
    },
    /// The collaborator established connectivity.
    Connected,
    /// The collaborator tore connectivity down.
    Disconnected,
    /// The collaborator failed unrecoverably.
    Failure(String),
    /// Peer-level news from the collaborator.
    Peer(PeerEvent),
}

impl ProtocolResult {
    /// Kind label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProtocolResult::Balance(_) => "balance",
            ProtocolResult::Nonce(_) => "nonce",
            ProtocolResult::GasPrice { .. } => "gas_price",
            ProtocolResult::GasEstimate { .. } => "gas_estimate",
            ProtocolResult::TransactionStatus { .. } => "transaction_status",
            ProtocolResult::TransactionReceipt { .. } => "transaction_receipt",
            ProtocolResult::Announce { .. } => "announce",
            ProtocolResult::BlockHeader(_) => "block_header",
            ProtocolResult::BlockBodies { .. } => "block_bodies",
            ProtocolResult::Connected => "connected",
            ProtocolResult::Disconnected => "disconnected",
            ProtocolResult::Failure(_) => "failure",
            ProtocolResult::Peer(_) => "peer",
        }
    }
}
