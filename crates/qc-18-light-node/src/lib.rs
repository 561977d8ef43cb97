//! # QC-18 Light Node
//!
//! Coordinating core of a light client: owns the client's view of the
//! account, its wallets, blocks and transactions, and bridges the network
//! layer to the application.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The network layer delivers unordered, concurrent results (chain heads,
//! balances, receipts, block data). The application wants ordered callbacks
//! that never run on a network thread. The light node sits in between:
//! - One lock over all shared state
//! - Identity-indexed registries for wallets, blocks and transactions
//! - A protocol result queue with its own thread, applying results in order
//! - A listener queue with its own thread, delivering events in order
//!
//! ## Lifecycle
//!
//! | State | Left by |
//! |-------|---------|
//! | Created | `connect()` |
//! | Connecting | `handle_connected()`, `disconnect()`, client failure |
//! | Connected | `disconnect()`, client failure, connection loss |
//! | Disconnecting | `handle_disconnected()` or the disconnect timeout |
//! | Disconnected | `connect()` |
//! | Errored | `connect()` |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-light-node/
//! ├── domain/          # Ids, entities, registries, events, errors, invariants
//! ├── ports/           # Result sink (inbound) + client and listener (outbound)
//! ├── application/     # LightNode, protocol result handlers, listener dispatch
//! ├── adapters/        # ChannelListener
//! ├── config.rs        # LightNodeConfig
//! └── telemetry.rs     # tracing-subscriber setup
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

// Re-exports
pub use adapters::ChannelListener;
pub use application::{LightNode, ListenerRegistry};
pub use config::LightNodeConfig;
pub use domain::{
    Account, Address, Amount, Asset, Block, BlockEvent, BlockHeader, BlockId, ClientError, Hash,
    LightNodeError, ListenerEvent, ListenerId, Network, NodeEvent, NodeState, NodeType, PeerEvent,
    ProtocolResult, RequestId, SignedTransaction, Status, Transaction, TransactionEvent,
    TransactionId, TransactionReceipt, TransactionStatus, TransactionStatusReport, Wallet,
    WalletEvent, WalletId,
};
pub use ports::{
    ClientRequest, LightNodeClient, LightNodeListener, MockClient, ProtocolResultSink,
};
pub use shared_bus::{DispatchStats, ShutdownPolicy};
pub use telemetry::{init_tracing, TelemetryConfig, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
