//! # Inbound Ports
//!
//! Entry points the network layer calls to deliver results.

use crate::domain::{
    Amount, BlockHeader, Hash, LightNodeError, PeerEvent, ProtocolResult, Transaction,
    TransactionId, TransactionReceipt, TransactionStatusReport, WalletId,
};
use primitive_types::U256;

/// Protocol result entry points - inbound port.
///
/// Every method only enqueues; processing happens later on the node's protocol
/// handler thread, in arrival order. Safe to call from any thread, including
/// from inside a [`LightNodeClient`](super::LightNodeClient) call.
pub trait ProtocolResultSink: Send + Sync {
    /// Enqueue one result.
    fn submit_result(&self, result: ProtocolResult) -> Result<(), LightNodeError>;

    /// Balance of one asset.
    fn handle_balance(&self, amount: Amount) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::Balance(amount))
    }

    /// Account nonce.
    fn handle_nonce(&self, nonce: u64) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::Nonce(nonce))
    }

    /// Gas price for a wallet.
    fn handle_gas_price(&self, wallet: WalletId, gas_price: U256) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::GasPrice { wallet, gas_price })
    }

    /// Gas estimate for a transaction.
    fn handle_gas_estimate(
        &self,
        wallet: WalletId,
        transaction: TransactionId,
        gas: u64,
    ) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::GasEstimate {
            wallet,
            transaction,
            gas,
        })
    }

    /// Transaction status by hash.
    fn handle_transaction_status(
        &self,
        hash: Hash,
        status: TransactionStatusReport,
    ) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::TransactionStatus { hash, status })
    }

    /// Transaction receipt at `index` in `block_hash`.
    fn handle_transaction_receipt(
        &self,
        block_hash: Hash,
        receipt: TransactionReceipt,
        index: u32,
    ) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::TransactionReceipt {
            block_hash,
            receipt,
            index,
        })
    }

    /// New chain head.
    fn handle_announce(
        &self,
        head_hash: Hash,
        head_number: u64,
        head_total_difficulty: U256,
    ) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::Announce {
            head_hash,
            head_number,
            head_total_difficulty,
        })
    }

    /// Block header.
    fn handle_block_header(&self, header: BlockHeader) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::BlockHeader(header))
    }

    /// Block transactions and ommers.
    fn handle_block_bodies(
        &self,
        block_hash: Hash,
        transactions: Vec<Transaction>,
        ommers: Vec<Hash>,
    ) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::BlockBodies {
            block_hash,
            transactions,
            ommers,
        })
    }

    /// Connectivity established.
    fn handle_connected(&self) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::Connected)
    }

    /// Connectivity torn down.
    fn handle_disconnected(&self) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::Disconnected)
    }

    /// Unrecoverable collaborator failure.
    fn handle_failure(&self, description: String) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::Failure(description))
    }

    /// Peer news.
    fn handle_peer(&self, event: PeerEvent) -> Result<(), LightNodeError> {
        self.submit_result(ProtocolResult::Peer(event))
    }
}
