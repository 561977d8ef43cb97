//! # Domain Entities
//!
//! Account, wallets, blocks and transactions as seen by the light node.
//! Wallets own their transactions; blocks only record hashes.

use super::value_objects::{
    Address, Amount, Asset, BlockHeader, Hash, TransactionReceipt, TransactionStatus,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;

/// The account whose wallets the node manages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Primary address.
    pub primary_address: Address,
    /// Next nonce to use for a locally created transaction.
    nonce: u64,
}

impl Account {
    /// Create an account with nonce zero.
    pub fn new(primary_address: Address) -> Self {
        Self {
            primary_address,
            nonce: 0,
        }
    }

    /// Current nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Replace the nonce with the network's value.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    /// Return the current nonce and advance it.
    ///
    /// `None` once the nonce space is used up; the nonce is left unchanged.
    pub fn take_nonce(&mut self) -> Option<u64> {
        let nonce = self.nonce;
        self.nonce = nonce.checked_add(1)?;
        Some(nonce)
    }
}

/// A transaction of interest to one wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identity. Provisional until the signed hash is known.
    pub hash: Hash,
    /// Sender.
    pub source: Address,
    /// Recipient.
    pub target: Address,
    /// Value transferred, including which asset.
    pub amount: Amount,
    /// Gas price offered.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Latest gas estimate from the network.
    pub gas_estimate: Option<u64>,
    /// Gas actually used, from the receipt.
    pub gas_used: Option<u64>,
    /// Sender nonce.
    pub nonce: u64,
    /// Progress.
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a local, unsigned transaction with a provisional hash.
    pub fn new(
        source: Address,
        target: Address,
        amount: Amount,
        gas_price: U256,
        gas_limit: u64,
        nonce: u64,
    ) -> Self {
        let hash = Self::provisional_hash(&source, &target, &amount, nonce);
        Self {
            hash,
            source,
            target,
            amount,
            gas_price,
            gas_limit,
            gas_estimate: None,
            gas_used: None,
            nonce,
            status: TransactionStatus::Created,
        }
    }

    /// A transaction learned from the network.
    pub fn observed(hash: Hash, source: Address, target: Address, amount: Amount, nonce: u64) -> Self {
        Self {
            hash,
            source,
            target,
            amount,
            gas_price: U256::zero(),
            gas_limit: 0,
            gas_estimate: None,
            gas_used: None,
            nonce,
            status: TransactionStatus::Unknown,
        }
    }

    /// A transaction known only by hash (e.g. from a status report).
    pub fn placeholder(hash: Hash) -> Self {
        Self::observed(hash, [0u8; 20], [0u8; 20], Amount::ether(U256::zero()), 0)
    }

    /// Keccak-256 over the fields that make a local transaction unique.
    pub fn provisional_hash(source: &Address, target: &Address, amount: &Amount, nonce: u64) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(source);
        hasher.update(target);
        match amount.asset {
            Asset::Ether => hasher.update([0u8]),
            Asset::Token(contract) => {
                hasher.update([1u8]);
                hasher.update(contract);
            }
        }
        let mut value = [0u8; 32];
        amount.value.to_big_endian(&mut value);
        hasher.update(value);
        hasher.update(nonce.to_be_bytes());
        hasher.finalize().into()
    }

    /// Confirmations at `block_height`, if included.
    pub fn confirmations(&self, block_height: u64) -> Option<u64> {
        let number = self.status.block_number()?;
        Some(block_height.saturating_sub(number) + 1)
    }
}

/// A balance-holding unit for one asset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wallet {
    asset: Asset,
    address: Address,
    balance: U256,
    default_gas_price: U256,
    default_gas_limit: u64,
    transactions: Vec<Transaction>,
}

impl Wallet {
    /// Create an empty wallet for `asset` owned by `address`.
    pub fn new(asset: Asset, address: Address, default_gas_limit: u64) -> Self {
        Self {
            asset,
            address,
            balance: U256::zero(),
            default_gas_price: U256::zero(),
            default_gas_limit,
            transactions: Vec::new(),
        }
    }

    /// Held asset.
    pub fn asset(&self) -> Asset {
        self.asset
    }

    /// Owner address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Balance as an amount of the held asset.
    pub fn balance(&self) -> Amount {
        Amount {
            asset: self.asset,
            value: self.balance,
        }
    }

    /// Set the balance.
    pub fn set_balance(&mut self, value: U256) {
        self.balance = value;
    }

    /// Default gas price for new transactions.
    pub fn default_gas_price(&self) -> U256 {
        self.default_gas_price
    }

    /// Set the default gas price.
    pub fn set_default_gas_price(&mut self, price: U256) {
        self.default_gas_price = price;
    }

    /// Default gas limit for new transactions.
    pub fn default_gas_limit(&self) -> u64 {
        self.default_gas_limit
    }

    /// Set the default gas limit.
    pub fn set_default_gas_limit(&mut self, limit: u64) {
        self.default_gas_limit = limit;
    }

    /// Take ownership of a transaction; returns its position in this wallet.
    pub fn add_transaction(&mut self, transaction: Transaction) -> usize {
        self.transactions.push(transaction);
        self.transactions.len() - 1
    }

    /// Transaction at `position`.
    pub fn transaction(&self, position: usize) -> Option<&Transaction> {
        self.transactions.get(position)
    }

    /// Mutable transaction at `position`.
    pub fn transaction_mut(&mut self, position: usize) -> Option<&mut Transaction> {
        self.transactions.get_mut(position)
    }

    /// All owned transactions, in the order learned.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

/// A block referenced by some transaction or receipt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block hash.
    pub hash: Hash,
    /// Block number, once known.
    pub number: Option<u64>,
    /// Parent hash, once the header is known.
    pub parent_hash: Option<Hash>,
    /// Timestamp, once the header is known.
    pub timestamp: Option<u64>,
    /// Transaction hashes from the block body.
    pub transactions: Vec<Hash>,
    /// Ommer hashes from the block body.
    pub ommers: Vec<Hash>,
    /// Receipts by transaction index.
    pub receipts: BTreeMap<u32, TransactionReceipt>,
}

impl Block {
    /// A block known only by hash.
    pub fn new(hash: Hash) -> Self {
        Self {
            hash,
            ..Default::default()
        }
    }

    /// A block built from its header.
    pub fn from_header(header: &BlockHeader) -> Self {
        let mut block = Self::new(header.hash);
        block.apply_header(header);
        block
    }

    /// Fill in header fields.
    pub fn apply_header(&mut self, header: &BlockHeader) {
        self.number = Some(header.number);
        self.parent_hash = Some(header.parent_hash);
        self.timestamp = Some(header.timestamp);
    }

    /// Replace body contents.
    pub fn apply_bodies(&mut self, transactions: Vec<Hash>, ommers: Vec<Hash>) {
        self.transactions = transactions;
        self.ommers = ommers;
    }

    /// Attach a receipt at `index`, replacing any previous one.
    pub fn attach_receipt(&mut self, index: u32, receipt: TransactionReceipt) {
        if self.number.is_none() {
            self.number = Some(receipt.block_number);
        }
        self.receipts.insert(index, receipt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_nonce() {
        let mut account = Account::new([1u8; 20]);
        assert_eq!(account.take_nonce(), Some(0));
        assert_eq!(account.take_nonce(), Some(1));
        account.set_nonce(10);
        assert_eq!(account.nonce(), 10);
    }

    #[test]
    fn test_account_nonce_exhausted() {
        let mut account = Account::new([1u8; 20]);
        account.set_nonce(u64::MAX - 1);
        assert_eq!(account.take_nonce(), Some(u64::MAX - 1));
        assert_eq!(account.take_nonce(), None);
        assert_eq!(account.take_nonce(), None);
        assert_eq!(account.nonce(), u64::MAX);
    }

    #[test]
    fn test_provisional_hash_depends_on_nonce() {
        let amount = Amount::ether(U256::from(5));
        let a = Transaction::new([1u8; 20], [2u8; 20], amount, U256::one(), 21_000, 0);
        let b = Transaction::new([1u8; 20], [2u8; 20], amount, U256::one(), 21_000, 1);
        assert_ne!(a.hash, b.hash);
        assert_eq!(a.status, TransactionStatus::Created);
    }

    #[test]
    fn test_provisional_hash_depends_on_asset() {
        let ether = Amount::ether(U256::from(5));
        let token = Amount::token([9u8; 20], U256::from(5));
        assert_ne!(
            Transaction::provisional_hash(&[1u8; 20], &[2u8; 20], &ether, 0),
            Transaction::provisional_hash(&[1u8; 20], &[2u8; 20], &token, 0)
        );
    }

    #[test]
    fn test_confirmations() {
        let mut tx = Transaction::placeholder([7u8; 32]);
        assert_eq!(tx.confirmations(100), None);
        tx.status = TransactionStatus::Included {
            block_hash: [1u8; 32],
            block_number: Some(95),
            transaction_index: 0,
        };
        assert_eq!(tx.confirmations(100), Some(6));
        assert_eq!(tx.confirmations(95), Some(1));

        tx.status = TransactionStatus::Included {
            block_hash: [1u8; 32],
            block_number: None,
            transaction_index: 0,
        };
        assert_eq!(tx.confirmations(100), None);
    }

    #[test]
    fn test_wallet_owns_transactions() {
        let mut wallet = Wallet::new(Asset::Ether, [1u8; 20], 21_000);
        let position = wallet.add_transaction(Transaction::placeholder([3u8; 32]));
        assert_eq!(position, 0);
        assert_eq!(wallet.transaction(0).unwrap().hash, [3u8; 32]);
        assert!(wallet.transaction(1).is_none());
        assert_eq!(wallet.balance().value, U256::zero());
    }

    #[test]
    fn test_block_receipt_sets_number() {
        let mut block = Block::new([5u8; 32]);
        block.attach_receipt(
            2,
            TransactionReceipt {
                transaction_hash: [6u8; 32],
                block_number: 42,
                gas_used: 21_000,
                succeeded: true,
            },
        );
        assert_eq!(block.number, Some(42));
        assert!(block.receipts.contains_key(&2));
    }
}
