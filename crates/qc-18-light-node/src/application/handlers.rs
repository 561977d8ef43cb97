//! # Protocol Result Handlers
//!
//! Applies one [`ProtocolResult`] to the node state. Runs on the protocol
//! result thread: mutations happen under the node lock, the resulting
//! listener events are queued after it is released.

use primitive_types::U256;
use tracing::{debug, warn};

use super::node::LightNode;
use super::state::NodeCore;
use crate::domain::{
    hash_prefix, Amount, Block, BlockEvent, BlockHeader, Hash, ListenerEvent, NodeEvent, NodeState,
    ProtocolResult, Status, Transaction, TransactionEvent, TransactionId, TransactionReceipt,
    TransactionStatus, TransactionStatusReport, WalletEvent, WalletId,
};

impl LightNode {
    pub(super) fn process_result(&self, result: ProtocolResult) {
        let kind = result.kind();
        let events = {
            let mut core = self.lock();
            match result {
                ProtocolResult::Balance(amount) => on_balance(&mut core, amount),
                ProtocolResult::Nonce(nonce) => on_nonce(&mut core, nonce),
                ProtocolResult::GasPrice { wallet, gas_price } => {
                    on_gas_price(&mut core, wallet, gas_price)
                }
                ProtocolResult::GasEstimate {
                    wallet,
                    transaction,
                    gas,
                } => on_gas_estimate(&mut core, wallet, transaction, gas),
                ProtocolResult::TransactionStatus { hash, status } => {
                    on_transaction_status(&mut core, hash, status)
                }
                ProtocolResult::TransactionReceipt {
                    block_hash,
                    receipt,
                    index,
                } => on_transaction_receipt(&mut core, block_hash, receipt, index),
                ProtocolResult::Announce {
                    head_hash,
                    head_number,
                    head_total_difficulty,
                } => on_announce(&mut core, head_hash, head_number, head_total_difficulty),
                ProtocolResult::BlockHeader(header) => on_block_header(&mut core, &header),
                ProtocolResult::BlockBodies {
                    block_hash,
                    transactions,
                    ommers,
                } => on_block_bodies(&mut core, block_hash, transactions, ommers),
                ProtocolResult::Connected => self.on_connected(&mut core),
                ProtocolResult::Disconnected => self.on_disconnected(&mut core),
                ProtocolResult::Failure(reason) => self.on_failure(&mut core, reason),
                ProtocolResult::Peer(event) => vec![ListenerEvent::Peer {
                    event,
                    status: Status::Success,
                    error: None,
                }],
            }
        };

        debug!(kind, events = events.len(), "[qc-18] Protocol result applied");
        self.announce_all(events);
    }

    fn on_connected(&self, core: &mut NodeCore) -> Vec<ListenerEvent> {
        if core.state != NodeState::Connecting {
            debug!(state = %core.state, "[qc-18] Stale connect confirmation ignored");
            return Vec::new();
        }
        self.inner
            .transition(core, NodeState::Connected, None)
            .into_iter()
            .collect()
    }

    fn on_disconnected(&self, core: &mut NodeCore) -> Vec<ListenerEvent> {
        let event = match core.state {
            NodeState::Disconnecting => self.inner.transition(core, NodeState::Disconnected, None),
            NodeState::Connected | NodeState::Connecting => {
                warn!(state = %core.state, "[qc-18] Connection lost");
                self.inner
                    .transition(core, NodeState::Errored, Some("connection lost".to_string()))
            }
            state => {
                debug!(%state, "[qc-18] Stale disconnect acknowledgement ignored");
                None
            }
        };
        event.into_iter().collect()
    }

    fn on_failure(&self, core: &mut NodeCore, reason: String) -> Vec<ListenerEvent> {
        if !matches!(core.state, NodeState::Connecting | NodeState::Connected) {
            warn!(state = %core.state, %reason, "[qc-18] Client failure outside a session ignored");
            return Vec::new();
        }
        warn!(%reason, "[qc-18] Client failed");
        self.inner
            .transition(core, NodeState::Errored, Some(reason))
            .into_iter()
            .collect()
    }
}

fn wallet_error(wallet: WalletId, event: WalletEvent, error: String) -> ListenerEvent {
    warn!(%wallet, %error, "[qc-18] Malformed wallet result");
    ListenerEvent::Wallet {
        wallet,
        event,
        status: Status::ErrorUnknownWallet,
        error: Some(error),
    }
}

fn transaction_error(
    wallet: WalletId,
    transaction: TransactionId,
    event: TransactionEvent,
    status: Status,
    error: String,
) -> ListenerEvent {
    warn!(%wallet, %transaction, %error, "[qc-18] Transaction result rejected");
    ListenerEvent::Transaction {
        wallet,
        transaction,
        event,
        status,
        error: Some(error),
    }
}

fn on_balance(core: &mut NodeCore, amount: Amount) -> Vec<ListenerEvent> {
    let mut events = Vec::new();
    let wallet = core.ensure_wallet(amount.asset, &mut events);
    match core.wallets.get_mut(wallet) {
        Some(w) => {
            w.set_balance(amount.value);
            events.push(ListenerEvent::wallet(wallet, WalletEvent::BalanceUpdated));
        }
        None => warn!(asset = ?amount.asset, "[qc-18] Balance dropped; wallet registry full"),
    }
    events
}

fn on_nonce(core: &mut NodeCore, nonce: u64) -> Vec<ListenerEvent> {
    debug!(nonce, "[qc-18] Account nonce updated");
    core.account.set_nonce(nonce);
    Vec::new()
}

fn on_gas_price(core: &mut NodeCore, wallet: WalletId, gas_price: U256) -> Vec<ListenerEvent> {
    let Some(w) = core.wallets.get_mut(wallet) else {
        return vec![wallet_error(
            wallet,
            WalletEvent::DefaultGasPriceUpdated,
            format!("gas price for unknown {}", wallet),
        )];
    };
    w.set_default_gas_price(gas_price);
    vec![ListenerEvent::wallet(wallet, WalletEvent::DefaultGasPriceUpdated)]
}

fn on_gas_estimate(
    core: &mut NodeCore,
    wallet: WalletId,
    transaction: TransactionId,
    gas: u64,
) -> Vec<ListenerEvent> {
    let event = TransactionEvent::GasEstimateUpdated;
    if core.wallets.get(wallet).is_none() {
        return vec![transaction_error(
            wallet,
            transaction,
            event,
            Status::ErrorUnknownWallet,
            format!("gas estimate for unknown {}", wallet),
        )];
    }
    if core.wallet_of(transaction) != wallet {
        return vec![transaction_error(
            wallet,
            transaction,
            event,
            Status::ErrorUnknownTransaction,
            format!("gas estimate for {} not owned by {}", transaction, wallet),
        )];
    }

    if let Some(t) = core.transaction_mut(transaction) {
        t.gas_estimate = Some(gas);
    }
    vec![ListenerEvent::transaction(wallet, transaction, event)]
}

fn on_transaction_status(
    core: &mut NodeCore,
    hash: Hash,
    report: TransactionStatusReport,
) -> Vec<ListenerEvent> {
    if report == TransactionStatusReport::Unknown {
        debug!(hash = %hash_prefix(&hash), "[qc-18] Transaction status unknown to peer");
        return Vec::new();
    }

    let mut events = Vec::new();
    let mut transaction = core.transactions.lookup_id(&hash);
    if !transaction.is_valid() {
        let ether = core.wallet_holding_ether;
        match core.insert_transaction(ether, Transaction::placeholder(hash)) {
            Some((id, _)) => {
                events.push(ListenerEvent::transaction(ether, id, TransactionEvent::Created));
                transaction = id;
            }
            None => return events,
        }
    }
    let wallet = core.wallet_of(transaction);

    let (status, event, outcome, error) = match report {
        TransactionStatusReport::Queued | TransactionStatusReport::Pending => (
            TransactionStatus::Pending,
            TransactionEvent::Submitted,
            Status::Success,
            None,
        ),
        TransactionStatusReport::Included {
            block_hash,
            block_number,
            transaction_index,
        } => {
            let (block, created) = core.blocks.insert_with_status(Block::new(block_hash));
            match core.blocks.get_mut(block) {
                Some(b) => {
                    b.number.get_or_insert(block_number);
                    if created {
                        events.push(ListenerEvent::block(block, BlockEvent::Created));
                    }
                }
                None => warn!(
                    block = %hash_prefix(&block_hash),
                    "[qc-18] Containing block not registered; registry full"
                ),
            }
            (
                TransactionStatus::Included {
                    block_hash,
                    block_number: Some(block_number),
                    transaction_index,
                },
                TransactionEvent::Blocked,
                Status::Success,
                None,
            )
        }
        TransactionStatusReport::Error { reason } => (
            TransactionStatus::Errored {
                reason: reason.clone(),
            },
            TransactionEvent::Errored,
            Status::ErrorTransactionFailed,
            Some(reason),
        ),
        TransactionStatusReport::Unknown => return events,
    };

    if let Some(t) = core.transaction_mut(transaction) {
        t.status = status;
    }
    events.push(ListenerEvent::Transaction {
        wallet,
        transaction,
        event,
        status: outcome,
        error,
    });
    events
}

fn on_transaction_receipt(
    core: &mut NodeCore,
    block_hash: Hash,
    receipt: TransactionReceipt,
    index: u32,
) -> Vec<ListenerEvent> {
    let mut events = Vec::new();
    let (block, created) = core.blocks.insert_with_status(Block::new(block_hash));
    let Some(b) = core.blocks.get_mut(block) else {
        warn!(block = %hash_prefix(&block_hash), "[qc-18] Receipt dropped; block registry full");
        return events;
    };
    b.attach_receipt(index, receipt.clone());
    if created {
        events.push(ListenerEvent::block(block, BlockEvent::Created));
    }

    let transaction = core.transactions.lookup_id(&receipt.transaction_hash);
    let wallet = core.wallet_of(transaction);
    let Some(t) = core.transaction_mut(transaction) else {
        debug!(
            transaction = %hash_prefix(&receipt.transaction_hash),
            "[qc-18] Receipt for an untracked transaction"
        );
        return events;
    };

    t.gas_used = Some(receipt.gas_used);
    if receipt.succeeded {
        t.status = TransactionStatus::Included {
            block_hash,
            block_number: Some(receipt.block_number),
            transaction_index: index,
        };
        events.push(ListenerEvent::transaction(wallet, transaction, TransactionEvent::Blocked));
    } else {
        let reason = "execution failed".to_string();
        t.status = TransactionStatus::Errored {
            reason: reason.clone(),
        };
        events.push(ListenerEvent::Transaction {
            wallet,
            transaction,
            event: TransactionEvent::Errored,
            status: Status::ErrorTransactionFailed,
            error: Some(reason),
        });
    }
    events
}

fn on_announce(
    core: &mut NodeCore,
    head_hash: Hash,
    head_number: u64,
    head_total_difficulty: U256,
) -> Vec<ListenerEvent> {
    if head_number <= core.block_height {
        debug!(
            head_number,
            block_height = core.block_height,
            "[qc-18] Stale announcement ignored"
        );
        return Vec::new();
    }

    core.block_height = head_number;
    debug!(
        head = %hash_prefix(&head_hash),
        head_number,
        total_difficulty = %head_total_difficulty,
        "[qc-18] Chain head advanced"
    );

    let mut events = vec![ListenerEvent::node(NodeEvent::BlockHeightUpdated(head_number))];
    for (transaction, slot) in core.transactions.iter() {
        let included = core
            .wallets
            .get(slot.wallet)
            .and_then(|w| w.transaction(slot.position))
            .is_some_and(|t| t.status.block_number().is_some());
        if included {
            events.push(ListenerEvent::transaction(
                slot.wallet,
                transaction,
                TransactionEvent::BlockConfirmationsUpdated,
            ));
        }
    }
    events
}

fn on_block_header(core: &mut NodeCore, header: &BlockHeader) -> Vec<ListenerEvent> {
    let existing = core.blocks.lookup_id(&header.hash);
    let (block, event) = match core.blocks.get_mut(existing) {
        Some(b) => {
            if let Some(known) = b.number.filter(|&n| n != header.number) {
                let error = format!(
                    "header number {} conflicts with known number {}",
                    header.number, known
                );
                warn!(block = %hash_prefix(&header.hash), %error, "[qc-18] Block header rejected");
                return vec![ListenerEvent::Block {
                    block: existing,
                    event: BlockEvent::Chained,
                    status: Status::ErrorMalformedResult,
                    error: Some(error),
                }];
            }
            b.apply_header(header);
            (existing, BlockEvent::Chained)
        }
        None => {
            let block = core.blocks.insert(Block::from_header(header));
            if !block.is_valid() {
                warn!(block = %hash_prefix(&header.hash), "[qc-18] Header dropped; block registry full");
                return Vec::new();
            }
            (block, BlockEvent::Created)
        }
    };

    // Bodies may have arrived before the header; fill in the block number.
    let hashes = core
        .blocks
        .get(block)
        .map(|b| b.transactions.clone())
        .unwrap_or_default();
    for hash in hashes {
        let transaction = core.transactions.lookup_id(&hash);
        if let Some(t) = core.transaction_mut(transaction) {
            if let TransactionStatus::Included {
                block_hash,
                block_number,
                ..
            } = &mut t.status
            {
                if *block_hash == header.hash {
                    *block_number = Some(header.number);
                }
            }
        }
    }

    vec![ListenerEvent::block(block, event)]
}

fn on_block_bodies(
    core: &mut NodeCore,
    block_hash: Hash,
    transactions: Vec<Transaction>,
    ommers: Vec<Hash>,
) -> Vec<ListenerEvent> {
    let mut events = Vec::new();
    let (block, created) = core.blocks.insert_with_status(Block::new(block_hash));
    let Some(b) = core.blocks.get_mut(block) else {
        warn!(block = %hash_prefix(&block_hash), "[qc-18] Bodies dropped; block registry full");
        return events;
    };
    b.apply_bodies(transactions.iter().map(|t| t.hash).collect(), ommers);
    let block_number = b.number;
    if created {
        events.push(ListenerEvent::block(block, BlockEvent::Created));
    }

    for (index, mut transaction) in transactions.into_iter().enumerate() {
        let included = TransactionStatus::Included {
            block_hash,
            block_number,
            transaction_index: index as u32,
        };

        let existing = core.transactions.lookup_id(&transaction.hash);
        let (wallet, id) = if existing.is_valid() {
            if let Some(t) = core.transaction_mut(existing) {
                t.status = included;
            }
            (core.wallet_of(existing), existing)
        } else {
            let wallet = core.ensure_wallet(transaction.amount.asset, &mut events);
            let hash = transaction.hash;
            transaction.status = included;
            match core.insert_transaction(wallet, transaction) {
                Some((id, _)) => (wallet, id),
                None => {
                    warn!(
                        transaction = %hash_prefix(&hash),
                        "[qc-18] Block transaction dropped; registry full"
                    );
                    continue;
                }
            }
        };
        events.push(ListenerEvent::transaction(wallet, id, TransactionEvent::Blocked));
    }
    events
}
