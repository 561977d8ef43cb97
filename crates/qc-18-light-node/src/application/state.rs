//! Shared node state guarded by the node lock.

use tracing::{info, warn};

use super::listeners::ListenerRegistry;
use crate::config::LightNodeConfig;
use crate::domain::{
    default_gas_limit, invariant_transition_allowed, Account, Asset, Block, BlockId, Hash,
    ListenerEvent, NodeEvent, NodeState, ObjectRegistry, RequestId, Status, Transaction,
    TransactionId, TransactionSlot, Wallet, WalletEvent, WalletId,
};

/// Everything behind the node lock.
pub(crate) struct NodeCore {
    pub state: NodeState,
    pub block_height: u64,
    pub request_id: RequestId,
    pub account: Account,
    pub wallets: ObjectRegistry<Wallet, WalletId>,
    pub wallet_holding_ether: WalletId,
    pub blocks: ObjectRegistry<Block, BlockId>,
    pub transactions: ObjectRegistry<TransactionSlot, TransactionId>,
    pub listeners: ListenerRegistry,
    /// Bumped on every disconnect request; a watchdog only acts on its own.
    pub session: u64,
}

impl NodeCore {
    pub fn new(config: &LightNodeConfig, account: Account) -> Self {
        let mut core = Self {
            state: NodeState::Created,
            block_height: 0,
            request_id: 0,
            account,
            wallets: ObjectRegistry::with_capacity(config.wallet_capacity),
            wallet_holding_ether: WalletId::NOT_FOUND,
            blocks: ObjectRegistry::with_capacity(config.block_capacity),
            transactions: ObjectRegistry::with_capacity(config.transaction_capacity),
            listeners: ListenerRegistry::with_capacity(config.listener_capacity),
            session: 0,
        };
        let (ether, _) = core.insert_wallet(Asset::Ether);
        core.wallet_holding_ether = ether;
        core
    }

    /// Read-and-increment the request id counter.
    pub fn next_request_id(&mut self) -> RequestId {
        let id = self.request_id;
        self.request_id = self.request_id.wrapping_add(1);
        id
    }

    /// Move to `to`, returning the node event to announce.
    ///
    /// Staying in the current state and disallowed moves return `None`.
    pub fn transition(&mut self, to: NodeState, error: Option<String>) -> Option<ListenerEvent> {
        let from = self.state;
        if from == to {
            return None;
        }
        if !invariant_transition_allowed(from, to) {
            warn!(%from, %to, "[qc-18] Rejected state transition");
            return None;
        }

        self.state = to;
        info!(%from, %to, "[qc-18] Node state changed");
        let status = if error.is_some() {
            Status::ErrorClient
        } else {
            Status::Success
        };
        Some(ListenerEvent::Node {
            event: NodeEvent::StateChanged(to),
            status,
            error,
        })
    }

    /// Wallet for `asset`, created if new.
    pub fn insert_wallet(&mut self, asset: Asset) -> (WalletId, bool) {
        let wallet = Wallet::new(asset, self.account.primary_address, default_gas_limit(asset));
        self.wallets.insert_with_status(wallet)
    }

    /// Like [`insert_wallet`](Self::insert_wallet), pushing the `Created`
    /// event onto `events` when the wallet is new.
    pub fn ensure_wallet(&mut self, asset: Asset, events: &mut Vec<ListenerEvent>) -> WalletId {
        let (wallet, created) = self.insert_wallet(asset);
        if created {
            events.push(ListenerEvent::wallet(wallet, WalletEvent::Created));
        }
        wallet
    }

    /// Hand `transaction` to `wallet` and index it.
    ///
    /// A hash that is already indexed returns the existing id and leaves the
    /// owner untouched. `None` if the wallet is unknown or the transaction
    /// registry is full; the wallet is left untouched then too.
    pub fn insert_transaction(
        &mut self,
        wallet: WalletId,
        transaction: Transaction,
    ) -> Option<(TransactionId, bool)> {
        let existing = self.transactions.lookup_id(&transaction.hash);
        if existing.is_valid() {
            return Some((existing, false));
        }

        let hash = transaction.hash;
        let owner = self.wallets.get_mut(wallet)?;
        if self.transactions.is_full() {
            warn!(%wallet, "[qc-18] Transaction registry exhausted");
            return None;
        }
        let position = owner.add_transaction(transaction);
        let (id, created) = self.transactions.insert_with_status(TransactionSlot {
            hash,
            wallet,
            position,
        });
        Some((id, created))
    }

    /// Owning wallet of `transaction`, or the sentinel.
    pub fn wallet_of(&self, transaction: TransactionId) -> WalletId {
        self.transactions
            .get(transaction)
            .map_or(WalletId::NOT_FOUND, |slot| slot.wallet)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        let slot = self.transactions.get(id)?;
        self.wallets.get(slot.wallet)?.transaction(slot.position)
    }

    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        let slot = self.transactions.get(id)?;
        let position = slot.position;
        self.wallets.get_mut(slot.wallet)?.transaction_mut(position)
    }

    /// Change the identity hash of `id`, keeping the id.
    pub fn rekey_transaction(&mut self, id: TransactionId, hash: Hash) -> bool {
        if !self.transactions.rekey(id, hash) {
            return false;
        }
        match self.transaction_mut(id) {
            Some(transaction) => {
                transaction.hash = hash;
                true
            }
            None => false,
        }
    }

    /// Ids of `wallet`'s transactions, in the order the wallet learned them.
    pub fn wallet_transactions(&self, wallet: WalletId) -> Option<Vec<TransactionId>> {
        let wallet = self.wallets.get(wallet)?;
        Some(
            wallet
                .transactions()
                .iter()
                .map(|t| self.transactions.lookup_id(&t.hash))
                .collect(),
        )
    }
}
