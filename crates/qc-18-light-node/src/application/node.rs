//! # Light Node Coordinator
//!
//! [`LightNode`] owns the registries, the lifecycle state machine and the two
//! dispatch queues. All shared state sits behind one lock; the client and
//! the listeners are only ever called with that lock released.
//!
//! ## Threads
//!
//! - Caller threads: public API.
//! - Network threads: [`ProtocolResultSink`] entry points (enqueue only).
//! - `qc-18-results`: applies protocol results in arrival order.
//! - `qc-18-listeners`: delivers listener events in announcement order.
//! - `qc-18-disconnect`: short-lived watchdog per disconnect request.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};
use primitive_types::U256;
use shared_bus::{DispatchStats, EventPublisher, EventQueue};
use tracing::{debug, info, warn};

use super::listeners;
use super::state::NodeCore;
use crate::config::LightNodeConfig;
use crate::domain::{
    Account, Address, Amount, Asset, Block, BlockEvent, BlockId, ClientError, Hash, LightNodeError,
    ListenerEvent, ListenerId, Network, NodeEvent, NodeState, NodeType, PeerEvent, ProtocolResult,
    RequestId, SignedTransaction, Status, Transaction, TransactionEvent, TransactionId,
    TransactionStatus, Wallet, WalletEvent, WalletId,
};
use crate::ports::{LightNodeClient, LightNodeListener, ProtocolResultSink};

const LISTENER_QUEUE: &str = "qc-18-listeners";
const RESULT_QUEUE: &str = "qc-18-results";
const WATCHDOG_THREAD: &str = "qc-18-disconnect";

pub(crate) struct NodeInner {
    pub(crate) config: LightNodeConfig,
    pub(crate) client: Arc<dyn LightNodeClient>,
    pub(crate) core: Mutex<NodeCore>,
    /// Signalled on every state change.
    pub(crate) state_changed: Condvar,
    pub(crate) listener_queue: EventQueue<ListenerEvent>,
    pub(crate) result_queue: EventQueue<ProtocolResult>,
    pub(crate) shut_down: AtomicBool,
}

impl NodeInner {
    /// State change under the lock, waking anyone waiting on the condvar.
    pub(crate) fn transition(
        &self,
        core: &mut NodeCore,
        to: NodeState,
        error: Option<String>,
    ) -> Option<ListenerEvent> {
        let event = core.transition(to, error);
        if event.is_some() {
            self.state_changed.notify_all();
        }
        event
    }
}

/// Light node coordinator handle.
///
/// Cloning is cheap and every clone refers to the same node. Dispatch threads
/// hold weak references only, so dropping the last handle releases the node
/// even without [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct LightNode {
    pub(super) inner: Arc<NodeInner>,
}

impl LightNode {
    /// Create a node in state `Created` with its ether wallet registered and
    /// both dispatch threads running.
    pub fn create(
        config: LightNodeConfig,
        client: Arc<dyn LightNodeClient>,
        account: Account,
    ) -> Result<Self, LightNodeError> {
        config.validate()?;

        let core = NodeCore::new(&config, account);
        let node = LightNode {
            inner: Arc::new(NodeInner {
                config,
                client,
                core: Mutex::new(core),
                state_changed: Condvar::new(),
                listener_queue: EventQueue::new(LISTENER_QUEUE),
                result_queue: EventQueue::new(RESULT_QUEUE),
                shut_down: AtomicBool::new(false),
            }),
        };
        node.start_dispatch()?;

        info!(
            network = %node.inner.config.network,
            chain_id = node.inner.config.network.chain_id(),
            node_type = ?node.inner.config.node_type,
            "[qc-18] Light node created"
        );
        Ok(node)
    }

    fn start_dispatch(&self) -> Result<(), LightNodeError> {
        let weak = Arc::downgrade(&self.inner);
        self.inner.listener_queue.start(move |event: ListenerEvent| {
            if let Some(node) = LightNode::upgrade(&weak) {
                node.dispatch_listener_event(&event);
            }
        })?;

        let weak = Arc::downgrade(&self.inner);
        self.inner.result_queue.start(move |result: ProtocolResult| {
            if let Some(node) = LightNode::upgrade(&weak) {
                node.process_result(result);
            }
        })?;
        Ok(())
    }

    pub(crate) fn upgrade(weak: &Weak<NodeInner>) -> Option<LightNode> {
        weak.upgrade().map(|inner| LightNode { inner })
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, NodeCore> {
        self.inner.core.lock()
    }

    fn ensure_open(&self) -> Result<(), LightNodeError> {
        if self.inner.shut_down.load(Ordering::Acquire) {
            return Err(LightNodeError::ShutDown);
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current lifecycle state.
    pub fn state(&self) -> NodeState {
        self.lock().state
    }

    /// Highest announced block number.
    pub fn block_height(&self) -> u64 {
        self.lock().block_height
    }

    /// Chain this node operates on.
    pub fn network(&self) -> Network {
        self.inner.config.network
    }

    /// Protocol family of the client.
    pub fn node_type(&self) -> NodeType {
        self.inner.config.node_type
    }

    /// Configuration the node was created with.
    pub fn config(&self) -> &LightNodeConfig {
        &self.inner.config
    }

    /// Snapshot of the owning account.
    pub fn account(&self) -> Account {
        self.lock().account.clone()
    }

    /// Register a listener. It receives every event dispatched from now on.
    ///
    /// Returns `ListenerId::NOT_FOUND` once the node has been shut down.
    pub fn add_listener(&self, listener: Arc<dyn LightNodeListener>) -> ListenerId {
        let mut core = self.lock();
        // Checked under the lock: shutdown clears the registry while holding it.
        if self.inner.shut_down.load(Ordering::Acquire) {
            warn!("[qc-18] Listener rejected; node is shut down");
            return ListenerId::NOT_FOUND;
        }
        let id = core.listeners.register(listener);
        debug!(listener = %id, "[qc-18] Listener registered");
        id
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Counters of the listener event queue.
    pub fn listener_queue_stats(&self) -> &DispatchStats {
        self.inner.listener_queue.stats()
    }

    /// Counters of the protocol result queue.
    pub fn result_queue_stats(&self) -> &DispatchStats {
        self.inner.result_queue.stats()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a session.
    ///
    /// From `Created`, `Disconnected` or `Errored` this moves to `Connecting`
    /// and asks the client to connect; `handle_connected()` completes the
    /// move. Any other state is left alone and returned as is.
    pub fn connect(&self) -> Result<NodeState, LightNodeError> {
        self.ensure_open()?;

        let (request_id, event) = {
            let mut core = self.lock();
            match core.state {
                NodeState::Disconnecting => {
                    warn!("[qc-18] connect() ignored while disconnecting");
                    return Ok(core.state);
                }
                state if state != NodeState::Created && !state.is_terminal() => {
                    debug!(%state, "[qc-18] connect() is a no-op");
                    return Ok(state);
                }
                _ => {}
            }
            let event = self.inner.transition(&mut core, NodeState::Connecting, None);
            (core.next_request_id(), event)
        };
        self.announce_all(event);

        // Without a started connection the session cannot progress.
        if let Err(err) = self.inner.client.connect(request_id) {
            self.fail_session(err.to_string());
            return Err(err.into());
        }
        Ok(NodeState::Connecting)
    }

    /// End the session.
    ///
    /// From `Connected` or `Connecting` this moves to `Disconnecting` and asks
    /// the client to disconnect. `handle_disconnected()` completes the move;
    /// otherwise `Disconnected` is forced after the configured timeout.
    pub fn disconnect(&self) -> Result<NodeState, LightNodeError> {
        self.ensure_open()?;
        Ok(self.begin_disconnect())
    }

    fn begin_disconnect(&self) -> NodeState {
        let (request_id, session, event) = {
            let mut core = self.lock();
            if !matches!(core.state, NodeState::Connected | NodeState::Connecting) {
                debug!(state = %core.state, "[qc-18] disconnect() is a no-op");
                return core.state;
            }
            let event = self.inner.transition(&mut core, NodeState::Disconnecting, None);
            core.session = core.session.wrapping_add(1);
            (core.next_request_id(), core.session, event)
        };
        self.announce_all(event);

        if let Err(err) = self.inner.client.disconnect(request_id) {
            warn!(error = %err, "[qc-18] Client refused disconnect; forcing disconnected");
            self.force_disconnected(session);
            return NodeState::Disconnected;
        }
        self.spawn_disconnect_watchdog(session);
        NodeState::Disconnecting
    }

    fn spawn_disconnect_watchdog(&self, session: u64) {
        let weak = Arc::downgrade(&self.inner);
        let timeout = self.inner.config.disconnect_timeout();
        let spawned = thread::Builder::new()
            .name(WATCHDOG_THREAD.to_string())
            .spawn(move || {
                thread::sleep(timeout);
                if let Some(node) = LightNode::upgrade(&weak) {
                    if node.force_disconnected(session) {
                        warn!(
                            timeout_ms = timeout.as_millis() as u64,
                            "[qc-18] Disconnect not acknowledged in time"
                        );
                    }
                }
            });
        if let Err(err) = spawned {
            warn!(error = %err, "[qc-18] Disconnect watchdog not started");
        }
    }

    /// Force `Disconnected` if the node is still waiting on `session`.
    fn force_disconnected(&self, session: u64) -> bool {
        let event = {
            let mut core = self.lock();
            if core.session != session || core.state != NodeState::Disconnecting {
                return false;
            }
            self.inner.transition(&mut core, NodeState::Disconnected, None)
        };
        let forced = event.is_some();
        self.announce_all(event);
        forced
    }

    /// Move to `Errored` with `reason`, if the session is live.
    fn fail_session(&self, reason: String) {
        let event = {
            let mut core = self.lock();
            if !matches!(core.state, NodeState::Connecting | NodeState::Connected) {
                return;
            }
            self.inner.transition(&mut core, NodeState::Errored, Some(reason))
        };
        self.announce_all(event);
    }

    fn client_failed(&self, err: ClientError) -> LightNodeError {
        if err.is_fatal() {
            self.fail_session(err.to_string());
        } else {
            warn!(error = %err, "[qc-18] Client request failed");
        }
        err.into()
    }

    /// Tear the node down.
    ///
    /// Disconnects if needed and waits (bounded by the disconnect timeout)
    /// for `Disconnected`, then stops the protocol result queue and the
    /// listener queue according to the configured shutdown policy and drops
    /// every listener. Later calls return immediately; other operations
    /// return [`LightNodeError::ShutDown`].
    pub fn shutdown(&self) -> Result<(), LightNodeError> {
        if self.inner.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        info!("[qc-18] Shutting down light node");

        self.begin_disconnect();
        let event = {
            let mut core = self.lock();
            let deadline = Instant::now() + self.inner.config.disconnect_timeout();
            while core.state == NodeState::Disconnecting {
                if self
                    .inner
                    .state_changed
                    .wait_until(&mut core, deadline)
                    .timed_out()
                {
                    break;
                }
            }
            if core.state == NodeState::Disconnecting {
                self.inner.transition(&mut core, NodeState::Disconnected, None)
            } else {
                None
            }
        };
        self.announce_all(event);

        // Results first: draining them may still announce listener events.
        let policy = self.inner.config.shutdown_policy;
        self.inner.result_queue.stop(policy)?;
        self.inner.listener_queue.stop(policy)?;
        self.lock().listeners.clear();

        info!(
            listener_events = self.listener_queue_stats().dispatched(),
            listener_events_discarded = self.listener_queue_stats().discarded(),
            protocol_results = self.result_queue_stats().dispatched(),
            "[qc-18] Light node shut down"
        );
        Ok(())
    }

    // =========================================================================
    // Registries
    // =========================================================================

    /// The wallet holding ether.
    pub fn wallet_holding_ether(&self) -> WalletId {
        self.lock().wallet_holding_ether
    }

    /// The wallet holding the token at `contract`, created on first
    /// reference. `NOT_FOUND` if the wallet registry is exhausted.
    pub fn wallet_holding_token(&self, contract: Address) -> WalletId {
        let mut events = Vec::new();
        let wallet = self.lock().ensure_wallet(Asset::Token(contract), &mut events);
        self.announce_all(events);
        wallet
    }

    /// All wallet ids in creation order.
    pub fn wallet_ids(&self) -> Vec<WalletId> {
        self.lock().wallets.ids()
    }

    /// Snapshot of a wallet.
    pub fn wallet(&self, wallet: WalletId) -> Option<Wallet> {
        self.lock().wallets.get(wallet).cloned()
    }

    /// Balance of a wallet.
    pub fn wallet_balance(&self, wallet: WalletId) -> Result<Amount, LightNodeError> {
        self.lock()
            .wallets
            .get(wallet)
            .map(Wallet::balance)
            .ok_or(LightNodeError::UnknownWallet(wallet))
    }

    /// Set the gas limit used for the wallet's new transactions.
    pub fn set_wallet_default_gas_limit(
        &self,
        wallet: WalletId,
        limit: u64,
    ) -> Result<(), LightNodeError> {
        self.lock()
            .wallets
            .get_mut(wallet)
            .ok_or(LightNodeError::UnknownWallet(wallet))?
            .set_default_gas_limit(limit);
        self.announce(ListenerEvent::wallet(wallet, WalletEvent::DefaultGasLimitUpdated));
        Ok(())
    }

    /// Set the gas price used for the wallet's new transactions.
    pub fn set_wallet_default_gas_price(
        &self,
        wallet: WalletId,
        price: U256,
    ) -> Result<(), LightNodeError> {
        self.lock()
            .wallets
            .get_mut(wallet)
            .ok_or(LightNodeError::UnknownWallet(wallet))?
            .set_default_gas_price(price);
        self.announce(ListenerEvent::wallet(wallet, WalletEvent::DefaultGasPriceUpdated));
        Ok(())
    }

    /// Ids of the wallet's transactions, in the order the wallet learned them.
    pub fn wallet_transactions(&self, wallet: WalletId) -> Result<Vec<TransactionId>, LightNodeError> {
        self.lock()
            .wallet_transactions(wallet)
            .ok_or(LightNodeError::UnknownWallet(wallet))
    }

    /// Snapshot of a transaction.
    pub fn transaction(&self, transaction: TransactionId) -> Option<Transaction> {
        self.lock().transaction(transaction).cloned()
    }

    /// Confirmations of an included transaction at the current height.
    pub fn transaction_confirmations(&self, transaction: TransactionId) -> Option<u64> {
        let core = self.lock();
        core.transaction(transaction)?.confirmations(core.block_height)
    }

    /// Snapshot of a block.
    pub fn block(&self, block: BlockId) -> Option<Block> {
        self.lock().blocks.get(block).cloned()
    }

    /// All block ids in creation order.
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.lock().blocks.ids()
    }

    /// Wallet registered for `asset`, or `NOT_FOUND`.
    pub fn lookup_wallet_id(&self, asset: &Asset) -> WalletId {
        self.lock().wallets.lookup_id(asset)
    }

    /// Block registered for `hash`, or `NOT_FOUND`.
    pub fn lookup_block_id(&self, hash: &Hash) -> BlockId {
        self.lock().blocks.lookup_id(hash)
    }

    /// Transaction registered for `hash`, or `NOT_FOUND`.
    pub fn lookup_transaction_id(&self, hash: &Hash) -> TransactionId {
        self.lock().transactions.lookup_id(hash)
    }

    /// Wallet owning `transaction`, or `NOT_FOUND`.
    pub fn lookup_wallet_by_transaction(&self, transaction: TransactionId) -> WalletId {
        self.lock().wallet_of(transaction)
    }

    /// Create an unsigned transaction from `wallet` to `target`, using the
    /// wallet's default gas settings and the account's next nonce.
    pub fn create_transaction(
        &self,
        wallet: WalletId,
        target: Address,
        value: U256,
    ) -> Result<TransactionId, LightNodeError> {
        let transaction = {
            let mut core = self.lock();
            let (asset, source, gas_price, gas_limit) = {
                let w = core
                    .wallets
                    .get(wallet)
                    .ok_or(LightNodeError::UnknownWallet(wallet))?;
                (w.asset(), w.address(), w.default_gas_price(), w.default_gas_limit())
            };
            let nonce = core
                .account
                .take_nonce()
                .ok_or(LightNodeError::NonceExhausted)?;
            let transaction = Transaction::new(
                source,
                target,
                Amount { asset, value },
                gas_price,
                gas_limit,
                nonce,
            );
            let result = match core.insert_transaction(wallet, transaction) {
                Some((id, true)) => Ok(id),
                Some((_, false)) => Err(LightNodeError::HashCollision),
                None => Err(LightNodeError::RegistryFull("transaction")),
            };
            if result.is_err() {
                // Nothing was created; the nonce stays available.
                core.account.set_nonce(nonce);
            }
            result?
        };

        debug!(%wallet, %transaction, "[qc-18] Transaction created");
        self.announce(ListenerEvent::transaction(wallet, transaction, TransactionEvent::Created));
        Ok(transaction)
    }

    // =========================================================================
    // Network requests (require Connected)
    // =========================================================================

    fn require_connected(core: &NodeCore) -> Result<(), LightNodeError> {
        if core.state != NodeState::Connected {
            return Err(LightNodeError::NotConnected { state: core.state });
        }
        Ok(())
    }

    fn require_owned(
        core: &NodeCore,
        wallet: WalletId,
        transaction: TransactionId,
    ) -> Result<(), LightNodeError> {
        if core.wallets.get(wallet).is_none() {
            return Err(LightNodeError::UnknownWallet(wallet));
        }
        let slot = core
            .transactions
            .get(transaction)
            .ok_or(LightNodeError::UnknownTransaction(transaction))?;
        if slot.wallet != wallet {
            return Err(LightNodeError::WrongWallet {
                wallet,
                transaction,
            });
        }
        Ok(())
    }

    /// Ask the network for the wallet's balance.
    pub fn update_wallet_balance(&self, wallet: WalletId) -> Result<RequestId, LightNodeError> {
        let (address, asset, request_id) = {
            let mut core = self.lock();
            Self::require_connected(&core)?;
            let w = core
                .wallets
                .get(wallet)
                .ok_or(LightNodeError::UnknownWallet(wallet))?;
            let (address, asset) = (w.address(), w.asset());
            (address, asset, core.next_request_id())
        };

        self.inner
            .client
            .get_balance(wallet, address, asset, request_id)
            .map_err(|e| self.client_failed(e))?;
        debug!(%wallet, request_id, "[qc-18] Balance requested");
        Ok(request_id)
    }

    /// Ask the network for the current gas price.
    pub fn update_wallet_default_gas_price(
        &self,
        wallet: WalletId,
    ) -> Result<RequestId, LightNodeError> {
        let request_id = {
            let mut core = self.lock();
            Self::require_connected(&core)?;
            if core.wallets.get(wallet).is_none() {
                return Err(LightNodeError::UnknownWallet(wallet));
            }
            core.next_request_id()
        };

        self.inner
            .client
            .get_gas_price(wallet, request_id)
            .map_err(|e| self.client_failed(e))?;
        debug!(%wallet, request_id, "[qc-18] Gas price requested");
        Ok(request_id)
    }

    /// Ask the network to estimate gas for a transaction.
    pub fn update_transaction_gas_estimate(
        &self,
        wallet: WalletId,
        transaction: TransactionId,
    ) -> Result<RequestId, LightNodeError> {
        let (snapshot, request_id) = {
            let mut core = self.lock();
            Self::require_connected(&core)?;
            Self::require_owned(&core, wallet, transaction)?;
            let snapshot = core
                .transaction(transaction)
                .cloned()
                .ok_or(LightNodeError::UnknownTransaction(transaction))?;
            (snapshot, core.next_request_id())
        };

        self.inner
            .client
            .estimate_gas(wallet, transaction, &snapshot, request_id)
            .map_err(|e| self.client_failed(e))?;
        debug!(%wallet, %transaction, request_id, "[qc-18] Gas estimate requested");
        Ok(request_id)
    }

    /// Ask the network for the account nonce.
    pub fn update_nonce(&self) -> Result<RequestId, LightNodeError> {
        let (address, request_id) = {
            let mut core = self.lock();
            Self::require_connected(&core)?;
            let address = core.account.primary_address;
            (address, core.next_request_id())
        };

        self.inner
            .client
            .get_nonce(address, request_id)
            .map_err(|e| self.client_failed(e))?;
        debug!(request_id, "[qc-18] Nonce requested");
        Ok(request_id)
    }

    /// Submit a transaction signed by the external signer.
    ///
    /// The transaction takes the signed hash as its identity (keeping its id)
    /// and becomes `Submitted` once the client has accepted the bytes.
    pub fn submit_transaction(
        &self,
        wallet: WalletId,
        transaction: TransactionId,
        signed: SignedTransaction,
    ) -> Result<RequestId, LightNodeError> {
        let request_id = {
            let mut core = self.lock();
            Self::require_connected(&core)?;
            Self::require_owned(&core, wallet, transaction)?;
            if !core.rekey_transaction(transaction, signed.hash) {
                return Err(LightNodeError::HashCollision);
            }
            core.next_request_id()
        };

        self.inner
            .client
            .submit_transaction(wallet, transaction, &signed.raw, request_id)
            .map_err(|e| self.client_failed(e))?;

        if let Some(t) = self.lock().transaction_mut(transaction) {
            // A status report may already have moved it further.
            if t.status == TransactionStatus::Created {
                t.status = TransactionStatus::Submitted;
            }
        }
        info!(%wallet, %transaction, request_id, "[qc-18] Transaction submitted");
        self.announce(ListenerEvent::transaction(wallet, transaction, TransactionEvent::Submitted));
        Ok(request_id)
    }

    // =========================================================================
    // Listener events
    // =========================================================================

    pub(crate) fn announce(&self, event: ListenerEvent) {
        let category = event.category();
        let success = event.status().is_success();
        match self.inner.listener_queue.submit(event) {
            Ok(()) => debug!(category, success, "[qc-18] Listener event queued"),
            Err(err) => debug!(category, error = %err, "[qc-18] Listener event dropped"),
        }
    }

    pub(crate) fn announce_all(&self, events: impl IntoIterator<Item = ListenerEvent>) {
        for event in events {
            self.announce(event);
        }
    }

    fn dispatch_listener_event(&self, event: &ListenerEvent) {
        let snapshot = self.lock().listeners.snapshot();
        listeners::deliver(self, &snapshot, event);
    }

    /// Queue a node event for every listener.
    pub fn announce_node_event(&self, event: NodeEvent, status: Status, error: Option<String>) {
        self.announce(ListenerEvent::Node {
            event,
            status,
            error,
        });
    }

    /// Queue a peer event for every listener.
    pub fn announce_peer_event(&self, event: PeerEvent, status: Status, error: Option<String>) {
        self.announce(ListenerEvent::Peer {
            event,
            status,
            error,
        });
    }

    /// Queue a wallet event for every listener.
    pub fn announce_wallet_event(
        &self,
        wallet: WalletId,
        event: WalletEvent,
        status: Status,
        error: Option<String>,
    ) {
        self.announce(ListenerEvent::Wallet {
            wallet,
            event,
            status,
            error,
        });
    }

    /// Queue a block event for every listener.
    pub fn announce_block_event(
        &self,
        block: BlockId,
        event: BlockEvent,
        status: Status,
        error: Option<String>,
    ) {
        self.announce(ListenerEvent::Block {
            block,
            event,
            status,
            error,
        });
    }

    /// Queue a transaction event for every listener.
    pub fn announce_transaction_event(
        &self,
        wallet: WalletId,
        transaction: TransactionId,
        event: TransactionEvent,
        status: Status,
        error: Option<String>,
    ) {
        self.announce(ListenerEvent::Transaction {
            wallet,
            transaction,
            event,
            status,
            error,
        });
    }
}

impl ProtocolResultSink for LightNode {
    fn submit_result(&self, result: ProtocolResult) -> Result<(), LightNodeError> {
        let kind = result.kind();
        self.inner
            .result_queue
            .submit(result)
            .map_err(|_| LightNodeError::ShutDown)?;
        debug!(kind, "[qc-18] Protocol result queued");
        Ok(())
    }
}

impl fmt::Debug for LightNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.lock();
        f.debug_struct("LightNode")
            .field("network", &self.inner.config.network)
            .field("state", &core.state)
            .field("block_height", &core.block_height)
            .field("wallets", &core.wallets.len())
            .field("blocks", &core.blocks.len())
            .field("transactions", &core.transactions.len())
            .finish()
    }
}
