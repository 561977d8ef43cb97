//! End-to-end scenarios driving a light node through its public API and the
//! protocol result entry points, observing it through a recording listener.

use parking_lot::{Condvar, Mutex};
use primitive_types::U256;
use qc_18_light_node::{
    Account, Amount, Asset, BlockEvent, BlockId, ClientRequest, LightNode, LightNodeConfig,
    LightNodeListener, ListenerEvent, MockClient, NodeEvent, NodeState, PeerEvent,
    ProtocolResultSink, ShutdownPolicy, Status, Transaction, TransactionEvent, TransactionId,
    WalletEvent, WalletId,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Records every delivered event along with the delivering thread's name.
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<ListenerEvent>>,
    threads: Mutex<Vec<String>>,
}

impl Recorder {
    fn push(&self, event: ListenerEvent) {
        let name = thread::current().name().unwrap_or_default().to_string();
        self.threads.lock().push(name);
        self.events.lock().push(event);
    }

    fn events(&self) -> Vec<ListenerEvent> {
        self.events.lock().clone()
    }

    fn node_events(&self) -> Vec<NodeEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Node { event, .. } => Some(event),
                _ => None,
            })
            .collect()
    }

    fn wait_for(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.events.lock().len() < count && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl LightNodeListener for Recorder {
    fn on_node_event(&self, _: &LightNode, event: NodeEvent, status: Status, error: Option<&str>) {
        self.push(ListenerEvent::Node {
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_peer_event(&self, _: &LightNode, event: PeerEvent, status: Status, error: Option<&str>) {
        self.push(ListenerEvent::Peer {
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_wallet_event(
        &self,
        _: &LightNode,
        wallet: WalletId,
        event: WalletEvent,
        status: Status,
        error: Option<&str>,
    ) {
        self.push(ListenerEvent::Wallet {
            wallet,
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_block_event(
        &self,
        _: &LightNode,
        block: BlockId,
        event: BlockEvent,
        status: Status,
        error: Option<&str>,
    ) {
        self.push(ListenerEvent::Block {
            block,
            event,
            status,
            error: error.map(str::to_owned),
        });
    }

    fn on_transaction_event(
        &self,
        _: &LightNode,
        wallet: WalletId,
        transaction: TransactionId,
        event: TransactionEvent,
        status: Status,
        error: Option<&str>,
    ) {
        self.push(ListenerEvent::Transaction {
            wallet,
            transaction,
            event,
            status,
            error: error.map(str::to_owned),
        });
    }
}

struct Harness {
    node: LightNode,
    client: Arc<MockClient>,
    recorder: Arc<Recorder>,
}

fn harness_with(config: LightNodeConfig) -> Harness {
    let client = Arc::new(MockClient::default());
    let node = LightNode::create(config, client.clone(), Account::new([0x11; 20])).unwrap();
    let recorder = Arc::new(Recorder::default());
    node.add_listener(recorder.clone());
    Harness {
        node,
        client,
        recorder,
    }
}

fn harness() -> Harness {
    harness_with(LightNodeConfig::for_testing())
}

fn ether_tx(tag: u8) -> Transaction {
    Transaction::observed(
        [tag; 32],
        [0x22; 20],
        [0x11; 20],
        Amount::ether(U256::from(tag)),
        u64::from(tag),
    )
}

#[test]
fn scenario_wallet_identity() {
    let h = harness();
    let ether = h.node.wallet_holding_ether();
    let token = [0x77; 20];

    assert_eq!(ether, WalletId::new(0));
    assert_eq!(h.node.wallet_holding_ether(), WalletId::new(0));
    assert_eq!(h.node.wallet_holding_token(token), WalletId::new(1));
    assert_eq!(h.node.wallet_holding_token(token), WalletId::new(1));
    assert_eq!(h.node.lookup_wallet_id(&Asset::Token([0x78; 20])), WalletId::NOT_FOUND);
    assert_eq!(h.node.wallet_ids(), vec![WalletId::new(0), WalletId::new(1)]);

    // Only the first reference to the token announces a wallet.
    h.recorder.wait_for(1);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(
        h.recorder.events(),
        vec![ListenerEvent::wallet(WalletId::new(1), WalletEvent::Created)]
    );
}

#[test]
fn scenario_connect_then_confirm() {
    let h = harness();
    assert_eq!(h.node.connect().unwrap(), NodeState::Connecting);
    assert_eq!(h.client.recorded(), vec![ClientRequest::Connect(0)]);

    h.node.handle_connected().unwrap();
    h.recorder.wait_for(2);

    assert_eq!(h.node.state(), NodeState::Connected);
    assert_eq!(
        h.recorder.node_events(),
        vec![
            NodeEvent::StateChanged(NodeState::Connecting),
            NodeEvent::StateChanged(NodeState::Connected),
        ]
    );
}

#[test]
fn scenario_stale_connect_confirmation_ignored() {
    let h = harness();
    h.node.handle_connected().unwrap();
    h.node.handle_peer(PeerEvent::Discovered).unwrap();
    h.recorder.wait_for(1);

    assert_eq!(h.node.state(), NodeState::Created);
    assert!(h.recorder.node_events().is_empty());
}

#[test]
fn scenario_block_bodies_register_transactions() {
    let h = harness();
    let block_hash = [0xB0; 32];
    let ommer = [0x0E; 32];

    h.node
        .handle_block_bodies(block_hash, vec![ether_tx(1), ether_tx(2)], vec![ommer])
        .unwrap();
    h.recorder.wait_for(3);

    let block = h.node.lookup_block_id(&block_hash);
    let ether = h.node.wallet_holding_ether();
    let t1 = h.node.lookup_transaction_id(&[1; 32]);
    let t2 = h.node.lookup_transaction_id(&[2; 32]);
    assert!(block.is_valid());
    assert!(t1.is_valid() && t2.is_valid());
    assert_ne!(t1, t2);

    assert_eq!(h.node.lookup_wallet_by_transaction(t1), ether);
    assert_eq!(h.node.lookup_wallet_by_transaction(t2), ether);
    assert_eq!(h.node.wallet_transactions(ether).unwrap(), vec![t1, t2]);

    let stored = h.node.block(block).unwrap();
    assert_eq!(stored.transactions, vec![[1; 32], [2; 32]]);
    assert_eq!(stored.ommers, vec![ommer]);

    assert_eq!(
        h.recorder.events(),
        vec![
            ListenerEvent::block(block, BlockEvent::Created),
            ListenerEvent::transaction(ether, t1, TransactionEvent::Blocked),
            ListenerEvent::transaction(ether, t2, TransactionEvent::Blocked),
        ]
    );
}

#[test]
fn scenario_announcements_only_raise_height() {
    let h = harness();
    h.node.handle_announce([0xA1; 32], 100, U256::from(1_000)).unwrap();
    h.node.handle_announce([0xA2; 32], 80, U256::from(900)).unwrap();
    h.node.handle_peer(PeerEvent::Connected).unwrap();
    h.recorder.wait_for(2);

    assert_eq!(h.node.block_height(), 100);
    assert_eq!(h.recorder.node_events(), vec![NodeEvent::BlockHeightUpdated(100)]);
}

#[test]
fn scenario_listener_delivery_is_fifo_on_dispatch_thread() {
    let h = harness();
    let ether = h.node.wallet_holding_ether();
    for i in 0..50u32 {
        h.node.announce_wallet_event(
            ether,
            WalletEvent::BalanceUpdated,
            Status::Success,
            Some(i.to_string()),
        );
    }
    h.recorder.wait_for(50);

    let order: Vec<String> = h
        .recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ListenerEvent::Wallet { error, .. } => error,
            _ => None,
        })
        .collect();
    let expected: Vec<String> = (0..50u32).map(|i| i.to_string()).collect();
    assert_eq!(order, expected);

    let caller = thread::current().name().map(str::to_owned);
    let threads = h.recorder.threads.lock().clone();
    assert!(threads.iter().all(|t| t == "qc-18-listeners"));
    assert!(caller.as_deref() != Some("qc-18-listeners"));
}

#[test]
fn scenario_every_transaction_has_one_owner() {
    let h = harness();
    let token = h.node.wallet_holding_token([0x77; 20]);
    let token_tx = Transaction::observed(
        [3; 32],
        [0x22; 20],
        [0x11; 20],
        Amount::token([0x77; 20], U256::from(9)),
        0,
    );
    h.node
        .handle_block_bodies([0xB1; 32], vec![ether_tx(1), token_tx], vec![])
        .unwrap();
    // Same hash again from a second block: still one owner.
    h.node
        .handle_block_bodies([0xB2; 32], vec![ether_tx(1)], vec![])
        .unwrap();
    h.node.shutdown().unwrap();

    let mut owners = 0;
    for wallet in h.node.wallet_ids() {
        for transaction in h.node.wallet_transactions(wallet).unwrap() {
            assert_eq!(h.node.lookup_wallet_by_transaction(transaction), wallet);
            owners += 1;
        }
    }
    assert_eq!(owners, 2);
    assert_eq!(
        h.node.lookup_wallet_by_transaction(h.node.lookup_transaction_id(&[3; 32])),
        token
    );
}

#[test]
fn scenario_balance_and_nonce_results() {
    let h = harness();
    h.node.connect().unwrap();
    h.node.handle_connected().unwrap();
    h.recorder.wait_for(2);

    let ether = h.node.wallet_holding_ether();
    let request_id = h.node.update_wallet_balance(ether).unwrap();
    assert!(h.client.recorded().contains(&ClientRequest::GetBalance {
        wallet: ether,
        asset: Asset::Ether,
        request_id,
    }));

    h.node.handle_balance(Amount::ether(U256::from(5_000))).unwrap();
    h.node.handle_nonce(7).unwrap();
    h.node.handle_peer(PeerEvent::Connected).unwrap();
    h.recorder.wait_for(4);

    assert_eq!(h.node.wallet_balance(ether).unwrap().value, U256::from(5_000));
    assert_eq!(h.node.account().nonce(), 7);
    let tid = h.node.create_transaction(ether, [0x33; 20], U256::one()).unwrap();
    assert_eq!(h.node.transaction(tid).unwrap().nonce, 7);
}

#[test]
fn scenario_unsolicited_disconnect_errors_session() {
    let h = harness();
    h.node.connect().unwrap();
    h.node.handle_connected().unwrap();
    h.node.handle_disconnected().unwrap();
    h.recorder.wait_for(3);

    assert_eq!(h.node.state(), NodeState::Errored);
    let last = h.recorder.events().pop();
    assert_eq!(
        last,
        Some(ListenerEvent::Node {
            event: NodeEvent::StateChanged(NodeState::Errored),
            status: Status::ErrorClient,
            error: Some("connection lost".into()),
        })
    );

    // Errored is session-terminal; reconnect starts a new session.
    assert_eq!(h.node.connect().unwrap(), NodeState::Connecting);
}

#[test]
fn scenario_panicking_listener_does_not_stop_dispatch() {
    struct Panics;
    impl LightNodeListener for Panics {
        fn on_peer_event(&self, _: &LightNode, _: PeerEvent, _: Status, _: Option<&str>) {
            panic!("listener bug");
        }
    }

    let client = Arc::new(MockClient::default());
    let node = LightNode::create(LightNodeConfig::for_testing(), client, Account::new([1; 20])).unwrap();
    node.add_listener(Arc::new(Panics));
    let recorder = Arc::new(Recorder::default());
    node.add_listener(recorder.clone());

    node.handle_peer(PeerEvent::Discovered).unwrap();
    node.handle_peer(PeerEvent::Connected).unwrap();
    recorder.wait_for(2);

    assert_eq!(recorder.events().len(), 2);
}

#[test]
fn scenario_shutdown_drains_queued_events() {
    let h = harness();
    let ether = h.node.wallet_holding_ether();
    for _ in 0..20 {
        h.node
            .handle_balance(Amount::ether(U256::from(1)))
            .unwrap();
    }
    h.node.shutdown().unwrap();

    // Drain: every result applied and every event delivered before return.
    let updates = h
        .recorder
        .events()
        .into_iter()
        .filter(|e| *e == ListenerEvent::wallet(ether, WalletEvent::BalanceUpdated))
        .count();
    assert_eq!(updates, 20);
    assert_eq!(h.node.result_queue_stats().dispatched(), 20);
    assert_eq!(h.node.listener_queue_stats().discarded(), 0);
}

/// Holds the listener thread on its first wallet event until released.
#[derive(Default)]
struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    fn release(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }
}

impl LightNodeListener for Gate {
    fn on_wallet_event(&self, _: &LightNode, _: WalletId, _: WalletEvent, _: Status, _: Option<&str>) {
        let mut open = self.open.lock();
        while !*open {
            self.opened.wait(&mut open);
        }
    }
}

#[test]
fn scenario_shutdown_discard_drops_queued_events() {
    let config = LightNodeConfig {
        shutdown_policy: ShutdownPolicy::Discard,
        ..LightNodeConfig::for_testing()
    };
    let h = harness_with(config);
    let gate = Arc::new(Gate::default());
    h.node.add_listener(gate.clone());

    for _ in 0..200 {
        h.node
            .handle_balance(Amount::ether(U256::from(1)))
            .unwrap();
    }
    // Every result applied; the listener thread is stuck on the first event.
    let deadline = Instant::now() + Duration::from_secs(2);
    while h.node.result_queue_stats().dispatched() < 200 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(h.node.listener_queue_stats().submitted(), 200);

    let node = h.node.clone();
    let shutdown = thread::spawn(move || node.shutdown());
    thread::sleep(Duration::from_millis(200));
    gate.release();
    shutdown.join().unwrap().unwrap();

    let stats = h.node.listener_queue_stats();
    let delivered = h.recorder.events().len();
    assert!(delivered < 200, "delivered {} of 200", delivered);
    assert!(stats.discarded() > 0);
    assert_eq!(stats.dispatched() + stats.discarded(), 200);
    assert!(h.node.handle_nonce(1).is_err());
}
