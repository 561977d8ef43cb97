//! # Domain Invariants
//!
//! Rules that must always hold for a light node.

use super::ids::WalletId;
use super::registry::ObjectRegistry;
use super::entities::Wallet;
use super::value_objects::{Asset, NodeState};

/// Initial listener capacity; grows as needed.
pub const DEFAULT_LISTENER_CAPACITY: usize = 3;

/// Initial wallet registry capacity.
pub const DEFAULT_WALLET_CAPACITY: usize = 10;

/// Initial block registry capacity.
pub const DEFAULT_BLOCK_CAPACITY: usize = 100;

/// Initial transaction registry capacity.
pub const DEFAULT_TRANSACTION_CAPACITY: usize = 1000;

/// Gas limit for a plain ether transfer.
pub const DEFAULT_ETHER_GAS_LIMIT: u64 = 21_000;

/// Gas limit for a token transfer.
pub const DEFAULT_TOKEN_GAS_LIMIT: u64 = 92_000;

/// Invariant: lifecycle transitions.
///
/// ```text
/// Created ──► Connecting ──► Connected ──► Disconnecting ──► Disconnected
///                 │              │                                │
///                 └──► Errored ◄─┘         (reconnect) ◄──────────┘
/// ```
///
/// `Disconnected` and `Errored` only leave via an explicit reconnect.
pub fn invariant_transition_allowed(from: NodeState, to: NodeState) -> bool {
    use NodeState::*;
    matches!(
        (from, to),
        (Created, Connecting)
            | (Connecting, Connected)
            | (Connecting, Disconnecting)
            | (Connecting, Errored)
            | (Connected, Disconnecting)
            | (Connected, Errored)
            | (Disconnecting, Disconnected)
            | (Disconnected, Connecting)
            | (Errored, Connecting)
    )
}

/// Invariant: exactly one wallet holds ether, and it is the one recorded as
/// `wallet_holding_ether`.
pub fn invariant_single_ether_wallet(
    wallets: &ObjectRegistry<Wallet, WalletId>,
    wallet_holding_ether: WalletId,
) -> bool {
    let mut ether_wallets = wallets.iter().filter(|(_, w)| w.asset().is_ether());
    matches!(
        (ether_wallets.next(), ether_wallets.next()),
        (Some((id, _)), None) if id == wallet_holding_ether
    )
}

/// Default gas limit for a new wallet holding `asset`.
pub fn default_gas_limit(asset: Asset) -> u64 {
    match asset {
        Asset::Ether => DEFAULT_ETHER_GAS_LIMIT,
        Asset::Token(_) => DEFAULT_TOKEN_GAS_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use NodeState::*;

    const ALL: [NodeState; 6] = [Created, Connecting, Connected, Disconnecting, Disconnected, Errored];

    fn reachable_from(from: NodeState) -> Vec<NodeState> {
        ALL.into_iter()
            .filter(|to| invariant_transition_allowed(from, *to))
            .collect()
    }

    #[test]
    fn test_created_only_reaches_connecting() {
        assert_eq!(reachable_from(Created), vec![Connecting]);
    }

    #[test]
    fn test_connected_reaches_disconnecting_or_errored() {
        assert_eq!(reachable_from(Connected), vec![Disconnecting, Errored]);
    }

    #[test]
    fn test_terminal_states_only_reconnect() {
        assert_eq!(reachable_from(Disconnected), vec![Connecting]);
        assert_eq!(reachable_from(Errored), vec![Connecting]);
    }

    #[test]
    fn test_nothing_returns_to_created() {
        for from in ALL {
            assert!(!invariant_transition_allowed(from, Created));
        }
    }

    #[test]
    fn test_single_ether_wallet() {
        let mut wallets = ObjectRegistry::with_capacity(4);
        let eth = wallets.insert(Wallet::new(Asset::Ether, [1u8; 20], DEFAULT_ETHER_GAS_LIMIT));
        wallets.insert(Wallet::new(Asset::Token([2u8; 20]), [1u8; 20], DEFAULT_TOKEN_GAS_LIMIT));
        assert!(invariant_single_ether_wallet(&wallets, eth));
        assert!(!invariant_single_ether_wallet(&wallets, WalletId::new(1)));
    }

    #[test]
    fn test_default_gas_limits() {
        assert_eq!(default_gas_limit(Asset::Ether), 21_000);
        assert_eq!(default_gas_limit(Asset::Token([0u8; 20])), 92_000);
    }
}
