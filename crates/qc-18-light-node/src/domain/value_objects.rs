//! # Domain Value Objects
//!
//! Immutable value types for the Light Node.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash type alias (32-byte Keccak-256).
pub type Hash = [u8; 32];

/// Account address (20 bytes).
pub type Address = [u8; 20];

/// Correlation token attached to outbound client requests.
///
/// 32 bits wide; the generator wraps at `u32::MAX` and wrapping is not an error.
pub type RequestId = u32;

/// Short hex rendering of a hash for log lines.
pub fn hash_prefix(hash: &Hash) -> String {
    format!("{:02x}{:02x}{:02x}{:02x}..", hash[0], hash[1], hash[2], hash[3])
}

/// Chain/network selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    #[default]
    Mainnet,
    /// Proof-of-work test network.
    Ropsten,
    /// Proof-of-authority test network.
    Rinkeby,
}

impl Network {
    /// EIP-155 chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Ropsten => 3,
            Network::Rinkeby => 4,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Ropsten => "ropsten",
            Network::Rinkeby => "rinkeby",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "ropsten" => Ok(Network::Ropsten),
            "rinkeby" => Ok(Network::Rinkeby),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// How the node reaches the chain. Informational for the coordinator; the
/// client collaborator implements the actual protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Light Ethereum Subprotocol over devp2p.
    #[default]
    Les,
    /// JSON-RPC against a remote full node.
    JsonRpc,
}

/// Identity of what a wallet holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The chain's native asset.
    Ether,
    /// A token, identified by its contract address.
    Token(Address),
}

impl Asset {
    /// Is this the native asset?
    pub fn is_ether(&self) -> bool {
        matches!(self, Asset::Ether)
    }
}

/// A quantity of one asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// What is being counted.
    pub asset: Asset,
    /// Smallest-unit quantity (wei for ether).
    pub value: U256,
}

impl Amount {
    /// An amount of ether.
    pub fn ether(value: U256) -> Self {
        Self {
            asset: Asset::Ether,
            value,
        }
    }

    /// An amount of the token at `contract`.
    pub fn token(contract: Address, value: U256) -> Self {
        Self {
            asset: Asset::Token(contract),
            value,
        }
    }
}

/// Lifecycle states of a light node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    /// Constructed, never connected.
    Created,
    /// Connect requested, awaiting collaborator confirmation.
    Connecting,
    /// Collaborator confirmed reachability.
    Connected,
    /// Disconnect requested, awaiting acknowledgement.
    Disconnecting,
    /// Session ended normally.
    Disconnected,
    /// Session ended by an unrecoverable collaborator failure.
    Errored,
}

impl NodeState {
    /// Does this state end the current session?
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Disconnected | NodeState::Errored)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeState::Created => "created",
            NodeState::Connecting => "connecting",
            NodeState::Connected => "connected",
            NodeState::Disconnecting => "disconnecting",
            NodeState::Disconnected => "disconnected",
            NodeState::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Local view of a transaction's progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Created locally, not yet submitted.
    Created,
    /// Handed to the client for submission.
    Submitted,
    /// Known to the network but not yet in a block.
    Pending,
    /// Included in a block.
    Included {
        /// Containing block.
        block_hash: Hash,
        /// Containing block number, once the block's header is known.
        block_number: Option<u64>,
        /// Position in the block.
        transaction_index: u32,
    },
    /// Rejected or failed.
    Errored {
        /// Description from the network.
        reason: String,
    },
    /// Status not determined.
    Unknown,
}

impl TransactionStatus {
    /// Block number if included and the number is known.
    pub fn block_number(&self) -> Option<u64> {
        match self {
            TransactionStatus::Included { block_number, .. } => *block_number,
            _ => None,
        }
    }
}

/// Transaction status as reported by the network layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatusReport {
    /// The peer has no information.
    Unknown,
    /// In the pool, not yet executable.
    Queued,
    /// In the pool, executable.
    Pending,
    /// Mined.
    Included {
        /// Containing block.
        block_hash: Hash,
        /// Containing block number.
        block_number: u64,
        /// Position in the block.
        transaction_index: u32,
    },
    /// Rejected.
    Error {
        /// Reason given by the peer.
        reason: String,
    },
}

/// Block header as delivered by the network layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block hash.
    pub hash: Hash,
    /// Parent block hash.
    pub parent_hash: Hash,
    /// Block number.
    pub number: u64,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    /// Block difficulty.
    pub difficulty: U256,
}

/// Execution receipt for one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction this receipt belongs to.
    pub transaction_hash: Hash,
    /// Number of the containing block.
    pub block_number: u64,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Did execution succeed?
    pub succeeded: bool,
}

/// Transaction already signed by the external signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Network hash of the signed transaction.
    pub hash: Hash,
    /// Encoded bytes ready for submission.
    pub raw: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids() {
        assert_eq!(Network::Mainnet.chain_id(), 1);
        assert_eq!(Network::Ropsten.chain_id(), 3);
        assert_eq!(Network::Rinkeby.chain_id(), 4);
    }

    #[test]
    fn test_network_parse_roundtrip() {
        for network in [Network::Mainnet, Network::Ropsten, Network::Rinkeby] {
            assert_eq!(network.to_string().parse::<Network>(), Ok(network));
        }
        assert!("goerli".parse::<Network>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(NodeState::Disconnected.is_terminal());
        assert!(NodeState::Errored.is_terminal());
        assert!(!NodeState::Connected.is_terminal());
        assert!(!NodeState::Created.is_terminal());
    }

    #[test]
    fn test_asset_identity() {
        assert!(Asset::Ether.is_ether());
        assert_ne!(Asset::Token([1u8; 20]), Asset::Token([2u8; 20]));
        assert_eq!(Amount::token([1u8; 20], U256::one()).asset, Asset::Token([1u8; 20]));
    }

    #[test]
    fn test_hash_prefix() {
        let mut hash = [0u8; 32];
        hash[0] = 0xab;
        hash[3] = 0x01;
        assert_eq!(hash_prefix(&hash), "ab000001..");
    }
}
