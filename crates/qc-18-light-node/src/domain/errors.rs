//! # Domain Errors
//!
//! Error types for the Light Node.

use super::events::Status;
use super::ids::{TransactionId, WalletId};
use super::value_objects::NodeState;
use thiserror::Error;

/// Failures reported by the client collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The request could not be issued now; the session is still usable.
    #[error("Client unavailable: {0}")]
    Unavailable(String),

    /// The collaborator cannot continue; the session is over.
    #[error("Client failed: {0}")]
    Fatal(String),
}

impl ClientError {
    /// Does this failure end the session?
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Fatal(_))
    }
}

/// Light node error types.
#[derive(Debug, Error)]
pub enum LightNodeError {
    /// The operation needs a connected node.
    #[error("Node not connected (state: {state})")]
    NotConnected {
        /// State at the time of the call
        state: NodeState,
    },

    /// Wallet id not registered.
    #[error("Unknown wallet: {0}")]
    UnknownWallet(WalletId),

    /// Transaction id not registered.
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TransactionId),

    /// The transaction is not owned by the given wallet.
    #[error("{transaction} is not owned by {wallet}")]
    WrongWallet {
        /// Wallet named by the caller
        wallet: WalletId,
        /// Transaction named by the caller
        transaction: TransactionId,
    },

    /// Another transaction already has the signed hash.
    #[error("Signed hash already registered for another transaction")]
    HashCollision,

    /// The client collaborator failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The account nonce cannot advance any further.
    #[error("Account nonce exhausted")]
    NonceExhausted,

    /// A registry cannot assign another id.
    #[error("{0} registry is full")]
    RegistryFull(&'static str),

    /// The node has been shut down.
    #[error("Node has been shut down")]
    ShutDown,

    /// A dispatch thread could not be managed.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] shared_bus::BusError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<&LightNodeError> for Status {
    fn from(err: &LightNodeError) -> Self {
        match err {
            LightNodeError::NotConnected { .. } => Status::ErrorNodeNotConnected,
            LightNodeError::UnknownWallet(_) => Status::ErrorUnknownWallet,
            LightNodeError::UnknownTransaction(_) | LightNodeError::WrongWallet { .. } => {
                Status::ErrorUnknownTransaction
            }
            LightNodeError::Client(_) | LightNodeError::HashCollision => Status::ErrorClient,
            LightNodeError::RegistryFull(_)
            | LightNodeError::NonceExhausted
            | LightNodeError::ShutDown
            | LightNodeError::Dispatch(_)
            | LightNodeError::Config(_) => Status::ErrorClient,
        }
    }
}
