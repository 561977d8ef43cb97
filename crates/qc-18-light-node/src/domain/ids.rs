//! # Entity Identifiers
//!
//! Small integer handles handed to callers. Each kind is its own namespace and
//! reserves `u32::MAX` as the "not found" sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel returned by lookups that find nothing.
            pub const NOT_FOUND: Self = Self(u32::MAX);

            /// Wrap a raw index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Raw index value.
            pub const fn index(self) -> u32 {
                self.0
            }

            /// Is this a real id rather than the sentinel?
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}#{}", $label, self.0)
                } else {
                    write!(f, "{}#none", $label)
                }
            }
        }
    };
}

define_id!(
    /// Handle of a wallet registered with a node.
    WalletId,
    "wallet"
);
define_id!(
    /// Handle of a block registered with a node.
    BlockId,
    "block"
);
define_id!(
    /// Handle of a transaction registered with a node.
    TransactionId,
    "tx"
);
define_id!(
    /// Handle of a registered listener.
    ListenerId,
    "listener"
);

/// Conversion from a registry slot index into a typed id.
pub trait RegistryId: Copy {
    /// Build the id for slot `index`.
    fn from_index(index: u32) -> Self;
    /// Slot index of this id.
    fn slot(self) -> u32;
    /// Sentinel for a missing entry.
    fn not_found() -> Self;
}

macro_rules! impl_registry_id {
    ($($name:ident),*) => {
        $(
            impl RegistryId for $name {
                fn from_index(index: u32) -> Self {
                    Self::new(index)
                }

                fn slot(self) -> u32 {
                    self.index()
                }

                fn not_found() -> Self {
                    Self::NOT_FOUND
                }
            }
        )*
    };
}

impl_registry_id!(WalletId, BlockId, TransactionId, ListenerId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_invalid() {
        assert!(!WalletId::NOT_FOUND.is_valid());
        assert!(!BlockId::NOT_FOUND.is_valid());
        assert!(!TransactionId::NOT_FOUND.is_valid());
        assert!(!ListenerId::NOT_FOUND.is_valid());
        assert!(WalletId::new(0).is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(WalletId::new(3).to_string(), "wallet#3");
        assert_eq!(TransactionId::NOT_FOUND.to_string(), "tx#none");
    }
}
