//! # Object Registry
//!
//! Append-only arena of entities with a reverse index from identity key to
//! slot. Slot indices are the public ids: sequential, stable, never reused.
//!
//! Registries are not synchronized themselves; the node mutates them only
//! while holding its lock.

use super::entities::{Block, Wallet};
use super::ids::{RegistryId, WalletId};
use super::value_objects::{Asset, Hash};
use std::collections::HashMap;
use std::hash::Hash as StdHash;
use std::marker::PhantomData;

/// An entity with a stable identity key.
pub trait Identified {
    /// Key type; two entities with equal keys are the same entity.
    type Key: Eq + StdHash + Clone;

    /// The entity's identity key.
    fn identity(&self) -> Self::Key;
}

/// An entity whose identity key may be replaced.
pub trait Rekey: Identified {
    /// Replace the identity key.
    fn set_identity(&mut self, key: Self::Key);
}

impl Identified for Wallet {
    type Key = Asset;

    fn identity(&self) -> Asset {
        self.asset()
    }
}

impl Identified for Block {
    type Key = Hash;

    fn identity(&self) -> Hash {
        self.hash
    }
}

/// Non-owning locator for a transaction: the owning wallet and the
/// transaction's position inside it. The owner never changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionSlot {
    /// Identity key.
    pub hash: Hash,
    /// Owning wallet.
    pub wallet: WalletId,
    /// Position inside the owning wallet.
    pub position: usize,
}

impl Identified for TransactionSlot {
    type Key = Hash;

    fn identity(&self) -> Hash {
        self.hash
    }
}

impl Rekey for TransactionSlot {
    fn set_identity(&mut self, key: Hash) {
        self.hash = key;
    }
}

/// Identity-indexed table assigning sequential ids.
#[derive(Debug)]
pub struct ObjectRegistry<T: Identified, I: RegistryId> {
    entries: Vec<T>,
    index: HashMap<T::Key, u32>,
    /// Number of ids that can be handed out; the sentinel is never one.
    limit: u32,
    _id: PhantomData<I>,
}

impl<T: Identified, I: RegistryId> ObjectRegistry<T, I> {
    /// Create an empty registry with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            limit: u32::MAX,
            _id: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::with_capacity(0)
        }
    }

    /// Has every assignable id been handed out?
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.limit as usize
    }

    /// Register `entity`, or return the id it already has.
    pub fn insert(&mut self, entity: T) -> I {
        self.insert_with_status(entity).0
    }

    /// Like [`insert`](Self::insert), also reporting whether a new entry was
    /// created. When the key is already present `entity` is dropped.
    pub fn insert_with_status(&mut self, entity: T) -> (I, bool) {
        let key = entity.identity();
        if let Some(&slot) = self.index.get(&key) {
            return (I::from_index(slot), false);
        }

        if self.is_full() {
            return (I::not_found(), false);
        }
        let slot = self.entries.len() as u32;
        self.entries.push(entity);
        self.index.insert(key, slot);
        (I::from_index(slot), true)
    }

    /// Id registered for `key`, or the "not found" sentinel.
    pub fn lookup_id(&self, key: &T::Key) -> I {
        self.index
            .get(key)
            .map_or_else(I::not_found, |&slot| I::from_index(slot))
    }

    /// Entry for `id`.
    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get(id.slot() as usize)
    }

    /// Mutable entry for `id`.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entries.get_mut(id.slot() as usize)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All ids in insertion order.
    pub fn ids(&self) -> Vec<I> {
        (0..self.entries.len() as u32).map(I::from_index).collect()
    }

    /// All entries with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (I::from_index(slot as u32), entry))
    }
}

impl<T: Rekey, I: RegistryId> ObjectRegistry<T, I> {
    /// Move the entry `id` to a new identity key, keeping its id.
    ///
    /// Returns `false` if `id` is unknown or `new_key` already belongs to a
    /// different entry.
    pub fn rekey(&mut self, id: I, new_key: T::Key) -> bool {
        let slot = id.slot();
        let Some(entry) = self.entries.get_mut(slot as usize) else {
            return false;
        };
        match self.index.get(&new_key) {
            Some(&existing) if existing == slot => return true,
            Some(_) => return false,
            None => {}
        }

        self.index.remove(&entry.identity());
        entry.set_identity(new_key.clone());
        self.index.insert(new_key, slot);
        true
    }
}
