//! KeyStore: typed key layer with stable slot handles and bucket accounting.

use crate::error::{Error, Result};
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table::Entry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Largest bucket count a rehash or reserve may request.
pub const MAX_BUCKETS: usize = 1 << 30;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }
}

#[derive(Debug)]
struct Slot<K> {
    key: K,
    hash: u64,
}

/// Outcome of [`KeyStore::insert`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Insert {
    /// The key was not present; a fresh slot was created.
    New(Handle),
    /// The key was already live; the stored key is kept.
    Existing(Handle),
}

impl Insert {
    pub fn handle(self) -> Handle {
        match self {
            Insert::New(h) | Insert::Existing(h) => h,
        }
    }
}

/// Hash index over generational slots. Each slot keeps its precomputed
/// hash, so resizing never hashes a key twice.
///
/// The bucket count is a power of two that the store keeps at or above
/// `len / max_load_factor`; the physical index is sized from it.
pub struct KeyStore<K, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Slot<K>>,
    buckets: usize,
    max_load_factor: f64,
    min_buckets: usize,
}

#[cfg(any(test, feature = "bench_internal"))]
impl<K> KeyStore<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

#[cfg(any(test, feature = "bench_internal"))]
impl<K> Default for KeyStore<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over live keys in slot order.
pub struct Iter<'a, K> {
    it: slotmap::basic::Iter<'a, DefaultKey, Slot<K>>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (Handle, &'a K);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, s)| (Handle::new(k), &s.key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, S> KeyStore<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[cfg(any(test, feature = "bench_internal"))]
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_layout(hasher, 1.0, 8)
    }

    /// `max_load_factor` must be finite and positive, `min_buckets` at least 1.
    pub fn with_layout(hasher: S, max_load_factor: f64, min_buckets: usize) -> Self {
        debug_assert!(max_load_factor.is_finite() && max_load_factor > 0.0);
        let min_buckets = min_buckets.clamp(1, MAX_BUCKETS).next_power_of_two();
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            buckets: min_buckets,
            max_load_factor,
            min_buckets,
        }
    }

    fn make_hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.buckets as f64
    }

    /// Entries the physical index holds before it reallocates.
    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    fn buckets_for(&self, entries: usize) -> usize {
        let needed = (entries as f64 / self.max_load_factor).ceil() as usize;
        needed
            .clamp(self.min_buckets, MAX_BUCKETS)
            .next_power_of_two()
    }

    fn capacity_for(&self, buckets: usize) -> usize {
        ((buckets as f64 * self.max_load_factor).floor() as usize).max(self.len())
    }

    // Allocation failure leaves the index as it was.
    fn resize_index(&mut self, capacity: usize) -> Result<()> {
        let Self { index, slots, .. } = self;
        let hasher = |&k: &DefaultKey| slots.get(k).map(|s| s.hash).unwrap_or(0);
        if capacity < index.capacity() {
            index.shrink_to(capacity, hasher);
            return Ok(());
        }
        index
            .try_reserve(capacity - index.len(), hasher)
            .map_err(|_| Error::CapacityExceeded {
                requested: capacity,
            })
    }

    // Doubles the bucket count until the live entries fit under the load
    // factor. The physical index grows on its own during insertion.
    fn fit_buckets(&mut self) {
        let len = self.len();
        if (len as f64) <= self.buckets as f64 * self.max_load_factor {
            return;
        }
        let before = self.buckets;
        while (len as f64) > self.buckets as f64 * self.max_load_factor {
            self.buckets *= 2;
        }
        log::debug!(
            "key store grew from {before} to {} buckets at {len} entries",
            self.buckets
        );
    }

    pub fn find(&self, key: &K) -> Option<Handle> {
        let hash = self.make_hash(key);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|s| s.key == *key)
                    .unwrap_or(false)
            })
            .map(|&k| Handle::new(k))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Insert `key` unless an equal key is live. Never replaces the stored key.
    pub fn insert(&mut self, key: K) -> Insert {
        let hash = self.make_hash(&key);
        let inserted = match self.index.entry(
            hash,
            |&kk| self.slots.get(kk).map(|s| s.key == key).unwrap_or(false),
            |&kk| self.slots.get(kk).map(|s| s.hash).unwrap_or(0),
        ) {
            Entry::Occupied(o) => return Insert::Existing(Handle::new(*o.get())),
            Entry::Vacant(v) => {
                let k = self.slots.insert(Slot { key, hash });
                let _ = v.insert(k);
                k
            }
        };
        self.fit_buckets();
        Insert::New(Handle::new(inserted))
    }

    /// Remove `key`, returning its handle and the stored key.
    pub fn remove(&mut self, key: &K) -> Option<(Handle, K)> {
        let hash = self.make_hash(key);
        let Self { index, slots, .. } = self;
        let occupied = index
            .find_entry(hash, |&kk| {
                slots.get(kk).map(|s| s.key == *key).unwrap_or(false)
            })
            .ok()?;
        let (k, _) = occupied.remove();
        slots.remove(k).map(|s| (Handle::new(k), s.key))
    }

    #[cfg(test)]
    pub fn key(&self, h: Handle) -> Option<&K> {
        self.slots.get(h.raw_handle()).map(|s| &s.key)
    }

    /// Drop every key; the bucket count and index allocation are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
    }

    /// Rebuild the index for `max(requested, len / max_load_factor)` buckets,
    /// rounded up to a power of two. `0` picks the minimum automatically.
    ///
    /// If the index cannot be allocated the store is left unchanged,
    /// bucket count included.
    pub fn rehash(&mut self, requested: usize) -> Result<()> {
        let before = self.buckets;
        let target = self
            .buckets_for(self.len())
            .max(requested.min(MAX_BUCKETS).next_power_of_two());
        self.resize_index(self.capacity_for(target))?;
        self.buckets = target;
        log::debug!(
            "rehash: {before} -> {target} buckets for {} entries (capacity {})",
            self.len(),
            self.index.capacity()
        );
        Ok(())
    }

    /// Make room for `entries` live keys without further growth.
    pub fn reserve(&mut self, entries: usize) -> Result<()> {
        let target = self.buckets_for(entries).max(self.buckets);
        if entries > self.index.capacity() {
            self.resize_index(entries)?;
        }
        if target != self.buckets {
            log::debug!("reserve: {} -> {target} buckets", self.buckets);
            self.buckets = target;
        }
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            it: self.slots.iter(),
        }
    }
}
