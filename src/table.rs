//! Table: monomorphic key/value storage behind a type-erased bulk interface.
//!
//! One `Table<K, V>` instantiation exists per key × value element type;
//! [`build`] picks it from the element types fixed at construction.

use crate::coerce::{coerce, Coerced, Element};
use crate::config::HashmapConfig;
use crate::error::{Error, Result, Role};
use crate::key::{ComplexKey, KeyElement, RealKey};
use crate::key_store::KeyStore;
use crate::value_store::ValueStore;
use crate::vector::{Complex, ElementType, HostStr, Logical, Vector};
use core::hash::BuildHasher;
use std::collections::hash_map::RandomState;

/// Bulk operations over host vectors, independent of the stored types.
pub(crate) trait Engine {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Insert or replace pairs in index order. With `atomic`, a coercion
    /// failure anywhere leaves the table untouched; otherwise the elements
    /// before the failing index stay applied.
    fn set_values(&mut self, keys: &Vector, values: &Vector, atomic: bool) -> Result<()>;

    fn find_values(&self, keys: &Vector) -> Result<Vector>;

    fn has_key(&self, keys: &Vector) -> Result<Vector>;

    fn erase(&mut self, keys: &Vector) -> Result<usize>;

    fn keys_n(&self, n: usize) -> Vector;

    fn values_n(&self, n: usize) -> Vector;

    /// Keys and values in one pass, aligned index by index.
    fn data(&self) -> (Vector, Vector);

    fn rehash(&mut self, buckets: usize) -> Result<()>;

    fn reserve(&mut self, entries: usize) -> Result<()>;

    fn bucket_count(&self) -> usize;

    fn load_factor(&self) -> f64;

    fn max_load_factor(&self) -> f64;
}

pub(crate) struct Table<K, V, S = RandomState> {
    keys: KeyStore<K, S>,
    values: ValueStore<V>,
}

impl<K, V> Table<K, V>
where
    K: KeyElement,
    V: Element,
{
    pub fn new(config: &HashmapConfig) -> Self {
        Self::with_hasher(RandomState::new(), config)
    }
}

impl<K, V, S> Table<K, V, S>
where
    K: KeyElement,
    V: Element,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S, config: &HashmapConfig) -> Self {
        Self {
            keys: KeyStore::with_layout(hasher, config.max_load_factor, config.min_buckets),
            values: ValueStore::new(),
        }
    }

    // Replacing a value drops the old one, releasing any string it held.
    fn put(&mut self, key: K, value: V) {
        let h = self.keys.insert(key).handle();
        let _ = self.values.put(h, value);
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.keys.find(key).and_then(|h| self.values.get(h))
    }
}

impl<K, V, S> Engine for Table<K, V, S>
where
    K: KeyElement,
    V: Element,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
        debug_assert!(self.values.is_empty());
    }

    fn set_values(&mut self, keys: &Vector, values: &Vector, atomic: bool) -> Result<()> {
        let n = keys.len();
        let broadcast = values.len() == 1 && n != 1;
        if values.len() != n && !broadcast {
            return Err(Error::LengthMismatch {
                keys: n,
                values: values.len(),
            });
        }

        let Coerced {
            items: key_items,
            failure: key_failure,
        } = coerce::<K>(keys, Role::Key)?;
        let Coerced {
            items: value_items,
            failure: value_failure,
        } = coerce::<V>(values, Role::Value)?;

        // Number of leading elements whose key and value both converted.
        let keys_ok = key_items.len();
        let values_ok = match (broadcast, value_items.is_empty()) {
            (true, true) => 0,
            (true, false) => n,
            (false, _) => value_items.len(),
        };
        let applied = keys_ok.min(values_ok);
        let failure = if applied == n {
            None
        } else if keys_ok <= values_ok {
            key_failure
        } else {
            value_failure
        };

        if atomic {
            if let Some(e) = failure {
                return Err(e);
            }
        }

        if broadcast {
            if let Some(value) = value_items.first() {
                for key in key_items.into_iter().take(applied) {
                    self.put(key, value.clone());
                }
            }
        } else {
            for (key, value) in key_items.into_iter().zip(value_items).take(applied) {
                self.put(key, value);
            }
        }

        match failure {
            Some(e) => {
                log::warn!("set_values stopped after {applied} of {n} elements: {e}");
                Err(e)
            }
            None => Ok(()),
        }
    }

    fn find_values(&self, keys: &Vector) -> Result<Vector> {
        let query = coerce::<K>(keys, Role::Key)?.into_result()?;
        let found = query
            .iter()
            .map(|k| self.lookup(k).cloned().unwrap_or_else(V::absent))
            .collect();
        Ok(V::into_vector(found))
    }

    fn has_key(&self, keys: &Vector) -> Result<Vector> {
        let query = coerce::<K>(keys, Role::Key)?.into_result()?;
        Ok(Vector::Logical(
            query
                .iter()
                .map(|k| Logical::from(self.keys.contains_key(k)))
                .collect(),
        ))
    }

    fn erase(&mut self, keys: &Vector) -> Result<usize> {
        let query = coerce::<K>(keys, Role::Key)?.into_result()?;
        let mut removed = 0;
        for k in &query {
            if let Some((h, _key)) = self.keys.remove(k) {
                let _ = self.values.take(h);
                removed += 1;
            }
        }
        debug_assert_eq!(self.values.len(), self.keys.len());
        Ok(removed)
    }

    fn keys_n(&self, n: usize) -> Vector {
        K::into_vector(self.keys.iter().take(n).map(|(_, k)| k.clone()).collect())
    }

    fn values_n(&self, n: usize) -> Vector {
        V::into_vector(
            self.keys
                .iter()
                .take(n)
                .map(|(h, _)| self.values.get(h).cloned().unwrap_or_else(V::absent))
                .collect(),
        )
    }

    fn data(&self) -> (Vector, Vector) {
        let mut keys = Vec::with_capacity(self.len());
        let mut values = Vec::with_capacity(self.len());
        for (h, k) in self.keys.iter() {
            keys.push(k.clone());
            values.push(self.values.get(h).cloned().unwrap_or_else(V::absent));
        }
        (K::into_vector(keys), V::into_vector(values))
    }

    fn rehash(&mut self, buckets: usize) -> Result<()> {
        self.keys.rehash(buckets)
    }

    fn reserve(&mut self, entries: usize) -> Result<()> {
        self.keys.reserve(entries)
    }

    fn bucket_count(&self) -> usize {
        self.keys.bucket_count()
    }

    fn load_factor(&self) -> f64 {
        self.keys.load_factor()
    }

    fn max_load_factor(&self) -> f64 {
        self.keys.max_load_factor()
    }
}

/// Pick the table instantiation for a key/value element type pair.
pub(crate) fn build(key: ElementType, value: ElementType, config: &HashmapConfig) -> Box<dyn Engine> {
    macro_rules! with_value {
        ($K:ty) => {
            match value {
                ElementType::Logical => Box::new(Table::<$K, Logical>::new(config)) as Box<dyn Engine>,
                ElementType::Integer => Box::new(Table::<$K, i32>::new(config)),
                ElementType::Real => Box::new(Table::<$K, f64>::new(config)),
                ElementType::Complex => Box::new(Table::<$K, Complex>::new(config)),
                ElementType::Character => Box::new(Table::<$K, HostStr>::new(config)),
                ElementType::Raw => Box::new(Table::<$K, u8>::new(config)),
            }
        };
    }

    match key {
        ElementType::Logical => with_value!(Logical),
        ElementType::Integer => with_value!(i32),
        ElementType::Real => with_value!(RealKey),
        ElementType::Complex => with_value!(ComplexKey),
        ElementType::Character => with_value!(HostStr),
        ElementType::Raw => with_value!(u8),
    }
}
