//! Hashmap: the host-facing container.

use crate::config::HashmapConfig;
use crate::error::{Error, Result};
use crate::key_store::MAX_BUCKETS;
use crate::table::{self, Engine};
use crate::vector::{ElementType, RealClass, Vector};
use core::fmt;

/// Keys and values paired as a two-column record. Row `i` is a live pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Data {
    pub keys: Vector,
    pub values: Vector,
}

impl Data {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The record as a host list of two columns.
    pub fn into_list(self) -> Vector {
        Vector::List(vec![self.keys, self.values])
    }
}

/// Associative container over host scalar vectors.
///
/// The key and value element types are fixed by the vectors passed to
/// [`Hashmap::new`]. Inputs of other element types are coerced losslessly
/// or rejected; lookups that miss yield the value type's absent marker.
pub struct Hashmap {
    engine: Box<dyn Engine>,
    key_type: ElementType,
    value_type: ElementType,
    key_class: RealClass,
    value_class: RealClass,
    config: HashmapConfig,
}

fn element_type(v: &Vector) -> Result<ElementType> {
    v.element_type().ok_or(Error::TypeUnsupported {
        type_name: v.type_name(),
    })
}

fn class_name(ty: ElementType, class: RealClass) -> &'static str {
    match ty {
        ElementType::Real => class.name(),
        other => other.name(),
    }
}

impl Hashmap {
    /// Build from two equal-length vectors; later duplicate keys win.
    pub fn new(keys: &Vector, values: &Vector) -> Result<Self> {
        Self::with_config(keys, values, HashmapConfig::default())
    }

    pub fn with_config(keys: &Vector, values: &Vector, config: HashmapConfig) -> Result<Self> {
        config.validate()?;
        let key_type = element_type(keys)?;
        let value_type = element_type(values)?;
        if keys.len() != values.len() {
            return Err(Error::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut engine = table::build(key_type, value_type, &config);
        engine.reserve(keys.len())?;
        engine.set_values(keys, values, true)?;
        log::trace!(
            "hashmap<{key_type}, {value_type}> built with {} entries from {} pairs",
            engine.len(),
            keys.len()
        );

        Ok(Self {
            engine,
            key_type,
            value_type,
            key_class: keys.real_class(),
            value_class: values.real_class(),
            config,
        })
    }

    pub fn size(&self) -> usize {
        self.engine.len()
    }

    pub fn empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn clear(&mut self) {
        log::trace!("clearing {} entries", self.engine.len());
        self.engine.clear();
    }

    /// Insert or replace `keys[j] -> values[j]`; a single value is broadcast
    /// over all keys. See [`HashmapConfig::atomic_updates`] for the failure
    /// policy.
    pub fn set_values(&mut self, keys: &Vector, values: &Vector) -> Result<()> {
        self.engine
            .set_values(keys, values, self.config.atomic_updates)
    }

    pub fn find_values(&self, keys: &Vector) -> Result<Vector> {
        Ok(self
            .engine
            .find_values(keys)?
            .with_class(self.value_class))
    }

    pub fn has_key(&self, keys: &Vector) -> Result<Vector> {
        self.engine.has_key(keys)
    }

    /// Remove the given keys; returns how many were present.
    pub fn erase(&mut self, keys: &Vector) -> Result<usize> {
        self.engine.erase(keys)
    }

    pub fn all_keys(&self) -> Vector {
        self.keys_n(usize::MAX)
    }

    pub fn all_values(&self) -> Vector {
        self.values_n(usize::MAX)
    }

    /// The first `n` keys of the enumeration order.
    pub fn keys_n(&self, n: usize) -> Vector {
        self.engine.keys_n(n).with_class(self.key_class)
    }

    /// The first `n` values, aligned with [`Hashmap::keys_n`].
    pub fn values_n(&self, n: usize) -> Vector {
        self.engine.values_n(n).with_class(self.value_class)
    }

    pub fn data(&self) -> Data {
        let (keys, values) = self.engine.data();
        Data {
            keys: keys.with_class(self.key_class),
            values: values.with_class(self.value_class),
        }
    }

    /// Resize to at least `buckets` buckets (`0` = automatic) and rebuild
    /// the index. Entries are unaffected.
    pub fn rehash(&mut self, buckets: usize) -> Result<()> {
        if buckets > MAX_BUCKETS {
            return Err(Error::InvalidArgument(format!(
                "bucket count {buckets} exceeds {MAX_BUCKETS}"
            )));
        }
        self.engine.rehash(buckets)
    }

    pub fn reserve(&mut self, entries: usize) -> Result<()> {
        if entries > MAX_BUCKETS {
            return Err(Error::InvalidArgument(format!(
                "cannot reserve {entries} entries"
            )));
        }
        self.engine.reserve(entries)
    }

    pub fn bucket_count(&self) -> usize {
        self.engine.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.engine.load_factor()
    }

    pub fn max_load_factor(&self) -> f64 {
        self.engine.max_load_factor()
    }

    pub fn key_type(&self) -> ElementType {
        self.key_type
    }

    pub fn value_type(&self) -> ElementType {
        self.value_type
    }

    /// Host class of the keys, e.g. `character` or `Date`.
    pub fn key_class(&self) -> &'static str {
        class_name(self.key_type, self.key_class)
    }

    pub fn value_class(&self) -> &'static str {
        class_name(self.value_type, self.value_class)
    }

    pub fn config(&self) -> &HashmapConfig {
        &self.config
    }
}

impl fmt::Debug for Hashmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hashmap")
            .field("key_class", &self.key_class())
            .field("value_class", &self.value_class())
            .field("size", &self.size())
            .field("bucket_count", &self.bucket_count())
            .finish()
    }
}
