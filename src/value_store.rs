//! ValueStore: value payloads stored parallel to the key store's slots.

use crate::key_store::Handle;
use slotmap::{DefaultKey, SecondaryMap};

pub struct ValueStore<V> {
    values: SecondaryMap<DefaultKey, V>,
}

impl<V> ValueStore<V> {
    pub fn new() -> Self {
        Self {
            values: SecondaryMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store `value` for `h`, returning the value it replaces.
    pub fn put(&mut self, h: Handle, value: V) -> Option<V> {
        self.values.insert(h.raw_handle(), value)
    }

    pub fn get(&self, h: Handle) -> Option<&V> {
        self.values.get(h.raw_handle())
    }

    pub fn take(&mut self, h: Handle) -> Option<V> {
        self.values.remove(h.raw_handle())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<V> Default for ValueStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_store::KeyStore;

    /// Invariant: values follow the handles minted by the key store and are
    /// released when replaced or taken.
    #[test]
    fn values_track_key_handles() {
        let mut keys: KeyStore<&'static str> = KeyStore::new();
        let mut values: ValueStore<String> = ValueStore::new();

        let a = keys.insert("a").handle();
        let b = keys.insert("b").handle();
        assert!(values.put(a, "one".to_string()).is_none());
        assert!(values.put(b, "two".to_string()).is_none());
        assert_eq!(values.put(a, "uno".to_string()), Some("one".to_string()));
        assert_eq!(values.get(a).map(String::as_str), Some("uno"));
        assert_eq!(values.len(), 2);

        let (removed, _) = keys.remove(&"b").unwrap();
        assert_eq!(values.take(removed), Some("two".to_string()));
        assert!(values.get(b).is_none());

        // A reused slot with a new generation must not see the old value.
        let c = keys.insert("c").handle();
        assert!(values.get(c).is_none());

        values.clear();
        assert!(values.is_empty());
    }
}
