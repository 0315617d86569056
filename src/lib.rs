//! scalar-hashmap: a single-threaded associative container whose keys and
//! values are dynamically-typed scalar vectors of a host runtime.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: resolve the dynamic types of the host once, at construction,
//!   and run every bulk call against a monomorphic table afterwards.
//! - Layers:
//!   - KeyStore<K, S>: hash index over generational slot handles; owns
//!     the bucket accounting (bucket count, load factor, growth, rehash).
//!   - ValueStore<V>: value payloads stored parallel to the key slots and
//!     addressed by the same handles.
//!   - Table<K, V, S>: the bulk operations (insert/replace, lookup,
//!     existence, erase, enumeration) over coerced host vectors, exposed
//!     through the type-erased `Engine` trait.
//!   - Hashmap: public facade; records the key/value element types and
//!     date tags, applies the configured failure policy.
//!   - module: the name-keyed method table the host binds to.
//!
//! Constraints
//! - Single-threaded: host strings are `Rc`-backed, so `Hashmap` is
//!   `!Send`/`!Sync` without any marker types.
//! - One key type and one value type per instance, fixed at construction.
//! - Keys are unique; inserting a live key replaces its value and keeps
//!   the stored key.
//! - O(1) average lookups; growth and rehash never hash a key twice
//!   because each slot keeps its precomputed `u64` hash.
//!
//! Absent markers
//! - Every element type has a canonical absent marker (NA). Lookups that
//!   miss return the value type's marker.
//! - NA keys are ordinary, hashable, self-equal keys. Real and complex
//!   keys compare by canonical bit pattern: NA is one key, all other NaNs
//!   are one (self-equal) key, and NA never equals NaN.
//!
//! Coercion
//! - Inputs are converted into the instance's declared types losslessly:
//!   widening always succeeds, narrowing only when no information is
//!   lost, strings are never parsed. The first lossy element fails the
//!   call with `Error::CoercionFailed`.
//! - `set_values` is best effort by default: elements before the failing
//!   index stay applied. `HashmapConfig::atomic_updates` makes it
//!   all-or-nothing.
//!
//! Enumeration
//! - No iterator is exposed. `all_keys`, `all_values` and `data` are
//!   snapshots in slot order; with no mutation in between they agree
//!   index by index. The order may change after any mutation.
//!
//! Notes and non-goals
//! - No persistence, no cross-thread sharing, no ordered iteration.
//! - The hasher is `RandomState`; hashing is not meant to be
//!   collision-resistant against adversaries beyond what it provides.

mod coerce;
mod config;
mod error;
mod hashmap;
mod key;
#[cfg(feature = "bench_internal")]
pub mod key_store;
#[cfg(not(feature = "bench_internal"))]
mod key_store;
mod key_store_proptest;
pub mod module;
mod table;
mod value_store;
pub mod vector;

// Public surface
pub use config::HashmapConfig;
pub use error::{Error, Result, Role};
pub use hashmap::{Data, Hashmap};
pub use key_store::MAX_BUCKETS;
pub use vector::{
    is_na_real, Complex, ElementType, HostStr, Logical, RealClass, Vector, NA_INTEGER, NA_REAL,
};
