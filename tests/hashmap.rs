// Hashmap unit test suite (consolidated).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Round-trip: construct(K, V); find_values(K) == V for distinct keys.
// - Replacement: inserting a live key replaces its value, size unchanged.
// - Absence: misses yield the value type's absent marker.
// - Enumeration: all_keys/all_values/data agree index by index.
// - Absent-marker keys: NA is a legal key distinct from NaN.
// - Rehash invariance: bucket changes never change observable contents.
use scalar_hashmap::{
    Complex, Data, ElementType, Error, Hashmap, HashmapConfig, HostStr, Logical, Role, Vector,
    MAX_BUCKETS, NA_INTEGER, NA_REAL,
};
use std::collections::HashMap;

fn ints(v: &[i32]) -> Vector {
    Vector::Integer(v.to_vec())
}

fn reals(v: &[f64]) -> Vector {
    Vector::real(v.to_vec())
}

fn strs(v: &[&str]) -> Vector {
    Vector::character(v.iter().copied())
}

// Test: scenario 1, string keys with real values.
// Verifies: lookups in query order, NA for misses, has_key, size.
#[test]
fn string_keys_lookup_in_query_order() {
    let m = Hashmap::new(&strs(&["a", "b", "c"]), &ints(&[1, 2, 3])).unwrap();
    assert_eq!(
        m.find_values(&strs(&["b", "x", "a"])).unwrap(),
        ints(&[2, NA_INTEGER, 1])
    );
    assert_eq!(
        m.has_key(&strs(&["a", "x"])).unwrap(),
        Vector::from(vec![true, false])
    );
    assert_eq!(m.size(), 3);
}

// Test: scenario 2, empty construction then typed inserts.
// Assumes: empty vectors still fix the key/value element types.
// Verifies: real keys narrow losslessly to integer; later duplicates win.
#[test]
fn empty_construction_then_insert() {
    let mut m = Hashmap::new(&ints(&[]), &reals(&[])).unwrap();
    assert!(m.empty());
    assert_eq!(m.key_type(), ElementType::Integer);
    assert_eq!(m.value_type(), ElementType::Real);

    m.set_values(&reals(&[10.0, 20.0, 10.0]), &reals(&[1.5, 2.5, 9.5]))
        .unwrap();
    assert_eq!(m.size(), 2);
    assert_eq!(m.find_values(&reals(&[10.0])).unwrap(), reals(&[9.5]));
}

// Test: scenario 3, the absent marker as a real key.
// Verifies: NA matches NA only; NaN is not NA; NA lookups return the value.
#[test]
fn na_real_is_a_key_distinct_from_nan() {
    let m = Hashmap::new(&reals(&[1.0, NA_REAL]), &strs(&["x", "y"])).unwrap();
    assert_eq!(
        m.has_key(&reals(&[NA_REAL, f64::NAN, 1.0])).unwrap(),
        Vector::from(vec![true, false, true])
    );
    assert_eq!(m.find_values(&reals(&[NA_REAL])).unwrap(), strs(&["y"]));
    assert_eq!(
        m.find_values(&reals(&[f64::NAN])).unwrap(),
        Vector::Character(vec![HostStr::NA])
    );
}

// Test: NaN used as a key is self-equal once inserted, and still not NA.
#[test]
fn nan_key_matches_itself_once_inserted() {
    let mut m = Hashmap::new(&reals(&[NA_REAL]), &ints(&[1])).unwrap();
    m.set_values(&reals(&[f64::NAN]), &ints(&[2])).unwrap();
    assert_eq!(m.size(), 2);
    assert_eq!(
        m.find_values(&reals(&[f64::NAN, NA_REAL])).unwrap(),
        ints(&[2, 1])
    );
}

// Test: scenario 4, scalar broadcast.
// Verifies: one value is applied to every key; new keys are created.
#[test]
fn scalar_value_broadcasts_over_keys() {
    let mut m = Hashmap::new(&ints(&[1, 2]), &ints(&[10, 20])).unwrap();
    m.set_values(&ints(&[3, 4, 5]), &ints(&[30])).unwrap();
    assert_eq!(m.size(), 5);
    assert_eq!(
        m.find_values(&ints(&[3, 4, 5, 1])).unwrap(),
        ints(&[30, 30, 30, 10])
    );
}

// Test: scenario 5, coercion failure on the value slot.
// Verifies: CoercionFailed; size unchanged.
#[test]
fn string_value_into_integer_map_fails() {
    let mut m = Hashmap::new(&ints(&[1, 2, 3]), &ints(&[1, 2, 3])).unwrap();
    let err = m.set_values(&ints(&[4]), &strs(&["bad"])).unwrap_err();
    assert_eq!(
        err,
        Error::CoercionFailed {
            role: Role::Value,
            index: 0,
            from: ElementType::Character,
            to: ElementType::Integer,
        }
    );
    assert_eq!(m.size(), 3);
    assert_eq!(m.has_key(&ints(&[4])).unwrap(), Vector::from(vec![false]));
}

// Test: scenario 6, large map rehashed down and up.
// Verifies: every lookup stays correct across rehash(1) and rehash(1 << 20).
#[test]
fn large_map_survives_rehash() {
    let n = 100_000;
    let keys: Vec<i32> = (0..n).map(|i| i * 7 + 3).collect();
    let values: Vec<f64> = (0..n).map(|i| f64::from(i) / 4.0).collect();
    let mut m = Hashmap::new(&ints(&keys), &reals(&values)).unwrap();
    assert_eq!(m.size(), n as usize);

    m.rehash(1).unwrap();
    assert!(m.bucket_count() >= n as usize);
    assert_eq!(m.find_values(&ints(&keys)).unwrap(), reals(&values));

    m.rehash(1 << 20).unwrap();
    assert_eq!(m.bucket_count(), 1 << 20);
    assert_eq!(m.find_values(&ints(&keys)).unwrap(), reals(&values));
    assert_eq!(m.size(), n as usize);
}

// Test: round-trip for every key/value element type pair.
// Assumes: distinct keys.
#[test]
fn round_trip_every_type_pair() {
    let samples = vec![
        Vector::Logical(vec![Logical::True, Logical::False, Logical::Na]),
        ints(&[7, NA_INTEGER, -2]),
        reals(&[0.5, NA_REAL, -3.0]),
        Vector::Complex(vec![
            Complex::new(1.0, 2.0),
            Complex::NA,
            Complex::new(-1.0, 0.0),
        ]),
        Vector::Character(vec![HostStr::new("p"), HostStr::NA, HostStr::new("q")]),
        Vector::Raw(vec![0, 128, 255]),
    ];
    for keys in &samples {
        for values in &samples {
            let m = Hashmap::new(keys, values).unwrap();
            assert_eq!(m.size(), 3, "{} -> {}", keys.type_name(), values.type_name());
            assert_eq!(&m.find_values(keys).unwrap(), values);
            assert_eq!(
                m.has_key(keys).unwrap(),
                Vector::from(vec![true, true, true])
            );
        }
    }
}

// Test: replacement keeps size and swaps the value.
#[test]
fn replacement_keeps_size() {
    let mut m = Hashmap::new(&strs(&["k"]), &reals(&[1.0])).unwrap();
    m.set_values(&strs(&["k"]), &reals(&[2.0])).unwrap();
    let size = m.size();
    m.set_values(&strs(&["k"]), &reals(&[3.0])).unwrap();
    assert_eq!(m.size(), size);
    assert_eq!(m.find_values(&strs(&["k"])).unwrap(), reals(&[3.0]));
}

// Test: absent markers for misses across value types.
#[test]
fn misses_return_value_type_absent_marker() {
    let m = Hashmap::new(&ints(&[1]), &Vector::Logical(vec![Logical::True])).unwrap();
    assert_eq!(
        m.find_values(&ints(&[2])).unwrap(),
        Vector::Logical(vec![Logical::Na])
    );
    let m = Hashmap::new(&ints(&[1]), &Vector::Complex(vec![Complex::new(1.0, 1.0)])).unwrap();
    assert_eq!(
        m.find_values(&ints(&[2])).unwrap(),
        Vector::Complex(vec![Complex::NA])
    );
    let m = Hashmap::new(&ints(&[1]), &reals(&[1.0])).unwrap();
    let v = m.find_values(&ints(&[2])).unwrap();
    assert!(scalar_hashmap::is_na_real(v.as_real().unwrap()[0]));
}

// Test: enumeration consistency.
// Verifies: all_keys/all_values align; data equals their pairing; size matches.
#[test]
fn enumeration_is_consistent() {
    let keys: Vec<String> = (0..200).map(|i| format!("key{i}")).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let values: Vec<i32> = (0..200).collect();
    let mut m = Hashmap::new(&strs(&key_refs), &ints(&values)).unwrap();
    m.erase(&strs(&["key5", "key150"])).unwrap();

    let all_keys = m.all_keys();
    let all_values = m.all_values();
    assert_eq!(all_keys.len(), m.size());
    assert_eq!(
        m.data(),
        Data {
            keys: all_keys.clone(),
            values: all_values.clone(),
        }
    );

    let pairs: HashMap<String, i32> = all_keys
        .as_character()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap().to_string())
        .zip(all_values.as_integer().unwrap().iter().copied())
        .collect();
    assert_eq!(pairs.len(), 198);
    for (k, v) in &pairs {
        assert_eq!(k, &format!("key{v}"));
    }
    assert!(!pairs.contains_key("key5"));
}

// Test: keys_n/values_n are prefixes of the full enumeration.
#[test]
fn first_n_snapshots_are_prefixes() {
    let m = Hashmap::new(&ints(&[1, 2, 3, 4]), &ints(&[10, 20, 30, 40])).unwrap();
    let keys = m.all_keys().as_integer().unwrap().to_vec();
    let values = m.all_values().as_integer().unwrap().to_vec();
    assert_eq!(m.keys_n(2), ints(&keys[..2]));
    assert_eq!(m.values_n(2), ints(&values[..2]));
    assert_eq!(m.keys_n(100), ints(&keys));
    assert_eq!(m.keys_n(0), ints(&[]));
}

// Test: clear is idempotent and releases everything.
#[test]
fn clear_is_idempotent() {
    let mut m = Hashmap::new(&strs(&["a", "b"]), &ints(&[1, 2])).unwrap();
    m.clear();
    m.clear();
    assert_eq!(m.size(), 0);
    assert!(m.empty());
    assert_eq!(m.all_keys(), Vector::Character(vec![]));
    assert_eq!(
        m.find_values(&strs(&["a"])).unwrap(),
        ints(&[NA_INTEGER])
    );
    // Still usable with the same types after clearing.
    m.set_values(&strs(&["c"]), &ints(&[3])).unwrap();
    assert_eq!(m.size(), 1);
}

// Test: rehash invariance over a range of hints.
#[test]
fn rehash_does_not_change_contents() {
    let mut m = Hashmap::new(&ints(&(0..500).collect::<Vec<_>>()), &reals(&[0.0; 500])).unwrap();
    m.set_values(&ints(&[1000, NA_INTEGER]), &reals(&[1.0, 2.0])).unwrap();
    let probe = ints(&[0, 250, 499, 1000, NA_INTEGER, 5000]);
    let found = m.find_values(&probe).unwrap();
    let present = m.has_key(&probe).unwrap();
    let mut keys = m.all_keys().as_integer().unwrap().to_vec();
    keys.sort_unstable();

    for b in [0, 1, 7, 64, 512, 513, 4096, 0] {
        m.rehash(b).unwrap();
        assert!(m.bucket_count() >= b);
        assert!(m.bucket_count().is_power_of_two());
        assert!(m.load_factor() <= m.max_load_factor());
        assert_eq!(m.find_values(&probe).unwrap(), found);
        assert_eq!(m.has_key(&probe).unwrap(), present);
        let mut after = m.all_keys().as_integer().unwrap().to_vec();
        after.sort_unstable();
        assert_eq!(after, keys);
        assert_eq!(m.size(), 502);
    }
}

// Test: a bucket hint the index cannot be allocated for.
// Assumes: with a huge load factor the largest hint needs more slots than
// any allocation can describe.
// Verifies: rehash and reserve return CapacityExceeded instead of aborting;
// bucket count and contents are unchanged and the map stays usable.
#[test]
fn unallocatable_rehash_is_recoverable() {
    let config = HashmapConfig::default().with_max_load_factor(1e10);
    let mut m = Hashmap::with_config(&ints(&[1, 2]), &ints(&[10, 20]), config).unwrap();
    let buckets = m.bucket_count();

    assert!(matches!(
        m.rehash(MAX_BUCKETS),
        Err(Error::CapacityExceeded { .. })
    ));
    assert_eq!(m.bucket_count(), buckets);
    assert_eq!(m.size(), 2);
    assert_eq!(m.find_values(&ints(&[1, 2, 3])).unwrap(), ints(&[10, 20, NA_INTEGER]));

    m.set_values(&ints(&[3]), &ints(&[30])).unwrap();
    m.rehash(0).unwrap();
    assert_eq!(m.find_values(&ints(&[3])).unwrap(), ints(&[30]));
}

// Test: reserve pre-sizes the bucket array.
#[test]
fn reserve_presizes_buckets() {
    let mut m = Hashmap::new(&ints(&[]), &ints(&[])).unwrap();
    m.reserve(1000).unwrap();
    let buckets = m.bucket_count();
    assert!(buckets >= 1000);
    m.set_values(&ints(&(0..1000).collect::<Vec<_>>()), &ints(&[1]))
        .unwrap();
    assert_eq!(m.bucket_count(), buckets);
}

// Test: per-element best effort versus atomic updates.
// Verifies: default applies the prefix; atomic config applies nothing.
#[test]
fn failure_policy_best_effort_and_atomic() {
    let keys = reals(&[1.0, 2.0, 3.5, 4.0]);
    let values = ints(&[1, 2, 3, 4]);

    let mut m = Hashmap::new(&ints(&[]), &ints(&[])).unwrap();
    let err = m.set_values(&keys, &values).unwrap_err();
    assert!(matches!(err, Error::CoercionFailed { role: Role::Key, index: 2, .. }));
    assert_eq!(m.size(), 2);

    let mut m = Hashmap::with_config(&ints(&[]), &ints(&[]), HashmapConfig::atomic()).unwrap();
    assert!(m.set_values(&keys, &values).is_err());
    assert_eq!(m.size(), 0);
}

// Test: length mismatch is detected before any mutation.
#[test]
fn length_mismatch_rejected() {
    let mut m = Hashmap::new(&ints(&[1]), &ints(&[1])).unwrap();
    assert_eq!(
        m.set_values(&ints(&[2, 3, 4]), &ints(&[2, 3])).unwrap_err(),
        Error::LengthMismatch { keys: 3, values: 2 }
    );
    assert_eq!(m.size(), 1);
}

// Test: unsupported input vectors in bulk calls.
#[test]
fn unsupported_inputs_rejected() {
    let mut m = Hashmap::new(&ints(&[1]), &ints(&[1])).unwrap();
    assert_eq!(
        m.find_values(&Vector::Null).unwrap_err(),
        Error::TypeUnsupported { type_name: "NULL" }
    );
    assert!(matches!(
        m.set_values(&Vector::List(vec![ints(&[1])]), &ints(&[2])),
        Err(Error::TypeUnsupported { type_name: "list" })
    ));
    assert!(m.has_key(&Vector::List(vec![])).is_err());
}

// Test: query coercion follows the declared key type.
#[test]
fn queries_are_coerced_to_key_type() {
    let m = Hashmap::new(&strs(&["1", "2"]), &ints(&[10, 20])).unwrap();
    // Integers widen to their decimal strings.
    assert_eq!(m.find_values(&ints(&[2, 3])).unwrap(), ints(&[20, NA_INTEGER]));

    let m = Hashmap::new(&reals(&[1.0, 2.0]), &ints(&[10, 20])).unwrap();
    assert_eq!(
        m.find_values(&Vector::Logical(vec![Logical::True])).unwrap(),
        ints(&[10])
    );
    // Strings never parse into numbers.
    assert!(matches!(
        m.find_values(&strs(&["1"])),
        Err(Error::CoercionFailed { role: Role::Key, .. })
    ));
}

// Test: erase removes present keys and reports the count.
#[test]
fn erase_counts_removed_keys() {
    let mut m = Hashmap::new(&strs(&["a", "b", "c"]), &ints(&[1, 2, 3])).unwrap();
    assert_eq!(m.erase(&strs(&["a", "zz", "a"])).unwrap(), 1);
    assert_eq!(m.size(), 2);
    assert_eq!(
        m.has_key(&strs(&["a", "b", "c"])).unwrap(),
        Vector::from(vec![false, true, true])
    );
}

// Test: shared string storage is referenced, not copied, and released.
// Assumes: HostStr clones share one allocation.
// Verifies: the map holds strong references; replacement, erase and clear
// release them.
#[test]
fn string_references_are_released() {
    let key = HostStr::new("key");
    let value = HostStr::new("value");
    let mut m = Hashmap::new(
        &Vector::Character(vec![key.clone()]),
        &Vector::Character(vec![value.clone()]),
    )
    .unwrap();
    assert!(key.ref_count() >= 2);
    assert!(value.ref_count() >= 2);

    m.set_values(&Vector::Character(vec![key.clone()]), &strs(&["other"]))
        .unwrap();
    assert_eq!(value.ref_count(), 1, "replaced value released");

    m.clear();
    assert_eq!(key.ref_count(), 1, "cleared key released");

    m.set_values(&Vector::Character(vec![key.clone()]), &Vector::Character(vec![value.clone()]))
        .unwrap();
    m.erase(&strs(&["key"])).unwrap();
    assert_eq!(key.ref_count(), 1);
    assert_eq!(value.ref_count(), 1);

    m.set_values(&Vector::Character(vec![key.clone()]), &strs(&["v"]))
        .unwrap();
    drop(m);
    assert_eq!(key.ref_count(), 1, "dropping the map releases keys");
}

// Test: date tags survive storage and lookup.
#[test]
fn date_values_keep_their_class() {
    let m = Hashmap::new(&strs(&["start", "end"]), &Vector::dates(vec![19000.0, 19100.0])).unwrap();
    assert_eq!(m.value_class(), "Date");
    assert_eq!(
        m.find_values(&strs(&["end", "none"])).unwrap(),
        Vector::dates(vec![19100.0, NA_REAL])
    );
    assert_eq!(m.all_values().class_name(), "Date");
}
