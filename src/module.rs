//! Method table the host binds to.
//!
//! Names are contractual: the host looks methods up by string, including
//! the indexed-access aliases `[[<-` (assign) and `[[` (read). Every
//! method returns a host vector; mutators return `NULL`.

use crate::error::{Error, Result};
use crate::hashmap::Hashmap;
use crate::vector::{is_na_real, HostStr, Vector, NA_INTEGER};

/// Class name under which the container is exported.
pub const CLASS_NAME: &str = "Hashmap";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Method {
    Size,
    Empty,
    Clear,
    SetValues,
    FindValues,
    HasKey,
    AllKeys,
    AllValues,
    Data,
    Rehash,
    Erase,
    Reserve,
    BucketCount,
    LoadFactor,
    KeyClass,
    ValueClass,
    KeysN,
    ValuesN,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MethodKind {
    Observer,
    Mutator,
    Snapshot,
}

/// One exported name.
#[derive(Copy, Clone, Debug)]
pub struct Binding {
    pub name: &'static str,
    pub method: Method,
    pub kind: MethodKind,
    pub min_args: usize,
    pub max_args: usize,
    arity: &'static str,
}

const fn bind(
    name: &'static str,
    method: Method,
    kind: MethodKind,
    min_args: usize,
    max_args: usize,
    arity: &'static str,
) -> Binding {
    Binding {
        name,
        method,
        kind,
        min_args,
        max_args,
        arity,
    }
}

pub const METHODS: &[Binding] = &[
    bind("size", Method::Size, MethodKind::Observer, 0, 0, "0"),
    bind("empty", Method::Empty, MethodKind::Observer, 0, 0, "0"),
    bind("clear", Method::Clear, MethodKind::Mutator, 0, 0, "0"),
    bind("set_values", Method::SetValues, MethodKind::Mutator, 2, 2, "2"),
    bind("[[<-", Method::SetValues, MethodKind::Mutator, 2, 2, "2"),
    bind("find_values", Method::FindValues, MethodKind::Observer, 1, 1, "1"),
    bind("[[", Method::FindValues, MethodKind::Observer, 1, 1, "1"),
    bind("has_key", Method::HasKey, MethodKind::Observer, 1, 1, "1"),
    bind("all_keys", Method::AllKeys, MethodKind::Snapshot, 0, 0, "0"),
    bind("all_values", Method::AllValues, MethodKind::Snapshot, 0, 0, "0"),
    bind("data", Method::Data, MethodKind::Snapshot, 0, 0, "0"),
    bind("rehash", Method::Rehash, MethodKind::Mutator, 0, 1, "0 or 1"),
    bind("erase", Method::Erase, MethodKind::Mutator, 1, 1, "1"),
    bind("reserve", Method::Reserve, MethodKind::Mutator, 1, 1, "1"),
    bind("bucket_count", Method::BucketCount, MethodKind::Observer, 0, 0, "0"),
    bind("load_factor", Method::LoadFactor, MethodKind::Observer, 0, 0, "0"),
    bind("key_class", Method::KeyClass, MethodKind::Observer, 0, 0, "0"),
    bind("value_class", Method::ValueClass, MethodKind::Observer, 0, 0, "0"),
    bind("keys_n", Method::KeysN, MethodKind::Snapshot, 1, 1, "1"),
    bind("values_n", Method::ValuesN, MethodKind::Snapshot, 1, 1, "1"),
];

pub fn lookup(name: &str) -> Option<&'static Binding> {
    METHODS.iter().find(|b| b.name == name)
}

// Counts cross the boundary as doubles, like `size_t` does.
fn count(n: usize) -> Vector {
    Vector::real(vec![n as f64])
}

/// Read a non-negative whole-number scalar argument.
fn count_arg(method: &'static str, v: &Vector) -> Result<usize> {
    let invalid = || {
        Error::InvalidArgument(format!(
            "`{method}` expects a non-negative whole number, got a {} of length {}",
            v.type_name(),
            v.len()
        ))
    };
    if v.len() != 1 {
        return Err(invalid());
    }
    match v {
        Vector::Integer(x) if x[0] != NA_INTEGER && x[0] >= 0 => {
            usize::try_from(x[0]).map_err(|_| invalid())
        }
        Vector::Real { data, .. }
            if !is_na_real(data[0])
                && data[0].is_finite()
                && data[0] >= 0.0
                && data[0].fract() == 0.0
                && data[0] <= usize::MAX as f64 =>
        {
            Ok(data[0] as usize)
        }
        _ => Err(invalid()),
    }
}

fn check_arity(binding: &Binding, args: &[Vector]) -> Result<()> {
    if args.len() < binding.min_args || args.len() > binding.max_args {
        return Err(Error::Arity {
            method: binding.name,
            expected: binding.arity,
            got: args.len(),
        });
    }
    Ok(())
}

/// The constructor binding: `new(Hashmap, keys, values)`.
pub fn construct(args: &[Vector]) -> Result<Hashmap> {
    if args.len() != 2 {
        return Err(Error::Arity {
            method: CLASS_NAME,
            expected: "2",
            got: args.len(),
        });
    }
    Hashmap::new(&args[0], &args[1])
}

/// Call the method bound to `name` on `map`.
pub fn invoke(map: &mut Hashmap, name: &str, args: &[Vector]) -> Result<Vector> {
    let binding = lookup(name).ok_or_else(|| Error::UnknownMethod(name.to_string()))?;
    check_arity(binding, args)?;
    log::trace!("invoke {name} with {} argument(s)", args.len());

    let out = match binding.method {
        Method::Size => count(map.size()),
        Method::Empty => Vector::from(vec![map.empty()]),
        Method::Clear => {
            map.clear();
            Vector::Null
        }
        Method::SetValues => {
            map.set_values(&args[0], &args[1])?;
            Vector::Null
        }
        Method::FindValues => map.find_values(&args[0])?,
        Method::HasKey => map.has_key(&args[0])?,
        Method::AllKeys => map.all_keys(),
        Method::AllValues => map.all_values(),
        Method::Data => map.data().into_list(),
        Method::Rehash => {
            let buckets = match args.first() {
                Some(v) => count_arg(binding.name, v)?,
                None => 0,
            };
            map.rehash(buckets)?;
            Vector::Null
        }
        Method::Erase => count(map.erase(&args[0])?),
        Method::Reserve => {
            map.reserve(count_arg(binding.name, &args[0])?)?;
            Vector::Null
        }
        Method::BucketCount => count(map.bucket_count()),
        Method::LoadFactor => Vector::real(vec![map.load_factor()]),
        Method::KeyClass => Vector::Character(vec![HostStr::new(map.key_class())]),
        Method::ValueClass => Vector::Character(vec![HostStr::new(map.value_class())]),
        Method::KeysN => map.keys_n(count_arg(binding.name, &args[0])?),
        Method::ValuesN => map.values_n(count_arg(binding.name, &args[0])?),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_is_unique() {
        for (i, a) in METHODS.iter().enumerate() {
            for b in &METHODS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn aliases_share_the_method() {
        assert_eq!(lookup("[[<-").unwrap().method, Method::SetValues);
        assert_eq!(lookup("[[").unwrap().method, Method::FindValues);
        assert_eq!(lookup("set_values").unwrap().kind, MethodKind::Mutator);
        assert!(lookup("insert").is_none());
    }

    #[test]
    fn count_arguments_must_be_whole_and_non_negative() {
        assert_eq!(count_arg("rehash", &Vector::Integer(vec![16])).unwrap(), 16);
        assert_eq!(count_arg("rehash", &Vector::real(vec![1024.0])).unwrap(), 1024);
        for bad in [
            Vector::Integer(vec![-1]),
            Vector::Integer(vec![NA_INTEGER]),
            Vector::real(vec![1.5]),
            Vector::real(vec![f64::NAN]),
            Vector::real(vec![1.0, 2.0]),
            Vector::character(["8"]),
        ] {
            assert!(matches!(
                count_arg("rehash", &bad),
                Err(Error::InvalidArgument(_))
            ));
        }
    }
}
