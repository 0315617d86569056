//! Error types for the `scalar-hashmap` crate

use crate::vector::ElementType;
use core::fmt;

/// Which slot of a pair an input element was destined for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Key,
    Value,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Key => f.write_str("key"),
            Role::Value => f.write_str("value"),
        }
    }
}

/// Errors surfaced to the host. None of them leave the container corrupted.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An input vector is not one of the supported scalar element types.
    #[error("unsupported vector type `{type_name}`")]
    TypeUnsupported { type_name: &'static str },

    /// Bulk inputs whose lengths neither match nor allow scalar broadcast.
    #[error("length mismatch: {keys} keys and {values} values")]
    LengthMismatch { keys: usize, values: usize },

    /// An element cannot be converted to the declared type without loss.
    #[error("cannot coerce {role} element {index} from {from} to {to} without loss")]
    CoercionFailed {
        role: Role,
        index: usize,
        from: ElementType,
        to: ElementType,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The hash index could not be allocated at the requested size. The
    /// container is unchanged.
    #[error("cannot allocate a hash index for {requested} entries")]
    CapacityExceeded { requested: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no method named `{0}`")]
    UnknownMethod(String),

    #[error("method `{method}` expects {expected} argument(s), got {got}")]
    Arity {
        method: &'static str,
        expected: &'static str,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
