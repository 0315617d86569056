//! Hashable key representations.
//!
//! Integer, logical, string and raw elements hash and compare naturally;
//! their absent markers are ordinary self-equal values. Reals and complex
//! numbers are stored as canonical bit patterns:
//!
//! - `0.0` and `-0.0` are the same key;
//! - the absent marker is one key, equal only to itself;
//! - every other NaN payload collapses into a single NaN key, which is
//!   equal to itself and never to the absent marker.

use crate::coerce::Element;
use crate::vector::{is_na_real, Complex, ElementType, Scalar, Vector, NA_REAL_BITS};
use core::hash::Hash;

/// Element type usable in the key slot.
pub(crate) trait KeyElement: Element + Eq + Hash {}

impl<T: Element + Eq + Hash> KeyElement for T {}

const CANONICAL_NAN_BITS: u64 = 0x7FF8_0000_0000_0000;

fn canonical_bits(x: f64) -> u64 {
    if is_na_real(x) {
        NA_REAL_BITS
    } else if x.is_nan() {
        CANONICAL_NAN_BITS
    } else if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

/// A real key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct RealKey(u64);

impl RealKey {
    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl From<f64> for RealKey {
    fn from(x: f64) -> Self {
        RealKey(canonical_bits(x))
    }
}

impl Element for RealKey {
    const TYPE: ElementType = ElementType::Real;

    fn absent() -> Self {
        RealKey(NA_REAL_BITS)
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        f64::from_scalar(s).map(RealKey::from)
    }

    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_real()
            .map(|data| data.iter().copied().map(RealKey::from).collect())
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::real(items.into_iter().map(RealKey::value).collect())
    }
}

/// A complex key. Any complex with an absent part is the single absent key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct ComplexKey(u64, u64);

impl ComplexKey {
    pub fn value(self) -> Complex {
        Complex::new(f64::from_bits(self.0), f64::from_bits(self.1))
    }
}

impl From<Complex> for ComplexKey {
    fn from(c: Complex) -> Self {
        if c.is_na() {
            ComplexKey(NA_REAL_BITS, NA_REAL_BITS)
        } else {
            ComplexKey(canonical_bits(c.re), canonical_bits(c.im))
        }
    }
}

impl Element for ComplexKey {
    const TYPE: ElementType = ElementType::Complex;

    fn absent() -> Self {
        ComplexKey::from(Complex::NA)
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        Complex::from_scalar(s).map(ComplexKey::from)
    }

    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_complex()
            .map(|data| data.iter().copied().map(ComplexKey::from).collect())
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::Complex(items.into_iter().map(ComplexKey::value).collect())
    }
}
