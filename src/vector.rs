//! Host boundary types: scalar vectors, element types and absent markers.
//!
//! These model the values a host runtime hands across the native boundary.
//! Every supported element type has a canonical absent marker ("NA"):
//!
//! - integer: `i32::MIN`
//! - real: a NaN with low word `1954`; other NaNs are *not* absent
//! - logical: [`Logical::Na`]
//! - character: [`HostStr::NA`]
//! - complex: either part is the real absent marker
//! - raw: none (`0x00` is used as the fill for misses)

use core::fmt;
use std::rc::Rc;

/// Integer absent marker.
pub const NA_INTEGER: i32 = i32::MIN;

pub(crate) const NA_REAL_BITS: u64 = 0x7FF0_0000_0000_07A2;

/// Real absent marker. Compare with [`is_na_real`], never with `==`.
pub const NA_REAL: f64 = f64::from_bits(NA_REAL_BITS);

/// True iff `x` carries the host's NA payload (as opposed to any other NaN).
#[inline]
pub fn is_na_real(x: f64) -> bool {
    x.is_nan() && (x.to_bits() & 0xFFFF_FFFF) == 1954
}

/// Element type of a scalar vector.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ElementType {
    Logical,
    Integer,
    Real,
    Complex,
    Character,
    Raw,
}

impl ElementType {
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Logical => "logical",
            ElementType::Integer => "integer",
            ElementType::Real => "double",
            ElementType::Complex => "complex",
            ElementType::Character => "character",
            ElementType::Raw => "raw",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Class tag carried by real vectors. Dates and date-times are reals with a tag.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum RealClass {
    #[default]
    Numeric,
    Date,
    DateTime,
}

impl RealClass {
    pub fn name(self) -> &'static str {
        match self {
            RealClass::Numeric => "numeric",
            RealClass::Date => "Date",
            RealClass::DateTime => "POSIXct",
        }
    }
}

/// Tri-state boolean.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Logical {
    False,
    True,
    Na,
}

impl Logical {
    pub fn is_na(self) -> bool {
        self == Logical::Na
    }

    pub fn to_option(self) -> Option<bool> {
        match self {
            Logical::False => Some(false),
            Logical::True => Some(true),
            Logical::Na => None,
        }
    }
}

impl From<bool> for Logical {
    fn from(b: bool) -> Self {
        if b {
            Logical::True
        } else {
            Logical::False
        }
    }
}

impl From<Option<bool>> for Logical {
    fn from(b: Option<bool>) -> Self {
        b.map(Logical::from).unwrap_or(Logical::Na)
    }
}

/// Complex number as a pair of doubles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const NA: Complex = Complex {
        re: NA_REAL,
        im: NA_REAL,
    };

    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn is_na(&self) -> bool {
        is_na_real(self.re) || is_na_real(self.im)
    }
}

/// Shared, immutable host string. Cloning takes another strong reference to
/// the same bytes; the NA string holds no storage.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct HostStr(Option<Rc<str>>);

impl HostStr {
    pub const NA: HostStr = HostStr(None);

    pub fn new(s: &str) -> Self {
        HostStr(Some(Rc::from(s)))
    }

    pub fn is_na(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Number of strong references to the underlying bytes (0 for NA).
    pub fn ref_count(&self) -> usize {
        self.0.as_ref().map(Rc::strong_count).unwrap_or(0)
    }
}

impl From<&str> for HostStr {
    fn from(s: &str) -> Self {
        HostStr::new(s)
    }
}

impl From<String> for HostStr {
    fn from(s: String) -> Self {
        HostStr(Some(Rc::from(s)))
    }
}

impl From<Option<&str>> for HostStr {
    fn from(s: Option<&str>) -> Self {
        s.map(HostStr::new).unwrap_or(HostStr::NA)
    }
}

impl fmt::Display for HostStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => f.write_str("NA"),
        }
    }
}

/// A value crossing the host boundary. Only the atomic variants are scalar
/// vectors; `List` and `Null` exist so the container can reject them.
#[derive(Clone, Debug)]
pub enum Vector {
    Logical(Vec<Logical>),
    Integer(Vec<i32>),
    Real { data: Vec<f64>, class: RealClass },
    Complex(Vec<Complex>),
    Character(Vec<HostStr>),
    Raw(Vec<u8>),
    List(Vec<Vector>),
    Null,
}

/// One element read out of a scalar vector.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Scalar<'a> {
    Logical(Logical),
    Integer(i32),
    Real(f64),
    Complex(Complex),
    Character(&'a HostStr),
    Raw(u8),
}

impl Vector {
    pub fn real(data: Vec<f64>) -> Self {
        Vector::Real {
            data,
            class: RealClass::Numeric,
        }
    }

    pub fn dates(days: Vec<f64>) -> Self {
        Vector::Real {
            data: days,
            class: RealClass::Date,
        }
    }

    pub fn date_times(seconds: Vec<f64>) -> Self {
        Vector::Real {
            data: seconds,
            class: RealClass::DateTime,
        }
    }

    pub fn character<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<HostStr>,
    {
        Vector::Character(items.into_iter().map(Into::into).collect())
    }

    /// An empty vector of the given element type.
    pub fn empty(ty: ElementType) -> Self {
        match ty {
            ElementType::Logical => Vector::Logical(Vec::new()),
            ElementType::Integer => Vector::Integer(Vec::new()),
            ElementType::Real => Vector::real(Vec::new()),
            ElementType::Complex => Vector::Complex(Vec::new()),
            ElementType::Character => Vector::Character(Vec::new()),
            ElementType::Raw => Vector::Raw(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vector::Logical(v) => v.len(),
            Vector::Integer(v) => v.len(),
            Vector::Real { data, .. } => data.len(),
            Vector::Complex(v) => v.len(),
            Vector::Character(v) => v.len(),
            Vector::Raw(v) => v.len(),
            Vector::List(v) => v.len(),
            Vector::Null => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type, or `None` for non-scalar vectors.
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            Vector::Logical(_) => Some(ElementType::Logical),
            Vector::Integer(_) => Some(ElementType::Integer),
            Vector::Real { .. } => Some(ElementType::Real),
            Vector::Complex(_) => Some(ElementType::Complex),
            Vector::Character(_) => Some(ElementType::Character),
            Vector::Raw(_) => Some(ElementType::Raw),
            Vector::List(_) | Vector::Null => None,
        }
    }

    /// Host type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Vector::List(_) => "list",
            Vector::Null => "NULL",
            other => other
                .element_type()
                .map(ElementType::name)
                .unwrap_or("unknown"),
        }
    }

    /// Class tag of a real vector; `Numeric` for everything else.
    pub fn real_class(&self) -> RealClass {
        match self {
            Vector::Real { class, .. } => *class,
            _ => RealClass::Numeric,
        }
    }

    /// Host class name: `integer`, `numeric`, `Date`, `POSIXct`, ...
    pub fn class_name(&self) -> &'static str {
        match self {
            Vector::Real { class, .. } => class.name(),
            Vector::Logical(_) => "logical",
            Vector::Integer(_) => "integer",
            Vector::Complex(_) => "complex",
            Vector::Character(_) => "character",
            Vector::Raw(_) => "raw",
            Vector::List(_) => "list",
            Vector::Null => "NULL",
        }
    }

    /// Re-tag a real vector; other vectors are returned unchanged.
    pub fn with_class(self, class: RealClass) -> Self {
        match self {
            Vector::Real { data, .. } => Vector::Real { data, class },
            other => other,
        }
    }

    pub(crate) fn scalar_at(&self, i: usize) -> Option<Scalar<'_>> {
        match self {
            Vector::Logical(v) => v.get(i).map(|&x| Scalar::Logical(x)),
            Vector::Integer(v) => v.get(i).map(|&x| Scalar::Integer(x)),
            Vector::Real { data, .. } => data.get(i).map(|&x| Scalar::Real(x)),
            Vector::Complex(v) => v.get(i).map(|&x| Scalar::Complex(x)),
            Vector::Character(v) => v.get(i).map(Scalar::Character),
            Vector::Raw(v) => v.get(i).map(|&x| Scalar::Raw(x)),
            Vector::List(_) | Vector::Null => None,
        }
    }

    pub fn as_logical(&self) -> Option<&[Logical]> {
        match self {
            Vector::Logical(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&[i32]> {
        match self {
            Vector::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            Vector::Real { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&[Complex]> {
        match self {
            Vector::Complex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_character(&self) -> Option<&[HostStr]> {
        match self {
            Vector::Character(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Vector::Raw(v) => Some(v),
            _ => None,
        }
    }
}

// Reals compare NA-aware: NA equals NA, NaN equals NaN, NA never equals NaN.
// This is host-vector identity, used by tests and snapshots, not key equality.
fn same_real(a: f64, b: f64) -> bool {
    match (is_na_real(a), is_na_real(b)) {
        (true, true) => true,
        (false, false) => a == b || (a.is_nan() && b.is_nan()),
        _ => false,
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        use Vector::*;
        match (self, other) {
            (Logical(a), Logical(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Real { data: a, class: ca }, Real { data: b, class: cb }) => {
                ca == cb && a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| same_real(x, y))
            }
            (Complex(a), Complex(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        (x.is_na() && y.is_na()) || (same_real(x.re, y.re) && same_real(x.im, y.im))
                    })
            }
            (Character(a), Character(b)) => a == b,
            (Raw(a), Raw(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Null, Null) => true,
            _ => false,
        }
    }
}

impl From<Vec<bool>> for Vector {
    fn from(v: Vec<bool>) -> Self {
        Vector::Logical(v.into_iter().map(Logical::from).collect())
    }
}

impl From<Vec<Logical>> for Vector {
    fn from(v: Vec<Logical>) -> Self {
        Vector::Logical(v)
    }
}

impl From<Vec<i32>> for Vector {
    fn from(v: Vec<i32>) -> Self {
        Vector::Integer(v)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(v: Vec<f64>) -> Self {
        Vector::real(v)
    }
}

impl From<Vec<Complex>> for Vector {
    fn from(v: Vec<Complex>) -> Self {
        Vector::Complex(v)
    }
}

impl From<Vec<&str>> for Vector {
    fn from(v: Vec<&str>) -> Self {
        Vector::character(v)
    }
}

impl From<Vec<HostStr>> for Vector {
    fn from(v: Vec<HostStr>) -> Self {
        Vector::Character(v)
    }
}

impl From<Vec<u8>> for Vector {
    fn from(v: Vec<u8>) -> Self {
        Vector::Raw(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn na_real_is_not_plain_nan() {
        assert!(is_na_real(NA_REAL));
        assert!(NA_REAL.is_nan());
        assert!(!is_na_real(f64::NAN));
        assert!(!is_na_real(1.0));
    }

    #[test]
    fn host_str_shares_storage_on_clone() {
        let a = HostStr::new("shared");
        assert_eq!(a.ref_count(), 1);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);
        drop(b);
        assert_eq!(a.ref_count(), 1);
        assert_eq!(HostStr::NA.ref_count(), 0);
        assert_ne!(HostStr::NA, HostStr::new("NA"));
    }

    #[test]
    fn vector_equality_distinguishes_na_from_nan() {
        assert_eq!(Vector::real(vec![NA_REAL]), Vector::real(vec![NA_REAL]));
        assert_eq!(Vector::real(vec![f64::NAN]), Vector::real(vec![f64::NAN]));
        assert_ne!(Vector::real(vec![NA_REAL]), Vector::real(vec![f64::NAN]));
        assert_ne!(Vector::real(vec![1.0]), Vector::dates(vec![1.0]));
    }

    #[test]
    fn type_and_class_names() {
        assert_eq!(Vector::dates(vec![]).class_name(), "Date");
        assert_eq!(Vector::date_times(vec![]).class_name(), "POSIXct");
        assert_eq!(Vector::real(vec![]).type_name(), "double");
        assert_eq!(Vector::Null.type_name(), "NULL");
        assert_eq!(Vector::List(vec![]).element_type(), None);
        assert_eq!(Vector::empty(ElementType::Raw), Vector::Raw(vec![]));
    }
}
