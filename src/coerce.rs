//! Lossless element coercion from host vectors into a declared element type.
//!
//! Widening conversions always succeed. Narrowing conversions succeed only
//! when the value survives the round trip (e.g. `10.0` into an integer
//! slot); otherwise the element is rejected. Strings are never parsed.

use crate::error::{Error, Result, Role};
use crate::vector::{
    is_na_real, Complex, ElementType, HostStr, Logical, Scalar, Vector, NA_INTEGER, NA_REAL,
};

/// A scalar type that can live in a key or value slot.
pub(crate) trait Element: Clone + 'static {
    const TYPE: ElementType;

    /// The absent marker returned for lookups that miss.
    fn absent() -> Self;

    /// Lossless conversion of one host element; `None` when lossy.
    fn from_scalar(s: Scalar<'_>) -> Option<Self>;

    /// Bulk conversion when `v` already has this element type.
    fn native(v: &Vector) -> Option<Vec<Self>>;

    fn into_vector(items: Vec<Self>) -> Vector;
}

/// Prefix of successfully converted elements plus the first failure, if any.
pub(crate) struct Coerced<T> {
    pub items: Vec<T>,
    pub failure: Option<Error>,
}

impl<T> Coerced<T> {
    /// All-or-nothing view for read-only callers.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(self.items),
        }
    }
}

/// Convert `v` element by element, stopping at the first lossy element.
pub(crate) fn coerce<T: Element>(v: &Vector, role: Role) -> Result<Coerced<T>> {
    let from = v.element_type().ok_or(Error::TypeUnsupported {
        type_name: v.type_name(),
    })?;
    if let Some(items) = T::native(v) {
        return Ok(Coerced {
            items,
            failure: None,
        });
    }
    let mut items = Vec::with_capacity(v.len());
    for index in 0..v.len() {
        match v.scalar_at(index).and_then(T::from_scalar) {
            Some(x) => items.push(x),
            None => {
                return Ok(Coerced {
                    items,
                    failure: Some(Error::CoercionFailed {
                        role,
                        index,
                        from,
                        to: T::TYPE,
                    }),
                })
            }
        }
    }
    Ok(Coerced {
        items,
        failure: None,
    })
}

fn int_to_real(i: i32) -> f64 {
    if i == NA_INTEGER {
        NA_REAL
    } else {
        f64::from(i)
    }
}

fn real_to_int(x: f64) -> Option<i32> {
    if is_na_real(x) {
        return Some(NA_INTEGER);
    }
    // NaN and infinities have no integral value; i32::MIN is taken by NA.
    if x.fract() != 0.0 || x > f64::from(i32::MAX) || x <= f64::from(i32::MIN) {
        return None;
    }
    Some(x as i32)
}

fn complex_to_real(c: Complex) -> Option<f64> {
    if c.is_na() {
        Some(NA_REAL)
    } else if c.im == 0.0 {
        Some(c.re)
    } else {
        None
    }
}

fn logical_to_int(l: Logical) -> i32 {
    match l {
        Logical::False => 0,
        Logical::True => 1,
        Logical::Na => NA_INTEGER,
    }
}

fn int_to_logical(i: i32) -> Option<Logical> {
    match i {
        0 => Some(Logical::False),
        1 => Some(Logical::True),
        NA_INTEGER => Some(Logical::Na),
        _ => None,
    }
}

fn int_to_raw(i: i32) -> Option<u8> {
    u8::try_from(i).ok()
}

fn format_real(x: f64) -> HostStr {
    if is_na_real(x) {
        HostStr::NA
    } else if x.is_nan() {
        HostStr::new("NaN")
    } else if x.is_infinite() {
        HostStr::new(if x > 0.0 { "Inf" } else { "-Inf" })
    } else if x == 0.0 {
        HostStr::new("0")
    } else {
        HostStr::from(x.to_string())
    }
}

fn format_complex(c: Complex) -> HostStr {
    if c.is_na() {
        return HostStr::NA;
    }
    let re = format_real(c.re);
    let im = format_real(c.im.abs());
    let sign = if c.im.is_sign_negative() && c.im != 0.0 {
        '-'
    } else {
        '+'
    };
    HostStr::from(format!("{re}{sign}{im}i"))
}

impl Element for i32 {
    const TYPE: ElementType = ElementType::Integer;

    fn absent() -> Self {
        NA_INTEGER
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        match s {
            Scalar::Integer(i) => Some(i),
            Scalar::Logical(l) => Some(logical_to_int(l)),
            Scalar::Raw(b) => Some(i32::from(b)),
            Scalar::Real(x) => real_to_int(x),
            Scalar::Complex(c) => complex_to_real(c).and_then(real_to_int),
            Scalar::Character(s) => s.is_na().then_some(NA_INTEGER),
        }
    }

    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_integer().map(<[i32]>::to_vec)
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::Integer(items)
    }
}

impl Element for f64 {
    const TYPE: ElementType = ElementType::Real;

    fn absent() -> Self {
        NA_REAL
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        match s {
            Scalar::Real(x) => Some(x),
            Scalar::Integer(i) => Some(int_to_real(i)),
            Scalar::Logical(l) => Some(int_to_real(logical_to_int(l))),
            Scalar::Raw(b) => Some(f64::from(b)),
            Scalar::Complex(c) => complex_to_real(c),
            Scalar::Character(s) => s.is_na().then_some(NA_REAL),
        }
    }

    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_real().map(<[f64]>::to_vec)
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::real(items)
    }
}

impl Element for Logical {
    const TYPE: ElementType = ElementType::Logical;

    fn absent() -> Self {
        Logical::Na
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        match s {
            Scalar::Logical(l) => Some(l),
            Scalar::Integer(i) => int_to_logical(i),
            Scalar::Raw(b) => int_to_logical(i32::from(b)),
            Scalar::Real(x) => real_to_int(x).and_then(int_to_logical),
            Scalar::Complex(c) => complex_to_real(c)
                .and_then(real_to_int)
                .and_then(int_to_logical),
            Scalar::Character(s) => s.is_na().then_some(Logical::Na),
        }
    }

    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_logical().map(<[Logical]>::to_vec)
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::Logical(items)
    }
}

impl Element for Complex {
    const TYPE: ElementType = ElementType::Complex;

    fn absent() -> Self {
        Complex::NA
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        let widen = |x: f64| {
            if is_na_real(x) {
                Complex::NA
            } else {
                Complex::new(x, 0.0)
            }
        };
        match s {
            Scalar::Complex(c) => Some(c),
            Scalar::Real(x) => Some(widen(x)),
            Scalar::Integer(i) => Some(widen(int_to_real(i))),
            Scalar::Logical(l) => Some(widen(int_to_real(logical_to_int(l)))),
            Scalar::Raw(b) => Some(Complex::new(f64::from(b), 0.0)),
            Scalar::Character(s) => s.is_na().then_some(Complex::NA),
        }
    }

    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_complex().map(<[Complex]>::to_vec)
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::Complex(items)
    }
}

impl Element for HostStr {
    const TYPE: ElementType = ElementType::Character;

    fn absent() -> Self {
        HostStr::NA
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        Some(match s {
            Scalar::Character(s) => s.clone(),
            Scalar::Integer(NA_INTEGER) => HostStr::NA,
            Scalar::Integer(i) => HostStr::from(i.to_string()),
            Scalar::Real(x) => format_real(x),
            Scalar::Logical(Logical::True) => HostStr::new("TRUE"),
            Scalar::Logical(Logical::False) => HostStr::new("FALSE"),
            Scalar::Logical(Logical::Na) => HostStr::NA,
            Scalar::Complex(c) => format_complex(c),
            Scalar::Raw(b) => HostStr::from(format!("{b:02x}")),
        })
    }

    // Clones share the host bytes; nothing is copied.
    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_character().map(<[HostStr]>::to_vec)
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::Character(items)
    }
}

impl Element for u8 {
    const TYPE: ElementType = ElementType::Raw;

    fn absent() -> Self {
        0
    }

    fn from_scalar(s: Scalar<'_>) -> Option<Self> {
        match s {
            Scalar::Raw(b) => Some(b),
            Scalar::Logical(Logical::Na) => None,
            Scalar::Logical(l) => int_to_raw(logical_to_int(l)),
            Scalar::Integer(i) => int_to_raw(i),
            Scalar::Real(x) => real_to_int(x).and_then(int_to_raw),
            Scalar::Complex(c) => complex_to_real(c)
                .and_then(real_to_int)
                .and_then(int_to_raw),
            Scalar::Character(_) => None,
        }
    }

    fn native(v: &Vector) -> Option<Vec<Self>> {
        v.as_raw().map(<[u8]>::to_vec)
    }

    fn into_vector(items: Vec<Self>) -> Vector {
        Vector::Raw(items)
    }
}
