//! Runtime values read from rows and produced by expression evaluation.
//!
//! Every [`Value`] has exactly one ownership mode:
//!
//! - **Owned**: the value holds its [`Datum`] and drops it when cleared
//! - **Shared**: the datum lives behind an `Arc`; the last holder frees it
//! - **Borrowed**: a transparent alias of another value that never frees it
//!
//! A borrowed value is tied to the lifetime of its referent, so it cannot be
//! read after the referent has been cleared.

use crate::expression::{ExpressionError, ExpressionResult};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Kinds a value can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Null,
    Number,
    String,
    Array,
    Reference,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Null => "null",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Reference => "reference",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backing data of a value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Datum {
    #[default]
    Undefined,
    Null,
    Number(f64),
    String(String),
    Array(Vec<Datum>),
}

impl Datum {
    pub fn kind(&self) -> ValueKind {
        match self {
            Datum::Undefined => ValueKind::Undefined,
            Datum::Null => ValueKind::Null,
            Datum::Number(_) => ValueKind::Number,
            Datum::String(_) => ValueKind::String,
            Datum::Array(_) => ValueKind::Array,
        }
    }

    /// Numeric view of this datum, if it has one.
    ///
    /// Strings convert when their whole trimmed content parses as a float.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            Datum::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Truthiness: non-zero numbers, non-empty strings and arrays.
    pub fn bool_test(&self) -> bool {
        match self {
            Datum::Number(n) => *n != 0.0,
            Datum::String(s) => !s.is_empty(),
            Datum::Array(items) => !items.is_empty(),
            Datum::Null | Datum::Undefined => false,
        }
    }

    fn is_absent(&self) -> bool {
        matches!(self, Datum::Null | Datum::Undefined)
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Datum::Number(n)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::String(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::String(s)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Undefined => f.write_str("undefined"),
            Datum::Null => f.write_str("null"),
            Datum::Number(n) => format_number(*n, f),
            Datum::String(s) => f.write_str(s),
            Datum::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // Integral values print without a trailing ".0"
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// A value together with its ownership mode
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// Holds its datum directly
    Owned(Datum),
    /// Reference-counted datum, possibly aliased by other values
    Shared(Arc<Datum>),
    /// Transparent alias of another value
    Borrowed(&'a Value<'a>),
}

impl Default for Value<'_> {
    fn default() -> Self {
        Value::Owned(Datum::Undefined)
    }
}

impl<'a> Value<'a> {
    pub fn undefined() -> Self {
        Value::Owned(Datum::Undefined)
    }

    pub fn null() -> Self {
        Value::Owned(Datum::Null)
    }

    pub fn number(n: f64) -> Self {
        Value::Owned(Datum::Number(n))
    }

    /// Booleans are numbers: 1 for true, 0 for false
    pub fn boolean(b: bool) -> Self {
        Value::number(if b { 1.0 } else { 0.0 })
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Owned(Datum::String(s.into()))
    }

    pub fn array(items: Vec<Datum>) -> Self {
        Value::Owned(Datum::Array(items))
    }

    /// Wrap a datum in a reference-counted holder
    pub fn shared(datum: Datum) -> Self {
        Value::Shared(Arc::new(datum))
    }

    /// Create a borrowed alias of `src`
    pub fn reference(src: &'a Value<'a>) -> Self {
        Value::Borrowed(src)
    }

    /// Turn this value into a borrowed alias of `src`, releasing what it held.
    pub fn make_reference(&mut self, src: &'a Value<'a>) {
        *self = Value::Borrowed(src);
    }

    /// Reset to undefined, releasing owned or shared data.
    ///
    /// Clearing a borrowed value only drops the alias; the referent is untouched.
    pub fn clear(&mut self) {
        *self = Value::undefined();
    }

    /// Kind of this value; borrowed values report [`ValueKind::Reference`]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Borrowed(_) => ValueKind::Reference,
            _ => self.datum().kind(),
        }
    }

    /// Kind of the underlying datum, looking through references
    pub fn resolved_kind(&self) -> ValueKind {
        self.datum().kind()
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Borrowed(_))
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Value::Shared(_))
    }

    /// The datum this value resolves to, following references
    pub fn datum(&self) -> &Datum {
        match self {
            Value::Owned(datum) => datum,
            Value::Shared(datum) => datum,
            Value::Borrowed(value) => value.datum(),
        }
    }

    pub fn to_number(&self) -> Option<f64> {
        self.datum().to_number()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.datum() {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn bool_test(&self) -> bool {
        self.datum().bool_test()
    }

    /// Ordering comparison between two values.
    ///
    /// Fails when the kinds have no defined ordering, e.g. a number against a
    /// string that does not parse as one.
    pub fn compare(&self, other: &Value<'_>) -> ExpressionResult<Ordering> {
        compare_datums(self.datum(), other.datum())
    }

    /// Equality between two values, converting strings when compared to numbers.
    pub fn equal(&self, other: &Value<'_>) -> ExpressionResult<bool> {
        equal_datums(self.datum(), other.datum())
    }

    /// Copy this value into one that borrows nothing.
    ///
    /// Shared data only gains a reference; owned data is cloned.
    pub fn to_static(&self) -> Value<'static> {
        match self {
            Value::Owned(datum) => Value::Owned(datum.clone()),
            Value::Shared(datum) => Value::Shared(Arc::clone(datum)),
            Value::Borrowed(value) => value.to_static(),
        }
    }

    /// Detach this value from anything it borrows
    pub fn into_static(self) -> Value<'static> {
        match self {
            Value::Owned(datum) => Value::Owned(datum),
            Value::Shared(datum) => Value::Shared(datum),
            Value::Borrowed(value) => value.to_static(),
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.datum() == other.datum()
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datum())
    }
}

fn cmp_numbers(a: f64, b: f64) -> Ordering {
    // NaN compares equal to everything, like the C comparison it mirrors
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Convert the non-number side of a comparison against a number.
/// `number_on_left` tells which side the number sits on, for the error.
fn convert_for_compare(datum: &Datum, number_on_left: bool) -> ExpressionResult<f64> {
    match datum.to_number() {
        Some(n) => Ok(n),
        None => match datum {
            Datum::String(s) => Err(ExpressionError::ConversionFailed { value: s.clone() }),
            other => {
                let (left, right) = if number_on_left {
                    (ValueKind::Number, other.kind())
                } else {
                    (other.kind(), ValueKind::Number)
                };
                Err(ExpressionError::IncomparableValues { left, right })
            }
        },
    }
}

fn compare_datums(a: &Datum, b: &Datum) -> ExpressionResult<Ordering> {
    match (a, b) {
        (Datum::Number(x), Datum::Number(y)) => Ok(cmp_numbers(*x, *y)),
        (Datum::String(x), Datum::String(y)) => Ok(x.as_bytes().cmp(y.as_bytes())),
        (Datum::Array(x), Datum::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                match compare_datums(l, r)? {
                    Ordering::Equal => continue,
                    ord => return Ok(ord),
                }
            }
            Ok(x.len().cmp(&y.len()))
        }
        _ if a.is_absent() && b.is_absent() => Ok(Ordering::Equal),
        _ if a.is_absent() => Ok(Ordering::Less),
        _ if b.is_absent() => Ok(Ordering::Greater),
        (Datum::Number(x), other) => Ok(cmp_numbers(*x, convert_for_compare(other, true)?)),
        (other, Datum::Number(y)) => Ok(cmp_numbers(convert_for_compare(other, false)?, *y)),
        _ => Err(ExpressionError::IncomparableValues {
            left: a.kind(),
            right: b.kind(),
        }),
    }
}

fn equal_datums(a: &Datum, b: &Datum) -> ExpressionResult<bool> {
    if a.kind() == b.kind() {
        return Ok(compare_datums(a, b)? == Ordering::Equal);
    }
    // Null and undefined are equal to each other, as in ordering
    if a.is_absent() || b.is_absent() {
        return Ok(a.is_absent() && b.is_absent());
    }
    match (a, b) {
        (Datum::Number(x), other) | (other, Datum::Number(x)) => {
            Ok(other.to_number().is_some_and(|y| *x == y))
        }
        _ => Ok(false),
    }
}
