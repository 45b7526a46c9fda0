//! Shape and dtype validators.
//!
//! Validation is split into two independent steps:
//!
//! 1. **Coercion** turns a raw [`serde_json::Value`] into an [`Array`] of a fixed
//!    element type, inferring the shape from the nesting. Coercion never checks
//!    the shape against an expectation.
//! 2. **Shape checks** ([`check_rank`], [`check_rows_cols`], [`check_exact_shape`])
//!    accept or reject an already-coerced array.
//!
//! A [`Contract`] pairs an element type with a [`ShapeRule`] and always runs the
//! two steps in that order, so a shape error reports the true shape of the input.

use crate::array::Array;
use crate::error::{CoerceError, ShapeError, ValidationError};
use serde_json::{Number, Value};
use std::fmt;
use std::marker::PhantomData;

/// A numeric element type that JSON leaves can be coerced into.
///
/// Numbers, booleans and numeric strings are accepted; `null` and objects are not.
pub trait Element: Copy + fmt::Debug + PartialEq {
    /// Name used in error messages.
    const DTYPE: &'static str;

    /// Converts one JSON number.
    fn from_number(n: &Number) -> Result<Self, CoerceError>;

    /// Parses numeric text, or `None` if it is not a valid literal for this type.
    fn from_text(text: &str) -> Option<Self>;

    fn from_bool(b: bool) -> Self;

    /// Converts one non-sequence JSON value.
    fn from_leaf(value: &Value) -> Result<Self, CoerceError> {
        match value {
            Value::Number(n) => Self::from_number(n),
            Value::Bool(b) => Ok(Self::from_bool(*b)),
            Value::String(text) => Self::from_text(text).ok_or(CoerceError::InvalidElement {
                dtype: Self::DTYPE,
                found: "string",
            }),
            other => Err(CoerceError::InvalidElement {
                dtype: Self::DTYPE,
                found: json_type(other),
            }),
        }
    }
}

impl Element for f64 {
    const DTYPE: &'static str = "float64";

    fn from_number(n: &Number) -> Result<Self, CoerceError> {
        n.as_f64().ok_or_else(|| CoerceError::OutOfRange {
            dtype: Self::DTYPE,
            value: n.to_string(),
        })
    }

    fn from_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn from_bool(b: bool) -> Self {
        f64::from(u8::from(b))
    }
}

impl Element for i64 {
    const DTYPE: &'static str = "int64";

    /// Integers are taken as-is; finite floats are truncated toward zero.
    fn from_number(n: &Number) -> Result<Self, CoerceError> {
        if let Some(i) = n.as_i64() {
            return Ok(i);
        }
        // 2^63 is exactly representable as f64, i64::MAX is not.
        const BOUND: f64 = 9_223_372_036_854_775_808.0;
        match n.as_f64() {
            Some(f) if (-BOUND..BOUND).contains(&f) => Ok(f.trunc() as i64),
            _ => Err(CoerceError::OutOfRange {
                dtype: Self::DTYPE,
                value: n.to_string(),
            }),
        }
    }

    /// Only integer literals; `"1.5"` is rejected rather than truncated.
    fn from_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn from_bool(b: bool) -> Self {
        i64::from(b)
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerces arbitrarily nested JSON sequences of numeric leaves into an array of `T`.
pub fn coerce<T: Element>(value: &Value) -> Result<Array<T>, CoerceError> {
    let mut data = Vec::new();
    let shape = flatten_into(value, &mut data)?;
    Ok(Array::from_parts(shape, data))
}

/// Appends the leaves of `value` to `out` and returns the shape of `value`.
fn flatten_into<T: Element>(value: &Value, out: &mut Vec<T>) -> Result<Vec<usize>, CoerceError> {
    match value {
        Value::Array(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let shape = flatten_into(item, out)?;
                match &inner {
                    Some(expected) if *expected != shape => {
                        return Err(CoerceError::Ragged {
                            expected: expected.clone(),
                            actual: shape,
                        });
                    }
                    Some(_) => {}
                    None => inner = Some(shape),
                }
            }
            let mut shape = vec![items.len()];
            shape.extend(inner.unwrap_or_default());
            Ok(shape)
        }
        leaf => {
            out.push(T::from_leaf(leaf)?);
            Ok(Vec::new())
        }
    }
}

/// Coerces to `float64` without checking the shape.
pub fn coerce_to_float_array(value: &Value) -> Result<Array<f64>, CoerceError> {
    coerce(value)
}

/// Coerces to `int64` without checking the shape.
pub fn coerce_to_int_array(value: &Value) -> Result<Array<i64>, CoerceError> {
    coerce(value)
}

/// Coerces a single JSON value (number, boolean or numeric string) to `f64`.
pub fn coerce_scalar(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::Array(_) => Err(CoerceError::NotAScalar),
        leaf => f64::from_leaf(leaf),
    }
}

/// Accepts the array only if it has exactly `expected` dimensions.
pub fn check_rank<T>(array: Array<T>, expected: usize) -> Result<Array<T>, ShapeError> {
    if array.rank() != expected {
        return Err(ShapeError::Rank {
            expected,
            actual: array.rank(),
        });
    }
    Ok(array)
}

/// Accepts a rank-2 array whose dimensions match every constraint given.
///
/// `None` leaves that dimension unconstrained.
pub fn check_rows_cols<T>(
    array: Array<T>,
    rows: Option<usize>,
    cols: Option<usize>,
) -> Result<Array<T>, ShapeError> {
    let (actual_rows, actual_cols) = match *array.shape() {
        [r, c] => (r, c),
        _ => {
            return Err(ShapeError::Rank {
                expected: 2,
                actual: array.rank(),
            });
        }
    };
    if let Some(expected) = rows.filter(|&r| r != actual_rows) {
        return Err(ShapeError::Rows {
            expected,
            actual: actual_rows,
        });
    }
    if let Some(expected) = cols.filter(|&c| c != actual_cols) {
        return Err(ShapeError::Columns {
            expected,
            actual: actual_cols,
        });
    }
    Ok(array)
}

/// Accepts the array only if its full shape equals `expected`.
pub fn check_exact_shape<T>(array: Array<T>, expected: &[usize]) -> Result<Array<T>, ShapeError> {
    if array.shape() != expected {
        return Err(ShapeError::Shape {
            expected: expected.to_vec(),
            actual: array.shape().to_vec(),
        });
    }
    Ok(array)
}

/// The shape half of a [`Contract`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeRule {
    /// Exactly this many dimensions.
    Rank(usize),
    /// A matrix with optionally fixed row and column counts.
    RowsCols {
        rows: Option<usize>,
        cols: Option<usize>,
    },
    /// Exactly this shape.
    Exact(&'static [usize]),
}

impl ShapeRule {
    pub fn check<T>(self, array: Array<T>) -> Result<Array<T>, ShapeError> {
        match self {
            Self::Rank(rank) => check_rank(array, rank),
            Self::RowsCols { rows, cols } => check_rows_cols(array, rows, cols),
            Self::Exact(shape) => check_exact_shape(array, shape),
        }
    }
}

/// Coerce-then-check validation for one field.
pub struct Contract<T> {
    rule: ShapeRule,
    dtype: PhantomData<fn() -> T>,
}

impl<T> Contract<T> {
    pub const fn new(rule: ShapeRule) -> Self {
        Self {
            rule,
            dtype: PhantomData,
        }
    }

    pub const fn rule(&self) -> ShapeRule {
        self.rule
    }

    /// Runs only the shape half of the contract on an existing array.
    pub fn check(&self, array: Array<T>) -> Result<Array<T>, ShapeError> {
        self.rule.check(array)
    }
}

impl<T: Element> Contract<T> {
    /// Coerces `value` to `T`, then checks its shape.
    pub fn apply(&self, value: &Value) -> Result<Array<T>, ValidationError> {
        let array = coerce(value)?;
        Ok(self.check(array)?)
    }
}

impl<T> fmt::Debug for Contract<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("dtype", &std::any::type_name::<T>())
            .field("rule", &self.rule)
            .finish()
    }
}

/// Generic `float64` vector.
pub const FLOAT_VECTOR: Contract<f64> = Contract::new(ShapeRule::Rank(1));

/// Generic `int64` vector.
pub const INT_VECTOR: Contract<i64> = Contract::new(ShapeRule::Rank(1));

/// `float64` matrix with two columns, e.g. cone positions.
pub const FLOAT_NX2: Contract<f64> = Contract::new(ShapeRule::RowsCols {
    rows: None,
    cols: Some(2),
});

/// `float64` matrix with three columns, e.g. cones with color.
pub const FLOAT_NX3: Contract<f64> = Contract::new(ShapeRule::RowsCols {
    rows: None,
    cols: Some(3),
});

/// `float64` vector of exactly two elements.
pub const FLOAT_VECTOR2: Contract<f64> = Contract::new(ShapeRule::Exact(&[2]));
