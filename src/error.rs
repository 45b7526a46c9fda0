//! Error types for layout validation and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for layout construction and loading.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// A rank or dimension mismatch detected by a shape check.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The array has the wrong number of dimensions.
    #[error("expected an array with {expected} dimensions, got {actual} dimensions")]
    Rank {
        /// Required rank.
        expected: usize,
        /// Rank of the array that was checked.
        actual: usize,
    },

    /// The first dimension does not match.
    #[error("expected an array with {expected} rows, got {actual} rows")]
    Rows { expected: usize, actual: usize },

    /// The second dimension does not match.
    #[error("expected an array with {expected} columns, got {actual} columns")]
    Columns { expected: usize, actual: usize },

    /// The full shape does not match.
    #[error("expected an array with shape {expected:?}, got shape {actual:?}")]
    Shape {
        /// Required shape.
        expected: Vec<usize>,
        /// Shape of the array that was checked.
        actual: Vec<usize>,
    },

    /// Parallel sequences have different lengths.
    #[error("expected a sequence of length {expected}, got length {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Raw input that could not be turned into a numeric array.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CoerceError {
    /// Sibling sequences have different shapes.
    #[error("ragged nested sequence: expected elements of shape {expected:?}, got {actual:?}")]
    Ragged {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A leaf is not a number.
    #[error("cannot convert {found} to {dtype}")]
    InvalidElement {
        /// Target element type (`float64` or `int64`).
        dtype: &'static str,
        /// JSON type of the offending leaf.
        found: &'static str,
    },

    /// A number does not fit the target element type.
    #[error("value {value} is out of range for {dtype}")]
    OutOfRange { dtype: &'static str, value: String },

    /// A single number was required but a sequence was given.
    #[error("expected a single number, got a sequence")]
    NotAScalar,
}

/// Failure of a single validation contract.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Coerce(#[from] CoerceError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Errors that can occur when constructing or loading a [`Layout`](crate::Layout).
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The layout file does not exist or could not be read as UTF-8 text.
    #[error("layout file not found or unreadable: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON.
    #[error("invalid layout JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON document is valid but its top level is not an object.
    #[error("expected a JSON object at the top level, got {found}")]
    NotAnObject { found: &'static str },

    /// A required key is absent.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// A key that is not part of the layout format, under a rejecting policy.
    #[error("unknown field `{field}`")]
    UnknownField { field: String },

    /// A field failed its validation contract.
    #[error("invalid field `{field}`: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: ValidationError,
    },

    /// A field has the right shape but an unusable value.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl LayoutError {
    /// Wraps a contract failure with the name of the field it was applied to.
    #[must_use]
    pub fn field(field: &'static str, source: impl Into<ValidationError>) -> Self {
        Self::Field {
            field,
            source: source.into(),
        }
    }

    /// Returns the underlying shape error, if this is one.
    #[must_use]
    pub fn shape_error(&self) -> Option<&ShapeError> {
        match self {
            Self::Field {
                source: ValidationError::Shape(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}
