//! The cone track [`Layout`] and its JSON loader.
//!
//! A layout file is a single JSON object:
//!
//! ```json
//! {
//!   "x": [0.0, 1.0],
//!   "y": [0.0, 2.0],
//!   "color": [1, 2],
//!   "start_position": [0.0, 0.0],
//!   "start_orientation": 0.0,
//!   "timing_line_position": [5.0, 5.0],
//!   "timing_line_orientation": 0.0,
//!   "timing_line_width": 1.5
//! }
//! ```
//!
//! Every field is validated by its own [`Contract`] in the order of
//! [`FIELD_NAMES`]; the first failure aborts construction.

use crate::array::Array;
use crate::error::{LayoutError, LayoutResult, ShapeError};
use crate::validate::{self, Contract, Element, FLOAT_VECTOR, FLOAT_VECTOR2, INT_VECTOR};
use glam::DVec2;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Keys of the layout file format, in validation order.
pub const FIELD_NAMES: [&str; 8] = [
    "x",
    "y",
    "color",
    "start_position",
    "start_orientation",
    "timing_line_position",
    "timing_line_orientation",
    "timing_line_width",
];

/// What to do with top-level keys that are not in [`FIELD_NAMES`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownFields {
    /// Skip them.
    #[default]
    Ignore,
    /// Fail with [`LayoutError::UnknownField`].
    Reject,
}

/// Options for constructing and loading layouts.
#[derive(Clone, Debug, Default)]
pub struct LayoutOptions {
    /// Policy for keys outside the layout format.
    pub unknown_fields: UnknownFields,
}

/// The stored fields of a layout, already coerced to their final types.
///
/// Serializes to the layout file format.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutFields {
    /// Cone x coordinates.
    pub x: Vec<f64>,
    /// Cone y coordinates, one per entry of `x`.
    pub y: Vec<f64>,
    /// Cone color codes, one per entry of `x`.
    pub color: Vec<i64>,

    /// Where the vehicle starts.
    pub start_position: DVec2,
    /// Starting heading, in caller-defined units (usually radians).
    pub start_orientation: f64,

    /// Center of the timing line.
    pub timing_line_position: DVec2,
    pub timing_line_orientation: f64,
    /// Must be finite and non-negative.
    pub timing_line_width: f64,
}

/// An immutable, validated track layout.
///
/// Construct with [`Layout::load_from_file`], [`Layout::from_json_str`],
/// [`Layout::construct`] or, from already-typed data, [`Layout::new`].
///
/// The derived views [`cone_positions`](Self::cone_positions) and
/// [`cones_with_color`](Self::cones_with_color) are built on first access and
/// cached for the lifetime of the instance.
#[derive(Clone, Debug)]
pub struct Layout {
    fields: LayoutFields,
    cone_positions: OnceLock<Array<f64>>,
    cones_with_color: OnceLock<Array<f64>>,
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Layout {
    /// Builds a layout from typed fields, checking the cross-field invariants.
    ///
    /// `y` and `color` must have the same length as `x`; orientations and the
    /// timing line width must be finite, and the width must not be negative.
    pub fn new(fields: LayoutFields) -> LayoutResult<Self> {
        let n = fields.x.len();
        check_len("y", fields.y.len(), n)?;
        check_len("color", fields.color.len(), n)?;

        for (name, value) in [
            ("start_orientation", fields.start_orientation),
            ("timing_line_orientation", fields.timing_line_orientation),
            ("timing_line_width", fields.timing_line_width),
        ] {
            if !value.is_finite() {
                return Err(LayoutError::InvalidValue {
                    field: name,
                    reason: format!("expected a finite number, got {value}"),
                });
            }
        }
        if fields.timing_line_width < 0.0 {
            return Err(LayoutError::InvalidValue {
                field: "timing_line_width",
                reason: format!(
                    "expected a non-negative width, got {}",
                    fields.timing_line_width
                ),
            });
        }

        Ok(Self {
            fields,
            cone_positions: OnceLock::new(),
            cones_with_color: OnceLock::new(),
        })
    }

    /// Validates a keyed mapping of raw values, ignoring unknown keys.
    pub fn construct(fields: &Map<String, Value>) -> LayoutResult<Self> {
        Self::construct_with(fields, &LayoutOptions::default())
    }

    /// Validates a keyed mapping of raw values.
    pub fn construct_with(
        fields: &Map<String, Value>,
        options: &LayoutOptions,
    ) -> LayoutResult<Self> {
        for key in fields.keys().filter(|k| !FIELD_NAMES.contains(&k.as_str())) {
            match options.unknown_fields {
                UnknownFields::Ignore => debug!(field = %key, "ignoring unknown layout field"),
                UnknownFields::Reject => {
                    return Err(LayoutError::UnknownField { field: key.clone() });
                }
            }
        }

        // Lengths are checked as soon as each cone sequence is known, so the
        // first failure always follows FIELD_NAMES order.
        let x = array_field(fields, "x", &FLOAT_VECTOR)?.into_vec();
        let y = array_field(fields, "y", &FLOAT_VECTOR)?.into_vec();
        check_len("y", y.len(), x.len())?;
        let color = array_field(fields, "color", &INT_VECTOR)?.into_vec();
        check_len("color", color.len(), x.len())?;

        let layout = Self::new(LayoutFields {
            x,
            y,
            color,
            start_position: vec2_field(fields, "start_position")?,
            start_orientation: scalar_field(fields, "start_orientation")?,
            timing_line_position: vec2_field(fields, "timing_line_position")?,
            timing_line_orientation: scalar_field(fields, "timing_line_orientation")?,
            timing_line_width: scalar_field(fields, "timing_line_width")?,
        })?;

        debug!(cones = layout.len(), "constructed layout");
        Ok(layout)
    }

    /// Parses a JSON document and validates it, ignoring unknown keys.
    pub fn from_json_str(text: &str) -> LayoutResult<Self> {
        Self::from_json_str_with(text, &LayoutOptions::default())
    }

    pub fn from_json_str_with(text: &str, options: &LayoutOptions) -> LayoutResult<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Self::construct_with(&map, options),
            other => Err(LayoutError::NotAnObject {
                found: validate::json_type(&other),
            }),
        }
    }

    /// Reads a UTF-8 JSON layout file, ignoring unknown keys.
    pub fn load_from_file(path: impl AsRef<Path>) -> LayoutResult<Self> {
        Self::load_from_file_with(path, &LayoutOptions::default())
    }

    pub fn load_from_file_with(
        path: impl AsRef<Path>,
        options: &LayoutOptions,
    ) -> LayoutResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading layout");
        let text = std::fs::read_to_string(path).map_err(|source| LayoutError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str_with(&text, options)
    }

    /// Number of cones.
    pub fn len(&self) -> usize {
        self.fields.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.fields.x
    }

    pub fn y(&self) -> &[f64] {
        &self.fields.y
    }

    pub fn color(&self) -> &[i64] {
        &self.fields.color
    }

    pub fn start_position(&self) -> DVec2 {
        self.fields.start_position
    }

    pub fn start_orientation(&self) -> f64 {
        self.fields.start_orientation
    }

    pub fn timing_line_position(&self) -> DVec2 {
        self.fields.timing_line_position
    }

    pub fn timing_line_orientation(&self) -> f64 {
        self.fields.timing_line_orientation
    }

    pub fn timing_line_width(&self) -> f64 {
        self.fields.timing_line_width
    }

    pub fn fields(&self) -> &LayoutFields {
        &self.fields
    }

    pub fn into_fields(self) -> LayoutFields {
        self.fields
    }

    /// Cone positions as an `N x 2` array of `(x, y)` rows, in input order.
    pub fn cone_positions(&self) -> &Array<f64> {
        self.cone_positions
            .get_or_init(|| column_stack(&[self.fields.x.as_slice(), self.fields.y.as_slice()]))
    }

    /// Cones as an `N x 3` array of `(x, y, color)` rows, in input order.
    pub fn cones_with_color(&self) -> &Array<f64> {
        self.cones_with_color.get_or_init(|| {
            let color: Vec<f64> = self.fields.color.iter().map(|&c| c as f64).collect();
            column_stack(&[self.fields.x.as_slice(), self.fields.y.as_slice(), color.as_slice()])
        })
    }

    /// Cone positions as points.
    pub fn cone_points(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.fields
            .x
            .iter()
            .zip(&self.fields.y)
            .map(|(&x, &y)| DVec2::new(x, y))
    }

    /// Renders the layout in the file format accepted by [`Layout::from_json_str`].
    pub fn to_json_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.fields)
    }
}

fn require<'a>(fields: &'a Map<String, Value>, name: &'static str) -> LayoutResult<&'a Value> {
    fields
        .get(name)
        .ok_or(LayoutError::MissingField { field: name })
}

fn array_field<T: Element>(
    fields: &Map<String, Value>,
    name: &'static str,
    contract: &Contract<T>,
) -> LayoutResult<Array<T>> {
    contract
        .apply(require(fields, name)?)
        .map_err(|err| LayoutError::field(name, err))
}

fn vec2_field(fields: &Map<String, Value>, name: &'static str) -> LayoutResult<DVec2> {
    // FLOAT_VECTOR2 guarantees exactly two elements.
    let pair = array_field(fields, name, &FLOAT_VECTOR2)?.into_vec();
    Ok(DVec2::new(pair[0], pair[1]))
}

fn check_len(name: &'static str, len: usize, expected: usize) -> LayoutResult<()> {
    if len != expected {
        return Err(LayoutError::field(
            name,
            ShapeError::LengthMismatch {
                expected,
                actual: len,
            },
        ));
    }
    Ok(())
}

fn scalar_field(fields: &Map<String, Value>, name: &'static str) -> LayoutResult<f64> {
    validate::coerce_scalar(require(fields, name)?).map_err(|err| LayoutError::field(name, err))
}

/// Interleaves equal-length columns into an `N x K` array.
fn column_stack(columns: &[&[f64]]) -> Array<f64> {
    let rows = columns.first().map_or(0, |c| c.len());
    let mut data = Vec::with_capacity(rows * columns.len());
    for i in 0..rows {
        data.extend(columns.iter().map(|c| c[i]));
    }
    Array::from_parts(vec![rows, columns.len()], data)
}
