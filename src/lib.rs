//! # cone-layout
//!
//! Strongly-typed, shape-checked track layouts for cone-based courses.
//!
//! A [`Layout`] describes where the cones are, what color each one is, where the
//! vehicle starts and where the timing line sits. Layouts are read from JSON with
//! [`Layout::load_from_file`]; every field passes through a [`Contract`] that first
//! coerces the raw value to a fixed numeric type and then checks its shape, so a
//! successfully constructed layout never holds malformed data.

pub mod array;
pub mod error;
pub mod layout;
pub mod validate;

pub use array::*;
pub use error::*;
pub use layout::*;
pub use validate::*;
