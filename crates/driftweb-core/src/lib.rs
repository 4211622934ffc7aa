//! Core types shared by the driftweb crates.
//!
//! Colors with a separate alpha channel, the two field presets and the
//! geometry value types used to size the drawing surface.

mod color;
mod field_config;
mod geometry;

pub use color::Rgba;
pub use field_config::{FieldConfig, InvalidFieldConfig, Variant};
pub use geometry::{BackingSize, LogicalSize, MAX_PIXEL_RATIO, Point, clamp_pixel_ratio};
