//! Logical and backing-store geometry.

/// Upper bound on the device pixel ratio used for the backing store.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Surface size in logical (device-independent) pixels. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalSize {
    pub width: u32,
    pub height: u32,
}

impl LogicalSize {
    /// Size from a measured bounding box, floored and clamped to at least
    /// one pixel per axis.
    pub fn from_bounds(width: f64, height: f64) -> Self {
        Self {
            width: floor_at_least_one(width),
            height: floor_at_least_one(height),
        }
    }

    /// Area in square logical pixels.
    pub fn area(self) -> f64 {
        self.width as f64 * self.height as f64
    }
}

/// Backing-store resolution in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackingSize {
    pub width: u32,
    pub height: u32,
}

impl BackingSize {
    /// Backing resolution for a logical size at the given scale.
    pub fn scaled(logical: LogicalSize, scale: f64) -> Self {
        Self {
            width: floor_at_least_one(logical.width as f64 * scale),
            height: floor_at_least_one(logical.height as f64 * scale),
        }
    }
}

/// A position in logical pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Scale factor for a reported device pixel ratio, capped at
/// [`MAX_PIXEL_RATIO`]. Missing or nonsensical readings count as 1.
pub fn clamp_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

fn floor_at_least_one(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.floor().min(u32::MAX as f64) as u32
    } else {
        1
    }
}
