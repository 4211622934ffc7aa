//! Particle state and pool seeding.

use driftweb_core::{FieldConfig, LogicalSize, Point, Rgba};
use rand::{Rng, seq::SliceRandom};

/// Distance past each edge a particle may travel before it wraps.
pub const WRAP_MARGIN: f64 = 20.0;

/// A single drifting point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Horizontal velocity in pixels per frame.
    pub vx: f64,
    /// Vertical velocity in pixels per frame.
    pub vy: f64,
    pub radius: f64,
    pub color: Rgba,
}

impl Particle {
    /// Current center.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Advance one frame and wrap around the margin-extended bounds.
    pub fn step(&mut self, size: LogicalSize) {
        self.x = wrap_coordinate(self.x + self.vx, size.width as f64);
        self.y = wrap_coordinate(self.y + self.vy, size.height as f64);
    }
}

/// Toroidal wrap on one axis with a [`WRAP_MARGIN`] overhang.
pub fn wrap_coordinate(value: f64, extent: f64) -> f64 {
    if value < -WRAP_MARGIN {
        extent + WRAP_MARGIN
    } else if value > extent + WRAP_MARGIN {
        -WRAP_MARGIN
    } else {
        value
    }
}

/// Number of particles for a surface of the given size.
pub fn target_count(size: LogicalSize, config: &FieldConfig) -> usize {
    let raw = (size.area() * config.density).floor();
    let raw = if raw.is_finite() && raw > 0.0 {
        raw as usize
    } else {
        0
    };
    raw.min(config.max_particles).max(config.min_particles)
}

/// Create a fresh pool for the given size.
pub fn seed_pool<R: Rng + ?Sized>(
    size: LogicalSize,
    config: &FieldConfig,
    rng: &mut R,
) -> Vec<Particle> {
    let width = size.width as f64;
    let height = size.height as f64;

    (0..target_count(size, config))
        .map(|_| Particle {
            x: rng.gen_range(0.0..width),
            y: rng.gen_range(0.0..height),
            vx: rng.gen_range(-config.speed..=config.speed),
            vy: rng.gen_range(-config.speed..=config.speed),
            radius: rng.gen_range(config.radius_min..=config.radius_max),
            color: config.palette.choose(rng).copied().unwrap_or(Rgba::WHITE),
        })
        .collect()
}
