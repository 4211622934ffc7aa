//! Surface measurement and backing-store setup.

use driftweb_core::{BackingSize, LogicalSize, clamp_pixel_ratio};

use crate::surface::Surface;

/// Measured layout of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub size: LogicalSize,
    pub backing: BackingSize,
    /// Backing pixels per logical pixel.
    pub scale: f64,
}

impl Geometry {
    /// Read the container bounds and pixel ratio from the surface.
    ///
    /// Falls back to the surface's own bounds when it has no container.
    pub fn measure<S: Surface + ?Sized>(surface: &S) -> Self {
        let bounds = surface
            .container_bounds()
            .unwrap_or_else(|| surface.own_bounds());
        let scale = clamp_pixel_ratio(surface.device_pixel_ratio());
        let size = LogicalSize::from_bounds(bounds.width, bounds.height);

        Self {
            size,
            backing: BackingSize::scaled(size, scale),
            scale,
        }
    }

    /// Resize the backing store and set the logical-pixel transform.
    ///
    /// Returns `false` when the surface no longer has a drawing context.
    pub fn apply<S: Surface + ?Sized>(&self, surface: &mut S) -> bool {
        surface.configure(self.backing, self.size);
        match surface.context() {
            Some(ctx) => {
                ctx.set_transform(self.scale);
                true
            }
            None => false,
        }
    }
}
