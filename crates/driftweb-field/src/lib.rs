//! Particle field rendering for the driftweb backdrop.
//!
//! A [`ParticleField`] owns a pool of drifting points on a host-supplied
//! [`Surface`], draws them each frame together with fading links between
//! nearby points, and follows the host's size and visibility signals.

mod frame;
mod geometry;
mod particle;
mod schedule;
mod signals;
mod state;
mod surface;

pub use frame::{FrameReport, draw_frame, link_opacity};
pub use geometry::Geometry;
pub use particle::{Particle, WRAP_MARGIN, seed_pool, target_count, wrap_coordinate};
pub use schedule::{FrameScheduler, FrameToken, TickScheduler};
pub use signals::{ResizeHandler, SizeSource, Visibility, VisibilityHandler, VisibilitySource};
pub use state::{DisableReason, Environment, FieldOptions, FieldStats, LoopState, ParticleField};
pub use surface::{Bounds, DrawCommand, DrawContext, RecordingSurface, Surface};
