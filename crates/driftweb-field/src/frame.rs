//! Per-frame update and draw.

use driftweb_core::{FieldConfig, LogicalSize};

use crate::particle::Particle;
use crate::surface::DrawContext;

/// What a single frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub particles: usize,
    pub links: usize,
}

/// Stroke opacity of a link between two centers `distance` apart.
///
/// Fades linearly from `link_alpha` to exactly zero at `link_distance`;
/// `None` beyond it.
pub fn link_opacity(distance: f64, config: &FieldConfig) -> Option<f32> {
    if distance <= config.link_distance {
        let t = 1.0 - distance / config.link_distance;
        Some((config.link_alpha as f64 * t) as f32)
    } else {
        None
    }
}

/// Advance every particle one step and draw the frame.
///
/// Links are tested pairwise against particles later in the pool, so each
/// unordered pair is visited once. This O(n²) pass bounds the frame cost by
/// `max_particles`.
pub fn draw_frame(
    pool: &mut [Particle],
    size: LogicalSize,
    config: &FieldConfig,
    ctx: &mut dyn DrawContext,
) -> FrameReport {
    ctx.clear(size);

    let mut links = 0;
    for i in 0..pool.len() {
        let a = {
            let particle = &mut pool[i];
            particle.step(size);
            *particle
        };

        ctx.fill_circle(a.position(), a.radius, a.color.with_alpha(config.dot_alpha));

        for b in &pool[i + 1..] {
            let distance = a.position().distance(b.position());
            let Some(alpha) = link_opacity(distance, config) else {
                continue;
            };
            ctx.stroke_line(
                a.position(),
                b.position(),
                config.link_width,
                config.link_color.with_alpha(alpha),
            );
            links += 1;
        }
    }

    FrameReport {
        particles: pool.len(),
        links,
    }
}
