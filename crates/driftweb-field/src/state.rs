//! Particle field lifecycle management.

use std::fmt;
use std::sync::mpsc::{self, Receiver};

use driftweb_core::{FieldConfig, InvalidFieldConfig, LogicalSize, Variant};
use rand::{SeedableRng, rngs::StdRng};

use crate::frame::draw_frame;
use crate::geometry::Geometry;
use crate::particle::{Particle, seed_pool};
use crate::schedule::{FrameScheduler, FrameToken};
use crate::signals::{
    FieldEvent, ResizeHandler, SizeSource, Visibility, VisibilityHandler, VisibilitySource,
};
use crate::surface::Surface;

/// Why a field never started.
#[derive(Debug, Clone, PartialEq)]
pub enum DisableReason {
    /// The user asked for reduced motion.
    ReducedMotion,
    /// The surface could not provide a drawing context.
    NoContext,
    InvalidConfig(InvalidFieldConfig),
}

impl fmt::Display for DisableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReducedMotion => f.write_str("reduced motion requested"),
            Self::NoContext => f.write_str("no drawing context available"),
            Self::InvalidConfig(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

/// Frame loop state.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    /// Seeded but no frame requested yet.
    Idle,
    /// Exactly one frame is scheduled.
    Running { pending: FrameToken },
    /// Hidden; nothing is scheduled.
    Suspended,
    /// Permanently inert for this session.
    Disabled(DisableReason),
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Frames drawn since mount.
    pub frames: u64,
    /// Links drawn in the most recent frame.
    pub links_drawn: usize,
    /// Particles in the current pool.
    pub particles: usize,
    /// Times the pool was regenerated.
    pub reseeds: u64,
}

/// Host signals consumed at mount.
pub struct Environment<'a> {
    /// Read once; when set the field never starts.
    pub reduced_motion: bool,
    /// Observer for the surface's container, if the host has one.
    pub container_resize: Option<&'a mut dyn SizeSource>,
    /// Window-level resize signal used when there is no container observer.
    pub window_resize: &'a mut dyn SizeSource,
    pub visibility: &'a mut dyn VisibilitySource,
}

/// Optional overrides for [`ParticleField::mount`].
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// Use this instead of the preset named by the surface tag.
    pub config: Option<FieldConfig>,
    /// Fixed RNG seed; otherwise drawn from OS entropy.
    pub seed: Option<u64>,
}

/// An animated field of drifting, linked particles bound to one surface.
pub struct ParticleField<S: Surface> {
    surface: S,
    config: FieldConfig,
    scheduler: Box<dyn FrameScheduler>,
    events: Receiver<FieldEvent>,
    pool: Vec<Particle>,
    geometry: Option<Geometry>,
    state: LoopState,
    rng: StdRng,
    stats: FieldStats,
}

impl<S: Surface> ParticleField<S> {
    /// Bind a field to a surface, subscribe to host signals and start the
    /// frame loop.
    ///
    /// Never fails: a missing capability leaves the field in
    /// [`LoopState::Disabled`], where it ignores every later event.
    pub fn mount(
        surface: S,
        env: Environment<'_>,
        scheduler: Box<dyn FrameScheduler>,
        options: FieldOptions,
    ) -> Self {
        let (tx, events) = mpsc::channel();

        let config = options
            .config
            .unwrap_or_else(|| FieldConfig::preset(Variant::from_tag(surface.variant_tag())));
        let seed = options.seed.unwrap_or_else(rand::random);

        let mut field = Self {
            surface,
            config,
            scheduler,
            events,
            pool: Vec::new(),
            geometry: None,
            state: LoopState::Idle,
            rng: StdRng::seed_from_u64(seed),
            stats: FieldStats::default(),
        };

        if let Some(reason) = field.disable_reason(env.reduced_motion) {
            tracing::info!(%reason, "particle field disabled");
            field.state = LoopState::Disabled(reason);
            return field;
        }

        match env.container_resize {
            Some(source) => source.on_change(ResizeHandler::new(tx.clone())),
            None => {
                tracing::debug!("no container observer, falling back to window resize");
                env.window_resize.on_change(ResizeHandler::new(tx.clone()));
            }
        }
        env.visibility.on_change(VisibilityHandler::new(tx));

        tracing::info!(seed, variant = ?field.surface.variant_tag(), "particle field mounted");
        field.reseed();
        field.start();
        field
    }

    fn disable_reason(&mut self, reduced_motion: bool) -> Option<DisableReason> {
        if reduced_motion {
            return Some(DisableReason::ReducedMotion);
        }
        if let Err(err) = self.config.validate() {
            return Some(DisableReason::InvalidConfig(err));
        }
        if self.surface.context().is_none() {
            return Some(DisableReason::NoContext);
        }
        None
    }

    /// Re-measure the surface and replace the whole pool.
    pub fn reseed(&mut self) {
        if self.is_disabled() {
            return;
        }

        let geometry = Geometry::measure(&self.surface);
        if !geometry.apply(&mut self.surface) {
            tracing::warn!("drawing context lost while resizing");
        }
        self.pool = seed_pool(geometry.size, &self.config, &mut self.rng);
        self.geometry = Some(geometry);
        self.stats.reseeds += 1;
        self.stats.particles = self.pool.len();

        tracing::debug!(
            width = geometry.size.width,
            height = geometry.size.height,
            scale = geometry.scale,
            particles = self.pool.len(),
            "reseeded particle field"
        );
    }

    /// Request the first frame. Only valid from [`LoopState::Idle`].
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running {
                pending: self.scheduler.request(),
            };
        }
    }

    /// Cancel the pending frame. No frame is drawn until [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        if let LoopState::Running { pending } = self.state {
            self.scheduler.cancel(pending);
            self.state = LoopState::Suspended;
            tracing::debug!(frames = self.stats.frames, "particle field suspended");
        }
    }

    /// Continue from the current pool. A no-op unless suspended.
    pub fn resume(&mut self) {
        if self.state == LoopState::Suspended {
            self.state = LoopState::Running {
                pending: self.scheduler.request(),
            };
            tracing::debug!("particle field resumed");
        }
    }

    /// Apply queued size and visibility events.
    ///
    /// Multiple queued resizes collapse into one reseed.
    pub fn pump(&mut self) {
        let mut resized = false;
        while let Ok(event) = self.events.try_recv() {
            if self.is_disabled() {
                continue;
            }
            match event {
                FieldEvent::Resized => resized = true,
                FieldEvent::VisibilityChanged(Visibility::Hidden) => self.suspend(),
                FieldEvent::VisibilityChanged(Visibility::Visible) => self.resume(),
            }
        }
        if resized {
            self.reseed();
        }
    }

    /// Frame callback. Draws only when `token` is the pending frame and
    /// schedules the next one; returns whether a frame was drawn.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        self.pump();

        if self.state != (LoopState::Running { pending: token }) {
            tracing::trace!(token = token.id(), state = ?self.state, "ignoring stale frame");
            return false;
        }
        let Some(geometry) = self.geometry else {
            return false;
        };
        let Some(ctx) = self.surface.context() else {
            tracing::warn!("drawing context lost, frame skipped");
            return false;
        };

        let report = draw_frame(&mut self.pool, geometry.size, &self.config, ctx);
        self.stats.frames += 1;
        self.stats.links_drawn = report.links;

        self.state = LoopState::Running {
            pending: self.scheduler.request(),
        };
        true
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.state, LoopState::Disabled(_))
    }

    pub fn stats(&self) -> FieldStats {
        self.stats
    }

    pub fn particles(&self) -> &[Particle] {
        &self.pool
    }

    /// Logical size of the current pool, once seeded.
    pub fn size(&self) -> Option<LogicalSize> {
        self.geometry.map(|g| g.size)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for hosts that update surface bounds before notifying
    /// a resize.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: Surface> fmt::Debug for ParticleField<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleField")
            .field("state", &self.state)
            .field("geometry", &self.geometry)
            .field("particles", &self.pool.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TickScheduler;
    use crate::surface::RecordingSurface;

    #[derive(Default)]
    struct Signal {
        resize: Option<ResizeHandler>,
        visibility: Option<VisibilityHandler>,
    }

    impl SizeSource for Signal {
        fn on_change(&mut self, handler: ResizeHandler) {
            self.resize = Some(handler);
        }
    }

    impl VisibilitySource for Signal {
        fn on_change(&mut self, handler: VisibilityHandler) {
            self.visibility = Some(handler);
        }
    }

    fn mount(
        surface: RecordingSurface,
        reduced_motion: bool,
    ) -> (ParticleField<RecordingSurface>, TickScheduler, Signal, Signal) {
        let scheduler = TickScheduler::new();
        let mut signals = Signal::default();
        let mut window = Signal::default();
        let mut visibility = Signal::default();
        let field = ParticleField::mount(
            surface,
            Environment {
                reduced_motion,
                container_resize: Some(&mut signals),
                window_resize: &mut window,
                visibility: &mut visibility,
            },
            Box::new(scheduler.clone()),
            FieldOptions {
                seed: Some(42),
                ..Default::default()
            },
        );
        signals.visibility = visibility.visibility.take();
        (field, scheduler, signals, window)
    }

    #[test]
    fn test_mount_starts_running() {
        let (field, scheduler, size, window) = mount(RecordingSurface::new(800.0, 600.0), false);
        assert!(matches!(field.state(), LoopState::Running { .. }));
        assert_eq!(field.particles().len(), 46);
        assert_eq!(scheduler.pending(), 1);
        assert!(size.resize.is_some());
        assert!(window.resize.is_none());
    }

    #[test]
    fn test_reduced_motion_disables() {
        let (field, scheduler, size, _) = mount(RecordingSurface::new(800.0, 600.0), true);
        assert_eq!(
            field.state(),
            &LoopState::Disabled(DisableReason::ReducedMotion)
        );
        assert!(field.particles().is_empty());
        assert_eq!(scheduler.requested(), 0);
        assert!(size.resize.is_none());
    }

    #[test]
    fn test_missing_context_disables() {
        let (field, scheduler, _, _) =
            mount(RecordingSurface::new(800.0, 600.0).without_context(), false);
        assert_eq!(field.state(), &LoopState::Disabled(DisableReason::NoContext));
        assert_eq!(scheduler.requested(), 0);
        assert!(field.surface().commands.is_empty());
    }

    #[test]
    fn test_subtle_tag_selects_preset() {
        let (field, _, _, _) =
            mount(RecordingSurface::new(800.0, 600.0).with_variant("subtle"), false);
        assert_eq!(field.config(), &FieldConfig::preset(Variant::Subtle));
        assert_eq!(field.particles().len(), 34);
    }

    #[test]
    fn test_frame_redraws_and_reschedules() {
        let (mut field, scheduler, _, _) = mount(RecordingSurface::new(800.0, 600.0), false);
        let token = scheduler.take_due()[0];
        assert!(field.on_frame(token));
        let stats = field.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.particles, 46);
        assert!(stats.links_drawn <= 46 * 45 / 2);
        assert_eq!(scheduler.pending(), 1);

        // the fired token is spent
        assert!(!field.on_frame(token));
        assert_eq!(field.stats().frames, 1);
    }

    #[test]
    fn test_stale_token_after_suspend() {
        let (mut field, scheduler, _, _) = mount(RecordingSurface::new(800.0, 600.0), false);
        let LoopState::Running { pending } = *field.state() else {
            panic!("not running");
        };
        field.suspend();
        assert_eq!(field.state(), &LoopState::Suspended);
        assert_eq!(scheduler.pending(), 0);
        assert!(!field.on_frame(pending));
        assert_eq!(field.surface().frames_drawn(), 0);
    }

    #[test]
    fn test_resume_while_running_is_noop() {
        let (mut field, scheduler, _, _) = mount(RecordingSurface::new(800.0, 600.0), false);
        field.resume();
        field.start();
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.requested(), 1);
    }

    #[test]
    fn test_queued_resizes_coalesce() {
        let (mut field, _, size, _) = mount(RecordingSurface::new(800.0, 600.0), false);
        let handler = size.resize.as_ref().unwrap();
        field.surface_mut().container = Some(crate::Bounds::new(3000.0, 2000.0));
        handler.notify();
        handler.notify();
        handler.notify();
        field.pump();
        assert_eq!(field.stats().reseeds, 2);
        assert_eq!(field.particles().len(), 95);
    }

    #[test]
    fn test_window_resize_fallback() {
        let scheduler = TickScheduler::new();
        let mut window = Signal::default();
        let mut visibility = Signal::default();
        let mut field = ParticleField::mount(
            RecordingSurface::new(200.0, 100.0),
            Environment {
                reduced_motion: false,
                container_resize: None,
                window_resize: &mut window,
                visibility: &mut visibility,
            },
            Box::new(scheduler.clone()),
            FieldOptions::default(),
        );
        assert!(visibility.visibility.is_some());
        assert!(!field.is_disabled());

        field.surface_mut().container = Some(crate::Bounds::new(2000.0, 1500.0));
        window.resize.as_ref().unwrap().notify();
        let token = scheduler.take_due()[0];
        assert!(field.on_frame(token));

        let stats = field.stats();
        assert_eq!(stats.reseeds, 2);
        assert_eq!(stats.particles, 90);
        assert_eq!(field.particles().len(), 90);
        assert_eq!(
            field.size(),
            Some(LogicalSize {
                width: 2000,
                height: 1500
            })
        );
    }

    #[test]
    fn test_invalid_config_disables() {
        let mut config = FieldConfig::default();
        config.palette.clear();
        let scheduler = TickScheduler::new();
        let mut window = Signal::default();
        let mut visibility = Signal::default();
        let field = ParticleField::mount(
            RecordingSurface::new(200.0, 100.0),
            Environment {
                reduced_motion: false,
                container_resize: None,
                window_resize: &mut window,
                visibility: &mut visibility,
            },
            Box::new(scheduler.clone()),
            FieldOptions {
                config: Some(config),
                seed: None,
            },
        );
        assert_eq!(
            field.state(),
            &LoopState::Disabled(DisableReason::InvalidConfig(
                InvalidFieldConfig::EmptyPalette
            ))
        );
        assert_eq!(scheduler.requested(), 0);
    }
}
