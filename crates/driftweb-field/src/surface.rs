//! Drawing surface abstraction supplied by the host.

use driftweb_core::{BackingSize, LogicalSize, Point, Rgba};

/// Width and height of a bounding box, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The element the field draws on.
pub trait Surface {
    /// Bounding box of the element containing the surface, when there is one.
    fn container_bounds(&self) -> Option<Bounds>;

    /// Bounding box of the surface element itself.
    fn own_bounds(&self) -> Bounds;

    /// Current device pixel ratio as reported by the host.
    fn device_pixel_ratio(&self) -> f64;

    /// Preset tag attached to the surface, if any.
    fn variant_tag(&self) -> Option<&str>;

    /// Set the backing resolution while keeping the layout size logical.
    fn configure(&mut self, backing: BackingSize, layout: LogicalSize);

    /// The 2D drawing context, or `None` when the host cannot provide one.
    fn context(&mut self) -> Option<&mut dyn DrawContext>;
}

/// Immediate-mode drawing commands, issued in logical pixels once a
/// transform is set.
pub trait DrawContext {
    /// Scale every subsequent command from logical to backing pixels.
    fn set_transform(&mut self, scale: f64);

    /// Erase the whole logical area.
    fn clear(&mut self, area: LogicalSize);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba);
}

/// A command captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetTransform(f64),
    Clear(LogicalSize),
    FillCircle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
    StrokeLine {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba,
    },
}

/// A surface that records what would be drawn.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub container: Option<Bounds>,
    pub bounds: Bounds,
    pub pixel_ratio: f64,
    pub variant: Option<String>,
    /// Whether [`Surface::context`] yields a context.
    pub has_context: bool,
    /// Last backing/layout pair passed to [`Surface::configure`].
    pub configured: Option<(BackingSize, LogicalSize)>,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// A surface inside a container of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            container: Some(Bounds::new(width, height)),
            bounds: Bounds::new(width, height),
            pixel_ratio: 1.0,
            variant: None,
            has_context: true,
            configured: None,
            commands: Vec::new(),
        }
    }

    pub fn with_variant(mut self, tag: &str) -> Self {
        self.variant = Some(tag.to_string());
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn without_context(mut self) -> Self {
        self.has_context = false;
        self
    }

    /// Number of frames drawn so far (each frame starts with a clear).
    pub fn frames_drawn(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear(_)))
            .count()
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
    }
}

impl Surface for RecordingSurface {
    fn container_bounds(&self) -> Option<Bounds> {
        self.container
    }

    fn own_bounds(&self) -> Bounds {
        self.bounds
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn variant_tag(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    fn configure(&mut self, backing: BackingSize, layout: LogicalSize) {
        self.configured = Some((backing, layout));
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        if self.has_context {
            Some(self as &mut dyn DrawContext)
        } else {
            None
        }
    }
}

impl DrawContext for RecordingSurface {
    fn set_transform(&mut self, scale: f64) {
        self.commands.push(DrawCommand::SetTransform(scale));
    }

    fn clear(&mut self, area: LogicalSize) {
        self.commands.push(DrawCommand::Clear(area));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            width,
            color,
        });
    }
}
