//! Terminal drawing surface backed by a braille canvas.

use driftweb_core::{BackingSize, LogicalSize, Point, Rgba, Variant};
use driftweb_field::{Bounds, DrawContext, Surface};
use ratatui::{
    buffer::Buffer,
    layout::{Rect, Size},
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Circle, Line as CanvasLine},
    },
};

/// Color behind the particles.
pub const BACKDROP: Rgba = Rgba::rgb(9, 12, 22);

/// A shape in backing-store coordinates with y growing downwards.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Dot {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
    },
    Link {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
    },
}

/// The terminal as a drawing surface.
///
/// Draw commands are recorded into a display list which is painted onto a
/// ratatui canvas when the frame is rendered.
#[derive(Debug)]
pub struct TerminalSurface {
    bounds: Bounds,
    pixel_ratio: f64,
    variant: Variant,
    backing: BackingSize,
    scale: f64,
    shapes: Vec<Shape>,
}

impl TerminalSurface {
    pub fn new(bounds: Bounds, pixel_ratio: f64, variant: Variant) -> Self {
        Self {
            bounds,
            pixel_ratio,
            variant,
            backing: BackingSize {
                width: 1,
                height: 1,
            },
            scale: 1.0,
            shapes: Vec::new(),
        }
    }

    /// Update the measured terminal size before signalling a resize.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    fn to_backing(&self, p: Point) -> (f64, f64) {
        (p.x * self.scale, p.y * self.scale)
    }
}

/// Logical pixel size of a terminal.
///
/// Uses the pixel size the terminal reports, falling back to cell count
/// times the configured cell size.
pub fn logical_bounds(cells: Size, reported_px: Option<(u16, u16)>, cell_px: (u16, u16)) -> Bounds {
    match reported_px {
        Some((w, h)) if w > 0 && h > 0 => Bounds::new(w as f64, h as f64),
        _ => Bounds::new(
            cells.width as f64 * cell_px.0 as f64,
            cells.height as f64 * cell_px.1 as f64,
        ),
    }
}

impl Surface for TerminalSurface {
    fn container_bounds(&self) -> Option<Bounds> {
        Some(self.bounds)
    }

    fn own_bounds(&self) -> Bounds {
        self.bounds
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn variant_tag(&self) -> Option<&str> {
        Some(self.variant.as_str())
    }

    fn configure(&mut self, backing: BackingSize, _layout: LogicalSize) {
        self.backing = backing;
        self.shapes.clear();
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        Some(self as &mut dyn DrawContext)
    }
}

impl DrawContext for TerminalSurface {
    fn set_transform(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn clear(&mut self, _area: LogicalSize) {
        self.shapes.clear();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        let (x, y) = self.to_backing(center);
        self.shapes.push(Shape::Dot {
            x,
            y,
            radius: radius * self.scale,
            color: color.composite_over(BACKDROP),
        });
    }

    // Braille cells have a fixed stroke, so the width is not representable.
    fn stroke_line(&mut self, from: Point, to: Point, _width: f64, color: Rgba) {
        let (x1, y1) = self.to_backing(from);
        let (x2, y2) = self.to_backing(to);
        self.shapes.push(Shape::Link {
            x1,
            y1,
            x2,
            y2,
            color: color.composite_over(BACKDROP),
        });
    }
}

impl Widget for &TerminalSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = self.backing.height as f64;

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(Color::Rgb(BACKDROP.r, BACKDROP.g, BACKDROP.b))
            .x_bounds([0.0, self.backing.width as f64])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                // links first so dots stay on top
                for shape in &self.shapes {
                    if let Shape::Link {
                        x1,
                        y1,
                        x2,
                        y2,
                        color,
                    } = *shape
                    {
                        ctx.draw(&CanvasLine::new(x1, height - y1, x2, height - y2, color));
                    }
                }
                for shape in &self.shapes {
                    if let Shape::Dot {
                        x,
                        y,
                        radius,
                        color,
                    } = *shape
                    {
                        ctx.draw(&Circle {
                            x,
                            y: height - y,
                            radius,
                            color,
                        });
                    }
                }
            })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_bounds_prefers_reported_pixels() {
        let cells = Size::new(100, 40);
        assert_eq!(
            logical_bounds(cells, Some((1000, 800)), (8, 16)),
            Bounds::new(1000.0, 800.0)
        );
        assert_eq!(
            logical_bounds(cells, Some((0, 0)), (8, 16)),
            Bounds::new(800.0, 640.0)
        );
        assert_eq!(
            logical_bounds(cells, None, (9, 18)),
            Bounds::new(900.0, 720.0)
        );
    }

    #[test]
    fn test_commands_scale_to_backing() {
        let mut surface = TerminalSurface::new(Bounds::new(100.0, 50.0), 2.0, Variant::Standard);
        surface.configure(
            BackingSize {
                width: 200,
                height: 100,
            },
            LogicalSize {
                width: 100,
                height: 50,
            },
        );
        surface.set_transform(2.0);
        surface.fill_circle(Point::new(10.0, 5.0), 1.5, Rgba::WHITE);
        surface.stroke_line(Point::new(0.0, 0.0), Point::new(4.0, 3.0), 1.35, Rgba::BLACK);

        assert_eq!(
            surface.shapes,
            vec![
                Shape::Dot {
                    x: 20.0,
                    y: 10.0,
                    radius: 3.0,
                    color: Color::Rgb(255, 255, 255),
                },
                Shape::Link {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 8.0,
                    y2: 6.0,
                    color: Color::Rgb(0, 0, 0),
                },
            ]
        );

        surface.clear(LogicalSize {
            width: 100,
            height: 50,
        });
        assert!(surface.shapes.is_empty());
    }

    #[test]
    fn test_render_paints_dots() {
        let mut surface = TerminalSurface::new(Bounds::new(80.0, 64.0), 1.0, Variant::Subtle);
        surface.configure(
            BackingSize {
                width: 80,
                height: 64,
            },
            LogicalSize {
                width: 80,
                height: 64,
            },
        );
        surface.fill_circle(Point::new(40.0, 32.0), 1.0, Rgba::WHITE);

        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        (&surface).render(area, &mut buf);

        let painted = buf
            .content
            .iter()
            .filter(|cell| cell.symbol() != " " && cell.symbol() != "\u{2800}")
            .count();
        assert!(painted > 0);
        assert_eq!(surface.variant_tag(), Some("subtle"));
    }
}
