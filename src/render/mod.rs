//! Drawing primitives and the rendering context.
//!
//! Scene entities never talk to a window or a GPU. They describe what to
//! draw through the [`Canvas`] trait, which is implemented by the CPU
//! [`Raster`] for display and by the [`Recorder`] for tests.

pub mod font;
mod raster;
mod recorder;

pub use raster::{Raster, TEXT_SCALE};
pub use recorder::{DrawCall, PaintKind, Recorder, ShapeKind};

use glam::Vec2;

use crate::path::BezierPath;
use crate::textures::{Texture, TextureSet};

/// Straight-alpha colour. Channels are `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::from_f32(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::from_f32(1.0, 1.0, 1.0, 0.0);

    /// CSS-style `rgba(r, g, b, a)`.
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    pub const fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Concentric radial gradient.
///
/// Colour is `inner` at `inner_radius` and `outer` at `outer_radius`, clamped
/// beyond both. `outer_radius` may be smaller than `inner_radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub inner: Rgba,
    pub outer: Rgba,
}

impl RadialGradient {
    pub fn color_at(&self, point: Vec2) -> Rgba {
        let span = self.outer_radius - self.inner_radius;
        let t = if span.abs() < f32::EPSILON {
            1.0
        } else {
            (point.distance(self.center) - self.inner_radius) / span
        };
        self.inner.lerp(self.outer, t.clamp(0.0, 1.0))
    }
}

/// A texture tiled across the plane.
///
/// Surface point `p` samples texel `(p - origin) / scale`, wrapping.
#[derive(Debug, Clone, Copy)]
pub struct Pattern<'a> {
    pub texture: &'a Texture,
    pub origin: Vec2,
    pub scale: Vec2,
}

impl<'a> Pattern<'a> {
    pub fn new(texture: &'a Texture) -> Self {
        Self {
            texture,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Paint<'a> {
    Solid(Rgba),
    Pattern(Pattern<'a>),
    Radial(RadialGradient),
}

/// How a painted colour combines with what is already on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Standard alpha blending (default).
    #[default]
    SourceOver,
    /// Darken by multiplying with the destination.
    Multiply,
    /// Add to the destination, for glowing highlights.
    Lighter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Global alpha applied on top of the paint.
    pub alpha: f32,
    pub composite: Composite,
    /// Box blur radius of the coverage mask, in pixels.
    pub blur: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            composite: Composite::SourceOver,
            blur: 0.0,
        }
    }
}

impl Style {
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }

    pub fn with_blur(mut self, blur: f32) -> Self {
        self.blur = blur;
        self
    }
}

/// Dash pattern measured along the stroked line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
    pub offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub dash: Option<Dash>,
}

impl Stroke {
    pub fn solid(width: f32) -> Self {
        Self { width, dash: None }
    }

    pub fn dashed(width: f32, dash: Dash) -> Self {
        Self {
            width,
            dash: Some(dash),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// Axis-aligned rectangle from `min` to `max`.
    Rect { min: Vec2, max: Vec2 },
    Circle { center: Vec2, radius: f32 },
    /// Open two-point line. Filling it is a no-op.
    Line { from: Vec2, to: Vec2 },
    Path(&'a BezierPath),
}

/// A texture stamped as a rotated square.
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    pub texture: &'a Texture,
    pub center: Vec2,
    pub size: f32,
    /// Radians, clockwise on a y-down surface.
    pub rotation: f32,
    pub alpha: f32,
}

/// A drawing surface.
pub trait Canvas {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    fn fill(&mut self, shape: &Shape<'_>, paint: &Paint<'_>, style: &Style);

    fn stroke(&mut self, shape: &Shape<'_>, paint: &Paint<'_>, stroke: &Stroke, style: &Style);

    fn draw_sprite(&mut self, sprite: &Sprite<'_>);

    /// Draw `text` horizontally centered on `anchor`, with `anchor.y` as the baseline.
    fn fill_text(&mut self, text: &str, anchor: Vec2, color: Rgba);
}

/// Everything a render call needs: where to draw and with which textures.
pub struct RenderContext<'a> {
    pub canvas: &'a mut dyn Canvas,
    pub textures: &'a TextureSet,
}

impl<'a> RenderContext<'a> {
    pub fn new(canvas: &'a mut dyn Canvas, textures: &'a TextureSet) -> Self {
        Self { canvas, textures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_from_css_bytes() {
        let c = Rgba::new(255, 0, 51, 0.5);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-6);
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn test_radial_gradient_clamps() {
        let g = RadialGradient {
            center: Vec2::ZERO,
            inner_radius: 10.0,
            outer_radius: 20.0,
            inner: Rgba::from_f32(0.0, 0.0, 0.0, 1.0),
            outer: Rgba::from_f32(1.0, 1.0, 1.0, 1.0),
        };
        assert_eq!(g.color_at(Vec2::ZERO).r, 0.0);
        assert!((g.color_at(Vec2::new(15.0, 0.0)).r - 0.5).abs() < 1e-6);
        assert_eq!(g.color_at(Vec2::new(0.0, 40.0)).r, 1.0);
    }

    #[test]
    fn test_reversed_radial_gradient() {
        // A ring: opaque at the rim, transparent toward the middle.
        let g = RadialGradient {
            center: Vec2::ZERO,
            inner_radius: 10.0,
            outer_radius: 7.5,
            inner: Rgba::WHITE,
            outer: Rgba::TRANSPARENT,
        };
        assert_eq!(g.color_at(Vec2::new(10.0, 0.0)).a, 1.0);
        assert_eq!(g.color_at(Vec2::ZERO).a, 0.0);
    }
}
