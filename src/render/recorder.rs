use glam::Vec2;

use super::{Canvas, Paint, RadialGradient, Rgba, Shape, Sprite, Stroke, Style};

/// Owned description of a [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Rect { min: Vec2, max: Vec2 },
    Circle { center: Vec2, radius: f32 },
    Line { from: Vec2, to: Vec2 },
    Path { start: Vec2, segments: usize },
}

impl From<&Shape<'_>> for ShapeKind {
    fn from(shape: &Shape<'_>) -> Self {
        match *shape {
            Shape::Rect { min, max } => ShapeKind::Rect { min, max },
            Shape::Circle { center, radius } => ShapeKind::Circle { center, radius },
            Shape::Line { from, to } => ShapeKind::Line { from, to },
            Shape::Path(path) => ShapeKind::Path {
                start: path.start(),
                segments: path.segments().len(),
            },
        }
    }
}

/// Owned description of a [`Paint`]. Patterns keep only their placement.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintKind {
    Solid(Rgba),
    Pattern {
        width: u32,
        height: u32,
        origin: Vec2,
        scale: Vec2,
    },
    Radial(RadialGradient),
}

impl From<&Paint<'_>> for PaintKind {
    fn from(paint: &Paint<'_>) -> Self {
        match *paint {
            Paint::Solid(color) => PaintKind::Solid(color),
            Paint::Pattern(p) => PaintKind::Pattern {
                width: p.texture.width(),
                height: p.texture.height(),
                origin: p.origin,
                scale: p.scale,
            },
            Paint::Radial(g) => PaintKind::Radial(g),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill {
        shape: ShapeKind,
        paint: PaintKind,
        style: Style,
    },
    Stroke {
        shape: ShapeKind,
        paint: PaintKind,
        stroke: Stroke,
        style: Style,
    },
    Sprite {
        center: Vec2,
        size: f32,
        rotation: f32,
        alpha: f32,
    },
    Text {
        text: String,
        anchor: Vec2,
        color: Rgba,
    },
}

/// A [`Canvas`] that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    width: u32,
    height: u32,
    calls: Vec<DrawCall>,
}

impl Recorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded sprite stamps.
    pub fn sprite_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Sprite { .. }))
            .count()
    }

    /// Recorded text, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Canvas for Recorder {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, shape: &Shape<'_>, paint: &Paint<'_>, style: &Style) {
        self.calls.push(DrawCall::Fill {
            shape: shape.into(),
            paint: paint.into(),
            style: *style,
        });
    }

    fn stroke(&mut self, shape: &Shape<'_>, paint: &Paint<'_>, stroke: &Stroke, style: &Style) {
        self.calls.push(DrawCall::Stroke {
            shape: shape.into(),
            paint: paint.into(),
            stroke: *stroke,
            style: *style,
        });
    }

    fn draw_sprite(&mut self, sprite: &Sprite<'_>) {
        self.calls.push(DrawCall::Sprite {
            center: sprite.center,
            size: sprite.size,
            rotation: sprite.rotation,
            alpha: sprite.alpha,
        });
    }

    fn fill_text(&mut self, text: &str, anchor: Vec2, color: Rgba) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            anchor,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textures::Texture;

    #[test]
    fn test_records_in_order() {
        let tex = Texture::solid(255, 255, 255, 255);
        let mut rec = Recorder::new(100, 50);
        rec.fill(
            &Shape::Circle { center: Vec2::ONE, radius: 3.0 },
            &Paint::Solid(Rgba::WHITE),
            &Style::default(),
        );
        rec.draw_sprite(&Sprite {
            texture: &tex,
            center: Vec2::ZERO,
            size: 10.0,
            rotation: 0.5,
            alpha: 0.2,
        });
        rec.fill_text("hi", Vec2::ZERO, Rgba::WHITE);

        assert_eq!(rec.size(), (100, 50));
        assert_eq!(rec.calls().len(), 3);
        assert!(matches!(
            rec.calls()[0],
            DrawCall::Fill { shape: ShapeKind::Circle { radius, .. }, .. } if radius == 3.0
        ));
        assert_eq!(rec.sprite_count(), 1);
        assert_eq!(rec.texts().collect::<Vec<_>>(), vec!["hi"]);

        rec.clear();
        assert!(rec.calls().is_empty());
    }
}
