use glam::{Vec2, Vec4};
use image::RgbaImage;

use super::font;
use super::{Canvas, Composite, Dash, Paint, Pattern, Rgba, Shape, Sprite, Stroke, Style};
use crate::path::DEFAULT_FLATTEN_STEPS;

/// Vertical coverage samples per pixel row.
const SUBSAMPLES: usize = 4;
/// Integer magnification of the bitmap font.
pub const TEXT_SCALE: u32 = 2;

/// Coverage buffer reused by every draw call.
struct Mask {
    coverage: Vec<f32>,
    scratch: Vec<f32>,
    row: Vec<f32>,
    /// Touched pixel rectangle, `x0..x1` by `y0..y1`.
    bounds: (usize, usize, usize, usize),
}

impl Mask {
    fn new(width: usize, height: usize) -> Self {
        Self {
            coverage: vec![0.0; width * height],
            scratch: vec![0.0; width * height],
            row: vec![0.0; width],
            bounds: (0, 0, 0, 0),
        }
    }

    fn reset(&mut self, width: usize) {
        let (x0, y0, x1, y1) = self.bounds;
        for y in y0..y1 {
            self.coverage[y * width + x0..y * width + x1].fill(0.0);
        }
        self.bounds = (width, usize::MAX, 0, 0);
    }

    fn grow(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        let b = &mut self.bounds;
        *b = (b.0.min(x0), b.1.min(y0), b.2.max(x1), b.3.max(y1));
    }

    fn is_empty(&self) -> bool {
        self.bounds.0 >= self.bounds.2 || self.bounds.1 >= self.bounds.3
    }
}

/// CPU rasterizer drawing into an RGBA frame.
///
/// Pixels are kept as premultiplied floats and converted to 8-bit on
/// [`Raster::frame`]. Fills use even-odd scanline coverage with
/// [`SUBSAMPLES`] rows per pixel and exact horizontal coverage, so edges
/// are antialiased.
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
    mask: Mask,
    frame: RgbaImage,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1), height.max(1));
        Self {
            width: w,
            height: h,
            pixels: vec![Vec4::new(0.0, 0.0, 0.0, 1.0); (w * h) as usize],
            mask: Mask::new(w as usize, h as usize),
            frame: RgbaImage::new(w, h),
        }
    }

    /// Reallocate for a new size. The contents are cleared to black.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width.max(1), height.max(1)) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        let c = premultiply(color);
        self.pixels.fill(c);
    }

    /// The current contents as an opaque 8-bit sRGB image.
    pub fn frame(&mut self) -> &RgbaImage {
        for (px, out) in self.pixels.iter().zip(self.frame.pixels_mut()) {
            let c = px.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            *out = image::Rgba([c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255]);
        }
        &self.frame
    }

    /// Colour at a pixel, composited over black.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let p = self.pixels[(y * self.width + x) as usize];
        Rgba::from_f32(p.x, p.y, p.z, p.w)
    }

    fn begin_mask(&mut self) {
        self.mask.reset(self.width as usize);
    }

    /// Union one polygon into the mask.
    fn cover_polygon(&mut self, points: &[Vec2]) {
        if points.len() < 3 {
            return;
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let (min, max) = points
            .iter()
            .fold((points[0], points[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize + 1).min(w);
        let y1 = (max.y.ceil().max(0.0) as usize + 1).min(h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        self.mask.grow(x0, y0, x1, y1);

        let mut crossings = Vec::with_capacity(8);
        let weight = 1.0 / SUBSAMPLES as f32;
        for py in y0..y1 {
            let row = &mut self.mask.row;
            row[x0..x1].fill(0.0);
            for s in 0..SUBSAMPLES {
                let sy = py as f32 + (s as f32 + 0.5) * weight;
                crossings.clear();
                for (i, &a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    if (a.y <= sy && sy < b.y) || (b.y <= sy && sy < a.y) {
                        crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                    }
                }
                crossings.sort_by(f32::total_cmp);
                for span in crossings.chunks_exact(2) {
                    add_span(row, span[0], span[1], weight, x0, x1);
                }
            }
            let line = &mut self.mask.coverage[py * w..py * w + w];
            for x in x0..x1 {
                line[x] = line[x].max(row[x].min(1.0));
            }
        }
    }

    fn cover_shape(&mut self, shape: &Shape<'_>) {
        match *shape {
            Shape::Rect { min, max } => self.cover_polygon(&[
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
            ]),
            Shape::Circle { center, radius } => self.cover_polygon(&circle_points(center, radius)),
            Shape::Line { .. } => {}
            Shape::Path(path) => self.cover_polygon(&path.flatten(DEFAULT_FLATTEN_STEPS)),
        }
    }

    fn cover_stroke(&mut self, shape: &Shape<'_>, stroke: &Stroke) {
        let (points, closed) = match *shape {
            Shape::Rect { min, max } => (
                vec![min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)],
                true,
            ),
            Shape::Circle { center, radius } => (circle_points(center, radius), true),
            Shape::Line { from, to } => (vec![from, to], false),
            Shape::Path(path) => (path.flatten(DEFAULT_FLATTEN_STEPS), true),
        };
        if points.len() < 2 || stroke.width <= 0.0 {
            return;
        }
        let mut polyline = points;
        if closed {
            polyline.push(polyline[0]);
        }

        let half = stroke.width / 2.0;
        match stroke.dash {
            Some(dash) => {
                for piece in dash_polyline(&polyline, dash) {
                    self.cover_polyline(&piece, half, false);
                }
            }
            None => self.cover_polyline(&polyline, half, stroke.width >= 2.0),
        }
    }

    fn cover_polyline(&mut self, points: &[Vec2], half: f32, joins: bool) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let along = b - a;
            if along.length_squared() < 1e-12 {
                continue;
            }
            let n = along.normalize().perp() * half;
            self.cover_polygon(&[a + n, b + n, b - n, a - n]);
        }
        if joins {
            for &p in &points[1..points.len() - 1] {
                self.cover_polygon(&circle_points(p, half));
            }
        }
    }

    /// Box-blur the mask, widening its bounds by the blur radius.
    fn blur_mask(&mut self, radius: f32) {
        let r = radius.round() as usize;
        if r == 0 || self.mask.is_empty() {
            return;
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let (x0, y0, x1, y1) = self.mask.bounds;
        let (x0, y0) = (x0.saturating_sub(r), y0.saturating_sub(r));
        let (x1, y1) = ((x1 + r).min(w), (y1 + r).min(h));
        self.mask.bounds = (x0, y0, x1, y1);

        let norm = 1.0 / (2 * r + 1) as f32;
        let Mask { coverage, scratch, .. } = &mut self.mask;
        for y in y0..y1 {
            for x in x0..x1 {
                let lo = x.saturating_sub(r);
                let hi = (x + r + 1).min(w);
                let sum: f32 = coverage[y * w + lo..y * w + hi].iter().sum();
                scratch[y * w + x] = sum * norm;
            }
        }
        for y in y0..y1 {
            for x in x0..x1 {
                let lo = y.saturating_sub(r).max(y0);
                let hi = (y + r + 1).min(y1);
                let sum: f32 = (lo..hi).map(|yy| scratch[yy * w + x]).sum();
                coverage[y * w + x] = sum * norm;
            }
        }
    }

    /// Paint the mask onto the frame.
    fn composite_mask(&mut self, paint: &Paint<'_>, style: &Style) {
        if self.mask.is_empty() {
            return;
        }
        let w = self.width as usize;
        let (x0, y0, x1, y1) = self.mask.bounds;
        for y in y0..y1 {
            for x in x0..x1 {
                let cov = self.mask.coverage[y * w + x];
                if cov <= 0.0 {
                    continue;
                }
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let color = paint_at(paint, p);
                let alpha = color.a * style.alpha * cov;
                let dst = &mut self.pixels[y * w + x];
                *dst = blend(*dst, color.with_alpha(alpha), style.composite);
            }
        }
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize) * self.width as usize + x as usize;
        self.pixels[i] = blend(self.pixels[i], color, Composite::SourceOver);
    }
}

impl Canvas for Raster {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, shape: &Shape<'_>, paint: &Paint<'_>, style: &Style) {
        self.begin_mask();
        self.cover_shape(shape);
        self.blur_mask(style.blur);
        self.composite_mask(paint, style);
    }

    fn stroke(&mut self, shape: &Shape<'_>, paint: &Paint<'_>, stroke: &Stroke, style: &Style) {
        self.begin_mask();
        self.cover_stroke(shape, stroke);
        self.blur_mask(style.blur);
        self.composite_mask(paint, style);
    }

    fn draw_sprite(&mut self, sprite: &Sprite<'_>) {
        if sprite.size <= 0.0 {
            return;
        }
        let half = sprite.size / 2.0;
        let reach = half * std::f32::consts::SQRT_2;
        let x0 = (sprite.center.x - reach).floor().max(0.0) as i64;
        let y0 = (sprite.center.y - reach).floor().max(0.0) as i64;
        let x1 = ((sprite.center.x + reach).ceil() as i64).min(self.width as i64);
        let y1 = ((sprite.center.y + reach).ceil() as i64).min(self.height as i64);
        let unrotate = Vec2::from_angle(-sprite.rotation);

        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - sprite.center;
                let local = unrotate.rotate(d);
                if local.x.abs() > half || local.y.abs() > half {
                    continue;
                }
                let uv = (local + half) / sprite.size;
                let color = sprite.texture.sample_uv(uv.x, uv.y);
                self.blend_pixel(x, y, color.with_alpha(color.a * sprite.alpha));
            }
        }
    }

    fn fill_text(&mut self, text: &str, anchor: Vec2, color: Rgba) {
        let width = font::text_width(text, TEXT_SCALE) as f32;
        let left = (anchor.x - width / 2.0).round() as i64;
        let top = (anchor.y - (font::GLYPH_HEIGHT * TEXT_SCALE) as f32).round() as i64;
        let scale = TEXT_SCALE as i64;

        for (i, c) in text.chars().enumerate() {
            let origin = left + i as i64 * (font::ADVANCE * TEXT_SCALE) as i64;
            for (gx, gy) in font::glyph_pixels(c) {
                for dy in 0..scale {
                    for dx in 0..scale {
                        self.blend_pixel(
                            origin + gx as i64 * scale + dx,
                            top + gy as i64 * scale + dy,
                            color,
                        );
                    }
                }
            }
        }
    }
}

/// Add horizontal coverage of `[xa, xb)` to `row`, clipped to `x0..x1`.
fn add_span(row: &mut [f32], xa: f32, xb: f32, weight: f32, x0: usize, x1: usize) {
    let xa = xa.max(x0 as f32);
    let xb = xb.min(x1 as f32);
    if xb <= xa {
        return;
    }
    let first = xa.floor() as usize;
    let last = (xb.ceil() as usize).min(x1);
    for (x, cell) in row.iter_mut().enumerate().take(last).skip(first) {
        let overlap = xb.min(x as f32 + 1.0) - xa.max(x as f32);
        if overlap > 0.0 {
            *cell += overlap * weight;
        }
    }
}

fn circle_points(center: Vec2, radius: f32) -> Vec<Vec2> {
    let n = (radius * 0.8).clamp(12.0, 96.0) as usize;
    (0..n)
        .map(|i| center + Vec2::from_angle(i as f32 / n as f32 * std::f32::consts::TAU) * radius)
        .collect()
}

/// Split a polyline into its "on" pieces.
fn dash_polyline(points: &[Vec2], dash: Dash) -> Vec<Vec<Vec2>> {
    let period = dash.on + dash.off;
    if period <= 0.0 || dash.on <= 0.0 {
        return Vec::new();
    }
    let phase = dash.offset.rem_euclid(period);
    let mut on = phase < dash.on;
    let mut remaining = if on { dash.on - phase } else { period - phase };

    let mut pieces = Vec::new();
    let mut current = if on { vec![points[0]] } else { Vec::new() };
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance(b);
        if len <= 0.0 {
            continue;
        }
        let dir = (b - a) / len;
        let mut walked = 0.0;
        while len - walked > remaining {
            walked += remaining;
            let p = a + dir * walked;
            if on {
                current.push(p);
                pieces.push(std::mem::take(&mut current));
            } else {
                current = vec![p];
            }
            on = !on;
            remaining = if on { dash.on } else { dash.off };
        }
        remaining -= len - walked;
        if on {
            current.push(b);
        }
    }
    if on && current.len() >= 2 {
        pieces.push(current);
    }
    pieces
}

fn paint_at(paint: &Paint<'_>, p: Vec2) -> Rgba {
    match paint {
        Paint::Solid(color) => *color,
        Paint::Radial(gradient) => gradient.color_at(p),
        Paint::Pattern(pattern) => sample_pattern(pattern, p),
    }
}

fn sample_pattern(pattern: &Pattern<'_>, p: Vec2) -> Rgba {
    let guard = |s: f32| if s.abs() < 1e-6 { 1e-6_f32.copysign(s) } else { s };
    let scale = Vec2::new(guard(pattern.scale.x), guard(pattern.scale.y));
    let t = (p - pattern.origin) / scale;
    pattern.texture.sample(t.x, t.y)
}

fn premultiply(c: Rgba) -> Vec4 {
    Vec4::new(c.r * c.a, c.g * c.a, c.b * c.a, c.a)
}

/// Composite a straight-alpha source onto a premultiplied destination.
fn blend(dst: Vec4, src: Rgba, mode: Composite) -> Vec4 {
    let s = premultiply(src);
    let sa = s.w;
    let da = dst.w;
    match mode {
        Composite::SourceOver => s + dst * (1.0 - sa),
        Composite::Multiply => {
            let rgb = s.truncate() * (1.0 - da) + dst.truncate() * (1.0 - sa) + s.truncate() * dst.truncate();
            rgb.extend(sa + da - sa * da)
        }
        Composite::Lighter => (s + dst).min(Vec4::ONE),
    }
}
