//! Texture loading, procedural generation and the readiness gate.
//!
//! The scene needs three textures: a background pattern, a cytoplasm
//! pattern and a diatom sprite. Each comes from a [`TextureSource`], either
//! an image file or a procedural generator. Loading runs on a background
//! thread; until every texture has arrived the [`TextureGate`] stays
//! [`Loading`](TextureGate::Loading) and nothing is drawn.
//!
//! # Supported Formats
//!
//! - PNG (recommended)
//! - JPEG

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::error::TextureError;
use crate::render::Rgba;

/// Address mode for texel coordinates outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Clamp to edge color (default).
    #[default]
    ClampToEdge,
    /// Repeat/tile the texture.
    Repeat,
}

/// RGBA8 pixel data, sampled bilinearly.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    data: Vec<u8>,
    width: u32,
    height: u32,
    address_mode: AddressMode,
}

impl Texture {
    /// Wrap raw RGBA data (4 bytes per pixel, row-major, top row first).
    pub fn from_rgba(
        name: &'static str,
        data: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { name });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                name,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            address_mode: AddressMode::ClampToEdge,
        })
    }

    /// Decode an encoded image held in memory.
    pub fn decode(name: &'static str, bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)
            .map_err(|source| TextureError::Decode { name, source })?
            .into_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(name, img.into_raw(), width, height)
    }

    /// Load a texture from an image file.
    pub fn from_file(name: &'static str, path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            name,
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(name, &bytes)
    }

    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn address_mode(&self) -> AddressMode {
        self.address_mode
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Texel at integer coordinates, resolved through the address mode.
    pub fn texel(&self, x: i64, y: i64) -> Rgba {
        let x = wrap(x, self.width as i64, self.address_mode);
        let y = wrap(y, self.height as i64, self.address_mode);
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[i..i + 4];
        Rgba::from_f32(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        )
    }

    /// Sample at texel-space coordinates (one unit per texel).
    pub fn sample(&self, x: f32, y: f32) -> Rgba {
        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), tx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }

    /// Sample at normalized coordinates, `(0, 0)` top-left, `(1, 1)` bottom-right.
    pub fn sample_uv(&self, u: f32, v: f32) -> Rgba {
        self.sample(u * self.width as f32, v * self.height as f32)
    }

    /// Create a solid color texture (1x1 pixel).
    pub fn solid(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            data: vec![r, g, b, a],
            width: 1,
            height: 1,
            address_mode: AddressMode::Repeat,
        }
    }

    /// Tileable cloudy noise mapped from `dark` to `light`.
    ///
    /// Three octaves of value noise on lattices that divide `size`, so the
    /// result repeats seamlessly.
    pub fn cloudy(size: u32, seed: u32, dark: [u8; 4], light: [u8; 4]) -> Self {
        let size = size.max(8);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let octaves = [(4u32, 0.55f32), (8, 0.3), (size / 4, 0.15)];
        for y in 0..size {
            for x in 0..size {
                let v: f32 = octaves
                    .iter()
                    .enumerate()
                    .map(|(i, &(cells, weight))| {
                        weight * value_noise(x, y, size, cells.max(1), seed.wrapping_add(i as u32))
                    })
                    .sum();
                for c in 0..4 {
                    data.push(lerp_u8(dark[c], light[c], v));
                }
            }
        }
        Self {
            data,
            width: size,
            height: size,
            address_mode: AddressMode::Repeat,
        }
    }

    /// A centric diatom: a ribbed golden disc on a transparent square.
    pub fn diatom(size: u32) -> Self {
        let size = size.max(8);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let center = size as f32 / 2.0;
        let radius = size as f32 * 0.46;
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                let r = (dx * dx + dy * dy).sqrt() / radius;
                let angle = dy.atan2(dx);

                let rim = (1.0 - r).clamp(0.0, 0.08) / 0.08;
                let ribs = 0.5 + 0.5 * (angle * 36.0).cos();
                let rings = 0.5 + 0.5 * (r * 18.0).cos();
                let shade = 0.45 + 0.35 * ribs * r + 0.2 * rings * (1.0 - r);

                data.push(lerp_u8(90, 220, shade));
                data.push(lerp_u8(70, 190, shade));
                data.push(lerp_u8(20, 90, shade));
                data.push((rim * 255.0).round() as u8);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            address_mode: AddressMode::ClampToEdge,
        }
    }
}

fn wrap(i: i64, n: i64, mode: AddressMode) -> i64 {
    match mode {
        AddressMode::ClampToEdge => i.clamp(0, n - 1),
        AddressMode::Repeat => i.rem_euclid(n),
    }
}

/// Helper function for linear interpolation of u8 values.
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t.clamp(0.0, 1.0)).round() as u8
}

/// Simple hash-based noise function.
fn hash_noise(x: u32, y: u32, seed: u32) -> u8 {
    let mut n = x
        .wrapping_mul(374761393)
        .wrapping_add(y.wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1013904223));
    n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    n = n ^ (n >> 16);
    (n & 255) as u8
}

/// Smoothly interpolated lattice noise in `0..=1`, tiling every `size` pixels.
fn value_noise(x: u32, y: u32, size: u32, cells: u32, seed: u32) -> f32 {
    let cell = size as f32 / cells as f32;
    let fx = x as f32 / cell;
    let fy = y as f32 / cell;
    let (ix, iy) = (fx.floor() as u32, fy.floor() as u32);
    let (tx, ty) = (smooth(fx.fract()), smooth(fy.fract()));
    let at = |cx: u32, cy: u32| hash_noise(cx % cells, cy % cells, seed) as f32 / 255.0;

    let top = at(ix, iy) + (at(ix + 1, iy) - at(ix, iy)) * tx;
    let bottom = at(ix, iy + 1) + (at(ix + 1, iy + 1) - at(ix, iy + 1)) * tx;
    top + (bottom - top) * ty
}

#[inline]
fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// The three textures the scene draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Background,
    Cytoplasm,
    Diatom,
}

impl TextureSlot {
    pub fn name(self) -> &'static str {
        match self {
            TextureSlot::Background => "background",
            TextureSlot::Cytoplasm => "cytoplasm",
            TextureSlot::Diatom => "diatom",
        }
    }

    /// File name looked up inside an asset directory.
    pub fn file_name(self) -> &'static str {
        match self {
            TextureSlot::Background => "background.png",
            TextureSlot::Cytoplasm => "cytoplasm.png",
            TextureSlot::Diatom => "diatom.png",
        }
    }

    /// Address mode the scene samples this slot with.
    pub fn address_mode(self) -> AddressMode {
        match self {
            TextureSlot::Background | TextureSlot::Cytoplasm => AddressMode::Repeat,
            TextureSlot::Diatom => AddressMode::ClampToEdge,
        }
    }
}

/// Where a texture comes from.
#[derive(Debug, Clone)]
pub enum TextureSource {
    File(PathBuf),
    Generated(Texture),
}

impl TextureSource {
    pub fn load(self, slot: TextureSlot) -> Result<Texture, TextureError> {
        let texture = match self {
            TextureSource::File(path) => Texture::from_file(slot.name(), path)?,
            TextureSource::Generated(texture) => texture,
        };
        Ok(texture.with_address_mode(slot.address_mode()))
    }
}

impl From<&str> for TextureSource {
    fn from(path: &str) -> Self {
        TextureSource::File(PathBuf::from(path))
    }
}

impl From<PathBuf> for TextureSource {
    fn from(path: PathBuf) -> Self {
        TextureSource::File(path)
    }
}

impl From<Texture> for TextureSource {
    fn from(texture: Texture) -> Self {
        TextureSource::Generated(texture)
    }
}

/// A source for every slot.
#[derive(Debug, Clone)]
pub struct TextureSources {
    pub background: TextureSource,
    pub cytoplasm: TextureSource,
    pub diatom: TextureSource,
}

impl TextureSources {
    /// Generated stand-ins, so the scene runs without asset files.
    pub fn procedural() -> Self {
        Self {
            background: Texture::cloudy(256, 7, [6, 34, 40, 255], [34, 84, 80, 255]).into(),
            cytoplasm: Texture::cloudy(128, 19, [150, 170, 120, 255], [240, 250, 220, 255]).into(),
            diatom: Texture::diatom(128).into(),
        }
    }

    /// `background.png`, `cytoplasm.png` and `diatom.png` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let file = |slot: TextureSlot| TextureSource::File(dir.join(slot.file_name()));
        Self {
            background: file(TextureSlot::Background),
            cytoplasm: file(TextureSlot::Cytoplasm),
            diatom: file(TextureSlot::Diatom),
        }
    }

    /// Load every slot; the first failure rejects the whole set.
    pub fn load(self) -> Result<TextureSet, TextureError> {
        Ok(TextureSet {
            background: self.background.load(TextureSlot::Background)?,
            cytoplasm: self.cytoplasm.load(TextureSlot::Cytoplasm)?,
            diatom: self.diatom.load(TextureSlot::Diatom)?,
        })
    }
}

/// All textures, loaded and ready to sample.
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub background: Texture,
    pub cytoplasm: Texture,
    pub diatom: Texture,
}

/// Readiness of the texture set. `Failed` is terminal.
#[derive(Debug, Default)]
pub enum TextureGate {
    #[default]
    Loading,
    Ready(TextureSet),
    Failed(TextureError),
}

impl TextureGate {
    /// Resolve a loading gate. Once resolved, later offers are ignored.
    ///
    /// Returns `true` when the offer changed the gate.
    pub fn resolve(&mut self, result: Result<TextureSet, TextureError>) -> bool {
        if !matches!(self, TextureGate::Loading) {
            return false;
        }
        *self = match result {
            Ok(textures) => TextureGate::Ready(textures),
            Err(e) => TextureGate::Failed(e),
        };
        true
    }

    pub fn textures(&self) -> Option<&TextureSet> {
        match self {
            TextureGate::Ready(textures) => Some(textures),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TextureError> {
        match self {
            TextureGate::Failed(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, TextureGate::Ready(_))
    }
}

/// Loads a [`TextureSources`] on a background thread.
pub struct TextureLoader {
    receiver: Option<Receiver<Result<TextureSet, TextureError>>>,
}

impl TextureLoader {
    pub fn spawn(sources: TextureSources) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            // The receiver may be gone if the window closed first.
            let _ = sender.send(sources.load());
        });
        Self {
            receiver: Some(receiver),
        }
    }

    /// The load result, once, when it is available.
    pub fn poll(&mut self) -> Option<Result<TextureSet, TextureError>> {
        let receiver = self.receiver.as_ref()?;
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(TextureError::LoaderDisconnected),
        };
        self.receiver = None;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_from_rgba_rejects_wrong_size() {
        let err = Texture::from_rgba("test", vec![0; 12], 2, 2).unwrap_err();
        assert!(matches!(err, TextureError::SizeMismatch { expected: 16, actual: 12, .. }));
        assert!(matches!(
            Texture::from_rgba("test", vec![], 0, 4),
            Err(TextureError::Empty { .. })
        ));
    }

    #[test]
    fn test_repeat_addressing_wraps() {
        let data = vec![255, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255, 255];
        let tex = Texture::from_rgba("test", data, 2, 2)
            .unwrap()
            .with_address_mode(AddressMode::Repeat);
        assert_eq!(tex.texel(0, 0), tex.texel(2, 2));
        assert_eq!(tex.texel(-1, 0), tex.texel(1, 0));
        assert_eq!(tex.texel(0, 0).r, 1.0);
        assert_eq!(tex.texel(1, 0).r, 0.0);
    }

    #[test]
    fn test_clamp_addressing() {
        let data = vec![0, 0, 0, 255, 255, 255, 255, 255];
        let tex = Texture::from_rgba("test", data, 2, 1).unwrap();
        assert_eq!(tex.texel(5, 0).r, 1.0);
        assert_eq!(tex.texel(-3, 0).r, 0.0);
        // Past the edge the bilinear blend only sees the edge texel.
        assert_eq!(tex.sample(-4.0, 0.5).r, 0.0);
        assert_eq!(tex.sample(9.0, 0.5).r, 1.0);
    }

    #[test]
    fn test_linear_sampling_blends() {
        let data = vec![0, 0, 0, 255, 255, 255, 255, 255];
        let tex = Texture::from_rgba("test", data, 2, 1).unwrap();
        let mid = tex.sample(1.0, 0.5);
        assert!((mid.r - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_cloudy_tiles_seamlessly() {
        let tex = Texture::cloudy(64, 3, [0, 0, 0, 255], [255, 255, 255, 255]);
        for i in 0..64 {
            let left = tex.texel(0, i).r;
            let right = tex.texel(63, i).r;
            assert!((left - right).abs() < 0.2, "seam at row {}", i);
        }
    }

    #[test]
    fn test_diatom_is_transparent_in_corners() {
        let tex = Texture::diatom(64);
        assert_eq!(tex.texel(0, 0).a, 0.0);
        assert!(tex.texel(32, 32).a > 0.9);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Texture::decode("cytoplasm", b"definitely not a png").unwrap_err();
        assert!(matches!(err, TextureError::Decode { name: "cytoplasm", .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Texture::from_file("diatom", "/nonexistent/cytodrift/diatom.png").unwrap_err();
        assert!(matches!(err, TextureError::Io { name: "diatom", .. }));
    }

    #[test]
    fn test_decode_png_round_trip() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgba([10, 20, 30, 40]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let tex = Texture::decode("background", &bytes).unwrap();
        assert_eq!((tex.width(), tex.height()), (3, 2));
        assert_eq!(&tex.data()[16..20], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_sources_apply_slot_address_modes() {
        let set = TextureSources::procedural().load().unwrap();
        assert_eq!(set.background.address_mode(), AddressMode::Repeat);
        assert_eq!(set.diatom.address_mode(), AddressMode::ClampToEdge);
    }

    #[test]
    fn test_gate_failure_is_terminal() {
        let mut gate = TextureGate::default();
        assert!(!gate.is_ready());
        assert!(gate.resolve(Err(TextureError::LoaderDisconnected)));
        assert!(gate.error().is_some());

        let late = TextureSources::procedural().load();
        assert!(!gate.resolve(late));
        assert!(gate.textures().is_none());
    }

    #[test]
    fn test_loader_delivers_once() {
        let mut loader = TextureLoader::spawn(TextureSources::procedural());
        let deadline = Instant::now() + Duration::from_secs(10);
        let result = loop {
            if let Some(result) = loader.poll() {
                break result;
            }
            assert!(Instant::now() < deadline, "loader never delivered");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(result.is_ok());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_loader_reports_missing_files() {
        let mut loader = TextureLoader::spawn(TextureSources::from_dir("/nonexistent/cytodrift"));
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = loader.poll() {
                assert!(matches!(result, Err(TextureError::Io { name: "background", .. })));
                break;
            }
            assert!(Instant::now() < deadline, "loader never delivered");
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}
