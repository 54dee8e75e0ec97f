//! Error types for cytodrift.
//!
//! The simulation core itself cannot fail. Errors come from the edges:
//! configuration, texture loading, GPU setup and the window system.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur during texture loading.
#[derive(Debug)]
pub enum TextureError {
    /// Failed to read the file from disk.
    Io {
        name: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    /// The bytes could not be decoded as an image.
    Decode {
        name: &'static str,
        source: image::ImageError,
    },
    /// Pixel data does not match the declared dimensions.
    SizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Zero width or height.
    Empty { name: &'static str },
    /// The loader thread went away without delivering a result.
    LoaderDisconnected,
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Io { name, path, source } => {
                write!(f, "Failed to read {} texture '{}': {}", name, path.display(), source)
            }
            TextureError::Decode { name, source } => {
                write!(f, "Failed to decode {} texture: {}", name, source)
            }
            TextureError::SizeMismatch { name, expected, actual } => write!(
                f,
                "RGBA data size mismatch for {} texture: expected {} bytes, got {}",
                name, expected, actual
            ),
            TextureError::Empty { name } => write!(f, "The {} texture has no pixels", name),
            TextureError::LoaderDisconnected => {
                write!(f, "Texture loader stopped before delivering textures")
            }
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Io { source, .. } => Some(source),
            TextureError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Invalid scene configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The boundary needs at least one group of four nodes.
    ZeroDetailLevel,
    NotPositive { field: &'static str, value: f32 },
    OutOfRange { field: &'static str, value: f32 },
    EmptyRange { field: &'static str, min: f32, max: f32 },
    /// Sprites are drawn `size` pixels wide and spin by `1 / size`.
    ZeroSizedSprite { field: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDetailLevel => write!(f, "Cell detail level must be at least 1"),
            ConfigError::NotPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            ConfigError::OutOfRange { field, value } => {
                write!(f, "{} is out of range: {}", field, value)
            }
            ConfigError::EmptyRange { field, min, max } => {
                write!(f, "{} size range is empty: {}..{}", field, min, max)
            }
            ConfigError::ZeroSizedSprite { field, value } => {
                write!(f, "{} gives a zero-sized sprite: {}", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    NoSurfaceFormat,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "The window surface supports no texture format"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The scene configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Config(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}
