//! # Cytodrift
//!
//! A single cell drifts through a pond toward a point you pick. Its
//! membrane is a closed cubic Bezier path whose boundary nodes each follow
//! a small decaying impulse, so the outline wobbles while the cell creeps
//! after its target. Bubbles and diatoms drift in the background.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cytodrift::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = SceneConfig::default()
//!         .with_cell(CellConfig::default().with_detail_level(3))
//!         .with_debug(true);
//!     cytodrift::run(config, TextureSources::procedural())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`scene`] owns the entities and steps them one tick at a time.
//! - [`render`] defines the [`Canvas`](render::Canvas) the scene draws onto,
//!   plus a software rasterizer and a call recorder for tests.
//! - [`stage`] puts a scene behind the texture gate and the frame driver.
//! - [`window`] hosts a stage in a winit window and presents each frame
//!   with wgpu.
//!
//! Everything below [`window`] is headless, so a whole run can be driven
//! from a test with a seeded RNG:
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use cytodrift::prelude::*;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut scene = Scene::new(SceneConfig::default(), Surface::new(1000.0, 600.0), &mut rng).unwrap();
//! for _ in 0..60 {
//!     scene.tick(&mut rng);
//! }
//! assert_eq!(scene.cell().nodes().len(), 8);
//! ```

pub mod ambient;
pub mod cell;
pub mod config;
pub mod easing;
pub mod error;
pub mod frame;
mod gpu;
pub mod node;
pub mod particles;
pub mod path;
pub mod render;
pub mod scene;
pub mod stage;
pub mod target;
pub mod textures;
mod window;

pub use config::{AmbientConfig, CellConfig, ImpulseConfig, SceneConfig, TargetConfig};
pub use error::{AppError, ConfigError, GpuError, TextureError};
pub use glam::Vec2;
pub use scene::{Scene, SimContext, Surface};
pub use stage::{FrameOutcome, Stage};
pub use textures::{TextureSet, TextureSources};
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use cytodrift::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ambient::{Bubble, Diatom};
    pub use crate::cell::Cell;
    pub use crate::config::{AmbientConfig, CellConfig, ImpulseConfig, SceneConfig, TargetConfig};
    pub use crate::error::{AppError, ConfigError, GpuError, TextureError};
    pub use crate::frame::{FrameDriver, FrameStep};
    pub use crate::node::BoundaryNode;
    pub use crate::path::BezierPath;
    pub use crate::render::{Canvas, Raster, Recorder, RenderContext};
    pub use crate::scene::{Scene, SimContext, Surface};
    pub use crate::stage::{FrameOutcome, Stage};
    pub use crate::target::TargetPoint;
    pub use crate::textures::{TextureGate, TextureLoader, TextureSet, TextureSources};
    pub use crate::Vec2;
}
