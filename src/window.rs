//! The windowed host: winit event loop, pointer input and presentation.
//!
//! Each redraw polls the texture loader, runs one stage frame into the CPU
//! raster and presents the latest frame through the GPU.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::SceneConfig;
use crate::error::AppError;
use crate::gpu::GpuState;
use crate::render::Raster;
use crate::scene::Surface;
use crate::stage::{FrameOutcome, Stage};
use crate::textures::{TextureLoader, TextureSources};

const TITLE: &str = "Cytodrift";
const TITLE_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    stage: Stage<SmallRng>,
    loader: TextureLoader,
    raster: Raster,
    cursor: Vec2,
    clock: Instant,
    last_title_update: Instant,
    /// The loading or error screen is already in the raster.
    status_drawn: bool,
    error: Option<AppError>,
}

impl App {
    fn new(config: SceneConfig, stage: Stage<SmallRng>, loader: TextureLoader) -> Self {
        let (width, height) = config.window_size;
        let now = Instant::now();
        Self {
            config,
            window: None,
            gpu_state: None,
            stage,
            loader,
            raster: Raster::new(width, height),
            cursor: Vec2::ZERO,
            clock: now,
            last_title_update: now,
            status_drawn: false,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn poll_textures(&mut self) {
        let Some(result) = self.loader.poll() else {
            return;
        };
        if self.stage.offer_textures(result) {
            self.status_drawn = false;
            if let (Some(window), Some(e)) = (&self.window, self.stage.gate().error()) {
                window.set_title(&format!("{} - texture error: {}", TITLE, e));
            }
        }
    }

    fn update_title(&mut self) {
        if !self.stage.gate().is_ready() || self.last_title_update.elapsed() < TITLE_UPDATE_INTERVAL {
            return;
        }
        self.last_title_update = Instant::now();
        let driver = self.stage.driver();
        let fps = driver.fps();
        log::debug!("{:.1} fps, {} ticks in {:.1?}", fps, driver.ticks(), driver.elapsed());
        if let Some(window) = &self.window {
            window.set_title(&format!("{} - {:.0} fps", TITLE, fps));
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_textures();

        let outcome = self.stage.frame(self.clock.elapsed(), &mut self.raster);
        let fresh = match outcome {
            FrameOutcome::Ticked { rendered } => rendered,
            FrameOutcome::Loading | FrameOutcome::Failed => {
                let fresh = !self.status_drawn;
                if fresh {
                    self.stage.draw_status(&mut self.raster);
                    self.status_drawn = true;
                }
                fresh
            }
        };
        self.update_title();

        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };
        if fresh {
            gpu_state.upload(self.raster.frame());
        }
        match gpu_state.render() {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => gpu_state.resize(winit::dpi::PhysicalSize {
                width: gpu_state.config.width,
                height: gpu_state.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let (width, height) = self.config.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        let size = window.inner_size();
        log::info!("Window created at {}x{}", size.width, size.height);

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu_state) => self.gpu_state = Some(gpu_state),
            Err(e) => return self.fail(event_loop, e.into()),
        }
        self.raster.resize(size.width, size.height);
        self.stage.resize(Surface::from((size.width, size.height)));
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                log::debug!("Resized to {}x{}", physical_size.width, physical_size.height);
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                if physical_size.width > 0 && physical_size.height > 0 {
                    self.raster.resize(physical_size.width, physical_size.height);
                    self.stage
                        .resize(Surface::from((physical_size.width, physical_size.height)));
                    self.status_drawn = false;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.stage.press(self.cursor);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open a window and run the scene until it is closed.
///
/// Textures load on a background thread; the scene starts once all of them
/// have arrived.
pub fn run(config: SceneConfig, sources: TextureSources) -> Result<(), AppError> {
    let stage = Stage::new(
        config.clone(),
        Surface::from(config.window_size),
        SmallRng::from_entropy(),
    )?;
    let loader = TextureLoader::spawn(sources);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, stage, loader);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
