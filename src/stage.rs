//! Headless runtime: a scene behind the texture gate, driven frame by frame.
//!
//! The window layer owns a [`Stage`] and calls [`Stage::frame`] once per
//! host frame. Until the textures are ready the stage neither ticks nor
//! draws; the host can show [`Stage::draw_status`] instead.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;

use crate::config::SceneConfig;
use crate::error::{ConfigError, TextureError};
use crate::frame::FrameDriver;
use crate::render::{font, Canvas, Paint, RenderContext, Rgba, Shape, Style};
use crate::scene::{Scene, Surface};
use crate::textures::{TextureGate, TextureSet};

/// Result of one host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Textures are still loading. Nothing ran.
    Loading,
    /// Texture loading failed. Nothing ran, and nothing ever will.
    Failed,
    /// One tick ran, and a render pass if one was due.
    Ticked { rendered: bool },
}

pub struct Stage<R> {
    scene: Scene,
    gate: TextureGate,
    driver: FrameDriver,
    rng: R,
}

impl<R: Rng> Stage<R> {
    pub fn new(config: SceneConfig, surface: Surface, mut rng: R) -> Result<Self, ConfigError> {
        let driver = FrameDriver::new(config.render_interval);
        let scene = Scene::new(config, surface, &mut rng)?;
        Ok(Self {
            scene,
            gate: TextureGate::Loading,
            driver,
            rng,
        })
    }

    /// Hand over the texture load result. Only the first offer counts.
    pub fn offer_textures(&mut self, result: Result<TextureSet, TextureError>) -> bool {
        let changed = self.gate.resolve(result);
        if changed {
            match &self.gate {
                TextureGate::Ready(_) => log::info!("Textures ready, starting animation"),
                TextureGate::Failed(e) => log::error!("Texture loading failed: {}", e),
                TextureGate::Loading => {}
            }
        }
        changed
    }

    #[inline]
    pub fn gate(&self) -> &TextureGate {
        &self.gate
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    /// Pointer pressed at surface coordinates.
    pub fn press(&mut self, position: Vec2) {
        self.scene.reposition_target(position);
    }

    pub fn resize(&mut self, surface: Surface) {
        self.scene.resize(surface);
    }

    /// Run one host frame at `timestamp`, drawing into `canvas` if a render is due.
    pub fn frame(&mut self, timestamp: Duration, canvas: &mut dyn Canvas) -> FrameOutcome {
        let textures = match &self.gate {
            TextureGate::Loading => return FrameOutcome::Loading,
            TextureGate::Failed(_) => return FrameOutcome::Failed,
            TextureGate::Ready(textures) => textures,
        };

        let step = self.driver.step(timestamp);
        self.scene.tick(&mut self.rng);
        if step.render {
            self.scene.render(&mut RenderContext::new(canvas, textures));
        }
        FrameOutcome::Ticked { rendered: step.render }
    }

    /// Loading or error screen. Draws nothing once the textures are ready.
    pub fn draw_status(&self, canvas: &mut dyn Canvas) {
        let (width, height) = canvas.size();
        let size = Vec2::new(width as f32, height as f32);
        let middle = size / 2.0;
        let message = match &self.gate {
            TextureGate::Ready(_) => return,
            TextureGate::Loading => None,
            TextureGate::Failed(e) => Some(e.to_string()),
        };

        canvas.fill(
            &Shape::Rect { min: Vec2::ZERO, max: size },
            &Paint::Solid(Rgba::new(6, 30, 34, 1.0)),
            &Style::default(),
        );
        let Some(message) = message else {
            canvas.fill_text("Loading...", middle, Rgba::new(200, 230, 220, 1.0));
            return;
        };

        canvas.fill(
            &Shape::Circle { center: middle - Vec2::new(0.0, 40.0), radius: 18.0 },
            &Paint::Solid(Rgba::new(200, 40, 30, 0.9)),
            &Style::default(),
        );
        canvas.fill_text("!", middle - Vec2::new(0.0, 33.0), Rgba::WHITE);
        canvas.fill_text("Could not load textures", middle, Rgba::new(240, 200, 190, 1.0));

        let per_line = (width / (font::ADVANCE * crate::render::TEXT_SCALE)).max(1) as usize;
        let chars: Vec<char> = message.chars().collect();
        for (i, line) in chars.chunks(per_line.saturating_sub(2).max(1)).take(4).enumerate() {
            let line: String = line.iter().collect();
            let baseline = middle + Vec2::new(0.0, 30.0 + i as f32 * 20.0);
            canvas.fill_text(&line, baseline, Rgba::new(200, 200, 200, 1.0));
        }
    }
}
