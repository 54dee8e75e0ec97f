//! The pond scene: every entity plus the order they update and draw in.

use glam::Vec2;
use rand::Rng;

use crate::ambient::{Bubble, Diatom};
use crate::cell::Cell;
use crate::config::SceneConfig;
use crate::error::ConfigError;
use crate::render::{Paint, Pattern, RenderContext, Shape, Style};
use crate::target::TargetPoint;

/// Size of the drawable area. Entities are kept within `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    width: f32,
    height: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(Vec2::ZERO, self.size())
    }
}

impl From<(u32, u32)> for Surface {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// Read-only state shared with every propagate call of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimContext {
    pub surface: Surface,
    /// Where the cell is drawn toward.
    pub target: Vec2,
}

pub struct Scene {
    config: SceneConfig,
    surface: Surface,
    target: TargetPoint,
    bubbles: Vec<Bubble>,
    diatoms: Vec<Diatom>,
    cell: Cell,
    ticks: u64,
}

impl Scene {
    pub fn new(config: SceneConfig, surface: Surface, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        let ambient = &config.ambient;
        let bubbles = (0..ambient.bubble_count)
            .map(|_| Bubble::random(surface, ambient, rng))
            .collect();
        let diatoms = (0..ambient.diatom_count)
            .map(|_| Diatom::random(surface, ambient, rng))
            .collect();
        let cell = Cell::new(&config.cell, rng)?;

        Ok(Self {
            target: TargetPoint::new(&config.target),
            surface,
            bubbles,
            diatoms,
            cell,
            ticks: 0,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[inline]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    #[inline]
    pub fn target(&self) -> &TargetPoint {
        &self.target
    }

    #[inline]
    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    #[inline]
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    #[inline]
    pub fn diatoms(&self) -> &[Diatom] {
        &self.diatoms
    }

    /// Number of ticks run so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance every entity by one step.
    ///
    /// The target and the ambient entities update first, then the cell, so
    /// the cell always sees this tick's target.
    pub fn tick(&mut self, rng: &mut impl Rng) {
        self.target.tick();
        let ctx = SimContext {
            surface: self.surface,
            target: self.target.position(),
        };

        let ambient = &self.config.ambient;
        for bubble in &mut self.bubbles {
            bubble.propagate(&ctx, ambient, rng);
        }
        for diatom in &mut self.diatoms {
            diatom.propagate(&ctx, ambient, rng);
        }
        self.cell.propagate(&ctx, rng);
        self.ticks += 1;
    }

    /// Draw the current state, back to front.
    pub fn render(&self, ctx: &mut RenderContext<'_>) {
        ctx.canvas.fill(
            &Shape::Rect {
                min: Vec2::ZERO,
                max: self.surface.size(),
            },
            &Paint::Pattern(Pattern::new(&ctx.textures.background)),
            &Style::default(),
        );
        for bubble in &self.bubbles {
            bubble.render(ctx);
        }
        for diatom in &self.diatoms {
            diatom.render(ctx);
        }
        self.target.render(ctx);
        self.cell.render(ctx);
        if self.config.debug {
            self.cell.render_debug(ctx);
        }
    }

    /// Pointer press: the latest position wins.
    pub fn reposition_target(&mut self, position: Vec2) {
        self.target.reposition(position);
    }

    /// New surface bounds apply from the next tick on.
    pub fn resize(&mut self, surface: Surface) {
        self.surface = surface;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmbientConfig;
    use crate::render::{DrawCall, Recorder};
    use crate::textures::TextureSources;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> SceneConfig {
        SceneConfig::default().with_ambient(
            AmbientConfig::default()
                .with_bubble_count(3)
                .with_diatom_count(2),
        )
    }

    #[test]
    fn test_surface_clamp_and_contains() {
        let s = Surface::new(100.0, 50.0);
        assert_eq!(s.clamp(Vec2::new(-5.0, 80.0)), Vec2::new(0.0, 50.0));
        assert!(s.contains(Vec2::new(100.0, 0.0)));
        assert!(!s.contains(Vec2::new(100.1, 0.0)));
        assert_eq!(Surface::from((640, 480)).size(), Vec2::new(640.0, 480.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = small_config().with_cell(crate::config::CellConfig::default().with_detail_level(0));
        assert!(Scene::new(config, Surface::new(100.0, 100.0), &mut rng).is_err());
    }

    #[test]
    fn test_tick_advances_target_first() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut scene = Scene::new(small_config(), Surface::new(1000.0, 600.0), &mut rng).unwrap();
        scene.reposition_target(Vec2::new(10.0, 10.0));
        scene.tick(&mut rng);
        assert_eq!(scene.ticks(), 1);
        assert!(scene.target().timer() > 0.0);
        assert_eq!(scene.bubbles().len(), 3);
        assert_eq!(scene.diatoms().len(), 2);
    }

    #[test]
    fn test_render_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = small_config();
        let particles = config.cell.particle_count();
        let scene = Scene::new(config, Surface::new(1000.0, 600.0), &mut rng).unwrap();
        let textures = TextureSources::procedural().load().unwrap();
        let mut recorder = Recorder::new(1000, 600);
        scene.render(&mut RenderContext::new(&mut recorder, &textures));

        let calls = recorder.calls();
        // background + bubbles + diatoms + target (ring, dot, label) + cell layers + particles
        assert_eq!(calls.len(), 1 + 3 + 2 + 3 + 6 + particles);
        assert!(matches!(calls[0], DrawCall::Fill { .. }));
        assert!(matches!(calls[4], DrawCall::Sprite { .. }));
        assert!(matches!(&calls[8], DrawCall::Text { text, .. } if text == "Come here"));
    }

    #[test]
    fn test_debug_overlay_adds_lines() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = small_config();
        let nodes = config.cell.node_count();
        let plain = Scene::new(config.clone(), Surface::new(1000.0, 600.0), &mut rng).unwrap();
        let debug = Scene::new(config.with_debug(true), Surface::new(1000.0, 600.0), &mut rng).unwrap();
        let textures = TextureSources::procedural().load().unwrap();

        let mut a = Recorder::new(1000, 600);
        plain.render(&mut RenderContext::new(&mut a, &textures));
        let mut b = Recorder::new(1000, 600);
        debug.render(&mut RenderContext::new(&mut b, &textures));
        assert_eq!(b.calls().len() - a.calls().len(), 3 * nodes + 1);
    }
}
