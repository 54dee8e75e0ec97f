//! Ambient drifters: bubbles and diatoms.
//!
//! Both integrate velocity into position, pick up a small random
//! acceleration every tick and bounce off the surface edges. Neither
//! interacts with the cell or with each other.

use glam::{BVec2, Vec2};
use rand::Rng;

use crate::config::AmbientConfig;
use crate::easing::ease_in_out;
use crate::render::{Composite, Paint, RadialGradient, RenderContext, Rgba, Shape, Sprite, Style};
use crate::scene::{SimContext, Surface};

/// Alpha of a diatom sprite.
pub const DIATOM_ALPHA: f32 = 0.2;

/// Keep `position` inside `surface`. Every clamped axis gets its velocity
/// pointed back inward, so it heads away from the wall it crossed even when
/// this tick's jitter already flipped it. Returns the clamped axes.
pub fn reflect(position: &mut Vec2, velocity: &mut Vec2, surface: Surface) -> BVec2 {
    let max = surface.size();
    let mut hit = BVec2::FALSE;
    if position.x > max.x {
        position.x = max.x;
        velocity.x = -velocity.x.abs();
        hit.x = true;
    }
    if position.y > max.y {
        position.y = max.y;
        velocity.y = -velocity.y.abs();
        hit.y = true;
    }
    if position.x < 0.0 {
        position.x = 0.0;
        velocity.x = velocity.x.abs();
        hit.x = true;
    }
    if position.y < 0.0 {
        position.y = 0.0;
        velocity.y = velocity.y.abs();
        hit.y = true;
    }
    hit
}

/// Per-axis uniform value in `[-amount, amount)`.
fn jitter(amount: f32, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(rng.gen::<f32>() * 2.0 - 1.0, rng.gen::<f32>() * 2.0 - 1.0) * amount
}

fn random_position(surface: Surface, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()) * surface.size()
}

fn random_size(min: f32, max: f32, rng: &mut impl Rng) -> f32 {
    min + rng.gen::<f32>() * (max - min)
}

/// A faint glinting bubble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bubble {
    position: Vec2,
    velocity: Vec2,
    size: f32,
    timer: f32,
}

impl Bubble {
    pub fn new(position: Vec2, size: f32, timer: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            timer,
        }
    }

    pub fn random(surface: Surface, config: &AmbientConfig, rng: &mut impl Rng) -> Self {
        let position = random_position(surface, rng);
        let size = random_size(config.bubble_min_size, config.bubble_max_size, rng);
        Self::new(position, size, rng.gen())
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn propagate(&mut self, ctx: &SimContext, config: &AmbientConfig, rng: &mut impl Rng) -> BVec2 {
        self.timer += config.bubble_pulse_step * rng.gen::<f32>();
        self.position += self.velocity;
        self.velocity += jitter(config.bubble_jitter, rng);
        reflect(&mut self.position, &mut self.velocity, ctx.surface)
    }

    /// Slowly pulsing opacity in `0..=0.3`.
    pub fn opacity(&self) -> f32 {
        (ease_in_out((self.timer.rem_euclid(1.0) - 0.5).abs()) - 0.2).max(0.0)
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) {
        let glint = RadialGradient {
            center: self.position,
            inner_radius: self.size,
            outer_radius: self.size / 1.3,
            inner: Rgba::WHITE,
            outer: Rgba::TRANSPARENT,
        };
        ctx.canvas.fill(
            &Shape::Circle { center: self.position, radius: self.size },
            &Paint::Radial(glint),
            &Style::default()
                .with_alpha(self.opacity())
                .with_composite(Composite::Lighter),
        );
    }
}

/// A slowly spinning diatom sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diatom {
    position: Vec2,
    velocity: Vec2,
    size: f32,
    rotation: f32,
}

impl Diatom {
    pub fn new(position: Vec2, size: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            rotation: 0.0,
        }
    }

    pub fn random(surface: Surface, config: &AmbientConfig, rng: &mut impl Rng) -> Self {
        let position = random_position(surface, rng);
        Self::new(position, random_size(config.diatom_min_size, config.diatom_max_size, rng))
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn propagate(&mut self, ctx: &SimContext, config: &AmbientConfig, rng: &mut impl Rng) -> BVec2 {
        self.rotation += config.diatom_spin / self.size;
        self.position += self.velocity;
        self.velocity += jitter(config.diatom_jitter, rng);

        if self.velocity.x.abs() > config.diatom_speed_limit {
            self.velocity.x /= config.diatom_damping;
        }
        if self.velocity.y.abs() > config.diatom_speed_limit {
            self.velocity.y /= config.diatom_damping;
        }
        reflect(&mut self.position, &mut self.velocity, ctx.surface)
    }

    /// The sprite is anchored at its top-left corner and spins about its middle.
    pub fn render(&self, ctx: &mut RenderContext<'_>) {
        ctx.canvas.draw_sprite(&Sprite {
            texture: &ctx.textures.diatom,
            center: self.position + Vec2::splat(self.size / 2.0),
            size: self.size,
            rotation: self.rotation,
            alpha: DIATOM_ALPHA,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::collections::VecDeque;

    /// Replays fixed `gen::<f32>()` draws, then `0.5` (zero jitter).
    struct Draws(VecDeque<f32>);

    impl Draws {
        fn new(values: &[f32]) -> Self {
            Self(values.iter().copied().collect())
        }
    }

    impl RngCore for Draws {
        fn next_u32(&mut self) -> u32 {
            // rand maps the top 24 bits of a u32 onto [0, 1).
            let u = self.0.pop_front().unwrap_or(0.5);
            ((u * (1u32 << 24) as f32) as u32) << 8
        }

        fn next_u64(&mut self) -> u64 {
            self.next_u32() as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(4) {
                let bytes = self.next_u32().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn ctx(width: f32, height: f32) -> SimContext {
        SimContext {
            surface: Surface::new(width, height),
            target: Vec2::ZERO,
        }
    }

    #[test]
    fn test_reflect_clamps_and_inverts() {
        let surface = Surface::new(100.0, 50.0);
        let mut pos = Vec2::new(120.0, -3.0);
        let mut vel = Vec2::new(2.0, -1.0);
        let hit = reflect(&mut pos, &mut vel, surface);
        assert_eq!(hit, BVec2::TRUE);
        assert_eq!(pos, Vec2::new(100.0, 0.0));
        assert_eq!(vel, Vec2::new(-2.0, 1.0));

        let mut inside = Vec2::new(10.0, 10.0);
        let mut v = Vec2::ONE;
        assert_eq!(reflect(&mut inside, &mut v, surface), BVec2::FALSE);
        assert_eq!(v, Vec2::ONE);
    }

    #[test]
    fn test_bubbles_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(21);
        let config = AmbientConfig::default();
        let ctx = ctx(80.0, 40.0);
        let mut bubbles: Vec<_> = (0..50)
            .map(|_| Bubble::random(ctx.surface, &config, &mut rng))
            .collect();
        for _ in 0..2000 {
            for b in &mut bubbles {
                let before = b.velocity();
                let hit = b.propagate(&ctx, &config, &mut rng);
                assert!(ctx.surface.contains(b.position()));
                if hit.x {
                    assert!(b.velocity().x * before.x <= 0.0);
                }
                if hit.y {
                    assert!(b.velocity().y * before.y <= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_bubble_wall_hit_survives_opposing_jitter() {
        let config = AmbientConfig::default();
        let ctx = ctx(100.0, 100.0);

        // Draws per tick: pulse timer, jitter x, jitter y.
        // Tick 1 pushes x outward by +j/2, tick 2 jitters x by -j while the
        // bubble crosses the right edge.
        let mut rng = Draws::new(&[0.0, 0.75, 0.5, 0.0, 0.0, 0.5]);
        let mut b = Bubble::new(Vec2::new(99.999, 50.0), 5.0, 0.0);
        assert!(!b.propagate(&ctx, &config, &mut rng).any());
        let before = b.velocity();
        assert!(before.x > 0.0);
        let hit = b.propagate(&ctx, &config, &mut rng);
        assert!(hit.x && !hit.y);
        assert_eq!(b.position().x, 100.0);
        assert!(b.velocity().x < 0.0, "velocity = {:?}", b.velocity());

        // Same on the top edge, with the jitter overshooting back inward.
        let mut rng = Draws::new(&[0.0, 0.5, 0.25, 0.0, 0.5, 0.875]);
        let mut b = Bubble::new(Vec2::new(50.0, 0.001), 5.0, 0.0);
        assert!(!b.propagate(&ctx, &config, &mut rng).any());
        assert!(b.velocity().y < 0.0);
        let hit = b.propagate(&ctx, &config, &mut rng);
        assert!(hit.y && !hit.x);
        assert_eq!(b.position().y, 0.0);
        assert!(b.velocity().y > 0.0, "velocity = {:?}", b.velocity());
    }

    #[test]
    fn test_diatom_wall_hit_survives_opposing_jitter() {
        let config = AmbientConfig::default();
        let ctx = ctx(100.0, 100.0);

        // Draws per tick: jitter x, jitter y.
        let mut rng = Draws::new(&[0.75, 0.5, 0.0, 0.5]);
        let mut d = Diatom::new(Vec2::new(99.999, 50.0), 20.0);
        assert!(!d.propagate(&ctx, &config, &mut rng).any());
        assert!(d.velocity().x > 0.0);
        let hit = d.propagate(&ctx, &config, &mut rng);
        assert!(hit.x && !hit.y);
        assert_eq!(d.position().x, 100.0);
        assert!(d.velocity().x < 0.0, "velocity = {:?}", d.velocity());

        let mut rng = Draws::new(&[0.5, 0.25, 0.5, 0.875]);
        let mut d = Diatom::new(Vec2::new(50.0, 0.001), 20.0);
        assert!(!d.propagate(&ctx, &config, &mut rng).any());
        assert!(d.velocity().y < 0.0);
        let hit = d.propagate(&ctx, &config, &mut rng);
        assert!(hit.y && !hit.x);
        assert_eq!(d.position().y, 0.0);
        assert!(d.velocity().y > 0.0, "velocity = {:?}", d.velocity());
    }

    #[test]
    fn test_bubble_opacity_range() {
        for i in 0..=100 {
            let b = Bubble::new(Vec2::ZERO, 5.0, i as f32 / 37.0);
            assert!((0.0..=0.3 + 1e-6).contains(&b.opacity()));
        }
        assert_eq!(Bubble::new(Vec2::ZERO, 5.0, 0.5).opacity(), 0.0);
    }

    #[test]
    fn test_diatom_damping_limits_speed() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = AmbientConfig::default();
        let ctx = ctx(1000.0, 1000.0);
        let mut d = Diatom::new(Vec2::splat(500.0), 20.0);
        for _ in 0..500 {
            d.propagate(&ctx, &config, &mut rng);
            // A component above the limit is divided by the damping factor.
            let max = (config.diatom_speed_limit + config.diatom_jitter) / config.diatom_damping;
            assert!(d.velocity().x.abs() <= max.max(config.diatom_speed_limit) + 1e-6);
        }
        assert!((d.rotation() - 500.0 * 0.3 / 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_diatoms_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        let config = AmbientConfig::default();
        let ctx = ctx(30.0, 30.0);
        let mut d = Diatom::random(ctx.surface, &config, &mut rng);
        assert!((10.0..50.0).contains(&d.size()));
        for _ in 0..5000 {
            let before = d.velocity();
            let hit = d.propagate(&ctx, &config, &mut rng);
            assert!(ctx.surface.contains(d.position()));
            if hit.x {
                assert!(d.velocity().x * before.x <= 0.0);
            }
            if hit.y {
                assert!(d.velocity().y * before.y <= 0.0);
            }
        }
    }
}
