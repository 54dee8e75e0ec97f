//! Decorative cytoplasm particles inside the cell.
//!
//! Every particle is randomized once and never mutated. The rendered
//! position is derived each frame from the cell's live center and centroid
//! offset, so particles lag and lead the outline by different amounts.

use glam::Vec2;
use rand::Rng;

use crate::render::Rgba;

/// Particles are never smaller than this, which keeps the leeway term finite.
pub const MIN_PARTICLE_SIZE: f32 = 0.1;

/// Alpha multiplier of particles close to the maximum size.
pub const LARGE_PARTICLE_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillParticle {
    offset: Vec2,
    size: f32,
    speed: f32,
    speed_x: f32,
    speed_y: f32,
    color: Rgba,
}

impl FillParticle {
    /// A particle offset uniformly within a square of side `spread`
    /// centered on the cell.
    pub fn random(spread: f32, max_size: f32, rng: &mut impl Rng) -> Self {
        let half = spread / 2.0;
        Self {
            offset: Vec2::new(
                rng.gen::<f32>() * spread - half,
                rng.gen::<f32>() * spread - half,
            ),
            size: (rng.gen::<f32>() * max_size).max(MIN_PARTICLE_SIZE),
            speed: rng.gen(),
            speed_x: rng.gen(),
            speed_y: rng.gen(),
            color: Rgba::new((rng.gen::<f32>() * 100.0).round() as u8, 100, 100, 0.3),
        }
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Small particles drift further with the centroid than large ones.
    #[inline]
    pub fn leeway(&self, max_size: f32) -> f32 {
        max_size / self.size * 2.0
    }

    /// Absolute draw position for a cell at `center` with `centroid` offset.
    pub fn position(&self, center: Vec2, centroid: Vec2, max_size: f32) -> Vec2 {
        let leeway = self.leeway(max_size);
        let axis_speed = Vec2::new(self.speed_x, self.speed_y);
        center + (centroid + self.offset) * self.speed + centroid * leeway * axis_speed
    }

    /// Alpha multiplier applied on top of the particle colour.
    pub fn alpha(&self, max_size: f32) -> f32 {
        if self.size + 1.0 >= max_size {
            LARGE_PARTICLE_ALPHA
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_particles_stay_in_spread() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let p = FillParticle::random(110.0, 3.0, &mut rng);
            assert!(p.offset().x.abs() <= 55.0 && p.offset().y.abs() <= 55.0);
            assert!(p.size() >= MIN_PARTICLE_SIZE && p.size() < 3.0);
        }
    }

    #[test]
    fn test_zero_draw_gets_minimum_size() {
        let mut rng = StepRng::new(0, 0);
        let p = FillParticle::random(110.0, 3.0, &mut rng);
        assert_eq!(p.size(), MIN_PARTICLE_SIZE);
        assert!(p.leeway(3.0).is_finite());
    }

    #[test]
    fn test_position_without_centroid_is_scaled_offset() {
        let mut rng = StdRng::seed_from_u64(8);
        let p = FillParticle::random(110.0, 3.0, &mut rng);
        let center = Vec2::new(300.0, 200.0);
        let pos = p.position(center, Vec2::ZERO, 3.0);
        assert!((pos - (center + p.offset() * p.speed)).length() < 1e-4);
    }

    #[test]
    fn test_position_follows_centroid() {
        let mut rng = StdRng::seed_from_u64(12);
        let p = FillParticle::random(110.0, 3.0, &mut rng);
        let center = Vec2::new(300.0, 200.0);
        let still = p.position(center, Vec2::ZERO, 3.0);
        let moved = p.position(center, Vec2::new(5.0, 0.0), 3.0);
        assert!(moved.x >= still.x);
        assert!((moved.y - still.y).abs() < 1e-4);
    }

    #[test]
    fn test_position_is_pure() {
        let mut rng = StdRng::seed_from_u64(13);
        let p = FillParticle::random(110.0, 3.0, &mut rng);
        let a = p.position(Vec2::splat(10.0), Vec2::new(2.0, -1.0), 3.0);
        let b = p.position(Vec2::splat(10.0), Vec2::new(2.0, -1.0), 3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_large_particles_are_lighter() {
        let small = FillParticle {
            offset: Vec2::ZERO,
            size: 1.0,
            speed: 0.5,
            speed_x: 0.5,
            speed_y: 0.5,
            color: Rgba::new(0, 100, 100, 0.3),
        };
        let large = FillParticle { size: 2.5, ..small };
        assert_eq!(small.alpha(3.0), 1.0);
        assert_eq!(large.alpha(3.0), LARGE_PARTICLE_ALPHA);
    }
}
