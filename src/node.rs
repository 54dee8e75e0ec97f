//! Boundary nodes: the control vertices of the cell outline.
//!
//! A node lives in the cell's local frame. Its two control-point offsets are
//! fixed at construction and encode the curve geometry of the seed circle;
//! only its position, wander direction and impulse timer change over time.

use std::f32::consts::{FRAC_PI_4, PI, TAU};

use glam::Vec2;
use rand::Rng;

use crate::config::ImpulseConfig;
use crate::easing::ease_in_out;

/// One control vertex of the closed cell outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryNode {
    position: Vec2,
    control1: Vec2,
    control2: Vec2,
    direction: Vec2,
    timer: f32,
    rest: Vec2,
}

impl BoundaryNode {
    /// Create a node at `position` whose rest position is that same point.
    ///
    /// The timer starts at 0, so the first step rolls a new direction.
    pub fn new(position: Vec2, control1: Vec2, control2: Vec2, direction: Vec2) -> Self {
        Self {
            position,
            control1,
            control2,
            direction,
            timer: 0.0,
            rest: position,
        }
    }

    /// Node `index` of `count` evenly spaced on a circle of `radius`.
    ///
    /// The control points sit at the standard cubic circle approximation
    /// distance `(4/3) * tan(pi / 2n) * r`.
    pub fn on_circle(index: usize, count: usize, radius: f32, rng: &mut impl Rng) -> Self {
        let angle = index as f32 / count as f32 * TAU;
        let position = Vec2::from_angle(angle) * radius;
        let step = (4.0 / 3.0) * (PI / (count as f32 * 2.0)).tan() * radius;

        let control1 = Vec2::from_angle(FRAC_PI_4 + angle) * step;
        let control2 = Vec2::from_angle(PI * 1.5 + angle) * step;
        let direction = Vec2::new(random_sign(rng), random_sign(rng));

        Self::new(position, control1, control2, direction)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Offset of the incoming segment's first control point, relative to
    /// the previous node.
    #[inline]
    pub fn control1(&self) -> Vec2 {
        self.control1
    }

    /// Offset of the incoming segment's second control point, relative to
    /// this node.
    #[inline]
    pub fn control2(&self) -> Vec2 {
        self.control2
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Position at construction; the attractor of shape recovery.
    #[inline]
    pub fn rest(&self) -> Vec2 {
        self.rest
    }

    /// Whether the current impulse has run out and a new one must be rolled.
    #[inline]
    pub fn impulse_finished(&self) -> bool {
        self.timer <= 0.0 || self.timer >= 1.0
    }

    /// Advance the node by one impulse step.
    ///
    /// `parent_center` and `target` are surface coordinates; only the sign
    /// of their difference matters.
    pub fn propagate(
        &self,
        parent_center: Vec2,
        target: Vec2,
        impulse: &ImpulseConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let mut next = *self;

        if next.impulse_finished() {
            let preferred = preferred_direction(parent_center, target);
            next.direction = Vec2::new(
                biased_sign(preferred.x, impulse.preferred_probability, rng),
                biased_sign(preferred.y, impulse.preferred_probability, rng),
            );
            next.timer = 0.0;
        }

        next.direction /= impulse.braking;
        next.timer += impulse.timer_step;
        next.position += next.direction * ease_in_out(next.timer) * impulse.scale;
        next.recover(impulse.shape_recovery)
    }

    /// Pull the position back toward rest by `rate` of the current offset.
    pub fn recover(&self, rate: f32) -> Self {
        Self {
            position: self.position - (self.position - self.rest) * rate,
            ..*self
        }
    }

    /// Distance between the current and the rest position.
    #[inline]
    pub fn displacement(&self) -> f32 {
        self.position.distance(self.rest)
    }
}

/// Per-axis sign pointing from `from` toward `to`; ties count as negative.
pub fn preferred_direction(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    Vec2::new(
        if delta.x > 0.0 { 1.0 } else { -1.0 },
        if delta.y > 0.0 { 1.0 } else { -1.0 },
    )
}

fn biased_sign(preferred: f32, probability: f32, rng: &mut impl Rng) -> f32 {
    if rng.gen::<f32>() < probability {
        preferred
    } else {
        -preferred
    }
}

fn random_sign(rng: &mut impl Rng) -> f32 {
    if rng.gen::<f32>() < 0.5 {
        -1.0
    } else {
        1.0
    }
}
