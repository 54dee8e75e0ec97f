//! The target point the cell is drawn toward.

use glam::Vec2;

use crate::config::TargetConfig;
use crate::easing::ease_in_out;
use crate::render::{Paint, RenderContext, Rgba, Shape, Stroke, Style};

/// Offset of the drawn marker from the target position.
const MARKER_OFFSET: Vec2 = Vec2::new(-10.0, -10.0);
/// Label baseline above the marker center.
const LABEL_RISE: f32 = 20.0;

/// A point set by pointer input, with a one-shot pulsing marker.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPoint {
    position: Vec2,
    timer: f32,
    pulse_step: f32,
    pulse_midpoint: f32,
    label: String,
}

impl TargetPoint {
    pub fn new(config: &TargetConfig) -> Self {
        Self {
            position: config.position,
            timer: 0.0,
            pulse_step: config.pulse_step,
            pulse_midpoint: config.pulse_midpoint,
            label: config.label.clone(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advance the pulse. The timer stops at the midpoint.
    pub fn tick(&mut self) {
        if self.timer < self.pulse_midpoint {
            self.timer = (self.timer + self.pulse_step).min(self.pulse_midpoint);
        }
    }

    /// Move the target and restart its pulse.
    pub fn reposition(&mut self, position: Vec2) {
        self.position = position;
        self.timer = 0.0;
    }

    pub fn ring_radius(&self) -> f32 {
        self.pulse() * 15.0 + 5.0
    }

    pub fn dot_radius(&self) -> f32 {
        self.pulse() * 6.0 + 2.0
    }

    /// Eased pulse amount: 0.5 right after a reposition, 0 once settled.
    pub fn pulse(&self) -> f32 {
        ease_in_out((self.timer.rem_euclid(1.0) - 0.5).abs())
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) {
        let center = self.position + MARKER_OFFSET;
        ctx.canvas.stroke(
            &Shape::Circle { center, radius: self.ring_radius() },
            &Paint::Solid(Rgba::new(255, 255, 255, 0.4)),
            &Stroke::solid(1.0),
            &Style::default(),
        );
        ctx.canvas.fill(
            &Shape::Circle { center, radius: self.dot_radius() },
            &Paint::Solid(Rgba::new(255, 255, 255, 0.7)),
            &Style::default(),
        );
        ctx.canvas.fill_text(
            &self.label,
            center - Vec2::new(0.0, LABEL_RISE),
            Rgba::new(255, 255, 255, 0.7),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_caps_at_midpoint() {
        let mut target = TargetPoint::new(&TargetConfig::default());
        for _ in 0..1000 {
            target.tick();
        }
        assert_eq!(target.timer(), 0.5);
        assert!((target.ring_radius() - 5.0).abs() < 1e-6);
        assert!((target.dot_radius() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_reposition_restarts_pulse() {
        let mut target = TargetPoint::new(&TargetConfig::default());
        for _ in 0..100 {
            target.tick();
        }
        target.reposition(Vec2::new(12.0, 34.0));
        assert_eq!(target.position(), Vec2::new(12.0, 34.0));
        assert_eq!(target.timer(), 0.0);
        // At timer 0 the controller is 0.5, the eased midpoint.
        assert!((target.ring_radius() - 12.5).abs() < 1e-4);

        target.tick();
        assert!((target.timer() - 0.006).abs() < 1e-6);
    }

    #[test]
    fn test_ring_shrinks_over_pulse() {
        let mut target = TargetPoint::new(&TargetConfig::default());
        let mut last = target.ring_radius();
        for _ in 0..100 {
            target.tick();
            let r = target.ring_radius();
            assert!(r <= last + 1e-6);
            last = r;
        }
    }
}
