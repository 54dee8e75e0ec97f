//! Scene configuration.
//!
//! Every tunable constant of the simulation lives here. Each struct has a
//! [`Default`] matching the look of the original pond scene and chainable
//! `with_*` setters:
//!
//! ```
//! use cytodrift::config::{CellConfig, SceneConfig};
//!
//! let config = SceneConfig::default()
//!     .with_cell(CellConfig::default().with_radius(80.0).with_detail_level(3))
//!     .with_debug(true);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use glam::Vec2;

use crate::error::ConfigError;

/// Parameters of a boundary node's wander impulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseConfig {
    /// Chance that a freshly rolled direction points toward the target.
    pub preferred_probability: f32,
    /// Direction magnitude is divided by this every step.
    pub braking: f32,
    /// Timer advance per step. An impulse lasts `1 / timer_step` steps.
    pub timer_step: f32,
    /// Displacement per step at full eased progress.
    pub scale: f32,
    /// Fraction of the offset from rest removed every step.
    pub shape_recovery: f32,
}

impl Default for ImpulseConfig {
    fn default() -> Self {
        Self {
            preferred_probability: 0.7,
            braking: 1.005,
            timer_step: 0.01,
            scale: 0.3,
            shape_recovery: 0.01,
        }
    }
}

impl ImpulseConfig {
    pub fn with_preferred_probability(mut self, probability: f32) -> Self {
        self.preferred_probability = probability;
        self
    }

    pub fn with_braking(mut self, braking: f32) -> Self {
        self.braking = braking;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_shape_recovery(mut self, recovery: f32) -> Self {
        self.shape_recovery = recovery;
        self
    }

    /// Upper bound of a node's per-axis distance from rest.
    ///
    /// Each step moves a node by at most `scale` and then keeps
    /// `1 - shape_recovery` of its offset, so the offset can never grow
    /// past `scale / shape_recovery`.
    pub fn equilibrium_bound(&self) -> f32 {
        self.scale / self.shape_recovery
    }
}

/// The deformable cell and its interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellConfig {
    /// Initial center on the surface.
    pub center: Vec2,
    /// Radius of the seed circle.
    pub radius: f32,
    /// The boundary has `4 * detail_level` nodes.
    pub detail_level: u32,
    /// Fraction of the centroid offset the center moves by each tick.
    pub follow_rate: f32,
    /// Interior particles per detail level.
    pub particles_per_level: u32,
    /// Upper bound of an interior particle's radius.
    pub particle_max_size: f32,
    pub impulse: ImpulseConfig,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            center: Vec2::new(300.0, 300.0),
            radius: 100.0,
            detail_level: 2,
            follow_rate: 1.0 / 20.0,
            particles_per_level: 150,
            particle_max_size: 3.0,
            impulse: ImpulseConfig::default(),
        }
    }
}

impl CellConfig {
    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_detail_level(mut self, level: u32) -> Self {
        self.detail_level = level;
        self
    }

    pub fn with_particles_per_level(mut self, count: u32) -> Self {
        self.particles_per_level = count;
        self
    }

    pub fn with_impulse(mut self, impulse: ImpulseConfig) -> Self {
        self.impulse = impulse;
        self
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        4 * self.detail_level as usize
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        (self.particles_per_level * self.detail_level) as usize
    }
}

/// Bubbles and diatoms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientConfig {
    pub bubble_count: usize,
    pub bubble_min_size: f32,
    pub bubble_max_size: f32,
    /// Largest per-axis velocity change of a bubble per tick.
    pub bubble_jitter: f32,
    /// Largest pulse-timer advance of a bubble per tick.
    pub bubble_pulse_step: f32,
    pub diatom_count: usize,
    pub diatom_min_size: f32,
    pub diatom_max_size: f32,
    pub diatom_jitter: f32,
    /// Velocity components above this are damped.
    pub diatom_speed_limit: f32,
    pub diatom_damping: f32,
    /// Rotation per tick is `diatom_spin / size`.
    pub diatom_spin: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            bubble_count: 160,
            bubble_min_size: 4.0,
            bubble_max_size: 10.0,
            bubble_jitter: 1.0 / 180.0,
            bubble_pulse_step: 0.001,
            diatom_count: 4,
            diatom_min_size: 10.0,
            diatom_max_size: 50.0,
            diatom_jitter: 1.0 / 100.0,
            diatom_speed_limit: 0.1,
            diatom_damping: 1.5,
            diatom_spin: 0.3,
        }
    }
}

impl AmbientConfig {
    pub fn with_bubble_count(mut self, count: usize) -> Self {
        self.bubble_count = count;
        self
    }

    pub fn with_diatom_count(mut self, count: usize) -> Self {
        self.diatom_count = count;
        self
    }
}

/// The pulsing "Come here" marker.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    pub position: Vec2,
    pub pulse_step: f32,
    /// The pulse timer stops here until the next reposition.
    pub pulse_midpoint: f32,
    pub label: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(500.0, 300.0),
            pulse_step: 0.006,
            pulse_midpoint: 0.5,
            label: "Come here".to_string(),
        }
    }
}

impl TargetConfig {
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Top-level configuration of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub cell: CellConfig,
    pub ambient: AmbientConfig,
    pub target: TargetConfig,
    /// Minimum time between two render passes.
    pub render_interval: Duration,
    /// Draw control-point tangents, the centroid vector and rest offsets.
    pub debug: bool,
    /// Initial window size in logical pixels.
    pub window_size: (u32, u32),
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cell: CellConfig::default(),
            ambient: AmbientConfig::default(),
            target: TargetConfig::default(),
            render_interval: Duration::from_secs_f64(1.0 / 60.0),
            debug: false,
            window_size: (1000, 600),
        }
    }
}

impl SceneConfig {
    pub fn with_cell(mut self, cell: CellConfig) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_ambient(mut self, ambient: AmbientConfig) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_target(mut self, target: TargetConfig) -> Self {
        self.target = target;
        self
    }

    pub fn with_render_interval(mut self, interval: Duration) -> Self {
        self.render_interval = interval;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Check every value the simulation divides by or samples from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cell = &self.cell;
        if cell.detail_level == 0 {
            return Err(ConfigError::ZeroDetailLevel);
        }
        positive("cell.radius", cell.radius)?;
        positive("cell.particle_max_size", cell.particle_max_size)?;
        if !(0.0..=1.0).contains(&cell.follow_rate) {
            return Err(ConfigError::OutOfRange { field: "cell.follow_rate", value: cell.follow_rate });
        }

        let impulse = &cell.impulse;
        if !(0.0..=1.0).contains(&impulse.preferred_probability) {
            return Err(ConfigError::OutOfRange {
                field: "impulse.preferred_probability",
                value: impulse.preferred_probability,
            });
        }
        if !(impulse.braking >= 1.0 && impulse.braking.is_finite()) {
            return Err(ConfigError::OutOfRange { field: "impulse.braking", value: impulse.braking });
        }
        positive("impulse.timer_step", impulse.timer_step)?;
        positive("impulse.shape_recovery", impulse.shape_recovery)?;
        non_negative("impulse.scale", impulse.scale)?;

        let ambient = &self.ambient;
        size_range("ambient.bubble", ambient.bubble_min_size, ambient.bubble_max_size)?;
        non_negative("ambient.bubble_jitter", ambient.bubble_jitter)?;
        non_negative("ambient.bubble_pulse_step", ambient.bubble_pulse_step)?;
        if ambient.diatom_min_size.is_nan() || ambient.diatom_min_size <= 0.0 {
            return Err(ConfigError::ZeroSizedSprite {
                field: "ambient.diatom_min_size",
                value: ambient.diatom_min_size,
            });
        }
        size_range("ambient.diatom", ambient.diatom_min_size, ambient.diatom_max_size)?;
        non_negative("ambient.diatom_jitter", ambient.diatom_jitter)?;
        non_negative("ambient.diatom_speed_limit", ambient.diatom_speed_limit)?;
        positive("ambient.diatom_damping", ambient.diatom_damping)?;
        non_negative("ambient.diatom_spin", ambient.diatom_spin)?;

        positive("target.pulse_step", self.target.pulse_step)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn size_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    positive(field, min)?;
    if max > min {
        Ok(())
    } else {
        Err(ConfigError::EmptyRange { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_node_and_particle_counts() {
        let cell = CellConfig::default().with_detail_level(3);
        assert_eq!(cell.node_count(), 12);
        assert_eq!(cell.particle_count(), 450);
    }

    #[test]
    fn test_zero_detail_level_rejected() {
        let config = SceneConfig::default().with_cell(CellConfig::default().with_detail_level(0));
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDetailLevel)));
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let impulse = ImpulseConfig::default().with_preferred_probability(1.5);
        let config = SceneConfig::default().with_cell(CellConfig::default().with_impulse(impulse));
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let config = SceneConfig::default().with_cell(CellConfig::default().with_radius(-4.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "cell.radius", .. })
        ));
    }

    #[test]
    fn test_nan_factors_rejected() {
        let impulse = ImpulseConfig::default().with_braking(f32::NAN);
        let config = SceneConfig::default().with_cell(CellConfig::default().with_impulse(impulse));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "impulse.braking", .. })
        ));

        let mut cell = CellConfig::default();
        cell.follow_rate = f32::NAN;
        let config = SceneConfig::default().with_cell(cell);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "cell.follow_rate", .. })
        ));

        let mut ambient = AmbientConfig::default();
        ambient.bubble_jitter = f32::NAN;
        assert!(matches!(
            SceneConfig::default().with_ambient(ambient).validate(),
            Err(ConfigError::OutOfRange { field: "ambient.bubble_jitter", .. })
        ));

        let mut ambient = AmbientConfig::default();
        ambient.diatom_speed_limit = f32::NAN;
        assert!(matches!(
            SceneConfig::default().with_ambient(ambient).validate(),
            Err(ConfigError::OutOfRange { field: "ambient.diatom_speed_limit", .. })
        ));
    }

    #[test]
    fn test_zero_sized_diatom_rejected() {
        let mut ambient = AmbientConfig::default();
        ambient.diatom_min_size = 0.0;
        assert!(matches!(
            SceneConfig::default().with_ambient(ambient).validate(),
            Err(ConfigError::ZeroSizedSprite { field: "ambient.diatom_min_size", .. })
        ));
    }

    #[test]
    fn test_equilibrium_bound() {
        let impulse = ImpulseConfig::default();
        assert!((impulse.equilibrium_bound() - 30.0).abs() < 1e-4);
    }
}
