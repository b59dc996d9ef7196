//! Tunables for every component, with defaults matching the hanging-card scene.

use std::path::Path;

use glam::Vec3;
use physics::WorldConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Geometry and body parameters of one chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Offset of the chain group from the record's row position.
    pub group_offset: Vec3,
    /// Group-relative offsets of J1, J2, J3 and the card.
    pub j1_offset: Vec3,
    pub j2_offset: Vec3,
    pub j3_offset: Vec3,
    pub card_offset: Vec3,
    /// Maximum separation of consecutive rope links.
    pub rope_length: f32,
    /// Card-local point the spherical joint attaches to.
    pub card_anchor: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub link_radius: f32,
    pub link_mass: f32,
    pub card_mass: f32,
    pub card_half_extents: Vec3,
    pub can_sleep: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            group_offset: Vec3::new(0.0, 4.0, 0.0),
            j1_offset: Vec3::new(1.0, 0.0, 0.0),
            j2_offset: Vec3::new(1.0, 0.0, 0.0),
            j3_offset: Vec3::new(1.5, 0.0, 0.0),
            card_offset: Vec3::new(4.0, 0.0, 0.0),
            rope_length: 1.0,
            card_anchor: Vec3::new(0.0, 1.45, 0.0),
            linear_damping: 2.0,
            angular_damping: 2.0,
            link_radius: 0.1,
            link_mass: 1.0,
            card_mass: 1.0,
            card_half_extents: Vec3::new(0.8, 1.125, 0.01),
            can_sleep: false,
        }
    }
}

/// Spline knot spacing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameterization {
    Uniform,
    Centripetal,
    Chordal,
}

impl Parameterization {
    /// Exponent applied to the distance between control points.
    #[must_use]
    pub fn alpha(self) -> f32 {
        match self {
            Parameterization::Uniform => 0.0,
            Parameterization::Centripetal => 0.5,
            Parameterization::Chordal => 1.0,
        }
    }
}

/// Which elapsed time drives the visual lag of the rope curve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagClock {
    /// Wall time of the render frame.
    Frame,
    /// Simulated time consumed by the physics steps of the frame.
    Physics,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub parameterization: Parameterization,
    pub lag_clock: LagClock,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            min_speed: 10.0,
            max_speed: 50.0,
            min_distance: 0.1,
            max_distance: 1.0,
            parameterization: Parameterization::Chordal,
            lag_clock: LagClock::Frame,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// NDC depth the pointer is unprojected at before being pushed along the view ray.
    pub unproject_depth: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self { unproject_depth: 0.5 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    pub damping_factor: f32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self { damping_factor: 0.25 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub spacing: f32,
    pub row_y: f32,
    pub row_z: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 3.0,
            row_y: 1.2,
            row_z: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    pub fixed_dt: f32,
    /// Physics steps allowed per frame before accumulated time is dropped.
    pub max_steps_per_frame: u32,
    /// Blend emitted transforms between the last two physics steps by the
    /// time left in the accumulator.
    pub interpolate: bool,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 5,
            interpolate: true,
        }
    }
}

/// Aggregate configuration, loadable from JSON with every field optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanyardConfig {
    pub world: WorldConfig,
    pub chain: ChainConfig,
    pub curve: CurveConfig,
    pub drag: DragConfig,
    pub stabilizer: StabilizerConfig,
    pub layout: LayoutConfig,
    pub step: StepConfig,
}

impl LanyardConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed JSON or out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let curve = &self.curve;
        if !(curve.min_speed >= 0.0 && curve.min_speed <= curve.max_speed) {
            return Err(ConfigError::Invalid("curve speeds must satisfy 0 <= min_speed <= max_speed"));
        }
        if !(curve.min_distance >= 0.0 && curve.min_distance < curve.max_distance) {
            return Err(ConfigError::Invalid("curve distances must satisfy 0 <= min_distance < max_distance"));
        }
        if !(self.step.fixed_dt.is_finite() && self.step.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid("step.fixed_dt must be positive"));
        }
        if self.step.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid("step.max_steps_per_frame must be at least 1"));
        }
        if !(self.layout.spacing.is_finite() && self.layout.row_y.is_finite() && self.layout.row_z.is_finite()) {
            return Err(ConfigError::Invalid("layout values must be finite"));
        }
        if !(self.chain.rope_length.is_finite() && self.chain.rope_length > 0.0) {
            return Err(ConfigError::Invalid("chain.rope_length must be positive"));
        }
        if !self.stabilizer.damping_factor.is_finite() {
            return Err(ConfigError::Invalid("stabilizer.damping_factor must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = LanyardConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LanyardConfig::default());
        assert_eq!(config.curve.min_speed, 10.0);
        assert_eq!(config.curve.max_speed, 50.0);
        assert_eq!(config.stabilizer.damping_factor, 0.25);
        assert_eq!(config.world.gravity, Vec3::new(0.0, -50.0, 0.0));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = LanyardConfig::from_json_str(
            r#"{ "layout": { "spacing": 4.5 }, "curve": { "lag_clock": "physics" } }"#,
        )
        .unwrap();
        assert_eq!(config.layout.spacing, 4.5);
        assert_eq!(config.layout.row_y, 1.2);
        assert_eq!(config.curve.lag_clock, LagClock::Physics);
    }

    #[test]
    fn inverted_speeds_are_rejected() {
        let err = LanyardConfig::from_json_str(r#"{ "curve": { "min_speed": 60.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
