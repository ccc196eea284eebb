//! Tunables for the scene, overridable from JSON.
//!
//! Every group is `#[serde(default)]`, so a partial document such as
//! `{"controls": {"max_distance": 14}}` keeps the remaining defaults.

use crate::domain::errors::{AppError, SceneError};
use serde::{Deserialize, Serialize};

/// Smallest polar angle the orbit may reach; keeps the camera off the pole.
pub const MIN_POLAR_ANGLE: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub chart: ChartLayout,
    pub effects: EffectsConfig,
    pub environment: EnvironmentConfig,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunables that would make the camera or controls misbehave.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.camera.validate()?;
        self.controls.validate()
    }
}

fn invalid(msg: String) -> SceneError {
    SceneError::InvalidConfiguration(msg)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), SceneError> {
        let finite = [self.fov_degrees, self.near, self.far].iter().all(|v| v.is_finite())
            && self.position.iter().chain(self.target.iter()).all(|v| v.is_finite());
        if !finite {
            return Err(invalid("camera values must be finite".into()));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid(format!("fov_degrees {} is outside (0, 180)", self.fov_degrees)));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(invalid(format!("near {} must be positive and below far {}", self.near, self.far)));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { fov_degrees: 60.0, near: 0.1, far: 1000.0, position: [0.0, 0.5, 5.0], target: [0.0, 0.0, 0.0] }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar_angle: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    /// Radians per pixel of pointer drag.
    pub rotate_speed: f32,
}

impl ControlsConfig {
    pub fn validate(&self) -> Result<(), SceneError> {
        let values = [
            self.damping_factor,
            self.min_distance,
            self.max_distance,
            self.max_polar_angle,
            self.zoom_in_factor,
            self.zoom_out_factor,
            self.rotate_speed,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(invalid("controls values must be finite".into()));
        }
        if self.min_distance <= 0.0 || self.min_distance > self.max_distance {
            return Err(invalid(format!(
                "distance range {}..{} is empty or not positive",
                self.min_distance, self.max_distance
            )));
        }
        if self.max_polar_angle < MIN_POLAR_ANGLE {
            return Err(invalid(format!("max_polar_angle {} is below {}", self.max_polar_angle, MIN_POLAR_ANGLE)));
        }
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(invalid(format!("damping_factor {} is outside (0, 1]", self.damping_factor)));
        }
        if self.zoom_in_factor <= 0.0 || self.zoom_out_factor <= 0.0 {
            return Err(invalid("zoom factors must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            min_distance: 3.0,
            max_distance: 10.0,
            max_polar_angle: std::f32::consts::FRAC_PI_2,
            zoom_in_factor: 0.8,
            zoom_out_factor: 1.25,
            rotate_speed: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub candle_spacing: f32,
    pub body_width: f32,
    pub wick_width: f32,
    /// World units per price unit.
    pub price_scale: f32,
    pub bullish_color: u32,
    pub bearish_color: u32,
    pub entrance_from_y: f32,
    pub entrance_duration_ms: f64,
    pub entrance_stagger_ms: f64,
    pub curve_samples: usize,
    pub glow_points: usize,
    pub label_position: [f32; 3],
    pub badge_position: [f32; 3],
    /// Chart group spin in radians per second.
    pub rotation_speed: f32,
    /// Seed for the cosmetic pulse jitter.
    pub seed: u64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            candle_spacing: 0.5,
            body_width: 0.15,
            wick_width: 0.02,
            price_scale: 0.01,
            bullish_color: 0x00ff88,
            bearish_color: 0xff4466,
            entrance_from_y: -1.0,
            entrance_duration_ms: 500.0,
            entrance_stagger_ms: 100.0,
            curve_samples: 50,
            glow_points: 15,
            label_position: [0.0, 1.5, 0.0],
            badge_position: [0.0, 1.2, 0.0],
            rotation_speed: 0.1,
            seed: 0x7a3d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub particle_count: usize,
    pub particle_size: f32,
    pub burst_duration_ms: f64,
    pub spin_per_frame: f32,
    pub expansion: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self { particle_count: 100, particle_size: 0.1, burst_duration_ms: 1500.0, spin_per_frame: 0.01, expansion: 0.1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub ambient_intensity: f32,
    pub point_intensity: f32,
    pub point_position: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub floor_size: f32,
    pub floor_y: f32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.4,
            point_intensity: 0.8,
            point_position: [5.0, 5.0, 5.0],
            directional_intensity: 0.5,
            directional_position: [-5.0, 5.0, 5.0],
            grid_size: 20.0,
            grid_divisions: 20,
            floor_size: 20.0,
            floor_y: -1.0,
            fog_near: 15.0,
            fog_far: 30.0,
        }
    }
}
