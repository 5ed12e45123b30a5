//! Configuration for the backdrop engine and the assistant services.
//!
//! Every tunable constant lives here. The defaults reproduce the dashboard's
//! look; a JSON file can override any subset of fields.
//!
//! ```ignore
//! use studiofx::config::StudioConfig;
//!
//! let config = StudioConfig::load("studio.json")?;
//! config.validate()?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which visual effect is layered on top of the particle field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EffectMode {
    /// Radial flashes that light up nearby particles.
    #[default]
    Paparazzi,
    /// Green bolts connecting nearby particle pairs.
    Matrix,
}

impl EffectMode {
    /// Display name, matching the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            EffectMode::Paparazzi => "Paparazzi",
            EffectMode::Matrix => "Matrix",
        }
    }
}

/// Externally owned effect settings, read on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub mode: EffectMode,
    /// Scalar applied to every flash and bolt intensity.
    pub intensity: f32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            mode: EffectMode::Paparazzi,
            intensity: 1.0,
        }
    }
}

/// Particle cloud layout and the per-tick smoothing factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,
    /// Edge length of the cube the particles are scattered in, centered on the origin.
    pub spread: f32,
    /// Resting brightness every color channel decays toward.
    pub base_brightness: f32,
    /// Exponential smoothing factor for the color fade.
    pub color_blend: f32,
    /// Exponential smoothing factor for the cloud rotation.
    pub rotation_blend: f32,
    /// Radians of rotation per unit of pointer NDC.
    pub rotation_sensitivity: f32,
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 3000,
            spread: 20.0,
            base_brightness: 0.05,
            color_blend: 0.03,
            rotation_blend: 0.04,
            rotation_sensitivity: 0.15,
            min_size: 0.02,
            max_size: 0.08,
        }
    }
}

/// Flash tuning for [`EffectMode::Paparazzi`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaparazziTuning {
    /// World-space radius a flash reaches.
    pub radius: f32,
    /// Per-tick intensity multiplier.
    pub decay: f32,
    /// Flashes at or below this intensity are removed.
    pub cutoff: f32,
    /// Intensity gain for pointer-triggered flashes.
    pub click_gain: f32,
    /// Intensity gain for ambient flashes.
    pub ambient_gain: f32,
    /// Per-tick probability of an ambient flash while none is live.
    pub ambient_chance: f32,
    /// Edge length of the cube ambient flashes appear in.
    pub ambient_extent: f32,
}

impl Default for PaparazziTuning {
    fn default() -> Self {
        Self {
            radius: 5.0,
            decay: 0.7,
            cutoff: 0.01,
            click_gain: 2.0,
            ambient_gain: 1.8,
            ambient_chance: 0.02,
            ambient_extent: 10.0,
        }
    }
}

/// Bolt tuning for [`EffectMode::Matrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixTuning {
    /// Maximum number of concurrent bolts; also the segment buffer size.
    pub max_bolts: usize,
    /// Per-tick probability of attempting a new bolt.
    pub spawn_chance: f32,
    /// Random candidates examined per spawn attempt.
    pub candidate_samples: usize,
    /// Exclusive lower bound of an acceptable bolt length.
    pub min_distance: f32,
    /// Exclusive upper bound of an acceptable bolt length.
    pub max_distance: f32,
    pub gain: f32,
    pub decay: f32,
    pub cutoff: f32,
}

impl Default for MatrixTuning {
    fn default() -> Self {
        Self {
            max_bolts: 15,
            spawn_chance: 0.05,
            candidate_samples: 50,
            min_distance: 0.1,
            max_distance: 2.0,
            gain: 2.5,
            decay: 0.85,
            cutoff: 0.05,
        }
    }
}

/// Latencies and failure rate of the mock assistant services, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub router_delay_ms: u64,
    /// Probability that the primary image generator fails.
    pub primary_failure_rate: f32,
    pub image_delay_ms: u64,
    pub fallback_delay_ms: u64,
    pub video_delay_ms: u64,
    pub video_from_images_delay_ms: u64,
}

impl AssistantConfig {
    /// Every delay zeroed; handy for tests and scripted sessions.
    pub fn instant() -> Self {
        Self {
            router_delay_ms: 0,
            image_delay_ms: 0,
            fallback_delay_ms: 0,
            video_delay_ms: 0,
            video_from_images_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn router_delay(&self) -> Duration {
        Duration::from_millis(self.router_delay_ms)
    }

    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_delay_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn video_delay(&self) -> Duration {
        Duration::from_millis(self.video_delay_ms)
    }

    pub fn video_from_images_delay(&self) -> Duration {
        Duration::from_millis(self.video_from_images_delay_ms)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            router_delay_ms: 500,
            primary_failure_rate: 0.3,
            image_delay_ms: 1500,
            fallback_delay_ms: 2000,
            video_delay_ms: 8000,
            video_from_images_delay_ms: 6000,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub effects: EffectSettings,
    pub field: FieldConfig,
    pub paparazzi: PaparazziTuning,
    pub matrix: MatrixTuning,
    pub assistant: AssistantConfig,
}

impl StudioConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate a JSON configuration string. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.field;
        if field.particle_count == 0 {
            return invalid("field.particle_count must be at least 1");
        }
        check_positive("field.spread", field.spread)?;
        check_blend("field.color_blend", field.color_blend)?;
        check_blend("field.rotation_blend", field.rotation_blend)?;
        if !(field.min_size >= 0.0 && field.min_size < field.max_size && field.max_size.is_finite()) {
            return invalid("field.min_size must be non-negative and below a finite field.max_size");
        }

        let flash = &self.paparazzi;
        check_positive("paparazzi.radius", flash.radius)?;
        check_positive("paparazzi.ambient_extent", flash.ambient_extent)?;
        check_cutoff("paparazzi.cutoff", flash.cutoff)?;
        check_decay("paparazzi.decay", flash.decay)?;
        check_chance("paparazzi.ambient_chance", flash.ambient_chance)?;

        let bolts = &self.matrix;
        if bolts.max_bolts == 0 {
            return invalid("matrix.max_bolts must be at least 1");
        }
        if !(bolts.min_distance >= 0.0 && bolts.min_distance < bolts.max_distance) {
            return invalid("matrix.min_distance must be non-negative and below matrix.max_distance");
        }
        check_cutoff("matrix.cutoff", bolts.cutoff)?;
        check_decay("matrix.decay", bolts.decay)?;
        check_chance("matrix.spawn_chance", bolts.spawn_chance)?;

        check_chance("assistant.primary_failure_rate", self.assistant.primary_failure_rate)?;

        if !(self.effects.intensity >= 0.0 && self.effects.intensity.is_finite()) {
            return invalid("effects.intensity must be finite and non-negative");
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(message.to_string()))
}

/// Finite and strictly positive. Sampling ranges are built from these.
fn check_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be finite and positive, got {value}")))
    }
}

/// Removal threshold for decaying effects. Negative values would keep them forever.
fn check_cutoff(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be finite and non-negative, got {value}")))
    }
}

fn check_blend(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be in (0, 1], got {value}")))
    }
}

fn check_decay(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be in (0, 1), got {value}")))
    }
}

fn check_chance(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}
