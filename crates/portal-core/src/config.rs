//! Configuration loading and validation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::fireflies::FireflyVolume;
use crate::params::{ParameterSet, FIREFLIES_SIZE_MAX, FIREFLIES_SIZE_MIN};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub fireflies: FirefliesConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    /// Initial debug-panel parameters
    #[serde(default)]
    pub params: ParameterSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Baked lighting texture (JPEG)
    #[serde(default = "default_baked_texture")]
    pub baked_texture: String,
    /// glTF binary containing the portal scene
    #[serde(default = "default_model")]
    pub model: String,
    /// Background music clip (OGG Vorbis)
    #[serde(default = "default_soundtrack")]
    pub soundtrack: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            baked_texture: default_baked_texture(),
            model: default_model(),
            soundtrack: default_soundtrack(),
        }
    }
}

fn default_baked_texture() -> String {
    "portal-baked.jpg".to_string()
}

fn default_model() -> String {
    "portal-baked.glb".to_string()
}

fn default_soundtrack() -> String {
    "minecraft.ogg".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title (desktop) / document title
    #[serde(default = "default_title")]
    pub title: String,
    /// CSS selector of the canvas to render into (web only)
    #[serde(default = "default_canvas")]
    pub canvas: String,
    /// Enable 4x multisampling
    #[serde(default = "default_true")]
    pub antialias: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            canvas: default_canvas(),
            antialias: true,
        }
    }
}

fn default_title() -> String {
    "Portal".to_string()
}

fn default_canvas() -> String {
    "canvas.webgl".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Initial camera position
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Orbit pivot, initially looked at
    #[serde(default)]
    pub target: [f32; 3],
    /// Fraction of the pending orbit motion applied per frame
    #[serde(default = "default_damping")]
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
            target: [0.0; 3],
            damping_factor: default_damping(),
        }
    }
}

fn default_fov() -> f32 {
    45.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

fn default_camera_position() -> [f32; 3] {
    [-10.0, 5.0, 10.0]
}

fn default_damping() -> f32 {
    0.05
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirefliesConfig {
    #[serde(default = "default_firefly_count")]
    pub count: usize,
    #[serde(default = "default_half_extent")]
    pub half_extent: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    /// Cap applied to the device pixel ratio
    #[serde(default = "default_max_pixel_ratio")]
    pub max_pixel_ratio: f32,
}

impl Default for FirefliesConfig {
    fn default() -> Self {
        Self {
            count: default_firefly_count(),
            half_extent: default_half_extent(),
            height: default_height(),
            max_pixel_ratio: default_max_pixel_ratio(),
        }
    }
}

impl FirefliesConfig {
    pub fn volume(&self) -> FireflyVolume {
        FireflyVolume {
            count: self.count,
            half_extent: self.half_extent,
            height: self.height,
        }
    }
}

/// Upper bound on `fireflies.count`, four vertices each
pub const MAX_FIREFLIES: usize = 100_000;

fn default_firefly_count() -> usize {
    30
}

fn default_half_extent() -> f32 {
    3.0
}

fn default_height() -> f32 {
    4.0
}

fn default_max_pixel_ratio() -> f32 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Linear playback volume
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_true")]
    pub looped: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            looped: true,
        }
    }
}

fn default_volume() -> f32 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Show the debug panel
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_panel_width")]
    pub panel_width: f32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            panel_width: default_panel_width(),
        }
    }
}

fn default_panel_width() -> f32 {
    400.0
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl PortalConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PortalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(invalid("camera.fov_degrees", "must be between 0 and 180"));
        }
        if !(camera.near > 0.0 && camera.near < camera.far && camera.far.is_finite()) {
            return Err(invalid("camera.near", "must be positive and below a finite camera.far"));
        }
        if !(camera.damping_factor > 0.0 && camera.damping_factor <= 1.0) {
            return Err(invalid("camera.damping_factor", "must be in (0, 1]"));
        }

        let fireflies = &self.fireflies;
        if !(1..=MAX_FIREFLIES).contains(&fireflies.count) {
            return Err(invalid(
                "fireflies.count",
                format!("must be in [1, {MAX_FIREFLIES}]"),
            ));
        }
        if !(fireflies.half_extent.is_finite() && fireflies.half_extent > 0.0) {
            return Err(invalid("fireflies.half_extent", "must be positive and finite"));
        }
        if !(fireflies.height.is_finite() && fireflies.height > 0.0) {
            return Err(invalid("fireflies.height", "must be positive and finite"));
        }
        if !(fireflies.max_pixel_ratio.is_finite() && fireflies.max_pixel_ratio >= 1.0) {
            return Err(invalid("fireflies.max_pixel_ratio", "must be finite and at least 1"));
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(invalid("audio.volume", "must be in [0, 1]"));
        }

        if !(FIREFLIES_SIZE_MIN..=FIREFLIES_SIZE_MAX).contains(&self.params.fireflies_size) {
            return Err(invalid(
                "params.fireflies_size",
                format!("must be in [{FIREFLIES_SIZE_MIN}, {FIREFLIES_SIZE_MAX}]"),
            ));
        }

        Ok(())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<PortalConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = PortalConfig::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(PortalConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = PortalConfig::default().to_toml()?;
    std::fs::write(path, content)?;
    Ok(())
}
