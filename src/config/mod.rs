//! Configuration management for the touch overlay
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::boundary::{Boundary, CircularBoundary, PolygonBoundary};
use crate::controls::{DoubleTapButton, EmulationMode, StickControl};
use crate::error::OverlayError;
use crate::geometry::Rect;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub joysticks: Vec<JoystickConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<PointerConfig>,
}

/// Settings shared by every control
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OverlayConfig {
    #[serde(default = "default_opacity")]
    pub opacity: u16,
    /// Re-center joysticks under the finger on touch-down
    #[serde(default)]
    pub relative_center: bool,
    #[serde(default = "default_aspect_ratio")]
    pub game_aspect_ratio: f32,
    #[serde(default)]
    pub boundary: BoundaryConfig,
}

/// Input envelope used to clamp joystick deflection
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum BoundaryConfig {
    Circle {
        #[serde(default = "default_radius")]
        radius: f64,
    },
    Octagon {
        #[serde(default = "default_radius")]
        radius: f64,
    },
}

/// One on-screen joystick
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JoystickConfig {
    pub control: StickControl,
    #[serde(default)]
    pub emulation: EmulationMode,
    /// Ring placement (hit-test area)
    pub outer: Rect,
    /// Knob placement; only its size matters
    pub inner: Rect,
}

/// Absolute pointer surface
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PointerConfig {
    pub surface: Rect,
    #[serde(default)]
    pub double_tap: DoubleTapButton,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            relative_center: false,
            game_aspect_ratio: default_aspect_ratio(),
            boundary: BoundaryConfig::default(),
        }
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self::Circle {
            radius: default_radius(),
        }
    }
}

impl BoundaryConfig {
    pub fn radius(&self) -> f64 {
        match *self {
            Self::Circle { radius } | Self::Octagon { radius } => radius,
        }
    }
}

impl From<BoundaryConfig> for Boundary {
    fn from(config: BoundaryConfig) -> Self {
        match config {
            BoundaryConfig::Circle { radius } => Boundary::Circle(CircularBoundary::new(radius)),
            BoundaryConfig::Octagon { radius } => Boundary::Polygon(PolygonBoundary::octagon(radius)),
        }
    }
}

impl OverlayConfig {
    /// Opacity as a byte; only meaningful after validation
    pub fn opacity_u8(&self) -> u8 {
        self.opacity.min(u16::from(u8::MAX)) as u8
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&contents).with_context(|| format!("Invalid config file: {}", path))?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents).context("Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<(), OverlayError> {
        let overlay = &self.overlay;
        if overlay.opacity > u16::from(u8::MAX) {
            return Err(OverlayError::InvalidOpacity(overlay.opacity));
        }
        if !(overlay.game_aspect_ratio.is_finite() && overlay.game_aspect_ratio > 0.0) {
            return Err(OverlayError::InvalidAspectRatio(overlay.game_aspect_ratio));
        }
        let radius = overlay.boundary.radius();
        if !(radius.is_finite() && radius > 0.0) {
            return Err(OverlayError::InvalidBoundaryRadius(radius));
        }

        for (idx, joystick) in self.joysticks.iter().enumerate() {
            check_rect(format!("joystick {} outer", idx), joystick.outer)?;
            check_rect(format!("joystick {} inner", idx), joystick.inner)?;
        }

        if let Some(pointer) = &self.pointer {
            check_rect("pointer surface".to_string(), pointer.surface)?;
        }

        Ok(())
    }
}

fn check_rect(what: String, rect: Rect) -> Result<(), OverlayError> {
    if rect.is_empty() {
        return Err(OverlayError::EmptyRect { what, rect });
    }
    Ok(())
}

// Default value functions
fn default_opacity() -> u16 { 255 }
fn default_aspect_ratio() -> f32 { 16.0 / 9.0 }
fn default_radius() -> f64 { 1.0 }
