//! Per-layer Liquid Glass settings.

use serde::{Deserialize, Serialize};

use super::layer::clamp_percent;

/// Translucency used when the translucency slider is switched off.
pub const DEFAULT_TRANSLUCENCY: f32 = 0.5;

/// A slider that can be toggled without losing its value.
///
/// Missing fields deserialize to an enabled slider at its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustment {
    pub enabled: bool,
    /// Strength in percent (0-100).
    pub value: f32,
}

impl Adjustment {
    pub fn new(enabled: bool, value: f32) -> Self {
        Self { enabled, value }
    }

    pub fn off() -> Self {
        Self::new(false, 0.0)
    }

    /// The clamped strength as 0-1, or `None` when switched off.
    pub fn amount(&self) -> Option<f32> {
        self.enabled.then(|| clamp_percent(self.value) / 100.0)
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::new(true, 50.0)
    }
}

/// Shadow tinting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowKind {
    #[default]
    Neutral,
    /// Two offset silhouettes in blue-violet and warm magenta.
    Chromatic,
}

/// Drop shadow settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    #[serde(rename = "type")]
    pub kind: ShadowKind,
    pub enabled: bool,
    pub value: f32,
}

impl ShadowConfig {
    pub fn amount(&self) -> Option<f32> {
        self.enabled.then(|| clamp_percent(self.value) / 100.0)
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            kind: ShadowKind::Neutral,
            enabled: true,
            value: 50.0,
        }
    }
}

/// The optical settings of one layer's glass surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlassConfig {
    pub enabled: bool,
    pub specular_enabled: bool,
    pub blur: Adjustment,
    pub translucency: Adjustment,
    pub dark_adjust: Adjustment,
    pub mono_adjust: Adjustment,
    pub shadow: ShadowConfig,
}

impl GlassConfig {
    /// A config with the glass pipeline switched off entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Translucency as 0-1, falling back to [`DEFAULT_TRANSLUCENCY`] when off.
    pub fn translucency_factor(&self) -> f32 {
        self.translucency.amount().unwrap_or(DEFAULT_TRANSLUCENCY)
    }
}

impl Default for GlassConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            specular_enabled: true,
            blur: Adjustment::new(true, 30.0),
            translucency: Adjustment::new(true, 50.0),
            dark_adjust: Adjustment::new(true, 40.0),
            mono_adjust: Adjustment::new(true, 50.0),
            shadow: ShadowConfig::default(),
        }
    }
}
