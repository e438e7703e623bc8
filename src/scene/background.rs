//! Background description and appearance modes.

use serde::{Deserialize, Serialize};

use super::layer::Color;

/// The closed set of appearance modes an icon can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppearanceMode {
    #[default]
    Default,
    Dark,
    TintedLight,
    TintedDark,
    ClearLight,
    ClearDark,
}

impl AppearanceMode {
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Dark,
        Self::TintedLight,
        Self::TintedDark,
        Self::ClearLight,
        Self::ClearDark,
    ];

    /// True for the dark variants (dark glass tint, stronger inner shadow).
    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark | Self::TintedDark | Self::ClearDark)
    }

    pub fn is_tinted(&self) -> bool {
        matches!(self, Self::TintedLight | Self::TintedDark)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::ClearLight | Self::ClearDark)
    }

    /// Whether the finished frame is converted to grayscale.
    pub fn desaturates(&self) -> bool {
        self.is_clear()
    }

    /// Whether a layer's `darkAdjust` slider takes effect.
    pub fn applies_dark_adjust(&self) -> bool {
        self.is_dark()
    }

    /// Whether a layer's `monoAdjust` slider takes effect.
    pub fn applies_mono_adjust(&self) -> bool {
        self.is_clear()
    }
}

/// Whether the background is a gradient or a flat color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundKind {
    #[default]
    Gradient,
    Solid,
}

/// The icon's backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundSpec {
    pub kind: BackgroundKind,
    /// Gradient colors in order; the first one is the solid color.
    pub colors: Vec<Color>,
    /// Gradient direction in degrees (0 runs bottom to top).
    pub angle: f32,
    /// Hue used by the tinted modes. Derived from the first color when unset.
    pub tint_hue: Option<f32>,
}

impl BackgroundSpec {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: BackgroundKind::Solid,
            colors: vec![color],
            angle: 0.0,
            tint_hue: None,
        }
    }

    pub fn gradient(colors: Vec<Color>, angle: f32) -> Self {
        Self {
            kind: BackgroundKind::Gradient,
            colors,
            angle,
            tint_hue: None,
        }
    }

    /// The first color, or a neutral gray when the list is empty.
    pub fn primary_color(&self) -> Color {
        self.colors.first().copied().unwrap_or(Color::rgb(128, 128, 128))
    }

    /// Hue driving the tinted modes, in degrees 0-360.
    pub fn hue(&self) -> f32 {
        match self.tint_hue {
            Some(h) if h.is_finite() => h.rem_euclid(360.0),
            _ => self.primary_color().hue(),
        }
    }
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self::gradient(vec![Color::rgb(0x3a, 0x7b, 0xff), Color::rgb(0x8e, 0x4d, 0xf5)], 180.0)
    }
}
