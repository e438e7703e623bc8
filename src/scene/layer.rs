//! Layer entities: identity, fill, layout, and blend mode.

use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use resvg::tiny_skia;
use serde::{Deserialize, Serialize};

use super::glass::GlassConfig;

// ============================================================================
// Color
// ============================================================================

/// A non-premultiplied sRGB color with 8 bits per channel.
///
/// Serializes as a hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb`, `#rrggbb`, or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let nibble = |i: usize| u8::from_str_radix(digits.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            3 => Some(Self::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Formats as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Returns this color with its alpha multiplied by `factor` (clamped to 0-1).
    pub fn scale_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Hue in degrees (0-360), derived through HSL.
    pub fn hue(&self) -> f32 {
        let hsl: Hsl = Srgb::new(self.r, self.g, self.b)
            .into_format::<f32>()
            .into_color();
        hsl.hue.into_positive_degrees()
    }

    /// Builds an opaque color from HSL components (hue in degrees, the rest 0-1).
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
        let rgb: Srgb<u8> = rgb.into_format();
        Self::rgb(rgb.red, rgb.green, rgb.blue)
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid color `{value}`"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

// ============================================================================
// Identity and kind
// ============================================================================

/// Stable identifier of a layer, unique within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Whether a layer draws content or merges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    #[default]
    Content,
    Group,
}

// ============================================================================
// Fill
// ============================================================================

/// A gradient stop. Offsets are clamped to 0-1 when used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

impl ColorStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Paint laid beneath a layer's bitmap.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Fill {
    #[default]
    None,
    Solid {
        color: Color,
    },
    /// Vertical gradient from the top of the layer square to its bottom.
    LinearGradient {
        stops: Vec<ColorStop>,
    },
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Self::Solid { color }
    }

    pub fn linear_gradient(stops: Vec<ColorStop>) -> Self {
        Self::LinearGradient { stops }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns gradient stops sorted by offset with offsets clamped to 0-1.
    pub(crate) fn ordered_stops(stops: &[ColorStop]) -> Vec<ColorStop> {
        let mut ordered: Vec<ColorStop> = stops
            .iter()
            .map(|s| ColorStop::new(s.offset.clamp(0.0, 1.0), s.color))
            .collect();
        ordered.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        ordered
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Local placement of a layer inside the frame.
///
/// `x` and `y` are offsets in percent of the frame edge; `scale` is a percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Layout {
    pub const SCALE_RANGE: (f32, f32) = (10.0, 200.0);
    pub const OFFSET_RANGE: (f32, f32) = (-100.0, 100.0);

    pub fn new(x: f32, y: f32, scale: f32) -> Self {
        Self { x, y, scale }
    }

    /// Returns a copy with every field clamped to its documented range.
    pub fn clamped(&self) -> Self {
        let (min_off, max_off) = Self::OFFSET_RANGE;
        let (min_scale, max_scale) = Self::SCALE_RANGE;
        Self {
            x: finite_or(self.x, 0.0).clamp(min_off, max_off),
            y: finite_or(self.y, 0.0).clamp(min_off, max_off),
            scale: finite_or(self.scale, 100.0).clamp(min_scale, max_scale),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 100.0,
        }
    }
}

pub(crate) fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Clamps a 0-100 slider value, treating NaN as zero.
pub(crate) fn clamp_percent(value: f32) -> f32 {
    finite_or(value, 0.0).clamp(0.0, 100.0)
}

// ============================================================================
// BlendMode
// ============================================================================

/// Separable and non-separable blend modes a layer can composite with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    PlusLighter,
}

impl BlendMode {
    pub const ALL: [Self; 17] = [
        Self::Normal,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
        Self::PlusLighter,
    ];

    /// The CSS-style name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
            Self::PlusLighter => "plus-lighter",
        }
    }

    /// Parses a mode name, falling back to [`BlendMode::Normal`] for unknown names.
    pub fn from_name_or_normal(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(name, "unknown blend mode, compositing as normal");
            Self::Normal
        })
    }

    /// The compositing operator used to draw with this mode.
    pub fn to_skia(self) -> tiny_skia::BlendMode {
        use tiny_skia::BlendMode as Op;
        match self {
            Self::Normal => Op::SourceOver,
            Self::Multiply => Op::Multiply,
            Self::Screen => Op::Screen,
            Self::Overlay => Op::Overlay,
            Self::Darken => Op::Darken,
            Self::Lighten => Op::Lighten,
            Self::ColorDodge => Op::ColorDodge,
            Self::ColorBurn => Op::ColorBurn,
            Self::HardLight => Op::HardLight,
            Self::SoftLight => Op::SoftLight,
            Self::Difference => Op::Difference,
            Self::Exclusion => Op::Exclusion,
            Self::Hue => Op::Hue,
            Self::Saturation => Op::Saturation,
            Self::Color => Op::Color,
            Self::Luminosity => Op::Luminosity,
            Self::PlusLighter => Op::Plus,
        }
    }
}

/// Error returned when parsing an unknown blend mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blend mode `{0}`")]
pub struct UnknownBlendMode(pub String);

impl FromStr for BlendMode {
    type Err = UnknownBlendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or(UnknownBlendMode(s.to_string()))
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Layer
// ============================================================================

/// One node of the scene's layer list.
///
/// Layers reference their parent by id; the tree view is derived by
/// [`Scene`](super::Scene) when it is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub parent_id: Option<LayerId>,
    /// Sort key among siblings sharing the same parent.
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Opacity in percent (0-100).
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default)]
    pub fill: Fill,
    /// Source reference into the [`ImageCache`](crate::ImageCache).
    #[serde(default)]
    pub bitmap: Option<String>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub glass: GlassConfig,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    100.0
}

impl Layer {
    /// Creates a visible content layer with no fill and default glass.
    pub fn content(id: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(id),
            kind: LayerKind::Content,
            parent_id: None,
            order: 0,
            visible: true,
            opacity: 100.0,
            blend_mode: BlendMode::Normal,
            fill: Fill::None,
            bitmap: None,
            layout: Layout::default(),
            glass: GlassConfig::default(),
        }
    }

    /// Creates a visible, empty group layer.
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            kind: LayerKind::Group,
            ..Self::content(id)
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(LayerId::new(parent));
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_bitmap(mut self, source: impl Into<String>) -> Self {
        self.bitmap = Some(source.into());
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_glass(mut self, glass: GlassConfig) -> Self {
        self.glass = glass;
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind == LayerKind::Group
    }

    /// Opacity clamped to 0-100 and scaled to 0-1.
    pub fn opacity_factor(&self) -> f32 {
        clamp_percent(self.opacity) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#12ab34").unwrap();
        assert_eq!(c, Color::rgb(0x12, 0xab, 0x34));
        assert_eq!(c.to_hex(), "#12ab34");

        let c = Color::from_hex("ff000080").unwrap();
        assert_eq!(c.a, 0x80);
        assert_eq!(c.to_hex(), "#ff000080");

        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#ggg"), None);
        assert_eq!(Color::from_hex("#12345"), None);
    }

    #[test]
    fn color_hue_of_primaries() {
        assert!((Color::rgb(255, 0, 0).hue() - 0.0).abs() < 0.5);
        assert!((Color::rgb(0, 255, 0).hue() - 120.0).abs() < 0.5);
        assert!((Color::rgb(0, 0, 255).hue() - 240.0).abs() < 0.5);
    }

    #[test]
    fn opacity_clamps_to_full() {
        assert_eq!(Layer::content("a").with_opacity(150.0).opacity_factor(), 1.0);
        assert_eq!(Layer::content("a").with_opacity(-20.0).opacity_factor(), 0.0);
        assert_eq!(Layer::content("a").with_opacity(f32::NAN).opacity_factor(), 0.0);
    }

    #[test]
    fn layout_scale_clamps_to_bounds() {
        assert_eq!(Layout::new(0.0, 0.0, 500.0).clamped().scale, 200.0);
        assert_eq!(Layout::new(0.0, 0.0, -50.0).clamped().scale, 10.0);
        assert_eq!(Layout::new(0.0, 0.0, 75.0).clamped().scale, 75.0);
        let off = Layout::new(-400.0, 250.0, 100.0).clamped();
        assert_eq!((off.x, off.y), (-100.0, 100.0));
    }

    #[test]
    fn every_blend_mode_has_a_distinct_operator() {
        let ops: Vec<_> = BlendMode::ALL.iter().map(|m| m.to_skia()).collect();
        for (i, a) in ops.iter().enumerate() {
            for b in &ops[i + 1..] {
                assert_ne!(a, b, "two blend modes share an operator");
            }
        }
        // Only `normal` itself lands on plain source-over.
        for mode in BlendMode::ALL {
            let is_source_over = mode.to_skia() == tiny_skia::BlendMode::SourceOver;
            assert_eq!(is_source_over, mode == BlendMode::Normal, "{mode}");
        }
    }

    #[test]
    fn blend_mode_names_parse_back() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.name().parse::<BlendMode>(), Ok(mode));
        }
        assert_eq!("Color-Dodge".parse::<BlendMode>(), Ok(BlendMode::ColorDodge));
        assert!("vivid-light".parse::<BlendMode>().is_err());
        assert_eq!(BlendMode::from_name_or_normal("vivid-light"), BlendMode::Normal);
    }

    #[test]
    fn blend_mode_serde_uses_kebab_case() {
        let json = serde_json::to_string(&BlendMode::SoftLight).unwrap();
        assert_eq!(json, "\"soft-light\"");
        let parsed: BlendMode = serde_json::from_str("\"plus-lighter\"").unwrap();
        assert_eq!(parsed, BlendMode::PlusLighter);
    }

    #[test]
    fn gradient_stops_are_ordered_and_clamped() {
        let stops = vec![
            ColorStop::new(1.4, Color::WHITE),
            ColorStop::new(-0.2, Color::BLACK),
            ColorStop::new(0.5, Color::rgb(9, 9, 9)),
        ];
        let ordered = Fill::ordered_stops(&stops);
        let offsets: Vec<f32> = ordered.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
        assert_eq!(ordered[0].color, Color::BLACK);
    }

    #[test]
    fn layer_json_defaults() {
        let layer: Layer = serde_json::from_str(r##"{"id":"a","fill":{"type":"solid","color":"#ff0000"}}"##).unwrap();
        assert_eq!(layer.kind, LayerKind::Content);
        assert!(layer.visible);
        assert_eq!(layer.opacity, 100.0);
        assert_eq!(layer.fill, Fill::solid(Color::rgb(255, 0, 0)));
        assert_eq!(layer.layout, Layout::default());
    }
}
