//! The Liquid Glass effect pipeline.
//!
//! A [`GlassRenderer`] turns one layer's content raster plus the frame
//! background into the composited glass layer. Two backends implement the
//! same nine ordered passes:
//!
//! 1. drop shadow
//! 2. background sampling (blur + saturation boost)
//! 3. chromatic aberration along the content edge normal
//! 4. tint, translucency, and content composite
//! 5. specular highlight
//! 6. Fresnel rim light
//! 7. border gradient
//! 8. inner shadow
//! 9. appearance mode adjustment
//!
//! Both read their numbers from [`GlassParams`], so they agree on what each
//! pass does even where their numerical approach differs.

pub mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;
#[cfg(feature = "gpu")]
mod shaders;

use std::fmt;

use resvg::tiny_skia::{Color as SkiaColor, Pixmap};
use tracing::{debug, info, warn};

use crate::config::BackendPreference;
use crate::error::GlassError;
use crate::geometry::light_vector;
use crate::scene::{AppearanceMode, BlendMode, GlassConfig, ShadowKind};

pub use cpu::CpuGlassRenderer;
#[cfg(feature = "gpu")]
pub use gpu::GpuGlassRenderer;

/// Peak R/B displacement at the silhouette edge, as a fraction of the frame edge.
pub const ABERRATION_STRENGTH: f32 = 0.006;
/// Saturation multiplier applied to the blurred background.
pub const SATURATION_BOOST: f32 = 1.38;
/// Blur radius used when the blur slider is off, as a fraction of the frame edge.
pub const BASELINE_BLUR: f32 = 0.02;
/// Blur radius at `blur.value = 100`, as a fraction of the frame edge.
pub const MAX_BLUR: f32 = 0.08;
/// Width of the border ring, as a fraction of the frame edge.
pub const BORDER_WIDTH: f32 = 0.012;
/// Drop shadow offset and blur radius, as fractions of the frame edge.
pub const SHADOW_OFFSET: f32 = 0.02;
pub const SHADOW_BLUR: f32 = 0.03;
/// Lowest alpha the content is redrawn with over the glass base.
pub const MIN_CONTENT_ALPHA: f32 = 0.15;

// ============================================================================
// Backend selection
// ============================================================================

/// Which implementation rendered a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
    Gpu,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        })
    }
}

/// A backend capable of rendering one glass layer.
///
/// Implementations own their scratch resources; a renderer is used by one
/// render at a time.
pub trait GlassRenderer: Send {
    fn kind(&self) -> BackendKind;

    /// Renders the glass treatment of `input.content` and composites it onto
    /// `target` with the layer's opacity and blend mode.
    ///
    /// `target` must have the same dimensions as the content raster.
    fn render_layer(&mut self, input: &GlassInput<'_>, target: &mut Pixmap) -> Result<(), GlassError>;
}

/// Picks a glass backend for `preference`, probing the GPU when allowed.
///
/// Falls back to the CPU backend whenever the GPU cannot be brought up.
pub fn select_renderer(preference: BackendPreference) -> Box<dyn GlassRenderer> {
    let renderer = match preference {
        BackendPreference::Cpu => None,
        BackendPreference::Auto => probe_gpu(),
        BackendPreference::Gpu => {
            let probed = probe_gpu();
            if probed.is_none() {
                warn!("gpu backend requested but unavailable; falling back to cpu");
            }
            probed
        }
    };
    let renderer = renderer.unwrap_or_else(|| Box::new(CpuGlassRenderer::new()));
    info!(backend = %renderer.kind(), ?preference, "glass backend selected");
    renderer
}

#[cfg(feature = "gpu")]
fn probe_gpu() -> Option<Box<dyn GlassRenderer>> {
    match GpuGlassRenderer::new() {
        Ok(renderer) => Some(Box::new(renderer)),
        Err(e) => {
            debug!(error = %e, "gpu probe failed");
            None
        }
    }
}

#[cfg(not(feature = "gpu"))]
fn probe_gpu() -> Option<Box<dyn GlassRenderer>> {
    debug!("built without the gpu feature");
    None
}

// ============================================================================
// GlassInput
// ============================================================================

/// Everything a backend needs to render one glass layer.
#[derive(Debug, Clone, Copy)]
pub struct GlassInput<'a> {
    /// The layer's rasterized content (premultiplied, frame sized).
    pub content: &'a Pixmap,
    /// The frame background, mode overlay included.
    pub background: &'a Pixmap,
    pub glass: &'a GlassConfig,
    pub light_angle: f32,
    pub appearance: AppearanceMode,
    /// Layer opacity as 0-1.
    pub opacity: f32,
    pub blend_mode: BlendMode,
}

impl GlassInput<'_> {
    pub fn size(&self) -> u32 {
        self.content.width()
    }
}

// ============================================================================
// GlassParams
// ============================================================================

/// Resolved per-pass parameters for one glass layer, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlassParams {
    pub size: u32,
    /// Unit vector toward the light, y-down.
    pub light: (f32, f32),
    pub blur_radius: f32,
    pub translucency: f32,
    /// Straight-alpha RGB of the glass tint, 0-1.
    pub tint: [f32; 3],
    pub specular: bool,
    pub shadow: Option<(ShadowKind, f32)>,
    pub shadow_offset: f32,
    pub shadow_blur: f32,
    pub aberration: f32,
    pub border_width: f32,
    pub content_alpha: f32,
    pub inner_shadow: f32,
    /// 0 when the appearance mode ignores the slider.
    pub dark_adjust: f32,
    pub mono_adjust: f32,
}

impl GlassParams {
    pub fn new(input: &GlassInput<'_>) -> Self {
        let size = input.size();
        let edge = size as f32;
        let glass = input.glass;
        let translucency = glass.translucency_factor();
        let mode = input.appearance;

        Self {
            size,
            light: light_vector(input.light_angle),
            blur_radius: match glass.blur.amount() {
                Some(amount) => amount * MAX_BLUR * edge,
                None => BASELINE_BLUR * edge,
            },
            translucency,
            tint: if mode.is_dark() {
                [0.05, 0.07, 0.14]
            } else {
                [0.94, 0.97, 1.0]
            },
            specular: glass.specular_enabled,
            shadow: glass.shadow.amount().map(|amount| (glass.shadow.kind, amount)),
            shadow_offset: SHADOW_OFFSET * edge,
            shadow_blur: SHADOW_BLUR * edge,
            aberration: ABERRATION_STRENGTH * edge,
            border_width: (BORDER_WIDTH * edge).max(1.0),
            content_alpha: (1.0 - translucency * 0.6).max(MIN_CONTENT_ALPHA),
            inner_shadow: if mode.is_dark() { 0.32 } else { 0.18 },
            dark_adjust: adjust_amount(mode.applies_dark_adjust(), glass.dark_adjust.amount()),
            mono_adjust: adjust_amount(mode.applies_mono_adjust(), glass.mono_adjust.amount()),
        }
    }

    pub(crate) fn tint_color(&self, alpha: f32) -> SkiaColor {
        let [r, g, b] = self.tint;
        SkiaColor::from_rgba(r, g, b, alpha.clamp(0.0, 1.0)).unwrap_or(SkiaColor::TRANSPARENT)
    }
}

fn adjust_amount(applies: bool, amount: Option<f32>) -> f32 {
    if applies { amount.unwrap_or(0.0) } else { 0.0 }
}

/// Shadow silhouette colors: `(r, g, b, alpha per unit strength)`.
pub(crate) const NEUTRAL_SHADOW: (u8, u8, u8, f32) = (0, 0, 0, 0.5);
pub(crate) const CHROMATIC_SHADOWS: [(u8, u8, u8, f32); 2] = [(90, 70, 255, 0.45), (255, 60, 170, 0.45)];
/// Dark mode wash and mono mode veil colors (alpha per unit slider).
pub(crate) const DARK_WASH: (u8, u8, u8, f32) = (5, 10, 30, 0.6);
pub(crate) const MONO_VEIL: (u8, u8, u8, f32) = (235, 238, 242, 0.7);

// ============================================================================
// ScratchPool
// ============================================================================

/// Reusable same-size scratch rasters for the CPU passes.
///
/// Buffers are checked out per pass and handed back afterwards. A change of
/// frame size drops the pool.
#[derive(Debug, Default)]
pub struct ScratchPool {
    size: u32,
    free: Vec<Pixmap>,
    allocated: usize,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares the pool for frames of edge `size`.
    pub fn resize(&mut self, size: u32) {
        if size != self.size {
            self.free.clear();
            self.size = size;
        }
    }

    /// Takes a cleared buffer, allocating one if none is free.
    pub fn checkout(&mut self) -> Result<Pixmap, GlassError> {
        if let Some(mut pixmap) = self.free.pop() {
            pixmap.fill(SkiaColor::TRANSPARENT);
            return Ok(pixmap);
        }
        let pixmap = Pixmap::new(self.size, self.size).ok_or(GlassError::Allocation(self.size))?;
        self.allocated += 1;
        Ok(pixmap)
    }

    /// Returns a buffer; wrong-sized buffers are dropped.
    pub fn give_back(&mut self, pixmap: Pixmap) {
        if pixmap.width() == self.size && pixmap.height() == self.size {
            self.free.push(pixmap);
        }
    }

    /// Total buffers allocated over the pool's lifetime.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}
