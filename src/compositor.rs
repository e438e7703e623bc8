//! Frame composition: background, layers and groups, squircle clip, rim.

use std::time::Instant;

use resvg::tiny_skia::{
    BlendMode as SkiaBlend, Color as SkiaColor, FillRule, FilterQuality, GradientStop, LinearGradient,
    Mask, Paint, Pixmap, PixmapPaint, Point, SpreadMode, Stroke, Transform,
};
use tracing::{debug, warn};

use crate::assets::ImageCache;
use crate::background::synthesize_background;
use crate::config::BackendPreference;
use crate::error::RenderError;
use crate::geometry::{frame_squircle, light_vector};
use crate::glass::{BackendKind, CpuGlassRenderer, GlassInput, GlassRenderer, select_renderer};
use crate::ops;
use crate::raster::rasterize_layer;
use crate::scene::{Layer, Scene};

/// Rim stroke width as a fraction of the frame edge.
pub const RIM_WIDTH: f32 = 0.006;

/// The glass backend in use plus the CPU backend it falls back to.
pub struct GlassBackends {
    primary: Box<dyn GlassRenderer>,
    fallback: CpuGlassRenderer,
    /// Frame-sized buffer each layer renders into before it is swapped in.
    spare: Option<Pixmap>,
}

impl GlassBackends {
    pub fn new(preference: BackendPreference) -> Self {
        Self::with_primary(select_renderer(preference))
    }

    pub fn with_primary(primary: Box<dyn GlassRenderer>) -> Self {
        Self {
            primary,
            fallback: CpuGlassRenderer::new(),
            spare: None,
        }
    }

    pub fn primary_kind(&self) -> BackendKind {
        self.primary.kind()
    }

    /// Renders one glass layer, retrying on the CPU when the primary fails.
    ///
    /// `target` is only modified by a successful attempt; when every backend
    /// fails the layer is skipped.
    fn render_layer(&mut self, layer: &Layer, input: &GlassInput<'_>, target: &mut Pixmap) {
        let Some(mut attempt) = self.take_spare(target) else {
            warn!(layer = %layer.id, size = target.width(), "no scratch frame for glass layer; skipping");
            return;
        };

        let mut rendered = match self.primary.render_layer(input, &mut attempt) {
            Ok(()) => true,
            Err(e) => {
                warn!(layer = %layer.id, backend = %self.primary.kind(), error = %e, "glass layer failed");
                false
            }
        };
        if !rendered && self.primary.kind() != BackendKind::Cpu {
            attempt.data_mut().copy_from_slice(target.data());
            rendered = match self.fallback.render_layer(input, &mut attempt) {
                Ok(()) => {
                    debug!(layer = %layer.id, "glass layer rendered by cpu fallback");
                    true
                }
                Err(e) => {
                    warn!(layer = %layer.id, error = %e, "cpu fallback failed; skipping layer");
                    false
                }
            };
        }

        if rendered {
            std::mem::swap(target, &mut attempt);
        }
        self.spare = Some(attempt);
    }

    /// The spare buffer holding a copy of `target`, reallocated on resize.
    fn take_spare(&mut self, target: &Pixmap) -> Option<Pixmap> {
        let mut spare = match self.spare.take() {
            Some(spare) if spare.width() == target.width() && spare.height() == target.height() => spare,
            _ => Pixmap::new(target.width(), target.height())?,
        };
        spare.data_mut().copy_from_slice(target.data());
        Some(spare)
    }
}

/// Renders `scene` into a premultiplied `size`×`size` frame.
pub fn compose_frame(
    scene: &Scene,
    size: u32,
    backends: &mut GlassBackends,
    images: &mut ImageCache,
) -> Result<Pixmap, RenderError> {
    if size == 0 {
        return Err(RenderError::InvalidOutputSize(size));
    }
    let started = Instant::now();
    let background = synthesize_background(scene.background(), scene.appearance(), size)?;
    let mut frame = background.clone();
    let mut ctx = LayerContext {
        scene,
        size,
        background: &background,
        backends,
        images,
    };

    let tree = scene.tree();
    for &index in tree.roots() {
        let Some(layer) = scene.layer(index) else { continue };
        if !layer.visible {
            continue;
        }
        if !layer.is_group() {
            ctx.draw_content(layer, &mut frame)?;
            continue;
        }

        // Children merge at full strength; the group fades once as a whole.
        let mut group = Pixmap::new(size, size).ok_or(RenderError::Allocation(size))?;
        for &child in tree.children(index) {
            match scene.layer(child) {
                Some(child) if child.visible => ctx.draw_content(child, &mut group)?,
                _ => {}
            }
        }
        frame.draw_pixmap(
            0,
            0,
            group.as_ref(),
            &layer_paint(layer.opacity_factor(), layer.blend_mode.to_skia()),
            Transform::identity(),
            None,
        );
    }

    clip_to_squircle(&mut frame, size)?;
    stroke_rim(&mut frame, size, scene.light_angle());
    if scene.appearance().desaturates() {
        ops::grayscale(&mut frame);
    }

    debug!(
        size,
        layers = scene.layers().len(),
        mode = ?scene.appearance(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "frame composed"
    );
    Ok(frame)
}

struct LayerContext<'a> {
    scene: &'a Scene,
    size: u32,
    background: &'a Pixmap,
    backends: &'a mut GlassBackends,
    images: &'a mut ImageCache,
}

impl LayerContext<'_> {
    fn draw_content(&mut self, layer: &Layer, target: &mut Pixmap) -> Result<(), RenderError> {
        let bitmap = layer.bitmap.as_deref().and_then(|source| self.images.resolve(source));
        let content = rasterize_layer(layer, bitmap.as_deref(), self.size)
            .ok_or(RenderError::Allocation(self.size))?;
        if ops::is_transparent(&content) {
            return Ok(());
        }

        if !layer.glass.enabled {
            target.draw_pixmap(
                0,
                0,
                content.as_ref(),
                &layer_paint(layer.opacity_factor(), layer.blend_mode.to_skia()),
                Transform::identity(),
                None,
            );
            return Ok(());
        }

        let input = GlassInput {
            content: &content,
            background: self.background,
            glass: &layer.glass,
            light_angle: self.scene.light_angle(),
            appearance: self.scene.appearance(),
            opacity: layer.opacity_factor(),
            blend_mode: layer.blend_mode,
        };
        self.backends.render_layer(layer, &input, target);
        Ok(())
    }
}

fn layer_paint(opacity: f32, blend_mode: SkiaBlend) -> PixmapPaint {
    PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        blend_mode,
        quality: FilterQuality::Nearest,
    }
}

fn clip_to_squircle(frame: &mut Pixmap, size: u32) -> Result<(), RenderError> {
    let path = frame_squircle(size).to_path().ok_or(RenderError::Allocation(size))?;
    let mut mask = Mask::new(size, size).ok_or(RenderError::Allocation(size))?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    frame.apply_mask(&mask);
    Ok(())
}

/// Strokes the outline with a light-axis gradient, independent of any layer.
fn stroke_rim(frame: &mut Pixmap, size: u32, light_angle: f32) {
    let Some(path) = frame_squircle(size).to_path() else {
        return;
    };
    let half = size as f32 / 2.0;
    let (lx, ly) = light_vector(light_angle);
    let shader = LinearGradient::new(
        Point::from_xy(half + lx * half, half + ly * half),
        Point::from_xy(half - lx * half, half - ly * half),
        vec![
            GradientStop::new(0.0, SkiaColor::from_rgba8(255, 255, 255, 140)),
            GradientStop::new(1.0, SkiaColor::from_rgba8(255, 255, 255, 20)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );
    let Some(shader) = shader else {
        return;
    };
    let paint = Paint {
        shader,
        blend_mode: SkiaBlend::Screen,
        anti_alias: true,
        ..Paint::default()
    };
    let stroke = Stroke {
        width: (RIM_WIDTH * size as f32).max(1.0),
        ..Stroke::default()
    };
    frame.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}
