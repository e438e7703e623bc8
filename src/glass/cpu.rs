//! Raster-op implementation of the glass passes on tiny-skia pixmaps.
//!
//! Blending happens in sRGB space; blurs are three-pass box filters.

use std::time::Instant;

use resvg::tiny_skia::{
    BlendMode as SkiaBlend, Color as SkiaColor, FilterQuality, GradientStop, LinearGradient, Mask,
    Paint, Pixmap, PixmapPaint, Point, RadialGradient, Rect, Shader, SpreadMode, Transform,
};
use tracing::debug;

use super::{
    BackendKind, CHROMATIC_SHADOWS, DARK_WASH, GlassInput, GlassParams, GlassRenderer, MONO_VEIL,
    NEUTRAL_SHADOW, SATURATION_BOOST, ScratchPool,
};
use crate::error::GlassError;
use crate::ops;
use crate::scene::ShadowKind;

const BLUR_PASSES: usize = 3;

/// The always-available glass backend.
#[derive(Debug, Default)]
pub struct CpuGlassRenderer {
    pool: ScratchPool,
    blur_scratch: Vec<u8>,
    soft_edge: Vec<u8>,
}

impl CpuGlassRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GlassRenderer for CpuGlassRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Cpu
    }

    fn render_layer(&mut self, input: &GlassInput<'_>, target: &mut Pixmap) -> Result<(), GlassError> {
        let started = Instant::now();
        let params = GlassParams::new(input);
        let size = params.size;

        let alpha = ops::alpha_channel(input.content);
        if alpha.iter().all(|&a| a == 0) {
            return Ok(());
        }
        let bounds = ops::alpha_bounds(input.content);
        let mask = ops::mask_from_alpha(&alpha, size, size).ok_or(GlassError::Allocation(size))?;
        let rect = frame_rect(size)?;
        self.pool.resize(size);

        if let Some((kind, amount)) = params.shadow {
            self.drop_shadow(input, &params, kind, amount, target)?;
        }

        let sampled = self.sample_background(input, &params)?;
        let mut glass_base = self.refract(&sampled, &alpha, &params)?;
        self.pool.give_back(sampled);

        // Glass base: the refracted backdrop seen through the tint.
        let mut tint = Paint::default();
        tint.set_color(params.tint_color(1.0 - params.translucency));
        glass_base.fill_rect(rect, &tint, Transform::identity(), None);

        let mut body = self.pool.checkout()?;
        body.data_mut().copy_from_slice(input.content.data());
        body.draw_pixmap(
            0,
            0,
            glass_base.as_ref(),
            &pixmap_paint(params.translucency, SkiaBlend::SourceAtop),
            Transform::identity(),
            None,
        );
        body.draw_pixmap(
            0,
            0,
            input.content.as_ref(),
            &pixmap_paint(params.content_alpha, SkiaBlend::SourceOver),
            Transform::identity(),
            None,
        );
        self.pool.give_back(glass_base);

        if params.specular {
            specular(&mut body, &mask, bounds, &params, rect);
        }
        fresnel(&mut body, &mask, &params, rect);
        border(&mut body, &alpha, &params, rect)?;
        inner_shadow(&mut body, bounds, &params, rect);
        mode_adjust(&mut body, &params, rect);

        target.draw_pixmap(
            0,
            0,
            body.as_ref(),
            &pixmap_paint(input.opacity, input.blend_mode.to_skia()),
            Transform::identity(),
            None,
        );
        self.pool.give_back(body);

        debug!(size, elapsed_us = started.elapsed().as_micros() as u64, "cpu glass layer rendered");
        Ok(())
    }
}

// ============================================================================
// Passes
// ============================================================================

impl CpuGlassRenderer {
    /// Content alpha recolored to a flat color.
    fn silhouette(&mut self, content: &Pixmap, (r, g, b): (u8, u8, u8)) -> Result<Pixmap, GlassError> {
        let mut pixmap = self.pool.checkout()?;
        pixmap.data_mut().copy_from_slice(content.data());
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, 255);
        paint.blend_mode = SkiaBlend::SourceIn;
        pixmap.fill_rect(frame_rect(pixmap.width())?, &paint, Transform::identity(), None);
        Ok(pixmap)
    }

    fn drop_shadow(
        &mut self,
        input: &GlassInput<'_>,
        params: &GlassParams,
        kind: ShadowKind,
        amount: f32,
        target: &mut Pixmap,
    ) -> Result<(), GlassError> {
        let d = params.shadow_offset;
        let casts: Vec<((u8, u8, u8, f32), (f32, f32))> = match kind {
            ShadowKind::Neutral => vec![(NEUTRAL_SHADOW, (0.0, d))],
            ShadowKind::Chromatic => vec![(CHROMATIC_SHADOWS[0], (-d, d)), (CHROMATIC_SHADOWS[1], (d, d))],
        };

        let mut shadow = self.pool.checkout()?;
        for (i, ((r, g, b, strength), (dx, dy))) in casts.into_iter().enumerate() {
            let silhouette = self.silhouette(input.content, (r, g, b))?;
            // The second cast lightens where it overlaps the first.
            let blend = if i == 0 { SkiaBlend::SourceOver } else { SkiaBlend::Screen };
            shadow.draw_pixmap(
                0,
                0,
                silhouette.as_ref(),
                &pixmap_paint(strength * amount, blend),
                Transform::from_translate(dx, dy),
                None,
            );
            self.pool.give_back(silhouette);
        }
        ops::box_blur(&mut shadow, &mut self.blur_scratch, params.shadow_blur.round() as u32, BLUR_PASSES);

        target.draw_pixmap(
            0,
            0,
            shadow.as_ref(),
            &pixmap_paint(input.opacity, SkiaBlend::SourceOver),
            Transform::identity(),
            None,
        );
        self.pool.give_back(shadow);
        Ok(())
    }

    /// Blurred, saturation-boosted copy of the background.
    fn sample_background(&mut self, input: &GlassInput<'_>, params: &GlassParams) -> Result<Pixmap, GlassError> {
        let mut sampled = self.pool.checkout()?;
        let bg = input.background;
        if bg.width() == params.size && bg.height() == params.size {
            sampled.data_mut().copy_from_slice(bg.data());
        } else {
            let sx = params.size as f32 / bg.width() as f32;
            let sy = params.size as f32 / bg.height() as f32;
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            sampled.draw_pixmap(0, 0, bg.as_ref(), &paint, Transform::from_scale(sx, sy), None);
        }
        let radius = params.blur_radius.round().max(1.0) as u32;
        ops::box_blur(&mut sampled, &mut self.blur_scratch, radius, BLUR_PASSES);
        ops::saturate(&mut sampled, SATURATION_BOOST);
        Ok(sampled)
    }

    /// Splits R and B along the content's edge normal.
    ///
    /// The shift peaks at the silhouette edge and fades towards the interior;
    /// G stays in place.
    fn refract(&mut self, sampled: &Pixmap, alpha: &[u8], params: &GlassParams) -> Result<Pixmap, GlassError> {
        let size = params.size as usize;
        let edge_radius = (params.aberration.round() as usize).max(1);
        let soft = &mut self.soft_edge;
        soft.clear();
        soft.extend_from_slice(alpha);
        ops::box_blur_buffer(soft, &mut self.blur_scratch, size, size, 1, edge_radius, 2);

        let mut out = self.pool.checkout()?;
        out.data_mut().copy_from_slice(sampled.data());
        let src = sampled.data();
        let dst = out.data_mut();

        for y in 1..size.saturating_sub(1) {
            for x in 1..size - 1 {
                let i = y * size + x;
                if alpha[i] == 0 {
                    continue;
                }
                let gx = f32::from(soft[i + 1]) - f32::from(soft[i - 1]);
                let gy = f32::from(soft[i + size]) - f32::from(soft[i - size]);
                let len = (gx * gx + gy * gy).sqrt();
                if len < 1e-3 {
                    continue;
                }
                // Coverage grows inward, so the outward normal is the negated gradient.
                let (nx, ny) = (-gx / len, -gy / len);
                let shift = params.aberration * (1.0 - f32::from(soft[i]) / 255.0);
                let (fx, fy) = (x as f32, y as f32);
                let a = dst[i * 4 + 3];
                dst[i * 4] = sample_channel(src, size, fx + nx * shift, fy + ny * shift, 0).min(a);
                dst[i * 4 + 2] = sample_channel(src, size, fx - nx * shift, fy - ny * shift, 2).min(a);
            }
        }
        Ok(out)
    }
}

/// Sharpened radial highlight toward the light plus a strip along the top.
fn specular(body: &mut Pixmap, mask: &Mask, bounds: Option<(u32, u32, u32, u32)>, params: &GlassParams, rect: Rect) {
    let edge = params.size as f32;
    let half = edge / 2.0;
    let (lx, ly) = params.light;
    let center = Point::from_xy(half + lx * 0.3 * half, half + ly * 0.3 * half);

    // (1 - t)^5 sampled at a handful of stops.
    let stops = [0.0f32, 0.1, 0.2, 0.3, 0.45, 0.6, 1.0]
        .iter()
        .map(|&t| GradientStop::new(t, white(0.6 * (1.0 - t).powi(5))))
        .collect();
    if let Some(shader) = RadialGradient::new(center, center, 0.75 * edge, stops, SpreadMode::Pad, Transform::identity()) {
        fill_masked(body, rect, shader, SkiaBlend::Screen, Some(mask));
    }

    let Some((x0, y0, x1, y1)) = bounds else {
        return;
    };
    let strip_height = (y1 - y0) as f32 * 0.22;
    let Some(strip) = Rect::from_xywh(x0 as f32, y0 as f32, (x1 - x0) as f32, strip_height) else {
        return;
    };
    let shader = LinearGradient::new(
        Point::from_xy(0.0, y0 as f32),
        Point::from_xy(0.0, y0 as f32 + strip_height),
        vec![GradientStop::new(0.0, white(0.35)), GradientStop::new(1.0, white(0.0))],
        SpreadMode::Pad,
        Transform::identity(),
    );
    if let Some(shader) = shader {
        fill_masked(body, strip, shader, SkiaBlend::Screen, Some(mask));
    }
}

/// Rim light brightest on the lit edge of the frame.
fn fresnel(body: &mut Pixmap, mask: &Mask, params: &GlassParams, rect: Rect) {
    let (start, end) = light_axis(params);
    let stops = vec![
        GradientStop::new(0.0, white(0.42)),
        GradientStop::new(0.35, white(0.06)),
        GradientStop::new(1.0, white(0.0)),
    ];
    if let Some(shader) = LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity()) {
        fill_masked(body, rect, shader, SkiaBlend::Screen, Some(mask));
    }
}

/// Thin edge ring, lit side bright and shadow side dim.
fn border(body: &mut Pixmap, alpha: &[u8], params: &GlassParams, rect: Rect) -> Result<(), GlassError> {
    let size = params.size;
    let width = params.border_width.round() as usize;
    let eroded = ops::erode(alpha, size as usize, size as usize, width);
    let ring: Vec<u8> = alpha.iter().zip(&eroded).map(|(a, e)| a.saturating_sub(*e)).collect();
    let ring = ops::mask_from_alpha(&ring, size, size).ok_or(GlassError::Allocation(size))?;

    let (start, end) = light_axis(params);
    let stops = vec![GradientStop::new(0.0, white(0.85)), GradientStop::new(1.0, white(0.2))];
    if let Some(shader) = LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity()) {
        fill_masked(body, rect, shader, SkiaBlend::Screen, Some(&ring));
    }
    Ok(())
}

/// Darkens from ~42% of the shape's half-diagonal outward.
fn inner_shadow(body: &mut Pixmap, bounds: Option<(u32, u32, u32, u32)>, params: &GlassParams, rect: Rect) {
    let Some((x0, y0, x1, y1)) = bounds else {
        return;
    };
    let (w, h) = ((x1 - x0) as f32, (y1 - y0) as f32);
    let center = Point::from_xy(x0 as f32 + w / 2.0, y0 as f32 + h / 2.0);
    let half_diagonal = (w * w + h * h).sqrt() / 2.0;
    let stops = vec![
        GradientStop::new(0.42, black(0.0)),
        GradientStop::new(1.0, black(params.inner_shadow)),
    ];
    // Source-atop keeps the body's alpha, so this scales color only.
    if let Some(shader) =
        RadialGradient::new(center, center, half_diagonal.max(1.0), stops, SpreadMode::Pad, Transform::identity())
    {
        fill_masked(body, rect, shader, SkiaBlend::SourceAtop, None);
    }
}

fn mode_adjust(body: &mut Pixmap, params: &GlassParams, rect: Rect) {
    for (amount, (r, g, b, strength)) in [(params.dark_adjust, DARK_WASH), (params.mono_adjust, MONO_VEIL)] {
        if amount <= 0.0 {
            continue;
        }
        let color = SkiaColor::from_rgba8(r, g, b, unit_to_u8(amount * strength));
        fill_masked(body, rect, Shader::SolidColor(color), SkiaBlend::SourceAtop, None);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn frame_rect(size: u32) -> Result<Rect, GlassError> {
    Rect::from_xywh(0.0, 0.0, size as f32, size as f32).ok_or(GlassError::Allocation(size))
}

/// Endpoints of the light axis across the frame, lit end first.
fn light_axis(params: &GlassParams) -> (Point, Point) {
    let half = params.size as f32 / 2.0;
    let (lx, ly) = params.light;
    (
        Point::from_xy(half + lx * half, half + ly * half),
        Point::from_xy(half - lx * half, half - ly * half),
    )
}

fn fill_masked(pixmap: &mut Pixmap, rect: Rect, shader: Shader<'_>, blend_mode: SkiaBlend, mask: Option<&Mask>) {
    let paint = Paint {
        shader,
        blend_mode,
        anti_alias: true,
        ..Paint::default()
    };
    pixmap.fill_rect(rect, &paint, Transform::identity(), mask);
}

fn pixmap_paint(opacity: f32, blend_mode: SkiaBlend) -> PixmapPaint {
    PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        blend_mode,
        quality: FilterQuality::Nearest,
    }
}

fn unit_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn white(alpha: f32) -> SkiaColor {
    SkiaColor::from_rgba8(255, 255, 255, unit_to_u8(alpha))
}

fn black(alpha: f32) -> SkiaColor {
    SkiaColor::from_rgba8(0, 0, 0, unit_to_u8(alpha))
}

/// Bilinear sample of one channel with clamped coordinates.
fn sample_channel(data: &[u8], size: usize, x: f32, y: f32, channel: usize) -> u8 {
    let max = (size - 1) as f32;
    let (x, y) = (x.clamp(0.0, max), y.clamp(0.0, max));
    let (x0, y0) = (x.floor() as usize, y.floor() as usize);
    let (x1, y1) = ((x0 + 1).min(size - 1), (y0 + 1).min(size - 1));
    let (fx, fy) = (x - x0 as f32, y - y0 as f32);
    let at = |xx: usize, yy: usize| f32::from(data[(yy * size + xx) * 4 + channel]);
    let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
    let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;
    (top * (1.0 - fy) + bottom * fy).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::rasterize_layer;
    use crate::scene::{Adjustment, AppearanceMode, BlendMode, Color, Fill, GlassConfig, Layer, Layout, ShadowConfig};

    const SIZE: u32 = 48;

    fn content() -> Pixmap {
        let layer = Layer::content("glass")
            .with_fill(Fill::solid(Color::rgb(240, 120, 40)))
            .with_layout(Layout::new(0.0, 0.0, 50.0));
        rasterize_layer(&layer, None, SIZE).unwrap()
    }

    fn background() -> Pixmap {
        let mut bg = Pixmap::new(SIZE, SIZE).unwrap();
        bg.fill(SkiaColor::from_rgba8(30, 90, 200, 255));
        bg
    }

    fn render(glass: &GlassConfig, light_angle: f32, appearance: AppearanceMode) -> Pixmap {
        let content = content();
        let bg = background();
        let mut target = bg.clone();
        let input = GlassInput {
            content: &content,
            background: &bg,
            glass,
            light_angle,
            appearance,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
        };
        CpuGlassRenderer::new().render_layer(&input, &mut target).unwrap();
        target
    }

    fn no_shadow() -> GlassConfig {
        GlassConfig {
            shadow: ShadowConfig {
                enabled: false,
                ..ShadowConfig::default()
            },
            ..GlassConfig::default()
        }
    }

    #[test]
    fn transparent_content_leaves_target_untouched() {
        let content = Pixmap::new(SIZE, SIZE).unwrap();
        let bg = background();
        let mut target = bg.clone();
        let glass = GlassConfig::default();
        let input = GlassInput {
            content: &content,
            background: &bg,
            glass: &glass,
            light_angle: 0.0,
            appearance: AppearanceMode::Default,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
        };
        CpuGlassRenderer::new().render_layer(&input, &mut target).unwrap();
        assert_eq!(target.data(), bg.data());
    }

    #[test]
    fn glass_stays_inside_content_without_shadow() {
        let out = render(&no_shadow(), 0.0, AppearanceMode::Default);
        let bg = background();
        assert_eq!(out.pixel(2, 2), bg.pixel(2, 2));
        assert_eq!(out.pixel(45, 45), bg.pixel(45, 45));
        assert_ne!(out.pixel(24, 24), bg.pixel(24, 24));
    }

    #[test]
    fn shadow_falls_below_content() {
        let out = render(&GlassConfig::default(), 0.0, AppearanceMode::Default);
        let bg = background();
        // Content spans 12..36; the shadow is offset downward.
        let below = out.pixel(24, 37).unwrap();
        let above = out.pixel(24, 10).unwrap();
        assert!(below.blue() < bg.pixel(24, 37).unwrap().blue());
        assert!(above.blue() >= below.blue());
    }

    #[test]
    fn chromatic_shadow_is_colored() {
        let mut glass = GlassConfig::default();
        glass.shadow.kind = ShadowKind::Chromatic;
        glass.shadow.value = 100.0;
        let neutral = render(&GlassConfig::default(), 0.0, AppearanceMode::Default);
        let chromatic = render(&glass, 0.0, AppearanceMode::Default);
        assert_ne!(neutral.pixel(24, 38), chromatic.pixel(24, 38));
    }

    #[test]
    fn specular_toggle_changes_output() {
        let on = render(&no_shadow(), 0.0, AppearanceMode::Default);
        let mut glass = no_shadow();
        glass.specular_enabled = false;
        let off = render(&glass, 0.0, AppearanceMode::Default);
        assert_ne!(on.data(), off.data());
    }

    #[test]
    fn light_angle_is_periodic() {
        let a = render(&no_shadow(), 30.0, AppearanceMode::Default);
        let b = render(&no_shadow(), 390.0, AppearanceMode::Default);
        let c = render(&no_shadow(), 210.0, AppearanceMode::Default);
        assert_eq!(a.data(), b.data());
        assert_ne!(a.data(), c.data());
    }

    #[test]
    fn dark_mode_darkens_glass() {
        let light = render(&no_shadow(), 0.0, AppearanceMode::Default);
        let dark = render(&no_shadow(), 0.0, AppearanceMode::Dark);
        let l = light.pixel(24, 24).unwrap();
        let d = dark.pixel(24, 24).unwrap();
        assert!(u32::from(d.red()) + u32::from(d.green()) < u32::from(l.red()) + u32::from(l.green()));
    }

    fn params_for(content: &Pixmap, light_angle: f32, appearance: AppearanceMode) -> GlassParams {
        let glass = no_shadow();
        let input = GlassInput {
            content,
            background: content,
            glass: &glass,
            light_angle,
            appearance,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
        };
        GlassParams::new(&input)
    }

    /// Mid-gray square covering 16..48 of a 64px frame.
    fn gray_body() -> Pixmap {
        let layer = Layer::content("body")
            .with_fill(Fill::solid(Color::rgb(100, 100, 100)))
            .with_layout(Layout::new(0.0, 0.0, 50.0));
        rasterize_layer(&layer, None, 64).unwrap()
    }

    #[test]
    fn refraction_splits_red_and_blue_at_the_edge() {
        const EDGE: u32 = 256;
        let mut content = Pixmap::new(EDGE, EDGE).unwrap();
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 255, 255, 255);
        content.fill_rect(Rect::from_xywh(64.0, 0.0, 192.0, 256.0).unwrap(), &paint, Transform::identity(), None);
        let alpha = ops::alpha_channel(&content);

        // Gray ramp: every channel equals the column index.
        let mut sampled = Pixmap::new(EDGE, EDGE).unwrap();
        for (i, px) in sampled.data_mut().chunks_exact_mut(4).enumerate() {
            let v = (i % EDGE as usize) as u8;
            px.copy_from_slice(&[v, v, v, 255]);
        }

        let params = params_for(&content, 0.0, AppearanceMode::Default);
        let mut renderer = CpuGlassRenderer::new();
        renderer.pool.resize(EDGE);
        let out = renderer.refract(&sampled, &alpha, &params).unwrap();

        // The outward normal at the left edge points to -x.
        let edge = out.pixel(64, 128).unwrap();
        assert!(edge.red() < 64, "red {}", edge.red());
        assert!(edge.blue() > 64, "blue {}", edge.blue());
        assert_eq!(edge.green(), 64);

        let interior = out.pixel(128, 128).unwrap();
        assert_eq!((interior.red(), interior.green(), interior.blue()), (128, 128, 128));
        let outside = out.pixel(10, 128).unwrap();
        assert_eq!((outside.red(), outside.green(), outside.blue()), (10, 10, 10));
    }

    #[test]
    fn border_ring_is_brighter_on_the_lit_side() {
        let mut body = gray_body();
        let alpha = ops::alpha_channel(&body);
        let params = params_for(&body, 0.0, AppearanceMode::Default);
        border(&mut body, &alpha, &params, frame_rect(64).unwrap()).unwrap();

        let lit = body.pixel(32, 16).unwrap();
        let shaded = body.pixel(32, 47).unwrap();
        assert!(lit.red() > shaded.red(), "lit {} shaded {}", lit.red(), shaded.red());
        assert!(shaded.red() > 100);
        assert_eq!(body.pixel(32, 32).unwrap().red(), 100);
    }

    #[test]
    fn inner_shadow_darkens_edges_not_center() {
        let mut body = gray_body();
        let bounds = ops::alpha_bounds(&body);
        let params = params_for(&body, 0.0, AppearanceMode::Default);
        inner_shadow(&mut body, bounds, &params, frame_rect(64).unwrap());

        let corner = body.pixel(16, 16).unwrap();
        let center = body.pixel(32, 32).unwrap();
        assert!(u32::from(center.red()).abs_diff(100) <= 1);
        assert!(corner.red() + 10 < center.red(), "corner {} center {}", corner.red(), center.red());
        assert_eq!(corner.alpha(), 255);
    }

    #[test]
    fn mono_veil_lightens_clear_light_glass() {
        let veiled = render(&no_shadow(), 0.0, AppearanceMode::ClearLight);
        let mut glass = no_shadow();
        glass.mono_adjust = Adjustment::off();
        let plain = render(&glass, 0.0, AppearanceMode::ClearLight);

        let v = veiled.pixel(24, 24).unwrap();
        let p = plain.pixel(24, 24).unwrap();
        assert!(u32::from(v.green()) + u32::from(v.blue()) > u32::from(p.green()) + u32::from(p.blue()));
        // The slider is ignored outside the clear modes.
        let default_on = render(&no_shadow(), 0.0, AppearanceMode::Default);
        let default_off = render(&glass, 0.0, AppearanceMode::Default);
        assert_eq!(default_on.data(), default_off.data());
    }

    #[test]
    fn bilinear_sample_interpolates() {
        let data = [0u8, 0, 0, 255, 200, 0, 0, 255, 0, 0, 0, 255, 200, 0, 0, 255];
        assert_eq!(sample_channel(&data, 2, 0.5, 0.0, 0), 100);
        assert_eq!(sample_channel(&data, 2, 5.0, -3.0, 0), 200);
    }
}
