//! Raster filter operations shared by the CPU glass backend and the compositor.
//!
//! Pixmaps are premultiplied RGBA8 (tiny-skia's layout). Filters that are
//! linear in the color channels (blur, saturation) run directly on the
//! premultiplied values; the rest demultiply first.

use image::{Rgba, RgbaImage};
use palette::{LinSrgb, Srgb};
use resvg::tiny_skia::{ColorU8, Mask, Pixmap};

/// Rec. 709 luma weights.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

// ============================================================================
// Conversion
// ============================================================================

/// Converts a premultiplied pixmap to a straight-alpha RGBA image.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Converts a straight-alpha RGBA image into a premultiplied pixmap.
///
/// Returns `None` for an empty image.
pub fn rgba_image_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Builds a coverage mask from an 8-bit alpha plane.
pub fn mask_from_alpha(alpha: &[u8], width: u32, height: u32) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    if alpha.len() != mask.data().len() {
        return None;
    }
    mask.data_mut().copy_from_slice(alpha);
    Some(mask)
}

// ============================================================================
// Analysis
// ============================================================================

/// Extracts the alpha plane of a pixmap.
pub fn alpha_channel(pixmap: &Pixmap) -> Vec<u8> {
    pixmap.pixels().iter().map(|p| p.alpha()).collect()
}

/// True when every pixel is fully transparent.
pub fn is_transparent(pixmap: &Pixmap) -> bool {
    pixmap.pixels().iter().all(|p| p.alpha() == 0)
}

/// Bounds of the non-transparent pixels as `(x0, y0, x1, y1)`, exclusive end.
pub fn alpha_bounds(pixmap: &Pixmap) -> Option<(u32, u32, u32, u32)> {
    let width = pixmap.width() as usize;
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, p) in pixmap.pixels().iter().enumerate() {
        if p.alpha() == 0 {
            continue;
        }
        let (x, y) = ((i % width) as u32, (i / width) as u32);
        bounds = Some(match bounds {
            None => (x, y, x + 1, y + 1),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
        });
    }
    bounds
}

// ============================================================================
// Blur
// ============================================================================

/// Box-blurs an interleaved buffer along one line with clamped edges.
fn blur_line(
    src: &[u8],
    dst: &mut [u8],
    start: usize,
    step: usize,
    len: usize,
    radius: usize,
    channels: usize,
) {
    let window = (2 * radius + 1) as u32;
    let at = |i: isize| start + (i.clamp(0, len as isize - 1) as usize) * step;

    for c in 0..channels {
        let mut sum: u32 = (-(radius as isize)..=radius as isize)
            .map(|i| u32::from(src[at(i) + c]))
            .sum();
        for x in 0..len {
            dst[start + x * step + c] = ((sum + window / 2) / window) as u8;
            let add = at(x as isize + radius as isize + 1);
            let sub = at(x as isize - radius as isize);
            sum = sum + u32::from(src[add + c]) - u32::from(src[sub + c]);
        }
    }
}

/// Separable box blur over an interleaved `width`×`height` buffer.
///
/// `passes` repetitions of a box filter converge towards a Gaussian.
/// `scratch` is resized to fit and keeps its capacity between calls.
pub fn box_blur_buffer(
    data: &mut [u8],
    scratch: &mut Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
    radius: usize,
    passes: usize,
) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    scratch.resize(data.len(), 0);
    for _ in 0..passes {
        for y in 0..height {
            blur_line(data, &mut scratch[..], y * width * channels, channels, width, radius, channels);
        }
        for x in 0..width {
            blur_line(&scratch[..], data, x * channels, width * channels, height, radius, channels);
        }
    }
}

/// Blurs a premultiplied pixmap in place.
pub fn box_blur(pixmap: &mut Pixmap, scratch: &mut Vec<u8>, radius: u32, passes: usize) {
    let (w, h) = (pixmap.width() as usize, pixmap.height() as usize);
    box_blur_buffer(pixmap.data_mut(), scratch, w, h, 4, radius as usize, passes);
}

// ============================================================================
// Morphology
// ============================================================================

/// Erodes an alpha plane with a square structuring element of `radius`.
pub fn erode(alpha: &[u8], width: usize, height: usize, radius: usize) -> Vec<u8> {
    if radius == 0 || width == 0 || height == 0 {
        return alpha.to_vec();
    }
    let mut rows = vec![0u8; alpha.len()];
    for y in 0..height {
        let row = &alpha[y * width..(y + 1) * width];
        for x in 0..width {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius).min(width - 1);
            // Pixels past the border count as transparent.
            let edge = x < radius || x + radius >= width;
            let min = row[lo..=hi].iter().copied().min().unwrap_or(0);
            rows[y * width + x] = if edge { 0 } else { min };
        }
    }
    let mut out = vec![0u8; alpha.len()];
    for x in 0..width {
        for y in 0..height {
            let edge = y < radius || y + radius >= height;
            let min = (y.saturating_sub(radius)..=(y + radius).min(height - 1))
                .map(|yy| rows[yy * width + x])
                .min()
                .unwrap_or(0);
            out[y * width + x] = if edge { 0 } else { min };
        }
    }
    out
}

// ============================================================================
// Color
// ============================================================================

/// Scales saturation around Rec. 709 luma. `factor > 1` boosts color.
pub fn saturate(pixmap: &mut Pixmap, factor: f32) {
    for px in pixmap.data_mut().chunks_exact_mut(4) {
        let a = f32::from(px[3]);
        if a == 0.0 {
            continue;
        }
        let (r, g, b) = (f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        let luma = LUMA[0] * r + LUMA[1] * g + LUMA[2] * b;
        for (channel, value) in px[..3].iter_mut().zip([r, g, b]) {
            *channel = (luma + (value - luma) * factor).round().clamp(0.0, a) as u8;
        }
    }
}

/// Converts to grayscale, preserving relative luminance in linear light.
pub fn grayscale(pixmap: &mut Pixmap) {
    let to_linear: Vec<f32> = (0..=255u8)
        .map(|v| Srgb::new(v, v, v).into_format::<f32>().into_linear().red)
        .collect();

    for px in pixmap.pixels_mut() {
        let c = px.demultiply();
        if c.alpha() == 0 {
            continue;
        }
        let y = LUMA[0] * to_linear[usize::from(c.red())]
            + LUMA[1] * to_linear[usize::from(c.green())]
            + LUMA[2] * to_linear[usize::from(c.blue())];
        let gray: Srgb<u8> = Srgb::<f32>::from_linear(LinSrgb::new(y, y, y)).into_format();
        *px = ColorU8::from_rgba(gray.red, gray.green, gray.blue, c.alpha()).premultiply();
    }
}
