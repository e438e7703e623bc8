//! Background raster synthesis.

use resvg::tiny_skia::{
    GradientStop, LinearGradient, Paint, Pixmap, Point, Rect, Shader, SpreadMode, Transform,
};

use crate::error::RenderError;
use crate::geometry::light_vector;
use crate::scene::{AppearanceMode, BackgroundKind, BackgroundSpec, Color};

/// Renders the backdrop for a frame of edge `size`, mode overlay included.
///
/// The gradient axis passes through the frame center; its end stops sit on
/// the bounding circle so every angle fully covers the square.
pub fn synthesize_background(
    spec: &BackgroundSpec,
    mode: AppearanceMode,
    size: u32,
) -> Result<Pixmap, RenderError> {
    let mut pixmap = Pixmap::new(size, size).ok_or(RenderError::Allocation(size))?;
    let rect = Rect::from_xywh(0.0, 0.0, size as f32, size as f32)
        .ok_or(RenderError::Allocation(size))?;

    let mut paint = Paint::default();
    paint.shader = background_shader(spec, size as f32);
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);

    if let Some(tint) = mode_overlay(spec, mode) {
        let mut paint = Paint::default();
        paint.set_color(tint.to_skia());
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    Ok(pixmap)
}

fn background_shader(spec: &BackgroundSpec, size: f32) -> Shader<'static> {
    let solid = Shader::SolidColor(spec.primary_color().to_skia());
    if spec.kind == BackgroundKind::Solid || spec.colors.len() < 2 {
        return solid;
    }

    let half = size / 2.0;
    let radius = (2.0 * size * size).sqrt() / 2.0;
    let (dx, dy) = light_vector(spec.angle);
    let start = Point::from_xy(half - dx * radius, half - dy * radius);
    let end = Point::from_xy(half + dx * radius, half + dy * radius);

    let last = (spec.colors.len() - 1) as f32;
    let stops = spec
        .colors
        .iter()
        .enumerate()
        .map(|(i, c)| GradientStop::new(i as f32 / last, c.to_skia()))
        .collect();

    LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity()).unwrap_or(solid)
}

/// The flat tint each appearance mode lays over the backdrop.
fn mode_overlay(spec: &BackgroundSpec, mode: AppearanceMode) -> Option<Color> {
    match mode {
        AppearanceMode::Default => None,
        AppearanceMode::Dark => Some(Color::rgb(8, 8, 12).scale_alpha(0.55)),
        AppearanceMode::TintedLight => Some(Color::from_hsl(spec.hue(), 0.55, 0.6).scale_alpha(0.45)),
        AppearanceMode::TintedDark => Some(Color::from_hsl(spec.hue(), 0.5, 0.2).scale_alpha(0.55)),
        AppearanceMode::ClearLight => Some(Color::WHITE.scale_alpha(0.35)),
        AppearanceMode::ClearDark => Some(Color::BLACK.scale_alpha(0.45)),
    }
}
