//! Content rasterization: one layer's fill and bitmap in frame space.

use resvg::tiny_skia::{
    FilterQuality, GradientStop, LinearGradient, Paint, Pixmap, PixmapPaint, Point, Rect, Shader,
    SpreadMode, Transform,
};

use crate::scene::{Fill, Layer, Layout};

/// Maps the layer's unit square (`0..size`) into the frame.
///
/// Scaling happens about the frame center, then the offset (percent of the
/// frame edge) is applied.
pub fn layout_transform(layout: &Layout, size: u32) -> Transform {
    let layout = layout.clamped();
    let edge = size as f32;
    let half = edge / 2.0;
    let scale = layout.scale / 100.0;
    Transform::from_translate(half + layout.x / 100.0 * edge, half + layout.y / 100.0 * edge)
        .pre_scale(scale, scale)
        .pre_translate(-half, -half)
}

/// Renders `layer`'s fill and bitmap into a transparent `size`×`size` raster.
///
/// The fill is painted first so the bitmap sits on top of it. A missing
/// bitmap leaves just the fill; a layer without either stays fully
/// transparent. Returns `None` only if the raster cannot be allocated.
pub fn rasterize_layer(layer: &Layer, bitmap: Option<&Pixmap>, size: u32) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(size, size)?;
    let transform = layout_transform(&layer.layout, size);
    let edge = size as f32;

    if let Some(shader) = fill_shader(&layer.fill, edge) {
        let rect = Rect::from_xywh(0.0, 0.0, edge, edge)?;
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        pixmap.fill_rect(rect, &paint, transform, None);
    }

    if let Some(bitmap) = bitmap {
        let (w, h) = (bitmap.width() as f32, bitmap.height() as f32);
        let fit = edge / w.max(h);
        let placed = transform
            .pre_translate((edge - w * fit) / 2.0, (edge - h * fit) / 2.0)
            .pre_scale(fit, fit);
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, bitmap.as_ref(), &paint, placed, None);
    }

    Some(pixmap)
}

fn fill_shader(fill: &Fill, edge: f32) -> Option<Shader<'static>> {
    match fill {
        Fill::None => None,
        Fill::Solid { color } => Some(Shader::SolidColor(color.to_skia())),
        Fill::LinearGradient { stops } => {
            let ordered = Fill::ordered_stops(stops);
            match ordered.as_slice() {
                [] => None,
                [only] => Some(Shader::SolidColor(only.color.to_skia())),
                _ => {
                    let stops = ordered
                        .iter()
                        .map(|s| GradientStop::new(s.offset, s.color.to_skia()))
                        .collect();
                    LinearGradient::new(
                        Point::from_xy(0.0, 0.0),
                        Point::from_xy(0.0, edge),
                        stops,
                        SpreadMode::Pad,
                        Transform::identity(),
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{alpha_bounds, is_transparent};
    use crate::scene::{Color, ColorStop};

    #[test]
    fn empty_layer_is_transparent() {
        let layer = Layer::content("empty");
        let pixmap = rasterize_layer(&layer, None, 32).unwrap();
        assert!(is_transparent(&pixmap));
    }

    #[test]
    fn solid_fill_covers_frame_at_full_scale() {
        let layer = Layer::content("fill").with_fill(Fill::solid(Color::rgb(255, 0, 0)));
        let pixmap = rasterize_layer(&layer, None, 16).unwrap();
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 255 && p.red() == 255));
    }

    #[test]
    fn scale_shrinks_about_center() {
        let layer = Layer::content("half")
            .with_fill(Fill::solid(Color::WHITE))
            .with_layout(Layout::new(0.0, 0.0, 50.0));
        let pixmap = rasterize_layer(&layer, None, 40).unwrap();
        assert_eq!(alpha_bounds(&pixmap), Some((10, 10, 30, 30)));
    }

    #[test]
    fn offset_moves_by_percent_of_edge() {
        let layer = Layer::content("moved")
            .with_fill(Fill::solid(Color::WHITE))
            .with_layout(Layout::new(25.0, -25.0, 50.0));
        let pixmap = rasterize_layer(&layer, None, 40).unwrap();
        assert_eq!(alpha_bounds(&pixmap), Some((20, 0, 40, 20)));
    }

    #[test]
    fn oversized_scale_is_clamped() {
        let huge = Layer::content("huge")
            .with_fill(Fill::solid(Color::WHITE))
            .with_layout(Layout::new(0.0, 0.0, 500.0));
        let max = huge.clone().with_layout(Layout::new(0.0, 0.0, 200.0));
        assert_eq!(
            rasterize_layer(&huge, None, 20).unwrap().data(),
            rasterize_layer(&max, None, 20).unwrap().data()
        );

        let tiny = huge.clone().with_layout(Layout::new(0.0, 0.0, -50.0));
        let min = huge.with_layout(Layout::new(0.0, 0.0, 10.0));
        assert_eq!(
            rasterize_layer(&tiny, None, 20).unwrap().data(),
            rasterize_layer(&min, None, 20).unwrap().data()
        );
    }

    #[test]
    fn gradient_runs_top_to_bottom_with_sorted_stops() {
        let layer = Layer::content("grad").with_fill(Fill::linear_gradient(vec![
            ColorStop::new(1.0, Color::BLACK),
            ColorStop::new(0.0, Color::WHITE),
        ]));
        let pixmap = rasterize_layer(&layer, None, 32).unwrap();
        let top = pixmap.pixel(16, 0).unwrap().red();
        let bottom = pixmap.pixel(16, 31).unwrap().red();
        assert!(top > 200 && bottom < 55, "top {top} bottom {bottom}");
    }

    #[test]
    fn bitmap_is_letterboxed_over_fill() {
        let mut bitmap = Pixmap::new(20, 10).unwrap();
        bitmap.fill(Color::rgb(0, 0, 255).to_skia());
        let layer = Layer::content("bmp").with_fill(Fill::solid(Color::rgb(255, 0, 0)));
        let pixmap = rasterize_layer(&layer, Some(&bitmap), 40).unwrap();

        // Top band is fill only, the middle is the bitmap.
        assert_eq!(pixmap.pixel(20, 2).unwrap().red(), 255);
        let mid = pixmap.pixel(20, 20).unwrap();
        assert_eq!((mid.red(), mid.blue()), (0, 255));
    }
}
