//! Top-level rendering engine.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::assets::ImageCache;
use crate::compositor::{GlassBackends, compose_frame};
use crate::config::EngineConfig;
use crate::error::RenderError;
use crate::glass::{BackendKind, GlassRenderer};
use crate::ops::pixmap_to_rgba_image;
use crate::scene::{RenderRequest, Scene};
use crate::scheduler::RenderScheduler;

/// Renders scenes into finished icon frames.
///
/// `IconRenderer` owns the glass backends and the decoded image cache, so it
/// should be kept alive across frames. Each call renders a fresh snapshot of
/// the scene; nothing about the scene itself is retained.
///
/// # Example
///
/// ```
/// use liquid_icon_renderer::{
///     BackendPreference, BackgroundSpec, Color, EngineConfig, IconRenderer, Layer, Scene,
/// };
///
/// let config = EngineConfig { backend: BackendPreference::Cpu, ..EngineConfig::default() };
/// let mut renderer = IconRenderer::new(config);
///
/// let scene = Scene::new(
///     vec![Layer::content("disc").with_fill(liquid_icon_renderer::Fill::solid(Color::WHITE))],
///     BackgroundSpec::solid(Color::rgb(30, 90, 200)),
/// )
/// .unwrap();
///
/// let frame = renderer.render_frame(&scene, 128).unwrap();
/// assert_eq!(frame.dimensions(), (128, 128));
/// ```
pub struct IconRenderer {
    config: EngineConfig,
    backends: GlassBackends,
    images: ImageCache,
}

impl IconRenderer {
    pub fn new(config: EngineConfig) -> Self {
        let backends = GlassBackends::new(config.backend);
        Self::with_backends(config, backends)
    }

    /// Uses `primary` as the glass backend instead of probing for one.
    pub fn with_glass_renderer(config: EngineConfig, primary: Box<dyn GlassRenderer>) -> Self {
        Self::with_backends(config, GlassBackends::with_primary(primary))
    }

    fn with_backends(config: EngineConfig, backends: GlassBackends) -> Self {
        debug!(backend = %backends.primary_kind(), "icon renderer ready");
        Self {
            images: ImageCache::new(config.svg_raster_size),
            config,
            backends,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backends.primary_kind()
    }

    /// The bitmap cache that layer `bitmap` references resolve against.
    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    /// Renders `scene` as straight-alpha RGBA at `size`×`size`.
    pub fn render_frame(&mut self, scene: &Scene, size: u32) -> Result<RgbaImage, RenderError> {
        let frame = compose_frame(scene, size, &mut self.backends, &mut self.images)?;
        Ok(pixmap_to_rgba_image(&frame))
    }

    pub fn render_request(&mut self, request: &RenderRequest) -> Result<RgbaImage, RenderError> {
        self.render_frame(&request.scene, request.output_size)
    }

    /// Renders at the configured preview size.
    pub fn render_preview(&mut self, scene: &Scene) -> Result<RgbaImage, RenderError> {
        self.render_frame(scene, self.config.preview_size)
    }

    /// Renders `scene` and encodes it as PNG.
    pub fn export_frame(&mut self, scene: &Scene, size: u32) -> Result<Vec<u8>, RenderError> {
        let image = self.render_frame(scene, size)?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        debug!(size, bytes = bytes.len(), "frame exported");
        Ok(bytes)
    }

    /// Exports at the configured export size.
    pub fn export(&mut self, scene: &Scene) -> Result<Vec<u8>, RenderError> {
        self.export_frame(scene, self.config.export_size)
    }

    /// Exports as a `data:image/png;base64,` URI.
    pub fn export_data_uri(&mut self, scene: &Scene, size: u32) -> Result<String, RenderError> {
        let png = self.export_frame(scene, size)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    /// Submits `request` to `scheduler` and renders until it has caught up.
    ///
    /// Only frames that are still current when they finish reach `deliver`;
    /// failed renders are delivered as errors. Returns the number of frames
    /// rendered by this call, which is zero when another caller already holds
    /// the render slot and will pick the request up.
    pub fn render_scheduled(
        &mut self,
        scheduler: &RenderScheduler,
        request: RenderRequest,
        deliver: impl FnMut(Result<RgbaImage, RenderError>),
    ) -> usize {
        scheduler.submit_and_drive(request, |req| self.render_request(req), deliver)
    }
}

impl Default for IconRenderer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendPreference;
    use crate::scene::{BackgroundSpec, Color, Fill, GlassConfig, Layer, Layout};

    fn renderer() -> IconRenderer {
        IconRenderer::new(EngineConfig {
            backend: BackendPreference::Cpu,
            ..EngineConfig::default()
        })
    }

    fn sample_scene() -> Scene {
        Scene::new(
            vec![
                Layer::content("disc")
                    .with_fill(Fill::solid(Color::rgb(250, 250, 250)))
                    .with_layout(Layout::new(0.0, 0.0, 60.0)),
                Layer::content("flat")
                    .with_fill(Fill::solid(Color::rgb(200, 30, 30)))
                    .with_layout(Layout::new(20.0, 20.0, 30.0))
                    .with_glass(GlassConfig::disabled())
                    .with_order(1),
            ],
            BackgroundSpec::solid(Color::rgb(30, 90, 200)),
        )
        .unwrap()
    }

    #[test]
    fn export_matches_render() {
        let mut renderer = renderer();
        let scene = sample_scene();
        let png = renderer.export_frame(&scene, 48).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        let rendered = renderer.render_frame(&scene, 48).unwrap();
        assert_eq!(decoded.dimensions(), (48, 48));
        assert_eq!(decoded.as_raw(), rendered.as_raw());
    }

    #[test]
    fn data_uri_wraps_png() {
        let uri = renderer().export_data_uri(&sample_scene(), 16).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let png = STANDARD.decode(payload).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn zero_size_is_an_error() {
        assert!(matches!(
            renderer().render_frame(&sample_scene(), 0),
            Err(RenderError::InvalidOutputSize(0))
        ));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let bg = BackgroundSpec::solid(Color::rgb(10, 10, 10));
        let layer = |opacity: f32, scale: f32| {
            Layer::content("a")
                .with_fill(Fill::solid(Color::rgb(240, 200, 40)))
                .with_opacity(opacity)
                .with_layout(Layout::new(0.0, 0.0, scale))
                .with_glass(GlassConfig::disabled())
        };
        let mut renderer = renderer();
        let mut frame = |l: Layer| {
            renderer
                .render_frame(&Scene::new(vec![l], bg.clone()).unwrap(), 32)
                .unwrap()
        };

        assert_eq!(frame(layer(150.0, 100.0)), frame(layer(100.0, 100.0)));
        assert_eq!(frame(layer(100.0, 500.0)), frame(layer(100.0, 200.0)));
        assert_eq!(frame(layer(100.0, -50.0)), frame(layer(100.0, 10.0)));
    }

    #[test]
    fn light_angle_is_periodic() {
        let mut renderer = renderer();
        let a = renderer.render_frame(&sample_scene().with_light_angle(45.0), 32).unwrap();
        let b = renderer.render_frame(&sample_scene().with_light_angle(405.0), 32).unwrap();
        let c = renderer.render_frame(&sample_scene().with_light_angle(-315.0), 32).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn unfilled_layer_is_invisible_with_glass() {
        let bg = BackgroundSpec::solid(Color::rgb(120, 60, 200));
        let mut renderer = renderer();
        let empty = renderer
            .render_frame(&Scene::new(vec![], bg.clone()).unwrap(), 32)
            .unwrap();
        let ghost = Scene::new(vec![Layer::content("ghost").with_fill(Fill::None)], bg).unwrap();
        assert_eq!(renderer.render_frame(&ghost, 32).unwrap(), empty);
    }

    #[test]
    fn missing_bitmap_renders_fill_only() {
        let bg = BackgroundSpec::solid(Color::rgb(0, 0, 0));
        let fill = Fill::solid(Color::rgb(0, 200, 0));
        let mut renderer = renderer();
        let with_missing = Scene::new(
            vec![Layer::content("a").with_fill(fill.clone()).with_bitmap("nowhere.png")],
            bg.clone(),
        )
        .unwrap();
        let fill_only = Scene::new(vec![Layer::content("a").with_fill(fill)], bg).unwrap();
        assert_eq!(
            renderer.render_frame(&with_missing, 32).unwrap(),
            renderer.render_frame(&fill_only, 32).unwrap()
        );
    }

    #[test]
    fn scheduled_renders_deliver_frames() {
        let scheduler = RenderScheduler::new();
        let mut renderer = renderer();
        let mut frames = Vec::new();
        let rendered = renderer.render_scheduled(
            &scheduler,
            RenderRequest::new(sample_scene(), 24),
            |frame| frames.push(frame),
        );
        assert_eq!(rendered, 1);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref().unwrap().dimensions(), (24, 24));
    }
}
