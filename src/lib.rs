//! liquid-icon-renderer: squircle app icons with a layered glass material.
//!
//! A [`Scene`] describes a background plus a shallow tree of content and
//! group layers. [`IconRenderer`] turns a scene snapshot into a finished
//! frame: the background is synthesized, every layer is rasterized and
//! pushed through the glass pipeline (drop shadow, frosted backdrop,
//! chromatic aberration, tint, specular, Fresnel rim, border, inner shadow,
//! appearance adjustment), groups are merged before their opacity applies,
//! and the result is clipped to a squircle with a directional rim light.
//!
//! # Example
//!
//! ```
//! use liquid_icon_renderer::{
//!     BackendPreference, BackgroundSpec, Color, EngineConfig, Fill, IconRenderer, Layer,
//!     Layout, Scene,
//! };
//!
//! let scene = Scene::new(
//!     vec![
//!         Layer::content("badge")
//!             .with_fill(Fill::solid(Color::WHITE))
//!             .with_layout(Layout::new(0.0, 0.0, 60.0)),
//!     ],
//!     BackgroundSpec::solid(Color::rgb(255, 120, 40)),
//! )
//! .unwrap()
//! .with_light_angle(-30.0);
//!
//! let mut renderer = IconRenderer::new(EngineConfig {
//!     backend: BackendPreference::Cpu,
//!     ..EngineConfig::default()
//! });
//! let png = renderer.export_frame(&scene, 64).unwrap();
//! assert!(!png.is_empty());
//! ```
//!
//! # Interactive use
//!
//! Editors that re-render on every slider tick should route requests through
//! a [`RenderScheduler`], which keeps one render in flight and coalesces
//! everything submitted meanwhile down to the latest request. See
//! [`IconRenderer::render_scheduled`].
//!
//! # Backends
//!
//! The CPU glass backend is always available. With the `gpu` feature the
//! engine probes for a wgpu adapter at startup and falls back to the CPU,
//! per layer, whenever a GPU pass fails.

pub mod assets;
pub mod background;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod glass;
pub mod ops;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod scheduler;

pub use assets::ImageCache;
pub use background::synthesize_background;
pub use compositor::{GlassBackends, compose_frame};
pub use config::{BackendPreference, EngineConfig};
pub use error::{ConfigError, GlassError, RenderError, SceneError};
pub use geometry::{SquirclePath, squircle_path};
pub use glass::{BackendKind, CpuGlassRenderer, GlassInput, GlassRenderer, ScratchPool, select_renderer};
#[cfg(feature = "gpu")]
pub use glass::GpuGlassRenderer;
pub use raster::rasterize_layer;
pub use renderer::IconRenderer;
pub use scene::{
    Adjustment, AppearanceMode, BackgroundKind, BackgroundSpec, BlendMode, Color, ColorStop, Fill,
    GlassConfig, Layer, LayerId, LayerKind, Layout, RenderRequest, Scene, SceneDocument, SceneTree,
    ShadowConfig, ShadowKind,
};
pub use scheduler::{FrameOutcome, RenderScheduler, Ticket};
