//! Error types for scene construction, rendering, and configuration.
//!
//! Only contract violations surface as errors to callers. Per-layer problems
//! (a broken bitmap, a failing GPU pass) are absorbed inside the renderer and
//! show up as a degraded layer plus a log line instead.

use thiserror::Error;

use crate::scene::LayerId;

/// A scene whose layer tree violates the depth-two contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Two layers share the same id.
    #[error("duplicate layer id `{0}`")]
    DuplicateId(LayerId),

    /// A layer names a parent that does not exist in the scene.
    #[error("layer `{layer}` references unknown parent `{parent}`")]
    UnknownParent { layer: LayerId, parent: LayerId },

    /// A layer's parent exists but is a content layer.
    #[error("layer `{layer}` has parent `{parent}` which is not a group")]
    ParentNotGroup { layer: LayerId, parent: LayerId },

    /// A group layer was placed inside another layer.
    #[error("group `{0}` has a parent; groups may only appear at the root")]
    NestedGroup(LayerId),

    /// The scene JSON could not be parsed.
    #[error("invalid scene json: {0}")]
    Json(String),
}

/// Errors returned by the frame render and export entry points.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested frame edge length was zero.
    #[error("output size must be positive, got {0}")]
    InvalidOutputSize(u32),

    /// A raster of the requested size could not be allocated.
    #[error("failed to allocate a {0}x{0} raster")]
    Allocation(u32),

    /// PNG encoding of the finished frame failed.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

/// A failure inside one glass backend while rendering a single layer.
#[derive(Debug, Error)]
pub enum GlassError {
    /// Scratch or output raster allocation failed.
    #[error("failed to allocate {0}x{0} glass scratch buffer")]
    Allocation(u32),

    /// The GPU backend could not be initialized.
    #[error("gpu unavailable: {0}")]
    GpuUnavailable(String),

    /// A shader failed validation.
    #[error("shader compilation failed: {0}")]
    Shader(String),

    /// Reading rendered pixels back from the GPU failed.
    #[error("gpu readback failed: {0}")]
    Readback(String),
}

/// Errors produced while loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration JSON was malformed.
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment override named an unknown backend.
    #[error("unknown backend `{0}` (expected auto, cpu, or gpu)")]
    UnknownBackend(String),

    /// An environment override was not a positive integer.
    #[error("invalid value `{value}` for {name}")]
    InvalidNumber { name: &'static str, value: String },
}
