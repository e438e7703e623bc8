//! The immutable scene snapshot consumed by one render.
//!
//! Layers are stored in a flat list and reference their parent by id. When a
//! [`Scene`] is constructed the list is validated once against the depth-two
//! contract (root layers, plus children of root groups) and an index-based
//! [`SceneTree`] is derived. Rendering walks that index; it never follows
//! references between layers.
//!
//! # JSON
//!
//! ```
//! use liquid_icon_renderer::Scene;
//!
//! let scene = Scene::from_json(r##"{
//!     "layers": [
//!         { "id": "bg-shape", "fill": { "type": "solid", "color": "#ffffff" } }
//!     ],
//!     "background": { "kind": "solid", "colors": ["#1e90ff"] },
//!     "lightAngle": -45,
//!     "appearanceMode": "dark"
//! }"##).unwrap();
//!
//! assert_eq!(scene.layers().len(), 1);
//! ```

pub mod background;
pub mod glass;
pub mod layer;

pub use background::{AppearanceMode, BackgroundKind, BackgroundSpec};
pub use glass::{Adjustment, GlassConfig, ShadowConfig, ShadowKind, DEFAULT_TRANSLUCENCY};
pub use layer::{BlendMode, Color, ColorStop, Fill, Layer, LayerId, LayerKind, Layout, UnknownBlendMode};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;

// ============================================================================
// SceneDocument
// ============================================================================

/// Serializable, unvalidated form of a [`Scene`].
///
/// This is what the surrounding editor persists and hands over; convert it
/// with [`Scene::from_document`] to get a renderable scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDocument {
    pub layers: Vec<Layer>,
    pub background: BackgroundSpec,
    /// Light direction in degrees (0 lights from the top, 90 from the right).
    pub light_angle: f32,
    pub appearance_mode: AppearanceMode,
}

// ============================================================================
// SceneTree
// ============================================================================

/// Index view over a scene's flat layer list.
///
/// Indices refer to positions in [`Scene::layers`]. Siblings are sorted by
/// ascending `order`, ties broken by list position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneTree {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl SceneTree {
    fn build(layers: &[Layer]) -> Result<Self, SceneError> {
        let mut by_id: HashMap<&LayerId, usize> = HashMap::with_capacity(layers.len());
        for (index, layer) in layers.iter().enumerate() {
            if by_id.insert(&layer.id, index).is_some() {
                return Err(SceneError::DuplicateId(layer.id.clone()));
            }
        }

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); layers.len()];

        for (index, layer) in layers.iter().enumerate() {
            let Some(parent_id) = &layer.parent_id else {
                roots.push(index);
                continue;
            };
            if layer.is_group() {
                return Err(SceneError::NestedGroup(layer.id.clone()));
            }
            let &parent = by_id.get(parent_id).ok_or_else(|| SceneError::UnknownParent {
                layer: layer.id.clone(),
                parent: parent_id.clone(),
            })?;
            if !layers[parent].is_group() {
                return Err(SceneError::ParentNotGroup {
                    layer: layer.id.clone(),
                    parent: parent_id.clone(),
                });
            }
            children[parent].push(index);
        }

        let by_order = |a: &usize, b: &usize| layers[*a].order.cmp(&layers[*b].order).then(a.cmp(b));
        roots.sort_by(by_order);
        for list in &mut children {
            list.sort_by(by_order);
        }

        Ok(Self { roots, children })
    }

    /// Root layer indices in compositing order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Child indices of the layer at `index` in compositing order.
    ///
    /// Empty for content layers and unknown indices.
    pub fn children(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ============================================================================
// Scene
// ============================================================================

/// A validated, immutable snapshot of everything one frame depends on.
#[derive(Debug, Clone)]
pub struct Scene {
    layers: Vec<Layer>,
    background: BackgroundSpec,
    light_angle: f32,
    appearance: AppearanceMode,
    tree: SceneTree,
}

impl Scene {
    /// Builds a scene, validating the layer tree.
    pub fn new(layers: Vec<Layer>, background: BackgroundSpec) -> Result<Self, SceneError> {
        let tree = SceneTree::build(&layers)?;
        Ok(Self {
            layers,
            background,
            light_angle: 0.0,
            appearance: AppearanceMode::Default,
            tree,
        })
    }

    pub fn from_document(doc: SceneDocument) -> Result<Self, SceneError> {
        Ok(Self::new(doc.layers, doc.background)?
            .with_light_angle(doc.light_angle)
            .with_appearance(doc.appearance_mode))
    }

    /// Parses and validates a scene from its JSON document form.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let doc: SceneDocument =
            serde_json::from_str(json).map_err(|e| SceneError::Json(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn with_light_angle(mut self, degrees: f32) -> Self {
        self.light_angle = degrees;
        self
    }

    pub fn with_appearance(mut self, mode: AppearanceMode) -> Self {
        self.appearance = mode;
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn background(&self) -> &BackgroundSpec {
        &self.background
    }

    /// The light angle as given (unnormalized).
    pub fn light_angle(&self) -> f32 {
        self.light_angle
    }

    pub fn appearance(&self) -> AppearanceMode {
        self.appearance
    }

    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            layers: self.layers.clone(),
            background: self.background.clone(),
            light_angle: self.light_angle,
            appearance_mode: self.appearance,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_document())
    }
}

/// A scene paired with the edge length it should be rendered at.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub scene: Scene,
    pub output_size: u32,
}

impl RenderRequest {
    pub fn new(scene: Scene, output_size: u32) -> Self {
        Self { scene, output_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(scene: &Scene, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| scene.layers()[i].id.to_string()).collect()
    }

    #[test]
    fn tree_orders_siblings_by_order() {
        let scene = Scene::new(
            vec![
                Layer::content("c").with_order(30),
                Layer::group("g").with_order(10),
                Layer::content("g2").with_parent("g").with_order(5),
                Layer::content("g1").with_parent("g").with_order(-5),
                Layer::content("a").with_order(10),
            ],
            BackgroundSpec::default(),
        )
        .unwrap();

        assert_eq!(ids(&scene, scene.tree().roots()), ["g", "a", "c"]);
        assert_eq!(ids(&scene, scene.tree().children(1)), ["g1", "g2"]);
        assert!(scene.tree().children(0).is_empty());
        assert!(scene.tree().children(99).is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Scene::new(
            vec![Layer::content("a"), Layer::content("a")],
            BackgroundSpec::default(),
        )
        .unwrap_err();
        assert_eq!(err, SceneError::DuplicateId("a".into()));
    }

    #[test]
    fn rejects_unknown_parent() {
        let err = Scene::new(
            vec![Layer::content("a").with_parent("missing")],
            BackgroundSpec::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::UnknownParent { .. }));
    }

    #[test]
    fn rejects_content_parent() {
        let err = Scene::new(
            vec![Layer::content("p"), Layer::content("a").with_parent("p")],
            BackgroundSpec::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::ParentNotGroup { .. }));
    }

    #[test]
    fn rejects_nested_groups() {
        let err = Scene::new(
            vec![Layer::group("outer"), Layer::group("inner").with_parent("outer")],
            BackgroundSpec::default(),
        )
        .unwrap_err();
        assert_eq!(err, SceneError::NestedGroup("inner".into()));
    }

    #[test]
    fn json_roundtrip_preserves_scene() {
        let scene = Scene::new(
            vec![
                Layer::group("g").with_opacity(40.0),
                Layer::content("a")
                    .with_parent("g")
                    .with_fill(Fill::solid(Color::rgb(10, 20, 30)))
                    .with_blend_mode(BlendMode::Overlay),
            ],
            BackgroundSpec::solid(Color::WHITE),
        )
        .unwrap()
        .with_light_angle(-45.0)
        .with_appearance(AppearanceMode::ClearDark);

        let json = scene.to_json().unwrap();
        assert!(json.contains("\"appearanceMode\":\"clear-dark\""));
        assert!(json.contains("\"parentId\":\"g\""));

        let restored = Scene::from_json(&json).unwrap();
        assert_eq!(restored.layers(), scene.layers());
        assert_eq!(restored.light_angle(), -45.0);
        assert_eq!(restored.appearance(), AppearanceMode::ClearDark);
        assert_eq!(restored.tree(), scene.tree());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(Scene::from_json("{"), Err(SceneError::Json(_))));
        let nested = r#"{"layers":[{"id":"a","kind":"group"},{"id":"b","kind":"group","parentId":"a"}]}"#;
        assert!(matches!(Scene::from_json(nested), Err(SceneError::NestedGroup(_))));
    }

    #[test]
    fn partial_glass_sliders_parse_in_scene_json() {
        let json = r#"{"layers":[{"id":"a","glass":{"blur":{"enabled":false},"darkAdjust":{"value":70}}}]}"#;
        let scene = Scene::from_json(json).unwrap();
        let glass = &scene.layers()[0].glass;
        assert!(!glass.blur.enabled);
        assert_eq!(glass.dark_adjust.amount(), Some(0.7));
    }
}
