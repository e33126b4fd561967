use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{Bounds, UNTAGGED};

/// Scene-assigned live handle. Not stable across sessions; use the
/// object's `guid` (its [`EntityRef`](crate::entity::EntityRef)) for that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct ObjectId(pub u32);

/// One object of a [`MemoryScene`](super::MemoryScene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneObject {
    /// Durable identifier, stable across sessions.
    pub guid: String,
    /// Display name.
    pub name: String,
    /// Kind name (`{type}` naming token).
    pub kind: String,
    /// Tag label.
    pub tag: String,
    /// Layer index.
    pub layer: u32,
    /// Primary render material.
    pub material: Option<String>,
    /// World-space position.
    pub position: Vec3,
    /// World-space render bounds. `None` for objects that do not render.
    pub bounds: Option<Bounds>,
    /// Local-space shape extent (mesh bounds size).
    pub shape_extent: Option<Vec3>,
    /// Capability/component names attached to the object.
    pub components: Vec<String>,
    /// Whether the object is active (shown).
    pub active: bool,
    /// Whether the object can be picked interactively.
    pub pickable: bool,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            guid: String::new(),
            name: String::new(),
            kind: "Object".to_owned(),
            tag: UNTAGGED.to_owned(),
            layer: 0,
            material: None,
            position: Vec3::ZERO,
            bounds: None,
            shape_extent: None,
            components: Vec::new(),
            active: true,
            pickable: true,
        }
    }
}

impl SceneObject {
    /// Object with a durable guid and a name, at the origin.
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Place the object.
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the layer.
    #[must_use]
    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Set the primary material.
    #[must_use]
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Give the object render bounds of `size` centered on its position,
    /// and the same local shape extent.
    #[must_use]
    pub fn with_box(mut self, size: Vec3) -> Self {
        self.bounds = Some(Bounds::from_center_size(self.position, size));
        self.shape_extent = Some(size);
        self
    }

    /// Set explicit render bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Attach a capability/component name.
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }
}
