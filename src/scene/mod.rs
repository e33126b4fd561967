//! In-memory scene host: flat object storage implementing every collaborator
//! trait of [`crate::entity`].
//!
//! Objects carry a durable `guid` (their [`EntityRef`]) and receive a
//! session-local [`ObjectId`] when spawned. Despawning and respawning an
//! object with the same guid models a scene being unloaded and reloaded.

mod object;

use std::path::Path;

use glam::Vec3;
pub use object::{ObjectId, SceneObject};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::entity::{
    Bounds, EntityAttributes, EntityControl, EntityRef, EntityResolver, UNTAGGED,
};
use crate::error::GrouperError;

/// On-disk scene description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SceneDocument {
    name: String,
    objects: Vec<SceneObject>,
}

// ---------------------------------------------------------------------------
// MemoryScene
// ---------------------------------------------------------------------------

/// A scene that lives entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    name: String,
    /// Objects in spawn order.
    objects: Vec<(ObjectId, SceneObject)>,
    by_guid: FxHashMap<String, ObjectId>,
    next_id: u32,
}

impl MemoryScene {
    /// Empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a scene from a JSON document.
    pub fn load(path: &Path) -> Result<Self, GrouperError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse a JSON scene document.
    pub fn from_json(json: &str) -> Result<Self, GrouperError> {
        let doc: SceneDocument = serde_json::from_str(json)
            .map_err(|e| GrouperError::SceneLoad(e.to_string()))?;
        let mut scene = Self::new(doc.name);
        for object in doc.objects {
            let _ = scene.spawn(object);
        }
        Ok(scene)
    }

    /// Serialize the scene to a pretty JSON document.
    pub fn to_json(&self) -> Result<String, GrouperError> {
        let doc = SceneDocument {
            name: self.name.clone(),
            objects: self.objects.iter().map(|(_, o)| o.clone()).collect(),
        };
        serde_json::to_string_pretty(&doc)
            .map_err(|e| GrouperError::SceneLoad(e.to_string()))
    }

    /// Scene name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.name
    }

    // -- Object management --

    /// Add an object and return its live handle. An object whose guid is
    /// already present replaces the previous one.
    pub fn spawn(&mut self, object: SceneObject) -> ObjectId {
        if let Some(old) = self.by_guid.get(&object.guid).copied() {
            let _ = self.despawn(old);
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let _ = self.by_guid.insert(object.guid.clone(), id);
        self.objects.push((id, object));
        id
    }

    /// Remove an object. Returns it, if present.
    pub fn despawn(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|(oid, _)| *oid == id)?;
        let (_, object) = self.objects.remove(idx);
        let _ = self.by_guid.remove(&object.guid);
        Some(object)
    }

    /// Read access to an object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o)
    }

    /// Write access to an object.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o)
    }

    /// Live handle of the object with this guid.
    #[must_use]
    pub fn find(&self, guid: &str) -> Option<ObjectId> {
        self.by_guid.get(guid).copied()
    }

    /// All live handles in spawn order.
    #[must_use]
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|(id, _)| *id).collect()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl EntityResolver for MemoryScene {
    type Entity = ObjectId;

    fn resolve(&self, entity_ref: &EntityRef) -> Option<ObjectId> {
        self.find(entity_ref.as_str())
    }

    fn make_ref(&self, entity: &ObjectId) -> EntityRef {
        // Unknown handles still get a stable, never-resolving ref.
        self.object(*entity).map_or_else(
            || EntityRef::new(format!("missing-{}", entity.0)),
            |o| EntityRef::new(o.guid.clone()),
        )
    }
}

impl EntityControl for MemoryScene {
    fn set_active(&mut self, entity: &ObjectId, active: bool) {
        if let Some(o) = self.object_mut(*entity) {
            o.active = active;
        }
    }

    fn set_pickable(&mut self, entity: &ObjectId, pickable: bool) {
        if let Some(o) = self.object_mut(*entity) {
            o.pickable = pickable;
        }
    }

    fn position(&self, entity: &ObjectId) -> Vec3 {
        self.object(*entity).map_or(Vec3::ZERO, |o| o.position)
    }

    fn set_position(&mut self, entity: &ObjectId, position: Vec3) {
        if let Some(o) = self.object_mut(*entity) {
            // Render bounds travel with the object.
            if let Some(b) = o.bounds.as_mut() {
                let delta = position - o.position;
                *b = Bounds::from_corners(b.min + delta, b.max + delta);
            }
            o.position = position;
        }
    }

    fn bounds(&self, entity: &ObjectId) -> Option<Bounds> {
        self.object(*entity).and_then(|o| o.bounds)
    }
}

impl EntityAttributes for MemoryScene {
    fn name(&self, entity: &ObjectId) -> String {
        self.object(*entity).map(|o| o.name.clone()).unwrap_or_default()
    }

    fn tag(&self, entity: &ObjectId) -> String {
        self.object(*entity)
            .map_or_else(|| UNTAGGED.to_owned(), |o| o.tag.clone())
    }

    fn layer(&self, entity: &ObjectId) -> u32 {
        self.object(*entity).map_or(0, |o| o.layer)
    }

    fn material(&self, entity: &ObjectId) -> Option<String> {
        self.object(*entity).and_then(|o| o.material.clone())
    }

    fn has_capability(&self, entity: &ObjectId, capability: &str) -> bool {
        self.object(*entity)
            .is_some_and(|o| o.components.iter().any(|c| c == capability))
    }

    fn shape_extent(&self, entity: &ObjectId) -> Option<Vec3> {
        self.object(*entity).and_then(|o| o.shape_extent)
    }

    fn kind(&self, entity: &ObjectId) -> String {
        self.object(*entity)
            .map_or_else(|| "Object".to_owned(), |o| o.kind.clone())
    }

    fn scene_name(&self, _entity: &ObjectId) -> Option<String> {
        Some(self.name.clone())
    }
}
