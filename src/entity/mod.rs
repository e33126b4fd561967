//! Durable entity handles and the host collaborator traits.
//!
//! The grouper never owns scene objects. It stores [`EntityRef`]s and talks
//! to the host through three traits:
//!
//! - [`EntityResolver`] turns refs into live handles and back
//! - [`EntityControl`] toggles activity/picking and reads/writes positions
//! - [`EntityAttributes`] exposes the descriptive data the clustering
//!   filters and the naming templates read
//!
//! A ref that resolves to nothing is a normal condition (the object may be
//! unloaded), never an error.

mod bounds;

use std::fmt;
use std::hash::Hash;

pub use bounds::Bounds;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tag reported for entities that have none.
pub const UNTAGGED: &str = "Untagged";

/// Opaque, string-serializable handle to a scene object that survives
/// process restarts.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityRef(String);

impl EntityRef {
    /// Wrap a host-provided durable identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for EntityRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Maps durable refs to live entity handles.
pub trait EntityResolver {
    /// Live handle type. Cheap to clone, usable as a map key.
    type Entity: Clone + Eq + Hash + fmt::Debug;

    /// Resolve a ref to a live entity, or `None` if it is not loaded.
    fn resolve(&self, entity_ref: &EntityRef) -> Option<Self::Entity>;

    /// Derive the durable ref for a live entity. Must return the same ref
    /// for the same logical entity across sessions.
    fn make_ref(&self, entity: &Self::Entity) -> EntityRef;
}

/// Side-effecting control over live entities.
pub trait EntityControl: EntityResolver {
    /// Activate or deactivate an entity (visibility).
    fn set_active(&mut self, entity: &Self::Entity, active: bool);

    /// Enable or disable interactive picking (lock).
    fn set_pickable(&mut self, entity: &Self::Entity, pickable: bool);

    /// World-space position.
    fn position(&self, entity: &Self::Entity) -> Vec3;

    /// Move an entity to a world-space position.
    fn set_position(&mut self, entity: &Self::Entity, position: Vec3);

    /// World-space render bounds, if the entity renders anything.
    fn bounds(&self, entity: &Self::Entity) -> Option<Bounds>;
}

/// Descriptive data used by filters, partitions and naming.
pub trait EntityAttributes: EntityResolver {
    /// Display name.
    fn name(&self, entity: &Self::Entity) -> String;

    /// Tag label. Untagged entities report [`UNTAGGED`].
    fn tag(&self, entity: &Self::Entity) -> String;

    /// Layer index.
    fn layer(&self, entity: &Self::Entity) -> u32;

    /// Primary render material, if the entity renders with one.
    fn material(&self, entity: &Self::Entity) -> Option<String>;

    /// Whether the entity carries the named capability/component.
    fn has_capability(&self, entity: &Self::Entity, capability: &str) -> bool;

    /// Local-space extent of the entity's shape data, if any.
    fn shape_extent(&self, entity: &Self::Entity) -> Option<Vec3>;

    /// Kind name used by the `{type}` naming token.
    fn kind(&self, _entity: &Self::Entity) -> String {
        "Object".to_owned()
    }

    /// Name of the scene the entity lives in.
    fn scene_name(&self, _entity: &Self::Entity) -> Option<String> {
        None
    }
}
