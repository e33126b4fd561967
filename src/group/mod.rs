//! Group records: one node of the group tree.

mod color;

use std::fmt;

pub use color::GroupColor;
use serde::{Deserialize, Serialize};

use crate::entity::EntityRef;

/// Name given to groups created without one.
pub const DEFAULT_GROUP_NAME: &str = "New Group";

// ---------------------------------------------------------------------------
// GroupId
// ---------------------------------------------------------------------------

/// Immutable, globally unique group identifier.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Fresh random (v4 UUID) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The raw identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// GroupType
// ---------------------------------------------------------------------------

/// Provenance of a group. Does not change storage behavior.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum GroupType {
    /// Created by hand from a selection.
    #[default]
    Manual,
    /// Organizational container; may have no members.
    Folder,
    /// Produced by the clustering engine.
    Smart,
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A named, colored, optionally parented container of entity refs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Group {
    /// Unique identity, assigned at creation.
    #[serde(alias = "ID")]
    pub id: GroupId,
    /// Display name.
    #[serde(alias = "Name")]
    pub name: String,
    /// Display color (RGBA).
    #[serde(alias = "GroupColor")]
    pub color: GroupColor,
    /// Parent group, `None` for roots. Persisted as `""` for roots.
    #[serde(with = "parent_id")]
    pub parent_id: Option<GroupId>,
    /// Provenance tag.
    pub group_type: GroupType,
    /// Free-form description.
    pub description: String,
    /// Ordered free-form tags.
    pub tags: Vec<String>,
    /// Member refs in insertion order, no duplicates.
    #[serde(alias = "ObjectGlobalIDs")]
    pub members: Vec<EntityRef>,
    /// Whether members are shown.
    #[serde(alias = "IsVisible")]
    pub visible: bool,
    /// Whether members are pick-locked.
    #[serde(alias = "IsLocked")]
    pub locked: bool,
    /// UI expansion state; carried through storage only.
    pub expanded: bool,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            id: GroupId::generate(),
            name: DEFAULT_GROUP_NAME.to_owned(),
            color: GroupColor::random(),
            parent_id: None,
            group_type: GroupType::Manual,
            description: String::new(),
            tags: Vec::new(),
            members: Vec::new(),
            visible: true,
            locked: false,
            expanded: true,
        }
    }
}

impl Group {
    /// New root group with a fresh id and a random color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the provenance tag (builder style).
    #[must_use]
    pub fn with_type(mut self, group_type: GroupType) -> Self {
        self.group_type = group_type;
        self
    }

    /// Whether this group has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `entity_ref` is a member.
    #[must_use]
    pub fn contains(&self, entity_ref: &EntityRef) -> bool {
        self.members.contains(entity_ref)
    }

    /// Append a member. Returns `false` if it was already present.
    pub fn add_member(&mut self, entity_ref: EntityRef) -> bool {
        if self.contains(&entity_ref) {
            return false;
        }
        self.members.push(entity_ref);
        true
    }

    /// Remove a member. Returns `false` if it was absent.
    pub fn remove_member(&mut self, entity_ref: &EntityRef) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != entity_ref);
        self.members.len() != before
    }
}

/// Serde adapter: `Option<GroupId>` <-> string, empty string = root.
mod parent_id {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::GroupId;

    pub(super) fn serialize<S: Serializer>(
        value: &Option<GroupId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_ref().map_or("", GroupId::as_str))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<GroupId>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.is_empty()).map(GroupId::from))
    }
}
