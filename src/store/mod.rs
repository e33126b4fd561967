//! Group store: flat, insertion-ordered storage of every group record plus
//! the JSON persistence round-trip.
//!
//! The store itself enforces only id uniqueness. Tree invariants (no
//! dangling parents, no cycles) are the manager's responsibility at runtime
//! and are repaired here on load, since a hand-edited or older file may
//! violate them.

mod persist;

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::GrouperError;
use crate::group::{Group, GroupId};

/// Owns all group records in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStore {
    groups: Vec<Group>,
}

impl GroupStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `groups` as given (no repair). Records whose id is
    /// already taken are dropped with a warning.
    #[must_use]
    pub fn from_groups(groups: Vec<Group>) -> Self {
        let mut store = Self::new();
        for group in groups {
            let (id, name) = (group.id.clone(), group.name.clone());
            if !store.add(group) {
                log::warn!("group '{name}' reuses id {id}; duplicate record dropped");
            }
        }
        store
    }

    /// Add a group. Returns `false` (and drops `group`) if a group with
    /// the same id already exists.
    pub fn add(&mut self, group: Group) -> bool {
        if self.contains(&group.id) {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// Remove a group by id. No-op returning `None` if absent.
    pub fn remove(&mut self, id: &GroupId) -> Option<Group> {
        let idx = self.index_of(id)?;
        Some(self.groups.remove(idx))
    }

    /// Insert a group at a display position (clamped), used when undoing a
    /// delete. Returns `false` if the id already exists.
    pub fn insert_at(&mut self, index: usize, group: Group) -> bool {
        if self.contains(&group.id) {
            return false;
        }
        let index = index.min(self.groups.len());
        self.groups.insert(index, group);
        true
    }

    /// All groups in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Group] {
        &self.groups
    }

    /// Look up a group.
    #[must_use]
    pub fn get(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| &g.id == id)
    }

    /// Display position of a group.
    #[must_use]
    pub fn index_of(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|g| &g.id == id)
    }

    /// Whether a group with this id exists.
    #[must_use]
    pub fn contains(&self, id: &GroupId) -> bool {
        self.groups.iter().any(|g| &g.id == id)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the store has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Direct children of `parent`, in insertion order.
    pub fn children(&self, parent: &GroupId) -> impl Iterator<Item = &Group> + '_ {
        let parent = parent.clone();
        self.groups
            .iter()
            .filter(move |g| g.parent_id.as_ref() == Some(&parent))
    }

    /// Groups without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &Group> + '_ {
        self.groups.iter().filter(|g| g.is_root())
    }

    /// Ids of `root` and all its descendants, depth-first pre-order.
    ///
    /// Guards against revisits so a corrupted tree cannot loop.
    #[must_use]
    pub fn subtree(&self, root: &GroupId) -> Vec<GroupId> {
        let mut order = Vec::new();
        if !self.contains(root) {
            return order;
        }
        let mut seen = FxHashSet::default();
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            // Push children reversed so the first child is visited first.
            let children: Vec<GroupId> =
                self.children(&id).map(|g| g.id.clone()).collect();
            stack.extend(children.into_iter().rev());
            order.push(id);
        }
        order
    }

    /// Parent chain of `id`, nearest first. Stops at a revisit.
    #[must_use]
    pub fn ancestors(&self, id: &GroupId) -> Vec<GroupId> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let _ = seen.insert(id.clone());
        let mut current = self.get(id).and_then(|g| g.parent_id.clone());
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                break;
            }
            current = self.get(&parent).and_then(|g| g.parent_id.clone());
            chain.push(parent);
        }
        chain
    }

    /// Whether `candidate` is `id` itself or one of its descendants.
    #[must_use]
    pub fn is_in_subtree(&self, id: &GroupId, candidate: &GroupId) -> bool {
        id == candidate || self.ancestors(candidate).contains(id)
    }

    /// Fix tree invariants: dangling parents become roots, and each parent
    /// cycle is cut at its first member in store order. Returns the ids of
    /// the groups that were changed.
    pub fn repair(&mut self) -> Vec<GroupId> {
        let mut fixed = Vec::new();

        let ids: FxHashSet<GroupId> =
            self.groups.iter().map(|g| g.id.clone()).collect();
        for group in &mut self.groups {
            let dangling =
                group.parent_id.as_ref().is_some_and(|p| !ids.contains(p));
            if dangling {
                log::warn!(
                    "group '{}' had a dangling parent; promoted to root",
                    group.name
                );
                group.parent_id = None;
                fixed.push(group.id.clone());
            }
        }

        for idx in 0..self.groups.len() {
            let id = self.groups[idx].id.clone();
            if self.parent_chain_returns_to(&id) {
                log::warn!(
                    "group '{}' was part of a parent cycle; promoted to root",
                    self.groups[idx].name
                );
                self.groups[idx].parent_id = None;
                fixed.push(id);
            }
        }
        fixed
    }

    fn parent_chain_returns_to(&self, id: &GroupId) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = self.get(id).and_then(|g| g.parent_id.clone());
        while let Some(parent) = current {
            if &parent == id {
                return true;
            }
            if !seen.insert(parent.clone()) {
                return false;
            }
            current = self.get(&parent).and_then(|g| g.parent_id.clone());
        }
        false
    }

    /// Load a store from a JSON file. A missing or unreadable file yields
    /// an empty store; an unreadable one is first copied to a `.bak`
    /// sibling. The loaded tree is repaired.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let mut store = match persist::read(path) {
            Ok(groups) => Self::from_groups(groups),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable group store {}: {e}",
                    path.display()
                );
                match persist::back_up(path) {
                    Ok(backup) => log::warn!("Previous store kept as {}", backup.display()),
                    Err(e) => log::warn!("Could not back up {}: {e}", path.display()),
                }
                Self::new()
            }
        };
        let _ = store.repair();
        log::info!("Loaded {} groups from {}", store.len(), path.display());
        store
    }

    /// Save the store to a JSON file, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<(), GrouperError> {
        persist::write(path, &self.groups)?;
        log::debug!("Saved {} groups to {}", self.len(), path.display());
        Ok(())
    }

    /// Serialize to the pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, GrouperError> {
        persist::to_json(&self.groups)
    }

    /// Parse a JSON document (no repair).
    pub fn from_json(json: &str) -> Result<Self, GrouperError> {
        persist::from_json(json).map(Self::from_groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    fn tree() -> (GroupStore, GroupId, GroupId, GroupId, GroupId) {
        let root = Group::new("root");
        let mut a = Group::new("a");
        a.parent_id = Some(root.id.clone());
        let mut b = Group::new("b");
        b.parent_id = Some(root.id.clone());
        let mut a1 = Group::new("a1");
        a1.parent_id = Some(a.id.clone());
        let ids = (root.id.clone(), a.id.clone(), b.id.clone(), a1.id.clone());
        let store = GroupStore::from_groups(vec![root, a, b, a1]);
        (store, ids.0, ids.1, ids.2, ids.3)
    }

    #[test]
    fn add_is_unique_and_remove_idempotent() {
        let mut store = GroupStore::new();
        let g = Group::new("g");
        let id = g.id.clone();
        assert!(store.add(g.clone()));
        assert!(!store.add(g));
        assert_eq!(store.len(), 1);
        assert!(store.remove(&id).is_some());
        assert!(store.remove(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn subtree_is_preorder() {
        let (store, root, a, b, a1) = tree();
        assert_eq!(
            store.subtree(&root),
            vec![root.clone(), a.clone(), a1.clone(), b]
        );
        assert_eq!(store.subtree(&a), vec![a, a1]);
        assert!(store.subtree(&GroupId::from("missing")).is_empty());
    }

    #[test]
    fn ancestors_and_subtree_membership() {
        let (store, root, a, b, a1) = tree();
        assert_eq!(store.ancestors(&a1), vec![a.clone(), root.clone()]);
        assert!(store.is_in_subtree(&root, &a1));
        assert!(store.is_in_subtree(&a, &a));
        assert!(!store.is_in_subtree(&b, &a1));
        assert_eq!(store.roots().count(), 1);
        assert_eq!(store.children(&root).count(), 2);
    }

    #[test]
    fn repair_promotes_dangling_and_cuts_cycles() {
        let mut x = Group::new("x");
        let mut y = Group::new("y");
        x.parent_id = Some(y.id.clone());
        y.parent_id = Some(x.id.clone());
        let mut orphan = Group::new("orphan");
        orphan.parent_id = Some(GroupId::from("gone"));
        let (xid, yid, oid) = (x.id.clone(), y.id.clone(), orphan.id.clone());
        let mut store = GroupStore::from_groups(vec![x, y, orphan]);

        let fixed = store.repair();
        assert_eq!(fixed, vec![oid.clone(), xid.clone()]);
        assert!(store.get(&xid).unwrap().is_root());
        assert_eq!(store.get(&yid).unwrap().parent_id, Some(xid));
        assert!(store.get(&oid).unwrap().is_root());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ProjectSettings").join("groups.json");
        let (mut store, _, a, _, _) = tree();
        let group = store.get_mut(&a).unwrap();
        let _ = group.add_member(EntityRef::from("obj-2"));
        let _ = group.add_member(EntityRef::from("obj-1"));
        group.tags = vec!["walls".to_owned(), "static".to_owned()];
        group.locked = true;

        store.save(&path).unwrap();
        let loaded = GroupStore::load(&path);
        assert_eq!(loaded, store);
    }

    #[test]
    fn missing_or_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(GroupStore::load(&missing).is_empty());

        let corrupt = dir.path().join("bad.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(GroupStore::load(&corrupt).is_empty());
    }

    #[test]
    fn corrupt_file_is_kept_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        std::fs::write(&path, r#"{"layers": []}"#).unwrap();
        assert!(GroupStore::load(&path).is_empty());
        let backup = persist::backup_path(&path);
        assert_eq!(std::fs::read_to_string(backup).unwrap(), r#"{"layers": []}"#);
    }

    #[test]
    fn loads_editor_tool_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ObjectGrouperData.json");
        let json = r#"{
            "Groups": [
                {
                    "ID": "3f2a",
                    "Name": "Props",
                    "GroupColor": { "r": 0.75, "g": 0.5, "b": 0.25, "a": 1.0 },
                    "ObjectGlobalIDs": ["GlobalObjectId_V1-2-abc-1-0", "GlobalObjectId_V1-2-abc-2-0"],
                    "IsVisible": false,
                    "IsLocked": true
                },
                { "ID": "7c1d", "Name": "Lights", "ObjectGlobalIDs": [] }
            ]
        }"#;
        std::fs::write(&path, json).unwrap();

        let store = GroupStore::load(&path);
        assert_eq!(store.len(), 2);
        let props = store.get(&GroupId::from("3f2a")).unwrap();
        assert_eq!(props.name, "Props");
        assert_eq!(props.color.0, [0.75, 0.5, 0.25, 1.0]);
        assert_eq!(props.members[1], EntityRef::from("GlobalObjectId_V1-2-abc-2-0"));
        assert!(!props.visible);
        assert!(props.locked);
        assert!(props.is_root());
        let lights = store.get(&GroupId::from("7c1d")).unwrap();
        assert!(lights.visible);
        assert!(!persist::backup_path(&path).exists());

        store.save(&path).unwrap();
        assert_eq!(GroupStore::load(&path), store);
    }

    #[test]
    fn duplicate_ids_keep_the_first_record() {
        let a = Group::new("first");
        let mut b = Group::new("second");
        b.id = a.id.clone();
        let store = GroupStore::from_groups(vec![a, b]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].name, "first");
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        let (store, ..) = tree();
        store.save(&path).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(persist::temp_path(&path)).unwrap();
        assert!(GroupStore::new().save(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
