//! The group manager: the single writer of the group store.
//!
//! [`GroupManager`] owns the [`GroupStore`], a [`MembershipIndex`] and the
//! host scene. Every mutating call validates its input, applies the edit,
//! rebuilds the index when membership or structure changed, writes the
//! store through to disk, and finally notifies observers. It returns a
//! [`Change`] describing what happened so callers can undo it with
//! [`GroupManager::revert`].
//!
//! The impl is split by concern:
//!
//! - `hierarchy`: create, delete, reparent, descriptive edits
//! - `membership`: add/remove members
//! - `cascade`: visibility/lock propagation down a subtree
//! - `automation`: template naming, smart groups, cleanup
//! - `revert`: undo of returned changes

mod automation;
mod cascade;
mod change;
mod events;
mod hierarchy;
mod membership;
mod revert;

use std::path::{Path, PathBuf};

pub use change::{
    Change, GroupEdit, GroupFlag, RemovedGroup, RemovedMember,
};
pub use events::GroupEvent;
use serde::Serialize;

use self::events::Observer;
use crate::cache::{MembershipCache, MembershipIndex};
use crate::entity::EntityResolver;
use crate::error::GrouperError;
use crate::group::{Group, GroupColor, GroupId};
use crate::options::{DeletePolicy, GrouperOptions};
use crate::store::GroupStore;

/// Runtime settings of a [`GroupManager`], usually derived from
/// [`GrouperOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerSettings {
    /// Store file. `None` keeps the store in memory only.
    pub store_path: Option<PathBuf>,
    /// Save after every mutating call (otherwise only on
    /// [`GroupManager::save`] / [`GroupManager::shutdown`]).
    pub write_through: bool,
    /// Child handling on delete.
    pub delete_policy: DeletePolicy,
    /// Name for groups created without one.
    pub default_name: String,
    /// Template for [`GroupManager::create_named_group`].
    pub naming_template: String,
    /// Saturation of random group colors.
    pub color_saturation: f32,
    /// Value of random group colors.
    pub color_value: f32,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        let mut settings = Self::from(&GrouperOptions::default());
        settings.store_path = None;
        settings
    }
}

impl From<&GrouperOptions> for ManagerSettings {
    fn from(options: &GrouperOptions) -> Self {
        Self {
            store_path: Some(options.store.path.clone()),
            write_through: options.store.persist,
            delete_policy: options.groups.delete_policy,
            default_name: options.groups.default_name.clone(),
            naming_template: options.groups.naming_template.clone(),
            color_saturation: options.groups.color_saturation,
            color_value: options.groups.color_value,
        }
    }
}

/// Summary counts over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStatistics {
    /// Number of groups.
    pub groups: usize,
    /// Number of root groups.
    pub roots: usize,
    /// Member refs across all groups.
    pub member_refs: usize,
    /// Member refs that currently resolve to a live entity.
    pub resolved_members: usize,
}

/// Owns the group store, the membership index and the host scene.
pub struct GroupManager<
    H: EntityResolver,
    C = MembershipCache<<H as EntityResolver>::Entity>,
> {
    host: H,
    store: GroupStore,
    cache: C,
    settings: ManagerSettings,
    observers: Vec<Observer>,
}

impl<H: EntityResolver> GroupManager<H> {
    /// Manager over `host`, loading the store from `settings.store_path`
    /// (an absent or corrupt file starts empty).
    pub fn new(host: H, settings: ManagerSettings) -> Self {
        let store = settings
            .store_path
            .as_deref()
            .map_or_else(GroupStore::new, GroupStore::load);
        log::info!(
            "group manager started with {} groups from {}",
            store.len(),
            settings
                .store_path
                .as_deref()
                .map_or_else(|| "memory".to_owned(), |p| p.display().to_string())
        );
        Self::with_index(host, store, settings, MembershipCache::new())
    }

    /// In-memory manager with default settings.
    pub fn in_memory(host: H) -> Self {
        Self::with_store(host, GroupStore::new(), ManagerSettings::default())
    }

    /// Manager over an already loaded store.
    pub fn with_store(host: H, store: GroupStore, settings: ManagerSettings) -> Self {
        Self::with_index(host, store, settings, MembershipCache::new())
    }
}

impl<H, C> GroupManager<H, C>
where
    H: EntityResolver,
    C: MembershipIndex<H::Entity>,
{
    /// Manager with a custom membership index strategy.
    pub fn with_index(host: H, store: GroupStore, settings: ManagerSettings, cache: C) -> Self {
        let mut manager = Self {
            host,
            store,
            cache,
            settings,
            observers: Vec::new(),
        };
        manager.rebuild();
        manager
    }

    // -- Lifecycle --

    /// The host scene.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access. Call [`refresh`](Self::refresh) after changing
    /// which entities are live.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current settings.
    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Read-only store access.
    pub fn store(&self) -> &GroupStore {
        &self.store
    }

    /// Register a listener called after every committed change.
    pub fn on_change(&mut self, observer: impl FnMut(&GroupEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The live-entity universe changed (scene loaded/unloaded): rebuild
    /// the membership index.
    pub fn refresh(&mut self) {
        self.rebuild();
    }

    /// Write the store to the configured path. No-op without one.
    pub fn save(&self) -> Result<(), GrouperError> {
        match &self.settings.store_path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    /// Write the store to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), GrouperError> {
        self.store.save(path)
    }

    /// End the session: save the store and hand back the host.
    pub fn shutdown(self) -> Result<H, GrouperError> {
        self.save()?;
        log::info!("group manager shut down ({} groups)", self.store.len());
        Ok(self.host)
    }

    fn rebuild(&mut self) {
        self.cache.rebuild(&self.store, &self.host);
    }

    fn random_color(&self) -> GroupColor {
        GroupColor::random_with(self.settings.color_saturation, self.settings.color_value)
    }

    /// Finish a mutation described by `change`. If the write-through save
    /// fails the edit stays applied in memory and `change` comes back
    /// inside [`GrouperError::NotSaved`], so the caller can revert it or
    /// retry [`save`](Self::save).
    fn commit(
        &mut self,
        rebuild: bool,
        events: Vec<GroupEvent>,
        change: Change,
    ) -> Result<Change, GrouperError> {
        match self.publish(rebuild, events) {
            Ok(()) => Ok(change),
            Err(source) => Err(GrouperError::NotSaved {
                change: Box::new(change),
                source: Box::new(source),
            }),
        }
    }

    /// Rebuild the index if needed, write through, then notify observers.
    /// Observers are told even when the save fails.
    fn publish(&mut self, rebuild: bool, events: Vec<GroupEvent>) -> Result<(), GrouperError> {
        if rebuild {
            self.rebuild();
        }
        let saved = if self.settings.write_through {
            self.save()
        } else {
            Ok(())
        };
        if let Err(e) = &saved {
            log::warn!("group store not saved: {e}");
        }
        for observer in &mut self.observers {
            for event in &events {
                observer(event);
            }
        }
        saved
    }

    fn require(&self, id: &GroupId) -> Result<&Group, GrouperError> {
        self.store
            .get(id)
            .ok_or_else(|| GrouperError::UnknownGroup(id.clone()))
    }

    fn require_mut(&mut self, id: &GroupId) -> Result<&mut Group, GrouperError> {
        self.store
            .get_mut(id)
            .ok_or_else(|| GrouperError::UnknownGroup(id.clone()))
    }

    // -- Queries --

    /// Look up a group.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.store.get(id)
    }

    /// All groups in display order.
    pub fn groups(&self) -> &[Group] {
        self.store.all()
    }

    /// Live entities of a group's members. Unresolvable refs are skipped;
    /// an unknown group yields nothing.
    pub fn objects_in_group(&self, id: &GroupId) -> Vec<H::Entity> {
        self.store.get(id).map_or_else(Vec::new, |g| {
            g.members
                .iter()
                .filter_map(|r| self.host.resolve(r))
                .collect()
        })
    }

    /// Groups containing `entity`, in store order.
    pub fn groups_for_entity(&self, entity: &H::Entity) -> Vec<&Group> {
        self.cache
            .groups_of(entity)
            .iter()
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    /// Direct children of a group.
    pub fn children(&self, id: &GroupId) -> Vec<&Group> {
        self.store.children(id).collect()
    }

    /// Groups without a parent.
    pub fn root_groups(&self) -> Vec<&Group> {
        self.store.roots().collect()
    }

    /// Parent chain of a group, nearest first.
    pub fn ancestors(&self, id: &GroupId) -> Vec<&Group> {
        self.store
            .ancestors(id)
            .iter()
            .filter_map(|a| self.store.get(a))
            .collect()
    }

    /// Every transitive child of a group in pre-order (the group itself
    /// excluded).
    pub fn descendants(&self, id: &GroupId) -> Vec<&Group> {
        self.store
            .subtree(id)
            .iter()
            .skip(1)
            .filter_map(|d| self.store.get(d))
            .collect()
    }

    /// Groups whose name contains `needle`, ignoring case.
    pub fn find_groups_by_name(&self, needle: &str) -> Vec<&Group> {
        let needle = needle.to_lowercase();
        self.store
            .all()
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Summary counts.
    pub fn statistics(&self) -> GroupStatistics {
        let groups = self.store.all();
        GroupStatistics {
            groups: groups.len(),
            roots: self.store.roots().count(),
            member_refs: groups.iter().map(|g| g.members.len()).sum(),
            resolved_members: groups
                .iter()
                .flat_map(|g| &g.members)
                .filter(|r| self.host.resolve(r).is_some())
                .count(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;
    use crate::entity::EntityRef;
    use crate::scene::{MemoryScene, ObjectId, SceneObject};

    /// Manager over a scene with `n` objects spaced along X.
    pub(crate) fn setup(n: usize) -> (GroupManager<MemoryScene>, Vec<ObjectId>) {
        let mut scene = MemoryScene::new("Level");
        let ids = (0..n)
            .map(|i| {
                scene.spawn(
                    SceneObject::new(format!("guid-{i}"), format!("Obj{i}"))
                        .at(Vec3::new(i as f32, 0.0, 0.0)),
                )
            })
            .collect();
        (GroupManager::in_memory(scene), ids)
    }

    /// Every live entity appears in exactly the groups that contain it.
    pub(crate) fn assert_cache_consistent(manager: &GroupManager<MemoryScene>) {
        for id in manager.host().ids() {
            let expected: Vec<&GroupId> = manager
                .groups()
                .iter()
                .filter(|g| {
                    g.members
                        .iter()
                        .any(|r| manager.host().resolve(r) == Some(id))
                })
                .map(|g| &g.id)
                .collect();
            let actual: Vec<&GroupId> = manager
                .groups_for_entity(&id)
                .iter()
                .map(|g| &g.id)
                .collect();
            assert_eq!(actual, expected, "cache mismatch for {id:?}");
        }
    }

    #[test]
    fn queries_follow_the_tree() {
        let (mut m, ids) = setup(3);
        let (root, _) = m.create_group("Root Walls", &ids[..2]).unwrap();
        let (child, _) = m.create_group("Inner", &[]).unwrap();
        let (leaf, _) = m.create_group("Leaf", &[ids[2]]).unwrap();
        let _ = m.set_parent(&child, Some(&root)).unwrap();
        let _ = m.set_parent(&leaf, Some(&child)).unwrap();

        assert_eq!(m.root_groups().len(), 1);
        assert_eq!(m.children(&root)[0].id, child);
        let chain: Vec<&str> = m.ancestors(&leaf).iter().map(|g| g.name.as_str()).collect();
        assert_eq!(chain, ["Inner", "Root Walls"]);
        let below: Vec<&GroupId> = m.descendants(&root).iter().map(|g| &g.id).collect();
        assert_eq!(below, [&child, &leaf]);
        assert_eq!(m.find_groups_by_name("wall").len(), 1);
        assert_eq!(m.objects_in_group(&root), ids[..2].to_vec());
        assert!(m.objects_in_group(&GroupId::from("nope")).is_empty());
    }

    #[test]
    fn statistics_count_resolvable_members() {
        let (mut m, ids) = setup(2);
        let (g, _) = m.create_group("G", &ids).unwrap();
        let _ = m.add_member_refs(&g, &[EntityRef::new("unloaded")]).unwrap();
        let stats = m.statistics();
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.roots, 1);
        assert_eq!(stats.member_refs, 3);
        assert_eq!(stats.resolved_members, 2);
    }

    #[test]
    fn unloaded_members_reappear_after_refresh() {
        let (mut m, ids) = setup(2);
        let (g, _) = m.create_group("G", &ids).unwrap();
        let object = m.host_mut().despawn(ids[0]).unwrap();
        m.refresh();
        // The ref stays in the group while its entity is gone.
        assert_eq!(m.group(&g).unwrap().members.len(), 2);
        assert_eq!(m.objects_in_group(&g), vec![ids[1]]);

        let again = m.host_mut().spawn(object);
        m.refresh();
        assert_eq!(m.groups_for_entity(&again)[0].id, g);
        assert_cache_consistent(&m);
    }

    #[test]
    fn observers_see_committed_events() {
        let (mut m, ids) = setup(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        m.on_change(move |e| sink.borrow_mut().push(e.clone()));

        let (g, _) = m.create_group("G", &[]).unwrap();
        let _ = m.add_members(&g, &ids).unwrap();
        let _ = m.set_expanded(&g, false).unwrap();
        let _ = m.delete_group(&g).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                GroupEvent::Created(g.clone()),
                GroupEvent::MembershipChanged(g.clone()),
                GroupEvent::Deleted(vec![g]),
            ]
        );
    }

    #[test]
    fn write_through_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ProjectSettings").join("groups.json");
        let settings = ManagerSettings {
            store_path: Some(path.clone()),
            ..ManagerSettings::default()
        };
        let mut scene = MemoryScene::new("Level");
        let a = scene.spawn(SceneObject::new("a", "A"));
        let mut m = GroupManager::new(scene, settings.clone());
        let (parent, _) = m.create_group("Parent", &[a]).unwrap();
        let (child, _) = m.create_group("Child", &[a]).unwrap();
        let _ = m.set_parent(&child, Some(&parent)).unwrap();
        let _ = m.set_locked(&parent, true).unwrap();
        assert!(path.exists());

        let scene = m.shutdown().unwrap();
        let reloaded = GroupManager::new(scene, settings);
        assert_eq!(reloaded.groups().len(), 2);
        assert_eq!(reloaded.group(&child).unwrap().parent_id, Some(parent.clone()));
        assert!(reloaded.group(&child).unwrap().locked);
        assert_eq!(reloaded.groups_for_entity(&a).len(), 2);
    }

    #[test]
    fn failed_save_hands_back_the_change() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let settings = ManagerSettings {
            store_path: Some(blocker.join("groups.json")),
            ..ManagerSettings::default()
        };
        let mut m = GroupManager::new(MemoryScene::new("Level"), settings);

        let err = m.create_group("G", &[]).unwrap_err();
        assert!(matches!(err, GrouperError::NotSaved { .. }));
        let change = err.unsaved_change().unwrap().clone();
        assert!(matches!(&change, Change::Created { group } if group.name == "G"));
        assert_eq!(m.groups().len(), 1);

        // Reverting still cannot save, but drops the edit in memory.
        assert!(m.revert(&change).is_err());
        assert!(m.groups().is_empty());
    }

    #[test]
    fn without_write_through_only_shutdown_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        let settings = ManagerSettings {
            store_path: Some(path.clone()),
            write_through: false,
            ..ManagerSettings::default()
        };
        let mut m = GroupManager::new(MemoryScene::new("Level"), settings);
        let _ = m.create_group("G", &[]).unwrap();
        assert!(!path.exists());
        let _ = m.shutdown().unwrap();
        assert_eq!(GroupStore::load(&path).len(), 1);
    }

    #[test]
    fn settings_from_options() {
        let mut options = GrouperOptions::default();
        options.groups.delete_policy = DeletePolicy::Reject;
        options.store.persist = false;
        let settings = ManagerSettings::from(&options);
        assert_eq!(settings.delete_policy, DeletePolicy::Reject);
        assert!(!settings.write_through);
        assert!(settings.store_path.is_some());
        assert!(ManagerSettings::default().store_path.is_none());
    }
}
