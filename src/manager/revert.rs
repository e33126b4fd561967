//! Undo of returned [`Change`]s.

use super::hierarchy::apply_edit;
use super::{Change, GroupEvent, GroupManager, RemovedGroup};
use crate::cache::MembershipIndex;
use crate::entity::EntityControl;
use crate::error::GrouperError;
use crate::group::GroupId;

impl<H, C> GroupManager<H, C>
where
    H: EntityControl,
    C: MembershipIndex<H::Entity>,
{
    /// Apply the inverse of `change`. Changes must be reverted newest
    /// first; reverting out of order can fail with
    /// [`GrouperError::UnknownGroup`] or [`GrouperError::CycleDetected`],
    /// leaving the parts reverted so far in place. A failed write-through
    /// save is returned as is; the revert stays applied in memory.
    pub fn revert(&mut self, change: &Change) -> Result<(), GrouperError> {
        let mut rebuild = false;
        let undone = self.undo(change, &mut rebuild);
        let affected = change.affected();
        log::debug!("reverted change touching {} group(s)", affected.len());
        let committed = self.publish(rebuild, vec![GroupEvent::Reverted(affected)]);
        undone.and(committed)
    }

    fn undo(&mut self, change: &Change, rebuild: &mut bool) -> Result<(), GrouperError> {
        match change {
            Change::Created { group } => {
                // Children attached after creation go back to the root.
                let children: Vec<GroupId> =
                    self.store.children(&group.id).map(|g| g.id.clone()).collect();
                for child in &children {
                    if let Some(g) = self.store.get_mut(child) {
                        g.parent_id = None;
                    }
                }
                let _ = self
                    .store
                    .remove(&group.id)
                    .ok_or_else(|| GrouperError::UnknownGroup(group.id.clone()))?;
                *rebuild = true;
            }
            Change::Deleted { removed, promoted } => {
                self.check_restore(removed, promoted)?;
                for entry in removed {
                    if !self.store.insert_at(entry.index, entry.group.clone()) {
                        log::warn!("group {} already exists; not restored", entry.group.id);
                    }
                }
                if let Some(parent) = removed.first().map(|r| r.group.id.clone()) {
                    for child in promoted {
                        if let Some(g) = self.store.get_mut(child) {
                            g.parent_id = Some(parent.clone());
                        }
                    }
                }
                *rebuild = true;
            }
            Change::MembersAdded { group, refs } => {
                let g = self.require_mut(group)?;
                for entity_ref in refs {
                    let _ = g.remove_member(entity_ref);
                }
                *rebuild = true;
            }
            Change::MembersRemoved { group, removed } => {
                let g = self.require_mut(group)?;
                for member in removed.iter().rev() {
                    if !g.contains(&member.entity_ref) {
                        let index = member.index.min(g.members.len());
                        g.members.insert(index, member.entity_ref.clone());
                    }
                }
                *rebuild = true;
            }
            Change::StateChanged { flag, previous, .. } => {
                for (id, old) in previous {
                    let _ = self.apply_flag(id, *flag, *old);
                }
            }
            Change::ParentChanged {
                group, previous, ..
            } => {
                if let Some(parent) = previous {
                    let _ = self.require(parent)?;
                    if self.store.is_in_subtree(group, parent) {
                        return Err(GrouperError::CycleDetected {
                            child: group.clone(),
                            parent: parent.clone(),
                        });
                    }
                }
                self.require_mut(group)?.parent_id.clone_from(previous);
                *rebuild = true;
            }
            Change::Edited {
                group, previous, ..
            } => {
                let _ = apply_edit(self.require_mut(group)?, previous.clone());
            }
            Change::Batch { changes } => {
                for change in changes.iter().rev() {
                    self.undo(change, rebuild)?;
                }
            }
        }
        Ok(())
    }

    /// Reject restoring deleted groups whose parent is gone, or re-linking
    /// promoted children that would close a parent cycle.
    fn check_restore(
        &self,
        removed: &[RemovedGroup],
        promoted: &[GroupId],
    ) -> Result<(), GrouperError> {
        let restored = |id: &GroupId| removed.iter().any(|r| &r.group.id == id);
        for entry in removed {
            if let Some(parent) = &entry.group.parent_id {
                if !restored(parent) {
                    let _ = self.require(parent)?;
                }
            }
        }
        let Some(top) = removed.first().map(|r| &r.group) else {
            return Ok(());
        };
        for child in promoted {
            let _ = self.require(child)?;
            // The restored group hangs under its old parent, so a child
            // at or above that parent would become its own ancestor.
            if let Some(parent) = &top.parent_id {
                if self.store.is_in_subtree(child, parent) {
                    return Err(GrouperError::CycleDetected {
                        child: child.clone(),
                        parent: top.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{assert_cache_consistent, setup};
    use super::super::ManagerSettings;
    use super::*;
    use crate::cluster::Partition;
    use crate::options::DeletePolicy;
    use crate::scene::MemoryScene;
    use crate::store::GroupStore;

    #[test]
    fn undo_create_and_membership() {
        let (mut m, ids) = setup(3);
        let (g, created) = m.create_group("G", &ids[..1]).unwrap();
        let added = m.add_members(&g, &ids[1..]).unwrap().unwrap();
        let removed = m.remove_members(&g, &[ids[0], ids[2]]).unwrap().unwrap();

        m.revert(&removed).unwrap();
        assert_eq!(m.objects_in_group(&g), ids);
        m.revert(&added).unwrap();
        assert_eq!(m.objects_in_group(&g), ids[..1].to_vec());
        assert_cache_consistent(&m);
        m.revert(&created).unwrap();
        assert!(m.groups().is_empty());
        assert!(m.groups_for_entity(&ids[0]).is_empty());
    }

    #[test]
    fn undo_delete_restores_position_and_children() {
        let (mut m, ids) = setup(1);
        let (a, _) = m.create_group("A", &[]).unwrap();
        let (b, _) = m.create_group("B", &ids).unwrap();
        let (c, _) = m.create_group("C", &[]).unwrap();
        let _ = m.set_parent(&c, Some(&b)).unwrap();
        let before = m.store().clone();

        let deleted = m.delete_group(&b).unwrap();
        assert!(m.group(&c).unwrap().is_root());
        m.revert(&deleted).unwrap();
        assert_eq!(m.store(), &before);
        assert_eq!(m.groups()[0].id, a);
        assert_eq!(m.groups_for_entity(&ids[0])[0].id, b);
    }

    #[test]
    fn undo_cascading_delete() {
        let settings = ManagerSettings {
            delete_policy: DeletePolicy::Cascade,
            ..ManagerSettings::default()
        };
        let mut m = GroupManager::with_store(MemoryScene::new("L"), GroupStore::new(), settings);
        let _ = m.create_group("keep", &[]).unwrap();
        let (root, _) = m.create_group("root", &[]).unwrap();
        let (mid, _) = m.create_group("mid", &[]).unwrap();
        let (leaf, _) = m.create_group("leaf", &[]).unwrap();
        let _ = m.set_parent(&mid, Some(&root)).unwrap();
        let _ = m.set_parent(&leaf, Some(&mid)).unwrap();
        let before = m.store().clone();

        let deleted = m.delete_group(&root).unwrap();
        assert_eq!(m.groups().len(), 1);
        m.revert(&deleted).unwrap();
        assert_eq!(m.store(), &before);
    }

    #[test]
    fn undo_cascade_restores_each_groups_old_state() {
        let (mut m, ids) = setup(2);
        let (root, _) = m.create_group("root", &ids[..1]).unwrap();
        let (leaf, _) = m.create_group("leaf", &ids[1..]).unwrap();
        let _ = m.set_parent(&leaf, Some(&root)).unwrap();
        let _ = m.set_visibility(&leaf, false).unwrap();

        let change = m.set_visibility(&root, false).unwrap();
        m.revert(&change).unwrap();
        assert!(m.group(&root).unwrap().visible);
        assert!(!m.group(&leaf).unwrap().visible);
        assert!(m.host().object(ids[0]).unwrap().active);
        assert!(!m.host().object(ids[1]).unwrap().active);
    }

    #[test]
    fn undo_delete_refuses_to_close_a_cycle() {
        let (mut m, _) = setup(0);
        let (p, _) = m.create_group("P", &[]).unwrap();
        let (b, _) = m.create_group("B", &[]).unwrap();
        let (c, _) = m.create_group("C", &[]).unwrap();
        let _ = m.set_parent(&b, Some(&p)).unwrap();
        let _ = m.set_parent(&c, Some(&b)).unwrap();
        let deleted = m.delete_group(&b).unwrap();
        let _ = m.set_parent(&p, Some(&c)).unwrap();
        let before = m.store().clone();

        assert!(matches!(m.revert(&deleted), Err(GrouperError::CycleDetected { .. })));
        assert_eq!(m.store(), &before);
        assert!(m.group(&b).is_none());
    }

    #[test]
    fn undo_delete_needs_the_old_parent() {
        let (mut m, _) = setup(0);
        let (p, _) = m.create_group("P", &[]).unwrap();
        let (b, _) = m.create_group("B", &[]).unwrap();
        let _ = m.set_parent(&b, Some(&p)).unwrap();
        let deleted_b = m.delete_group(&b).unwrap();
        let deleted_p = m.delete_group(&p).unwrap();

        assert!(matches!(m.revert(&deleted_b), Err(GrouperError::UnknownGroup(id)) if id == p));
        assert!(m.groups().is_empty());
        // Newest first works.
        m.revert(&deleted_p).unwrap();
        m.revert(&deleted_b).unwrap();
        assert_eq!(m.group(&b).unwrap().parent_id, Some(p));
    }

    #[test]
    fn undo_reparent_and_edit() {
        let (mut m, _) = setup(0);
        let (a, _) = m.create_group("A", &[]).unwrap();
        let (b, _) = m.create_group("B", &[]).unwrap();
        let moved = m.set_parent(&a, Some(&b)).unwrap();
        let renamed = m.rename_group(&a, "Renamed").unwrap();
        m.revert(&renamed).unwrap();
        m.revert(&moved).unwrap();
        assert_eq!(m.group(&a).unwrap().name, "A");
        assert!(m.group(&a).unwrap().is_root());
    }

    #[test]
    fn out_of_order_reparent_undo_is_rejected() {
        let (mut m, _) = setup(0);
        let (a, _) = m.create_group("A", &[]).unwrap();
        let (b, _) = m.create_group("B", &[]).unwrap();
        let _ = m.set_parent(&a, Some(&b)).unwrap();
        let detach = m.set_parent(&a, None).unwrap();
        let _ = m.set_parent(&b, Some(&a)).unwrap();
        // Putting a back under b would now close a loop.
        assert!(matches!(m.revert(&detach), Err(GrouperError::CycleDetected { .. })));
        assert_eq!(m.group(&b).unwrap().parent_id, Some(a.clone()));
        assert!(m.group(&a).unwrap().is_root());
    }

    #[test]
    fn undo_smart_group_batch() {
        let (mut m, ids) = setup(2);
        let parts = vec![Partition {
            label: "p".to_owned(),
            entities: ids.clone(),
        }];
        let (_, change) = m.create_smart_groups(&parts, None, Some("Folder")).unwrap();
        assert_eq!(m.groups().len(), 2);
        m.revert(&change).unwrap();
        assert!(m.groups().is_empty());
    }
}
