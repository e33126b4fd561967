//! Group lifecycle, reparenting and descriptive edits.

use super::{Change, GroupEdit, GroupEvent, GroupManager, RemovedGroup};
use crate::cache::MembershipIndex;
use crate::entity::EntityResolver;
use crate::error::GrouperError;
use crate::group::{Group, GroupColor, GroupId, GroupType};
use crate::options::DeletePolicy;

impl<H, C> GroupManager<H, C>
where
    H: EntityResolver,
    C: MembershipIndex<H::Entity>,
{
    /// Create a root group, optionally with initial members. An empty
    /// `name` uses the configured default name.
    pub fn create_group(
        &mut self,
        name: &str,
        entities: &[H::Entity],
    ) -> Result<(GroupId, Change), GrouperError> {
        let group = self.new_group(name, GroupType::Manual, None, entities);
        let id = group.id.clone();
        log::info!("created group '{}' ({id})", group.name);
        let change = Change::Created {
            group: group.clone(),
        };
        let _ = self.store.add(group);
        let change = self.commit(true, vec![GroupEvent::Created(id.clone())], change)?;
        Ok((id, change))
    }

    /// Build (but do not store) a group with live members.
    pub(super) fn new_group(
        &self,
        name: &str,
        group_type: GroupType,
        parent: Option<GroupId>,
        entities: &[H::Entity],
    ) -> Group {
        let name = if name.trim().is_empty() {
            self.settings.default_name.as_str()
        } else {
            name
        };
        let mut group = Group::new(name).with_type(group_type);
        group.color = self.random_color();
        group.parent_id = parent;
        for entity_ref in self.live_refs(entities) {
            let _ = group.add_member(entity_ref);
        }
        group
    }

    /// Delete a group. Its children are handled by the configured
    /// [`DeletePolicy`].
    pub fn delete_group(&mut self, id: &GroupId) -> Result<Change, GrouperError> {
        let _ = self.require(id)?;
        let children: Vec<GroupId> = self.store.children(id).map(|g| g.id.clone()).collect();

        let (victims, promoted) = match self.settings.delete_policy {
            DeletePolicy::Reject if !children.is_empty() => {
                return Err(GrouperError::HasChildren(id.clone()));
            }
            DeletePolicy::Cascade => (self.store.subtree(id), Vec::new()),
            DeletePolicy::PromoteChildren | DeletePolicy::Reject => (vec![id.clone()], children),
        };

        for child in &promoted {
            if let Some(g) = self.store.get_mut(child) {
                g.parent_id = None;
            }
        }
        let removed = self.remove_all(&victims);
        log::info!(
            "deleted {} group(s), promoted {} child group(s) to root",
            removed.len(),
            promoted.len()
        );
        self.commit(
            true,
            vec![GroupEvent::Deleted(victims)],
            Change::Deleted { removed, promoted },
        )
    }

    /// Remove `ids` from the store, returning them in ascending original
    /// index order.
    pub(super) fn remove_all(&mut self, ids: &[GroupId]) -> Vec<RemovedGroup> {
        let mut indexed: Vec<usize> = ids.iter().filter_map(|id| self.store.index_of(id)).collect();
        indexed.sort_unstable();
        let mut removed = Vec::with_capacity(indexed.len());
        for &index in indexed.iter().rev() {
            let id = self.store.all()[index].id.clone();
            if let Some(group) = self.store.remove(&id) {
                removed.push(RemovedGroup { index, group });
            }
        }
        removed.reverse();
        removed
    }

    /// Move `child` under `parent` (`None` makes it a root).
    ///
    /// Fails with [`GrouperError::CycleDetected`] if `parent` is `child`
    /// or one of its descendants; the store is left unchanged.
    pub fn set_parent(
        &mut self,
        child: &GroupId,
        parent: Option<&GroupId>,
    ) -> Result<Change, GrouperError> {
        let previous = self.require(child)?.parent_id.clone();
        if let Some(parent) = parent {
            let _ = self.require(parent)?;
            if self.store.is_in_subtree(child, parent) {
                return Err(GrouperError::CycleDetected {
                    child: child.clone(),
                    parent: parent.clone(),
                });
            }
        }
        let current = parent.cloned();
        self.require_mut(child)?.parent_id.clone_from(&current);
        self.commit(
            true,
            vec![GroupEvent::Reparented {
                group: child.clone(),
                parent: current.clone(),
            }],
            Change::ParentChanged {
                group: child.clone(),
                previous,
                current,
            },
        )
    }

    // -- Descriptive edits --

    /// Rename a group.
    pub fn rename_group(&mut self, id: &GroupId, name: &str) -> Result<Change, GrouperError> {
        self.edit(id, GroupEdit::Name(name.to_owned()))
    }

    /// Recolor a group.
    pub fn set_color(&mut self, id: &GroupId, color: GroupColor) -> Result<Change, GrouperError> {
        self.edit(id, GroupEdit::Color(color))
    }

    /// Replace a group's description.
    pub fn set_description(&mut self, id: &GroupId, text: &str) -> Result<Change, GrouperError> {
        self.edit(id, GroupEdit::Description(text.to_owned()))
    }

    /// Replace a group's tags.
    pub fn set_tags(&mut self, id: &GroupId, tags: Vec<String>) -> Result<Change, GrouperError> {
        self.edit(id, GroupEdit::Tags(tags))
    }

    /// Change a group's provenance tag.
    pub fn set_group_type(
        &mut self,
        id: &GroupId,
        group_type: GroupType,
    ) -> Result<Change, GrouperError> {
        self.edit(id, GroupEdit::Type(group_type))
    }

    /// Persist the UI expansion state. Observers are not notified.
    pub fn set_expanded(&mut self, id: &GroupId, expanded: bool) -> Result<Change, GrouperError> {
        self.edit(id, GroupEdit::Expanded(expanded))
    }

    /// Apply one field edit and return the change.
    pub fn edit(&mut self, id: &GroupId, edit: GroupEdit) -> Result<Change, GrouperError> {
        let previous = apply_edit(self.require_mut(id)?, edit.clone());
        let events = if matches!(edit, GroupEdit::Expanded(_)) {
            Vec::new()
        } else {
            vec![GroupEvent::Edited(id.clone())]
        };
        self.commit(
            false,
            events,
            Change::Edited {
                group: id.clone(),
                previous,
                current: edit,
            },
        )
    }
}

/// Write `edit` into `group`, returning the value it replaced.
pub(super) fn apply_edit(group: &mut Group, edit: GroupEdit) -> GroupEdit {
    match edit {
        GroupEdit::Name(v) => GroupEdit::Name(std::mem::replace(&mut group.name, v)),
        GroupEdit::Color(v) => GroupEdit::Color(std::mem::replace(&mut group.color, v)),
        GroupEdit::Description(v) => {
            GroupEdit::Description(std::mem::replace(&mut group.description, v))
        }
        GroupEdit::Tags(v) => GroupEdit::Tags(std::mem::replace(&mut group.tags, v)),
        GroupEdit::Type(v) => GroupEdit::Type(std::mem::replace(&mut group.group_type, v)),
        GroupEdit::Expanded(v) => GroupEdit::Expanded(std::mem::replace(&mut group.expanded, v)),
    }
}
