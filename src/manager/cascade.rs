//! Visibility and lock propagation down a subtree.
//!
//! The subtree is walked once in depth-first pre-order: a group's flag and
//! its members' side effects are applied before any of its children, so a
//! child's own flag is overwritten top-down. The index is not rebuilt
//! (membership does not change) and the store is written once.

use super::{Change, GroupEvent, GroupFlag, GroupManager};
use crate::cache::MembershipIndex;
use crate::entity::EntityControl;
use crate::error::GrouperError;
use crate::group::{Group, GroupId};

impl<H, C> GroupManager<H, C>
where
    H: EntityControl,
    C: MembershipIndex<H::Entity>,
{
    /// Show or hide a group, its members and its whole subtree.
    pub fn set_visibility(&mut self, id: &GroupId, visible: bool) -> Result<Change, GrouperError> {
        self.cascade(id, GroupFlag::Visible, visible)
    }

    /// Lock or unlock a group, its members and its whole subtree. Locked
    /// members cannot be picked.
    pub fn set_locked(&mut self, id: &GroupId, locked: bool) -> Result<Change, GrouperError> {
        self.cascade(id, GroupFlag::Locked, locked)
    }

    fn cascade(&mut self, id: &GroupId, flag: GroupFlag, value: bool) -> Result<Change, GrouperError> {
        let _ = self.require(id)?;
        let order = self.store.subtree(id);
        let mut previous = Vec::with_capacity(order.len());
        for gid in &order {
            if let Some(old) = self.apply_flag(gid, flag, value) {
                previous.push((gid.clone(), old));
            }
        }
        log::debug!("{flag:?} = {value} cascaded over {} group(s)", previous.len());
        self.commit(
            false,
            vec![GroupEvent::StateChanged(order)],
            Change::StateChanged {
                flag,
                value,
                previous,
            },
        )
    }

    /// Set one group's flag and apply the side effect to its live members.
    /// Returns the old flag, or `None` for an unknown group.
    pub(super) fn apply_flag(&mut self, id: &GroupId, flag: GroupFlag, value: bool) -> Option<bool> {
        let group = self.store.get_mut(id)?;
        let slot = flag_mut(group, flag);
        let old = std::mem::replace(slot, value);
        let live: Vec<H::Entity> = group
            .members
            .iter()
            .filter_map(|r| self.host.resolve(r))
            .collect();
        for entity in &live {
            match flag {
                GroupFlag::Visible => self.host.set_active(entity, value),
                GroupFlag::Locked => self.host.set_pickable(entity, !value),
            }
        }
        Some(old)
    }
}

fn flag_mut(group: &mut Group, flag: GroupFlag) -> &mut bool {
    match flag {
        GroupFlag::Visible => &mut group.visible,
        GroupFlag::Locked => &mut group.locked,
    }
}
