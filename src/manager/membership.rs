//! Adding and removing group members.

use super::{Change, GroupEvent, GroupManager, RemovedMember};
use crate::cache::MembershipIndex;
use crate::entity::{EntityRef, EntityResolver};
use crate::error::GrouperError;
use crate::group::GroupId;

impl<H, C> GroupManager<H, C>
where
    H: EntityResolver,
    C: MembershipIndex<H::Entity>,
{
    /// Durable refs of the live entities among `entities`. Handles whose
    /// ref does not resolve back to them (dead handles) are skipped.
    pub(super) fn live_refs(&self, entities: &[H::Entity]) -> Vec<EntityRef> {
        entities
            .iter()
            .filter_map(|e| {
                let r = self.host.make_ref(e);
                (self.host.resolve(&r).as_ref() == Some(e)).then_some(r)
            })
            .collect()
    }

    /// Add live entities to a group. Dead handles and existing members are
    /// skipped. Returns `None` (and writes nothing) if nothing changed.
    pub fn add_members(
        &mut self,
        id: &GroupId,
        entities: &[H::Entity],
    ) -> Result<Option<Change>, GrouperError> {
        let refs = self.live_refs(entities);
        self.add_member_refs(id, &refs)
    }

    /// Add refs directly, whether or not they currently resolve.
    pub fn add_member_refs(
        &mut self,
        id: &GroupId,
        refs: &[EntityRef],
    ) -> Result<Option<Change>, GrouperError> {
        let group = self.require_mut(id)?;
        let added: Vec<EntityRef> = refs
            .iter()
            .filter(|r| group.add_member((*r).clone()))
            .cloned()
            .collect();
        if added.is_empty() {
            return Ok(None);
        }
        log::debug!("added {} member(s) to group {id}", added.len());
        let change = Change::MembersAdded {
            group: id.clone(),
            refs: added,
        };
        self.commit(true, vec![GroupEvent::MembershipChanged(id.clone())], change)
            .map(Some)
    }

    /// Remove live entities from a group. Absent members are skipped.
    /// Returns `None` (and writes nothing) if nothing changed.
    pub fn remove_members(
        &mut self,
        id: &GroupId,
        entities: &[H::Entity],
    ) -> Result<Option<Change>, GrouperError> {
        let refs: Vec<EntityRef> = entities.iter().map(|e| self.host.make_ref(e)).collect();
        self.remove_member_refs(id, &refs)
    }

    /// Remove refs directly.
    pub fn remove_member_refs(
        &mut self,
        id: &GroupId,
        refs: &[EntityRef],
    ) -> Result<Option<Change>, GrouperError> {
        let group = self.require_mut(id)?;
        let mut removed = Vec::new();
        for entity_ref in refs {
            if let Some(index) = group.members.iter().position(|m| m == entity_ref) {
                let entity_ref = group.members.remove(index);
                removed.push(RemovedMember { index, entity_ref });
            }
        }
        if removed.is_empty() {
            return Ok(None);
        }
        log::debug!("removed {} member(s) from group {id}", removed.len());
        let change = Change::MembersRemoved {
            group: id.clone(),
            removed,
        };
        self.commit(true, vec![GroupEvent::MembershipChanged(id.clone())], change)
            .map(Some)
    }
}
