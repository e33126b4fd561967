//! Template-named groups, smart groups from clustering output, and
//! cleanup.

use chrono::Local;

use super::{Change, GroupEvent, GroupManager};
use crate::cache::MembershipIndex;
use crate::cluster::Partition;
use crate::entity::{EntityAttributes, EntityResolver};
use crate::error::GrouperError;
use crate::group::{GroupId, GroupType};
use crate::naming::{self, NameReference, NamingContext};

impl<H, C> GroupManager<H, C>
where
    H: EntityResolver,
    C: MembershipIndex<H::Entity>,
{
    /// Delete every group that has no members and no children. Folder
    /// groups are kept. Returns `None` if nothing was removed.
    pub fn cleanup_empty_groups(&mut self) -> Result<Option<Change>, GrouperError> {
        let empty: Vec<GroupId> = self
            .store
            .all()
            .iter()
            .filter(|g| {
                g.members.is_empty()
                    && g.group_type != GroupType::Folder
                    && self.store.children(&g.id).next().is_none()
            })
            .map(|g| g.id.clone())
            .collect();
        if empty.is_empty() {
            return Ok(None);
        }
        let removed = self.remove_all(&empty);
        log::info!("cleanup removed {} empty group(s)", removed.len());
        let change = Change::Deleted {
            removed,
            promoted: Vec::new(),
        };
        self.commit(true, vec![GroupEvent::Deleted(empty)], change).map(Some)
    }
}

impl<H, C> GroupManager<H, C>
where
    H: EntityAttributes,
    C: MembershipIndex<H::Entity>,
{
    /// Create a group named from `template` (the configured naming
    /// template if `None`), with `{count}` = number of groups + 1 and the
    /// first entity as the reference.
    pub fn create_named_group(
        &mut self,
        template: Option<&str>,
        entities: &[H::Entity],
    ) -> Result<(GroupId, Change), GrouperError> {
        let template = template.unwrap_or(self.settings.naming_template.as_str());
        let mut ctx = NamingContext::new(self.store.len() + 1);
        if let Some(first) = entities.first() {
            ctx = ctx.with_reference(NameReference::of(&self.host, first));
        }
        let name = naming::expand(template, &ctx);
        self.create_group(&name, entities)
    }

    /// Store clustering output: one [`GroupType::Smart`] group per
    /// non-empty partition, optionally under a new [`GroupType::Folder`]
    /// group named `folder`.
    ///
    /// Groups are named by `template` when given (`{count}` runs from 1,
    /// the partition's first entity is the reference), otherwise by the
    /// partition label. Everything is committed at once; the returned
    /// change reverts as a unit.
    pub fn create_smart_groups(
        &mut self,
        partitions: &[Partition<H::Entity>],
        template: Option<&str>,
        folder: Option<&str>,
    ) -> Result<(Vec<GroupId>, Change), GrouperError> {
        let timestamp = Local::now().naive_local();
        let mut changes = Vec::new();
        let mut events = Vec::new();

        let parent = folder.map(|name| {
            let group = self.new_group(name, GroupType::Folder, None, &[]);
            let id = group.id.clone();
            changes.push(Change::Created {
                group: group.clone(),
            });
            events.push(GroupEvent::Created(id.clone()));
            let _ = self.store.add(group);
            id
        });

        let mut created = Vec::new();
        for (i, part) in partitions.iter().filter(|p| !p.entities.is_empty()).enumerate() {
            let name = template.map_or_else(
                || naming::sanitize(&part.label),
                |t| {
                    let mut ctx = NamingContext::new(i + 1).at(timestamp);
                    if let Some(first) = part.entities.first() {
                        ctx = ctx.with_reference(NameReference::of(&self.host, first));
                    }
                    naming::expand(t, &ctx)
                },
            );
            let group = self.new_group(&name, GroupType::Smart, parent.clone(), &part.entities);
            let id = group.id.clone();
            changes.push(Change::Created {
                group: group.clone(),
            });
            events.push(GroupEvent::Created(id.clone()));
            let _ = self.store.add(group);
            created.push(id);
        }

        log::info!("created {} smart group(s)", created.len());
        let change = self.commit(true, events, Change::Batch { changes })?;
        Ok((created, change))
    }

    /// New names for `entities` from `template`, `{count}` running from 1.
    /// Nothing is renamed; the host applies the names.
    pub fn batch_rename(&self, entities: &[H::Entity], template: &str) -> Vec<(H::Entity, String)> {
        naming::batch_names(&self.host, entities, template, Local::now().naive_local())
    }
}
