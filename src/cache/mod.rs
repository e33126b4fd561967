//! Membership cache: derived entity -> groups reverse index.
//!
//! The index is rebuilt in full from the [`GroupStore`] whenever group
//! structure, membership, or the set of live entities may have changed.
//! [`MembershipIndex`] is the seam for alternative strategies (e.g. an
//! incrementally maintained index); the manager only talks to the trait.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::entity::EntityResolver;
use crate::group::GroupId;
use crate::store::GroupStore;

/// Query/rebuild interface of a reverse membership index.
pub trait MembershipIndex<E> {
    /// Recompute the index from every group in `store`.
    fn rebuild<R>(&mut self, store: &GroupStore, resolver: &R)
    where
        R: EntityResolver<Entity = E>;

    /// Groups containing `entity`, in store order. Empty if none.
    fn groups_of(&self, entity: &E) -> &[GroupId];
}

/// Full-rebuild reverse index.
#[derive(Debug, Clone)]
pub struct MembershipCache<E> {
    map: FxHashMap<E, Vec<GroupId>>,
    generation: u64,
}

impl<E> Default for MembershipCache<E> {
    fn default() -> Self {
        Self {
            map: FxHashMap::default(),
            generation: 0,
        }
    }
}

impl<E: Eq + Hash> MembershipCache<E> {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct live entities that belong to at least one group.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.map.len()
    }

    /// Number of rebuilds performed so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<E: Clone + Eq + Hash> MembershipIndex<E> for MembershipCache<E> {
    fn rebuild<R>(&mut self, store: &GroupStore, resolver: &R)
    where
        R: EntityResolver<Entity = E>,
    {
        self.map.clear();
        let mut unresolved = 0usize;
        for group in store.all() {
            for member in &group.members {
                let Some(entity) = resolver.resolve(member) else {
                    unresolved += 1;
                    continue;
                };
                let groups = self.map.entry(entity).or_default();
                // Two refs of one group may resolve to the same entity.
                if groups.last() != Some(&group.id) {
                    groups.push(group.id.clone());
                }
            }
        }
        self.generation += 1;
        log::debug!(
            "membership cache rebuild #{}: {} entities, {} unresolved refs",
            self.generation,
            self.entity_count(),
            unresolved
        );
    }

    fn groups_of(&self, entity: &E) -> &[GroupId] {
        self.map.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }
}
