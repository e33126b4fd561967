//! Serializable descriptions of applied edits.
//!
//! Every mutating [`GroupManager`](super::GroupManager) call returns a
//! [`Change`] carrying enough before/after state to undo it with
//! [`GroupManager::revert`](super::GroupManager::revert). The manager keeps
//! no history itself; callers own their undo stacks.

use serde::{Deserialize, Serialize};

use crate::entity::EntityRef;
use crate::group::{Group, GroupColor, GroupId, GroupType};

/// A group removed from the store, with its display position at removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedGroup {
    /// Store index before the delete.
    pub index: usize,
    /// Full record.
    pub group: Group,
}

/// A member ref removed from a group, with its position at removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedMember {
    /// Index in the member list at the time it was removed.
    pub index: usize,
    /// The removed ref.
    pub entity_ref: EntityRef,
}

/// Which cascading flag a state change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupFlag {
    /// `visible`; members are activated/deactivated.
    Visible,
    /// `locked`; members are made unpickable/pickable.
    Locked,
}

/// A single-field group edit, used for both the old and the new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEdit {
    /// Display name.
    Name(String),
    /// Display color.
    Color(GroupColor),
    /// Description text.
    Description(String),
    /// Tag list.
    Tags(Vec<String>),
    /// Provenance tag.
    Type(GroupType),
    /// UI expansion state.
    Expanded(bool),
}

/// One applied edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// A group was created (snapshot after creation).
    Created {
        /// The new group.
        group: Group,
    },
    /// Groups were deleted.
    Deleted {
        /// Removed groups in ascending store index order.
        removed: Vec<RemovedGroup>,
        /// Children of the deleted group that were promoted to root.
        promoted: Vec<GroupId>,
    },
    /// Refs were appended to a group's member list.
    MembersAdded {
        /// Target group.
        group: GroupId,
        /// Appended refs, in order.
        refs: Vec<EntityRef>,
    },
    /// Refs were removed from a group's member list.
    MembersRemoved {
        /// Target group.
        group: GroupId,
        /// Removed refs in removal order.
        removed: Vec<RemovedMember>,
    },
    /// A flag was cascaded down a subtree.
    StateChanged {
        /// Flag that changed.
        flag: GroupFlag,
        /// New value applied to the whole subtree.
        value: bool,
        /// Previous value of every group in the subtree, pre-order.
        previous: Vec<(GroupId, bool)>,
    },
    /// A group was moved in the tree.
    ParentChanged {
        /// Moved group.
        group: GroupId,
        /// Parent before the move.
        previous: Option<GroupId>,
        /// Parent after the move.
        current: Option<GroupId>,
    },
    /// A descriptive field was edited.
    Edited {
        /// Edited group.
        group: GroupId,
        /// Old value.
        previous: GroupEdit,
        /// New value.
        current: GroupEdit,
    },
    /// Several changes applied as one operation, in order.
    Batch {
        /// Member changes in application order.
        changes: Vec<Change>,
    },
}

impl Change {
    /// Ids of the groups this change touched, in order, without repeats.
    #[must_use]
    pub fn affected(&self) -> Vec<GroupId> {
        let mut ids = Vec::new();
        self.collect_affected(&mut ids);
        ids
    }

    fn collect_affected(&self, ids: &mut Vec<GroupId>) {
        let mut push = |id: &GroupId| {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        };
        match self {
            Self::Created { group } => push(&group.id),
            Self::Deleted { removed, promoted } => {
                removed.iter().for_each(|r| push(&r.group.id));
                promoted.iter().for_each(push);
            }
            Self::MembersAdded { group, .. }
            | Self::MembersRemoved { group, .. }
            | Self::ParentChanged { group, .. }
            | Self::Edited { group, .. } => push(group),
            Self::StateChanged { previous, .. } => {
                previous.iter().for_each(|(id, _)| push(id));
            }
            Self::Batch { changes } => {
                for change in changes {
                    change.collect_affected(ids);
                }
            }
        }
    }

    /// Whether the change does nothing (an empty batch).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Batch { changes } => changes.iter().all(Self::is_empty),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_serialize_with_kind_tag() {
        let change = Change::ParentChanged {
            group: GroupId::from("a"),
            previous: None,
            current: Some(GroupId::from("b")),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "parent_changed");
        let back: Change = serde_json::from_value(json).unwrap();
        assert_eq!(back, change);
    }

    #[test]
    fn affected_flattens_batches() {
        let a = GroupId::from("a");
        let b = GroupId::from("b");
        let change = Change::Batch {
            changes: vec![
                Change::MembersAdded {
                    group: a.clone(),
                    refs: vec![EntityRef::new("x")],
                },
                Change::Edited {
                    group: b.clone(),
                    previous: GroupEdit::Name("old".to_owned()),
                    current: GroupEdit::Name("new".to_owned()),
                },
                Change::ParentChanged {
                    group: a.clone(),
                    previous: None,
                    current: Some(b.clone()),
                },
            ],
        };
        assert_eq!(change.affected(), vec![a, b]);
        assert!(!change.is_empty());
        let nested = Change::Batch {
            changes: vec![Change::Batch { changes: vec![] }],
        };
        assert!(nested.is_empty());
    }
}
