//! Change notifications for presentation layers.

use crate::group::GroupId;

/// Fired after a structural or descriptive change has been applied,
/// cached and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent {
    /// A group was created.
    Created(GroupId),
    /// Groups were deleted.
    Deleted(Vec<GroupId>),
    /// A group was moved in the tree.
    Reparented {
        /// Moved group.
        group: GroupId,
        /// New parent, `None` for root.
        parent: Option<GroupId>,
    },
    /// A group's member list changed.
    MembershipChanged(GroupId),
    /// Visibility or lock state changed for these groups (pre-order).
    StateChanged(Vec<GroupId>),
    /// A descriptive field (name, color, ...) changed.
    Edited(GroupId),
    /// A previous change was reverted; touched groups listed.
    Reverted(Vec<GroupId>),
}

/// Boxed change listener.
pub(crate) type Observer = Box<dyn FnMut(&GroupEvent)>;
