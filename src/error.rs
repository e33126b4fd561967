//! Crate-level error types.

use std::fmt;

use crate::group::GroupId;
use crate::manager::Change;

/// Errors produced by the grouper crate.
#[derive(Debug)]
pub enum GrouperError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// The group store could not be serialized or parsed.
    StoreParse(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// A scene description file could not be parsed.
    SceneLoad(String),
    /// No group with this id exists in the store.
    UnknownGroup(GroupId),
    /// Reparenting `child` under `parent` would make `child` its own
    /// ancestor. Self-parenting reports `child == parent`.
    CycleDetected {
        /// Group being reparented.
        child: GroupId,
        /// Rejected parent.
        parent: GroupId,
    },
    /// The delete policy rejects deleting a group that still has children.
    HasChildren(GroupId),
    /// A name filter pattern is not a valid regular expression.
    InvalidPattern(String),
    /// A mutation was applied in memory but the write-through save failed.
    NotSaved {
        /// What was applied; revert it to drop the edit.
        change: Box<Change>,
        /// The save failure.
        source: Box<GrouperError>,
    },
}

impl GrouperError {
    /// The applied change carried by [`GrouperError::NotSaved`].
    #[must_use]
    pub fn unsaved_change(&self) -> Option<&Change> {
        match self {
            Self::NotSaved { change, .. } => Some(change.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for GrouperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::StoreParse(msg) => write!(f, "group store error: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::SceneLoad(msg) => write!(f, "scene load error: {msg}"),
            Self::UnknownGroup(id) => write!(f, "unknown group '{id}'"),
            Self::CycleDetected { child, parent } if child == parent => {
                write!(f, "group '{child}' cannot be its own parent")
            }
            Self::CycleDetected { child, parent } => write!(
                f,
                "parenting '{child}' under '{parent}' would create a cycle"
            ),
            Self::HasChildren(id) => {
                write!(f, "group '{id}' still has child groups")
            }
            Self::InvalidPattern(msg) => {
                write!(f, "invalid name pattern: {msg}")
            }
            Self::NotSaved { source, .. } => {
                write!(f, "change applied but not saved: {source}")
            }
        }
    }
}

impl std::error::Error for GrouperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::NotSaved { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GrouperError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
