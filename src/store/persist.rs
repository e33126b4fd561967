//! JSON document format and atomic file replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GrouperError;
use crate::group::Group;

/// On-disk document: an ordered list of group records. Documents written
/// by the editor tool (`Groups`) load too; any other top-level key makes
/// the document unreadable rather than silently empty.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreDocument {
    #[serde(default, alias = "Groups")]
    groups: Vec<Group>,
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    groups: &'a [Group],
}

pub(super) fn to_json(groups: &[Group]) -> Result<String, GrouperError> {
    serde_json::to_string_pretty(&StoreDocumentRef { groups })
        .map_err(|e| GrouperError::StoreParse(e.to_string()))
}

pub(super) fn from_json(json: &str) -> Result<Vec<Group>, GrouperError> {
    serde_json::from_str::<StoreDocument>(json)
        .map(|doc| doc.groups)
        .map_err(|e| GrouperError::StoreParse(e.to_string()))
}

/// Read the document at `path`. A missing file is an empty store.
pub(super) fn read(path: &Path) -> Result<Vec<Group>, GrouperError> {
    match fs::read_to_string(path) {
        Ok(json) => from_json(&json),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(GrouperError::Io(e)),
    }
}

/// Sibling path the document is staged in before the rename.
pub(super) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Sibling path an unreadable document is preserved under.
pub(super) fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Copy an unreadable document aside so the next save cannot destroy it.
pub(super) fn back_up(path: &Path) -> Result<PathBuf, GrouperError> {
    let backup = backup_path(path);
    let _ = fs::copy(path, &backup)?;
    Ok(backup)
}

/// Write the document to a temp file, flush it, then rename it over
/// `path`, so a crash mid-write leaves the previous file intact.
pub(super) fn write(path: &Path, groups: &[Group]) -> Result<(), GrouperError> {
    let json = to_json(groups)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp = temp_path(path);
    let mut file = fs::File::create(&temp)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp, path).map_err(|e| {
        log::warn!(
            "Failed to replace {} with {}: {e}",
            path.display(),
            temp.display()
        );
        GrouperError::Io(e)
    })
}
