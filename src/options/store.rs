use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the default group store lives, relative to the project root.
pub const DEFAULT_STORE_PATH: &str = "ProjectSettings/ObjectGrouperData.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Store", inline)]
#[serde(default)]
/// Group store location and write policy.
pub struct StoreOptions {
    /// Path of the JSON group store.
    #[schemars(title = "Store Path")]
    pub path: PathBuf,
    /// Write the store after every mutating operation.
    #[schemars(title = "Write Through")]
    pub persist: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            persist: true,
        }
    }
}
