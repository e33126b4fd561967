//! Centralized grouper configuration with TOML file support.
//!
//! Store location, group defaults, and clustering parameters are
//! consolidated here. Options serialize to/from TOML; every section uses
//! `#[serde(default)]` so partial files (e.g. only overriding
//! `[clustering]`) work.

mod clustering;
mod groups;
mod store;

use std::path::Path;

pub use clustering::ClusteringOptions;
pub use groups::{DeletePolicy, GroupOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use store::{StoreOptions, DEFAULT_STORE_PATH};

use crate::error::GrouperError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct GrouperOptions {
    /// Group store location and write policy.
    pub store: StoreOptions,
    /// Group creation/deletion defaults.
    pub groups: GroupOptions,
    /// Clustering defaults.
    pub clustering: ClusteringOptions,
}

impl GrouperOptions {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(GrouperOptions)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, GrouperError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| GrouperError::OptionsParse(e.to_string()))
    }

    /// Load options if the file exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, GrouperError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), GrouperError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GrouperError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(GrouperError::Io)
    }
}
