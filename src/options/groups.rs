use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::group::DEFAULT_GROUP_NAME;

/// What deleting a group does to its child groups.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Children become root groups.
    #[default]
    PromoteChildren,
    /// The whole subtree is deleted.
    Cascade,
    /// Deleting a group that has children fails.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Groups", inline)]
#[serde(default)]
/// Defaults applied when creating and deleting groups.
pub struct GroupOptions {
    /// Name used when a group is created without one.
    #[schemars(title = "Default Name")]
    pub default_name: String,
    /// Child handling on delete.
    #[schemars(title = "Delete Policy")]
    pub delete_policy: DeletePolicy,
    /// Template for generated group names.
    #[schemars(title = "Naming Template")]
    pub naming_template: String,
    /// Saturation of random group colors.
    #[schemars(title = "Color Saturation", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub color_saturation: f32,
    /// Value (brightness) of random group colors.
    #[schemars(title = "Color Value", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub color_value: f32,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_GROUP_NAME.to_owned(),
            delete_policy: DeletePolicy::PromoteChildren,
            naming_template: "Group_{type}_{count}".to_owned(),
            color_saturation: 0.6,
            color_value: 0.9,
        }
    }
}
