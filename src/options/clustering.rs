use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cluster::PivotMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Clustering", inline)]
#[serde(default)]
/// Default parameters for the automatic grouping tools.
pub struct ClusteringOptions {
    /// Single-linkage distance threshold for proximity clustering.
    #[schemars(title = "Proximity Threshold", range(min = 0.0), extend("step" = 0.1))]
    pub proximity_threshold: f32,
    /// Cell edge length for grid bucketing.
    #[schemars(title = "Grid Cell Size", range(min = 0.01), extend("step" = 0.1))]
    pub grid_cell_size: f32,
    /// Grid size used by snap-to-grid.
    #[schemars(title = "Snap Size", range(min = 0.01), extend("step" = 0.05))]
    pub snap_size: f32,
    /// How group pivots are computed.
    #[schemars(title = "Pivot Mode")]
    pub pivot_mode: PivotMode,
    /// Treat name filters as regular expressions.
    #[schemars(title = "Regex Name Filter")]
    pub use_regex: bool,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self {
            proximity_threshold: 2.0,
            grid_cell_size: 1.0,
            snap_size: 0.25,
            pivot_mode: PivotMode::Average,
            use_regex: false,
        }
    }
}
