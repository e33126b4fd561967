//! Stateless clustering and partitioning over live entities.
//!
//! Every function takes the host scene plus a slice of live entities and
//! returns subsets, a derived point, or (for [`transform`]) the list of
//! position edits it applied. None of them touch the group store; their
//! output is normally fed to
//! [`GroupManager::create_smart_groups`](crate::manager::GroupManager::create_smart_groups).

mod filter;
mod partition;
mod pivot;
pub mod transform;

pub use filter::{
    filter_by_capability, filter_by_layer, filter_by_name, filter_by_tag,
    NamePattern,
};
pub use partition::{
    grid_cell, partition_by_grid, partition_by_layer, partition_by_material,
    partition_by_proximity, partition_by_tag, Cluster,
};
pub use pivot::{compute_pivot, union_bounds, PivotMode};
pub use transform::{align, restore_positions, snap_to_grid, PositionChange};

use crate::entity::{EntityAttributes, EntityControl};

/// A partitioning strategy with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartitionStrategy {
    /// By primary material. Entities without one are left out.
    Material,
    /// By tag.
    Tag,
    /// By layer index.
    Layer,
    /// Single-linkage clustering at a distance threshold.
    Proximity {
        /// Link distance (inclusive).
        threshold: f32,
    },
    /// Bucketing by integer grid cell.
    Grid {
        /// Cell edge length.
        cell_size: f32,
    },
}

/// One labeled subset produced by [`partition`].
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<E> {
    /// Human-readable label (material name, tag, cell key, ...).
    pub label: String,
    /// Member entities.
    pub entities: Vec<E>,
}

/// Run `strategy` over `entities` and label each resulting subset.
pub fn partition<S>(
    scene: &S,
    entities: &[S::Entity],
    strategy: PartitionStrategy,
) -> Vec<Partition<S::Entity>>
where
    S: EntityControl + EntityAttributes,
{
    let labeled = |label: String, entities| Partition { label, entities };
    match strategy {
        PartitionStrategy::Material => partition_by_material(scene, entities)
            .into_iter()
            .map(|c| labeled(c.key, c.entities))
            .collect(),
        PartitionStrategy::Tag => partition_by_tag(scene, entities)
            .into_iter()
            .map(|c| labeled(c.key, c.entities))
            .collect(),
        PartitionStrategy::Layer => partition_by_layer(scene, entities)
            .into_iter()
            .map(|c| labeled(format!("Layer_{}", c.key), c.entities))
            .collect(),
        PartitionStrategy::Proximity { threshold } => {
            partition_by_proximity(scene, entities, threshold)
                .into_iter()
                .enumerate()
                .map(|(i, c)| labeled(format!("Cluster_{}", i + 1), c))
                .collect()
        }
        PartitionStrategy::Grid { cell_size } => {
            partition_by_grid(scene, entities, cell_size)
                .into_iter()
                .map(|c| {
                    let k = c.key;
                    labeled(format!("Cell_{}_{}_{}", k.x, k.y, k.z), c.entities)
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::{MemoryScene, SceneObject};

    #[test]
    fn labels_follow_strategy() {
        let mut scene = MemoryScene::new("Level");
        let a = scene.spawn(
            SceneObject::new("a", "a")
                .at(Vec3::new(0.5, 0.0, -0.5))
                .with_material("Brick")
                .with_layer(4),
        );
        let b = scene.spawn(SceneObject::new("b", "b").at(Vec3::new(9.0, 0.0, 0.0)));
        let ids = [a, b];

        let grid = partition(&scene, &ids, PartitionStrategy::Grid { cell_size: 1.0 });
        assert_eq!(grid[0].label, "Cell_0_0_-1");

        let prox = partition(&scene, &ids, PartitionStrategy::Proximity { threshold: 1.0 });
        let labels: Vec<&str> = prox.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Cluster_1", "Cluster_2"]);

        let mat = partition(&scene, &ids, PartitionStrategy::Material);
        assert_eq!(mat.len(), 1);
        assert_eq!(mat[0].label, "Brick");

        let layer = partition(&scene, &ids, PartitionStrategy::Layer);
        assert_eq!(layer[0].label, "Layer_4");
        assert_eq!(layer[1].label, "Layer_0");
    }
}
