//! Partitioning strategies: material, tag, layer, proximity, grid.
//!
//! Keyed partitions list their clusters in first-seen order, and entities
//! inside a cluster keep input order.

use std::collections::VecDeque;
use std::hash::Hash;

use glam::{IVec3, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::entity::{EntityAttributes, EntityControl};

/// One subset of a keyed partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<K, E> {
    /// Shared key of every entity in the cluster.
    pub key: K,
    /// Member entities in input order.
    pub entities: Vec<E>,
}

/// Bucket `items` by `key`, skipping items whose key is `None`.
fn bucket<K, E, I>(items: I) -> Vec<Cluster<K, E>>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (Option<K>, E)>,
{
    let mut index: FxHashMap<K, usize> = FxHashMap::default();
    let mut clusters: Vec<Cluster<K, E>> = Vec::new();
    for (key, entity) in items {
        let Some(key) = key else { continue };
        if let Some(&i) = index.get(&key) {
            clusters[i].entities.push(entity);
        } else {
            let _ = index.insert(key.clone(), clusters.len());
            clusters.push(Cluster {
                key,
                entities: vec![entity],
            });
        }
    }
    clusters
}

/// Group entities by primary material. Entities without one are left out.
pub fn partition_by_material<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
) -> Vec<Cluster<String, S::Entity>> {
    bucket(entities.iter().map(|e| (scene.material(e), e.clone())))
}

/// Group entities by tag.
pub fn partition_by_tag<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
) -> Vec<Cluster<String, S::Entity>> {
    bucket(entities.iter().map(|e| (Some(scene.tag(e)), e.clone())))
}

/// Group entities by layer.
pub fn partition_by_layer<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
) -> Vec<Cluster<u32, S::Entity>> {
    bucket(entities.iter().map(|e| (Some(scene.layer(e)), e.clone())))
}

/// Integer grid cell containing `position`: `floor(position / cell_size)`
/// per axis.
#[must_use]
pub fn grid_cell(position: Vec3, cell_size: f32) -> IVec3 {
    (position / cell_size).floor().as_ivec3()
}

/// Bucket entities by grid cell. Entities with a non-finite position are
/// left out. A non-positive or non-finite `cell_size` yields no partitions.
pub fn partition_by_grid<S: EntityControl>(
    scene: &S,
    entities: &[S::Entity],
    cell_size: f32,
) -> Vec<Cluster<IVec3, S::Entity>> {
    if !(cell_size.is_finite() && cell_size > 0.0) {
        log::warn!("grid partition skipped: invalid cell size {cell_size}");
        return Vec::new();
    }
    let clusters = bucket(entities.iter().map(|e| {
        let position = scene.position(e);
        let cell = position.is_finite().then(|| grid_cell(position, cell_size));
        (cell, e.clone())
    }));
    log::debug!(
        "grid partition: {} entities -> {} cells",
        entities.len(),
        clusters.len()
    );
    clusters
}

/// Single-linkage clustering: two entities share a cluster iff a chain of
/// pairwise distances `<= threshold` connects them.
///
/// Each cluster is grown breadth-first from the first unassigned entity in
/// input order; neighbors join in input order. Duplicate input entities are
/// counted once and entities with a non-finite position are left out.
/// Candidate neighbors come from a uniform grid with cell
/// edge `threshold`, which finds exactly the pairs a full pairwise scan
/// would.
pub fn partition_by_proximity<S: EntityControl>(
    scene: &S,
    entities: &[S::Entity],
    threshold: f32,
) -> Vec<Vec<S::Entity>> {
    let mut seen = FxHashSet::default();
    let (unique, positions): (Vec<&S::Entity>, Vec<Vec3>) = entities
        .iter()
        .filter(|e| seen.insert(*e))
        .map(|e| (e, scene.position(e)))
        .filter(|(e, p)| {
            let usable = p.is_finite();
            if !usable {
                log::debug!("proximity partition: {e:?} has no usable position");
            }
            usable
        })
        .unzip();

    let index = SpatialIndex::new(&positions, threshold);
    let mut assigned = vec![false; unique.len()];
    let mut clusters = Vec::new();

    for seed in 0..unique.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];
        let mut queue = VecDeque::from([seed]);

        while let Some(current) = queue.pop_front() {
            let origin = positions[current];
            for other in index.candidates(origin) {
                let linked = origin.distance(positions[other]) <= threshold;
                if assigned[other] || !linked {
                    continue;
                }
                assigned[other] = true;
                members.push(other);
                queue.push_back(other);
            }
        }
        clusters.push(members.into_iter().map(|i| unique[i].clone()).collect());
    }

    log::debug!(
        "proximity partition (t = {threshold}): {} entities -> {} clusters",
        unique.len(),
        clusters.len()
    );
    clusters
}

/// Neighbor candidate lookup for proximity clustering.
enum SpatialIndex {
    /// Cells of edge `cell`; neighbors lie in the 27 surrounding cells.
    Grid {
        cell: f32,
        cells: FxHashMap<IVec3, Vec<usize>>,
    },
    /// Degenerate threshold: every entity is a candidate.
    All(usize),
}

impl SpatialIndex {
    fn new(positions: &[Vec3], threshold: f32) -> Self {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Self::All(positions.len());
        }
        let mut cells: FxHashMap<IVec3, Vec<usize>> = FxHashMap::default();
        for (i, p) in positions.iter().enumerate() {
            cells.entry(grid_cell(*p, threshold)).or_default().push(i);
        }
        Self::Grid {
            cell: threshold,
            cells,
        }
    }

    /// Candidate indices in ascending (input) order.
    fn candidates(&self, origin: Vec3) -> Vec<usize> {
        match self {
            Self::All(n) => (0..*n).collect(),
            Self::Grid { cell, cells } => {
                let center = grid_cell(origin, *cell);
                let mut out = Vec::new();
                for dz in -1..=1 {
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            let key = center.saturating_add(IVec3::new(dx, dy, dz));
                            if let Some(bucket) = cells.get(&key) {
                                out.extend_from_slice(bucket);
                            }
                        }
                    }
                }
                out.sort_unstable();
                out.dedup();
                out
            }
        }
    }
}
