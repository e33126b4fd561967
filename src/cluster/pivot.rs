//! Group pivot computation.

use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::{Bounds, EntityAttributes, EntityControl};

/// How a pivot point is derived from a set of entities.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PivotMode {
    /// Arithmetic mean of positions.
    #[default]
    Average,
    /// Center of the union of render bounds.
    GeometricCenter,
    /// Geometric center X/Z at the minimum Y of the union bounds.
    Bottom,
    /// Position mean weighted by shape-extent diagonal length.
    WeightedCenter,
}

/// Union of the entities' render bounds. Entities that do not render count
/// as a zero-size box at their position. `None` for empty input.
pub fn union_bounds<S: EntityControl>(
    scene: &S,
    entities: &[S::Entity],
) -> Option<Bounds> {
    entities
        .iter()
        .map(|e| scene.bounds(e).unwrap_or_else(|| Bounds::point(scene.position(e))))
        .reduce(|acc, b| acc.union(&b))
}

fn average<S: EntityControl>(scene: &S, entities: &[S::Entity]) -> Vec3 {
    let sum: Vec3 = entities.iter().map(|e| scene.position(e)).sum();
    sum / entities.len() as f32
}

/// Pivot of `entities` under `mode`. Empty input yields the origin.
pub fn compute_pivot<S>(scene: &S, entities: &[S::Entity], mode: PivotMode) -> Vec3
where
    S: EntityControl + EntityAttributes,
{
    if entities.is_empty() {
        return Vec3::ZERO;
    }
    match mode {
        PivotMode::Average => average(scene, entities),
        PivotMode::GeometricCenter => {
            union_bounds(scene, entities).map_or(Vec3::ZERO, |b| b.center())
        }
        PivotMode::Bottom => union_bounds(scene, entities).map_or(Vec3::ZERO, |b| {
            let c = b.center();
            Vec3::new(c.x, b.min.y, c.z)
        }),
        PivotMode::WeightedCenter => {
            let mut weighted = Vec3::ZERO;
            let mut total = 0.0;
            for e in entities {
                let w = scene.shape_extent(e).map_or(1.0, Vec3::length);
                weighted += scene.position(e) * w;
                total += w;
            }
            if total > 0.0 {
                weighted / total
            } else {
                average(scene, entities)
            }
        }
    }
}
