//! Position edits: axis alignment and grid snapping.
//!
//! These are the only engine functions with side effects. Each returns the
//! before/after position of every moved entity so the caller can record or
//! undo the edit.

use glam::{BVec3, Vec3};

use crate::entity::EntityControl;

/// One entity's position before and after an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionChange<E> {
    /// The moved entity.
    pub entity: E,
    /// Position before the edit.
    pub before: Vec3,
    /// Position after the edit.
    pub after: Vec3,
}

fn apply<S, F>(scene: &mut S, entities: &[S::Entity], f: F) -> Vec<PositionChange<S::Entity>>
where
    S: EntityControl,
    F: Fn(Vec3) -> Vec3,
{
    let mut changes = Vec::new();
    for entity in entities {
        let before = scene.position(entity);
        let after = f(before);
        if after == before {
            continue;
        }
        scene.set_position(entity, after);
        changes.push(PositionChange {
            entity: entity.clone(),
            before,
            after,
        });
    }
    changes
}

/// Force the selected `axes` of every entity's position to the matching
/// component of `value`. Other axes are untouched.
pub fn align<S: EntityControl>(
    scene: &mut S,
    entities: &[S::Entity],
    axes: BVec3,
    value: Vec3,
) -> Vec<PositionChange<S::Entity>> {
    apply(scene, entities, |p| Vec3::select(axes, value, p))
}

/// Round every axis of every position to the nearest multiple of
/// `grid_size`. A non-positive or non-finite grid size moves nothing.
pub fn snap_to_grid<S: EntityControl>(
    scene: &mut S,
    entities: &[S::Entity],
    grid_size: f32,
) -> Vec<PositionChange<S::Entity>> {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        log::warn!("snap skipped: invalid grid size {grid_size}");
        return Vec::new();
    }
    apply(scene, entities, |p| (p / grid_size).round() * grid_size)
}

/// Put every entity back at its `before` position.
pub fn restore_positions<S: EntityControl>(
    scene: &mut S,
    changes: &[PositionChange<S::Entity>],
) {
    for change in changes.iter().rev() {
        scene.set_position(&change.entity, change.before);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, ObjectId, SceneObject};

    fn scene_with(points: &[Vec3]) -> (MemoryScene, Vec<ObjectId>) {
        let mut scene = MemoryScene::new("Level");
        let ids = points
            .iter()
            .enumerate()
            .map(|(i, p)| scene.spawn(SceneObject::new(format!("{i}"), "o").at(*p)))
            .collect();
        (scene, ids)
    }

    #[test]
    fn align_touches_only_selected_axes() {
        let (mut scene, ids) =
            scene_with(&[Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
        let changes = align(
            &mut scene,
            &ids,
            BVec3::new(false, true, false),
            Vec3::new(9.0, 0.0, 9.0),
        );
        assert_eq!(changes.len(), 2);
        assert_eq!(scene.position(&ids[0]), Vec3::new(1.0, 0.0, 3.0));
        assert_eq!(scene.position(&ids[1]), Vec3::new(4.0, 0.0, 6.0));
    }

    #[test]
    fn snap_rounds_to_nearest_multiple() {
        let (mut scene, ids) = scene_with(&[
            Vec3::new(0.12, -0.13, 0.9),
            Vec3::new(0.5, 0.5, 0.5),
        ]);
        let changes = snap_to_grid(&mut scene, &ids, 0.25);
        assert_eq!(scene.position(&ids[0]), Vec3::new(0.0, -0.25, 1.0));
        // Already on the grid: not reported.
        assert_eq!(changes.len(), 1);
        assert!(snap_to_grid(&mut scene, &ids, 0.0).is_empty());
    }

    #[test]
    fn restore_undoes_an_edit() {
        let start = [Vec3::new(1.3, 2.7, -0.4)];
        let (mut scene, ids) = scene_with(&start);
        let changes = snap_to_grid(&mut scene, &ids, 1.0);
        assert_eq!(scene.position(&ids[0]), Vec3::new(1.0, 3.0, 0.0));
        restore_positions(&mut scene, &changes);
        assert_eq!(scene.position(&ids[0]), start[0]);
    }
}
