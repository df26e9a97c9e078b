use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;
use constants::placement::{GUARD_SUBSTITUTE_MAX, GUARD_SUBSTITUTE_MIN};
use rand::Rng;

use super::state::{FurnitureInstance, PlacementRng, PositionCorrected, PositionGuard};
use crate::engine::scene::scene_object::SceneObject;

/// Substitution made by the guard for a single write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardCorrection {
    pub original: Vec3,
    pub corrected: Vec3,
}

impl GuardCorrection {
    pub fn report(&self, instance_id: &str) {
        info!(
            "Position guard corrected {}: {:?} -> {:?}",
            instance_id, self.original, self.corrected
        );
    }
}

/// Per-axis rewrite: a zero x or z is replaced with a value in `[5, 7)`, y
/// passes through. Returns the target unchanged when no axis is zero.
pub fn guard_target(target: Vec3, rng: &mut impl Rng) -> (Vec3, Option<GuardCorrection>) {
    let mut corrected = target;
    if target.x == 0.0 {
        corrected.x = rng.gen_range(GUARD_SUBSTITUTE_MIN..GUARD_SUBSTITUTE_MAX);
    }
    if target.z == 0.0 {
        corrected.z = rng.gen_range(GUARD_SUBSTITUTE_MIN..GUARD_SUBSTITUTE_MAX);
    }

    if corrected == target {
        (target, None)
    } else {
        (
            corrected,
            Some(GuardCorrection {
                original: target,
                corrected,
            }),
        )
    }
}

/// Guarded three-argument set.
pub fn guarded_set(
    handle: &mut impl SceneObject,
    x: f32,
    y: f32,
    z: f32,
    rng: &mut impl Rng,
) -> Option<GuardCorrection> {
    let (written, correction) = guard_target(Vec3::new(x, y, z), rng);
    handle.set_position(written.x, written.y, written.z);
    correction
}

/// Guarded copy-from-vector.
pub fn guarded_copy(
    handle: &mut impl SceneObject,
    source: &Vec3,
    rng: &mut impl Rng,
) -> Option<GuardCorrection> {
    let (written, correction) = guard_target(*source, rng);
    handle.copy_position(&written);
    correction
}

/// Put an entity under the guard. Re-guarding is a no-op.
pub fn guard_entity(entity: &mut EntityCommands) {
    entity.insert_if_new(PositionGuard);
}

/// Rewrites direct writes to guarded transforms before they are propagated
/// to the world matrix.
pub fn intercept_guarded_writes(
    mut rng: ResMut<PlacementRng>,
    mut guarded: Query<
        (Entity, &FurnitureInstance, &mut Transform),
        (With<PositionGuard>, Changed<Transform>),
    >,
    mut corrections: EventWriter<PositionCorrected>,
) {
    for (entity, instance, mut transform) in &mut guarded {
        let (written, correction) = guard_target(transform.translation, &mut rng.0);
        let Some(correction) = correction else {
            continue;
        };
        transform.translation = written;
        correction.report(&instance.instance_id);
        corrections.write(PositionCorrected {
            entity,
            instance_id: instance.instance_id.clone(),
            original: correction.original,
            corrected: correction.corrected,
        });
    }
}
