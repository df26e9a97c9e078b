use bevy::prelude::*;
use chrono::{DateTime, Utc};
use constants::placement::{
    QUARANTINE_BASE, QUARANTINE_COLUMNS, QUARANTINE_REASON, QUARANTINE_SPACING,
    QUARANTINE_ZONE_THRESHOLD, RELEASE_ANGLE_STEP_DEGREES, RELEASE_BASE_RADIUS, RELEASE_HEIGHT,
    RELEASE_RADIUS_STEP,
};
use serde::Serialize;

use super::guard::guarded_copy;
use super::state::{
    FurnitureInstance, InstanceQuarantined, InstanceReleased, PlacementRng, PositionCorrected,
    PositionGuard, QuarantineRequest, ReleaseRequest,
};
use crate::engine::scene::scene_object::{DescendantTransforms, SceneNode, SceneObject};

// Slots closer than this are treated as the same grid cell.
const SLOT_EPSILON: f32 = 1e-3;

/// Grid cell `index` of the quarantine zone: five columns, three units apart,
/// lifted one unit above the floor.
pub fn allocate_quarantine_slot(index: u32) -> Vec3 {
    let grid_x = (index % QUARANTINE_COLUMNS) as f32 * QUARANTINE_SPACING;
    let grid_z = (index / QUARANTINE_COLUMNS) as f32 * QUARANTINE_SPACING;
    QUARANTINE_BASE + Vec3::new(grid_x, 0.0, grid_z)
}

pub fn is_in_quarantine_zone(position: Vec3) -> bool {
    position.x >= QUARANTINE_ZONE_THRESHOLD && position.z >= QUARANTINE_ZONE_THRESHOLD
}

/// Point on the expanding release ring. The radius never drops below 8 so a
/// released instance cannot land on the room centre.
pub fn release_position(target_index: u32) -> Vec3 {
    let angle = (target_index as f32 * RELEASE_ANGLE_STEP_DEGREES).to_radians();
    let radius = RELEASE_BASE_RADIUS + target_index as f32 * RELEASE_RADIUS_STEP;
    Vec3::new(angle.cos() * radius, RELEASE_HEIGHT, angle.sin() * radius)
}

/// Park an instance in grid cell `index` and stamp it as quarantined.
pub fn quarantine(
    instance: &mut FurnitureInstance,
    handle: &mut impl SceneObject,
    index: u32,
    now: DateTime<Utc>,
) -> Vec3 {
    let slot = allocate_quarantine_slot(index);
    // Every write path, in case one of them is being ignored downstream.
    handle.set_x(slot.x);
    handle.set_z(slot.z);
    handle.set_position(slot.x, slot.y, slot.z);
    handle.update_world_matrix(true);
    instance.mark_quarantined(QUARANTINE_REASON, now);
    slot
}

/// Return an instance to circulation on the release ring and clear its
/// quarantine state.
pub fn release(
    instance: &mut FurnitureInstance,
    handle: &mut impl SceneObject,
    target_index: u32,
) -> Vec3 {
    let position = release_position(target_index);
    handle.copy_position(&position);
    handle.update_world_matrix(true);
    instance.clear_quarantine();
    position
}

/// Lowest grid cell not already holding a quarantined instance.
pub fn next_free_slot(occupied: &[Vec3]) -> u32 {
    (0..)
        .find(|&index| {
            let slot = allocate_quarantine_slot(index);
            !occupied.iter().any(|p| p.distance(slot) < SLOT_EPSILON)
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarantinedItem {
    pub instance_id: String,
    pub original_store_id: String,
    pub reason: String,
    pub since: DateTime<Utc>,
    pub position: [f32; 3],
    /// False once a quarantined instance has been moved out of the zone.
    pub in_zone: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarantineStats {
    pub total: usize,
    pub quarantined_count: usize,
    pub quarantined_items: Vec<QuarantinedItem>,
}

/// Read-only summary of every instance and the ones currently quarantined.
pub fn quarantine_stats<'a>(
    instances: impl IntoIterator<Item = (&'a FurnitureInstance, Vec3)>,
) -> QuarantineStats {
    let mut total = 0;
    let mut quarantined_items = Vec::new();
    for (instance, position) in instances {
        total += 1;
        if let Some(state) = instance.quarantine_state() {
            quarantined_items.push(QuarantinedItem {
                instance_id: instance.instance_id.clone(),
                original_store_id: instance.original_store_id.clone(),
                reason: state.reason.clone(),
                since: state.since,
                position: position.to_array(),
                in_zone: is_in_quarantine_zone(position),
            });
        }
    }
    QuarantineStats {
        total,
        quarantined_count: quarantined_items.len(),
        quarantined_items,
    }
}

pub fn handle_quarantine_requests(
    mut requests: EventReader<QuarantineRequest>,
    mut furniture: Query<(
        Entity,
        &mut FurnitureInstance,
        &mut Transform,
        &mut GlobalTransform,
        Option<&Children>,
    )>,
    mut descendants: DescendantTransforms,
    mut quarantined: EventWriter<InstanceQuarantined>,
) {
    for request in requests.read() {
        let index = request.index.unwrap_or_else(|| {
            let occupied: Vec<Vec3> = furniture
                .iter()
                .filter(|(_, instance, ..)| {
                    instance.quarantined() && instance.instance_id != request.instance_id
                })
                .map(|(_, _, transform, ..)| transform.translation)
                .collect();
            next_free_slot(&occupied)
        });

        let Some((entity, mut instance, transform, global, children)) = furniture
            .iter_mut()
            .find(|(_, instance, ..)| instance.instance_id == request.instance_id)
        else {
            warn!("Quarantine requested for unknown instance {}", request.instance_id);
            continue;
        };

        let mut node = SceneNode::new(transform, global).with_hierarchy(children, &mut descendants);
        let position = quarantine(&mut instance, &mut node, index, Utc::now());
        info!(
            "Quarantined {} in slot {} at {:?}",
            instance.instance_id, index, position
        );
        quarantined.write(InstanceQuarantined {
            entity,
            instance_id: instance.instance_id.clone(),
            position,
        });
    }
}

/// Releases onto the ring. Guarded instances have the ring point passed through
/// the guard here, so the reported position is the one they end up at.
pub fn handle_release_requests(
    mut requests: EventReader<ReleaseRequest>,
    mut rng: ResMut<PlacementRng>,
    mut furniture: Query<(
        Entity,
        &mut FurnitureInstance,
        &mut Transform,
        &mut GlobalTransform,
        Option<&Children>,
        Has<PositionGuard>,
    )>,
    mut descendants: DescendantTransforms,
    mut released: EventWriter<InstanceReleased>,
    mut corrections: EventWriter<PositionCorrected>,
) {
    for request in requests.read() {
        let Some((entity, mut instance, transform, global, children, guarded)) = furniture
            .iter_mut()
            .find(|(_, instance, ..)| instance.instance_id == request.instance_id)
        else {
            warn!("Release requested for unknown instance {}", request.instance_id);
            continue;
        };
        if !instance.quarantined() {
            info!("Releasing {} which was not quarantined", instance.instance_id);
        }

        let mut node = SceneNode::new(transform, global).with_hierarchy(children, &mut descendants);
        let mut position = release(&mut instance, &mut node, request.target_index);
        if guarded {
            if let Some(correction) = guarded_copy(&mut node, &position, &mut rng.0) {
                node.update_world_matrix(true);
                correction.report(&instance.instance_id);
                corrections.write(PositionCorrected {
                    entity,
                    instance_id: instance.instance_id.clone(),
                    original: correction.original,
                    corrected: correction.corrected,
                });
                position = correction.corrected;
            }
        }

        info!("Released {} to {:?}", instance.instance_id, position);
        released.write(InstanceReleased {
            entity,
            instance_id: instance.instance_id.clone(),
            position,
        });
    }
}
