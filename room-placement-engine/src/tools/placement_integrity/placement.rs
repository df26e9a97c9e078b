use bevy::prelude::*;
use rand::Rng;

use super::guard::{GuardCorrection, guard_entity, guarded_copy};
use super::identity::FurnitureType;
use super::state::{
    FurnitureInstance, FurniturePlaced, PlaceFurnitureEvent, PlacementRng, PositionCorrected,
};
use crate::engine::scene::scene_object::{DetachedNode, SceneObject};

/// Result of spawning a furniture instance.
#[derive(Debug, Clone)]
pub struct PlacedFurniture {
    pub entity: Entity,
    pub instance_id: String,
    pub position: Vec3,
    pub correction: Option<GuardCorrection>,
}

/// Spawn a guarded furniture instance. The requested position goes through
/// the guard before the entity exists, so a new instance never starts on a
/// zeroed axis.
pub fn spawn_furniture(
    commands: &mut Commands,
    original_store_id: &str,
    furniture_type: Option<&str>,
    position: Vec3,
    rng: &mut impl Rng,
) -> PlacedFurniture {
    let kind = FurnitureType::classify(furniture_type.unwrap_or(original_store_id));
    let instance = FurnitureInstance::new(original_store_id).with_furniture_type(kind.tag());
    let instance_id = instance.instance_id.clone();

    let mut node = DetachedNode::default();
    let correction = guarded_copy(&mut node, &position, rng);
    node.update_world_matrix(false);
    if let Some(correction) = &correction {
        correction.report(&instance_id);
    }

    let mut entity = commands.spawn((
        instance,
        node.transform,
        node.global,
        Name::new(format!("{instance_id}_furniture")),
    ));
    guard_entity(&mut entity);

    match &kind {
        FurnitureType::Custom { store_id } => {
            info!("Placed custom furniture {} (upload {}) at {:?}", instance_id, store_id, node.position())
        }
        FurnitureType::BuiltIn(tag) => {
            info!("Placed {} ({}) at {:?}", instance_id, tag, node.position())
        }
    }

    PlacedFurniture {
        entity: entity.id(),
        instance_id,
        position: node.position(),
        correction,
    }
}

pub fn place_furniture_on_request(
    mut commands: Commands,
    mut requests: EventReader<PlaceFurnitureEvent>,
    mut rng: ResMut<PlacementRng>,
    mut placed: EventWriter<FurniturePlaced>,
    mut corrections: EventWriter<PositionCorrected>,
) {
    for request in requests.read() {
        let result = spawn_furniture(
            &mut commands,
            &request.original_store_id,
            request.furniture_type.as_deref(),
            request.position,
            &mut rng.0,
        );
        if let Some(correction) = result.correction {
            corrections.write(PositionCorrected {
                entity: result.entity,
                instance_id: result.instance_id.clone(),
                original: correction.original,
                corrected: correction.corrected,
            });
        }
        placed.write(FurniturePlaced {
            entity: result.entity,
            instance_id: result.instance_id,
            position: result.position,
        });
    }
}
