use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::error::PlacementError;
use super::quarantine::{QuarantineStats, quarantine_stats};
use super::state::FurnitureInstance;

/// Read-only enumeration of every live furniture instance.
#[derive(SystemParam)]
pub struct FurnitureRegistry<'w, 's> {
    instances: Query<'w, 's, (Entity, &'static FurnitureInstance, &'static Transform)>,
}

impl FurnitureRegistry<'_, '_> {
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &FurnitureInstance, &Transform)> {
        self.instances.iter()
    }

    pub fn find(&self, instance_id: &str) -> Result<Entity, PlacementError> {
        self.iter()
            .find(|(_, instance, _)| instance.instance_id == instance_id)
            .map(|(entity, ..)| entity)
            .ok_or_else(|| PlacementError::UnknownInstance(instance_id.to_string()))
    }

    pub fn stats(&self) -> QuarantineStats {
        quarantine_stats(
            self.iter()
                .map(|(_, instance, transform)| (instance, transform.translation)),
        )
    }
}
