use bevy::prelude::*;

use super::registry::FurnitureRegistry;
use super::state::{ActiveManipulation, ManipulationRequest};

/// Suspends or resumes monitoring for an instance while the user drags it.
pub fn handle_manipulation_requests(
    mut commands: Commands,
    mut requests: EventReader<ManipulationRequest>,
    registry: FurnitureRegistry,
) {
    for request in requests.read() {
        let entity = match registry.find(&request.instance_id) {
            Ok(entity) => entity,
            Err(err) => {
                warn!("Manipulation request ignored: {}", err);
                continue;
            }
        };
        if request.active {
            commands.entity(entity).insert(ActiveManipulation);
        } else {
            commands.entity(entity).remove::<ActiveManipulation>();
        }
    }
}
