use bevy::prelude::*;
use chrono::{DateTime, Utc};
use constants::placement::DEFAULT_AUDIT_PERIOD;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

use super::identity::generate_instance_id;

// Resources
#[derive(Resource, Debug, Clone)]
pub struct IntegrityMonitorSettings {
    pub audit_period: Duration,
}
impl Default for IntegrityMonitorSettings {
    fn default() -> Self {
        Self {
            audit_period: DEFAULT_AUDIT_PERIOD,
        }
    }
}

/// Random source shared by the guard and the monitor.
#[derive(Resource)]
pub struct PlacementRng(pub StdRng);
impl Default for PlacementRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
impl PlacementRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

// Components

/// Marks an instance whose position writes are rewritten by the position guard.
/// Presence of the marker is the "already guarded" flag.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PositionGuard;

/// Present while the user drags or transforms the instance. The integrity
/// monitor leaves such instances alone until the marker is removed.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ActiveManipulation;

#[derive(Debug, Clone, PartialEq)]
pub struct QuarantineState {
    pub reason: String,
    pub since: DateTime<Utc>,
}

/// A catalog item placed in the room.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FurnitureInstance {
    pub instance_id: String,
    pub original_store_id: String,
    pub furniture_type: String,
    // Flag, reason and timestamp live together so they are set and cleared as one.
    quarantine: Option<QuarantineState>,
}

impl FurnitureInstance {
    /// New instance of a catalog entry with a freshly generated instance id.
    pub fn new(original_store_id: impl Into<String>) -> Self {
        let original_store_id = original_store_id.into();
        Self {
            instance_id: generate_instance_id(&original_store_id),
            furniture_type: original_store_id.clone(),
            original_store_id,
            quarantine: None,
        }
    }

    pub fn with_furniture_type(mut self, furniture_type: impl Into<String>) -> Self {
        self.furniture_type = furniture_type.into();
        self
    }

    pub fn quarantined(&self) -> bool {
        self.quarantine.is_some()
    }

    pub fn quarantine_reason(&self) -> Option<&str> {
        self.quarantine.as_ref().map(|q| q.reason.as_str())
    }

    pub fn quarantine_time(&self) -> Option<DateTime<Utc>> {
        self.quarantine.as_ref().map(|q| q.since)
    }

    pub fn quarantine_state(&self) -> Option<&QuarantineState> {
        self.quarantine.as_ref()
    }

    pub(crate) fn mark_quarantined(&mut self, reason: &str, since: DateTime<Utc>) {
        self.quarantine = Some(QuarantineState {
            reason: reason.to_string(),
            since,
        });
    }

    pub(crate) fn clear_quarantine(&mut self) {
        self.quarantine = None;
    }
}

// Events

/// Request to place a catalog item in the room.
#[derive(Event, Debug, Clone)]
pub struct PlaceFurnitureEvent {
    pub original_store_id: String,
    /// Type tag used by the placement factory; defaults to the store id.
    pub furniture_type: Option<String>,
    pub position: Vec3,
}

#[derive(Event, Debug, Clone)]
pub struct FurniturePlaced {
    pub entity: Entity,
    pub instance_id: String,
    pub position: Vec3,
}

/// Advisory record emitted when the guard rewrote a zeroed axis.
#[derive(Event, Debug, Clone)]
pub struct PositionCorrected {
    pub entity: Entity,
    pub instance_id: String,
    pub original: Vec3,
    pub corrected: Vec3,
}

/// Emitted when an audit tick found an instance sitting at the room centre.
#[derive(Event, Debug, Clone)]
pub struct CenterCollisionAlert {
    pub entity: Entity,
    pub instance_id: String,
    pub original: Vec3,
    pub corrected: Vec3,
}

/// Caller-initiated escalation into the quarantine zone. Without an index the
/// next free grid slot is used.
#[derive(Event, Debug, Clone)]
pub struct QuarantineRequest {
    pub instance_id: String,
    pub index: Option<u32>,
}

#[derive(Event, Debug, Clone)]
pub struct ReleaseRequest {
    pub instance_id: String,
    pub target_index: u32,
}

#[derive(Event, Debug, Clone)]
pub struct InstanceQuarantined {
    pub entity: Entity,
    pub instance_id: String,
    pub position: Vec3,
}

#[derive(Event, Debug, Clone)]
pub struct InstanceReleased {
    pub entity: Entity,
    pub instance_id: String,
    pub position: Vec3,
}

/// Toggles `ActiveManipulation` on an instance while the user drags it.
#[derive(Event, Debug, Clone)]
pub struct ManipulationRequest {
    pub instance_id: String,
    pub active: bool,
}
