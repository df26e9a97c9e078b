//! Placement integrity for furniture placed in the room.
//!
//! Guarantees every placed instance occupies a valid, non-degenerate
//! position, repairs it automatically when it does not, and keeps the
//! link between a catalog entry and its placed instances recoverable.
//!
//! ## Architecture
//!
//! ```text
//! identity      instance ids + type tags (pure strings)
//!    └─> guard        rewrites zeroed x/z on every write it can see
//!           └─> quarantine   deterministic parking grid + release ring
//!                  └─> monitor      periodic audit over the whole registry
//! ```
//!
//! ### Position Guard
//! Entities carrying `PositionGuard` have any write that leaves `x == 0` or
//! `z == 0` rewritten in `PostUpdate`, before transform propagation. New
//! instances go through the same rule before they are spawned.
//!
//! ### Integrity Monitor
//! Writes the guard never sees (unguarded entities, writes that bypass change
//! detection, external resets) can still leave an instance at the exact room
//! centre. The monitor audits every instance once per period and moves such
//! instances into `[8, 12)` on both axes, recomputing world matrices before
//! the tick ends. `MonitorHandle::cancel` is the only way to stop it.
//!
//! ### Quarantine Zone
//! Escalation is decided by the caller (the frontend via RPC). Quarantined
//! instances are parked on a five-column grid at `x, z >= 50` and released
//! onto a ring of radius `>= 8` around the centre.

/// Thiserror-backed errors for callers outside the subsystem.
pub mod error;

/// Per-axis position guard and the write interception system.
pub mod guard;

/// Instance id and furniture type tag construction and decomposition.
pub mod identity;

/// Suspending the monitor while an instance is dragged.
pub mod manipulation;

/// Periodic centre-collision audit with cancellable handle.
pub mod monitor;

/// Placement factory spawning guarded instances.
pub mod placement;

/// Quarantine grid allocation, release ring and statistics.
pub mod quarantine;

/// System param enumerating live instances.
pub mod registry;

/// Components, resources and events shared by the subsystem.
pub mod state;

use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub use error::PlacementError;
pub use monitor::{ActiveMonitor, IntegrityMonitor, MonitorHandle, start_integrity_monitor};
pub use registry::FurnitureRegistry;
pub use state::{
    ActiveManipulation, CenterCollisionAlert, FurnitureInstance, FurniturePlaced,
    InstanceQuarantined, InstanceReleased, IntegrityMonitorSettings, ManipulationRequest,
    PlaceFurnitureEvent, PlacementRng, PositionCorrected, PositionGuard, QuarantineRequest,
    ReleaseRequest,
};

use guard::intercept_guarded_writes;
use manipulation::handle_manipulation_requests;
use monitor::{run_integrity_audit, start_monitor_on_startup};
use placement::place_furniture_on_request;
use quarantine::{handle_quarantine_requests, handle_release_requests};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlacementIntegritySet {
    /// Placement, quarantine, release and manipulation requests.
    Requests,
    /// Periodic centre-collision audit.
    Audit,
    /// Rewrites guarded transforms changed this frame.
    Guard,
}

// Registers the integrity resources, events and systems, and starts the monitor.
pub struct PlacementIntegrityPlugin;

impl Plugin for PlacementIntegrityPlugin {
    fn build(&self, app: &mut App) {
        app
            // init resources
            .init_resource::<IntegrityMonitorSettings>()
            .init_resource::<PlacementRng>()
            .init_resource::<ActiveMonitor>()
            .add_event::<PlaceFurnitureEvent>()
            .add_event::<FurniturePlaced>()
            .add_event::<PositionCorrected>()
            .add_event::<CenterCollisionAlert>()
            .add_event::<QuarantineRequest>()
            .add_event::<ReleaseRequest>()
            .add_event::<InstanceQuarantined>()
            .add_event::<InstanceReleased>()
            .add_event::<ManipulationRequest>()
            .configure_sets(
                Update,
                PlacementIntegritySet::Requests.before(PlacementIntegritySet::Audit),
            )
            .configure_sets(
                PostUpdate,
                PlacementIntegritySet::Guard.before(TransformSystem::TransformPropagate),
            )
            .add_systems(Startup, start_monitor_on_startup)
            .add_systems(
                Update,
                (
                    place_furniture_on_request,
                    handle_quarantine_requests,
                    handle_release_requests,
                    handle_manipulation_requests,
                )
                    .chain()
                    .in_set(PlacementIntegritySet::Requests),
            )
            .add_systems(
                Update,
                run_integrity_audit
                    .run_if(resource_exists::<IntegrityMonitor>)
                    .in_set(PlacementIntegritySet::Audit),
            )
            .add_systems(
                PostUpdate,
                intercept_guarded_writes.in_set(PlacementIntegritySet::Guard),
            );
    }
}
