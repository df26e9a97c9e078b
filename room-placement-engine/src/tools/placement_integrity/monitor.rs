use bevy::prelude::*;
use constants::placement::{EMERGENCY_SUBSTITUTE_MAX, EMERGENCY_SUBSTITUTE_MIN};
use rand::Rng;
use std::time::Duration;

use super::error::PlacementError;
use super::state::{
    ActiveManipulation, CenterCollisionAlert, FurnitureInstance, IntegrityMonitorSettings,
    PlacementRng,
};
use crate::engine::scene::scene_object::{DescendantTransforms, SceneNode, SceneObject};

/// Recurring audit state. The audit system only runs while this resource exists.
#[derive(Resource, Debug)]
pub struct IntegrityMonitor {
    timer: Timer,
    generation: u64,
    ticks: u64,
    corrections: u64,
}

impl IntegrityMonitor {
    pub fn period(&self) -> Duration {
        self.timer.duration()
    }

    /// Audit passes completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Centre collisions repaired so far.
    pub fn corrections(&self) -> u64 {
        self.corrections
    }
}

#[derive(Resource, Default)]
struct MonitorGeneration(u64);

/// The only way to stop a running monitor.
#[derive(Debug)]
#[must_use = "the monitor can only be stopped through its handle"]
pub struct MonitorHandle {
    generation: u64,
}

impl MonitorHandle {
    /// Deregister the audit. Returns false when the monitor this handle
    /// started has already been stopped or replaced.
    pub fn cancel(self, world: &mut World) -> bool {
        let current = self.is_current(world.get_resource::<IntegrityMonitor>());
        if current {
            world.remove_resource::<IntegrityMonitor>();
            info!("Integrity monitor stopped");
        }
        current
    }
}

impl MonitorHandle {
    /// True while `monitor` is the one this handle started.
    pub fn is_current(&self, monitor: Option<&IntegrityMonitor>) -> bool {
        monitor.is_some_and(|monitor| monitor.generation == self.generation)
    }
}

/// Handle owned by the application entry point.
#[derive(Resource, Default)]
pub struct ActiveMonitor(pub Option<MonitorHandle>);

/// Begin auditing every `period`. A monitor that is already running is
/// replaced and its handle goes stale.
pub fn start_integrity_monitor(world: &mut World, period: Duration) -> MonitorHandle {
    let generation = {
        let mut counter = world.get_resource_or_insert_with(MonitorGeneration::default);
        counter.0 += 1;
        counter.0
    };
    world.insert_resource(IntegrityMonitor {
        timer: Timer::new(period, TimerMode::Repeating),
        generation,
        ticks: 0,
        corrections: 0,
    });
    info!("Integrity monitor started, period {:?}", period);
    MonitorHandle { generation }
}

pub fn start_monitor_on_startup(world: &mut World) {
    let period = world
        .get_resource::<IntegrityMonitorSettings>()
        .cloned()
        .unwrap_or_default()
        .audit_period;
    let handle = start_integrity_monitor(world, period);
    world.insert_resource(ActiveMonitor(Some(handle)));
}

/// Why the monitor held in `ActiveMonitor` cannot be stopped, if it cannot.
pub fn active_monitor_status(
    active: &ActiveMonitor,
    monitor: Option<&IntegrityMonitor>,
) -> Result<(), PlacementError> {
    match (&active.0, monitor) {
        (_, None) | (None, _) => Err(PlacementError::MonitorNotRunning),
        (Some(handle), monitor) if !handle.is_current(monitor) => {
            Err(PlacementError::StaleMonitorHandle)
        }
        _ => Ok(()),
    }
}

/// Cancel the monitor held in `ActiveMonitor`, if any.
pub fn stop_active_monitor(world: &mut World) -> bool {
    let handle = world
        .get_resource_mut::<ActiveMonitor>()
        .and_then(|mut active| active.0.take());
    handle.is_some_and(|handle| handle.cancel(world))
}

/// `x == 0 AND z == 0`, the degenerate room-centre position.
pub fn is_center_collision(position: Vec3) -> bool {
    position.x == 0.0 && position.z == 0.0
}

/// Move an object off the room centre into `[8, 12)` on x and z and rebuild
/// its world matrix, children included. Returns `(original, corrected)`.
pub fn emergency_correct(
    handle: &mut impl SceneObject,
    rng: &mut impl Rng,
) -> Option<(Vec3, Vec3)> {
    let original = handle.position();
    if !is_center_collision(original) {
        return None;
    }
    let corrected = Vec3::new(
        rng.gen_range(EMERGENCY_SUBSTITUTE_MIN..EMERGENCY_SUBSTITUTE_MAX),
        original.y,
        rng.gen_range(EMERGENCY_SUBSTITUTE_MIN..EMERGENCY_SUBSTITUTE_MAX),
    );
    handle.copy_position(&corrected);
    handle.update_world_matrix(true);
    Some((original, corrected))
}

/// One audit tick per timer completion. Instances under active manipulation
/// are skipped.
pub fn run_integrity_audit(
    time: Res<Time>,
    mut monitor: ResMut<IntegrityMonitor>,
    mut rng: ResMut<PlacementRng>,
    mut furniture: Query<
        (
            Entity,
            &FurnitureInstance,
            &mut Transform,
            &mut GlobalTransform,
            Option<&Children>,
        ),
        Without<ActiveManipulation>,
    >,
    mut descendants: DescendantTransforms,
    mut alerts: EventWriter<CenterCollisionAlert>,
) {
    monitor.timer.tick(time.delta());
    if !monitor.timer.just_finished() {
        return;
    }
    monitor.ticks += 1;

    for (entity, instance, transform, global, children) in &mut furniture {
        // Read through the deref so clean instances are not flagged as changed.
        if !is_center_collision(transform.translation) {
            continue;
        }
        let mut node = SceneNode::new(transform, global).with_hierarchy(children, &mut descendants);
        let Some((original, corrected)) = emergency_correct(&mut node, &mut rng.0) else {
            continue;
        };
        monitor.corrections += 1;
        warn!(
            "Integrity monitor: {} found at room centre {:?}, moved to {:?}",
            instance.instance_id, original, corrected
        );
        alerts.write(CenterCollisionAlert {
            entity,
            instance_id: instance.instance_id.clone(),
            original,
            corrected,
        });
    }
}
