use std::time::Duration;

use bevy::prelude::*;
use room_placement_engine::tools::placement_integrity::quarantine::allocate_quarantine_slot;
use room_placement_engine::tools::placement_integrity::{
    ActiveManipulation, CenterCollisionAlert, FurnitureInstance, IntegrityMonitor,
    ManipulationRequest, PlacementIntegrityPlugin, PlacementRng, PositionCorrected, PositionGuard,
    QuarantineRequest, ReleaseRequest,
};

fn integrity_app() -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .add_plugins(PlacementIntegrityPlugin)
        .insert_resource(PlacementRng::seeded(42));
    // Startup starts the monitor.
    app.update();
    app
}

fn advance(app: &mut App, by: Duration) {
    app.world_mut().resource_mut::<Time>().advance_by(by);
    app.update();
}

fn translation(app: &App, entity: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(entity)
        .expect("entity has a transform")
        .translation
}

fn spawn(app: &mut App, store_id: &str, position: Vec3) -> (Entity, String) {
    let instance = FurnitureInstance::new(store_id);
    let instance_id = instance.instance_id.clone();
    let entity = app
        .world_mut()
        .spawn((instance, Transform::from_translation(position)))
        .id();
    (entity, instance_id)
}

fn in_emergency_range(v: f32) -> bool {
    (8.0..12.0).contains(&v)
}

#[test]
fn unguarded_instance_at_centre_is_moved_by_the_next_audit() {
    let mut app = integrity_app();
    let (entity, instance_id) = spawn(&mut app, "armchair", Vec3::new(0.0, 0.4, 0.0));

    advance(&mut app, Duration::from_secs(1));

    let p = translation(&app, entity);
    assert!(in_emergency_range(p.x), "x = {}", p.x);
    assert!(in_emergency_range(p.z), "z = {}", p.z);
    assert_eq!(p.y, 0.4);

    let global = app.world().get::<GlobalTransform>(entity).expect("global");
    assert_eq!(global.translation(), p);

    let alerts = app.world().resource::<Events<CenterCollisionAlert>>();
    let alert = alerts
        .iter_current_update_events()
        .next()
        .expect("alert recorded");
    assert_eq!(alert.instance_id, instance_id);
    assert_eq!(alert.original, Vec3::new(0.0, 0.4, 0.0));
    assert_eq!(app.world().resource::<IntegrityMonitor>().corrections(), 1);
}

#[test]
fn guarded_direct_write_is_rewritten_before_the_frame_ends() {
    let mut app = integrity_app();
    let (entity, _) = spawn(&mut app, "shelf", Vec3::new(3.0, 0.0, 3.0));
    app.world_mut().entity_mut(entity).insert(PositionGuard);
    app.update();

    app.world_mut()
        .get_mut::<Transform>(entity)
        .expect("shelf")
        .translation = Vec3::new(0.0, 1.0, 4.0);
    app.update();

    let p = translation(&app, entity);
    assert!((5.0..7.0).contains(&p.x));
    assert_eq!((p.y, p.z), (1.0, 4.0));
    let corrections = app.world().resource::<Events<PositionCorrected>>();
    assert_eq!(corrections.iter_current_update_events().count(), 1);
}

#[test]
fn quarantine_fills_free_slots_and_release_frees_them() {
    let mut app = integrity_app();
    let (first, first_id) = spawn(&mut app, "sofa", Vec3::new(1.0, 0.0, 1.0));
    let (second, second_id) = spawn(&mut app, "sofa", Vec3::new(2.0, 0.0, 2.0));
    let (third, third_id) = spawn(&mut app, "lamp", Vec3::new(3.0, 0.0, 3.0));

    for instance_id in [&first_id, &second_id] {
        app.world_mut().send_event(QuarantineRequest {
            instance_id: instance_id.clone(),
            index: None,
        });
    }
    app.update();

    assert_eq!(translation(&app, first), allocate_quarantine_slot(0));
    assert_eq!(translation(&app, second), allocate_quarantine_slot(1));
    let parked = app.world().get::<FurnitureInstance>(first).expect("first");
    assert!(parked.quarantined());
    assert_eq!(parked.quarantine_reason(), Some("problematic_position"));

    app.world_mut().send_event(ReleaseRequest {
        instance_id: first_id,
        target_index: 1,
    });
    app.update();

    let released = translation(&app, first);
    assert!(Vec2::new(released.x, released.z).length() >= 8.0);
    assert!(
        !app.world()
            .get::<FurnitureInstance>(first)
            .expect("first")
            .quarantined()
    );

    app.world_mut().send_event(QuarantineRequest {
        instance_id: third_id,
        index: None,
    });
    app.update();
    assert_eq!(translation(&app, third), allocate_quarantine_slot(0));
}

#[test]
fn manipulation_suspends_the_audit_for_that_instance() {
    let mut app = integrity_app();
    let (entity, instance_id) = spawn(&mut app, "table", Vec3::ZERO);

    app.world_mut().send_event(ManipulationRequest {
        instance_id: instance_id.clone(),
        active: true,
    });
    app.update();
    assert!(app.world().get::<ActiveManipulation>(entity).is_some());

    advance(&mut app, Duration::from_secs(1));
    assert_eq!(translation(&app, entity), Vec3::ZERO);

    app.world_mut().send_event(ManipulationRequest {
        instance_id,
        active: false,
    });
    app.update();
    assert!(app.world().get::<ActiveManipulation>(entity).is_none());

    advance(&mut app, Duration::from_secs(1));
    let p = translation(&app, entity);
    assert!(in_emergency_range(p.x));
    assert!(in_emergency_range(p.z));
}
