//! Headless tests for [`FlightPlugin`].
//!
//! These tests use [`MinimalPlugins`] with a fixed manual time step, so every
//! frame advances exactly 1/60 s.  Input goes through the [`ShipInput`]
//! resource and collisions through [`ShipContact`] messages, the same way the
//! game feeds them.
//!
//! Covered scenarios:
//! 1. Stick input flies the ship forward and writes its `Transform`.
//! 2. A dash press raises `DashStarted` exactly once.
//! 3. A contact message starts a knockback and tilts the visual root.
//! 4. Changing `FlightConfig` reaches live ships without a respawn.
//! 5. The secondary stick merges into the primary one.
//! 6. A config that fails validation never reaches live ships.

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use ship_flight::config::FlightConfig;
use ship_flight::ship::{
    ship_flight_tick_system, spawn_ship, DashMode, FlightEvent, FlightPlugin, InputSample,
    ShipContact, ShipFlight, ShipFlightEvent, ShipInput, ShipVisual, ShipVisualRoot,
};
use std::time::Duration;

const DT: f64 = 1.0 / 60.0;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Every flight event seen so far, in order.
#[derive(Resource, Default)]
struct SeenEvents(Vec<FlightEvent>);

fn collect_events(mut reader: MessageReader<ShipFlightEvent>, mut seen: ResMut<SeenEvents>) {
    seen.0.extend(reader.read().map(|m| m.event));
}

/// Headless app with one ship at the origin facing +Z.
///
/// The first update only primes the clock (its delta is zero), so it is run
/// here before returning.
fn app_with_ship() -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, FlightPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(DT)))
        .init_resource::<SeenEvents>()
        .add_systems(Update, collect_events.after(ship_flight_tick_system));

    let world = app.world_mut();
    let ship = {
        let mut commands = world.commands();
        spawn_ship(&mut commands, &FlightConfig::default(), Vec3::ZERO, 0.0)
    };
    world.flush();

    app.update();
    (app, ship)
}

fn step(app: &mut App, input: InputSample, frames: usize) {
    for _ in 0..frames {
        app.world_mut().resource_mut::<ShipInput>().sample = input;
        app.update();
    }
}

fn controller_speed(app: &App, ship: Entity) -> f32 {
    app.world()
        .get::<ShipFlight>(ship)
        .map(|f| f.0.state().current_speed)
        .unwrap_or_default()
}

fn count(app: &App, event: FlightEvent) -> usize {
    app.world()
        .resource::<SeenEvents>()
        .0
        .iter()
        .filter(|e| **e == event)
        .count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// A held stick accelerates the ship along +Z and moves its `Transform`.
#[test]
fn stick_input_flies_ship_forward() {
    let (mut app, ship) = app_with_ship();
    assert_eq!(app.world().get::<Transform>(ship).unwrap().translation, Vec3::ZERO);

    step(&mut app, InputSample::moving(Vec2::Y), 60);

    let transform = app.world().get::<Transform>(ship).unwrap();
    assert!(transform.translation.z > 10.0, "z = {}", transform.translation.z);
    assert!(transform.translation.x.abs() < 1e-3);
    assert!(controller_speed(&app, ship) > 35.0);
    assert_eq!(count(&app, FlightEvent::ThrustStarted), 1);
}

/// One press, many frames: the dash starts once and the press is not replayed.
#[test]
fn dash_press_is_consumed_once() {
    let (mut app, ship) = app_with_ship();
    step(&mut app, InputSample::moving(Vec2::Y), 30);
    step(&mut app, InputSample::moving(Vec2::Y).with_dash(), 1);
    assert!(app.world().get::<ShipVisual>(ship).unwrap().0.is_dashing);

    step(&mut app, InputSample::moving(Vec2::Y), 90);

    assert_eq!(count(&app, FlightEvent::DashStarted), 1);
    assert_eq!(count(&app, FlightEvent::DashEnded), 1);
    assert!(!app.world().get::<ShipVisual>(ship).unwrap().0.is_dashing);
}

/// A contact message knocks the ship back and the visual root tilts.
#[test]
fn contact_message_starts_knockback() {
    let (mut app, ship) = app_with_ship();
    step(&mut app, InputSample::moving(Vec2::Y), 60);
    let z_before = app.world().get::<Transform>(ship).unwrap().translation.z;

    app.world_mut()
        .resource_mut::<Messages<ShipContact>>()
        .write(ShipContact {
            ship,
            other_position: Vec3::new(0.0, 0.0, z_before + 2.0),
        });
    step(&mut app, InputSample::IDLE, 10);

    let visual = app.world().get::<ShipVisual>(ship).unwrap().0;
    assert!(visual.is_knockback);
    assert!(visual.is_colliding);
    let z_after = app.world().get::<Transform>(ship).unwrap().translation.z;
    assert!(z_after < z_before, "pushed back: {z_before} -> {z_after}");

    let seen = &app.world().resource::<SeenEvents>().0;
    assert_eq!(
        seen.iter()
            .filter(|e| matches!(e, FlightEvent::CollisionBegan { .. }))
            .count(),
        1
    );

    let mut roots = app
        .world_mut()
        .query_filtered::<&Transform, With<ShipVisualRoot>>();
    let root = roots.single(app.world()).unwrap();
    assert!(root.rotation.angle_between(Quat::IDENTITY) > 0.05);
}

/// Editing the resource reaches the live controller on the next frame.
#[test]
fn config_changes_reach_live_ships() {
    let (mut app, ship) = app_with_ship();
    step(&mut app, InputSample::moving(Vec2::Y), 90);

    {
        let mut config = app.world_mut().resource_mut::<FlightConfig>();
        config.max_move_speed = 10.0;
        config.dash_mode = DashMode::Draining;
    }
    step(&mut app, InputSample::moving(Vec2::Y), 180);

    let flight = &app.world().get::<ShipFlight>(ship).unwrap().0;
    assert_eq!(flight.config().max_move_speed, 10.0);
    assert_eq!(flight.dash_mode(), DashMode::Draining);
    assert!(controller_speed(&app, ship) <= 10.0 + 1e-3);
    assert_eq!(
        count(&app, FlightEvent::DashModeSwitched(DashMode::Draining)),
        1
    );
}

/// With only the secondary stick pushed right, the ship turns to face +X.
#[test]
fn secondary_stick_steers_the_ship() {
    let (mut app, ship) = app_with_ship();
    for _ in 0..120 {
        app.world_mut().resource_mut::<ShipInput>().secondary_move = Vec2::X;
        app.update();
    }

    let flight = &app.world().get::<ShipFlight>(ship).unwrap().0;
    assert!((flight.pose().yaw_degrees - 90.0).abs() < 1.0);
    let transform = app.world().get::<Transform>(ship).unwrap();
    assert!(transform.translation.x > 5.0);
}

/// A zero cruise speed fails validation; the ship keeps flying on its old
/// tuning instead.
#[test]
fn invalid_config_is_not_applied() {
    let (mut app, ship) = app_with_ship();
    step(&mut app, InputSample::moving(Vec2::Y), 60);

    app.world_mut().resource_mut::<FlightConfig>().max_move_speed = 0.0;
    step(&mut app, InputSample::moving(Vec2::Y), 30);

    let flight = &app.world().get::<ShipFlight>(ship).unwrap().0;
    assert_eq!(flight.config().max_move_speed, 40.0);
    assert!(controller_speed(&app, ship) > 35.0);
    let visual = app.world().get::<ShipVisual>(ship).unwrap().0;
    assert!(visual.bob_offset.is_finite());
}
