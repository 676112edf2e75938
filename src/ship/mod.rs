//! Ship module: flight state machine and its Bevy wiring.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | `ShipState` and its parts, `InputSample`, `CollisionEvent`, `Pose`, `VisualParams`, `FlightEvent` |
//! | [`dash`] | `DashMode`: one-shot vs draining dash policy |
//! | [`controller`] | `ShipFlightController`: the per-frame `tick` |
//! | [`control`] | `FlightPlugin`, input/contact/event plumbing, transform write-back |
//!
//! All public items are re-exported at this level so the rest of the crate
//! can use flat `crate::ship::*` imports.

pub mod control;
pub mod controller;
pub mod dash;
pub mod state;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use control::{
    apply_ship_visual_system, keyboard_to_input_system, ship_flight_tick_system,
    ship_input_clear_system, sync_flight_config_system, FlightPlugin, ShipContact, ShipFlight,
    ShipFlightEvent, ShipInput, ShipVisual, ShipVisualRoot,
};
pub use controller::ShipFlightController;
pub use dash::DashMode;
pub use state::{
    CollisionEvent, CollisionState, DashState, FlightEvent, InputSample, KnockbackState, Pose,
    ShipState, VisualParams,
};

// ── Ship spawn ─────────────────────────────────────────────────────────────────

use crate::config::FlightConfig;
use bevy::prelude::*;

/// Spawn a ship entity with its visual child and return the ship entity.
///
/// The ship entity's `Transform` is the authoritative pose; attach meshes to
/// the [`ShipVisualRoot`] child so bank, tilt and bob do not disturb it.
pub fn spawn_ship(
    commands: &mut Commands,
    config: &FlightConfig,
    position: Vec3,
    yaw_degrees: f32,
) -> Entity {
    let controller = ShipFlightController::spawn_at(config.clone(), position, yaw_degrees);
    let pose = controller.pose();

    let ship = commands
        .spawn((
            ShipFlight(controller),
            ShipVisual::default(),
            Transform::from_translation(pose.position).with_rotation(pose.rotation()),
            Visibility::default(),
        ))
        .with_children(|ship| {
            ship.spawn((ShipVisualRoot, Transform::default(), Visibility::default()));
        })
        .id();

    info!(
        "✓ Ship spawned at ({:.1}, {:.1}, {:.1}) facing {:.0}° [{} dash]",
        pose.position.x,
        pose.position.y,
        pose.position.z,
        pose.yaw_degrees,
        config.dash_mode.label()
    );
    ship
}
