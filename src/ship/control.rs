//! Bevy systems that drive [`ShipFlightController`]s.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`keyboard_to_input_system`]: WASD/arrows + Space into [`ShipInput`].
//! 2. [`sync_flight_config_system`]: pushes a changed [`FlightConfig`] into live ships.
//! 3. [`ship_flight_tick_system`]: ticks every ship, writes `Transform`, emits [`ShipFlightEvent`]s.
//! 4. [`apply_ship_visual_system`]: bank/tilt/spin/bob onto the [`ShipVisualRoot`] child.
//! 5. [`ship_input_clear_system`]: resets [`ShipInput`] for the next frame.
//!
//! [`ShipInput`] is the input abstraction layer: anything (gamepad, touch
//! joystick, a replay) may write it before the tick; tests populate it
//! directly.  Collisions come in as [`ShipContact`] messages from whatever
//! detects them.

use super::controller::ShipFlightController;
use super::state::{CollisionEvent, FlightEvent, InputSample, VisualParams};
use crate::config::FlightConfig;
use crate::math::merge_move_inputs;
use bevy::prelude::*;
use std::collections::HashMap;

// ── Components / resources / messages ─────────────────────────────────────────

/// A flying ship.  The controller is the sole owner of the ship's flight state.
#[derive(Component, Debug, Clone)]
pub struct ShipFlight(pub ShipFlightController);

/// Visual parameters produced by the last tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ShipVisual(pub VisualParams);

/// Marks the child entity that carries the ship's mesh.
#[derive(Component, Debug, Default)]
pub struct ShipVisualRoot;

/// This frame's player input.
///
/// `secondary_move` (e.g. an on-screen joystick) is merged into
/// `sample.move_direction` at tick time.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ShipInput {
    pub sample: InputSample,
    pub secondary_move: Vec2,
}

impl ShipInput {
    /// The sample actually fed to the controllers.
    pub fn merged(&self) -> InputSample {
        InputSample {
            move_direction: merge_move_inputs(self.sample.move_direction, self.secondary_move),
            ..self.sample
        }
    }
}

/// A ship touched an obstacle at `other_position`.
#[derive(Message, Debug, Clone, Copy)]
pub struct ShipContact {
    pub ship: Entity,
    pub other_position: Vec3,
}

/// A [`FlightEvent`] raised by `ship` this frame.
#[derive(Message, Debug, Clone, Copy)]
pub struct ShipFlightEvent {
    pub ship: Entity,
    pub event: FlightEvent,
}

// ── Plugin ─────────────────────────────────────────────────────────────────────

pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlightConfig>()
            .init_resource::<ShipInput>()
            .add_message::<ShipContact>()
            .add_message::<ShipFlightEvent>()
            .add_systems(
                Update,
                (
                    keyboard_to_input_system,
                    sync_flight_config_system,
                    ship_flight_tick_system,
                    apply_ship_visual_system,
                    ship_input_clear_system,
                )
                    .chain(),
            );
    }
}

// ── Step 1: Keyboard → input ──────────────────────────────────────────────────

/// Translate keyboard state into [`ShipInput`].
///
/// - **W/↑ S/↓ A/← D/→** → ground-plane move direction (normalised)
/// - **Space** just pressed → `dash_pressed`; held → `dash_held`
///
/// Leaves the move direction alone when no movement key is down, so another
/// source can provide it.  Does nothing when keyboard input is not available.
pub fn keyboard_to_input_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut input: ResMut<ShipInput>,
) {
    let Some(keys) = keys else {
        return;
    };

    let mut direction = Vec2::ZERO;
    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        direction.y += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        direction.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction.x += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction.x -= 1.0;
    }
    let direction = direction.normalize_or_zero();
    if direction != Vec2::ZERO {
        input.sample.move_direction = direction;
    }

    if keys.just_pressed(KeyCode::Space) {
        input.sample.dash_pressed = true;
    }
    if keys.pressed(KeyCode::Space) {
        input.sample.dash_held = true;
    }
}

// ── Step 2: Config hot-apply ──────────────────────────────────────────────────

/// Push a changed [`FlightConfig`] into every live ship without resetting it.
/// A config that fails [`FlightConfig::validate`] is skipped with a warning.
pub fn sync_flight_config_system(config: Res<FlightConfig>, mut ships: Query<&mut ShipFlight>) {
    if !config.is_changed() {
        return;
    }
    if let Err(e) = config.validate() {
        warn!("Flight config rejected, ships keep their previous tuning: {e}");
        return;
    }
    for mut flight in &mut ships {
        if flight.0.config() != &*config {
            flight.0.set_config(config.clone());
        }
    }
}

// ── Step 3: Tick ──────────────────────────────────────────────────────────────

/// Tick every ship with this frame's delta, input and first contact.
///
/// Contacts beyond the first per ship per frame are dropped, as are contacts
/// the controller rejects inside its freeze/cooldown window.
pub fn ship_flight_tick_system(
    time: Res<Time>,
    input: Res<ShipInput>,
    mut contacts: MessageReader<ShipContact>,
    mut flight_events: MessageWriter<ShipFlightEvent>,
    mut ships: Query<(Entity, &mut ShipFlight, &mut Transform, &mut ShipVisual)>,
) {
    let dt = time.delta_secs();
    let sample = input.merged();

    let mut first_contact: HashMap<Entity, Vec3> = HashMap::new();
    for contact in contacts.read() {
        first_contact
            .entry(contact.ship)
            .or_insert(contact.other_position);
    }

    for (entity, mut flight, mut transform, mut visual) in &mut ships {
        let collision = first_contact
            .get(&entity)
            .map(|&other_position| CollisionEvent { other_position });

        let (pose, visuals) = flight.0.tick(dt, sample, collision);
        transform.translation = pose.position;
        transform.rotation = pose.rotation();
        visual.0 = visuals;

        for event in flight.0.drain_events() {
            if let FlightEvent::CollisionBegan {
                impact_speed,
                was_dashing,
            } = event
            {
                info!(
                    "[flight] {:?} hit an obstacle at {:.1} u/s{}",
                    entity,
                    impact_speed,
                    if was_dashing { " while dashing" } else { "" }
                );
            }
            flight_events.write(ShipFlightEvent {
                ship: entity,
                event,
            });
        }
    }
}

// ── Step 4: Visuals ───────────────────────────────────────────────────────────

/// Copy each ship's [`ShipVisual`] onto its [`ShipVisualRoot`] child.
pub fn apply_ship_visual_system(
    ships: Query<&ShipVisual>,
    mut roots: Query<(&ChildOf, &mut Transform), With<ShipVisualRoot>>,
) {
    for (child_of, mut transform) in &mut roots {
        if let Ok(visual) = ships.get(child_of.parent()) {
            transform.rotation = visual.0.local_rotation();
            transform.translation = visual.0.local_offset();
        }
    }
}

// ── Step 5: Clear ─────────────────────────────────────────────────────────────

/// Reset [`ShipInput`] once the ships have consumed it, so a dash press is
/// seen exactly once.
pub fn ship_input_clear_system(mut input: ResMut<ShipInput>) {
    *input = ShipInput::default();
}
