//! Centralised flight tuning defaults.
//!
//! Every tunable of the ship controller has its compile-time default here.
//! [`crate::config::FlightConfig::default`] reads from this file, and
//! `assets/flight.toml` can override any subset at startup.
//!
//! ## Tuning guidance
//!
//! Each constant notes the observable consequence of changing it.  After
//! editing, run the replay scenarios (`SHIP_FLIGHT_TEST=<name> cargo run`) to
//! confirm the controller still satisfies its invariants.

use bevy::math::Vec3;

// ── Movement ──────────────────────────────────────────────────────────────────

/// Cruise speed (units/s) the ship settles at under full stick input.
pub const MAX_MOVE_SPEED: f32 = 40.0;

/// Floor for the cruise speed when it divides a speed ratio, so an
/// unvalidated zero cruise speed cannot produce NaN.
pub const MIN_SPEED_RATIO_DIVISOR: f32 = 1.0e-3;

/// Smooth-damp time constant (seconds) for forward speed.
///
/// Speed reaches ~95% of its target after roughly `3 × INERTIA_SMOOTH`.
/// Lower values feel twitchy; higher values feel heavy.
pub const INERTIA_SMOOTH: f32 = 0.3;

/// Fraction of cruise speed shed while the heading error is large.
pub const TURN_DRAG: f32 = 0.3;

/// Heading error (degrees) above which [`TURN_DRAG`] applies.
pub const TURN_DRAG_THRESHOLD: f32 = 45.0;

// ── Boost Start ───────────────────────────────────────────────────────────────

/// Below this speed (units/s) a fresh thrust input gets the start boost.
pub const BOOST_START_THRESHOLD: f32 = 5.0;

/// Target-speed multiplier applied while the start boost is active.
pub const BOOST_START_MULTIPLIER: f32 = 2.0;

// ── Rotation ──────────────────────────────────────────────────────────────────

/// Hard cap on yaw rate (degrees/s).
pub const MAX_ANGULAR_SPEED: f32 = 200.0;

/// Smooth-damp time constant (seconds) for the yaw rate.
pub const ANGULAR_SMOOTH: f32 = 0.1;

/// Maximum visual roll (degrees) at full heading error.
pub const BANK_ANGLE: f32 = 40.0;

/// Exponential rate (1/s) at which the roll follows its target.
pub const BANK_LERP_SPEED: f32 = 4.0;

// ── Dash ──────────────────────────────────────────────────────────────────────

/// Peak additive speed (units/s) at the middle of a one-shot dash.
pub const DASH_SPEED: f32 = 100.0;

/// Length of a one-shot dash (seconds).
pub const DASH_DURATION: f32 = 0.3;

/// Minimum interval between dash starts (seconds), counted from the start.
pub const DASH_COOLDOWN: f32 = 1.0;

/// Remaining dash time (seconds) at which the dash trail starts fading.
pub const DASH_VFX_STOP_THRESHOLD: f32 = 0.2;

/// Exponential rate (1/s) at which speed follows the dash envelope.
pub const DASH_BLEND_RATE: f32 = 10.0;

/// Energy pool (seconds of boost) for the draining dash mode.
pub const DASH_ENERGY_MAX: f32 = 3.0;

/// Energy drained per second while the draining dash is held.
pub const DASH_ENERGY_DRAIN_RATE: f32 = 1.0;

/// Energy regained per second once regeneration starts.
pub const DASH_ENERGY_REGEN_RATE: f32 = 0.6;

/// Seconds after release before energy starts regenerating.
pub const DASH_ENERGY_REGEN_DELAY: f32 = 1.0;

/// Divisor guard for the dash progress computation.
pub const DASH_DURATION_EPSILON: f32 = 1.0e-4;

// ── Collision / Knockback ─────────────────────────────────────────────────────

/// Per-axis tilt (pitch, yaw, roll in degrees) at unit knockback.
///
/// Each axis of the computed tilt is clamped to twice its value.
pub const MAX_KNOCKBACK_TILT: Vec3 = Vec3::new(30.0, 20.0, 25.0);

/// Seconds the ship stays unresponsive after an accepted collision.
pub const COLLISION_FREEZE_TIME: f32 = 0.5;

/// Seconds after an accepted collision during which new ones are ignored.
pub const COLLISION_COOLDOWN: f32 = 0.2;

/// Seconds after the freeze ends during which idle bob stays flat.
pub const POST_COLLISION_IDLE_DELAY: f32 = 0.7;

/// Exponential rate (1/s) at which the knockback tilt is approached or recovered.
pub const KNOCKBACK_TILT_LERP_SPEED: f32 = 4.0;

/// Impact speed → knockback force factor.
pub const KNOCKBACK_FORCE_MULTIPLIER: f32 = 0.5;

/// Upper clamp on the knockback force (units/s).
pub const KNOCKBACK_MAX_FORCE: f32 = 80.0;

/// Exponential rate (1/s) at which knockback force decays.
pub const KNOCKBACK_DECAY_SPEED: f32 = 6.0;

/// Force below which the knockback leaves its impulse phase.
pub const KNOCKBACK_FORCE_EPSILON: f32 = 0.05;

/// Tilt magnitude (degrees) at which recovery completes on its own.
pub const KNOCKBACK_TILT_END_THRESHOLD: f32 = 1.0;

/// Tilt magnitude (degrees) at which stick input may cut recovery short.
pub const INPUT_CANCEL_TILT_THRESHOLD: f32 = 8.0;

/// Spin speed (degrees/s) below which the knockback spin stops advancing.
pub const KNOCKBACK_SPIN_EPSILON: f32 = 0.1;

/// Exponential decay rate (1/s) of the knockback spin.
pub const KNOCKBACK_SPIN_DECAY: f32 = 2.0;

/// Impact speed → spin speed factor (degrees/s per unit/s).
pub const KNOCKBACK_SPIN_FACTOR: f32 = 5.0;

// ── Idle Bobbing ──────────────────────────────────────────────────────────────

/// Peak vertical offset (units) of the idle bob at rest.
pub const BOB_AMPLITUDE: f32 = 0.18;

/// Angular frequency (rad/s) of the idle bob.
pub const BOB_FREQUENCY: f32 = 1.5;

/// Exponential rate (1/s) at which the bob offset follows its target.
pub const BOB_SMOOTH: f32 = 5.0;

// ── Input ─────────────────────────────────────────────────────────────────────

/// Squared stick length below which the move input counts as "no input".
pub const INPUT_PRESENCE_SQR: f32 = 0.01;
