//! Ship state, per-frame inputs and per-frame outputs.
//!
//! [`ShipState`] is owned and mutated only by
//! [`super::controller::ShipFlightController`].  Callers feed an
//! [`InputSample`] and an optional [`CollisionEvent`] each frame and get back
//! a [`Pose`] plus [`VisualParams`].

use crate::math::{has_move_input, yaw_forward, yaw_right};
use bevy::prelude::*;

// ── Inputs ─────────────────────────────────────────────────────────────────────

/// One frame of already-merged player input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSample {
    /// Ground-plane direction (stick +Y maps to world +Z).  Zero means no input.
    pub move_direction: Vec2,
    /// True only on the frame the dash button went down.
    pub dash_pressed: bool,
    /// True while the dash button is held (draining dash mode).
    pub dash_held: bool,
}

impl InputSample {
    /// No stick, no buttons.
    pub const IDLE: Self = Self {
        move_direction: Vec2::ZERO,
        dash_pressed: false,
        dash_held: false,
    };

    pub fn moving(direction: Vec2) -> Self {
        Self {
            move_direction: direction,
            ..Self::IDLE
        }
    }

    /// Same input with a dash press on this frame.
    pub fn with_dash(mut self) -> Self {
        self.dash_pressed = true;
        self.dash_held = true;
        self
    }

    #[inline]
    pub fn has_move(&self) -> bool {
        has_move_input(self.move_direction)
    }
}

/// Contact with an obstacle, reported by whatever detects collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// World position of the thing the ship hit.
    pub other_position: Vec3,
}

// ── Outputs ────────────────────────────────────────────────────────────────────

/// Authoritative ship pose.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Heading in degrees, wrapped into `(-180, 180]`.
    pub yaw_degrees: f32,
}

impl Pose {
    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw_degrees.to_radians())
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        crate::math::yaw_forward(self.yaw_degrees)
    }
}

/// Cosmetic parameters for the ship's visual child; they never feed back into
/// the pose.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisualParams {
    /// Roll (degrees) from turning.
    pub bank_degrees: f32,
    /// Vertical idle-bob offset.
    pub bob_offset: f32,
    /// Knockback tilt (pitch, yaw, roll in degrees).
    pub knockback_tilt_euler: Vec3,
    /// Ship-local axis of the knockback spin; zero when not spinning.
    pub spin_axis: Vec3,
    /// Accumulated knockback spin (degrees).
    pub spin_degrees: f32,
    /// Thrust trail should be emitting.
    pub thrust_active: bool,
    pub is_dashing: bool,
    pub is_colliding: bool,
    pub is_knockback: bool,
}

impl VisualParams {
    /// Local rotation for the visual child: bank, then knockback tilt, then spin.
    pub fn local_rotation(&self) -> Quat {
        let bank = Quat::from_rotation_z(self.bank_degrees.to_radians());
        let tilt = Quat::from_euler(
            EulerRot::YXZ,
            self.knockback_tilt_euler.y.to_radians(),
            self.knockback_tilt_euler.x.to_radians(),
            self.knockback_tilt_euler.z.to_radians(),
        );
        let spin = match self.spin_axis.try_normalize() {
            Some(axis) => Quat::from_axis_angle(axis, self.spin_degrees.to_radians()),
            None => Quat::IDENTITY,
        };
        bank * tilt * spin
    }

    /// Local offset for the visual child.
    #[inline]
    pub fn local_offset(&self) -> Vec3 {
        Vec3::Y * self.bob_offset
    }
}

/// Discrete things that happened during a tick, for VFX, audio and camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightEvent {
    ThrustStarted,
    ThrustStopped,
    /// Target speed got the start boost.
    BoostStarted,
    DashStarted,
    /// One-shot dash entered its last `dash_vfx_stop_threshold` seconds.
    DashFading,
    DashEnded,
    /// A collision was accepted.  Drives camera shake.
    CollisionBegan {
        impact_speed: f32,
        was_dashing: bool,
    },
    /// A collision arrived inside the freeze/cooldown window and was dropped.
    CollisionIgnored,
    FreezeEnded,
    KnockbackEnded {
        resume_thrust: bool,
    },
    DashModeSwitched(super::dash::DashMode),
}

// ── State ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashState {
    /// Remaining one-shot dash time (seconds).
    pub timer: f32,
    /// Remaining time before another dash may start (seconds).
    pub cooldown_timer: f32,
    pub active: bool,
    /// One-shot dash trail already told to fade.
    pub fading: bool,
    /// Draining mode energy (seconds of boost).
    pub energy: f32,
    /// Draining mode delay before regeneration (seconds).
    pub regen_timer: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KnockbackState {
    pub active: bool,
    /// Unit ground-plane push direction (world space).
    pub direction: Vec3,
    /// Current push speed (units/s).
    pub force: f32,
    /// Force at the moment of impact.
    pub impact_force: f32,
    pub target_tilt_euler: Vec3,
    pub current_tilt_euler: Vec3,
    /// Spin axis: the flattened push direction, in world space like
    /// `direction`.  [`ShipState::visual_params`] hands it out in the ship's
    /// local frame.
    pub spin_axis: Vec3,
    /// Degrees per second.
    pub spin_speed: f32,
    pub spin_degrees: f32,
    /// A dash was running when the collision landed; halves force decay.
    pub dashed_at_impact: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionState {
    pub is_colliding: bool,
    pub freeze_timer: f32,
    pub cooldown_timer: f32,
    /// Idle bob stays flat while this runs.
    pub post_idle_timer: f32,
}

/// Everything the controller integrates from frame to frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipState {
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub current_speed: f32,
    pub speed_smoothing_velocity: f32,
    pub current_angular_speed: f32,
    pub angular_smoothing_velocity: f32,
    pub target_yaw_degrees: f32,
    pub current_bank_degrees: f32,
    pub bob_offset: f32,
    pub thrust_active: bool,
    pub boosting: bool,
    /// Idle bob clock (seconds).  Wrapped to one bob period so it keeps
    /// advancing however long the ship lives.
    pub elapsed: f32,
    pub dash: DashState,
    pub knockback: KnockbackState,
    pub collision: CollisionState,
}

impl ShipState {
    pub fn spawned_at(position: Vec3, yaw_degrees: f32, dash_energy: f32) -> Self {
        let yaw = crate::math::wrap_degrees(yaw_degrees);
        Self {
            position,
            yaw_degrees: yaw,
            target_yaw_degrees: yaw,
            dash: DashState {
                energy: dash_energy,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            yaw_degrees: self.yaw_degrees,
        }
    }

    pub fn visual_params(&self) -> VisualParams {
        let knockback = &self.knockback;
        VisualParams {
            bank_degrees: self.current_bank_degrees,
            bob_offset: self.bob_offset,
            knockback_tilt_euler: knockback.current_tilt_euler,
            spin_axis: if knockback.active {
                Vec3::new(
                    knockback.spin_axis.dot(yaw_right(self.yaw_degrees)),
                    0.0,
                    knockback.spin_axis.dot(yaw_forward(self.yaw_degrees)),
                )
            } else {
                Vec3::ZERO
            },
            spin_degrees: knockback.spin_degrees,
            thrust_active: self.thrust_active,
            is_dashing: self.dash.active,
            is_colliding: self.collision.is_colliding,
            is_knockback: knockback.active,
        }
    }
}
