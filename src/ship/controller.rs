//! The ship flight state machine.
//!
//! ## Per-tick order
//!
//! 1. Advance timers (collision cooldown, dash cooldown, freeze → post-idle).
//! 2. Accept or drop this tick's collision event.
//! 3. Dispatch exactly one mode, in priority order:
//!
//! | Mode | Condition | Effect |
//! |------|-----------|--------|
//! | Knockback | `knockback.active` | push along knockback direction, tilt, spin, recover |
//! | Frozen | `collision.freeze_timer > 0` | ship is inert |
//! | Normal flight | otherwise | dash, speed/yaw integration, bank, bob |
//!
//! All integration is driven by the caller's `dt`, so a recorded sequence of
//! `(dt, input, collision)` replays bit-for-bit.

use super::dash::DashMode;
use super::state::{
    CollisionEvent, FlightEvent, InputSample, KnockbackState, Pose, ShipState, VisualParams,
};
use crate::config::FlightConfig;
use crate::constants::{
    KNOCKBACK_FORCE_EPSILON, KNOCKBACK_SPIN_DECAY, KNOCKBACK_SPIN_EPSILON, KNOCKBACK_SPIN_FACTOR,
    MIN_SPEED_RATIO_DIVISOR,
};
use crate::math::{
    delta_angle, lerp, lerp_factor, lerp_vec3, move_towards_angle, smooth_damp, stick_yaw,
    wrap_degrees, yaw_forward, yaw_right,
};
use bevy::prelude::*;

/// Heading error (degrees) that maps to full bank.
const BANK_FULL_ERROR: f32 = 45.0;
/// Bank amplification while dashing.
const DASH_BANK_SCALE: f32 = 1.5;
/// Heading error (degrees) treated as "on course" for the yaw-rate target.
const YAW_SETTLE_EPSILON: f32 = 1.0e-3;
/// Minimum squared length of the flattened push vector before falling back.
const KNOCKBACK_DIR_MIN_SQR: f32 = 1.0e-4;

/// Owns one ship's [`ShipState`] and advances it a frame at a time.
#[derive(Debug, Clone)]
pub struct ShipFlightController {
    config: FlightConfig,
    dash_mode: DashMode,
    state: ShipState,
    last_output: (Pose, VisualParams),
    events: Vec<FlightEvent>,
}

impl ShipFlightController {
    /// A ship at the origin facing +Z.
    pub fn new(config: FlightConfig) -> Self {
        Self::spawn_at(config, Vec3::ZERO, 0.0)
    }

    pub fn spawn_at(config: FlightConfig, position: Vec3, yaw_degrees: f32) -> Self {
        let state = ShipState::spawned_at(position, yaw_degrees, config.dash_energy_max);
        Self {
            dash_mode: config.dash_mode,
            last_output: (state.pose(), state.visual_params()),
            state,
            config,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &ShipState {
        &self.state
    }

    #[inline]
    pub fn dash_mode(&self) -> DashMode {
        self.dash_mode
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.last_output.0
    }

    #[inline]
    pub fn visual_params(&self) -> VisualParams {
        self.last_output.1
    }

    /// Events raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, FlightEvent> {
        self.events.drain(..)
    }

    /// Swap tunables without resetting the ship.  A different `dash_mode`
    /// switches modes the same way [`Self::switch_dash_mode`] does.
    pub fn set_config(&mut self, config: FlightConfig) {
        let mode_changed = config.dash_mode != self.dash_mode;
        self.config = config;
        if mode_changed {
            self.set_dash_mode(self.config.dash_mode);
        }
        let ceiling = self.speed_ceiling();
        self.state.current_speed = self.state.current_speed.clamp(0.0, ceiling);
    }

    /// Toggle between one-shot and draining dash, resetting all dash state.
    pub fn switch_dash_mode(&mut self) {
        self.set_dash_mode(self.dash_mode.toggled());
    }

    fn set_dash_mode(&mut self, mode: DashMode) {
        let was_dashing = self.state.dash.active;
        self.dash_mode = mode;
        self.state.dash = mode.reset_state(&self.config);
        if was_dashing {
            self.events.push(FlightEvent::DashEnded);
        }
        self.events.push(FlightEvent::DashModeSwitched(mode));
        debug!("[flight] dash mode switched to {}", mode.label());
    }

    /// Advance one frame.
    ///
    /// A non-positive (or non-finite) `dt` is a no-op: nothing moves, no timer
    /// runs, and `collision` is dropped.
    pub fn tick(
        &mut self,
        dt: f32,
        input: InputSample,
        collision: Option<CollisionEvent>,
    ) -> (Pose, VisualParams) {
        if !(dt > 0.0 && dt.is_finite()) {
            return self.last_output;
        }

        self.advance_bob_clock(dt);
        self.update_timers(dt);

        if let Some(event) = collision {
            if self.accepts_collision() {
                self.begin_collision(event);
            } else {
                self.events.push(FlightEvent::CollisionIgnored);
                debug!("[flight] collision inside freeze/cooldown window ignored");
            }
        }

        let has_input = input.has_move();
        if self.state.knockback.active {
            self.handle_knockback(dt, has_input);
        } else if self.state.collision.freeze_timer > 0.0 {
            // Frozen: inert until the freeze timer runs out.
        } else {
            self.handle_normal_flight(dt, &input, has_input);
        }

        self.last_output = (self.state.pose(), self.state.visual_params());
        self.last_output
    }

    /// True when a collision event would be accepted right now.
    #[inline]
    pub fn accepts_collision(&self) -> bool {
        self.state.collision.cooldown_timer <= 0.0 && self.state.collision.freeze_timer <= 0.0
    }

    #[inline]
    fn speed_ceiling(&self) -> f32 {
        self.config.max_move_speed + self.config.dash_speed
    }

    /// `speed / max_move_speed`, clamped to `[0, 1]`.
    #[inline]
    fn cruise_fraction(&self, speed: f32) -> f32 {
        (speed / self.config.max_move_speed.max(MIN_SPEED_RATIO_DIVISOR)).clamp(0.0, 1.0)
    }

    /// Advance the bob clock, wrapped to one bob period.
    fn advance_bob_clock(&mut self, dt: f32) {
        let elapsed = self.state.elapsed + dt;
        self.state.elapsed = if self.config.bob_frequency > 0.0 {
            elapsed.rem_euclid(std::f32::consts::TAU / self.config.bob_frequency)
        } else {
            elapsed
        };
    }

    // ── Timers ────────────────────────────────────────────────────────────────

    fn update_timers(&mut self, dt: f32) {
        let post_idle_delay = self.config.post_collision_idle_delay;
        let state = &mut self.state;

        state.collision.cooldown_timer = (state.collision.cooldown_timer - dt).max(0.0);
        state.dash.cooldown_timer = (state.dash.cooldown_timer - dt).max(0.0);

        if state.collision.freeze_timer > 0.0 {
            state.collision.freeze_timer -= dt;
            if state.collision.freeze_timer <= 0.0 {
                state.collision.freeze_timer = 0.0;
                state.collision.is_colliding = false;
                state.current_speed = 0.0;
                state.speed_smoothing_velocity = 0.0;
                state.collision.post_idle_timer = post_idle_delay;
                self.events.push(FlightEvent::FreezeEnded);
                debug!("[flight] collision freeze ended");
            }
        } else if state.collision.post_idle_timer > 0.0 {
            state.collision.post_idle_timer = (state.collision.post_idle_timer - dt).max(0.0);
        }
    }

    // ── Collision / knockback ─────────────────────────────────────────────────

    fn begin_collision(&mut self, event: CollisionEvent) {
        let speed_factor = self.cruise_fraction(self.state.current_speed);
        let config = &self.config;
        let state = &mut self.state;

        let forward = yaw_forward(state.yaw_degrees);
        let right = yaw_right(state.yaw_degrees);

        let mut push = state.position - event.other_position;
        push.y = 0.0;
        let direction = if push.length_squared() > KNOCKBACK_DIR_MIN_SQR {
            push.normalize()
        } else {
            -forward
        };

        let impact_speed = state.current_speed;
        let was_dashing = state.dash.active;
        let dash_bonus = if was_dashing { 2.0 } else { 1.0 };
        let force = (impact_speed * config.knockback_force_multiplier * dash_bonus)
            .clamp(0.0, config.knockback_max_force.max(0.0));

        // Push direction in the ship's own frame: x = right, z = forward.
        let local = Vec3::new(direction.dot(right), 0.0, direction.dot(forward));
        let tilt_multiplier = 1.0 + speed_factor * if was_dashing { 1.5 } else { 0.5 };
        let max_tilt = config.max_knockback_tilt().abs();
        let target_tilt = Vec3::new(
            (-local.z.abs() * max_tilt.x * tilt_multiplier).clamp(-max_tilt.x * 2.0, 0.0),
            (local.x * max_tilt.y * tilt_multiplier).clamp(-max_tilt.y * 2.0, max_tilt.y * 2.0),
            (-local.x * max_tilt.z * 0.5 * tilt_multiplier)
                .clamp(-max_tilt.z * 2.0, max_tilt.z * 2.0),
        );

        state.knockback = KnockbackState {
            active: true,
            direction,
            force,
            impact_force: force,
            target_tilt_euler: target_tilt,
            current_tilt_euler: Vec3::ZERO,
            spin_axis: direction,
            spin_speed: impact_speed * KNOCKBACK_SPIN_FACTOR * dash_bonus,
            spin_degrees: 0.0,
            dashed_at_impact: was_dashing,
        };

        state.current_speed = 0.0;
        state.speed_smoothing_velocity = 0.0;
        state.current_angular_speed = 0.0;
        state.angular_smoothing_velocity = 0.0;
        state.boosting = false;

        state.collision.is_colliding = true;
        state.collision.freeze_timer = config.collision_freeze_time;
        state.collision.cooldown_timer = config.collision_cooldown;

        state.dash.active = false;
        state.dash.timer = 0.0;
        state.dash.fading = false;
        if was_dashing {
            self.events.push(FlightEvent::DashEnded);
        }
        if state.thrust_active {
            state.thrust_active = false;
            self.events.push(FlightEvent::ThrustStopped);
        }
        self.events.push(FlightEvent::CollisionBegan {
            impact_speed,
            was_dashing,
        });
        debug!(
            "[flight] collision at {:.1} u/s (dashing: {}), knockback force {:.1}",
            impact_speed, was_dashing, force
        );
    }

    fn handle_knockback(&mut self, dt: f32, has_input: bool) {
        let base_rate = self.config.knockback_tilt_lerp_speed;
        let decay_rate = self.config.knockback_decay_speed;
        let end_threshold = self.config.knockback_tilt_end_threshold;
        let cancel_threshold = self.config.input_cancel_tilt_threshold;
        let knockback = &mut self.state.knockback;

        if knockback.force > KNOCKBACK_FORCE_EPSILON {
            let decay = if knockback.dashed_at_impact {
                decay_rate * 0.5
            } else {
                decay_rate
            };
            knockback.force = lerp(knockback.force, 0.0, lerp_factor(decay, dt));
            self.state.position += knockback.direction * knockback.force * dt;

            let rate = if has_input { base_rate * 1.5 } else { base_rate };
            knockback.current_tilt_euler = lerp_vec3(
                knockback.current_tilt_euler,
                knockback.target_tilt_euler,
                lerp_factor(rate, dt),
            );
            Self::advance_spin(knockback, dt);
        } else {
            let rate = if has_input {
                base_rate * 1.5
            } else {
                base_rate * 1.1
            };
            knockback.current_tilt_euler =
                lerp_vec3(knockback.current_tilt_euler, Vec3::ZERO, lerp_factor(rate, dt));
            Self::advance_spin(knockback, dt);

            let tilt = knockback.current_tilt_euler.length();
            if tilt <= end_threshold || (has_input && tilt <= cancel_threshold) {
                self.end_knockback(has_input);
            }
        }
    }

    fn advance_spin(knockback: &mut KnockbackState, dt: f32) {
        if knockback.spin_speed > KNOCKBACK_SPIN_EPSILON {
            knockback.spin_degrees = wrap_degrees(knockback.spin_degrees + knockback.spin_speed * dt);
            knockback.spin_speed =
                lerp(knockback.spin_speed, 0.0, lerp_factor(KNOCKBACK_SPIN_DECAY, dt));
        }
    }

    fn end_knockback(&mut self, has_input: bool) {
        let state = &mut self.state;
        state.knockback.active = false;
        state.knockback.force = 0.0;
        state.knockback.spin_speed = 0.0;
        state.knockback.spin_degrees = 0.0;
        state.knockback.current_tilt_euler = Vec3::ZERO;

        // Recovery hands control straight back: no leftover freeze.
        state.collision.is_colliding = false;
        state.collision.freeze_timer = 0.0;
        state.collision.post_idle_timer = 0.0;

        if has_input && !state.thrust_active {
            state.thrust_active = true;
            self.events.push(FlightEvent::ThrustStarted);
        }
        self.events.push(FlightEvent::KnockbackEnded {
            resume_thrust: has_input,
        });
        debug!("[flight] knockback recovered");
    }

    // ── Normal flight ─────────────────────────────────────────────────────────

    fn handle_normal_flight(&mut self, dt: f32, input: &InputSample, has_input: bool) {
        self.dash_mode
            .handle_input(&mut self.state.dash, input, &self.config, dt, &mut self.events);
        let dash_target =
            self.dash_mode
                .advance(&mut self.state.dash, &self.config, dt, &mut self.events);

        self.update_thrust(has_input);
        self.handle_movement(dt, input, has_input, dash_target);
        self.handle_banking(dt);
        self.handle_bob(dt);
    }

    fn update_thrust(&mut self, has_input: bool) {
        if has_input && !self.state.thrust_active {
            self.state.thrust_active = true;
            self.events.push(FlightEvent::ThrustStarted);
        } else if !has_input && self.state.thrust_active {
            self.state.thrust_active = false;
            self.events.push(FlightEvent::ThrustStopped);
        }
    }

    fn handle_movement(
        &mut self,
        dt: f32,
        input: &InputSample,
        has_input: bool,
        dash_target: Option<f32>,
    ) {
        let ceiling = self.speed_ceiling();
        let config = &self.config;
        let state = &mut self.state;

        if has_input {
            let direction = input.move_direction.normalize_or_zero();
            if direction != Vec2::ZERO {
                state.target_yaw_degrees = stick_yaw(direction);
            }
        }
        let yaw_error = delta_angle(state.yaw_degrees, state.target_yaw_degrees);

        let previous_speed = state.current_speed;
        match dash_target {
            Some(target) => {
                state.current_speed = lerp(
                    state.current_speed,
                    target,
                    lerp_factor(config.dash_blend_rate, dt),
                );
                state.speed_smoothing_velocity = 0.0;
                state.boosting = false;
            }
            None => {
                let target_speed = if has_input {
                    let mut target = config.max_move_speed;
                    if yaw_error.abs() > config.turn_drag_threshold {
                        target *= 1.0 - config.turn_drag;
                    }
                    if state.current_speed < config.boost_start_threshold {
                        target *= config.boost_start_multiplier;
                        if !state.boosting {
                            state.boosting = true;
                            self.events.push(FlightEvent::BoostStarted);
                        }
                    } else {
                        state.boosting = false;
                    }
                    target
                } else {
                    state.boosting = false;
                    0.0
                };
                state.current_speed = smooth_damp(
                    state.current_speed,
                    target_speed,
                    &mut state.speed_smoothing_velocity,
                    config.inertia_smooth,
                    dt,
                );
                // Outside a dash, speed may bleed off dash overspeed but never
                // climb above cruise.
                let normal_ceiling = previous_speed.max(config.max_move_speed);
                if state.current_speed > normal_ceiling {
                    state.current_speed = normal_ceiling;
                    state.speed_smoothing_velocity = 0.0;
                }
            }
        }
        state.current_speed = state.current_speed.clamp(0.0, ceiling);

        let target_angular = if yaw_error.abs() > YAW_SETTLE_EPSILON {
            config.max_angular_speed
        } else {
            0.0
        };
        state.current_angular_speed = smooth_damp(
            state.current_angular_speed,
            target_angular,
            &mut state.angular_smoothing_velocity,
            config.angular_smooth,
            dt,
        )
        .clamp(0.0, config.max_angular_speed);
        state.yaw_degrees = move_towards_angle(
            state.yaw_degrees,
            state.target_yaw_degrees,
            state.current_angular_speed * dt,
        );

        state.position += yaw_forward(state.yaw_degrees) * state.current_speed * dt;
    }

    fn handle_banking(&mut self, dt: f32) {
        let state = &mut self.state;
        let yaw_error = delta_angle(state.yaw_degrees, state.target_yaw_degrees);
        let mut bank_target =
            (yaw_error / BANK_FULL_ERROR).clamp(-1.0, 1.0) * -self.config.bank_angle;
        if state.dash.active {
            bank_target *= DASH_BANK_SCALE;
        }
        state.current_bank_degrees = lerp(
            state.current_bank_degrees,
            bank_target,
            lerp_factor(self.config.bank_lerp_speed, dt),
        );
    }

    fn handle_bob(&mut self, dt: f32) {
        let idle_factor = 1.0 - self.cruise_fraction(self.state.current_speed);
        let config = &self.config;
        let state = &mut self.state;
        let target = if state.collision.post_idle_timer > 0.0 {
            0.0
        } else {
            (state.elapsed * config.bob_frequency).sin() * config.bob_amplitude * idle_factor
        };
        state.bob_offset = lerp(state.bob_offset, target, lerp_factor(config.bob_smooth, dt));
    }
}
