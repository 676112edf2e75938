//! Scalar and angular helpers shared by the flight controller.
//!
//! Angles are in degrees throughout, matching the tunables.  Yaw 0 faces +Z
//! and positive yaw turns toward +X.

use crate::constants::INPUT_PRESENCE_SQR;
use bevy::math::{Vec2, Vec3};

/// Clamped exponential-approach factor for one step of `rate × dt`.
#[inline]
pub fn lerp_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Critically-damped approach of `current` toward `target`.
///
/// `velocity` is the caller-owned smoothing state; it must be carried between
/// calls and reset to zero whenever `current` is forced to a new value.  The
/// result never overshoots `target` when starting at rest, and the explicit
/// overshoot check below pins it to `target` if a large carried velocity would.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1.0e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Crossed the target this step: pin to it.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Wrap an angle into `(-180, 180]`.
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation (degrees) taking `current` to `target`.
#[inline]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    wrap_degrees(target - current)
}

/// Rotate `current` toward `target` along the shortest path by at most
/// `max_delta` degrees.  The result is wrapped into `(-180, 180]`.
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = delta_angle(current, target);
    let max_delta = max_delta.max(0.0);
    if delta.abs() <= max_delta {
        wrap_degrees(current + delta)
    } else {
        wrap_degrees(current + delta.signum() * max_delta)
    }
}

/// World-space forward for a yaw in degrees.
#[inline]
pub fn yaw_forward(yaw_degrees: f32) -> Vec3 {
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    Vec3::new(sin, 0.0, cos)
}

/// World-space right for a yaw in degrees.
#[inline]
pub fn yaw_right(yaw_degrees: f32) -> Vec3 {
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    Vec3::new(cos, 0.0, -sin)
}

/// Heading (degrees) of a ground-plane stick direction; stick +Y maps to +Z.
#[inline]
pub fn stick_yaw(direction: Vec2) -> f32 {
    direction.x.atan2(direction.y).to_degrees()
}

/// Whether a move vector is large enough to count as input.
#[inline]
pub fn has_move_input(direction: Vec2) -> bool {
    direction.length_squared() > INPUT_PRESENCE_SQR
}

/// Combine a primary move source with a secondary one (e.g. keyboard and
/// on-screen joystick).
///
/// The secondary source is only added when it is itself above the input
/// threshold; the sum is normalised if it leaves the unit disc.
pub fn merge_move_inputs(primary: Vec2, secondary: Vec2) -> Vec2 {
    let mut combined = primary;
    if has_move_input(secondary) {
        combined += secondary;
    }
    if combined.length_squared() > 1.0 {
        combined = combined.normalize_or_zero();
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        let dt = 1.0 / 60.0;
        for _ in 0..240 {
            value = smooth_damp(value, 40.0, &mut velocity, 0.3, dt);
            assert!(value <= 40.0, "overshot: {value}");
        }
        assert_abs_diff_eq!(value, 40.0, epsilon = 0.05);
    }

    #[test]
    fn smooth_damp_reaches_95_percent_within_three_time_constants() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        let dt = 1.0 / 60.0;
        for _ in 0..54 {
            value = smooth_damp(value, 40.0, &mut velocity, 0.3, dt);
        }
        assert!(value >= 38.0, "only reached {value}");
    }

    #[test]
    fn smooth_damp_zero_dt_is_identity() {
        let mut velocity = 3.0;
        assert_eq!(smooth_damp(5.0, 40.0, &mut velocity, 0.3, 0.0), 5.0);
        assert_eq!(velocity, 3.0);
    }

    #[test]
    fn delta_angle_takes_the_short_way_round() {
        assert_abs_diff_eq!(delta_angle(170.0, -170.0), 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(delta_angle(-170.0, 170.0), -20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(delta_angle(0.0, 180.0), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn move_towards_angle_caps_the_step_and_wraps() {
        assert_abs_diff_eq!(move_towards_angle(170.0, -170.0, 5.0), 175.0, epsilon = 1e-4);
        assert_abs_diff_eq!(move_towards_angle(178.0, -170.0, 5.0), -177.0, epsilon = 1e-4);
        assert_abs_diff_eq!(move_towards_angle(10.0, 12.0, 5.0), 12.0, epsilon = 1e-4);
    }

    #[test]
    fn forward_and_right_follow_yaw() {
        let f = yaw_forward(90.0);
        assert_abs_diff_eq!(f.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.z, 0.0, epsilon = 1e-5);
        let r = yaw_right(0.0);
        assert_abs_diff_eq!(r.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(yaw_forward(33.0).dot(yaw_right(33.0)), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn stick_up_faces_positive_z() {
        assert_abs_diff_eq!(stick_yaw(Vec2::Y), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(stick_yaw(Vec2::X), 90.0, epsilon = 1e-4);
    }

    #[test]
    fn merge_ignores_tiny_secondary_and_normalises() {
        assert_eq!(merge_move_inputs(Vec2::X, Vec2::new(0.05, 0.0)), Vec2::X);
        let merged = merge_move_inputs(Vec2::X, Vec2::Y);
        assert_abs_diff_eq!(merged.length(), 1.0, epsilon = 1e-5);
    }
}
