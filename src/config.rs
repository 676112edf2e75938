//! Runtime flight configuration loaded from `assets/flight.toml`.
//!
//! [`FlightConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_flight_config`] reads
//! `assets/flight.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the tunables you care about.
//!
//! Player-facing sliders (the settings screen) are applied on top from
//! `assets/settings.toml` via [`FlightConfig::apply_slider_settings`].
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/flight.toml`.
//! 2. Restart, or mutate the resource at runtime: live ships pick up the
//!    change on the next frame.
//! 3. Run the replay scenarios to validate the new values.

use crate::constants::*;
use crate::error::{
    validate_non_negative, validate_positive, validate_unit_interval, FlightError, FlightResult,
};
use crate::ship::dash::DashMode;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable flight configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    // ── Movement ──────────────────────────────────────────────────────────────
    pub max_move_speed: f32,
    pub inertia_smooth: f32,
    pub turn_drag: f32,
    pub turn_drag_threshold: f32,

    // ── Boost Start ───────────────────────────────────────────────────────────
    pub boost_start_threshold: f32,
    pub boost_start_multiplier: f32,

    // ── Rotation ──────────────────────────────────────────────────────────────
    pub max_angular_speed: f32,
    pub angular_smooth: f32,
    pub bank_angle: f32,
    pub bank_lerp_speed: f32,

    // ── Dash ──────────────────────────────────────────────────────────────────
    pub dash_mode: DashMode,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub dash_vfx_stop_threshold: f32,
    pub dash_blend_rate: f32,
    pub dash_energy_max: f32,
    pub dash_energy_drain_rate: f32,
    pub dash_energy_regen_rate: f32,
    pub dash_energy_regen_delay: f32,

    // ── Collision / Knockback ─────────────────────────────────────────────────
    /// Pitch, yaw, roll (degrees).
    pub max_knockback_tilt: [f32; 3],
    pub collision_freeze_time: f32,
    pub collision_cooldown: f32,
    pub post_collision_idle_delay: f32,
    pub knockback_tilt_lerp_speed: f32,
    pub knockback_force_multiplier: f32,
    pub knockback_max_force: f32,
    pub knockback_decay_speed: f32,
    pub knockback_tilt_end_threshold: f32,
    pub input_cancel_tilt_threshold: f32,

    // ── Idle Bobbing ──────────────────────────────────────────────────────────
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    pub bob_smooth: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            // Movement
            max_move_speed: MAX_MOVE_SPEED,
            inertia_smooth: INERTIA_SMOOTH,
            turn_drag: TURN_DRAG,
            turn_drag_threshold: TURN_DRAG_THRESHOLD,
            // Boost Start
            boost_start_threshold: BOOST_START_THRESHOLD,
            boost_start_multiplier: BOOST_START_MULTIPLIER,
            // Rotation
            max_angular_speed: MAX_ANGULAR_SPEED,
            angular_smooth: ANGULAR_SMOOTH,
            bank_angle: BANK_ANGLE,
            bank_lerp_speed: BANK_LERP_SPEED,
            // Dash
            dash_mode: DashMode::OneShot,
            dash_speed: DASH_SPEED,
            dash_duration: DASH_DURATION,
            dash_cooldown: DASH_COOLDOWN,
            dash_vfx_stop_threshold: DASH_VFX_STOP_THRESHOLD,
            dash_blend_rate: DASH_BLEND_RATE,
            dash_energy_max: DASH_ENERGY_MAX,
            dash_energy_drain_rate: DASH_ENERGY_DRAIN_RATE,
            dash_energy_regen_rate: DASH_ENERGY_REGEN_RATE,
            dash_energy_regen_delay: DASH_ENERGY_REGEN_DELAY,
            // Collision / Knockback
            max_knockback_tilt: MAX_KNOCKBACK_TILT.to_array(),
            collision_freeze_time: COLLISION_FREEZE_TIME,
            collision_cooldown: COLLISION_COOLDOWN,
            post_collision_idle_delay: POST_COLLISION_IDLE_DELAY,
            knockback_tilt_lerp_speed: KNOCKBACK_TILT_LERP_SPEED,
            knockback_force_multiplier: KNOCKBACK_FORCE_MULTIPLIER,
            knockback_max_force: KNOCKBACK_MAX_FORCE,
            knockback_decay_speed: KNOCKBACK_DECAY_SPEED,
            knockback_tilt_end_threshold: KNOCKBACK_TILT_END_THRESHOLD,
            input_cancel_tilt_threshold: INPUT_CANCEL_TILT_THRESHOLD,
            // Idle Bobbing
            bob_amplitude: BOB_AMPLITUDE,
            bob_frequency: BOB_FREQUENCY,
            bob_smooth: BOB_SMOOTH,
        }
    }
}

impl FlightConfig {
    /// Parse and validate a TOML document.  Keys not present keep their
    /// defaults.
    pub fn from_toml_str(text: &str) -> FlightResult<Self> {
        let config: FlightConfig = toml::from_str(text).map_err(|e| FlightError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Per-axis maximum knockback tilt as a vector.
    #[inline]
    pub fn max_knockback_tilt(&self) -> Vec3 {
        Vec3::from_array(self.max_knockback_tilt)
    }

    /// Reject values the controller cannot integrate sensibly.
    pub fn validate(&self) -> FlightResult<()> {
        validate_positive("max_move_speed", self.max_move_speed)?;
        validate_positive("inertia_smooth", self.inertia_smooth)?;
        validate_unit_interval("turn_drag", self.turn_drag)?;
        validate_non_negative("turn_drag_threshold", self.turn_drag_threshold)?;
        validate_non_negative("boost_start_threshold", self.boost_start_threshold)?;
        validate_positive("boost_start_multiplier", self.boost_start_multiplier)?;
        validate_positive("max_angular_speed", self.max_angular_speed)?;
        validate_positive("angular_smooth", self.angular_smooth)?;
        validate_non_negative("bank_angle", self.bank_angle)?;
        validate_non_negative("bank_lerp_speed", self.bank_lerp_speed)?;
        validate_non_negative("dash_speed", self.dash_speed)?;
        validate_positive("dash_duration", self.dash_duration)?;
        validate_non_negative("dash_cooldown", self.dash_cooldown)?;
        validate_non_negative("dash_vfx_stop_threshold", self.dash_vfx_stop_threshold)?;
        validate_positive("dash_blend_rate", self.dash_blend_rate)?;
        validate_positive("dash_energy_max", self.dash_energy_max)?;
        validate_non_negative("dash_energy_drain_rate", self.dash_energy_drain_rate)?;
        validate_non_negative("dash_energy_regen_rate", self.dash_energy_regen_rate)?;
        validate_non_negative("dash_energy_regen_delay", self.dash_energy_regen_delay)?;
        for (name, axis) in [
            ("max_knockback_tilt.x", self.max_knockback_tilt[0]),
            ("max_knockback_tilt.y", self.max_knockback_tilt[1]),
            ("max_knockback_tilt.z", self.max_knockback_tilt[2]),
        ] {
            validate_non_negative(name, axis)?;
        }
        validate_non_negative("collision_freeze_time", self.collision_freeze_time)?;
        validate_non_negative("collision_cooldown", self.collision_cooldown)?;
        validate_non_negative("post_collision_idle_delay", self.post_collision_idle_delay)?;
        validate_positive("knockback_tilt_lerp_speed", self.knockback_tilt_lerp_speed)?;
        validate_non_negative("knockback_force_multiplier", self.knockback_force_multiplier)?;
        validate_non_negative("knockback_max_force", self.knockback_max_force)?;
        validate_positive("knockback_decay_speed", self.knockback_decay_speed)?;
        validate_non_negative(
            "knockback_tilt_end_threshold",
            self.knockback_tilt_end_threshold,
        )?;
        validate_non_negative(
            "input_cancel_tilt_threshold",
            self.input_cancel_tilt_threshold,
        )?;
        validate_non_negative("bob_amplitude", self.bob_amplitude)?;
        validate_non_negative("bob_frequency", self.bob_frequency)?;
        validate_non_negative("bob_smooth", self.bob_smooth)?;
        Ok(())
    }

    /// Apply values from the settings screen.
    ///
    /// Returns the IDs that were not recognised.  A recognised setting that is
    /// absent from `settings` leaves the current value alone.
    pub fn apply_slider_settings(&mut self, settings: &[SliderSetting]) -> Vec<String> {
        let mut ignored = Vec::new();
        for setting in settings {
            let value = setting.current_value;
            match setting.id.as_str() {
                "MaxSpeed" => self.max_move_speed = value,
                // The slider exposes a follow strength; 2.0 ↔ 0.3 s smoothing.
                "InertiaStrength" => {
                    if value > 0.0 {
                        self.inertia_smooth = INERTIA_STRENGTH_SCALE / value;
                    } else {
                        warn!("[config] InertiaStrength must be positive, got {value}; ignored");
                        ignored.push(setting.id.clone());
                    }
                }
                "BoostStartThreshold" => self.boost_start_threshold = value,
                "BoostStartMultiplier" => self.boost_start_multiplier = value,
                "MaxManuverSpeed" => self.max_angular_speed = value,
                "DashSpeed" => self.dash_speed = value,
                "DashDuration" => self.dash_duration = value,
                other => {
                    warn!("[config] Unknown slider setting '{other}'; ignored");
                    ignored.push(setting.id.clone());
                }
            }
        }
        ignored
    }
}

/// Converts a settings-screen inertia strength into a smoothing time.
const INERTIA_STRENGTH_SCALE: f32 = 0.6;

/// One slider on the settings screen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SliderSetting {
    pub id: String,
    pub current_value: f32,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    slider: Vec<SliderSetting>,
}

/// Parse a settings document of `[[slider]]` tables.
pub fn parse_slider_settings(text: &str) -> FlightResult<Vec<SliderSetting>> {
    let file: SettingsFile = toml::from_str(text).map_err(|e| FlightError::ConfigParse {
        path: "<settings>".to_string(),
        message: e.to_string(),
    })?;
    Ok(file.slider)
}

/// Startup system: attempt to load `assets/flight.toml` (and then
/// `assets/settings.toml`) and overwrite the `FlightConfig` resource.
///
/// Missing keys retain their compiled defaults.  Parse or validation errors
/// are logged and leave the defaults in place.  A missing file is not an error.
pub fn load_flight_config(mut config: ResMut<FlightConfig>) {
    let path = "assets/flight.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match FlightConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("✓ Loaded flight config from {path}");
            }
            Err(e) => {
                warn!("⚠ {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("ℹ No {path} found; using compiled defaults");
        }
    }

    let settings_path = "assets/settings.toml";
    if let Ok(contents) = std::fs::read_to_string(settings_path) {
        match parse_slider_settings(&contents) {
            Ok(settings) => {
                let mut updated = config.clone();
                let ignored = updated.apply_slider_settings(&settings);
                match updated.validate() {
                    Ok(()) => {
                        *config = updated;
                        info!(
                            "✓ Applied {} slider settings from {settings_path} ({} ignored)",
                            settings.len() - ignored.len(),
                            ignored.len()
                        );
                    }
                    Err(e) => warn!("⚠ {settings_path}: {e}; settings not applied"),
                }
            }
            Err(e) => warn!("⚠ {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn defaults_are_valid() {
        assert!(FlightConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = FlightConfig::from_toml_str(
            "max_move_speed = 55.0\ndash_mode = \"draining\"\nmax_knockback_tilt = [10.0, 5.0, 5.0]\n",
        )
        .unwrap();
        assert_eq!(config.max_move_speed, 55.0);
        assert_eq!(config.dash_mode, DashMode::Draining);
        assert_eq!(config.max_knockback_tilt(), Vec3::new(10.0, 5.0, 5.0));
        assert_eq!(config.dash_speed, DASH_SPEED);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = FlightConfig::from_toml_str("dash_duration = 0.0").unwrap_err();
        assert!(matches!(
            err,
            FlightError::UnsafeConstant {
                name: "dash_duration",
                ..
            }
        ));
        assert!(matches!(
            FlightConfig::from_toml_str("max_move_speed = \"fast\""),
            Err(FlightError::ConfigParse { .. })
        ));
    }

    #[test]
    fn slider_settings_map_onto_tunables() {
        let settings = parse_slider_settings(
            r#"
            [[slider]]
            id = "MaxSpeed"
            current_value = 50.0

            [[slider]]
            id = "InertiaStrength"
            current_value = 2.0

            [[slider]]
            id = "MaxManuverSpeed"
            current_value = 250.0

            [[slider]]
            id = "Brightness"
            current_value = 0.4
            "#,
        )
        .unwrap();

        let mut config = FlightConfig::default();
        let ignored = config.apply_slider_settings(&settings);
        assert_eq!(config.max_move_speed, 50.0);
        assert_abs_diff_eq!(config.inertia_smooth, 0.3, epsilon = 1e-6);
        assert_eq!(config.max_angular_speed, 250.0);
        assert_eq!(ignored, vec!["Brightness".to_string()]);
        // Not mentioned → untouched.
        assert_eq!(config.dash_duration, DASH_DURATION);
    }
}
