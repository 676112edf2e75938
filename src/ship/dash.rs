//! Dash trigger policies.
//!
//! A ship runs one [`DashMode`] at a time, chosen from config at spawn and
//! switchable at runtime with
//! [`ShipFlightController::switch_dash_mode`](super::controller::ShipFlightController::switch_dash_mode).
//!
//! | Mode | Trigger | Boost envelope | Limit |
//! |------|---------|----------------|-------|
//! | `OneShot` | press edge | half-sine over `dash_duration` | `dash_cooldown` |
//! | `Draining` | hold | flat `dash_speed` | energy pool |

use super::state::{DashState, FlightEvent, InputSample};
use crate::config::FlightConfig;
use crate::constants::DASH_DURATION_EPSILON;
use bevy::prelude::*;
use serde::Deserialize;
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashMode {
    #[default]
    OneShot,
    Draining,
}

impl DashMode {
    pub fn toggled(self) -> Self {
        match self {
            DashMode::OneShot => DashMode::Draining,
            DashMode::Draining => DashMode::OneShot,
        }
    }

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            DashMode::OneShot => "one-shot",
            DashMode::Draining => "draining",
        }
    }

    /// Fresh dash state for this mode: idle, no cooldown, full energy.
    pub fn reset_state(self, config: &FlightConfig) -> DashState {
        DashState {
            energy: config.dash_energy_max,
            ..Default::default()
        }
    }

    /// Start or stop the dash from this frame's buttons.
    pub(crate) fn handle_input(
        self,
        dash: &mut DashState,
        input: &InputSample,
        config: &FlightConfig,
        dt: f32,
        events: &mut Vec<FlightEvent>,
    ) {
        match self {
            DashMode::OneShot => {
                if input.dash_pressed && !dash.active && dash.cooldown_timer <= 0.0 {
                    dash.active = true;
                    dash.fading = false;
                    dash.timer = config.dash_duration;
                    dash.cooldown_timer = config.dash_cooldown;
                    events.push(FlightEvent::DashStarted);
                    debug!("[dash] one-shot dash started");
                }
            }
            DashMode::Draining => {
                if input.dash_held && dash.energy > 0.0 {
                    if !dash.active {
                        dash.active = true;
                        events.push(FlightEvent::DashStarted);
                        debug!("[dash] draining dash started ({:.2} energy)", dash.energy);
                    }
                    dash.energy = (dash.energy - config.dash_energy_drain_rate * dt).max(0.0);
                    dash.regen_timer = config.dash_energy_regen_delay;
                } else {
                    if dash.active {
                        dash.active = false;
                        events.push(FlightEvent::DashEnded);
                        debug!("[dash] draining dash released");
                    }
                    if dash.energy < config.dash_energy_max {
                        if dash.regen_timer > 0.0 {
                            dash.regen_timer = (dash.regen_timer - dt).max(0.0);
                        } else {
                            dash.energy = (dash.energy + config.dash_energy_regen_rate * dt)
                                .min(config.dash_energy_max);
                        }
                    }
                }
            }
        }
    }

    /// Advance an active dash and return the speed it pulls toward, or `None`
    /// when no dash is running.
    pub(crate) fn advance(
        self,
        dash: &mut DashState,
        config: &FlightConfig,
        dt: f32,
        events: &mut Vec<FlightEvent>,
    ) -> Option<f32> {
        if !dash.active {
            return None;
        }
        match self {
            DashMode::OneShot => {
                dash.timer -= dt;
                let progress =
                    (1.0 - dash.timer / config.dash_duration.max(DASH_DURATION_EPSILON))
                        .clamp(0.0, 1.0);
                let envelope = (progress * PI).sin();
                let target = config.max_move_speed + envelope * config.dash_speed;

                if dash.timer <= 0.0 {
                    dash.timer = 0.0;
                    dash.active = false;
                    dash.fading = false;
                    events.push(FlightEvent::DashEnded);
                    debug!("[dash] one-shot dash finished");
                } else if dash.timer <= config.dash_vfx_stop_threshold && !dash.fading {
                    dash.fading = true;
                    events.push(FlightEvent::DashFading);
                }
                Some(target)
            }
            DashMode::Draining => Some(config.max_move_speed + config.dash_speed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn one_shot_envelope_peaks_mid_dash_and_ends() {
        let config = FlightConfig::default();
        let mode = DashMode::OneShot;
        let mut dash = mode.reset_state(&config);
        let mut events = Vec::new();

        mode.handle_input(&mut dash, &InputSample::IDLE.with_dash(), &config, DT, &mut events);
        assert!(dash.active);
        assert_eq!(dash.cooldown_timer, config.dash_cooldown);

        let mut peak: f32 = 0.0;
        let mut frames = 0;
        while let Some(target) = mode.advance(&mut dash, &config, DT, &mut events) {
            peak = peak.max(target);
            frames += 1;
            assert!(target <= config.max_move_speed + config.dash_speed + 1e-3);
        }
        assert_abs_diff_eq!(peak, config.max_move_speed + config.dash_speed, epsilon = 0.5);
        assert!((18..=19).contains(&frames), "dash lasted {frames} frames");
        assert!(!dash.active);
        assert_eq!(
            events,
            vec![
                FlightEvent::DashStarted,
                FlightEvent::DashFading,
                FlightEvent::DashEnded
            ]
        );
    }

    #[test]
    fn one_shot_ignores_press_during_cooldown() {
        let config = FlightConfig::default();
        let mode = DashMode::OneShot;
        let mut dash = mode.reset_state(&config);
        dash.cooldown_timer = 0.5;
        let mut events = Vec::new();
        mode.handle_input(&mut dash, &InputSample::IDLE.with_dash(), &config, DT, &mut events);
        assert!(!dash.active);
        assert!(events.is_empty());
    }

    #[test]
    fn draining_runs_dry_then_regenerates_after_delay() {
        let config = FlightConfig {
            dash_energy_max: 0.5,
            dash_energy_drain_rate: 1.0,
            dash_energy_regen_rate: 1.0,
            dash_energy_regen_delay: 0.5,
            ..Default::default()
        };
        let mode = DashMode::Draining;
        let mut dash = mode.reset_state(&config);
        let mut events = Vec::new();
        let held = InputSample {
            dash_held: true,
            ..InputSample::IDLE
        };

        // 0.5 energy at 1/s lasts about 30 frames.
        for _ in 0..35 {
            mode.handle_input(&mut dash, &held, &config, DT, &mut events);
        }
        assert!(!dash.active);
        assert_eq!(dash.energy, 0.0);
        assert_eq!(events.first(), Some(&FlightEvent::DashStarted));
        assert_eq!(events.last(), Some(&FlightEvent::DashEnded));

        // Nothing regenerates while inside the delay.
        let released = InputSample::IDLE;
        for _ in 0..10 {
            mode.handle_input(&mut dash, &released, &config, DT, &mut events);
        }
        assert_eq!(dash.energy, 0.0);

        for _ in 0..60 {
            mode.handle_input(&mut dash, &released, &config, DT, &mut events);
        }
        assert!(dash.energy > 0.0);
        assert!(dash.energy <= config.dash_energy_max);
    }

    #[test]
    fn draining_target_is_flat_boost() {
        let config = FlightConfig::default();
        let mut dash = DashState {
            active: true,
            energy: 1.0,
            ..Default::default()
        };
        let target = DashMode::Draining.advance(&mut dash, &config, DT, &mut Vec::new());
        assert_eq!(target, Some(config.max_move_speed + config.dash_speed));
    }

    #[test]
    fn mode_parses_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: DashMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"one_shot\"").unwrap();
        assert_eq!(parsed.mode, DashMode::OneShot);
        assert_eq!(DashMode::OneShot.toggled(), DashMode::Draining);
    }
}
