//! Built-in replay scenarios.
//!
//! | Name | What it exercises |
//! |------|-------------------|
//! | `cruise` | accelerate from rest and hold cruise speed |
//! | `dash` | one-shot dash from rest |
//! | `dash_spam` | dash pressed every frame; cooldown gates re-triggers |
//! | `collision_behind` | rear contact at cruise pushes the ship forward |
//! | `collision_mid_dash` | contact during a dash cancels it |
//! | `knockback_recovery` | stick input cuts knockback recovery short |
//! | `draining_dash` | hold-to-boost dash drains and regenerates energy |
//! | `random_soak` | seeded random input and contacts, invariants only |

use super::script::{InputScript, ScriptSegment};
use crate::config::FlightConfig;
use crate::error::{FlightError, FlightResult};
use crate::ship::{DashMode, FlightEvent};
use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SCENARIO_NAMES: &[&str] = &[
    "cruise",
    "dash",
    "dash_spam",
    "collision_behind",
    "collision_mid_dash",
    "knockback_recovery",
    "draining_dash",
    "random_soak",
];

/// Seed for the `random_soak` scenario.
const SOAK_SEED: u64 = 0x5EED_F11E;
const SOAK_SEGMENTS: usize = 240;

/// A scenario-specific outcome checked on top of the general invariants.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// Speed at `at` seconds is within `tolerance` (fraction) of `speed`.
    SpeedNear { at: f32, speed: f32, tolerance: f32 },
    /// Speed at `at` seconds is strictly above `speed`.
    SpeedAbove { at: f32, speed: f32 },
    /// Forward position never decreases.
    MonotonicForward,
    /// Exactly `count` events matched `matches`.
    EventCount {
        label: &'static str,
        matches: fn(&FlightEvent) -> bool,
        count: usize,
    },
    /// Knockback force right after the first accepted collision.
    ImpactForceNear { force: f32, tolerance: f32 },
    /// Every knockback has ended by `time` seconds.
    KnockbackEndsBy { time: f32 },
    /// The ship moved along +Z while knocked back.
    PushedForward,
}

/// A named script plus what it should produce.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub script: InputScript,
    pub expectations: Vec<Expectation>,
}

fn is_dash_started(event: &FlightEvent) -> bool {
    matches!(event, FlightEvent::DashStarted)
}

fn is_dash_ended(event: &FlightEvent) -> bool {
    matches!(event, FlightEvent::DashEnded)
}

fn is_collision(event: &FlightEvent) -> bool {
    matches!(event, FlightEvent::CollisionBegan { .. })
}

fn is_dashing_collision(event: &FlightEvent) -> bool {
    matches!(event, FlightEvent::CollisionBegan { was_dashing: true, .. })
}

fn is_resumed_knockback_end(event: &FlightEvent) -> bool {
    matches!(event, FlightEvent::KnockbackEnded { resume_thrust: true })
}

/// Look up a built-in scenario by name.
pub fn scenario(name: &str) -> FlightResult<Scenario> {
    let defaults = FlightConfig::default();
    let cruise = defaults.max_move_speed;
    let force_multiplier = defaults.knockback_force_multiplier;

    let built = match name {
        "cruise" => Scenario {
            name: "cruise",
            description: "accelerate from rest and hold cruise speed",
            script: InputScript::new(name, defaults, vec![ScriptSegment::new(2.0, Vec2::Y)]),
            expectations: vec![
                Expectation::SpeedNear {
                    at: 0.9,
                    speed: cruise,
                    tolerance: 0.05,
                },
                Expectation::MonotonicForward,
            ],
        },
        "dash" => Scenario {
            name: "dash",
            description: "one-shot dash from rest",
            script: InputScript::new(
                name,
                defaults,
                vec![ScriptSegment::new(1.5, Vec2::Y).with_dash()],
            ),
            expectations: vec![
                Expectation::SpeedAbove {
                    at: 0.15,
                    speed: cruise,
                },
                Expectation::EventCount {
                    label: "DashStarted",
                    matches: is_dash_started,
                    count: 1,
                },
                Expectation::EventCount {
                    label: "DashEnded",
                    matches: is_dash_ended,
                    count: 1,
                },
            ],
        },
        "dash_spam" => Scenario {
            name: "dash_spam",
            description: "dash pressed every frame for 1.8 s",
            script: InputScript::new(
                name,
                defaults,
                vec![ScriptSegment::new(1.8, Vec2::Y).with_dash_every_frame()],
            ),
            expectations: vec![Expectation::EventCount {
                label: "DashStarted",
                matches: is_dash_started,
                count: 2,
            }],
        },
        "collision_behind" => Scenario {
            name: "collision_behind",
            description: "rear contact at cruise speed",
            script: InputScript::new(
                name,
                defaults,
                vec![
                    ScriptSegment::new(1.5, Vec2::Y),
                    ScriptSegment::idle(3.5).colliding_at([0.0, 0.0, -2.0]),
                ],
            ),
            expectations: vec![
                Expectation::EventCount {
                    label: "CollisionBegan",
                    matches: is_collision,
                    count: 1,
                },
                Expectation::ImpactForceNear {
                    force: cruise * force_multiplier,
                    tolerance: 0.05,
                },
                Expectation::PushedForward,
                Expectation::KnockbackEndsBy { time: 5.0 },
            ],
        },
        "collision_mid_dash" => Scenario {
            name: "collision_mid_dash",
            description: "contact during a dash",
            script: InputScript::new(
                name,
                defaults,
                vec![
                    ScriptSegment::new(1.0, Vec2::Y),
                    ScriptSegment::new(0.1, Vec2::Y).with_dash(),
                    ScriptSegment::new(4.0, Vec2::Y).colliding_at([0.0, 0.0, 2.0]),
                ],
            ),
            expectations: vec![
                Expectation::EventCount {
                    label: "CollisionBegan(dashing)",
                    matches: is_dashing_collision,
                    count: 1,
                },
                Expectation::EventCount {
                    label: "DashEnded",
                    matches: is_dash_ended,
                    count: 1,
                },
                Expectation::KnockbackEndsBy { time: 5.0 },
            ],
        },
        "knockback_recovery" => Scenario {
            name: "knockback_recovery",
            description: "stick input cuts knockback recovery short",
            script: InputScript::new(
                name,
                defaults,
                vec![
                    ScriptSegment::new(1.0, Vec2::Y),
                    ScriptSegment::idle(0.2).colliding_at([0.0, 0.0, 2.0]),
                    ScriptSegment::new(2.5, Vec2::X),
                ],
            ),
            expectations: vec![
                Expectation::EventCount {
                    label: "KnockbackEnded(resume)",
                    matches: is_resumed_knockback_end,
                    count: 1,
                },
                Expectation::KnockbackEndsBy { time: 3.0 },
            ],
        },
        "draining_dash" => Scenario {
            name: "draining_dash",
            description: "hold-to-boost dash, release, regenerate",
            script: InputScript::new(
                name,
                FlightConfig {
                    dash_mode: DashMode::Draining,
                    ..defaults
                },
                vec![
                    ScriptSegment::new(1.0, Vec2::Y).holding_dash(),
                    ScriptSegment::new(3.0, Vec2::Y),
                ],
            ),
            expectations: vec![
                Expectation::SpeedAbove {
                    at: 0.5,
                    speed: cruise,
                },
                Expectation::EventCount {
                    label: "DashStarted",
                    matches: is_dash_started,
                    count: 1,
                },
                Expectation::EventCount {
                    label: "DashEnded",
                    matches: is_dash_ended,
                    count: 1,
                },
            ],
        },
        "random_soak" => Scenario {
            name: "random_soak",
            description: "seeded random input and contacts",
            script: random_soak_script(SOAK_SEED),
            expectations: Vec::new(),
        },
        other => {
            return Err(FlightError::UnknownScenario {
                name: other.to_string(),
            })
        }
    };
    Ok(built)
}

/// Random stick directions, dash taps and contacts from a fixed seed.
pub fn random_soak_script(seed: u64) -> InputScript {
    let mut rng = StdRng::seed_from_u64(seed);
    let segments = (0..SOAK_SEGMENTS)
        .map(|_| {
            let duration = rng.gen_range(0.05..0.5);
            let direction = if rng.gen_bool(0.8) {
                Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
            } else {
                Vec2::ZERO
            };
            let mut segment = ScriptSegment::new(duration, direction);
            if rng.gen_bool(0.2) {
                segment = segment.with_dash();
            }
            if rng.gen_bool(0.1) {
                segment = segment.holding_dash();
            }
            if rng.gen_bool(0.08) {
                segment = segment.colliding_at([
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-3.0..3.0),
                ]);
            }
            segment
        })
        .collect();
    InputScript::new("random_soak", FlightConfig::default(), segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_builds() {
        for name in SCENARIO_NAMES {
            let built = scenario(name).unwrap();
            assert_eq!(built.name, *name);
            assert!(built.script.frame_count() > 0);
            assert!(built.script.validate().is_ok());
        }
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        assert_eq!(
            scenario("barrel_roll").unwrap_err(),
            FlightError::UnknownScenario {
                name: "barrel_roll".to_string()
            }
        );
    }

    #[test]
    fn soak_script_depends_only_on_seed() {
        let a = random_soak_script(3);
        let b = random_soak_script(3);
        let c = random_soak_script(4);
        assert_eq!(a.frame_count(), b.frame_count());
        assert_ne!(
            a.segment.iter().map(|s| s.move_direction).collect::<Vec<_>>(),
            c.segment.iter().map(|s| s.move_direction).collect::<Vec<_>>()
        );
    }
}
