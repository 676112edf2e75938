//! Verdicts for a finished replay.
//!
//! [`verify_report`] runs the invariant checks every replay must satisfy,
//! followed by the scenario's own [`Expectation`]s.  [`print_report`] prints
//! the summary banner and per-check verdicts.

use super::scenarios::Expectation;
use super::{FrameRecord, ReplayReport};
use crate::config::FlightConfig;
use crate::ship::{DashMode, FlightEvent};

/// Float slack for comparisons against integrated values.
const EPS: f32 = 1.0e-3;
/// A knockback running longer than this is considered stuck (seconds).
const KNOCKBACK_TIMEOUT: f32 = 10.0;

/// One pass/fail verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }

    fn from_first_failure(
        name: &str,
        ok_detail: &str,
        failure: Option<(&FrameRecord, String)>,
    ) -> Self {
        match failure {
            None => Self::pass(name, ok_detail),
            Some((frame, why)) => Self::fail(
                name,
                format!("frame {} (t={:.3}s): {}", frame.frame, frame.time, why),
            ),
        }
    }
}

/// Invariant checks plus `expectations`, in that order.
pub fn verify_report(
    report: &ReplayReport,
    config: &FlightConfig,
    expectations: &[Expectation],
) -> Vec<Check> {
    let mut checks = vec![
        check_speed_bounds(report, config),
        check_cruise_ceiling(report, config),
        check_dash_collision_exclusive(report),
        check_finite_pose(report),
        check_knockback_terminates(report),
    ];
    if config.dash_mode == DashMode::OneShot {
        checks.push(check_dash_cooldown(report, config));
    }
    checks.extend(expectations.iter().map(|e| check_expectation(report, e)));
    checks
}

fn check_speed_bounds(report: &ReplayReport, config: &FlightConfig) -> Check {
    let ceiling = config.max_move_speed + config.dash_speed;
    let failure = report.frames.iter().find_map(|f| {
        let speed = f.state.current_speed;
        (!(0.0..=ceiling + EPS).contains(&speed))
            .then(|| (f, format!("speed {speed:.3} outside [0, {ceiling:.1}]")))
    });
    Check::from_first_failure("speed_bounds", "speed stayed within [0, max + dash]", failure)
}

/// Outside a dash, speed above cruise may only bleed off.
fn check_cruise_ceiling(report: &ReplayReport, config: &FlightConfig) -> Check {
    let failure = report.frames.windows(2).find_map(|pair| {
        let (prev, cur) = (&pair[0], &pair[1]);
        let speed = cur.state.current_speed;
        let climbing = speed > prev.state.current_speed + EPS;
        (!cur.state.dash.active && climbing && speed > config.max_move_speed + EPS).then(|| {
            (
                cur,
                format!(
                    "speed climbed to {speed:.3} above cruise {:.1} without a dash",
                    config.max_move_speed
                ),
            )
        })
    });
    Check::from_first_failure(
        "cruise_ceiling",
        "no acceleration above cruise outside a dash",
        failure,
    )
}

fn check_dash_collision_exclusive(report: &ReplayReport) -> Check {
    let failure = report.frames.iter().find_map(|f| {
        let s = &f.state;
        (s.dash.active && (s.collision.is_colliding || s.knockback.active))
            .then(|| (f, "dash active during collision".to_string()))
    });
    Check::from_first_failure(
        "dash_collision_exclusive",
        "never dashing while colliding",
        failure,
    )
}

fn check_finite_pose(report: &ReplayReport) -> Check {
    let failure = report.frames.iter().find_map(|f| {
        (!(f.pose.position.is_finite() && f.pose.yaw_degrees.is_finite()))
            .then(|| (f, format!("non-finite pose {:?}", f.pose)))
    });
    Check::from_first_failure("finite_pose", "pose stayed finite", failure)
}

fn check_knockback_terminates(report: &ReplayReport) -> Check {
    let mut started_at: Option<f32> = None;
    for frame in &report.frames {
        match (frame.state.knockback.active, started_at) {
            (true, None) => started_at = Some(frame.time),
            (true, Some(start)) if frame.time - start > KNOCKBACK_TIMEOUT => {
                return Check::fail(
                    "knockback_terminates",
                    format!(
                        "knockback from t={start:.3}s still active at t={:.3}s",
                        frame.time
                    ),
                );
            }
            (false, Some(_)) => started_at = None,
            _ => {}
        }
    }
    Check::pass("knockback_terminates", "every knockback recovered")
}

fn check_dash_cooldown(report: &ReplayReport, config: &FlightConfig) -> Check {
    let starts = report.event_times(FlightEvent::DashStarted);
    let min_gap = config.dash_cooldown - report.dt * 0.5;
    match starts.windows(2).find(|w| w[1] - w[0] < min_gap) {
        Some(w) => Check::fail(
            "dash_cooldown",
            format!(
                "dashes at t={:.3}s and t={:.3}s are closer than {:.2}s",
                w[0], w[1], config.dash_cooldown
            ),
        ),
        None => Check::pass(
            "dash_cooldown",
            format!("{} dash starts, all spaced by the cooldown", starts.len()),
        ),
    }
}

fn check_expectation(report: &ReplayReport, expectation: &Expectation) -> Check {
    match *expectation {
        Expectation::SpeedNear {
            at,
            speed,
            tolerance,
        } => {
            let name = format!("speed_near@{at:.2}s");
            match report.frame_at(at) {
                Some(f) if (f.state.current_speed - speed).abs() <= speed * tolerance => {
                    Check::pass(name, format!("{:.2} ≈ {speed:.1}", f.state.current_speed))
                }
                Some(f) => Check::fail(
                    name,
                    format!(
                        "{:.2} not within {:.0}% of {speed:.1}",
                        f.state.current_speed,
                        tolerance * 100.0
                    ),
                ),
                None => Check::fail(name, "replay too short"),
            }
        }
        Expectation::SpeedAbove { at, speed } => {
            let name = format!("speed_above@{at:.2}s");
            match report.frame_at(at) {
                Some(f) if f.state.current_speed > speed => {
                    Check::pass(name, format!("{:.2} > {speed:.1}", f.state.current_speed))
                }
                Some(f) => Check::fail(name, format!("{:.2} <= {speed:.1}", f.state.current_speed)),
                None => Check::fail(name, "replay too short"),
            }
        }
        Expectation::MonotonicForward => {
            let failure = report.frames.windows(2).find_map(|pair| {
                (pair[1].pose.position.z < pair[0].pose.position.z - EPS).then(|| {
                    (
                        &pair[1],
                        format!(
                            "z went back from {:.3} to {:.3}",
                            pair[0].pose.position.z, pair[1].pose.position.z
                        ),
                    )
                })
            });
            Check::from_first_failure("monotonic_forward", "z never decreased", failure)
        }
        Expectation::EventCount {
            label,
            matches,
            count,
        } => {
            let seen: usize = report
                .frames
                .iter()
                .map(|f| f.events.iter().filter(|e| matches(e)).count())
                .sum();
            let name = format!("event_count[{label}]");
            if seen == count {
                Check::pass(name, format!("{seen} seen"))
            } else {
                Check::fail(name, format!("expected {count}, saw {seen}"))
            }
        }
        Expectation::ImpactForceNear { force, tolerance } => {
            let impact = report
                .frames
                .iter()
                .find(|f| f.events.iter().any(|e| matches!(e, FlightEvent::CollisionBegan { .. })));
            match impact {
                Some(f) => {
                    let got = f.state.knockback.impact_force;
                    if (got - force).abs() <= force * tolerance {
                        Check::pass("impact_force", format!("{got:.2} ≈ {force:.1}"))
                    } else {
                        Check::fail(
                            "impact_force",
                            format!("{got:.2} not within {:.0}% of {force:.1}", tolerance * 100.0),
                        )
                    }
                }
                None => Check::fail("impact_force", "no collision accepted"),
            }
        }
        Expectation::KnockbackEndsBy { time } => {
            let name = format!("knockback_ends_by@{time:.1}s");
            let late = report
                .frames
                .iter()
                .find(|f| f.time > time && f.state.knockback.active);
            let still_active = report
                .frames
                .last()
                .is_some_and(|f| f.state.knockback.active);
            match late {
                Some(f) => Check::fail(name, format!("still knocked back at t={:.3}s", f.time)),
                None if still_active => Check::fail(name, "replay ended mid-knockback"),
                None => Check::pass(name, "recovered in time"),
            }
        }
        Expectation::PushedForward => {
            let mut knocked = report.frames.iter().filter(|f| f.state.knockback.active);
            match (knocked.next(), knocked.last()) {
                (Some(first), Some(last)) if last.pose.position.z > first.pose.position.z => {
                    Check::pass(
                        "pushed_forward",
                        format!(
                            "z {:.2} → {:.2}",
                            first.pose.position.z, last.pose.position.z
                        ),
                    )
                }
                (Some(_), Some(_)) => Check::fail("pushed_forward", "knockback did not move +Z"),
                _ => Check::fail("pushed_forward", "no knockback observed"),
            }
        }
    }
}

/// Print the banner and verdicts.  Returns true when every check passed.
pub fn print_report(report: &ReplayReport, checks: &[Check]) -> bool {
    let last = report.frames.last();
    println!("\n╔════════════════════════════════════════════╗");
    println!("║           REPLAY COMPLETE                  ║");
    println!("╚════════════════════════════════════════════╝");
    println!("Scenario: {}", report.name);
    println!("Frames:   {} ({:.2}s at dt={:.4})", report.frames.len(), report.duration(), report.dt);
    if let Some(f) = last {
        println!(
            "Final:    pos=({:.1}, {:.1}, {:.1}) yaw={:.1}° speed={:.2}",
            f.pose.position.x,
            f.pose.position.y,
            f.pose.position.z,
            f.pose.yaw_degrees,
            f.state.current_speed
        );
    }

    let mut all_passed = true;
    for check in checks {
        if check.passed {
            println!("✓ PASS: {} — {}", check.name, check.detail);
        } else {
            all_passed = false;
            println!("✗ FAIL: {} — {}", check.name, check.detail);
        }
    }
    all_passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_script, scenario, InputScript, ScriptSegment};
    use bevy::math::Vec2;

    #[test]
    fn every_builtin_scenario_passes() {
        for name in crate::testing::SCENARIO_NAMES {
            let built = scenario(name).unwrap();
            let report = run_script(&built.script);
            let checks = verify_report(&report, &built.script.config, &built.expectations);
            let failed: Vec<_> = checks.iter().filter(|c| !c.passed).collect();
            assert!(failed.is_empty(), "{name}: {failed:?}");
        }
    }

    #[test]
    fn wrong_expectation_is_reported() {
        let script = InputScript::new(
            "idle",
            FlightConfig::default(),
            vec![ScriptSegment::idle(0.5)],
        );
        let report = run_script(&script);
        let checks = verify_report(
            &report,
            &script.config,
            &[Expectation::SpeedAbove { at: 0.4, speed: 1.0 }],
        );
        let last = checks.last().unwrap();
        assert!(!last.passed);
        assert!(last.name.starts_with("speed_above"));
        // Invariants still hold for an idle ship.
        assert!(checks[..checks.len() - 1].iter().all(|c| c.passed));
    }

    #[test]
    fn missing_knockback_fails_push_check() {
        let script = InputScript::new(
            "no_contact",
            FlightConfig::default(),
            vec![ScriptSegment::new(0.5, Vec2::Y)],
        );
        let report = run_script(&script);
        let check = check_expectation(&report, &Expectation::PushedForward);
        assert!(!check.passed);
        assert_eq!(check.detail, "no knockback observed");
    }
}
