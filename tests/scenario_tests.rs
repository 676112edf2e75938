//! Replay harness tests through the public API.
//!
//! Covered scenarios:
//! 1. Every built-in scenario passes its invariant and expectation checks.
//! 2. A TOML script runs end to end and reports its events.
//! 3. Slider settings change what a replay produces.

use ship_flight::config::{parse_slider_settings, FlightConfig};
use ship_flight::ship::FlightEvent;
use ship_flight::testing::{
    run_script, scenario, verify_report, InputScript, ScriptSegment, SCENARIO_NAMES,
};

/// All built-ins pass; a failure names the check that broke.
#[test]
fn builtin_scenarios_pass() {
    for name in SCENARIO_NAMES {
        let built = scenario(name).expect("listed scenario exists");
        let report = run_script(&built.script);
        assert_eq!(report.frames.len(), built.script.frame_count());

        let checks = verify_report(&report, &built.script.config, &built.expectations);
        for check in &checks {
            assert!(check.passed, "{name}/{}: {}", check.name, check.detail);
        }
    }
}

/// A script file with a mid-flight contact knocks the ship back once.
#[test]
fn toml_script_replays_contact() {
    let script = InputScript::from_toml_str(
        r#"
        name = "bump"

        [[segment]]
        duration = 1.0
        move = [0.0, 1.0]

        [[segment]]
        duration = 3.0
        collide_offset = [0.0, 0.0, 1.5]
        "#,
    )
    .unwrap();

    let report = run_script(&script);
    assert_eq!(report.name, "bump");
    assert_eq!(report.frames.len(), 240);

    let hits: Vec<_> = report
        .frames
        .iter()
        .filter(|f| {
            f.events
                .iter()
                .any(|e| matches!(e, FlightEvent::CollisionBegan { .. }))
        })
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].frame, 61);
    assert!(hits[0].state.knockback.active);

    // Contact ahead: pushed back along -Z.
    let last = report.frames.last().unwrap();
    assert!(!last.state.knockback.active);
    assert!(last.pose.position.z < hits[0].pose.position.z);

    let checks = verify_report(&report, &script.config, &[]);
    assert!(checks.iter().all(|c| c.passed), "{checks:?}");
}

/// Raising MaxSpeed via the settings screen raises the cruise speed reached.
#[test]
fn slider_settings_change_cruise_speed() {
    let settings = parse_slider_settings(
        r#"
        [[slider]]
        id = "MaxSpeed"
        current_value = 60.0
        "#,
    )
    .unwrap();
    let mut config = FlightConfig::default();
    assert!(config.apply_slider_settings(&settings).is_empty());

    let script = InputScript::new(
        "fast_cruise",
        config,
        vec![ScriptSegment::new(2.0, bevy::math::Vec2::Y)],
    );
    let report = run_script(&script);
    let speed = report.frames.last().unwrap().state.current_speed;
    assert!((speed - 60.0).abs() < 1.0, "cruise speed {speed}");
}
