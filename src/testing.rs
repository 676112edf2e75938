//! Deterministic replay of scripted flights.
//!
//! A replay feeds an [`InputScript`] through a fresh
//! [`ShipFlightController`] at a fixed `dt` and records every frame.  Because
//! the controller is driven purely by `(dt, input, collision)`, a script
//! always produces the same [`ReplayReport`], which
//! [`verification::verify_report`] then checks against the controller's
//! invariants and the scenario's expectations.
//!
//! Run from the binary with `SHIP_FLIGHT_TEST=<scenario>` (or `all`, or a
//! path to a `.toml` script).

pub mod scenarios;
pub mod script;
pub mod verification;

pub use scenarios::{scenario, Expectation, Scenario, SCENARIO_NAMES};
pub use script::{InputScript, ScriptSegment};
pub use verification::{print_report, verify_report, Check};

use crate::ship::{CollisionEvent, FlightEvent, InputSample, Pose, ShipFlightController, ShipState, VisualParams};

/// One simulated frame.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    /// 1-based frame number.
    pub frame: u32,
    /// Simulated time at the end of the frame.
    pub time: f32,
    pub input: InputSample,
    pub collision: Option<CollisionEvent>,
    pub pose: Pose,
    pub visuals: VisualParams,
    pub state: ShipState,
    pub events: Vec<FlightEvent>,
}

/// Everything a replay produced.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub name: String,
    pub dt: f32,
    pub frames: Vec<FrameRecord>,
}

impl ReplayReport {
    /// The last frame whose end time is at or before `time`.
    pub fn frame_at(&self, time: f32) -> Option<&FrameRecord> {
        let half_step = self.dt * 0.5;
        self.frames
            .iter()
            .take_while(|f| f.time <= time + half_step)
            .last()
    }

    /// Simulated times at which `event` was raised.
    pub fn event_times(&self, event: FlightEvent) -> Vec<f32> {
        self.frames
            .iter()
            .filter(|f| f.events.contains(&event))
            .map(|f| f.time)
            .collect()
    }

    pub fn duration(&self) -> f32 {
        self.frames.last().map_or(0.0, |f| f.time)
    }
}

/// Replay `script` through a fresh controller.
pub fn run_script(script: &InputScript) -> ReplayReport {
    let mut controller = ShipFlightController::new(script.config.clone());
    let mut frames = Vec::with_capacity(script.frame_count());
    let mut frame = 0u32;
    let mut time = 0.0f32;

    for segment in &script.segment {
        for step in 0..segment.frame_count(script.dt) {
            let input = segment.input_for_step(step);
            let collision = if step == 0 {
                segment.collide_offset.map(|offset| CollisionEvent {
                    other_position: controller.state().position + bevy::math::Vec3::from_array(offset),
                })
            } else {
                None
            };

            let (pose, visuals) = controller.tick(script.dt, input, collision);
            frame += 1;
            time += script.dt;
            frames.push(FrameRecord {
                frame,
                time,
                input,
                collision,
                pose,
                visuals,
                state: *controller.state(),
                events: controller.drain_events().collect(),
            });
        }
    }

    ReplayReport {
        name: script.name.clone(),
        dt: script.dt,
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_are_deterministic() {
        let script = scenario("random_soak").unwrap().script;
        let a = run_script(&script);
        let b = run_script(&script);
        assert_eq!(a.frames.len(), b.frames.len());
        for (fa, fb) in a.frames.iter().zip(&b.frames) {
            assert_eq!(fa.state, fb.state);
            assert_eq!(fa.events, fb.events);
        }
    }

    #[test]
    fn frame_at_finds_the_frame_ending_at_time() {
        let report = run_script(&scenario("cruise").unwrap().script);
        let frame = report.frame_at(0.5).unwrap();
        assert_eq!(frame.frame, 30);
        assert!(report.frame_at(-1.0).is_none());
    }
}
