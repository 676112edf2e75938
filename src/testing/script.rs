//! Replay scripts: timed segments of constant input.
//!
//! ```toml
//! name = "strafe"
//! dt = 0.016666668
//!
//! [config]
//! dash_mode = "draining"
//!
//! [[segment]]
//! duration = 1.0
//! move = [0.0, 1.0]
//!
//! [[segment]]
//! duration = 2.0
//! move = [1.0, 0.0]
//! dash_pressed = true
//! collide_offset = [0.0, 0.0, 3.0]
//! ```

use crate::config::FlightConfig;
use crate::error::{FlightError, FlightResult};
use crate::ship::InputSample;
use bevy::math::Vec2;
use serde::Deserialize;

fn default_dt() -> f32 {
    1.0 / 60.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputScript {
    #[serde(default)]
    pub name: String,
    /// Fixed frame delta (seconds).
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Tunables for the replayed ship; omitted keys use defaults.
    #[serde(default)]
    pub config: FlightConfig,
    #[serde(default)]
    pub segment: Vec<ScriptSegment>,
}

/// A stretch of constant input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptSegment {
    /// Seconds; rounded to whole frames.
    pub duration: f32,
    /// Stick direction for the whole segment.
    #[serde(default, rename = "move")]
    pub move_direction: [f32; 2],
    /// Press dash on the segment's first frame.
    #[serde(default)]
    pub dash_pressed: bool,
    /// Press dash on every frame of the segment.
    #[serde(default)]
    pub dash_every_frame: bool,
    /// Hold dash for the whole segment.
    #[serde(default)]
    pub dash_held: bool,
    /// Report a collision on the first frame with an obstacle at this offset
    /// from the ship.
    #[serde(default)]
    pub collide_offset: Option<[f32; 3]>,
}

impl ScriptSegment {
    pub fn new(duration: f32, move_direction: Vec2) -> Self {
        Self {
            duration,
            move_direction: move_direction.to_array(),
            ..Default::default()
        }
    }

    pub fn idle(duration: f32) -> Self {
        Self::new(duration, Vec2::ZERO)
    }

    pub fn with_dash(mut self) -> Self {
        self.dash_pressed = true;
        self
    }

    pub fn with_dash_every_frame(mut self) -> Self {
        self.dash_every_frame = true;
        self
    }

    pub fn holding_dash(mut self) -> Self {
        self.dash_held = true;
        self
    }

    pub fn colliding_at(mut self, offset: [f32; 3]) -> Self {
        self.collide_offset = Some(offset);
        self
    }

    pub fn frame_count(&self, dt: f32) -> usize {
        (self.duration / dt).round().max(0.0) as usize
    }

    /// Input for the `step`-th frame of this segment.
    pub fn input_for_step(&self, step: usize) -> InputSample {
        let pressed = self.dash_every_frame || (self.dash_pressed && step == 0);
        InputSample {
            move_direction: Vec2::from_array(self.move_direction),
            dash_pressed: pressed,
            dash_held: self.dash_held || pressed,
        }
    }
}

impl InputScript {
    pub fn new(name: &str, config: FlightConfig, segment: Vec<ScriptSegment>) -> Self {
        Self {
            name: name.to_string(),
            dt: default_dt(),
            config,
            segment,
        }
    }

    /// Parse and validate a TOML script.
    pub fn from_toml_str(text: &str) -> FlightResult<Self> {
        let script: InputScript = toml::from_str(text).map_err(|e| FlightError::ScriptParse {
            message: e.to_string(),
        })?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> FlightResult<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(FlightError::ScriptParse {
                message: format!("dt must be positive, got {}", self.dt),
            });
        }
        if let Some(bad) = self
            .segment
            .iter()
            .position(|s| !(s.duration >= 0.0 && s.duration.is_finite()))
        {
            return Err(FlightError::ScriptParse {
                message: format!("segment {} has an invalid duration", bad),
            });
        }
        self.config.validate()
    }

    pub fn frame_count(&self) -> usize {
        self.segment.iter().map(|s| s.frame_count(self.dt)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::DashMode;

    #[test]
    fn parses_documented_example() {
        let script = InputScript::from_toml_str(
            r#"
            name = "strafe"

            [config]
            dash_mode = "draining"

            [[segment]]
            duration = 1.0
            move = [0.0, 1.0]

            [[segment]]
            duration = 2.0
            move = [1.0, 0.0]
            dash_pressed = true
            collide_offset = [0.0, 0.0, 3.0]
            "#,
        )
        .unwrap();
        assert_eq!(script.name, "strafe");
        assert_eq!(script.config.dash_mode, DashMode::Draining);
        assert_eq!(script.segment.len(), 2);
        assert_eq!(script.frame_count(), 180);
        assert_eq!(script.segment[1].collide_offset, Some([0.0, 0.0, 3.0]));
    }

    #[test]
    fn dash_press_lands_on_first_frame_only() {
        let segment = ScriptSegment::new(1.0, Vec2::Y).with_dash();
        assert!(segment.input_for_step(0).dash_pressed);
        assert!(!segment.input_for_step(1).dash_pressed);
        let spam = ScriptSegment::idle(1.0).with_dash_every_frame();
        assert!(spam.input_for_step(7).dash_pressed);
    }

    #[test]
    fn rejects_bad_dt_and_bad_toml() {
        assert!(matches!(
            InputScript::from_toml_str("dt = 0.0"),
            Err(FlightError::ScriptParse { .. })
        ));
        assert!(matches!(
            InputScript::from_toml_str("[[segment]]\nduration = \"long\""),
            Err(FlightError::ScriptParse { .. })
        ));
    }
}
