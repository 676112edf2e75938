//! Arcade ship flight controller.
//!
//! A frame-driven state machine for a ship that flies on the ground plane:
//! inertial acceleration toward the stick direction, a short dash, and a
//! collision knockback with tilt and spin, plus the visual parameters
//! (bank, bob, tilt) a renderer needs.  [`ship::FlightPlugin`] wires it into
//! a Bevy app; [`testing`] replays scripted input deterministically.

pub mod config;
pub mod constants;
pub mod error;
pub mod math;
pub mod ship;
pub mod testing;
