use serde::{Deserialize, Serialize};

use super::physics::{BRAKE_FORCE, DRAG_FACTOR, GRAVITY, TRAIN_MASS};

/// Driver controls and the constants of the speed heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveParams {
    /// Speed slider value, 0..=50.
    pub speed: f32,
    /// Move by arc length instead of by curve parameter.
    pub arc_length: bool,
    pub physics: bool,
    pub gravity: f32,
    pub mass: f32,
    pub drag: f32,
    pub brake_force: f32,
}

impl DriveParams {
    pub fn new(speed: f32, arc_length: bool, physics: bool) -> Self {
        Self {
            speed,
            arc_length,
            physics,
            ..Self::default()
        }
    }
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            speed: 2.0,
            arc_length: true,
            physics: false,
            gravity: GRAVITY,
            mass: TRAIN_MASS,
            drag: DRAG_FACTOR,
            brake_force: BRAKE_FORCE,
        }
    }
}
