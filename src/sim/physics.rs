//! Speed heuristic that turns the driver's speed setting into a per-tick
//! distance for the locomotive.
//!
//! Not a physical model: thrust is proportional to the
//! requested speed, gravity acts on the slope of the locomotive, and drag is
//! linear in the current speed.

use super::physics_params::DriveParams;

pub const GRAVITY: f32 = 0.98;
pub const TRAIN_MASS: f32 = 40.0;
pub const DRAG_FACTOR: f32 = 10.0;
pub const THRUST_FACTOR: f32 = 10.0;
pub const BRAKE_FORCE: f32 = 2.0;
/// Speed setting units per arc-length unit per tick.
pub const SPEED_DIVISOR: f32 = 30.0;
/// Distance moved by a single manual step.
pub const STEP_DISTANCE: f32 = 5.0;
pub const TICK_HZ: f32 = 30.0;
pub const TICK_DT: f32 = 1.0 / TICK_HZ;

/// Per-tick inputs observed from the track and the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveInput {
    /// +1 forward, -1 backward.
    pub direction_sign: f32,
    /// Elapsed time since the previous tick, in seconds.
    pub dt: f32,
    /// Y component of the locomotive's unit direction.
    pub slope: f32,
    /// Length of the arc-length bucket the locomotive currently occupies.
    pub segment_length: f32,
}

impl DriveInput {
    pub fn new(direction_sign: f32, dt: f32, slope: f32, segment_length: f32) -> Self {
        Self {
            direction_sign,
            dt,
            slope,
            segment_length,
        }
    }
}

/// Carries the speed of the previous tick between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveState {
    previous_speed: f32,
}

impl DriveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_speed(&self) -> f32 {
        self.previous_speed
    }

    pub fn stop(&mut self) {
        self.previous_speed = 0.0;
    }

    /// Distance the locomotive should travel this tick.
    ///
    /// In arc-length mode the result is an arc-length distance: either the
    /// target speed directly or the outcome of the force heuristic when
    /// `params.physics` is set. In parameter mode the train moves a fixed
    /// fraction of the current bucket per second and physics is switched off
    /// in `params`, so it stays off when arc-length mode comes back.
    pub fn distance_delta(&mut self, params: &mut DriveParams, input: DriveInput) -> f32 {
        if !params.arc_length {
            params.physics = false;
            return input.segment_length * params.speed * input.direction_sign * input.dt;
        }

        let target = params.speed / SPEED_DIVISOR * input.direction_sign;
        let now = if params.physics {
            let force = if params.speed == 0.0 {
                if self.previous_speed.is_sign_negative() {
                    params.brake_force
                } else {
                    -params.brake_force
                }
            } else {
                target * THRUST_FACTOR
            };
            let drag = self.previous_speed * params.drag;
            let total = force - params.gravity * params.mass * input.slope - drag;
            self.previous_speed + total / params.mass * input.dt
        } else {
            target
        };

        self.previous_speed = now;
        now
    }

    /// A single manual nudge; does not disturb the carried speed.
    pub fn step_delta(&self, direction_sign: f32) -> f32 {
        direction_sign * STEP_DISTANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    fn flat(dt: f32) -> DriveInput {
        DriveInput::new(1.0, dt, 0.0, 1.0)
    }

    #[test]
    fn tick_dt_matches_rate() {
        assert_relative_eq!(TICK_DT * TICK_HZ, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn arc_length_without_physics_uses_target_speed() {
        let mut params = DriveParams {
            speed: 6.0,
            ..DriveParams::default()
        };
        let mut state = DriveState::new();

        let forward = state.distance_delta(&mut params, flat(TICK_DT));
        assert_relative_eq!(forward, 0.2, epsilon = TOLERANCE);

        let backward = state.distance_delta(&mut params, DriveInput::new(-1.0, TICK_DT, 0.0, 1.0));
        assert_relative_eq!(backward, -0.2, epsilon = TOLERANCE);
        assert_relative_eq!(state.previous_speed(), -0.2, epsilon = TOLERANCE);
    }

    #[test]
    fn parameter_mode_scales_with_segment_length() {
        let mut params = DriveParams {
            speed: 2.0,
            arc_length: false,
            physics: true,
            ..DriveParams::default()
        };
        let mut state = DriveState::new();

        let delta = state.distance_delta(&mut params, DriveInput::new(1.0, 0.5, 0.3, 4.0));
        assert_relative_eq!(delta, 4.0, epsilon = TOLERANCE);
        assert_relative_eq!(state.previous_speed(), 0.0, epsilon = TOLERANCE);
        assert!(!params.physics);
    }

    #[test]
    fn physics_stays_off_after_leaving_parameter_mode() {
        let mut params = DriveParams {
            speed: 30.0,
            arc_length: false,
            physics: true,
            ..DriveParams::default()
        };
        let mut state = DriveState::new();
        state.distance_delta(&mut params, flat(1.0));

        params.arc_length = true;
        let delta = state.distance_delta(&mut params, flat(1.0));
        assert_relative_eq!(delta, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn physics_accelerates_from_rest_on_flat_track() {
        let mut params = DriveParams {
            speed: 30.0,
            physics: true,
            ..DriveParams::default()
        };
        let mut state = DriveState::new();

        let first = state.distance_delta(&mut params, flat(1.0));
        // force 10, no drag, no slope: a = 10 / 40
        assert_relative_eq!(first, 0.25, epsilon = TOLERANCE);

        let second = state.distance_delta(&mut params, flat(1.0));
        assert!(second > first);
    }

    #[test]
    fn physics_slows_down_uphill() {
        let mut params = DriveParams {
            speed: 30.0,
            physics: true,
            ..DriveParams::default()
        };
        let mut flat_state = DriveState::new();
        let mut hill_state = DriveState::new();

        let on_flat = flat_state.distance_delta(&mut params, flat(1.0));
        let on_hill = hill_state.distance_delta(&mut params, DriveInput::new(1.0, 1.0, 0.2, 1.0));
        assert!(on_hill < on_flat);
    }

    #[test]
    fn physics_brakes_against_motion_when_speed_is_zero() {
        let mut params = DriveParams {
            speed: 0.0,
            physics: true,
            ..DriveParams::default()
        };
        let mut state = DriveState {
            previous_speed: 1.0,
        };

        let next = state.distance_delta(&mut params, flat(0.1));
        assert!(next < 1.0);

        let mut reversing = DriveState {
            previous_speed: -1.0,
        };
        let next = reversing.distance_delta(&mut params, flat(0.1));
        assert!(next > -1.0);
    }

    #[test]
    fn step_delta_ignores_state() {
        let state = DriveState::new();
        assert_relative_eq!(state.step_delta(-1.0), -STEP_DISTANCE, epsilon = TOLERANCE);
        assert_relative_eq!(state.previous_speed(), 0.0, epsilon = TOLERANCE);
    }
}
