//! One editing/driving session: the control points, the built track, the
//! train on it and the smoke it leaves behind.

use std::sync::Arc;

use crate::effects::SmokeEmitter;
use crate::rider::Train;
use crate::sim::{physics, DriveInput, DriveParams, DriveState};
use crate::track::{ControlPoint, Track, TrackConfig, TrackError, TrackSnapshot};

#[derive(Debug)]
pub struct Session {
    points: Vec<ControlPoint>,
    config: TrackConfig,
    pub drive: DriveParams,
    drive_state: DriveState,
    track: Track,
    train: Train,
    pub smoke: SmokeEmitter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Default fixed tick length.
    pub const TICK: f32 = physics::TICK_DT;

    /// Starts on the default four-point loop, already built.
    pub fn new() -> Self {
        let mut session = Self {
            points: ControlPoint::default_loop(),
            config: TrackConfig::default(),
            drive: DriveParams::default(),
            drive_state: DriveState::new(),
            track: Track::new(),
            train: Train::new(),
            smoke: SmokeEmitter::new(),
        };
        // the default loop always has enough points
        let _ = session.rebuild();
        session
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn train(&self) -> &Train {
        &self.train
    }

    pub fn train_mut(&mut self) -> &mut Train {
        &mut self.train
    }

    pub fn snapshot(&self) -> Option<Arc<TrackSnapshot>> {
        self.track.snapshot()
    }

    pub fn total_length(&self) -> f32 {
        self.track.total_length()
    }

    /// Replaces the control points and rebuilds. On failure the points are
    /// still stored but the previous geometry stays live.
    pub fn set_points(&mut self, points: Vec<ControlPoint>) -> Result<(), TrackError> {
        self.points = points;
        self.rebuild()
    }

    pub fn set_config(&mut self, config: TrackConfig) -> Result<(), TrackError> {
        self.config = config;
        self.rebuild()
    }

    /// Rebuilds the track from the stored points and configuration, rebinds
    /// the train and restages its cars.
    pub fn rebuild(&mut self) -> Result<(), TrackError> {
        let snapshot = self.track.rebuild(&self.points, &self.config)?;
        self.train.bind(snapshot);
        self.train.set_car_count(self.config.car_count);
        Ok(())
    }

    pub fn set_car_count(&mut self, count: usize) {
        self.config.car_count = count;
        self.train.set_car_count(count);
    }

    /// Runs one simulation tick: the drive heuristic picks a distance, the
    /// whole train moves by it and the smoke emitter is stepped.
    ///
    /// Returns the distance moved.
    pub fn tick(&mut self, dt: f32, direction_sign: f32) -> f32 {
        let Some(snapshot) = self.track.snapshot() else {
            return 0.0;
        };
        let locomotive = self.train.locomotive();
        let input = DriveInput::new(
            direction_sign,
            dt,
            locomotive.pose().direction.y,
            snapshot.arc_lengths.segment_length(locomotive.bucket()),
        );
        let distance = self.drive_state.distance_delta(&mut self.drive, input);
        self.train.advance(distance);

        let head = self.train.locomotive().pose().transform;
        self.smoke.tick(dt, self.drive.speed, head);
        distance
    }

    /// Manual nudge of [`physics::STEP_DISTANCE`] in `direction_sign`.
    pub fn step(&mut self, direction_sign: f32) {
        let delta = self.drive_state.step_delta(direction_sign);
        self.train.advance(delta);
    }

    /// Stops the train and clears the carried speed.
    pub fn stop(&mut self) {
        self.drive_state.stop();
        self.drive.speed = 0.0;
    }
}
