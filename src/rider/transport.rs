use std::sync::Arc;

use log::{trace, warn};

use crate::sim::{Float3, Frame, Matrix4};
use crate::track::{InterpolateMode, ScanDirection, TrackSnapshot};

/// World placement of a rider after its last move.
///
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RiderPose {
    /// `translate(position) * rotate(frame) * scale(model_scale)`.
    pub transform: Matrix4,
    pub position: Float3,
    /// Unit forward axis of the frame.
    pub direction: Float3,
    /// Unit up axis of the frame.
    pub up: Float3,
}

/// Look-at triple for the driver's seat view.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub eye: Float3,
    pub center: Float3,
    pub up: Float3,
}

/// Spot light mounted on the front of the locomotive.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Headlight {
    pub position: Float3,
    pub direction: Float3,
}

impl RiderPose {
    pub const DEFAULT: Self = Self {
        transform: Matrix4::IDENTITY,
        position: Float3::ZERO,
        direction: Float3::FORWARD,
        up: Float3::UP,
    };

    pub fn driver_camera(&self) -> CameraPose {
        CameraPose {
            eye: self.position,
            center: self.position + self.direction,
            up: self.up,
        }
    }

    pub fn headlight(&self) -> Headlight {
        Headlight {
            position: self.position + self.direction * 2.0 + self.up * 7.0,
            direction: self.direction,
        }
    }
}

impl Default for RiderPose {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Follows the track by arc length.
///
/// An unbound rider (no snapshot) ignores moves. The bucket is remembered
/// between moves so each lookup starts where the last one ended.
#[derive(Debug, Clone, Default)]
pub struct Rider {
    track: Option<Arc<TrackSnapshot>>,
    progress: f32,
    bucket: usize,
    frame: Frame,
    pose: RiderPose,
}

impl Rider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches to `track`. Progress is kept; the bucket hint restarts at 0
    /// since the old index means nothing in the new table.
    pub fn bind(&mut self, track: Arc<TrackSnapshot>) {
        self.track = Some(track);
        self.bucket = 0;
    }

    pub fn unbind(&mut self) {
        self.track = None;
    }

    pub fn is_bound(&self) -> bool {
        self.track.is_some()
    }

    pub fn track(&self) -> Option<&Arc<TrackSnapshot>> {
        self.track.as_ref()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Overwrites progress without moving; the next [`advance`](Self::advance)
    /// wraps and resolves it.
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress;
    }

    pub fn bucket(&self) -> usize {
        self.bucket
    }

    pub fn reset_bucket(&mut self) {
        self.bucket = 0;
    }

    pub fn pose(&self) -> &RiderPose {
        &self.pose
    }

    pub fn total_length(&self) -> f32 {
        self.track.as_ref().map_or(0.0, |t| t.total_length())
    }

    /// Moves `delta` along the loop and recomputes the pose.
    ///
    /// Returns `false` (and changes nothing) when unbound or when `delta`
    /// or the stored progress is not finite.
    pub fn advance(&mut self, delta: f32, mode: InterpolateMode) -> bool {
        let Some(track) = self.track.as_ref() else {
            return false;
        };
        let table = &track.arc_lengths;
        let Some(progress) = table.wrap(self.progress + delta) else {
            return false;
        };
        let Some(bucket) = table.locate(progress, self.bucket, ScanDirection::of_delta(delta))
        else {
            return false;
        };

        if bucket.index != self.bucket {
            trace!("rider bucket {} -> {}", self.bucket, bucket.index);
        }

        let samples = &track.samples;
        let (b, next, t) = (bucket.index, samples.next_index(bucket.index), bucket.t);
        let position = samples.centers[b].lerp(samples.centers[next], t);
        let cross = samples.crosses[b].lerp(samples.crosses[next], t);
        let direction = match mode {
            InterpolateMode::Smooth => samples.directions[b].lerp(samples.directions[next], t),
            InterpolateMode::Flat => samples.directions[b],
        };

        match Frame::from_direction_and_cross(direction, cross) {
            Some(frame) => self.frame = frame,
            None => warn!("degenerate frame at bucket {b}, keeping previous orientation"),
        }

        self.progress = progress;
        self.bucket = b;
        self.pose = RiderPose {
            transform: self.frame.transform(position, track.config.model_scale),
            position,
            direction: self.frame.direction,
            up: self.frame.up,
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{build_snapshot, ControlPoint, SplineKind, TrackConfig};
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-4;

    fn square_track(size: f32) -> Arc<TrackSnapshot> {
        let points = vec![
            ControlPoint::upright(Float3::new(0.0, 0.0, 0.0)),
            ControlPoint::upright(Float3::new(size, 0.0, 0.0)),
            ControlPoint::upright(Float3::new(size, 0.0, size)),
            ControlPoint::upright(Float3::new(0.0, 0.0, size)),
        ];
        let config = TrackConfig::with_spline(SplineKind::Linear);
        Arc::new(build_snapshot(&points, &config).unwrap())
    }

    #[test]
    fn unbound_rider_ignores_moves() {
        let mut rider = Rider::new();
        assert!(!rider.advance(3.0, InterpolateMode::Flat));
        assert_eq!(rider.progress(), 0.0);
        assert_eq!(*rider.pose(), RiderPose::DEFAULT);
    }

    #[test]
    fn advance_wraps_progress() {
        let mut rider = Rider::new();
        rider.bind(square_track(1.0));
        assert!(rider.advance(5.5, InterpolateMode::Flat));
        assert_relative_eq!(rider.progress(), 1.5, epsilon = TOLERANCE);

        assert!(rider.advance(-2.0, InterpolateMode::Flat));
        assert_relative_eq!(rider.progress(), 3.5, epsilon = TOLERANCE);
        assert_eq!(rider.bucket(), 3);
    }

    #[test]
    fn position_interpolates_inside_bucket() {
        let track = square_track(1.0);
        let mut rider = Rider::new();
        rider.bind(Arc::clone(&track));
        rider.advance(0.25, InterpolateMode::Flat);

        let s = &track.samples;
        let expected = s.centers[0].lerp(s.centers[1], 0.25);
        assert_relative_eq!(rider.pose().position.distance(expected), 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(rider.pose().up.y.abs(), 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn smooth_mode_blends_direction() {
        let track = square_track(1.0);
        let mut rider = Rider::new();
        rider.bind(Arc::clone(&track));
        rider.advance(0.5, InterpolateMode::Smooth);

        let s = &track.samples;
        let expected = s.directions[0].lerp(s.directions[1], 0.5).normalize();
        let d = rider.pose().direction;
        assert_relative_eq!(d.distance(expected), 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn transform_places_model_at_position() {
        let mut rider = Rider::new();
        rider.bind(square_track(1.0));
        rider.advance(2.75, InterpolateMode::Flat);
        let pose = rider.pose();
        assert_relative_eq!(
            pose.transform.translation().distance(pose.position),
            0.0,
            epsilon = TOLERANCE
        );
    }

    #[test]
    fn reset_bucket_keeps_progress() {
        let mut rider = Rider::new();
        rider.bind(square_track(1.0));
        rider.advance(2.5, InterpolateMode::Flat);
        rider.reset_bucket();
        assert_eq!(rider.bucket(), 0);
        assert_relative_eq!(rider.progress(), 2.5, epsilon = TOLERANCE);

        rider.advance(0.0, InterpolateMode::Flat);
        assert_eq!(rider.bucket(), 2);
    }

    #[test]
    fn non_finite_delta_is_ignored() {
        let mut rider = Rider::new();
        rider.bind(square_track(1.0));
        rider.advance(1.5, InterpolateMode::Flat);
        assert!(!rider.advance(f32::NAN, InterpolateMode::Flat));
        assert_relative_eq!(rider.progress(), 1.5, epsilon = TOLERANCE);
    }

    #[test]
    fn headlight_sits_ahead_and_above() {
        let pose = RiderPose::DEFAULT;
        let light = pose.headlight();
        assert_eq!(light.position, Float3::new(0.0, 7.0, 2.0));
        assert_eq!(light.direction, Float3::FORWARD);

        let camera = pose.driver_camera();
        assert_eq!(camera.center - camera.eye, pose.direction);
    }
}
