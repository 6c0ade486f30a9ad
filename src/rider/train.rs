use std::sync::Arc;

use crate::track::{InterpolateMode, TrackSnapshot};

use super::transport::Rider;

/// Arc-length gap between consecutive cars.
pub const CAR_GAP: f32 = 11.0;
/// Arc-length gap between the locomotive and the first car.
pub const CAR_OFFSET: f32 = 13.0;

/// Handle to a rider inside a [`Train`]. Index 0 is the locomotive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RiderId(pub usize);

impl RiderId {
    pub const LOCOMOTIVE: Self = Self(0);

    pub fn car(index: usize) -> Self {
        Self(index + 1)
    }
}

/// Offset of car `index` behind the locomotive.
pub fn car_offset(index: usize) -> f32 {
    -(CAR_GAP * index as f32 + CAR_OFFSET)
}

/// Locomotive plus trailing cars sharing one track snapshot.
#[derive(Debug, Clone)]
pub struct Train {
    riders: Vec<Rider>,
    mode: InterpolateMode,
}

impl Default for Train {
    fn default() -> Self {
        Self::new()
    }
}

impl Train {
    pub fn new() -> Self {
        Self {
            riders: vec![Rider::new()],
            mode: InterpolateMode::Smooth,
        }
    }

    pub fn interpolate_mode(&self) -> InterpolateMode {
        self.mode
    }

    pub fn set_interpolate_mode(&mut self, mode: InterpolateMode) {
        self.mode = mode;
    }

    pub fn locomotive(&self) -> &Rider {
        &self.riders[0]
    }

    pub fn rider(&self, id: RiderId) -> Option<&Rider> {
        self.riders.get(id.0)
    }

    pub fn riders(&self) -> &[Rider] {
        &self.riders
    }

    pub fn cars(&self) -> &[Rider] {
        &self.riders[1..]
    }

    pub fn car_count(&self) -> usize {
        self.riders.len() - 1
    }

    pub fn is_bound(&self) -> bool {
        self.locomotive().is_bound()
    }

    pub fn total_length(&self) -> f32 {
        self.locomotive().total_length()
    }

    /// Binds every rider to a freshly built snapshot and restages the cars.
    ///
    /// The interpolation mode follows the snapshot's spline kind.
    pub fn bind(&mut self, track: Arc<TrackSnapshot>) {
        self.mode = track.config.spline.interpolate_mode();
        for rider in &mut self.riders {
            rider.bind(Arc::clone(&track));
        }
        self.reset_after_rebuild();
    }

    pub fn unbind(&mut self) {
        for rider in &mut self.riders {
            rider.unbind();
        }
    }

    /// Moves every rider by the same signed distance.
    pub fn advance(&mut self, delta: f32) {
        let mode = self.mode;
        for rider in &mut self.riders {
            rider.advance(delta, mode);
        }
    }

    /// Moves a single rider; returns `false` for an unknown handle or an
    /// unbound rider.
    pub fn advance_rider(&mut self, id: RiderId, delta: f32) -> bool {
        let mode = self.mode;
        self.riders
            .get_mut(id.0)
            .is_some_and(|rider| rider.advance(delta, mode))
    }

    /// Stores `progress` on one rider without moving it; the next advance
    /// wraps and resolves it. Returns `false` for an unknown handle.
    pub fn set_rider_progress(&mut self, id: RiderId, progress: f32) -> bool {
        self.riders
            .get_mut(id.0)
            .map(|rider| rider.set_progress(progress))
            .is_some()
    }

    /// Snaps one rider's lookup hint back to bucket 0, leaving its progress
    /// alone. Returns `false` for an unknown handle.
    pub fn reset_rider_bucket(&mut self, id: RiderId) -> bool {
        self.riders
            .get_mut(id.0)
            .map(Rider::reset_bucket)
            .is_some()
    }

    /// Grows or shrinks the consist. New cars are placed behind the
    /// locomotive at their staggered offset; removal drops cars from the back.
    pub fn set_car_count(&mut self, count: usize) {
        let current = self.car_count();
        if count < current {
            self.riders.truncate(count + 1);
            return;
        }

        let mode = self.mode;
        let head = self.locomotive().progress();
        let track = self.locomotive().track().cloned();
        for index in current..count {
            let mut car = Rider::new();
            if let Some(track) = &track {
                car.bind(Arc::clone(track));
            }
            car.advance(head + car_offset(index), mode);
            self.riders.push(car);
        }
    }

    /// Resets all lookup hints after the track changed, keeps the
    /// locomotive's progress, re-staggers the cars behind it and refreshes
    /// every pose.
    pub fn reset_after_rebuild(&mut self) {
        let mode = self.mode;
        self.riders[0].reset_bucket();
        let head = self.riders[0].progress();

        for (index, car) in self.riders[1..].iter_mut().enumerate() {
            car.reset_bucket();
            car.set_progress(0.0);
            car.advance(head + car_offset(index), mode);
        }
        self.advance(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Float3;
    use crate::track::{build_snapshot, ControlPoint, SplineKind, TrackConfig};
    use approx::assert_relative_eq;

    fn loop_track() -> Arc<TrackSnapshot> {
        let points = vec![
            ControlPoint::upright(Float3::new(0.0, 0.0, 0.0)),
            ControlPoint::upright(Float3::new(50.0, 0.0, 0.0)),
            ControlPoint::upright(Float3::new(50.0, 0.0, 50.0)),
            ControlPoint::upright(Float3::new(0.0, 0.0, 50.0)),
        ];
        let config = TrackConfig::with_spline(SplineKind::Linear);
        Arc::new(build_snapshot(&points, &config).unwrap())
    }

    #[test]
    fn new_train_is_just_a_locomotive() {
        let train = Train::new();
        assert_eq!(train.car_count(), 0);
        assert!(!train.is_bound());
        assert!(train.rider(RiderId::LOCOMOTIVE).is_some());
        assert!(train.rider(RiderId::car(0)).is_none());
    }

    #[test]
    fn bind_uses_flat_mode_for_linear_track() {
        let mut train = Train::new();
        train.bind(loop_track());
        assert_eq!(train.interpolate_mode(), InterpolateMode::Flat);
        assert_relative_eq!(train.total_length(), 200.0, epsilon = 1e-3);
    }

    #[test]
    fn cars_are_staggered_behind_locomotive() {
        let mut train = Train::new();
        train.bind(loop_track());
        train.advance(100.0);
        train.set_car_count(2);

        assert_eq!(train.car_count(), 2);
        assert_relative_eq!(train.cars()[0].progress(), 87.0, epsilon = 1e-3);
        assert_relative_eq!(train.cars()[1].progress(), 76.0, epsilon = 1e-3);
    }

    #[test]
    fn shrinking_drops_cars_from_the_back() {
        let mut train = Train::new();
        train.bind(loop_track());
        train.set_car_count(3);
        let first = train.cars()[0].progress();
        train.set_car_count(1);
        assert_eq!(train.car_count(), 1);
        assert_eq!(train.cars()[0].progress(), first);
    }

    #[test]
    fn advance_rider_rejects_unknown_handle() {
        let mut train = Train::new();
        train.bind(loop_track());
        assert!(!train.advance_rider(RiderId::car(4), 1.0));
        assert!(train.advance_rider(RiderId::LOCOMOTIVE, 1.0));
    }

    #[test]
    fn set_rider_progress_only_stores_the_value() {
        let mut train = Train::new();
        train.bind(loop_track());
        train.advance(70.0);
        let before = *train.locomotive().pose();

        assert!(train.set_rider_progress(RiderId::LOCOMOTIVE, 260.0));
        assert_eq!(train.locomotive().progress(), 260.0);
        assert_eq!(train.locomotive().bucket(), 1);
        assert_eq!(*train.locomotive().pose(), before);

        assert!(train.advance_rider(RiderId::LOCOMOTIVE, 0.0));
        assert_relative_eq!(train.locomotive().progress(), 60.0, epsilon = 1e-3);
        assert_eq!(train.locomotive().bucket(), 1);
        assert!(!train.set_rider_progress(RiderId::car(0), 1.0));
    }

    #[test]
    fn reset_rider_bucket_keeps_progress() {
        let mut train = Train::new();
        train.bind(loop_track());
        train.set_car_count(1);
        train.advance(130.0);
        let car = RiderId::car(0);
        let progress = train.rider(car).unwrap().progress();
        assert_eq!(train.rider(car).unwrap().bucket(), 2);

        assert!(train.reset_rider_bucket(car));
        assert_eq!(train.rider(car).unwrap().bucket(), 0);
        assert_eq!(train.rider(car).unwrap().progress(), progress);
        assert_eq!(train.locomotive().bucket(), 2);
        assert!(!train.reset_rider_bucket(RiderId::car(3)));
    }

    #[test]
    fn rebind_restages_cars() {
        let mut train = Train::new();
        train.bind(loop_track());
        train.set_car_count(1);
        train.advance(30.0);
        train.bind(loop_track());

        let head = train.locomotive().progress();
        assert_relative_eq!(head, 30.0, epsilon = 1e-3);
        assert_relative_eq!(train.cars()[0].progress(), 17.0, epsilon = 1e-3);
    }
}
