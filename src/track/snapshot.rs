use std::sync::Arc;

use log::{debug, warn};

use crate::sim::{Matrix4, EPSILON};

use super::arc_length::ArcLengthTable;
use super::basis::MIN_CONTROL_POINTS;
use super::config::TrackConfig;
use super::cross_section::{build_cross_sections, ControlPoint};
use super::mesh::{build_sleepers, build_track_mesh, TrackMesh};
use super::sampler::{reduce_adaptive, sample_track, SampleSet};
use super::scenery::{place_trees, TreePlacement};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackError {
    #[error("track needs at least {required} control points, got {found}")]
    InsufficientControlPoints { found: usize, required: usize },
    #[error("control point {index} is not finite")]
    NonFiniteControlPoint { index: usize },
    #[error("track has zero length")]
    ZeroLength,
}

/// Everything derived from one set of control points and one configuration.
///
/// Immutable once built; shared with riders through an [`Arc`].
#[derive(Debug, Clone)]
pub struct TrackSnapshot {
    pub config: TrackConfig,
    pub samples: SampleSet,
    pub arc_lengths: ArcLengthTable,
    pub mesh: TrackMesh,
    pub sleepers: Vec<Matrix4>,
    pub trees: Vec<TreePlacement>,
    /// Sample count before adaptive reduction.
    pub dense_sample_count: usize,
}

impl TrackSnapshot {
    pub fn total_length(&self) -> f32 {
        self.arc_lengths.total_length()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

fn validate(points: &[ControlPoint]) -> Result<(), TrackError> {
    if points.len() < MIN_CONTROL_POINTS {
        return Err(TrackError::InsufficientControlPoints {
            found: points.len(),
            required: MIN_CONTROL_POINTS,
        });
    }
    if let Some(index) = points
        .iter()
        .position(|p| !p.position.is_finite() || !p.orientation.is_finite())
    {
        return Err(TrackError::NonFiniteControlPoint { index });
    }
    let perimeter: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.position.distance(b.position))
        .sum();
    if perimeter < EPSILON {
        return Err(TrackError::ZeroLength);
    }
    Ok(())
}

/// Runs the whole pipeline: cross sections, sampling, optional adaptive
/// reduction, arc lengths, rail mesh, sleepers and scenery.
pub fn build_snapshot(
    points: &[ControlPoint],
    config: &TrackConfig,
) -> Result<TrackSnapshot, TrackError> {
    validate(points)?;

    let section = build_cross_sections(points, config.track_width);
    let dense = sample_track(&section, config);
    let dense_sample_count = dense.len();
    let samples = if config.adaptive {
        reduce_adaptive(&dense, config.adaptive_tolerance)
    } else {
        dense
    };

    let arc_lengths = ArcLengthTable::new(&samples.directions);
    if arc_lengths.total_length() <= 0.0 {
        return Err(TrackError::ZeroLength);
    }

    let mesh = build_track_mesh(&samples, config.rail_half_thickness);
    let sleepers = build_sleepers(
        &samples,
        &arc_lengths,
        config.sleeper_spacing,
        config.sleeper_scale,
    );
    let trees = place_trees(&samples);

    debug!(
        "built track: {} control points, {} samples ({} dense), length {:.3}, {} sleepers",
        points.len(),
        samples.len(),
        dense_sample_count,
        arc_lengths.total_length(),
        sleepers.len()
    );

    Ok(TrackSnapshot {
        config: *config,
        samples,
        arc_lengths,
        mesh,
        sleepers,
        trees,
        dense_sample_count,
    })
}

/// Owner of the current track snapshot.
///
/// A rebuild constructs a complete new snapshot and swaps it in; riders
/// holding the old one keep reading it until they are rebound.
#[derive(Debug, Default)]
pub struct Track {
    current: Option<Arc<TrackSnapshot>>,
    generation: u64,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds from `points`. On failure the previous snapshot stays in
    /// place and the error is returned for the caller to inspect.
    pub fn rebuild(
        &mut self,
        points: &[ControlPoint],
        config: &TrackConfig,
    ) -> Result<Arc<TrackSnapshot>, TrackError> {
        match build_snapshot(points, config) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.current = Some(Arc::clone(&snapshot));
                self.generation += 1;
                Ok(snapshot)
            }
            Err(err) => {
                warn!("track rebuild refused, keeping previous geometry: {err}");
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> Option<Arc<TrackSnapshot>> {
        self.current.clone()
    }

    pub fn is_built(&self) -> bool {
        self.current.is_some()
    }

    /// Number of successful rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn total_length(&self) -> f32 {
        self.current
            .as_ref()
            .map_or(0.0, |snapshot| snapshot.total_length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Float3;
    use crate::track::config::SplineKind;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<ControlPoint> {
        vec![
            ControlPoint::upright(Float3::new(0.0, 0.0, 0.0)),
            ControlPoint::upright(Float3::new(1.0, 0.0, 0.0)),
            ControlPoint::upright(Float3::new(1.0, 0.0, 1.0)),
            ControlPoint::upright(Float3::new(0.0, 0.0, 1.0)),
        ]
    }

    #[test]
    fn linear_square_has_length_four() {
        let config = TrackConfig::with_spline(SplineKind::Linear);
        let snapshot = build_snapshot(&unit_square(), &config).unwrap();
        assert_relative_eq!(snapshot.total_length(), 4.0, epsilon = 1e-5);
        assert_eq!(snapshot.sample_count(), 4);
        assert_eq!(snapshot.dense_sample_count, 4);
        assert!(snapshot.sleepers.is_empty());
        assert_eq!(snapshot.trees.len(), 10);
    }

    #[test]
    fn too_few_points_is_rejected() {
        let err = build_snapshot(&unit_square()[..3], &TrackConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TrackError::InsufficientControlPoints {
                found: 3,
                required: 4
            }
        );
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let mut points = unit_square();
        points[2].position.y = f32::NAN;
        let err = build_snapshot(&points, &TrackConfig::default()).unwrap_err();
        assert_eq!(err, TrackError::NonFiniteControlPoint { index: 2 });
    }

    #[test]
    fn coincident_points_have_zero_length() {
        let points = vec![ControlPoint::upright(Float3::new(1.0, 2.0, 3.0)); 4];
        for spline in [
            SplineKind::Linear,
            SplineKind::Cardinal { tension: 0.0 },
            SplineKind::CubicBSpline,
        ] {
            for adaptive in [false, true] {
                let config = TrackConfig {
                    adaptive,
                    ..TrackConfig::with_spline(spline)
                };
                let err = build_snapshot(&points, &config).unwrap_err();
                assert_eq!(err, TrackError::ZeroLength, "{config:?}");
            }
        }
    }

    #[test]
    fn coincident_points_keep_previous_track() {
        let mut track = Track::new();
        let config = TrackConfig::default();
        let first = track.rebuild(&unit_square(), &config).unwrap();
        let points = vec![ControlPoint::upright(Float3::new(1.0, 2.0, 3.0)); 4];
        assert_eq!(track.rebuild(&points, &config).unwrap_err(), TrackError::ZeroLength);
        assert!(Arc::ptr_eq(&first, &track.snapshot().unwrap()));
    }

    #[test]
    fn failed_rebuild_keeps_previous_snapshot() {
        let mut track = Track::new();
        assert!(!track.is_built());
        assert_eq!(track.total_length(), 0.0);

        let config = TrackConfig::with_spline(SplineKind::Linear);
        let first = track.rebuild(&unit_square(), &config).unwrap();
        assert_eq!(track.generation(), 1);

        assert!(track.rebuild(&unit_square()[..2], &config).is_err());
        assert_eq!(track.generation(), 1);
        let kept = track.snapshot().unwrap();
        assert!(Arc::ptr_eq(&first, &kept));
        assert_relative_eq!(track.total_length(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn rebuild_swaps_in_a_new_snapshot() {
        let mut track = Track::new();
        let config = TrackConfig::with_spline(SplineKind::Linear);
        let old = track.rebuild(&unit_square(), &config).unwrap();

        let bigger: Vec<ControlPoint> = unit_square()
            .into_iter()
            .map(|p| ControlPoint::upright(p.position * 2.0))
            .collect();
        track.rebuild(&bigger, &config).unwrap();

        // the old handle is still readable
        assert_relative_eq!(old.total_length(), 4.0, epsilon = 1e-5);
        assert_relative_eq!(track.total_length(), 8.0, epsilon = 1e-5);
        assert_eq!(track.generation(), 2);
    }
}
