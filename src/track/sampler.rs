use crate::sim::Float3;

use super::basis::{evaluate, BasisMatrix};
use super::config::TrackConfig;
use super::cross_section::CrossSection;

/// Dense, index-aligned samples of the closed track.
///
/// Sample order is travel order; the last sample connects back to the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    pub centers: Vec<Float3>,
    pub left_rails: Vec<Float3>,
    pub right_rails: Vec<Float3>,
    pub crosses: Vec<Float3>,
    /// `centers[(i + 1) % n] - centers[i]`.
    pub directions: Vec<Float3>,
}

impl SampleSet {
    /// Assembles a sample set and derives the segment directions.
    pub fn new(
        centers: Vec<Float3>,
        left_rails: Vec<Float3>,
        right_rails: Vec<Float3>,
        crosses: Vec<Float3>,
    ) -> Self {
        debug_assert_eq!(centers.len(), left_rails.len());
        debug_assert_eq!(centers.len(), right_rails.len());
        debug_assert_eq!(centers.len(), crosses.len());

        let directions = segment_directions(&centers);
        Self {
            centers,
            left_rails,
            right_rails,
            crosses,
            directions,
        }
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Index of the sample after `i`, wrapping at the end of the loop.
    pub fn next_index(&self, i: usize) -> usize {
        (i + 1) % self.len()
    }

    /// Keeps only the given sample indices, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        let pick = |v: &[Float3]| indices.iter().map(|&i| v[i]).collect::<Vec<_>>();
        Self::new(
            pick(&self.centers),
            pick(&self.left_rails),
            pick(&self.right_rails),
            pick(&self.crosses),
        )
    }
}

/// Cyclic forward differences of a closed polyline.
pub fn segment_directions(points: &[Float3]) -> Vec<Float3> {
    let n = points.len();
    (0..n).map(|i| points[(i + 1) % n] - points[i]).collect()
}

/// Samples every segment of the closed curve through `points` at
/// `t = j / subdivisions`, `j` in `0..subdivisions`.
///
/// Returns an empty vector when the curve is not computable.
pub fn sample_curve(basis: &BasisMatrix, points: &[Float3], subdivisions: usize) -> Vec<Float3> {
    let step = 1.0 / subdivisions as f32;
    let mut out = Vec::with_capacity(points.len() * subdivisions);
    for segment in 0..points.len() {
        for j in 0..subdivisions {
            match evaluate(basis, points, segment, j as f32 * step) {
                Some(p) => out.push(p),
                None => return Vec::new(),
            }
        }
    }
    out
}

/// Runs the curve evaluator over centers, both rails and the cross vectors.
pub fn sample_track(section: &CrossSection, config: &TrackConfig) -> SampleSet {
    let basis = config.spline.basis();
    let subdivisions = config.segment_subdivisions();

    SampleSet::new(
        sample_curve(&basis, &section.centers, subdivisions),
        sample_curve(&basis, &section.left_rails, subdivisions),
        sample_curve(&basis, &section.right_rails, subdivisions),
        sample_curve(&basis, &section.crosses, subdivisions),
    )
}

/// Greedy adaptive subdivision over a dense center line.
///
/// Starting at the last kept sample, walks forward accumulating traveled
/// length; the span is closed at the last sample whose traveled length still
/// exceeded the straight chord by less than `tolerance`. Returns the kept
/// indices in increasing order; index 0 and the final index are always kept.
/// A non-positive tolerance keeps every sample.
pub fn adaptive_indices(centers: &[Float3], tolerance: f32) -> Vec<usize> {
    let n = centers.len();
    if n == 0 {
        return Vec::new();
    }

    if tolerance.is_nan() || tolerance <= 0.0 {
        return (0..n).collect();
    }

    let mut kept = vec![0];
    let mut i = 1;
    while i < n {
        let anchor = centers[kept[kept.len() - 1]];
        let mut traveled = anchor.distance(centers[i]);
        let mut chord = traveled;

        while traveled - chord < tolerance {
            i += 1;
            if i >= n {
                break;
            }
            traveled += centers[i - 1].distance(centers[i]);
            chord = anchor.distance(centers[i]);
        }

        // `i` is already the first sample past the new anchor
        kept.push(i - 1);
    }
    kept
}

/// Applies [`adaptive_indices`] to the center line and filters all four
/// sample sequences by the same indices.
pub fn reduce_adaptive(samples: &SampleSet, tolerance: f32) -> SampleSet {
    let indices = adaptive_indices(&samples.centers, tolerance);
    samples.select(&indices)
}
