use crate::sim::{Float3, Frame, Matrix4};

use super::arc_length::{ArcLengthTable, ScanDirection};
use super::sampler::SampleSet;

/// Vertices emitted per sample pair per rail: four quads of four corners.
pub const VERTICES_PER_SEGMENT: usize = 16;

/// Indexed triangle list for both rails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMesh {
    pub positions: Vec<Float3>,
    pub normals: Vec<Float3>,
    pub indices: Vec<u32>,
}

impl TrackMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_quad(&mut self, corners: [Float3; 4], normals: [Float3; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&normals);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// `normalize(direction x cross)` at sample `i`.
fn sample_up(samples: &SampleSet, i: usize) -> Float3 {
    samples.directions[i].cross(samples.crosses[i]).normalize()
}

/// Sweeps a square tube of half size `half_thickness` along each rail.
///
/// Per rail and per cyclic sample pair the quads are emitted top, bottom,
/// left, right. Normals follow the `up`/`cross` of the sample each corner
/// sits on, so they bend with the track instead of being per-face constant.
pub fn build_track_mesh(samples: &SampleSet, half_thickness: f32) -> TrackMesh {
    let n = samples.len();
    let mut mesh = TrackMesh {
        positions: Vec::with_capacity(2 * n * VERTICES_PER_SEGMENT),
        normals: Vec::with_capacity(2 * n * VERTICES_PER_SEGMENT),
        indices: Vec::with_capacity(2 * n * 24),
    };
    if n == 0 {
        return mesh;
    }

    let h = half_thickness;
    for rail in [&samples.left_rails, &samples.right_rails] {
        for i in 0..n {
            let j = samples.next_index(i);
            let (bp, ep) = (rail[i], rail[j]);
            let (bc, ec) = (samples.crosses[i] * h, samples.crosses[j] * h);
            let (bu_dir, eu_dir) = (sample_up(samples, i), sample_up(samples, j));
            let (bu, eu) = (bu_dir * h, eu_dir * h);
            let (bn, en) = (samples.crosses[i].normalize(), samples.crosses[j].normalize());

            // top
            mesh.push_quad(
                [bp + bc + bu, bp - bc + bu, ep - ec + eu, ep + ec + eu],
                [bu_dir, bu_dir, eu_dir, eu_dir],
            );
            // bottom
            mesh.push_quad(
                [bp + bc - bu, bp - bc - bu, ep - ec - eu, ep + ec - eu],
                [-bu_dir, -bu_dir, -eu_dir, -eu_dir],
            );
            // left
            mesh.push_quad(
                [bp + bc + bu, bp + bc - bu, ep + ec - eu, ep + ec + eu],
                [bn, bn, en, en],
            );
            // right
            mesh.push_quad(
                [bp - bc + bu, bp - bc - bu, ep - ec - eu, ep - ec + eu],
                [-bn, -bn, -en, -en],
            );
        }
    }
    mesh
}

/// Places `floor(total / spacing)` sleepers evenly by arc length.
///
/// Position and cross vector are interpolated inside the bucket; the facing
/// uses the bucket's own segment direction.
pub fn build_sleepers(
    samples: &SampleSet,
    arc_lengths: &ArcLengthTable,
    spacing: f32,
    scale: f32,
) -> Vec<Matrix4> {
    let total = arc_lengths.total_length();
    if samples.is_empty() || spacing <= 0.0 || total <= 0.0 {
        return Vec::new();
    }

    let count = (total / spacing).floor() as usize;
    if count == 0 {
        return Vec::new();
    }
    let step = total / count as f32;

    let mut hint = 0;
    let mut out = Vec::with_capacity(count);
    for k in 0..count {
        let target = k as f32 * step;
        let Some(bucket) = arc_lengths.locate(target, hint, ScanDirection::Forward) else {
            break;
        };
        hint = bucket.index;

        let next = samples.next_index(bucket.index);
        let position = samples.centers[bucket.index].lerp(samples.centers[next], bucket.t);
        let cross = samples.crosses[bucket.index].lerp(samples.crosses[next], bucket.t);
        let frame = Frame::from_direction_and_cross(samples.directions[bucket.index], cross)
            .unwrap_or_default();
        out.push(frame.transform(position, scale));
    }
    out
}
