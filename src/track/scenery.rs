//! Fixed scenery that is hidden wherever the track runs through it.

use crate::sim::{Float3, Frame, Matrix4};

use super::sampler::SampleSet;

pub const TREE_SCALE: f32 = 0.15;

/// Half width of the clearance slab, across the track.
const CLEARANCE_HALF_WIDTH: f32 = 10.0;
/// Half height of the clearance slab.
const CLEARANCE_HALF_HEIGHT: f32 = 25.0;

const TREE_POSITIONS: [Float3; 10] = [
    Float3::new(-83.0, 0.0, 37.0),
    Float3::new(-62.0, 0.0, -69.0),
    Float3::new(-27.0, 0.0, 24.0),
    Float3::new(-4.0, 0.0, 0.0),
    Float3::new(2.0, 0.0, 83.0),
    Float3::new(13.0, 0.0, -72.0),
    Float3::new(21.0, 0.0, 53.0),
    Float3::new(39.0, 0.0, 46.0),
    Float3::new(55.0, 0.0, 95.0),
    Float3::new(74.0, 0.0, 28.0),
];

/// Yaw of each tree, in degrees; converted with `to_radians` when placed.
const TREE_YAW_DEGREES: [f32; 10] = [0.0, 40.0, 35.0, 86.0, 12.0, 138.0, 264.0, 237.0, 186.0, 311.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreePlacement {
    pub position: Float3,
    /// Zero-scaled when hidden so instanced draws can keep a fixed count.
    pub transform: Matrix4,
    pub visible: bool,
}

/// True when `point` lies in the clearance slab of the segment starting at
/// sample `i`.
/// The slab frame uses world up, not the rail cross vector, and the slab
/// covers only the segment's own length along it.
fn in_clearance(samples: &SampleSet, i: usize, point: Float3) -> bool {
    let direction = samples.directions[i];
    let length = direction.magnitude();
    let z = direction.normalize();
    let x = z.cross(Float3::UP).normalize();
    if z == Float3::ZERO || x == Float3::ZERO {
        return false;
    }

    let local = Frame::new(x, Float3::UP, z).to_local(point - samples.centers[i]);
    local.x.abs() < CLEARANCE_HALF_WIDTH
        && local.y.abs() < CLEARANCE_HALF_HEIGHT
        && local.z > 0.0
        && local.z < length
}

/// Places the fixed trees against the current sample set.
pub fn place_trees(samples: &SampleSet) -> Vec<TreePlacement> {
    TREE_POSITIONS
        .iter()
        .zip(TREE_YAW_DEGREES)
        .map(|(&position, yaw)| {
            let visible = !(0..samples.len()).any(|i| in_clearance(samples, i, position));
            let scale = if visible { TREE_SCALE } else { 0.0 };
            let transform = Matrix4::from_translation(position)
                * Matrix4::from_rotation_y(yaw.to_radians())
                * Matrix4::from_uniform_scale(scale);
            TreePlacement {
                position,
                transform,
                visible,
            }
        })
        .collect()
}
