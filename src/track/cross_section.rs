use serde::{Deserialize, Serialize};

use crate::sim::Float3;

/// User-placed anchor of the closed track loop.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub position: Float3,
    /// Rough "up" for the track at this point; only its component
    /// perpendicular to the travel direction matters.
    pub orientation: Float3,
}

impl ControlPoint {
    pub const fn new(position: Float3, orientation: Float3) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub const fn upright(position: Float3) -> Self {
        Self::new(position, Float3::UP)
    }

    /// The four-point diamond a fresh session starts with.
    pub fn default_loop() -> Vec<Self> {
        vec![
            Self::upright(Float3::new(50.0, 5.0, 0.0)),
            Self::upright(Float3::new(0.0, 5.0, 50.0)),
            Self::upright(Float3::new(-50.0, 5.0, 0.0)),
            Self::upright(Float3::new(0.0, 5.0, -50.0)),
        ]
    }
}

/// Per-control-point rail geometry, index-aligned with the control points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossSection {
    pub centers: Vec<Float3>,
    /// `centers[i + 1] - centers[i]`, cyclic.
    pub directions: Vec<Float3>,
    /// Unit rail-separation vector.
    pub crosses: Vec<Float3>,
    pub left_rails: Vec<Float3>,
    pub right_rails: Vec<Float3>,
}

impl CrossSection {
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

/// Derives directions, cross vectors and rail offsets for a closed loop.
///
/// The cross vector at point `i` averages the normalized
/// `direction x orientation` of the segments arriving at and leaving `i`, so
/// the rails stay continuous through the corner.
pub fn build_cross_sections(points: &[ControlPoint], track_width: f32) -> CrossSection {
    let n = points.len();
    if n == 0 {
        return CrossSection::default();
    }

    let centers: Vec<Float3> = points.iter().map(|p| p.position).collect();
    let directions: Vec<Float3> = (0..n)
        .map(|i| centers[(i + 1) % n] - centers[i])
        .collect();

    let side = |i: usize| directions[i].cross(points[i].orientation).normalize();
    let crosses: Vec<Float3> = (0..n)
        .map(|i| {
            let prev = (i + n - 1) % n;
            (side(prev) + side(i)).normalize()
        })
        .collect();

    let half = 0.5 * track_width;
    let left_rails = centers
        .iter()
        .zip(&crosses)
        .map(|(&c, &x)| c - x * half)
        .collect();
    let right_rails = centers
        .iter()
        .zip(&crosses)
        .map(|(&c, &x)| c + x * half)
        .collect();

    CrossSection {
        centers,
        directions,
        crosses,
        left_rails,
        right_rails,
    }
}
