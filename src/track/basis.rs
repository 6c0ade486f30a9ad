use crate::sim::Float3;

/// Minimum number of control points a cubic blend can be evaluated over.
pub const MIN_CONTROL_POINTS: usize = 4;

/// 4x4 blending coefficients for one curve family.
///
/// `rows[k][j]` is the weight of control point `j` on the monomial
/// `t^(3-k)`, so a segment point is `sum_j P_j * (t³·rows[0][j] + t²·rows[1][j]
/// + t·rows[2][j] + rows[3][j])`.
///
/// Segment `i` is blended from control points `i..i+4` (cyclic); all three
/// families start the segment at (or near) control point `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisMatrix {
    pub rows: [[f32; 4]; 4],
}

impl BasisMatrix {
    pub const fn new(rows: [[f32; 4]; 4]) -> Self {
        Self { rows }
    }

    /// Straight line from control point 1 to control point 2.
    pub fn linear() -> Self {
        Self::new([
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, -1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ])
    }

    /// Cardinal spline with `s = (1 - tension) / 2`. Tension is clamped to [-1, 1].
    pub fn cardinal(tension: f32) -> Self {
        let s = (1.0 - tension.clamp(-1.0, 1.0)) / 2.0;
        Self::new([
            [-s, 2.0 - s, s - 2.0, s],
            [2.0 * s, s - 3.0, 3.0 - 2.0 * s, -s],
            [-s, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ])
    }

    /// Uniform cubic B-spline (approximating, C2).
    pub fn cubic_b_spline() -> Self {
        const SIXTH: f32 = 1.0 / 6.0;
        Self::new([
            [-SIXTH, 3.0 * SIXTH, -3.0 * SIXTH, SIXTH],
            [3.0 * SIXTH, -6.0 * SIXTH, 3.0 * SIXTH, 0.0],
            [-3.0 * SIXTH, 0.0, 3.0 * SIXTH, 0.0],
            [SIXTH, 4.0 * SIXTH, SIXTH, 0.0],
        ])
    }

    /// Per-control-point weights at parameter `t`.
    pub fn weights(&self, t: f32) -> [f32; 4] {
        let monomial = [t * t * t, t * t, t, 1.0];
        let mut out = [0.0; 4];
        for (j, w) in out.iter_mut().enumerate() {
            *w = (0..4).map(|k| monomial[k] * self.rows[k][j]).sum();
        }
        out
    }
}

/// Evaluates segment `segment` of the closed curve through `points` at `t`.
///
/// Returns `None` when fewer than [`MIN_CONTROL_POINTS`] points are given.
pub fn evaluate(basis: &BasisMatrix, points: &[Float3], segment: usize, t: f32) -> Option<Float3> {
    let n = points.len();
    if n < MIN_CONTROL_POINTS {
        return None;
    }

    let weights = basis.weights(t);
    let mut out = Float3::ZERO;
    for (j, w) in weights.iter().enumerate() {
        out += points[(segment + j) % n] * *w;
    }
    Some(out)
}
