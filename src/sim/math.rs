use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Point or offset in world space (Y up).
///
/// `#[repr(C)]` so slices of it can be handed across the FFI boundary as
/// packed `x, y, z` triples.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Float3 {
    pub const ZERO: Self = Self::splat(0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Float3 { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Float3 { x: v, y: v, z: v }
    }

    fn zip(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Float3::new(f(self.x, rhs.x), f(self.y, rhs.y), f(self.z, rhs.z))
    }

    pub fn dot(self, rhs: Self) -> f32 {
        let p = self.zip(rhs, |a, b| a * b);
        p.x + p.y + p.z
    }

    pub fn magnitude(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy; anything shorter than `f32::EPSILON` collapses to
    /// [`Float3::ZERO`] so callers can test for degeneracy with `==`.
    pub fn normalize(self) -> Self {
        let len = self.magnitude();
        if len < f32::EPSILON {
            Float3::ZERO
        } else {
            self * len.recip()
        }
    }

    pub fn cross(self, rhs: Self) -> Self {
        let Float3 { x: ax, y: ay, z: az } = self;
        let Float3 { x: bx, y: by, z: bz } = rhs;
        Float3::new(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx)
    }

    pub fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }

    pub fn distance(self, to: Self) -> f32 {
        (to - self).magnitude()
    }

    pub fn is_finite(self) -> bool {
        [self.x, self.y, self.z].iter().all(|c| c.is_finite())
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

macro_rules! componentwise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Float3 {
            type Output = Float3;
            fn $method(self, rhs: Float3) -> Float3 {
                self.zip(rhs, |a, b| a $op b)
            }
        }
    };
}

componentwise!(Add, add, +);
componentwise!(Sub, sub, -);

impl AddAssign for Float3 {
    fn add_assign(&mut self, rhs: Float3) {
        *self = *self + rhs;
    }
}

impl Mul<f32> for Float3 {
    type Output = Float3;
    fn mul(self, k: f32) -> Float3 {
        Float3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Float3 {
    type Output = Float3;
    fn neg(self) -> Float3 {
        self * -1.0
    }
}

/// Affine transform handed to the renderer, column-major (`cols[c][r]`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix4 {
    pub cols: [[f32; 4]; 4],
}

impl Matrix4 {
    pub const IDENTITY: Self = Self::from_basis(Float3::RIGHT, Float3::UP, Float3::FORWARD);

    /// Rotation whose local X, Y and Z map onto the given world axes.
    pub const fn from_basis(x: Float3, y: Float3, z: Float3) -> Self {
        Matrix4 {
            cols: [
                [x.x, x.y, x.z, 0.0],
                [y.x, y.y, y.z, 0.0],
                [z.x, z.y, z.z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn from_translation(offset: Float3) -> Self {
        let mut m = Matrix4::IDENTITY;
        m.cols[3][..3].copy_from_slice(&offset.to_array());
        m
    }

    pub fn from_scale(s: Float3) -> Self {
        Matrix4::from_basis(
            Float3::new(s.x, 0.0, 0.0),
            Float3::new(0.0, s.y, 0.0),
            Float3::new(0.0, 0.0, s.z),
        )
    }

    pub fn from_uniform_scale(s: f32) -> Self {
        Matrix4::from_scale(Float3::splat(s))
    }

    /// Yaw of `radians` about world +Y; positive turns +Z toward +X.
    pub fn from_rotation_y(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Matrix4::from_basis(
            Float3::new(cos, 0.0, -sin),
            Float3::UP,
            Float3::new(sin, 0.0, cos),
        )
    }

    fn row(&self, r: usize) -> [f32; 4] {
        [self.cols[0][r], self.cols[1][r], self.cols[2][r], self.cols[3][r]]
    }

    pub fn transform_point(&self, p: Float3) -> Float3 {
        let h = [p.x, p.y, p.z, 1.0];
        let apply = |r: usize| -> f32 { self.row(r).iter().zip(h).map(|(m, v)| m * v).sum() };
        Float3::new(apply(0), apply(1), apply(2))
    }

    pub fn translation(&self) -> Float3 {
        let [x, y, z, _] = self.cols[3];
        Float3::new(x, y, z)
    }

    /// Flat column-major copy, sixteen floats.
    pub fn to_array(&self) -> [f32; 16] {
        let mut flat = [0.0; 16];
        for (chunk, col) in flat.chunks_exact_mut(4).zip(&self.cols) {
            chunk.copy_from_slice(col);
        }
        flat
    }
}

/// Composition: in `a * b`, `b` is applied to points first.
impl Mul for Matrix4 {
    type Output = Matrix4;
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut cols = [[0.0; 4]; 4];
        for (c, out) in cols.iter_mut().enumerate() {
            for (r, cell) in out.iter_mut().enumerate() {
                *cell = self.row(r).iter().zip(rhs.cols[c]).map(|(a, b)| a * b).sum();
            }
        }
        Matrix4 { cols }
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Matrix4::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_close(a: Float3, b: Float3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn normalize_three_four_five() {
        let unit = Float3::new(0.0, -3.0, 4.0).normalize();
        assert_close(unit, Float3::new(0.0, -0.6, 0.8));
        assert_relative_eq!(unit.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn tiny_vectors_normalize_to_zero() {
        assert_eq!(Float3::ZERO.normalize(), Float3::ZERO);
        assert_eq!(Float3::splat(1e-9).normalize(), Float3::ZERO);
    }

    #[test]
    fn cross_of_up_and_forward_is_right() {
        assert_close(Float3::UP.cross(Float3::FORWARD), Float3::RIGHT);
        assert_close(Float3::FORWARD.cross(Float3::UP), -Float3::RIGHT);
    }

    #[test]
    fn lerp_hits_endpoints_and_midpoint() {
        let a = Float3::new(0.0, 2.0, -4.0);
        let b = Float3::new(2.0, 4.0, 0.0);
        assert_close(a.lerp(b, 0.0), a);
        assert_close(a.lerp(b, 1.0), b);
        assert_close(a.lerp(b, 0.5), Float3::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn scale_then_yaw_then_translate() {
        let m = Matrix4::from_translation(Float3::new(10.0, 0.0, 0.0))
            * Matrix4::from_rotation_y(std::f32::consts::FRAC_PI_2)
            * Matrix4::from_uniform_scale(2.0);
        assert_close(m.transform_point(Float3::RIGHT), Float3::new(10.0, 0.0, -2.0));
        assert_close(m.translation(), Float3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn identity_leaves_products_unchanged() {
        let m = Matrix4::from_translation(Float3::new(1.0, 2.0, 3.0))
            * Matrix4::from_rotation_y(0.7);
        assert_eq!(m * Matrix4::IDENTITY, m);
        assert_eq!(Matrix4::IDENTITY * m, m);
    }

    #[test]
    fn flat_array_puts_translation_last() {
        let flat = Matrix4::from_translation(Float3::new(1.0, 2.0, 3.0)).to_array();
        assert_eq!(flat[12..], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(flat[..4], [1.0, 0.0, 0.0, 0.0]);
    }
}
