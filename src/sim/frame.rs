use super::math::{Float3, Matrix4};

/// Orthonormal coordinate frame riding on the track.
///
/// Axes match the model space of the locomotive/car/sleeper meshes:
/// - `lateral`: local +X, `direction x up`
/// - `up`: local +Y, perpendicular to both the track and the rail cross vector
/// - `direction`: local +Z, forward along the track
///
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub lateral: Float3,
    pub up: Float3,
    pub direction: Float3,
}

impl Frame {
    pub const fn new(lateral: Float3, up: Float3, direction: Float3) -> Self {
        Self {
            lateral,
            up,
            direction,
        }
    }

    pub const DEFAULT: Self = Self::new(Float3::new(-1.0, 0.0, 0.0), Float3::UP, Float3::FORWARD);

    /// Builds the frame from a (not necessarily unit) track direction and the
    /// rail cross vector at the same place.
    ///
    /// Z = normalize(direction), Y = normalize(-(direction x cross)),
    /// X = normalize(Z x Y). Y is perpendicular to Z by construction even when
    /// `cross` is not perpendicular to `direction`.
    ///
    /// Returns `None` when the direction is degenerate or parallel to `cross`.
    pub fn from_direction_and_cross(direction: Float3, cross: Float3) -> Option<Self> {
        let z = direction.normalize();
        let y = (-direction.cross(cross)).normalize();
        if z == Float3::ZERO || y == Float3::ZERO {
            return None;
        }
        let x = z.cross(y).normalize();
        Some(Self::new(x, y, z))
    }

    pub fn rotation(&self) -> Matrix4 {
        Matrix4::from_basis(self.lateral, self.up, self.direction)
    }

    /// World transform `translate(position) * rotate(frame) * scale(uniform)`.
    pub fn transform(&self, position: Float3, scale: f32) -> Matrix4 {
        Matrix4::from_translation(position) * self.rotation() * Matrix4::from_uniform_scale(scale)
    }

    /// Expresses a world-space offset in this frame's local axes.
    pub fn to_local(&self, offset: Float3) -> Float3 {
        Float3::new(
            offset.dot(self.lateral),
            offset.dot(self.up),
            offset.dot(self.direction),
        )
    }

    pub fn is_orthonormal(&self, tolerance: f32) -> bool {
        (self.lateral.magnitude() - 1.0).abs() <= tolerance
            && (self.up.magnitude() - 1.0).abs() <= tolerance
            && (self.direction.magnitude() - 1.0).abs() <= tolerance
            && self.lateral.dot(self.up).abs() <= tolerance
            && self.lateral.dot(self.direction).abs() <= tolerance
            && self.up.dot(self.direction).abs() <= tolerance
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::DEFAULT
    }
}
