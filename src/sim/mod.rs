//! Math primitives, orientation frames and the drive heuristic.
//!
//! Everything here is plain value types; track and rider state live in
//! [`crate::track`] and [`crate::rider`].

mod frame;
mod math;
mod physics_params;

pub mod physics;

pub use frame::Frame;
pub use math::{Float3, Matrix4};
pub use physics::{DriveInput, DriveState};
pub use physics_params::DriveParams;

/// Smallest divisor used when a bucket or segment has (near) zero length.
pub const EPSILON: f32 = 1.0e-6;
