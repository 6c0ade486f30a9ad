//! Loopline - closed-loop train track engine.
//!
//! # Architecture
//!
//! Layered modules, each depending only on the ones above it:
//!
//! - **sim**: Math primitives (Float3, Matrix4, Frame) and the drive heuristic
//! - **track**: Spline evaluation, sampling, arc lengths, rail mesh, snapshots
//! - **rider**: Arc-length riders and the train consist
//! - **effects**: Smoke flipbook
//! - **persistence**: Control point files and JSON configuration
//! - **session**: Points, track, train and smoke tied together
//! - **ffi**: C FFI bindings (feature `ffi`)
//!
//! # Usage
//!
//! ```ignore
//! use loopline::{Session, track::ControlPoint};
//!
//! let mut session = Session::new();
//! session.set_points(ControlPoint::default_loop())?;
//! let moved = session.tick(Session::TICK, 1.0);
//! ```
//!
//! For C/C#/Unity, build with `--features ffi`, link the cdylib and use the
//! `loop_*` functions.

pub mod effects;
pub mod persistence;
pub mod rider;
pub mod session;
pub mod sim;
pub mod track;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use rider::{Rider, RiderPose, Train};
pub use session::Session;
pub use sim::{DriveParams, Float3, Frame, Matrix4};
pub use track::{ControlPoint, SplineKind, Track, TrackConfig, TrackError, TrackSnapshot};
