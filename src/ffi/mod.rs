//! C ABI over [`Session`].
//!
//! A host creates a session, pushes control points and configuration,
//! ticks it once per frame and copies geometry out into its own buffers.
//!
//! # Error Codes
//! - `0`: Success
//! - `-1`: Null pointer
//! - `-2`: Track not built (or rebuild refused; previous geometry kept)
//! - `-3`: Buffer too small (required size written back, resize and retry)
//! - `-4`: Unknown rider index
//! - `-5`: File could not be read, parsed or written

use std::ffi::{c_char, CStr};
use std::path::Path;

use crate::persistence;
use crate::rider::{RiderId, RiderPose};
use crate::session::Session;
use crate::sim::{Float3, Matrix4};
use crate::track::{ControlPoint, SplineKind, TrackConfig};

pub const LOOP_OK: i32 = 0;
pub const LOOP_NULL: i32 = -1;
pub const LOOP_NOT_BUILT: i32 = -2;
pub const LOOP_BUFFER_TOO_SMALL: i32 = -3;
pub const LOOP_BAD_RIDER: i32 = -4;
pub const LOOP_IO: i32 = -5;

/// Opaque handle to a session.
pub type LoopSessionHandle = *mut std::ffi::c_void;

/// Flat view of [`TrackConfig`].
///
/// `spline_kind`: 0 linear, 1 cardinal, 2 cubic B-spline.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub spline_kind: i32,
    pub tension: f32,
    pub adaptive: u8,
    pub track_width: f32,
    pub car_count: u32,
}

impl LoopConfig {
    fn apply(&self, base: TrackConfig) -> TrackConfig {
        let spline = match self.spline_kind {
            0 => SplineKind::Linear,
            2 => SplineKind::CubicBSpline,
            _ => SplineKind::Cardinal {
                tension: self.tension,
            },
        };
        TrackConfig {
            spline,
            adaptive: self.adaptive != 0,
            track_width: self.track_width,
            car_count: self.car_count as usize,
            ..base
        }
    }
}

/// Buffer sizes needed by [`loop_copy_mesh`] and friends.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopGeometryCounts {
    pub sample_count: usize,
    pub vertex_count: usize,
    pub index_count: usize,
    pub sleeper_count: usize,
    pub tree_count: usize,
}

unsafe fn session<'a>(handle: LoopSessionHandle) -> Option<&'a Session> {
    (handle as *const Session).as_ref()
}

unsafe fn session_mut<'a>(handle: LoopSessionHandle) -> Option<&'a mut Session> {
    (handle as *mut Session).as_mut()
}

unsafe fn path_arg<'a>(path: *const c_char) -> Option<&'a Path> {
    if path.is_null() {
        return None;
    }
    CStr::from_ptr(path).to_str().ok().map(Path::new)
}

fn rebuild_code<E>(result: Result<(), E>) -> i32 {
    match result {
        Ok(()) => LOOP_OK,
        Err(_) => LOOP_NOT_BUILT,
    }
}

/// Copies `items` into `out` if it fits, writing the required length either way.
unsafe fn copy_out<T: Copy>(items: &[T], out: *mut T, capacity: usize, written: *mut usize) -> i32 {
    if !written.is_null() {
        *written = items.len();
    }
    if items.len() > capacity {
        return LOOP_BUFFER_TOO_SMALL;
    }
    if !items.is_empty() {
        if out.is_null() {
            return LOOP_NULL;
        }
        std::ptr::copy_nonoverlapping(items.as_ptr(), out, items.len());
    }
    LOOP_OK
}

/// Creates a session on the default four-point loop.
///
/// The returned handle must be released with [`loop_session_free`].
#[no_mangle]
pub extern "C" fn loop_session_create() -> LoopSessionHandle {
    Box::into_raw(Box::new(Session::new())) as LoopSessionHandle
}

/// # Safety
/// - `handle` must be a handle from [`loop_session_create`], or null
#[no_mangle]
pub unsafe extern "C" fn loop_session_free(handle: LoopSessionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle as *mut Session));
    }
}

/// Replaces the control points and rebuilds.
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `points` must be valid for `count` reads
#[no_mangle]
pub unsafe extern "C" fn loop_set_points(
    handle: LoopSessionHandle,
    points: *const ControlPoint,
    count: usize,
) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    if points.is_null() && count > 0 {
        return LOOP_NULL;
    }
    let points = if count == 0 {
        Vec::new()
    } else {
        std::slice::from_raw_parts(points, count).to_vec()
    };
    rebuild_code(session.set_points(points))
}

/// # Safety
/// - `handle` must be a valid session handle
/// - `config` must point to an initialized `LoopConfig`
#[no_mangle]
pub unsafe extern "C" fn loop_set_config(
    handle: LoopSessionHandle,
    config: *const LoopConfig,
) -> i32 {
    let (Some(session), Some(config)) = (session_mut(handle), config.as_ref()) else {
        return LOOP_NULL;
    };
    let next = config.apply(*session.config());
    rebuild_code(session.set_config(next))
}

/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_rebuild(handle: LoopSessionHandle) -> i32 {
    match session_mut(handle) {
        Some(session) => rebuild_code(session.rebuild()),
        None => LOOP_NULL,
    }
}

/// Sets the speed slider and the drive switches.
///
/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_set_drive(
    handle: LoopSessionHandle,
    speed: f32,
    arc_length: u8,
    physics: u8,
) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    session.drive.speed = speed;
    session.drive.arc_length = arc_length != 0;
    session.drive.physics = physics != 0;
    LOOP_OK
}

/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_set_smoke(handle: LoopSessionHandle, enabled: u8) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    session.smoke.enabled = enabled != 0;
    LOOP_OK
}

/// Runs one tick. `distance`, if non-null, receives the distance moved.
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `distance` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn loop_tick(
    handle: LoopSessionHandle,
    dt: f32,
    direction_sign: f32,
    distance: *mut f32,
) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    if session.snapshot().is_none() {
        return LOOP_NOT_BUILT;
    }
    let moved = session.tick(dt, direction_sign);
    if !distance.is_null() {
        *distance = moved;
    }
    LOOP_OK
}

/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_step(handle: LoopSessionHandle, direction_sign: f32) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    session.step(direction_sign);
    LOOP_OK
}

/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_set_car_count(handle: LoopSessionHandle, count: u32) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    session.set_car_count(count as usize);
    LOOP_OK
}

/// Total loop length, or `0.0` for a null handle or unbuilt track.
///
/// # Safety
/// - `handle` must be a valid session handle or null
#[no_mangle]
pub unsafe extern "C" fn loop_total_length(handle: LoopSessionHandle) -> f32 {
    session(handle).map_or(0.0, Session::total_length)
}

/// Current bucket of rider `rider` (0 = locomotive, k + 1 = car k).
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `bucket` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn loop_rider_bucket(
    handle: LoopSessionHandle,
    rider: u32,
    bucket: *mut usize,
) -> i32 {
    let Some(session) = session(handle) else {
        return LOOP_NULL;
    };
    if bucket.is_null() {
        return LOOP_NULL;
    }
    match session.train().rider(RiderId(rider as usize)) {
        Some(r) => {
            *bucket = r.bucket();
            LOOP_OK
        }
        None => LOOP_BAD_RIDER,
    }
}

/// # Safety
/// - `handle` must be a valid session handle
/// - `pose` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn loop_rider_pose(
    handle: LoopSessionHandle,
    rider: u32,
    pose: *mut RiderPose,
) -> i32 {
    let Some(session) = session(handle) else {
        return LOOP_NULL;
    };
    if pose.is_null() {
        return LOOP_NULL;
    }
    match session.train().rider(RiderId(rider as usize)) {
        Some(r) => {
            *pose = *r.pose();
            LOOP_OK
        }
        None => LOOP_BAD_RIDER,
    }
}

/// Stores a rider's progress without moving it; the pose catches up on the
/// next tick or [`loop_advance_rider`].
///
/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_set_progress(
    handle: LoopSessionHandle,
    rider: u32,
    progress: f32,
) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    if session.train_mut().set_rider_progress(RiderId(rider as usize), progress) {
        LOOP_OK
    } else {
        LOOP_BAD_RIDER
    }
}

/// Snaps a rider's bucket hint to 0, keeping its progress.
///
/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_reset_bucket(handle: LoopSessionHandle, rider: u32) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    if session.train_mut().reset_rider_bucket(RiderId(rider as usize)) {
        LOOP_OK
    } else {
        LOOP_BAD_RIDER
    }
}

/// Moves a single rider by `delta`; a zero delta just refreshes its pose.
///
/// # Safety
/// - `handle` must be a valid session handle
#[no_mangle]
pub unsafe extern "C" fn loop_advance_rider(
    handle: LoopSessionHandle,
    rider: u32,
    delta: f32,
) -> i32 {
    let Some(session) = session_mut(handle) else {
        return LOOP_NULL;
    };
    let id = RiderId(rider as usize);
    let train = session.train_mut();
    if train.rider(id).is_none() {
        return LOOP_BAD_RIDER;
    }
    if !train.advance_rider(id, delta) {
        return LOOP_NOT_BUILT;
    }
    LOOP_OK
}

/// # Safety
/// - `handle` must be a valid session handle
/// - `counts` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn loop_geometry_counts(
    handle: LoopSessionHandle,
    counts: *mut LoopGeometryCounts,
) -> i32 {
    let Some(session) = session(handle) else {
        return LOOP_NULL;
    };
    if counts.is_null() {
        return LOOP_NULL;
    }
    let Some(snapshot) = session.snapshot() else {
        *counts = LoopGeometryCounts::default();
        return LOOP_NOT_BUILT;
    };
    *counts = LoopGeometryCounts {
        sample_count: snapshot.sample_count(),
        vertex_count: snapshot.mesh.vertex_count(),
        index_count: snapshot.mesh.indices.len(),
        sleeper_count: snapshot.sleepers.len(),
        tree_count: snapshot.trees.len(),
    };
    LOOP_OK
}

/// Copies the rail mesh. Positions and normals share `vertex_capacity`.
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `positions` and `normals` must be valid for `vertex_capacity` writes
/// - `indices` must be valid for `index_capacity` writes
#[no_mangle]
pub unsafe extern "C" fn loop_copy_mesh(
    handle: LoopSessionHandle,
    positions: *mut Float3,
    normals: *mut Float3,
    vertex_capacity: usize,
    indices: *mut u32,
    index_capacity: usize,
) -> i32 {
    let Some(session) = session(handle) else {
        return LOOP_NULL;
    };
    let Some(snapshot) = session.snapshot() else {
        return LOOP_NOT_BUILT;
    };
    let mesh = &snapshot.mesh;
    let null = std::ptr::null_mut();
    for code in [
        copy_out(&mesh.positions, positions, vertex_capacity, null),
        copy_out(&mesh.normals, normals, vertex_capacity, null),
        copy_out(&mesh.indices, indices, index_capacity, null),
    ] {
        if code != LOOP_OK {
            return code;
        }
    }
    LOOP_OK
}

/// Copies the sleeper transforms.
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `out` must be valid for `capacity` writes
/// - `written` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn loop_copy_sleepers(
    handle: LoopSessionHandle,
    out: *mut Matrix4,
    capacity: usize,
    written: *mut usize,
) -> i32 {
    let Some(session) = session(handle) else {
        return LOOP_NULL;
    };
    let Some(snapshot) = session.snapshot() else {
        return LOOP_NOT_BUILT;
    };
    copy_out(&snapshot.sleepers, out, capacity, written)
}

/// Copies the tree transforms. Hidden trees come back zero-scaled.
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `out` must be valid for `capacity` writes
/// - `written` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn loop_copy_trees(
    handle: LoopSessionHandle,
    out: *mut Matrix4,
    capacity: usize,
    written: *mut usize,
) -> i32 {
    let Some(session) = session(handle) else {
        return LOOP_NULL;
    };
    let Some(snapshot) = session.snapshot() else {
        return LOOP_NOT_BUILT;
    };
    let transforms: Vec<Matrix4> = snapshot.trees.iter().map(|t| t.transform).collect();
    copy_out(&transforms, out, capacity, written)
}

/// Copies the live smoke puffs as (transform, frame index) pairs.
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `transforms` and `frames` must be valid for `capacity` writes
/// - `written` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn loop_copy_smoke(
    handle: LoopSessionHandle,
    transforms: *mut Matrix4,
    frames: *mut u32,
    capacity: usize,
    written: *mut usize,
) -> i32 {
    let Some(session) = session(handle) else {
        return LOOP_NULL;
    };
    let instances = session.smoke.flipbook().instances();
    let t: Vec<Matrix4> = instances.iter().map(|i| i.transform).collect();
    let f: Vec<u32> = instances.iter().map(|i| i.frame as u32).collect();
    let code = copy_out(&t, transforms, capacity, written);
    if code != LOOP_OK {
        return code;
    }
    copy_out(&f, frames, capacity, std::ptr::null_mut())
}

/// Loads control points from a text file and rebuilds.
///
/// # Safety
/// - `handle` must be a valid session handle
/// - `path` must be a NUL-terminated UTF-8 string
#[no_mangle]
pub unsafe extern "C" fn loop_load_points(handle: LoopSessionHandle, path: *const c_char) -> i32 {
    let (Some(session), Some(path)) = (session_mut(handle), path_arg(path)) else {
        return LOOP_NULL;
    };
    match persistence::load_points(path) {
        Ok(points) => rebuild_code(session.set_points(points)),
        Err(err) => {
            log::warn!("loading {}: {err}", path.display());
            LOOP_IO
        }
    }
}

/// # Safety
/// - `handle` must be a valid session handle
/// - `path` must be a NUL-terminated UTF-8 string
#[no_mangle]
pub unsafe extern "C" fn loop_save_points(handle: LoopSessionHandle, path: *const c_char) -> i32 {
    let (Some(session), Some(path)) = (session(handle), path_arg(path)) else {
        return LOOP_NULL;
    };
    match persistence::save_points(path, session.points()) {
        Ok(()) => LOOP_OK,
        Err(err) => {
            log::warn!("saving {}: {err}", path.display());
            LOOP_IO
        }
    }
}
