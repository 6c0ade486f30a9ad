//! Track construction: curve evaluation, cross sections, sampling, arc
//! lengths and the drawable geometry derived from them.
//!
//! The pipeline runs leaves first:
//! control points -> [`build_cross_sections`] -> [`sample_track`] ->
//! ([`reduce_adaptive`]) -> [`ArcLengthTable`] + [`build_track_mesh`] +
//! [`build_sleepers`] + [`place_trees`], all bundled into a [`TrackSnapshot`].

mod arc_length;
mod basis;
mod config;
mod cross_section;
mod mesh;
mod sampler;
mod scenery;
mod snapshot;

pub use arc_length::{ArcLengthTable, Bucket, ScanDirection};
pub use basis::{evaluate, BasisMatrix, MIN_CONTROL_POINTS};
pub use config::{InterpolateMode, SplineKind, TrackConfig};
pub use cross_section::{build_cross_sections, ControlPoint, CrossSection};
pub use mesh::{build_sleepers, build_track_mesh, TrackMesh, VERTICES_PER_SEGMENT};
pub use sampler::{
    adaptive_indices, reduce_adaptive, sample_curve, sample_track, segment_directions, SampleSet,
};
pub use scenery::{place_trees, TreePlacement, TREE_SCALE};
pub use snapshot::{build_snapshot, Track, TrackError, TrackSnapshot};
