//! Loading and saving control point files and track configuration.
//!
//! Control points use a small whitespace-separated text format (see
//! [`parse_points`]); [`TrackConfig`] and [`DriveParams`] are stored as JSON.

mod points;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::sim::DriveParams;
use crate::track::{ControlPoint, TrackConfig};

pub use points::{format_points, parse_points};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("file declares {expected} points but contains {found}")]
    CountMismatch { expected: usize, found: usize },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_points(path: impl AsRef<Path>) -> Result<Vec<ControlPoint>, PersistenceError> {
    let text = fs::read_to_string(path)?;
    parse_points(&text)
}

pub fn save_points(path: impl AsRef<Path>, points: &[ControlPoint]) -> Result<(), PersistenceError> {
    fs::write(path, format_points(points))?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}

/// Reads a [`TrackConfig`]; missing fields take their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<TrackConfig, PersistenceError> {
    load_json(path.as_ref())
}

pub fn save_config(path: impl AsRef<Path>, config: &TrackConfig) -> Result<(), PersistenceError> {
    save_json(path.as_ref(), config)
}

/// Reads [`DriveParams`]; missing fields take their defaults.
pub fn load_drive_params(path: impl AsRef<Path>) -> Result<DriveParams, PersistenceError> {
    load_json(path.as_ref())
}

pub fn save_drive_params(
    path: impl AsRef<Path>,
    params: &DriveParams,
) -> Result<(), PersistenceError> {
    save_json(path.as_ref(), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Float3;
    use crate::track::SplineKind;

    #[test]
    fn points_survive_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.txt");
        let points = vec![
            ControlPoint::upright(Float3::new(1.0, 2.0, 3.0)),
            ControlPoint::new(Float3::new(-4.0, 0.5, 9.0), Float3::new(0.0, 0.0, 1.0)),
            ControlPoint::upright(Float3::new(7.0, 7.0, 7.0)),
            ControlPoint::upright(Float3::new(0.0, -1.0, 0.0)),
        ];

        save_points(&path, &points).unwrap();
        assert_eq!(load_points(&path).unwrap(), points);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_points(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
    }

    #[test]
    fn config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        let config = TrackConfig {
            spline: SplineKind::CubicBSpline,
            adaptive: true,
            car_count: 2,
            ..TrackConfig::default()
        };

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        fs::write(&path, r#"{ "track_width": 8.0 }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.track_width, 8.0);
        assert_eq!(config.subdivisions, TrackConfig::default().subdivisions);
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drive.json");
        fs::write(&path, "{ speed: ").unwrap();
        assert!(matches!(
            load_drive_params(&path).unwrap_err(),
            PersistenceError::Json(_)
        ));
    }

    #[test]
    fn drive_params_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drive.json");
        let params = DriveParams::new(4.0, true, true);
        save_drive_params(&path, &params).unwrap();
        assert_eq!(load_drive_params(&path).unwrap(), params);
    }
}
