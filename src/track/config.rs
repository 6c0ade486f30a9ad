use serde::{Deserialize, Serialize};

use super::basis::BasisMatrix;

/// Curve family used between control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplineKind {
    Linear,
    /// Cardinal spline; tension 0 is Catmull-Rom, 1 degenerates to straight segments.
    Cardinal { tension: f32 },
    CubicBSpline,
}

impl SplineKind {
    pub fn basis(self) -> BasisMatrix {
        match self {
            SplineKind::Linear => BasisMatrix::linear(),
            SplineKind::Cardinal { tension } => BasisMatrix::cardinal(tension),
            SplineKind::CubicBSpline => BasisMatrix::cubic_b_spline(),
        }
    }

    pub fn is_linear(self) -> bool {
        matches!(self, SplineKind::Linear)
    }

    /// Riders interpolate their facing between samples unless the curve is
    /// made of straight pieces, where per-segment facing is already exact.
    pub fn interpolate_mode(self) -> InterpolateMode {
        match self {
            SplineKind::Linear => InterpolateMode::Flat,
            SplineKind::Cardinal { tension } if tension >= 0.99 => InterpolateMode::Flat,
            _ => InterpolateMode::Smooth,
        }
    }
}

impl Default for SplineKind {
    fn default() -> Self {
        SplineKind::Cardinal { tension: 0.0 }
    }
}

/// How a rider derives its facing inside an arc-length bucket.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolateMode {
    /// Use the bucket's own segment direction.
    Flat,
    /// Blend the bucket's direction with the next one by the local fraction.
    Smooth,
}

/// Track construction settings. Any change requires a full rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub spline: SplineKind,
    pub adaptive: bool,
    /// Distance between the two rail center lines.
    pub track_width: f32,
    /// Samples per control segment for the cubic families.
    pub subdivisions: u32,
    /// Arc-minus-chord excess that ends an adaptive span. Not scale aware.
    pub adaptive_tolerance: f32,
    pub rail_half_thickness: f32,
    pub sleeper_spacing: f32,
    pub sleeper_scale: f32,
    /// Uniform scale applied to locomotive and car models.
    pub model_scale: f32,
    pub car_count: usize,
}

impl TrackConfig {
    pub fn with_spline(spline: SplineKind) -> Self {
        Self {
            spline,
            ..Self::default()
        }
    }

    /// Samples emitted per control segment.
    pub fn segment_subdivisions(&self) -> usize {
        if self.spline.is_linear() {
            1
        } else {
            self.subdivisions.max(1) as usize
        }
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            spline: SplineKind::default(),
            adaptive: false,
            track_width: 5.0,
            subdivisions: 100,
            adaptive_tolerance: 0.001,
            rail_half_thickness: 0.375,
            sleeper_spacing: 10.0,
            sleeper_scale: 0.15,
            model_scale: 0.15,
            car_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_uses_one_sample_per_segment() {
        let config = TrackConfig::with_spline(SplineKind::Linear);
        assert_eq!(config.segment_subdivisions(), 1);
    }

    #[test]
    fn cubic_families_use_configured_subdivisions() {
        let mut config = TrackConfig::with_spline(SplineKind::CubicBSpline);
        assert_eq!(config.segment_subdivisions(), 100);
        config.subdivisions = 0;
        assert_eq!(config.segment_subdivisions(), 1);
    }

    #[test]
    fn interpolate_mode_selection() {
        assert_eq!(SplineKind::Linear.interpolate_mode(), InterpolateMode::Flat);
        assert_eq!(
            SplineKind::Cardinal { tension: 1.0 }.interpolate_mode(),
            InterpolateMode::Flat
        );
        assert_eq!(
            SplineKind::Cardinal { tension: 0.5 }.interpolate_mode(),
            InterpolateMode::Smooth
        );
        assert_eq!(
            SplineKind::CubicBSpline.interpolate_mode(),
            InterpolateMode::Smooth
        );
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = TrackConfig {
            spline: SplineKind::Cardinal { tension: -0.25 },
            adaptive: true,
            car_count: 3,
            ..TrackConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"kind\":\"cardinal\""));
        let back: TrackConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
