//! Sensor value conventions
//!
//! How raw sensor replies are turned into caller-facing values.

use serde::{Deserialize, Serialize};

/// Interpretation of a proximity sensor reading
///
/// Two incompatible conventions have been used for the same sensor; the
/// choice is explicit so callers never rely on an implicit default they did not see.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProximityConvention {
    /// Distance to the detected surface; `+inf` when nothing is detected.
    #[default]
    Distance,
    /// `1 / distance`; `0` when nothing is detected, `+inf` at zero distance.
    InverseDistance,
    /// `1 - distance / max_distance` clamped to `[0, 1]`; `0` when nothing is
    /// detected within `max_distance`, `1` at zero distance.
    Normalized { max_distance: f64 },
}

impl ProximityConvention {
    /// Value reported when no surface is detected
    pub fn no_detection(self) -> f64 {
        match self {
            ProximityConvention::Distance => f64::INFINITY,
            ProximityConvention::InverseDistance | ProximityConvention::Normalized { .. } => 0.0,
        }
    }

    /// Map a measured distance (>= 0) to the caller-facing value
    pub fn from_distance(self, distance: f64) -> f64 {
        match self {
            ProximityConvention::Distance => distance,
            ProximityConvention::InverseDistance => {
                if distance > 0.0 {
                    1.0 / distance
                } else {
                    f64::INFINITY
                }
            }
            ProximityConvention::Normalized { max_distance } => {
                if distance >= max_distance {
                    0.0
                } else {
                    (1.0 - distance / max_distance).clamp(0.0, 1.0)
                }
            }
        }
    }
}

/// Color mode of a derived image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Rgb,
    Rgba,
    Luma,
    LumaAlpha,
}

/// Resampling algorithm used when resizing a derived image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    #[default]
    Nearest,
    Box,
    Bilinear,
    Bicubic,
    Hamming,
    Lanczos,
}
