use serde::{Deserialize, Serialize};

use crate::error::QuizError;

// --- Geo types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// The real-world path(s) of a street: one or more disjoint polylines.
///
/// Invariant: every polyline has at least two points and the set is
/// non-empty. Construction enforces this, so a `Geometry` in hand is always
/// projectable. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    lines: Vec<Vec<GeoPoint>>,
}

impl Geometry {
    /// Build a geometry from raw `[lon, lat]` vertex lists (the order used
    /// by GeoJSON and the Overpass harvest output). Polylines with fewer
    /// than two points are dropped during normalization; if none survive,
    /// construction fails with `InvalidGeometry`.
    pub fn from_lon_lat(lines: Vec<Vec<[f64; 2]>>) -> Result<Self, QuizError> {
        let lines: Vec<Vec<GeoPoint>> = lines
            .into_iter()
            .filter(|line| line.len() >= 2)
            .map(|line| {
                line.into_iter()
                    .map(|[lon, lat]| GeoPoint { lat, lng: lon })
                    .collect()
            })
            .collect();

        if lines.is_empty() {
            return Err(QuizError::InvalidGeometry);
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[Vec<GeoPoint>] {
        &self.lines
    }
}

/// The nearest point on a geometry to a guess, and how far away it is.
/// Computed once per round at submission time; immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: GeoPoint,
    pub distance_m: f64,
}

// --- Scoring types ---

/// One completed round: the street that was asked and the guess error in
/// kilometers, rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub street: String,
    pub error_km: f64,
}

impl RoundResult {
    /// Convert a raw projection distance in meters to the scoring unit
    /// (kilometers, one decimal place).
    pub fn from_distance_m(street: impl Into<String>, distance_m: f64) -> Self {
        Self {
            street: street.into(),
            error_km: (distance_m / 1000.0 * 10.0).round() / 10.0,
        }
    }
}
