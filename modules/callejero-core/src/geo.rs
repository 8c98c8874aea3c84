//! Nearest-point projection of a guess onto street geometry.
//!
//! Pure functions, no I/O. Segment parameters are computed on an
//! equirectangular plane anchored at the guess latitude (longitude scaled by
//! cos φ); reported distances are great-circle.

use crate::types::{GeoPoint, Geometry, Projection};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two points, in meters.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Find the globally nearest point to `guess` on any segment of any
/// polyline, and the distance to it in meters.
///
/// Ties are broken by traversal order (polyline, then segment): a later
/// candidate replaces the incumbent only when strictly closer.
pub fn project(geometry: &Geometry, guess: GeoPoint) -> Projection {
    let cos_lat = guess.lat.to_radians().cos();

    let mut best: Option<Projection> = None;
    for line in geometry.lines() {
        for seg in line.windows(2) {
            let point = nearest_on_segment(seg[0], seg[1], guess, cos_lat);
            let distance_m = haversine_m(guess, point);
            if best.map_or(true, |b| distance_m < b.distance_m) {
                best = Some(Projection { point, distance_m });
            }
        }
    }

    // Geometry invariant: at least one polyline with at least one segment.
    best.expect("geometry has at least one segment")
}

/// Closest point to `p` on the segment `a`→`b`, interpolated in lat/lng
/// space. A zero-length segment collapses to its endpoint.
fn nearest_on_segment(a: GeoPoint, b: GeoPoint, p: GeoPoint, cos_lat: f64) -> GeoPoint {
    let ax = a.lng * cos_lat;
    let ay = a.lat;
    let bx = b.lng * cos_lat;
    let by = b.lat;
    let px = p.lng * cos_lat;
    let py = p.lat;

    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return a;
    }

    let t = (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0);
    GeoPoint {
        lat: a.lat + (b.lat - a.lat) * t,
        lng: a.lng + (b.lng - a.lng) * t,
    }
}

// ===========================================================================
// Unit tests
// ===========================================================================
