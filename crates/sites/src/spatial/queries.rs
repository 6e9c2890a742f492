//! Great-circle distance and bearing on a spherical Earth.
//!
//! Uses the Haversine formula with a 6371 km radius. Non-finite inputs yield NaN,
//! which callers treat as "distance unknown".

use geo::{HaversineBearing, Point};

/// Mean Earth radius used for every distance in the app.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates in meters.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if !(lat1.is_finite() && lon1.is_finite() && lat2.is_finite() && lon2.is_finite()) {
        return f64::NAN;
    }

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Haversine distance between two points (x = longitude, y = latitude) in meters.
pub fn distance_between(p1: Point, p2: Point) -> f64 {
    distance_meters(p1.y(), p1.x(), p2.y(), p2.x())
}

/// Initial great-circle bearing from `from` to `to`, in degrees clockwise from north
/// within `[0, 360)`.
pub fn bearing_degrees(from: Point, to: Point) -> f64 {
    if !(from.x().is_finite() && from.y().is_finite() && to.x().is_finite() && to.y().is_finite())
    {
        return f64::NAN;
    }

    from.haversine_bearing(to).rem_euclid(360.0)
}
