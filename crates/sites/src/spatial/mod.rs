//! Geodesic helpers for distance and direction.

pub mod queries;

pub use queries::{bearing_degrees, distance_between, distance_meters, EARTH_RADIUS_METERS};
