//! Great-circle math for task distances and zone sampling.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean earth radius used by every distance in the crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(*self, *other)
    }

    /// Initial bearing to `other` in degrees.
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing(*self, *other)
    }

    /// Location reached after travelling `distance_m` along `bearing_deg`.
    pub fn offset(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        find_location(*self, bearing_deg, distance_m)
    }
}

/// Calculate distance between two points in meters using Haversine formula.
///
/// The intermediate term is clamped so coincident and antipodal points
/// return 0 and half the circumference instead of NaN.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    (2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())).max(0.0)
}

/// Initial bearing from `a` to `b` in degrees, 0 = north, 90 = east.
///
/// Always in `[0, 360)`; identical points give 0.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    normalize_bearing(x.atan2(y).to_degrees())
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `origin` - Starting position
/// * `bearing_deg` - Bearing in degrees (0 = north, 90 = east)
/// * `distance_m` - Distance in meters
pub fn find_location(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let lon2 = normalize_longitude_rad(lon1 + y.atan2(x));

    GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Point at `fraction` (0..=1) of the great-circle path from `a` to `b`.
pub fn intermediate_point(a: GeoPoint, b: GeoPoint, fraction: f64) -> GeoPoint {
    if a == b {
        return a;
    }
    let angular = distance(a, b) / EARTH_RADIUS_M;
    if angular <= f64::EPSILON {
        return a;
    }
    let f = fraction.clamp(0.0, 1.0);
    let inv_sin = 1.0 / angular.sin();
    let wa = ((1.0 - f) * angular).sin() * inv_sin;
    let wb = (f * angular).sin() * inv_sin;

    let (lat1, lon1) = (a.lat.to_radians(), a.lon.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lon.to_radians());

    let x = wa * lat1.cos() * lon1.cos() + wb * lat2.cos() * lon2.cos();
    let y = wa * lat1.cos() * lon1.sin() + wb * lat2.cos() * lon2.sin();
    let z = wa * lat1.sin() + wb * lat2.sin();

    GeoPoint::new(
        z.atan2((x * x + y * y).sqrt()).to_degrees(),
        y.atan2(x).to_degrees(),
    )
}

/// Wrap a bearing into `[0, 360)`.
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wrap a longitude difference into `[-180, 180)`.
pub fn normalize_longitude(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

fn normalize_longitude_rad(rad: f64) -> f64 {
    (rad + PI).rem_euclid(2.0 * PI) - PI
}
