//! Local flat projection centred on a task.
//!
//! Coordinates are meters east/north of the projection centre using
//! latitude-scaled equirectangular mapping. Good enough to compare nearby
//! distances and to build convex hulls; never used for reported distances.

use crate::spatial::{normalize_longitude, GeoPoint, EARTH_RADIUS_M};
use serde::{Deserialize, Serialize};

/// Meters per degree of arc on the projection sphere.
const METERS_PER_DEG: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Smallest longitude scale accepted near the poles.
const MIN_COS_LAT: f64 = 1e-6;

/// A projected location in meters (x = east, y = north).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatPoint {
    pub x: f64,
    pub y: f64,
}

impl FlatPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn square_distance_to(&self, other: &FlatPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &FlatPoint) -> f64 {
        self.square_distance_to(other).sqrt()
    }

    /// Z component of `(a - self) x (b - self)`; positive when `self, a, b`
    /// turn counter-clockwise.
    pub fn cross(&self, a: &FlatPoint, b: &FlatPoint) -> f64 {
        (a.x - self.x) * (b.y - self.y) - (a.y - self.y) * (b.x - self.x)
    }
}

/// Maps geographic points to [`FlatPoint`]s around the task's bounding box
/// centre.
///
/// Build it with [`TaskProjection::reset`] on the first task location,
/// [`TaskProjection::scan`] every further one, then [`TaskProjection::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskProjection {
    origin: GeoPoint,
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
    center: GeoPoint,
    cos_lat: f64,
}

impl TaskProjection {
    pub fn new(origin: GeoPoint) -> Self {
        let mut projection = Self {
            origin,
            lat_min: origin.lat,
            lat_max: origin.lat,
            lon_min: 0.0,
            lon_max: 0.0,
            center: origin,
            cos_lat: 1.0,
        };
        projection.update();
        projection
    }

    /// Build a projection covering all of `points`; `None` when empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let mut projection = Self::new(*iter.next()?);
        for point in iter {
            projection.scan(*point);
        }
        projection.update();
        Some(projection)
    }

    /// Restart the bounding box at `origin`.
    pub fn reset(&mut self, origin: GeoPoint) {
        *self = Self::new(origin);
    }

    /// Extend the bounding box to include `point`.
    ///
    /// Longitudes are tracked relative to the origin so tasks crossing the
    /// antimeridian keep a compact box.
    pub fn scan(&mut self, point: GeoPoint) {
        let rel_lon = normalize_longitude(point.lon - self.origin.lon);
        self.lat_min = self.lat_min.min(point.lat);
        self.lat_max = self.lat_max.max(point.lat);
        self.lon_min = self.lon_min.min(rel_lon);
        self.lon_max = self.lon_max.max(rel_lon);
    }

    /// Recompute centre and scale from the scanned bounding box.
    pub fn update(&mut self) {
        let lat = (self.lat_min + self.lat_max) / 2.0;
        let lon = normalize_longitude(self.origin.lon + (self.lon_min + self.lon_max) / 2.0);
        self.center = GeoPoint::new(lat, lon);
        self.cos_lat = lat.to_radians().cos().max(MIN_COS_LAT);
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn project(&self, point: GeoPoint) -> FlatPoint {
        let dlon = normalize_longitude(point.lon - self.center.lon);
        FlatPoint::new(
            dlon * METERS_PER_DEG * self.cos_lat,
            (point.lat - self.center.lat) * METERS_PER_DEG,
        )
    }

    pub fn unproject(&self, flat: FlatPoint) -> GeoPoint {
        GeoPoint::new(
            self.center.lat + flat.y / METERS_PER_DEG,
            normalize_longitude(self.center.lon + flat.x / (METERS_PER_DEG * self.cos_lat)),
        )
    }

    /// Approximate distance in whole meters between two locations.
    pub fn flat_distance(&self, a: GeoPoint, b: GeoPoint) -> u32 {
        let d = self.project(a).distance_to(&self.project(b)).round();
        if d >= u32::MAX as f64 {
            u32::MAX
        } else {
            d as u32
        }
    }

    /// Whether two aircraft positions differ by more than `threshold_m`,
    /// i.e. whether a new minimum-distance search is worthwhile.
    pub fn distance_is_significant(&self, a: GeoPoint, b: GeoPoint, threshold_m: f64) -> bool {
        let threshold = threshold_m.max(0.0);
        self.project(a).square_distance_to(&self.project(b)) > threshold * threshold
    }
}
