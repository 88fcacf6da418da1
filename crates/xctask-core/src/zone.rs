//! Observation zone shapes attached to turnpoints.

use crate::config::SamplingConfig;
use crate::spatial::{bearing, distance, intermediate_point, normalize_bearing, GeoPoint};
use serde::{Deserialize, Serialize};

/// Cross-track slack in meters for a point to count as on a line zone.
const LINE_TOLERANCE_M: f64 = 1.0;

/// What the optimizer needs from a zone: candidate boundary points and a
/// containment test.
pub trait ObservationZone {
    /// Nominal turnpoint location, used as the fallback sample.
    fn reference(&self) -> GeoPoint;

    /// Default boundary sampling, eagerly materialized.
    fn boundary_samples(&self) -> Vec<GeoPoint>;

    fn contains(&self, point: GeoPoint) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneShape {
    Cylinder {
        radius_m: f64,
    },
    /// Pie slice swept clockwise from `start_radial_deg` to `end_radial_deg`.
    Sector {
        radius_m: f64,
        start_radial_deg: f64,
        end_radial_deg: f64,
    },
    /// Line centred on the turnpoint, its axis pointing along `bearing_deg`.
    Line {
        length_m: f64,
        bearing_deg: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub center: GeoPoint,
    pub shape: ZoneShape,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

impl Zone {
    pub fn new(center: GeoPoint, shape: ZoneShape) -> Self {
        Self {
            center,
            shape,
            sampling: SamplingConfig::default(),
        }
    }

    pub fn cylinder(center: GeoPoint, radius_m: f64) -> Self {
        Self::new(center, ZoneShape::Cylinder { radius_m })
    }

    pub fn sector(center: GeoPoint, radius_m: f64, start_radial_deg: f64, end_radial_deg: f64) -> Self {
        Self::new(
            center,
            ZoneShape::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            },
        )
    }

    pub fn line(center: GeoPoint, length_m: f64, bearing_deg: f64) -> Self {
        Self::new(
            center,
            ZoneShape::Line {
                length_m,
                bearing_deg,
            },
        )
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    fn arc_samples(&self, radius_m: f64, start_deg: f64, span_deg: f64) -> Vec<GeoPoint> {
        let full = self.sampling.arc_points.max(3);
        if span_deg >= 360.0 {
            return (0..full)
                .map(|i| self.center.offset(360.0 * i as f64 / full as f64, radius_m))
                .collect();
        }
        let steps = ((full as f64 * span_deg / 360.0).ceil() as usize).max(2);
        (0..=steps)
            .map(|i| {
                let radial = start_deg + span_deg * i as f64 / steps as f64;
                self.center.offset(normalize_bearing(radial), radius_m)
            })
            .collect()
    }
}

/// Clockwise sweep from `start` to `end` in degrees; equal radials mean a
/// full circle.
fn sector_span(start_deg: f64, end_deg: f64) -> f64 {
    let span = normalize_bearing(end_deg - start_deg);
    if span == 0.0 {
        360.0
    } else {
        span
    }
}

impl ObservationZone for Zone {
    fn reference(&self) -> GeoPoint {
        self.center
    }

    fn boundary_samples(&self) -> Vec<GeoPoint> {
        match self.shape {
            ZoneShape::Cylinder { radius_m } => {
                if radius_m <= 0.0 {
                    return vec![self.center];
                }
                self.arc_samples(radius_m, 0.0, 360.0)
            }
            ZoneShape::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            } => {
                if radius_m <= 0.0 {
                    return vec![self.center];
                }
                let span = sector_span(start_radial_deg, end_radial_deg);
                let mut samples = Vec::new();
                if span < 360.0 {
                    samples.push(self.center);
                }
                samples.extend(self.arc_samples(radius_m, start_radial_deg, span));
                samples
            }
            ZoneShape::Line {
                length_m,
                bearing_deg,
            } => {
                if length_m <= 0.0 {
                    return vec![self.center];
                }
                let n = self.sampling.line_points.max(2);
                let half = length_m / 2.0;
                let from = self.center.offset(bearing_deg + 180.0, half);
                let to = self.center.offset(bearing_deg, half);
                (0..n)
                    .map(|i| intermediate_point(from, to, i as f64 / (n - 1) as f64))
                    .collect()
            }
        }
    }

    fn contains(&self, point: GeoPoint) -> bool {
        let d = distance(self.center, point);
        match self.shape {
            ZoneShape::Cylinder { radius_m } => d <= radius_m,
            ZoneShape::Sector {
                radius_m,
                start_radial_deg,
                end_radial_deg,
            } => {
                if d > radius_m {
                    return false;
                }
                if d <= f64::EPSILON {
                    return true;
                }
                let span = sector_span(start_radial_deg, end_radial_deg);
                let offset = normalize_bearing(bearing(self.center, point) - start_radial_deg);
                offset <= span
            }
            ZoneShape::Line {
                length_m,
                bearing_deg,
            } => {
                let delta = (bearing(self.center, point) - bearing_deg).to_radians();
                let along = d * delta.cos();
                let across = d * delta.sin();
                along.abs() <= length_m / 2.0 + LINE_TOLERANCE_M && across.abs() <= LINE_TOLERANCE_M
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylinder_samples_lie_on_radius() {
        let center = GeoPoint::new(45.0, 6.0);
        let zone = Zone::cylinder(center, 1_000.0);
        let samples = zone.boundary_samples();
        assert_eq!(samples.len(), 36);
        for s in samples {
            assert!((distance(center, s) - 1_000.0).abs() < 0.01);
            assert!(zone.contains(center.offset(center.bearing_to(&s), 999.0)));
        }
        assert!(!zone.contains(center.offset(10.0, 1_001.0)));
    }

    #[test]
    fn degenerate_cylinder_falls_back_to_center() {
        let zone = Zone::cylinder(GeoPoint::new(1.0, 2.0), 0.0);
        assert_eq!(zone.boundary_samples(), vec![GeoPoint::new(1.0, 2.0)]);
    }

    #[test]
    fn sector_includes_apex_and_arc_ends() {
        let center = GeoPoint::new(0.0, 0.0);
        let zone = Zone::sector(center, 5_000.0, 45.0, 135.0);
        let samples = zone.boundary_samples();
        assert_eq!(samples[0], center);
        // quarter of 36 arc points, plus both ends, plus the apex
        assert_eq!(samples.len(), 1 + 10);
        assert!((bearing(center, samples[1]) - 45.0).abs() < 1e-6);
        assert!((bearing(center, *samples.last().expect("arc")) - 135.0).abs() < 1e-6);

        assert!(zone.contains(center.offset(90.0, 4_000.0)));
        assert!(!zone.contains(center.offset(180.0, 4_000.0)));
        assert!(!zone.contains(center.offset(90.0, 6_000.0)));
    }

    #[test]
    fn sector_wrapping_north() {
        let center = GeoPoint::new(10.0, 10.0);
        let zone = Zone::sector(center, 3_000.0, 315.0, 45.0);
        assert!(zone.contains(center.offset(0.0, 1_000.0)));
        assert!(zone.contains(center.offset(350.0, 1_000.0)));
        assert!(!zone.contains(center.offset(90.0, 1_000.0)));
    }

    #[test]
    fn line_samples_span_length() {
        let center = GeoPoint::new(0.0, 0.0);
        let zone = Zone::line(center, 2_000.0, 0.0);
        let samples = zone.boundary_samples();
        assert_eq!(samples.len(), 5);
        assert!((distance(samples[0], samples[4]) - 2_000.0).abs() < 0.01);
        assert!(distance(center, samples[2]) < 1e-3);
        assert!(zone.contains(center.offset(0.0, 500.0)));
        assert!(!zone.contains(center.offset(90.0, 500.0)));
    }
}
