//! Pre-defined tasks for the CLI and tests.

use xctask_core::{GeoPoint, TaskPoint, Zone};

/// Names accepted by [`scenario_by_name`].
pub const SCENARIO_NAMES: [&str; 3] = ["equator", "triangle", "racing"];

/// Default task centre for the geographic scenarios (Valais, CH).
const DEFAULT_CENTER_LAT: f64 = 46.2;
const DEFAULT_CENTER_LON: f64 = 7.4;

/// A named task layout.
pub struct Scenario {
    pub name: String,
    pub points: Vec<TaskPoint>,
}

/// Three 1 km cylinders on the equator at longitude 0, 1 and 2.
pub fn create_equator_scenario() -> Scenario {
    let points = [0.0_f64, 1.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, &lon)| {
            TaskPoint::new(
                format!("EQ{}", i + 1),
                Zone::cylinder(GeoPoint::new(0.0, lon), 1_000.0),
            )
        })
        .collect();

    Scenario {
        name: "equator".to_string(),
        points,
    }
}

/// Triangle around a centre point.
///
/// - Start: line across the first leg
/// - Turnpoints: 90 degree sectors facing away from the triangle
/// - Finish: 3 km cylinder back at the start
pub fn create_triangle_scenario(center_lat: f64, center_lon: f64) -> Scenario {
    let center = GeoPoint::new(center_lat, center_lon);
    let leg_m = 30_000.0;
    let corners: Vec<GeoPoint> = [0.0, 120.0, 240.0]
        .iter()
        .map(|&brg| center.offset(brg, leg_m))
        .collect();

    let first_leg = corners[0].bearing_to(&corners[1]);
    let mut points = vec![TaskPoint::new(
        "START",
        Zone::line(corners[0], 2_000.0, first_leg + 90.0),
    )];
    for (i, corner) in corners.iter().enumerate().skip(1) {
        let outward = center.bearing_to(corner);
        points.push(TaskPoint::new(
            format!("TP{i}"),
            Zone::sector(*corner, 10_000.0, outward - 45.0, outward + 45.0),
        ));
    }
    points.push(TaskPoint::new("FINISH", Zone::cylinder(corners[0], 3_000.0)));

    Scenario {
        name: "triangle".to_string(),
        points,
    }
}

/// Five point racing task heading roughly east, finishing on a line.
pub fn create_racing_scenario(center_lat: f64, center_lon: f64) -> Scenario {
    let start = GeoPoint::new(center_lat, center_lon);
    let legs: [(f64, f64, f64); 3] = [
        // bearing, leg length, cylinder radius
        (70.0, 45_000.0, 500.0),
        (130.0, 38_000.0, 2_000.0),
        (40.0, 52_000.0, 1_000.0),
    ];

    let mut points = vec![TaskPoint::new("START", Zone::cylinder(start, 10_000.0))];
    let mut location = start;
    for (i, &(brg, length_m, radius_m)) in legs.iter().enumerate() {
        location = location.offset(brg, length_m);
        points.push(TaskPoint::new(
            format!("TP{}", i + 1),
            Zone::cylinder(location, radius_m),
        ));
    }
    let finish = location.offset(260.0, 30_000.0);
    let final_leg = location.bearing_to(&finish);
    points.push(TaskPoint::new(
        "FINISH",
        Zone::line(finish, 1_000.0, final_leg + 90.0),
    ));

    Scenario {
        name: "racing".to_string(),
        points,
    }
}

pub fn scenario_by_name(name: &str) -> Option<Scenario> {
    match name {
        "equator" => Some(create_equator_scenario()),
        "triangle" => Some(create_triangle_scenario(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON)),
        "racing" => Some(create_racing_scenario(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xctask_core::ObservationZone;

    #[test]
    fn test_equator_scenario_has_three_points() {
        let scenario = create_equator_scenario();
        assert_eq!(scenario.points.len(), 3);
        assert_eq!(scenario.name, "equator");
    }

    #[test]
    fn test_triangle_closes_at_start() {
        let scenario = create_triangle_scenario(46.0, 7.0);
        assert_eq!(scenario.points.len(), 4);
        let start = scenario.points[0].location();
        let finish = scenario.points[3].location();
        assert!(start.distance_to(&finish) < 1.0);
    }

    #[test]
    fn test_triangle_sectors_face_outward() {
        let center = GeoPoint::new(46.0, 7.0);
        let scenario = create_triangle_scenario(center.lat, center.lon);
        for point in &scenario.points[1..3] {
            let outward = center.bearing_to(&point.location());
            let beyond = point.location().offset(outward, 5_000.0);
            let inside = point.location().offset(outward + 180.0, 5_000.0);
            assert!(point.zone().contains(beyond));
            assert!(!point.zone().contains(inside));
        }
    }

    #[test]
    fn test_racing_scenario_has_five_points() {
        let scenario = create_racing_scenario(46.0, 7.0);
        assert_eq!(scenario.points.len(), 5);
        assert_eq!(scenario.points[4].name, "FINISH");
    }

    #[test]
    fn test_lookup_by_name() {
        for name in SCENARIO_NAMES {
            assert_eq!(scenario_by_name(name).map(|s| s.name), Some(name.to_string()));
        }
        assert!(scenario_by_name("unknown").is_none());
    }
}
