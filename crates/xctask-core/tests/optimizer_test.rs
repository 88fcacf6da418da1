//! Task optimization integration tests.
//!
//! Exercises full tasks through the public API: geometry setup, minimum and
//! maximum route search and the achieved/remaining split.
//!
//! Run with: cargo test -p xctask-core --test optimizer_test

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xctask_core::{
    distance, AchievedDistance, GeoPoint, Objective, OptimizerConfig, SamplingConfig, Task,
    TaskConfig, TaskError, TaskPoint, TaskStage, Zone, MAX_LEG_LIMIT,
};

fn equator_task(config: TaskConfig) -> Task {
    let points = [0.0, 1.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, &lon)| {
            TaskPoint::new(
                format!("EQ{i}"),
                Zone::cylinder(GeoPoint::new(0.0, lon), 1_000.0),
            )
        })
        .collect();
    Task::new(points, config).expect("valid task")
}

/// Out to the north-east and back, so the middle turnpoint sits off the
/// straight line between start and finish.
fn triangle_task() -> Task {
    let points = [(0.0, 0.0), (1.0, 1.0), (0.0, 2.0)]
        .iter()
        .enumerate()
        .map(|(i, &(lat, lon))| {
            TaskPoint::new(
                format!("TR{i}"),
                Zone::cylinder(GeoPoint::new(lat, lon), 1_000.0),
            )
        })
        .collect();
    Task::new(points, TaskConfig::default()).expect("valid task")
}

fn boundary_sizes(task: &Task) -> Vec<usize> {
    task.points().iter().map(|p| p.boundary().len()).collect()
}

fn random_task(rng: &mut StdRng) -> Task {
    let origin = GeoPoint::new(rng.random_range(-50.0..50.0), rng.random_range(-170.0..170.0));
    let mut location = origin;
    let count = rng.random_range(2..6);
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let zone = match rng.random_range(0..3) {
            0 => Zone::cylinder(location, rng.random_range(500.0..5_000.0)),
            1 => {
                let start = rng.random_range(0.0..360.0);
                Zone::sector(location, rng.random_range(1_000.0..10_000.0), start, start + 90.0)
            }
            _ => Zone::line(location, rng.random_range(1_000.0..4_000.0), rng.random_range(0.0..180.0)),
        };
        points.push(TaskPoint::new(format!("TP{i}"), zone));
        location = location.offset(rng.random_range(0.0..360.0), rng.random_range(10_000.0..80_000.0));
    }
    let config = TaskConfig {
        sampling: SamplingConfig {
            arc_points: 12,
            line_points: 3,
        },
        ..TaskConfig::default()
    };
    Task::new(points, config).expect("valid task")
}

#[test]
fn test_equator_task_distances() {
    let mut task = equator_task(TaskConfig::default());
    let span = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 2.0));
    assert!((span - 222_390.0).abs() < 10.0);

    let shortest = task.scan_distance_min().expect("route");
    let longest = task.scan_distance_max().expect("route");

    // one precision unit per leg
    assert!((shortest - (span - 2_000.0)).abs() <= 2.0 * 10.0 + 10.0, "shortest {shortest}");
    assert!(longest > shortest);
    assert!((longest - (span + 2_000.0)).abs() < 100.0, "longest {longest}");
}

#[test]
fn test_shortest_never_exceeds_longest() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let mut task = random_task(&mut rng);
        let shortest = task.scan_distance_min().expect("route");
        let longest = task.scan_distance_max().expect("route");
        assert!(shortest <= longest, "{shortest} > {longest}");
        assert!(shortest > 0.0);
    }
}

#[test]
fn test_achieved_from_start_matches_full_search() {
    let mut task = equator_task(TaskConfig::default());
    let full_min = task.scan_distance_min().expect("route");
    let full_max = task.scan_distance_max().expect("route");

    let at_start = GeoPoint::new(0.0, 0.0);
    let min = task
        .scan_distance_achieved(at_start, Objective::Shortest)
        .expect("route");
    let max = task
        .scan_distance_achieved(at_start, Objective::Longest)
        .expect("route");

    assert_eq!(min.achieved_m, 0.0);
    assert!((min.total_m - full_min).abs() < 25.0);
    assert!((max.total_m - full_max).abs() < 25.0);
}

#[test]
fn test_achieved_progress_along_task() {
    let mut task = equator_task(TaskConfig::default());
    task.set_active_index(2).expect("index");

    // inside the finish cylinder
    let fix = GeoPoint::new(0.0, 1.999);
    let result = task
        .scan_distance_achieved(fix, Objective::Shortest)
        .expect("route");
    assert!(result.remaining_m == 0.0);
    assert!(result.achieved_m > 222_000.0);
    assert_eq!(result.total_m, result.achieved_m);

    let active = task.point(2).expect("finish");
    assert!(active.boundary().search_min_index().is_some());
}

#[test]
fn test_fix_short_of_active_turnpoint_keeps_it_on_route() {
    let mut task = triangle_task();
    let full_min = task.scan_distance_min().expect("route");
    task.set_active_index(1).expect("index");

    // level with the second turnpoint but a full degree south of it
    let fix = GeoPoint::new(0.0, 1.0);
    let result = task
        .scan_distance_achieved(fix, Objective::Shortest)
        .expect("route");
    assert!(!result.in_zone);
    assert!(result.total_m >= full_min, "{} < {full_min}", result.total_m);
    let to_zone = distance(fix, GeoPoint::new(1.0, 1.0)) - 1_000.0;
    assert!(result.remaining_m > to_zone);
}

#[test]
fn test_fix_inside_active_turnpoint() {
    let mut task = triangle_task();
    let full_min = task.scan_distance_min().expect("route");
    task.set_active_index(1).expect("index");

    let fix = GeoPoint::new(1.005, 1.0);
    let result = task
        .scan_distance_achieved(fix, Objective::Shortest)
        .expect("route");
    assert!(result.in_zone);
    assert!(result.total_m >= full_min - 30.0, "{} < {full_min}", result.total_m);
    assert!(result.achieved_m > 0.0 && result.remaining_m > 0.0);
}

#[test]
fn test_achieved_queries_leave_task_state_alone() {
    let mut task = triangle_task();
    let sizes = boundary_sizes(&task);
    let before = task.scan_distance_min().expect("route");

    task.set_active_index(1).expect("index");
    for fix in [GeoPoint::new(0.0, 1.0), GeoPoint::new(1.005, 1.0)] {
        for objective in [Objective::Shortest, Objective::Longest] {
            task.scan_distance_achieved(fix, objective).expect("route");
        }
        task.scan_distance_minmax(fix, true).expect("route");
    }
    assert_eq!(boundary_sizes(&task), sizes);

    let after = task.scan_distance_min().expect("route");
    assert_eq!(after, before);

    task.update_geometry();
    assert_eq!(boundary_sizes(&task), sizes);
    assert_eq!(task.scan_distance_min().expect("route"), before);
}

#[test]
fn test_travelled_remaining_and_scored() {
    let mut task = equator_task(TaskConfig::default());
    task.set_active_index(1).expect("index");
    let fix = GeoPoint::new(0.0, 0.5);

    let travelled = task.scan_distance_travelled(fix).expect("route");
    let remaining = task.scan_distance_remaining(fix).expect("route");
    let planned = task.scan_distance_planned();
    let scored = task.scan_distance_scored(fix).expect("route");

    let degree = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
    assert!((travelled - 0.509 * degree).abs() < 50.0, "travelled {travelled}");
    assert!((remaining - 1.491 * degree).abs() < 50.0, "remaining {remaining}");
    assert!((planned - 2.0 * degree).abs() < 50.0, "planned {planned}");
    assert!((scored - travelled).abs() < 50.0, "scored {scored}");
}

#[test]
fn test_empty_task_achieved_is_zero() {
    let mut task = Task::new(Vec::new(), TaskConfig::default()).expect("valid task");
    let fix = GeoPoint::new(0.0, 0.5);
    assert_eq!(
        task.scan_distance_achieved(fix, Objective::Longest),
        Ok(AchievedDistance::default())
    );
    let range = task.scan_distance_minmax(fix, false).expect("trivial");
    assert_eq!((range.min_m, range.max_m), (0.0, 0.0));
}

#[test]
fn test_single_turnpoint_is_zero() {
    let points = vec![TaskPoint::new(
        "ONLY",
        Zone::cylinder(GeoPoint::new(45.0, 6.0), 500.0),
    )];
    let mut task = Task::new(points, TaskConfig::default()).expect("valid task");
    assert_eq!(task.scan_distance_min(), Ok(0.0));
    assert_eq!(task.scan_distance_max(), Ok(0.0));
}

#[test]
fn test_leg_beyond_quantizer_range_is_reported() {
    let config = TaskConfig {
        optimizer: OptimizerConfig {
            precision_m: 1.0,
            leg_limit: 1_000,
        },
        ..TaskConfig::default()
    };
    let mut task = equator_task(config);
    assert!(matches!(
        task.scan_distance_min(),
        Err(TaskError::QuantizationOverflow { .. })
    ));
}

#[test]
fn test_wide_leg_limit_keeps_longest_route() {
    let mut reference = equator_task(TaskConfig::default());
    let longest = reference.scan_distance_max().expect("route");

    let wide = TaskConfig {
        optimizer: OptimizerConfig {
            leg_limit: MAX_LEG_LIMIT,
            ..OptimizerConfig::default()
        },
        ..TaskConfig::default()
    };
    let mut task = equator_task(wide);
    let wide_longest = task.scan_distance_max().expect("route");
    assert!((wide_longest - longest).abs() < 25.0, "{wide_longest} vs {longest}");

    let unbounded = TaskConfig {
        optimizer: OptimizerConfig {
            leg_limit: u32::MAX,
            ..OptimizerConfig::default()
        },
        ..TaskConfig::default()
    };
    assert!(matches!(
        Task::new(Vec::new(), unbounded),
        Err(TaskError::InvalidConfig(_))
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let config = TaskConfig {
        sampling: SamplingConfig {
            arc_points: 2,
            line_points: 5,
        },
        ..TaskConfig::default()
    };
    assert!(matches!(
        Task::new(Vec::new(), config),
        Err(TaskError::InvalidConfig(_))
    ));
}

#[test]
fn test_zone_from_json() {
    let zone: Zone = serde_json::from_str(
        r#"{"center": {"lat": 46.0, "lon": 7.0}, "shape": {"type": "sector", "radius_m": 3000.0, "start_radial_deg": 90.0, "end_radial_deg": 180.0}}"#,
    )
    .expect("parse zone");
    assert_eq!(zone.sampling, SamplingConfig::default());
    assert!(xctask_core::ObservationZone::contains(
        &zone,
        GeoPoint::new(46.0, 7.0).offset(135.0, 1_000.0)
    ));
}
