//! Ordered sequence of turnpoints and the distance scans run over it.

use crate::boundary::{BoundaryPoint, BoundaryPointCollection, Objective};
use crate::config::TaskConfig;
use crate::error::TaskError;
use crate::optimizer::{AchievedDistance, TaskOptimizer, TaskStage};
use crate::projection::TaskProjection;
use crate::spatial::{distance, GeoPoint};
use crate::zone::{ObservationZone, Zone};
use serde::Serialize;
use tracing::{debug, info};

/// A named turnpoint with its observation zone and sampled boundary.
#[derive(Debug, Clone)]
pub struct TaskPoint {
    pub name: String,
    zone: Zone,
    boundary: BoundaryPointCollection,
}

impl TaskPoint {
    pub fn new(name: impl Into<String>, zone: Zone) -> Self {
        Self {
            name: name.into(),
            zone,
            boundary: BoundaryPointCollection::new(),
        }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn location(&self) -> GeoPoint {
        self.zone.reference()
    }
}

impl TaskStage for TaskPoint {
    fn boundary(&self) -> &BoundaryPointCollection {
        &self.boundary
    }

    fn boundary_mut(&mut self) -> &mut BoundaryPointCollection {
        &mut self.boundary
    }

    fn contains(&self, location: GeoPoint) -> bool {
        self.zone.contains(location)
    }
}

/// Minimum and maximum total task distance for the current aircraft state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceRange {
    pub min_m: f64,
    pub max_m: f64,
}

#[derive(Debug)]
pub struct Task {
    points: Vec<TaskPoint>,
    active: usize,
    projection: TaskProjection,
    config: TaskConfig,
    optimizer: TaskOptimizer,
    last_min_location: Option<GeoPoint>,
    cached_min: Option<f64>,
    cached_max: Option<f64>,
}

impl Task {
    /// Build a task; zones take the sampling density from `config`.
    pub fn new(points: Vec<TaskPoint>, config: TaskConfig) -> Result<Self, TaskError> {
        config.validate()?;
        let optimizer = TaskOptimizer::new(&config.optimizer)?;
        let points = points
            .into_iter()
            .map(|mut point| {
                point.zone.sampling = config.sampling;
                point
            })
            .collect();

        let mut task = Self {
            points,
            active: 0,
            projection: TaskProjection::new(GeoPoint::default()),
            config,
            optimizer,
            last_min_location: None,
            cached_min: None,
            cached_max: None,
        };
        task.update_geometry();
        Ok(task)
    }

    /// Recentre the projection on every zone, resample and prune boundaries.
    pub fn update_geometry(&mut self) {
        let mut locations = Vec::new();
        for point in &self.points {
            locations.push(point.zone.reference());
            locations.extend(point.zone.boundary_samples());
        }
        if let Some(projection) = TaskProjection::from_points(&locations) {
            self.projection = projection;
        }

        for point in &mut self.points {
            point
                .boundary
                .populate_default_samples(&point.zone, &self.projection);
            point.boundary.prune();
        }
        self.invalidate();

        debug!(
            turnpoints = self.points.len(),
            samples = locations.len(),
            "task geometry updated"
        );
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn set_active_index(&mut self, index: usize) -> Result<(), TaskError> {
        if index >= self.points.len() {
            return Err(TaskError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        if index != self.active {
            self.active = index;
            self.invalidate();
        }
        Ok(())
    }

    pub fn point(&self, index: usize) -> Option<&TaskPoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[TaskPoint] {
        &self.points
    }

    pub fn projection(&self) -> &TaskProjection {
        &self.projection
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Sum of legs between turnpoint references.
    pub fn scan_distance_nominal(&self) -> f64 {
        self.points
            .windows(2)
            .map(|leg| distance(leg[0].location(), leg[1].location()))
            .sum()
    }

    /// Shortest route through every zone, ignoring the aircraft.
    pub fn scan_distance_min(&mut self) -> Result<f64, TaskError> {
        self.optimizer
            .optimize_distance(&mut self.points, 0, Objective::Shortest)
    }

    /// Longest route through every zone, ignoring the aircraft.
    pub fn scan_distance_max(&mut self) -> Result<f64, TaskError> {
        self.optimizer
            .optimize_distance(&mut self.points, 0, Objective::Longest)
    }

    /// Achieved and remaining distance with the aircraft at `location` on
    /// the active turnpoint.
    pub fn scan_distance_achieved(
        &mut self,
        location: GeoPoint,
        objective: Objective,
    ) -> Result<AchievedDistance, TaskError> {
        self.optimizer.optimize_achieved_distance(
            &mut self.points,
            self.active,
            location,
            &self.projection,
            objective,
        )
    }

    /// Longest distance flown from the start to `location`, through every
    /// turnpoint before the active one.
    pub fn scan_distance_travelled(&mut self, location: GeoPoint) -> Result<f64, TaskError> {
        self.optimizer.optimize_travelled_distance(
            &mut self.points,
            self.active,
            location,
            &self.projection,
        )
    }

    /// Shortest distance from `location` to the finish through the
    /// turnpoints not yet achieved.
    pub fn scan_distance_remaining(&mut self, location: GeoPoint) -> Result<f64, TaskError> {
        self.optimizer.optimize_remaining_distance(
            &mut self.points,
            self.active,
            location,
            &self.projection,
        )
    }

    /// Length of the planned route: the achieved picks before the active
    /// turnpoint, the shortest picks from it on. Turnpoints without a pick
    /// contribute their reference location.
    pub fn scan_distance_planned(&self) -> f64 {
        let route: Vec<GeoPoint> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let pick = if i < self.active {
                    point.boundary.search_achieved()
                } else {
                    point.boundary.search_min()
                };
                pick.map(|p| p.location).unwrap_or_else(|| point.location())
            })
            .collect();
        route.windows(2).map(|leg| distance(leg[0], leg[1])).sum()
    }

    /// Distance credited so far: the planned route minus what remains from
    /// `location`, never negative.
    pub fn scan_distance_scored(&mut self, location: GeoPoint) -> Result<f64, TaskError> {
        self.scan_distance_travelled(location)?;
        let remaining = self.scan_distance_remaining(location)?;
        let planned = self.scan_distance_planned();
        Ok((planned - remaining).max(0.0))
    }

    /// Total distance range for an aircraft at `location`.
    ///
    /// The minimum is recomputed when the aircraft moved more than the
    /// configured significance distance since the last minimum search, the
    /// maximum only when `force` is set or nothing is cached yet.
    pub fn scan_distance_minmax(
        &mut self,
        location: GeoPoint,
        force: bool,
    ) -> Result<DistanceRange, TaskError> {
        let moved = match self.last_min_location {
            Some(last) => self.projection.distance_is_significant(
                location,
                last,
                self.config.significance_m,
            ),
            None => true,
        };

        let min_m = match self.cached_min {
            Some(min_m) if !force && !moved => min_m,
            _ => {
                let min_m = self
                    .scan_distance_achieved(location, Objective::Shortest)?
                    .total_m;
                self.last_min_location = Some(location);
                self.cached_min = Some(min_m);
                min_m
            }
        };

        let max_m = match self.cached_max {
            Some(max_m) if !force => max_m,
            _ => {
                let max_m = self
                    .scan_distance_achieved(location, Objective::Longest)?
                    .total_m;
                self.cached_max = Some(max_m);
                max_m
            }
        };

        Ok(DistanceRange { min_m, max_m })
    }

    /// Keep `location` as an actual boundary point when it lies inside the
    /// active zone. Returns whether a point was added.
    pub fn update_sample(&mut self, location: GeoPoint) -> bool {
        let Some(point) = self.points.get_mut(self.active) else {
            return false;
        };
        if !point.zone.contains(location) {
            return false;
        }
        let added = point
            .boundary
            .add_point(BoundaryPoint::actual(location, &self.projection));
        if added {
            info!(turnpoint = %point.name, lat = location.lat, lon = location.lon, "zone sampled");
            self.cached_min = None;
        }
        added
    }

    fn invalidate(&mut self) {
        self.last_min_location = None;
        self.cached_min = None;
        self.cached_max = None;
    }
}
