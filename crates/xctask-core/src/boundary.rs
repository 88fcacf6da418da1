//! Candidate points on observation zone boundaries.

use crate::projection::{FlatPoint, TaskProjection};
use crate::spatial::GeoPoint;
use crate::zone::ObservationZone;
use std::cmp::Ordering;

/// Cross products below this (square meters) count as collinear.
const HULL_EPS: f64 = 1e-6;

/// Which extreme a search is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    Shortest,
    Longest,
}

/// One candidate point of a turnpoint's zone.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryPoint {
    pub location: GeoPoint,
    pub flat_location: FlatPoint,
    /// Real aircraft fix rather than a synthetic zone sample
    pub actual: bool,
}

impl BoundaryPoint {
    pub fn new(location: GeoPoint, projection: &TaskProjection) -> Self {
        Self {
            location,
            flat_location: projection.project(location),
            actual: false,
        }
    }

    pub fn actual(location: GeoPoint, projection: &TaskProjection) -> Self {
        Self {
            actual: true,
            ..Self::new(location, projection)
        }
    }

    /// Longitude ascending, then latitude descending.
    pub fn sort_cmp(&self, other: &BoundaryPoint) -> Ordering {
        self.location
            .lon
            .total_cmp(&other.location.lon)
            .then_with(|| other.location.lat.total_cmp(&self.location.lat))
    }

    pub fn sorts_before(&self, other: &BoundaryPoint) -> bool {
        self.sort_cmp(other) == Ordering::Less
    }
}

impl PartialEq for BoundaryPoint {
    fn eq(&self, other: &Self) -> bool {
        self.location.lon == other.location.lon && self.location.lat == other.location.lat
    }
}

/// The boundary points of one turnpoint plus the picks of the latest
/// searches.
///
/// Indices handed out by [`BoundaryPointCollection::add_point`] stay valid
/// until the next [`BoundaryPointCollection::populate_default_samples`].
/// Out-of-range lookups return `None`.
#[derive(Debug, Clone, Default)]
pub struct BoundaryPointCollection {
    points: Vec<BoundaryPoint>,
    /// Parallel to `points`: strictly inside the convex hull, so never on a
    /// longest route
    interior: Vec<bool>,
    search_min: Option<usize>,
    search_max: Option<usize>,
    /// Pick of the longest route flown so far
    search_achieved: Option<usize>,
    /// Slot holding the transient aircraft fix
    spliced: Option<usize>,
}

impl BoundaryPointCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection sampled from `zone` and pruned.
    pub fn from_zone<Z: ObservationZone + ?Sized>(zone: &Z, projection: &TaskProjection) -> Self {
        let mut collection = Self::new();
        collection.populate_default_samples(zone, projection);
        collection.prune();
        collection
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BoundaryPoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryPoint> {
        self.points.iter()
    }

    /// Append `point` unless an equal one is already present.
    pub fn add_point(&mut self, point: BoundaryPoint) -> bool {
        if self.points.contains(&point) {
            return false;
        }
        self.points.push(point);
        self.interior.push(false);
        true
    }

    /// Replace synthetic samples with the zone's default sampling.
    ///
    /// Actual points survive except a spliced fix, which is dropped. An
    /// empty sampling falls back to the zone's reference location so the
    /// collection is never empty.
    pub fn populate_default_samples<Z: ObservationZone + ?Sized>(
        &mut self,
        zone: &Z,
        projection: &TaskProjection,
    ) {
        let kept: Vec<BoundaryPoint> = self
            .points
            .iter()
            .enumerate()
            .filter(|&(i, p)| p.actual && self.spliced != Some(i))
            .map(|(_, p)| p)
            // reproject, the projection may have moved
            .map(|p| BoundaryPoint::actual(p.location, projection))
            .collect();

        self.points.clear();
        self.interior.clear();
        self.search_min = None;
        self.search_max = None;
        self.search_achieved = None;
        self.spliced = None;

        for location in zone.boundary_samples() {
            self.add_point(BoundaryPoint::new(location, projection));
        }
        for point in kept {
            self.add_point(point);
        }
        if self.points.is_empty() {
            self.add_point(BoundaryPoint::new(zone.reference(), projection));
        }
    }

    /// Mark non-actual points that can never lie on a longest route.
    ///
    /// Leg length through a point is convex in its position, so every point
    /// strictly inside the convex hull is beaten by some hull point. Points
    /// on hull edges and actual points are kept. No pruning applies to
    /// shortest searches: a distinct point is never closer than another from
    /// every direction. Marks are recomputed from scratch, so pruning twice
    /// is the same as pruning once.
    pub fn prune(&mut self) {
        self.interior = vec![false; self.points.len()];
        let hull = self.convex_hull();
        if hull.len() < 3 {
            return;
        }
        for (i, point) in self.points.iter().enumerate() {
            if point.actual {
                continue;
            }
            let p = point.flat_location;
            let inside = hull.iter().enumerate().all(|(k, &a)| {
                let b = hull[(k + 1) % hull.len()];
                self.points[a]
                    .flat_location
                    .cross(&self.points[b].flat_location, &p)
                    > HULL_EPS
            });
            self.interior[i] = inside;
        }
        if self.interior.iter().all(|&interior| interior) {
            // keep at least one point for every objective
            self.interior[0] = false;
        }
    }

    pub fn is_pruned(&self, index: usize, objective: Objective) -> bool {
        objective == Objective::Longest && self.interior.get(index).copied().unwrap_or(false)
    }

    /// Indices a search for `objective` has to consider.
    pub fn candidates(&self, objective: Objective) -> impl Iterator<Item = usize> + '_ {
        (0..self.points.len()).filter(move |&i| !self.is_pruned(i, objective))
    }

    pub fn candidate_count(&self, objective: Objective) -> usize {
        self.candidates(objective).count()
    }

    /// Put the aircraft fix into the collection as an actual point.
    ///
    /// Only one fix is held at a time: a later splice overwrites the slot of
    /// the previous one. Returns the fix's index.
    pub fn splice_actual(&mut self, location: GeoPoint, projection: &TaskProjection) -> usize {
        let fix = BoundaryPoint::actual(location, projection);
        if let Some(existing) = self.points.iter().position(|p| *p == fix) {
            return existing;
        }
        match self.spliced {
            Some(slot) if slot < self.points.len() => {
                self.points[slot] = fix;
                self.interior[slot] = false;
                if self.search_min == Some(slot) {
                    self.search_min = None;
                }
                if self.search_max == Some(slot) {
                    self.search_max = None;
                }
                if self.search_achieved == Some(slot) {
                    self.search_achieved = None;
                }
                slot
            }
            _ => {
                self.points.push(fix);
                self.interior.push(false);
                let slot = self.points.len() - 1;
                self.spliced = Some(slot);
                slot
            }
        }
    }

    pub fn set_search_min(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.search_min = Some(index);
        true
    }

    pub fn set_search_max(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.search_max = Some(index);
        true
    }

    pub fn set_search_achieved(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.search_achieved = Some(index);
        true
    }

    pub fn search_min_index(&self) -> Option<usize> {
        self.search_min
    }

    pub fn search_max_index(&self) -> Option<usize> {
        self.search_max
    }

    pub fn search_achieved_index(&self) -> Option<usize> {
        self.search_achieved
    }

    pub fn search_min(&self) -> Option<&BoundaryPoint> {
        self.search_min.and_then(|i| self.points.get(i))
    }

    pub fn search_max(&self) -> Option<&BoundaryPoint> {
        self.search_max.and_then(|i| self.points.get(i))
    }

    pub fn search_achieved(&self) -> Option<&BoundaryPoint> {
        self.search_achieved.and_then(|i| self.points.get(i))
    }

    /// Counter-clockwise hull vertices (indices), collinear points dropped.
    fn convex_hull(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.points.len()).collect();
        order.sort_by(|&a, &b| {
            let pa = &self.points[a].flat_location;
            let pb = &self.points[b].flat_location;
            pa.x.total_cmp(&pb.x)
                .then_with(|| pa.y.total_cmp(&pb.y))
                .then_with(|| self.points[a].sort_cmp(&self.points[b]))
        });
        if order.len() < 3 {
            return order;
        }

        let flat = |i: usize| self.points[i].flat_location;
        let mut lower: Vec<usize> = Vec::new();
        for &i in &order {
            while lower.len() >= 2
                && flat(lower[lower.len() - 2]).cross(&flat(lower[lower.len() - 1]), &flat(i))
                    <= HULL_EPS
            {
                lower.pop();
            }
            lower.push(i);
        }
        let mut upper: Vec<usize> = Vec::new();
        for &i in order.iter().rev() {
            while upper.len() >= 2
                && flat(upper[upper.len() - 2]).cross(&flat(upper[upper.len() - 1]), &flat(i))
                    <= HULL_EPS
            {
                upper.pop();
            }
            upper.push(i);
        }
        lower.pop();
        upper.pop();
        lower.extend(upper);
        lower
    }
}
