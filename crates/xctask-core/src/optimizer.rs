//! Shortest and longest routes through a task's observation zones.
//!
//! The search graph is implicit: its nodes are `(stage, point)` pairs and
//! every candidate point of one stage links to every candidate point of the
//! next. Leg lengths are quantized so the integer [`Dijkstra`] engine can be
//! reused for both objectives; longest routes complement each leg against
//! the quantizer's leg limit. Every path to a stage has the same number of
//! legs, so the complement preserves the ordering of routes.
//!
//! Searches that involve the aircraft run over borrowed views of the stages
//! with the fix held in a stand-in stage, so the task's own collections only
//! ever receive search picks.

use crate::boundary::{BoundaryPoint, BoundaryPointCollection, Objective};
use crate::config::OptimizerConfig;
use crate::dijkstra::Dijkstra;
use crate::error::TaskError;
use crate::projection::TaskProjection;
use crate::quantize::Quantizer;
use crate::spatial::{distance, GeoPoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Queue capacity reserved up front; typical tasks stay below it.
const QUEUE_RESERVE: usize = 1024;

/// A boundary point addressed by stage and index within that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScanTaskPoint {
    pub stage: usize,
    pub point: usize,
}

impl ScanTaskPoint {
    pub const fn new(stage: usize, point: usize) -> Self {
        Self { stage, point }
    }
}

/// Anything that owns the boundary points of one stage.
pub trait TaskStage {
    fn boundary(&self) -> &BoundaryPointCollection;
    fn boundary_mut(&mut self) -> &mut BoundaryPointCollection;

    /// Whether `location` lies inside the stage's observation zone. Stages
    /// without a zone contain nothing.
    fn contains(&self, _location: GeoPoint) -> bool {
        false
    }
}

impl TaskStage for BoundaryPointCollection {
    fn boundary(&self) -> &BoundaryPointCollection {
        self
    }

    fn boundary_mut(&mut self) -> &mut BoundaryPointCollection {
        self
    }
}

/// Optimal route over a run of stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteSolution {
    /// Stage the route starts at, relative to the stages searched
    pub first_stage: usize,
    /// Chosen point index per stage from `first_stage` on
    pub points: Vec<usize>,
    /// Route length in quantizer units
    pub units: u64,
    /// Geodesic length of the chosen route
    pub distance_m: f64,
}

/// Distance split around the aircraft's position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievedDistance {
    pub total_m: f64,
    /// Start to the point the split happens at
    pub achieved_m: f64,
    /// Split point to the finish
    pub remaining_m: f64,
    /// Point of the active stage on the remaining route; `None` when the
    /// split happens at the fix itself
    pub point_index: Option<usize>,
    /// The fix lies inside the active zone
    pub in_zone: bool,
}

/// Maps nodes of a route searched over `[stand-in, stages[first_real..]]`
/// back onto the real stages.
#[derive(Debug, Clone, Copy)]
struct FixRoute {
    first_real: usize,
    /// Real stage the stand-in replaces and its point count; points at or
    /// past that count are the fix
    replaces: Option<(usize, usize)>,
}

impl FixRoute {
    fn real_node(&self, offset: usize, point: usize) -> Option<ScanTaskPoint> {
        if offset > 0 {
            return Some(ScanTaskPoint::new(self.first_real + offset - 1, point));
        }
        let (stage, len) = self.replaces?;
        (point < len).then_some(ScanTaskPoint::new(stage, point))
    }

    fn real_nodes(&self, points: &[usize]) -> Vec<ScanTaskPoint> {
        points
            .iter()
            .enumerate()
            .filter_map(|(offset, &point)| self.real_node(offset, point))
            .collect()
    }
}

/// Owned outcome of an achieved search, recorded once the views are gone.
struct AchievedRoute {
    units: u64,
    achieved_m: f64,
    remaining_m: f64,
    /// Real nodes of the longest route up to the fix
    flown: Vec<ScanTaskPoint>,
    /// Real nodes of the remaining route
    ahead: Vec<ScanTaskPoint>,
}

/// Owns one search engine; construct a separate optimizer for every
/// concurrent or nested search.
#[derive(Debug, Clone)]
pub struct TaskOptimizer {
    config: OptimizerConfig,
    quantizer: Quantizer,
    dijkstra: Dijkstra<ScanTaskPoint>,
}

impl TaskOptimizer {
    pub fn new(config: &OptimizerConfig) -> Result<Self, TaskError> {
        Ok(Self {
            config: config.clone(),
            quantizer: Quantizer::new(config)?,
            dijkstra: Dijkstra::with_capacity(QUEUE_RESERVE),
        })
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Optimal route from any candidate of `start_stage` to the last stage,
    /// recorded into each stage's search min (shortest) or search max
    /// (longest). Returns the route's geodesic length; fewer than two
    /// stages give 0.
    pub fn optimize_distance<T: TaskStage>(
        &mut self,
        stages: &mut [T],
        start_stage: usize,
        objective: Objective,
    ) -> Result<f64, TaskError> {
        if stages.len() < 2 {
            return Ok(0.0);
        }
        let solution = self.solve(stages, start_stage, objective)?;
        record_solution(stages, &solution, objective);
        Ok(solution.distance_m)
    }

    /// Like [`TaskOptimizer::optimize_distance`] without recording anything.
    pub fn solve<T: TaskStage>(
        &mut self,
        stages: &[T],
        start_stage: usize,
        objective: Objective,
    ) -> Result<RouteSolution, TaskError> {
        let view = boundaries(stages);
        check_stages(&view)?;
        let Some(start) = view.get(start_stage) else {
            return Err(TaskError::IndexOutOfRange {
                index: start_stage,
                len: view.len(),
            });
        };

        self.dijkstra.clear();
        for point in start.candidates(objective) {
            self.dijkstra.link_start(ScanTaskPoint::new(start_stage, point));
        }
        self.search(&view, objective)
    }

    /// Optimal route from the single node `start` to the last stage.
    pub fn optimize_from<T: TaskStage>(
        &mut self,
        stages: &[T],
        start: ScanTaskPoint,
        objective: Objective,
    ) -> Result<RouteSolution, TaskError> {
        self.route_from(&boundaries(stages), start, objective)
    }

    /// Total task distance with the aircraft at `fix` on stage `active`.
    ///
    /// When the fix lies inside the active zone the stage is searched as a
    /// copy holding the fix as an extra actual point. For each of its
    /// candidates the distance already achieved is the longest route from
    /// the start to it, whatever the objective, so progress is never
    /// underestimated. The distance still to go is the `objective` route
    /// from it through the later stages, found by a separate inner
    /// optimizer. The candidate with the best sum wins, the lowest index on
    /// ties.
    ///
    /// A fix outside the active zone is a stage of its own between the
    /// previous stage and the active one: the achieved part ends at the fix
    /// and the remaining part still has to visit the active zone.
    ///
    /// The remaining route's picks are recorded as search min or max, the
    /// achieved route's picks before the active stage as search achieved.
    /// The fix itself is never added to any stage.
    pub fn optimize_achieved_distance<T: TaskStage>(
        &mut self,
        stages: &mut [T],
        active: usize,
        fix: GeoPoint,
        projection: &TaskProjection,
        objective: Objective,
    ) -> Result<AchievedDistance, TaskError> {
        if stages.len() < 2 {
            return Ok(AchievedDistance::default());
        }
        check_index(active, stages.len())?;
        let in_zone = stages[active].contains(fix);

        let route = {
            let view = boundaries(stages);
            check_stages(&view)?;
            self.achieved_route(&view, active, fix, in_zone, projection, objective)?
        };

        record_nodes(stages, &route.ahead, Some(objective));
        record_nodes(stages, &route.flown, None);
        let point_index = route
            .ahead
            .iter()
            .find(|node| node.stage == active)
            .map(|node| node.point);

        debug!(
            active,
            in_zone,
            ?point_index,
            units = route.units,
            achieved_m = route.achieved_m,
            remaining_m = route.remaining_m,
            ?objective,
            "achieved distance"
        );

        Ok(AchievedDistance {
            total_m: route.achieved_m + route.remaining_m,
            achieved_m: route.achieved_m,
            remaining_m: route.remaining_m,
            point_index,
            in_zone,
        })
    }

    /// Longest route from any start candidate through every stage before
    /// `active` to the aircraft at `fix`, recorded as search achieved.
    /// Nothing has been travelled on the first stage or with fewer than two
    /// stages.
    pub fn optimize_travelled_distance<T: TaskStage>(
        &mut self,
        stages: &mut [T],
        active: usize,
        fix: GeoPoint,
        projection: &TaskProjection,
    ) -> Result<f64, TaskError> {
        if stages.len() < 2 {
            return Ok(0.0);
        }
        check_index(active, stages.len())?;
        if active == 0 {
            return Ok(0.0);
        }

        let (distance_m, flown) = {
            let view = boundaries(stages);
            check_stages(&view)?;
            let stand_in = fix_stage(fix, projection);
            let outer = with_stand_in(&view[..active], &stand_in, &[]);
            let Some(Some((_, path))) = self
                .longest_routes(&outer, &[0], Objective::Longest)?
                .pop()
            else {
                warn!(active, "travelled distance search found no route");
                return Err(TaskError::NoPath);
            };
            (path_distance(&outer, &path)?, path)
        };

        record_nodes(stages, &flown[..flown.len().min(active)], None);
        debug!(active, distance_m, "travelled distance");
        Ok(distance_m)
    }

    /// Shortest route from the aircraft at `fix` through the stages still
    /// to be achieved, recorded as search min. The active stage counts as
    /// achieved once the fix is inside its zone.
    pub fn optimize_remaining_distance<T: TaskStage>(
        &mut self,
        stages: &mut [T],
        active: usize,
        fix: GeoPoint,
        projection: &TaskProjection,
    ) -> Result<f64, TaskError> {
        if stages.len() < 2 {
            return Ok(0.0);
        }
        check_index(active, stages.len())?;
        let first = if stages[active].contains(fix) {
            active + 1
        } else {
            active
        };
        if first == stages.len() {
            return Ok(0.0);
        }

        let (distance_m, ahead) = {
            let view = boundaries(stages);
            check_stages(&view)?;
            let stand_in = fix_stage(fix, projection);
            let inner = with_stand_in(&[], &stand_in, &view[first..]);
            let solution =
                self.route_from(&inner, ScanTaskPoint::new(0, 0), Objective::Shortest)?;
            let mapping = FixRoute {
                first_real: first,
                replaces: None,
            };
            (solution.distance_m, mapping.real_nodes(&solution.points))
        };

        record_nodes(stages, &ahead, Some(Objective::Shortest));
        Ok(distance_m)
    }

    fn achieved_route(
        &mut self,
        view: &[&BoundaryPointCollection],
        active: usize,
        fix: GeoPoint,
        in_zone: bool,
        projection: &TaskProjection,
        objective: Objective,
    ) -> Result<AchievedRoute, TaskError> {
        let (stand_in, mapping) = if in_zone {
            let mut stand_in = view[active].clone();
            stand_in.splice_actual(fix, projection);
            let mapping = FixRoute {
                first_real: active + 1,
                replaces: Some((active, view[active].len())),
            };
            (stand_in, mapping)
        } else {
            let mapping = FixRoute {
                first_real: active,
                replaces: None,
            };
            (fix_stage(fix, projection), mapping)
        };
        let outer = with_stand_in(&view[..active], &stand_in, &[]);
        let inner = with_stand_in(&[], &stand_in, &view[mapping.first_real..]);

        let candidates: Vec<usize> = stand_in.candidates(objective).collect();
        let flown = self.longest_routes(&outer, &candidates, objective)?;

        let mut optimizer = TaskOptimizer::new(&self.config)?;
        let mut best: Option<(u64, Vec<ScanTaskPoint>, RouteSolution)> = None;
        for (&point, outer_route) in candidates.iter().zip(flown) {
            let Some((outer_units, outer_path)) = outer_route else {
                continue;
            };
            let remaining = if inner.len() < 2 {
                RouteSolution {
                    first_stage: 0,
                    points: vec![point],
                    units: 0,
                    distance_m: 0.0,
                }
            } else {
                match optimizer.route_from(&inner, ScanTaskPoint::new(0, point), objective) {
                    Ok(solution) => solution,
                    Err(TaskError::NoPath) => continue,
                    Err(err) => return Err(err),
                }
            };
            let total = outer_units + remaining.units;
            let better = match &best {
                None => true,
                Some((best_total, ..)) => match objective {
                    Objective::Shortest => total < *best_total,
                    Objective::Longest => total > *best_total,
                },
            };
            if better {
                best = Some((total, outer_path, remaining));
            }
        }

        let Some((units, outer_path, remaining)) = best else {
            warn!(active, in_zone, "achieved distance search found no route");
            return Err(TaskError::NoPath);
        };

        Ok(AchievedRoute {
            units,
            achieved_m: path_distance(&outer, &outer_path)?,
            remaining_m: remaining.distance_m,
            flown: outer_path
                .iter()
                .filter(|node| node.stage < active)
                .copied()
                .collect(),
            ahead: mapping.real_nodes(&remaining.points),
        })
    }

    fn route_from(
        &mut self,
        view: &[&BoundaryPointCollection],
        start: ScanTaskPoint,
        objective: Objective,
    ) -> Result<RouteSolution, TaskError> {
        check_stages(view)?;
        location(view, start)?;

        self.dijkstra.reset(start);
        self.search(view, objective)
    }

    /// Longest route units and node path from the start to each of
    /// `candidates` on the last stage of `view`. `last_filter` picks which
    /// points of the last stage are linked.
    #[allow(clippy::type_complexity)]
    fn longest_routes(
        &mut self,
        view: &[&BoundaryPointCollection],
        candidates: &[usize],
        last_filter: Objective,
    ) -> Result<Vec<Option<(u64, Vec<ScanTaskPoint>)>>, TaskError> {
        let last = view.len() - 1;
        if last == 0 {
            return Ok(candidates
                .iter()
                .map(|&point| Some((0, vec![ScanTaskPoint::new(0, point)])))
                .collect());
        }

        self.dijkstra.clear();
        for point in view[0].candidates(Objective::Longest) {
            self.dijkstra.link_start(ScanTaskPoint::new(0, point));
        }
        while let Some(node) = self.dijkstra.pop() {
            if node.stage == last {
                continue;
            }
            let filter = if node.stage + 1 == last {
                last_filter
            } else {
                Objective::Longest
            };
            self.add_edges(view, node, Objective::Longest, filter)?;
        }

        Ok(candidates
            .iter()
            .map(|&point| {
                let node = ScanTaskPoint::new(last, point);
                if !self.dijkstra.is_settled(&node) {
                    return None;
                }
                let settled = self.dijkstra.distance_of(&node)?;
                Some((
                    self.quantizer.longest_units(last, settled),
                    self.dijkstra.path_to(node),
                ))
            })
            .collect())
    }

    /// Pop until the last stage is reached, relaxing edges stage by stage.
    fn search(
        &mut self,
        view: &[&BoundaryPointCollection],
        objective: Objective,
    ) -> Result<RouteSolution, TaskError> {
        let last = view.len() - 1;
        let mut popped = 0usize;
        let mut stage_reached = 0usize;

        while let Some(node) = self.dijkstra.pop() {
            popped += 1;
            stage_reached = stage_reached.max(node.stage);
            if node.stage == last {
                let solution = self.solution(view, node, objective)?;
                debug!(
                    stages = view.len(),
                    popped,
                    units = solution.units,
                    distance_m = solution.distance_m,
                    ?objective,
                    "task route solved"
                );
                return Ok(solution);
            }
            self.add_edges(view, node, objective, objective)?;
        }

        warn!(
            stages = view.len(),
            popped,
            stage_reached,
            ?objective,
            "search frontier exhausted"
        );
        Err(TaskError::NoPath)
    }

    /// Link `origin` to every candidate of the following stage.
    fn add_edges(
        &mut self,
        view: &[&BoundaryPointCollection],
        origin: ScanTaskPoint,
        weights: Objective,
        filter: Objective,
    ) -> Result<(), TaskError> {
        let Some(next) = view.get(origin.stage + 1) else {
            return Ok(());
        };
        let from = location(view, origin)?;
        let longest = weights == Objective::Longest;
        for point in next.candidates(filter) {
            let Some(to) = next.get(point) else {
                continue;
            };
            let weight = self
                .quantizer
                .edge_weight(distance(from, to.location), longest)?;
            self.dijkstra.link(
                ScanTaskPoint::new(origin.stage + 1, point),
                u64::from(weight),
            );
        }
        Ok(())
    }

    fn solution(
        &self,
        view: &[&BoundaryPointCollection],
        end: ScanTaskPoint,
        objective: Objective,
    ) -> Result<RouteSolution, TaskError> {
        let path = self.dijkstra.path_to(end);
        let first_stage = path.first().map(|node| node.stage).unwrap_or(end.stage);
        let legs = path.len().saturating_sub(1);
        let settled = self.dijkstra.distance_of(&end).unwrap_or(0);
        let units = match objective {
            Objective::Shortest => settled,
            Objective::Longest => self.quantizer.longest_units(legs, settled),
        };
        Ok(RouteSolution {
            first_stage,
            points: path.iter().map(|node| node.point).collect(),
            units,
            distance_m: path_distance(view, &path)?,
        })
    }
}

fn boundaries<T: TaskStage>(stages: &[T]) -> Vec<&BoundaryPointCollection> {
    stages.iter().map(TaskStage::boundary).collect()
}

/// One-point stage holding the aircraft fix.
fn fix_stage(fix: GeoPoint, projection: &TaskProjection) -> BoundaryPointCollection {
    let mut stage = BoundaryPointCollection::new();
    stage.add_point(BoundaryPoint::actual(fix, projection));
    stage
}

fn with_stand_in<'a>(
    before: &[&'a BoundaryPointCollection],
    stand_in: &'a BoundaryPointCollection,
    after: &[&'a BoundaryPointCollection],
) -> Vec<&'a BoundaryPointCollection> {
    before
        .iter()
        .copied()
        .chain(std::iter::once(stand_in))
        .chain(after.iter().copied())
        .collect()
}

fn check_index(index: usize, len: usize) -> Result<(), TaskError> {
    if index < len {
        Ok(())
    } else {
        Err(TaskError::IndexOutOfRange { index, len })
    }
}

fn check_stages(view: &[&BoundaryPointCollection]) -> Result<(), TaskError> {
    match view.iter().position(|stage| stage.is_empty()) {
        Some(index) => Err(TaskError::EmptyStage(index)),
        None => Ok(()),
    }
}

fn location(
    view: &[&BoundaryPointCollection],
    node: ScanTaskPoint,
) -> Result<GeoPoint, TaskError> {
    let boundary = view.get(node.stage).ok_or(TaskError::IndexOutOfRange {
        index: node.stage,
        len: view.len(),
    })?;
    boundary
        .get(node.point)
        .map(|point| point.location)
        .ok_or(TaskError::IndexOutOfRange {
            index: node.point,
            len: boundary.len(),
        })
}

fn path_distance(
    view: &[&BoundaryPointCollection],
    path: &[ScanTaskPoint],
) -> Result<f64, TaskError> {
    let mut total = 0.0;
    for leg in path.windows(2) {
        total += distance(location(view, leg[0])?, location(view, leg[1])?);
    }
    Ok(total)
}

fn record_solution<T: TaskStage>(stages: &mut [T], solution: &RouteSolution, objective: Objective) {
    let nodes: Vec<ScanTaskPoint> = solution
        .points
        .iter()
        .enumerate()
        .map(|(offset, &point)| ScanTaskPoint::new(solution.first_stage + offset, point))
        .collect();
    record_nodes(stages, &nodes, Some(objective));
}

/// Record `nodes` as search min or max, or as search achieved for `None`.
fn record_nodes<T: TaskStage>(stages: &mut [T], nodes: &[ScanTaskPoint], objective: Option<Objective>) {
    for node in nodes {
        let Some(stage) = stages.get_mut(node.stage) else {
            break;
        };
        let boundary = stage.boundary_mut();
        match objective {
            Some(Objective::Shortest) => boundary.set_search_min(node.point),
            Some(Objective::Longest) => boundary.set_search_max(node.point),
            None => boundary.set_search_achieved(node.point),
        };
    }
}
