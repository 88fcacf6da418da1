//! Task distance report shared by the text and JSON outputs.

use crate::config::Config;
use crate::scenarios::Scenario;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fmt;
use xctask_core::{AchievedDistance, GeoPoint, Objective, Task, TaskStage};

/// Aircraft position on a given active turnpoint.
#[derive(Debug, Clone, Copy)]
pub struct Fix {
    pub active: usize,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnpointReport {
    pub name: String,
    pub reference: GeoPoint,
    pub samples: usize,
    /// Point on the shortest route
    pub min_point: Option<GeoPoint>,
    /// Point on the longest route
    pub max_point: Option<GeoPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievedReport {
    pub active: usize,
    pub location: GeoPoint,
    pub shortest: AchievedDistance,
    pub longest: AchievedDistance,
    pub travelled_m: f64,
    pub remaining_m: f64,
    pub planned_m: f64,
    pub scored_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub scenario: String,
    pub precision_m: f64,
    pub nominal_m: f64,
    pub min_m: f64,
    pub max_m: f64,
    pub turnpoints: Vec<TurnpointReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved: Option<AchievedReport>,
}

/// Build the task for `scenario` and run every distance scan on it.
pub fn build_report(scenario: Scenario, config: &Config, fix: Option<Fix>) -> Result<TaskReport> {
    let mut task = Task::new(scenario.points, config.task_config())
        .with_context(|| format!("building task '{}'", scenario.name))?;

    let nominal_m = task.scan_distance_nominal();
    let min_m = task.scan_distance_min().context("shortest route search")?;
    let max_m = task.scan_distance_max().context("longest route search")?;

    // snapshot the full-task picks before the achieved searches overwrite them
    let turnpoints = task
        .points()
        .iter()
        .map(|point| {
            let boundary = point.boundary();
            TurnpointReport {
                name: point.name.clone(),
                reference: point.location(),
                samples: boundary.len(),
                min_point: boundary.search_min().map(|p| p.location),
                max_point: boundary.search_max().map(|p| p.location),
            }
        })
        .collect();

    let achieved = match fix {
        Some(fix) => {
            if fix.active >= task.len() {
                bail!(
                    "active turnpoint {} out of range, task has {}",
                    fix.active,
                    task.len()
                );
            }
            task.set_active_index(fix.active)?;
            let shortest = task.scan_distance_achieved(fix.location, Objective::Shortest)?;
            let longest = task.scan_distance_achieved(fix.location, Objective::Longest)?;
            let travelled_m = task
                .scan_distance_travelled(fix.location)
                .context("travelled distance search")?;
            let remaining_m = task
                .scan_distance_remaining(fix.location)
                .context("remaining distance search")?;
            let planned_m = task.scan_distance_planned();
            let scored_m = task.scan_distance_scored(fix.location)?;
            Some(AchievedReport {
                active: fix.active,
                location: fix.location,
                shortest,
                longest,
                travelled_m,
                remaining_m,
                planned_m,
                scored_m,
            })
        }
        None => None,
    };

    tracing::info!(
        scenario = %scenario.name,
        nominal_m,
        min_m,
        max_m,
        "task distances computed"
    );

    Ok(TaskReport {
        scenario: scenario.name,
        precision_m: config.precision_m,
        nominal_m,
        min_m,
        max_m,
        turnpoints,
        achieved,
    })
}

fn km(meters: f64) -> f64 {
    meters / 1_000.0
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Task '{}' ({} m precision)", self.scenario, self.precision_m)?;
        for (i, tp) in self.turnpoints.iter().enumerate() {
            writeln!(
                f,
                "  {i}. {:<8} {:>9.5} {:>10.5}  {} samples",
                tp.name, tp.reference.lat, tp.reference.lon, tp.samples
            )?;
        }
        writeln!(f, "Nominal:  {:>9.2} km", km(self.nominal_m))?;
        writeln!(f, "Minimum:  {:>9.2} km", km(self.min_m))?;
        writeln!(f, "Maximum:  {:>9.2} km", km(self.max_m))?;
        if let Some(achieved) = &self.achieved {
            writeln!(
                f,
                "Aircraft at {:.5}, {:.5} on turnpoint {}",
                achieved.location.lat, achieved.location.lon, achieved.active
            )?;
            for (label, d) in [("shortest", &achieved.shortest), ("longest", &achieved.longest)] {
                writeln!(
                    f,
                    "  {label:<8} total {:>9.2} km, achieved {:>9.2} km, remaining {:>9.2} km",
                    km(d.total_m),
                    km(d.achieved_m),
                    km(d.remaining_m)
                )?;
            }
            writeln!(
                f,
                "  flown    travelled {:>9.2} km, remaining {:>9.2} km, planned {:>9.2} km, scored {:>9.2} km",
                km(achieved.travelled_m),
                km(achieved.remaining_m),
                km(achieved.planned_m),
                km(achieved.scored_m)
            )?;
        }
        Ok(())
    }
}
