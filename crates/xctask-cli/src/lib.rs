//! xctask CLI - Command line tools for task distance optimization.
//!
//! This crate provides the `task_distance` binary, which builds a task from
//! a built-in scenario, runs the optimizer and prints a report.

pub mod config;
pub mod report;
pub mod scenarios;

pub use config::Config;
pub use report::{build_report, Fix, TaskReport};
pub use scenarios::{scenario_by_name, Scenario, SCENARIO_NAMES};
