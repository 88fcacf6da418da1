//! CLI configuration from environment.

use std::env;
use xctask_core::{OptimizerConfig, SamplingConfig, TaskConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub precision_m: f64,
    pub arc_points: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TaskConfig::default();
        Self {
            precision_m: lookup("XCTASK_PRECISION_M")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.optimizer.precision_m),
            arc_points: lookup("XCTASK_ARC_POINTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sampling.arc_points),
        }
    }

    pub fn task_config(&self) -> TaskConfig {
        TaskConfig {
            optimizer: OptimizerConfig {
                precision_m: self.precision_m,
                ..OptimizerConfig::default()
            },
            sampling: SamplingConfig {
                arc_points: self.arc_points,
                ..SamplingConfig::default()
            },
            ..TaskConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.precision_m, 10.0);
        assert_eq!(config.arc_points, 36);
    }

    #[test]
    fn test_reads_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("XCTASK_PRECISION_M", "25"),
            ("XCTASK_ARC_POINTS", "many"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.precision_m, 25.0);
        assert_eq!(config.arc_points, 36);
        assert_eq!(config.task_config().optimizer.precision_m, 25.0);
    }
}
