//! Tunables for zone sampling and route optimization.

use crate::error::TaskError;
use serde::{Deserialize, Serialize};

/// Largest accepted `leg_limit`; keeps complemented route sums far inside `u64`.
pub const MAX_LEG_LIMIT: u32 = 1 << 24;

/// Configuration for the integer search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Meters represented by one unit of edge weight
    pub precision_m: f64,
    /// Upper bound on a single quantized leg; longest searches complement
    /// edge weights against it
    pub leg_limit: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            precision_m: 10.0,
            // 1000 km per leg at the default precision
            leg_limit: 100_000,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), TaskError> {
        if !self.precision_m.is_finite() || self.precision_m <= 0.0 {
            return Err(TaskError::InvalidConfig(format!(
                "precision_m must be positive, got {}",
                self.precision_m
            )));
        }
        if self.leg_limit == 0 || self.leg_limit > MAX_LEG_LIMIT {
            return Err(TaskError::InvalidConfig(format!(
                "leg_limit must be in 1..={MAX_LEG_LIMIT}, got {}",
                self.leg_limit
            )));
        }
        Ok(())
    }
}

/// How densely observation zone boundaries are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Samples on a full circle; arcs get a proportional share
    pub arc_points: usize,
    /// Samples along a line zone, endpoints included
    pub line_points: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            arc_points: 36,
            line_points: 5,
        }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.arc_points < 3 {
            return Err(TaskError::InvalidConfig(format!(
                "arc_points must be at least 3, got {}",
                self.arc_points
            )));
        }
        if self.line_points < 2 {
            return Err(TaskError::InvalidConfig(format!(
                "line_points must be at least 2, got {}",
                self.line_points
            )));
        }
        Ok(())
    }
}

/// Everything an ordered task needs besides its turnpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub optimizer: OptimizerConfig,
    pub sampling: SamplingConfig,
    /// Aircraft movement in meters below which the cached minimum distance is reused
    pub significance_m: f64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            sampling: SamplingConfig::default(),
            significance_m: 1.0,
        }
    }
}

impl TaskConfig {
    pub fn validate(&self) -> Result<(), TaskError> {
        self.optimizer.validate()?;
        self.sampling.validate()?;
        if !self.significance_m.is_finite() || self.significance_m < 0.0 {
            return Err(TaskError::InvalidConfig(format!(
                "significance_m must be non-negative, got {}",
                self.significance_m
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TaskConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unbounded_leg_limit() {
        for leg_limit in [0, MAX_LEG_LIMIT + 1, u32::MAX] {
            let config = OptimizerConfig {
                leg_limit,
                ..OptimizerConfig::default()
            };
            assert!(matches!(config.validate(), Err(TaskError::InvalidConfig(_))));
        }
        let widest = OptimizerConfig {
            leg_limit: MAX_LEG_LIMIT,
            ..OptimizerConfig::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn rejects_bad_precision() {
        let config = OptimizerConfig {
            precision_m: 0.0,
            ..OptimizerConfig::default()
        };
        assert!(matches!(config.validate(), Err(TaskError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: TaskConfig =
            serde_json::from_str(r#"{"optimizer": {"precision_m": 25.0}}"#).expect("parse");
        assert_eq!(config.optimizer.precision_m, 25.0);
        assert_eq!(config.optimizer.leg_limit, 100_000);
        assert_eq!(config.sampling, SamplingConfig::default());
    }
}
