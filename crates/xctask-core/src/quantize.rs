//! Conversion between meters and integer edge weights.

use crate::config::OptimizerConfig;
use crate::error::TaskError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    precision_m: f64,
    leg_limit: u32,
}

impl Quantizer {
    pub fn new(config: &OptimizerConfig) -> Result<Self, TaskError> {
        config.validate()?;
        Ok(Self {
            precision_m: config.precision_m,
            leg_limit: config.leg_limit,
        })
    }

    pub fn precision_m(&self) -> f64 {
        self.precision_m
    }

    pub fn leg_limit(&self) -> u32 {
        self.leg_limit
    }

    /// `round(distance / precision)`; legs beyond the limit are rejected so
    /// longest-search weights can never go negative.
    pub fn quantize(&self, distance_m: f64) -> Result<u32, TaskError> {
        let units = (distance_m.max(0.0) / self.precision_m).round();
        if !units.is_finite() || units > self.leg_limit as f64 {
            return Err(TaskError::QuantizationOverflow {
                distance_m,
                precision_m: self.precision_m,
            });
        }
        Ok(units as u32)
    }

    /// Edge weight for a leg of `distance_m` under the given search direction.
    pub fn edge_weight(&self, distance_m: f64, longest: bool) -> Result<u32, TaskError> {
        let units = self.quantize(distance_m)?;
        Ok(if longest { self.leg_limit - units } else { units })
    }

    /// Recover true quantized length of a longest route with `legs` edges
    /// from its settled (complemented) search distance.
    pub fn longest_units(&self, legs: usize, settled: u64) -> u64 {
        (u64::from(self.leg_limit) * legs as u64).saturating_sub(settled)
    }

    pub fn to_meters(&self, units: u64) -> f64 {
        units as f64 * self.precision_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantizer() -> Quantizer {
        Quantizer::new(&OptimizerConfig::default()).expect("valid")
    }

    #[test]
    fn rounds_to_nearest_unit() {
        let q = quantizer();
        assert_eq!(q.quantize(0.0).ok(), Some(0));
        assert_eq!(q.quantize(14.9).ok(), Some(1));
        assert_eq!(q.quantize(15.0).ok(), Some(2));
        assert_eq!(q.quantize(111_194.9).ok(), Some(11_119));
    }

    #[test]
    fn longest_weights_complement_the_limit() {
        let q = quantizer();
        assert_eq!(q.edge_weight(1_000.0, true).ok(), Some(100_000 - 100));
        assert_eq!(q.edge_weight(1_000.0, false).ok(), Some(100));
        // two legs of 100 units each
        assert_eq!(q.longest_units(2, 2 * (100_000 - 100)), 200);
        assert_eq!(q.to_meters(200), 2_000.0);
    }

    #[test]
    fn overflow_is_an_error() {
        let q = quantizer();
        assert!(q.quantize(1_000_000.0).is_ok());
        assert!(matches!(
            q.quantize(1_000_010.0),
            Err(TaskError::QuantizationOverflow { .. })
        ));
        assert!(q.quantize(f64::INFINITY).is_err());
    }
}
