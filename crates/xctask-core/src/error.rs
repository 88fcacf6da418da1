//! Error type shared by the optimizer and the ordered task.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("stage {0} has no boundary points")]
    EmptyStage(usize),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The search frontier emptied before reaching the final stage.
    #[error("no path found through the task")]
    NoPath,

    #[error("leg of {distance_m:.0} m exceeds quantizer range at {precision_m} m precision")]
    QuantizationOverflow { distance_m: f64, precision_m: f64 },
}
