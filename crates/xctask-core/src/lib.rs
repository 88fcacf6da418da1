pub mod boundary;
pub mod config;
pub mod dijkstra;
pub mod error;
pub mod optimizer;
pub mod projection;
pub mod quantize;
pub mod spatial;
pub mod task;
pub mod zone;

pub use boundary::{BoundaryPoint, BoundaryPointCollection, Objective};
pub use config::{OptimizerConfig, SamplingConfig, TaskConfig, MAX_LEG_LIMIT};
pub use dijkstra::Dijkstra;
pub use error::TaskError;
pub use optimizer::{AchievedDistance, RouteSolution, ScanTaskPoint, TaskOptimizer, TaskStage};
pub use projection::{FlatPoint, TaskProjection};
pub use quantize::Quantizer;
pub use spatial::{bearing, distance, find_location, intermediate_point, GeoPoint};
pub use task::{DistanceRange, Task, TaskPoint};
pub use zone::{ObservationZone, Zone, ZoneShape};
