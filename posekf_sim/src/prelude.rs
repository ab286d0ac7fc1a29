// posekf_sim/src/prelude.rs

// Re-export the entire posekf_core prelude so you can easily access
// pure types like `PoseState`, `PositionMeasurementModel`, etc.
pub use posekf_core::prelude::*;

// Re-export common simulation-specific types for easy access.
pub use crate::error::{ConfigError, SimError};
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{load_scenario, load_scenario_str};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::runner::{run_scenario, RunOptions, RunSummary};
pub use crate::simulation::sensors::gps::SimulatedAntenna;
