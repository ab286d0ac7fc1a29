// posekf_core/src/config.rs

use serde::{Deserialize, Serialize};

use crate::models::measurement::position::JacobianPolicy;

/// Static description of a position sensor, as it appears in scenario files.
///
/// ```toml
/// antenna_offset = [-0.01, 0.03]  # body frame: x forward, y left [m]
/// noise_stddev = [0.02, 0.02]     # per world axis [m]
/// jacobian = "analytic"           # or "small_offset_identity"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    /// Sensor position relative to the robot's reference point, body frame.
    #[serde(default = "default_antenna_offset")]
    pub antenna_offset: [f64; 2],
    /// Standard deviation of the position reading on each world axis.
    #[serde(default = "default_noise_stddev")]
    pub noise_stddev: [f64; 2],
    #[serde(default)]
    pub jacobian: JacobianPolicy,
}

// Antenna 1 cm behind and 3 cm left of the reference point.
fn default_antenna_offset() -> [f64; 2] {
    [-0.01, 0.03]
}

fn default_noise_stddev() -> [f64; 2] {
    [0.02, 0.02]
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            antenna_offset: default_antenna_offset(),
            noise_stddev: default_noise_stddev(),
            jacobian: JacobianPolicy::default(),
        }
    }
}
