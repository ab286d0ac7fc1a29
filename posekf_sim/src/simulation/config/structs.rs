// posekf_sim/src/simulation/config/structs.rs

use posekf_core::config::SensorConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// Everything needed for one simulation run.
/// This struct is the root of the data parsed from a scenario `.toml` file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub trajectory: Trajectory,

    #[serde(default)]
    pub odometry: Odometry,

    #[serde(default)]
    pub sensor: SensorConfig,

    #[serde(default)]
    pub filter: Filter,
}

impl ScenarioConfig {
    /// Rejects values that would make the run meaningless or the noise
    /// distributions invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }
        fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be non-negative, got {value}")))
            }
        }

        positive("simulation.duration_seconds", self.simulation.duration_seconds)?;
        positive("simulation.rate_hz", self.simulation.rate_hz)?;
        non_negative("trajectory.radius", self.trajectory.radius)?;
        non_negative("odometry.speed_stddev", self.odometry.speed_stddev)?;
        non_negative("odometry.yaw_rate_stddev", self.odometry.yaw_rate_stddev)?;
        for sigma in self.sensor.noise_stddev {
            positive("sensor.noise_stddev", sigma)?;
        }
        for sigma in self.filter.initial_stddev {
            positive("filter.initial_stddev", sigma)?;
        }
        for sigma in self.filter.process_noise_stddev {
            positive("filter.process_noise_stddev", sigma)?;
        }
        Ok(())
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in the scenario file.
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Duration of the simulation in seconds.
    pub duration_seconds: f64,
    /// Rate of odometry and position readings.
    pub rate_hz: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 60.0,
            rate_hz: 10.0,
        }
    }
}

/// Ground truth: the robot drives a circle at constant angular rate, facing
/// along the direction of travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Trajectory {
    pub center: [f64; 2],
    pub radius: f64,
    /// Rate at which the robot goes around the circle [rad/s]. Negative is clockwise.
    pub angular_rate: f64,
    /// Angle on the circle at t = 0 [rad].
    pub initial_phase: f64,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            radius: 2.0,
            angular_rate: 0.2,
            initial_phase: 0.0,
        }
    }
}

/// Noise on the wheel odometry that drives the prediction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Odometry {
    pub speed_stddev: f64,
    pub yaw_rate_stddev: f64,
    /// Constant gyro bias [rad/s], so heading drifts without corrections.
    pub yaw_rate_bias: f64,
}

impl Default for Odometry {
    fn default() -> Self {
        Self {
            speed_stddev: 0.02,
            yaw_rate_stddev: 0.01,
            yaw_rate_bias: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceKind {
    #[default]
    Standard,
    SquareRoot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Filter {
    /// `[x, y, theta]`. Defaults to the true pose at t = 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<[f64; 3]>,
    pub initial_stddev: [f64; 3],
    /// Process noise per sqrt(second), on `[x, y, theta]`.
    pub process_noise_stddev: [f64; 3],
    pub covariance: CovarianceKind,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            initial_state: None,
            initial_stddev: [0.5, 0.5, 0.3],
            process_noise_stddev: [0.02, 0.02, 0.02],
            covariance: CovarianceKind::Standard,
        }
    }
}
