// posekf_sim/src/simulation/sensors/gps.rs

use posekf_core::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::error::SimError;

/// A simulated GPS antenna rigidly attached to the robot.
///
/// The true antenna position comes from a measurement model evaluated on the
/// ground-truth pose; Gaussian noise is added per world axis.
#[derive(Debug, Clone)]
pub struct SimulatedAntenna {
    // The physics of the sensor, shared with nothing else.
    model: Box<dyn Measurement>,
    // Store the noise distributions for efficiency
    noise: [Normal<f64>; 2],
}

impl SimulatedAntenna {
    /// Fails if either standard deviation is negative or not finite.
    pub fn new(model: Box<dyn Measurement>, noise_stddev: [f64; 2]) -> Result<Self, SimError> {
        for sigma in noise_stddev {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(EstimationError::InvalidNoise(sigma).into());
            }
        }
        Ok(Self {
            model,
            noise: [
                Normal::new(0.0, noise_stddev[0])?,
                Normal::new(0.0, noise_stddev[1])?,
            ],
        })
    }

    /// Builds the antenna described by `config`, using the same lever arm the
    /// filter is told about.
    pub fn from_config(config: &SensorConfig) -> Result<Self, SimError> {
        let model = PositionMeasurementModel::<f64>::from_config(config)?;
        let axes: Vec<&str> = model.get_measurement_layout().iter().map(|a| a.label()).collect();
        info!(
            "  -> Simulating antenna at body offset {:?}, axes {:?}, noise {:?}",
            config.antenna_offset, axes, config.noise_stddev
        );
        Self::new(Box::new(model), config.noise_stddev)
    }

    /// The noise-free reading for `truth`.
    pub fn true_reading(&self, truth: &PoseState<f64>) -> PositionMeasurement<f64> {
        let z = self.model.predict_measurement(truth);
        let mut reading = PositionMeasurement::zeros();
        *reading.x_pos_mut() = z[0];
        *reading.y_pos_mut() = z[1];
        reading
    }

    /// A noisy reading for `truth`.
    pub fn sample<R: Rng + ?Sized>(&self, truth: &PoseState<f64>, rng: &mut R) -> PositionMeasurement<f64> {
        let mut reading = self.true_reading(truth);
        *reading.x_pos_mut() += self.noise[0].sample(rng);
        *reading.y_pos_mut() += self.noise[1].sample(rng);
        reading
    }
}
