// posekf_sim/src/simulation/runner.rs

use nalgebra::{Matrix3, Vector3};
use posekf_core::prelude::*;
use posekf_core::state::wrap_angle;
use posekf_core::types::{PoseCovariance, PoseVector};
use rand_distr::{Distribution, Normal};
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::simulation::config::{CovarianceKind, ScenarioConfig};
use crate::simulation::core::motion::{propagate, OdometryInput};
use crate::simulation::core::prng::{SimulationRng, DEFAULT_SEED};
use crate::simulation::core::trajectory::CircleTrajectory;
use crate::simulation::sensors::gps::SimulatedAntenna;

/// Command-line overrides on top of the scenario file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub seed: Option<u64>,
    pub steps: Option<usize>,
}

/// Aggregate results of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub seed: u64,
    pub steps: usize,
    pub accepted_updates: usize,
    pub rejected_updates: usize,
    /// Root-mean-square error of the estimated reference point [m].
    pub rmse_position: f64,
    /// Estimated minus true heading at the end of the run, wrapped [rad].
    pub final_heading_error: f64,
    /// Mean of the squared Mahalanobis distance of accepted innovations.
    /// Close to 2 for a consistent filter.
    pub mean_mahalanobis_squared: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed:                  {}", self.seed)?;
        writeln!(f, "steps:                 {}", self.steps)?;
        writeln!(
            f,
            "updates:               {} accepted, {} rejected",
            self.accepted_updates, self.rejected_updates
        )?;
        writeln!(f, "position RMSE [m]:     {:.4}", self.rmse_position)?;
        writeln!(f, "final heading err [°]: {:.3}", self.final_heading_error.to_degrees())?;
        write!(f, "mean NIS:              {:.3}", self.mean_mahalanobis_squared)
    }
}

/// Runs the scenario with the covariance representation it asks for.
pub fn run_scenario(config: &ScenarioConfig, options: &RunOptions) -> Result<RunSummary, SimError> {
    match config.filter.covariance {
        CovarianceKind::Standard => {
            run_with::<StandardBase<f64, 3>, StandardBase<f64, 2>>(config, options)
        }
        CovarianceKind::SquareRoot => {
            run_with::<SquareRootBase<f64, 3>, SquareRootBase<f64, 2>>(config, options)
        }
    }
}

/// The simulation loop for one filter variant.
///
/// Every step: advance ground truth, predict with noisy odometry, linearize the
/// antenna model at the predicted estimate and fuse the noisy reading.
pub fn run_with<CS, CM>(config: &ScenarioConfig, options: &RunOptions) -> Result<RunSummary, SimError>
where
    CS: CovarianceBase<f64, 3>,
    CM: CovarianceBase<f64, 2>,
{
    let seed = options
        .seed
        .or(config.simulation.seed)
        .unwrap_or(DEFAULT_SEED);
    let mut rng = SimulationRng::from_seed(seed);

    let dt = 1.0 / config.simulation.rate_hz;
    let steps = options
        .steps
        .unwrap_or_else(|| (config.simulation.duration_seconds * config.simulation.rate_hz).round() as usize);

    let trajectory = CircleTrajectory::new(&config.trajectory);
    let antenna = SimulatedAntenna::from_config(&config.sensor)?;
    let mut model = PositionMeasurementModel::<f64, CM>::from_config(&config.sensor)?;

    let speed_noise = Normal::new(0.0, config.odometry.speed_stddev)?;
    let yaw_rate_noise = Normal::new(0.0, config.odometry.yaw_rate_stddev)?;

    // --- Filter initialization ---
    let x0: PoseVector = match config.filter.initial_state {
        Some(x) => Vector3::from(x),
        None => trajectory.pose_at(0.0).into_vector(),
    };
    let p0: PoseCovariance = Matrix3::from_diagonal(&Vector3::from(config.filter.initial_stddev).map(|s| s * s));
    let q = Matrix3::from_diagonal(&Vector3::from(config.filter.process_noise_stddev).map(|s| s * s * dt));
    let mut filter = ExtendedKalmanFilter::<f64, 3, CS>::from_covariance(x0, p0)?;

    info!(
        seed,
        steps,
        rate_hz = config.simulation.rate_hz,
        jacobian = ?model.jacobian_policy(),
        covariance = ?config.filter.covariance,
        "Starting simulation"
    );

    let (true_speed, true_yaw_rate) = trajectory.body_velocity();
    let mut squared_position_error = 0.0;
    let mut mahalanobis_sum = 0.0;
    let mut accepted = 0;
    let mut rejected = 0;
    let mut last_heading_error = 0.0;
    let log_every = (config.simulation.rate_hz.round() as usize).max(1) * 10;

    for k in 1..=steps {
        let t = k as f64 * dt;
        let truth = trajectory.pose_at(t);

        // 1. PREDICT: dead-reckon with the noisy, biased odometry.
        let odometry = OdometryInput {
            speed: true_speed + speed_noise.sample(&mut rng.0),
            yaw_rate: true_yaw_rate + config.odometry.yaw_rate_bias + yaw_rate_noise.sample(&mut rng.0),
        };
        let (x_pred, f_jac) = propagate(&filter.state_as(), &odometry, dt);
        filter.predict(x_pred.into_vector(), &f_jac, &q)?;

        // 2. UPDATE: fuse the antenna reading, linearized at the prediction.
        let z = antenna.sample(&truth, &mut rng.0);
        match filter.correct(&mut model, &z) {
            Ok(report) => {
                accepted += 1;
                mahalanobis_sum += report.mahalanobis_squared;
            }
            Err(err @ EstimationError::SingularInnovation) => {
                rejected += 1;
                warn!(step = k, error = %err, "Measurement rejected");
            }
            Err(err) => return Err(err.into()),
        }

        // 3. Score against ground truth.
        let estimate: PoseState<f64> = filter.state_as();
        let dx = estimate.x_pos() - truth.x_pos();
        let dy = estimate.y_pos() - truth.y_pos();
        squared_position_error += dx * dx + dy * dy;
        last_heading_error = wrap_angle(estimate.theta() - truth.theta());

        if k % log_every == 0 {
            debug!(
                t,
                position_error = (dx * dx + dy * dy).sqrt(),
                heading_error = last_heading_error,
                "Filter progress"
            );
        }
    }

    let summary = RunSummary {
        seed,
        steps,
        accepted_updates: accepted,
        rejected_updates: rejected,
        rmse_position: if steps > 0 {
            (squared_position_error / steps as f64).sqrt()
        } else {
            0.0
        },
        final_heading_error: last_heading_error,
        mean_mahalanobis_squared: if accepted > 0 {
            mahalanobis_sum / accepted as f64
        } else {
            0.0
        },
    };
    info!(
        rmse_position = summary.rmse_position,
        final_heading_error = summary.final_heading_error,
        "Simulation complete"
    );
    Ok(summary)
}
