// posekf_core/src/models/measurement/position.rs

use nalgebra::{DMatrix, DVector, Matrix2, Matrix2x3, RealField, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::SensorConfig;
use crate::error::EstimationError;
use crate::estimation::covariance::{CovarianceBase, StandardBase};
use crate::models::measurement::{LinearizedMeasurementModel, Measurement};
use crate::state::PoseState;
use crate::types::{MeasurementAxis, PositionCovariance, PositionJacobian};

crate::named_vector! {
    /// World-frame position reported by the sensor (a GPS antenna, a beacon
    /// tracker, ...).
    PositionMeasurement, 2, {
        /// X position of the sensor.
        x_pos, x_pos_mut, X = 0,
        /// Y position of the sensor.
        y_pos, y_pos_mut, Y = 1,
    }
}

/// Which `H` the model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JacobianPolicy {
    /// All partials of `h`, including the heading column from the rotated
    /// lever arm.
    #[default]
    Analytic,
    /// `H = [I₂ | 0]`: the sensor is treated as sitting on the reference point
    /// for linearization purposes, while `h` still applies the offset. Only
    /// reasonable when the lever arm is small compared to the position noise.
    SmallOffsetIdentity,
}

/// Measurement model for a position sensor mounted at a fixed offset from the
/// robot's reference point.
///
/// The offset is given in the body frame (x forward, y left). The sensor
/// reports where it is in the world, which depends on the heading:
///
/// ```text
/// x_pos = x + cos(θ)·offset_x − sin(θ)·offset_y
/// y_pos = y + sin(θ)·offset_x + cos(θ)·offset_y
/// ```
///
/// `C` selects how the measurement noise covariance is stored, see
/// [`CovarianceBase`].
#[derive(Debug, Clone)]
pub struct PositionMeasurementModel<T, C = StandardBase<T, 2>> {
    offset_x: T,
    offset_y: T,
    policy: JacobianPolicy,
    h: Matrix2x3<T>,
    // Noise enters additively on each axis, so V stays the identity.
    v: Matrix2<T>,
    noise: C,
    linearized_at: Option<PoseState<T>>,
}

impl<T: RealField + Copy, C: CovarianceBase<T, 2>> PositionMeasurementModel<T, C> {
    /// Creates a model for a sensor at `(offset_x, offset_y)` in the body frame,
    /// with unit measurement noise and analytic linearization.
    pub fn new(offset_x: T, offset_y: T) -> Self {
        Self {
            offset_x,
            offset_y,
            policy: JacobianPolicy::default(),
            h: Matrix2x3::zeros(),
            v: Matrix2::identity(),
            noise: C::default(),
            linearized_at: None,
        }
    }

    /// Builds the model from configuration, including the noise covariance
    /// `R = diag(σx², σy²)`.
    pub fn from_config(config: &SensorConfig) -> Result<Self, EstimationError> {
        let [offset_x, offset_y] = config.antenna_offset;
        if !offset_x.is_finite() || !offset_y.is_finite() {
            return Err(EstimationError::NonFiniteOffset {
                x: offset_x,
                y: offset_y,
            });
        }
        for sigma in config.noise_stddev {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(EstimationError::InvalidNoise(sigma));
            }
        }

        let r = Matrix2::from_diagonal(&Vector2::new(
            nalgebra::convert::<f64, T>(config.noise_stddev[0].powi(2)),
            nalgebra::convert::<f64, T>(config.noise_stddev[1].powi(2)),
        ));

        let mut model = Self::new(nalgebra::convert(offset_x), nalgebra::convert(offset_y))
            .with_jacobian_policy(config.jacobian);
        model.noise.set_covariance(r)?;
        Ok(model)
    }

    pub fn with_jacobian_policy(mut self, policy: JacobianPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn jacobian_policy(&self) -> JacobianPolicy {
        self.policy
    }

    /// Sensor position relative to the reference point, in the body frame.
    pub fn offset(&self) -> Vector2<T> {
        Vector2::new(self.offset_x, self.offset_y)
    }

    /// The body-frame offset rotated into the world frame for heading `theta`.
    pub fn offset_world(&self, theta: T) -> Vector2<T> {
        Rotation2::new(theta) * self.offset()
    }

    /// `∂h/∂x` at `x` under the configured policy, without touching the stored `H`.
    pub fn jacobian_at(&self, x: &PoseState<T>) -> Matrix2x3<T> {
        let mut jac = Matrix2x3::identity();
        if self.policy == JacobianPolicy::Analytic {
            let (s, c) = x.theta().sin_cos();
            jac[(0, 2)] = -s * self.offset_x - c * self.offset_y;
            jac[(1, 2)] = c * self.offset_x - s * self.offset_y;
        }
        jac
    }
}

impl<T: RealField + Copy, C: CovarianceBase<T, 2>> LinearizedMeasurementModel<T, 3, 2>
    for PositionMeasurementModel<T, C>
{
    type State = PoseState<T>;
    type Measurement = PositionMeasurement<T>;
    type Noise = C;

    fn h(&self, x: &PoseState<T>) -> PositionMeasurement<T> {
        let (s, c) = x.theta().sin_cos();
        let mut measurement = PositionMeasurement::zeros();

        // Rotate the lever arm by the heading and add it to the reference point.
        *measurement.x_pos_mut() = x.x_pos() + c * self.offset_x - s * self.offset_y;
        *measurement.y_pos_mut() = x.y_pos() + s * self.offset_x + c * self.offset_y;

        measurement
    }

    fn update_jacobians(&mut self, x: &PoseState<T>) {
        self.h = self.jacobian_at(x);
        self.linearized_at = Some(*x);
    }

    fn h_jacobian(&self) -> &Matrix2x3<T> {
        &self.h
    }

    fn v_jacobian(&self) -> &Matrix2<T> {
        &self.v
    }

    fn linearization_point(&self) -> Option<&PoseState<T>> {
        self.linearized_at.as_ref()
    }

    fn noise(&self) -> &C {
        &self.noise
    }

    fn noise_mut(&mut self) -> &mut C {
        &mut self.noise
    }
}

impl<C> Measurement for PositionMeasurementModel<f64, C>
where
    C: CovarianceBase<f64, 2> + Send + Sync + 'static,
{
    fn get_measurement_layout(&self) -> Vec<MeasurementAxis> {
        vec![MeasurementAxis::WorldX, MeasurementAxis::WorldY]
    }

    fn get_r(&self) -> DMatrix<f64> {
        let r: PositionCovariance = self.noise.covariance();
        DMatrix::from_column_slice(2, 2, r.as_slice())
    }

    fn predict_measurement(&self, state: &PoseState<f64>) -> DVector<f64> {
        DVector::from_column_slice(self.h(state).as_slice())
    }

    fn calculate_jacobian(&self, state: &PoseState<f64>) -> DMatrix<f64> {
        let jac: PositionJacobian = self.jacobian_at(state);
        DMatrix::from_column_slice(2, 3, jac.as_slice())
    }
}
