// posekf_core/src/estimation/filters/ekf.rs

use nalgebra::{RealField, SMatrix, SVector};
use tracing::{debug, trace, warn};

use crate::error::EstimationError;
use crate::estimation::covariance::CovarianceBase;
use crate::models::measurement::LinearizedMeasurementModel;
use crate::vectors::NamedVector;

/// What a successful measurement update did.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport<T, const M: usize> {
    /// `z - h(x)` before the correction.
    pub innovation: SVector<T, M>,
    /// `S = H P H^T + V R V^T`.
    pub innovation_covariance: SMatrix<T, M, M>,
    /// `y^T S^-1 y`, useful for gating.
    pub mahalanobis_squared: T,
}

/// A concrete implementation of an Extended Kalman Filter.
///
/// The state is a raw `S`-vector; its covariance is stored in whatever
/// representation `C` provides. The filter only owns the bookkeeping: process
/// models are supplied by the caller through [`predict`](Self::predict), and
/// measurement models through [`LinearizedMeasurementModel`].
#[derive(Debug, Clone)]
pub struct ExtendedKalmanFilter<T, const S: usize, C> {
    x: SVector<T, S>,
    covariance: C,
}

impl<T: RealField + Copy, const S: usize, C: CovarianceBase<T, S>> ExtendedKalmanFilter<T, S, C> {
    /// Creates a new EKF instance.
    pub fn new(x: SVector<T, S>, covariance: C) -> Self {
        Self { x, covariance }
    }

    pub fn from_covariance(x: SVector<T, S>, p: SMatrix<T, S, S>) -> Result<Self, EstimationError> {
        Ok(Self::new(x, C::from_covariance(p)?))
    }

    pub fn state(&self) -> &SVector<T, S> {
        &self.x
    }

    /// The state as a named vector, e.g. `filter.state_as::<PoseState<f64>>()`.
    pub fn state_as<V: NamedVector<T, S>>(&self) -> V {
        V::from_vector(self.x)
    }

    pub fn set_state(&mut self, x: SVector<T, S>) {
        self.x = x;
    }

    pub fn covariance(&self) -> SMatrix<T, S, S> {
        self.covariance.covariance()
    }

    pub fn covariance_base(&self) -> &C {
        &self.covariance
    }

    /// Time update with an externally computed prediction.
    ///
    /// `x_pred` is the propagated state, `f_jacobian` the process Jacobian at
    /// the previous estimate, `process_noise` the (already time-scaled) `Q`.
    /// On error the filter is left untouched.
    pub fn predict(
        &mut self,
        x_pred: SVector<T, S>,
        f_jacobian: &SMatrix<T, S, S>,
        process_noise: &SMatrix<T, S, S>,
    ) -> Result<(), EstimationError> {
        let p = self.covariance.covariance();
        let p_pred = f_jacobian * p * f_jacobian.transpose() + process_noise;
        self.covariance.set_covariance(symmetrize(p_pred))?;
        self.x = x_pred;
        trace!(state = ?self.x, "ekf predict");
        Ok(())
    }

    /// Fuses the measurement `z` using `model`'s current linearization.
    ///
    /// The model must have been linearized at exactly the current estimate,
    /// otherwise this fails with [`EstimationError::StaleJacobian`] (or
    /// [`EstimationError::NotLinearized`]). A singular innovation covariance
    /// rejects the measurement. In every error case the estimate is unchanged.
    pub fn update<Model, const M: usize>(
        &mut self,
        model: &Model,
        z: &Model::Measurement,
    ) -> Result<UpdateReport<T, M>, EstimationError>
    where
        Model: LinearizedMeasurementModel<T, S, M>,
    {
        let current = Model::State::from_vector(self.x);
        let lin = model.linearization(&current)?;
        let h = lin.h;
        let r = model.innovation_noise();
        let p = self.covariance.covariance();

        // 1. Innovation and its covariance.
        let y = z.as_vector() - lin.predicted;
        let s = h * p * h.transpose() + r;
        let s_inv = match s.try_inverse() {
            Some(inv) => inv,
            None => {
                warn!(innovation = ?y, "innovation covariance is singular, skipping update");
                return Err(EstimationError::SingularInnovation);
            }
        };

        // 2. Kalman gain.
        let k = p * h.transpose() * s_inv;

        // 3. Joseph-form covariance update, which stays symmetric positive
        //    semi-definite even when K is not the optimal gain.
        let i_kh = SMatrix::<T, S, S>::identity() - k * h;
        let p_new = i_kh * p * i_kh.transpose() + k * r * k.transpose();
        self.covariance.set_covariance(symmetrize(p_new))?;
        self.x += k * y;

        let mahalanobis_squared = (y.transpose() * s_inv * y)[(0, 0)];
        debug!(innovation = ?y, mahalanobis_squared = ?mahalanobis_squared, "ekf update");

        Ok(UpdateReport {
            innovation: y,
            innovation_covariance: s,
            mahalanobis_squared,
        })
    }

    /// Linearizes `model` at the current estimate, then runs [`update`](Self::update).
    pub fn correct<Model, const M: usize>(
        &mut self,
        model: &mut Model,
        z: &Model::Measurement,
    ) -> Result<UpdateReport<T, M>, EstimationError>
    where
        Model: LinearizedMeasurementModel<T, S, M>,
    {
        model.update_jacobians(&Model::State::from_vector(self.x));
        self.update(model, z)
    }
}

fn symmetrize<T: RealField + Copy, const S: usize>(m: SMatrix<T, S, S>) -> SMatrix<T, S, S> {
    (m + m.transpose()) * nalgebra::convert::<f64, T>(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::covariance::{SquareRootBase, StandardBase};
    use crate::models::measurement::position::{
        JacobianPolicy, PositionMeasurement, PositionMeasurementModel,
    };
    use crate::state::PoseState;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{Matrix2, Matrix3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    type Filter<C> = ExtendedKalmanFilter<f64, 3, C>;

    fn model<C: CovarianceBase<f64, 2>>(offset_x: f64, offset_y: f64, sigma: f64) -> PositionMeasurementModel<f64, C> {
        let mut model: PositionMeasurementModel<f64, C> = PositionMeasurementModel::new(offset_x, offset_y);
        model
            .noise_mut()
            .set_covariance(Matrix2::identity() * sigma * sigma)
            .unwrap();
        model
    }

    fn reading(x: f64, y: f64) -> PositionMeasurement<f64> {
        PositionMeasurement::from_slice(&[x, y]).unwrap()
    }

    #[test]
    fn predict_adds_process_noise() {
        let mut filter = Filter::<StandardBase<f64, 3>>::new(Vector3::zeros(), StandardBase::default());
        let q = Matrix3::from_diagonal(&Vector3::new(0.1, 0.2, 0.3));
        filter
            .predict(Vector3::new(1.0, 0.0, 0.0), &Matrix3::identity(), &q)
            .unwrap();
        assert_eq!(filter.state(), &Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(filter.covariance(), Matrix3::identity() + q, epsilon = 1e-12);
    }

    #[test]
    fn update_pulls_position_toward_reading() {
        let mut filter = Filter::<StandardBase<f64, 3>>::new(Vector3::zeros(), StandardBase::default());
        let mut m = model::<StandardBase<f64, 2>>(0.0, 0.0, 1.0);

        let report = filter.correct(&mut m, &reading(2.0, -2.0)).unwrap();

        // Equal prior and measurement variance: the estimate lands halfway.
        let pose: PoseState<f64> = filter.state_as();
        assert_relative_eq!(pose.x_pos(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pose.y_pos(), -1.0, epsilon = 1e-12);
        assert_eq!(pose.theta(), 0.0);
        assert_relative_eq!(filter.covariance()[(0, 0)], 0.5, epsilon = 1e-12);
        assert_relative_eq!(report.mahalanobis_squared, 4.0, epsilon = 1e-12);
        assert_eq!(report.innovation, nalgebra::Vector2::new(2.0, -2.0));
    }

    #[test]
    fn update_refuses_stale_linearization() {
        let mut filter = Filter::<StandardBase<f64, 3>>::new(Vector3::new(0.0, 0.0, 0.5), StandardBase::default());
        let mut m = model::<StandardBase<f64, 2>>(0.2, 0.0, 0.1);

        assert_eq!(
            filter.update(&m, &reading(0.0, 0.0)).unwrap_err(),
            EstimationError::NotLinearized
        );

        m.update_jacobians(&PoseState::new(0.0, 0.0, 0.0));
        assert_eq!(
            filter.update(&m, &reading(0.0, 0.0)).unwrap_err(),
            EstimationError::StaleJacobian
        );
        assert_eq!(filter.state(), &Vector3::new(0.0, 0.0, 0.5));
        assert_eq!(filter.covariance(), Matrix3::identity());

        m.update_jacobians(&filter.state_as());
        assert!(filter.update(&m, &reading(0.0, 0.0)).is_ok());
    }

    #[test]
    fn singular_innovation_leaves_estimate_alone() {
        let mut filter =
            Filter::<StandardBase<f64, 3>>::from_covariance(Vector3::new(1.0, 1.0, 0.0), Matrix3::zeros()).unwrap();
        let mut m = PositionMeasurementModel::<f64>::new(0.0, 0.0);
        m.noise_mut().set_covariance(Matrix2::zeros()).unwrap();

        assert_eq!(
            filter.correct(&mut m, &reading(3.0, 3.0)).unwrap_err(),
            EstimationError::SingularInnovation
        );
        assert_eq!(filter.state(), &Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn square_root_filter_matches_standard_filter() {
        let x0 = Vector3::new(0.5, -0.5, 0.3);
        let p0 = Matrix3::new(0.5, 0.1, 0.0, 0.1, 0.4, 0.05, 0.0, 0.05, 0.2);
        let mut standard = Filter::<StandardBase<f64, 3>>::from_covariance(x0, p0).unwrap();
        let mut sqrt = Filter::<SquareRootBase<f64, 3>>::from_covariance(x0, p0).unwrap();
        let mut m_std = model::<StandardBase<f64, 2>>(0.4, 0.1, 0.05);
        let mut m_sqrt = model::<SquareRootBase<f64, 2>>(0.4, 0.1, 0.05);

        for (i, z) in [(0.9, -0.3), (1.0, -0.2), (1.1, 0.0)].iter().enumerate() {
            let q = Matrix3::identity() * 0.01 * (i as f64 + 1.0);
            standard.predict(*standard.state(), &Matrix3::identity(), &q).unwrap();
            sqrt.predict(*sqrt.state(), &Matrix3::identity(), &q).unwrap();
            standard.correct(&mut m_std, &reading(z.0, z.1)).unwrap();
            sqrt.correct(&mut m_sqrt, &reading(z.0, z.1)).unwrap();
        }

        assert_relative_eq!(*standard.state(), *sqrt.state(), epsilon = 1e-9);
        assert_relative_eq!(standard.covariance(), sqrt.covariance(), epsilon = 1e-9);

        // The square-root filter keeps a lower-triangular factor of the same P.
        let factor = sqrt.covariance_base().covariance_square_root().unwrap();
        assert_eq!(factor[(0, 1)], 0.0);
        assert_eq!(factor[(0, 2)], 0.0);
        assert_eq!(factor[(1, 2)], 0.0);
        assert_relative_eq!(factor * factor.transpose(), standard.covariance(), epsilon = 1e-9);
    }

    #[test]
    fn set_state_moves_the_linearization_point() {
        let mut filter = Filter::<StandardBase<f64, 3>>::new(Vector3::zeros(), StandardBase::default());
        let mut m = model::<StandardBase<f64, 2>>(0.5, 0.0, 0.1);
        m.update_jacobians(&filter.state_as());

        filter.set_state(Vector3::new(1.0, 2.0, FRAC_PI_2));
        assert_eq!(filter.state(), &Vector3::new(1.0, 2.0, FRAC_PI_2));
        assert_eq!(filter.covariance_base(), &StandardBase::default());
        assert_eq!(
            filter.update(&m, &reading(1.0, 2.5)).unwrap_err(),
            EstimationError::StaleJacobian
        );

        // Re-linearized at the new estimate, the reading matches h exactly.
        let report = filter.correct(&mut m, &reading(1.0, 2.5)).unwrap();
        assert_abs_diff_eq!(report.innovation, nalgebra::Vector2::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn heading_is_observed_only_through_analytic_jacobian() {
        let x0 = Vector3::new(0.0, 0.0, 0.0);
        let reading = reading(0.0, 0.6); // antenna appears rotated by +90°

        let mut analytic = Filter::<StandardBase<f64, 3>>::new(x0, StandardBase::default());
        let mut m = model::<StandardBase<f64, 2>>(0.5, 0.0, 0.05);
        analytic.correct(&mut m, &reading).unwrap();

        let mut identity = Filter::<StandardBase<f64, 3>>::new(x0, StandardBase::default());
        let mut m = model::<StandardBase<f64, 2>>(0.5, 0.0, 0.05).with_jacobian_policy(JacobianPolicy::SmallOffsetIdentity);
        identity.correct(&mut m, &reading).unwrap();

        // With the lever arm in H, the y innovation turns the heading.
        assert!(analytic.state()[2] > 0.1);
        assert!(analytic.covariance()[(2, 2)] < 1.0);
        // Without it, heading and its variance are untouched.
        assert_eq!(identity.state()[2], 0.0);
        assert_abs_diff_eq!(identity.covariance()[(2, 2)], 1.0, epsilon = 1e-12);
    }
}
