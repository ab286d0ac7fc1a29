// posekf_core/src/models/measurement/mod.rs

use dyn_clone::DynClone;
use nalgebra::{DMatrix, DVector, RealField, SMatrix, SVector};
use std::fmt::Debug;

use crate::error::EstimationError;
use crate::estimation::covariance::CovarianceBase;
use crate::state::PoseState;
use crate::types::MeasurementAxis;
use crate::vectors::NamedVector;

/// The state-dependent pieces of a measurement model at one operating point.
///
/// Handed out by [`LinearizedMeasurementModel::linearize`] and
/// [`LinearizedMeasurementModel::linearization`]. Borrowing `H` and `V` from the
/// model means the model cannot be re-linearized while a view is alive.
#[derive(Debug)]
pub struct Linearization<'a, T, const S: usize, const M: usize> {
    /// `H = ∂h/∂x` at the operating point.
    pub h: &'a SMatrix<T, M, S>,
    /// `V = ∂h/∂v`, mapping measurement noise into the innovation.
    pub v: &'a SMatrix<T, M, M>,
    /// `h(x)` at the operating point.
    pub predicted: SVector<T, M>,
}

// --- LINEARIZED MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a sensor. `z = h(x) + v`
/// A measurement model usable by an Extended Kalman Filter.
///
/// `S` is the state dimension and `M` the measurement dimension. The noise
/// covariance `R` lives in the model, in whatever representation `Noise` picks.
///
/// Linearization is an explicit step: call [`update_jacobians`] (or
/// [`linearize`]) with the current estimate before reading `H`. The model keeps
/// the point it was linearized at, so [`linearization`] can refuse to hand out
/// a Jacobian that belongs to another state.
///
/// [`update_jacobians`]: LinearizedMeasurementModel::update_jacobians
/// [`linearize`]: LinearizedMeasurementModel::linearize
/// [`linearization`]: LinearizedMeasurementModel::linearization
pub trait LinearizedMeasurementModel<T: RealField + Copy, const S: usize, const M: usize> {
    type State: NamedVector<T, S>;
    type Measurement: NamedVector<T, M>;
    type Noise: CovarianceBase<T, M>;

    /// The measurement expected from the sensor if the system were in state `x`.
    fn h(&self, x: &Self::State) -> Self::Measurement;

    /// Recomputes `H` around `x` and records `x` as the linearization point.
    fn update_jacobians(&mut self, x: &Self::State);

    /// `H` as of the last call to `update_jacobians`.
    fn h_jacobian(&self) -> &SMatrix<T, M, S>;

    fn v_jacobian(&self) -> &SMatrix<T, M, M>;

    /// The state `H` was last computed at, if any.
    fn linearization_point(&self) -> Option<&Self::State>;

    /// Measurement noise covariance `R`.
    fn noise(&self) -> &Self::Noise;

    fn noise_mut(&mut self) -> &mut Self::Noise;

    /// `V * R * V^T`, the noise contribution to the innovation covariance.
    fn innovation_noise(&self) -> SMatrix<T, M, M> {
        let v = self.v_jacobian();
        v * self.noise().covariance() * v.transpose()
    }

    /// Linearizes around `x` and returns the resulting view.
    fn linearize(&mut self, x: &Self::State) -> Linearization<'_, T, S, M> {
        self.update_jacobians(x);
        let predicted = self.h(x).into_vector();
        Linearization {
            h: self.h_jacobian(),
            v: self.v_jacobian(),
            predicted,
        }
    }

    /// The view for `x`, provided the model was last linearized at exactly `x`.
    fn linearization(&self, x: &Self::State) -> Result<Linearization<'_, T, S, M>, EstimationError> {
        match self.linearization_point() {
            None => Err(EstimationError::NotLinearized),
            Some(point) if point.as_vector() != x.as_vector() => Err(EstimationError::StaleJacobian),
            Some(_) => Ok(Linearization {
                h: self.h_jacobian(),
                v: self.v_jacobian(),
                predicted: self.h(x).into_vector(),
            }),
        }
    }
}

// --- DYNAMIC MEASUREMENT TRAIT ---
/// Object-safe view of a planar pose sensor, for code that keeps a
/// heterogeneous set of sensors behind `Box<dyn Measurement>`.
///
/// Unlike [`LinearizedMeasurementModel`], nothing here mutates the model: the
/// Jacobian is evaluated on the spot.
pub trait Measurement: DynClone + Debug + Send + Sync {
    /// Describes the layout of the measurement vector `z`.
    fn get_measurement_layout(&self) -> Vec<MeasurementAxis>;

    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> DMatrix<f64>;

    /// Predicts the ideal measurement `z_pred = h(x)`.
    fn predict_measurement(&self, state: &PoseState<f64>) -> DVector<f64>;

    /// Calculates the measurement Jacobian `H = ∂h/∂x` at `state`.
    fn calculate_jacobian(&self, state: &PoseState<f64>) -> DMatrix<f64>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn Measurement>`.
dyn_clone::clone_trait_object!(Measurement);

/// Central-difference approximation of `∂f/∂x` at `x`.
///
/// Handy for checking analytic Jacobians.
pub fn numerical_jacobian<T, const S: usize, const M: usize, F>(
    f: F,
    x: &SVector<T, S>,
    epsilon: T,
) -> SMatrix<T, M, S>
where
    T: RealField + Copy,
    F: Fn(&SVector<T, S>) -> SVector<T, M>,
{
    let mut jac = SMatrix::<T, M, S>::zeros();
    let two = T::one() + T::one();
    for j in 0..S {
        let mut forward = *x;
        let mut backward = *x;
        forward[j] += epsilon;
        backward[j] -= epsilon;
        let column = (f(&forward) - f(&backward)) / (two * epsilon);
        jac.column_mut(j).copy_from(&column);
    }
    jac
}

pub mod position;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix2x3, Vector2, Vector3};

    #[test]
    fn numerical_jacobian_of_linear_map_is_the_map() {
        let a = Matrix2x3::new(1.0, 2.0, 3.0, -1.0, 0.5, 4.0);
        let jac = numerical_jacobian(|x: &Vector3<f64>| a * x, &Vector3::new(0.3, -2.0, 5.0), 1e-6);
        assert_relative_eq!(jac, a, epsilon = 1e-8);
    }

    #[test]
    fn numerical_jacobian_of_polar_map() {
        let f = |x: &Vector2<f64>| Vector2::new(x[0] * x[1].cos(), x[0] * x[1].sin());
        let x = Vector2::new(2.0, 0.7);
        let jac: nalgebra::Matrix2<f64> = numerical_jacobian(f, &x, 1e-6);
        assert_relative_eq!(jac[(0, 1)], -2.0 * 0.7_f64.sin(), epsilon = 1e-8);
        assert_relative_eq!(jac[(1, 1)], 2.0 * 0.7_f64.cos(), epsilon = 1e-8);
    }
}
