// posekf_core/src/error.rs

use thiserror::Error;

/// Everything that can go wrong around the measurement model and the filter
/// that consumes it. The model's own `h` and `update_jacobians` never fail;
/// these errors come from construction, conversions and the EKF correction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("expected a buffer of {expected} elements, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("sensor offset must be finite, got ({x}, {y})")]
    NonFiniteOffset { x: f64, y: f64 },

    #[error("noise standard deviation must be finite and positive, got {0}")]
    InvalidNoise(f64),

    #[error("covariance matrix is not positive definite")]
    NotPositiveDefinite,

    #[error("measurement model has never been linearized")]
    NotLinearized,

    #[error("measurement Jacobian was computed at a different state than the one being corrected")]
    StaleJacobian,

    #[error("innovation covariance is singular, measurement rejected")]
    SingularInnovation,
}
