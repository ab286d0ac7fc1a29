// posekf_core/src/estimation/covariance.rs

use nalgebra::{RealField, SMatrix};
use std::fmt::Debug;

use crate::error::EstimationError;

/// How a covariance matrix is stored.
///
/// Models and filters take this as a type parameter, so the choice between a
/// plain covariance matrix and its Cholesky factor is made once, at compile
/// time, per filter variant. `Default` is the identity matrix.
pub trait CovarianceBase<T: RealField + Copy, const N: usize>: Clone + Debug + Default {
    /// Builds the representation from a full covariance matrix `P`.
    fn from_covariance(covariance: SMatrix<T, N, N>) -> Result<Self, EstimationError>;

    /// The full covariance matrix `P`.
    fn covariance(&self) -> SMatrix<T, N, N>;

    /// A lower-triangular `S` with `P = S * S^T`.
    fn covariance_square_root(&self) -> Result<SMatrix<T, N, N>, EstimationError>;

    /// Replaces the stored covariance with `P`.
    fn set_covariance(&mut self, covariance: SMatrix<T, N, N>) -> Result<(), EstimationError>;
}

/// Stores `P` directly.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardBase<T, const N: usize> {
    p: SMatrix<T, N, N>,
}

impl<T: RealField + Copy, const N: usize> Default for StandardBase<T, N> {
    fn default() -> Self {
        Self {
            p: SMatrix::identity(),
        }
    }
}

impl<T: RealField + Copy, const N: usize> CovarianceBase<T, N> for StandardBase<T, N> {
    fn from_covariance(covariance: SMatrix<T, N, N>) -> Result<Self, EstimationError> {
        Ok(Self { p: covariance })
    }

    fn covariance(&self) -> SMatrix<T, N, N> {
        self.p
    }

    fn covariance_square_root(&self) -> Result<SMatrix<T, N, N>, EstimationError> {
        self.p
            .cholesky()
            .map(|c| c.l())
            .ok_or(EstimationError::NotPositiveDefinite)
    }

    fn set_covariance(&mut self, covariance: SMatrix<T, N, N>) -> Result<(), EstimationError> {
        self.p = covariance;
        Ok(())
    }
}

/// Stores the lower-triangular Cholesky factor `S` of `P`.
///
/// Only positive-definite matrices can be represented; anything else is
/// rejected when it is set.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareRootBase<T, const N: usize> {
    s: SMatrix<T, N, N>,
}

impl<T: RealField + Copy, const N: usize> SquareRootBase<T, N> {
    /// Wraps an existing factor. Only the lower triangle of `s` is kept.
    pub fn from_square_root(s: SMatrix<T, N, N>) -> Self {
        Self {
            s: s.lower_triangle(),
        }
    }
}

impl<T: RealField + Copy, const N: usize> Default for SquareRootBase<T, N> {
    fn default() -> Self {
        Self {
            s: SMatrix::identity(),
        }
    }
}

impl<T: RealField + Copy, const N: usize> CovarianceBase<T, N> for SquareRootBase<T, N> {
    fn from_covariance(covariance: SMatrix<T, N, N>) -> Result<Self, EstimationError> {
        let mut base = Self::default();
        base.set_covariance(covariance)?;
        Ok(base)
    }

    fn covariance(&self) -> SMatrix<T, N, N> {
        self.s * self.s.transpose()
    }

    fn covariance_square_root(&self) -> Result<SMatrix<T, N, N>, EstimationError> {
        Ok(self.s)
    }

    fn set_covariance(&mut self, covariance: SMatrix<T, N, N>) -> Result<(), EstimationError> {
        let chol = covariance
            .cholesky()
            .ok_or(EstimationError::NotPositiveDefinite)?;
        self.s = chol.l();
        Ok(())
    }
}
