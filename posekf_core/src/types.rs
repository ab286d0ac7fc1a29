// posekf_core/src/types.rs

use nalgebra::{Matrix2, Matrix2x3, Matrix3, Vector3};

// --- Core Type Aliases ---
pub type PoseVector = Vector3<f64>;
pub type PoseCovariance = Matrix3<f64>;
pub type PositionJacobian = Matrix2x3<f64>;
pub type PositionCovariance = Matrix2<f64>;

/// Names one component of a measurement vector, in the order the sensor
/// reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementAxis {
    /// East/x coordinate in the world frame.
    WorldX,
    /// North/y coordinate in the world frame.
    WorldY,
}

impl MeasurementAxis {
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementAxis::WorldX => "x",
            MeasurementAxis::WorldY => "y",
        }
    }
}
