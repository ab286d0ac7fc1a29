// posekf_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::covariance::{CovarianceBase, SquareRootBase, StandardBase};
pub use crate::models::measurement::{LinearizedMeasurementModel, Linearization, Measurement};
pub use crate::vectors::NamedVector;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::SensorConfig;
pub use crate::error::EstimationError;
pub use crate::state::PoseState;
pub use crate::types::MeasurementAxis;

// --- Estimation Algorithms ---
pub use crate::estimation::filters::ekf::{ExtendedKalmanFilter, UpdateReport};

// --- Concrete Model Implementations ---
pub use crate::models::measurement::position::{
    JacobianPolicy, PositionMeasurement, PositionMeasurementModel,
};
