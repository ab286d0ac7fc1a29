// posekf_sim/src/simulation/core/trajectory.rs

use nalgebra::Vector2;
use posekf_core::state::PoseState;
use std::f64::consts::FRAC_PI_2;

use crate::simulation::config::structs::Trajectory;

/// Ground-truth motion on a circle, facing along the direction of travel.
///
/// The heading is continuous in time and never wrapped, so after a few laps it
/// is well outside (-π, π].
#[derive(Debug, Clone)]
pub struct CircleTrajectory {
    center: Vector2<f64>,
    radius: f64,
    angular_rate: f64,
    initial_phase: f64,
}

impl CircleTrajectory {
    pub fn new(config: &Trajectory) -> Self {
        Self {
            center: Vector2::new(config.center[0], config.center[1]),
            radius: config.radius,
            angular_rate: config.angular_rate,
            initial_phase: config.initial_phase,
        }
    }

    pub fn pose_at(&self, t: f64) -> PoseState<f64> {
        let phase = self.initial_phase + self.angular_rate * t;
        let position = self.center + Vector2::new(phase.cos(), phase.sin()) * self.radius;
        // Tangent direction: +90° from the radius going counter-clockwise, -90° clockwise.
        let heading = phase + FRAC_PI_2 * self.angular_rate.signum();
        PoseState::new(position.x, position.y, heading)
    }

    /// Forward speed and yaw rate, both constant.
    pub fn body_velocity(&self) -> (f64, f64) {
        (self.radius * self.angular_rate.abs(), self.angular_rate)
    }
}
