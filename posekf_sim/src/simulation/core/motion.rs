// posekf_sim/src/simulation/core/motion.rs

use nalgebra::Matrix3;
use posekf_core::state::PoseState;

/// One odometry sample: forward speed [m/s] and yaw rate [rad/s].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometryInput {
    pub speed: f64,
    pub yaw_rate: f64,
}

/// Euler step of the unicycle model, returning the propagated pose and the
/// Jacobian `F = ∂f/∂x` at `x`.
pub fn propagate(x: &PoseState<f64>, u: &OdometryInput, dt: f64) -> (PoseState<f64>, Matrix3<f64>) {
    let (s, c) = x.theta().sin_cos();
    let distance = u.speed * dt;

    let next = PoseState::new(
        x.x_pos() + distance * c,
        x.y_pos() + distance * s,
        x.theta() + u.yaw_rate * dt,
    );

    let mut f_jac = Matrix3::identity();
    // d(x)/d(theta), d(y)/d(theta)
    f_jac[(0, 2)] = -distance * s;
    f_jac[(1, 2)] = distance * c;

    (next, f_jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use posekf_core::models::measurement::numerical_jacobian;
    use posekf_core::vectors::NamedVector;

    #[test]
    fn straight_line_step() {
        let (next, _) = propagate(
            &PoseState::new(1.0, 1.0, 0.0),
            &OdometryInput { speed: 2.0, yaw_rate: 0.0 },
            0.5,
        );
        assert_eq!(next, PoseState::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let u = OdometryInput { speed: 0.8, yaw_rate: -0.3 };
        let x = PoseState::new(0.5, -2.0, 2.4);
        let (_, f_jac) = propagate(&x, &u, 0.1);
        let numeric = numerical_jacobian(
            |v: &Vector3<f64>| propagate(&PoseState::from_vector(*v), &u, 0.1).0.into_vector(),
            x.as_vector(),
            1e-6,
        );
        assert_relative_eq!(f_jac, numeric, epsilon = 1e-8);
    }
}
