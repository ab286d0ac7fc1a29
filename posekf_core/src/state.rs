// posekf_core/src/state.rs

use nalgebra::RealField;

crate::named_vector! {
    /// Planar robot pose as seen by the filter: the reference point's position
    /// in the world frame and the heading, in radians.
    ///
    /// `theta` is an unbounded real. Nothing in this crate wraps it; callers that
    /// want a canonical range can use [`PoseState::with_theta_wrapped`].
    PoseState, 3, {
        x_pos, x_pos_mut, X = 0,
        y_pos, y_pos_mut, Y = 1,
        theta, theta_mut, THETA = 2,
    }
}

impl<T: RealField + Copy> PoseState<T> {
    pub fn new(x_pos: T, y_pos: T, theta: T) -> Self {
        Self(nalgebra::Vector3::new(x_pos, y_pos, theta))
    }

    /// Returns a copy with `theta` wrapped into (-π, π].
    pub fn with_theta_wrapped(&self) -> Self {
        let mut wrapped = *self;
        *wrapped.theta_mut() = wrap_angle(self.theta());
        wrapped
    }
}

/// Wraps an angle into (-π, π].
pub fn wrap_angle<T: RealField + Copy>(angle: T) -> T {
    let two_pi = T::two_pi();
    let pi = T::pi();
    let wrapped = angle - two_pi * ((angle + pi) / two_pi).floor();
    if wrapped == -pi {
        pi
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn accessors_follow_layout() {
        let s = PoseState::new(1.0, 2.0, 0.5);
        assert_eq!(s[PoseState::<f64>::X], 1.0);
        assert_eq!(s[PoseState::<f64>::Y], 2.0);
        assert_eq!(s[PoseState::<f64>::THETA], 0.5);
    }

    #[test]
    fn wrap_angle_lands_in_half_open_interval() {
        assert_abs_diff_eq!(wrap_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-0.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(2.0 * PI + 0.25), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn wrapping_leaves_position_alone() {
        let s = PoseState::new(4.0, -3.0, 7.0).with_theta_wrapped();
        assert_eq!(s.x_pos(), 4.0);
        assert_eq!(s.y_pos(), -3.0);
        assert_abs_diff_eq!(s.theta(), 7.0 - 2.0 * PI, epsilon = 1e-12);
    }
}
