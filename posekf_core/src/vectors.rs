// posekf_core/src/vectors.rs

//! Small fixed-size vectors with named components.
//!
//! Filters work on raw `SVector`s, while models and callers want to say
//! `z.x_pos()` instead of `z[0]`. The [`named_vector!`](crate::named_vector)
//! macro bridges the two: it wraps an `SVector<T, N>`, adds named read and
//! write accessors, and derefs to the raw vector for the linear-algebra layer.

use nalgebra::{RealField, SVector};
use std::fmt::Debug;

/// Conversion contract between a named vector and the raw numeric buffer that
/// generic filter code operates on.
pub trait NamedVector<T: RealField, const N: usize>: Clone + Debug {
    fn as_vector(&self) -> &SVector<T, N>;

    fn from_vector(vector: SVector<T, N>) -> Self;

    fn into_vector(self) -> SVector<T, N> {
        self.as_vector().clone()
    }
}

/// Declares a newtype over `SVector<T, N>` with one getter, one mutable getter
/// and one index constant per component.
///
/// ```
/// posekf_core::named_vector! {
///     /// Wheel speeds.
///     WheelSpeeds, 2, {
///         left, left_mut, LEFT = 0,
///         right, right_mut, RIGHT = 1,
///     }
/// }
///
/// let mut w = WheelSpeeds::<f64>::zeros();
/// *w.right_mut() = 2.0;
/// assert_eq!(w.right(), 2.0);
/// assert_eq!(w[WheelSpeeds::<f64>::RIGHT], 2.0);
/// ```
#[macro_export]
macro_rules! named_vector {
    (
        $(#[$meta:meta])*
        $name:ident, $dim:literal, {
            $( $(#[$field_meta:meta])* $field:ident, $field_mut:ident, $index:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name<T>(pub $crate::nalgebra::SVector<T, $dim>);

        impl<T: $crate::nalgebra::RealField + Copy> $name<T> {
            /// Number of components.
            pub const DIM: usize = $dim;
            $( pub const $index: usize = $value; )+

            /// All components set to zero.
            pub fn zeros() -> Self {
                Self($crate::nalgebra::SVector::<T, $dim>::zeros())
            }

            /// Builds the vector from a raw buffer, which must hold exactly `DIM` values.
            pub fn from_slice(data: &[T]) -> Result<Self, $crate::error::EstimationError> {
                if data.len() != Self::DIM {
                    return Err($crate::error::EstimationError::DimensionMismatch {
                        expected: Self::DIM,
                        got: data.len(),
                    });
                }
                Ok(Self($crate::nalgebra::SVector::<T, $dim>::from_column_slice(data)))
            }

            $(
                $(#[$field_meta])*
                pub fn $field(&self) -> T {
                    self.0[$value]
                }

                pub fn $field_mut(&mut self) -> &mut T {
                    &mut self.0[$value]
                }
            )+
        }

        impl<T: $crate::nalgebra::RealField + Copy> Default for $name<T> {
            fn default() -> Self {
                Self::zeros()
            }
        }

        impl<T> From<$crate::nalgebra::SVector<T, $dim>> for $name<T> {
            fn from(vector: $crate::nalgebra::SVector<T, $dim>) -> Self {
                Self(vector)
            }
        }

        impl<T> std::ops::Deref for $name<T> {
            type Target = $crate::nalgebra::SVector<T, $dim>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<T> std::ops::DerefMut for $name<T> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl<T: $crate::nalgebra::RealField + Copy> $crate::vectors::NamedVector<T, $dim> for $name<T> {
            fn as_vector(&self) -> &$crate::nalgebra::SVector<T, $dim> {
                &self.0
            }

            fn from_vector(vector: $crate::nalgebra::SVector<T, $dim>) -> Self {
                Self(vector)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimationError;

    crate::named_vector! {
        Pair, 2, {
            first, first_mut, FIRST = 0,
            second, second_mut, SECOND = 1,
        }
    }

    #[test]
    fn zeros_and_default_agree() {
        assert_eq!(Pair::<f64>::zeros(), Pair::<f64>::default());
        assert_eq!(Pair::<f64>::zeros().first(), 0.0);
    }

    #[test]
    fn writes_through_mutable_accessors_are_visible() {
        let mut p = Pair::<f64>::zeros();
        *p.first_mut() = 1.5;
        *p.second_mut() = -2.5;
        assert_eq!(p.first(), 1.5);
        assert_eq!(p.second(), -2.5);
        assert_eq!(p[Pair::<f64>::SECOND], -2.5);
    }

    #[test]
    fn from_slice_checks_length() {
        let p = Pair::from_slice(&[3.0, 4.0]).unwrap();
        assert_eq!(p.second(), 4.0);

        let err = Pair::<f64>::from_slice(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, EstimationError::DimensionMismatch { expected: Pair::<f64>::DIM, got: 3 });
        assert_eq!(Pair::<f64>::DIM, 2);
    }

    #[test]
    fn named_vector_round_trips_through_raw_vector() {
        let raw = SVector::<f64, 2>::new(7.0, 8.0);
        let p = Pair::from_vector(raw);
        assert_eq!(p.as_vector(), &raw);
        assert_eq!(p.into_vector(), raw);
        // Deref exposes the full nalgebra API.
        assert_eq!(p.norm_squared(), 113.0);
    }
}
