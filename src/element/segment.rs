use nalgebra::{Matrix1x3, Point1};
use numeric_literals::replace_float_literals;

use crate::element::FixedNodesReferenceFiniteElement;
use crate::Real;

/// Quadratic Lagrange shape functions on the unit segment $[0, 1]$.
///
/// Nodes 0 and 1 sit at $\tau = 0$ and $\tau = 1$, node 2 at the midpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Segment3Lagrange;

impl Segment3Lagrange {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn reference_nodes<T: Real>() -> [Point1<T>; 3] {
        [Point1::new(0.0), Point1::new(1.0), Point1::new(0.5)]
    }
}

impl<T> FixedNodesReferenceFiniteElement<T, 1, 3> for Segment3Lagrange
where
    T: Real,
{
    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate_basis(&self, tau: &Point1<T>) -> Matrix1x3<T> {
        let l1 = tau.x;
        let l0 = 1.0 - l1;
        Matrix1x3::new(
            l0 * (2.0 * l0 - 1.0),
            l1 * (2.0 * l1 - 1.0),
            4.0 * l0 * l1,
        )
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn gradients(&self, tau: &Point1<T>) -> Matrix1x3<T> {
        let l1 = tau.x;
        let l0 = 1.0 - l1;
        Matrix1x3::new(
            -(4.0 * l0 - 1.0),
            4.0 * l1 - 1.0,
            4.0 * (l0 - l1),
        )
    }
}

impl_reference_finite_element_for_fixed!(Segment3Lagrange, 1, 3);
