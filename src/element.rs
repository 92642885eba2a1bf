//! Lagrange shape functions of the element geometry on unit reference simplices.
//!
//! Mesh groups own the shape functions that interpolate their element geometry. Edge basis
//! engines borrow them to build the Jacobians behind the nodal operators.
//!
//! All reference elements are unit simplices: the reference coordinates $\xi_0, \dots, \xi_{R-1}$
//! are the barycentric coordinates $\lambda_1, \dots, \lambda_R$ and
//! $\lambda_0 = 1 - \sum_d \xi_d$.
use nalgebra::{Point, SMatrix, SVector};

use crate::Real;

/// Shape functions of a reference element with `R` reference coordinates.
pub trait ReferenceFiniteElement<T: Real, const R: usize> {
    /// Returns the number of nodes in the element.
    fn num_nodes(&self) -> usize;

    /// Evaluates each basis function at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `basis_values` does not have exactly one entry per node.
    fn populate_basis(&self, basis_values: &mut [T], reference_coords: &Point<T, R>);

    /// Evaluates the gradient of each basis function with respect to the reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `basis_gradients` does not have exactly one entry per node.
    fn populate_basis_gradients(&self, basis_gradients: &mut [SVector<T, R>], reference_coords: &Point<T, R>);
}

/// Reference finite elements with a number of nodes fixed at compile-time.
pub trait FixedNodesReferenceFiniteElement<T: Real, const R: usize, const N: usize> {
    /// Evaluates each basis function at the given reference coordinates. The result is given
    /// in a row vector where each entry is the value of the corresponding basis function.
    fn evaluate_basis(&self, reference_coords: &Point<T, R>) -> SMatrix<T, 1, N>;

    /// Construct a matrix whose columns are the gradients of each shape function in the element.
    fn gradients(&self, reference_coords: &Point<T, R>) -> SMatrix<T, R, N>;
}

/// Implements `ReferenceFiniteElement` for an element that implements
/// `FixedNodesReferenceFiniteElement`.
macro_rules! impl_reference_finite_element_for_fixed {
    ($element:ty, $r:expr, $n:expr) => {
        impl<T> $crate::element::ReferenceFiniteElement<T, $r> for $element
        where
            T: $crate::Real,
        {
            fn num_nodes(&self) -> usize {
                $n
            }

            fn populate_basis(&self, result: &mut [T], reference_coords: &nalgebra::Point<T, $r>) {
                assert_eq!(result.len(), $n, "Basis buffer must have one entry per node");
                let basis_values = <$element as $crate::element::FixedNodesReferenceFiniteElement<T, $r, $n>>::evaluate_basis(
                    self,
                    reference_coords,
                );
                result.copy_from_slice(basis_values.as_slice());
            }

            fn populate_basis_gradients(
                &self,
                result: &mut [nalgebra::SVector<T, $r>],
                reference_coords: &nalgebra::Point<T, $r>,
            ) {
                assert_eq!(result.len(), $n, "Gradient buffer must have one entry per node");
                let gradients = <$element as $crate::element::FixedNodesReferenceFiniteElement<T, $r, $n>>::gradients(
                    self,
                    reference_coords,
                );
                for (output, column) in result.iter_mut().zip(gradients.column_iter()) {
                    *output = column.into_owned();
                }
            }
        }
    };
}

mod segment;
mod tetrahedron;
mod triangle;

pub use segment::*;
pub use tetrahedron::*;
pub use triangle::*;

/// The barycentric coordinate $\lambda_k$ at the given reference coordinates.
pub fn barycentric_coordinate<T: Real, const R: usize>(xi: &Point<T, R>, k: usize) -> T {
    assert!(k <= R, "Barycentric index {} out of bounds for a {}-simplex", k, R);
    if k == 0 {
        T::one() - xi.coords.sum()
    } else {
        xi[k - 1]
    }
}

/// The (constant) gradient of $\lambda_k$ with respect to the reference coordinates.
pub fn barycentric_gradient<T: Real, const R: usize>(k: usize) -> SVector<T, R> {
    assert!(k <= R, "Barycentric index {} out of bounds for a {}-simplex", k, R);
    if k == 0 {
        SVector::repeat(-T::one())
    } else {
        let mut gradient = SVector::zeros();
        gradient[k - 1] = T::one();
        gradient
    }
}

/// The reference coordinates of vertex `k` of the unit simplex.
pub fn reference_vertex<T: Real, const R: usize>(k: usize) -> Point<T, R> {
    assert!(k <= R, "Vertex index {} out of bounds for a {}-simplex", k, R);
    let mut xi = Point::origin();
    if k > 0 {
        xi[k - 1] = T::one();
    }
    xi
}
