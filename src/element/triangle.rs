use nalgebra::{Matrix1x3, Matrix1x6, Matrix2x3, Matrix2x6, Point2};
use numeric_literals::replace_float_literals;

use crate::element::{barycentric_coordinate, barycentric_gradient, FixedNodesReferenceFiniteElement};
use crate::topology::TRIANGLE_EDGES;
use crate::Real;

/// Linear Lagrange shape functions on the unit triangle.
///
/// Node `k` sits at the vertex where $\lambda_k = 1$.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tri3Lagrange;

impl Tri3Lagrange {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn reference_nodes<T: Real>() -> [Point2<T>; 3] {
        [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)]
    }
}

impl<T> FixedNodesReferenceFiniteElement<T, 2, 3> for Tri3Lagrange
where
    T: Real,
{
    fn evaluate_basis(&self, xi: &Point2<T>) -> Matrix1x3<T> {
        Matrix1x3::from_fn(|_, k| barycentric_coordinate(xi, k))
    }

    fn gradients(&self, _: &Point2<T>) -> Matrix2x3<T> {
        Matrix2x3::from_columns(&[
            barycentric_gradient(0),
            barycentric_gradient(1),
            barycentric_gradient(2),
        ])
    }
}

impl_reference_finite_element_for_fixed!(Tri3Lagrange, 2, 3);

/// Quadratic Lagrange shape functions on the unit triangle.
///
/// Vertex nodes are numbered as for [`Tri3Lagrange`]. Node `3 + e` is the midpoint of
/// edge `e` of [`TRIANGLE_EDGES`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tri6Lagrange;

impl Tri6Lagrange {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn reference_nodes<T: Real>() -> [Point2<T>; 6] {
        let [a, b, c] = Tri3Lagrange::reference_nodes::<T>();
        let mid = |p: &Point2<T>, q: &Point2<T>| Point2::from((p.coords + q.coords) * 0.5);
        [a, b, c, mid(&a, &b), mid(&b, &c), mid(&c, &a)]
    }
}

impl<T> FixedNodesReferenceFiniteElement<T, 2, 6> for Tri6Lagrange
where
    T: Real,
{
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate_basis(&self, xi: &Point2<T>) -> Matrix1x6<T> {
        // Quadratic functions are products of the linear ones
        let psi = Tri3Lagrange.evaluate_basis(xi);
        Matrix1x6::from_fn(|_, node| {
            if node < 3 {
                psi[node] * (2.0 * psi[node] - 1.0)
            } else {
                let [a, b] = TRIANGLE_EDGES[node - 3];
                4.0 * psi[a] * psi[b]
            }
        })
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn gradients(&self, xi: &Point2<T>) -> Matrix2x6<T> {
        let psi = Tri3Lagrange.evaluate_basis(xi);
        let g = Tri3Lagrange.gradients(xi);

        // Gradient of vertex node i
        let vertex_gradient = |i: usize| g.column(i) * (4.0 * psi[i] - 1.0);

        // Gradient of the mid node of edge e
        let edge_gradient = |e: usize| {
            let [i, j] = TRIANGLE_EDGES[e];
            g.column(i) * (4.0 * psi[j]) + g.column(j) * (4.0 * psi[i])
        };

        Matrix2x6::from_columns(&[
            vertex_gradient(0),
            vertex_gradient(1),
            vertex_gradient(2),
            edge_gradient(0),
            edge_gradient(1),
            edge_gradient(2),
        ])
    }
}

impl_reference_finite_element_for_fixed!(Tri6Lagrange, 2, 6);
