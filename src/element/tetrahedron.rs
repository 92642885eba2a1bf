use nalgebra::{Matrix1x4, Matrix3x4, Point3, SMatrix};
use numeric_literals::replace_float_literals;

use crate::element::{barycentric_coordinate, barycentric_gradient, FixedNodesReferenceFiniteElement};
use crate::topology::TETRAHEDRON_EDGES;
use crate::Real;

/// Linear Lagrange shape functions on the unit tetrahedron.
///
/// Node `k` sits at the vertex where $\lambda_k = 1$.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tet4Lagrange;

impl Tet4Lagrange {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn reference_nodes<T: Real>() -> [Point3<T>; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }
}

impl<T> FixedNodesReferenceFiniteElement<T, 3, 4> for Tet4Lagrange
where
    T: Real,
{
    fn evaluate_basis(&self, xi: &Point3<T>) -> Matrix1x4<T> {
        Matrix1x4::from_fn(|_, k| barycentric_coordinate(xi, k))
    }

    fn gradients(&self, _: &Point3<T>) -> Matrix3x4<T> {
        Matrix3x4::from_columns(&[
            barycentric_gradient(0),
            barycentric_gradient(1),
            barycentric_gradient(2),
            barycentric_gradient(3),
        ])
    }
}

impl_reference_finite_element_for_fixed!(Tet4Lagrange, 3, 4);

/// Quadratic Lagrange shape functions on the unit tetrahedron.
///
/// Vertex nodes are numbered as for [`Tet4Lagrange`]. Node `4 + e` is the midpoint of
/// edge `e` of [`TETRAHEDRON_EDGES`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tet10Lagrange;

impl Tet10Lagrange {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn reference_nodes<T: Real>() -> [Point3<T>; 10] {
        let v = Tet4Lagrange::reference_nodes::<T>();
        let mid = |e: usize| {
            let [a, b] = TETRAHEDRON_EDGES[e];
            Point3::from((v[a].coords + v[b].coords) * 0.5)
        };
        [v[0], v[1], v[2], v[3], mid(0), mid(1), mid(2), mid(3), mid(4), mid(5)]
    }
}

impl<T> FixedNodesReferenceFiniteElement<T, 3, 10> for Tet10Lagrange
where
    T: Real,
{
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate_basis(&self, xi: &Point3<T>) -> SMatrix<T, 1, 10> {
        // We express the basis functions of Tet10 as products of
        // the Tet4 basis functions.
        let psi = Tet4Lagrange.evaluate_basis(xi);
        SMatrix::from_fn(|_, node| {
            if node < 4 {
                psi[node] * (2.0 * psi[node] - 1.0)
            } else {
                let [a, b] = TETRAHEDRON_EDGES[node - 4];
                4.0 * psi[a] * psi[b]
            }
        })
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn gradients(&self, xi: &Point3<T>) -> SMatrix<T, 3, 10> {
        let psi = Tet4Lagrange.evaluate_basis(xi);
        let g = Tet4Lagrange.gradients(xi);

        // Gradient of vertex node i
        let vertex_gradient = |i: usize| g.column(i) * (4.0 * psi[i] - 1.0);

        // Gradient of the mid node of edge e
        let edge_gradient = |e: usize| {
            let [i, j] = TETRAHEDRON_EDGES[e];
            g.column(i) * (4.0 * psi[j]) + g.column(j) * (4.0 * psi[i])
        };

        SMatrix::from_columns(&[
            vertex_gradient(0),
            vertex_gradient(1),
            vertex_gradient(2),
            vertex_gradient(3),
            edge_gradient(0),
            edge_gradient(1),
            edge_gradient(2),
            edge_gradient(3),
            edge_gradient(4),
            edge_gradient(5),
        ])
    }
}

impl_reference_finite_element_for_fixed!(Tet10Lagrange, 3, 10);
