use nalgebra::{Const, DMatrix, Dyn};

use crate::basis::{OperatorMatrix, SimplexEngine, SimplexLayout, SimplexSpace};
use crate::element::{ReferenceFiniteElement, Tri3Lagrange, Tri6Lagrange};
use crate::local::VectorJet;
use crate::nabla::NablaSet;
use crate::tables::EdgeFamily;
use crate::topology::{Topology, TRIANGLE_EDGES, TRIANGLE_FACES};
use crate::Real;

/// Triangles in the plane. The curl is a scalar.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Planar;

impl<T: Real> SimplexSpace<T, 2> for Planar {
    const CURL_ROWS: usize = 1;

    fn write_curl(curl: &mut DMatrix<T>, column: usize, jet: &VectorJet<T, 2>, nabla: &NablaSet<T, 2>) {
        curl[(0, column)] = jet.curl(nabla);
    }

    /// For a potential $A = (0, 0, A_z)$ interpolated as $\sum_a N_a A_a$, the in-plane curl is
    /// $\sum_a (\partial_y N_a, -\partial_x N_a) A_{a,z}$. The `x` and `y` potential components
    /// do not contribute.
    fn potential_curl(gradient: &OperatorMatrix<T, 2>) -> OperatorMatrix<T, 2> {
        let num_nodes = gradient.ncols();
        let mut operator = OperatorMatrix::zeros_generic(Const::<2>, Dyn(3 * num_nodes));
        for (a, g) in gradient.column_iter().enumerate() {
            operator[(0, 3 * a + 2)] = g[1];
            operator[(1, 3 * a + 2)] = -g[0];
        }
        operator
    }
}

pub static TRI3_LAYOUT: SimplexLayout = SimplexLayout {
    topology: Topology::Tri3,
    num_vertices: 3,
    edges: &TRIANGLE_EDGES,
    faces: &[],
    reconcile_faces: false,
    family: EdgeFamily::Linear,
};

/// The interior face functions of a triangle belong to the element alone and are never reconciled.
pub static TRI6_LAYOUT: SimplexLayout = SimplexLayout {
    topology: Topology::Tri6,
    num_vertices: 3,
    edges: &TRIANGLE_EDGES,
    faces: &TRIANGLE_FACES,
    reconcile_faces: false,
    family: EdgeFamily::Quadratic,
};

/// Edge basis of a triangle topology.
pub type PlanarEdgeBasis<'g, T> = SimplexEngine<'g, T, Planar, 2>;

impl<'g, T: Real> SimplexEngine<'g, T, Planar, 2> {
    /// The linear (Whitney) triangle.
    pub fn tri3() -> Self {
        Self::with_shapes(&TRI3_LAYOUT, &Tri3Lagrange)
    }

    /// The quadratic triangle, with unit Lagrange geometry.
    pub fn tri6() -> Self {
        Self::with_shapes(&TRI6_LAYOUT, &Tri6Lagrange)
    }

    /// The quadratic triangle, borrowing the geometry shape functions of the owning group.
    pub fn tri6_with_shapes(shapes: &'g dyn ReferenceFiniteElement<T, 2>) -> Self {
        Self::with_shapes(&TRI6_LAYOUT, shapes)
    }
}
