use nalgebra::{Const, DMatrix, Dyn};

use crate::basis::{OperatorMatrix, SimplexEngine, SimplexLayout, SimplexSpace};
use crate::element::{ReferenceFiniteElement, Tet10Lagrange, Tet4Lagrange};
use crate::local::VectorJet;
use crate::nabla::NablaSet;
use crate::tables::EdgeFamily;
use crate::topology::{Topology, TETRAHEDRON_EDGES, TETRAHEDRON_FACES};
use crate::Real;

/// Tetrahedra in space. The curl is a vector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Volumetric;

impl<T: Real> SimplexSpace<T, 3> for Volumetric {
    const CURL_ROWS: usize = 3;

    fn write_curl(curl: &mut DMatrix<T>, column: usize, jet: &VectorJet<T, 3>, nabla: &NablaSet<T, 3>) {
        for (i, component) in jet.curl(nabla).iter().enumerate() {
            curl[(i, column)] = *component;
        }
    }

    /// $\nabla \times (N_a A_a) = \nabla N_a \times A_a$, i.e. one skew-symmetric block per node.
    fn potential_curl(gradient: &OperatorMatrix<T, 3>) -> OperatorMatrix<T, 3> {
        let num_nodes = gradient.ncols();
        let mut operator = OperatorMatrix::zeros_generic(Const::<3>, Dyn(3 * num_nodes));
        for (a, g) in gradient.column_iter().enumerate() {
            let c = 3 * a;
            operator[(0, c + 1)] = -g[2];
            operator[(0, c + 2)] = g[1];
            operator[(1, c)] = g[2];
            operator[(1, c + 2)] = -g[0];
            operator[(2, c)] = -g[1];
            operator[(2, c + 1)] = g[0];
        }
        operator
    }
}

pub static TET4_LAYOUT: SimplexLayout = SimplexLayout {
    topology: Topology::Tet4,
    num_vertices: 4,
    edges: &TETRAHEDRON_EDGES,
    faces: &[],
    reconcile_faces: false,
    family: EdgeFamily::Linear,
};

pub static TET10_LAYOUT: SimplexLayout = SimplexLayout {
    topology: Topology::Tet10,
    num_vertices: 4,
    edges: &TETRAHEDRON_EDGES,
    faces: &TETRAHEDRON_FACES,
    reconcile_faces: true,
    family: EdgeFamily::Quadratic,
};

/// Edge basis of a tetrahedron topology.
pub type VolumetricEdgeBasis<'g, T> = SimplexEngine<'g, T, Volumetric, 3>;

impl<'g, T: Real> SimplexEngine<'g, T, Volumetric, 3> {
    /// The linear (Whitney) tetrahedron.
    pub fn tet4() -> Self {
        Self::with_shapes(&TET4_LAYOUT, &Tet4Lagrange)
    }

    /// The quadratic tetrahedron, with unit Lagrange geometry.
    pub fn tet10() -> Self {
        Self::with_shapes(&TET10_LAYOUT, &Tet10Lagrange)
    }

    /// The quadratic tetrahedron, borrowing the geometry shape functions of the owning group.
    pub fn tet10_with_shapes(shapes: &'g dyn ReferenceFiniteElement<T, 3>) -> Self {
        Self::with_shapes(&TET10_LAYOUT, shapes)
    }
}
