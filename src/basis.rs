//! Point-indexed edge basis operators.
//!
//! An [`EdgeBasis`] engine is created once per mesh group and reused for each of its elements:
//!
//! 1. [`EdgeBasis::precompute`] tabulates everything that only depends on the reference points,
//! 2. [`EdgeBasis::link`] snapshots the geometry of one element and selects the pipelines,
//! 3. the operator accessors evaluate $E$, $B$, $C$ or $C_A$ at one point at a time.
//!
//! Accessors memoize their result for the last requested point index. A new index recomputes
//! the chain of intermediate quantities the requested operator depends on, and nothing else.
//!
//! All misuse (querying before `link` or `precompute`, querying an operator that was not
//! enabled at `link`, out-of-range indices, malformed elements) panics.
use itertools::Itertools;
use nalgebra::{Const, DMatrix, Dyn, OMatrix, Point, SVector};
use serde::{Deserialize, Serialize};

use crate::element::{Segment3Lagrange, Tet10Lagrange, Tet4Lagrange, Tri3Lagrange, Tri6Lagrange};
use crate::orientation::FaceOrientation;
use crate::topology::{EdgeSign, Topology};
use crate::Real;

mod line3;
mod planar;
mod simplex;
mod tri6_ts;
mod volumetric;

pub use line3::*;
pub use planar::*;
pub use simplex::*;
pub use tri6_ts::*;
pub use volumetric::*;

/// An operator with one row per spatial dimension and a column per degree of freedom.
pub type OperatorMatrix<T, const D: usize> = OMatrix<T, Const<D>, Dyn>;

/// How the engine treats the geometry of quadratic elements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeometryMode {
    /// Curved when any mid-edge node is off its edge midpoint.
    #[default]
    Auto,
    /// Constant nabla vectors from the vertices. Mid-edge nodes are ignored.
    Straight,
    /// Per-point nabla vectors from the full quadratic geometry.
    Curved,
}

/// Relative deviation of a mid-edge node from its edge midpoint above which an element is curved.
pub const CURVATURE_TOLERANCE: f64 = 1e-10;

impl GeometryMode {
    /// Whether the element with the given nodes is treated as curved.
    ///
    /// `edges` lists the vertex pairs whose midpoints are the nodes following the vertices.
    pub fn is_curved<T: Real, const D: usize>(&self, nodes: &[Point<T, D>], edges: &[[usize; 2]]) -> bool {
        match self {
            GeometryMode::Straight => false,
            GeometryMode::Curved => true,
            GeometryMode::Auto => has_curved_edges(nodes, edges),
        }
    }
}

/// Checks whether any mid-edge node deviates from the midpoint of its edge by more than
/// [`CURVATURE_TOLERANCE`] times the element diameter.
pub fn has_curved_edges<T: Real, const D: usize>(nodes: &[Point<T, D>], edges: &[[usize; 2]]) -> bool {
    let num_vertices = nodes.len() - edges.len();
    let vertices = &nodes[..num_vertices];
    let diameter = vertices
        .iter()
        .tuple_combinations()
        .map(|(a, b)| nalgebra::distance(a, b))
        .fold(T::zero(), |diameter, d| diameter.max(d));
    let tolerance = T::from_f64(CURVATURE_TOLERANCE).unwrap() * diameter;
    edges.iter().enumerate().any(|(e, [a, b])| {
        let midpoint = nalgebra::center(&nodes[*a], &nodes[*b]);
        nalgebra::distance(&nodes[num_vertices + e], &midpoint) > tolerance
    })
}

/// Selects the optional pipelines wired at `link`.
///
/// The interpolation operator $E$ is always available.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkFlags {
    /// Enables the curl operator $C$.
    pub curl: bool,
    /// Enables the nodal gradient operator $B$.
    pub gradient: bool,
    /// Enables the curl-of-vector-potential operator $C_A$.
    pub potential_curl: bool,
    pub geometry: GeometryMode,
}

impl LinkFlags {
    pub fn interpolation_only() -> Self {
        Self::default()
    }

    pub fn curl_only() -> Self {
        Self::default().with_curl(true)
    }

    pub fn all() -> Self {
        Self::default()
            .with_curl(true)
            .with_gradient(true)
            .with_potential_curl(true)
    }

    pub fn with_curl(self, curl: bool) -> Self {
        Self { curl, ..self }
    }

    pub fn with_gradient(self, gradient: bool) -> Self {
        Self { gradient, ..self }
    }

    pub fn with_potential_curl(self, potential_curl: bool) -> Self {
        Self { potential_curl, ..self }
    }

    pub fn with_geometry(self, geometry: GeometryMode) -> Self {
        Self { geometry, ..self }
    }
}

/// The element handle passed to [`EdgeBasis::link`].
pub trait EdgeElement<T: Real, const D: usize> {
    /// Physical node coordinates in the local node order of the topology.
    fn nodes(&self) -> &[Point<T, D>];

    /// One sign per local edge.
    fn edge_signs(&self) -> &[EdgeSign];

    /// One orientation code per local face, for topologies with face degrees of freedom.
    fn face_orientations(&self) -> &[FaceOrientation] {
        &[]
    }

    /// The local edge of the master element a facet element lies on.
    fn facet(&self) -> Option<usize> {
        None
    }
}

/// An owned element handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexElement<T: Real, const D: usize> {
    nodes: Vec<Point<T, D>>,
    edge_signs: Vec<EdgeSign>,
    face_orientations: Vec<FaceOrientation>,
    facet: Option<usize>,
}

impl<T: Real, const D: usize> SimplexElement<T, D> {
    /// An element of the given topology with positive edge signs and owned faces.
    ///
    /// # Panics
    ///
    /// Panics if the number of nodes or the dimension does not match the topology.
    pub fn for_topology(topology: Topology, nodes: Vec<Point<T, D>>) -> Self {
        assert_eq!(topology.spatial_dim(), D, "{} elements live in {} dimensions", topology, topology.spatial_dim());
        assert_eq!(nodes.len(), topology.num_nodes(), "{} elements have {} nodes", topology, topology.num_nodes());
        Self {
            nodes,
            edge_signs: vec![EdgeSign::Positive; topology.num_edges()],
            face_orientations: vec![FaceOrientation::OWNER; topology.num_oriented_faces()],
            facet: (topology == Topology::Tri6ThinShell).then_some(0),
        }
    }

    /// The reference element of the topology, embedded in `D` dimensions.
    pub fn reference(topology: Topology) -> Self {
        let nodes = match topology {
            Topology::Line3 => embed(&Segment3Lagrange::reference_nodes()),
            Topology::Tri3 => embed(&Tri3Lagrange::reference_nodes()),
            Topology::Tri6 | Topology::Tri6ThinShell => embed(&Tri6Lagrange::reference_nodes()),
            Topology::Tet4 => embed(&Tet4Lagrange::reference_nodes()),
            Topology::Tet10 => embed(&Tet10Lagrange::reference_nodes()),
        };
        Self::for_topology(topology, nodes)
    }

    pub fn with_edge_signs(self, edge_signs: impl Into<Vec<EdgeSign>>) -> Self {
        let edge_signs = edge_signs.into();
        assert_eq!(edge_signs.len(), self.edge_signs.len(), "Wrong number of edge signs");
        Self { edge_signs, ..self }
    }

    pub fn with_face_orientations(self, face_orientations: impl Into<Vec<FaceOrientation>>) -> Self {
        let face_orientations = face_orientations.into();
        assert_eq!(
            face_orientations.len(),
            self.face_orientations.len(),
            "Wrong number of face orientations"
        );
        Self {
            face_orientations,
            ..self
        }
    }

    pub fn with_facet(self, facet: usize) -> Self {
        Self {
            facet: Some(facet),
            ..self
        }
    }

    pub fn nodes_mut(&mut self) -> &mut [Point<T, D>] {
        &mut self.nodes
    }
}

fn embed<T: Real, const R: usize, const D: usize>(points: &[Point<T, R>]) -> Vec<Point<T, D>> {
    points
        .iter()
        .map(|p| Point::from(SVector::from_fn(|i, _| if i < R { p[i] } else { T::zero() })))
        .collect()
}

impl<T: Real, const D: usize> EdgeElement<T, D> for SimplexElement<T, D> {
    fn nodes(&self) -> &[Point<T, D>] {
        &self.nodes
    }

    fn edge_signs(&self) -> &[EdgeSign] {
        &self.edge_signs
    }

    fn face_orientations(&self) -> &[FaceOrientation] {
        &self.face_orientations
    }

    fn facet(&self) -> Option<usize> {
        self.facet
    }
}

/// Checks that an element handle is well-formed for a topology.
///
/// # Panics
///
/// Panics with a description of the first mismatch.
pub fn validate_element<T: Real, const D: usize>(topology: Topology, element: &dyn EdgeElement<T, D>) {
    assert_eq!(
        element.nodes().len(),
        topology.num_nodes(),
        "{} element must have {} nodes",
        topology,
        topology.num_nodes()
    );
    assert_eq!(
        element.edge_signs().len(),
        topology.num_edges(),
        "{} element must have {} edge signs",
        topology,
        topology.num_edges()
    );
    assert_eq!(
        element.face_orientations().len(),
        topology.num_oriented_faces(),
        "{} element must have {} face orientations",
        topology,
        topology.num_oriented_faces()
    );
    if topology == Topology::Tri6ThinShell {
        let facet = element
            .facet()
            .expect("Thin-shell element must name the master edge it lies on");
        assert!(facet < 3, "Facet index {} out of bounds for a triangle", facet);
    }
}

/// Converts the rows of a reference point matrix to points.
///
/// # Panics
///
/// Panics if the matrix does not have exactly `R` columns.
pub fn reference_points<T: Real, const R: usize>(points: &DMatrix<T>) -> Vec<Point<T, R>> {
    assert_eq!(
        points.ncols(),
        R,
        "Reference point matrix must have {} columns (one per reference coordinate)",
        R
    );
    points
        .row_iter()
        .map(|row| Point::from(SVector::from_fn(|i, _| row[i])))
        .collect()
}

/// Edge and face basis operators of one element topology.
pub trait EdgeBasis<T: Real, const D: usize> {
    fn topology(&self) -> Topology;

    fn num_nodes(&self) -> usize {
        self.topology().num_nodes()
    }

    /// Number of columns of the interpolation and curl operators.
    fn num_dofs(&self) -> usize {
        self.topology().num_dofs()
    }

    /// Number of reference coordinates per point, i.e. columns of the `precompute` matrix.
    fn reference_dim(&self) -> usize {
        self.topology().reference_dim()
    }

    /// Snapshots the element geometry and wires the pipelines enabled by `flags`.
    fn link(&mut self, element: &dyn EdgeElement<T, D>, flags: LinkFlags);

    /// Tabulates reference quantities at the rows of `points`.
    fn precompute(&mut self, points: &DMatrix<T>);

    fn num_points(&self) -> usize;

    /// The vector interpolation operator $E$, `D x num_dofs`.
    fn interpolation_operator(&mut self, point: usize) -> &OperatorMatrix<T, D>;

    /// The nodal gradient operator $B$, `D x num_nodes`.
    fn gradient_operator(&mut self, point: usize) -> &OperatorMatrix<T, D>;

    /// The curl operator $C$, `1 x num_dofs` in two dimensions and `3 x num_dofs` in three.
    fn curl_operator(&mut self, point: usize) -> &DMatrix<T>;

    /// The curl-of-vector-potential operator $C_A$, `D x 3 num_nodes`.
    fn potential_curl_operator(&mut self, point: usize) -> &OperatorMatrix<T, D>;

    /// The signed determinant of the element Jacobian.
    fn jacobian_determinant(&mut self, point: usize) -> T;

    /// The factor that scales reference quadrature weights.
    fn integration_weight_factor(&mut self, point: usize) -> T {
        self.jacobian_determinant(point).abs()
    }
}
