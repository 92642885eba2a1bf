use log::{debug, trace};
use nalgebra::{DMatrix, Point1, Point2, SMatrix, Vector2};

use crate::basis::{
    reference_points, validate_element, EdgeBasis, EdgeElement, LinkFlags, OperatorMatrix, PlanarEdgeBasis,
};
use crate::cache::PointCache;
use crate::element::{ReferenceFiniteElement, Tri3Lagrange};
use crate::local::{combine_value, edge_terms, oriented_edge_pair};
use crate::tables::{EdgeFamily, EdgeTable};
use crate::topology::{EdgeSign, Topology, SEGMENT_EDGES, TRIANGLE_EDGES};
use crate::Real;

/// The facet tangent $t = J \, (V_h - V_t)$, with $V_t, V_h$ the reference vertices of the facet.
#[derive(Debug, Clone)]
enum FacetTangent<T: Real> {
    Straight(Vector2<T>),
    /// Taken per point from the master Jacobian.
    Curved,
}

#[derive(Debug, Clone)]
struct FacetSnapshot<T: Real> {
    facet: usize,
    sign: EdgeSign,
    flags: LinkFlags,
    tangent: FacetTangent<T>,
}

#[derive(Debug, Clone)]
struct FacetTables<T: Real> {
    points: Vec<Point1<T>>,
    edges: EdgeTable<T, 1>,
}

/// Edge basis of a thin-shell facet lying on one edge of a quadratic triangle.
///
/// The element handle is the master triangle, with [`EdgeElement::facet`] naming the master edge.
/// Points are given in the facet coordinate $\tau \in [0, 1]$ running from the tail to the head
/// of that edge. Like a LINE3 facet, the two functions are the tangential fields
/// $p(\tau) \nabla_\Gamma \tau$ with $\nabla_\Gamma \tau = t / |t|^2$ and the traces $1 - \tau$
/// and $\tau$ along the global edge direction.
///
/// Each function is the surface gradient of its primitive $\int p \, d\tau$, so the curl operator
/// is zero. The nodal operators act on all six master nodes at the facet point.
pub struct Tri6ThinShellEdgeBasis<'g, T: Real> {
    master: PlanarEdgeBasis<'g, T>,
    snapshot: Option<FacetSnapshot<T>>,
    tables: Option<FacetTables<T>>,
    /// The facet the master's points were mapped along.
    mapped_facet: Option<usize>,
    tangent: PointCache<Vector2<T>>,
    interpolation: PointCache<OperatorMatrix<T, 2>>,
    curl: DMatrix<T>,
}

impl<'g, T: Real> std::fmt::Debug for Tri6ThinShellEdgeBasis<'g, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tri6ThinShellEdgeBasis")
            .field("facet", &self.facet())
            .field("num_points", &self.num_points())
            .finish()
    }
}

impl<'g, T: Real> Default for Tri6ThinShellEdgeBasis<'g, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The reference direction $V_h - V_t$ of master edge `facet`.
fn facet_direction<T: Real>(facet: usize) -> Vector2<T> {
    let vertices: [Point2<T>; 3] = Tri3Lagrange::reference_nodes();
    let [tail, head] = TRIANGLE_EDGES[facet];
    vertices[head] - vertices[tail]
}

/// Maps facet coordinates to master reference coordinates along edge `facet`.
fn facet_to_master<T: Real>(points: &[Point1<T>], facet: usize) -> DMatrix<T> {
    let vertices = Tri3Lagrange::reference_nodes::<T>();
    let [tail, head] = TRIANGLE_EDGES[facet];
    let (a, b) = (vertices[tail], vertices[head]);
    let mut master_points = DMatrix::zeros(points.len(), 2);
    for (i, tau) in points.iter().enumerate() {
        let xi = a + (b - a) * tau.x;
        master_points[(i, 0)] = xi.x;
        master_points[(i, 1)] = xi.y;
    }
    master_points
}

impl<'g, T: Real> Tri6ThinShellEdgeBasis<'g, T> {
    pub fn new() -> Self {
        Self::from_master(PlanarEdgeBasis::tri6())
    }

    /// Borrows the geometry shape functions of the owning group for the master triangle.
    pub fn with_shapes(shapes: &'g dyn ReferenceFiniteElement<T, 2>) -> Self {
        Self::from_master(PlanarEdgeBasis::tri6_with_shapes(shapes))
    }

    fn from_master(master: PlanarEdgeBasis<'g, T>) -> Self {
        Self {
            master,
            snapshot: None,
            tables: None,
            mapped_facet: None,
            tangent: PointCache::new(),
            interpolation: PointCache::new(),
            curl: DMatrix::zeros(1, 2),
        }
    }

    /// The master edge of the linked facet.
    pub fn facet(&self) -> Option<usize> {
        self.snapshot.as_ref().map(|snapshot| snapshot.facet)
    }

    /// Keeps the master's points on the linked facet.
    fn sync_master_points(&mut self) {
        if let (Some(facet), Some(tables)) = (self.facet(), &self.tables) {
            if self.mapped_facet != Some(facet) {
                self.master.precompute(&facet_to_master(&tables.points, facet));
                self.mapped_facet = Some(facet);
            }
        }
    }

    fn check_point(&self, point: usize) {
        assert!(self.snapshot.is_some(), "TRI6_TS basis queried before link");
        let num_points = self
            .tables
            .as_ref()
            .map(|tables| tables.edges.num_points())
            .expect("TRI6_TS basis queried before precompute");
        assert!(
            point < num_points,
            "Point index {} out of bounds for {} precomputed points",
            point,
            num_points
        );
    }

    fn snapshot(&self) -> &FacetSnapshot<T> {
        self.snapshot.as_ref().expect("Element must be linked")
    }

    /// The facet tangent $dx / d\tau$ at a point.
    pub fn tangent(&mut self, point: usize) -> Vector2<T> {
        self.check_point(point);
        if !self.tangent.is_current(point) {
            let snapshot = self.snapshot.as_ref().expect("Element must be linked");
            let t = match &snapshot.tangent {
                FacetTangent::Straight(t) => *t,
                FacetTangent::Curved => {
                    let direction = facet_direction(snapshot.facet);
                    self.master.nabla(point).factors.jacobian * direction
                }
            };
            self.tangent.get_or_insert_with(point, || t);
        }
        *self.tangent.value()
    }
}

impl<'g, T: Real> EdgeBasis<T, 2> for Tri6ThinShellEdgeBasis<'g, T> {
    fn topology(&self) -> Topology {
        Topology::Tri6ThinShell
    }

    fn link(&mut self, element: &dyn EdgeElement<T, 2>, flags: LinkFlags) {
        validate_element(Topology::Tri6ThinShell, element);
        let facet = element.facet().expect("Validated thin-shell element names its facet");
        self.master.link(element, flags);
        let curved = self.master.is_curved();
        let tangent = if curved {
            FacetTangent::Curved
        } else {
            // The vertex Jacobian of the master, as the straight nabla path builds it
            let nodes = element.nodes();
            let jacobian = SMatrix::<T, 2, 2>::from_fn(|i, k| nodes[k + 1][i] - nodes[0][i]);
            FacetTangent::Straight(jacobian * facet_direction(facet))
        };
        debug!("Linked TRI6_TS element on master edge {} (curved: {})", facet, curved);
        self.snapshot = Some(FacetSnapshot {
            facet,
            sign: element.edge_signs()[facet],
            flags,
            tangent,
        });
        self.sync_master_points();
        self.tangent.invalidate();
        self.interpolation.invalidate();
    }

    fn precompute(&mut self, points: &DMatrix<T>) {
        let points = reference_points::<T, 1>(points);
        trace!("Precomputing TRI6_TS basis at {} points", points.len());
        self.tables = Some(FacetTables {
            edges: EdgeTable::build(EdgeFamily::Quadratic, &SEGMENT_EDGES, &points),
            points,
        });
        self.mapped_facet = None;
        self.sync_master_points();
        self.tangent.invalidate();
        self.interpolation.invalidate();
    }

    fn num_points(&self) -> usize {
        self.tables.as_ref().map_or(0, |tables| tables.edges.num_points())
    }

    fn interpolation_operator(&mut self, point: usize) -> &OperatorMatrix<T, 2> {
        let t = self.tangent(point);
        if !self.interpolation.is_current(point) {
            let surface_gradient = t / t.norm_squared();
            // Only lambda_1 = tau varies along the facet
            let nabla = |k: usize| {
                if k == 1 {
                    surface_gradient
                } else {
                    -surface_gradient
                }
            };
            let tables = self.tables.as_ref().expect("Points must be precomputed");
            let raw: Vec<_> = tables
                .edges
                .get(point, 0)
                .iter()
                .map(|coefficients| combine_value(&edge_terms(coefficients, SEGMENT_EDGES[0]), nabla))
                .collect();
            let dofs = oriented_edge_pair(self.snapshot().sign, [raw[0], raw[1]]);
            self.interpolation
                .get_or_insert_with(point, || OperatorMatrix::from_columns(&dofs));
        }
        self.interpolation.value()
    }

    fn gradient_operator(&mut self, point: usize) -> &OperatorMatrix<T, 2> {
        self.check_point(point);
        self.master.gradient_operator(point)
    }

    fn curl_operator(&mut self, point: usize) -> &DMatrix<T> {
        self.check_point(point);
        assert!(
            self.snapshot().flags.curl,
            "Curl operator of TRI6_TS basis was not enabled at link"
        );
        &self.curl
    }

    fn potential_curl_operator(&mut self, point: usize) -> &OperatorMatrix<T, 2> {
        self.check_point(point);
        self.master.potential_curl_operator(point)
    }

    /// The length scale $|dx / d\tau|$ of the facet.
    fn jacobian_determinant(&mut self, point: usize) -> T {
        self.tangent(point).norm()
    }
}
