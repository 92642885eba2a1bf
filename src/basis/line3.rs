use log::{debug, trace};
use nalgebra::{DMatrix, Point1, Point2, Vector1, Vector2};

use crate::basis::{reference_points, validate_element, EdgeBasis, EdgeElement, LinkFlags, OperatorMatrix};
use crate::cache::PointCache;
use crate::element::{ReferenceFiniteElement, Segment3Lagrange};
use crate::local::{combine_value, edge_terms, oriented_edge_pair};
use crate::tables::{EdgeFamily, EdgeTable};
use crate::topology::{EdgeSign, Topology, SEGMENT_EDGES};
use crate::Real;

/// The tangent $t = dx / d\tau$ of the linked facet.
#[derive(Debug, Clone)]
enum Tangent<T: Real> {
    Straight(Vector2<T>),
    /// Recomputed per point from the shape function derivatives.
    Curved,
}

#[derive(Debug, Clone)]
struct LineSnapshot<T: Real> {
    nodes: Vec<Point2<T>>,
    sign: EdgeSign,
    flags: LinkFlags,
    tangent: Tangent<T>,
}

#[derive(Debug, Clone)]
struct LineTables<T: Real> {
    points: Vec<Point1<T>>,
    edges: EdgeTable<T, 1>,
    /// $dN_a / d\tau$, `[point][node]`.
    shape_derivatives: Vec<Vec<T>>,
}

/// Edge basis of a quadratic line facet in the plane.
///
/// The facet carries the tangential field $f = p(\tau) \nabla_\Gamma \tau$ with the surface
/// gradient $\nabla_\Gamma \tau = t / |t|^2$. Its two functions have the tangential traces
/// $1 - \tau$ and $\tau$ along the global edge direction. A line has no curl, so only the
/// interpolation and gradient operators exist.
pub struct Line3EdgeBasis<'g, T: Real> {
    shapes: &'g dyn ReferenceFiniteElement<T, 1>,
    snapshot: Option<LineSnapshot<T>>,
    tables: Option<LineTables<T>>,
    caches: Caches<T>,
}

impl<'g, T: Real> std::fmt::Debug for Line3EdgeBasis<'g, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Line3EdgeBasis")
            .field("linked", &self.snapshot.is_some())
            .field("num_points", &self.num_points())
            .finish()
    }
}

impl<'g, T: Real> Line3EdgeBasis<'g, T> {
    pub fn new() -> Self {
        Self::with_shapes(&Segment3Lagrange)
    }

    pub fn with_shapes(shapes: &'g dyn ReferenceFiniteElement<T, 1>) -> Self {
        assert_eq!(shapes.num_nodes(), 3, "LINE3 shape functions must have 3 nodes");
        Self {
            shapes,
            snapshot: None,
            tables: None,
            caches: Caches::default(),
        }
    }

    fn check_point(&self, point: usize) {
        assert!(self.snapshot.is_some(), "LINE3 basis queried before link");
        let num_points = self
            .tables
            .as_ref()
            .map(|tables| tables.points.len())
            .expect("LINE3 basis queried before precompute");
        assert!(
            point < num_points,
            "Point index {} out of bounds for {} precomputed points",
            point,
            num_points
        );
    }

    /// Separates the linked state from the caches.
    fn split(&mut self) -> (&LineSnapshot<T>, &LineTables<T>, &mut Caches<T>) {
        (
            self.snapshot.as_ref().expect("Element must be linked"),
            self.tables.as_ref().expect("Points must be precomputed"),
            &mut self.caches,
        )
    }

    /// The facet tangent $dx / d\tau$ at a point.
    pub fn tangent(&mut self, point: usize) -> Vector2<T> {
        self.check_point(point);
        let (snapshot, tables, caches) = self.split();
        caches.tangent(snapshot, tables, point)
    }
}

#[derive(Debug, Clone)]
struct Caches<T: Real> {
    tangent: PointCache<Vector2<T>>,
    interpolation: PointCache<OperatorMatrix<T, 2>>,
    gradient: PointCache<OperatorMatrix<T, 2>>,
}

impl<T: Real> Default for Caches<T> {
    fn default() -> Self {
        Self {
            tangent: PointCache::new(),
            interpolation: PointCache::new(),
            gradient: PointCache::new(),
        }
    }
}

impl<T: Real> Caches<T> {
    fn tangent(&mut self, snapshot: &LineSnapshot<T>, tables: &LineTables<T>, point: usize) -> Vector2<T> {
        *self.tangent.get_or_insert_with(point, || match &snapshot.tangent {
            Tangent::Straight(t) => *t,
            Tangent::Curved => {
                let mut t = Vector2::zeros();
                for (node, dn) in snapshot.nodes.iter().zip(&tables.shape_derivatives[point]) {
                    t += node.coords * *dn;
                }
                t
            }
        })
    }

    fn surface_gradient(&mut self, snapshot: &LineSnapshot<T>, tables: &LineTables<T>, point: usize) -> Vector2<T> {
        let t = self.tangent(snapshot, tables, point);
        t / t.norm_squared()
    }

    fn interpolation(&mut self, snapshot: &LineSnapshot<T>, tables: &LineTables<T>, point: usize) -> &OperatorMatrix<T, 2> {
        if !self.interpolation.is_current(point) {
            let surface_gradient = self.surface_gradient(snapshot, tables, point);
            // Only lambda_1 = tau varies along the facet
            let nabla = |k: usize| {
                if k == 1 {
                    surface_gradient
                } else {
                    -surface_gradient
                }
            };
            let raw: Vec<_> = tables
                .edges
                .get(point, 0)
                .iter()
                .map(|coefficients| combine_value(&edge_terms(coefficients, SEGMENT_EDGES[0]), nabla))
                .collect();
            let dofs = oriented_edge_pair(snapshot.sign, [raw[0], raw[1]]);
            self.interpolation
                .get_or_insert_with(point, || OperatorMatrix::from_columns(&dofs));
        }
        self.interpolation.value()
    }

    fn gradient(&mut self, snapshot: &LineSnapshot<T>, tables: &LineTables<T>, point: usize) -> &OperatorMatrix<T, 2> {
        if !self.gradient.is_current(point) {
            let surface_gradient = self.surface_gradient(snapshot, tables, point);
            let columns: Vec<_> = tables.shape_derivatives[point]
                .iter()
                .map(|dn| surface_gradient * *dn)
                .collect();
            self.gradient
                .get_or_insert_with(point, || OperatorMatrix::from_columns(&columns));
        }
        self.gradient.value()
    }
}

impl<'g, T: Real> Default for Line3EdgeBasis<'g, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'g, T: Real> EdgeBasis<T, 2> for Line3EdgeBasis<'g, T> {
    fn topology(&self) -> Topology {
        Topology::Line3
    }

    fn link(&mut self, element: &dyn EdgeElement<T, 2>, flags: LinkFlags) {
        validate_element(Topology::Line3, element);
        assert!(
            !flags.curl && !flags.potential_curl,
            "LINE3 elements have no curl; link them without curl or potential curl"
        );
        let nodes = element.nodes().to_vec();
        let curved = flags.geometry.is_curved(&nodes, &SEGMENT_EDGES);
        let tangent = if curved {
            Tangent::Curved
        } else {
            Tangent::Straight(nodes[1] - nodes[0])
        };
        debug!("Linked LINE3 element (curved: {}, gradient: {})", curved, flags.gradient);
        self.snapshot = Some(LineSnapshot {
            nodes,
            sign: element.edge_signs()[0],
            flags,
            tangent,
        });
        self.caches = Caches::default();
    }

    fn precompute(&mut self, points: &DMatrix<T>) {
        let points = reference_points::<T, 1>(points);
        trace!("Precomputing LINE3 basis at {} points", points.len());
        let shapes = self.shapes;
        let mut gradients = vec![Vector1::zeros(); shapes.num_nodes()];
        let shape_derivatives: Vec<Vec<T>> = points
            .iter()
            .map(|tau| {
                shapes.populate_basis_gradients(&mut gradients, tau);
                gradients.iter().map(|g| g[0]).collect()
            })
            .collect();
        self.tables = Some(LineTables {
            edges: EdgeTable::build(EdgeFamily::Quadratic, &SEGMENT_EDGES, &points),
            shape_derivatives,
            points,
        });
        self.caches = Caches::default();
    }

    fn num_points(&self) -> usize {
        self.tables.as_ref().map_or(0, |tables| tables.points.len())
    }

    fn interpolation_operator(&mut self, point: usize) -> &OperatorMatrix<T, 2> {
        self.check_point(point);
        let (snapshot, tables, caches) = self.split();
        caches.interpolation(snapshot, tables, point)
    }

    fn gradient_operator(&mut self, point: usize) -> &OperatorMatrix<T, 2> {
        self.check_point(point);
        let (snapshot, tables, caches) = self.split();
        assert!(
            snapshot.flags.gradient,
            "Gradient operator of LINE3 basis was not enabled at link"
        );
        caches.gradient(snapshot, tables, point)
    }

    fn curl_operator(&mut self, _point: usize) -> &DMatrix<T> {
        panic!("LINE3 elements have no curl operator")
    }

    fn potential_curl_operator(&mut self, _point: usize) -> &OperatorMatrix<T, 2> {
        panic!("LINE3 elements have no potential curl operator")
    }

    /// The length scale $|dx / d\tau|$ of the facet.
    fn jacobian_determinant(&mut self, point: usize) -> T {
        self.tangent(point).norm()
    }
}
