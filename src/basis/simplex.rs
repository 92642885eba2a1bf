use log::{debug, trace};
use nalgebra::{DMatrix, Point, SMatrix, SVector};
use std::marker::PhantomData;

use crate::basis::{reference_points, validate_element, EdgeBasis, EdgeElement, LinkFlags, OperatorMatrix};
use crate::cache::PointCache;
use crate::element::ReferenceFiniteElement;
use crate::geometry::{jacobian_from_gradients, Cofactor, JacobianFactors};
use crate::local::{
    combine_jet, combine_value, edge_terms, face_terms, oriented_edge, oriented_edge_pair, third_face_function,
    VectorJet,
};
use crate::nabla::{NablaDerivatives, NablaField, NablaSet};
use crate::orientation::{reconcile_face, FaceOrientation};
use crate::tables::{EdgeFamily, EdgeTable, FaceTable};
use crate::topology::{EdgeSign, Topology};
use crate::Real;

/// Static description of a simplex topology.
#[derive(Debug)]
pub struct SimplexLayout {
    pub topology: Topology,
    pub num_vertices: usize,
    /// Local edges as `[tail, head]` vertex pairs.
    pub edges: &'static [[usize; 2]],
    /// Faces carrying two degrees of freedom each.
    pub faces: &'static [[usize; 3]],
    /// Whether the face functions are shared between elements and need reconciliation.
    pub reconcile_faces: bool,
    pub family: EdgeFamily,
}

impl SimplexLayout {
    pub fn num_edge_functions(&self) -> usize {
        self.edges.len() * self.family.functions_per_edge()
    }

    pub fn num_dofs(&self) -> usize {
        self.num_edge_functions() + 2 * self.faces.len()
    }

    /// Applies edge signs and face orientations to raw functions, giving one function per dof.
    ///
    /// `raw` holds the edge functions in table order followed by the two raw functions of
    /// each face.
    pub fn orient<V>(&self, edge_signs: &[EdgeSign], face_orientations: &[FaceOrientation], raw: &[V]) -> Vec<V>
    where
        V: Clone + std::ops::Add<Output = V> + std::ops::Neg<Output = V>,
    {
        assert_eq!(raw.len(), self.num_dofs());
        let (edge_functions, face_functions) = raw.split_at(self.num_edge_functions());
        let mut dofs = Vec::with_capacity(raw.len());
        match self.family {
            EdgeFamily::Linear => {
                for (sign, f) in edge_signs.iter().zip(edge_functions) {
                    dofs.push(oriented_edge(*sign, f.clone()));
                }
            }
            EdgeFamily::Quadratic => {
                for (sign, pair) in edge_signs.iter().zip(edge_functions.chunks_exact(2)) {
                    dofs.extend(oriented_edge_pair(*sign, [pair[0].clone(), pair[1].clone()]));
                }
            }
        }
        for (f, pair) in face_functions.chunks_exact(2).enumerate() {
            let raw_pair = [pair[0].clone(), pair[1].clone()];
            if self.reconcile_faces {
                let third = third_face_function(&raw_pair);
                let [r0, r1] = raw_pair;
                let [first, second, _] = reconcile_face(face_orientations[f], &[r0, r1, third]);
                dofs.extend([first, second]);
            } else {
                dofs.extend(raw_pair);
            }
        }
        dofs
    }
}

/// Dimension-specific parts of a simplex engine: the curl and the vector potential pattern.
pub trait SimplexSpace<T: Real, const D: usize> {
    /// Number of rows of the curl operator.
    const CURL_ROWS: usize;

    fn write_curl(curl: &mut DMatrix<T>, column: usize, jet: &VectorJet<T, D>, nabla: &NablaSet<T, D>);

    /// Expands the nodal gradient operator into the curl of a nodal vector potential.
    fn potential_curl(gradient: &OperatorMatrix<T, D>) -> OperatorMatrix<T, D>;
}

#[derive(Debug, Clone)]
struct Snapshot<T: Real, const D: usize> {
    nodes: Vec<Point<T, D>>,
    edge_signs: Vec<EdgeSign>,
    face_orientations: Vec<FaceOrientation>,
}

#[derive(Debug, Clone)]
struct LinkState<T: Real, const D: usize> {
    flags: LinkFlags,
    nabla: NablaField<T, D>,
}

#[derive(Debug, Clone)]
struct PointTables<T: Real, const D: usize> {
    points: Vec<Point<T, D>>,
    edges: EdgeTable<T, D>,
    faces: FaceTable<T, D>,
    /// Reference gradients of the geometry shape functions, `[point][node]`.
    shape_gradients: Vec<Vec<SVector<T, D>>>,
}

#[derive(Debug, Clone)]
struct Caches<T: Real, const D: usize> {
    jacobian: PointCache<JacobianFactors<T, D>>,
    nabla: PointCache<NablaSet<T, D>>,
    nabla_derivatives: PointCache<Option<NablaDerivatives<T, D>>>,
    raw_values: PointCache<Vec<SVector<T, D>>>,
    raw_jets: PointCache<Vec<VectorJet<T, D>>>,
    interpolation: PointCache<OperatorMatrix<T, D>>,
    gradient: PointCache<OperatorMatrix<T, D>>,
    curl: PointCache<DMatrix<T>>,
    potential_curl: PointCache<OperatorMatrix<T, D>>,
}

impl<T: Real, const D: usize> Default for Caches<T, D> {
    fn default() -> Self {
        Self {
            jacobian: PointCache::new(),
            nabla: PointCache::new(),
            nabla_derivatives: PointCache::new(),
            raw_values: PointCache::new(),
            raw_jets: PointCache::new(),
            interpolation: PointCache::new(),
            gradient: PointCache::new(),
            curl: PointCache::new(),
            potential_curl: PointCache::new(),
        }
    }
}

/// The state an accessor needs besides the caches.
struct Linked<'a, T: Real, const D: usize> {
    layout: &'static SimplexLayout,
    snapshot: &'a Snapshot<T, D>,
    link: &'a LinkState<T, D>,
    tables: &'a PointTables<T, D>,
}

impl<'a, T, const D: usize> Linked<'a, T, D>
where
    T: Real,
    SMatrix<T, D, D>: Cofactor<T>,
{
    fn raw_values(&self, point: usize, nabla: &NablaSet<T, D>) -> Vec<SVector<T, D>> {
        let layout = self.layout;
        let mut raw = Vec::with_capacity(layout.num_dofs());
        for (e, edge) in layout.edges.iter().enumerate() {
            for coefficients in self.tables.edges.get(point, e) {
                raw.push(combine_value(&edge_terms(coefficients, *edge), |k| nabla.barycentric(k)));
            }
        }
        for (f, face) in layout.faces.iter().enumerate() {
            for coefficients in self.tables.faces.get(point, f) {
                raw.push(combine_value(&face_terms(coefficients, *face), |k| nabla.barycentric(k)));
            }
        }
        raw
    }

    fn raw_jets(
        &self,
        point: usize,
        nabla: &NablaSet<T, D>,
        derivatives: Option<&NablaDerivatives<T, D>>,
    ) -> Vec<VectorJet<T, D>> {
        let layout = self.layout;
        let mut raw = Vec::with_capacity(layout.num_dofs());
        for (e, edge) in layout.edges.iter().enumerate() {
            for coefficients in self.tables.edges.get(point, e) {
                raw.push(combine_jet(&edge_terms(coefficients, *edge), nabla, derivatives));
            }
        }
        for (f, face) in layout.faces.iter().enumerate() {
            for coefficients in self.tables.faces.get(point, f) {
                raw.push(combine_jet(&face_terms(coefficients, *face), nabla, derivatives));
            }
        }
        raw
    }

    fn orient<V>(&self, raw: &[V]) -> Vec<V>
    where
        V: Clone + std::ops::Add<Output = V> + std::ops::Neg<Output = V>,
    {
        self.layout
            .orient(&self.snapshot.edge_signs, &self.snapshot.face_orientations, raw)
    }
}

impl<T, const D: usize> Caches<T, D>
where
    T: Real,
    SMatrix<T, D, D>: Cofactor<T>,
{
    fn invalidate(&mut self) {
        *self = Self::default();
    }

    fn ensure_jacobian(&mut self, linked: &Linked<T, D>, point: usize) {
        self.jacobian.get_or_insert_with(point, || {
            let jacobian = jacobian_from_gradients(&linked.snapshot.nodes, &linked.tables.shape_gradients[point]);
            JacobianFactors::new(jacobian)
        });
    }

    fn ensure_nabla(&mut self, linked: &Linked<T, D>, point: usize) {
        self.nabla
            .get_or_insert_with(point, || linked.link.nabla.nabla_at(&linked.tables.points[point]));
    }

    fn ensure_nabla_derivatives(&mut self, linked: &Linked<T, D>, point: usize) {
        self.ensure_nabla(linked, point);
        if self.nabla_derivatives.is_current(point) {
            return;
        }
        let nabla = self.nabla.value();
        self.nabla_derivatives
            .get_or_insert_with(point, || linked.link.nabla.derivatives_at(nabla));
    }

    fn ensure_raw_values(&mut self, linked: &Linked<T, D>, point: usize) {
        self.ensure_nabla(linked, point);
        if self.raw_values.is_current(point) {
            return;
        }
        let nabla = self.nabla.value();
        self.raw_values
            .get_or_insert_with(point, || linked.raw_values(point, nabla));
    }

    fn ensure_raw_jets(&mut self, linked: &Linked<T, D>, point: usize) {
        self.ensure_nabla_derivatives(linked, point);
        if self.raw_jets.is_current(point) {
            return;
        }
        let nabla = self.nabla.value();
        let derivatives = self.nabla_derivatives.value().as_ref();
        self.raw_jets
            .get_or_insert_with(point, || linked.raw_jets(point, nabla, derivatives));
    }

    fn interpolation(&mut self, linked: &Linked<T, D>, point: usize) -> &OperatorMatrix<T, D> {
        if !self.interpolation.is_current(point) {
            self.ensure_raw_values(linked, point);
            let dofs = linked.orient(self.raw_values.value());
            self.interpolation
                .get_or_insert_with(point, || OperatorMatrix::from_columns(&dofs));
        }
        self.interpolation.value()
    }

    fn curl<S: SimplexSpace<T, D>>(&mut self, linked: &Linked<T, D>, point: usize) -> &DMatrix<T> {
        if !self.curl.is_current(point) {
            self.ensure_raw_jets(linked, point);
            let dofs = linked.orient(self.raw_jets.value());
            let nabla = self.nabla.value();
            self.curl.get_or_insert_with(point, || {
                let mut curl = DMatrix::zeros(S::CURL_ROWS, dofs.len());
                for (column, jet) in dofs.iter().enumerate() {
                    S::write_curl(&mut curl, column, jet, nabla);
                }
                curl
            });
        }
        self.curl.value()
    }

    fn gradient(&mut self, linked: &Linked<T, D>, point: usize) -> &OperatorMatrix<T, D> {
        if !self.gradient.is_current(point) {
            self.ensure_jacobian(linked, point);
            let factors = self.jacobian.value();
            let reference_gradients = &linked.tables.shape_gradients[point];
            self.gradient.get_or_insert_with(point, || {
                let columns: Vec<_> = reference_gradients
                    .iter()
                    .map(|g| factors.physical_gradient(g))
                    .collect();
                OperatorMatrix::from_columns(&columns)
            });
        }
        self.gradient.value()
    }

    fn potential_curl<S: SimplexSpace<T, D>>(&mut self, linked: &Linked<T, D>, point: usize) -> &OperatorMatrix<T, D> {
        if !self.potential_curl.is_current(point) {
            self.gradient(linked, point);
            let gradient = self.gradient.value();
            self.potential_curl
                .get_or_insert_with(point, || S::potential_curl(gradient));
        }
        self.potential_curl.value()
    }
}

/// Edge basis engine shared by the triangle and tetrahedron topologies.
///
/// `shapes` are the geometry shape functions of the owning mesh group. They are borrowed for the
/// lifetime of the engine and only used for the Jacobian path.
pub struct SimplexEngine<'g, T: Real, S, const D: usize> {
    layout: &'static SimplexLayout,
    shapes: &'g dyn ReferenceFiniteElement<T, D>,
    snapshot: Option<Snapshot<T, D>>,
    link: Option<LinkState<T, D>>,
    tables: Option<PointTables<T, D>>,
    caches: Caches<T, D>,
    space: PhantomData<S>,
}

impl<'g, T, S, const D: usize> std::fmt::Debug for SimplexEngine<'g, T, S, D>
where
    T: Real,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexEngine")
            .field("topology", &self.layout.topology)
            .field("linked", &self.link.is_some())
            .field("num_points", &self.tables.as_ref().map(|tables| tables.points.len()))
            .finish()
    }
}

impl<'g, T, S, const D: usize> SimplexEngine<'g, T, S, D>
where
    T: Real,
    S: SimplexSpace<T, D>,
    SMatrix<T, D, D>: Cofactor<T>,
{
    /// Creates an engine for the given layout, borrowing the group's geometry shape functions.
    ///
    /// # Panics
    ///
    /// Panics if the shape functions do not have one node per element node.
    pub fn with_shapes(layout: &'static SimplexLayout, shapes: &'g dyn ReferenceFiniteElement<T, D>) -> Self {
        assert_eq!(layout.topology.reference_dim(), D);
        assert_eq!(
            shapes.num_nodes(),
            layout.topology.num_nodes(),
            "Shape functions must have one node per {} node",
            layout.topology
        );
        Self {
            layout,
            shapes,
            snapshot: None,
            link: None,
            tables: None,
            caches: Caches::default(),
            space: PhantomData,
        }
    }

    pub fn layout(&self) -> &'static SimplexLayout {
        self.layout
    }

    /// Whether the linked element uses per-point nabla vectors.
    pub fn is_curved(&self) -> bool {
        self.link.as_ref().map_or(false, |link| link.nabla.is_curved())
    }

    fn check_point(&self, point: usize) {
        let topology = self.layout.topology;
        assert!(self.link.is_some(), "{} basis queried before link", topology);
        let tables = self
            .tables
            .as_ref()
            .unwrap_or_else(|| panic!("{} basis queried before precompute", topology));
        assert!(
            point < tables.points.len(),
            "Point index {} out of bounds for {} precomputed points",
            point,
            tables.points.len()
        );
    }

    fn check_enabled(&self, enabled: impl FnOnce(&LinkFlags) -> bool, operator: &str) {
        let topology = self.layout.topology;
        let link = self
            .link
            .as_ref()
            .unwrap_or_else(|| panic!("{} basis queried before link", topology));
        assert!(
            enabled(&link.flags),
            "{} operator of {} basis was not enabled at link",
            operator,
            topology
        );
    }

    /// Separates the immutable per-element and per-rule state from the caches.
    fn split(&mut self) -> (Linked<'_, T, D>, &mut Caches<T, D>) {
        let linked = Linked {
            layout: self.layout,
            snapshot: self.snapshot.as_ref().expect("Element must be linked"),
            link: self.link.as_ref().expect("Element must be linked"),
            tables: self.tables.as_ref().expect("Points must be precomputed"),
        };
        (linked, &mut self.caches)
    }

    /// The Jacobian factors of the linked element at a point, from the geometry shape functions.
    pub fn jacobian(&mut self, point: usize) -> &JacobianFactors<T, D> {
        self.check_point(point);
        let (linked, caches) = self.split();
        caches.ensure_jacobian(&linked, point);
        caches.jacobian.value()
    }

    /// The nabla vectors of the linked element at a point.
    pub fn nabla(&mut self, point: usize) -> &NablaSet<T, D> {
        self.check_point(point);
        let (linked, caches) = self.split();
        caches.ensure_nabla(&linked, point);
        caches.nabla.value()
    }
}

impl<'g, T, S, const D: usize> EdgeBasis<T, D> for SimplexEngine<'g, T, S, D>
where
    T: Real,
    S: SimplexSpace<T, D>,
    SMatrix<T, D, D>: Cofactor<T>,
{
    fn topology(&self) -> Topology {
        self.layout.topology
    }

    fn link(&mut self, element: &dyn EdgeElement<T, D>, flags: LinkFlags) {
        let layout = self.layout;
        validate_element(layout.topology, element);
        let nodes = element.nodes().to_vec();
        let curved = layout.family == EdgeFamily::Quadratic && flags.geometry.is_curved(&nodes, layout.edges);
        let nabla = if curved {
            NablaField::curved(&nodes, layout.edges)
        } else {
            NablaField::straight(&nodes[..layout.num_vertices])
        };
        debug!(
            "Linked {} element (curved: {}, curl: {}, gradient: {}, potential curl: {})",
            layout.topology, curved, flags.curl, flags.gradient, flags.potential_curl
        );
        self.snapshot = Some(Snapshot {
            nodes,
            edge_signs: element.edge_signs().to_vec(),
            face_orientations: element.face_orientations().to_vec(),
        });
        self.link = Some(LinkState { flags, nabla });
        self.caches.invalidate();
    }

    fn precompute(&mut self, points: &DMatrix<T>) {
        let layout = self.layout;
        let points = reference_points::<T, D>(points);
        trace!("Precomputing {} basis at {} points", layout.topology, points.len());
        let shapes = self.shapes;
        let mut gradients = vec![SVector::zeros(); shapes.num_nodes()];
        let shape_gradients = points
            .iter()
            .map(|xi| {
                shapes.populate_basis_gradients(&mut gradients, xi);
                gradients.clone()
            })
            .collect();
        self.tables = Some(PointTables {
            edges: EdgeTable::build(layout.family, layout.edges, &points),
            faces: FaceTable::build(layout.faces, &points),
            shape_gradients,
            points,
        });
        self.caches.invalidate();
    }

    fn num_points(&self) -> usize {
        self.tables.as_ref().map_or(0, |tables| tables.points.len())
    }

    fn interpolation_operator(&mut self, point: usize) -> &OperatorMatrix<T, D> {
        self.check_point(point);
        let (linked, caches) = self.split();
        caches.interpolation(&linked, point)
    }

    fn gradient_operator(&mut self, point: usize) -> &OperatorMatrix<T, D> {
        self.check_point(point);
        self.check_enabled(|flags| flags.gradient, "Gradient");
        let (linked, caches) = self.split();
        caches.gradient(&linked, point)
    }

    fn curl_operator(&mut self, point: usize) -> &DMatrix<T> {
        self.check_point(point);
        self.check_enabled(|flags| flags.curl, "Curl");
        let (linked, caches) = self.split();
        caches.curl::<S>(&linked, point)
    }

    fn potential_curl_operator(&mut self, point: usize) -> &OperatorMatrix<T, D> {
        self.check_point(point);
        self.check_enabled(|flags| flags.potential_curl, "Potential curl");
        let (linked, caches) = self.split();
        caches.potential_curl::<S>(&linked, point)
    }

    fn jacobian_determinant(&mut self, point: usize) -> T {
        self.jacobian(point).determinant
    }
}
