//! Physical gradients of barycentric coordinates ("nabla vectors").
//!
//! For a simplex with reference coordinates $\xi_0, \dots, \xi_{D-1}$, the gradient of
//! $\lambda_{k+1} = \xi_k$ is row $k$ of the inverse Jacobian, and
//! $\nabla \lambda_0 = -\sum_k \nabla \lambda_{k+1}$. For straight elements the Jacobian is
//! constant. For quadratic (possibly curved) elements it is affine in the reference coordinates,
//! $J(\xi) = J_0 + \sum_d \xi_d J_d$, which also makes the reference derivatives of the nabla
//! vectors available in closed form.
use nalgebra::{Point, SMatrix, SVector};

use crate::element::{barycentric_coordinate, barycentric_gradient};
use crate::geometry::{determinant_derivative, Cofactor, JacobianFactors};
use crate::Real;

/// Nabla vectors at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct NablaSet<T: Real, const D: usize> {
    /// `nablas[k]` is the gradient of the reference coordinate $\xi_k$.
    pub nablas: [SVector<T, D>; D],
    /// The Jacobian the nablas were derived from.
    pub factors: JacobianFactors<T, D>,
}

impl<T, const D: usize> NablaSet<T, D>
where
    T: Real,
    SMatrix<T, D, D>: Cofactor<T>,
{
    pub fn from_jacobian(jacobian: SMatrix<T, D, D>) -> Self {
        let factors = JacobianFactors::new(jacobian);
        let inverse = factors.inverse();
        let mut nablas = [SVector::zeros(); D];
        for (k, nabla) in nablas.iter_mut().enumerate() {
            *nabla = inverse.row(k).transpose();
        }
        Self { nablas, factors }
    }

    /// The Jacobian of a straight simplex, whose columns are the edge vectors $X_{k+1} - X_0$.
    pub fn from_vertices(vertices: &[Point<T, D>]) -> Self {
        assert!(vertices.len() > D, "A {}-simplex needs {} vertices", D, D + 1);
        let jacobian = SMatrix::from_fn(|i, k| vertices[k + 1][i] - vertices[0][i]);
        Self::from_jacobian(jacobian)
    }
}

impl<T: Real, const D: usize> NablaSet<T, D> {
    pub fn determinant(&self) -> T {
        self.factors.determinant
    }

    /// The gradient of the barycentric coordinate $\lambda_k$.
    pub fn barycentric(&self, k: usize) -> SVector<T, D> {
        if k == 0 {
            let mut sum = SVector::zeros();
            for nabla in &self.nablas {
                sum += nabla;
            }
            -sum
        } else {
            self.nablas[k - 1]
        }
    }
}

/// Derivatives of the nabla vectors with respect to the reference coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NablaDerivatives<T: Real, const D: usize> {
    /// `derivatives[k][d]` is $\partial \nabla \xi_k / \partial \xi_d$.
    pub derivatives: [[SVector<T, D>; D]; D],
}

impl<T, const D: usize> NablaDerivatives<T, D>
where
    T: Real,
    SMatrix<T, D, D>: Cofactor<T>,
{
    /// Differentiates $J^{-1} = \operatorname{adj}(J) / \det J$ along each Jacobian slope $J_d$.
    pub fn from_factors(factors: &JacobianFactors<T, D>, slopes: &[SMatrix<T, D, D>; D]) -> Self {
        let det = factors.determinant;
        let det_squared = det * det;
        let mut derivatives = [[SVector::zeros(); D]; D];
        for (d, slope) in slopes.iter().enumerate() {
            let adjugate_derivative = factors.jacobian.adjugate_derivative(slope);
            let det_derivative = determinant_derivative(&factors.adjugate, slope);
            let inverse_derivative =
                (adjugate_derivative * det - factors.adjugate * det_derivative) / det_squared;
            for (k, row) in derivatives.iter_mut().enumerate() {
                row[d] = inverse_derivative.row(k).transpose();
            }
        }
        Self { derivatives }
    }
}

impl<T: Real, const D: usize> NablaDerivatives<T, D> {
    /// $\partial \nabla \lambda_k / \partial \xi_d$.
    pub fn barycentric(&self, k: usize, d: usize) -> SVector<T, D> {
        if k == 0 {
            let mut sum = SVector::zeros();
            for row in &self.derivatives {
                sum += row[d];
            }
            -sum
        } else {
            self.derivatives[k - 1][d]
        }
    }
}

/// The affine Jacobian field of a quadratic element, $J(\xi) = J_0 + \sum_d \xi_d J_d$.
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianEntries<T: Real, const D: usize> {
    pub constant: SMatrix<T, D, D>,
    pub slopes: [SMatrix<T, D, D>; D],
}

impl<T: Real, const D: usize> JacobianEntries<T, D> {
    /// The Jacobian field of a quadratic Lagrange simplex.
    ///
    /// The geometry is $x(\xi) = \sum_k \lambda_k X_k + \sum_e 4 \lambda_a \lambda_b \delta_e$, where
    /// $\delta_e$ is the deviation of the mid-edge node of edge $(a, b)$ from the edge midpoint.
    /// The vertex part gives the edge vectors $X_{k+1} - X_0$ and each deviation contributes
    /// $4 \delta_e \otimes (\lambda_a \nabla_\xi \lambda_b + \lambda_b \nabla_\xi \lambda_a)$. A straight element has
    /// $\delta_e = 0$, so its slopes vanish and its constant part is the straight Jacobian.
    ///
    /// # Panics
    ///
    /// Panics if there is not exactly one mid-edge node per edge after the `D + 1` vertices.
    pub fn from_nodes(nodes: &[Point<T, D>], edges: &[[usize; 2]]) -> Self {
        let num_vertices = D + 1;
        assert_eq!(
            nodes.len(),
            num_vertices + edges.len(),
            "A quadratic {}-simplex needs {} nodes",
            D,
            num_vertices + edges.len()
        );
        let mut constant = SMatrix::from_fn(|i, k| nodes[k + 1][i] - nodes[0][i]);
        let mut slopes = [SMatrix::zeros(); D];
        let four = T::from_f64(4.0).unwrap();
        let origin = Point::<T, D>::origin();
        for (e, [a, b]) in edges.iter().enumerate() {
            let midpoint = nalgebra::center(&nodes[*a], &nodes[*b]);
            let deviation = (nodes[num_vertices + e] - midpoint) * four;
            let (grad_a, grad_b) = (barycentric_gradient::<T, D>(*a), barycentric_gradient::<T, D>(*b));
            let (lambda_a, lambda_b) = (barycentric_coordinate(&origin, *a), barycentric_coordinate(&origin, *b));
            constant += deviation * (grad_b * lambda_a + grad_a * lambda_b).transpose();
            for (d, slope) in slopes.iter_mut().enumerate() {
                *slope += deviation * (grad_b * grad_a[d] + grad_a * grad_b[d]).transpose();
            }
        }
        Self { constant, slopes }
    }

    pub fn at(&self, xi: &Point<T, D>) -> SMatrix<T, D, D> {
        let mut jacobian = self.constant;
        for (d, slope) in self.slopes.iter().enumerate() {
            jacobian += slope * xi[d];
        }
        jacobian
    }
}

/// How nabla vectors are obtained for the linked element. Chosen once per `link`.
#[derive(Debug, Clone, PartialEq)]
pub enum NablaField<T: Real, const D: usize> {
    /// Constant nablas of a straight element.
    Straight(NablaSet<T, D>),
    /// Per-point nablas of a curved element.
    Curved(JacobianEntries<T, D>),
}

impl<T, const D: usize> NablaField<T, D>
where
    T: Real,
    SMatrix<T, D, D>: Cofactor<T>,
{
    pub fn straight(vertices: &[Point<T, D>]) -> Self {
        NablaField::Straight(NablaSet::from_vertices(vertices))
    }

    /// Per-point nablas of a quadratic element with the given local edges.
    pub fn curved(nodes: &[Point<T, D>], edges: &[[usize; 2]]) -> Self {
        NablaField::Curved(JacobianEntries::from_nodes(nodes, edges))
    }

    pub fn is_curved(&self) -> bool {
        matches!(self, NablaField::Curved(_))
    }

    pub fn nabla_at(&self, xi: &Point<T, D>) -> NablaSet<T, D> {
        match self {
            NablaField::Straight(nabla) => nabla.clone(),
            NablaField::Curved(entries) => NablaSet::from_jacobian(entries.at(xi)),
        }
    }

    /// The reference derivatives of the nablas, or `None` for straight elements where they vanish.
    pub fn derivatives_at(&self, nabla: &NablaSet<T, D>) -> Option<NablaDerivatives<T, D>> {
        match self {
            NablaField::Straight(_) => None,
            NablaField::Curved(entries) => Some(NablaDerivatives::from_factors(&nabla.factors, &entries.slopes)),
        }
    }
}
