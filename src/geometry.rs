//! Closed-form Jacobian algebra for 2x2 and 3x3 matrices.
//!
//! Inverses and determinants are always expanded in cofactors. The same expressions are
//! differentiated once more to obtain the sensitivity of the inverse Jacobian of a curved
//! element to the reference coordinates.
use nalgebra::{Matrix2, Matrix3, Point, SMatrix, SVector};

use crate::Real;

/// Cofactor expansion of a small square matrix.
pub trait Cofactor<T>: Sized {
    /// The transpose of the cofactor matrix, so that `m * adj(m) = det(m) * I`.
    fn adjugate(&self) -> Self;

    /// The determinant, expanded along the first row.
    fn cofactor_determinant(&self) -> T;

    /// The derivative of the adjugate of `self` in the given direction.
    fn adjugate_derivative(&self, direction: &Self) -> Self;
}

impl<T: Real> Cofactor<T> for Matrix2<T> {
    fn adjugate(&self) -> Self {
        let m = self;
        Matrix2::new(m[(1, 1)], -m[(0, 1)], -m[(1, 0)], m[(0, 0)])
    }

    fn cofactor_determinant(&self) -> T {
        let m = self;
        m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]
    }

    fn adjugate_derivative(&self, direction: &Self) -> Self {
        // The 2x2 adjugate is linear in the matrix entries
        direction.adjugate()
    }
}

type Entry = (usize, usize);

/// Index quadruples `(p, q, r, s)` such that the cofactor `C_ij = m_p m_q - m_r m_s`.
#[rustfmt::skip]
const COFACTORS_3X3: [[[Entry; 4]; 3]; 3] = [
    [
        [(1, 1), (2, 2), (1, 2), (2, 1)],
        [(1, 2), (2, 0), (1, 0), (2, 2)],
        [(1, 0), (2, 1), (1, 1), (2, 0)],
    ],
    [
        [(0, 2), (2, 1), (0, 1), (2, 2)],
        [(0, 0), (2, 2), (0, 2), (2, 0)],
        [(0, 1), (2, 0), (0, 0), (2, 1)],
    ],
    [
        [(0, 1), (1, 2), (0, 2), (1, 1)],
        [(0, 2), (1, 0), (0, 0), (1, 2)],
        [(0, 0), (1, 1), (0, 1), (1, 0)],
    ],
];

fn cofactor_3x3<T: Real>(m: &Matrix3<T>, i: usize, j: usize) -> T {
    let [p, q, r, s] = COFACTORS_3X3[i][j];
    m[p] * m[q] - m[r] * m[s]
}

impl<T: Real> Cofactor<T> for Matrix3<T> {
    fn adjugate(&self) -> Self {
        Matrix3::from_fn(|i, j| cofactor_3x3(self, j, i))
    }

    fn cofactor_determinant(&self) -> T {
        let m = self;
        m[(0, 0)] * cofactor_3x3(m, 0, 0) + m[(0, 1)] * cofactor_3x3(m, 0, 1) + m[(0, 2)] * cofactor_3x3(m, 0, 2)
    }

    fn adjugate_derivative(&self, direction: &Self) -> Self {
        let (m, dm) = (self, direction);
        Matrix3::from_fn(|i, j| {
            let [p, q, r, s] = COFACTORS_3X3[j][i];
            dm[p] * m[q] + m[p] * dm[q] - dm[r] * m[s] - m[r] * dm[s]
        })
    }
}

/// Derivative of the determinant in the given direction, given the adjugate (Jacobi's formula).
pub fn determinant_derivative<T: Real, const D: usize>(
    adjugate: &SMatrix<T, D, D>,
    direction: &SMatrix<T, D, D>,
) -> T {
    (adjugate * direction).trace()
}

/// Computes the Jacobian $J = \sum_a X_a \otimes \nabla_\xi N_a$ of an isoparametric map.
///
/// # Panics
///
/// Panics if the number of nodes and gradients differ.
pub fn jacobian_from_gradients<T: Real, const D: usize, const R: usize>(
    nodes: &[Point<T, D>],
    gradients: &[SVector<T, R>],
) -> SMatrix<T, D, R> {
    assert_eq!(nodes.len(), gradients.len(), "Need exactly one shape gradient per node");
    let mut jacobian = SMatrix::zeros();
    for (node, gradient) in nodes.iter().zip(gradients) {
        jacobian += node.coords * gradient.transpose();
    }
    jacobian
}

/// A square Jacobian together with its cofactor factorization.
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianFactors<T: Real, const D: usize> {
    pub jacobian: SMatrix<T, D, D>,
    pub adjugate: SMatrix<T, D, D>,
    /// The signed determinant. Negative for inverted elements.
    pub determinant: T,
}

impl<T, const D: usize> JacobianFactors<T, D>
where
    T: Real,
    SMatrix<T, D, D>: Cofactor<T>,
{
    pub fn new(jacobian: SMatrix<T, D, D>) -> Self {
        Self {
            adjugate: jacobian.adjugate(),
            determinant: jacobian.cofactor_determinant(),
            jacobian,
        }
    }

    pub fn inverse(&self) -> SMatrix<T, D, D> {
        self.adjugate / self.determinant
    }

    /// The absolute determinant, i.e. the factor that scales reference quadrature weights.
    pub fn weight(&self) -> T {
        self.determinant.abs()
    }

    /// Maps a reference gradient $\nabla_\xi N$ to the physical gradient $J^{-T} \nabla_\xi N$.
    pub fn physical_gradient(&self, reference_gradient: &SVector<T, D>) -> SVector<T, D> {
        self.adjugate.tr_mul(reference_gradient) / self.determinant
    }
}
