//! Assembly of raw edge and face vector functions from coefficient tables and nabla vectors.
//!
//! Values are $f = \sum_k c_k \nabla \lambda_k$. The reference derivatives needed by the curl
//! follow the product rule,
//! $\partial_d f = \sum_k \partial_d c_k \nabla \lambda_k + c_k \partial_d \nabla \lambda_k$,
//! where the second sum only exists for curved elements.
use nalgebra::{SVector, Vector3};
use std::ops::{Add, Neg};

use crate::nabla::{NablaDerivatives, NablaSet};
use crate::tables::{Coefficient, EdgeCoefficients, FaceCoefficients};
use crate::topology::EdgeSign;
use crate::Real;

/// A vector function at one point together with its derivatives along each reference coordinate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VectorJet<T: Real, const D: usize> {
    pub value: SVector<T, D>,
    /// `derivatives[d]` is $\partial f / \partial \xi_d$.
    pub derivatives: [SVector<T, D>; D],
}

impl<T: Real, const D: usize> VectorJet<T, D> {
    pub fn zero() -> Self {
        Self {
            value: SVector::zeros(),
            derivatives: [SVector::zeros(); D],
        }
    }
}

impl<T: Real, const D: usize> Neg for VectorJet<T, D> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            value: -self.value,
            derivatives: self.derivatives.map(|d| -d),
        }
    }
}

impl<T: Real, const D: usize> Add for VectorJet<T, D> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.value += rhs.value;
        for (lhs, rhs) in self.derivatives.iter_mut().zip(rhs.derivatives) {
            *lhs += rhs;
        }
        self
    }
}

impl<T: Real> VectorJet<T, 3> {
    /// The physical curl, using $\partial f / \partial x_j = \sum_d \partial_d f \, (\nabla \xi_d)_j$.
    pub fn curl(&self, nabla: &NablaSet<T, 3>) -> Vector3<T> {
        let mut curl = Vector3::zeros();
        for (df, n) in self.derivatives.iter().zip(&nabla.nablas) {
            curl.x += df.z * n.y - df.y * n.z;
            curl.y += df.x * n.z - df.z * n.x;
            curl.z += df.y * n.x - df.x * n.y;
        }
        curl
    }
}

impl<T: Real> VectorJet<T, 2> {
    /// The scalar curl $\partial f_y / \partial x - \partial f_x / \partial y$.
    pub fn curl(&self, nabla: &NablaSet<T, 2>) -> T {
        let mut curl = T::zero();
        for (df, n) in self.derivatives.iter().zip(&nabla.nablas) {
            curl += df.y * n.x - df.x * n.y;
        }
        curl
    }
}

/// Evaluates $\sum_k c_k \nabla \lambda_k$ for terms `(c_k, k)`.
///
/// The nabla lookup is a closure so that facet elements, whose reference dimension is lower
/// than the spatial dimension, can share the assembly.
pub fn combine_value<T, const D: usize, const R: usize>(
    terms: &[(Coefficient<T, R>, usize)],
    nabla: impl Fn(usize) -> SVector<T, D>,
) -> SVector<T, D>
where
    T: Real,
{
    let mut value = SVector::zeros();
    for (coefficient, k) in terms {
        value += nabla(*k) * coefficient.value;
    }
    value
}

/// Evaluates $\sum_k c_k \nabla \lambda_k$ and its reference derivatives.
///
/// `derivatives` is `None` for straight elements.
pub fn combine_jet<T, const D: usize>(
    terms: &[(Coefficient<T, D>, usize)],
    nabla: &NablaSet<T, D>,
    derivatives: Option<&NablaDerivatives<T, D>>,
) -> VectorJet<T, D>
where
    T: Real,
{
    let mut jet = VectorJet::zero();
    for (coefficient, k) in terms {
        let n = nabla.barycentric(*k);
        jet.value += n * coefficient.value;
        for (d, df) in jet.derivatives.iter_mut().enumerate() {
            *df += n * coefficient.gradient[d];
        }
    }
    // Curvature terms go last, so straight geometry gives identical results in both modes
    if let Some(derivatives) = derivatives {
        for (coefficient, k) in terms {
            for (d, df) in jet.derivatives.iter_mut().enumerate() {
                *df += derivatives.barycentric(*k, d) * coefficient.value;
            }
        }
    }
    jet
}

pub fn edge_terms<T: Real, const R: usize>(
    coefficients: &EdgeCoefficients<T, R>,
    [tail, head]: [usize; 2],
) -> [(Coefficient<T, R>, usize); 2] {
    [(coefficients.head, head), (coefficients.tail, tail)]
}

pub fn face_terms<T: Real, const R: usize>(
    coefficients: &FaceCoefficients<T, R>,
    corners: [usize; 3],
) -> [(Coefficient<T, R>, usize); 3] {
    let [c0, c1, c2] = coefficients.corners;
    [(c0, corners[0]), (c1, corners[1]), (c2, corners[2])]
}

/// Applies the edge sign to a linear edge function.
pub fn oriented_edge<V: Neg<Output = V>>(sign: EdgeSign, function: V) -> V {
    match sign {
        EdgeSign::Positive => function,
        EdgeSign::Negative => -function,
    }
}

/// Applies the edge sign to the pair $(\lambda_a w_{ab}, \lambda_b w_{ab})$ of a quadratic edge.
///
/// A reversed edge yields $(\lambda_b w_{ba}, \lambda_a w_{ba})$, so that the first function is
/// always anchored at the tail of the global edge direction.
pub fn oriented_edge_pair<V: Neg<Output = V>>(sign: EdgeSign, [tail_weighted, head_weighted]: [V; 2]) -> [V; 2] {
    match sign {
        EdgeSign::Positive => [tail_weighted, head_weighted],
        EdgeSign::Negative => [-head_weighted, -tail_weighted],
    }
}

/// The dependent third raw face function.
pub fn third_face_function<V: Clone + Add<Output = V> + Neg<Output = V>>(raw: &[V; 2]) -> V {
    -(raw[0].clone() + raw[1].clone())
}
