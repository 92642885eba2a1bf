//! Barycentric polynomial coefficients of the edge and face functions, tabulated per point.
//!
//! Every edge and face function is a combination $\sum_k c_k(\xi) \nabla \lambda_k$ of the nabla
//! vectors. The coefficients $c_k$ only depend on the reference point, so they are evaluated once
//! per point set and shared by all elements linked afterwards. Their reference gradients are
//! stored alongside for the curl.
use nalgebra::{Point, SVector};
use std::ops::{Mul, Neg};

use crate::element::{barycentric_coordinate, barycentric_gradient};
use crate::Real;

/// A scalar polynomial evaluated at one point, with its reference gradient.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coefficient<T: Real, const R: usize> {
    pub value: T,
    pub gradient: SVector<T, R>,
}

impl<T: Real, const R: usize> Coefficient<T, R> {
    pub fn zero() -> Self {
        Self {
            value: T::zero(),
            gradient: SVector::zeros(),
        }
    }

    /// The barycentric coordinate $\lambda_k$.
    pub fn barycentric(xi: &Point<T, R>, k: usize) -> Self {
        Self {
            value: barycentric_coordinate(xi, k),
            gradient: barycentric_gradient(k),
        }
    }
}

impl<T: Real, const R: usize> Mul for Coefficient<T, R> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            value: self.value * rhs.value,
            gradient: self.gradient * rhs.value + rhs.gradient * self.value,
        }
    }
}

impl<T: Real, const R: usize> Neg for Coefficient<T, R> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            value: -self.value,
            gradient: -self.gradient,
        }
    }
}

/// Coefficients of an edge function $G \nabla \lambda_{head} + H \nabla \lambda_{tail}$.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeCoefficients<T: Real, const R: usize> {
    /// $G$, multiplying the nabla of the edge head.
    pub head: Coefficient<T, R>,
    /// $H$, multiplying the nabla of the edge tail.
    pub tail: Coefficient<T, R>,
}

/// Coefficients of a face function $\sum_i c_i \nabla \lambda_{c_i}$ over the face corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FaceCoefficients<T: Real, const R: usize> {
    pub corners: [Coefficient<T, R>; 3],
}

/// Polynomial family of the edge functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EdgeFamily {
    /// One Whitney function $\lambda_a \nabla \lambda_b - \lambda_b \nabla \lambda_a$ per edge.
    Linear,
    /// The Whitney function weighted by $\lambda_a$ and by $\lambda_b$: two functions per edge.
    Quadratic,
}

impl EdgeFamily {
    pub fn functions_per_edge(&self) -> usize {
        match self {
            EdgeFamily::Linear => 1,
            EdgeFamily::Quadratic => 2,
        }
    }

    /// The edge functions of the edge `[a, b]` at `xi`.
    pub fn edge_coefficients<T: Real, const R: usize>(
        &self,
        xi: &Point<T, R>,
        [a, b]: [usize; 2],
    ) -> impl Iterator<Item = EdgeCoefficients<T, R>> {
        let la = Coefficient::barycentric(xi, a);
        let lb = Coefficient::barycentric(xi, b);
        let whitney = EdgeCoefficients { head: la, tail: -lb };
        let weighted = |weight: Coefficient<T, R>| EdgeCoefficients {
            head: weight * whitney.head,
            tail: weight * whitney.tail,
        };
        let functions = match self {
            EdgeFamily::Linear => [Some(whitney), None],
            EdgeFamily::Quadratic => [Some(weighted(la)), Some(weighted(lb))],
        };
        functions.into_iter().flatten()
    }
}

/// The two independent raw functions of the face with corners `[c0, c1, c2]` at `xi`.
///
/// The first is anchored at `c0`, the second at `c1`. The third raw function, anchored at `c2`,
/// is their negated sum.
pub fn face_coefficients<T: Real, const R: usize>(
    xi: &Point<T, R>,
    corners: [usize; 3],
) -> [FaceCoefficients<T, R>; 2] {
    let [l0, l1, l2] = corners.map(|c| Coefficient::barycentric(xi, c));
    let zero = Coefficient::zero();
    [
        FaceCoefficients {
            corners: [zero, -(l0 * l2), l0 * l1],
        },
        FaceCoefficients {
            corners: [l1 * l2, zero, -(l0 * l1)],
        },
    ]
}

/// Edge coefficients for every (point, edge, function).
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeTable<T: Real, const R: usize> {
    functions_per_edge: usize,
    num_edges: usize,
    entries: Vec<EdgeCoefficients<T, R>>,
}

impl<T: Real, const R: usize> EdgeTable<T, R> {
    pub fn build(family: EdgeFamily, edges: &[[usize; 2]], points: &[Point<T, R>]) -> Self {
        let entries = points
            .iter()
            .flat_map(|xi| {
                edges
                    .iter()
                    .flat_map(move |edge| family.edge_coefficients(xi, *edge))
            })
            .collect();
        Self {
            functions_per_edge: family.functions_per_edge(),
            num_edges: edges.len(),
            entries,
        }
    }

    pub fn num_points(&self) -> usize {
        self.entries.len() / (self.num_edges * self.functions_per_edge).max(1)
    }

    /// The functions of `edge` at point `point`.
    pub fn get(&self, point: usize, edge: usize) -> &[EdgeCoefficients<T, R>] {
        assert!(edge < self.num_edges, "Edge index {} out of bounds", edge);
        let k = self.functions_per_edge;
        let offset = (point * self.num_edges + edge) * k;
        &self.entries[offset..offset + k]
    }
}

/// Raw face coefficients for every (point, face, function).
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTable<T: Real, const R: usize> {
    num_faces: usize,
    entries: Vec<[FaceCoefficients<T, R>; 2]>,
}

impl<T: Real, const R: usize> FaceTable<T, R> {
    pub fn build(faces: &[[usize; 3]], points: &[Point<T, R>]) -> Self {
        let entries = points
            .iter()
            .flat_map(|xi| faces.iter().map(move |face| face_coefficients(xi, *face)))
            .collect();
        Self {
            num_faces: faces.len(),
            entries,
        }
    }

    /// The two raw functions of `face` at point `point`.
    pub fn get(&self, point: usize, face: usize) -> &[FaceCoefficients<T, R>; 2] {
        assert!(face < self.num_faces, "Face index {} out of bounds", face);
        &self.entries[point * self.num_faces + face]
    }
}
