//! Small quadrature rules on the unit reference simplices.
//!
//! Rules are returned as `(weights, points)` pairs. Weights sum to the measure of the reference
//! simplex: 1 for the segment, 1/2 for the triangle and 1/6 for the tetrahedron.
use nalgebra::{convert, DMatrix, Point, SVector};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

use crate::Real;

pub type QuadraturePair<T, const R: usize> = (Vec<T>, Vec<Point<T, R>>);

/// Errors returned by quadrature methods.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuadratureError {
    /// No rule with the requested number of points is available.
    NoRuleAvailable { num_points: usize },
}

impl Display for QuadratureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable { num_points } => {
                write!(f, "no quadrature rule with {} points is available", num_points)
            }
        }
    }
}

impl Error for QuadratureError {}

fn convert_rule<T: Real, const R: usize>(weights: &[f64], points: &[[f64; R]]) -> QuadraturePair<T, R> {
    let weights = weights.iter().copied().map(convert).collect();
    let points = points
        .iter()
        .map(|p| Point::from((*p).map(convert::<f64, T>)))
        .collect();
    (weights, points)
}

/// Gauss-Legendre rules on $[0, 1]$ with 1, 2 or 3 points.
pub fn segment<T: Real>(num_points: usize) -> Result<QuadraturePair<T, 1>, QuadratureError> {
    let rule = match num_points {
        1 => convert_rule(&[1.0], &[[0.5]]),
        2 => convert_rule(&[0.5, 0.5], &[[0.21132486540518713], [0.7886751345948129]]),
        3 => convert_rule(
            &[5.0 / 18.0, 8.0 / 18.0, 5.0 / 18.0],
            &[[0.1127016653792583], [0.5], [0.8872983346207417]],
        ),
        _ => return Err(QuadratureError::NoRuleAvailable { num_points }),
    };
    Ok(rule)
}

/// Symmetric rules on the unit triangle with 1, 3 or 6 points (exact to degree 1, 2 and 4).
pub fn triangle<T: Real>(num_points: usize) -> Result<QuadraturePair<T, 2>, QuadratureError> {
    let rule = match num_points {
        1 => convert_rule(&[0.5], &[[1.0 / 3.0, 1.0 / 3.0]]),
        3 => convert_rule(
            &[1.0 / 6.0; 3],
            &[[1.0 / 6.0, 1.0 / 6.0], [2.0 / 3.0, 1.0 / 6.0], [1.0 / 6.0, 2.0 / 3.0]],
        ),
        6 => {
            let (a, b) = (0.445948490915965, 0.091576213509771);
            let (wa, wb) = (0.223381589678011 / 2.0, 0.109951743655322 / 2.0);
            convert_rule(
                &[wa, wa, wa, wb, wb, wb],
                &[
                    [a, a],
                    [1.0 - 2.0 * a, a],
                    [a, 1.0 - 2.0 * a],
                    [b, b],
                    [1.0 - 2.0 * b, b],
                    [b, 1.0 - 2.0 * b],
                ],
            )
        }
        _ => return Err(QuadratureError::NoRuleAvailable { num_points }),
    };
    Ok(rule)
}

/// Symmetric rules on the unit tetrahedron with 1, 4 or 5 points (exact to degree 1, 2 and 3).
///
/// The 5-point rule has a negative centroid weight.
pub fn tetrahedron<T: Real>(num_points: usize) -> Result<QuadraturePair<T, 3>, QuadratureError> {
    let rule = match num_points {
        1 => convert_rule(&[1.0 / 6.0], &[[0.25, 0.25, 0.25]]),
        4 => {
            let (a, b) = (0.5854101966249685, 0.1381966011250105);
            convert_rule(
                &[1.0 / 24.0; 4],
                &[[b, b, b], [a, b, b], [b, a, b], [b, b, a]],
            )
        }
        5 => {
            let (a, b) = (0.5, 1.0 / 6.0);
            let w = 3.0 / 40.0;
            convert_rule(
                &[-2.0 / 15.0, w, w, w, w],
                &[[0.25, 0.25, 0.25], [b, b, b], [a, b, b], [b, a, b], [b, b, a]],
            )
        }
        _ => return Err(QuadratureError::NoRuleAvailable { num_points }),
    };
    Ok(rule)
}

/// Builds the reference point matrix expected by `EdgeBasis::precompute`, one row per point.
pub fn points_matrix<T: Real, const R: usize>(points: &[Point<T, R>]) -> DMatrix<T> {
    DMatrix::from_fn(points.len(), R, |i, j| points[i][j])
}

/// The centroid of the unit segment, triangle or tetrahedron.
pub fn centroid<T: Real, const R: usize>() -> Point<T, R> {
    let r: T = convert(R as f64 + 1.0);
    Point::from(SVector::repeat(T::one() / r))
}
