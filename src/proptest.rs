//! Strategies for generating elements and reference points in property-based tests.
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use nalgebra::{Point, Point2, SMatrix, SVector};

use crate::basis::{EdgeElement, SimplexElement};
use crate::orientation::FaceOrientation;
use crate::topology::{EdgeSign, Topology};

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Pick a reasonably small range to pick coordinates from,
    // otherwise we can easily get floating point numbers that are
    // so ridiculously large as to break anything we might want to do with them
    let range = -10.0..10.0;
    [range.clone(), range.clone()].prop_map(|[x, y]| Point2::new(x, y))
}

/// A point strictly inside the unit reference simplex.
pub fn interior_point<const R: usize>() -> impl Strategy<Value = Point<f64, R>> {
    // Normalized positive barycentric weights, bounded away from the boundary
    vec(0.05..1.0, R + 1).prop_map(|weights| {
        let sum: f64 = weights.iter().sum();
        Point::from(SVector::from_fn(|i, _| weights[i + 1] / sum))
    })
}

/// A positively oriented affine image $x = t + s (I + P) \xi$ of the reference element.
///
/// The entries of `P` are small enough for the map to stay well-conditioned.
pub fn affine_element<const D: usize>(topology: Topology) -> impl Strategy<Value = SimplexElement<f64, D>> {
    let perturbation = vec(-0.25..0.25, D * D);
    let translation = vec(-10.0..10.0, D);
    let scale = 0.5..2.0;
    (perturbation, translation, scale).prop_map(move |(perturbation, translation, scale)| {
        let map = (SMatrix::<f64, D, D>::identity() + SMatrix::from_column_slice(&perturbation)) * scale;
        let translation = SVector::<f64, D>::from_column_slice(&translation);
        let mut element = SimplexElement::reference(topology);
        for node in element.nodes_mut() {
            *node = Point::from(map * node.coords + translation);
        }
        element
    })
}

/// An affine element whose mid-edge nodes are moved off their edge midpoints.
///
/// # Panics
///
/// Panics if the topology is not quadratic.
pub fn curved_element<const D: usize>(topology: Topology) -> impl Strategy<Value = SimplexElement<f64, D>> {
    assert!(topology.is_quadratic(), "{} elements cannot be curved", topology);
    let num_mid_nodes = topology.num_edges();
    let offsets = vec(vec(-0.05..0.05, D), num_mid_nodes);
    (affine_element(topology), offsets).prop_map(|(mut element, offsets)| {
        let first_mid_node = element.nodes().len() - offsets.len();
        for (node, offset) in element.nodes_mut()[first_mid_node..].iter_mut().zip(offsets) {
            node.coords += SVector::<f64, D>::from_column_slice(&offset);
        }
        element
    })
}

pub fn edge_signs(num_edges: usize) -> impl Strategy<Value = Vec<EdgeSign>> {
    vec(any::<EdgeSign>(), num_edges)
}

impl Arbitrary for EdgeSign {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![Just(EdgeSign::Positive), Just(EdgeSign::Negative)].boxed()
    }
}

impl Arbitrary for FaceOrientation {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (0u8..4).prop_map(FaceOrientation::new).boxed()
    }
}
