use nalgebra::{Point1, Point2, RowDVector, Vector2};
use proptest::prelude::*;
use util::assert_approx_matrix_eq;
use whitney::basis::{EdgeBasis, EdgeElement, LinkFlags, Line3EdgeBasis, SimplexElement};
use whitney::proptest::point2;
use whitney::topology::{EdgeSign, Topology};

use super::{gradient_column_sum, precompute_at};

fn straight_line(a: Point2<f64>, b: Point2<f64>) -> SimplexElement<f64, 2> {
    SimplexElement::for_topology(Topology::Line3, vec![a, b, nalgebra::center(&a, &b)])
}

#[test]
fn operator_shapes() {
    let basis = Line3EdgeBasis::<f64>::new();
    assert_eq!(basis.num_dofs(), 2);
    assert_eq!(basis.num_nodes(), 3);
    assert_eq!(basis.reference_dim(), 1);
    assert_eq!(basis.num_points(), 0);
}

#[test]
fn tangential_traces_are_linear_along_the_facet() {
    let element = straight_line(Point2::new(1.0, 1.0), Point2::new(4.0, 5.0));
    let mut basis = Line3EdgeBasis::new();
    basis.link(&element, LinkFlags::interpolation_only());
    precompute_at(&mut basis, &Point1::new(0.25));
    assert_eq!(basis.jacobian_determinant(0), 5.0);

    let tangent = Vector2::new(3.0, 4.0);
    let traces = tangent.transpose() * basis.interpolation_operator(0);
    assert_approx_matrix_eq!(traces, RowDVector::from_row_slice(&[0.75, 0.25]), abstol = 1e-15);

    let element = element.with_edge_signs([EdgeSign::Negative]);
    basis.link(&element, LinkFlags::interpolation_only());
    let traces = tangent.transpose() * basis.interpolation_operator(0);
    assert_approx_matrix_eq!(traces, RowDVector::from_row_slice(&[-0.25, -0.75]), abstol = 1e-15);
}

#[test]
fn curved_facet_uses_local_tangent() {
    // A parabolic arc through (0, 0), (0.5, 0.25) and (1, 0)
    let element = SimplexElement::for_topology(
        Topology::Line3,
        vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.5, 0.25)],
    );
    let mut basis = Line3EdgeBasis::new();
    basis.link(&element, LinkFlags::interpolation_only());
    precompute_at(&mut basis, &Point1::new(0.0));
    // dx/dtau = (1, 1 - 2 tau) at tau = 0
    assert_eq!(basis.tangent(0), Vector2::new(1.0, 1.0));
    assert_approx_matrix_eq!(
        basis.interpolation_operator(0).column(0),
        Vector2::new(0.5, 0.5),
        abstol = 1e-15
    );
    assert!((basis.jacobian_determinant(0) - 2.0f64.sqrt()).abs() <= 1e-15);
}

proptest! {
    #[test]
    fn nodal_gradients_are_tangential_and_sum_to_zero(a in point2(), b in point2(), tau in 0.0..1.0) {
        prop_assume!((b - a).norm() > 1e-3);
        let element = straight_line(a, b);
        let mut basis = Line3EdgeBasis::new();
        basis.link(&element, LinkFlags::default().with_gradient(true));
        precompute_at(&mut basis, &Point1::new(tau));
        prop_assert!(gradient_column_sum(&mut basis).norm() <= 1e-10);

        // Interpolating the node coordinates reproduces the tangent projector t t^T / |t|^2
        let t = b - a;
        let mut projector = nalgebra::Matrix2::zeros();
        for (node, g) in element.nodes().iter().zip(basis.gradient_operator(0).column_iter()) {
            projector += g * node.coords.transpose();
        }
        let expected = t * t.transpose() / t.norm_squared();
        assert_approx_matrix_eq!(projector.transpose(), expected, abstol = 1e-9);
    }
}
