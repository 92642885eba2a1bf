use matrixcompare::assert_matrix_eq;
use nalgebra::{DVector, Matrix2, Matrix3, Point3, Vector3};
use proptest::prelude::*;
use util::{approximate_jacobian, assert_approx_matrix_eq};
use whitney::element::{ReferenceFiniteElement, Tet10Lagrange, Tet4Lagrange};
use whitney::geometry::{determinant_derivative, jacobian_from_gradients, Cofactor, JacobianFactors};

fn matrix3() -> impl Strategy<Value = Matrix3<f64>> {
    proptest::collection::vec(-2.0..2.0, 9).prop_map(|entries| Matrix3::from_column_slice(&entries))
}

fn matrix2() -> impl Strategy<Value = Matrix2<f64>> {
    proptest::collection::vec(-2.0..2.0, 4).prop_map(|entries| Matrix2::from_column_slice(&entries))
}

#[test]
fn adjugate_of_known_matrix() {
    #[rustfmt::skip]
    let m = Matrix3::new(2.0, 0.0, 1.0,
                         1.0, 3.0, 0.0,
                         0.0, 1.0, 4.0);
    #[rustfmt::skip]
    let expected = Matrix3::new(12.0,  1.0, -3.0,
                                -4.0,  8.0,  1.0,
                                 1.0, -2.0,  6.0);
    assert_eq!(m.adjugate(), expected);
    assert_eq!(m.cofactor_determinant(), 25.0);
}

#[test]
fn jacobian_of_affine_tetrahedron_is_edge_matrix() {
    let vertices = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(3.0, 1.0, 0.0),
        Point3::new(1.0, 2.0, 1.0),
        Point3::new(0.0, 0.0, 4.0),
    ];
    let mut gradients = vec![Vector3::zeros(); 4];
    Tet4Lagrange.populate_basis_gradients(&mut gradients, &Point3::new(0.2, 0.3, 0.1));
    let jacobian = jacobian_from_gradients(&vertices, &gradients);
    let expected = Matrix3::from_columns(&[
        vertices[1] - vertices[0],
        vertices[2] - vertices[0],
        vertices[3] - vertices[0],
    ]);
    assert_matrix_eq!(jacobian, expected, comp = abs, tol = 1e-15);
}

#[test]
#[should_panic]
fn jacobian_with_mismatched_gradients_panics() {
    let nodes = Tet10Lagrange::reference_nodes::<f64>();
    let gradients = vec![Vector3::zeros(); 4];
    let _ = jacobian_from_gradients(&nodes, &gradients);
}

#[test]
fn physical_gradient_of_scaled_element() {
    let factors = JacobianFactors::new(Matrix3::from_diagonal(&Vector3::new(2.0, 4.0, 0.5)));
    assert_eq!(factors.determinant, 4.0);
    assert_eq!(factors.weight(), 4.0);
    let g = factors.physical_gradient(&Vector3::new(1.0, 1.0, 1.0));
    assert_matrix_eq!(g, Vector3::new(0.5, 0.25, 2.0), comp = float);
}

#[test]
fn weight_of_inverted_element_is_positive() {
    let factors = JacobianFactors::new(Matrix2::new(0.0, 1.0, 1.0, 0.0));
    assert_eq!(factors.determinant, -1.0);
    assert_eq!(factors.weight(), 1.0);
}

proptest! {
    #[test]
    fn adjugate_3x3_is_scaled_inverse(m in matrix3()) {
        let det = m.cofactor_determinant();
        prop_assert!((det - m.determinant()).abs() <= 1e-12);
        assert_approx_matrix_eq!(m * m.adjugate(), Matrix3::<f64>::identity() * det, abstol = 1e-12);
        assert_approx_matrix_eq!(m.adjugate() * m, Matrix3::<f64>::identity() * det, abstol = 1e-12);
    }

    #[test]
    fn adjugate_2x2_is_scaled_inverse(m in matrix2()) {
        let det = m.cofactor_determinant();
        prop_assert!((det - m.determinant()).abs() <= 1e-13);
        assert_approx_matrix_eq!(m * m.adjugate(), Matrix2::<f64>::identity() * det, abstol = 1e-13);
    }

    #[test]
    fn adjugate_derivative_matches_finite_differences(m in matrix3(), direction in matrix3()) {
        let at = |t: f64| m + direction * t;
        let approximate = approximate_jacobian(
            |t| DVector::from_column_slice(at(t[0]).adjugate().as_slice()),
            &DVector::from_element(1, 0.0),
            1e-6,
        );
        let analytic = m.adjugate_derivative(&direction);
        assert_approx_matrix_eq!(
            DVector::from_column_slice(analytic.as_slice()),
            approximate.column(0).into_owned(),
            abstol = 1e-8
        );

        let approximate_det = approximate_jacobian(
            |t| DVector::from_element(1, at(t[0]).cofactor_determinant()),
            &DVector::from_element(1, 0.0),
            1e-6,
        );
        let analytic_det = determinant_derivative(&m.adjugate(), &direction);
        prop_assert!((analytic_det - approximate_det[(0, 0)]).abs() <= 1e-8);
    }

    #[test]
    fn inverse_matches_nalgebra(m in matrix3()) {
        prop_assume!(m.determinant().abs() > 0.1);
        let factors = JacobianFactors::new(m);
        let inverse = m.try_inverse().unwrap();
        assert_approx_matrix_eq!(factors.inverse(), inverse, abstol = 1e-9 * inverse.abs().max().max(1.0));
    }
}
