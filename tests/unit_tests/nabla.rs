use nalgebra::{DVector, Matrix3, Point2, Point3, Vector2, Vector3};
use proptest::prelude::*;
use util::{approximate_jacobian, assert_approx_matrix_eq};
use whitney::basis::EdgeElement;
use whitney::element::{Tet10Lagrange, Tri6Lagrange};
use whitney::nabla::{JacobianEntries, NablaField, NablaSet};
use whitney::proptest::{curved_element, interior_point};
use whitney::topology::{Topology, TETRAHEDRON_EDGES, TRIANGLE_EDGES};

#[test]
fn nablas_of_reference_tetrahedron() {
    let vertices = [
        Point3::origin(),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let nabla = NablaSet::from_vertices(&vertices);
    assert_eq!(nabla.determinant(), 1.0);
    assert_eq!(nabla.barycentric(0), Vector3::new(-1.0, -1.0, -1.0));
    assert_eq!(nabla.barycentric(1), Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(nabla.barycentric(3), Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn nablas_of_scaled_triangle() {
    let vertices = [Point2::new(1.0, 1.0), Point2::new(3.0, 1.0), Point2::new(1.0, 5.0)];
    let nabla = NablaSet::from_vertices(&vertices);
    assert_eq!(nabla.determinant(), 8.0);
    assert_eq!(nabla.barycentric(1), Vector2::new(0.5, 0.0));
    assert_eq!(nabla.barycentric(2), Vector2::new(0.0, 0.25));
    assert_eq!(nabla.barycentric(0), Vector2::new(-0.5, -0.25));
}

#[test]
fn straight_field_has_no_derivatives() {
    let vertices = Tet10Lagrange::reference_nodes::<f64>();
    let field = NablaField::straight(&vertices[..4]);
    assert!(!field.is_curved());
    let nabla = field.nabla_at(&Point3::new(0.1, 0.2, 0.3));
    assert!(field.derivatives_at(&nabla).is_none());
}

#[test]
fn curved_field_of_straight_element_has_zero_slopes() {
    let nodes = Tet10Lagrange::reference_nodes::<f64>();
    let entries = JacobianEntries::from_nodes(&nodes, &TETRAHEDRON_EDGES);
    assert_eq!(entries.constant, Matrix3::identity());
    for slope in &entries.slopes {
        assert_eq!(*slope, Matrix3::zeros());
    }
}

#[test]
fn curved_field_of_straight_element_reproduces_straight_jacobian_exactly() {
    // Coordinates with no exact binary representation
    let vertices = [
        Point3::new(0.1, 0.2, 0.3),
        Point3::new(1.3, 0.1, 0.7),
        Point3::new(0.3, 1.1, 0.2),
        Point3::new(0.2, 0.4, 1.3),
    ];
    let mut nodes = vertices.to_vec();
    nodes.extend(TETRAHEDRON_EDGES.iter().map(|[a, b]| nalgebra::center(&vertices[*a], &vertices[*b])));

    let entries = JacobianEntries::from_nodes(&nodes, &TETRAHEDRON_EDGES);
    let straight = NablaSet::from_vertices(&vertices);
    assert_eq!(entries.constant, straight.factors.jacobian);
    for slope in &entries.slopes {
        assert_eq!(*slope, Matrix3::zeros());
    }
    let curved = NablaField::curved(&nodes, &TETRAHEDRON_EDGES).nabla_at(&Point3::new(0.15, 0.35, 0.25));
    assert_eq!(curved, straight);
}

proptest! {
    #[test]
    fn curved_jacobian_entries_match_shape_functions(
        element in curved_element::<3>(Topology::Tet10),
        xi in interior_point::<3>()
    ) {
        use whitney::element::ReferenceFiniteElement;
        use whitney::geometry::jacobian_from_gradients;

        let entries = JacobianEntries::from_nodes(element.nodes(), &TETRAHEDRON_EDGES);
        let mut gradients = vec![Vector3::zeros(); 10];
        Tet10Lagrange.populate_basis_gradients(&mut gradients, &xi);
        let jacobian = jacobian_from_gradients(element.nodes(), &gradients);
        assert_approx_matrix_eq!(entries.at(&xi), jacobian, abstol = 1e-12);
    }

    #[test]
    fn curved_triangle_jacobian_entries_match_shape_functions(
        element in curved_element::<2>(Topology::Tri6),
        xi in interior_point::<2>()
    ) {
        use whitney::element::ReferenceFiniteElement;
        use whitney::geometry::jacobian_from_gradients;

        let entries = JacobianEntries::from_nodes(element.nodes(), &TRIANGLE_EDGES);
        let mut gradients = vec![Vector2::zeros(); 6];
        Tri6Lagrange.populate_basis_gradients(&mut gradients, &xi);
        let jacobian = jacobian_from_gradients(element.nodes(), &gradients);
        assert_approx_matrix_eq!(entries.at(&xi), jacobian, abstol = 1e-12);
    }

    #[test]
    fn curved_nabla_derivatives_match_finite_differences(
        element in curved_element::<3>(Topology::Tet10),
        xi in interior_point::<3>()
    ) {
        let field = NablaField::curved(element.nodes(), &TETRAHEDRON_EDGES);
        prop_assert!(field.is_curved());
        let nabla = field.nabla_at(&xi);
        let derivatives = field.derivatives_at(&nabla).unwrap();

        // Stack all four barycentric nablas into one vector
        let stacked = |x: &DVector<f64>| {
            let nabla = field.nabla_at(&Point3::new(x[0], x[1], x[2]));
            let mut v = DVector::zeros(12);
            for k in 0..4 {
                v.fixed_rows_mut::<3>(3 * k).copy_from(&nabla.barycentric(k));
            }
            v
        };
        let approximate = approximate_jacobian(stacked, &DVector::from_column_slice(xi.coords.as_slice()), 1e-6);
        for k in 0..4 {
            for d in 0..3 {
                let fd = approximate.fixed_view::<3, 1>(3 * k, d).into_owned();
                assert_approx_matrix_eq!(derivatives.barycentric(k, d), fd, abstol = 1e-6);
            }
        }
    }

    #[test]
    fn curved_triangle_nablas_invert_jacobian(
        element in curved_element::<2>(Topology::Tri6),
        xi in interior_point::<2>()
    ) {
        let field = NablaField::curved(element.nodes(), &TRIANGLE_EDGES);
        let nabla = field.nabla_at(&xi);
        let inverse = nalgebra::Matrix2::from_rows(&[nabla.nablas[0].transpose(), nabla.nablas[1].transpose()]);
        assert_approx_matrix_eq!(inverse * nabla.factors.jacobian, nalgebra::Matrix2::<f64>::identity(), abstol = 1e-12);
    }
}
