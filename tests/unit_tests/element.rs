use nalgebra::{DVector, Point, Point1, Point2, Point3, SVector};
use paste::paste;
use proptest::prelude::*;
use util::{approximate_jacobian, assert_approx_matrix_eq};
use whitney::element::{
    barycentric_coordinate, barycentric_gradient, reference_vertex, ReferenceFiniteElement, Segment3Lagrange,
    Tet10Lagrange, Tet4Lagrange, Tri3Lagrange, Tri6Lagrange,
};
use whitney::proptest::interior_point;

/// Checks that node `i` takes the value 1 at node `i` and 0 at every other node.
fn assert_lagrange_property<const R: usize>(element: &dyn ReferenceFiniteElement<f64, R>, nodes: &[Point<f64, R>]) {
    assert_eq!(element.num_nodes(), nodes.len());
    let mut values = vec![0.0; nodes.len()];
    for (j, xi) in nodes.iter().enumerate() {
        element.populate_basis(&mut values, xi);
        for (i, value) in values.iter().enumerate() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!(
                (value - expected).abs() <= 1e-14,
                "N_{} at node {} is {}, expected {}",
                i,
                j,
                value,
                expected
            );
        }
    }
}

fn basis_sum<const R: usize>(element: &dyn ReferenceFiniteElement<f64, R>, xi: &Point<f64, R>) -> f64 {
    let mut values = vec![0.0; element.num_nodes()];
    element.populate_basis(&mut values, xi);
    values.iter().sum()
}

fn gradient_sum<const R: usize>(element: &dyn ReferenceFiniteElement<f64, R>, xi: &Point<f64, R>) -> SVector<f64, R> {
    let mut gradients = vec![SVector::zeros(); element.num_nodes()];
    element.populate_basis_gradients(&mut gradients, xi);
    gradients.iter().sum()
}

/// Compares the analytic gradients with central differences of the basis values.
fn assert_gradients_match_finite_differences<const R: usize>(
    element: &dyn ReferenceFiniteElement<f64, R>,
    xi: &Point<f64, R>,
) {
    let n = element.num_nodes();
    let mut gradients = vec![SVector::zeros(); n];
    element.populate_basis_gradients(&mut gradients, xi);

    let x = DVector::from_column_slice(xi.coords.as_slice());
    let approximate = approximate_jacobian(
        |x| {
            let mut values = vec![0.0; n];
            element.populate_basis(&mut values, &Point::from(SVector::from_column_slice(x.as_slice())));
            DVector::from_vec(values)
        },
        &x,
        1e-6,
    );
    for (i, gradient) in gradients.iter().enumerate() {
        let row = approximate.row(i).transpose();
        assert_approx_matrix_eq!(gradient.clone_owned(), SVector::<f64, R>::from_column_slice(row.as_slice()), abstol = 1e-8);
    }
}

#[test]
fn barycentric_coordinates_of_vertices() {
    for k in 0..=3 {
        let vertex: Point3<f64> = reference_vertex(k);
        for j in 0..=3 {
            let expected = if j == k { 1.0 } else { 0.0 };
            assert_eq!(barycentric_coordinate(&vertex, j), expected);
        }
    }
    let g: SVector<f64, 2> = barycentric_gradient(0);
    assert_eq!(g, SVector::<f64, 2>::new(-1.0, -1.0));
}

#[test]
#[should_panic]
fn barycentric_index_out_of_bounds_panics() {
    barycentric_coordinate(&Point2::new(0.25, 0.25), 3);
}

macro_rules! test_lagrange_property {
    ($($element:ident),*) => {
        $(
            paste! {
                #[test]
                fn [<$element:snake _lagrange_property>]() {
                    assert_lagrange_property(&$element, &$element::reference_nodes());
                }
            }
        )*
    };
}

test_lagrange_property!(Segment3Lagrange, Tri3Lagrange, Tri6Lagrange, Tet4Lagrange, Tet10Lagrange);

#[test]
#[should_panic]
fn populate_basis_with_wrong_buffer_size_panics() {
    let mut values = vec![0.0; 4];
    ReferenceFiniteElement::<f64, 2>::populate_basis(&Tri6Lagrange, &mut values, &Point2::new(0.25, 0.25));
}

proptest! {
    #[test]
    fn segment3_partition_of_unity(tau in 0.0..1.0) {
        let xi = Point1::new(tau);
        prop_assert!((basis_sum(&Segment3Lagrange, &xi) - 1.0).abs() <= 1e-14);
        prop_assert!(gradient_sum(&Segment3Lagrange, &xi).norm() <= 1e-13);
        assert_gradients_match_finite_differences(&Segment3Lagrange, &xi);
    }

    #[test]
    fn tri6_partition_of_unity(xi in interior_point::<2>()) {
        prop_assert!((basis_sum(&Tri6Lagrange, &xi) - 1.0).abs() <= 1e-14);
        prop_assert!(gradient_sum(&Tri6Lagrange, &xi).norm() <= 1e-13);
        assert_gradients_match_finite_differences(&Tri6Lagrange, &xi);
    }

    #[test]
    fn tet4_partition_of_unity(xi in interior_point::<3>()) {
        prop_assert!((basis_sum(&Tet4Lagrange, &xi) - 1.0).abs() <= 1e-14);
        prop_assert!(gradient_sum(&Tet4Lagrange, &xi).norm() <= 1e-13);
    }

    #[test]
    fn tet10_partition_of_unity(xi in interior_point::<3>()) {
        prop_assert!((basis_sum(&Tet10Lagrange, &xi) - 1.0).abs() <= 1e-14);
        prop_assert!(gradient_sum(&Tet10Lagrange, &xi).norm() <= 1e-13);
        assert_gradients_match_finite_differences(&Tet10Lagrange, &xi);
    }
}
