use nalgebra::{DVector, Vector3};
use proptest::prelude::*;
use util::assert_approx_matrix_eq;
use whitney::basis::{EdgeBasis, LinkFlags, VolumetricEdgeBasis};
use whitney::element::Tet4Lagrange;
use whitney::proptest::{affine_element, edge_signs, interior_point};
use whitney::topology::{Topology, TETRAHEDRON_EDGES};

use super::{finite_difference_curl_3d, finite_difference_derivatives, gradient_column_sum, precompute_at};

proptest! {
    #[test]
    fn curl_is_twice_cross_product_of_nablas(
        element in affine_element::<3>(Topology::Tet4),
        xi in interior_point::<3>()
    ) {
        let mut basis = VolumetricEdgeBasis::tet4();
        basis.link(&element, LinkFlags::curl_only());
        precompute_at(&mut basis, &xi);
        let nabla = basis.nabla(0).clone();
        let curl = basis.curl_operator(0).clone();
        prop_assert_eq!(curl.shape(), (3, 6));
        for (e, [a, b]) in TETRAHEDRON_EDGES.iter().enumerate() {
            let expected = nabla.barycentric(*a).cross(&nabla.barycentric(*b)) * 2.0;
            let scale = expected.norm().max(1.0);
            assert_approx_matrix_eq!(curl.column(e), expected, abstol = 1e-12 * scale);
        }
    }

    #[test]
    fn curl_matches_finite_differences(
        element in affine_element::<3>(Topology::Tet4),
        signs in edge_signs(6),
        xi in interior_point::<3>()
    ) {
        let element = element.with_edge_signs(signs);
        let mut basis = VolumetricEdgeBasis::tet4();
        basis.link(&element, LinkFlags::curl_only());
        let derivatives = finite_difference_derivatives(&mut basis, &element, &Tet4Lagrange, &xi);
        precompute_at(&mut basis, &xi);
        let curl = basis.curl_operator(0).clone();
        let scale = curl.abs().max().max(1.0);
        assert_approx_matrix_eq!(curl, finite_difference_curl_3d(&derivatives), abstol = 1e-6 * scale);
    }

    #[test]
    fn potential_curl_is_cross_product_with_nodal_gradients(
        element in affine_element::<3>(Topology::Tet4),
        xi in interior_point::<3>(),
        potential in proptest::collection::vec(-1.0..1.0, 12)
    ) {
        let mut basis = VolumetricEdgeBasis::tet4();
        basis.link(&element, LinkFlags::default().with_gradient(true).with_potential_curl(true));
        precompute_at(&mut basis, &xi);
        prop_assert!(gradient_column_sum(&mut basis).norm() <= 1e-12);

        let gradient = basis.gradient_operator(0).clone();
        let potential = DVector::from_vec(potential);
        let mut expected = Vector3::zeros();
        for a in 0..4 {
            let g = gradient.column(a).into_owned();
            let value = potential.fixed_rows::<3>(3 * a).into_owned();
            expected += g.cross(&value);
        }
        let actual = basis.potential_curl_operator(0) * &potential;
        assert_approx_matrix_eq!(actual, expected, abstol = 1e-12);
    }
}
