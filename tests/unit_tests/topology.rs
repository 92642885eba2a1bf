use whitney::basis::{GeometryMode, LinkFlags, TET10_LAYOUT, TET4_LAYOUT, TRI3_LAYOUT, TRI6_LAYOUT};
use whitney::topology::{EdgeSign, Topology, TETRAHEDRON_EDGES, TETRAHEDRON_FACES};

#[test]
fn tags_round_trip() {
    for topology in Topology::ALL {
        let parsed: Topology = topology.tag().parse().unwrap();
        assert_eq!(parsed, topology);
        assert_eq!(topology.to_string(), topology.tag());
    }
    assert_eq!("tri6_ts".parse::<Topology>().unwrap(), Topology::Tri6ThinShell);
    assert_eq!(" TET10 ".parse::<Topology>().unwrap(), Topology::Tet10);
}

#[test]
fn unknown_tag_is_an_error() {
    let error = "HEX8".parse::<Topology>().unwrap_err();
    assert!(error.to_string().contains("HEX8"));
}

#[test]
fn dof_counts_agree_with_layouts() {
    for layout in [&TRI3_LAYOUT, &TRI6_LAYOUT, &TET4_LAYOUT, &TET10_LAYOUT] {
        assert_eq!(layout.num_dofs(), layout.topology.num_dofs());
        assert_eq!(layout.edges.len(), layout.topology.num_edges());
        assert_eq!(layout.num_vertices + layout.topology.is_quadratic() as usize * layout.edges.len(),
                   layout.topology.num_nodes());
    }
}

#[test]
fn tetrahedron_faces_are_built_from_local_edges() {
    for face in TETRAHEDRON_FACES {
        for i in 0..3 {
            let (a, b) = (face[i], face[(i + 1) % 3]);
            assert!(TETRAHEDRON_EDGES
                .iter()
                .any(|edge| *edge == [a, b] || *edge == [b, a]));
        }
    }
}

#[test]
fn edge_signs() {
    assert_eq!(EdgeSign::from_flag(1), EdgeSign::Positive);
    assert_eq!(EdgeSign::from_flag(-1), EdgeSign::Negative);
    assert_eq!(EdgeSign::Positive.reversed(), EdgeSign::Negative);
    assert_eq!(EdgeSign::Negative.value::<f64>(), -1.0);
    assert!(EdgeSign::default().is_positive());
}

#[test]
#[should_panic]
fn zero_edge_sign_flag_panics() {
    EdgeSign::from_flag(0);
}

#[test]
fn link_flags_round_trip_through_json() {
    let flags = LinkFlags::all().with_geometry(GeometryMode::Curved);
    let json = serde_json::to_string(&flags).unwrap();
    let decoded: LinkFlags = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, flags);

    // Missing fields fall back to an interpolation-only, auto-detected link
    let decoded: LinkFlags = serde_json::from_str(r#"{ "curl": true }"#).unwrap();
    assert_eq!(decoded, LinkFlags::curl_only());
    assert_eq!(decoded.geometry, GeometryMode::Auto);
}
