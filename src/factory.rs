//! Selection of the edge basis engine for an element topology.
use log::debug;

use crate::basis::{EdgeBasis, Line3EdgeBasis, PlanarEdgeBasis, Tri6ThinShellEdgeBasis, VolumetricEdgeBasis};
use crate::topology::Topology;
use crate::Real;

/// Creates the engine for a two-dimensional topology, using unit Lagrange geometry.
///
/// # Panics
///
/// Panics if the topology lives in three dimensions.
pub fn planar_edge_basis<T: Real>(topology: Topology) -> Box<dyn EdgeBasis<T, 2>> {
    debug!("Creating {} edge basis", topology);
    match topology {
        Topology::Line3 => Box::new(Line3EdgeBasis::new()),
        Topology::Tri3 => Box::new(PlanarEdgeBasis::tri3()),
        Topology::Tri6 => Box::new(PlanarEdgeBasis::tri6()),
        Topology::Tri6ThinShell => Box::new(Tri6ThinShellEdgeBasis::new()),
        Topology::Tet4 | Topology::Tet10 => {
            panic!("{} is not a two-dimensional topology", topology)
        }
    }
}

/// Creates the engine for a three-dimensional topology, using unit Lagrange geometry.
///
/// # Panics
///
/// Panics if the topology lives in two dimensions.
pub fn volumetric_edge_basis<T: Real>(topology: Topology) -> Box<dyn EdgeBasis<T, 3>> {
    debug!("Creating {} edge basis", topology);
    match topology {
        Topology::Tet4 => Box::new(VolumetricEdgeBasis::tet4()),
        Topology::Tet10 => Box::new(VolumetricEdgeBasis::tet10()),
        Topology::Line3 | Topology::Tri3 | Topology::Tri6 | Topology::Tri6ThinShell => {
            panic!("{} is not a three-dimensional topology", topology)
        }
    }
}
