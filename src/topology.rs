//! Element topologies and the local numbering of their edges and faces.
use eyre::eyre;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::Real;

/// Local edges of a triangle, each given as `[tail, head]`.
///
/// The mid-edge node of edge `e` of a quadratic triangle is node `3 + e`.
pub const TRIANGLE_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];

/// Local edges of a tetrahedron, each given as `[tail, head]`.
///
/// The mid-edge node of edge `e` of a quadratic tetrahedron is node `4 + e`.
pub const TETRAHEDRON_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];

/// Local faces of a tetrahedron.
///
/// For a positively oriented tetrahedron, the corners of every face are ordered
/// counter-clockwise when seen from outside the element. Face `f` is opposite
/// vertex `3 - f`.
pub const TETRAHEDRON_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

/// The interior "face" of a triangle.
pub const TRIANGLE_FACES: [[usize; 3]; 1] = [[0, 1, 2]];

/// The single edge of a line element.
pub const SEGMENT_EDGES: [[usize; 2]; 1] = [[0, 1]];

/// Element topologies supported by the edge basis engines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Quadratic line facet embedded in two dimensions.
    Line3,
    /// Linear triangle.
    Tri3,
    /// Quadratic triangle, possibly with curved edges.
    Tri6,
    /// Thin-shell facet lying on one edge of a quadratic triangle.
    Tri6ThinShell,
    /// Linear tetrahedron.
    Tet4,
    /// Quadratic tetrahedron, possibly with curved edges.
    Tet10,
}

impl Topology {
    pub const ALL: [Topology; 6] = [
        Topology::Line3,
        Topology::Tri3,
        Topology::Tri6,
        Topology::Tri6ThinShell,
        Topology::Tet4,
        Topology::Tet10,
    ];

    /// The tag used for this topology in mesh files and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Topology::Line3 => "LINE3",
            Topology::Tri3 => "TRI3",
            Topology::Tri6 => "TRI6",
            Topology::Tri6ThinShell => "TRI6_TS",
            Topology::Tet4 => "TET4",
            Topology::Tet10 => "TET10",
        }
    }

    /// Dimension of the physical space the element lives in.
    pub fn spatial_dim(&self) -> usize {
        match self {
            Topology::Tet4 | Topology::Tet10 => 3,
            _ => 2,
        }
    }

    /// Number of reference coordinates expected by `precompute`.
    pub fn reference_dim(&self) -> usize {
        match self {
            Topology::Line3 | Topology::Tri6ThinShell => 1,
            Topology::Tri3 | Topology::Tri6 => 2,
            Topology::Tet4 | Topology::Tet10 => 3,
        }
    }

    /// Number of geometry nodes in the element handle passed to `link`.
    ///
    /// For the thin-shell facet this is the node count of its quadratic triangle master.
    pub fn num_nodes(&self) -> usize {
        match self {
            Topology::Line3 => 3,
            Topology::Tri3 => 3,
            Topology::Tri6 | Topology::Tri6ThinShell => 6,
            Topology::Tet4 => 4,
            Topology::Tet10 => 10,
        }
    }

    /// Number of edge signs in the element handle passed to `link`.
    pub fn num_edges(&self) -> usize {
        match self {
            Topology::Line3 => 1,
            Topology::Tri3 | Topology::Tri6 | Topology::Tri6ThinShell => 3,
            Topology::Tet4 | Topology::Tet10 => 6,
        }
    }

    /// Number of face orientation codes in the element handle passed to `link`.
    pub fn num_oriented_faces(&self) -> usize {
        match self {
            Topology::Tet10 => 4,
            _ => 0,
        }
    }

    /// Number of edge and face degrees of freedom, i.e. the number of columns of $E$.
    pub fn num_dofs(&self) -> usize {
        match self {
            Topology::Line3 | Topology::Tri6ThinShell => 2,
            Topology::Tri3 => 3,
            Topology::Tri6 => 8,
            Topology::Tet4 => 6,
            Topology::Tet10 => 20,
        }
    }

    /// Whether the element carries the quadratic (two functions per edge) family.
    pub fn is_quadratic(&self) -> bool {
        !matches!(self, Topology::Tri3 | Topology::Tet4)
    }

    /// Whether the topology defines a curl operator.
    pub fn supports_curl(&self) -> bool {
        !matches!(self, Topology::Line3)
    }
}

impl Display for Topology {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Topology {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topology::ALL
            .iter()
            .copied()
            .find(|topology| topology.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| eyre!("unknown element topology tag \"{}\"", s))
    }
}

/// Orientation of a local edge relative to the global edge direction.
///
/// The global direction is a property of the mesh: an edge shared by several elements
/// has `Positive` sign in the elements whose local `[tail, head]` ordering agrees with it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeSign {
    #[default]
    Positive,
    Negative,
}

impl EdgeSign {
    /// Sign from an integer flag, as stored by most mesh formats.
    ///
    /// # Panics
    ///
    /// Panics if the flag is neither `1` nor `-1`.
    pub fn from_flag(flag: i32) -> Self {
        match flag {
            1 => EdgeSign::Positive,
            -1 => EdgeSign::Negative,
            _ => panic!("Edge sign flag must be 1 or -1, got {}", flag),
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, EdgeSign::Positive)
    }

    pub fn reversed(&self) -> Self {
        match self {
            EdgeSign::Positive => EdgeSign::Negative,
            EdgeSign::Negative => EdgeSign::Positive,
        }
    }

    pub fn value<T: Real>(&self) -> T {
        match self {
            EdgeSign::Positive => T::one(),
            EdgeSign::Negative => -T::one(),
        }
    }
}
