//! Reconciliation of face-local degrees of freedom between elements sharing a face.
//!
//! Every face of a quadratic tetrahedron carries three raw face functions
//! $r_i = \lambda_{c_i} (\lambda_{c_{i+1}} \nabla \lambda_{c_{i+2}} - \lambda_{c_{i+2}} \nabla \lambda_{c_{i+1}})$,
//! anchored at the local face corners $c_0, c_1, c_2$. Only two of them are independent,
//! since $r_0 + r_1 + r_2 = 0$.
//!
//! The two degrees of freedom of a face are defined by the element that owns it: they are the
//! functions anchored at the owner's first and second corner. A neighbor that sees the face with
//! the reversed cycle computes each anchored function with the opposite sign, and has the owner's
//! corners at different local positions. The [`FaceOrientation`] code tells which.
use eyre::eyre;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::ops::Neg;

/// Orientation code of a face as seen from one element.
///
/// | code | local corners, in terms of the owner's `(A, B, C)` |
/// |------|-----------------------------------------------------|
/// | 0    | `(A, B, C)`: the element owns the face               |
/// | 1    | `(B, A, C)`: local corners 0 and 1 hold `A` and `B`  |
/// | 2    | `(C, B, A)`: local corners 1 and 2 hold `A` and `B`  |
/// | 3    | `(A, C, B)`: local corners 0 and 2 hold `A` and `B`  |
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FaceOrientation(u8);

impl FaceOrientation {
    pub const OWNER: FaceOrientation = FaceOrientation(0);

    /// # Panics
    ///
    /// Panics if `code > 3`.
    pub fn new(code: u8) -> Self {
        assert!(code < 4, "Face orientation code must be in 0..=3, got {}", code);
        Self(code)
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    /// The code that undoes this one.
    ///
    /// Each non-owner arrangement is a reflection of the owner's corner cycle, so every
    /// code is its own inverse.
    pub fn inverse(&self) -> Self {
        *self
    }

    /// Determines the code of a face whose owner lists its corners as `owner`
    /// and which the current element lists as `local`.
    ///
    /// Corners are typically global node indices.
    ///
    /// # Panics
    ///
    /// Panics if `local` is neither identical to `owner` nor one of its three reflections.
    pub fn from_corners(owner: [usize; 3], local: [usize; 3]) -> Self {
        let [a, b, c] = owner;
        match local {
            l if l == [a, b, c] => Self(0),
            l if l == [b, a, c] => Self(1),
            l if l == [c, b, a] => Self(2),
            l if l == [a, c, b] => Self(3),
            _ => panic!(
                "Face corners {:?} are not the owner's corners {:?} or a reflection of them",
                local, owner
            ),
        }
    }
}

impl TryFrom<u8> for FaceOrientation {
    type Error = eyre::Report;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        if code < 4 {
            Ok(Self(code))
        } else {
            Err(eyre!("face orientation code must be in 0..=3, got {}", code))
        }
    }
}

impl From<FaceOrientation> for u8 {
    fn from(orientation: FaceOrientation) -> Self {
        orientation.0
    }
}

#[derive(Debug, Copy, Clone)]
struct Pick {
    raw: usize,
    negate: bool,
}

const fn keep(raw: usize) -> Pick {
    Pick { raw, negate: false }
}

const fn flip(raw: usize) -> Pick {
    Pick { raw, negate: true }
}

/// For each code: the raw functions that become the first dof, the second dof and the
/// remaining (dependent) function of the face.
const RECONCILIATION: [[Pick; 3]; 4] = [
    [keep(0), keep(1), keep(2)],
    [flip(1), flip(0), flip(2)],
    [flip(2), flip(1), flip(0)],
    [flip(0), flip(2), flip(1)],
];

/// Reorders the raw face functions of one face into the owner's canonical order.
///
/// The first two entries of the result are the face's degrees of freedom.
pub fn reconcile_face<V>(orientation: FaceOrientation, raw: &[V; 3]) -> [V; 3]
where
    V: Clone + Neg<Output = V>,
{
    let pick = |p: &Pick| {
        let v = raw[p.raw].clone();
        if p.negate {
            -v
        } else {
            v
        }
    };
    let [first, second, third] = &RECONCILIATION[orientation.code() as usize];
    [pick(first), pick(second), pick(third)]
}
