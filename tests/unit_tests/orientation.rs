use nalgebra::Vector3;
use proptest::prelude::*;
use std::convert::TryFrom;
use whitney::orientation::{reconcile_face, FaceOrientation};

/// The raw face functions anchored at each corner, written out symbolically.
///
/// `raw[i]` is represented by the anchor corner and a sign, so that reconciliation can be checked
/// against the owner's functions without evaluating anything.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Anchored {
    corner: usize,
    negated: bool,
}

impl std::ops::Neg for Anchored {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            negated: !self.negated,
            ..self
        }
    }
}

/// Reversing the corner cycle negates every anchored function.
fn raw_functions(local: [usize; 3], reversed: bool) -> [Anchored; 3] {
    local.map(|corner| Anchored {
        corner,
        negated: reversed,
    })
}

#[test]
fn reconciliation_recovers_owner_functions() {
    let owner = [10, 20, 30];
    let arrangements = [
        ([10, 20, 30], false),
        ([20, 10, 30], true),
        ([30, 20, 10], true),
        ([10, 30, 20], true),
    ];
    for (code, (local, reversed)) in arrangements.into_iter().enumerate() {
        let orientation = FaceOrientation::from_corners(owner, local);
        assert_eq!(orientation.code() as usize, code);

        let [first, second, third] = reconcile_face(orientation, &raw_functions(local, reversed));
        let positive = |corner| Anchored {
            corner,
            negated: false,
        };
        assert_eq!(first, positive(10), "first dof for code {}", code);
        assert_eq!(second, positive(20), "second dof for code {}", code);
        assert_eq!(third, positive(30), "dependent function for code {}", code);
    }
}

#[test]
#[should_panic]
fn rotated_corners_are_rejected() {
    FaceOrientation::from_corners([1, 2, 3], [2, 3, 1]);
}

#[test]
#[should_panic]
fn foreign_corners_are_rejected() {
    FaceOrientation::from_corners([1, 2, 3], [1, 2, 4]);
}

#[test]
#[should_panic]
fn invalid_code_panics() {
    FaceOrientation::new(4);
}

#[test]
fn try_from_rejects_invalid_codes() {
    assert_eq!(FaceOrientation::try_from(3u8).unwrap(), FaceOrientation::new(3));
    assert!(FaceOrientation::try_from(4u8).is_err());
}

#[test]
fn serde_uses_plain_codes() {
    let json = serde_json::to_string(&FaceOrientation::new(2)).unwrap();
    assert_eq!(json, "2");
    let decoded: FaceOrientation = serde_json::from_str("3").unwrap();
    assert_eq!(decoded.code(), 3);
    assert!(serde_json::from_str::<FaceOrientation>("7").is_err());
}

proptest! {
    #[test]
    fn every_code_is_an_involution(orientation in any::<FaceOrientation>(), raw in proptest::collection::vec(-1.0..1.0, 9)) {
        let raw = [
            Vector3::new(raw[0], raw[1], raw[2]),
            Vector3::new(raw[3], raw[4], raw[5]),
            Vector3::new(raw[6], raw[7], raw[8]),
        ];
        let twice = reconcile_face(orientation.inverse(), &reconcile_face(orientation, &raw));
        prop_assert_eq!(twice, raw);
    }

    #[test]
    fn reconciliation_preserves_sum(orientation in any::<FaceOrientation>(), a in -1.0..1.0, b in -1.0..1.0) {
        // Raw functions that sum to zero stay that way
        let raw: [f64; 3] = [a, b, -(a + b)];
        let [first, second, third] = reconcile_face(orientation, &raw);
        prop_assert!((first + second + third).abs() <= 1e-15);
    }
}
