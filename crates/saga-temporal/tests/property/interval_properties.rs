//! Interval math against a brute-force point model.

use proptest::prelude::*;

use saga_temporal::interval::{contains, overlaps};

const LO: i64 = -20;
const HI: i64 = 20;

fn bound() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(LO..HI)
}

/// Does some integer point in the probe range fall in both intervals?
fn share_a_point(a: (Option<i64>, Option<i64>), b: (Option<i64>, Option<i64>)) -> bool {
    (LO - 2..HI + 2).any(|p| contains(p, a.0, a.1) && contains(p, b.0, b.1))
}

proptest! {
    #[test]
    fn overlap_iff_shared_point(a0 in bound(), a1 in bound(), b0 in bound(), b1 in bound()) {
        prop_assert_eq!(overlaps(a0, a1, b0, b1), share_a_point((a0, a1), (b0, b1)));
    }

    #[test]
    fn overlap_is_symmetric(a0 in bound(), a1 in bound(), b0 in bound(), b1 in bound()) {
        prop_assert_eq!(overlaps(a0, a1, b0, b1), overlaps(b0, b1, a0, a1));
    }

    #[test]
    fn contained_point_means_overlap_with_unit_range(p in LO..HI, s in bound(), e in bound()) {
        prop_assert_eq!(contains(p, s, e), overlaps(s, e, Some(p), Some(p + 1)));
    }

    #[test]
    fn zero_width_range_never_overlaps(p in LO..HI, s in bound(), e in bound()) {
        prop_assert!(!overlaps(s, e, Some(p), Some(p)));
    }
}
