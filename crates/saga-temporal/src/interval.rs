//! Half-open interval math over optional bounds.
//!
//! An interval `[start, end)` includes `start` and excludes `end`. A `None`
//! start is unbounded below, a `None` end is unbounded above.

use std::fmt::Debug;

use saga_core::errors::{SagaError, SagaResult};

/// True when both bounds are present and the interval holds no point.
pub fn is_empty<T: Ord>(start: Option<T>, end: Option<T>) -> bool {
    matches!((start, end), (Some(s), Some(e)) if s >= e)
}

/// `(start is None or start <= point) and (end is None or point < end)`.
pub fn contains<T: Ord>(point: T, start: Option<T>, end: Option<T>) -> bool {
    start.map_or(true, |s| s <= point) && end.map_or(true, |e| point < e)
}

/// True when `[a_start, a_end)` and `[b_start, b_end)` share a point.
///
/// Empty intervals overlap nothing, including an interval that would
/// otherwise straddle them.
pub fn overlaps<T: Ord + Copy>(
    a_start: Option<T>,
    a_end: Option<T>,
    b_start: Option<T>,
    b_end: Option<T>,
) -> bool {
    if is_empty(a_start, a_end) || is_empty(b_start, b_end) {
        return false;
    }
    let a_reaches_b = match (a_end, b_start) {
        (Some(end), Some(start)) => end > start,
        _ => true,
    };
    let b_reaches_a = match (a_start, b_end) {
        (Some(start), Some(end)) => start < end,
        _ => true,
    };
    a_reaches_b && b_reaches_a
}

/// `InvalidInterval` when both bounds are present and `start > end`.
pub fn validate_bounds<T: Ord + Debug>(start: Option<&T>, end: Option<&T>) -> SagaResult<()> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(SagaError::InvalidInterval(format!(
                "starts_at ({s:?}) must be <= ends_at ({e:?})"
            )));
        }
    }
    Ok(())
}

/// `InvalidRange` when `from > to`.
pub fn validate_range<T: Ord + Debug>(from: &T, to: &T) -> SagaResult<()> {
    if from > to {
        return Err(SagaError::InvalidRange(format!(
            "from ({from:?}) must be <= to ({to:?})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Option<i64> = Some(1000);
    const END: Option<i64> = Some(2000);

    #[test]
    fn contains_is_half_open() {
        assert!(!contains(999, START, END));
        assert!(contains(1000, START, END));
        assert!(contains(1999, START, END));
        assert!(!contains(2000, START, END));
    }

    #[test]
    fn open_bounds_extend_forever() {
        assert!(contains(i64::MIN, None, None));
        assert!(contains(i64::MAX, None, None));
        assert!(contains(-5, None, END));
        assert!(contains(1_000_000, START, None));
        assert!(!contains(999, START, None));
    }

    #[test]
    fn overlaps_against_closed_interval() {
        assert!(overlaps(START, END, Some(1800), Some(2500)));
        assert!(!overlaps(START, END, Some(2000), Some(3000)));
        assert!(!overlaps(START, END, Some(500), Some(1000)));
        assert!(overlaps(START, END, Some(500), Some(1001)));
    }

    #[test]
    fn zero_width_range_overlaps_nothing() {
        assert!(!overlaps(START, END, Some(1500), Some(1500)));
        assert!(!overlaps(None, None, Some(1500), Some(1500)));
        assert!(!overlaps(Some(1500), Some(1500), None, None));
    }

    #[test]
    fn unbounded_intervals_overlap_everything_nonempty() {
        assert!(overlaps(None, None, Some(0), Some(1)));
        assert!(overlaps(None, Some(1001), Some(1000), None));
        assert!(!overlaps(None, Some(1000), Some(1000), None));
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (Some(0), Some(10), Some(5), Some(15)),
            (None, Some(10), Some(10), None),
            (Some(3), None, None, Some(4)),
        ];
        for (a0, a1, b0, b1) in cases {
            assert_eq!(overlaps(a0, a1, b0, b1), overlaps(b0, b1, a0, a1));
        }
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(validate_bounds(Some(&5), Some(&5)).is_ok());
        assert!(validate_bounds(Some(&5), None).is_ok());
        assert!(matches!(
            validate_bounds(Some(&6), Some(&5)),
            Err(SagaError::InvalidInterval(_))
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(validate_range(&1500, &1500).is_ok());
        assert!(matches!(
            validate_range(&2, &1),
            Err(SagaError::InvalidRange(_))
        ));
    }
}
