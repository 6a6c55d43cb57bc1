//! Index resolution shared by every indexed container operation
//!
//! A non-negative index is valid iff `index < len`. A negative index counts
//! from the end: it is valid iff `index >= -len` and resolves to
//! `len + index`. `at`, `remove` and slice bounds all go through here so the
//! rule is applied identically everywhere.

use std::ops::Range;

/// Resolve `index` against a container of length `len`
///
/// Returns `None` when the index falls outside `[-len, len)`.
pub fn resolve_index(index: i32, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = index as i64;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        Some(resolved as usize)
    } else {
        None
    }
}

/// Resolve optional slice bounds into a half-open range
///
/// - `start` defaults to 0; a non-negative start is clamped to `len`; a
///   negative start counts from the end, and one below `-len` means 0.
/// - `end` defaults to `len`; a non-negative end is clamped to `len`; a
///   negative end counts from the end, and one below `-len` means 0.
///
/// Returns `None` (an empty slice) when the resolved start is past the end
/// or at/after `len`. Slicing never fails.
pub fn resolve_slice(start: Option<i32>, end: Option<i32>, len: usize) -> Option<Range<usize>> {
    let len = len as i64;

    let i = match start.map(i64::from) {
        None => 0,
        Some(s) if s >= 0 => s.min(len),
        Some(s) if s >= -len => s + len,
        Some(_) => 0,
    };

    let j = match end.map(i64::from) {
        None => len,
        Some(e) if e >= 0 => e.min(len),
        Some(e) if e >= -len => e + len,
        Some(_) => 0,
    };

    if i > j || i >= len {
        return None;
    }
    Some(i as usize..j as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_positive() {
        assert_eq!(resolve_index(0, 3), Some(0));
        assert_eq!(resolve_index(2, 3), Some(2));
        assert_eq!(resolve_index(3, 3), None);
    }

    #[test]
    fn test_resolve_negative() {
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(-3, 3), Some(0));
        assert_eq!(resolve_index(-4, 3), None);
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(resolve_index(0, 0), None);
        assert_eq!(resolve_index(-1, 0), None);
    }

    #[test]
    fn test_resolve_extremes() {
        assert_eq!(resolve_index(i32::MIN, 3), None);
        assert_eq!(resolve_index(i32::MAX, 3), None);
    }

    #[test]
    fn test_negative_equivalence() {
        let len = 5;
        for i in 0..len as i32 {
            assert_eq!(resolve_index(i, len), resolve_index(i - len as i32, len));
        }
    }

    #[test]
    fn test_slice_defaults() {
        assert_eq!(resolve_slice(None, None, 4), Some(0..4));
        assert_eq!(resolve_slice(Some(1), None, 4), Some(1..4));
        assert_eq!(resolve_slice(None, Some(2), 4), Some(0..2));
    }

    #[test]
    fn test_slice_negative_bounds() {
        assert_eq!(resolve_slice(Some(-2), None, 4), Some(2..4));
        assert_eq!(resolve_slice(Some(0), Some(-1), 4), Some(0..3));
        assert_eq!(resolve_slice(Some(-10), None, 4), Some(0..4));
    }

    #[test]
    fn test_slice_clamps_end() {
        assert_eq!(resolve_slice(Some(1), Some(100), 4), Some(1..4));
        assert_eq!(resolve_slice(Some(0), Some(-10), 4), Some(0..0));
    }

    #[test]
    fn test_slice_empty_cases() {
        assert_eq!(resolve_slice(Some(4), None, 4), None);
        assert_eq!(resolve_slice(Some(10), None, 4), None);
        assert_eq!(resolve_slice(Some(3), Some(1), 4), None);
        assert_eq!(resolve_slice(None, None, 0), None);
    }
}
