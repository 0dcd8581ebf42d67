//! Hierarchical WBS codes
//!
//! A code such as `1.2.10` encodes a node's position in the WBS tree.
//! Codes are authored by hand, so parsing is lenient: malformed segments
//! degrade to `0` instead of failing.

use std::fmt;

/// Sort key derived from a hierarchical code
///
/// Keys compare segment by segment as integers, giving the natural reading
/// order `1 < 1.1 < 1.2 < 1.10 < 2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(Vec<u64>);

impl SortKey {
    /// Returns the numeric segments of the key
    pub fn segments(&self) -> &[u64] {
        &self.0
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| n.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Builds the sort key for a code
///
/// Splits on `.` and whitespace. Each all-digit piece contributes its value,
/// anything else contributes `0`. An empty code yields `(0,)`.
pub fn sort_key(code: &str) -> SortKey {
    let segments: Vec<u64> = code
        .split(|c: char| c == '.' || c.is_whitespace())
        .filter(|piece| !piece.is_empty())
        .map(segment_value)
        .collect();

    if segments.is_empty() {
        SortKey(vec![0])
    } else {
        SortKey(segments)
    }
}

fn segment_value(piece: &str) -> u64 {
    if piece.bytes().all(|b| b.is_ascii_digit()) {
        piece.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Returns the parent code: the code with its last `.` segment removed
///
/// Single-segment and empty codes have no parent.
pub fn parent_code(code: &str) -> Option<&str> {
    code.rfind('.').map(|idx| &code[..idx])
}

/// Depth of a code in the tree (number of `.` segments, 0 for empty)
pub fn depth(code: &str) -> usize {
    if code.is_empty() {
        0
    } else {
        code.split('.').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn natural_reading_order() {
        let ordered = ["", "1", "1.1", "1.2", "1.10", "2", "10"];

        for window in ordered.windows(2) {
            assert!(
                sort_key(window[0]) < sort_key(window[1]),
                "{:?} should sort before {:?}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn sorting_shuffled_codes() {
        let mut codes = vec!["10", "1.10", "2", "", "1.2", "1", "1.1"];
        codes.sort_by_key(|c| sort_key(c));
        assert_eq!(codes, vec!["", "1", "1.1", "1.2", "1.10", "2", "10"]);
    }

    #[test]
    fn empty_code_is_zero() {
        assert_eq!(sort_key("").segments(), &[0]);
        assert_eq!(sort_key("   ").segments(), &[0]);
    }

    #[test]
    fn malformed_segments_degrade_to_zero() {
        assert_eq!(sort_key("1.a.3").segments(), &[1, 0, 3]);
        assert_eq!(sort_key("x").segments(), &[0]);
        assert_eq!(sort_key("1.-2").segments(), &[1, 0]);
    }

    #[test]
    fn separator_runs_collapse() {
        assert_eq!(sort_key("1..2").segments(), &[1, 2]);
        assert_eq!(sort_key("1. 2").segments(), &[1, 2]);
        assert_eq!(sort_key(" 3 ").segments(), &[3]);
    }

    #[test]
    fn oversized_segment_is_zero() {
        assert_eq!(sort_key("1.99999999999999999999999").segments(), &[1, 0]);
    }

    #[test]
    fn parent_codes() {
        assert_eq!(parent_code("1.1.1"), Some("1.1"));
        assert_eq!(parent_code("1.1"), Some("1"));
        assert_eq!(parent_code("1"), None);
        assert_eq!(parent_code("2"), None);
        assert_eq!(parent_code(""), None);
    }

    #[test]
    fn depths() {
        assert_eq!(depth(""), 0);
        assert_eq!(depth("1"), 1);
        assert_eq!(depth("1.2.3"), 3);
    }

    #[test]
    fn display_key() {
        assert_eq!(sort_key("1.10").to_string(), "(1, 10)");
    }

    proptest! {
        #[test]
        fn prop_child_sorts_after_parent(parent in prop::collection::vec(0u32..1000, 1..5), child in 0u32..1000) {
            let parent_code: Vec<String> = parent.iter().map(|n| n.to_string()).collect();
            let parent_code = parent_code.join(".");
            let child_code = format!("{}.{}", parent_code, child);

            prop_assert!(sort_key(&parent_code) < sort_key(&child_code));
        }

        #[test]
        fn prop_sort_key_never_empty(code in "\\PC*") {
            prop_assert!(!sort_key(&code).segments().is_empty());
        }

        #[test]
        fn prop_sort_key_deterministic(code in "[0-9a-z. ]{0,16}") {
            prop_assert_eq!(sort_key(&code), sort_key(&code));
        }
    }
}
