use std::collections::BTreeSet;

/// Maximum entries a single dash-range may expand to.
pub const MAX_RANGE_SPAN: u64 = 1_000;
/// Maximum entries across all ranges of one citation.
pub const MAX_TOTAL_LINE_IDS: usize = 10_000;

/// Outcome of interpreting one `line_ids` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRangeOutcome {
    /// Strictly ascending, deduplicated line ids.
    Lines(Vec<u64>),
    /// A dash-range exceeded the expansion cap; the citation keeps its other
    /// fields and loses only `line_ids`.
    TooLarge { span: u64 },
    /// Nothing parseable in the input.
    Empty,
}

/// Interpret a compact range string such as `"1-3, 10-12, 20"` or an
/// unsorted list such as `"50, 30, 10"`.
///
/// Contract:
/// - Output is strictly ascending and deduplicated.
/// - Cost is linear in the size of the output, never in the span of the
///   ranges: the per-range cap is checked arithmetically before expansion.
/// - Unparseable tokens (empty, non-numeric, reversed ranges) are skipped;
///   remaining tokens still contribute.
pub fn interpret_line_ranges(raw: &str) -> LineRangeOutcome {
    let mut seen: BTreeSet<u64> = BTreeSet::new();

    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((lo_s, hi_s)) = token.split_once('-') {
            let lo: u64 = match lo_s.trim().parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let hi: u64 = match hi_s.trim().parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            if hi < lo {
                continue;
            }
            let span = hi - lo + 1;
            if span > MAX_RANGE_SPAN {
                return LineRangeOutcome::TooLarge { span };
            }
            for v in lo..=hi {
                seen.insert(v);
            }
        } else if let Ok(v) = token.parse::<u64>() {
            seen.insert(v);
        }

        if seen.len() > MAX_TOTAL_LINE_IDS {
            return LineRangeOutcome::TooLarge {
                span: seen.len() as u64,
            };
        }
    }

    if seen.is_empty() {
        LineRangeOutcome::Empty
    } else {
        LineRangeOutcome::Lines(seen.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{interpret_line_ranges, LineRangeOutcome};

    #[test]
    fn unsorted_list_comes_back_ascending_and_deduplicated() {
        assert_eq!(
            interpret_line_ranges("50, 30, 10, 40, 20"),
            LineRangeOutcome::Lines(vec![10, 20, 30, 40, 50])
        );
        assert_eq!(
            interpret_line_ranges("5, 5, 5"),
            LineRangeOutcome::Lines(vec![5])
        );
    }

    #[test]
    fn dash_ranges_expand_and_merge() {
        assert_eq!(
            interpret_line_ranges("1-3, 10-12, 20"),
            LineRangeOutcome::Lines(vec![1, 2, 3, 10, 11, 12, 20])
        );
        // Overlapping ranges collapse.
        assert_eq!(
            interpret_line_ranges("1-4, 3-6"),
            LineRangeOutcome::Lines(vec![1, 2, 3, 4, 5, 6])
        );
    }

    #[test]
    fn oversized_range_is_rejected_without_expansion() {
        // The cap check happens before any allocation, so this returns
        // immediately rather than expanding 100k entries.
        match interpret_line_ranges("1-100000") {
            LineRangeOutcome::TooLarge { span } => assert_eq!(span, 100_000),
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn garbage_tokens_are_skipped() {
        assert_eq!(
            interpret_line_ranges("abc, 7, 9-8, -3, 2"),
            LineRangeOutcome::Lines(vec![2, 7])
        );
        assert_eq!(interpret_line_ranges(""), LineRangeOutcome::Empty);
        assert_eq!(interpret_line_ranges("x, y, z"), LineRangeOutcome::Empty);
    }
}
