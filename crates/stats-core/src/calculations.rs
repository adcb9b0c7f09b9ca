//! Counting and rounding primitives shared by the aggregation stages.

/// Count the words in a message body.
///
/// Splits on single-space boundaries and discards empty tokens. Consecutive
/// spaces produce empty tokens that are dropped; tabs and newlines do not
/// split at all. This mirrors the accounting the exported data was originally
/// measured with and is kept intentionally, even though it differs from a
/// whitespace-collapsing tokenizer.
///
/// # Examples
///
/// ```
/// use stats_core::calculations::word_count;
///
/// assert_eq!(word_count("hello there"), 2);
/// assert_eq!(word_count("a  b"), 2);
/// assert_eq!(word_count("a\tb"), 1);
/// assert_eq!(word_count(""), 0);
/// ```
pub fn word_count(content: &str) -> u64 {
    content.split(' ').filter(|token| !token.is_empty()).count() as u64
}

/// Round to two decimal places.
///
/// Uses [`f64::round`], which rounds half away from zero; every 2-decimal
/// figure in the emitted reports goes through this helper so the rounding
/// rule is consistent across the pipeline.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `(part / whole) * 100`, rounded to two decimals.
///
/// `whole` must be non-zero; the aggregation stage rejects empty input
/// before any percentage is computed.
pub fn percentage(part: u64, whole: u64) -> f64 {
    round2(part as f64 / whole as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── word_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_word_count_simple() {
        assert_eq!(word_count("the quick brown fox"), 4);
    }

    #[test]
    fn test_word_count_empty_string() {
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_word_count_only_spaces() {
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_word_count_double_space_yields_two_words() {
        // "a  b" splits into ["a", "", "b"]; the empty token is dropped.
        assert_eq!(word_count("a  b"), 2);
    }

    #[test]
    fn test_word_count_tab_does_not_split() {
        assert_eq!(word_count("a\tb"), 1);
    }

    #[test]
    fn test_word_count_newline_does_not_split() {
        assert_eq!(word_count("a\nb"), 1);
    }

    #[test]
    fn test_word_count_leading_and_trailing_spaces() {
        assert_eq!(word_count("  hello world "), 2);
    }

    // ── round2 ─────────────────────────────────────────────────────────────

    #[test]
    fn test_round2_passthrough() {
        assert!((round2(12.34) - 12.34).abs() < 1e-9);
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        // 0.125 is exact in binary, so the midpoint is genuine.
        assert!((round2(0.125) - 0.13).abs() < 1e-9);
        assert!((round2(-0.125) - (-0.13)).abs() < 1e-9);
    }

    #[test]
    fn test_round2_truncates_long_fractions() {
        assert!((round2(1.0 / 3.0) - 0.33).abs() < 1e-9);
        assert!((round2(2.0 / 3.0) - 0.67).abs() < 1e-9);
    }

    // ── percentage ─────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        assert!((percentage(1, 4) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        // 1/3 → 33.333…% → 33.33
        assert!((percentage(1, 3) - 33.33).abs() < 1e-9);
        // 2/3 → 66.666…% → 66.67
        assert!((percentage(2, 3) - 66.67).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_full_share() {
        assert!((percentage(7, 7) - 100.0).abs() < 1e-9);
    }
}
