//! # Text Layout
//!
//! Greedy line breaking and scene-number labels. Widths come from the
//! [`FontMetrics`] provider, so wrapping is exact for whatever font the
//! render target will draw with.

pub mod bidi;

use crate::font::{FontMetrics, FontRole};

/// Break `text` into lines no wider than `max_width`.
///
/// Words are separated by single spaces on output. A word wider than the
/// budget is never split; it gets a line of its own and may overflow.
/// Empty text yields one empty line, so every element occupies at least
/// one line.
pub fn wrap_text(
    metrics: &dyn FontMetrics,
    text: &str,
    font: FontRole,
    size: f64,
    max_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", line, word);
        if metrics.width_of_text_at_size(&candidate, font, size) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Display label for a scene number.
///
/// With `pad` set, the number is zero-padded to the digit count of
/// `numbered_count`, so scene 7 of 120 reads `007`.
pub fn scene_number_label(id: u32, numbered_count: usize, pad: bool) -> String {
    if !pad {
        return id.to_string();
    }
    let width = numbered_count.max(1).to_string().len();
    format!("{:0width$}", id, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every character is 10pt wide at any size.
    struct FixedAdvance;

    impl FontMetrics for FixedAdvance {
        fn width_of_text_at_size(&self, text: &str, _font: FontRole, _size: f64) -> f64 {
            text.chars().count() as f64 * 10.0
        }
    }

    fn wrap(text: &str, max_width: f64) -> Vec<String> {
        wrap_text(&FixedAdvance, text, FontRole::Regular, 12.0, max_width)
    }

    #[test]
    fn test_wrap_greedy() {
        assert_eq!(
            wrap("the quick brown fox jumps", 100.0),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_wrap_exact_fit_stays_on_line() {
        // "aaaa bbbbb" is exactly 100pt.
        assert_eq!(wrap("aaaa bbbbb c", 100.0), vec!["aaaa bbbbb", "c"]);
    }

    #[test]
    fn test_long_word_gets_own_line() {
        assert_eq!(
            wrap("a supercalifragilistic b", 50.0),
            vec!["a", "supercalifragilistic", "b"]
        );
    }

    #[test]
    fn test_wrap_collapses_extra_spaces() {
        assert_eq!(wrap("  one   two  ", 1000.0), vec!["one two"]);
    }

    #[test]
    fn test_wrap_empty_is_one_line() {
        assert_eq!(wrap("", 100.0), vec![String::new()]);
    }

    #[test]
    fn test_wrap_preserves_words() {
        let text = "It was a bright cold day in April and the clocks were striking thirteen";
        let lines = wrap(text, 120.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_scene_number_label() {
        assert_eq!(scene_number_label(7, 120, true), "007");
        assert_eq!(scene_number_label(12, 12, true), "12");
        assert_eq!(scene_number_label(3, 9, true), "3");
        assert_eq!(scene_number_label(7, 120, false), "7");
    }
}
