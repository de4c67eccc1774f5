//! # Text Direction
//!
//! RTL detection and the display fixes applied to right-to-left text before
//! it is handed to a render target.
//!
//! Render targets draw an RTL run as a reversed character sequence. That is
//! correct for letters but wrong for two things embedded in them:
//! 1. Paired brackets: the opening bracket must be mirrored so it still
//!    opens in the reading direction.
//! 2. ASCII digit runs: they read left-to-right even inside RTL text, so
//!    each run is pre-reversed to come out in the right order.

use crate::model::ScriptElementType;
use crate::style::{Direction, TextAlign};

const BRACKET_PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// Check if text contains any right-to-left character.
pub fn is_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// Reading direction of a piece of text.
pub fn direction(text: &str) -> Direction {
    if is_rtl(text) {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

fn is_rtl_char(ch: char) -> bool {
    matches!(ch,
        '\u{0590}'..='\u{05FF}' |  // Hebrew
        '\u{0600}'..='\u{06FF}' |  // Arabic
        '\u{0700}'..='\u{074F}' |  // Syriac
        '\u{0750}'..='\u{077F}' |  // Arabic Supplement
        '\u{0780}'..='\u{07BF}' |  // Thaana
        '\u{08A0}'..='\u{08FF}' |  // Arabic Extended-A
        '\u{FB1D}'..='\u{FB4F}' |  // Hebrew Presentation Forms
        '\u{FB50}'..='\u{FDFF}' |  // Arabic Presentation Forms-A
        '\u{FE70}'..='\u{FEFF}'    // Arabic Presentation Forms-B
    )
}

/// Swap each single-level `()`, `[]` and `{}` pair in RTL text.
///
/// `(x)` becomes `)x(`. A swapped pair is found again by the same scan, so
/// applying this twice restores the input. This also means a reversed
/// `)x(` pair already present in the input comes out as `(x)`.
/// LTR text is returned unchanged.
pub fn mirror_brackets(text: &str) -> String {
    if !is_rtl(text) {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    for (open, close) in BRACKET_PAIRS {
        swap_bracket_pairs(&mut chars, open, close);
    }
    chars.into_iter().collect()
}

fn swap_bracket_pairs(chars: &mut [char], open: char, close: char) {
    let is_bracket = |c: char| c == open || c == close;
    let mut i = 0;
    while i < chars.len() {
        let partner = match chars[i] {
            c if c == open => close,
            c if c == close => open,
            _ => {
                i += 1;
                continue;
            }
        };

        let mut j = i + 1;
        while j < chars.len() && !is_bracket(chars[j]) {
            j += 1;
        }

        if j == chars.len() {
            break;
        }
        if chars[j] != partner {
            // Same bracket twice in a row: retry from the second one.
            i = j;
            continue;
        }
        if j > i + 1 {
            chars.swap(i, j);
        }
        i = j + 1;
    }
}

/// Reverse every maximal run of ASCII digits in RTL text.
pub fn reverse_embedded_digits(text: &str) -> String {
    if !is_rtl(text) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut run: Vec<char> = Vec::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            run.push(ch);
            continue;
        }
        out.extend(run.drain(..).rev());
        out.push(ch);
    }
    out.extend(run.drain(..).rev());
    out
}

/// Apply both RTL display fixes. LTR text passes through untouched.
pub fn shape_for_display(text: &str) -> String {
    reverse_embedded_digits(&mirror_brackets(text))
}

/// Horizontal alignment of an element's text.
///
/// Transitions sit opposite the reading direction; character cues are
/// always centred. For scene headings this is the alignment of the heading
/// text; the scene numbers go into the margins.
pub fn alignment_for(kind: ScriptElementType, direction: Direction) -> TextAlign {
    let rtl = direction.is_rtl();
    match kind {
        ScriptElementType::Character => TextAlign::Center,
        ScriptElementType::Transition if rtl => TextAlign::Left,
        ScriptElementType::Transition => TextAlign::Right,
        ScriptElementType::Action
        | ScriptElementType::Dialogue
        | ScriptElementType::Subheader
        | ScriptElementType::SceneHeading => {
            if rtl {
                TextAlign::Right
            } else {
                TextAlign::Left
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtl_detection() {
        assert!(is_rtl("שלום"));
        assert!(is_rtl("مرحبا"));
        assert!(is_rtl("Hello שלום"));
        assert!(!is_rtl("Hello"));
        assert!(!is_rtl(""));
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction("שלום"), Direction::Rtl);
        assert_eq!(direction("Hello World"), Direction::Ltr);
    }

    #[test]
    fn test_presentation_forms_are_rtl() {
        assert!(is_rtl("\u{FB50}"));
        assert!(is_rtl("\u{FEFC}"));
        assert!(!is_rtl("\u{FF21}"));
    }

    #[test]
    fn test_mirror_brackets_rtl() {
        assert_eq!(mirror_brackets("שלום (עולם)"), "שלום )עולם(");
        assert_eq!(mirror_brackets("א [ב] {ג}"), "א ]ב[ }ג{");
    }

    #[test]
    fn test_mirror_brackets_ltr_untouched() {
        assert_eq!(mirror_brackets("hello (world)"), "hello (world)");
    }

    #[test]
    fn test_mirror_brackets_self_inverse() {
        for text in ["שלום (עולם)", "א (ב)(ג) [ד] {ה} ו", "(א) טקסט", "אין סוגריים"] {
            assert_eq!(mirror_brackets(&mirror_brackets(text)), text);
        }
    }

    #[test]
    fn test_mirror_brackets_swaps_reversed_input_pair() {
        assert_eq!(mirror_brackets("א )ב("), "א (ב)");
    }

    #[test]
    fn test_mirror_brackets_leaves_empty_pairs() {
        assert_eq!(mirror_brackets("א ()"), "א ()");
    }

    #[test]
    fn test_reverse_embedded_digits() {
        assert_eq!(reverse_embedded_digits("סצנה 123 ו-45"), "סצנה 321 ו-54");
        assert_eq!(reverse_embedded_digits("scene 123"), "scene 123");
        assert_eq!(reverse_embedded_digits("א2025"), "א5202");
    }

    #[test]
    fn test_shape_for_display() {
        assert_eq!(shape_for_display("בשעה (10)"), "בשעה )01(");
        assert_eq!(shape_for_display("at (10)"), "at (10)");
    }

    #[test]
    fn test_alignment_policy() {
        use ScriptElementType::*;
        assert_eq!(alignment_for(Action, direction("שלום")), TextAlign::Right);
        assert_eq!(alignment_for(Action, Direction::Ltr), TextAlign::Left);
        assert_eq!(alignment_for(Dialogue, Direction::Rtl), TextAlign::Right);
        assert_eq!(alignment_for(Subheader, Direction::Ltr), TextAlign::Left);
        assert_eq!(alignment_for(Transition, Direction::Ltr), TextAlign::Right);
        assert_eq!(alignment_for(Transition, Direction::Rtl), TextAlign::Left);
        assert_eq!(alignment_for(Character, Direction::Rtl), TextAlign::Center);
        assert_eq!(alignment_for(Character, Direction::Ltr), TextAlign::Center);
    }
}
