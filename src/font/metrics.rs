//! Advance widths for the standard PDF fonts the renderer can use without
//! embedding. Widths are in 1/1000 em, taken from the Adobe AFM files for
//! the printable ASCII range (0x20..=0x7E).

/// Width table for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E, or `None` for a monospaced font.
    ascii_widths: Option<&'static [u16; 95]>,
    /// Width used for everything outside the table.
    default_width: u16,
}

impl StandardFontMetrics {
    pub const COURIER: StandardFontMetrics = StandardFontMetrics {
        ascii_widths: None,
        default_width: 600,
    };

    pub const HELVETICA: StandardFontMetrics = StandardFontMetrics {
        ascii_widths: Some(&HELVETICA_WIDTHS),
        default_width: 556,
    };

    pub const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
        ascii_widths: Some(&HELVETICA_BOLD_WIDTHS),
        default_width: 611,
    };

    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match (self.ascii_widths, ch as u32) {
            (Some(table), cp @ 0x20..=0x7E) => table[(cp - 0x20) as usize],
            _ => self.default_width,
        };
        units as f64 / 1000.0 * font_size
    }

    /// Width of a whole string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space .. /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // 0 .. 9
    278, 278, 584, 584, 584, 556, 1015,                                             // : .. @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // A .. M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // N .. Z
    278, 278, 278, 469, 556, 333,                                                   // [ .. `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // a .. m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // n .. z
    334, 260, 334, 584,                                                             // { .. ~
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space .. /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // 0 .. 9
    333, 333, 584, 584, 584, 611, 975,                                              // : .. @
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,                // A .. M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // N .. Z
    333, 278, 333, 584, 556, 333,                                                   // [ .. `
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,                // a .. m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,                // n .. z
    389, 280, 389, 584,                                                             // { .. ~
];
