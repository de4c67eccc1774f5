//! # Page Break Decisions
//!
//! Where an element's wrapped lines go once the page bottom is in sight.
//!
//! Screenplay elements come in two kinds. Short forms (cues, transitions,
//! sub-headers, scene heading blocks) are never split: they either fit or
//! move whole to the next page. Action and dialogue split at a line
//! boundary, optionally held to widow/orphan minimums.
//!
//! On a page that has nothing on it yet, moving cannot help. There a short
//! form is placed whole, and a long form places at least one line, so
//! pagination always makes progress.

use crate::config::RenderConfig;

/// What to do with an element's wrapped lines at the current cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Put every line on this page.
    Whole,
    /// Put the first `here` lines on this page, continue on the next.
    Split { here: usize },
    /// Start a new page before placing anything.
    NextPage,
}

/// Widow/orphan minimums for split elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakRules {
    /// Fewest lines of a split element left at the bottom of a page.
    pub min_orphan_lines: usize,
    /// Fewest lines of a split element carried to the top of the next.
    pub min_widow_lines: usize,
}

impl BreakRules {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            min_orphan_lines: config.min_orphan_lines,
            min_widow_lines: config.min_widow_lines,
        }
    }
}

/// Number of whole lines that fit into `room` points.
pub fn lines_in(room: f64, line_height: f64) -> usize {
    if line_height <= 0.0 {
        return usize::MAX;
    }
    (room.max(0.0) / line_height).floor() as usize
}

/// Decide where `line_count` wrapped lines go when `room` lines are left
/// on the page.
pub fn place_lines(
    line_count: usize,
    room: usize,
    splittable: bool,
    fresh_page: bool,
    rules: BreakRules,
) -> Placement {
    if line_count <= room {
        return Placement::Whole;
    }
    if !splittable {
        return if fresh_page {
            Placement::Whole
        } else {
            Placement::NextPage
        };
    }

    // Hold back lines so the next page does not open on a lone widow.
    let carried = line_count - room;
    let here = if carried < rules.min_widow_lines {
        room.saturating_sub(rules.min_widow_lines - carried)
    } else {
        room
    };

    if here >= rules.min_orphan_lines.max(1) {
        return Placement::Split { here };
    }
    if !fresh_page {
        return Placement::NextPage;
    }
    match room.max(1) {
        n if n >= line_count => Placement::Whole,
        n => Placement::Split { here: n },
    }
}
