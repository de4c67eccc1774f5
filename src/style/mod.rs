//! # Style Primitives
//!
//! The small set of visual values shared by the layout engine and the
//! render targets: colors, horizontal alignment and reading direction.

use serde::{Deserialize, Serialize};

/// Reading direction of a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        matches!(self, Direction::Rtl)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

/// An RGB fill color, each channel 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// The grey used for cover-page credit values.
    pub const CREDIT_GREY: Color = Color {
        r: 0.2,
        g: 0.2,
        b: 0.2,
    };
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}
