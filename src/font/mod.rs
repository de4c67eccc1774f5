//! # Font Management
//!
//! The layout engine only needs one thing from a font: how wide a string is
//! at a given size. That capability is the [`FontMetrics`] trait. The
//! shipped implementation, [`FontContext`], holds the two fonts a script is
//! set in (regular and bold) and answers from either a standard PDF font
//! width table or the metrics of an embedded TrueType font.
//!
//! With no custom fonts registered the context uses Courier and
//! Courier-Bold, the traditional screenplay face.

pub mod metrics;
pub mod source;

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{FontConfig, StandardFamily};
use crate::error::SluglineError;
pub use metrics::StandardFontMetrics;
pub use source::load_font_source;

/// The two font slots a script is typeset with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontRole {
    Regular,
    Bold,
}

/// Text measurement, the only font capability layout depends on.
///
/// Implementations must be side-effect free so one provider can be shared
/// between render passes.
pub trait FontMetrics {
    /// Width of `text` in points when set in `font` at `size`.
    fn width_of_text_at_size(&self, text: &str, font: FontRole, size: f64) -> f64;
}

/// Standard PDF fonts usable without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Courier,
    CourierBold,
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Courier | Self::CourierBold => StandardFontMetrics::COURIER,
            Self::Helvetica => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold => StandardFontMetrics::HELVETICA_BOLD,
        }
    }
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self, SluglineError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| SluglineError::Font(format!("Failed to parse font data: {}", e)))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font that is embedded in the output.
    Custom {
        /// Name used for the PDF font objects.
        name: String,
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

impl FontData {
    /// Parse a TrueType/OpenType font.
    pub fn custom(name: &str, data: Vec<u8>) -> Result<Self, SluglineError> {
        let metrics = CustomFontMetrics::from_font_data(&data)?;
        Ok(FontData::Custom {
            name: name.to_string(),
            data,
            metrics,
        })
    }

    fn measure(&self, text: &str, size: f64) -> f64 {
        match self {
            FontData::Standard(font) => font.metrics().measure_string(text, size),
            FontData::Custom { metrics, .. } => {
                text.chars().map(|ch| metrics.char_width(ch, size)).sum()
            }
        }
    }
}

/// The regular and bold fonts of a render pass.
#[derive(Debug, Clone)]
pub struct FontContext {
    regular: FontData,
    bold: FontData,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// Courier / Courier-Bold.
    pub fn new() -> Self {
        Self {
            regular: FontData::Standard(StandardFont::Courier),
            bold: FontData::Standard(StandardFont::CourierBold),
        }
    }

    /// Helvetica / Helvetica-Bold.
    pub fn helvetica() -> Self {
        Self {
            regular: FontData::Standard(StandardFont::Helvetica),
            bold: FontData::Standard(StandardFont::HelveticaBold),
        }
    }

    /// Build a context from configured font sources. Slots without a source
    /// keep the standard faces of the configured family.
    pub fn from_config(config: &FontConfig) -> Result<Self, SluglineError> {
        let mut ctx = match config.family {
            StandardFamily::Courier => Self::new(),
            StandardFamily::Helvetica => Self::helvetica(),
        };
        if let Some(src) = &config.regular {
            ctx.register(FontRole::Regular, load_font_source(src)?)?;
        }
        if let Some(src) = &config.bold {
            ctx.register(FontRole::Bold, load_font_source(src)?)?;
        }
        Ok(ctx)
    }

    /// Register a TrueType/OpenType font for a slot.
    pub fn register(&mut self, role: FontRole, data: Vec<u8>) -> Result<(), SluglineError> {
        let name = match role {
            FontRole::Regular => "ScriptRegular",
            FontRole::Bold => "ScriptBold",
        };
        let font = FontData::custom(name, data)?;
        debug!("registered custom font for {:?}", role);
        match role {
            FontRole::Regular => self.regular = font,
            FontRole::Bold => self.bold = font,
        }
        Ok(())
    }

    /// Resolve a slot to its font data.
    pub fn resolve(&self, role: FontRole) -> &FontData {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => &self.bold,
        }
    }
}

impl FontMetrics for FontContext {
    fn width_of_text_at_size(&self, text: &str, font: FontRole, size: f64) -> f64 {
        self.resolve(font).measure(text, size)
    }
}
