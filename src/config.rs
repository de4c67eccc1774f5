//! # Render Configuration
//!
//! Everything that shapes a render pass: page geometry, type sizes,
//! spacing, scene-number placement, fonts and the locale used for cover
//! captions. All fields have defaults so a config file only needs the
//! values it changes.
//!
//! The locale lives here on purpose: it is threaded through each render
//! call as a value, so two passes with different languages never share
//! state.

use serde::{Deserialize, Serialize};

use crate::error::SluglineError;
use crate::locale::Locale;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub page: PageConfig,
    pub title_font_size: f64,
    pub subtitle_font_size: f64,
    pub font_size: f64,
    /// Vertical advance per rendered line.
    pub line_height: f64,
    /// Gap inserted before every scene.
    pub scene_spacing: f64,
    /// Gap after each body element.
    pub element_spacing: f64,
    /// Width of the centred dialogue column.
    pub dialogue_width: f64,
    /// Distance between a scene number and the text column.
    pub scene_number_gutter: f64,
    pub scene_numbers: SceneNumbers,
    /// Zero-pad scene numbers to the width of the highest number.
    pub pad_scene_numbers: bool,
    pub title_page: bool,
    /// Centre dialogue whose content starts with a second `"`.
    pub center_quoted_dialogue: bool,
    pub min_orphan_lines: usize,
    pub min_widow_lines: usize,
    /// Explicit locale. Detected from the title (then writers) when absent.
    pub locale: Option<Locale>,
    pub fonts: FontConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            title_font_size: 36.0,
            subtitle_font_size: 14.0,
            font_size: 12.0,
            line_height: 18.0,
            scene_spacing: 30.0,
            element_spacing: 6.0,
            dialogue_width: 200.0,
            scene_number_gutter: 10.0,
            scene_numbers: SceneNumbers::Both,
            pad_scene_numbers: true,
            title_page: true,
            center_quoted_dialogue: true,
            min_orphan_lines: 1,
            min_widow_lines: 1,
            locale: None,
            fonts: FontConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SluglineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where scene numbers are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneNumbers {
    /// Only in the margin the reading direction starts from.
    Leading,
    /// In both margins.
    #[default]
    Both,
}

/// Font sources for the two font slots: a file path, raw base64, or a
/// `data:` URI. `None` keeps the built-in faces of `family`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: StandardFamily,
    pub regular: Option<String>,
    pub bold: Option<String>,
}

/// Built-in PDF font family used for slots without a custom font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardFamily {
    #[default]
    Courier,
    Helvetica,
}

/// Configuration for a page: size and margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub size: PageSize,
    /// Uniform page margin in points (1/72 inch).
    pub margin: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::Letter,
            margin: 72.0,
        }
    }
}

impl PageConfig {
    pub fn width(&self) -> f64 {
        self.size.dimensions().0
    }

    pub fn height(&self) -> f64 {
        self.size.dimensions().1
    }

    /// Width of the text column between the side margins.
    pub fn content_width(&self) -> f64 {
        self.width() - 2.0 * self.margin
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_letter_one_inch() {
        let config = RenderConfig::default();
        assert_eq!(config.page.size.dimensions(), (612.0, 792.0));
        assert_eq!(config.page.margin, 72.0);
        assert_eq!(config.page.content_width(), 468.0);
        assert_eq!(config.line_height, 18.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RenderConfig::from_json(
            r#"{ "page": { "size": "A4" }, "locale": "he", "sceneNumbers": "Leading" }"#,
        )
        .unwrap();
        assert_eq!(config.page.size, PageSize::A4);
        assert_eq!(config.page.margin, 72.0);
        assert_eq!(config.locale, Some(Locale::He));
        assert_eq!(config.scene_numbers, SceneNumbers::Leading);
        assert_eq!(config.font_size, 12.0);
    }

    #[test]
    fn test_custom_page_size() {
        let config =
            RenderConfig::from_json(r#"{ "page": { "size": { "Custom": { "width": 300, "height": 400 } }, "margin": 20 } }"#)
                .unwrap();
        assert_eq!(config.page.width(), 300.0);
        assert_eq!(config.page.height(), 400.0);
        assert_eq!(config.page.content_width(), 260.0);
    }

    #[test]
    fn test_font_family_from_json() {
        let config = RenderConfig::from_json(r#"{ "fonts": { "family": "helvetica" } }"#).unwrap();
        assert_eq!(config.fonts.family, StandardFamily::Helvetica);
        assert_eq!(config.fonts.regular, None);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = RenderConfig::from_json(r#"{ "fontSize": "big" }"#).unwrap_err();
        assert!(matches!(err, SluglineError::Config { .. }));
    }
}
