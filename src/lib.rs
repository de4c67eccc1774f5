//! # Slugline
//!
//! A screenplay document model and page-native renderer.
//!
//! A script is plain text: an optional `---` frontmatter block with title
//! page metadata, then one element per line, typed by a leading sigil:
//!
//! ```text
//! ---
//! title: Night Shift
//! author: Alice, Bob
//! ---
//! # INT. KITCHEN - DAY
//! Jane enters.
//! @JANE
//! "I can't believe this is happening.
//! -CUT TO:
//! ```
//!
//! Parsing turns that into a [`Script`] of numbered scenes. Layout puts the
//! script onto fixed-size pages, one line at a time, with the page bottom
//! as a hard constraint: action and dialogue split across pages at line
//! boundaries, everything else moves whole.
//!
//! ## Architecture
//!
//! ```text
//! Script text
//!       ↓
//!   [frontmatter] : Metadata block codec
//!       ↓
//!   [parser]      : Line classifier + scene builder
//!       ↓
//!   [model]       : Script / Scene / ScriptElement
//!       ↓
//!   [layout]      : Paginating layout engine (uses [text], [font], [locale])
//!       ↓
//!   [render]      : RenderTarget trait
//!       ↓
//!   [pdf]         : PDF 1.7 writer
//! ```
//!
//! Parsing and layout are pure functions of their inputs. A parsed script
//! can be laid out any number of times, with different configs, without
//! being modified.

pub mod config;
pub mod error;
pub mod font;
pub mod frontmatter;
pub mod layout;
pub mod locale;
pub mod model;
pub mod parser;
pub mod pdf;
pub mod render;
pub mod style;
pub mod text;

pub use config::RenderConfig;
pub use error::SluglineError;
pub use font::{FontContext, FontMetrics, FontRole};
pub use layout::{LayoutDocument, LayoutEngine};
pub use locale::Locale;
pub use model::{Scene, Script, ScriptElement, ScriptElementType, ScriptMetadata};
pub use parser::parse;
pub use render::{render_to, RenderTarget};

use pdf::PdfWriter;

/// Lay out a parsed script with the given fonts.
pub fn layout(script: &Script, config: &RenderConfig, metrics: &dyn FontMetrics) -> LayoutDocument {
    LayoutEngine::new(config, metrics).layout(script)
}

/// Render a parsed script to PDF bytes.
///
/// Fonts come from `config.fonts`; without any the script is set in
/// Courier.
pub fn render_pdf(script: &Script, config: &RenderConfig) -> Result<Vec<u8>, SluglineError> {
    let fonts = FontContext::from_config(&config.fonts)?;
    render_pdf_with_fonts(script, config, &fonts)
}

/// Render a parsed script to PDF bytes using an already loaded font
/// context.
pub fn render_pdf_with_fonts(
    script: &Script,
    config: &RenderConfig,
    fonts: &FontContext,
) -> Result<Vec<u8>, SluglineError> {
    let document = layout(script, config, fonts);
    render_to(&document, PdfWriter::new(fonts))
}

/// Parse script text and render it to PDF bytes.
pub fn render_text(text: &str, config: &RenderConfig) -> Result<Vec<u8>, SluglineError> {
    render_pdf(&parse(text), config)
}
