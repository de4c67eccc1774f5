//! Structured error types for slugline.
//!
//! Parsing and layout are total and never fail. Errors only come from the
//! edges: loading a render config, loading fonts, a render target refusing
//! a command, and file I/O.

use thiserror::Error;

/// The unified error type returned by all fallible slugline functions.
#[derive(Debug, Error)]
pub enum SluglineError {
    /// A render config failed to parse.
    #[error("Failed to parse config: {source}{}", hint_suffix(.hint))]
    Config {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// A font could not be loaded, decoded, or parsed.
    #[error("Font error: {0}")]
    Font(String),
    /// A render target rejected a draw command.
    #[error("Render error: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for SluglineError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the render config schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        SluglineError::Config { source: e, hint }
    }
}
