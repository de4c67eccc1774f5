//! Font source loading.
//!
//! A font can be given as a file path, a `data:font/...;base64,` URI or raw
//! base64 text. This lets a JSON render config carry its fonts inline.

use std::path::Path;

use base64::Engine;

use crate::error::SluglineError;

/// Resolve a font source string to the raw font bytes.
pub fn load_font_source(src: &str) -> Result<Vec<u8>, SluglineError> {
    // Data URI: data:font/ttf;base64,AAEAAA...
    if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| SluglineError::Font("Invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit paths or files that exist are read from disk, so base64
    // text (which may contain '/') is not mistaken for a path.
    let looks_like_path = src.starts_with('/') || src.starts_with("./") || src.starts_with("../");
    if looks_like_path || Path::new(src).is_file() {
        return std::fs::read(src).map_err(|e| {
            SluglineError::Font(format!("Failed to read font file '{}': {}", src, e))
        });
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, SluglineError> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| SluglineError::Font(format!("Base64 decode error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let bytes = load_font_source("data:font/ttf;base64,AAEAAA==").unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_raw_base64() {
        assert_eq!(load_font_source("AAEAAA==").unwrap(), vec![0, 1, 0, 0]);
    }

    #[test]
    fn test_data_uri_without_comma() {
        assert!(matches!(
            load_font_source("data:font/ttf;base64"),
            Err(SluglineError::Font(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_font_source("./definitely/not/here.ttf").unwrap_err();
        assert!(err.to_string().contains("not/here.ttf"));
    }
}
