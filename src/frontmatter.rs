//! # Frontmatter Codec
//!
//! Reads and writes the metadata block that sits in front of a script body:
//!
//! ```text
//! ---
//! title: The Long Night
//! author: Jane Doe, John Roe
//! date: 2025-03-14
//! ---
//! # INT. KITCHEN - DAY
//! ...
//! ```
//!
//! Decoding never fails. A document without a well-formed block at the very
//! start decodes to default metadata and the whole input as body. Keys are
//! case-insensitive and unknown keys are skipped, so files written by newer
//! versions still load.

use crate::model::ScriptMetadata;

const DELIMITER: &str = "---";

/// Characters that force a value to be written in double quotes.
const QUOTE_TRIGGERS: [char; 9] = [':', '#', '[', ']', '{', '}', '|', '\n', '\r'];

/// Split a full document into its metadata and body.
///
/// The body is returned exactly as it appears after the closing delimiter
/// line, whitespace included.
pub fn decode(text: &str) -> (ScriptMetadata, &str) {
    match split_block(text) {
        Some((block, body)) => (parse_block(block), body),
        None => (ScriptMetadata::default(), text),
    }
}

/// Serialize metadata into a frontmatter block, terminated by a newline.
///
/// Only non-empty fields are written, in a fixed order. Metadata with no
/// fields at all encodes to an empty string (no delimiters).
pub fn encode(metadata: &ScriptMetadata) -> String {
    let fields = [
        ("title", &metadata.title),
        ("subtitle", &metadata.subtitle),
        ("author", &metadata.writers),
        ("prod_company", &metadata.prod_company),
        ("date", &metadata.date),
        ("characterFolder", &metadata.character_folder),
    ];

    let lines: Vec<String> = fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}: {}", key, encode_value(value)))
        .collect();

    if lines.is_empty() {
        return String::new();
    }

    format!("{DELIMITER}\n{}\n{DELIMITER}\n", lines.join("\n"))
}

/// File name for a new script: path-hostile characters become `-`.
pub fn script_file_name(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            other => other,
        })
        .collect();
    format!("{safe}.script")
}

/// Initial contents of a freshly created script file.
pub fn new_script_text(metadata: &ScriptMetadata) -> String {
    encode(metadata)
}

/// Locate the delimited block. Returns (inner block, body).
fn split_block(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let bare = line.trim_end_matches('\n').trim_end_matches('\r');
        if bare == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_block(block: &str) -> ScriptMetadata {
    let mut metadata = ScriptMetadata::default();

    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = decode_value(value.trim());
        match key.trim().to_lowercase().as_str() {
            "title" => metadata.title = value,
            "subtitle" => metadata.subtitle = value,
            "author" => metadata.writers = value,
            "prod_company" => metadata.prod_company = value,
            "date" => metadata.date = value,
            "characterfolder" => metadata.character_folder = value,
            _ => {}
        }
    }

    metadata
}

fn decode_value(raw: &str) -> String {
    if raw.len() >= 2 {
        if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            return unescape(inner);
        }
        if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
            return inner.to_string();
        }
    }
    raw.to_string()
}

fn encode_value(value: &str) -> String {
    let needs_quotes = value.contains(QUOTE_TRIGGERS)
        || value.trim() != value
        || value.starts_with(['"', '\''])
        || value.ends_with(['"', '\'']);

    if needs_quotes {
        format!("\"{}\"", escape(value))
    } else {
        value.to_string()
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
