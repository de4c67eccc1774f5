//! # Locale
//!
//! The language a render pass uses for its cover-page captions and date
//! formatting. A [`Locale`] is a plain value carried in the render config;
//! detecting or choosing one never touches shared state.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};
use unicode_script::{Script, UnicodeScript};

/// Languages with cover-page captions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    He,
    Es,
    Fr,
    De,
}

impl Locale {
    /// Guess the locale from a piece of text. Any Hebrew letter wins,
    /// everything else is English.
    pub fn detect(text: &str) -> Locale {
        if text.chars().any(|ch| ch.script() == Script::Hebrew) {
            Locale::He
        } else {
            Locale::En
        }
    }

    /// Parse a language code or tag such as `he`, `es-ES` or `fr_FR`.
    /// Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Locale {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Locale::En,
            "he" | "iw" => Locale::He,
            "es" => Locale::Es,
            "fr" => Locale::Fr,
            "de" => Locale::De,
            _ => {
                warn!("Unknown locale '{}', using English", tag);
                Locale::En
            }
        }
    }

    /// Full BCP 47 tag, as written to the PDF `/Lang` entry.
    pub fn bcp47(self) -> &'static str {
        match self {
            Locale::En => "en-US",
            Locale::He => "he-IL",
            Locale::Es => "es-ES",
            Locale::Fr => "fr-FR",
            Locale::De => "de-DE",
        }
    }

    /// Translate a caption key. Missing keys fall back to English, then to
    /// the key itself.
    pub fn t(self, key: &str) -> String {
        if let Some(s) = lookup(self, key) {
            return s.to_string();
        }
        if self != Locale::En {
            if let Some(s) = lookup(Locale::En, key) {
                warn!("Missing '{}' translation for {}, using English", key, self);
                return s.to_string();
            }
        }
        warn!("Unknown translation key '{}'", key);
        key.to_string()
    }

    /// Format a metadata date for the cover page.
    ///
    /// ISO dates (`2024-03-05`, optionally with a time part) are written in
    /// the locale's numeric style. Anything else is returned as written.
    pub fn format_date(self, raw: &str) -> String {
        let raw = raw.trim();
        let Some(date) = parse_date(raw) else {
            warn!("Could not parse date '{}', showing it verbatim", raw);
            return raw.to_string();
        };
        let (d, m, y) = (date.day(), date.month(), date.year());
        match self {
            Locale::En => format!("{}/{}/{}", m, d, y),
            Locale::He | Locale::De => format!("{}.{}.{}", d, m, y),
            Locale::Es | Locale::Fr => format!("{}/{}/{}", d, m, y),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bcp47())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    let s = match (locale, key) {
        (Locale::En, "pdf.writtenBy") => "written by",
        (Locale::En, "pdf.producedBy") => "produced by",
        (Locale::En, "pdf.date") => "date",
        (Locale::En, "pdf.untitled") => "Untitled Script",
        (Locale::En, "pdf.unknownWriter") => "Unknown Writer",

        (Locale::He, "pdf.writtenBy") => "נכתב על ידי",
        (Locale::He, "pdf.producedBy") => "הופק על ידי",
        (Locale::He, "pdf.date") => "תאריך",

        (Locale::Es, "pdf.writtenBy") => "escrito por",
        (Locale::Es, "pdf.producedBy") => "producido por",
        (Locale::Es, "pdf.date") => "fecha",

        _ => return None,
    };
    Some(s)
}
