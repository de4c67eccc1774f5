//! # PDF Serializer
//!
//! A [`RenderTarget`] that writes laid-out pages as a PDF 1.7 file.
//!
//! This is a from-scratch writer. The subset of PDF a screenplay needs is
//! small: text in two fonts, a page tree, an outline and document info.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Font Embedding
//!
//! Standard fonts (Courier, Helvetica) are plain Type1 references with
//! WinAnsi encoding. Custom TrueType fonts are embedded whole as
//! CIDFontType2 with Identity-H encoding, producing 5 PDF objects per
//! font: FontFile2, FontDescriptor, CIDFont, ToUnicode CMap, and the root
//! Type0 dictionary.
//!
//! ## Right-to-left text
//!
//! PDF text operators draw glyphs left to right. Runs flagged RTL are
//! written in reversed character order, which is why the layout engine
//! pre-reverses digit runs and mirrors brackets in RTL text.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use log::debug;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::SluglineError;
use crate::font::{FontContext, FontData, FontRole};
use crate::layout::{Bookmark, DocumentInfo, TextRun};
use crate::render::RenderTarget;

/// Outline destinations land this far above the heading baseline.
const OUTLINE_TOP_OFFSET: f64 = 18.0;

/// Collects pages from a render pass and serializes them on `finish`.
pub struct PdfWriter<'a> {
    fonts: &'a FontContext,
    pages: Vec<PendingPage>,
}

struct PendingPage {
    width: f64,
    height: f64,
    runs: Vec<TextRun>,
}

/// Embedding data for a custom TrueType font.
struct CustomFontEmbedData {
    /// Maps characters to glyph IDs in the embedded font.
    char_to_gid: HashMap<char, u16>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font role -> Type0/Type1 object id, in resource order (/F0, /F1).
    font_objects: Vec<(FontRole, usize)>,
    custom_font_data: HashMap<FontRole, CustomFontEmbedData>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
            font_objects: Vec::new(),
            custom_font_data: HashMap::new(),
        }
    }

    /// Append an object and return its id.
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, content: &[u8]) -> usize {
        let compressed = compress_to_vec_zlib(content, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, role: FontRole) -> usize {
        self.font_objects
            .iter()
            .position(|(r, _)| *r == role)
            .unwrap_or(0)
    }
}

impl<'a> PdfWriter<'a> {
    pub fn new(fonts: &'a FontContext) -> Self {
        Self {
            fonts,
            pages: Vec::new(),
        }
    }

    /// Serialize the collected pages.
    fn write(&self, bookmarks: &[Bookmark], info: &DocumentInfo) -> Result<Vec<u8>, SluglineError> {
        let mut builder = PdfBuilder::new();

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then content streams and pages, outlines, info
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        self.register_fonts(&mut builder)?;

        let font_resources = Self::build_font_resource_dict(&builder.font_objects);
        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in &self.pages {
            let content = Self::build_content_stream(&page.runs, &builder);
            let content_obj_id = builder.push_stream(content.as_bytes());
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width, page.height, content_obj_id, font_resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        let outlines_id = Self::write_outlines(&mut builder, bookmarks, &page_obj_ids);

        let mut catalog = String::from("<< /Type /Catalog /Pages 2 0 R");
        if let Some(id) = outlines_id {
            let _ = write!(catalog, " /Outlines {} 0 R /PageMode /UseOutlines", id);
        }
        let _ = write!(catalog, " /Lang ({}) >>", info.locale.bcp47());
        builder.objects[1].data = catalog.into_bytes();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info_dict = String::from("<< ");
        for (key, value) in [
            ("Title", &info.title),
            ("Author", &info.author),
            ("Subject", &info.subject),
        ] {
            if !value.is_empty() {
                let _ = write!(info_dict, "/{} {} ", key, Self::text_string(value));
            }
        }
        info_dict.push_str("/Producer (Slugline) /Creator (Slugline) >>");
        let info_obj_id = builder.push(info_dict.into_bytes());

        debug!(
            "pdf: {} pages, {} objects, {} outline entries",
            page_obj_ids.len(),
            builder.objects.len(),
            bookmarks.len()
        );
        Ok(Self::serialize(&builder, info_obj_id))
    }

    /// Register the font slots actually drawn with.
    fn register_fonts(&self, builder: &mut PdfBuilder) -> Result<(), SluglineError> {
        let mut font_chars: BTreeMap<FontRole, BTreeSet<char>> = BTreeMap::new();
        for run in self.pages.iter().flat_map(|p| p.runs.iter()) {
            font_chars.entry(run.font).or_default().extend(run.text.chars());
        }
        // A page tree with no text still needs one font resource.
        if font_chars.is_empty() {
            font_chars.insert(FontRole::Regular, BTreeSet::new());
        }

        for (role, used_chars) in &font_chars {
            match self.fonts.resolve(*role) {
                FontData::Standard(std_font) => {
                    let font_dict = format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        std_font.pdf_name()
                    );
                    let obj_id = builder.push(font_dict.into_bytes());
                    builder.font_objects.push((*role, obj_id));
                }
                FontData::Custom { name, data, .. } => {
                    let type0_obj_id =
                        Self::write_custom_font_objects(builder, *role, name, data, used_chars)?;
                    builder.font_objects.push((*role, type0_obj_id));
                }
            }
        }
        Ok(())
    }

    fn write_custom_font_objects(
        builder: &mut PdfBuilder,
        role: FontRole,
        name: &str,
        ttf_data: &[u8],
        used_chars: &BTreeSet<char>,
    ) -> Result<usize, SluglineError> {
        let face = ttf_parser::Face::parse(ttf_data, 0).map_err(|e| {
            SluglineError::Font(format!("Failed to parse TTF data for font '{}': {}", name, e))
        })?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();

        let char_to_gid: HashMap<char, u16> = used_chars
            .iter()
            .filter_map(|&ch| face.glyph_index(ch).map(|gid| (ch, gid.0)))
            .collect();

        let pdf_font_name = Self::sanitize_font_name(name);

        // 1. FontFile2 stream: the whole TTF, compressed
        let compressed_ttf = compress_to_vec_zlib(ttf_data, 6);
        let mut fontfile2_data: Vec<u8> = Vec::new();
        let _ = write!(
            fontfile2_data,
            "<< /Length {} /Length1 {} /Filter /FlateDecode >>\nstream\n",
            compressed_ttf.len(),
            ttf_data.len()
        );
        fontfile2_data.extend_from_slice(&compressed_ttf);
        fontfile2_data.extend_from_slice(b"\nendstream");
        let fontfile2_id = builder.push(fontfile2_data);

        // 2. FontDescriptor
        let bbox = face.global_bounding_box();
        let scale = 1000.0 / units_per_em as f64;
        let bbox_str = format!(
            "[{} {} {} {}]",
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
        );
        let cap_height = face.capital_height().unwrap_or(ascender) as f64 * scale;
        let stem_v = match role {
            FontRole::Bold => 120,
            FontRole::Regular => 80,
        };
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox {} /ItalicAngle 0 \
             /Ascent {} /Descent {} /CapHeight {} /StemV {} \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            bbox_str,
            (ascender as f64 * scale) as i32,
            (descender as f64 * scale) as i32,
            cap_height as i32,
            stem_v,
            fontfile2_id,
        );
        let font_descriptor_id = builder.push(font_descriptor_dict.into_bytes());

        // 3. CIDFont dictionary (DescendantFont)
        let w_array = Self::build_w_array(&char_to_gid, &face, units_per_em);
        let default_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| (adv as f64 * scale) as u32)
            .unwrap_or(1000);
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name, font_descriptor_id, default_width, w_array,
        );
        let cidfont_id = builder.push(cidfont_dict.into_bytes());

        // 4. ToUnicode CMap
        let cmap_content = Self::build_tounicode_cmap(&char_to_gid, &pdf_font_name);
        let tounicode_id = builder.push_stream(cmap_content.as_bytes());

        // 5. Type0 font dictionary (the root, referenced by /Resources)
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        let type0_id = builder.push(type0_dict.into_bytes());

        debug!(
            "pdf: embedded {} ({} glyphs used) for {:?}",
            pdf_font_name,
            char_to_gid.len(),
            role
        );
        builder
            .custom_font_data
            .insert(role, CustomFontEmbedData { char_to_gid });
        Ok(type0_id)
    }

    /// Build the /W array for per-glyph widths in CIDFont.
    /// Format: [gid [width] gid [width] ...]
    fn build_w_array(
        char_to_gid: &HashMap<char, u16>,
        face: &ttf_parser::Face,
        units_per_em: u16,
    ) -> String {
        let scale = 1000.0 / units_per_em as f64;
        let gids: BTreeSet<u16> = char_to_gid.values().copied().collect();

        let mut result = String::from("[");
        for gid in gids {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            let _ = write!(result, " {} [{}]", gid, (advance as f64 * scale) as u32);
        }
        result.push_str(" ]");
        result
    }

    /// Build a ToUnicode CMap for text extraction/copy-paste support.
    fn build_tounicode_cmap(char_to_gid: &HashMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, char)> =
            char_to_gid.iter().map(|(&ch, &gid)| (gid, ch)).collect();
        gid_to_unicode.sort();

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo\n");
        cmap.push_str("<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        // At most 100 entries per beginbfchar block
        for chunk in gid_to_unicode.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for &(gid, ch) in chunk {
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, Self::utf16_hex(&ch.to_string()));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");
        cmap
    }

    /// Build the content stream for one page.
    fn build_content_stream(runs: &[TextRun], builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        for run in runs {
            let text: String = if run.rtl {
                run.text.chars().rev().collect()
            } else {
                run.text.clone()
            };
            let idx = builder.font_index(run.font);
            let _ = write!(
                stream,
                "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n",
                run.color.r, run.color.g, run.color.b, idx, run.size, run.x, run.y
            );

            match builder.custom_font_data.get(&run.font) {
                Some(embed) => {
                    let mut hex = String::new();
                    for ch in text.chars() {
                        let gid = embed.char_to_gid.get(&ch).copied().unwrap_or(0);
                        let _ = write!(hex, "{:04X}", gid);
                    }
                    let _ = writeln!(stream, "<{}> Tj", hex);
                }
                None => {
                    let _ = writeln!(stream, "({}) Tj", Self::encode_winansi(&text));
                }
            }
            stream.push_str("ET\n");
        }
        stream
    }

    /// Outline tree: one root and one flat item per bookmark.
    fn write_outlines(
        builder: &mut PdfBuilder,
        bookmarks: &[Bookmark],
        page_obj_ids: &[usize],
    ) -> Option<usize> {
        let entries: Vec<(&Bookmark, usize)> = bookmarks
            .iter()
            .filter_map(|b| page_obj_ids.get(b.page_index).map(|&page| (b, page)))
            .collect();
        if entries.is_empty() {
            return None;
        }

        let root_id = builder.push(vec![]);
        let first_id = builder.objects.len();
        let last_id = first_id + entries.len() - 1;
        for (i, (bookmark, page_obj)) in entries.iter().enumerate() {
            let id = first_id + i;
            let mut item = format!(
                "<< /Title {} /Parent {} 0 R /Dest [{} 0 R /XYZ 0 {:.2} 0]",
                Self::text_string(&bookmark.title),
                root_id,
                page_obj,
                bookmark.y + OUTLINE_TOP_OFFSET
            );
            if id > first_id {
                let _ = write!(item, " /Prev {} 0 R", id - 1);
            }
            if id < last_id {
                let _ = write!(item, " /Next {} 0 R", id + 1);
            }
            item.push_str(" >>");
            builder.push(item.into_bytes());
        }
        builder.objects[root_id].data = format!(
            "<< /Type /Outlines /First {} 0 R /Last {} 0 R /Count {} >>",
            first_id,
            last_id,
            entries.len()
        )
        .into_bytes();
        Some(root_id)
    }

    /// Sanitize a font name for use as a PDF name object.
    fn sanitize_font_name(name: &str) -> String {
        let name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if name.is_empty() {
            "CustomFont".to_string()
        } else {
            name
        }
    }

    fn build_font_resource_dict(font_objects: &[(FontRole, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// A PDF text string: a literal for printable ASCII, UTF-16BE hex with
    /// a byte-order mark otherwise.
    fn text_string(s: &str) -> String {
        if s.chars().all(|c| (' '..='~').contains(&c)) {
            format!("({})", Self::escape_pdf_string(s))
        } else {
            format!("<FEFF{}>", Self::utf16_hex(s))
        }
    }

    fn utf16_hex(s: &str) -> String {
        s.encode_utf16().fold(String::new(), |mut out, unit| {
            let _ = write!(out, "{:04X}", unit);
            out
        })
    }

    /// Encode text for a WinAnsi string literal. Characters outside the
    /// encoding become `?`.
    fn encode_winansi(text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    // Octal escape for bytes outside ASCII printable range
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// holds smart quotes, dashes and a few letters.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output
    }
}

impl RenderTarget for PdfWriter<'_> {
    type Output = Vec<u8>;

    fn add_page(&mut self, width: f64, height: f64) -> Result<(), SluglineError> {
        self.pages.push(PendingPage {
            width,
            height,
            runs: Vec::new(),
        });
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), SluglineError> {
        let page = self.pages.last_mut().ok_or_else(|| {
            SluglineError::Render("draw_text called before any page was added".to_string())
        })?;
        page.runs.push(run.clone());
        Ok(())
    }

    fn finish(self, bookmarks: &[Bookmark], info: &DocumentInfo) -> Result<Vec<u8>, SluglineError> {
        if self.pages.is_empty() {
            return Err(SluglineError::Render("document has no pages".to_string()));
        }
        self.write(bookmarks, info)
    }
}
