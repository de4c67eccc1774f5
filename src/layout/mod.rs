//! # Paginating Layout Engine
//!
//! Projects a parsed [`Script`] onto fixed-size pages.
//!
//! The engine never builds a tall canvas that gets sliced afterwards. It
//! keeps a vertical cursor on the current page and, before placing each
//! element, asks whether it fits:
//!
//! 1. Open a page. The cursor starts at `height - margin` and moves down.
//! 2. Wrap the element's text to its column.
//! 3. If every line fits above the bottom margin, place them.
//! 4. If it does not fit and the element is a short form (character cue,
//!    transition, sub-header, scene heading), start a new page and place
//!    the whole element there.
//! 5. If it does not fit and the element is action or dialogue, place the
//!    lines that fit, then re-wrap the remainder on a new page. Repeat
//!    until nothing is left.
//!
//! Coordinates are PDF user space: origin at the bottom-left, y up. Every
//! run's `y` is a text baseline.
//!
//! The script is only ever borrowed. Split remainders are local strings,
//! so one parsed script can feed any number of render passes.

pub mod page_break;

use log::debug;
use serde::Serialize;

use crate::config::{RenderConfig, SceneNumbers};
use crate::font::{FontMetrics, FontRole};
use crate::locale::Locale;
use crate::model::{Scene, Script, ScriptElement, ScriptElementType};
use crate::style::{Color, Direction, TextAlign};
use crate::text::bidi::{self, alignment_for, shape_for_display};
use crate::text::{scene_number_label, wrap_text};
use page_break::{lines_in, place_lines, BreakRules, Placement};

/// Line advance on the cover, as a multiple of the font size.
const COVER_LEADING: f64 = 1.2;

/// One positioned piece of text.
///
/// `text` is in logical order, already passed through the RTL display
/// fixes when `rtl` is set. Render targets that draw glyphs left to right
/// reverse RTL runs themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: FontRole,
    pub size: f64,
    pub color: Color,
    pub align: TextAlign,
    pub rtl: bool,
}

/// A fully laid-out page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub runs: Vec<TextRun>,
}

/// A bookmark entry collected during layout, one per numbered scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub title: String,
    pub page_index: usize,
    /// Baseline of the heading on its page.
    pub y: f64,
}

/// Document-level properties a render target may record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub locale: Locale,
}

/// The result of a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub pages: Vec<LayoutPage>,
    pub bookmarks: Vec<Bookmark>,
    pub info: DocumentInfo,
}

/// Resolve the locale for a script: the configured one, else detected
/// from the title, else from the writers.
pub fn resolve_locale(script: &Script, config: &RenderConfig) -> Locale {
    if let Some(locale) = config.locale {
        return locale;
    }
    let meta = &script.metadata;
    let source = if meta.title.is_empty() {
        &meta.writers
    } else {
        &meta.title
    };
    Locale::detect(source)
}

/// The main layout engine.
pub struct LayoutEngine<'a> {
    config: &'a RenderConfig,
    metrics: &'a dyn FontMetrics,
}

/// Tracks where we are on the current page during layout.
#[derive(Debug, Clone)]
struct PageCursor {
    width: f64,
    height: f64,
    margin: f64,
    y: f64,
    runs: Vec<TextRun>,
}

impl PageCursor {
    fn new(config: &RenderConfig) -> Self {
        let height = config.page.height();
        let margin = config.page.margin;
        Self {
            width: config.page.width(),
            height,
            margin,
            y: height - margin,
            runs: Vec::new(),
        }
    }

    /// Vertical room left above the bottom margin.
    fn remaining_height(&self) -> f64 {
        (self.y - self.margin).max(0.0)
    }

    /// True while nothing has been placed on this page.
    fn is_fresh(&self) -> bool {
        self.runs.is_empty()
    }

    fn finalize(self) -> LayoutPage {
        LayoutPage {
            width: self.width,
            height: self.height,
            runs: self.runs,
        }
    }
}

/// Horizontal band a line is aligned within.
#[derive(Debug, Clone, Copy)]
struct Column {
    x: f64,
    width: f64,
}

#[derive(Debug, Clone, Copy)]
struct RunStyle {
    font: FontRole,
    size: f64,
    color: Color,
}

impl RunStyle {
    fn new(font: FontRole, size: f64, color: Color) -> Self {
        Self { font, size, color }
    }
}

/// Mutable state of one layout pass.
struct LayoutState {
    pages: Vec<LayoutPage>,
    cursor: PageCursor,
    bookmarks: Vec<Bookmark>,
}

impl LayoutState {
    fn page_index(&self) -> usize {
        self.pages.len()
    }

    fn new_page(&mut self, config: &RenderConfig) {
        let finished = std::mem::replace(&mut self.cursor, PageCursor::new(config));
        self.pages.push(finished.finalize());
    }

    /// Start a new page when the cursor has run into the bottom margin.
    fn check_page_break(&mut self, config: &RenderConfig) -> bool {
        if self.cursor.y < self.cursor.margin {
            debug!("page break: cursor below margin on page {}", self.page_index());
            self.new_page(config);
            true
        } else {
            false
        }
    }
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a RenderConfig, metrics: &'a dyn FontMetrics) -> Self {
        Self { config, metrics }
    }

    /// Main entry point: lay out a script into pages.
    pub fn layout(&self, script: &Script) -> LayoutDocument {
        let locale = resolve_locale(script, self.config);
        let mut state = LayoutState {
            pages: Vec::new(),
            cursor: PageCursor::new(self.config),
            bookmarks: Vec::new(),
        };

        if self.config.title_page {
            self.layout_cover(script, locale, &mut state);
            state.new_page(self.config);
        }

        let numbered = script.numbered_scene_count();
        for scene in &script.scenes {
            self.layout_scene(scene, numbered, &mut state);
        }

        state.pages.push(state.cursor.finalize());
        debug!(
            "layout finished: {} pages, {} bookmarks",
            state.pages.len(),
            state.bookmarks.len()
        );

        let meta = &script.metadata;
        LayoutDocument {
            pages: state.pages,
            bookmarks: state.bookmarks,
            info: DocumentInfo {
                title: meta.title.clone(),
                author: meta.writers.clone(),
                subject: meta.subtitle.clone(),
                locale,
            },
        }
    }

    // ── Cover page ──────────────────────────────────────────────────

    fn layout_cover(&self, script: &Script, locale: Locale, state: &mut LayoutState) {
        let meta = &script.metadata;
        let cfg = self.config;
        let caption = RunStyle::new(FontRole::Regular, cfg.subtitle_font_size, Color::BLACK);
        let value = RunStyle::new(
            FontRole::Regular,
            cfg.subtitle_font_size * 0.8,
            Color::CREDIT_GREY,
        );
        let block_gap = 50.0;
        let credit_step = 15.0;

        state.cursor.y = state.cursor.height / 2.0 + block_gap;

        let title = if meta.title.trim().is_empty() {
            locale.t("pdf.untitled")
        } else {
            meta.title.clone()
        };
        let title_style = RunStyle::new(FontRole::Bold, cfg.title_font_size, Color::BLACK);
        self.cover_lines(state, 0.0, &title, title_style);

        if !meta.subtitle.trim().is_empty() {
            let style = RunStyle::new(
                FontRole::Regular,
                cfg.title_font_size * 0.5,
                Color::CREDIT_GREY,
            );
            self.cover_lines(state, block_gap / 2.0, &meta.subtitle, style);
        }

        let mut writers: Vec<String> = meta
            .writers
            .split(',')
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if writers.is_empty() {
            writers.push(locale.t("pdf.unknownWriter"));
        }
        self.cover_lines(state, block_gap, &locale.t("pdf.writtenBy"), caption);
        for writer in &writers {
            self.cover_lines(state, credit_step, writer, value);
        }

        // Ten points per writer below the caption, but never onto the list.
        let mut drop =
            (block_gap - (credit_step - 10.0) * writers.len() as f64).max(block_gap - credit_step);
        let credits = [
            ("pdf.producedBy", meta.prod_company.trim().to_string()),
            ("pdf.date", self.cover_date(&meta.date, locale)),
        ];
        for (key, text) in credits {
            if text.is_empty() {
                continue;
            }
            self.cover_lines(state, drop, &locale.t(key), caption);
            self.cover_lines(state, credit_step, &text, value);
            drop = block_gap - credit_step;
        }
    }

    fn cover_date(&self, raw: &str, locale: Locale) -> String {
        if raw.trim().is_empty() {
            String::new()
        } else {
            locale.format_date(raw)
        }
    }

    /// Centred cover text wrapped to the text column. `drop` is the distance
    /// from the previous baseline. Lines that would pass the bottom margin
    /// continue at the top of a new page.
    fn cover_lines(&self, state: &mut LayoutState, drop: f64, text: &str, style: RunStyle) {
        let direction = bidi::direction(text);
        let shaped = shape_for_display(text);
        let column = self.text_column();
        let lines = wrap_text(self.metrics, &shaped, style.font, style.size, column.width);
        for (i, line) in lines.iter().enumerate() {
            state.cursor.y -= if i == 0 { drop } else { style.size * COVER_LEADING };
            if state.cursor.y < state.cursor.margin {
                debug!("page break: cover continues after page {}", state.page_index());
                state.new_page(self.config);
            }
            let run =
                self.make_run(line, column, TextAlign::Center, state.cursor.y, style, direction);
            state.cursor.runs.push(run);
        }
    }

    // ── Scenes ──────────────────────────────────────────────────────

    fn layout_scene(&self, scene: &Scene, numbered: usize, state: &mut LayoutState) {
        if !state.cursor.is_fresh() {
            state.cursor.y -= self.config.scene_spacing;
            state.check_page_break(self.config);
        }

        let subtitle = scene.subtitle();
        if scene.is_numbered() || subtitle.is_some() {
            self.layout_heading_block(scene, subtitle, numbered, state);
        }

        for element in scene.body() {
            self.layout_element(element, state);
        }
    }

    /// The heading and the scene's sub-title, each wrapped to the text
    /// column, are kept together on one page.
    fn layout_heading_block(
        &self,
        scene: &Scene,
        subtitle: Option<&ScriptElement>,
        numbered: usize,
        state: &mut LayoutState,
    ) {
        let cfg = self.config;
        let heading = scene
            .is_numbered()
            .then(|| self.wrap_bold(&scene.heading.to_uppercase()));
        let sub = subtitle.map(|s| self.wrap_bold(&s.content));

        let line_count = [&heading, &sub]
            .iter()
            .filter_map(|block| block.as_ref())
            .map(|(_, lines)| lines.len())
            .sum();
        let room = lines_in(state.cursor.remaining_height(), cfg.line_height);
        let rules = BreakRules::from_config(cfg);
        if place_lines(line_count, room, false, state.cursor.is_fresh(), rules) == Placement::NextPage {
            debug!("page break: scene {} heading moved to next page", scene.id);
            state.new_page(cfg);
        }

        if let Some((direction, lines)) = heading {
            self.layout_heading(scene, direction, &lines, numbered, state);
        }
        if let Some((direction, lines)) = sub {
            let align = alignment_for(ScriptElementType::Subheader, direction);
            let style = RunStyle::new(FontRole::Bold, cfg.font_size, Color::BLACK);
            for line in &lines {
                let column = self.text_column();
                let run = self.make_run(line, column, align, state.cursor.y, style, direction);
                state.cursor.runs.push(run);
                state.cursor.y -= cfg.line_height;
            }
        }
    }

    fn wrap_bold(&self, text: &str) -> (Direction, Vec<String>) {
        let shaped = shape_for_display(text);
        let width = self.text_column().width;
        let lines = wrap_text(self.metrics, &shaped, FontRole::Bold, self.config.font_size, width);
        (bidi::direction(text), lines)
    }

    fn layout_heading(
        &self,
        scene: &Scene,
        direction: Direction,
        lines: &[String],
        numbered: usize,
        state: &mut LayoutState,
    ) {
        let cfg = self.config;
        let size = cfg.font_size;
        let y = state.cursor.y;

        let label = scene_number_label(scene.id, numbered, cfg.pad_scene_numbers);
        let label_width = self.metrics.width_of_text_at_size(&label, FontRole::Bold, size);
        let margin = state.cursor.margin;
        let left_x = margin - cfg.scene_number_gutter - label_width;
        let right_x = state.cursor.width - margin + cfg.scene_number_gutter;
        let (left, right) = match (cfg.scene_numbers, direction) {
            (SceneNumbers::Both, _) => (true, true),
            (SceneNumbers::Leading, Direction::Ltr) => (true, false),
            (SceneNumbers::Leading, Direction::Rtl) => (false, true),
        };
        for (show, x, align) in [(left, left_x, TextAlign::Right), (right, right_x, TextAlign::Left)] {
            if show {
                state.cursor.runs.push(TextRun {
                    text: label.clone(),
                    x,
                    y,
                    font: FontRole::Bold,
                    size,
                    color: Color::BLACK,
                    align,
                    rtl: false,
                });
            }
        }

        let align = alignment_for(ScriptElementType::SceneHeading, direction);
        let style = RunStyle::new(FontRole::Bold, size, Color::BLACK);
        for line in lines {
            let column = self.text_column();
            let run = self.make_run(line, column, align, state.cursor.y, style, direction);
            state.cursor.runs.push(run);
            state.cursor.y -= cfg.line_height;
        }

        debug!("bookmark: '{}' on page {}", scene.heading, state.page_index());
        state.bookmarks.push(Bookmark {
            title: scene.heading.clone(),
            page_index: state.page_index(),
            y,
        });
    }

    // ── Body elements ───────────────────────────────────────────────

    /// Lay out one body element, splitting action and dialogue across
    /// pages. The element itself is never modified; the unplaced remainder
    /// is carried as a local string.
    fn layout_element(&self, element: &ScriptElement, state: &mut LayoutState) {
        let cfg = self.config;
        let kind = element.kind;

        let mut content = match kind {
            ScriptElementType::Character | ScriptElementType::Transition => {
                element.content.trim().to_uppercase()
            }
            _ => element.content.clone(),
        };
        let mut centered = false;
        if kind == ScriptElementType::Dialogue && cfg.center_quoted_dialogue {
            if let Some(rest) = content.strip_prefix('"') {
                content = rest.to_string();
                centered = true;
            }
        }

        let font = match kind {
            ScriptElementType::Character
            | ScriptElementType::Subheader
            | ScriptElementType::SceneHeading => FontRole::Bold,
            _ => FontRole::Regular,
        };
        let style = RunStyle::new(font, cfg.font_size, Color::BLACK);
        // Every line of the element shares its direction, including lines
        // that hold only digits or brackets after wrapping.
        let direction = bidi::direction(&content);
        let align = if centered {
            TextAlign::Center
        } else {
            alignment_for(kind, direction)
        };
        let column = match kind {
            ScriptElementType::Dialogue => self.dialogue_column(),
            _ => self.text_column(),
        };
        let rules = BreakRules::from_config(cfg);

        let mut remaining = shape_for_display(&content);
        loop {
            let lines = wrap_text(self.metrics, &remaining, font, cfg.font_size, column.width);
            let room = lines_in(state.cursor.remaining_height(), cfg.line_height);
            let placed = match place_lines(
                lines.len(),
                room,
                kind.is_breakable(),
                state.cursor.is_fresh(),
                rules,
            ) {
                Placement::Whole => lines.len(),
                Placement::Split { here } => here,
                Placement::NextPage => {
                    debug!("page break: {:?} moved to next page", kind);
                    state.new_page(cfg);
                    continue;
                }
            };

            for line in &lines[..placed] {
                let run = self.make_run(line, column, align, state.cursor.y, style, direction);
                state.cursor.runs.push(run);
                state.cursor.y -= cfg.line_height;
            }

            if placed >= lines.len() {
                break;
            }
            debug!(
                "split {:?}: {} lines placed on page {}, {} carried over",
                kind,
                placed,
                state.page_index(),
                lines.len() - placed
            );
            remaining = lines[placed..].join(" ");
            state.new_page(cfg);
        }

        state.cursor.y -= cfg.element_spacing;
        state.check_page_break(cfg);
    }

    fn text_column(&self) -> Column {
        Column {
            x: self.config.page.margin,
            width: self.config.page.content_width(),
        }
    }

    fn dialogue_column(&self) -> Column {
        let width = self.config.dialogue_width;
        Column {
            x: (self.config.page.width() - width) / 2.0,
            width,
        }
    }

    fn make_run(
        &self,
        text: &str,
        column: Column,
        align: TextAlign,
        y: f64,
        style: RunStyle,
        direction: Direction,
    ) -> TextRun {
        let width = self.metrics.width_of_text_at_size(text, style.font, style.size);
        let x = match align {
            TextAlign::Left => column.x,
            TextAlign::Right => column.x + column.width - width,
            TextAlign::Center => column.x + (column.width - width) / 2.0,
        };
        TextRun {
            text: text.to_string(),
            x,
            y,
            font: style.font,
            size: style.size,
            color: style.color,
            align,
            rtl: direction.is_rtl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PageConfig, PageSize};
    use crate::model::ScriptMetadata;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    /// Every character is 10pt wide, so wrapping is easy to predict.
    struct FixedAdvance;

    impl FontMetrics for FixedAdvance {
        fn width_of_text_at_size(&self, text: &str, _font: FontRole, _size: f64) -> f64 {
            text.chars().count() as f64 * 10.0
        }
    }

    fn no_cover() -> RenderConfig {
        RenderConfig {
            title_page: false,
            element_spacing: 0.0,
            ..RenderConfig::default()
        }
    }

    fn state_for(config: &RenderConfig) -> LayoutState {
        LayoutState {
            pages: Vec::new(),
            cursor: PageCursor::new(config),
            bookmarks: Vec::new(),
        }
    }

    /// 30-character words: one per 468pt line under `FixedAdvance`.
    fn one_word_per_line(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{:029}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn all_text(doc: &LayoutDocument) -> Vec<String> {
        doc.pages
            .iter()
            .flat_map(|p| p.runs.iter().map(|r| r.text.clone()))
            .collect()
    }

    #[test]
    fn test_forty_lines_with_ten_lines_of_room() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let mut state = state_for(&config);
        state.cursor.y = config.page.margin + 10.0 * config.line_height;
        // Something already sits on the page.
        state.cursor.runs.push(TextRun {
            text: "above".to_string(),
            x: 72.0,
            y: 700.0,
            font: FontRole::Regular,
            size: 12.0,
            color: Color::BLACK,
            align: TextAlign::Left,
            rtl: false,
        });

        let text = one_word_per_line(40);
        let element = ScriptElement::new(ScriptElementType::Action, text.clone());
        engine.layout_element(&element, &mut state);

        assert_eq!(state.pages.len(), 1, "exactly one new page");
        assert_eq!(state.pages[0].runs.len(), 1 + 10);
        assert_eq!(state.cursor.runs.len(), 30);

        let fragments: Vec<String> = state.pages[0].runs[1..]
            .iter()
            .chain(state.cursor.runs.iter())
            .map(|r| r.text.clone())
            .collect();
        assert_eq!(fragments.join(" "), text);
        // The source element is untouched.
        assert_eq!(element.content, text);
    }

    #[test]
    fn test_new_page_holds_thirty_six_lines() {
        let config = no_cover();
        let mut state = state_for(&config);
        assert_eq!(lines_in(state.cursor.remaining_height(), config.line_height), 36);
        state.cursor.y = 72.0 + 18.0 * 3.5;
        assert_eq!(lines_in(state.cursor.remaining_height(), config.line_height), 3);
    }

    #[test]
    fn test_long_action_spans_several_pages() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let text = one_word_per_line(100);
        let script = parse(&format!("# INT. HALL - DAY\n{}", text));
        let doc = engine.layout(&script);

        assert_eq!(doc.pages.len(), 3);
        let body: Vec<String> = doc
            .pages
            .iter()
            .flat_map(|p| p.runs.iter())
            .filter(|r| r.text.starts_with('w'))
            .map(|r| r.text.clone())
            .collect();
        assert_eq!(body.join(" "), text);
    }

    #[test]
    fn test_character_moves_whole_to_next_page() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let mut state = state_for(&config);
        let column = engine.text_column();
        state.cursor.runs.push(engine.make_run(
            "x",
            column,
            TextAlign::Left,
            700.0,
            RunStyle::new(FontRole::Regular, 12.0, Color::BLACK),
            Direction::Ltr,
        ));
        state.cursor.y = config.page.margin + 5.0;

        let element = ScriptElement::new(ScriptElementType::Character, "jane");
        engine.layout_element(&element, &mut state);

        assert_eq!(state.pages.len(), 1);
        let run = &state.cursor.runs[0];
        assert_eq!(run.text, "JANE");
        assert_eq!(run.y, 792.0 - 72.0);
        assert_eq!(run.font, FontRole::Bold);
        assert_eq!(run.x, (612.0 - 40.0) / 2.0);
    }

    #[test]
    fn test_scene_heading_numbers_and_bookmark() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let script = parse("# int. kitchen - day\nJane enters.");
        let doc = engine.layout(&script);

        let runs = &doc.pages[0].runs;
        // The first scene on a page gets no scene gap.
        let heading_y = 792.0 - 72.0;
        assert_eq!(runs[0].text, "1");
        assert_eq!(runs[0].x, 72.0 - 10.0 - 10.0);
        assert_eq!(runs[1].text, "1");
        assert_eq!(runs[1].x, 612.0 - 72.0 + 10.0);
        assert_eq!(runs[2].text, "INT. KITCHEN - DAY");
        assert_eq!(runs[2].x, 72.0);
        assert_eq!(runs[2].y, heading_y);
        assert_eq!(runs[3].text, "Jane enters.");
        assert_eq!(runs[3].y, heading_y - 18.0);

        assert_eq!(
            doc.bookmarks,
            vec![Bookmark {
                title: "int. kitchen - day".to_string(),
                page_index: 0,
                y: heading_y,
            }]
        );
    }

    #[test]
    fn test_scene_numbers_are_padded() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let body: String = (1..=12).map(|i| format!("# SCENE {}\n", i)).collect();
        let doc = engine.layout(&parse(&body));
        let first = all_text(&doc);
        assert_eq!(first[0], "01");
        assert!(first.contains(&"12".to_string()));
        assert_eq!(doc.bookmarks.len(), 12);
    }

    #[test]
    fn test_leading_numbers_follow_direction() {
        let config = RenderConfig {
            scene_numbers: SceneNumbers::Leading,
            ..no_cover()
        };
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("# מטבח - יום\n# INT. HALL"));
        let numbers: Vec<&TextRun> = doc.pages[0]
            .runs
            .iter()
            .filter(|r| r.text == "1" || r.text == "2")
            .collect();
        assert_eq!(numbers.len(), 2);
        assert!(numbers[0].x > 540.0, "RTL number in the right margin");
        assert!(numbers[1].x < 72.0, "LTR number in the left margin");
    }

    #[test]
    fn test_rtl_heading_is_right_aligned() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("# מטבח"));
        let heading = &doc.pages[0].runs[2];
        assert!(heading.rtl);
        assert_eq!(heading.align, TextAlign::Right);
        assert_eq!(heading.x, 612.0 - 72.0 - 40.0);
    }

    #[test]
    fn test_rtl_action_right_aligned_and_shaped() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("שלום (עולם) 123"));
        let run = &doc.pages[0].runs[0];
        assert!(run.rtl);
        assert_eq!(run.align, TextAlign::Right);
        assert_eq!(run.text, "שלום )עולם( 321");
    }

    #[test]
    fn test_synthetic_scene_has_no_heading_or_bookmark() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("## Flashback\n@bob\n\"Hello"));
        let runs = &doc.pages[0].runs;
        assert!(doc.bookmarks.is_empty());
        assert_eq!(runs[0].text, "Flashback");
        assert_eq!(runs[0].font, FontRole::Bold);
        assert_eq!(runs[0].y, 792.0 - 72.0);
        assert_eq!(runs[1].text, "BOB");
        assert_eq!(runs[2].text, "Hello");
        assert_eq!(runs[2].x, (612.0 - 200.0) / 2.0);
    }

    #[test]
    fn test_quoted_dialogue_is_centered() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("\"\"Hi"));
        let run = &doc.pages[0].runs[0];
        assert_eq!(run.text, "Hi");
        assert_eq!(run.align, TextAlign::Center);
        assert_eq!(run.x, (612.0 - 20.0) / 2.0);

        let plain = RenderConfig {
            center_quoted_dialogue: false,
            ..no_cover()
        };
        let doc = LayoutEngine::new(&plain, &FixedAdvance).layout(&parse("\"\"Hi"));
        assert_eq!(doc.pages[0].runs[0].text, "\"Hi");
    }

    #[test]
    fn test_rtl_dialogue_right_aligned_in_column() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("\"שלום"));
        let run = &doc.pages[0].runs[0];
        assert_eq!(run.x, (612.0 + 200.0) / 2.0 - 40.0);
    }

    #[test]
    fn test_transition_opposite_reading_direction() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("-cut to:"));
        let run = &doc.pages[0].runs[0];
        assert_eq!(run.text, "CUT TO:");
        assert_eq!(run.x, 612.0 - 72.0 - 70.0);
    }

    #[test]
    fn test_cover_page() {
        let config = RenderConfig::default();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let script = Script {
            metadata: ScriptMetadata {
                title: "My Script".to_string(),
                writers: "Alice, Bob".to_string(),
                date: "2024-03-05".to_string(),
                ..ScriptMetadata::default()
            },
            scenes: vec![],
        };
        let doc = engine.layout(&script);
        assert_eq!(doc.pages.len(), 2);

        let cover: Vec<(&str, f64)> = doc.pages[0]
            .runs
            .iter()
            .map(|r| (r.text.as_str(), r.y))
            .collect();
        assert_eq!(
            cover,
            vec![
                ("My Script", 446.0),
                ("written by", 396.0),
                ("Alice", 381.0),
                ("Bob", 366.0),
                ("date", 326.0),
                ("3/5/2024", 311.0),
            ]
        );
        assert_eq!(doc.pages[0].runs[0].size, 36.0);
        assert_eq!(doc.pages[0].runs[2].color, Color::CREDIT_GREY);
        assert_eq!(doc.info.author, "Alice, Bob");
    }

    #[test]
    fn test_cover_defaults_and_hebrew_captions() {
        let config = RenderConfig::default();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let script = Script {
            metadata: ScriptMetadata {
                writers: "דנה".to_string(),
                ..ScriptMetadata::default()
            },
            scenes: vec![],
        };
        let doc = engine.layout(&script);
        let texts: Vec<&str> = doc.pages[0].runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Untitled Script", "נכתב על ידי", "דנה"]);
        assert_eq!(doc.info.locale, Locale::He);
    }

    #[test]
    fn test_explicit_locale_wins() {
        let config = RenderConfig {
            locale: Some(Locale::Es),
            ..RenderConfig::default()
        };
        let script = parse("---\ntitle: שלום\n---\n");
        assert_eq!(resolve_locale(&script, &config), Locale::Es);
        assert_eq!(resolve_locale(&script, &RenderConfig::default()), Locale::He);
    }

    #[test]
    fn test_layout_does_not_mutate_script() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let script = parse(&format!("# A\n{}", one_word_per_line(80)));
        let before = script.clone();
        let first = engine.layout(&script);
        let second = engine.layout(&script);
        assert_eq!(script, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrapped_rtl_lines_keep_the_paragraph_direction() {
        // A 50pt text column: five characters per line.
        let config = RenderConfig {
            page: PageConfig {
                size: PageSize::Custom {
                    width: 194.0,
                    height: 792.0,
                },
                margin: 72.0,
            },
            ..no_cover()
        };
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("שלום 2024"));
        let runs: Vec<(&str, bool, TextAlign)> = doc.pages[0]
            .runs
            .iter()
            .map(|r| (r.text.as_str(), r.rtl, r.align))
            .collect();
        assert_eq!(
            runs,
            vec![
                ("שלום", true, TextAlign::Right),
                ("4202", true, TextAlign::Right),
            ]
        );
    }

    #[test]
    fn test_long_heading_wraps_inside_text_column() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let heading = "INT. ABANDONED TEXTILE FACTORY, THIRD FLOOR LOADING DOCK - NIGHT";
        let sub = "Moments after the power failure, everyone still inside the mill";
        let script = parse(&format!("# {}\n## {}\nDust.", heading, sub));
        let doc = engine.layout(&script);
        let runs = &doc.pages[0].runs;

        let right_edge = 612.0 - 72.0;
        for run in runs.iter().filter(|r| r.text.chars().count() > 2) {
            let end = run.x + run.text.chars().count() as f64 * 10.0;
            assert!(run.x >= 72.0 && end <= right_edge, "{:?} leaves the column", run.text);
        }

        let heading_lines: Vec<&str> = runs
            .iter()
            .filter(|r| r.font == FontRole::Bold && r.text.len() > 2)
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(heading_lines.len(), 4);
        assert_eq!(heading_lines[..2].join(" "), heading);
        assert_eq!(heading_lines[2..].join(" "), sub);

        // Numbers sit beside the first heading line; the body follows the block.
        assert_eq!(runs[0].y, 720.0);
        assert_eq!(runs[1].y, 720.0);
        assert_eq!(doc.bookmarks[0].y, 720.0);
        let body = runs.iter().find(|r| r.text == "Dust.").unwrap();
        assert_eq!(body.y, 720.0 - 4.0 * 18.0);
    }

    #[test]
    fn test_wrapped_heading_block_moves_whole() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let mut state = state_for(&config);
        state.cursor.runs.push(TextRun {
            text: "above".to_string(),
            x: 72.0,
            y: 700.0,
            font: FontRole::Regular,
            size: 12.0,
            color: Color::BLACK,
            align: TextAlign::Left,
            rtl: false,
        });
        // Room for one line; the heading wraps to two.
        state.cursor.y = 72.0 + 18.0;
        let script = parse("# INT. ABANDONED TEXTILE FACTORY, THIRD FLOOR LOADING DOCK - NIGHT");
        engine.layout_heading_block(&script.scenes[0], None, 1, &mut state);

        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.pages[0].runs.len(), 1);
        assert_eq!(state.cursor.runs.len(), 4);
        assert_eq!(state.bookmarks[0].page_index, 1);
    }

    #[test]
    fn test_scene_gap_only_between_scenes() {
        let config = no_cover();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let doc = engine.layout(&parse("# A\n# B"));
        let ys: Vec<f64> = doc.bookmarks.iter().map(|b| b.y).collect();
        assert_eq!(ys, vec![720.0, 720.0 - 18.0 - 30.0]);
    }

    #[test]
    fn test_long_writer_list_continues_on_next_cover_page() {
        let config = RenderConfig::default();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let writers: Vec<String> = (1..=40).map(|i| format!("Writer {}", i)).collect();
        let script = Script {
            metadata: ScriptMetadata {
                title: "Ensemble".to_string(),
                writers: writers.join(", "),
                ..ScriptMetadata::default()
            },
            scenes: vec![],
        };
        let doc = engine.layout(&script);

        // Two cover pages, then the (empty) script page.
        assert_eq!(doc.pages.len(), 3);
        let cover: Vec<&TextRun> = doc.pages[..2].iter().flat_map(|p| p.runs.iter()).collect();
        assert!(cover.iter().all(|r| r.y >= 72.0));
        let names: Vec<&str> = cover
            .iter()
            .filter(|r| r.text.starts_with("Writer"))
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(names.len(), 40);
        assert_eq!(doc.pages[0].runs.last().unwrap().text, "Writer 21");
        assert_eq!(doc.pages[1].runs[0].text, "Writer 22");
        assert_eq!(doc.pages[1].runs[0].y, 720.0);
    }

    #[test]
    fn test_long_title_wraps_on_cover() {
        let config = RenderConfig::default();
        let engine = LayoutEngine::new(&config, &FixedAdvance);
        let script = Script {
            metadata: ScriptMetadata {
                title: "The Extraordinarily Long And Winding Title Of This Script".to_string(),
                ..ScriptMetadata::default()
            },
            scenes: vec![],
        };
        let doc = engine.layout(&script);
        let title: Vec<&TextRun> = doc.pages[0]
            .runs
            .iter()
            .filter(|r| r.size == 36.0)
            .collect();
        assert!(title.len() > 1);
        for run in &title {
            assert!(run.x >= 72.0);
            assert!(run.x + run.text.chars().count() as f64 * 10.0 <= 540.0);
        }
        assert_eq!(title[1].y, 446.0 - 36.0 * 1.2);
    }
}
