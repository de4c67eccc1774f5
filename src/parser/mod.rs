//! # Script Parser
//!
//! Turns screenplay markup into a [`Script`]. The markup is line oriented;
//! the leading sigil of a line decides what it is:
//!
//! ```text
//! ## Flashback          → Subheader
//! # INT. KITCHEN - DAY  → starts a new scene
//! @JANE                 → Character
//! "I can't believe it.  → Dialogue
//! - CUT TO:             → Transition
//! Jane enters.          → Action (no sigil)
//! ```
//!
//! Blank lines only separate elements and never produce anything.

use log::debug;

use crate::frontmatter;
use crate::model::{Scene, Script, ScriptElement, ScriptElementType};

/// The result of classifying a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A body element belonging to the current scene.
    Element(ScriptElement),
    /// The start of a new scene. The id is a placeholder (0) until the
    /// builder numbers it.
    SceneMarker(Scene),
}

/// Classify one line by its sigil.
///
/// Precedence matters: `##` must be tested before `#`. Every input maps to
/// exactly one variant, with `Action` as the fallback.
pub fn classify(line: &str) -> Line {
    let line = line.trim();

    let element = |kind, rest: &str| Line::Element(ScriptElement::new(kind, rest.trim()));

    if let Some(rest) = line.strip_prefix("##") {
        return element(ScriptElementType::Subheader, rest);
    }
    if let Some(rest) = line.strip_prefix('#') {
        return Line::SceneMarker(Scene {
            id: 0,
            heading: rest.trim().to_string(),
            elements: Vec::new(),
        });
    }
    if let Some(rest) = line.strip_prefix('@') {
        return element(ScriptElementType::Character, rest);
    }
    if let Some(rest) = line.strip_prefix('"') {
        return element(ScriptElementType::Dialogue, rest);
    }
    if let Some(rest) = line.strip_prefix('-') {
        return element(ScriptElementType::Transition, rest);
    }
    element(ScriptElementType::Action, line)
}

/// Group the lines of a script body into numbered scenes.
///
/// Content that appears before the first scene marker is collected into a
/// synthetic scene with id 0. That scene never takes a number: the counter
/// only advances for scenes that were opened by a marker, so headed scenes
/// are always numbered 1, 2, 3, ... in document order.
pub fn build_scenes(body: &str) -> Vec<Scene> {
    let mut scenes = Vec::new();
    let mut current: Option<Scene> = None;
    let mut next_id = 1u32;

    let lines = body.lines().map(str::trim).filter(|l| !l.is_empty());

    for line in lines {
        match classify(line) {
            Line::SceneMarker(mut scene) => {
                if let Some(finished) = current.take() {
                    scenes.push(finished);
                }
                scene.id = next_id;
                next_id += 1;
                current = Some(scene);
            }
            Line::Element(element) => {
                current
                    .get_or_insert_with(Scene::untitled)
                    .elements
                    .push(element);
            }
        }
    }

    if let Some(finished) = current {
        scenes.push(finished);
    }

    scenes
}

/// Parse a full document: frontmatter block plus screenplay body.
pub fn parse(text: &str) -> Script {
    let (metadata, body) = frontmatter::decode(text);
    let scenes = build_scenes(body);
    debug!(
        "parsed {} scene(s), {} element(s)",
        scenes.len(),
        scenes.iter().map(|s| s.elements.len()).sum::<usize>()
    );
    Script { metadata, scenes }
}
