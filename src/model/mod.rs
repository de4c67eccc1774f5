//! # Script Model
//!
//! The structured form of a screenplay. A script is its metadata plus an
//! ordered list of scenes, and every scene is an ordered list of typed
//! elements. This is what the parser produces and what the layout engine
//! consumes.
//!
//! The tree is rebuilt from the full document text on every parse. Nothing
//! here is mutated after construction: the layout engine works on its own
//! copies when it has to split an element across pages.

use serde::{Deserialize, Serialize};

/// Title-page metadata carried in the frontmatter block.
///
/// Every field is a plain string. An empty string means "absent" and is
/// never written back out by the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Comma-separated writer names. Stored under the `author` key.
    #[serde(default)]
    pub writers: String,
    #[serde(default)]
    pub prod_company: String,
    /// Kept as written. Only the cover page tries to interpret it.
    #[serde(default)]
    pub date: String,
    /// Folder holding character notes in the host application.
    #[serde(default)]
    pub character_folder: String,
}

impl ScriptMetadata {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.subtitle.is_empty()
            && self.writers.is_empty()
            && self.prod_company.is_empty()
            && self.date.is_empty()
            && self.character_folder.is_empty()
    }
}

/// The closed set of screenplay element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptElementType {
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Transition,
    Subheader,
}

impl ScriptElementType {
    /// Long-form elements may be split across a page boundary. Everything
    /// else moves to the next page as a whole.
    pub fn is_breakable(self) -> bool {
        matches!(self, Self::Action | Self::Dialogue)
    }
}

/// One classified source line with its sigil stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptElement {
    #[serde(rename = "type")]
    pub kind: ScriptElementType,
    pub content: String,
}

impl ScriptElement {
    pub fn new(kind: ScriptElementType, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// A run of elements introduced by a heading line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// 1-based scene number, or 0 for content that precedes every heading.
    pub id: u32,
    pub heading: String,
    pub elements: Vec<ScriptElement>,
}

impl Scene {
    /// The synthetic scene holding content written before the first heading.
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Whether this scene gets a rendered heading, a number and a bookmark.
    pub fn is_numbered(&self) -> bool {
        self.id > 0
    }

    /// The scene's sub-title: a `Subheader` in first position.
    pub fn subtitle(&self) -> Option<&ScriptElement> {
        self.elements
            .first()
            .filter(|e| e.kind == ScriptElementType::Subheader)
    }

    /// Elements rendered as ordinary body rows, i.e. everything except the
    /// sub-title.
    pub fn body(&self) -> &[ScriptElement] {
        match self.subtitle() {
            Some(_) => &self.elements[1..],
            None => &self.elements,
        }
    }
}

/// A parsed screenplay: metadata plus scenes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(flatten)]
    pub metadata: ScriptMetadata,
    pub scenes: Vec<Scene>,
}

impl Script {
    /// Number of heading-bearing scenes. The synthetic id-0 scene is not
    /// counted.
    pub fn numbered_scene_count(&self) -> usize {
        self.scenes.iter().filter(|s| s.is_numbered()).count()
    }
}
