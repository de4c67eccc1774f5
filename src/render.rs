//! # Render Targets
//!
//! A [`RenderTarget`] is anything that can receive laid-out pages: the
//! built-in PDF writer, a test recorder, or a host's own drawing surface.
//! [`render_to`] replays a [`LayoutDocument`] into a target page by page.
//!
//! Layout itself cannot fail. Errors only come from the target and are
//! returned to the caller as they were raised.

use crate::error::SluglineError;
use crate::layout::{Bookmark, DocumentInfo, LayoutDocument, TextRun};

/// A sink for positioned text.
pub trait RenderTarget {
    /// What the target produces once every page is drawn.
    type Output;

    /// Open a new page. Subsequent draws go to this page.
    fn add_page(&mut self, width: f64, height: f64) -> Result<(), SluglineError>;

    /// Draw one run on the current page.
    fn draw_text(&mut self, run: &TextRun) -> Result<(), SluglineError>;

    /// Finish the document. Bookmarks index into the pages in the order
    /// they were added.
    fn finish(
        self,
        bookmarks: &[Bookmark],
        info: &DocumentInfo,
    ) -> Result<Self::Output, SluglineError>;
}

/// Replay a laid-out document into `target`.
pub fn render_to<T: RenderTarget>(
    document: &LayoutDocument,
    mut target: T,
) -> Result<T::Output, SluglineError> {
    for page in &document.pages {
        target.add_page(page.width, page.height)?;
        for run in &page.runs {
            target.draw_text(run)?;
        }
    }
    target.finish(&document.bookmarks, &document.info)
}
