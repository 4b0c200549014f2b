//! Page capabilities consumed by the engine.
//!
//! The engine needs exactly two things from the document layer:
//!
//! - [`PageTextIndex`]: exact, case-sensitive substring search returning one
//!   rectangle per line an occurrence touches, grouped by occurrence, plus
//!   the page bounds.
//! - [`HighlightTarget`]: a sink that accepts highlight annotations and may
//!   refuse them.
//!
//! [`TextPage`] implements both over positioned text lines and is what the
//! CLI and tests run against.

mod text_page;

pub use text_page::{PageLayout, TextLine, TextPage};

use crate::annotation::HighlightAnnotation;
use crate::error::Result;
use crate::geometry::Rect;

/// Literal text search over one page.
pub trait PageTextIndex {
    /// Every occurrence of `needle`, each as the rectangles of the lines it
    /// touches, in reading order.
    ///
    /// Matching is exact and case-sensitive. An occurrence spanning a line
    /// break yields one rectangle per line. Returns an empty vector when the
    /// needle is absent or empty.
    fn search_occurrences(&self, needle: &str) -> Vec<Vec<Rect>>;

    /// All rectangles where `needle` occurs verbatim, occurrences flattened.
    fn search(&self, needle: &str) -> Vec<Rect> {
        self.search_occurrences(needle).into_iter().flatten().collect()
    }

    /// Page bounds.
    fn bounds(&self) -> Rect;
}

/// Receives highlight annotations for one page.
pub trait HighlightTarget {
    /// Draw a highlight. Errors are reported to the caller, never panicked.
    fn add_highlight(&mut self, annotation: HighlightAnnotation) -> Result<()>;
}
