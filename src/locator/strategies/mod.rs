//! Locate strategies.
//!
//! # Available Strategies
//!
//! Text (added / modified), in chain order:
//!
//! - [`SearchTextBlock`]: chunked block search over the search text
//! - [`NewValueBlock`]: chunked block search over the new value
//! - [`AnchoredSnippet`]: snippets of the text scored against the anchor
//! - [`DirectText`]: verbatim search, truncated, without an anchor
//!
//! Numeric, in chain order:
//!
//! - [`InPlace`]: the new value next to where the old value sits
//! - [`AnchoredValue`]: the new value near the anchor
//! - [`SectionAnchored`]: the new value below the section heading
//! - [`PositionalHint`]: the n-th page occurrence named by the position hint
//! - [`UniqueOccurrence`]: the only page occurrence, for records without hints

mod numeric;
mod text;

pub use numeric::{AnchoredValue, InPlace, PositionalHint, SectionAnchored, UniqueOccurrence};
pub use text::{AnchoredSnippet, DirectText, NewValueBlock, SearchTextBlock};

use super::LocateStrategy;
use crate::config::LocatorConfig;
use crate::geometry::Rect;
use crate::page::PageTextIndex;

/// Standard chain for added and modified text.
pub fn text_chain() -> Vec<Box<dyn LocateStrategy>> {
    vec![
        Box::new(SearchTextBlock),
        Box::new(NewValueBlock),
        Box::new(AnchoredSnippet),
        Box::new(DirectText),
    ]
}

/// Standard chain for numeric changes.
pub fn numeric_chain() -> Vec<Box<dyn LocateStrategy>> {
    vec![
        Box::new(InPlace),
        Box::new(AnchoredValue),
        Box::new(SectionAnchored),
        Box::new(PositionalHint),
        Box::new(UniqueOccurrence),
    ]
}

/// `length_weight × chars − (vertical_weight × |Δtop| + horizontal gap)`.
///
/// Longer literals score higher; matches far from `reference` score lower,
/// vertical distance much more so than horizontal.
pub(crate) fn proximity_score(config: &LocatorConfig, rect: &Rect, reference: &Rect, literal: &str) -> f32 {
    let length = literal.chars().count() as f32;
    let vertical = (rect.top() - reference.top()).abs();
    config.length_weight * length - (config.vertical_weight * vertical + rect.horizontal_gap(reference))
}

/// Sort best score first; equal scores keep reading order.
pub(crate) fn rank(scored: &mut [(Rect, f32)]) {
    scored.sort_by(|(ra, a), (rb, b)| b.total_cmp(a).then_with(|| Rect::reading_order(ra, rb)));
}

/// Occurrences of `literal` whose first line intersects `region`, each with
/// all of its line rectangles.
pub(crate) fn search_occurrences_within(page: &dyn PageTextIndex, literal: &str, region: &Rect) -> Vec<Vec<Rect>> {
    page.search_occurrences(literal)
        .into_iter()
        .filter(|rects| rects.first().is_some_and(|first| first.intersects(region)))
        .collect()
}

/// Occurrences of `literal` intersecting `region`.
pub(crate) fn search_within(page: &dyn PageTextIndex, literal: &str, region: &Rect) -> Vec<Rect> {
    page.search(literal)
        .into_iter()
        .filter(|rect| rect.intersects(region))
        .collect()
}
