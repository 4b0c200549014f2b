//! Context anchors.
//!
//! An anchor is a located piece of surrounding text (a table row label, the
//! words just before a change, or a section heading) that scopes later
//! searches. Text to be located usually follows its anchor, so search regions
//! are grown generously to the right and below and only a little upwards.
//!
//! Only `row_label` and `context_before` resolve the primary anchor;
//! `section` is a separate, coarser anchor used by the numeric section
//! strategy.

use crate::candidates::{last_words, normalize_whitespace};
use crate::change::ChangeRecord;
use crate::geometry::{Margins, Rect};
use crate::page::PageTextIndex;
use serde::Serialize;

/// Which hint an anchor was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    /// The record's row label, verbatim
    RowLabel,
    /// The tail (or all) of the preceding context
    ContextBefore,
    /// The section heading
    Section,
}

/// A located context hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    /// First occurrence of the hint on the page
    pub rect: Rect,
    /// Hint the anchor came from
    pub source: AnchorSource,
    /// Literal that was found
    pub text: String,
}

impl Anchor {
    /// The anchor grown by `margins` and clipped to the page `bounds`.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::anchor::{Anchor, AnchorSource};
    /// use change_highlight::geometry::{Margins, Rect};
    ///
    /// let anchor = Anchor {
    ///     rect: Rect::from_points(72.0, 300.0, 140.0, 312.0),
    ///     source: AnchorSource::RowLabel,
    ///     text: "Debtors".to_string(),
    /// };
    /// let page = Rect::new(0.0, 0.0, 612.0, 792.0);
    /// let region = anchor.search_region(&Margins::new(200.0, 50.0, 1000.0, 600.0), &page);
    /// assert_eq!(region, Rect::from_points(0.0, 250.0, 612.0, 792.0));
    /// ```
    pub fn search_region(&self, margins: &Margins, bounds: &Rect) -> Rect {
        self.rect.expand(margins).clamp_to(bounds)
    }
}

/// Literals tried, in order, to resolve the primary anchor of `change`.
///
/// `row_label` verbatim, then the last five words of `context_before` (when
/// it has more than five), the last three (when it has more than three), and
/// finally the whole of `context_before`.
pub fn anchor_queries(change: &ChangeRecord) -> Vec<(AnchorSource, String)> {
    let mut queries = Vec::new();

    let row_label = change.row_label.trim();
    if !row_label.is_empty() {
        queries.push((AnchorSource::RowLabel, row_label.to_string()));
    }

    let before = normalize_whitespace(&change.context_before);
    if !before.is_empty() {
        for n in [5, 3] {
            if let Some(tail) = last_words(&before, n) {
                queries.push((AnchorSource::ContextBefore, tail));
            }
        }
        queries.push((AnchorSource::ContextBefore, before));
    }

    queries
}

/// Resolve the primary anchor of `change` on `page`.
///
/// The first query with at least one occurrence wins and the anchor is that
/// query's first occurrence. Returns `None` when no hint is found; callers
/// then fall back to unanchored search.
pub fn locate_anchor<P: PageTextIndex + ?Sized>(page: &P, change: &ChangeRecord) -> Option<Anchor> {
    for (source, text) in anchor_queries(change) {
        if let Some(rect) = page.search(&text).into_iter().next() {
            log::debug!("Anchor resolved from {:?}: {:?} at {:?}", source, text, rect);
            return Some(Anchor { rect, source, text });
        }
    }
    None
}

/// Resolve the record's section heading on `page`.
pub fn locate_section<P: PageTextIndex + ?Sized>(page: &P, change: &ChangeRecord) -> Option<Anchor> {
    let section = normalize_whitespace(&change.section);
    if section.is_empty() {
        return None;
    }
    let rect = page.search(&section).into_iter().next()?;
    log::debug!("Section anchor {:?} at {:?}", section, rect);
    Some(Anchor {
        rect,
        source: AnchorSource::Section,
        text: section,
    })
}
