//! Highlight commit and used-region bookkeeping.
//!
//! [`HighlightCommitter`] is the only writer of a page's [`UsedRegions`]. Each
//! region it highlights is remembered by its rounded top-left position, so a
//! later record can never highlight the same spot twice. The set is reset at
//! the start of every page and grows in record order: earlier records claim
//! regions first.
//!
//! Drawing errors from the [`HighlightTarget`] are logged and turned into
//! [`CommitOutcome::DrawFailed`]; they never abort the page.

use crate::annotation::{quad_from_rect, HighlightAnnotation, HighlightStyle};
use crate::geometry::{PositionKey, Rect};
use crate::locator::Located;
use crate::page::HighlightTarget;
use serde::Serialize;
use std::collections::HashSet;

/// Positions already highlighted on the current page.
#[derive(Debug, Clone, Default)]
pub struct UsedRegions {
    keys: HashSet<PositionKey>,
    precision: u32,
}

impl UsedRegions {
    /// Create an empty set rounding positions to `precision` decimals.
    pub fn new(precision: u32) -> Self {
        Self {
            keys: HashSet::new(),
            precision,
        }
    }

    /// Key of `rect` at this set's precision.
    pub fn key(&self, rect: &Rect) -> PositionKey {
        rect.position_key(self.precision)
    }

    /// Whether `rect`'s position has been highlighted.
    pub fn contains(&self, rect: &Rect) -> bool {
        self.keys.contains(&self.key(rect))
    }

    /// Mark `rect`'s position as highlighted.
    pub fn insert(&mut self, rect: &Rect) -> bool {
        let key = self.key(rect);
        self.keys.insert(key)
    }

    /// Number of remembered positions.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing has been highlighted.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Forget every position (start of a new page).
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Result of committing one located region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum CommitOutcome {
    /// A highlight was drawn covering `rect`
    Drawn {
        /// Area covered by the highlight
        rect: Rect,
    },
    /// Every candidate position was already highlighted
    AlreadyUsed,
    /// The page refused the highlight
    DrawFailed,
}

impl CommitOutcome {
    /// Whether a highlight was drawn.
    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn { .. })
    }
}

/// Draws highlights while keeping one page's used regions.
#[derive(Debug, Clone)]
pub struct HighlightCommitter {
    used: UsedRegions,
    opacity: Option<f32>,
}

impl HighlightCommitter {
    /// Create a committer rounding positions to `precision` decimals.
    pub fn new(precision: u32) -> Self {
        Self {
            used: UsedRegions::new(precision),
            opacity: None,
        }
    }

    /// Set the opacity given to every highlight.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Positions highlighted so far on this page.
    pub fn used(&self) -> &UsedRegions {
        &self.used
    }

    /// Start a new page.
    pub fn reset(&mut self) {
        self.used.clear();
    }

    /// Highlight `quads` as one block.
    ///
    /// Already-used quads are dropped. Two or more remaining quads are drawn
    /// as one rectangle covering their union (no gaps across line breaks),
    /// unless the union's position is itself used, in which case nothing is
    /// drawn. If the merged draw fails, the quads are drawn one by one.
    /// Returns whether anything was drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::annotation::AnnotationColor;
    /// use change_highlight::commit::HighlightCommitter;
    /// use change_highlight::geometry::Rect;
    /// use change_highlight::page::TextPage;
    ///
    /// let mut page = TextPage::new(1, 612.0, 792.0);
    /// let mut committer = HighlightCommitter::new(2);
    /// let quads = [
    ///     Rect::from_points(72.0, 100.0, 300.0, 112.0),
    ///     Rect::from_points(72.0, 114.0, 180.0, 126.0),
    /// ];
    ///
    /// assert!(committer.commit(&mut page, &quads, AnnotationColor::amber()));
    /// assert_eq!(page.annotations().len(), 1);
    /// assert_eq!(page.annotations()[0].rect, Rect::from_points(72.0, 100.0, 300.0, 126.0));
    ///
    /// // Same region again: nothing new is drawn
    /// assert!(!committer.commit(&mut page, &quads, AnnotationColor::amber()));
    /// ```
    pub fn commit<T: HighlightTarget + ?Sized>(
        &mut self,
        target: &mut T,
        quads: &[Rect],
        style: impl Into<HighlightStyle>,
    ) -> bool {
        self.commit_block(target, quads, style).is_drawn()
    }

    /// Commit a located region: blocks are drawn whole, ranked candidates
    /// give the first unused one.
    pub fn commit_region<T: HighlightTarget + ?Sized>(
        &mut self,
        target: &mut T,
        region: &Located,
        style: impl Into<HighlightStyle>,
    ) -> CommitOutcome {
        match region {
            Located::Block(quads) => self.commit_block(target, quads, style),
            Located::Ranked(candidates) => self.commit_ranked(target, candidates, style),
        }
    }

    /// Highlight `quads` as one block (see [`commit`](Self::commit)).
    pub fn commit_block<T: HighlightTarget + ?Sized>(
        &mut self,
        target: &mut T,
        quads: &[Rect],
        style: impl Into<HighlightStyle>,
    ) -> CommitOutcome {
        let style = style.into();
        let fresh: Vec<Rect> = quads.iter().filter(|q| !self.used.contains(q)).copied().collect();

        match fresh.as_slice() {
            [] => CommitOutcome::AlreadyUsed,
            [single] => self.draw_single(target, *single, &style),
            many => {
                let Some(merged) = Rect::union_all(many) else {
                    return CommitOutcome::AlreadyUsed;
                };
                if self.used.contains(&merged) {
                    log::debug!("Merged block at {:?} already highlighted", merged);
                    return CommitOutcome::AlreadyUsed;
                }

                let quad_points = many.iter().map(quad_from_rect).collect();
                match target.add_highlight(self.annotation(HighlightAnnotation::new(merged, quad_points), &style)) {
                    Ok(()) => {
                        self.used.insert(&merged);
                        for quad in many {
                            self.used.insert(quad);
                        }
                        CommitOutcome::Drawn { rect: merged }
                    },
                    Err(e) => {
                        log::warn!("Merged highlight failed ({}), drawing {} quads individually", e, many.len());
                        self.draw_each(target, many, &style)
                    },
                }
            },
        }
    }

    /// Highlight the first candidate whose position is unused.
    pub fn commit_ranked<T: HighlightTarget + ?Sized>(
        &mut self,
        target: &mut T,
        candidates: &[Rect],
        style: impl Into<HighlightStyle>,
    ) -> CommitOutcome {
        match candidates.iter().find(|c| !self.used.contains(c)) {
            Some(candidate) => self.draw_single(target, *candidate, &style.into()),
            None => CommitOutcome::AlreadyUsed,
        }
    }

    fn draw_single<T: HighlightTarget + ?Sized>(
        &mut self,
        target: &mut T,
        rect: Rect,
        style: &HighlightStyle,
    ) -> CommitOutcome {
        match target.add_highlight(self.annotation(HighlightAnnotation::from_rect(rect), style)) {
            Ok(()) => {
                self.used.insert(&rect);
                CommitOutcome::Drawn { rect }
            },
            Err(e) => {
                log::warn!("Highlight at {:?} failed: {}", rect, e);
                CommitOutcome::DrawFailed
            },
        }
    }

    fn draw_each<T: HighlightTarget + ?Sized>(
        &mut self,
        target: &mut T,
        quads: &[Rect],
        style: &HighlightStyle,
    ) -> CommitOutcome {
        let drawn: Vec<Rect> = quads
            .iter()
            .filter(|quad| self.draw_single(target, **quad, style).is_drawn())
            .copied()
            .collect();
        match Rect::union_all(&drawn) {
            Some(rect) => CommitOutcome::Drawn { rect },
            None => CommitOutcome::DrawFailed,
        }
    }

    fn annotation(&self, annotation: HighlightAnnotation, style: &HighlightStyle) -> HighlightAnnotation {
        let annotation = style.apply(annotation);
        match self.opacity {
            Some(opacity) => annotation.with_opacity(opacity),
            None => annotation,
        }
    }
}
