//! Page and document highlighting.
//!
//! [`PageHighlighter`] ties the pieces together: for each page it starts a
//! fresh [`HighlightCommitter`], then for each change record, in order,
//! locates the change and commits the region. Nothing in the loop aborts: the
//! worst outcome for a record is "not highlighted", recorded in the
//! [`PageReport`].
//!
//! # Example
//!
//! ```
//! use change_highlight::change::ChangeRecord;
//! use change_highlight::config::LocatorConfig;
//! use change_highlight::highlighter::PageHighlighter;
//! use change_highlight::page::TextPage;
//!
//! let mut page = TextPage::new(1, 612.0, 792.0);
//! page.push_monospace("Total assets 100,000 150,000", 72.0, 100.0, 6.0, 12.0);
//!
//! let highlighter = PageHighlighter::new(LocatorConfig::default()).unwrap();
//! let changes = vec![
//!     ChangeRecord::numeric("100,000", "150,000").with_row_label("Total assets"),
//!     ChangeRecord::text_deleted("Goodwill"),
//! ];
//! let report = highlighter.process_page(&mut page, 1, &changes);
//!
//! assert_eq!(report.highlighted(), 1);
//! assert_eq!(report.skipped(), 1);
//! assert_eq!(page.annotations().len(), 1);
//! ```

use crate::annotation::{HighlightPalette, HighlightStyle};
use crate::change::{ChangeKind, ChangeRecord, Correction};
use crate::commit::{CommitOutcome, HighlightCommitter};
use crate::config::LocatorConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::locator::{ChangeLocator, LocateOutcome, LocateState, SkipReason};
use crate::page::{HighlightTarget, PageTextIndex};
use serde::Serialize;
use std::collections::BTreeMap;

/// What happened to one change record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ChangeStatus {
    /// A highlight was drawn
    Highlighted {
        /// Area covered
        rect: Rect,
        /// Strategy that located the change
        strategy: &'static str,
        /// Phase of that strategy
        phase: LocateState,
    },
    /// Located, but every candidate region was claimed by an earlier record
    AlreadyHighlighted {
        /// Strategy that located the change
        strategy: &'static str,
    },
    /// Located, but the page refused the highlight
    AnnotationFailed {
        /// Strategy that located the change
        strategy: &'static str,
    },
    /// Not located
    Skipped(SkipReason),
}

impl ChangeStatus {
    /// Whether a highlight was drawn for the record.
    pub fn is_highlighted(&self) -> bool {
        matches!(self, Self::Highlighted { .. })
    }
}

/// Outcome for one record of a page's change list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeOutcome {
    /// Position of the record in the page's change list
    pub index: usize,
    /// Kind of change
    pub kind: ChangeKind,
    /// What happened
    pub status: ChangeStatus,
    /// Better literal discovered while locating the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<Correction>,
}

/// Outcomes for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    /// Page number (1-based)
    pub page_number: usize,
    /// One outcome per record, in record order
    pub outcomes: Vec<ChangeOutcome>,
}

impl PageReport {
    /// Records processed.
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    /// Records that got a highlight.
    pub fn highlighted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_highlighted()).count()
    }

    /// Records that did not get a highlight.
    pub fn skipped(&self) -> usize {
        self.processed() - self.highlighted()
    }

    /// Corrections discovered on this page.
    pub fn corrections(&self) -> impl Iterator<Item = &Correction> {
        self.outcomes.iter().filter_map(|o| o.correction.as_ref())
    }
}

/// Outcomes for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighlightSummary {
    /// Reports for pages that had change records
    pub pages: Vec<PageReport>,
    /// Page numbers with change records but no such page in the document
    pub missing_pages: Vec<usize>,
}

impl HighlightSummary {
    /// Records processed across all pages.
    pub fn processed(&self) -> usize {
        self.pages.iter().map(PageReport::processed).sum()
    }

    /// Records highlighted across all pages.
    pub fn highlighted(&self) -> usize {
        self.pages.iter().map(PageReport::highlighted).sum()
    }

    /// Records not highlighted across all pages.
    pub fn skipped(&self) -> usize {
        self.pages.iter().map(PageReport::skipped).sum()
    }
}

/// Locates and highlights change records page by page.
#[derive(Debug)]
pub struct PageHighlighter {
    locator: ChangeLocator,
    palette: HighlightPalette,
    opacity: Option<f32>,
}

impl PageHighlighter {
    /// Create a highlighter; fails when `config` does not validate.
    pub fn new(config: LocatorConfig) -> Result<Self> {
        Ok(Self::with_locator(ChangeLocator::new(config)?))
    }

    /// Create a highlighter around an existing locator, using the palette
    /// from its configuration.
    pub fn with_locator(locator: ChangeLocator) -> Self {
        Self {
            palette: locator.config().palette,
            locator,
            opacity: None,
        }
    }

    /// Override the highlight colours.
    pub fn with_palette(mut self, palette: HighlightPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Give every highlight this opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// The locator in use.
    pub fn locator(&self) -> &ChangeLocator {
        &self.locator
    }

    /// Highlight `changes` on one page, in order.
    pub fn process_page<P>(&self, page: &mut P, page_number: usize, changes: &[ChangeRecord]) -> PageReport
    where
        P: PageTextIndex + HighlightTarget,
    {
        let mut committer = HighlightCommitter::new(self.locator.config().key_precision);
        if let Some(opacity) = self.opacity {
            committer = committer.with_opacity(opacity);
        }

        let mut outcomes = Vec::with_capacity(changes.len());
        for (index, change) in changes.iter().enumerate() {
            let (status, correction) = match self.locator.locate(&*page, change) {
                LocateOutcome::Skipped(reason) => (ChangeStatus::Skipped(reason), None),
                LocateOutcome::Located(location) => {
                    let status = match self.palette.color_for(change.kind) {
                        None => ChangeStatus::Skipped(SkipReason::Deletion),
                        Some(color) => {
                            let style = HighlightStyle::new(color)
                                .with_contents(location.literal.as_str())
                                .with_subject(change.kind.as_str());
                            match committer.commit_region(page, &location.region, style) {
                                CommitOutcome::Drawn { rect } => ChangeStatus::Highlighted {
                                    rect,
                                    strategy: location.strategy,
                                    phase: location.phase,
                                },
                                CommitOutcome::AlreadyUsed => ChangeStatus::AlreadyHighlighted {
                                    strategy: location.strategy,
                                },
                                CommitOutcome::DrawFailed => ChangeStatus::AnnotationFailed {
                                    strategy: location.strategy,
                                },
                            }
                        },
                    };
                    (status, location.correction)
                },
            };
            log::debug!("Page {} change {} ({}): {:?}", page_number, index, change.kind, status);
            outcomes.push(ChangeOutcome {
                index,
                kind: change.kind,
                status,
                correction,
            });
        }

        let report = PageReport {
            page_number,
            outcomes,
        };
        log::info!(
            "Page {}: {} of {} changes highlighted, {} skipped",
            page_number,
            report.highlighted(),
            report.processed(),
            report.skipped()
        );
        report
    }

    /// Highlight every page that has change records.
    ///
    /// `pages[i]` is page number `i + 1`. Pages are independent: each starts
    /// with an empty set of used regions.
    pub fn process_document<P>(
        &self,
        pages: &mut [P],
        changes: &BTreeMap<usize, Vec<ChangeRecord>>,
    ) -> HighlightSummary
    where
        P: PageTextIndex + HighlightTarget,
    {
        self.process_pages(pages.iter_mut().enumerate().map(|(i, page)| (i + 1, page)), changes)
    }

    /// Highlight pages identified by their own page numbers.
    ///
    /// Pages need not be contiguous or sorted. When two pages share a number
    /// the first one wins.
    pub fn process_pages<'p, P, I>(&self, pages: I, changes: &BTreeMap<usize, Vec<ChangeRecord>>) -> HighlightSummary
    where
        P: PageTextIndex + HighlightTarget + 'p,
        I: IntoIterator<Item = (usize, &'p mut P)>,
    {
        let mut by_number: BTreeMap<usize, &'p mut P> = BTreeMap::new();
        for (page_number, page) in pages {
            if by_number.contains_key(&page_number) {
                log::warn!("Duplicate page number {}, keeping the first page", page_number);
                continue;
            }
            by_number.insert(page_number, page);
        }

        let mut summary = HighlightSummary::default();
        for (&page_number, records) in changes {
            match by_number.get_mut(&page_number) {
                Some(page) => summary.pages.push(self.process_page(&mut **page, page_number, records)),
                None => {
                    log::warn!(
                        "{} change(s) for page {} but the document has {} page(s)",
                        records.len(),
                        page_number,
                        by_number.len()
                    );
                    summary.missing_pages.push(page_number);
                },
            }
        }
        summary
    }
}
