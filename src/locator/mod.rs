//! Change localization.
//!
//! [`ChangeLocator`] runs an ordered chain of [`LocateStrategy`] values per
//! change kind until one of them yields a region. Each strategy sees the page,
//! the record and the resolved anchor (if any) through a [`LocateContext`] and
//! answers with an [`Attempt`].
//!
//! # Chains
//!
//! - Text added / modified: block search over `search_text`, block search
//!   over `new_value`, anchored snippet search, direct search.
//! - Numeric: replace-in-place next to the old value, anchored search,
//!   section search, position hint, unique occurrence.
//! - Text deleted: never located.
//!
//! Numeric chains never guess: a value found more than once with nothing to
//! disambiguate it is skipped as ambiguous.
//!
//! # Example
//!
//! ```
//! use change_highlight::change::ChangeRecord;
//! use change_highlight::config::LocatorConfig;
//! use change_highlight::locator::{ChangeLocator, LocateOutcome};
//! use change_highlight::page::TextPage;
//!
//! let mut page = TextPage::new(1, 612.0, 792.0);
//! page.push_monospace("Total assets 100,000 150,000", 72.0, 100.0, 6.0, 12.0);
//!
//! let locator = ChangeLocator::new(LocatorConfig::default()).unwrap();
//! let change = ChangeRecord::numeric("100,000", "150,000").with_row_label("Total assets");
//! match locator.locate(&page, &change) {
//!     LocateOutcome::Located(location) => assert_eq!(location.strategy, "in_place"),
//!     LocateOutcome::Skipped(reason) => panic!("skipped: {:?}", reason),
//! }
//! ```

pub mod strategies;

use crate::anchor::{locate_anchor, Anchor};
use crate::block::BlockAssembler;
use crate::candidates::CandidateGenerator;
use crate::change::{ChangeKind, ChangeRecord, Correction};
use crate::config::LocatorConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::page::PageTextIndex;
use serde::Serialize;

/// Search phase a strategy belongs to, and the terminal states of a locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateState {
    /// Nothing tried yet
    Unresolved,
    /// Search scoped by a row label, context or section anchor
    AnchorSearch,
    /// Search for the whole text, chunked or verbatim
    FullTextSearch,
    /// Last-resort search without an anchor
    FallbackSearch,
    /// A region was found
    Located,
    /// No safe region was found
    Skipped,
}

/// Region produced by a strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "rects")]
pub enum Located {
    /// Rectangles forming one logical block, highlighted together
    Block(Vec<Rect>),
    /// Alternative single-rectangle candidates, best first; the first unused
    /// one is highlighted
    Ranked(Vec<Rect>),
}

impl Located {
    /// The rectangles, in the order the strategy produced them.
    pub fn rects(&self) -> &[Rect] {
        match self {
            Self::Block(rects) | Self::Ranked(rects) => rects,
        }
    }

    /// Whether no rectangle was produced.
    pub fn is_empty(&self) -> bool {
        self.rects().is_empty()
    }
}

/// A successful strategy attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyHit {
    /// Where the change is
    pub region: Located,
    /// Literal that matched
    pub literal: String,
    /// Better literal discovered for the record, if any
    pub correction: Option<Correction>,
}

impl StrategyHit {
    /// A hit with no correction.
    pub fn new(region: Located, literal: impl Into<String>) -> Self {
        Self {
            region,
            literal: literal.into(),
            correction: None,
        }
    }

    /// Attach a correction.
    pub fn with_correction(mut self, correction: Option<Correction>) -> Self {
        self.correction = correction;
        self
    }
}

/// Result of one strategy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    /// The strategy located the change
    Found(StrategyHit),
    /// The strategy does not apply or found nothing
    NotFound,
    /// The literal occurs this many times with nothing to tell them apart
    Ambiguous(usize),
}

/// Everything a strategy may consult.
pub struct LocateContext<'a> {
    /// Page being searched
    pub page: &'a dyn PageTextIndex,
    /// Page bounds
    pub bounds: Rect,
    /// Record being located
    pub change: &'a ChangeRecord,
    /// Primary anchor, when one of the record's hints was found
    pub anchor: Option<&'a Anchor>,
    /// Thresholds and weights
    pub config: &'a LocatorConfig,
    /// Variant generator
    pub candidates: &'a CandidateGenerator,
    /// Block verification and chunked search
    pub assembler: &'a BlockAssembler,
}

impl LocateContext<'_> {
    /// The anchor's search region for `margins`, if an anchor was resolved.
    pub fn anchor_region(&self, margins: &crate::geometry::Margins) -> Option<Rect> {
        self.anchor.map(|anchor| anchor.search_region(margins, &self.bounds))
    }
}

/// One step of a locate chain.
pub trait LocateStrategy: Send + Sync {
    /// Try to locate the change.
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt;

    /// Return the name of this strategy for reports and logs.
    fn name(&self) -> &'static str;

    /// Search phase this strategy belongs to.
    fn phase(&self) -> LocateState;
}

/// Why a change was not located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// Deleted text is never drawn
    Deletion,
    /// The record carries nothing to search for
    EmptyValue,
    /// No strategy found a safe region
    NotFound,
    /// The value occurs several times and nothing disambiguates it
    Ambiguous {
        /// Page occurrences of the value
        occurrences: usize,
    },
}

/// A located change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Region to highlight
    pub region: Located,
    /// Strategy that found it
    pub strategy: &'static str,
    /// Phase of that strategy
    pub phase: LocateState,
    /// Literal that matched
    pub literal: String,
    /// Better literal discovered for the record, if any
    pub correction: Option<Correction>,
}

/// Final result of locating one change.
#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    /// A region was found
    Located(Location),
    /// Nothing safe to highlight
    Skipped(SkipReason),
}

impl LocateOutcome {
    /// Terminal state of the locate.
    pub fn state(&self) -> LocateState {
        match self {
            Self::Located(_) => LocateState::Located,
            Self::Skipped(_) => LocateState::Skipped,
        }
    }

    /// The location, if one was found.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Located(location) => Some(location),
            Self::Skipped(_) => None,
        }
    }
}

/// Locates changes on a page through per-kind strategy chains.
pub struct ChangeLocator {
    config: LocatorConfig,
    candidates: CandidateGenerator,
    assembler: BlockAssembler,
    text_chain: Vec<Box<dyn LocateStrategy>>,
    numeric_chain: Vec<Box<dyn LocateStrategy>>,
}

impl std::fmt::Debug for ChangeLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeLocator")
            .field("config", &self.config)
            .field("text_chain", &self.text_chain.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("numeric_chain", &self.numeric_chain.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl ChangeLocator {
    /// Create a locator with the standard chains.
    ///
    /// Fails when `config` does not validate.
    pub fn new(config: LocatorConfig) -> Result<Self> {
        Self::with_chains(config, strategies::text_chain(), strategies::numeric_chain())
    }

    /// Create a locator with custom chains.
    pub fn with_chains(
        config: LocatorConfig,
        text_chain: Vec<Box<dyn LocateStrategy>>,
        numeric_chain: Vec<Box<dyn LocateStrategy>>,
    ) -> Result<Self> {
        config.validate()?;
        let candidates = CandidateGenerator::new(&config.watermark_letters)?;
        let assembler = BlockAssembler::new(&config);
        Ok(Self {
            config,
            candidates,
            assembler,
            text_chain,
            numeric_chain,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Names of the strategies tried for `kind`, in order.
    pub fn strategy_names(&self, kind: ChangeKind) -> Vec<&'static str> {
        self.chain(kind).iter().map(|s| s.name()).collect()
    }

    fn chain(&self, kind: ChangeKind) -> &[Box<dyn LocateStrategy>] {
        match kind {
            ChangeKind::Numeric => &self.numeric_chain,
            ChangeKind::TextAdded | ChangeKind::TextModified => &self.text_chain,
            ChangeKind::TextDeleted => &[],
        }
    }

    /// Locate `change` on `page`.
    pub fn locate(&self, page: &dyn PageTextIndex, change: &ChangeRecord) -> LocateOutcome {
        if change.kind == ChangeKind::TextDeleted {
            log::debug!("Skipping deletion {:?}", change.old_value);
            return LocateOutcome::Skipped(SkipReason::Deletion);
        }
        if change.effective_search_text().is_empty() {
            return LocateOutcome::Skipped(SkipReason::EmptyValue);
        }

        let anchor = locate_anchor(page, change);
        let ctx = LocateContext {
            page,
            bounds: page.bounds(),
            change,
            anchor: anchor.as_ref(),
            config: &self.config,
            candidates: &self.candidates,
            assembler: &self.assembler,
        };

        let mut ambiguous: Option<usize> = None;
        for strategy in self.chain(change.kind) {
            match strategy.attempt(&ctx) {
                Attempt::Found(hit) => {
                    let Some(region) = self.settle(hit.region) else {
                        continue;
                    };
                    log::debug!(
                        "{} {:?} located by {} ({:?}): {} rect(s)",
                        change.kind,
                        hit.literal,
                        strategy.name(),
                        strategy.phase(),
                        region.rects().len()
                    );
                    if let Some(correction) = &hit.correction {
                        log::info!(
                            "Correction for {} change: {:?} {:?} -> {:?} (via {})",
                            change.kind,
                            correction.field,
                            correction.original,
                            correction.resolved,
                            correction.strategy
                        );
                    }
                    return LocateOutcome::Located(Location {
                        region,
                        strategy: strategy.name(),
                        phase: strategy.phase(),
                        literal: hit.literal,
                        correction: hit.correction,
                    });
                },
                Attempt::Ambiguous(count) => {
                    log::debug!("{}: {} occurrences, refusing to guess", strategy.name(), count);
                    ambiguous = Some(ambiguous.map_or(count, |prev| prev.max(count)));
                },
                Attempt::NotFound => {
                    log::debug!("{}: nothing for {:?}", strategy.name(), change.effective_search_text());
                },
            }
        }

        let reason = match ambiguous {
            Some(occurrences) => SkipReason::Ambiguous { occurrences },
            None => SkipReason::NotFound,
        };
        log::debug!("{} change {:?} skipped: {:?}", change.kind, change.effective_search_text(), reason);
        LocateOutcome::Skipped(reason)
    }

    /// Re-verify multi-rect blocks; drop empty regions.
    ///
    /// A block that fails verification keeps only its first rectangle, which
    /// strategies put first because it is their best match.
    fn settle(&self, region: Located) -> Option<Located> {
        match region {
            Located::Block(rects) if rects.len() > 1 => {
                let block = match self.assembler.verify_consecutive(&rects) {
                    Some(block) => block,
                    None => vec![rects[0]],
                };
                Some(Located::Block(block))
            },
            region if region.is_empty() => None,
            region => Some(region),
        }
    }
}
