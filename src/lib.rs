// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::unnecessary_map_or)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Change Highlight
//!
//! Locates abstractly described content changes on a rendered page and
//! highlights them without ever highlighting the same region twice.
//!
//! A change arrives as an old/new value pair plus noisy hints (row label,
//! surrounding text, section, position hint) produced by an upstream
//! comparison stage. The engine reconciles those hints with the page's literal
//! text layout using nothing but exact substring search.
//!
//! ## Core Features
//!
//! - **Candidate generation**: noisy values become ordered search literals
//!   (exact, watermark-cleaned, numeric runs, word anchors)
//! - **Context anchors**: row labels and preceding text scope every search
//! - **Block assembly**: multi-line paragraphs from overlapping word chunks,
//!   verified to be consecutive lines of one column
//! - **Strategy chains**: per change kind, tried in order until one is safe;
//!   ambiguous numbers are skipped, never guessed
//! - **Highlight commit**: used-region bookkeeping per page, merged
//!   rectangles across line breaks, non-fatal draw failures
//!
//! ## Architecture
//!
//! ```text
//! ChangeRecord ─► ChangeLocator ─┬─► CandidateGenerator
//!                                ├─► ContextAnchor (anchor)
//!                                ├─► PageTextIndex::search
//!                                └─► BlockAssembler
//!                       │
//!                       ▼
//!               HighlightCommitter ─► HighlightTarget::add_highlight
//! ```
//!
//! The document layer is consumed through two traits,
//! [`PageTextIndex`](page::PageTextIndex) and
//! [`HighlightTarget`](page::HighlightTarget). [`TextPage`](page::TextPage)
//! implements both over positioned text lines.
//!
//! ## Quick Start
//!
//! ```
//! use change_highlight::change::ChangeRecord;
//! use change_highlight::config::LocatorConfig;
//! use change_highlight::highlighter::PageHighlighter;
//! use change_highlight::page::TextPage;
//!
//! # fn main() -> change_highlight::Result<()> {
//! let mut page = TextPage::new(1, 612.0, 792.0);
//! page.push_monospace("Net assets 150,000 120,000", 72.0, 100.0, 6.0, 12.0);
//! page.push_monospace("Total assets 100,000 150,000", 72.0, 120.0, 6.0, 12.0);
//!
//! let highlighter = PageHighlighter::new(LocatorConfig::default())?;
//! let change = ChangeRecord::numeric("100,000", "150,000").with_row_label("Total assets");
//! let report = highlighter.process_page(&mut page, 1, &[change]);
//!
//! assert_eq!(report.highlighted(), 1);
//! assert_eq!(page.annotations()[0].rect.top(), 120.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry and page capabilities
pub mod geometry;
pub mod page;

// Change records
pub mod change;

// Localization
pub mod anchor;
pub mod block;
pub mod candidates;
pub mod locator;

// Highlighting
pub mod annotation;
pub mod commit;
pub mod highlighter;

pub use change::{load_page_changes, ChangeKind, ChangeRecord};
pub use config::LocatorConfig;
pub use error::{Error, Result};
pub use highlighter::{HighlightSummary, PageHighlighter, PageReport};
pub use locator::{ChangeLocator, LocateOutcome};
pub use page::{HighlightTarget, PageTextIndex, TextPage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
