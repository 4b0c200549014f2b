//! Configuration for change localization.
//!
//! All thresholds, margins and scoring weights used by the engine live here as
//! named values. Defaults reproduce the reference highlighting behaviour; a
//! partial JSON document overrides individual fields.

use crate::annotation::HighlightPalette;
use crate::error::{Error, Result};
use crate::geometry::Margins;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Change localization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Maximum vertical gap between consecutive lines of one block.
    pub max_line_gap: f32,

    /// Maximum left-edge offset for lines of one block that do not overlap.
    pub horizontal_proximity: f32,

    /// Search region around a context anchor for direct searches.
    pub anchor_margins: Margins,

    /// Search region around a context anchor for chunked block searches.
    pub block_margins: Margins,

    /// Search region around a section heading for numeric changes.
    pub section_margins: Margins,

    /// Box around an old numeric value in which its replacement is expected.
    pub in_place_margins: Margins,

    /// Words per chunk in chunked block search.
    pub chunk_words: usize,

    /// Words between chunk starts in chunked block search.
    pub chunk_stride: usize,

    /// Minimum word count before chunked block search is attempted.
    pub min_chunk_words: usize,

    /// Matches scoring within this window of the best match are kept.
    pub score_tolerance: f32,

    /// Score per character of the matched snippet.
    pub length_weight: f32,

    /// Penalty per unit of vertical distance from the anchor.
    pub vertical_weight: f32,

    /// Shortest snippet tried during anchored text search.
    pub min_snippet_chars: usize,

    /// Longest literal used by the unanchored direct text search.
    pub max_direct_chars: usize,

    /// Shortest numeric literal accepted on uniqueness alone.
    pub min_unique_chars: usize,

    /// Decimal places kept in used-region position keys.
    pub key_precision: u32,

    /// Stray single letters left in extracted text by page watermarks.
    pub watermark_letters: String,

    /// Highlight colours.
    pub palette: HighlightPalette,

    /// Accept a unique numeric occurrence when context hints exist but none
    /// of them could be found on the page.
    pub unique_fallback_with_unresolved_context: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LocatorConfig {
    /// Create configuration with the reference defaults.
    pub fn new() -> Self {
        Self {
            max_line_gap: 50.0,
            horizontal_proximity: 200.0,
            anchor_margins: Margins::new(200.0, 50.0, 1000.0, 600.0),
            block_margins: Margins::new(200.0, 50.0, 1200.0, 1000.0),
            section_margins: Margins::new(200.0, 50.0, 500.0, 200.0),
            in_place_margins: Margins::new(50.0, 10.0, 50.0, 10.0),
            chunk_words: 7,
            chunk_stride: 3,
            min_chunk_words: 5,
            score_tolerance: 100.0,
            length_weight: 10.0,
            vertical_weight: 10.0,
            min_snippet_chars: 3,
            max_direct_chars: 1000,
            min_unique_chars: 3,
            key_precision: 2,
            watermark_letters: "TFARD".to_string(),
            palette: HighlightPalette::default(),
            unique_fallback_with_unresolved_context: false,
        }
    }

    /// Set the block line-gap threshold.
    pub fn with_max_line_gap(mut self, gap: f32) -> Self {
        self.max_line_gap = gap;
        self
    }

    /// Set the block left-edge proximity threshold.
    pub fn with_horizontal_proximity(mut self, proximity: f32) -> Self {
        self.horizontal_proximity = proximity;
        self
    }

    /// Set the chunk size and stride for block search.
    pub fn with_chunking(mut self, words: usize, stride: usize) -> Self {
        self.chunk_words = words;
        self.chunk_stride = stride;
        self
    }

    /// Set the tie window for scored matches.
    pub fn with_score_tolerance(mut self, tolerance: f32) -> Self {
        self.score_tolerance = tolerance;
        self
    }

    /// Set the watermark alphabet (empty disables cleaning).
    pub fn with_watermark_letters(mut self, letters: impl Into<String>) -> Self {
        self.watermark_letters = letters.into();
        self
    }

    /// Set the highlight colours.
    pub fn with_palette(mut self, palette: HighlightPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Allow unique numeric occurrences when context hints cannot be found.
    pub fn with_unique_fallback_with_unresolved_context(mut self, enable: bool) -> Self {
        self.unique_fallback_with_unresolved_context = enable;
        self
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_line_gap", self.max_line_gap),
            ("horizontal_proximity", self.horizontal_proximity),
            ("length_weight", self.length_weight),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(self.score_tolerance.is_finite() && self.score_tolerance >= 0.0) {
            return Err(Error::InvalidConfig("score_tolerance must be non-negative".to_string()));
        }
        if !(self.vertical_weight.is_finite() && self.vertical_weight >= 0.0) {
            return Err(Error::InvalidConfig("vertical_weight must be non-negative".to_string()));
        }
        for (name, margins) in [
            ("anchor_margins", &self.anchor_margins),
            ("block_margins", &self.block_margins),
            ("section_margins", &self.section_margins),
            ("in_place_margins", &self.in_place_margins),
        ] {
            if !margins.is_valid() {
                return Err(Error::InvalidConfig(format!("{} must be finite and non-negative", name)));
            }
        }
        if self.chunk_words == 0 || self.chunk_stride == 0 {
            return Err(Error::InvalidConfig("chunk_words and chunk_stride must be positive".to_string()));
        }
        if self.chunk_stride > self.chunk_words {
            return Err(Error::InvalidConfig(format!(
                "chunk_stride ({}) larger than chunk_words ({}) leaves gaps between chunks",
                self.chunk_stride, self.chunk_words
            )));
        }
        if self.max_direct_chars == 0 {
            return Err(Error::InvalidConfig("max_direct_chars must be positive".to_string()));
        }
        if self.key_precision > 6 {
            return Err(Error::InvalidConfig("key_precision above 6 decimals is meaningless for f32".to_string()));
        }
        if !self.watermark_letters.chars().all(|c| c.is_alphabetic()) {
            return Err(Error::InvalidConfig("watermark_letters must be letters".to_string()));
        }
        if !(self.palette.added.is_valid() && self.palette.modified.is_valid()) {
            return Err(Error::InvalidConfig("palette components must lie in 0.0..=1.0".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields keep defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::config::LocatorConfig;
    ///
    /// let config = LocatorConfig::from_json_str(r#"{"max_line_gap": 30.0}"#).unwrap();
    /// assert_eq!(config.max_line_gap, 30.0);
    /// assert_eq!(config.chunk_words, 7);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
