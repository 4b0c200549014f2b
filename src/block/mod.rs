//! Block assembly for multi-line text.
//!
//! A single search call rarely returns a whole paragraph: extracted text
//! breaks at line ends, hyphenation and page furniture. [`BlockAssembler`]
//! builds a block from many small hits instead. It searches overlapping word
//! chunks of the paragraph and keeps the hits that line up as consecutive
//! lines of one column.
//!
//! # Block rule
//!
//! Hits are sorted in reading order. Each hit joins the block when it starts
//! less than `max_line_gap` below the current line and either overlaps that
//! line horizontally or starts within `horizontal_proximity` of its left
//! edge. Hits on the same line as the current line widen it. The first hit
//! that fails truncates the block; a truncated block is kept only when at
//! least two hits were accepted.

use crate::candidates::normalize_whitespace;
use crate::config::LocatorConfig;
use crate::geometry::{PositionKey, Rect};
use crate::page::PageTextIndex;
use indexmap::IndexMap;

/// Verifies and assembles multi-line text blocks.
#[derive(Debug, Clone)]
pub struct BlockAssembler {
    max_line_gap: f32,
    horizontal_proximity: f32,
    chunk_words: usize,
    chunk_stride: usize,
    min_chunk_words: usize,
    key_precision: u32,
}

impl Default for BlockAssembler {
    fn default() -> Self {
        Self::new(&LocatorConfig::default())
    }
}

impl BlockAssembler {
    /// Create an assembler with the thresholds from `config`.
    pub fn new(config: &LocatorConfig) -> Self {
        Self {
            max_line_gap: config.max_line_gap,
            horizontal_proximity: config.horizontal_proximity,
            chunk_words: config.chunk_words,
            chunk_stride: config.chunk_stride,
            min_chunk_words: config.min_chunk_words,
            key_precision: config.key_precision,
        }
    }

    /// Keep the longest consecutive run of `quads` from the first one on.
    ///
    /// Returns `None` for empty input or when the second quad already breaks
    /// the block. A single quad is trivially consecutive.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::block::BlockAssembler;
    /// use change_highlight::geometry::Rect;
    ///
    /// let assembler = BlockAssembler::default();
    /// let quads = [
    ///     Rect::from_points(72.0, 100.0, 500.0, 112.0),
    ///     Rect::from_points(72.0, 114.0, 300.0, 126.0),
    ///     Rect::from_points(72.0, 600.0, 200.0, 612.0),
    /// ];
    /// let block = assembler.verify_consecutive(&quads).unwrap();
    /// assert_eq!(block.len(), 2);
    /// ```
    pub fn verify_consecutive(&self, quads: &[Rect]) -> Option<Vec<Rect>> {
        let mut sorted = quads.to_vec();
        sorted.sort_by(Rect::reading_order);

        let (first, rest) = sorted.split_first()?;
        let mut accepted = vec![*first];
        let mut line = *first;

        for quad in rest {
            let gap = quad.top() - line.bottom();
            let same_line = quad.top() < line.bottom();
            let aligned = quad.overlaps_horizontally(&line)
                || (quad.left() - line.left()).abs() < self.horizontal_proximity;

            if gap < self.max_line_gap && aligned {
                accepted.push(*quad);
                line = if same_line { line.union(quad) } else { *quad };
            } else {
                log::debug!(
                    "Block broken at {:?} (gap {:.1}, aligned {}), {} quads accepted",
                    quad,
                    gap,
                    aligned,
                    accepted.len()
                );
                return (accepted.len() >= 2).then_some(accepted);
            }
        }

        Some(accepted)
    }

    /// Overlapping word chunks searched for `text`.
    ///
    /// Chunks are `chunk_words` long and start every `chunk_stride` words; a
    /// last chunk always ends at the final word. Texts shorter than one chunk
    /// but at least `min_chunk_words` long form a single chunk. Shorter texts
    /// produce no chunks.
    pub fn chunks(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();
        let n = words.len();
        if n < self.min_chunk_words || n == 0 {
            return Vec::new();
        }
        if n <= self.chunk_words {
            return vec![words.join(" ")];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        while start + self.chunk_words <= n {
            chunks.push(words[start..start + self.chunk_words].join(" "));
            start += self.chunk_stride;
        }
        let last_start = start - self.chunk_stride;
        if last_start + self.chunk_words < n {
            chunks.push(words[n - self.chunk_words..].join(" "));
        }
        chunks
    }

    /// Locate a long text as a block of chunk hits.
    ///
    /// Hits outside `region` (when given) are dropped, hits sharing a rounded
    /// position are merged, and the rest go through
    /// [`verify_consecutive`](Self::verify_consecutive).
    pub fn find_block_by_chunking<P: PageTextIndex + ?Sized>(
        &self,
        page: &P,
        text: &str,
        region: Option<&Rect>,
    ) -> Option<Vec<Rect>> {
        let chunks = self.chunks(text);
        if chunks.is_empty() {
            return None;
        }

        let mut hits: IndexMap<PositionKey, Rect> = IndexMap::new();
        for chunk in &chunks {
            for rect in page.search(chunk) {
                if region.map_or(true, |region| rect.intersects(region)) {
                    hits.entry(rect.position_key(self.key_precision))
                        .and_modify(|existing| *existing = existing.union(&rect))
                        .or_insert(rect);
                }
            }
        }

        log::debug!("Chunk search: {} chunks, {} distinct hits", chunks.len(), hits.len());
        if hits.is_empty() {
            return None;
        }

        let quads: Vec<Rect> = hits.into_values().collect();
        self.verify_consecutive(&quads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::TextPage;

    #[test]
    fn test_verify_empty_and_single() {
        let assembler = BlockAssembler::default();
        assert!(assembler.verify_consecutive(&[]).is_none());
        let one = [Rect::new(72.0, 100.0, 50.0, 12.0)];
        assert_eq!(assembler.verify_consecutive(&one), Some(one.to_vec()));
    }

    #[test]
    fn test_verify_sorts_input() {
        let assembler = BlockAssembler::default();
        let quads = [
            Rect::from_points(72.0, 114.0, 300.0, 126.0),
            Rect::from_points(72.0, 100.0, 500.0, 112.0),
        ];
        let block = assembler.verify_consecutive(&quads).unwrap();
        assert_eq!(block[0].top(), 100.0);
        assert_eq!(block[1].top(), 114.0);
    }

    #[test]
    fn test_verify_rejects_when_second_quad_breaks() {
        let assembler = BlockAssembler::default();
        let quads = [
            Rect::from_points(72.0, 100.0, 200.0, 112.0),
            Rect::from_points(72.0, 400.0, 200.0, 412.0),
            Rect::from_points(72.0, 414.0, 200.0, 426.0),
        ];
        assert!(assembler.verify_consecutive(&quads).is_none());
    }

    #[test]
    fn test_verify_rejects_distant_column() {
        let assembler = BlockAssembler::default();
        let quads = [
            Rect::from_points(40.0, 100.0, 250.0, 112.0),
            Rect::from_points(500.0, 114.0, 580.0, 126.0),
        ];
        assert!(assembler.verify_consecutive(&quads).is_none());
    }

    #[test]
    fn test_verify_accepts_indented_continuation() {
        let assembler = BlockAssembler::default();
        let quads = [
            Rect::from_points(72.0, 100.0, 150.0, 112.0),
            Rect::from_points(200.0, 114.0, 300.0, 126.0),
        ];
        assert_eq!(assembler.verify_consecutive(&quads).map(|b| b.len()), Some(2));
    }

    #[test]
    fn test_verify_merges_same_line_hits() {
        let assembler = BlockAssembler::default();
        let quads = [
            Rect::from_points(72.0, 100.0, 250.0, 112.0),
            Rect::from_points(180.0, 100.0, 400.0, 112.0),
            Rect::from_points(72.0, 114.0, 120.0, 126.0),
        ];
        assert_eq!(assembler.verify_consecutive(&quads).map(|b| b.len()), Some(3));
    }

    #[test]
    fn test_chunks_cover_every_word() {
        let assembler = BlockAssembler::default();
        let text = "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10 w11";
        let chunks = assembler.chunks(text);
        assert_eq!(
            chunks,
            vec![
                "w1 w2 w3 w4 w5 w6 w7",
                "w4 w5 w6 w7 w8 w9 w10",
                "w5 w6 w7 w8 w9 w10 w11",
            ]
        );
    }

    #[test]
    fn test_chunks_without_trailing_chunk() {
        let assembler = BlockAssembler::default();
        let chunks = assembler.chunks("a b c d e f g h i j");
        assert_eq!(chunks, vec!["a b c d e f g", "d e f g h i j"]);
    }

    #[test]
    fn test_chunks_short_texts() {
        let assembler = BlockAssembler::default();
        assert!(assembler.chunks("too short here").is_empty());
        assert_eq!(assembler.chunks("one two three four five"), vec!["one two three four five"]);
    }

    #[test]
    fn test_find_block_two_lines() {
        let mut page = TextPage::new(1, 612.0, 792.0);
        page.push_monospace("The directors consider that the company has adequate", 72.0, 100.0, 5.0, 12.0);
        page.push_monospace("resources to continue in operation for the foreseeable future.", 72.0, 114.0, 5.0, 12.0);

        let assembler = BlockAssembler::default();
        let text = "The directors consider that the company has adequate resources \
                    to continue in operation for the foreseeable future.";
        let block = assembler.find_block_by_chunking(&page, text, None).unwrap();

        let merged = Rect::union_all(&block).unwrap();
        assert_eq!(merged.top(), 100.0);
        assert_eq!(merged.bottom(), 126.0);
        assert!(block.iter().any(|r| r.top() == 114.0));
    }

    #[test]
    fn test_find_block_respects_region() {
        let mut page = TextPage::new(1, 612.0, 792.0);
        page.push_monospace("one two three four five six seven", 72.0, 100.0, 5.0, 12.0);

        let assembler = BlockAssembler::default();
        let far = Rect::from_points(0.0, 500.0, 612.0, 792.0);
        assert!(assembler
            .find_block_by_chunking(&page, "one two three four five six seven", Some(&far))
            .is_none());
        assert!(assembler
            .find_block_by_chunking(&page, "one two three four five six seven", None)
            .is_some());
    }
}
