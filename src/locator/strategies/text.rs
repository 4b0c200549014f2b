//! Strategies for added and modified text.

use super::{proximity_score, search_occurrences_within};
use crate::candidates::{first_sentence, first_words, normalize_whitespace, truncate_chars};
use crate::change::{CorrectedField, Correction};
use crate::locator::{Attempt, LocateContext, LocateState, LocateStrategy, Located, StrategyHit};
use crate::geometry::{PositionKey, Rect};
use indexmap::IndexMap;

/// Chunked block search over the record's search text.
///
/// When an anchor resolved, hits must fall inside its block search region.
pub struct SearchTextBlock;

impl LocateStrategy for SearchTextBlock {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let text = ctx.change.effective_search_text();
        let region = ctx.anchor_region(&ctx.config.block_margins);
        match ctx
            .assembler
            .find_block_by_chunking(ctx.page, text, region.as_ref())
        {
            Some(block) => Attempt::Found(StrategyHit::new(Located::Block(block), text)),
            None => Attempt::NotFound,
        }
    }

    fn name(&self) -> &'static str {
        "search_text_block"
    }

    fn phase(&self) -> LocateState {
        LocateState::FullTextSearch
    }
}

/// Chunked block search over the new value.
///
/// Covers records whose search text is a stale or truncated copy of the new
/// value. A hit carries a correction of the search text.
pub struct NewValueBlock;

impl LocateStrategy for NewValueBlock {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let new_value = normalize_whitespace(&ctx.change.new_value);
        if new_value.is_empty() || new_value == normalize_whitespace(ctx.change.effective_search_text()) {
            return Attempt::NotFound;
        }

        let region = ctx.anchor_region(&ctx.config.block_margins);
        let Some(block) = ctx
            .assembler
            .find_block_by_chunking(ctx.page, &new_value, region.as_ref())
        else {
            return Attempt::NotFound;
        };

        let search_text = ctx.change.search_text.trim();
        let correction = (!search_text.is_empty()).then(|| Correction {
            field: CorrectedField::SearchText,
            original: search_text.to_string(),
            resolved: new_value.clone(),
            strategy: self.name(),
        });
        Attempt::Found(StrategyHit::new(Located::Block(block), new_value).with_correction(correction))
    }

    fn name(&self) -> &'static str {
        "new_value_block"
    }

    fn phase(&self) -> LocateState {
        LocateState::FullTextSearch
    }
}

/// Snippets of the text searched near the anchor.
///
/// Snippets are the text itself, its watermark-cleaned form, the new value,
/// the first sentence, the first 150 (or 100) characters and the first 7, 5
/// and 3 words. Every occurrence starting inside the anchor's search region
/// is scored by its first line with [`proximity_score`]; the best one and
/// every occurrence within `score_tolerance` of it are returned, best first,
/// each with the lines it wraps onto. When those occurrences do not form one
/// block, only the best occurrence is returned.
pub struct AnchoredSnippet;

impl AnchoredSnippet {
    fn snippets(ctx: &LocateContext<'_>) -> (Vec<String>, Option<String>) {
        let text = normalize_whitespace(ctx.change.effective_search_text());
        let new_value = normalize_whitespace(&ctx.change.new_value);
        let cleaned = ctx.candidates.clean(&text);

        let mut snippets = vec![text.clone()];
        snippets.extend(cleaned.clone());
        if !new_value.is_empty() && new_value != text {
            snippets.push(new_value.clone());
        }
        snippets.extend(first_sentence(&text));
        let chars = text.chars().count();
        if chars > 150 {
            snippets.push(truncate_chars(&text, 150).to_string());
        } else if chars > 100 {
            snippets.push(truncate_chars(&text, 100).to_string());
        }
        for n in [7, 5, 3] {
            snippets.extend(first_words(&text, n));
        }
        if !new_value.is_empty() && new_value != text {
            for n in [5, 3] {
                snippets.extend(first_words(&new_value, n));
            }
        }

        let mut unique: Vec<String> = Vec::with_capacity(snippets.len());
        for snippet in snippets {
            if snippet.chars().count() >= ctx.config.min_snippet_chars && !unique.contains(&snippet) {
                unique.push(snippet);
            }
        }
        (unique, cleaned)
    }
}

impl LocateStrategy for AnchoredSnippet {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let Some(anchor) = ctx.anchor else {
            return Attempt::NotFound;
        };
        let region = anchor.search_region(&ctx.config.anchor_margins, &ctx.bounds);
        let (snippets, cleaned) = Self::snippets(ctx);

        // Best score per position; longer snippets at the same spot win.
        // An occurrence is scored by its first line and keeps its wrapped lines.
        let mut best: IndexMap<PositionKey, (Vec<Rect>, f32, &str)> = IndexMap::new();
        for snippet in &snippets {
            for occurrence in search_occurrences_within(ctx.page, snippet, &region) {
                let first = occurrence[0];
                let score = proximity_score(ctx.config, &first, &anchor.rect, snippet);
                let key = first.position_key(ctx.config.key_precision);
                let better = best.get(&key).map_or(true, |(_, existing, _)| score > *existing);
                if better {
                    best.insert(key, (occurrence, score, snippet.as_str()));
                }
            }
        }

        let Some(top) = best.values().map(|(_, score, _)| *score).reduce(f32::max) else {
            return Attempt::NotFound;
        };
        let floor = top - ctx.config.score_tolerance;
        let literal = best
            .values()
            .find(|(_, score, _)| *score == top)
            .map(|(_, _, snippet)| snippet.to_string())
            .unwrap_or_default();

        let mut scored: Vec<(&[Rect], f32)> = best
            .values()
            .filter(|(_, score, _)| *score >= floor)
            .map(|(rects, score, _)| (rects.as_slice(), *score))
            .collect();
        scored.sort_by(|(ra, a), (rb, b)| b.total_cmp(a).then_with(|| Rect::reading_order(&ra[0], &rb[0])));

        let mut rects: Vec<Rect> = scored.iter().flat_map(|(rects, _)| rects.iter().copied()).collect();
        if scored.len() > 1 && ctx.assembler.verify_consecutive(&rects).is_none() {
            rects = scored[0].0.to_vec();
        }

        let search_text = ctx.change.search_text.trim();
        let correction = match &cleaned {
            Some(cleaned) if *cleaned == literal && !search_text.is_empty() => Some(Correction {
                field: CorrectedField::SearchText,
                original: search_text.to_string(),
                resolved: cleaned.clone(),
                strategy: self.name(),
            }),
            _ => None,
        };

        Attempt::Found(StrategyHit::new(Located::Block(rects), literal).with_correction(correction))
    }

    fn name(&self) -> &'static str {
        "anchored_snippet"
    }

    fn phase(&self) -> LocateState {
        LocateState::AnchorSearch
    }
}

/// Verbatim search of the whitespace-normalized text, truncated to
/// `max_direct_chars`, anywhere on the page.
pub struct DirectText;

impl LocateStrategy for DirectText {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let text = normalize_whitespace(ctx.change.effective_search_text());
        let literal = truncate_chars(&text, ctx.config.max_direct_chars);
        let rects = ctx.page.search(literal);
        if rects.is_empty() {
            Attempt::NotFound
        } else {
            Attempt::Found(StrategyHit::new(Located::Block(rects), literal))
        }
    }

    fn name(&self) -> &'static str {
        "direct_text"
    }

    fn phase(&self) -> LocateState {
        LocateState::FallbackSearch
    }
}
