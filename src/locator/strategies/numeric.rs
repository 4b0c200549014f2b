//! Strategies for numeric changes.
//!
//! Numbers repeat all over financial statements, so every strategy here
//! either scopes the search with an anchor or proves the match is
//! unambiguous. Anchored strategies return every candidate ranked by
//! [`proximity_score`]; the committer takes the best unused one.

use super::{proximity_score, rank, search_within};
use crate::anchor::locate_section;
use crate::change::{CorrectedField, Correction};
use crate::geometry::Rect;
use crate::locator::{Attempt, LocateContext, LocateState, LocateStrategy, Located, StrategyHit};

/// Search literals for a numeric value: the trimmed value, then its
/// digit-bearing variants (all variants when none carries a digit).
fn value_variants(ctx: &LocateContext<'_>, value: &str, variants: &mut Vec<String>) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    push_unique(variants, value.to_string());

    let generated = ctx.candidates.generate(value);
    let has_digits = generated.iter().any(|v| v.chars().any(|c| c.is_ascii_digit()));
    for variant in generated {
        if !has_digits || variant.chars().any(|c| c.is_ascii_digit()) {
            push_unique(variants, variant);
        }
    }
}

fn push_unique(variants: &mut Vec<String>, variant: String) {
    if !variants.contains(&variant) {
        variants.push(variant);
    }
}

/// Variants of the record's search text followed by those of its new value.
fn new_variants(ctx: &LocateContext<'_>) -> Vec<String> {
    let mut variants = Vec::new();
    value_variants(ctx, ctx.change.effective_search_text(), &mut variants);
    value_variants(ctx, &ctx.change.new_value, &mut variants);
    variants
}

/// Occurrences of the first variant found inside `region`, best first.
fn ranked_in_region(
    ctx: &LocateContext<'_>,
    variants: &[String],
    region: &Rect,
    reference: &Rect,
) -> Option<(String, Vec<Rect>)> {
    variants.iter().find_map(|variant| {
        let rects = search_within(ctx.page, variant, region);
        if rects.is_empty() {
            return None;
        }
        let mut scored: Vec<(Rect, f32)> = rects
            .into_iter()
            .map(|rect| (rect, proximity_score(ctx.config, &rect, reference, variant)))
            .collect();
        rank(&mut scored);
        Some((variant.clone(), scored.into_iter().map(|(rect, _)| rect).collect()))
    })
}

/// A correction when the matching literal differs from the record's search
/// text.
fn correction(ctx: &LocateContext<'_>, literal: &str, strategy: &'static str) -> Option<Correction> {
    let search_text = ctx.change.search_text.trim();
    (!search_text.is_empty() && search_text != literal).then(|| Correction {
        field: CorrectedField::SearchText,
        original: search_text.to_string(),
        resolved: literal.to_string(),
        strategy,
    })
}

fn ranked_hit(ctx: &LocateContext<'_>, literal: String, rects: Vec<Rect>, strategy: &'static str) -> Attempt {
    let correction = correction(ctx, &literal, strategy);
    Attempt::Found(StrategyHit::new(Located::Ranked(rects), literal).with_correction(correction))
}

/// The new value inside a small box around the old value.
///
/// The old value is located near the anchor first. Handles statements where
/// the new figure sits in the cell next to (or in place of) the old one.
pub struct InPlace;

impl LocateStrategy for InPlace {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        if !ctx.change.has_meaningful_old_value() {
            return Attempt::NotFound;
        }
        let Some(anchor) = ctx.anchor else {
            return Attempt::NotFound;
        };

        let region = anchor.search_region(&ctx.config.anchor_margins, &ctx.bounds);
        let mut old_variants = Vec::new();
        value_variants(ctx, &ctx.change.old_value, &mut old_variants);
        let Some((old_literal, old_rects)) = ranked_in_region(ctx, &old_variants, &region, &anchor.rect) else {
            return Attempt::NotFound;
        };
        let old_rect = old_rects[0];
        log::debug!("Old value {:?} at {:?}", old_literal, old_rect);

        let cell = old_rect
            .expand(&ctx.config.in_place_margins)
            .clamp_to(&ctx.bounds);
        match ranked_in_region(ctx, &new_variants(ctx), &cell, &old_rect) {
            Some((literal, rects)) => ranked_hit(ctx, literal, rects, self.name()),
            None => Attempt::NotFound,
        }
    }

    fn name(&self) -> &'static str {
        "in_place"
    }

    fn phase(&self) -> LocateState {
        LocateState::AnchorSearch
    }
}

/// The new value inside the anchor's search region.
pub struct AnchoredValue;

impl LocateStrategy for AnchoredValue {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let Some(anchor) = ctx.anchor else {
            return Attempt::NotFound;
        };
        let region = anchor.search_region(&ctx.config.anchor_margins, &ctx.bounds);
        match ranked_in_region(ctx, &new_variants(ctx), &region, &anchor.rect) {
            Some((literal, rects)) => ranked_hit(ctx, literal, rects, self.name()),
            None => Attempt::NotFound,
        }
    }

    fn name(&self) -> &'static str {
        "anchored_value"
    }

    fn phase(&self) -> LocateState {
        LocateState::AnchorSearch
    }
}

/// The new value below the record's section heading.
pub struct SectionAnchored;

impl LocateStrategy for SectionAnchored {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let Some(section) = locate_section(ctx.page, ctx.change) else {
            return Attempt::NotFound;
        };
        let region = section.search_region(&ctx.config.section_margins, &ctx.bounds);
        match ranked_in_region(ctx, &new_variants(ctx), &region, &section.rect) {
            Some((literal, rects)) => ranked_hit(ctx, literal, rects, self.name()),
            None => Attempt::NotFound,
        }
    }

    fn name(&self) -> &'static str {
        "section"
    }

    fn phase(&self) -> LocateState {
        LocateState::AnchorSearch
    }
}

/// The occurrence named by an ordinal position hint, counted in reading
/// order over the whole page.
pub struct PositionalHint;

impl LocateStrategy for PositionalHint {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let hint = ctx.change.position();
        if !hint.is_positional() {
            return Attempt::NotFound;
        }

        for variant in new_variants(ctx) {
            let mut rects = ctx.page.search(&variant);
            if rects.is_empty() {
                continue;
            }
            rects.sort_by(Rect::reading_order);
            return match hint.select(rects.len()) {
                Some(index) => ranked_hit(ctx, variant, vec![rects[index]], self.name()),
                None => {
                    log::debug!("Position hint {:?} out of range for {} occurrences", hint, rects.len());
                    Attempt::NotFound
                },
            };
        }
        Attempt::NotFound
    }

    fn name(&self) -> &'static str {
        "position_hint"
    }

    fn phase(&self) -> LocateState {
        LocateState::FallbackSearch
    }
}

/// The only page occurrence of the value.
///
/// Applies only to records with no context hints at all (unless
/// `unique_fallback_with_unresolved_context` is set). A value found more than
/// once is reported as ambiguous.
pub struct UniqueOccurrence;

impl LocateStrategy for UniqueOccurrence {
    fn attempt(&self, ctx: &LocateContext<'_>) -> Attempt {
        let hinted = ctx.change.has_context() || ctx.change.position().is_positional();
        if hinted && !ctx.config.unique_fallback_with_unresolved_context {
            return Attempt::NotFound;
        }

        for variant in new_variants(ctx) {
            let rects = ctx.page.search(&variant);
            match rects.len() {
                0 => continue,
                1 if variant.chars().count() >= ctx.config.min_unique_chars => {
                    return ranked_hit(ctx, variant, rects, self.name());
                },
                1 => return Attempt::NotFound,
                n => return Attempt::Ambiguous(n),
            }
        }
        Attempt::NotFound
    }

    fn name(&self) -> &'static str {
        "unique_occurrence"
    }

    fn phase(&self) -> LocateState {
        LocateState::FallbackSearch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::locate_anchor;
    use crate::block::BlockAssembler;
    use crate::candidates::CandidateGenerator;
    use crate::change::ChangeRecord;
    use crate::config::LocatorConfig;
    use crate::page::{PageTextIndex, TextPage};

    fn attempt_with(
        strategy: &dyn LocateStrategy,
        page: &TextPage,
        change: &ChangeRecord,
        config: &LocatorConfig,
    ) -> Attempt {
        let candidates = CandidateGenerator::default();
        let assembler = BlockAssembler::new(config);
        let anchor = locate_anchor(page, change);
        let ctx = LocateContext {
            page,
            bounds: page.bounds(),
            change,
            anchor: anchor.as_ref(),
            config,
            candidates: &candidates,
            assembler: &assembler,
        };
        strategy.attempt(&ctx)
    }

    fn attempt(strategy: &dyn LocateStrategy, page: &TextPage, change: &ChangeRecord) -> Attempt {
        attempt_with(strategy, page, change, &LocatorConfig::default())
    }

    fn found(attempt: Attempt) -> StrategyHit {
        match attempt {
            Attempt::Found(hit) => hit,
            other => panic!("expected a hit, got {:?}", other),
        }
    }

    /// Char width 6: column `c` starts at x = 72 + 6c.
    fn statement() -> TextPage {
        let mut page = TextPage::new(1, 612.0, 792.0);
        page.push_monospace("Balance sheet", 72.0, 60.0, 6.0, 12.0);
        page.push_monospace("Net assets 150,000 120,000", 72.0, 100.0, 6.0, 12.0);
        page.push_monospace("Total assets 100,000 150,000", 72.0, 120.0, 6.0, 12.0);
        page.push_monospace("Staff costs 195 180", 72.0, 140.0, 6.0, 12.0);
        page.push_monospace("Depreciation 195 210", 72.0, 160.0, 6.0, 12.0);
        page
    }

    #[test]
    fn test_value_variants_keep_digits() {
        let page = statement();
        let change = ChangeRecord::numeric("", "Turnover T 25,600");
        let config = LocatorConfig::default();
        let candidates = CandidateGenerator::default();
        let assembler = BlockAssembler::new(&config);
        let ctx = LocateContext {
            page: &page,
            bounds: page.bounds(),
            change: &change,
            anchor: None,
            config: &config,
            candidates: &candidates,
            assembler: &assembler,
        };
        assert_eq!(new_variants(&ctx), vec!["Turnover T 25,600", "Turnover 25,600", "25,600"]);
    }

    #[test]
    fn test_in_place_next_to_old_value() {
        let page = statement();
        let change = ChangeRecord::numeric("100,000", "150,000").with_row_label("Total assets");
        let hit = found(attempt(&InPlace, &page, &change));
        let best = hit.region.rects()[0];
        assert_eq!(best.top(), 120.0);
        assert_eq!(best.left(), 72.0 + 6.0 * 21.0);
        assert!(hit.correction.is_none());
    }

    #[test]
    fn test_in_place_needs_old_value_and_anchor() {
        let page = statement();
        let placeholder = ChangeRecord::numeric("-", "150,000").with_row_label("Total assets");
        assert_eq!(attempt(&InPlace, &page, &placeholder), Attempt::NotFound);
        let no_anchor = ChangeRecord::numeric("100,000", "150,000");
        assert_eq!(attempt(&InPlace, &page, &no_anchor), Attempt::NotFound);
    }

    #[test]
    fn test_anchored_value_ranks_same_row_first() {
        let page = statement();
        let change = ChangeRecord::numeric("-", "150,000").with_row_label("Total assets");
        let hit = found(attempt(&AnchoredValue, &page, &change));
        let rects = hit.region.rects();
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].top(), 120.0);
        assert_eq!(rects[1].top(), 100.0);
    }

    #[test]
    fn test_anchored_value_corrects_noisy_search_text() {
        let page = statement();
        let change = ChangeRecord::numeric("-", "150,000")
            .with_search_text("T 150,000")
            .with_row_label("Total assets");
        let hit = found(attempt(&AnchoredValue, &page, &change));
        assert_eq!(hit.literal, "150,000");
        let correction = hit.correction.unwrap();
        assert_eq!(correction.original, "T 150,000");
        assert_eq!(correction.resolved, "150,000");
    }

    #[test]
    fn test_section_anchor() {
        let page = statement();
        let change = ChangeRecord::numeric("", "120,000").with_section("Balance sheet");
        let hit = found(attempt(&SectionAnchored, &page, &change));
        assert_eq!(hit.region.rects()[0].top(), 100.0);
        assert_eq!(attempt(&SectionAnchored, &page, &ChangeRecord::numeric("", "120,000")), Attempt::NotFound);
    }

    #[test]
    fn test_position_hint_selects_occurrence() {
        let page = statement();
        let first = ChangeRecord::numeric("", "195").with_position_hint("first instance");
        let second = ChangeRecord::numeric("", "195").with_position_hint("second instance");
        let third = ChangeRecord::numeric("", "195").with_position_hint("third instance");

        assert_eq!(found(attempt(&PositionalHint, &page, &first)).region.rects()[0].top(), 140.0);
        assert_eq!(found(attempt(&PositionalHint, &page, &second)).region.rects()[0].top(), 160.0);
        assert_eq!(attempt(&PositionalHint, &page, &third), Attempt::NotFound);
    }

    #[test]
    fn test_unique_occurrence() {
        let page = statement();
        let unique = ChangeRecord::numeric("", "210");
        assert_eq!(found(attempt(&UniqueOccurrence, &page, &unique)).region.rects().len(), 1);

        let repeated = ChangeRecord::numeric("", "195");
        assert_eq!(attempt(&UniqueOccurrence, &page, &repeated), Attempt::Ambiguous(2));

        let too_short = ChangeRecord::numeric("", "21");
        assert_eq!(attempt(&UniqueOccurrence, &page, &too_short), Attempt::NotFound);
    }

    #[test]
    fn test_unique_occurrence_respects_unresolved_context() {
        let page = statement();
        let change = ChangeRecord::numeric("", "210").with_row_label("Amortisation");
        assert_eq!(attempt(&UniqueOccurrence, &page, &change), Attempt::NotFound);

        let lenient = LocatorConfig::default().with_unique_fallback_with_unresolved_context(true);
        assert!(matches!(
            attempt_with(&UniqueOccurrence, &page, &change, &lenient),
            Attempt::Found(_)
        ));
    }
}
