//! End-to-end localization scenarios over in-memory pages.

use change_highlight::change::ChangeRecord;
use change_highlight::config::LocatorConfig;
use change_highlight::highlighter::{ChangeStatus, PageHighlighter};
use change_highlight::locator::{ChangeLocator, LocateOutcome, LocateState, Located, SkipReason};
use change_highlight::page::TextPage;

/// Fixed-pitch statement page; column `c` of a line starts at x = 72 + 6c.
fn statement() -> TextPage {
    let mut page = TextPage::new(1, 612.0, 792.0);
    page.push_monospace("Balance sheet", 72.0, 60.0, 6.0, 12.0);
    page.push_monospace("Net assets 150,000 120,000", 72.0, 100.0, 6.0, 12.0);
    page.push_monospace("Total assets 100,000 150,000", 72.0, 120.0, 6.0, 12.0);
    page.push_monospace("Staff costs 195 180", 72.0, 140.0, 6.0, 12.0);
    page.push_monospace("Depreciation 195 210", 72.0, 160.0, 6.0, 12.0);
    page
}

/// A heading followed by a paragraph wrapped over two lines.
fn notes() -> TextPage {
    let mut page = TextPage::new(1, 612.0, 792.0);
    page.push_monospace("Note 12 Going concern", 72.0, 200.0, 6.0, 12.0);
    page.push_monospace(
        "The directors have reviewed the cash flow forecasts for the",
        72.0,
        220.0,
        6.0,
        12.0,
    );
    page.push_monospace(
        "group and are satisfied it remains a going concern.",
        72.0,
        234.0,
        6.0,
        12.0,
    );
    page
}

const PARAGRAPH: &str = "The directors have reviewed the cash flow forecasts for the group and are satisfied it remains a going concern.";

fn locator() -> ChangeLocator {
    ChangeLocator::new(LocatorConfig::default()).unwrap()
}

fn highlighter() -> PageHighlighter {
    PageHighlighter::new(LocatorConfig::default()).unwrap()
}

mod numeric {
    use super::*;

    #[test]
    fn test_row_label_beats_distractor_row() {
        let mut page = statement();
        let change = ChangeRecord::numeric("100,000", "150,000").with_row_label("Total assets");
        let report = highlighter().process_page(&mut page, 1, &[change]);

        assert_eq!(report.highlighted(), 1);
        let annotations = page.annotations();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].rect.top(), 120.0);
        assert_eq!(annotations[0].rect.left(), 198.0);
    }

    #[test]
    fn test_in_place_is_tried_first() {
        let page = statement();
        let change = ChangeRecord::numeric("100,000", "150,000").with_row_label("Total assets");
        let location = match locator().locate(&page, &change) {
            LocateOutcome::Located(location) => location,
            other => panic!("expected a location, got {:?}", other),
        };
        assert_eq!(location.strategy, "in_place");
        assert_eq!(location.phase, LocateState::AnchorSearch);
        assert!(matches!(location.region, Located::Ranked(_)));
    }

    #[test]
    fn test_position_hints_pick_different_occurrences() {
        let mut page = statement();
        let changes = vec![
            ChangeRecord::numeric("", "195").with_position_hint("first instance"),
            ChangeRecord::numeric("", "195").with_position_hint("second instance"),
        ];
        let report = highlighter().process_page(&mut page, 1, &changes);

        assert_eq!(report.highlighted(), 2);
        let annotations = page.annotations();
        assert_eq!(annotations[0].rect.top(), 140.0);
        assert_eq!(annotations[1].rect.top(), 160.0);
        assert_ne!(annotations[0].rect.position_key(2), annotations[1].rect.position_key(2));
    }

    #[test]
    fn test_repeated_value_without_context_is_skipped() {
        let mut page = statement();
        let report = highlighter().process_page(&mut page, 1, &[ChangeRecord::numeric("", "195")]);

        assert_eq!(
            report.outcomes[0].status,
            ChangeStatus::Skipped(SkipReason::Ambiguous { occurrences: 2 })
        );
        assert!(page.annotations().is_empty());
    }

    #[test]
    fn test_unique_value_without_context_is_highlighted() {
        let page = statement();
        let outcome = locator().locate(&page, &ChangeRecord::numeric("", "210"));
        let location = outcome.location().unwrap();
        assert_eq!(location.strategy, "unique_occurrence");
        assert_eq!(location.region.rects()[0].top(), 160.0);
    }

    #[test]
    fn test_unresolved_context_blocks_unique_fallback() {
        let page = statement();
        let change = ChangeRecord::numeric("", "210").with_row_label("Amortisation");
        assert_eq!(locator().locate(&page, &change), LocateOutcome::Skipped(SkipReason::NotFound));

        let relaxed = ChangeLocator::new(
            LocatorConfig::default().with_unique_fallback_with_unresolved_context(true),
        )
        .unwrap();
        assert_eq!(relaxed.locate(&page, &change).state(), LocateState::Located);
    }

    #[test]
    fn test_absent_value_is_not_found() {
        let page = statement();
        let change = ChangeRecord::numeric("", "999,999").with_row_label("Total assets");
        assert_eq!(locator().locate(&page, &change), LocateOutcome::Skipped(SkipReason::NotFound));
    }
}

mod text {
    use super::*;

    #[test]
    fn test_two_line_addition_is_one_annotation() {
        let mut page = notes();
        let change = ChangeRecord::text_added(PARAGRAPH);
        let report = highlighter().process_page(&mut page, 1, &[change]);

        assert_eq!(report.highlighted(), 1);
        let annotations = page.annotations();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].rect.top(), 220.0);
        assert_eq!(annotations[0].rect.bottom(), 246.0);
        assert!(annotations[0].quad_points.len() >= 2);
    }

    #[test]
    fn test_block_search_comes_first() {
        let page = notes();
        let change = ChangeRecord::text_added(PARAGRAPH).with_context_before("Going concern");
        let location = locator().locate(&page, &change);
        let location = location.location().unwrap();
        assert_eq!(location.strategy, "search_text_block");
        assert_eq!(location.phase, LocateState::FullTextSearch);
        assert!(location.region.rects().len() >= 2);
    }

    #[test]
    fn test_short_wrapped_snippet_keeps_its_second_line() {
        let mut page = TextPage::new(1, 612.0, 792.0);
        page.push_monospace("Principal activities", 72.0, 200.0, 6.0, 12.0);
        page.push_monospace("The company trades in sustainable", 72.0, 220.0, 6.0, 12.0);
        page.push_monospace("timber.", 72.0, 234.0, 6.0, 12.0);
        let change = ChangeRecord::text_added("in sustainable timber.").with_context_before("Principal activities");

        let report = highlighter().process_page(&mut page, 1, &[change]);
        assert!(matches!(
            report.outcomes[0].status,
            ChangeStatus::Highlighted {
                strategy: "anchored_snippet",
                ..
            }
        ));
        let annotations = page.annotations();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].rect.top(), 220.0);
        assert_eq!(annotations[0].rect.bottom(), 246.0);
        assert_eq!(annotations[0].rect.left(), 72.0);
        assert_eq!(annotations[0].quad_points.len(), 2);
    }

    #[test]
    fn test_deleted_text_is_never_drawn() {
        let mut page = notes();
        let change = ChangeRecord::text_deleted("The directors have reviewed");
        let report = highlighter().process_page(&mut page, 1, &[change]);

        assert_eq!(report.outcomes[0].status, ChangeStatus::Skipped(SkipReason::Deletion));
        assert!(page.annotations().is_empty());
    }

    #[test]
    fn test_empty_value_is_skipped() {
        let page = notes();
        let change = ChangeRecord::text_added("   ");
        assert_eq!(locator().locate(&page, &change), LocateOutcome::Skipped(SkipReason::EmptyValue));
    }

    #[test]
    fn test_missing_text_is_not_found() {
        let mut page = notes();
        let change = ChangeRecord::text_added("Revenue increased by twelve percent over the prior year");
        let report = highlighter().process_page(&mut page, 1, &[change]);
        assert_eq!(report.outcomes[0].status, ChangeStatus::Skipped(SkipReason::NotFound));
        assert!(page.annotations().is_empty());
    }
}

mod chains {
    use super::*;
    use change_highlight::change::ChangeKind;

    #[test]
    fn test_strategy_order() {
        let locator = locator();
        assert_eq!(
            locator.strategy_names(ChangeKind::TextAdded),
            vec!["search_text_block", "new_value_block", "anchored_snippet", "direct_text"]
        );
        assert_eq!(
            locator.strategy_names(ChangeKind::Numeric),
            vec!["in_place", "anchored_value", "section", "position_hint", "unique_occurrence"]
        );
        assert!(locator.strategy_names(ChangeKind::TextDeleted).is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LocatorConfig::default().with_chunking(0, 3);
        assert!(ChangeLocator::new(config).is_err());
    }
}
