//! Property-based tests for the text and layout comparators

use pdfcompare_core::{compare_layout, compare_text, MatchOptions, RasterPage};
use proptest::prelude::*;

// ============================================================
// Strategies
// ============================================================

/// Text built from a small vocabulary so that overlaps are common
fn small_vocab_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-e]{1,2}", 0..40).prop_map(|words| words.join(" "))
}

/// Arbitrary whitespace-separated text, including unicode and odd spacing
fn messy_text() -> impl Strategy<Value = String> {
    prop::collection::vec(("\\PC{1,6}", "[ \t\n]{1,3}"), 0..30).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(word, sep)| format!("{}{}", word, sep))
            .collect()
    })
}

/// A small page with a random black rectangle
fn marked_page() -> impl Strategy<Value = RasterPage> {
    (1u32..24, 1u32..24, 0u32..24, 0u32..24, 0u32..12, 0u32..12).prop_map(
        |(width, height, x, y, w, h)| {
            let mut page = RasterPage::filled(width, height, [255, 255, 255, 255]);
            page.fill_rect(x, y, w, h, [0, 0, 0, 255]);
            page
        },
    )
}

fn is_two_decimals(value: f64) -> bool {
    ((value * 100.0).round() - value * 100.0).abs() < 1e-6
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ============================================================
    // Text
    // ============================================================

    #[test]
    fn text_similarity_is_symmetric(a in small_vocab_text(), b in small_vocab_text()) {
        let ab = compare_text(&a, &b);
        let ba = compare_text(&b, &a);
        prop_assert_eq!(ab.similarity, ba.similarity);
        prop_assert_eq!(ab.divergence_count, ba.divergence_count);
    }

    #[test]
    fn text_similarity_is_bounded(a in messy_text(), b in messy_text()) {
        let result = compare_text(&a, &b);
        prop_assert!((0.0..=100.0).contains(&result.similarity));
        prop_assert!(is_two_decimals(result.similarity));
    }

    #[test]
    fn text_compared_with_itself_is_identical(a in messy_text()) {
        let result = compare_text(&a, &a);
        prop_assert_eq!(result.similarity, 100.0);
        prop_assert_eq!(result.divergence_count, 0);
        prop_assert!(result.samples.is_empty());
    }

    #[test]
    fn text_samples_never_exceed_cap(
        a in prop::collection::vec("[a-z]{1,6}", 0..60),
        b in prop::collection::vec("[a-z]{1,6}", 0..60),
    ) {
        let result = compare_text(&a.join(" "), &b.join(" "));
        prop_assert!(result.samples.len() <= 2);
        for sample in &result.samples {
            // each example is a quoted word followed by `", "` or the end
            let examples = sample.matches("\", \"").count() + 1;
            prop_assert!(examples <= 5, "too many examples in {}", sample);
        }
    }

    #[test]
    fn disjoint_vocabularies_score_zero(
        a in prop::collection::vec("[a-m]{3}", 1..20),
        b in prop::collection::vec("[n-z]{3}", 1..20),
    ) {
        let result = compare_text(&a.join(" "), &b.join(" "));
        prop_assert_eq!(result.similarity, 0.0);
    }

    #[test]
    fn word_order_does_not_matter(words in prop::collection::vec("[a-z]{1,8}", 0..20)) {
        let forward = words.join(" ");
        let mut reversed = words.clone();
        reversed.reverse();
        let result = compare_text(&forward, &reversed.join("\n"));
        prop_assert_eq!(result.similarity, 100.0);
    }

    // ============================================================
    // Layout
    // ============================================================

    #[test]
    fn layout_identical_sequences_match(pages in prop::collection::vec(marked_page(), 0..4)) {
        let result = compare_layout(&pages, &pages.clone(), MatchOptions::default());
        prop_assert_eq!(result.similarity, 100.0);
        prop_assert_eq!(result.mismatched_pixel_count, 0);
        prop_assert!(result.samples.is_empty());
    }

    #[test]
    fn layout_similarity_is_bounded(
        a in prop::collection::vec(marked_page(), 0..4),
        b in prop::collection::vec(marked_page(), 0..4),
    ) {
        let result = compare_layout(&a, &b, MatchOptions::default());
        prop_assert!((0.0..=100.0).contains(&result.similarity));
        prop_assert!(result.samples.len() <= 2);
        prop_assert_eq!(
            result.samples.iter().any(|s| s.starts_with("Different page count")),
            a.len() != b.len()
        );
    }

    #[test]
    fn layout_mismatch_count_is_symmetric(
        a in prop::collection::vec(marked_page(), 0..3),
        b in prop::collection::vec(marked_page(), 0..3),
    ) {
        let ab = compare_layout(&a, &b, MatchOptions::default());
        let ba = compare_layout(&b, &a, MatchOptions::default());
        prop_assert_eq!(ab.mismatched_pixel_count, ba.mismatched_pixel_count);
        prop_assert_eq!(ab.similarity, ba.similarity);
    }
}
