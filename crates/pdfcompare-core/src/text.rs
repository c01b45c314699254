//! Set-based text comparison
//!
//! Each text is reduced to its set of distinct whitespace-delimited words and
//! the two sets are scored with the Jaccard index. Word order, repetition and
//! position are ignored.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::round_percentage;

/// Default number of example words reported per divergence category
pub const DEFAULT_MAX_SAMPLES: usize = 5;

/// Distinct words of a text in order of first appearance
pub type WordSet<'a> = IndexSet<&'a str>;

/// Result of comparing two texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextComparison {
    /// Jaccard similarity as a percentage, 2 decimals
    pub similarity: f64,
    /// Number of words present on exactly one side
    pub divergence_count: usize,
    /// Human-readable "removed" / "added" samples
    pub samples: Vec<String>,
}

/// Split text on whitespace runs and collect distinct words
pub fn word_set(text: &str) -> WordSet<'_> {
    text.split_whitespace().collect()
}

/// Text comparator with a configurable sample cap
#[derive(Debug, Clone, Copy)]
pub struct TextComparator {
    max_samples: usize,
}

impl TextComparator {
    pub fn new(max_samples: usize) -> Self {
        Self { max_samples }
    }

    pub fn compare(&self, text_a: &str, text_b: &str) -> TextComparison {
        let words_a = word_set(text_a);
        let words_b = word_set(text_b);

        let a_only: Vec<&str> = words_a
            .iter()
            .copied()
            .filter(|w| !words_b.contains(w))
            .collect();
        let b_only: Vec<&str> = words_b
            .iter()
            .copied()
            .filter(|w| !words_a.contains(w))
            .collect();

        let intersection = words_a.len() - a_only.len();
        let union = words_a.len() + b_only.len();

        let similarity = if union == 0 {
            100.0
        } else {
            round_percentage(intersection as f64 / union as f64 * 100.0)
        };

        // a zero cap reports counts only
        let mut samples = Vec::new();
        if self.max_samples > 0 && !a_only.is_empty() {
            samples.push(format_sample("Removed", &a_only, self.max_samples));
        }
        if self.max_samples > 0 && !b_only.is_empty() {
            samples.push(format_sample("Added", &b_only, self.max_samples));
        }

        TextComparison {
            similarity,
            divergence_count: a_only.len() + b_only.len(),
            samples,
        }
    }
}

impl Default for TextComparator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

fn format_sample(label: &str, words: &[&str], limit: usize) -> String {
    let quoted: Vec<String> = words
        .iter()
        .take(limit)
        .map(|w| format!("\"{}\"", w))
        .collect();
    format!("{} text (examples): {}", label, quoted.join(", "))
}

/// Compare two texts with the default sample cap
pub fn compare_text(text_a: &str, text_b: &str) -> TextComparison {
    TextComparator::default().compare(text_a, text_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_word_set_drops_empty_tokens() {
        let words = word_set("  alpha\t\tbeta \n alpha  ");
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_word_set_is_case_sensitive() {
        let words = word_set("Word word WORD");
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_half_overlap() {
        let result = compare_text("alpha beta gamma", "alpha beta delta");
        assert_eq!(result.similarity, 50.0);
        assert_eq!(result.divergence_count, 2);
        assert_eq!(
            result.samples,
            vec![
                "Removed text (examples): \"gamma\"".to_string(),
                "Added text (examples): \"delta\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_identical_texts() {
        let result = compare_text("the same words", "words the same");
        assert_eq!(result.similarity, 100.0);
        assert_eq!(result.divergence_count, 0);
        assert!(result.samples.is_empty());
    }

    #[test]
    fn test_both_empty() {
        let result = compare_text("", "   \n ");
        assert_eq!(result.similarity, 100.0);
        assert_eq!(result.divergence_count, 0);
        assert!(result.samples.is_empty());
    }

    #[test]
    fn test_one_side_empty() {
        let result = compare_text("", "new words");
        assert_eq!(result.similarity, 0.0);
        assert_eq!(result.divergence_count, 2);
        assert_eq!(result.samples, vec!["Added text (examples): \"new\", \"words\""]);
    }

    #[test]
    fn test_disjoint_vocabularies() {
        let result = compare_text("one two", "three four five");
        assert_eq!(result.similarity, 0.0);
        assert_eq!(result.divergence_count, 5);
    }

    #[test]
    fn test_samples_are_capped_in_insertion_order() {
        let result = compare_text("a b c d e f g", "z");
        assert_eq!(
            result.samples[0],
            "Removed text (examples): \"a\", \"b\", \"c\", \"d\", \"e\""
        );
        assert_eq!(result.divergence_count, 8);
    }

    #[test]
    fn test_custom_sample_cap() {
        let result = TextComparator::new(2).compare("x", "p q r");
        assert_eq!(
            result.samples,
            vec![
                "Removed text (examples): \"x\"",
                "Added text (examples): \"p\", \"q\"",
            ]
        );
    }

    #[test]
    fn test_zero_sample_cap_keeps_counts_only() {
        let result = TextComparator::new(0).compare("a", "b");
        assert_eq!(result.divergence_count, 2);
        assert_eq!(result.similarity, 0.0);
        assert!(result.samples.is_empty());
    }

    #[test]
    fn test_similarity_is_rounded() {
        // 1 shared of 3 distinct words
        let result = compare_text("a b", "a c");
        assert_eq!(result.similarity, 33.33);
    }
}
