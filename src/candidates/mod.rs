//! Search candidate generation.
//!
//! Values coming from the comparison stage are noisy: stray watermark letters
//! leak into extracted text, numbers arrive embedded in longer strings, and
//! long passages are rarely matched verbatim. [`CandidateGenerator`] turns one
//! value into an ordered list of literals to try, from the most specific
//! (the value itself) to the coarsest (a few leading words).
//!
//! The module also carries the small text helpers the locator uses to build
//! snippets: whitespace normalization, word prefixes/suffixes, first sentence
//! and char-safe truncation.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Maximal runs of digits, commas and parentheses
    static ref RE_NUMERIC_RUN: Regex = Regex::new(r"[\d,()]+").unwrap();

    /// First value such as `370,308` or `(370,308)`
    static ref RE_FIRST_VALUE: Regex = Regex::new(r"\(?[\d,]+\)?").unwrap();

    /// Alphabetic words of three letters or more
    static ref RE_ALPHA_WORD: Regex = Regex::new(r"\b\p{Alphabetic}{3,}\b").unwrap();

    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Sentence terminator followed by whitespace
    static ref RE_SENTENCE_END: Regex = Regex::new(r"[.!?]\s+").unwrap();

    static ref RE_DEFAULT_WATERMARK: Regex = Regex::new(r"\b[TFARD]\b").unwrap();
}

/// Produces ordered search literals for a value.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    /// Matches a single stray watermark letter; `None` disables cleaning
    watermark: Option<Regex>,
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self {
            watermark: Some(RE_DEFAULT_WATERMARK.clone()),
        }
    }
}

impl CandidateGenerator {
    /// Create a generator for the given watermark alphabet.
    ///
    /// Each letter in `watermark_letters` is treated as an artefact when it
    /// stands alone between word boundaries. An empty alphabet disables
    /// cleaning.
    pub fn new(watermark_letters: &str) -> Result<Self> {
        if watermark_letters.is_empty() {
            return Ok(Self { watermark: None });
        }
        let class: String = watermark_letters
            .chars()
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        let watermark = Regex::new(&format!(r"\b[{}]\b", class))
            .map_err(|e| Error::InvalidConfig(format!("watermark letters: {}", e)))?;
        Ok(Self {
            watermark: Some(watermark),
        })
    }

    /// `value` with stray watermark letters removed and whitespace collapsed.
    ///
    /// Returns `None` when cleaning is disabled, changes nothing, or leaves
    /// nothing behind.
    pub fn clean(&self, value: &str) -> Option<String> {
        let watermark = self.watermark.as_ref()?;
        let text = value.trim();
        let cleaned = normalize_whitespace(&watermark.replace_all(text, ""));
        (!cleaned.is_empty() && cleaned != text).then_some(cleaned)
    }

    /// Ordered search variants for `value`.
    ///
    /// Variants are at least two characters long, deduplicated
    /// case-insensitively, and ordered: the trimmed value, the value with
    /// watermark letters removed, every numeric run, the first value-like
    /// run, then up to three leading words.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::candidates::CandidateGenerator;
    ///
    /// let generator = CandidateGenerator::default();
    /// let variants = generator.generate("Turnover T 25,600 (22,400)");
    /// assert_eq!(
    ///     variants,
    ///     vec![
    ///         "Turnover T 25,600 (22,400)",
    ///         "Turnover 25,600 (22,400)",
    ///         "25,600",
    ///         "(22,400)",
    ///         "Turnover",
    ///     ]
    /// );
    /// ```
    pub fn generate(&self, value: &str) -> Vec<String> {
        let text = value.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<String> = Vec::new();

        if text.chars().count() > 2 {
            candidates.push(text.to_string());
        }

        if let Some(cleaned) = self.clean(text) {
            if cleaned.chars().count() > 2 {
                candidates.push(cleaned);
            }
        }

        for run in RE_NUMERIC_RUN.find_iter(text) {
            let run = run.as_str();
            if run.chars().count() >= 2 && run.chars().any(|c| c.is_ascii_digit()) {
                candidates.push(run.to_string());
            }
        }

        if let Some(first) = RE_FIRST_VALUE.find(text) {
            let first = first.as_str();
            if first.chars().any(|c| c.is_ascii_digit()) {
                candidates.push(first.to_string());
            }
        }

        let words: Vec<&str> = RE_ALPHA_WORD
            .find_iter(text)
            .take(3)
            .map(|m| m.as_str())
            .collect();
        let joined = words.join(" ");
        if joined.chars().count() > 5 {
            candidates.push(joined);
        }

        let mut unique: IndexMap<String, String> = IndexMap::new();
        for candidate in candidates {
            if candidate.chars().count() >= 2 {
                unique.entry(candidate.to_lowercase()).or_insert(candidate);
            }
        }
        unique.into_values().collect()
    }
}

/// Collapse every whitespace run (including newlines) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// The first `n` whitespace-separated words, if the text has at least `n`.
pub fn first_words(text: &str, n: usize) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    (n > 0 && words.len() >= n).then(|| words[..n].join(" "))
}

/// The last `n` whitespace-separated words, if the text has more than `n`.
pub fn last_words(text: &str, n: usize) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    (n > 0 && words.len() > n).then(|| words[words.len() - n..].join(" "))
}

/// The first sentence of `text`, terminator included, if longer than ten
/// characters.
pub fn first_sentence(text: &str) -> Option<String> {
    let sentence = match RE_SENTENCE_END.find(text) {
        Some(end) => &text[..end.start() + 1],
        None => text,
    };
    let sentence = sentence.trim();
    (sentence.chars().count() > 10).then(|| sentence.to_string())
}

/// At most `max_chars` characters of `text`, cut on a char boundary and
/// trimmed.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => text[..byte].trim_end(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_short_values() {
        let generator = CandidateGenerator::default();
        assert!(generator.generate("").is_empty());
        assert!(generator.generate("   ").is_empty());
        assert!(generator.generate("5").is_empty());
        assert_eq!(generator.generate("12"), vec!["12"]);
    }

    #[test]
    fn test_plain_number() {
        let generator = CandidateGenerator::default();
        assert_eq!(generator.generate(" 150,000 "), vec!["150,000"]);
    }

    #[test]
    fn test_watermark_letters_removed() {
        let generator = CandidateGenerator::default();
        let variants = generator.generate("Trade D debtors");
        assert_eq!(variants[0], "Trade D debtors");
        assert_eq!(variants[1], "Trade debtors");
    }

    #[test]
    fn test_watermark_alphabet_is_configurable() {
        let generator = CandidateGenerator::new("X").unwrap();
        let variants = generator.generate("Net X assets T");
        assert_eq!(variants[0], "Net X assets T");
        assert_eq!(variants[1], "Net assets T");

        let disabled = CandidateGenerator::new("").unwrap();
        assert_eq!(disabled.generate("Cash T at bank"), vec!["Cash T at bank", "Cash bank"]);
    }

    #[test]
    fn test_clean() {
        let generator = CandidateGenerator::default();
        assert_eq!(generator.clean("Trade  D debtors").as_deref(), Some("Trade debtors"));
        assert_eq!(generator.clean("Trade debtors"), None);
        assert_eq!(generator.clean("T"), None);
        assert_eq!(CandidateGenerator::new("").unwrap().clean("Trade D debtors"), None);
    }

    #[test]
    fn test_dedup_is_case_insensitive_and_keeps_first() {
        let generator = CandidateGenerator::default();
        let variants = generator.generate("Going concern basis");
        assert_eq!(variants, vec!["Going concern basis"]);
    }

    #[test]
    fn test_word_anchor_needs_length() {
        let generator = CandidateGenerator::default();
        // "Net" alone joins to three characters, too short for a word anchor
        assert_eq!(generator.generate("Net 4"), vec!["Net 4"]);
        let variants = generator.generate("Profit for the financial year 1,234");
        assert_eq!(variants.last().unwrap(), "Profit for the");
    }

    #[test]
    fn test_punctuation_runs_without_digits_are_ignored() {
        let generator = CandidateGenerator::default();
        let variants = generator.generate("see note (), above");
        assert!(variants.iter().all(|v| v != "()," && v != "()"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n b\t\tc  "), "a b c");
    }

    #[test]
    fn test_word_helpers() {
        let text = "one two three four five six";
        assert_eq!(first_words(text, 3).as_deref(), Some("one two three"));
        assert_eq!(first_words(text, 7), None);
        assert_eq!(last_words(text, 5).as_deref(), Some("two three four five six"));
        assert_eq!(last_words(text, 6), None);
    }

    #[test]
    fn test_first_sentence() {
        let text = "Turnover for the year was 25.6m. EBITDA rose.";
        assert_eq!(first_sentence(text).as_deref(), Some("Turnover for the year was 25.6m."));
        assert_eq!(first_sentence("Short. Next"), None);
        assert_eq!(first_sentence("No terminator at all here").as_deref(), Some("No terminator at all here"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("£25.6m growth", 6), "£25.6m");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("ab cd", 3), "ab");
    }
}
