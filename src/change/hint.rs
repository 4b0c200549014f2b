//! Position hints for repeated values.
//!
//! The comparison stage emits one record per occurrence of a repeated value
//! and tells them apart with free-text hints such as "first instance" or
//! "2nd occurrence". Only ordinal hints carry positional information; any
//! other text is kept for reporting.

use lazy_static::lazy_static;
use regex::Regex;

const ORDINAL_WORDS: &str = "first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth";

/// Nouns that make an ordinal refer to an occurrence
const OCCURRENCE_NOUNS: &str = "instance|occurrence|match|appearance|one";

lazy_static! {
    /// Spelled-out ordinals, alone or naming an occurrence
    static ref RE_ORDINAL_WORD: Regex = Regex::new(&format!(
        r"(?i)^(?:the\s+)?(?P<bare>{words})$|\b(?P<noun>{words})\s+(?:{nouns})\b",
        words = ORDINAL_WORDS,
        nouns = OCCURRENCE_NOUNS
    ))
    .unwrap();

    /// Numeric ordinals (1st, 2nd, 3rd, 4th), alone or naming an occurrence
    static ref RE_ORDINAL_SUFFIX: Regex = Regex::new(&format!(
        r"(?i)^(?:the\s+)?(?P<bare>\d+)(?:st|nd|rd|th)$|\b(?P<noun>\d+)(?:st|nd|rd|th)\s+(?:{nouns})\b",
        nouns = OCCURRENCE_NOUNS
    ))
    .unwrap();

    /// "instance 2", "occurrence #3", "match 1"
    static ref RE_NUMBERED: Regex =
        Regex::new(r"(?i)\b(?:instance|occurrence|match)\s*#?\s*(\d+)\b").unwrap();

    /// "#2"
    static ref RE_HASH: Regex = Regex::new(r"#(\d+)\b").unwrap();

    static ref RE_LAST: Regex = Regex::new(&format!(
        r"(?i)^(?:the\s+)?(?:last|final)$|\b(?:last|final)\s+(?:{nouns})\b",
        nouns = OCCURRENCE_NOUNS
    ))
    .unwrap();
}

/// The `bare` or `noun` group of an ordinal match.
fn ordinal_capture<'h>(re: &Regex, hint: &'h str) -> Option<&'h str> {
    let caps = re.captures(hint)?;
    caps.name("bare").or_else(|| caps.name("noun")).map(|m| m.as_str())
}

/// Parsed `position_hint`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PositionHint {
    /// No hint given
    #[default]
    None,
    /// Zero-based occurrence index in reading order
    Ordinal(usize),
    /// The last occurrence in reading order
    Last,
    /// A hint with no positional meaning
    Text(String),
}

impl PositionHint {
    /// Parse a free-text hint.
    ///
    /// An ordinal counts only when it is the whole hint ("second", "the 3rd")
    /// or names an occurrence ("second instance", "3rd one"). Ordinals
    /// qualifying anything else ("second column", "first quarter") leave the
    /// hint as [`Text`](Self::Text).
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::change::PositionHint;
    ///
    /// assert_eq!(PositionHint::parse("first instance"), PositionHint::Ordinal(0));
    /// assert_eq!(PositionHint::parse("2nd occurrence"), PositionHint::Ordinal(1));
    /// assert_eq!(PositionHint::parse("instance #3"), PositionHint::Ordinal(2));
    /// assert_eq!(PositionHint::parse("last one"), PositionHint::Last);
    /// assert_eq!(PositionHint::parse(""), PositionHint::None);
    /// ```
    pub fn parse(hint: &str) -> Self {
        let hint = hint.trim();
        if hint.is_empty() {
            return Self::None;
        }

        if let Some(word) = ordinal_capture(&RE_ORDINAL_WORD, hint) {
            let index = match word.to_ascii_lowercase().as_str() {
                "first" => 0,
                "second" => 1,
                "third" => 2,
                "fourth" => 3,
                "fifth" => 4,
                "sixth" => 5,
                "seventh" => 6,
                "eighth" => 7,
                "ninth" => 8,
                _ => 9,
            };
            return Self::Ordinal(index);
        }

        let numbered = ordinal_capture(&RE_ORDINAL_SUFFIX, hint)
            .or_else(|| RE_NUMBERED.captures(hint).and_then(|caps| caps.get(1)).map(|m| m.as_str()))
            .or_else(|| RE_HASH.captures(hint).and_then(|caps| caps.get(1)).map(|m| m.as_str()));
        if let Some(n) = numbered.and_then(|n| n.parse::<usize>().ok()) {
            if n >= 1 {
                return Self::Ordinal(n - 1);
            }
        }

        if RE_LAST.is_match(hint) {
            return Self::Last;
        }

        Self::Text(hint.to_string())
    }

    /// Whether the hint selects a specific occurrence.
    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Ordinal(_) | Self::Last)
    }

    /// Index into `count` occurrences sorted in reading order.
    pub fn select(&self, count: usize) -> Option<usize> {
        match *self {
            Self::Ordinal(index) if index < count => Some(index),
            Self::Last if count > 0 => Some(count - 1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_words() {
        assert_eq!(PositionHint::parse("Second instance"), PositionHint::Ordinal(1));
        assert_eq!(PositionHint::parse("the THIRD one in the table"), PositionHint::Ordinal(2));
        assert_eq!(PositionHint::parse("tenth"), PositionHint::Ordinal(9));
    }

    #[test]
    fn test_numbered_hints() {
        assert_eq!(PositionHint::parse("occurrence 4"), PositionHint::Ordinal(3));
        assert_eq!(PositionHint::parse("#2"), PositionHint::Ordinal(1));
        assert_eq!(PositionHint::parse("3rd one"), PositionHint::Ordinal(2));
        assert_eq!(PositionHint::parse("the 4th"), PositionHint::Ordinal(3));
    }

    #[test]
    fn test_ordinals_qualifying_other_nouns_are_text() {
        for hint in ["second column", "first quarter", "3rd row", "last year", "final dividend"] {
            assert_eq!(PositionHint::parse(hint), PositionHint::Text(hint.to_string()), "{}", hint);
        }
        assert_eq!(PositionHint::parse("second"), PositionHint::Ordinal(1));
        assert_eq!(PositionHint::parse("the last one"), PositionHint::Last);
        assert_eq!(PositionHint::parse("Final"), PositionHint::Last);
    }

    #[test]
    fn test_zero_is_not_an_ordinal() {
        assert_eq!(
            PositionHint::parse("instance 0"),
            PositionHint::Text("instance 0".to_string())
        );
    }

    #[test]
    fn test_free_text_hint() {
        let hint = PositionHint::parse("under Current assets");
        assert_eq!(hint, PositionHint::Text("under Current assets".to_string()));
        assert!(!hint.is_positional());
    }

    #[test]
    fn test_select() {
        assert_eq!(PositionHint::Ordinal(1).select(2), Some(1));
        assert_eq!(PositionHint::Ordinal(2).select(2), None);
        assert_eq!(PositionHint::Last.select(3), Some(2));
        assert_eq!(PositionHint::Last.select(0), None);
        assert_eq!(PositionHint::None.select(5), None);
    }
}
