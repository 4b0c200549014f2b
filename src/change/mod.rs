//! Change records produced by the upstream comparison stage.
//!
//! A [`ChangeRecord`] is an immutable description of one difference between
//! two document versions: what changed, the literal to hunt for, and a set of
//! noisy hints about where it sits on the page. Records arrive as JSON keyed
//! by 1-based page number (see [`load_page_changes`]).

mod hint;

pub use hint::PositionHint;

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Old values that mean "there was nothing here".
const PLACEHOLDER_VALUES: &[&str] = &["-", "\u{2013}", "\u{2014}", "empty", "n/a", "none", "nil", "null"];

/// Kind of change described by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A number changed (amounts, note references, percentages)
    #[default]
    #[serde(alias = "numerical")]
    Numeric,
    /// Text present only in the new version
    TextAdded,
    /// Text present in both versions with different wording
    TextModified,
    /// Text present only in the old version
    TextDeleted,
}

impl ChangeKind {
    /// Whether the change is about running text rather than a number.
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::Numeric)
    }

    /// Stable name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::TextAdded => "text_added",
            Self::TextModified => "text_modified",
            Self::TextDeleted => "text_deleted",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change between two document versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeRecord {
    /// What kind of change this is
    #[serde(rename = "change_type", alias = "kind")]
    pub kind: ChangeKind,
    /// Value in the old document (may be empty)
    #[serde(alias = "old", deserialize_with = "string_or_number")]
    pub old_value: String,
    /// Value in the new document (may be empty)
    #[serde(alias = "new", deserialize_with = "string_or_number")]
    pub new_value: String,
    /// Preferred literal to search for; may be stale or corrupted
    #[serde(deserialize_with = "string_or_number")]
    pub search_text: String,
    /// Text immediately preceding the change
    #[serde(deserialize_with = "string_or_number")]
    pub context_before: String,
    /// Text immediately following the change
    #[serde(deserialize_with = "string_or_number")]
    pub context_after: String,
    /// Table row label the change belongs to
    #[serde(deserialize_with = "string_or_number")]
    pub row_label: String,
    /// Section heading the change belongs to
    #[serde(deserialize_with = "string_or_number")]
    pub section: String,
    /// Disambiguator for repeated values, e.g. "second instance"
    #[serde(deserialize_with = "string_or_number")]
    pub position_hint: String,
}

impl ChangeRecord {
    /// Create an empty record of the given kind.
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Numeric change from `old` to `new`.
    pub fn numeric(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self::new(ChangeKind::Numeric).with_old(old).with_new(new)
    }

    /// Text added in the new document.
    pub fn text_added(new: impl Into<String>) -> Self {
        Self::new(ChangeKind::TextAdded).with_new(new)
    }

    /// Text reworded between the documents.
    pub fn text_modified(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self::new(ChangeKind::TextModified).with_old(old).with_new(new)
    }

    /// Text removed from the new document.
    pub fn text_deleted(old: impl Into<String>) -> Self {
        Self::new(ChangeKind::TextDeleted).with_old(old)
    }

    /// Set the old value.
    pub fn with_old(mut self, value: impl Into<String>) -> Self {
        self.old_value = value.into();
        self
    }

    /// Set the new value.
    pub fn with_new(mut self, value: impl Into<String>) -> Self {
        self.new_value = value.into();
        self
    }

    /// Set the search text.
    pub fn with_search_text(mut self, value: impl Into<String>) -> Self {
        self.search_text = value.into();
        self
    }

    /// Set the preceding context.
    pub fn with_context_before(mut self, value: impl Into<String>) -> Self {
        self.context_before = value.into();
        self
    }

    /// Set the following context.
    pub fn with_context_after(mut self, value: impl Into<String>) -> Self {
        self.context_after = value.into();
        self
    }

    /// Set the row label.
    pub fn with_row_label(mut self, value: impl Into<String>) -> Self {
        self.row_label = value.into();
        self
    }

    /// Set the section.
    pub fn with_section(mut self, value: impl Into<String>) -> Self {
        self.section = value.into();
        self
    }

    /// Set the position hint.
    pub fn with_position_hint(mut self, value: impl Into<String>) -> Self {
        self.position_hint = value.into();
        self
    }

    /// The literal to locate: `search_text` when present, else `new_value`.
    pub fn effective_search_text(&self) -> &str {
        let search = self.search_text.trim();
        if search.is_empty() {
            self.new_value.trim()
        } else {
            search
        }
    }

    /// Whether any location hint (row label, context, section) is present.
    pub fn has_context(&self) -> bool {
        [
            &self.row_label,
            &self.context_before,
            &self.context_after,
            &self.section,
        ]
        .iter()
        .any(|hint| !hint.trim().is_empty())
    }

    /// Whether the old value names something that can be found on the page.
    pub fn has_meaningful_old_value(&self) -> bool {
        let old = self.old_value.trim();
        !old.is_empty()
            && !PLACEHOLDER_VALUES
                .iter()
                .any(|p| old.eq_ignore_ascii_case(p))
    }

    /// Parsed position hint.
    pub fn position(&self) -> PositionHint {
        PositionHint::parse(&self.position_hint)
    }

    /// Copy of this record with a correction applied.
    ///
    /// Records are never corrected in place; callers that trust the engine's
    /// resolved literal backfill a copy.
    pub fn apply_correction(&self, correction: &Correction) -> ChangeRecord {
        let mut corrected = self.clone();
        match correction.field {
            CorrectedField::SearchText => corrected.search_text = correction.resolved.clone(),
            CorrectedField::NewValue => corrected.new_value = correction.resolved.clone(),
        }
        corrected
    }
}

/// Field of a [`ChangeRecord`] that a correction replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectedField {
    /// The search literal
    SearchText,
    /// The new value
    NewValue,
}

/// A better literal discovered while locating a change.
///
/// Emitted when the record's own `search_text` did not locate the change and
/// a different literal did. The record itself stays untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    /// Field the resolved literal replaces
    pub field: CorrectedField,
    /// Value the record carried
    pub original: String,
    /// Literal that located the change on the page
    pub resolved: String,
    /// Strategy that resolved it
    pub strategy: &'static str,
}

/// Parse upstream change records keyed by 1-based page number.
///
/// # Examples
///
/// ```
/// use change_highlight::change::{load_page_changes, ChangeKind};
///
/// let json = r#"{"2": [{"change_type": "numerical", "old": "195", "new": 193}]}"#;
/// let pages = load_page_changes(json).unwrap();
/// let change = &pages[&2][0];
/// assert_eq!(change.kind, ChangeKind::Numeric);
/// assert_eq!(change.new_value, "193");
/// ```
pub fn load_page_changes(json: &str) -> Result<BTreeMap<usize, Vec<ChangeRecord>>> {
    let raw: BTreeMap<String, Vec<ChangeRecord>> = serde_json::from_str(json)?;
    let mut pages = BTreeMap::new();
    for (key, records) in raw {
        let page: usize = key
            .trim()
            .parse()
            .map_err(|_| Error::InvalidRecord(format!("page key '{}' is not a number", key)))?;
        if page == 0 {
            return Err(Error::InvalidRecord("page numbers start at 1".to_string()));
        }
        pages.entry(page).or_insert_with(Vec::new).extend(records);
    }
    Ok(pages)
}

/// Read and parse a change file (see [`load_page_changes`]).
pub fn load_page_changes_file(path: impl AsRef<Path>) -> Result<BTreeMap<usize, Vec<ChangeRecord>>> {
    let json = std::fs::read_to_string(path)?;
    load_page_changes(&json)
}

/// Upstream values are sometimes bare JSON numbers or null.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}
