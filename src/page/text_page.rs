//! In-memory page built from positioned text lines.
//!
//! Lines are concatenated with single spaces into one searchable string while
//! tracking each line's byte range, so a phrase that wraps onto the next line
//! is still found. Glyph extents inside a line are interpolated linearly
//! across the line's bounding box.

use super::{HighlightTarget, PageTextIndex};
use crate::annotation::HighlightAnnotation;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One line of text with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Line text
    pub text: String,
    /// Bounding box of the whole line
    pub bbox: Rect,
}

/// Serialisable description of a page's text layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page number (1-based)
    pub page_number: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text lines in reading order
    #[serde(default)]
    pub lines: Vec<TextLine>,
}

/// A page made of positioned text lines that collects highlight annotations.
#[derive(Debug, Clone)]
pub struct TextPage {
    page_number: usize,
    bounds: Rect,
    lines: Vec<TextLine>,
    /// Concatenated line text
    full_text: String,
    /// Byte range of each line within `full_text`
    positions: Vec<(usize, usize)>,
    annotations: Vec<HighlightAnnotation>,
    read_only: bool,
}

impl TextPage {
    /// Create an empty page.
    pub fn new(page_number: usize, width: f32, height: f32) -> Self {
        Self {
            page_number,
            bounds: Rect::new(0.0, 0.0, width, height),
            lines: Vec::new(),
            full_text: String::new(),
            positions: Vec::new(),
            annotations: Vec::new(),
            read_only: false,
        }
    }

    /// Build a page from a layout description.
    pub fn from_layout(layout: PageLayout) -> Self {
        let mut page = Self::new(layout.page_number, layout.width, layout.height);
        for line in layout.lines {
            page.push_line(line.text, line.bbox);
        }
        page
    }

    /// Append a line.
    pub fn push_line(&mut self, text: impl Into<String>, bbox: Rect) {
        let text = text.into();
        if !self.full_text.is_empty() && !self.full_text.ends_with(' ') {
            self.full_text.push(' ');
        }
        let start = self.full_text.len();
        self.full_text.push_str(&text);
        let end = self.full_text.len();
        self.positions.push((start, end));
        self.lines.push(TextLine { text, bbox });
    }

    /// Append a line and return the page (builder form of [`push_line`](Self::push_line)).
    pub fn with_line(mut self, text: impl Into<String>, bbox: Rect) -> Self {
        self.push_line(text, bbox);
        self
    }

    /// Append a line set in a fixed-pitch font at `(x, y)`.
    ///
    /// Returns the line's bounding box.
    pub fn push_monospace(
        &mut self,
        text: impl Into<String>,
        x: f32,
        y: f32,
        char_width: f32,
        line_height: f32,
    ) -> Rect {
        let text = text.into();
        let bbox = Rect::new(x, y, char_width * text.chars().count() as f32, line_height);
        self.push_line(text, bbox);
        bbox
    }

    /// Page number (1-based).
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// The concatenated, searchable page text.
    pub fn text(&self) -> &str {
        &self.full_text
    }

    /// Highlights drawn so far.
    pub fn annotations(&self) -> &[HighlightAnnotation] {
        &self.annotations
    }

    /// Remove and return the highlights drawn so far.
    pub fn take_annotations(&mut self) -> Vec<HighlightAnnotation> {
        std::mem::take(&mut self.annotations)
    }

    /// Refuse all further highlights (e.g. for locked documents).
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Rectangle covering bytes `start..end` of line `index`.
    fn slice_rect(&self, index: usize, start: usize, end: usize) -> Rect {
        let line = &self.lines[index];
        let total = line.text.chars().count().max(1) as f32;
        let before = line.text[..start].chars().count() as f32;
        let inside = line.text[start..end].chars().count() as f32;
        let x0 = line.bbox.left() + line.bbox.width * before / total;
        let x1 = x0 + line.bbox.width * inside / total;
        Rect::from_points(x0, line.bbox.top(), x1, line.bbox.bottom())
    }
}

impl PageTextIndex for TextPage {
    fn search_occurrences(&self, needle: &str) -> Vec<Vec<Rect>> {
        if needle.is_empty() {
            return Vec::new();
        }
        let regex = match Regex::new(&regex::escape(needle)) {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("Page {}: cannot search for {:?}: {}", self.page_number, needle, e);
                return Vec::new();
            },
        };

        let mut occurrences = Vec::new();
        for mat in regex.find_iter(&self.full_text) {
            let (match_start, match_end) = (mat.start(), mat.end());
            let mut rects = Vec::new();
            for (index, &(line_start, line_end)) in self.positions.iter().enumerate() {
                if line_start >= match_end {
                    break;
                }
                if line_end <= match_start {
                    continue;
                }
                let start = match_start.max(line_start) - line_start;
                let end = match_end.min(line_end) - line_start;
                if end > start {
                    rects.push(self.slice_rect(index, start, end));
                }
            }
            if !rects.is_empty() {
                occurrences.push(rects);
            }
        }
        occurrences
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

impl HighlightTarget for TextPage {
    fn add_highlight(&mut self, annotation: HighlightAnnotation) -> Result<()> {
        if self.read_only {
            return Err(Error::Annotation {
                page: self.page_number,
                reason: "page is read-only".to_string(),
            });
        }
        self.annotations.push(annotation);
        Ok(())
    }
}
