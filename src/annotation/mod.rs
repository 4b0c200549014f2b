//! Highlight annotations issued for located changes.
//!
//! A [`HighlightAnnotation`] mirrors a PDF text markup annotation of subtype
//! `Highlight`: a bounding rectangle, the QuadPoints covering the text, and a
//! stroke colour. Pages receive them through
//! [`HighlightTarget`](crate::page::HighlightTarget).
//!
//! # Example
//!
//! ```
//! use change_highlight::annotation::{AnnotationColor, HighlightAnnotation};
//! use change_highlight::geometry::Rect;
//!
//! let highlight = HighlightAnnotation::from_rect(Rect::new(72.0, 720.0, 100.0, 12.0))
//!     .with_color(AnnotationColor::amber())
//!     .with_contents("150,000");
//! assert_eq!(highlight.quad_points.len(), 1);
//! ```

use crate::change::ChangeKind;
use crate::geometry::Rect;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Annotation colour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AnnotationColor {
    /// No color (transparent)
    #[default]
    None,
    /// RGB color (3 components)
    Rgb(f32, f32, f32),
}

impl AnnotationColor {
    /// Amber, the colour used for changed content.
    pub fn amber() -> Self {
        Self::Rgb(1.0, 0.9, 0.4)
    }

    /// Create green color.
    pub fn green() -> Self {
        Self::Rgb(0.0, 1.0, 0.0)
    }

    /// Create red color.
    pub fn red() -> Self {
        Self::Rgb(1.0, 0.0, 0.0)
    }

    pub(crate) fn is_valid(&self) -> bool {
        match *self {
            Self::None => true,
            Self::Rgb(r, g, b) => [r, g, b].iter().all(|c| (0.0..=1.0).contains(c)),
        }
    }
}

/// Colours assigned to highlights by change kind.
///
/// Deletions have no entry: removed text does not exist on the page being
/// annotated, so it is reported but never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightPalette {
    /// Colour for added text
    pub added: AnnotationColor,
    /// Colour for modified text and numeric changes
    pub modified: AnnotationColor,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            added: AnnotationColor::amber(),
            modified: AnnotationColor::amber(),
        }
    }
}

impl HighlightPalette {
    /// Colour for a change kind, `None` for kinds that are never drawn.
    pub fn color_for(&self, kind: ChangeKind) -> Option<AnnotationColor> {
        match kind {
            ChangeKind::TextAdded => Some(self.added),
            ChangeKind::TextModified | ChangeKind::Numeric => Some(self.modified),
            ChangeKind::TextDeleted => None,
        }
    }
}

/// Colour and popup text given to every highlight drawn for one change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlightStyle {
    /// Stroke colour
    pub color: AnnotationColor,
    /// Popup contents, typically the literal that was located
    pub contents: Option<String>,
    /// Popup subject, typically the change kind
    pub subject: Option<String>,
}

impl HighlightStyle {
    /// A style with only a colour.
    pub fn new(color: AnnotationColor) -> Self {
        Self {
            color,
            contents: None,
            subject: None,
        }
    }

    /// Set the popup contents.
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    /// Set the popup subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Apply colour, contents and subject to `annotation`.
    pub fn apply(&self, annotation: HighlightAnnotation) -> HighlightAnnotation {
        let mut annotation = annotation.with_color(self.color);
        annotation.contents = self.contents.clone();
        annotation.subject = self.subject.clone();
        annotation
    }
}

impl From<AnnotationColor> for HighlightStyle {
    fn from(color: AnnotationColor) -> Self {
        Self::new(color)
    }
}

/// A highlight annotation.
///
/// QuadPoints use the PDF ordering: each quad is 8 numbers
/// `x1,y1, x2,y2, x3,y3, x4,y4`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightAnnotation {
    /// Bounding rectangle
    pub rect: Rect,
    /// QuadPoints defining the highlighted area
    pub quad_points: Vec<[f64; 8]>,
    /// Stroke colour
    pub color: AnnotationColor,
    /// Opacity (0.0 = transparent, 1.0 = opaque)
    pub opacity: Option<f32>,
    /// Text contents shown in the annotation popup
    pub contents: Option<String>,
    /// Subject of the annotation
    pub subject: Option<String>,
    /// Creation date (PDF date format)
    pub creation_date: Option<String>,
}

impl HighlightAnnotation {
    /// Create a highlight covering `rect` with explicit QuadPoints.
    pub fn new(rect: Rect, quad_points: Vec<[f64; 8]>) -> Self {
        Self {
            rect,
            quad_points,
            color: AnnotationColor::amber(),
            opacity: None,
            contents: None,
            subject: None,
            creation_date: None,
        }
    }

    /// Create from a simple rectangle (generates quad points automatically).
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect, vec![quad_from_rect(&rect)])
    }

    /// Set the colour.
    pub fn with_color(mut self, color: AnnotationColor) -> Self {
        self.color = color;
        self
    }

    /// Set the opacity (0.0 = transparent, 1.0 = opaque).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity.clamp(0.0, 1.0));
        self
    }

    /// Set the contents (description text).
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    /// Set the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Stamp the creation date.
    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(pdf_date(&date));
        self
    }
}

/// QuadPoints for a single rectangle.
pub fn quad_from_rect(rect: &Rect) -> [f64; 8] {
    let (x0, y0) = (rect.left() as f64, rect.top() as f64);
    let (x1, y1) = (rect.right() as f64, rect.bottom() as f64);
    [x0, y0, x1, y0, x1, y1, x0, y1]
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub fn pdf_date(date: &DateTime<Utc>) -> String {
    format!("D:{}Z", date.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_rect_quad_points() {
        let rect = Rect::new(100.0, 200.0, 50.0, 20.0);
        let highlight = HighlightAnnotation::from_rect(rect);

        assert_eq!(highlight.quad_points.len(), 1);
        let quad = &highlight.quad_points[0];
        assert_eq!(quad[0], 100.0);
        assert_eq!(quad[1], 200.0);
        assert_eq!(quad[2], 150.0);
        assert_eq!(quad[5], 220.0);
    }

    #[test]
    fn test_fluent_builder() {
        let highlight = HighlightAnnotation::from_rect(Rect::new(72.0, 720.0, 100.0, 12.0))
            .with_color(AnnotationColor::green())
            .with_opacity(1.7)
            .with_contents("Note")
            .with_subject("Text added");

        assert_eq!(highlight.color, AnnotationColor::Rgb(0.0, 1.0, 0.0));
        assert_eq!(highlight.opacity, Some(1.0));
        assert_eq!(highlight.contents.as_deref(), Some("Note"));
        assert_eq!(highlight.subject.as_deref(), Some("Text added"));
    }

    #[test]
    fn test_palette_never_colours_deletions() {
        let palette = HighlightPalette::default();
        assert_eq!(palette.color_for(ChangeKind::TextAdded), Some(AnnotationColor::amber()));
        assert_eq!(palette.color_for(ChangeKind::Numeric), Some(AnnotationColor::amber()));
        assert_eq!(palette.color_for(ChangeKind::TextDeleted), None);
    }

    #[test]
    fn test_style_applies_popup_text() {
        let style = HighlightStyle::new(AnnotationColor::red())
            .with_contents("150,000")
            .with_subject("numeric");
        let highlight = style.apply(HighlightAnnotation::from_rect(Rect::new(72.0, 100.0, 42.0, 12.0)));

        assert_eq!(highlight.color, AnnotationColor::red());
        assert_eq!(highlight.contents.as_deref(), Some("150,000"));
        assert_eq!(highlight.subject.as_deref(), Some("numeric"));
        assert_eq!(HighlightStyle::from(AnnotationColor::amber()).contents, None);
    }

    #[test]
    fn test_color_validity() {
        assert!(AnnotationColor::amber().is_valid());
        assert!(AnnotationColor::None.is_valid());
        assert!(!AnnotationColor::Rgb(1.5, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_pdf_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(pdf_date(&date), "D:20240309140500Z");

        let highlight = HighlightAnnotation::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0))
            .with_creation_date(date);
        assert_eq!(highlight.creation_date.as_deref(), Some("D:20240309140500Z"));
    }
}
