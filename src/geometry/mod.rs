//! Geometric primitives for change localization.
//!
//! Every occurrence returned by a page's text index is normalized into a
//! [`Rect`] once, at the index boundary. Everything downstream (anchoring,
//! block assembly, used-region bookkeeping) works on this single type.
//!
//! Coordinates follow the page's top-left origin: `y` grows downwards, so
//! "below" means a larger `y`.

use serde::{Deserialize, Serialize};

/// A rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points `(x0, y0)` and `(x1, y1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.y, 20.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if this rectangle intersects with another.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
    /// let r3 = Rect::new(200.0, 200.0, 100.0, 100.0);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&r3));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Check whether the horizontal extents of two rectangles touch or overlap.
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        !(self.right() < other.left() || self.left() > other.right())
    }

    /// Horizontal distance between the two rectangles, `0.0` when they overlap
    /// on the x axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::geometry::Rect;
    ///
    /// let label = Rect::from_points(10.0, 0.0, 80.0, 12.0);
    /// let value = Rect::from_points(120.0, 0.0, 160.0, 12.0);
    /// assert_eq!(value.horizontal_gap(&label), 40.0);
    /// assert_eq!(label.horizontal_gap(&value), 40.0);
    /// ```
    pub fn horizontal_gap(&self, other: &Rect) -> f32 {
        if self.left() > other.right() {
            self.left() - other.right()
        } else if self.right() < other.left() {
            other.left() - self.right()
        } else {
            0.0
        }
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 50.0, 50.0);
    /// let union = r1.union(&r2);
    ///
    /// assert_eq!(union.x, 0.0);
    /// assert_eq!(union.y, 0.0);
    /// assert_eq!(union.right(), 75.0);
    /// assert_eq!(union.bottom(), 75.0);
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Union of every rectangle in `rects`, or `None` for an empty slice.
    pub fn union_all(rects: &[Rect]) -> Option<Rect> {
        let (first, rest) = rects.split_first()?;
        Some(rest.iter().fold(*first, |acc, r| acc.union(r)))
    }

    /// Grow the rectangle by per-side margins.
    pub fn expand(&self, margins: &Margins) -> Rect {
        Rect::from_points(
            self.left() - margins.left,
            self.top() - margins.top,
            self.right() + margins.right,
            self.bottom() + margins.bottom,
        )
    }

    /// Clip the rectangle to `bounds`.
    pub fn clamp_to(&self, bounds: &Rect) -> Rect {
        Rect::from_points(
            self.left().max(bounds.left()),
            self.top().max(bounds.top()),
            self.right().min(bounds.right()),
            self.bottom().min(bounds.bottom()),
        )
    }

    /// Rounded `(y0, x0)` key used to recognise an already-highlighted region.
    ///
    /// `precision` is the number of decimal places kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use change_highlight::geometry::Rect;
    ///
    /// let a = Rect::new(72.004, 100.001, 40.0, 12.0);
    /// let b = Rect::new(72.0, 100.0, 90.0, 12.0);
    /// assert_eq!(a.position_key(2), b.position_key(2));
    /// ```
    pub fn position_key(&self, precision: u32) -> PositionKey {
        let scale = 10f64.powi(precision as i32);
        PositionKey {
            y: (self.y as f64 * scale).round() as i64,
            x: (self.x as f64 * scale).round() as i64,
        }
    }

    /// Ordering by top edge, then left edge (reading order).
    pub fn reading_order(a: &Rect, b: &Rect) -> std::cmp::Ordering {
        a.top()
            .total_cmp(&b.top())
            .then_with(|| a.left().total_cmp(&b.left()))
    }
}

/// Per-side growth applied to an anchor to derive a search region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Growth to the left
    pub left: f32,
    /// Growth upwards
    pub top: f32,
    /// Growth to the right
    pub right: f32,
    /// Growth downwards
    pub bottom: f32,
}

impl Margins {
    /// Create margins from the four sides.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same margin on every side.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Rounded top-left position of a region, in units of `10^-precision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey {
    /// Rounded top edge
    pub y: i64,
    /// Rounded left edge
    pub x: i64,
}
