//! Integer screen rectangles used for control placement
//!
//! Rectangles are plain `Copy` values. Every mutation produces a new value,
//! so a rectangle handed to one tracker can never be changed behind its back
//! by another holder.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in surface pixels.
///
/// `right` and `bottom` are exclusive, the same convention touch surfaces
/// use when hit-testing a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Build a rectangle from its top-left corner and size
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Horizontal center, rounded toward negative infinity
    pub const fn center_x(&self) -> i32 {
        (self.left + self.right) >> 1
    }

    /// Vertical center, rounded toward negative infinity
    pub const fn center_y(&self) -> i32 {
        (self.top + self.bottom) >> 1
    }

    /// A rectangle with no area never contains anything
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Hit test with an exclusive right/bottom edge.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Same rectangle translated by `(dx, dy)`
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Same size, re-centered on `(x, y)`
    #[must_use]
    pub const fn centered_on(&self, x: i32, y: i32) -> Self {
        self.offset(x - self.center_x(), y - self.center_y())
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}][{},{}]", self.left, self.top, self.right, self.bottom)
    }
}
