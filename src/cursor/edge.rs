//! Edge Guard
//!
//! Pure geometry for keeping the pointer away from the screen edges while
//! locked. Hot corners, edge-triggered task bars and similar shell features
//! react to a pointer resting within a few pixels of an edge; moving the
//! pointer to a fixed safe point near the center keeps them dormant.

use crate::platform::{Point, ScreenBounds};

/// Smallest accepted edge margin (pixels)
pub const MIN_EDGE_MARGIN: i32 = 5;

/// Largest accepted edge margin (pixels)
pub const MAX_EDGE_MARGIN: i32 = 20;

/// Default edge margin (pixels)
pub const DEFAULT_EDGE_MARGIN: i32 = 10;

/// Edge margin check and safe-point computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeGuard {
    margin: i32,
    offset: Point,
}

impl EdgeGuard {
    /// Create a guard with `margin` pixels and a safe-point `offset` from the center
    ///
    /// The margin is clamped into `MIN_EDGE_MARGIN..=MAX_EDGE_MARGIN`.
    pub fn new(margin: i32, offset: Point) -> Self {
        Self {
            margin: margin.clamp(MIN_EDGE_MARGIN, MAX_EDGE_MARGIN),
            offset,
        }
    }

    /// Edge margin in pixels
    pub fn margin(&self) -> i32 {
        self.margin
    }

    /// Whether the screen leaves room for a point outside the margin
    pub fn fits(&self, bounds: ScreenBounds) -> bool {
        bounds.width > 2 * self.margin && bounds.height > 2 * self.margin
    }

    /// Whether `pos` lies within the margin of any edge
    ///
    /// Positions off-screen (negative or past the far edge, as happens on
    /// multi-monitor setups) count as near the edge.
    pub fn is_near_edge(&self, pos: Point, bounds: ScreenBounds) -> bool {
        let m = self.margin;
        pos.x < m || pos.y < m || pos.x >= bounds.width - m || pos.y >= bounds.height - m
    }

    /// Relocation target: screen center plus the configured offset
    ///
    /// Falls back to the exact center when the offset would land inside the
    /// margin.
    pub fn safe_point(&self, bounds: ScreenBounds) -> Point {
        let center = bounds.center();
        let candidate = Point::new(center.x + self.offset.x, center.y + self.offset.y);
        if self.is_near_edge(candidate, bounds) {
            center
        } else {
            candidate
        }
    }

    /// Target to move the pointer to, or None when it may stay
    ///
    /// Returns None on screens too small to hold a safe point.
    pub fn correction(&self, pos: Point, bounds: ScreenBounds) -> Option<Point> {
        if !self.fits(bounds) || !self.is_near_edge(pos, bounds) {
            return None;
        }
        Some(self.safe_point(bounds))
    }
}

impl Default for EdgeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_MARGIN, Point::default())
    }
}
