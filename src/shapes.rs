use nalgebra as na;

use crate::{
    error::{Error, Result},
    P2,
};

/// Represents an axis-aligned rectangle defined by two points: the start (minimum corner)
/// and the end (maximum corner). It is used as the boundary of tree nodes and provides
/// the geometric helpers needed to cut a node into quadrants.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    start: P2,
    center: P2,
    end: P2,
}

impl Rect {
    /// Create a new rect with a start and end point
    pub fn new(start: P2, end: P2) -> Self {
        Self {
            start,
            center: na::center(&start, &end),
            end,
        }
    }

    /// Create a new rect, failing unless `start` is finite and strictly below `end` on
    /// both axes
    pub fn checked(start: P2, end: P2) -> Result<Self> {
        for (axis, min, max) in [('X', start.x, end.x), ('Y', start.y, end.y)] {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(Error::Geometry { axis, min, max });
            }
        }
        Ok(Self::new(start, end))
    }

    /// Get the start (minimum) corner of the rect
    pub fn start(&self) -> P2 {
        self.start
    }

    /// Get the end (maximum) corner of the rect
    pub fn end(&self) -> P2 {
        self.end
    }

    /// Get the center point of the rect
    pub fn center(&self) -> P2 {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn height(&self) -> f64 {
        self.end.y - self.start.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check if a point lies within the rect, edges included
    pub fn contains(&self, point: &P2) -> bool {
        point.x >= self.start.x
            && point.x <= self.end.x
            && point.y >= self.start.y
            && point.y <= self.end.y
    }

    /// Cut the rect at `cut` to produce four smaller rects that tile it exactly.
    ///
    /// Quadrants are returned in TopLeft, TopRight, BottomLeft, BottomRight order,
    /// where "top" and "left" are the sides of the start corner.
    pub fn split_at(&self, cut: P2) -> [Self; 4] {
        let &Rect { start, end, .. } = self;

        [
            Rect::new(start, cut),
            Rect::new(P2::new(cut.x, start.y), P2::new(end.x, cut.y)),
            Rect::new(P2::new(start.x, cut.y), P2::new(cut.x, end.y)),
            Rect::new(cut, end),
        ]
    }

    /// Quarter the rect at its center
    pub fn quarter(&self) -> [Self; 4] {
        self.split_at(self.center)
    }
}
