use crate::shared::geometry::{Point, Rect};

/// A circular target stored as its bounding box.
///
/// Two bubbles are the same bubble when their boxes are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bubble {
    bounds: Rect,
}

impl Bubble {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    pub fn from_circle(center: Point, radius: i32) -> Self {
        Self::new(Rect::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        ))
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Half the box width.
    pub fn radius(&self) -> i32 {
        self.bounds.width() / 2
    }

    /// Hit test against the bounding box, half-open on the far edges.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }
}

impl From<Rect> for Bubble {
    fn from(bounds: Rect) -> Self {
        Self::new(bounds)
    }
}
