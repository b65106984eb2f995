/// Integer screen-space point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as edges.
///
/// Containment is half-open: `left <= x < right` and `top <= y < bottom`,
/// so two rectangles sharing an edge never both contain a point on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        self.left <= point.x && point.x < self.right && self.top <= point.y && point.y < self.bottom
    }

    /// Signed vertical distance between two rectangles.
    ///
    /// Negative when their vertical extents overlap, zero when they touch,
    /// positive when separated by a gap.
    pub fn vertical_gap(&self, other: &Rect) -> i32 {
        (self.top - other.bottom).max(other.top - self.bottom)
    }

    /// Clips the rectangle to `[0, width) × [0, height)`.
    pub fn clamp_to(&self, width: i32, height: i32) -> Rect {
        Rect::new(
            self.left.clamp(0, width),
            self.top.clamp(0, height),
            self.right.clamp(0, width),
            self.bottom.clamp(0, height),
        )
    }
}
