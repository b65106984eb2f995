use crate::detection::domain::face::Face;
use crate::shared::constants::{GAZE_SCALE_FACTOR, VIRTUAL_GAZE_EXTENT};
use crate::shared::geometry::Point;

/// Maps camera-space landmark coordinates onto the screen.
///
/// There is no calibration or head-pose model: the raw point is scaled by a
/// constant factor and clamped to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeMapper {
    scale: f64,
}

impl GazeMapper {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scales, clamps to `[0, width] × [0, height]` and truncates.
    ///
    /// Total over all inputs: NaN lands on 0 and infinities on the nearest
    /// edge.
    pub fn map_to_screen(&self, raw_x: f64, raw_y: f64, width: i32, height: i32) -> Point {
        Point::new(
            scale_axis(raw_x, self.scale, width),
            scale_axis(raw_y, self.scale, height),
        )
    }

    /// Raw gaze estimate for a face: the midpoint of its eye landmarks.
    pub fn gaze_from_landmarks(face: &Face) -> Option<(f64, f64)> {
        face.landmarks.eye_midpoint()
    }

    /// Convenience for [`gaze_from_landmarks`](Self::gaze_from_landmarks)
    /// followed by [`map_to_screen`](Self::map_to_screen).
    pub fn map_face(&self, face: &Face, width: i32, height: i32) -> Option<Point> {
        let (x, y) = Self::gaze_from_landmarks(face)?;
        Some(self.map_to_screen(x, y, width, height))
    }
}

impl Default for GazeMapper {
    fn default() -> Self {
        Self::new(GAZE_SCALE_FACTOR)
    }
}

fn scale_axis(raw: f64, scale: f64, extent: i32) -> i32 {
    let scaled = raw * scale;
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, f64::from(extent.max(0))) as i32
}

/// Rescales a coordinate from the 0..1000 virtual space to a view dimension.
///
/// Integer arithmetic, truncating toward zero. Out-of-range inputs are not
/// clamped; they simply miss every target.
pub fn normalize_virtual(raw: i32, view_dimension: i32) -> i32 {
    (i64::from(raw) * i64::from(view_dimension) / i64::from(VIRTUAL_GAZE_EXTENT)) as i32
}

/// Applies [`normalize_virtual`] to both axes of a point.
pub fn normalize_virtual_point(point: Point, width: i32, height: i32) -> Point {
    Point::new(
        normalize_virtual(point.x, width),
        normalize_virtual(point.y, height),
    )
}
