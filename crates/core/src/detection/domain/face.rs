use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::geometry::Rect;

/// One face reported for one frame.
///
/// Every signal is optional: a landmark detector fills probabilities and
/// landmarks, a cascade detector fills the bounding box and eye rectangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Face {
    pub bounds: Option<Rect>,
    pub left_eye_open_probability: Option<f64>,
    pub right_eye_open_probability: Option<f64>,
    pub landmarks: FaceLandmarks,
    /// Eye rectangles in frame coordinates, in detection order.
    pub eye_rects: Vec<Rect>,
}

impl Face {
    pub fn with_eye_probabilities(mut self, left: f64, right: f64) -> Self {
        self.left_eye_open_probability = Some(left);
        self.right_eye_open_probability = Some(right);
        self
    }

    pub fn with_landmarks(mut self, landmarks: FaceLandmarks) -> Self {
        self.landmarks = landmarks;
        self
    }

    pub fn with_eye_rects(mut self, eye_rects: Vec<Rect>) -> Self {
        self.eye_rects = eye_rects;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }
}
