use crate::blink::domain::eye_closure_classifier::{EyeClosureClassifier, EyeObservation};
use crate::detection::domain::face::Face;
use crate::shared::constants::EYE_ALIGNMENT_TOLERANCE_PX;

/// Classifies eyes from the vertical alignment of two detected eye boxes.
///
/// Boxes whose vertical extents overlap are a pair of open eyes. Boxes
/// separated by more than `tolerance` pixels mean one of the detections is
/// not an eye and the eyes are treated as closed. Anything in between, or
/// any count of boxes other than two, is inconclusive.
pub struct GeometryClosureClassifier {
    tolerance: i32,
}

impl GeometryClosureClassifier {
    pub fn new(tolerance: i32) -> Self {
        Self {
            tolerance: tolerance.max(0),
        }
    }
}

impl Default for GeometryClosureClassifier {
    fn default() -> Self {
        Self::new(EYE_ALIGNMENT_TOLERANCE_PX)
    }
}

impl EyeClosureClassifier for GeometryClosureClassifier {
    fn classify(&self, face: &Face) -> EyeObservation {
        let [left, right] = face.eye_rects.as_slice() else {
            return EyeObservation::Inconclusive;
        };

        let gap = left.vertical_gap(right);
        if gap < 0 {
            EyeObservation::Open
        } else if gap > self.tolerance {
            EyeObservation::Closed
        } else {
            EyeObservation::Inconclusive
        }
    }
}
