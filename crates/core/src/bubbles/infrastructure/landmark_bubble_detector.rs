use crate::bubbles::domain::bubble::Bubble;
use crate::bubbles::domain::bubble_detector::BubbleDetector;
use crate::detection::domain::face::Face;
use crate::detection::domain::face_landmarks::{FaceLandmarks, LandmarkKind};
use crate::shared::frame::Frame;
use crate::shared::geometry::Rect;

/// Turns each fully landmarked face into one target.
///
/// The box spans the eyes horizontally and runs from the nose base down to
/// the bottom of the mouth. Faces missing any of the six landmarks are
/// skipped.
pub struct LandmarkBubbleDetector;

impl LandmarkBubbleDetector {
    fn bubble_for(landmarks: &FaceLandmarks) -> Option<Bubble> {
        if !landmarks.has_all() {
            return None;
        }
        let (left_x, _) = landmarks.get(LandmarkKind::LeftEye)?;
        let (right_x, _) = landmarks.get(LandmarkKind::RightEye)?;
        let (_, nose_y) = landmarks.get(LandmarkKind::NoseBase)?;
        let (_, mouth_y) = landmarks.get(LandmarkKind::MouthBottom)?;

        // Mirrored cameras report the eyes swapped
        let (l, r) = (left_x as i32, right_x as i32);
        let (t, b) = (nose_y as i32, mouth_y as i32);
        let rect = Rect::new(l.min(r), t.min(b), l.max(r), t.max(b));
        (!rect.is_empty()).then(|| Bubble::new(rect))
    }
}

impl BubbleDetector for LandmarkBubbleDetector {
    fn detect_bubbles(&mut self, _frame: &Frame, faces: &[Face]) -> Vec<Bubble> {
        faces
            .iter()
            .filter_map(|face| Self::bubble_for(&face.landmarks))
            .collect()
    }
}
