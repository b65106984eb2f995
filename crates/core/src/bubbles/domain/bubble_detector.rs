use crate::bubbles::domain::bubble::Bubble;
use crate::detection::domain::face::Face;
use crate::shared::frame::Frame;

/// Derives the live target set from the current camera frame.
///
/// `frame` is upright; `faces` are the detections for that same frame.
pub trait BubbleDetector: Send {
    fn detect_bubbles(&mut self, frame: &Frame, faces: &[Face]) -> Vec<Bubble>;
}
