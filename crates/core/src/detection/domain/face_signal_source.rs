use crate::detection::domain::face::Face;
use crate::shared::frame::Frame;

/// Domain interface for per-frame face analysis.
///
/// Called at most once per frame from the analysis worker, so a call is the
/// single suspension point of a cycle. Implementations may keep state
/// between frames, hence `&mut self`.
pub trait FaceSignalSource: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Face>, Box<dyn std::error::Error>>;
}
