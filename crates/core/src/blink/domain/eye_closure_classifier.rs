use crate::detection::domain::face::Face;

/// Per-frame verdict on both eyes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EyeObservation {
    /// Both eyes judged closed.
    Closed,
    /// Both eyes judged open.
    Open,
    /// Missing or contradictory signal; the blink state must not move.
    Inconclusive,
}

/// Turns whatever eye signal a face carries into an [`EyeObservation`].
///
/// Lets the blink debounce run unchanged over probability-based and
/// geometry-based detectors.
pub trait EyeClosureClassifier: Send {
    fn classify(&self, face: &Face) -> EyeObservation;
}
