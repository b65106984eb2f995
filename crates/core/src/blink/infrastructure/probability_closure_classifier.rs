use crate::blink::domain::eye_closure_classifier::{EyeClosureClassifier, EyeObservation};
use crate::detection::domain::face::Face;
use crate::shared::constants::EYE_OPEN_PROBABILITY_THRESHOLD;

/// Classifies eyes from per-eye open probabilities.
///
/// Both eyes below the threshold is a closure, both at or above it is open.
/// A missing probability or a split verdict is inconclusive.
pub struct ProbabilityClosureClassifier {
    threshold: f64,
}

impl ProbabilityClosureClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ProbabilityClosureClassifier {
    fn default() -> Self {
        Self::new(EYE_OPEN_PROBABILITY_THRESHOLD)
    }
}

impl EyeClosureClassifier for ProbabilityClosureClassifier {
    fn classify(&self, face: &Face) -> EyeObservation {
        let (Some(left), Some(right)) = (
            face.left_eye_open_probability,
            face.right_eye_open_probability,
        ) else {
            return EyeObservation::Inconclusive;
        };

        match (left < self.threshold, right < self.threshold) {
            (true, true) => EyeObservation::Closed,
            (false, false) => EyeObservation::Open,
            _ => EyeObservation::Inconclusive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::both_closed(0.1, 0.2, EyeObservation::Closed)]
    #[case::both_open(0.9, 0.8, EyeObservation::Open)]
    #[case::at_threshold_is_open(0.4, 0.4, EyeObservation::Open)]
    #[case::just_below(0.39, 0.39, EyeObservation::Closed)]
    #[case::left_only_closed(0.1, 0.9, EyeObservation::Inconclusive)]
    #[case::right_only_closed(0.9, 0.1, EyeObservation::Inconclusive)]
    fn test_classify_probabilities(
        #[case] left: f64,
        #[case] right: f64,
        #[case] expected: EyeObservation,
    ) {
        let face = Face::default().with_eye_probabilities(left, right);
        assert_eq!(
            ProbabilityClosureClassifier::default().classify(&face),
            expected
        );
    }

    #[test]
    fn test_missing_probability_is_inconclusive() {
        let classifier = ProbabilityClosureClassifier::default();
        assert_eq!(
            classifier.classify(&Face::default()),
            EyeObservation::Inconclusive
        );

        let one_eye = Face {
            left_eye_open_probability: Some(0.05),
            ..Face::default()
        };
        assert_eq!(classifier.classify(&one_eye), EyeObservation::Inconclusive);
    }

    #[test]
    fn test_custom_threshold() {
        let classifier = ProbabilityClosureClassifier::new(0.7);
        let face = Face::default().with_eye_probabilities(0.6, 0.5);
        assert_eq!(classifier.classify(&face), EyeObservation::Closed);
        assert_eq!(classifier.threshold(), 0.7);
    }
}
