use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    BLINK_CONFIRM_FRAMES, DEFAULT_BUBBLE_COUNT, DEFAULT_MAX_RADIUS, DEFAULT_MIN_RADIUS,
    EYE_ALIGNMENT_TOLERANCE_PX, EYE_OPEN_PROBABILITY_THRESHOLD, GAZE_SCALE_FACTOR,
};
use crate::shared::engine_error::EngineError;

/// What makes the analyzer resolve a gaze point against the bubbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum PopTrigger {
    /// Pop at the gaze point of a frame on which a blink was confirmed.
    Blink,
    /// Pop wherever the gaze lands, every frame.
    Gaze,
    /// Pop once the gaze stays on the same bubble for `frames` frames.
    Dwell { frames: u32 },
}

/// How the live target set is populated. The strategies are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationStrategy {
    /// Random bubbles spawned once at session start.
    Random,
    /// One target per face, boxed by its eye, nose and mouth landmarks.
    Landmarks,
    /// Circles found in the camera image, refreshed every frame.
    Hough,
}

/// Which signal decides whether the eyes are closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureStrategy {
    Probability,
    Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub bubble_count: usize,
    pub min_radius: i32,
    pub max_radius: i32,
    pub screen_width: i32,
    pub screen_height: i32,
    pub blink_confirm_frames: u32,
    pub eye_open_threshold: f64,
    pub eye_alignment_tolerance: i32,
    pub gaze_scale: f64,
    /// Treat mapped gaze points as 0-1000 virtual coordinates and rescale
    /// them to the screen before hit testing.
    pub virtual_gaze_space: bool,
    pub pop_trigger: PopTrigger,
    pub population: PopulationStrategy,
    pub closure: ClosureStrategy,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bubble_count: DEFAULT_BUBBLE_COUNT,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            screen_width: 1080,
            screen_height: 1920,
            blink_confirm_frames: BLINK_CONFIRM_FRAMES,
            eye_open_threshold: EYE_OPEN_PROBABILITY_THRESHOLD,
            eye_alignment_tolerance: EYE_ALIGNMENT_TOLERANCE_PX,
            gaze_scale: GAZE_SCALE_FACTOR,
            virtual_gaze_space: false,
            pop_trigger: PopTrigger::Blink,
            population: PopulationStrategy::Random,
            closure: ClosureStrategy::Probability,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: SessionConfig = serde_json::from_str(&json).map_err(|e| {
            EngineError::InvalidConfig(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if self.screen_width <= 0 || self.screen_height <= 0 {
            return invalid(format!(
                "screen size must be positive, got {}x{}",
                self.screen_width, self.screen_height
            ));
        }
        if self.min_radius <= 0 || self.min_radius > self.max_radius {
            return invalid(format!(
                "radius range must be positive and ordered, got {}..={}",
                self.min_radius, self.max_radius
            ));
        }
        if i64::from(self.min_radius) * 2 > i64::from(self.screen_width.min(self.screen_height)) {
            return invalid(format!(
                "minimum radius {} does not fit a {}x{} screen",
                self.min_radius, self.screen_width, self.screen_height
            ));
        }
        if self.blink_confirm_frames == 0 {
            return invalid("blink_confirm_frames must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.eye_open_threshold) {
            return invalid(format!(
                "eye_open_threshold must be between 0.0 and 1.0, got {}",
                self.eye_open_threshold
            ));
        }
        if self.eye_alignment_tolerance < 0 {
            return invalid(format!(
                "eye_alignment_tolerance must not be negative, got {}",
                self.eye_alignment_tolerance
            ));
        }
        if !self.gaze_scale.is_finite() || self.gaze_scale <= 0.0 {
            return invalid(format!("gaze_scale must be positive, got {}", self.gaze_scale));
        }
        if let PopTrigger::Dwell { frames: 0 } = self.pop_trigger {
            return invalid("dwell trigger needs at least 1 frame".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bubble_count, 3);
        assert_eq!((config.min_radius, config.max_radius), (80, 150));
        assert_eq!(config.blink_confirm_frames, 10);
        assert_eq!(config.pop_trigger, PopTrigger::Blink);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("session.json");
        let config = SessionConfig {
            bubble_count: 5,
            pop_trigger: PopTrigger::Dwell { frames: 4 },
            population: PopulationStrategy::Hough,
            seed: Some(9),
            ..SessionConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        fs::write(
            &path,
            r#"{ "screen_width": 1000, "screen_height": 1000, "pop_trigger": { "kind": "gaze" }, "closure": "geometry" }"#,
        )
        .unwrap();

        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.screen_width, 1000);
        assert_eq!(config.pop_trigger, PopTrigger::Gaze);
        assert_eq!(config.closure, ClosureStrategy::Geometry);
        assert_eq!(config.bubble_count, 3);
    }

    #[test]
    fn test_load_missing_file_is_invalid_config() {
        let tmp = TempDir::new().unwrap();
        let result = SessionConfig::load(&tmp.path().join("absent.json"));
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_malformed_json_is_invalid_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SessionConfig::load(&path),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[rstest]
    #[case::zero_width(SessionConfig { screen_width: 0, ..SessionConfig::default() })]
    #[case::inverted_radius(SessionConfig { min_radius: 200, max_radius: 100, ..SessionConfig::default() })]
    #[case::zero_radius(SessionConfig { min_radius: 0, ..SessionConfig::default() })]
    #[case::radius_too_large(SessionConfig { screen_width: 100, screen_height: 100, ..SessionConfig::default() })]
    #[case::huge_radius(SessionConfig { min_radius: i32::MAX, max_radius: i32::MAX, ..SessionConfig::default() })]
    #[case::zero_blink_frames(SessionConfig { blink_confirm_frames: 0, ..SessionConfig::default() })]
    #[case::threshold_above_one(SessionConfig { eye_open_threshold: 1.5, ..SessionConfig::default() })]
    #[case::negative_tolerance(SessionConfig { eye_alignment_tolerance: -1, ..SessionConfig::default() })]
    #[case::nan_scale(SessionConfig { gaze_scale: f64::NAN, ..SessionConfig::default() })]
    #[case::zero_dwell(SessionConfig { pop_trigger: PopTrigger::Dwell { frames: 0 }, ..SessionConfig::default() })]
    fn test_validate_rejects(#[case] config: SessionConfig) {
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
