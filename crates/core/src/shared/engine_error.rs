use thiserror::Error;

/// Failures surfaced by the gaze engine.
///
/// `ResourceLoad` and `InvalidConfig` are fatal and only raised while a
/// session is being built. `Detection`, `InvalidFrameFormat` and
/// `MalformedFrame` are per-frame: the analyzer logs them, skips the frame
/// and carries on.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to load resource {name}: {reason}")]
    ResourceLoad { name: String, reason: String },
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("unsupported frame format: {channels} channels")]
    InvalidFrameFormat { channels: u8 },
    #[error("malformed frame: {actual} bytes, geometry needs {expected}")]
    MalformedFrame { expected: usize, actual: usize },
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
    #[error("analysis worker stopped")]
    WorkerStopped,
    #[error("analysis worker panicked")]
    WorkerPanicked,
}

impl EngineError {
    /// Whether the error only affects the frame it was raised for.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Detection(_)
                | EngineError::InvalidFrameFormat { .. }
                | EngineError::MalformedFrame { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::detection(EngineError::Detection("no face".into()), true)]
    #[case::frame_format(EngineError::InvalidFrameFormat { channels: 2 }, true)]
    #[case::malformed(EngineError::MalformedFrame { expected: 48, actual: 10 }, true)]
    #[case::resource(EngineError::ResourceLoad { name: "eye".into(), reason: "missing".into() }, false)]
    #[case::config(EngineError::InvalidConfig("bad".into()), false)]
    #[case::worker(EngineError::WorkerPanicked, false)]
    fn test_is_recoverable(#[case] error: EngineError, #[case] expected: bool) {
        assert_eq!(error.is_recoverable(), expected);
    }

    #[test]
    fn test_display_messages() {
        let err = EngineError::ResourceLoad {
            name: "haarcascade_eye.xml".into(),
            reason: "file is empty".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load resource haarcascade_eye.xml: file is empty"
        );
        assert_eq!(
            EngineError::InvalidFrameFormat { channels: 2 }.to_string(),
            "unsupported frame format: 2 channels"
        );
    }
}
