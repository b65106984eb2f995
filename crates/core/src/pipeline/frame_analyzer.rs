use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::blink::domain::blink_state_machine::{BlinkEvent, BlinkStateMachine};
use crate::blink::domain::eye_closure_classifier::EyeClosureClassifier;
use crate::bubbles::domain::bubble::Bubble;
use crate::bubbles::domain::bubble_detector::BubbleDetector;
use crate::bubbles::domain::bubble_field::BubbleField;
use crate::detection::domain::face::Face;
use crate::detection::domain::face_signal_source::FaceSignalSource;
use crate::gaze::domain::gaze_mapper::{normalize_virtual_point, GazeMapper};
use crate::pipeline::analysis_logger::{AnalysisLogger, NullAnalysisLogger};
use crate::shared::engine_error::EngineError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;
use crate::shared::session_config::PopTrigger;

/// Why a frame produced no blink or gaze update.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    InvalidFrameFormat { channels: u8 },
    MalformedBuffer { expected: usize, actual: usize },
    DetectionFailed(String),
    NoFace,
}

/// What one call to [`FrameAnalyzer::on_frame`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    pub index: usize,
    pub skipped: Option<SkipReason>,
    pub blink: Option<BlinkEvent>,
    pub gaze: Option<Point>,
    pub popped: Option<Bubble>,
}

/// Clears the busy flag however `on_frame` returns.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn enter(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Dwell {
    bubble: Bubble,
    frames: u32,
}

/// Runs one camera frame through detection, blink debouncing, gaze mapping
/// and target resolution.
///
/// Owns all mutable session state, so frames must be fed sequentially from
/// a single thread. Per-frame failures are logged and reported in the
/// outcome; they never end the session.
pub struct FrameAnalyzer {
    source: Box<dyn FaceSignalSource>,
    classifier: Box<dyn EyeClosureClassifier>,
    blink: BlinkStateMachine,
    mapper: GazeMapper,
    field: BubbleField,
    detector: Option<Box<dyn BubbleDetector>>,
    logger: Box<dyn AnalysisLogger>,
    trigger: PopTrigger,
    screen: (i32, i32),
    virtual_gaze: bool,
    dwell: Option<Dwell>,
    busy: Arc<AtomicBool>,
}

impl FrameAnalyzer {
    pub fn new(
        source: Box<dyn FaceSignalSource>,
        classifier: Box<dyn EyeClosureClassifier>,
        field: BubbleField,
        screen_width: i32,
        screen_height: i32,
    ) -> Self {
        Self {
            source,
            classifier,
            blink: BlinkStateMachine::default(),
            mapper: GazeMapper::default(),
            field,
            detector: None,
            logger: Box::new(NullAnalysisLogger),
            trigger: PopTrigger::Blink,
            screen: (screen_width, screen_height),
            virtual_gaze: false,
            dwell: None,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_blink_machine(mut self, blink: BlinkStateMachine) -> Self {
        self.blink = blink;
        self
    }

    pub fn with_gaze_mapper(mut self, mapper: GazeMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_trigger(mut self, trigger: PopTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Interpret mapped gaze points as 0..1000 virtual coordinates.
    pub fn with_virtual_gaze(mut self, enabled: bool) -> Self {
        self.virtual_gaze = enabled;
        self
    }

    /// Refresh the live set from every analyzed frame.
    pub fn with_bubble_detector(mut self, detector: Box<dyn BubbleDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn AnalysisLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Shared handle on the busy flag; true while a frame is being analyzed.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        self.busy.clone()
    }

    pub fn field(&self) -> &BubbleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut BubbleField {
        &mut self.field
    }

    pub fn blink_machine(&self) -> &BlinkStateMachine {
        &self.blink
    }

    pub fn logger(&self) -> &dyn AnalysisLogger {
        &*self.logger
    }

    pub fn on_frame(&mut self, frame: Frame) -> FrameOutcome {
        let _guard = BusyGuard::enter(self.busy.clone());
        let mut outcome = FrameOutcome {
            index: frame.index(),
            ..FrameOutcome::default()
        };
        self.logger.frame_done(outcome.index);

        if !matches!(frame.channels(), 1 | 3 | 4) {
            let err = EngineError::InvalidFrameFormat {
                channels: frame.channels(),
            };
            log::warn!("Skipping frame {}: {err}", outcome.index);
            return self.skip(outcome, SkipReason::InvalidFrameFormat {
                channels: frame.channels(),
            });
        }
        if !frame.is_well_formed() {
            let (expected, actual) = (frame.expected_len(), frame.data().len());
            let err = EngineError::MalformedFrame { expected, actual };
            log::warn!("Skipping frame {}: {err}", outcome.index);
            return self.skip(outcome, SkipReason::MalformedBuffer { expected, actual });
        }
        let frame = frame.into_upright();

        let start = Instant::now();
        let detected = self.source.detect(&frame);
        self.logger.timing("detect", elapsed_ms(start));

        let faces = match detected {
            Ok(faces) if faces.is_empty() => {
                log::debug!("No face in frame {}", outcome.index);
                return self.skip(outcome, SkipReason::NoFace);
            }
            Ok(faces) => faces,
            Err(e) => {
                let err = EngineError::Detection(e.to_string());
                log::warn!("Skipping frame {}: {err}", outcome.index);
                return self.skip(outcome, SkipReason::DetectionFailed(e.to_string()));
            }
        };
        self.logger.metric("faces", faces.len() as f64);
        let primary = &faces[0];

        let start = Instant::now();
        outcome.blink = self.blink.update(self.classifier.classify(primary));
        self.logger.timing("classify", elapsed_ms(start));
        if outcome.blink.is_some() {
            log::info!("Blink confirmed on frame {}", outcome.index);
            self.logger.event("blink");
        }

        let start = Instant::now();
        outcome.gaze = self.gaze_point(primary);
        if let Some(point) = outcome.gaze {
            self.field.record_gaze(point);
        }
        self.logger.timing("gaze", elapsed_ms(start));

        let start = Instant::now();
        self.refresh_targets(&frame, &faces);
        outcome.popped = self.resolve_pop(outcome.gaze, outcome.blink.is_some());
        self.logger.timing("targets", elapsed_ms(start));
        if outcome.popped.is_some() {
            self.logger.event("pop");
        }

        outcome
    }

    fn skip(&mut self, mut outcome: FrameOutcome, reason: SkipReason) -> FrameOutcome {
        self.dwell = None;
        self.logger.event("skipped");
        outcome.skipped = Some(reason);
        outcome
    }

    fn gaze_point(&self, face: &Face) -> Option<Point> {
        let (w, h) = self.screen;
        let point = self.mapper.map_face(face, w, h)?;
        Some(if self.virtual_gaze {
            normalize_virtual_point(point, w, h)
        } else {
            point
        })
    }

    fn refresh_targets(&mut self, frame: &Frame, faces: &[Face]) {
        let Some(detector) = self.detector.as_mut() else {
            return;
        };
        let detected = detector.detect_bubbles(frame, faces);
        if detected.as_slice() != self.field.bubbles() {
            log::debug!("Target set changed: {} bubbles", detected.len());
            self.field.set_all(detected);
        }
    }

    fn resolve_pop(&mut self, gaze: Option<Point>, blinked: bool) -> Option<Bubble> {
        let Some(point) = gaze else {
            self.dwell = None;
            return None;
        };

        match self.trigger {
            PopTrigger::Blink if blinked => self.field.pop_at(point),
            PopTrigger::Blink => None,
            PopTrigger::Gaze => self.field.pop_at(point),
            PopTrigger::Dwell { frames } => {
                let Some(hit) = self.field.hit_test(point) else {
                    self.dwell = None;
                    return None;
                };
                let held = match self.dwell.take() {
                    Some(d) if d.bubble == hit => d.frames + 1,
                    _ => 1,
                };
                if held >= frames {
                    self.field.pop(&hit).then_some(hit)
                } else {
                    self.dwell = Some(Dwell {
                        bubble: hit,
                        frames: held,
                    });
                    None
                }
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
