use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::blink::domain::blink_state_machine::BlinkStateMachine;
use crate::blink::domain::eye_closure_classifier::EyeClosureClassifier;
use crate::blink::infrastructure::geometry_closure_classifier::GeometryClosureClassifier;
use crate::blink::infrastructure::probability_closure_classifier::ProbabilityClosureClassifier;
use crate::bubbles::domain::bubble_field::BubbleField;
use crate::bubbles::domain::render_sink::RenderSink;
use crate::bubbles::infrastructure::hough_bubble_detector::HoughBubbleDetector;
use crate::bubbles::infrastructure::landmark_bubble_detector::LandmarkBubbleDetector;
use crate::detection::domain::face_signal_source::FaceSignalSource;
use crate::detection::infrastructure::cascade_face_source::{CascadeBackend, CascadeFaceSource};
use crate::detection::infrastructure::cascade_resource::CascadeResource;
use crate::gaze::domain::gaze_mapper::GazeMapper;
use crate::pipeline::analysis_logger::AnalysisLogger;
use crate::pipeline::frame_analyzer::{FrameAnalyzer, FrameOutcome};
use crate::pipeline::infrastructure::threaded_frame_worker::ThreadedFrameWorker;
use crate::shared::constants::{
    EYE_CASCADE_NAME, EYE_CASCADE_URL, FACE_CASCADE_NAME, FACE_CASCADE_URL,
};
use crate::shared::engine_error::EngineError;
use crate::shared::session_config::{ClosureStrategy, PopulationStrategy, SessionConfig};

/// Wires a validated [`SessionConfig`] into a ready-to-run analyzer.
pub struct GazeSession {
    config: SessionConfig,
}

impl GazeSession {
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn closure_classifier(&self) -> Box<dyn EyeClosureClassifier> {
        match self.config.closure {
            ClosureStrategy::Probability => {
                Box::new(ProbabilityClosureClassifier::new(self.config.eye_open_threshold))
            }
            ClosureStrategy::Geometry => {
                Box::new(GeometryClosureClassifier::new(self.config.eye_alignment_tolerance))
            }
        }
    }

    /// Builds the analyzer and populates the initial target set.
    ///
    /// Random population spawns the bubbles here; detector-sourced
    /// strategies start empty and fill on the first analyzed frame.
    pub fn build_analyzer(
        &self,
        source: Box<dyn FaceSignalSource>,
        sink: Box<dyn RenderSink>,
        logger: Box<dyn AnalysisLogger>,
    ) -> Result<FrameAnalyzer, EngineError> {
        let c = &self.config;
        let blink = BlinkStateMachine::new(c.blink_confirm_frames)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        let mut field = BubbleField::new(sink);
        if c.population == PopulationStrategy::Random {
            let mut rng = match c.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            field.spawn(
                c.bubble_count,
                c.min_radius,
                c.max_radius,
                c.screen_width,
                c.screen_height,
                &mut rng,
            )?;
        }

        let mut analyzer = FrameAnalyzer::new(
            source,
            self.closure_classifier(),
            field,
            c.screen_width,
            c.screen_height,
        )
        .with_blink_machine(blink)
        .with_gaze_mapper(GazeMapper::new(c.gaze_scale))
        .with_trigger(c.pop_trigger)
        .with_virtual_gaze(c.virtual_gaze_space)
        .with_logger(logger);

        analyzer = match c.population {
            PopulationStrategy::Random => analyzer,
            PopulationStrategy::Landmarks => {
                analyzer.with_bubble_detector(Box::new(LandmarkBubbleDetector))
            }
            PopulationStrategy::Hough => {
                analyzer.with_bubble_detector(Box::new(HoughBubbleDetector::default()))
            }
        };

        log::info!(
            "Session ready: {}x{} screen, {:?} population, {:?} closure, {:?} trigger",
            c.screen_width,
            c.screen_height,
            c.population,
            c.closure,
            c.pop_trigger
        );
        Ok(analyzer)
    }

    /// Like [`build_analyzer`](Self::build_analyzer), then moves the
    /// analyzer onto its worker thread.
    pub fn spawn_worker<F>(
        &self,
        source: Box<dyn FaceSignalSource>,
        sink: Box<dyn RenderSink>,
        logger: Box<dyn AnalysisLogger>,
        on_outcome: F,
    ) -> Result<ThreadedFrameWorker, EngineError>
    where
        F: FnMut(FrameOutcome) + Send + 'static,
    {
        let analyzer = self.build_analyzer(source, sink, logger)?;
        Ok(ThreadedFrameWorker::spawn(analyzer, on_outcome))
    }

    /// Resolves and validates both cascade files, then builds the cascade
    /// face source. Any missing or corrupt resource aborts startup.
    pub fn cascade_source(
        cache_dir: Option<&Path>,
        bundled_dir: Option<&Path>,
        backend: &dyn CascadeBackend,
    ) -> Result<CascadeFaceSource, EngineError> {
        let face = CascadeResource::resolve(
            FACE_CASCADE_NAME,
            FACE_CASCADE_URL,
            cache_dir,
            bundled_dir,
            None,
        )?;
        let eye = CascadeResource::resolve(
            EYE_CASCADE_NAME,
            EYE_CASCADE_URL,
            cache_dir,
            bundled_dir,
            None,
        )?;
        CascadeFaceSource::from_resources(&face, &eye, backend)
    }
}
