use std::collections::HashMap;
use std::time::Instant;

/// Observer for per-frame analysis events.
///
/// Keeps stage timing and counters out of the analyzer's control flow so a
/// CLI, a UI or a test can each watch the same loop differently.
pub trait AnalysisLogger: Send {
    /// Called once per frame that entered the analyzer.
    fn frame_done(&mut self, index: usize);

    /// How long a named stage (`detect`, `classify`, `gaze`, `targets`) took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A per-frame measurement such as the number of faces.
    fn metric(&mut self, name: &str, value: f64);

    /// A countable occurrence such as a blink or a pop.
    fn event(&mut self, name: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullAnalysisLogger;

impl AnalysisLogger for NullAnalysisLogger {
    fn frame_done(&mut self, _index: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn event(&mut self, _name: &str) {}
}

/// Collects timings, metrics and event counts and reports them through
/// the `log` facade.
///
/// Frame progress is logged every `throttle_frames` frames.
pub struct StdoutAnalysisLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    events: HashMap<String, usize>,
    start_time: Instant,
    frames: usize,
}

impl StdoutAnalysisLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            events: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    /// Formatted summary, or `None` before any frame was analyzed.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames;
        let mut lines = vec![format!(
            "Analysis summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.2}ms  total {total_ms:7.1}ms"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        let mut event_names: Vec<_> = self.events.keys().collect();
        event_names.sort();
        for name in event_names {
            lines.push(format!("  {name}: {}", self.events[name]));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn event_count(&self, name: &str) -> usize {
        self.events.get(name).copied().unwrap_or(0)
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutAnalysisLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl AnalysisLogger for StdoutAnalysisLogger {
    fn frame_done(&mut self, index: usize) {
        self.frames += 1;
        if self.frames % self.throttle_frames == 0 {
            log::info!("Analyzed {} frames (last index {index})", self.frames);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn event(&mut self, name: &str) {
        *self.events.entry(name.to_string()).or_default() += 1;
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullAnalysisLogger;
        logger.frame_done(0);
        logger.timing("detect", 5.0);
        logger.metric("faces", 1.0);
        logger.event("blink");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutAnalysisLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("gaze", 0.5);

        let detect = logger.timings_for("detect").unwrap();
        assert_eq!(detect.len(), 2);
        assert_relative_eq!(detect[1], 30.0);
        assert_eq!(logger.timings_for("gaze").unwrap().len(), 1);
        assert!(logger.timings_for("targets").is_none());
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = StdoutAnalysisLogger::new(10);
        logger.metric("faces", 1.0);
        logger.metric("faces", 2.0);
        assert_relative_eq!(mean(logger.metrics_for("faces").unwrap()), 1.5);
    }

    #[test]
    fn test_events_are_counted() {
        let mut logger = StdoutAnalysisLogger::new(10);
        logger.event("pop");
        logger.event("pop");
        logger.event("blink");
        assert_eq!(logger.event_count("pop"), 2);
        assert_eq!(logger.event_count("blink"), 1);
        assert_eq!(logger.event_count("skip"), 0);
    }

    #[test]
    fn test_summary_lists_stages_metrics_and_events() {
        let mut logger = StdoutAnalysisLogger::new(10);
        for i in 0..4 {
            logger.frame_done(i);
        }
        logger.timing("detect", 10.0);
        logger.metric("faces", 1.0);
        logger.event("blink");

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Analysis summary (4 frames"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("faces: avg 1.0"));
        assert!(summary.contains("blink: 1"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutAnalysisLogger::default().summary_string().is_none());
    }

    #[test]
    fn test_frame_done_counts_frames() {
        let mut logger = StdoutAnalysisLogger::new(3);
        for i in 0..7 {
            logger.frame_done(i);
        }
        assert_eq!(logger.frames(), 7);
    }
}
