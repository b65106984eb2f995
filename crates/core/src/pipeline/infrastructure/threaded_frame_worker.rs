use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::pipeline::frame_analyzer::{FrameAnalyzer, FrameOutcome};
use crate::shared::engine_error::EngineError;
use crate::shared::frame::Frame;

/// Result of handing a frame to the worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// The slot was free.
    Accepted,
    /// A frame was still waiting; it was discarded in favour of this one.
    ReplacedStale,
}

/// Runs a [`FrameAnalyzer`] on a dedicated thread behind a one-frame slot.
///
/// Layout: `capture → [slot: 1] → worker [on_frame → on_outcome]`
///
/// The capture side never blocks and never builds a backlog: a frame
/// submitted while another is still waiting replaces it.
pub struct ThreadedFrameWorker {
    frame_tx: Option<Sender<Frame>>,
    // Second handle on the slot, used to evict the waiting frame.
    evict_rx: Receiver<Frame>,
    handle: Option<JoinHandle<FrameAnalyzer>>,
    busy: Arc<AtomicBool>,
    submitted: usize,
    dropped: usize,
}

impl ThreadedFrameWorker {
    pub fn spawn<F>(analyzer: FrameAnalyzer, on_outcome: F) -> Self
    where
        F: FnMut(FrameOutcome) + Send + 'static,
    {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Frame>(1);
        let busy = analyzer.busy_flag();
        let handle = spawn_analysis(analyzer, frame_rx.clone(), on_outcome);
        Self {
            frame_tx: Some(frame_tx),
            evict_rx: frame_rx,
            handle: Some(handle),
            busy,
            submitted: 0,
            dropped: 0,
        }
    }

    /// Offers the newest frame. Never blocks.
    pub fn submit(&mut self, frame: Frame) -> Result<Submission, EngineError> {
        if self.handle.as_ref().map_or(true, |h| h.is_finished()) {
            return Err(EngineError::WorkerStopped);
        }
        let tx = self.frame_tx.as_ref().ok_or(EngineError::WorkerStopped)?;
        self.submitted += 1;

        let mut frame = frame;
        let mut replaced = false;
        loop {
            match tx.try_send(frame) {
                Ok(()) => {
                    return Ok(if replaced {
                        Submission::ReplacedStale
                    } else {
                        Submission::Accepted
                    })
                }
                Err(TrySendError::Full(back)) => {
                    frame = back;
                    // The worker may take the waiting frame first; then the
                    // next attempt finds the slot free.
                    if let Ok(stale) = self.evict_rx.try_recv() {
                        log::debug!("Dropping stale frame {}", stale.index());
                        self.dropped += 1;
                        replaced = true;
                    }
                }
                Err(TrySendError::Disconnected(_)) => return Err(EngineError::WorkerStopped),
            }
        }
    }

    /// True while the worker is inside `on_frame`.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn submitted_frames(&self) -> usize {
        self.submitted
    }

    pub fn dropped_frames(&self) -> usize {
        self.dropped
    }

    /// Closes the slot, lets the worker finish the frame it holds plus any
    /// waiting one, and hands the analyzer back.
    ///
    /// A panic on the worker thread surfaces as `WorkerPanicked`; this relies
    /// on the default unwinding panic strategy.
    pub fn shutdown(mut self) -> Result<FrameAnalyzer, EngineError> {
        self.frame_tx.take();
        let handle = self.handle.take().ok_or(EngineError::WorkerStopped)?;
        handle.join().map_err(|_| EngineError::WorkerPanicked)
    }
}

impl Drop for ThreadedFrameWorker {
    fn drop(&mut self) {
        self.frame_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Analysis worker panicked");
            }
        }
    }
}

fn spawn_analysis<F>(
    mut analyzer: FrameAnalyzer,
    frame_rx: Receiver<Frame>,
    mut on_outcome: F,
) -> JoinHandle<FrameAnalyzer>
where
    F: FnMut(FrameOutcome) + Send + 'static,
{
    std::thread::spawn(move || {
        // Ends once every sender is gone; the evicting receiver does not
        // keep the loop alive.
        for frame in frame_rx {
            on_outcome(analyzer.on_frame(frame));
        }
        analyzer
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blink::infrastructure::probability_closure_classifier::ProbabilityClosureClassifier;
    use crate::bubbles::domain::bubble_field::BubbleField;
    use crate::bubbles::domain::render_sink::NullRenderSink;
    use crate::detection::domain::face::Face;
    use crate::detection::domain::face_signal_source::FaceSignalSource;

    /// Blocks inside `detect` for frame 0 until the test opens the gate.
    struct GatedSource {
        started_tx: Sender<usize>,
        gate_rx: Receiver<()>,
    }

    impl FaceSignalSource for GatedSource {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
            self.started_tx.send(frame.index()).ok();
            if frame.index() == 0 {
                self.gate_rx.recv().ok();
            }
            Ok(vec![Face::default()])
        }
    }

    struct PanickingSource;

    impl FaceSignalSource for PanickingSource {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
            panic!("detector crashed");
        }
    }

    fn analyzer_with(source: Box<dyn FaceSignalSource>) -> FrameAnalyzer {
        FrameAnalyzer::new(
            source,
            Box::new(ProbabilityClosureClassifier::default()),
            BubbleField::new(Box::new(NullRenderSink)),
            100,
            100,
        )
    }

    #[test]
    fn test_keeps_only_latest_frame_while_busy() {
        let (started_tx, started_rx) = crossbeam_channel::unbounded();
        let (gate_tx, gate_rx) = crossbeam_channel::bounded(1);
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded();
        let analyzer = analyzer_with(Box::new(GatedSource { started_tx, gate_rx }));
        let mut worker = ThreadedFrameWorker::spawn(analyzer, move |o: FrameOutcome| {
            outcome_tx.send(o.index).ok();
        });

        assert_eq!(worker.submit(Frame::blank(4, 4, 3, 0)).unwrap(), Submission::Accepted);
        assert_eq!(started_rx.recv().unwrap(), 0);
        assert!(worker.is_busy());

        assert_eq!(worker.submit(Frame::blank(4, 4, 3, 1)).unwrap(), Submission::Accepted);
        assert_eq!(
            worker.submit(Frame::blank(4, 4, 3, 2)).unwrap(),
            Submission::ReplacedStale
        );
        assert_eq!(
            worker.submit(Frame::blank(4, 4, 3, 3)).unwrap(),
            Submission::ReplacedStale
        );
        gate_tx.send(()).unwrap();

        assert_eq!(worker.submitted_frames(), 4);
        assert_eq!(worker.dropped_frames(), 2);
        worker.shutdown().unwrap();

        let processed: Vec<usize> = outcome_rx.try_iter().collect();
        assert_eq!(processed, vec![0, 3]);
    }

    #[test]
    fn test_shutdown_returns_analyzer() {
        let (started_tx, _started_rx) = crossbeam_channel::unbounded();
        let (_gate_tx, gate_rx) = crossbeam_channel::bounded(1);
        let analyzer = analyzer_with(Box::new(GatedSource { started_tx, gate_rx }));
        let worker = ThreadedFrameWorker::spawn(analyzer, |_| {});

        let analyzer = worker.shutdown().unwrap();
        assert!(analyzer.field().is_empty());
    }

    #[test]
    fn test_panicked_worker_is_reported() {
        let analyzer = analyzer_with(Box::new(PanickingSource));
        let mut worker = ThreadedFrameWorker::spawn(analyzer, |_| {});

        worker.submit(Frame::blank(4, 4, 3, 0)).unwrap();

        assert!(matches!(worker.shutdown(), Err(EngineError::WorkerPanicked)));
    }
}
