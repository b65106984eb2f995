use crossbeam_channel::{Receiver, Sender};

use crate::bubbles::domain::bubble::Bubble;
use crate::bubbles::domain::render_sink::RenderSink;
use crate::shared::geometry::Point;

/// Render updates posted to the UI thread. Each event owns its data.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    BubblesChanged(Vec<Bubble>),
    GazeTrailPoint(Point),
}

/// Forwards render events over a channel so the analysis thread never
/// touches UI state.
pub struct ChannelRenderSink {
    tx: Sender<RenderEvent>,
}

impl ChannelRenderSink {
    pub fn new(tx: Sender<RenderEvent>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving end for the UI thread.
    pub fn unbounded() -> (Self, Receiver<RenderEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }

    fn post(&self, event: RenderEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Render receiver gone, dropping event");
        }
    }
}

impl RenderSink for ChannelRenderSink {
    fn on_bubbles_changed(&mut self, live: &[Bubble]) {
        self.post(RenderEvent::BubblesChanged(live.to_vec()));
    }

    fn on_gaze_trail_point(&mut self, point: Point) {
        self.post(RenderEvent::GazeTrailPoint(point));
    }
}
