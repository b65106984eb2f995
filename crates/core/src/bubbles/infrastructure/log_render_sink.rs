use crate::bubbles::domain::bubble::Bubble;
use crate::bubbles::domain::render_sink::RenderSink;
use crate::shared::geometry::Point;

/// Headless sink that writes render events to the log and keeps the last
/// live set for reporting.
#[derive(Default)]
pub struct LogRenderSink {
    last_live: Vec<Bubble>,
    updates: usize,
    trail_points: usize,
}

impl LogRenderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_live(&self) -> &[Bubble] {
        &self.last_live
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn trail_points(&self) -> usize {
        self.trail_points
    }
}

impl RenderSink for LogRenderSink {
    fn on_bubbles_changed(&mut self, live: &[Bubble]) {
        self.updates += 1;
        self.last_live = live.to_vec();
        log::info!("{} bubbles live", live.len());
        for b in live {
            let c = b.center();
            log::debug!("  bubble at ({}, {}) r={}", c.x, c.y, b.radius());
        }
    }

    fn on_gaze_trail_point(&mut self, point: Point) {
        self.trail_points += 1;
        log::debug!("Gaze at ({}, {})", point.x, point.y);
    }
}
