use crate::bubbles::domain::bubble::Bubble;
use crate::shared::geometry::Point;

/// Receives everything the screen needs to redraw.
///
/// Called from the analysis thread; implementations that feed a UI must
/// hand the data over rather than draw directly.
pub trait RenderSink: Send {
    /// The live bubble set after a mutation.
    fn on_bubbles_changed(&mut self, live: &[Bubble]);

    /// A new point for the gaze trail overlay.
    fn on_gaze_trail_point(&mut self, point: Point);
}

/// Discards all render events.
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn on_bubbles_changed(&mut self, _live: &[Bubble]) {}
    fn on_gaze_trail_point(&mut self, _point: Point) {}
}
