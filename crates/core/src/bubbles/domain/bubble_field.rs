use rand::Rng;

use crate::bubbles::domain::bubble::Bubble;
use crate::bubbles::domain::render_sink::RenderSink;
use crate::shared::engine_error::EngineError;
use crate::shared::geometry::Point;

/// Owns the live set of bubbles.
///
/// Bubbles keep their insertion order, which decides which one wins a hit
/// test when several overlap. Every change to the set is pushed to the
/// render sink.
pub struct BubbleField {
    bubbles: Vec<Bubble>,
    sink: Box<dyn RenderSink>,
}

impl BubbleField {
    pub fn new(sink: Box<dyn RenderSink>) -> Self {
        Self {
            bubbles: Vec::new(),
            sink,
        }
    }

    /// Replaces the live set with `count` random bubbles fully inside a
    /// `width × height` screen.
    ///
    /// Radii are drawn from `min_radius..=max_radius`, with the upper bound
    /// lowered to half the short screen side. Bubbles may overlap.
    pub fn spawn<R: Rng>(
        &mut self,
        count: usize,
        min_radius: i32,
        max_radius: i32,
        width: i32,
        height: i32,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        if min_radius <= 0 || min_radius > max_radius {
            return Err(EngineError::InvalidConfig(format!(
                "invalid radius range {min_radius}..={max_radius}"
            )));
        }
        let max_radius = max_radius.min(width.min(height) / 2);
        if max_radius < min_radius {
            return Err(EngineError::InvalidConfig(format!(
                "a bubble of radius {min_radius} does not fit a {width}x{height} screen"
            )));
        }

        let bubbles = (0..count)
            .map(|_| {
                let radius = rng.gen_range(min_radius..=max_radius);
                let center = Point::new(
                    rng.gen_range(radius..=width - radius),
                    rng.gen_range(radius..=height - radius),
                );
                Bubble::from_circle(center, radius)
            })
            .collect();
        log::info!("Spawned {count} bubbles on a {width}x{height} screen");
        self.set_all(bubbles);
        Ok(())
    }

    /// Atomically replaces the live set.
    pub fn set_all(&mut self, bubbles: Vec<Bubble>) {
        self.bubbles = bubbles;
        self.sink.on_bubbles_changed(&self.bubbles);
    }

    /// First bubble, in insertion order, containing `point`.
    pub fn hit_test(&self, point: Point) -> Option<Bubble> {
        self.bubbles.iter().find(|b| b.contains(point)).copied()
    }

    /// Removes one bubble equal to `bubble`. Returns false, without
    /// notifying, when there is none.
    pub fn pop(&mut self, bubble: &Bubble) -> bool {
        let Some(index) = self.bubbles.iter().position(|b| b == bubble) else {
            return false;
        };
        self.bubbles.remove(index);
        log::info!(
            "Popped bubble at ({}, {}), {} left",
            bubble.center().x,
            bubble.center().y,
            self.bubbles.len()
        );
        self.sink.on_bubbles_changed(&self.bubbles);
        true
    }

    /// Pops whatever bubble is under `point`.
    pub fn pop_at(&mut self, point: Point) -> Option<Bubble> {
        let hit = self.hit_test(point)?;
        self.pop(&hit).then_some(hit)
    }

    pub fn record_gaze(&mut self, point: Point) {
        self.sink.on_gaze_trail_point(point);
    }

    pub fn snapshot(&self) -> Vec<Bubble> {
        self.bubbles.clone()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubbles::domain::render_sink::NullRenderSink;
    use crate::shared::geometry::Rect;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        changes: Vec<Vec<Bubble>>,
        trail: Vec<Point>,
    }

    struct RecordingSink(Arc<Mutex<Recorded>>);

    impl RenderSink for RecordingSink {
        fn on_bubbles_changed(&mut self, live: &[Bubble]) {
            self.0.lock().unwrap().changes.push(live.to_vec());
        }

        fn on_gaze_trail_point(&mut self, point: Point) {
            self.0.lock().unwrap().trail.push(point);
        }
    }

    fn recording_field() -> (BubbleField, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        (
            BubbleField::new(Box::new(RecordingSink(recorded.clone()))),
            recorded,
        )
    }

    fn bubble(l: i32, t: i32, r: i32, b: i32) -> Bubble {
        Bubble::new(Rect::new(l, t, r, b))
    }

    #[rstest]
    #[case::inside(Point::new(30, 30), true)]
    #[case::far_corner(Point::new(50, 50), false)]
    #[case::outside(Point::new(9, 9), false)]
    fn test_hit_test_single_bubble(#[case] point: Point, #[case] hits: bool) {
        let mut field = BubbleField::new(Box::new(NullRenderSink));
        field.set_all(vec![bubble(10, 10, 50, 50)]);
        assert_eq!(field.hit_test(point).is_some(), hits);
    }

    #[test]
    fn test_hit_test_prefers_insertion_order() {
        let mut field = BubbleField::new(Box::new(NullRenderSink));
        let first = bubble(0, 0, 100, 100);
        let second = bubble(50, 50, 150, 150);
        field.set_all(vec![first, second]);

        assert_eq!(field.hit_test(Point::new(75, 75)), Some(first));
        assert_eq!(field.hit_test(Point::new(120, 120)), Some(second));
    }

    #[test]
    fn test_pop_then_hit_test_misses() {
        let (mut field, recorded) = recording_field();
        field.set_all(vec![bubble(10, 10, 50, 50), bubble(100, 100, 140, 140)]);

        let hit = field.hit_test(Point::new(30, 30)).unwrap();
        assert!(field.pop(&hit));

        assert!(field.hit_test(Point::new(30, 30)).is_none());
        assert_eq!(field.len(), 1);
        let changes = &recorded.lock().unwrap().changes;
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1], vec![bubble(100, 100, 140, 140)]);
    }

    #[test]
    fn test_pop_removes_only_one_duplicate() {
        let mut field = BubbleField::new(Box::new(NullRenderSink));
        let twin = bubble(0, 0, 10, 10);
        field.set_all(vec![twin, twin]);

        assert!(field.pop(&twin));
        assert_eq!(field.snapshot(), vec![twin]);
    }

    #[test]
    fn test_pop_absent_is_silent_noop() {
        let (mut field, recorded) = recording_field();
        field.set_all(vec![bubble(10, 10, 50, 50)]);

        assert!(!field.pop(&bubble(0, 0, 5, 5)));
        assert_eq!(field.len(), 1);
        assert_eq!(recorded.lock().unwrap().changes.len(), 1);
    }

    #[test]
    fn test_pop_at_returns_popped_bubble() {
        let mut field = BubbleField::new(Box::new(NullRenderSink));
        let target = bubble(950, 950, 1050, 1050);
        field.set_all(vec![bubble(0, 0, 10, 10), target]);

        assert_eq!(field.pop_at(Point::new(1000, 1000)), Some(target));
        assert_eq!(field.pop_at(Point::new(1000, 1000)), None);
        assert_eq!(field.len(), 1);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    #[case(25)]
    fn test_spawn_keeps_bubbles_on_screen(#[case] count: usize) {
        let mut field = BubbleField::new(Box::new(NullRenderSink));
        let mut rng = StdRng::seed_from_u64(7);

        field.spawn(count, 80, 150, 1080, 1920, &mut rng).unwrap();

        assert_eq!(field.len(), count);
        for b in field.bubbles() {
            let r = b.bounds();
            assert!(r.left >= 0 && r.top >= 0, "{r:?}");
            assert!(r.right <= 1080 && r.bottom <= 1920, "{r:?}");
            assert!((80..=150).contains(&b.radius()), "{r:?}");
        }
    }

    #[test]
    fn test_spawn_replaces_previous_set_and_notifies() {
        let (mut field, recorded) = recording_field();
        let mut rng = StdRng::seed_from_u64(1);
        field.spawn(3, 80, 150, 1080, 1920, &mut rng).unwrap();
        field.spawn(2, 80, 150, 1080, 1920, &mut rng).unwrap();

        assert_eq!(field.len(), 2);
        let changes = &recorded.lock().unwrap().changes;
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1], field.snapshot());
    }

    #[test]
    fn test_spawn_is_reproducible_with_seed() {
        let mut a = BubbleField::new(Box::new(NullRenderSink));
        let mut b = BubbleField::new(Box::new(NullRenderSink));
        a.spawn(5, 10, 40, 400, 300, &mut StdRng::seed_from_u64(42)).unwrap();
        b.spawn(5, 10, 40, 400, 300, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_spawn_clamps_max_radius_to_screen() {
        let mut field = BubbleField::new(Box::new(NullRenderSink));
        let mut rng = StdRng::seed_from_u64(3);

        field.spawn(10, 40, 500, 100, 200, &mut rng).unwrap();

        for b in field.bubbles() {
            assert!(b.radius() <= 50);
            assert!(b.bounds().right <= 100);
        }
    }

    #[rstest]
    #[case::zero_radius(0, 10, 100, 100)]
    #[case::inverted_range(50, 20, 500, 500)]
    #[case::screen_too_small(80, 150, 100, 1000)]
    fn test_spawn_rejects_invalid_geometry(
        #[case] min_radius: i32,
        #[case] max_radius: i32,
        #[case] width: i32,
        #[case] height: i32,
    ) {
        let mut field = BubbleField::new(Box::new(NullRenderSink));
        let mut rng = StdRng::seed_from_u64(0);
        let result = field.spawn(3, min_radius, max_radius, width, height, &mut rng);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
        assert!(field.is_empty());
    }

    #[test]
    fn test_record_gaze_forwards_trail_point() {
        let (mut field, recorded) = recording_field();
        field.record_gaze(Point::new(4, 2));
        assert_eq!(recorded.lock().unwrap().trail, vec![Point::new(4, 2)]);
        assert!(recorded.lock().unwrap().changes.is_empty());
    }
}
