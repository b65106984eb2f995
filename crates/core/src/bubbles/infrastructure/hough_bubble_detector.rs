use ndarray::{Array2, ArrayView2};

use crate::bubbles::domain::bubble::Bubble;
use crate::bubbles::domain::bubble_detector::BubbleDetector;
use crate::detection::domain::face::Face;
use crate::shared::frame::Frame;
use crate::shared::geometry::Point;
use crate::shared::image_ops::{gaussian_blur, sobel, to_grayscale};

/// Tuning for the gradient Hough circle transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoughParams {
    pub blur_kernel: usize,
    /// Minimum distance between accepted circle centres.
    pub min_distance: f64,
    /// Gradient magnitude an edge pixel must reach.
    pub edge_threshold: f32,
    /// Votes a centre (and its radius) needs to be accepted.
    pub accumulator_threshold: u32,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            min_distance: 50.0,
            edge_threshold: 100.0,
            accumulator_threshold: 30,
            min_radius: 10,
            max_radius: 100,
        }
    }
}

struct Edge {
    x: usize,
    y: usize,
    ux: f32,
    uy: f32,
}

/// Finds circular shapes in the camera image and offers them as targets.
///
/// Grayscale, Gaussian blur, then every thinned edge pixel votes for
/// centres along its gradient direction at each candidate radius. Peaks are
/// accepted strongest first, spaced at least `min_distance` apart, and each
/// gets the radius most edge pixels agree on.
pub struct HoughBubbleDetector {
    params: HoughParams,
}

impl HoughBubbleDetector {
    pub fn new(params: HoughParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &HoughParams {
        &self.params
    }

    /// Circles in a whole frame; empty for unsupported channel layouts and
    /// malformed buffers.
    pub fn detect_in_frame(&self, frame: &Frame) -> Vec<Bubble> {
        match to_grayscale(frame) {
            Some(gray) => self.detect_circles(gray.view()),
            None => Vec::new(),
        }
    }

    pub fn detect_circles(&self, gray: ArrayView2<'_, u8>) -> Vec<Bubble> {
        let p = &self.params;
        let blurred = gaussian_blur(gray, p.blur_kernel);
        let edges = self.edges(blurred.view());
        if edges.is_empty() {
            return Vec::new();
        }

        let (h, w) = blurred.dim();
        let accumulator = self.vote(&edges, w, h);

        let mut circles: Vec<(Point, i32, u32)> = Vec::new();
        for (center, votes) in peaks(&accumulator, p.accumulator_threshold) {
            let too_close = circles.iter().any(|(c, _, _)| {
                let (dx, dy) = (f64::from(c.x - center.x), f64::from(c.y - center.y));
                (dx * dx + dy * dy).sqrt() < p.min_distance
            });
            if too_close {
                continue;
            }
            if let Some(radius) = self.estimate_radius(center, &edges) {
                circles.push((center, radius, votes));
            }
        }

        log::debug!("Hough transform found {} circles", circles.len());
        circles
            .into_iter()
            .map(|(center, radius, _)| Bubble::from_circle(center, radius))
            .collect()
    }

    /// Edge pixels after non-maximum suppression along the gradient.
    fn edges(&self, gray: ArrayView2<'_, u8>) -> Vec<Edge> {
        let (dx, dy) = sobel(gray);
        let magnitude = Array2::from_shape_fn(dx.dim(), |i| dx[i].abs() + dy[i].abs());
        let (h, w) = magnitude.dim();
        let mut edges = Vec::new();
        if h < 3 || w < 3 {
            return edges;
        }

        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let m = magnitude[[y, x]];
                if m < self.params.edge_threshold {
                    continue;
                }
                let (gx, gy) = (dx[[y, x]], dy[[y, x]]);
                let (a, b) = neighbours_along(gx, gy, x, y);
                if m < magnitude[[a.1, a.0]] || m < magnitude[[b.1, b.0]] {
                    continue;
                }
                let norm = (gx * gx + gy * gy).sqrt();
                if norm > 0.0 {
                    edges.push(Edge {
                        x,
                        y,
                        ux: gx / norm,
                        uy: gy / norm,
                    });
                }
            }
        }
        edges
    }

    fn vote(&self, edges: &[Edge], width: usize, height: usize) -> Array2<u32> {
        let mut acc = Array2::<u32>::zeros((height, width));
        for e in edges {
            for r in self.params.min_radius..=self.params.max_radius {
                for sign in [1.0f32, -1.0] {
                    let cx = (e.x as f32 + sign * r as f32 * e.ux).round();
                    let cy = (e.y as f32 + sign * r as f32 * e.uy).round();
                    if cx >= 0.0 && cy >= 0.0 && (cx as usize) < width && (cy as usize) < height {
                        acc[[cy as usize, cx as usize]] += 1;
                    }
                }
            }
        }
        acc
    }

    /// Radius with the most edge support around `center`, smoothed over
    /// neighbouring radii.
    fn estimate_radius(&self, center: Point, edges: &[Edge]) -> Option<i32> {
        let (min_r, max_r) = (self.params.min_radius, self.params.max_radius);
        let mut hist = vec![0u32; (max_r - min_r + 1).max(0) as usize];
        for e in edges {
            let dx = e.x as f64 - f64::from(center.x);
            let dy = e.y as f64 - f64::from(center.y);
            let d = (dx * dx + dy * dy).sqrt().round() as i32;
            if (min_r..=max_r).contains(&d) {
                hist[(d - min_r) as usize] += 1;
            }
        }

        let support = |i: usize| {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(hist.len() - 1);
            hist[lo..=hi].iter().sum::<u32>()
        };
        let (best, votes) = (0..hist.len())
            .map(|i| (i, support(i)))
            .max_by_key(|&(i, v)| (v, std::cmp::Reverse(i)))?;
        (votes >= self.params.accumulator_threshold).then_some(min_r + best as i32)
    }
}

impl Default for HoughBubbleDetector {
    fn default() -> Self {
        Self::new(HoughParams::default())
    }
}

impl BubbleDetector for HoughBubbleDetector {
    fn detect_bubbles(&mut self, frame: &Frame, _faces: &[Face]) -> Vec<Bubble> {
        self.detect_in_frame(frame)
    }
}

/// The two pixels adjacent to `(x, y)` along the gradient, quantized to
/// 45 degree steps.
fn neighbours_along(gx: f32, gy: f32, x: usize, y: usize) -> ((usize, usize), (usize, usize)) {
    let angle = gy.atan2(gx).to_degrees().rem_euclid(180.0);
    if !(22.5..157.5).contains(&angle) {
        ((x - 1, y), (x + 1, y))
    } else if angle < 67.5 {
        ((x - 1, y - 1), (x + 1, y + 1))
    } else if angle < 112.5 {
        ((x, y - 1), (x, y + 1))
    } else {
        ((x + 1, y - 1), (x - 1, y + 1))
    }
}

/// Accumulator cells at or above `threshold` that are 3x3 local maxima,
/// strongest first.
fn peaks(acc: &Array2<u32>, threshold: u32) -> Vec<(Point, u32)> {
    let (h, w) = acc.dim();
    let mut found = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = acc[[y, x]];
            if v < threshold.max(1) {
                continue;
            }
            let is_max = (y.saturating_sub(1)..(y + 2).min(h))
                .flat_map(|ny| (x.saturating_sub(1)..(x + 2).min(w)).map(move |nx| (ny, nx)))
                .all(|(ny, nx)| acc[[ny, nx]] <= v);
            if is_max {
                found.push((Point::new(x as i32, y as i32), v));
            }
        }
    }
    found.sort_by(|a, b| b.1.cmp(&a.1));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disks(w: usize, h: usize, circles: &[(i32, i32, i32)]) -> Array2<u8> {
        Array2::from_shape_fn((h, w), |(y, x)| {
            let inside = circles.iter().any(|&(cx, cy, r)| {
                let (dx, dy) = (x as i32 - cx, y as i32 - cy);
                dx * dx + dy * dy <= r * r
            });
            if inside {
                255
            } else {
                0
            }
        })
    }

    fn assert_near(bubble: &Bubble, cx: i32, cy: i32, r: i32) {
        let c = bubble.center();
        assert!((c.x - cx).abs() <= 2 && (c.y - cy).abs() <= 2, "centre {c:?}");
        assert!((bubble.radius() - r).abs() <= 2, "radius {}", bubble.radius());
    }

    #[test]
    fn test_blank_image_has_no_circles() {
        let gray = Array2::<u8>::zeros((120, 160));
        assert!(HoughBubbleDetector::default().detect_circles(gray.view()).is_empty());
    }

    #[test]
    fn test_single_disk() {
        let gray = disks(160, 160, &[(80, 80, 30)]);

        let bubbles = HoughBubbleDetector::default().detect_circles(gray.view());

        assert_eq!(bubbles.len(), 1);
        assert_near(&bubbles[0], 80, 80, 30);
    }

    #[test]
    fn test_two_distant_disks() {
        let gray = disks(280, 120, &[(60, 60, 25), (210, 60, 25)]);

        let mut bubbles = HoughBubbleDetector::default().detect_circles(gray.view());
        bubbles.sort_by_key(|b| b.center().x);

        assert_eq!(bubbles.len(), 2);
        assert_near(&bubbles[0], 60, 60, 25);
        assert_near(&bubbles[1], 210, 60, 25);
    }

    #[test]
    fn test_close_centres_are_merged() {
        let gray = disks(200, 120, &[(60, 60, 15), (95, 60, 15)]);
        let bubbles = HoughBubbleDetector::default().detect_circles(gray.view());
        assert_eq!(bubbles.len(), 1);
    }

    #[test]
    fn test_detect_bubbles_reads_frame() {
        let gray = disks(160, 160, &[(80, 80, 30)]);
        let frame = Frame::new(gray.iter().copied().collect(), 160, 160, 1, 0);

        let bubbles = HoughBubbleDetector::default().detect_bubbles(&frame, &[]);

        assert_eq!(bubbles.len(), 1);
        assert_near(&bubbles[0], 80, 80, 30);
    }

    #[test]
    fn test_unsupported_channels_yield_nothing() {
        let frame = Frame::new(vec![0; 8 * 8 * 2], 8, 8, 2, 0);
        assert!(HoughBubbleDetector::default().detect_in_frame(&frame).is_empty());
    }

    #[test]
    fn test_short_buffer_yields_nothing() {
        let frame = Frame::new(vec![0; 10], 8, 8, 3, 0);
        assert!(HoughBubbleDetector::default().detect_in_frame(&frame).is_empty());
    }
}
