use ndarray::ArrayView2;

use crate::shared::geometry::Rect;

/// Multi-scale window scan settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    pub scale_factor: f64,
    pub min_neighbors: u32,
    pub min_size: (u32, u32),
    pub max_size: Option<(u32, u32)>,
}

impl ScanParams {
    pub const FACE: ScanParams = ScanParams {
        scale_factor: 1.3,
        min_neighbors: 3,
        min_size: (50, 50),
        max_size: None,
    };

    pub const EYE: ScanParams = ScanParams {
        scale_factor: 1.1,
        min_neighbors: 3,
        min_size: (20, 20),
        max_size: Some((60, 60)),
    };

    pub fn accepts(&self, rect: &Rect) -> bool {
        let (w, h) = (rect.width(), rect.height());
        if w < self.min_size.0 as i32 || h < self.min_size.1 as i32 {
            return false;
        }
        match self.max_size {
            Some((mw, mh)) => w <= mw as i32 && h <= mh as i32,
            None => true,
        }
    }
}

/// Domain interface for an object classifier scanned over a grayscale image.
///
/// Returned rectangles are relative to the view that was passed in.
pub trait CascadeClassifier: Send {
    fn detect_multi_scale(&self, gray: ArrayView2<'_, u8>, params: &ScanParams) -> Vec<Rect>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::too_small(Rect::from_xywh(0, 0, 19, 30), false)]
    #[case::min(Rect::from_xywh(0, 0, 20, 20), true)]
    #[case::max(Rect::from_xywh(0, 0, 60, 60), true)]
    #[case::too_large(Rect::from_xywh(0, 0, 61, 40), false)]
    fn test_eye_params_size_window(#[case] rect: Rect, #[case] expected: bool) {
        assert_eq!(ScanParams::EYE.accepts(&rect), expected);
    }

    #[test]
    fn test_face_params_unbounded_above() {
        assert!(ScanParams::FACE.accepts(&Rect::from_xywh(0, 0, 900, 900)));
        assert!(!ScanParams::FACE.accepts(&Rect::from_xywh(0, 0, 49, 900)));
    }
}
