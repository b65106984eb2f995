use crate::shared::constants::{EYE_ROI_BOTTOM_RATIO, EYE_ROI_TOP_RATIO, EYE_ROI_WIDTH_RATIO};
use crate::shared::geometry::Rect;

/// Sub-window of a face box searched for eyes.
///
/// Horizontally centred, `EYE_ROI_WIDTH_RATIO` of the face width wide, and
/// spanning the `EYE_ROI_TOP_RATIO..EYE_ROI_BOTTOM_RATIO` band of its height.
pub fn eye_region(face: &Rect) -> Rect {
    let width = (face.width() as f64 * EYE_ROI_WIDTH_RATIO) as i32;
    let height = (face.height() as f64 * (EYE_ROI_BOTTOM_RATIO - EYE_ROI_TOP_RATIO)) as i32;
    let x = face.left + (face.width() - width) / 2;
    let y = face.top + (face.height() as f64 * EYE_ROI_TOP_RATIO) as i32;
    Rect::from_xywh(x, y, width, height)
}
