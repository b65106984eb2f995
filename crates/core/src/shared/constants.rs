pub const FACE_CASCADE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const FACE_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_default.xml";

pub const EYE_CASCADE_NAME: &str = "haarcascade_eye.xml";
pub const EYE_CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_eye.xml";

/// Open frames needed after a closure before a blink is confirmed.
pub const BLINK_CONFIRM_FRAMES: u32 = 10;

/// Eye-open probability below which an eye counts as closed.
pub const EYE_OPEN_PROBABILITY_THRESHOLD: f64 = 0.4;

/// Vertical gap (px) between eye rectangles tolerated before the pair
/// counts as closed.
pub const EYE_ALIGNMENT_TOLERANCE_PX: i32 = 0;

/// Eye sub-window within a face box, as fractions of the face size.
pub const EYE_ROI_WIDTH_RATIO: f64 = 0.25;
pub const EYE_ROI_TOP_RATIO: f64 = 0.35;
pub const EYE_ROI_BOTTOM_RATIO: f64 = 0.65;

/// Camera-pixel to screen-pixel multiplier for gaze points.
pub const GAZE_SCALE_FACTOR: f64 = 2.0;

/// Extent of the virtual gaze coordinate space on each axis.
pub const VIRTUAL_GAZE_EXTENT: i32 = 1000;

pub const DEFAULT_BUBBLE_COUNT: usize = 3;
pub const DEFAULT_MIN_RADIUS: i32 = 80;
pub const DEFAULT_MAX_RADIUS: i32 = 150;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
