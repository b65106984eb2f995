pub mod channel_render_sink;
pub mod hough_bubble_detector;
pub mod landmark_bubble_detector;
pub mod log_render_sink;
