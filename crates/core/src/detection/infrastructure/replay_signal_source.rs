use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::domain::face::Face;
use crate::detection::domain::face_landmarks::{FaceLandmarks, LandmarkKind};
use crate::detection::domain::face_signal_source::FaceSignalSource;
use crate::shared::frame::{Frame, Rotation};
use crate::shared::geometry::Rect;

/// A recorded session: per-frame face observations plus the geometry of the
/// frames they were taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTrace {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub rotation: i32,
    pub frames: Vec<TraceFrame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    #[serde(default)]
    pub faces: Vec<TraceFace>,
    /// Replayed as a detector failure for this frame.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceFace {
    /// `[left, top, right, bottom]`
    pub bounds: Option<[i32; 4]>,
    pub left_eye_open_probability: Option<f64>,
    pub right_eye_open_probability: Option<f64>,
    pub landmarks: TraceLandmarks,
    pub eye_rects: Vec<[i32; 4]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceLandmarks {
    pub left_eye: Option<[f64; 2]>,
    pub right_eye: Option<[f64; 2]>,
    pub nose_base: Option<[f64; 2]>,
    pub mouth_left: Option<[f64; 2]>,
    pub mouth_right: Option<[f64; 2]>,
    pub mouth_bottom: Option<[f64; 2]>,
}

impl SignalTrace {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("cannot read trace {}: {e}", path.display()))?;
        let trace: SignalTrace = serde_json::from_str(&json)?;
        if Rotation::from_degrees(trace.rotation).is_none() {
            return Err(format!("unsupported rotation {} degrees", trace.rotation).into());
        }
        Ok(trace)
    }

    /// Blank frames matching the recorded geometry, one per trace entry.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        let rotation = Rotation::from_degrees(self.rotation).unwrap_or_default();
        (0..self.frames.len())
            .map(move |i| Frame::blank(self.width, self.height, 3, i).with_rotation(rotation))
    }
}

impl From<&TraceFace> for Face {
    fn from(t: &TraceFace) -> Self {
        let to_rect = |r: &[i32; 4]| Rect::new(r[0], r[1], r[2], r[3]);
        let mut landmarks = FaceLandmarks::new();
        let named = [
            (LandmarkKind::LeftEye, t.landmarks.left_eye),
            (LandmarkKind::RightEye, t.landmarks.right_eye),
            (LandmarkKind::NoseBase, t.landmarks.nose_base),
            (LandmarkKind::MouthLeft, t.landmarks.mouth_left),
            (LandmarkKind::MouthRight, t.landmarks.mouth_right),
            (LandmarkKind::MouthBottom, t.landmarks.mouth_bottom),
        ];
        for (kind, point) in named {
            if let Some([x, y]) = point {
                landmarks.set(kind, (x, y));
            }
        }

        Face {
            bounds: t.bounds.as_ref().map(to_rect),
            left_eye_open_probability: t.left_eye_open_probability,
            right_eye_open_probability: t.right_eye_open_probability,
            landmarks,
            eye_rects: t.eye_rects.iter().map(to_rect).collect(),
        }
    }
}

/// Replays recorded observations by frame index.
///
/// Frames beyond the end of the trace yield no faces.
pub struct ReplaySignalSource {
    frames: HashMap<usize, TraceFrame>,
}

impl ReplaySignalSource {
    pub fn new(trace: &SignalTrace) -> Self {
        Self {
            frames: trace.frames.iter().cloned().enumerate().collect(),
        }
    }
}

impl FaceSignalSource for ReplaySignalSource {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
        let Some(entry) = self.frames.get(&frame.index()) else {
            return Ok(Vec::new());
        };
        if let Some(ref message) = entry.error {
            return Err(message.clone().into());
        }
        Ok(entry.faces.iter().map(Face::from).collect())
    }
}
