//! Named facial landmarks reported by a landmark detector.
//!
//! Coordinates are camera-frame pixels. Any landmark may be missing; callers
//! decide which subsets they need.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LandmarkKind {
    LeftEye,
    RightEye,
    NoseBase,
    MouthLeft,
    MouthRight,
    MouthBottom,
}

impl LandmarkKind {
    pub const ALL: [LandmarkKind; 6] = [
        LandmarkKind::LeftEye,
        LandmarkKind::RightEye,
        LandmarkKind::NoseBase,
        LandmarkKind::MouthLeft,
        LandmarkKind::MouthRight,
        LandmarkKind::MouthBottom,
    ];

    fn slot(self) -> usize {
        match self {
            LandmarkKind::LeftEye => 0,
            LandmarkKind::RightEye => 1,
            LandmarkKind::NoseBase => 2,
            LandmarkKind::MouthLeft => 3,
            LandmarkKind::MouthRight => 4,
            LandmarkKind::MouthBottom => 5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    points: [Option<(f64, f64)>; 6],
}

impl FaceLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: LandmarkKind, point: (f64, f64)) -> Self {
        self.set(kind, point);
        self
    }

    pub fn set(&mut self, kind: LandmarkKind, point: (f64, f64)) {
        self.points[kind.slot()] = Some(point);
    }

    pub fn get(&self, kind: LandmarkKind) -> Option<(f64, f64)> {
        self.points[kind.slot()]
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Option::is_none)
    }

    pub fn has_all(&self) -> bool {
        self.points.iter().all(Option::is_some)
    }

    /// Midpoint between the two eye landmarks, the raw gaze estimate.
    pub fn eye_midpoint(&self) -> Option<(f64, f64)> {
        let (lx, ly) = self.get(LandmarkKind::LeftEye)?;
        let (rx, ry) = self.get(LandmarkKind::RightEye)?;
        Some(((lx + rx) / 2.0, (ly + ry) / 2.0))
    }
}
