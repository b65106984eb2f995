use ndarray::s;

use crate::detection::domain::cascade_classifier::{CascadeClassifier, ScanParams};
use crate::detection::domain::eye_region::eye_region;
use crate::detection::domain::face::Face;
use crate::detection::domain::face_signal_source::FaceSignalSource;
use crate::detection::infrastructure::cascade_resource::CascadeResource;
use crate::shared::engine_error::EngineError;
use crate::shared::frame::Frame;
use crate::shared::geometry::Rect;
use crate::shared::image_ops::{equalize_histogram, to_grayscale};

/// Builds an evaluator for a validated cascade file.
///
/// The crate ships no evaluator of its own. Embedders supply one, typically
/// a thin wrapper over `opencv::objdetect::CascadeClassifier` that loads
/// `resource.path()` and forwards `detect_multi_scale`. Without a backend the
/// downloaded cascade files are only resolved and validated.
pub trait CascadeBackend {
    fn build(
        &self,
        resource: &CascadeResource,
    ) -> Result<Box<dyn CascadeClassifier>, Box<dyn std::error::Error>>;
}

/// Face source driven by two cascade classifiers: one scan for faces over
/// the whole frame, then one scan for eyes inside each face's eye region.
///
/// Produces faces with `bounds` and `eye_rects`; no probabilities or
/// landmarks, so it pairs with the geometry closure classifier.
pub struct CascadeFaceSource {
    face_classifier: Box<dyn CascadeClassifier>,
    eye_classifier: Box<dyn CascadeClassifier>,
}

impl CascadeFaceSource {
    pub fn new(
        face_classifier: Box<dyn CascadeClassifier>,
        eye_classifier: Box<dyn CascadeClassifier>,
    ) -> Self {
        Self {
            face_classifier,
            eye_classifier,
        }
    }

    /// Builds both classifiers up front; a backend failure is fatal.
    pub fn from_resources(
        face: &CascadeResource,
        eye: &CascadeResource,
        backend: &dyn CascadeBackend,
    ) -> Result<Self, EngineError> {
        let build = |resource: &CascadeResource| {
            backend
                .build(resource)
                .map_err(|e| EngineError::ResourceLoad {
                    name: resource.name().to_string(),
                    reason: e.to_string(),
                })
        };
        Ok(Self::new(build(face)?, build(eye)?))
    }
}

impl FaceSignalSource for CascadeFaceSource {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
        if !frame.is_well_formed() {
            return Err(EngineError::MalformedFrame {
                expected: frame.expected_len(),
                actual: frame.data().len(),
            }
            .into());
        }
        let gray = to_grayscale(frame).ok_or(EngineError::InvalidFrameFormat {
            channels: frame.channels(),
        })?;
        let (fw, fh) = (frame.width() as i32, frame.height() as i32);

        let face_rects: Vec<Rect> = self
            .face_classifier
            .detect_multi_scale(gray.view(), &ScanParams::FACE)
            .into_iter()
            .filter(|r| ScanParams::FACE.accepts(r))
            .collect();
        log::debug!("Faces detected: {}", face_rects.len());

        let mut faces = Vec::with_capacity(face_rects.len());
        for bounds in face_rects {
            let roi = eye_region(&bounds).clamp_to(fw, fh);
            if roi.is_empty() {
                faces.push(Face::default().with_bounds(bounds));
                continue;
            }

            let band = gray.slice(s![
                roi.top as usize..roi.bottom as usize,
                roi.left as usize..roi.right as usize
            ]);
            let equalized = equalize_histogram(band);
            let eyes: Vec<Rect> = self
                .eye_classifier
                .detect_multi_scale(equalized.view(), &ScanParams::EYE)
                .into_iter()
                .filter(|r| ScanParams::EYE.accepts(r))
                .map(|r| {
                    Rect::new(
                        r.left + roi.left,
                        r.top + roi.top,
                        r.right + roi.left,
                        r.bottom + roi.top,
                    )
                })
                .collect();
            log::debug!("Eyes detected: {}", eyes.len());

            faces.push(Face::default().with_bounds(bounds).with_eye_rects(eyes));
        }

        Ok(faces)
    }
}
