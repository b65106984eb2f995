use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::engine_error::EngineError;
use crate::shared::resource_resolver::{self, ProgressFn};

/// A cascade definition file that has been found and sanity-checked.
///
/// Only the header is inspected; evaluating the stages is the job of the
/// [`CascadeClassifier`](crate::detection::domain::cascade_classifier::CascadeClassifier)
/// backend built from it.
#[derive(Clone, Debug, PartialEq)]
pub struct CascadeResource {
    name: String,
    path: PathBuf,
    window: (u32, u32),
    stages: Option<u32>,
}

impl CascadeResource {
    /// Reads and validates an OpenCV cascade XML file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let fail = |reason: String| EngineError::ResourceLoad {
            name: name.clone(),
            reason,
        };

        let xml = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        if xml.trim().is_empty() {
            return Err(fail("file is empty".into()));
        }
        if !xml.contains("<opencv_storage>") || !xml.contains("<cascade") {
            return Err(fail("not an OpenCV cascade file".into()));
        }

        let width = tag_value(&xml, "width").ok_or_else(|| fail("missing window width".into()))?;
        let height =
            tag_value(&xml, "height").ok_or_else(|| fail("missing window height".into()))?;
        if width == 0 || height == 0 {
            return Err(fail(format!("invalid window size {width}x{height}")));
        }

        Ok(Self {
            name: name.clone(),
            path: path.to_path_buf(),
            window: (width, height),
            stages: tag_value(&xml, "stageNum"),
        })
    }

    /// Resolves the file through the cache/bundled/download chain, then
    /// validates it. Every failure is fatal for the session.
    pub fn resolve(
        name: &str,
        url: &str,
        cache_dir: Option<&Path>,
        bundled_dir: Option<&Path>,
        progress: Option<ProgressFn>,
    ) -> Result<Self, EngineError> {
        let (path, origin) = resource_resolver::resolve(name, url, cache_dir, bundled_dir, progress)
            .map_err(|e| EngineError::ResourceLoad {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        log::debug!("Resolved {name} ({origin:?}) at {}", path.display());
        Self::load(&path)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detection window `(width, height)` the cascade was trained on.
    pub fn window(&self) -> (u32, u32) {
        self.window
    }

    pub fn stages(&self) -> Option<u32> {
        self.stages
    }
}

/// First `<tag>N</tag>` value in the document.
fn tag_value(xml: &str, tag: &str) -> Option<u32> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    xml[start..end].trim().parse().ok()
}
