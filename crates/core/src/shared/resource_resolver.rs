use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write resource to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where a resolved resource was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOrigin {
    Cache,
    Bundled,
    Downloaded,
}

/// Resolve a detector resource by name, checking local copies before
/// downloading.
///
/// Resolution order:
/// 1. `cache_dir` (defaults to [`resource_cache_dir`])
/// 2. Bundled directory (pre-packaged installs, tests)
/// 3. Download from URL into the cache directory
pub fn resolve(
    name: &str,
    url: &str,
    cache_dir: Option<&Path>,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<(PathBuf, ResourceOrigin), ResourceResolveError> {
    let cache_dir = match cache_dir {
        Some(dir) => dir.to_path_buf(),
        None => resource_cache_dir()?,
    };
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok((cached_path, ResourceOrigin::Cache));
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok((bundled_path, ResourceOrigin::Bundled));
        }
    }

    fs::create_dir_all(&cache_dir).map_err(ResourceResolveError::CacheDir)?;
    log::info!("Downloading {name} from {url}");
    download(url, &cached_path, progress)?;
    Ok((cached_path, ResourceOrigin::Downloaded))
}

/// Platform-specific resource cache directory.
///
/// - macOS: `~/Library/Application Support/GazePop/cascades/`
/// - Linux: `$XDG_CACHE_HOME/GazePop/cascades/` or `~/.cache/GazePop/cascades/`
/// - Windows: `%LOCALAPPDATA%/GazePop/cascades/`
pub fn resource_cache_dir() -> Result<PathBuf, ResourceResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("GazePop").join("cascades"))
            .ok_or(ResourceResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("GazePop").join("cascades"))
            .ok_or(ResourceResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ResourceResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ResourceResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ResourceResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut file = fs::File::create(temp_path).map_err(write_error(temp_path))?;

    // 64KB chunks
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_error(temp_path))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_error(temp_path))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(write_error(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_error(dest))?;
    Ok(())
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> ResourceResolveError {
    let path = path.to_path_buf();
    move |source| ResourceResolveError::Write { path, source }
}
