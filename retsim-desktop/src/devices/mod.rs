//!
//! File-backed frame sources and sinks of the desktop driver.
//!
mod file_sink;
mod video_source;

pub use self::file_sink::*;
pub use self::video_source::*;

use serde::Serialize;
use std::path::Path;

/// Fields available to the output pattern.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct InputInfo {
    /// Path without basename, e.g., `path/to` (`.` for bare file names).
    pub dirname: String,
    /// Path without dirname, e.g., `image.png`.
    pub basename: String,
    /// Basename without file extension, e.g., `image` (excluding dot).
    pub stem: String,
    /// Basename without stem, e.g., `png` (excluding dot).
    pub extension: String,
    /// Keys of the simulated diseases joined by `+`.
    pub disease: String,
    /// Severity of the frame with two decimals.
    pub severity: String,
    /// Zero-based frame index.
    pub tick: usize,
}

impl InputInfo {
    pub fn new<P: AsRef<Path>>(path: P, disease: &str) -> Self {
        let path = path.as_ref();
        let dirname = path
            .parent()
            .map(|parent| parent.to_string_lossy().into_owned())
            .filter(|parent| !parent.is_empty())
            .unwrap_or_else(|| ".".to_string());
        let text = |part: Option<&std::ffi::OsStr>| {
            part.map(|part| part.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        InputInfo {
            dirname,
            basename: text(path.file_name()),
            stem: text(path.file_stem()),
            extension: text(path.extension()),
            disease: disease.to_string(),
            severity: String::new(),
            tick: 0,
        }
    }

    pub fn at(&self, severity: f32, tick: usize) -> Self {
        InputInfo {
            severity: format!("{:.2}", severity),
            tick,
            ..self.clone()
        }
    }
}

pub fn has_video_extension<P: AsRef<Path>>(path: P) -> bool {
    let extension = path
        .as_ref()
        .extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    matches!(extension.as_str(), "avi" | "mp4" | "m4v" | "mkv" | "mov")
}
