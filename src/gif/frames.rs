//! Finding and ordering saved map frames.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ocr::{ElapsedTime, UNKNOWN_TIME};

/// `map_<index>_<MM>_<SS>.png`
const FRAME_NAME_PATTERN: &str = r"^map_\d+_(\d{2,3})_(\d{2})\.png$";

/// A map frame on disk with the match time parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    pub path: PathBuf,
    pub time: Option<ElapsedTime>,
}

impl FrameFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Parses the match time out of a frame file name.
pub fn parse_frame_time(file_name: &str) -> Option<ElapsedTime> {
    let re = Regex::new(FRAME_NAME_PATTERN).ok()?;
    let caps = re.captures(file_name)?;
    ElapsedTime::from_digits(&caps[1], &caps[2])
}

/// Lists candidate frame files: regular `.png` files whose name contains
/// `map_` and not `unknown_time`.
pub fn list_frame_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(folder)
        .with_context(|| format!("Failed to read session folder: {}", folder.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".png") && name.contains("map_") && !name.contains(UNKNOWN_TIME) {
            files.push(entry.path());
        }
    }

    Ok(files)
}

/// Orders frames by match time. Unparseable names go last; ties keep
/// file-name order.
pub fn sort_frames(paths: Vec<PathBuf>) -> Vec<FrameFile> {
    let mut frames: Vec<FrameFile> = paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let time = parse_frame_time(&name);
            if time.is_none() {
                log::warn!("Filename does not match expected pattern: {}", name);
            }
            FrameFile { path, time }
        })
        .collect();

    frames.sort_by_cached_key(|f| {
        (
            f.time.is_none(),
            f.time.map(|t| t.total_seconds()).unwrap_or(0),
            f.file_name(),
        )
    });

    frames
}
