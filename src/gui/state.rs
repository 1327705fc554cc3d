//! GUI application state management.
//!
//! Tracks the panel's input fields and the session/GIF status for display.

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{parse_interval, AppConfig, DEFAULT_SCREENSHOT_INTERVAL_SECS};

/// Capture session status for display in GUI.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionStatus {
    /// Not running, ready to start
    #[default]
    Idle,
    Running,
    /// Stop requested, waiting for the current iteration
    Stopping,
    Stopped {
        frames: u32,
    },
    Error(String),
}

impl SessionStatus {
    pub fn status_text(&self) -> String {
        match self {
            Self::Idle => "Idle".to_string(),
            Self::Running => "Capturing".to_string(),
            Self::Stopping => "Stopping...".to_string(),
            Self::Stopped { frames } => format!("Stopped ({} screenshots)", frames),
            Self::Error(msg) => format!("Error: {}", msg),
        }
    }

    /// True while a worker thread exists.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Stopping)
    }
}

/// Background GIF job status.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum GifStatus {
    #[default]
    Idle,
    Working,
    Done(String),
    Failed(String),
}

impl GifStatus {
    pub fn is_working(&self) -> bool {
        matches!(self, Self::Working)
    }
}

/// GUI application state.
#[derive(Debug)]
pub struct GuiState {
    /// Interval field, parsed on start and while running.
    pub interval_text: String,
    pub sessions_folder_text: String,
    pub gif_export: bool,
    pub gif_export_folder_text: String,
    /// Write config.json on start and stop.
    pub remember_settings: bool,
    pub status: SessionStatus,
    pub gif_status: GifStatus,
    /// Input problem shown under the controls.
    pub message: Option<String>,
    /// Folder of the most recent session (for "Open Folder" and GIF).
    pub last_session_folder: Option<PathBuf>,
    pub frames: u32,
    pub elapsed: Duration,
}

impl GuiState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval_text: config.screenshot_interval.to_string(),
            sessions_folder_text: config.sessions_folder.display().to_string(),
            gif_export: config.gif_export,
            gif_export_folder_text: config
                .gif_export_folder
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            remember_settings: false,
            status: SessionStatus::Idle,
            gif_status: GifStatus::Idle,
            message: None,
            last_session_folder: None,
            frames: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Merges the panel fields into `base`.
    ///
    /// Fails on an invalid interval or an empty sessions folder.
    pub fn to_config(&self, base: &AppConfig) -> Result<AppConfig> {
        let screenshot_interval = parse_interval(&self.interval_text)?;

        let folder = self.sessions_folder_text.trim();
        if folder.is_empty() {
            return Err(anyhow!("Please choose a sessions folder"));
        }

        let export = self.gif_export_folder_text.trim();

        Ok(AppConfig {
            sessions_folder: PathBuf::from(folder),
            screenshot_interval,
            gif_export: self.gif_export,
            gif_export_folder: (!export.is_empty()).then(|| PathBuf::from(export)),
            ..base.clone()
        })
    }

    /// Interval to hand to a running session. Garbage in the field falls
    /// back to the default instead of stopping the session.
    pub fn live_interval(&self) -> u64 {
        parse_interval(&self.interval_text).unwrap_or(DEFAULT_SCREENSHOT_INTERVAL_SECS)
    }

    pub fn count_text(&self) -> String {
        format!("Screenshots Taken: {}", self.frames)
    }

    pub fn elapsed_text(&self) -> String {
        format!("Elapsed Time: {}s", self.elapsed.as_secs())
    }
}
