//! Application settings.
//!
//! Loaded from config.json next to the executable at startup. Missing fields
//! take their defaults, so older config files keep working. The file is only
//! written back when the user asks for it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interval used when the panel field holds garbage mid-session.
pub const DEFAULT_SCREENSHOT_INTERVAL_SECS: u64 = 10;

/// Longest accepted interval: one day.
pub const MAX_SCREENSHOT_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Complete application configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Parent folder for per-session output folders
    #[serde(default = "crate::paths::default_sessions_folder")]
    pub sessions_folder: PathBuf,
    /// Seconds between capture iterations
    #[serde(default = "default_screenshot_interval")]
    pub screenshot_interval: u64,
    /// Seconds to wait after pressing start before the first capture
    #[serde(default = "default_initial_delay")]
    pub initial_delay: f64,
    /// Seconds each frame is shown in the generated GIF
    #[serde(default = "default_gif_frame_duration")]
    pub gif_frame_duration: f64,
    /// Where exported GIFs are copied to
    #[serde(default)]
    pub gif_export_folder: Option<PathBuf>,
    /// Copy generated GIFs into the export folder
    #[serde(default)]
    pub gif_export: bool,
    /// Key that toggles the in-game map overlay
    #[serde(default = "default_map_toggle_key")]
    pub map_toggle_key: char,
    /// Wait after toggling the map before re-capturing (milliseconds)
    #[serde(default = "default_map_settle_delay_ms")]
    pub map_settle_delay_ms: u64,
}

fn default_screenshot_interval() -> u64 {
    DEFAULT_SCREENSHOT_INTERVAL_SECS
}

fn default_initial_delay() -> f64 {
    5.0
}

fn default_gif_frame_duration() -> f64 {
    0.5
}

fn default_map_toggle_key() -> char {
    'm'
}

fn default_map_settle_delay_ms() -> u64 {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sessions_folder: crate::paths::default_sessions_folder(),
            screenshot_interval: default_screenshot_interval(),
            initial_delay: default_initial_delay(),
            gif_frame_duration: default_gif_frame_duration(),
            gif_export_folder: None,
            gif_export: false,
            map_toggle_key: default_map_toggle_key(),
            map_settle_delay_ms: default_map_settle_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Negative values mean no delay; values too large for a `Duration`
    /// fall back to the default.
    pub fn initial_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.initial_delay.max(0.0)).unwrap_or_else(|_| {
            log::warn!(
                "initial_delay {} is out of range, using {}s",
                self.initial_delay,
                default_initial_delay()
            );
            Duration::from_secs_f64(default_initial_delay())
        })
    }

    pub fn map_settle_delay(&self) -> Duration {
        Duration::from_millis(self.map_settle_delay_ms)
    }

    /// Per-frame GIF delay in whole milliseconds (at least 10 ms, the GIF resolution).
    pub fn gif_frame_delay_ms(&self) -> u32 {
        ((self.gif_frame_duration * 1000.0).round() as u32).max(10)
    }
}

/// Parses the interval typed into the panel.
pub fn parse_interval(text: &str) -> Result<u64> {
    let secs: u64 = text
        .trim()
        .parse()
        .with_context(|| format!("Please enter a valid number for the interval (got \"{}\")", text))?;
    if secs == 0 {
        anyhow::bail!("The interval must be at least 1 second");
    }
    if secs > MAX_SCREENSHOT_INTERVAL_SECS {
        anyhow::bail!(
            "The interval must be at most {} seconds (one day)",
            MAX_SCREENSHOT_INTERVAL_SECS
        );
    }
    Ok(secs)
}

/// Loads configuration from `path` or returns defaults.
pub fn load_config(path: &Path) -> AppConfig {
    log::info!("Looking for config at: {}", path.display());

    if !path.exists() {
        log::info!("config.json not found. Using default config.");
        return AppConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log::info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config.json: {}. Using defaults.", e);
                AppConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read config.json: {}. Using defaults.", e);
            AppConfig::default()
        }
    }
}

/// Writes configuration to `path` as pretty-printed JSON.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Config saved to {}", path.display());
    Ok(())
}
