//! The capture loop.
//!
//! One iteration: screenshot, chat check, timer read, optional map toggle and
//! re-capture, map crop, save. The loop runs on the session worker thread
//! until the stop flag is cleared.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::overlay::{MapOverlay, OverlayState};
use super::{CaptureDevices, Session, SessionControl};
use crate::capture::{crop_region, HudRegions};
use crate::config::AppConfig;
use crate::ocr::{is_chat_active, parse_match_timer, read_region_text, ElapsedTime, UNKNOWN_TIME};

/// What a single iteration ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The screenshot could not be taken.
    CaptureFailed,
    /// Chat box open, nothing saved.
    ChatActive,
    /// Map crop was empty or could not be written.
    Skipped,
    /// A map frame was written. `time` is None for `unknown_time` frames.
    Saved {
        path: PathBuf,
        time: Option<ElapsedTime>,
    },
}

pub struct CaptureLoop {
    devices: CaptureDevices,
    regions: HudRegions,
    session: Session,
    control: SessionControl,
    map_key: char,
    settle_delay: Duration,
    initial_delay: Duration,
    frame_count: u32,
}

impl CaptureLoop {
    /// Computes the HUD regions for the current screen size.
    pub fn new(
        devices: CaptureDevices,
        session: Session,
        control: SessionControl,
        config: &AppConfig,
    ) -> Result<Self> {
        let (width, height) = devices
            .screen
            .screen_size()
            .context("Failed to read screen size")?;
        let regions = HudRegions::for_screen(width, height);
        log::info!("Screen {}x{}, regions: {:?}", width, height, regions);

        Ok(Self {
            devices,
            regions,
            session,
            control,
            map_key: config.map_toggle_key,
            settle_delay: config.map_settle_delay(),
            initial_delay: config.initial_delay(),
            frame_count: 0,
        })
    }

    /// Number of map frames saved so far.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Runs until the stop flag is cleared.
    ///
    /// The flag is checked between iterations and during sleeps; an
    /// iteration that has started always finishes.
    pub fn run(mut self) {
        log::info!(
            "Waiting {:.1}s before the first capture",
            self.initial_delay.as_secs_f64()
        );
        if !self.control.sleep(self.initial_delay) {
            log::info!("Stopped during initial delay");
            return;
        }

        while self.control.is_running() {
            let interval = Duration::from_secs(self.control.interval_secs());

            match self.step() {
                IterationOutcome::Saved { path, time } => log::info!(
                    "Frame {} saved ({}): {}",
                    self.frame_count,
                    time.map(|t| t.label()).unwrap_or_else(|| UNKNOWN_TIME.to_string()),
                    path.display()
                ),
                outcome => log::debug!("Iteration ended: {:?}", outcome),
            }

            if !self.control.sleep(interval) {
                break;
            }
        }

        log::info!(
            "Capture session stopped after {} frames: {}",
            self.frame_count,
            self.session.folder.display()
        );
    }

    /// Runs one iteration.
    pub fn step(&mut self) -> IterationOutcome {
        let n = self.frame_count + 1;

        let screenshot = match self.devices.screen.capture() {
            Ok(img) => img,
            Err(e) => {
                log::error!("Screenshot failed: {:#}", e);
                return IterationOutcome::CaptureFailed;
            }
        };

        if self.chat_active(&screenshot, n) {
            log::info!("Chat is active, skipping this capture.");
            return IterationOutcome::ChatActive;
        }

        let mut time = self.read_timer(&screenshot, n);
        let mut overlay = MapOverlay::new(self.devices.keyboard.as_ref(), self.map_key);

        let map_shot = if time.is_some() {
            screenshot
        } else {
            overlay.show();
            if overlay.state() == OverlayState::Hidden {
                log::warn!("Map overlay did not open, re-capturing anyway");
            }
            std::thread::sleep(self.settle_delay);

            match self.devices.screen.capture() {
                Ok(img) => {
                    time = self.read_timer(&img, n);
                    img
                }
                Err(e) => {
                    log::error!("Screenshot with map overlay failed: {:#}", e);
                    return IterationOutcome::CaptureFailed;
                }
            }
        };

        let token = match &time {
            Some(t) => t.file_token(),
            None => {
                log::warn!("Timer unreadable, saving frame {} as {}", n, UNKNOWN_TIME);
                UNKNOWN_TIME.to_string()
            }
        };

        let Some(map) = crop_region(&map_shot, &self.regions.map) else {
            log::warn!(
                "Map region {:?} is empty for a {}x{} screenshot, skipping",
                self.regions.map,
                map_shot.width(),
                map_shot.height()
            );
            return IterationOutcome::Skipped;
        };

        let path = self.session.folder.join(format!("map_{}_{}.png", n, token));
        if let Err(e) = save_png(&map, &path) {
            log::error!("{:#}", e);
            return IterationOutcome::Skipped;
        }

        drop(overlay);

        self.frame_count = n;
        self.control.set_frame_count(n);

        IterationOutcome::Saved { path, time }
    }

    fn chat_active(&self, screenshot: &RgbaImage, n: u32) -> bool {
        let Some(crop) = crop_region(screenshot, &self.regions.chat) else {
            log::warn!("Chat region is empty, assuming no chat");
            return false;
        };

        self.save_debug(&crop, &format!("chat_region_{}.png", n));
        let text = read_region_text(self.devices.recognizer.as_ref(), &crop);
        is_chat_active(&text)
    }

    fn read_timer(&self, screenshot: &RgbaImage, n: u32) -> Option<ElapsedTime> {
        let Some(crop) = crop_region(screenshot, &self.regions.timer) else {
            log::warn!("Timer region is empty");
            return None;
        };

        self.save_debug(&crop, &format!("time_region_{}.png", n));
        let text = read_region_text(self.devices.recognizer.as_ref(), &crop);
        parse_match_timer(&text)
    }

    fn save_debug(&self, crop: &RgbaImage, name: &str) {
        if let Err(e) = save_png(crop, &self.session.debug_folder.join(name)) {
            log::warn!("{:#}", e);
        }
    }
}

fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save(path)
        .with_context(|| format!("Failed to save {}", path.display()))
}
