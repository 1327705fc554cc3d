//! Capture sessions.
//!
//! A session owns one timestamped output folder and one background worker
//! running the capture loop. The GUI talks to the worker only through
//! `SessionControl` (stop flag, live interval, frame counter).

pub mod overlay;
pub mod runner;

pub use overlay::{MapOverlay, OverlayState};
pub use runner::{CaptureLoop, IterationOutcome};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use scopeguard::defer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::capture::{DesktopCapturer, KeyInjector, ScreenCapturer, SendInputKeyboard};
use crate::config::{AppConfig, MAX_SCREENSHOT_INTERVAL_SECS};
use crate::ocr::{TesseractRecognizer, TextRecognizer};

/// Sleeps are cut into slices this long so a stop request ends them early.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Host capabilities the capture loop needs.
pub struct CaptureDevices {
    pub screen: Box<dyn ScreenCapturer>,
    pub keyboard: Box<dyn KeyInjector>,
    pub recognizer: Box<dyn TextRecognizer>,
}

impl CaptureDevices {
    /// Desktop capture, SendInput keyboard and the Tesseract CLI.
    ///
    /// Fails when Tesseract cannot be found.
    pub fn system() -> Result<Self> {
        Ok(Self {
            screen: Box::new(DesktopCapturer::new()),
            keyboard: Box::new(SendInputKeyboard::new()),
            recognizer: Box::new(TesseractRecognizer::discover()?),
        })
    }
}

/// Output folders of one session.
#[derive(Debug, Clone)]
pub struct Session {
    pub started_at: DateTime<Local>,
    pub folder: PathBuf,
    pub debug_folder: PathBuf,
}

impl Session {
    /// Creates `<root>/<YYYYMMDD_HHMMSS>/debug/`.
    pub fn create(root: &Path) -> Result<Self> {
        let started_at = Local::now();
        let folder = root.join(started_at.format("%Y%m%d_%H%M%S").to_string());
        let debug_folder = folder.join("debug");

        fs::create_dir_all(&debug_folder).with_context(|| {
            format!("Failed to create session directory: {}", debug_folder.display())
        })?;

        Ok(Self {
            started_at,
            folder,
            debug_folder,
        })
    }
}

/// State shared between the GUI thread and the capture worker.
#[derive(Debug, Clone)]
pub struct SessionControl {
    running: Arc<AtomicBool>,
    interval_secs: Arc<AtomicU64>,
    frames: Arc<AtomicU32>,
}

impl SessionControl {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            interval_secs: Arc::new(AtomicU64::new(interval_secs)),
            frames: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs.load(Ordering::SeqCst)
    }

    /// Takes effect at the next sleep of the capture loop.
    pub fn set_interval_secs(&self, secs: u64) {
        self.interval_secs.store(secs, Ordering::SeqCst);
    }

    pub fn frame_count(&self) -> u32 {
        self.frames.load(Ordering::SeqCst)
    }

    pub(crate) fn set_frame_count(&self, count: u32) {
        self.frames.store(count, Ordering::SeqCst);
    }

    /// Sleeps up to `duration`. Returns false if stopped in the meantime.
    ///
    /// A duration past the end of `Instant` sleeps until stopped.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        while self.is_running() {
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    SLEEP_SLICE.min(deadline - now)
                }
                None => SLEEP_SLICE,
            };
            thread::sleep(slice);
        }
        false
    }
}

/// A running (or finished) capture session as seen by the GUI.
pub struct SessionHandle {
    session: Session,
    control: SessionControl,
    started: Instant,
    worker: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn folder(&self) -> &Path {
        &self.session.folder
    }

    pub fn control(&self) -> &SessionControl {
        &self.control
    }

    pub fn frame_count(&self) -> u32 {
        self.control.frame_count()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Asks the worker to stop. The current iteration still completes.
    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stops the worker and waits for it.
    pub fn join(mut self) {
        self.control.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Capture thread panicked");
            }
        }
    }
}

/// Creates the session folder and starts the capture worker.
///
/// Fails when the interval is zero, the folder cannot be created, or the
/// screen size cannot be read.
pub fn start_session(config: &AppConfig, devices: CaptureDevices) -> Result<SessionHandle> {
    if config.screenshot_interval == 0 {
        return Err(anyhow!("Screenshot interval must be a positive number"));
    }
    if config.screenshot_interval > MAX_SCREENSHOT_INTERVAL_SECS {
        return Err(anyhow!(
            "Screenshot interval must be at most {} seconds",
            MAX_SCREENSHOT_INTERVAL_SECS
        ));
    }

    let session = Session::create(&config.sessions_folder)?;
    let control = SessionControl::new(config.screenshot_interval);
    let capture_loop = CaptureLoop::new(devices, session.clone(), control.clone(), config)?;

    log::info!(
        "Starting capture session at {}: {} (interval {}s)",
        session.started_at.format("%H:%M:%S"),
        session.folder.display(),
        config.screenshot_interval
    );

    let worker_control = control.clone();
    let worker = thread::spawn(move || {
        defer! {
            worker_control.stop();
            log::info!("Capture thread finished");
        }
        capture_loop.run();
    });

    Ok(SessionHandle {
        session,
        control,
        started: Instant::now(),
        worker: Some(worker),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    struct StillScreen;

    impl ScreenCapturer for StillScreen {
        fn screen_size(&self) -> Result<(u32, u32)> {
            Ok((960, 540))
        }

        fn capture(&self) -> Result<RgbaImage> {
            Ok(RgbaImage::from_pixel(960, 540, Rgba([30, 60, 90, 255])))
        }
    }

    struct NoKeys;

    impl KeyInjector for NoKeys {
        fn press(&self, _key: char) -> Result<()> {
            Ok(())
        }

        fn release(&self, _key: char) -> Result<()> {
            Ok(())
        }
    }

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(&self, _img: &image::GrayImage) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn devices() -> CaptureDevices {
        CaptureDevices {
            screen: Box::new(StillScreen),
            keyboard: Box::new(NoKeys),
            recognizer: Box::new(FixedText("CURRENT MATCH 01:02")),
        }
    }

    fn test_config(root: &Path) -> AppConfig {
        AppConfig {
            sessions_folder: root.to_path_buf(),
            screenshot_interval: 1,
            initial_delay: 0.0,
            ..Default::default()
        }
    }

    fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        cond()
    }

    #[test]
    fn test_session_create_makes_debug_folder() {
        let dir = tempdir().unwrap();
        let session = Session::create(dir.path()).unwrap();

        assert!(session.debug_folder.is_dir());
        assert_eq!(session.folder.parent(), Some(dir.path()));
        let name = session.folder.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name.len(), "YYYYMMDD_HHMMSS".len());
    }

    #[test]
    fn test_session_create_fails_on_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();

        assert!(Session::create(&file).is_err());
    }

    #[test]
    fn test_control_sleep_ends_on_stop() {
        let control = SessionControl::new(10);
        let other = control.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            other.stop();
        });

        let start = Instant::now();
        assert!(!control.sleep(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));
        stopper.join().unwrap();
    }

    #[test]
    fn test_control_sleep_completes() {
        let control = SessionControl::new(10);
        assert!(control.sleep(Duration::from_millis(50)));
        assert!(control.sleep(Duration::ZERO));
    }

    #[test]
    fn test_control_sleep_with_unbounded_duration() {
        let control = SessionControl::new(u64::MAX);
        let other = control.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            other.stop();
        });

        assert!(!control.sleep(Duration::from_secs(control.interval_secs())));
        assert!(!control.sleep(Duration::MAX));
        stopper.join().unwrap();
    }

    #[test]
    fn test_control_interval_is_live() {
        let control = SessionControl::new(10);
        let gui_side = control.clone();
        gui_side.set_interval_secs(3);
        assert_eq!(control.interval_secs(), 3);
    }

    #[test]
    fn test_start_session_rejects_zero_interval() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            screenshot_interval: 0,
            ..test_config(dir.path())
        };
        assert!(start_session(&config, devices()).is_err());
    }

    #[test]
    fn test_start_session_rejects_huge_interval() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            screenshot_interval: u64::MAX,
            ..test_config(dir.path())
        };
        assert!(start_session(&config, devices()).is_err());
    }

    #[test]
    fn test_start_session_survives_huge_initial_delay() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            initial_delay: 1e300,
            ..test_config(dir.path())
        };
        let handle = start_session(&config, devices()).unwrap();

        handle.stop();
        assert!(wait_until(Duration::from_secs(5), || handle.is_finished()));
        assert_eq!(handle.frame_count(), 0);
        handle.join();
    }

    #[test]
    fn test_start_session_fails_when_folder_cannot_be_created() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("blocker");
        fs::write(&file, b"x").unwrap();

        assert!(start_session(&test_config(&file), devices()).is_err());
    }

    #[test]
    fn test_start_and_stop_session() {
        let dir = tempdir().unwrap();
        let handle = start_session(&test_config(dir.path()), devices()).unwrap();

        assert!(wait_until(Duration::from_secs(10), || handle.frame_count() >= 1));
        handle.stop();
        assert!(wait_until(Duration::from_secs(10), || handle.is_finished()));

        let map = handle.folder().join("map_1_01_02.png");
        assert!(map.is_file(), "missing {}", map.display());
        assert!(handle.folder().join("debug").join("chat_region_1.png").is_file());
        handle.join();
    }

    #[test]
    fn test_stop_during_initial_delay() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            initial_delay: 60.0,
            ..test_config(dir.path())
        };
        let handle = start_session(&config, devices()).unwrap();

        handle.stop();
        assert!(wait_until(Duration::from_secs(5), || handle.is_finished()));
        assert_eq!(handle.frame_count(), 0);
        handle.join();
    }
}
