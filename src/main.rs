//! Silica Map Capture
//!
//! Periodically screenshots the game's map overlay, reads the match timer
//! with Tesseract, saves timestamped map frames and stitches them into an
//! animated GIF.

// Hide console window on Windows for GUI mode
#![windows_subsystem = "windows"]

mod capture;
mod config;
mod gif;
mod gui;
mod logging;
mod ocr;
mod paths;
mod session;

use anyhow::{anyhow, Result};
use log::LevelFilter;

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        logging::append_panic(&paths::get_log_file(), &format!("{}{}", msg, location));
    }));

    paths::ensure_directories()?;
    logging::init(&paths::get_log_file(), LevelFilter::Debug);
    log::info!("Silica Map Capture {}", env!("CARGO_PKG_VERSION"));

    // Region math assumes physical pixels
    #[cfg(target_os = "windows")]
    unsafe {
        let _ = windows::Win32::UI::WindowsAndMessaging::SetProcessDPIAware();
    }

    match ocr::ensure_tesseract() {
        Ok(tesseract) => log::info!(
            "Tesseract ready: {} (tessdata: {})",
            tesseract.executable.display(),
            tesseract.tessdata.display()
        ),
        Err(e) => {
            log::warn!("Failed to setup Tesseract: {:#}", e);
            log::warn!("Sessions cannot start until Tesseract is installed.");
        }
    }

    let mut config = config::load_config(&paths::get_config_path());
    config.sessions_folder = paths::prepare_sessions_folder(&config.sessions_folder);
    log::info!("Sessions folder: {}", config.sessions_folder.display());

    match gui::run_gui(config) {
        Ok(()) => {
            log::info!("GUI application exited normally");
            Ok(())
        }
        Err(e) => {
            log::error!("GUI error: {}", e);
            Err(anyhow!("GUI error: {}", e))
        }
    }
}
