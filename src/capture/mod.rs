//! Screen and keyboard access.
//!
//! This module provides:
//! - Region geometry scaled from the 1920x1080 HUD layout (`region`)
//! - Full-screen capture (`screen`)
//! - Synthetic keystrokes for the map toggle (`input`)

pub mod input;
pub mod region;
pub mod screen;

pub use input::SendInputKeyboard;
pub use region::{crop_region, HudRegions, Region};
pub use screen::DesktopCapturer;

use anyhow::Result;
use image::RgbaImage;

/// Source of full-screen screenshots.
pub trait ScreenCapturer: Send {
    /// Screen resolution in pixels (width, height).
    fn screen_size(&self) -> Result<(u32, u32)>;

    /// Captures the whole primary screen.
    fn capture(&self) -> Result<RgbaImage>;
}

/// Injects key presses into the OS input stream.
pub trait KeyInjector: Send {
    fn press(&self, key: char) -> Result<()>;

    fn release(&self, key: char) -> Result<()>;
}
