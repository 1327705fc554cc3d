//! HUD rectangles for the 1920x1080 reference layout.

use image::RgbaImage;

/// Width of the layout the reference rectangles were measured on.
pub const REFERENCE_WIDTH: f64 = 1920.0;
/// Height of the layout the reference rectangles were measured on.
pub const REFERENCE_HEIGHT: f64 = 1080.0;

/// Chat channel label, bottom-left of the screen.
const CHAT_REFERENCE: (u32, u32, u32, u32) = (20, 700, 75, 725);
/// "CURRENT MATCH MM:SS" line of the map overlay.
const TIMER_REFERENCE: (u32, u32, u32, u32) = (300, 50, 600, 92);
/// The map itself, 974x974 in the reference layout.
const MAP_REFERENCE: (u32, u32, u32, u32) = (638, 53, 1612, 1027);

/// A pixel rectangle: left/top inclusive, right/bottom exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Region {
    /// Scales a reference rectangle, truncating each coordinate.
    fn scaled(reference: (u32, u32, u32, u32), x_scale: f64, y_scale: f64) -> Self {
        let (left, top, right, bottom) = reference;
        Self {
            left: (left as f64 * x_scale) as u32,
            top: (top as f64 * y_scale) as u32,
            right: (right as f64 * x_scale) as u32,
            bottom: (bottom as f64 * y_scale) as u32,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// The three rectangles used per capture, computed once per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudRegions {
    pub chat: Region,
    pub timer: Region,
    pub map: Region,
}

impl HudRegions {
    pub fn for_screen(width: u32, height: u32) -> Self {
        let x_scale = width as f64 / REFERENCE_WIDTH;
        let y_scale = height as f64 / REFERENCE_HEIGHT;

        Self {
            chat: Region::scaled(CHAT_REFERENCE, x_scale, y_scale),
            timer: Region::scaled(TIMER_REFERENCE, x_scale, y_scale),
            map: Region::scaled(MAP_REFERENCE, x_scale, y_scale),
        }
    }
}

/// Crops a region out of a screenshot.
///
/// The region is clamped to the image bounds. Returns None when nothing is
/// left to crop, so callers never write an empty image.
pub fn crop_region(img: &RgbaImage, region: &Region) -> Option<RgbaImage> {
    if region.is_empty() {
        return None;
    }

    let (w, h) = img.dimensions();

    let x0 = region.left.min(w);
    let y0 = region.top.min(h);
    let rw = region.width().min(w - x0);
    let rh = region.height().min(h - y0);

    if rw == 0 || rh == 0 {
        return None;
    }

    Some(image::imageops::crop_imm(img, x0, y0, rw, rh).to_image())
}
