//! Time label drawn onto each GIF frame.

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::fs;

/// Semi-transparent red.
pub const LABEL_COLOR: Rgba<u8> = Rgba([255, 0, 0, 128]);
/// Label height in pixels.
pub const LABEL_SIZE: f32 = 40.0;
/// Distance from the left and bottom edges.
pub const LABEL_MARGIN: u32 = 10;

const FONT_CANDIDATES: [&str; 8] = [
    r"C:\Windows\Fonts\arial.ttf",
    r"C:\Windows\Fonts\segoeui.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
];

/// 5x7 glyphs, one row per byte, bit 4 is the leftmost column.
static BITMAP_DIGITS: [[u8; 7]; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
];
static BITMAP_COLON: [u8; 7] = [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00];
const BITMAP_ROWS: u32 = 7;
const BITMAP_COLS: u32 = 5;

pub enum LabelFont {
    TrueType(FontVec),
    /// Built-in digits and ':' only.
    Bitmap,
}

impl LabelFont {
    /// First system font that loads, else the bitmap font.
    pub fn load() -> Self {
        for candidate in FONT_CANDIDATES {
            let Ok(data) = fs::read(candidate) else {
                continue;
            };
            match FontVec::try_from_vec(data) {
                Ok(font) => {
                    log::debug!("Label font: {}", candidate);
                    return LabelFont::TrueType(font);
                }
                Err(e) => log::warn!("Unusable font {}: {}", candidate, e),
            }
        }

        log::warn!("No TrueType font found, using built-in digits for labels");
        LabelFont::Bitmap
    }
}

/// Draws `text` in the bottom-left corner of `frame`.
///
/// The text is rendered onto a transparent layer first and then alpha
/// composited, so the frame shows through the label.
pub fn draw_time_label(frame: &mut RgbaImage, text: &str, font: &LabelFont) {
    let (width, height) = frame.dimensions();
    let mut layer = RgbaImage::new(width, height);

    match font {
        LabelFont::TrueType(font) => {
            let scale = PxScale::from(LABEL_SIZE);
            let (_, text_height) = text_size(scale, font, text);
            let y = height as i32 - text_height as i32 - LABEL_MARGIN as i32;
            draw_text_mut(&mut layer, LABEL_COLOR, LABEL_MARGIN as i32, y, scale, font, text);
        }
        LabelFont::Bitmap => draw_bitmap_text(&mut layer, text),
    }

    image::imageops::overlay(frame, &layer, 0, 0);
}

fn bitmap_glyph(c: char) -> Option<&'static [u8; 7]> {
    match c {
        '0'..='9' => BITMAP_DIGITS.get(c as usize - '0' as usize),
        ':' => Some(&BITMAP_COLON),
        _ => None,
    }
}

fn draw_bitmap_text(layer: &mut RgbaImage, text: &str) {
    let cell = (LABEL_SIZE as u32 / BITMAP_ROWS).max(1);
    let glyph_height = BITMAP_ROWS * cell;
    let advance = (BITMAP_COLS + 1) * cell;

    let top = layer.height() as i32 - glyph_height as i32 - LABEL_MARGIN as i32;
    let mut left = LABEL_MARGIN as i32;

    for c in text.chars() {
        if let Some(rows) = bitmap_glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..BITMAP_COLS {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let x = left + (col * cell) as i32;
                    let y = top + (row as u32 * cell) as i32;
                    draw_filled_rect_mut(layer, Rect::at(x, y).of_size(cell, cell), LABEL_COLOR);
                }
            }
        }
        left += advance as i32;
    }
}
