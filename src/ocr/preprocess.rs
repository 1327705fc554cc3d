use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbaImage};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;

/// Enlargement applied before OCR, in percent.
const SCALE_PERCENT: u32 = 300;

/// Blur sigma matching a 5x5 Gaussian kernel.
const BLUR_SIGMA: f32 = 1.1;

/// Prepares a cropped HUD region for OCR.
///
/// Grayscale → 300% cubic upscale → Gaussian blur → Otsu binarization →
/// one 3x3 dilation. Pixels above the Otsu level become 255, the rest 0.
pub fn preprocess_for_ocr(img: &RgbaImage) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(0, 0);
    }

    let gray = DynamicImage::ImageRgba8(img.clone()).to_luma8();

    let resized = imageops::resize(
        &gray,
        width * SCALE_PERCENT / 100,
        height * SCALE_PERCENT / 100,
        FilterType::CatmullRom,
    );

    let blurred = gaussian_blur_f32(&resized, BLUR_SIGMA);
    let binary = threshold_otsu(&blurred);

    dilate(&binary, Norm::LInf, 1)
}

/// Binarizes at the automatically computed Otsu level.
fn threshold_otsu(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    let mut output = img.clone();

    for pixel in output.pixels_mut() {
        pixel[0] = if pixel[0] > level { 255 } else { 0 };
    }

    output
}
