pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::TesseractRecognizer;
pub use extract::{is_chat_active, parse_match_timer, ElapsedTime, UNKNOWN_TIME};
pub use preprocess::preprocess_for_ocr;
pub use setup::ensure_tesseract;

use anyhow::Result;
use image::{GrayImage, RgbaImage};

/// Turns a preprocessed image into text.
pub trait TextRecognizer: Send {
    fn recognize(&self, img: &GrayImage) -> Result<String>;
}

/// High-level function: cropped region → trimmed text.
///
/// Preprocesses the crop and runs OCR on it. Engine failures are logged and
/// come back as empty text.
pub fn read_region_text(recognizer: &dyn TextRecognizer, region: &RgbaImage) -> String {
    let preprocessed = preprocess_for_ocr(region);

    match recognizer.recognize(&preprocessed) {
        Ok(text) => {
            let text = text.trim().to_string();
            log::debug!("Raw extracted text: {}", text);
            text
        }
        Err(e) => {
            log::error!("Exception occurred during text extraction: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct Echo(&'static str);

    impl TextRecognizer for Echo {
        fn recognize(&self, _img: &GrayImage) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl TextRecognizer for Broken {
        fn recognize(&self, _img: &GrayImage) -> Result<String> {
            Err(anyhow!("engine crashed"))
        }
    }

    #[test]
    fn test_read_region_text_trims() {
        let text = read_region_text(&Echo("  CURRENT MATCH 01:02 \n"), &RgbaImage::new(8, 8));
        assert_eq!(text, "CURRENT MATCH 01:02");
    }

    #[test]
    fn test_read_region_text_swallows_errors() {
        assert_eq!(read_region_text(&Broken, &RgbaImage::new(8, 8)), "");
    }
}
