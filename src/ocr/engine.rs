use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};
use super::TextRecognizer;

/// Tesseract page segmentation mode: treat the image as a single text line.
const PSM_SINGLE_LINE: u8 = 7;

/// OCR backed by the Tesseract command-line executable.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    page_segmentation_mode: u8,
}

impl TesseractRecognizer {
    /// Locates Tesseract and configures it for single-line recognition.
    ///
    /// A missing tessdata directory is tolerated; Tesseract then falls back
    /// to its compiled-in default location.
    pub fn discover() -> Result<Self> {
        let executable = find_tesseract_executable()?;
        let tessdata = match find_tessdata_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                log::warn!("{} Relying on Tesseract's default tessdata.", e);
                None
            }
        };

        log::info!("Using Tesseract at {}", executable.display());
        Ok(Self {
            executable,
            tessdata,
            page_segmentation_mode: PSM_SINGLE_LINE,
        })
    }

    /// Builds the argument list after the input image path.
    fn arguments(&self) -> Vec<String> {
        let mut args = vec!["stdout".to_string()];
        if let Some(tessdata) = &self.tessdata {
            args.push("--tessdata-dir".to_string());
            args.push(tessdata.to_string_lossy().to_string());
        }
        args.push("-l".to_string());
        args.push("eng".to_string());
        args.push("--psm".to_string());
        args.push(self.page_segmentation_mode.to_string());
        args
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, img: &GrayImage) -> Result<String> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).args(self.arguments());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let output = command
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_single_line_mode() {
        let recognizer = TesseractRecognizer {
            executable: PathBuf::from("tesseract"),
            tessdata: Some(PathBuf::from("/data/tessdata")),
            page_segmentation_mode: PSM_SINGLE_LINE,
        };

        let args = recognizer.arguments();
        assert_eq!(args[0], "stdout");
        assert!(args.windows(2).any(|w| w[0] == "--psm" && w[1] == "7"));
        assert!(args.windows(2).any(|w| w[0] == "--tessdata-dir" && w[1] == "/data/tessdata"));
    }

    #[test]
    fn test_arguments_without_tessdata() {
        let recognizer = TesseractRecognizer {
            executable: PathBuf::from("tesseract"),
            tessdata: None,
            page_segmentation_mode: PSM_SINGLE_LINE,
        };

        assert!(!recognizer.arguments().contains(&"--tessdata-dir".to_string()));
    }

    #[test]
    fn test_missing_executable_is_an_error() {
        let recognizer = TesseractRecognizer {
            executable: PathBuf::from("/definitely/not/tesseract"),
            tessdata: None,
            page_segmentation_mode: PSM_SINGLE_LINE,
        };

        assert!(recognizer.recognize(&GrayImage::new(4, 4)).is_err());
    }
}
