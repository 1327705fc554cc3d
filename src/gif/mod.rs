//! Animated GIF assembly from the map frames of a session.

pub mod frames;
pub mod label;

pub use frames::{list_frame_files, parse_frame_time, sort_frames, FrameFile};
pub use label::{draw_time_label, LabelFont};

use anyhow::{Context, Result};
use chrono::Local;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::AppConfig;

/// Output file name, both in the session folder and in export folders.
pub const GIF_FILE_NAME: &str = "session.gif";

/// NeuQuant sampling factor: 1 is best quality, 30 is fastest.
const ENCODER_SPEED: i32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct GifOptions {
    pub frame_delay_ms: u32,
    /// Copy the result here when set.
    pub export_folder: Option<PathBuf>,
}

impl GifOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            frame_delay_ms: config.gif_frame_delay_ms(),
            export_folder: if config.gif_export {
                config.gif_export_folder.clone()
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GifOutcome {
    Created {
        path: PathBuf,
        frames: usize,
        exported: Option<PathBuf>,
    },
    /// The session folder does not exist.
    MissingFolder,
    /// No frame with a readable match time.
    NoImages,
}

/// Builds `session.gif` in `session_folder`.
///
/// Frames are ordered by match time and labelled `MM:SS`. Frames without a
/// readable time are left out.
pub fn create_session_gif(session_folder: &Path, options: &GifOptions) -> Result<GifOutcome> {
    if !session_folder.is_dir() {
        log::warn!("Session folder does not exist: {}", session_folder.display());
        return Ok(GifOutcome::MissingFolder);
    }

    let frames: Vec<FrameFile> = sort_frames(list_frame_files(session_folder)?)
        .into_iter()
        .filter(|f| f.time.is_some())
        .collect();

    if frames.is_empty() {
        log::warn!("No images found for GIF creation in {}", session_folder.display());
        return Ok(GifOutcome::NoImages);
    }

    let gif_path = session_folder.join(GIF_FILE_NAME);
    let count = encode_frames(&frames, &gif_path, options.frame_delay_ms)?;
    log::info!("GIF saved to {} ({} frames)", gif_path.display(), count);

    let exported = match &options.export_folder {
        Some(folder) => Some(export_gif(&gif_path, folder)?),
        None => None,
    };

    Ok(GifOutcome::Created {
        path: gif_path,
        frames: count,
        exported,
    })
}

/// Encodes into a temp file next to `gif_path` and moves it into place only
/// once every frame is written. On error the previous GIF, if any, is kept.
fn encode_frames(frames: &[FrameFile], gif_path: &Path, delay_ms: u32) -> Result<usize> {
    let font = LabelFont::load();
    let delay = Delay::from_numer_denom_ms(delay_ms, 1);

    let folder = gif_path.parent().unwrap_or(Path::new("."));
    let tmp = NamedTempFile::new_in(folder)
        .with_context(|| format!("Failed to create a temp file in {}", folder.display()))?;

    let mut count = 0;
    {
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(tmp.as_file()), ENCODER_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;

        for frame in frames {
            let Some(time) = frame.time else {
                continue;
            };

            let mut img = image::open(&frame.path)
                .with_context(|| format!("Failed to open {}", frame.path.display()))?
                .to_rgba8();
            draw_time_label(&mut img, &time.label(), &font);

            encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
            count += 1;
        }
    }

    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush {}", gif_path.display()))?;
    tmp.persist(gif_path)
        .with_context(|| format!("Failed to write {}", gif_path.display()))?;

    Ok(count)
}

/// Copies a GIF to `<export_root>/<YYYYMMDD_HHMMSS>/session.gif`.
pub fn export_gif(gif_path: &Path, export_root: &Path) -> Result<PathBuf> {
    let folder = export_root.join(Local::now().format("%Y%m%d_%H%M%S").to_string());
    fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create export folder: {}", folder.display()))?;

    let target = folder.join(GIF_FILE_NAME);
    fs::copy(gif_path, &target)
        .with_context(|| format!("Failed to copy GIF to {}", target.display()))?;

    log::info!("GIF exported to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba, RgbaImage};
    use std::fs::File;
    use std::io::BufReader;
    use tempfile::tempdir;

    fn options() -> GifOptions {
        GifOptions {
            frame_delay_ms: 500,
            export_folder: None,
        }
    }

    fn write_frame(dir: &Path, name: &str, color: [u8; 3]) {
        RgbaImage::from_pixel(64, 64, Rgba([color[0], color[1], color[2], 255]))
            .save(dir.join(name))
            .unwrap();
    }

    /// Dominant channel of the top-right pixel of each frame.
    fn decode_order(path: &Path) -> Vec<usize> {
        let decoder = GifDecoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
        decoder
            .into_frames()
            .collect_frames()
            .unwrap()
            .iter()
            .map(|f| {
                let p = f.buffer().get_pixel(63, 0);
                (0..3).max_by_key(|&c| p[c]).unwrap()
            })
            .collect()
    }

    fn populate(dir: &Path) {
        write_frame(dir, "map_1_02_05.png", [0, 255, 0]);
        write_frame(dir, "map_2_01_59.png", [255, 0, 0]);
        write_frame(dir, "map_3_10_00.png", [0, 0, 255]);
        write_frame(dir, "map_4_unknown_time.png", [255, 255, 255]);
        write_frame(dir, "map_5_bad.png", [255, 255, 255]);
    }

    #[test]
    fn test_create_session_gif() {
        let dir = tempdir().unwrap();
        populate(dir.path());

        let outcome = create_session_gif(dir.path(), &options()).unwrap();

        let gif = dir.path().join(GIF_FILE_NAME);
        assert_eq!(
            outcome,
            GifOutcome::Created {
                path: gif.clone(),
                frames: 3,
                exported: None,
            }
        );
        // red (01:59), green (02:05), blue (10:00)
        assert_eq!(decode_order(&gif), vec![0, 1, 2]);
    }

    #[test]
    fn test_create_session_gif_is_repeatable() {
        let dir = tempdir().unwrap();
        populate(dir.path());
        let gif = dir.path().join(GIF_FILE_NAME);

        create_session_gif(dir.path(), &options()).unwrap();
        let first = decode_order(&gif);
        create_session_gif(dir.path(), &options()).unwrap();
        let second = decode_order(&gif);

        assert_eq!(first, second);
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_no_images() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), "map_1_unknown_time.png", [0, 0, 0]);
        write_frame(dir.path(), "map_2_bad.png", [0, 0, 0]);

        assert_eq!(
            create_session_gif(dir.path(), &options()).unwrap(),
            GifOutcome::NoImages
        );
        assert!(!dir.path().join(GIF_FILE_NAME).exists());
    }

    fn folder_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_corrupt_frame_leaves_no_gif() {
        let dir = tempdir().unwrap();
        write_frame(dir.path(), "map_1_00_10.png", [255, 0, 0]);
        fs::write(dir.path().join("map_2_00_20.png"), b"not a png").unwrap();

        assert!(create_session_gif(dir.path(), &options()).is_err());
        assert!(!dir.path().join(GIF_FILE_NAME).exists());
        assert_eq!(
            folder_entries(dir.path()),
            vec!["map_1_00_10.png", "map_2_00_20.png"]
        );
    }

    #[test]
    fn test_corrupt_frame_keeps_previous_gif() {
        let dir = tempdir().unwrap();
        populate(dir.path());
        create_session_gif(dir.path(), &options()).unwrap();
        let gif = dir.path().join(GIF_FILE_NAME);
        let before = fs::read(&gif).unwrap();

        fs::write(dir.path().join("map_6_20_00.png"), b"not a png").unwrap();

        assert!(create_session_gif(dir.path(), &options()).is_err());
        assert_eq!(fs::read(&gif).unwrap(), before);
    }

    #[test]
    fn test_missing_folder() {
        let dir = tempdir().unwrap();
        assert_eq!(
            create_session_gif(&dir.path().join("nope"), &options()).unwrap(),
            GifOutcome::MissingFolder
        );
    }

    #[test]
    fn test_export_copy() {
        let dir = tempdir().unwrap();
        let export = tempdir().unwrap();
        populate(dir.path());

        let opts = GifOptions {
            export_folder: Some(export.path().to_path_buf()),
            ..options()
        };
        let GifOutcome::Created { exported: Some(copy), .. } =
            create_session_gif(dir.path(), &opts).unwrap()
        else {
            panic!("expected an exported GIF");
        };

        assert!(copy.starts_with(export.path()));
        assert_eq!(copy.file_name().unwrap(), GIF_FILE_NAME);
        assert_eq!(
            fs::read(&copy).unwrap(),
            fs::read(dir.path().join(GIF_FILE_NAME)).unwrap()
        );
    }

    #[test]
    fn test_options_from_config() {
        let config = AppConfig {
            gif_frame_duration: 0.25,
            gif_export: false,
            gif_export_folder: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };
        let opts = GifOptions::from_config(&config);
        assert_eq!(opts.frame_delay_ms, 250);
        assert_eq!(opts.export_folder, None);

        let config = AppConfig {
            gif_export: true,
            ..config
        };
        assert_eq!(
            GifOptions::from_config(&config).export_folder,
            Some(PathBuf::from("/tmp/out"))
        );
    }
}
