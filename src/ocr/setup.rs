use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::paths::get_tesseract_dir;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";
const ENG_TRAINEDDATA: &str = "eng.traineddata";

/// Install locations of the UB-Mannheim Windows installer.
const WINDOWS_INSTALL_DIRS: [&str; 2] = [
    r"C:\Program Files\Tesseract-OCR",
    r"C:\Program Files (x86)\Tesseract-OCR",
];

/// Where Linux/macOS packages put their language data.
const UNIX_TESSDATA_DIRS: [&str; 5] = [
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

pub struct TesseractPaths {
    pub executable: PathBuf,
    pub tessdata: PathBuf,
}

fn executable_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "tesseract.exe"
    } else {
        "tesseract"
    }
}

/// Ensures Tesseract and English language data are available.
///
/// The executable has to be installed by the user; missing language data is
/// downloaded into the local tesseract directory.
pub fn ensure_tesseract() -> Result<TesseractPaths> {
    let executable = find_tesseract_executable()?;

    let tessdata = match find_tessdata_dir() {
        Ok(dir) => dir,
        Err(_) => {
            log::info!("{} not found locally, downloading...", ENG_TRAINEDDATA);
            let local_tessdata = get_tesseract_dir().join("tessdata");
            fs::create_dir_all(&local_tessdata)?;
            download_tessdata(&local_tessdata)?;
            local_tessdata
        }
    };

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Downloads English trained data from the tessdata repository.
fn download_tessdata(tessdata_dir: &Path) -> Result<()> {
    let eng_url = format!("{}/{}", TESSDATA_REPO, ENG_TRAINEDDATA);
    let eng_path = tessdata_dir.join(ENG_TRAINEDDATA);

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&eng_url)
        .header("User-Agent", "silica-map-capture")
        .send()
        .context("Failed to download eng.traineddata")?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            ENG_TRAINEDDATA,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&eng_path)?;
    file.write_all(&bytes)?;

    log::info!("Downloaded {} ({} bytes)", ENG_TRAINEDDATA, bytes.len());

    Ok(())
}

/// Finds the Tesseract executable, checking our local dir first, then PATH,
/// then the default Windows install locations.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    let local_exe = get_tesseract_dir().join(executable_name());
    if local_exe.exists() {
        return Ok(local_exe);
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    if cfg!(target_os = "windows") {
        for dir in &WINDOWS_INSTALL_DIRS {
            let p = Path::new(dir).join("tesseract.exe");
            if p.exists() {
                return Ok(p);
            }
        }
    }

    Err(anyhow!(
        "Tesseract not found. Please install Tesseract-OCR:\n\
         1. Download from: https://github.com/UB-Mannheim/tesseract/releases\n\
         2. Run the installer (choose to add to PATH)\n\
         3. Or copy the portable build to: {}",
        get_tesseract_dir().display()
    ))
}

/// Finds a tessdata directory containing eng.traineddata.
pub fn find_tessdata_dir() -> Result<PathBuf> {
    let mut candidates = vec![get_tesseract_dir().join("tessdata")];

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        candidates.push(PathBuf::from(&prefix));
        candidates.push(PathBuf::from(&prefix).join("tessdata"));
    }

    if cfg!(target_os = "windows") {
        candidates.extend(WINDOWS_INSTALL_DIRS.iter().map(|d| Path::new(d).join("tessdata")));
    } else {
        candidates.extend(UNIX_TESSDATA_DIRS.iter().map(PathBuf::from));
    }

    first_with_traineddata(&candidates).ok_or_else(|| {
        anyhow!("tessdata directory not found. Please ensure eng.traineddata is available.")
    })
}

fn first_with_traineddata(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.join(ENG_TRAINEDDATA).exists())
        .cloned()
}
