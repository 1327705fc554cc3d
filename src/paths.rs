use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Name of the folder created under the user's Pictures directory.
const SESSIONS_FOLDER_NAME: &str = "Silica Sessions";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the log file path: `<exe_dir>/logs/silica_map_capture.log`
pub fn get_log_file() -> PathBuf {
    get_logs_dir().join("silica_map_capture.log")
}

/// Returns the config file path: `<exe_dir>/config.json`
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Returns the local Tesseract directory: `<data_local_dir>/silica-map-capture/tesseract/`
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("silica-map-capture")
        .join("tesseract")
}

/// Default sessions folder: `<Pictures>/Silica Sessions`, or the home
/// directory when there is no Pictures folder. Nothing is created here.
pub fn default_sessions_folder() -> PathBuf {
    sessions_folder_under(dirs::picture_dir(), dirs::home_dir())
}

fn sessions_folder_under(pictures: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    match pictures.filter(|p| p.is_dir()) {
        Some(pictures) => pictures.join(SESSIONS_FOLDER_NAME),
        None => home.unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Creates the sessions folder. Call at startup.
///
/// Falls back to the parent folder (Pictures for the default) when the
/// folder can't be created.
pub fn prepare_sessions_folder(folder: &Path) -> PathBuf {
    let Err(e) = std::fs::create_dir_all(folder) else {
        return folder.to_path_buf();
    };

    log::error!("Error creating {}: {}", folder.display(), e);
    match folder.parent().filter(|p| p.is_dir()) {
        Some(parent) => {
            log::info!("Falling back to {}", parent.display());
            parent.to_path_buf()
        }
        None => folder.to_path_buf(),
    }
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    Ok(())
}

/// Opens a folder in the platform file manager.
pub fn open_in_file_manager(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("Folder does not exist: {}", path.display()));
    }

    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    Command::new(program)
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to launch {} for {}", program, path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(open_in_file_manager(&missing).is_err());
    }

    #[test]
    fn test_sessions_folder_resolution_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pictures = dir.path().join("Pictures");
        std::fs::create_dir(&pictures).unwrap();

        let folder = sessions_folder_under(Some(pictures.clone()), None);
        assert_eq!(folder, pictures.join(SESSIONS_FOLDER_NAME));
        assert!(!folder.exists());
    }

    #[test]
    fn test_sessions_folder_without_pictures_uses_home() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().to_path_buf();

        assert_eq!(
            sessions_folder_under(Some(home.join("missing")), Some(home.clone())),
            home
        );
        assert_eq!(sessions_folder_under(None, None), PathBuf::from("."));
    }

    #[test]
    fn test_prepare_sessions_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Pictures").join(SESSIONS_FOLDER_NAME);

        assert_eq!(prepare_sessions_folder(&folder), folder);
        assert!(folder.is_dir());
    }

    #[test]
    fn test_prepare_sessions_folder_falls_back_to_parent() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join(SESSIONS_FOLDER_NAME);
        std::fs::write(&blocker, b"x").unwrap();

        assert_eq!(prepare_sessions_folder(&blocker), dir.path());
    }

    #[test]
    fn test_log_file_lives_in_logs_dir() {
        assert_eq!(get_log_file().parent().unwrap(), get_logs_dir());
    }
}
