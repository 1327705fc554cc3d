//! Application logger.
//!
//! Every record goes to stdout and is appended to the log file with a
//! millisecond timestamp, e.g. `[14:03:22.117] INFO  Session folder created`.

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

struct AppLogger {
    file: Mutex<Option<File>>,
}

impl Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record.level(), &record.args().to_string());
        print!("{}", line);

        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

fn format_line(level: log::Level, msg: &str) -> String {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    format!("[{}] {:<5} {}\n", timestamp, level, msg)
}

/// Installs the logger. Console output still works if the log file can't be opened.
pub fn init(log_path: &Path, level: LevelFilter) {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .ok();
    let missing_file = file.is_none();

    let logger = AppLogger {
        file: Mutex::new(file),
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }

    if missing_file {
        log::warn!("Could not open log file {}", log_path.display());
    }
}

/// Appends a panic message to the log file.
///
/// Used from the panic hook, where the logger may not be usable.
pub fn append_panic(log_path: &Path, msg: &str) {
    let line = format_line(log::Level::Error, &format!("[PANIC] {}", msg));
    eprint!("{}", line);
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
        let _ = file.write_all(line.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let line = format_line(log::Level::Warn, "Map crop was empty");
        assert!(line.starts_with('['));
        assert!(line.contains("] WARN  Map crop was empty"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_append_panic_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panic.log");

        append_panic(&path, "boom at src/main.rs:1:1");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[PANIC] boom"));
    }
}
