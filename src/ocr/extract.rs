use regex::Regex;
use std::fmt;

/// Text printed in front of the match clock on the map screen.
pub const TIMER_MARKER: &str = "CURRENT MATCH";

/// Filename stand-in when the clock could not be read.
pub const UNKNOWN_TIME: &str = "unknown_time";

/// 2–3 digit minutes, exactly 2 digit seconds.
const TIMER_PATTERN: &str = r"^(\d{2,3}):(\d{2})$";

/// Chat channel labels that show up while the chat box is open.
const CHAT_KEYWORDS: [&str; 2] = ["team", "all"];

/// Elapsed match time read from the HUD.
///
/// Keeps the number of minute digits it was read with, so `012:05` is
/// written back as `012_05`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElapsedTime {
    pub minutes: u32,
    pub seconds: u32,
    minute_digits: usize,
}

impl ElapsedTime {
    /// Returns None when seconds are out of range.
    pub fn new(minutes: u32, seconds: u32) -> Option<Self> {
        let minute_digits = minutes.to_string().len().max(2);
        (seconds < 60).then_some(Self {
            minutes,
            seconds,
            minute_digits,
        })
    }

    /// Parses digit strings such as `"012"` and `"05"`.
    pub fn from_digits(minutes: &str, seconds: &str) -> Option<Self> {
        let mut time = Self::new(minutes.parse().ok()?, seconds.parse().ok()?)?;
        time.minute_digits = time.minute_digits.max(minutes.len());
        Some(time)
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }

    /// Filesystem-safe form, e.g. `12_34`.
    pub fn file_token(&self) -> String {
        self.label().replace(':', "_")
    }

    /// Overlay label form, e.g. `12:34`.
    pub fn label(&self) -> String {
        format!(
            "{:0width$}:{:02}",
            self.minutes,
            self.seconds,
            width = self.minute_digits
        )
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reads the match clock from OCR text of the timer region.
///
/// The text must contain `CURRENT MATCH`; the last whitespace-separated
/// token must look like `MM:SS` (or `MMM:SS`) with seconds below 60.
pub fn parse_match_timer(text: &str) -> Option<ElapsedTime> {
    if !text.contains(TIMER_MARKER) {
        log::warn!("Failed to find '{}' in extracted text.", TIMER_MARKER);
        return None;
    }

    let timer_regex = Regex::new(TIMER_PATTERN).ok()?;
    let token = text.split_whitespace().last()?;
    let Some(caps) = timer_regex.captures(token) else {
        log::warn!("Timer token does not look like MM:SS: {}", token);
        return None;
    };

    match ElapsedTime::from_digits(&caps[1], &caps[2]) {
        Some(time) => {
            log::info!("Successfully extracted time: {}", token);
            Some(time)
        }
        None => {
            log::warn!("Invalid time format with seconds >= 60: {}", token);
            None
        }
    }
}

/// Returns true if the chat region shows a channel label ("Team" / "All").
pub fn is_chat_active(text: &str) -> bool {
    let lower = text.to_lowercase();
    let active = CHAT_KEYWORDS.iter().any(|k| lower.contains(k));
    if active {
        log::info!("Detected chat activity: {}", lower.trim());
    } else {
        log::debug!("No relevant chat activity detected ('team' or 'all').");
    }
    active
}
