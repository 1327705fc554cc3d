//! In-game map overlay toggle.

use crate::capture::KeyInjector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Hidden,
    Shown,
}

/// Tracks whether we opened the map overlay during the current iteration.
///
/// The overlay starts `Hidden`. `show()` presses and releases the toggle key
/// and moves to `Shown` once the press went through; dropping the guard in
/// `Shown` toggles it again, so every toggle on is paired with a toggle off,
/// also on early return or panic.
pub struct MapOverlay<'a> {
    keyboard: &'a dyn KeyInjector,
    key: char,
    state: OverlayState,
}

impl<'a> MapOverlay<'a> {
    pub fn new(keyboard: &'a dyn KeyInjector, key: char) -> Self {
        Self {
            keyboard,
            key,
            state: OverlayState::Hidden,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Opens the overlay. No-op if it is already shown.
    pub fn show(&mut self) {
        if self.state == OverlayState::Shown {
            return;
        }

        log::info!("Toggling map overlay on ('{}')", self.key);
        if let Err(e) = self.keyboard.press(self.key) {
            log::error!("Failed to toggle map overlay on: {}", e);
            return;
        }

        // The game toggles on key down, so the overlay is open from here on.
        self.state = OverlayState::Shown;
        self.release_key();
    }

    /// Releases the toggle key, retrying once.
    fn release_key(&self) {
        if let Err(e) = self.keyboard.release(self.key) {
            log::warn!("Failed to release '{}', retrying: {}", self.key, e);
            if let Err(e) = self.keyboard.release(self.key) {
                log::error!("Key '{}' may still be held down: {}", self.key, e);
            }
        }
    }
}

impl Drop for MapOverlay<'_> {
    fn drop(&mut self) {
        if self.state != OverlayState::Shown {
            return;
        }

        log::info!("Toggling map overlay off ('{}')", self.key);
        match self.keyboard.press(self.key) {
            Ok(()) => self.release_key(),
            Err(e) => log::error!("Failed to toggle map overlay off: {}", e),
        }
        self.state = OverlayState::Hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
        fail: bool,
        /// Number of release calls that fail before one succeeds.
        failing_releases: Arc<Mutex<u32>>,
    }

    impl KeyInjector for Recorder {
        fn press(&self, key: char) -> Result<()> {
            if self.fail {
                return Err(anyhow!("blocked"));
            }
            self.events.lock().unwrap().push(format!("down {}", key));
            Ok(())
        }

        fn release(&self, key: char) -> Result<()> {
            let mut failing = self.failing_releases.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                self.events.lock().unwrap().push(format!("up {} failed", key));
                return Err(anyhow!("release dropped"));
            }
            self.events.lock().unwrap().push(format!("up {}", key));
            Ok(())
        }
    }

    #[test]
    fn test_untouched_overlay_sends_nothing() {
        let keyboard = Recorder::default();
        {
            let overlay = MapOverlay::new(&keyboard, 'm');
            assert_eq!(overlay.state(), OverlayState::Hidden);
        }
        assert!(keyboard.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_show_then_drop_is_paired() {
        let keyboard = Recorder::default();
        {
            let mut overlay = MapOverlay::new(&keyboard, 'm');
            overlay.show();
            overlay.show();
            assert_eq!(overlay.state(), OverlayState::Shown);
        }
        assert_eq!(
            *keyboard.events.lock().unwrap(),
            vec!["down m", "up m", "down m", "up m"]
        );
    }

    #[test]
    fn test_drop_during_panic_hides() {
        let keyboard = Recorder::default();
        let events = keyboard.events.clone();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut overlay = MapOverlay::new(&keyboard, 'm');
            overlay.show();
            panic!("iteration blew up");
        }));

        assert!(result.is_err());
        assert_eq!(events.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_failed_show_stays_hidden() {
        let keyboard = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut overlay = MapOverlay::new(&keyboard, 'm');
        overlay.show();
        assert_eq!(overlay.state(), OverlayState::Hidden);
    }

    #[test]
    fn test_failed_release_is_retried_and_paired() {
        let keyboard = Recorder {
            failing_releases: Arc::new(Mutex::new(1)),
            ..Default::default()
        };
        {
            let mut overlay = MapOverlay::new(&keyboard, 'm');
            overlay.show();
            assert_eq!(overlay.state(), OverlayState::Shown);
        }
        assert_eq!(
            *keyboard.events.lock().unwrap(),
            vec!["down m", "up m failed", "up m", "down m", "up m"]
        );
    }

    #[test]
    fn test_failed_release_on_hide_is_retried() {
        let keyboard = Recorder::default();
        {
            let mut overlay = MapOverlay::new(&keyboard, 'm');
            overlay.show();
            *keyboard.failing_releases.lock().unwrap() = 1;
        }
        assert_eq!(
            *keyboard.events.lock().unwrap(),
            vec!["down m", "up m", "down m", "up m failed", "up m"]
        );
    }

    #[test]
    fn test_release_failing_twice_still_hides_on_drop() {
        let keyboard = Recorder {
            failing_releases: Arc::new(Mutex::new(2)),
            ..Default::default()
        };
        {
            let mut overlay = MapOverlay::new(&keyboard, 'm');
            overlay.show();
            assert_eq!(overlay.state(), OverlayState::Shown);
        }
        assert_eq!(
            *keyboard.events.lock().unwrap(),
            vec!["down m", "up m failed", "up m failed", "down m", "up m"]
        );
    }
}
