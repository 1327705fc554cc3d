//! Keyboard input simulation.
//!
//! Keys are sent with SendInput as hardware scan codes. Games reading
//! DirectInput/RawInput ignore virtual-key-only events, so the scan code is
//! what actually toggles the overlay.

use anyhow::Result;

use super::KeyInjector;

/// Sends key events to whatever window has focus.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendInputKeyboard;

impl SendInputKeyboard {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use anyhow::{anyhow, Result};

    use windows::Win32::UI::Input::KeyboardAndMouse::{
        MapVirtualKeyW, SendInput, VkKeyScanW, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
        KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, MAPVK_VK_TO_VSC, VIRTUAL_KEY,
    };

    fn scan_code(key: char) -> Result<u16> {
        let mut utf16 = [0u16; 2];
        let encoded = key.encode_utf16(&mut utf16);
        if encoded.len() != 1 {
            return Err(anyhow!("Key '{}' cannot be typed", key));
        }

        let vk_scan = unsafe { VkKeyScanW(encoded[0]) };
        if vk_scan == -1 {
            return Err(anyhow!("Key '{}' is not on the current keyboard layout", key));
        }

        let vk = (vk_scan as u16) & 0xFF;
        let scan = unsafe { MapVirtualKeyW(vk as u32, MAPVK_VK_TO_VSC) };
        if scan == 0 {
            return Err(anyhow!("No scan code for key '{}'", key));
        }

        Ok(scan as u16)
    }

    fn send(key: char, flags: KEYBD_EVENT_FLAGS) -> Result<()> {
        let scan = scan_code(key)?;

        let input = INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(0),
                    wScan: scan,
                    dwFlags: KEYEVENTF_SCANCODE | flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            return Err(anyhow!("SendInput blocked for key '{}'", key));
        }

        Ok(())
    }

    pub fn press(key: char) -> Result<()> {
        send(key, KEYBD_EVENT_FLAGS(0))
    }

    pub fn release(key: char) -> Result<()> {
        send(key, KEYEVENTF_KEYUP)
    }
}

#[cfg(not(target_os = "windows"))]
mod platform {
    use anyhow::{anyhow, Result};

    pub fn press(_key: char) -> Result<()> {
        Err(anyhow!("Keyboard input is only supported on Windows"))
    }

    pub fn release(_key: char) -> Result<()> {
        Err(anyhow!("Keyboard input is only supported on Windows"))
    }
}

impl KeyInjector for SendInputKeyboard {
    fn press(&self, key: char) -> Result<()> {
        log::debug!("Key down: {}", key);
        platform::press(key)
    }

    fn release(&self, key: char) -> Result<()> {
        log::debug!("Key up: {}", key);
        platform::release(key)
    }
}
