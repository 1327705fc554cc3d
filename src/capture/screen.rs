//! Full-screen capture of the primary display.
//!
//! Uses GDI: the desktop DC is blitted into a compatible bitmap and read back
//! with GetDIBits as top-down 32-bit BGRA.

use anyhow::Result;
use image::RgbaImage;

use super::ScreenCapturer;

/// Captures the primary display.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopCapturer;

impl DesktopCapturer {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use anyhow::{anyhow, Result};
    use image::RgbaImage;
    use scopeguard::defer;

    use windows::Win32::Foundation::HWND;
    use windows::Win32::Graphics::Gdi::{
        BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
        GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, DIB_RGB_COLORS,
        HGDIOBJ, SRCCOPY,
    };
    use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

    pub fn screen_size() -> Result<(u32, u32)> {
        let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
        let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };

        if width <= 0 || height <= 0 {
            return Err(anyhow!("Invalid screen size: {}x{}", width, height));
        }

        Ok((width as u32, height as u32))
    }

    pub fn capture() -> Result<RgbaImage> {
        let (width, height) = screen_size()?;

        let mut buffer = vec![0u8; (width * height * 4) as usize];

        unsafe {
            let screen_dc = GetDC(HWND::default());
            if screen_dc.is_invalid() {
                return Err(anyhow!("GetDC failed"));
            }
            defer! {
                ReleaseDC(HWND::default(), screen_dc);
            }

            let mem_dc = CreateCompatibleDC(screen_dc);
            if mem_dc.is_invalid() {
                return Err(anyhow!("CreateCompatibleDC failed"));
            }
            defer! {
                let _ = DeleteDC(mem_dc);
            }

            let bitmap = CreateCompatibleBitmap(screen_dc, width as i32, height as i32);
            if bitmap.is_invalid() {
                return Err(anyhow!("CreateCompatibleBitmap failed"));
            }
            defer! {
                let _ = DeleteObject(HGDIOBJ(bitmap.0));
            }

            let previous = SelectObject(mem_dc, HGDIOBJ(bitmap.0));
            defer! {
                SelectObject(mem_dc, previous);
            }

            BitBlt(
                mem_dc,
                0,
                0,
                width as i32,
                height as i32,
                screen_dc,
                0,
                0,
                SRCCOPY,
            )?;

            let mut info = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width as i32,
                    // Negative height: rows come back top-down
                    biHeight: -(height as i32),
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: 0,
                    ..Default::default()
                },
                ..Default::default()
            };

            let lines = GetDIBits(
                mem_dc,
                bitmap,
                0,
                height,
                Some(buffer.as_mut_ptr().cast()),
                &mut info,
                DIB_RGB_COLORS,
            );
            if lines == 0 {
                return Err(anyhow!("GetDIBits failed"));
            }
        }

        // BGRA -> RGBA, alpha from GDI is undefined
        for px in buffer.chunks_exact_mut(4) {
            px.swap(0, 2);
            px[3] = 255;
        }

        RgbaImage::from_raw(width, height, buffer)
            .ok_or_else(|| anyhow!("Screenshot buffer size mismatch"))
    }
}

#[cfg(not(target_os = "windows"))]
mod platform {
    use anyhow::{anyhow, Result};
    use image::RgbaImage;

    pub fn screen_size() -> Result<(u32, u32)> {
        Err(anyhow!("Screen capture is only supported on Windows"))
    }

    pub fn capture() -> Result<RgbaImage> {
        Err(anyhow!("Screen capture is only supported on Windows"))
    }
}

impl ScreenCapturer for DesktopCapturer {
    fn screen_size(&self) -> Result<(u32, u32)> {
        platform::screen_size()
    }

    fn capture(&self) -> Result<RgbaImage> {
        let img = platform::capture()?;
        log::debug!("Captured screen {}x{}", img.width(), img.height());
        Ok(img)
    }
}
