use color_eyre::Result;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::WNDCLASSW;
use windows::core::PCWSTR;

use crate::WindowsApi;
use crate::windows_api;
use crate::windows_callbacks;

/// A borderless, minimized pop-up with no content. It only exists so that the
/// taskbar has a window to track, which is what allows the launcher to be
/// pinned.
#[derive(Debug, Clone, Copy)]
pub struct TrackingWindow {
    pub(crate) hwnd: isize,
}

impl From<isize> for TrackingWindow {
    fn from(hwnd: isize) -> Self {
        Self { hwnd }
    }
}

impl TrackingWindow {
    pub fn hwnd(self) -> HWND {
        HWND(windows_api::as_ptr!(self.hwnd))
    }

    pub fn create(launcher_name: &str) -> Result<Self> {
        let name: Vec<u16> = format!("{launcher_name}NullWin\0").encode_utf16().collect();
        let instance = WindowsApi::module_handle_w()?;
        let class_name = PCWSTR(name.as_ptr());
        let window_class = WNDCLASSW {
            hInstance: instance.into(),
            lpszClassName: class_name,
            lpfnWndProc: Some(windows_callbacks::tracking_window),
            ..Default::default()
        };

        let _atom = WindowsApi::register_class_w(&window_class)?;

        let hwnd = WindowsApi::create_tracking_window(class_name, instance)?;
        WindowsApi::show_window_minimized(hwnd);

        tracing::info!("created tracking window {:#x}", hwnd);

        Ok(Self::from(hwnd))
    }

    pub fn is_valid(self) -> bool {
        WindowsApi::is_window(self.hwnd)
    }
}
