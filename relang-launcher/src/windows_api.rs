use std::fs::File;
use std::os::windows::io::AsRawHandle;

use color_eyre::Result;
use color_eyre::eyre::Error;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Foundation::HANDLE_FLAG_INHERIT;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Foundation::HWND;
use windows::Win32::Foundation::SetHandleInformation;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::CREATE_NO_WINDOW;
use windows::Win32::System::Threading::CreateProcessW;
use windows::Win32::System::Threading::GetExitCodeProcess;
use windows::Win32::System::Threading::PROCESS_INFORMATION;
use windows::Win32::System::Threading::STARTF_USESTDHANDLES;
use windows::Win32::System::Threading::STARTUPINFOW;
use windows::Win32::UI::WindowsAndMessaging::CreateWindowExW;
use windows::Win32::UI::WindowsAndMessaging::DispatchMessageW;
use windows::Win32::UI::WindowsAndMessaging::IsWindow;
use windows::Win32::UI::WindowsAndMessaging::MB_ICONERROR;
use windows::Win32::UI::WindowsAndMessaging::MB_OK;
use windows::Win32::UI::WindowsAndMessaging::MSG;
use windows::Win32::UI::WindowsAndMessaging::MessageBoxW;
use windows::Win32::UI::WindowsAndMessaging::PM_REMOVE;
use windows::Win32::UI::WindowsAndMessaging::PeekMessageW;
use windows::Win32::UI::WindowsAndMessaging::PostQuitMessage;
use windows::Win32::UI::WindowsAndMessaging::RegisterClassW;
use windows::Win32::UI::WindowsAndMessaging::SW_SHOWMINIMIZED;
use windows::Win32::UI::WindowsAndMessaging::ShowWindow;
use windows::Win32::UI::WindowsAndMessaging::TranslateMessage;
use windows::Win32::UI::WindowsAndMessaging::WINDOW_EX_STYLE;
use windows::Win32::UI::WindowsAndMessaging::WNDCLASSW;
use windows::Win32::UI::WindowsAndMessaging::WS_POPUP;
use windows::Win32::UI::WindowsAndMessaging::WS_SYSMENU;
use windows::core::PCWSTR;
use windows::core::PWSTR;
use windows::core::Result as WindowsCrateResult;

macro_rules! as_ptr {
    ($value:expr) => {
        $value as *mut core::ffi::c_void
    };
}

pub(crate) use as_ptr;

pub enum WindowsResult<T, E> {
    Err(E),
    Ok(T),
}

macro_rules! impl_from_integer_for_windows_result {
    ( $( $integer_type:ty ),+ ) => {
        $(
            impl From<$integer_type> for WindowsResult<$integer_type, Error> {
                fn from(return_value: $integer_type) -> Self {
                    match return_value {
                        0 => Self::Err(std::io::Error::last_os_error().into()),
                        _ => Self::Ok(return_value),
                    }
                }
            }
        )+
    };
}

impl_from_integer_for_windows_result!(u16);

impl<T, E> From<WindowsResult<T, E>> for Result<T, E> {
    fn from(result: WindowsResult<T, E>) -> Self {
        match result {
            WindowsResult::Err(error) => Err(error),
            WindowsResult::Ok(ok) => Ok(ok),
        }
    }
}

pub trait ProcessWindowsCrateResult<T> {
    fn process(self) -> Result<T>;
}

impl<T> ProcessWindowsCrateResult<T> for WindowsCrateResult<T> {
    fn process(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(error.into()),
        }
    }
}

fn wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

pub struct WindowsApi;

impl WindowsApi {
    pub fn module_handle_w() -> Result<HMODULE> {
        unsafe { GetModuleHandleW(None) }.process()
    }

    pub fn register_class_w(window_class: &WNDCLASSW) -> Result<u16> {
        Result::from(WindowsResult::from(unsafe { RegisterClassW(window_class) }))
    }

    pub fn create_tracking_window(class_name: PCWSTR, instance: HMODULE) -> Result<isize> {
        unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class_name,
                PCWSTR::null(),
                WS_POPUP | WS_SYSMENU,
                0,
                0,
                0,
                0,
                None,
                None,
                Some(instance.into()),
                None,
            )
        }
        .process()
        .map(|hwnd| hwnd.0 as isize)
    }

    pub fn show_window_minimized(hwnd: isize) {
        // The return value is the previous visibility state, not an error
        let _ = unsafe { ShowWindow(HWND(as_ptr!(hwnd)), SW_SHOWMINIMIZED) };
    }

    pub fn is_window(hwnd: isize) -> bool {
        unsafe { IsWindow(Some(HWND(as_ptr!(hwnd)))) }.as_bool()
    }

    /// Removes the next message for this thread from the queue, if there is one
    pub fn peek_message() -> Option<MSG> {
        let mut message = MSG::default();

        if unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) }.as_bool() {
            Some(message)
        } else {
            None
        }
    }

    pub fn translate_and_dispatch(message: &MSG) {
        unsafe {
            let _ = TranslateMessage(message);
            DispatchMessageW(message);
        }
    }

    pub fn post_quit_message(exit_code: i32) {
        unsafe { PostQuitMessage(exit_code) }
    }

    pub fn message_box_error(caption: &str, text: &str) {
        let caption = wide(caption);
        let text = wide(text);

        unsafe {
            MessageBoxW(
                None,
                PCWSTR(text.as_ptr()),
                PCWSTR(caption.as_ptr()),
                MB_OK | MB_ICONERROR,
            );
        }
    }

    /// Creates a process from a full command line, letting the OS resolve the
    /// executable from its first token.
    ///
    /// Standard input is null; standard output and error both use `std_handle`,
    /// which must be inheritable.
    pub fn create_process(
        command_line: &str,
        std_handle: Option<HANDLE>,
    ) -> std::io::Result<PROCESS_INFORMATION> {
        let mut command_line = wide(command_line);
        let std_handle = std_handle.unwrap_or_default();

        #[allow(clippy::cast_possible_truncation)]
        let startup_info = STARTUPINFOW {
            cb: std::mem::size_of::<STARTUPINFOW>() as u32,
            dwFlags: STARTF_USESTDHANDLES,
            hStdInput: HANDLE::default(),
            hStdOutput: std_handle,
            hStdError: std_handle,
            ..Default::default()
        };

        let mut process_information = PROCESS_INFORMATION::default();

        match unsafe {
            CreateProcessW(
                None,
                Some(PWSTR(command_line.as_mut_ptr())),
                None,
                None,
                true,
                CREATE_NO_WINDOW,
                None,
                None,
                &startup_info,
                &mut process_information,
            )
        } {
            Ok(()) => Ok(process_information),
            Err(error) => {
                // HRESULT_FROM_WIN32 keeps the win32 error code in the low word
                let source = std::io::Error::from_raw_os_error(error.code().0 & 0xFFFF);
                tracing::error!("create_process: {}", error);
                Err(source)
            }
        }
    }

    pub fn exit_code_process(handle: HANDLE) -> Result<u32> {
        let mut exit_code = 0;
        unsafe { GetExitCodeProcess(handle, &mut exit_code) }.process()?;

        Ok(exit_code)
    }

    pub fn close_handle(handle: HANDLE) -> Result<()> {
        unsafe { CloseHandle(handle) }.process()
    }

    pub fn set_handle_inheritable(file: &File) -> Result<()> {
        unsafe {
            SetHandleInformation(
                HANDLE(file.as_raw_handle()),
                HANDLE_FLAG_INHERIT.0,
                HANDLE_FLAG_INHERIT,
            )
        }
        .process()
    }
}
