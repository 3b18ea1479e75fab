use std::os::windows::io::AsRawHandle;

use color_eyre::Result;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Foundation::STILL_ACTIVE;

use crate::ChildProcess;
use crate::ChildStatus;
use crate::EventPump;
use crate::LogSink;
use crate::Platform;
use crate::WindowsApi;
use crate::tracking_window::TrackingWindow;

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Platform;

/// The process and primary thread handles of the child, closed on drop
#[derive(Debug)]
pub struct Win32Child {
    process: HANDLE,
    thread: HANDLE,
    process_id: u32,
}

impl Win32Child {
    pub const fn process_id(&self) -> u32 {
        self.process_id
    }
}

impl ChildProcess for Win32Child {
    fn exit_status(&mut self) -> Result<ChildStatus> {
        let exit_code = WindowsApi::exit_code_process(self.process)?;

        // GetExitCodeProcess reports STILL_ACTIVE until the process terminates
        #[allow(clippy::cast_sign_loss)]
        let still_active = STILL_ACTIVE.0 as u32;

        if exit_code == still_active {
            return Ok(ChildStatus::StillActive);
        }

        // NTSTATUS-style codes (e.g. 0xC0000005) read back as negative
        #[allow(clippy::cast_possible_wrap)]
        let exit_code = exit_code as i32;

        Ok(ChildStatus::Exited(Some(exit_code)))
    }
}

impl Drop for Win32Child {
    fn drop(&mut self) {
        for handle in [self.process, self.thread] {
            if let Err(error) = WindowsApi::close_handle(handle) {
                tracing::warn!(
                    "could not close a handle of process {}: {}",
                    self.process_id,
                    error
                );
            }
        }
    }
}

/// Services this thread's message queue, which includes the tracking window's
#[derive(Debug)]
pub struct Win32EventPump {
    window: Option<TrackingWindow>,
}

impl Win32EventPump {
    pub const fn window(&self) -> Option<TrackingWindow> {
        self.window
    }
}

impl EventPump for Win32EventPump {
    fn dispatch_pending(&mut self, budget: usize) -> usize {
        let mut dispatched = 0;

        while dispatched < budget {
            let Some(message) = WindowsApi::peek_message() else {
                break;
            };

            WindowsApi::translate_and_dispatch(&message);
            dispatched += 1;
        }

        dispatched
    }

    fn post_quit(&mut self) {
        WindowsApi::post_quit_message(0);
    }
}

impl Platform for Win32Platform {
    type Child = Win32Child;
    type Pump = Win32EventPump;

    fn spawn(
        &mut self,
        command_line: &str,
        log_sink: Option<&LogSink>,
    ) -> std::io::Result<Self::Child> {
        let std_handle = log_sink.and_then(|sink| {
            match WindowsApi::set_handle_inheritable(sink.file()) {
                Ok(()) => Some(HANDLE(sink.file().as_raw_handle())),
                Err(error) => {
                    tracing::warn!(
                        "could not make {} inheritable, child output will not be captured: {}",
                        sink.path().display(),
                        error
                    );
                    None
                }
            }
        });

        let information = WindowsApi::create_process(command_line, std_handle)?;

        tracing::info!("started child process {}", information.dwProcessId);

        Ok(Win32Child {
            process: information.hProcess,
            thread: information.hThread,
            process_id: information.dwProcessId,
        })
    }

    fn event_pump(&mut self, launcher_name: &str) -> Self::Pump {
        let window = match TrackingWindow::create(launcher_name) {
            Ok(window) if window.is_valid() => Some(window),
            Ok(window) => {
                tracing::warn!("tracking window {:?} is not a valid window", window.hwnd());
                None
            }
            Err(error) => {
                tracing::warn!("could not create the tracking window: {}", error);
                None
            }
        };

        Win32EventPump { window }
    }

    fn show_error(&mut self, caption: &str, text: &str) {
        WindowsApi::message_box_error(caption, text);
    }
}
