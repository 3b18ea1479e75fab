#![warn(clippy::all)]

pub mod command_line;
pub mod config;
pub mod error;
pub mod install_dir;
pub mod invocation;
pub mod launcher;
pub mod log_sink;
pub mod supervisor;
#[cfg(windows)]
pub mod tracking_window;
#[cfg(windows)]
pub mod win32;
#[cfg(windows)]
pub mod windows_api;
#[cfg(windows)]
pub mod windows_callbacks;

pub use command_line::build_command_line;
pub use error::LaunchError;
pub use invocation::Invocation;
pub use launcher::LaunchRequest;
pub use launcher::Platform;
pub use launcher::launch;
pub use log_sink::LogSink;
pub use supervisor::*;
#[cfg(windows)]
pub use windows_api::WindowsApi;
