use std::ffi::OsString;
use std::path::PathBuf;

use crate::ChildProcess;
use crate::EventPump;
use crate::Invocation;
use crate::LaunchError;
use crate::LogSink;
use crate::SupervisionOutcome;
use crate::Supervisor;
use crate::SupervisorConfig;
use crate::build_command_line;
use crate::command_line::has_embedded_quote;
use crate::config;
use crate::install_dir;

/// The OS services the launcher drives
pub trait Platform {
    type Child: ChildProcess;
    type Pump: EventPump;

    /// Starts `command_line` with stdin suppressed, stdout and stderr sent to
    /// `log_sink` when there is one, and no console window.
    fn spawn(
        &mut self,
        command_line: &str,
        log_sink: Option<&LogSink>,
    ) -> std::io::Result<Self::Child>;

    /// Creates the tracking surface and the event pump servicing it
    fn event_pump(&mut self, launcher_name: &str) -> Self::Pump;

    /// Shows a modal error and returns once it has been dismissed
    fn show_error(&mut self, caption: &str, text: &str);
}

#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// The launcher's own argv, including `argv[0]`
    pub args: Vec<OsString>,
    /// `None` when the user profile environment value is unavailable
    pub profile_dir: Option<PathBuf>,
    pub supervisor: SupervisorConfig,
}

impl LaunchRequest {
    pub fn from_env() -> Self {
        Self {
            args: std::env::args_os().collect(),
            profile_dir: std::env::var_os("USERPROFILE").map(PathBuf::from),
            supervisor: SupervisorConfig::default(),
        }
    }
}

/// Runs the launcher to completion and returns the status it should exit with
pub fn launch<P: Platform>(platform: &mut P, request: LaunchRequest) -> i32 {
    match supervise(platform, request) {
        Ok(_) => 0,
        Err(error) => {
            tracing::error!("{}: {}", error.caption(), error);
            platform.show_error(error.caption(), &error.to_string());
            error.exit_code()
        }
    }
}

/// Resolves the install directory, builds the command line, starts the child
/// and supervises it until it exits.
///
/// A missing user profile is fatal even though the log sink it locates is
/// optional: only failing to open the log file degrades gracefully.
pub fn supervise<P: Platform>(
    platform: &mut P,
    request: LaunchRequest,
) -> Result<SupervisionOutcome, LaunchError> {
    let invocation = Invocation::parse(request.args)?;
    let launcher_name = invocation.launcher_name();

    let profile_dir = request.profile_dir.ok_or(LaunchError::MissingProfile)?;
    let log_sink = LogSink::open(&profile_dir, &launcher_name);

    let install_dir = install_dir::enter(invocation.program())?;
    let base = config::read_command(&install_dir, &launcher_name)?;

    for arg in invocation.passthrough() {
        if has_embedded_quote(arg) {
            tracing::warn!("argument contains an unescaped quote: {}", arg);
        }
    }

    let command_line = build_command_line(&base, invocation.passthrough());

    tracing::info!("launching: {}", command_line);

    let child = platform
        .spawn(&command_line, log_sink.as_ref())
        .map_err(|source| LaunchError::Spawn {
            command_line: command_line.clone(),
            source,
        })?;

    let pump = platform.event_pump(&launcher_name);
    let outcome = Supervisor::new(child, pump, request.supervisor).run();

    // The child inherited its own copy of the log handle
    drop(log_sink);

    Ok(outcome)
}
