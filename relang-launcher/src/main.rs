#![warn(clippy::all)]
#![windows_subsystem = "windows"]

use std::path::PathBuf;

use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use relang_launcher::LaunchRequest;
use relang_launcher::invocation::launcher_name;

fn setup(launcher_name: &str) -> Result<WorkerGuard> {
    color_eyre::install()?;

    let appender = tracing_appender::rolling::never(
        std::env::temp_dir(),
        format!("{launcher_name}-launcher.log"),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(non_blocking)
            .with_ansi(false)
            .finish(),
    )?;

    // https://github.com/tokio-rs/tracing/blob/master/examples/examples/panic_hook.rs
    // Record panics as `tracing` events at the `ERROR` level; there is no console
    // to print them to.
    std::panic::set_hook(Box::new(|panic| {
        if let Some(location) = panic.location() {
            tracing::error!(
                message = %panic,
                panic.file = location.file(),
                panic.line = location.line(),
                panic.column = location.column(),
            );
        } else {
            tracing::error!(message = %panic);
        }
    }));

    Ok(guard)
}

fn main() {
    let request = LaunchRequest::from_env();
    let program = request.args.first().map(PathBuf::from).unwrap_or_default();
    let name = launcher_name(&program);

    // The launcher runs without its diagnostic log if it cannot be set up
    let guard = setup(&name).ok();

    let exit_code = run(request, &name);

    // process::exit does not run destructors, flush the log first
    drop(guard);
    std::process::exit(exit_code);
}

#[cfg(windows)]
fn run(request: LaunchRequest, _name: &str) -> i32 {
    let mut platform = relang_launcher::win32::Win32Platform;
    relang_launcher::launch(&mut platform, request)
}

#[cfg(not(windows))]
fn run(_request: LaunchRequest, name: &str) -> i32 {
    tracing::error!("{} can only launch applications on Windows", name);
    eprintln!("{name} can only launch applications on Windows");
    1
}
