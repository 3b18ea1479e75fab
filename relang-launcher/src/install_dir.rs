use std::path::Path;
use std::path::PathBuf;

use crate::LaunchError;

/// Strips the executable's file name from the path the launcher was invoked as.
///
/// A bare file name (the launcher was found through `PATH`) has no directory
/// component, in which case the directory of the running executable is used.
pub fn derive(program: &Path) -> PathBuf {
    match program.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Changes the working directory to the install directory and returns it as an
/// absolute path.
///
/// The returned path is resolved before the change, never read back from the
/// process-wide working directory.
pub fn enter(program: &Path) -> Result<PathBuf, LaunchError> {
    let directory = derive(program);

    let directory =
        std::path::absolute(&directory).map_err(|source| LaunchError::InstallDirectory {
            path: directory.clone(),
            source,
        })?;

    std::env::set_current_dir(&directory).map_err(|source| LaunchError::InstallDirectory {
        path: directory.clone(),
        source,
    })?;

    tracing::info!("working directory: {}", directory.display());

    Ok(directory)
}
