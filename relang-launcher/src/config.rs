use std::path::Path;
use std::path::PathBuf;

use crate::LaunchError;

/// `lib/<launcher-name>.ini`, relative to the install directory
pub fn config_path(launcher_name: &str) -> PathBuf {
    Path::new("lib").join(format!("{launcher_name}.ini"))
}

/// Reads the base command line from the launcher's ini file.
///
/// The contents are taken verbatim. A missing file reads as empty, and empty
/// contents are fatal.
pub fn read_command(install_dir: &Path, launcher_name: &str) -> Result<String, LaunchError> {
    let relative = config_path(launcher_name);
    let path = install_dir.join(&relative);

    let command = match std::fs::read(&path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(error) => {
            tracing::warn!("could not read {}: {}", path.display(), error);
            String::new()
        }
    };

    if command.is_empty() {
        return Err(LaunchError::MissingConfiguration { path: relative });
    }

    tracing::info!("loaded command line from {}", path.display());

    Ok(command)
}
