use std::path::PathBuf;

/// Every failure which stops the launcher before (or while) the child is started.
///
/// The `Display` output of each variant is the text shown to the user in the
/// modal error dialog.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Unable to parse command line: {reason}")]
    InvalidArguments { reason: String },
    #[error("Unable to obtain user profile.")]
    MissingProfile,
    #[error("Unable to locate to executable path {}", .path.display())]
    InstallDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to find {}", .path.display())]
    MissingConfiguration { path: PathBuf },
    #[error("{command_line}")]
    Spawn {
        command_line: String,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// The process exit status the launcher terminates with for this failure
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArguments { .. } | Self::MissingConfiguration { .. } => 10,
            Self::MissingProfile => 11,
            Self::InstallDirectory { .. } => 12,
            Self::Spawn { .. } => -1,
        }
    }

    pub const fn caption(&self) -> &'static str {
        match self {
            Self::InvalidArguments { .. } => "Error",
            Self::MissingProfile | Self::InstallDirectory { .. } => "Startup Error",
            Self::MissingConfiguration { .. } => "Missing or Damaged .ini File",
            Self::Spawn { .. } => "Unable to Launch",
        }
    }
}
