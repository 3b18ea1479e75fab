use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

/// The file which receives the child's combined stdout and stderr
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
}

impl LogSink {
    pub fn path_for(profile_dir: &Path, launcher_name: &str) -> PathBuf {
        profile_dir.join(format!("{launcher_name}.log"))
    }

    /// Truncates (or creates) `<profile_dir>/<launcher_name>.log`.
    ///
    /// Redirection is best-effort: when the file cannot be opened the child is
    /// started without it.
    pub fn open(profile_dir: &Path, launcher_name: &str) -> Option<Self> {
        let path = Self::path_for(profile_dir, launcher_name);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(windows)]
        {
            use std::os::windows::fs::OpenOptionsExt;
            use windows::Win32::Storage::FileSystem::FILE_SHARE_READ;
            use windows::Win32::Storage::FileSystem::FILE_SHARE_WRITE;

            options.share_mode((FILE_SHARE_READ | FILE_SHARE_WRITE).0);
        }

        match options.open(&path) {
            Ok(file) => {
                tracing::info!("redirecting child output to {}", path.display());
                Some(Self { path, file })
            }
            Err(error) => {
                tracing::warn!(
                    "could not open {}, child output will not be captured: {}",
                    path.display(),
                    error
                );
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn file(&self) -> &File {
        &self.file
    }
}
