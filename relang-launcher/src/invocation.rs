use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use crate::LaunchError;

pub const DEFAULT_LAUNCHER_NAME: &str = "Relang";

/// The launcher's own command line, captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    passthrough: Vec<String>,
}

impl Invocation {
    /// `args[0]` is the path the launcher was invoked as, everything after it is
    /// forwarded to the child.
    pub fn parse<I>(args: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args = args.into_iter();

        let program = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| LaunchError::InvalidArguments {
                reason: String::from("the launcher path is missing"),
            })?;

        let passthrough = args
            .enumerate()
            .map(|(idx, arg)| {
                arg.into_string()
                    .map_err(|arg| LaunchError::InvalidArguments {
                        reason: format!(
                            "argument {} is not valid unicode: {}",
                            idx + 1,
                            arg.to_string_lossy()
                        ),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            program,
            passthrough,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    pub fn launcher_name(&self) -> String {
        launcher_name(&self.program)
    }
}

/// The file stem of the launcher executable, used to name the ini and log files
pub fn launcher_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_LAUNCHER_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn splits_program_from_passthrough() {
        let invocation =
            Invocation::parse(args(&["apps/Relang.exe", "hello world", "--flag"])).unwrap();

        assert_eq!(invocation.program(), Path::new("apps/Relang.exe"));
        assert_eq!(invocation.passthrough(), ["hello world", "--flag"]);
        assert_eq!(invocation.launcher_name(), "Relang");
    }

    #[test]
    fn no_passthrough_arguments() {
        let invocation = Invocation::parse(args(&["Relang.exe"])).unwrap();
        assert!(invocation.passthrough().is_empty());
    }

    #[test]
    fn missing_program_is_an_argument_error() {
        let error = Invocation::parse(Vec::new()).unwrap_err();
        assert!(matches!(error, LaunchError::InvalidArguments { .. }));
        assert_eq!(error.exit_code(), 10);
    }

    #[test]
    fn launcher_name_follows_the_executable() {
        assert_eq!(launcher_name(Path::new("/opt/relang/Relang.exe")), "Relang");
        assert_eq!(launcher_name(Path::new("dbrowser")), "dbrowser");
        assert_eq!(launcher_name(Path::new("")), DEFAULT_LAUNCHER_NAME);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_argument_is_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let invalid = vec![
            OsString::from("Relang"),
            OsString::from_vec(vec![0x66, 0x6f, 0xff]),
        ];

        let error = Invocation::parse(invalid).unwrap_err();
        assert!(matches!(error, LaunchError::InvalidArguments { .. }));
    }
}
