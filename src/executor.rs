use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// How the dispatched child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Code(i32),
    /// Terminated by a signal, no exit code available.
    Signal(i32),
    Unknown,
}

impl ChildExit {
    /// Exit code the launcher should finish with.
    ///
    /// Terminations without a numeric code collapse to 0. Callers that care
    /// about signals should match on the variant instead.
    pub fn exit_code(self) -> i32 {
        match self {
            ChildExit::Code(code) => code,
            ChildExit::Signal(_) | ChildExit::Unknown => 0,
        }
    }
}

impl From<ExitStatus> for ChildExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ChildExit::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ChildExit::Signal(signal);
            }
        }

        ChildExit::Unknown
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to execute binary: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Run `path` with `args` and wait for it to finish.
///
/// The child is created directly, never through a shell, and shares the
/// launcher's stdin, stdout and stderr.
pub fn dispatch<I, S>(path: &Path, args: I) -> Result<ChildExit, DispatchError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let status = Command::new(path)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| DispatchError::Launch {
            path: path.to_path_buf(),
            source,
        })?;

    let exit = ChildExit::from(status);
    tracing::debug!(?exit, "child terminated");
    Ok(exit)
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use super::{ChildExit, DispatchError, dispatch};

    const ETXTBSY: i32 = 26;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    // A freshly written script can briefly be held open by a fork in another
    // test thread.
    fn dispatch_retrying(path: &Path, args: &[&str]) -> Result<ChildExit, DispatchError> {
        let mut attempts = 0;
        loop {
            match dispatch(path, args) {
                Err(DispatchError::Launch { source, .. })
                    if source.raw_os_error() == Some(ETXTBSY) && attempts < 10 =>
                {
                    attempts += 1;
                    std::thread::sleep(Duration::from_millis(50));
                }
                other => return other,
            }
        }
    }

    #[test]
    fn forwards_arguments_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let out = dir.path().join("argv.txt");
        let script = write_script(
            dir.path(),
            "child",
            &format!("for a in \"$@\"; do printf '%s\\n' \"$a\"; done > '{}'", out.display()),
        );

        let exit = dispatch_retrying(&script, &["--flag", "value", "two words", "$HOME", "*"])
            .expect("child should launch");

        assert_eq!(exit, ChildExit::Code(0));
        let received = fs::read_to_string(&out).unwrap();
        assert_eq!(
            received.lines().collect::<Vec<_>>(),
            vec!["--flag", "value", "two words", "$HOME", "*"]
        );
    }

    #[test]
    fn propagates_exit_codes() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let ok = write_script(dir.path(), "ok", "exit 0");
        let three = write_script(dir.path(), "three", "exit 3");

        assert_eq!(dispatch_retrying(&ok, &[]).unwrap().exit_code(), 0);
        assert_eq!(dispatch_retrying(&three, &[]).unwrap(), ChildExit::Code(3));
        assert_eq!(dispatch_retrying(&three, &[]).unwrap().exit_code(), 3);
    }

    #[test]
    fn signal_termination_is_distinct_but_exits_zero() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let killed = write_script(dir.path(), "killed", "kill -9 $$");

        let exit = dispatch_retrying(&killed, &[]).unwrap();
        assert_eq!(exit, ChildExit::Signal(9));
        assert_eq!(exit.exit_code(), 0);
    }

    #[test]
    fn non_executable_file_is_a_launch_failure() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("plain");
        fs::write(&path, "not a program").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let err = dispatch_retrying(&path, &[]).expect_err("file is not executable");
        let DispatchError::Launch { path: failed, source } = &err;
        assert_eq!(failed, &path);
        assert!(err.to_string().starts_with("Failed to execute binary: "));
        assert!(err.to_string().contains(&source.to_string()));
    }

    #[test]
    fn missing_file_is_a_launch_failure() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let err = dispatch(&dir.path().join("vanished"), ["x"]).expect_err("file is gone");
        assert!(matches!(err, DispatchError::Launch { .. }));
    }
}
