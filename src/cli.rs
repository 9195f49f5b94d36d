use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use crate::env_detect::detect_target;
use crate::executor::{ChildExit, dispatch};
use crate::resolver::{ResolveError, SearchPaths, launcher_dir, resolve};

/// Environment variable holding `tracing` filter directives for the launcher.
pub const LOG_ENV: &str = "AGENTIC_OPS_LAUNCHER_LOG";

pub const REINSTALL_HINT: &str = "Please reinstall the package: npm install -g agentic-ops";

/// Exit code for unsupported hosts and missing artifacts.
pub const RESOLVE_FAILURE: i32 = 1;
/// Exit code when the artifact was found but could not be started.
pub const LAUNCH_FAILURE: i32 = 126;

pub fn run() -> i32 {
    init_logging();

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    match locate_binary() {
        Ok(binary) => launch(&binary, &args),
        Err(err) => {
            for line in diagnostics(&err) {
                eprintln!("{line}");
            }
            RESOLVE_FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn locate_binary() -> Result<PathBuf, ResolveError> {
    let target = detect_target()?;
    let dir = launcher_dir().map_err(ResolveError::LauncherLocation)?;
    resolve(target, &SearchPaths::for_launcher_dir(&dir))
}

/// Run the resolved artifact and return the code the launcher should exit with.
pub fn launch<S: AsRef<OsStr>>(binary: &Path, args: &[S]) -> i32 {
    match dispatch(binary, args) {
        Ok(exit) => {
            if let ChildExit::Signal(signal) = exit {
                tracing::warn!(signal, "child terminated by signal, exiting with 0");
            }
            exit.exit_code()
        }
        Err(err) => {
            eprintln!("{err}");
            LAUNCH_FAILURE
        }
    }
}

/// Lines printed to stderr for a resolution failure.
pub fn diagnostics(err: &ResolveError) -> Vec<String> {
    match err {
        ResolveError::ArtifactNotFound { searched, .. } => vec![
            err.to_string(),
            format!("Looked in: {searched}"),
            REINSTALL_HINT.to_string(),
        ],
        ResolveError::LauncherLocation(_) => vec![err.to_string(), REINSTALL_HINT.to_string()],
        ResolveError::UnsupportedPlatform(_) | ResolveError::UnsupportedArchitecture(_) => {
            vec![err.to_string()]
        }
    }
}
