use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use thiserror::Error;

use crate::env_detect::{Arch, Platform, Target};

/// Base name shared by every platform artifact.
pub const BINARY_BASE_NAME: &str = "agentic-ops";

const FALLBACK_DIR: &str = "bin";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),
    #[error("Binary not found: {artifact}")]
    ArtifactNotFound {
        artifact: String,
        searched: SearchPaths,
    },
    #[error("Could not determine launcher location: {0:#}")]
    LauncherLocation(anyhow::Error),
}

pub fn build_artifact_name(platform: Platform, arch: Arch) -> String {
    format!(
        "{BINARY_BASE_NAME}-{platform}-{arch}{}",
        platform.exe_suffix()
    )
}

/// Ordered candidate directories. The first one holding the artifact wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPaths {
    dirs: Vec<PathBuf>,
}

impl SearchPaths {
    /// The launcher's own directory, then the `bin` directory beside it.
    pub fn for_launcher_dir(launcher_dir: &Path) -> Self {
        let fallback = match launcher_dir.parent() {
            Some(parent) => parent.join(FALLBACK_DIR),
            None => launcher_dir.join("..").join(FALLBACK_DIR),
        };

        Self {
            dirs: vec![launcher_dir.to_path_buf(), fallback],
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl fmt::Display for SearchPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, dir) in self.dirs.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", dir.display())?;
        }
        Ok(())
    }
}

/// Directory holding the running launcher, with symlinks resolved.
///
/// Package managers usually link the entry point into a shared bin directory,
/// while the artifacts stay next to the real file.
pub fn launcher_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("reading path of running executable")?;
    let exe = std::fs::canonicalize(&exe)
        .with_context(|| format!("resolving symlinks of {}", exe.display()))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("executable path {} has no parent", exe.display()))
}

pub fn resolve(target: Target, search_paths: &SearchPaths) -> Result<PathBuf, ResolveError> {
    let artifact = build_artifact_name(target.platform, target.arch);

    for dir in search_paths.dirs() {
        let candidate = dir.join(&artifact);
        tracing::trace!(candidate = %candidate.display(), "checking for artifact");
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "resolved artifact");
            return Ok(candidate);
        }
    }

    Err(ResolveError::ArtifactNotFound {
        artifact,
        searched: search_paths.clone(),
    })
}
