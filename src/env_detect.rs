use std::fmt;

use crate::resolver::ResolveError;

/// Operating system family an artifact is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Darwin,
    Linux,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
        }
    }

    /// Extension carried by executables on this platform.
    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Darwin | Platform::Linux => "",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub platform: Platform,
    pub arch: Arch,
}

/// Map a host operating system report to a canonical platform.
///
/// Both the Node spelling (`win32`) and the Rust spelling (`macos`) are accepted.
pub fn identify_platform(raw: &str) -> Result<Platform, ResolveError> {
    match raw {
        "win32" | "windows" => Ok(Platform::Windows),
        "darwin" | "macos" => Ok(Platform::Darwin),
        "linux" => Ok(Platform::Linux),
        other => Err(ResolveError::UnsupportedPlatform(other.to_string())),
    }
}

/// Map a host CPU architecture report to a canonical architecture.
pub fn identify_architecture(raw: &str) -> Result<Arch, ResolveError> {
    match raw {
        "x64" | "amd64" | "x86_64" => Ok(Arch::Amd64),
        "arm64" | "aarch64" => Ok(Arch::Arm64),
        other => Err(ResolveError::UnsupportedArchitecture(other.to_string())),
    }
}

/// Identify a target from raw reports. Platform is checked first, so an
/// unsupported platform is reported even when the architecture is also unknown.
pub fn identify_target(os: &str, arch: &str) -> Result<Target, ResolveError> {
    let platform = identify_platform(os)?;
    let arch = identify_architecture(arch)?;
    Ok(Target { platform, arch })
}

pub fn detect_target() -> Result<Target, ResolveError> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    tracing::debug!(os, arch, "detected host");
    identify_target(os, arch)
}
