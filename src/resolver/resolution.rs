use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    Absolute(PathBuf),
    /// Run the tool by bare name and let the search path find it.
    SystemPath(String),
}

impl ResolvedPath {
    /// What to hand to `Command::new`.
    pub fn program(&self) -> &OsStr {
        match self {
            ResolvedPath::Absolute(path) => path.as_os_str(),
            ResolvedPath::SystemPath(name) => OsStr::new(name),
        }
    }

    pub fn bin_dir(&self) -> Option<&Path> {
        match self {
            ResolvedPath::Absolute(path) => path.parent(),
            ResolvedPath::SystemPath(_) => None,
        }
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedPath::Absolute(path) => write!(f, "{}", path.display()),
            ResolvedPath::SystemPath(name) => write!(f, "{} (system search path)", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cached,
    System,
    Installed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub path: ResolvedPath,
    pub source: ResolutionSource,
}

impl ResolutionResult {
    pub fn cached(path: PathBuf) -> Self {
        Self { path: ResolvedPath::Absolute(path), source: ResolutionSource::Cached }
    }

    pub fn system(name: &str) -> Self {
        Self { path: ResolvedPath::SystemPath(name.to_string()), source: ResolutionSource::System }
    }

    pub fn installed(path: PathBuf) -> Self {
        Self { path: ResolvedPath::Absolute(path), source: ResolutionSource::Installed }
    }
}
