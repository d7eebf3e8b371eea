use std::path::PathBuf;

use crate::resolver::platform::{Arch, HostPlatform, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarXz,
    TarGz,
    SevenZip,
    /// The download is the executable itself.
    Bare,
}

impl ArchiveKind {
    /// Extension used for the temporary download file.
    pub fn file_extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarXz => "tar.xz",
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::SevenZip => "7z",
            ArchiveKind::Bare => "download",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    pub archive: ArchiveKind,
}

impl Artifact {
    pub fn new(url: impl Into<String>, archive: ArchiveKind) -> Self {
        Self { url: url.into(), archive }
    }
}

/// Download for one platform, with optional per-architecture overrides.
#[derive(Debug, Clone)]
pub struct DownloadSource {
    default: Artifact,
    per_arch: Vec<(Arch, Artifact)>,
}

impl DownloadSource {
    pub fn new(default: Artifact) -> Self {
        Self { default, per_arch: Vec::new() }
    }

    pub fn with_arch(mut self, arch: Arch, artifact: Artifact) -> Self {
        self.per_arch.push((arch, artifact));
        self
    }

    pub fn select(&self, arch: Arch) -> &Artifact {
        self.per_arch
            .iter()
            .find(|(a, _)| *a == arch)
            .map(|(_, artifact)| artifact)
            .unwrap_or(&self.default)
    }
}

#[derive(Debug, Clone)]
pub struct PlatformSources {
    pub windows: DownloadSource,
    pub macos: DownloadSource,
    pub linux: DownloadSource,
}

impl PlatformSources {
    pub fn for_platform(&self, os: Platform) -> &DownloadSource {
        match os {
            Platform::Windows => &self.windows,
            Platform::MacOs => &self.macos,
            Platform::Linux => &self.linux,
        }
    }
}

/// One external binary and how to obtain it on every platform.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Logical name used in log lines and errors.
    pub name: String,
    /// File name without the platform suffix.
    pub binary_name: String,
    /// Binaries shipped in the same archive that get installed next to the main one.
    pub siblings: Vec<String>,
    /// Harmless flag used when probing the system search path.
    pub probe_arg: String,
    /// Install location relative to the resolver's base directory.
    pub relative_dir: PathBuf,
    pub sources: PlatformSources,
}

impl ToolSpec {
    pub fn artifact_for(&self, host: HostPlatform) -> &Artifact {
        self.sources.for_platform(host.os).select(host.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str) -> DownloadSource {
        DownloadSource::new(Artifact::new(url, ArchiveKind::Zip))
    }

    #[test]
    fn test_arch_override_wins_over_default() {
        let amd64 = Artifact::new("https://example.com/amd64.tar.xz", ArchiveKind::TarXz);
        let arm64 = Artifact::new("https://example.com/arm64.tar.xz", ArchiveKind::TarXz);
        let linux = DownloadSource::new(amd64).with_arch(Arch::Aarch64, arm64);

        assert_eq!(linux.select(Arch::Aarch64).url, "https://example.com/arm64.tar.xz");
        assert_eq!(linux.select(Arch::X86_64).url, "https://example.com/amd64.tar.xz");
        assert_eq!(linux.select(Arch::Other).url, "https://example.com/amd64.tar.xz");
    }

    #[test]
    fn test_platform_table_lookup() {
        let sources = PlatformSources {
            windows: source("https://example.com/win.zip"),
            macos: source("https://example.com/mac.zip"),
            linux: source("https://example.com/linux.zip"),
        };

        let url = |os: Platform, arch: Arch| sources.for_platform(os).select(arch).url.clone();
        assert_eq!(url(Platform::Windows, Arch::X86_64), "https://example.com/win.zip");
        assert_eq!(url(Platform::MacOs, Arch::Aarch64), "https://example.com/mac.zip");
        assert_eq!(url(Platform::Linux, Arch::X86_64), "https://example.com/linux.zip");
    }
}
