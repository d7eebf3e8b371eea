use std::fmt;

/// Operating systems a tool can be installed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Anything that is neither Windows nor macOS is treated as Linux.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::MacOs | Platform::Linux => "",
        }
    }

    pub fn executable_name(self, name: &str) -> String {
        format!("{}{}", name, self.exe_suffix())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
    X86,
    Other,
}

impl Arch {
    pub fn current() -> Self {
        Self::from_target(std::env::consts::ARCH)
    }

    pub fn from_target(arch: &str) -> Self {
        match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            "x86" => Arch::X86,
            _ => Arch::Other,
        }
    }

    /// Substrings that mark an archive path as built for this architecture.
    /// Plain "x86" is left out since it is a prefix of "x86_64".
    pub fn path_tokens(self) -> &'static [&'static str] {
        match self {
            Arch::X86_64 => &["x86_64", "amd64", "x64", "win64"],
            Arch::Aarch64 => &["aarch64", "arm64"],
            Arch::X86 => &["i686", "i386", "win32"],
            Arch::Other => &[],
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
            Arch::X86 => "x86",
            Arch::Other => "unknown",
        };
        f.write_str(name)
    }
}

/// The OS and CPU pair used to pick a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPlatform {
    pub os: Platform,
    pub arch: Arch,
}

impl HostPlatform {
    pub fn new(os: Platform, arch: Arch) -> Self {
        Self { os, arch }
    }

    pub fn current() -> Self {
        Self::new(Platform::current(), Arch::current())
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.os, self.arch)
    }
}
