use std::path::PathBuf;

use crate::resolver::platform::Arch;
use crate::resolver::tool_spec::{ArchiveKind, Artifact, DownloadSource, PlatformSources, ToolSpec};

pub fn ffmpeg() -> ToolSpec {
    ToolSpec {
        name: "ffmpeg".to_string(),
        binary_name: "ffmpeg".to_string(),
        siblings: vec!["ffprobe".to_string()],
        probe_arg: "-version".to_string(),
        relative_dir: PathBuf::from("ffmpeg").join("bin"),
        sources: PlatformSources {
            windows: DownloadSource::new(Artifact::new(
                "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip",
                ArchiveKind::Zip,
            )),
            // evermeet.cx ships universal builds, ffmpeg only
            macos: DownloadSource::new(Artifact::new(
                "https://evermeet.cx/ffmpeg/getrelease/zip",
                ArchiveKind::Zip,
            )),
            linux: DownloadSource::new(Artifact::new(
                "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-amd64-static.tar.xz",
                ArchiveKind::TarXz,
            ))
            .with_arch(
                Arch::Aarch64,
                Artifact::new(
                    "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-arm64-static.tar.xz",
                    ArchiveKind::TarXz,
                ),
            )
            .with_arch(
                Arch::X86,
                Artifact::new(
                    "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-i686-static.tar.xz",
                    ArchiveKind::TarXz,
                ),
            ),
        },
    }
}

pub fn yt_dlp() -> ToolSpec {
    let release = |asset: &str| {
        Artifact::new(
            format!("https://github.com/yt-dlp/yt-dlp/releases/latest/download/{}", asset),
            ArchiveKind::Bare,
        )
    };

    ToolSpec {
        name: "yt-dlp".to_string(),
        binary_name: "yt-dlp".to_string(),
        siblings: Vec::new(),
        probe_arg: "--version".to_string(),
        relative_dir: PathBuf::from("yt-dlp"),
        sources: PlatformSources {
            windows: DownloadSource::new(release("yt-dlp.exe"))
                .with_arch(Arch::X86, release("yt-dlp_x86.exe")),
            macos: DownloadSource::new(release("yt-dlp_macos")),
            linux: DownloadSource::new(release("yt-dlp_linux"))
                .with_arch(Arch::Aarch64, release("yt-dlp_linux_aarch64")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::platform::{HostPlatform, Platform};

    #[test]
    fn test_ffmpeg_routing() {
        let spec = ffmpeg();

        let windows = spec.artifact_for(HostPlatform::new(Platform::Windows, Arch::X86_64));
        assert_eq!(windows.archive, ArchiveKind::Zip);
        assert!(windows.url.contains("gyan.dev"));

        let mac = spec.artifact_for(HostPlatform::new(Platform::MacOs, Arch::Aarch64));
        assert_eq!(mac.archive, ArchiveKind::Zip);
        assert!(mac.url.contains("evermeet.cx"));

        let linux = spec.artifact_for(HostPlatform::new(Platform::Linux, Arch::X86_64));
        assert_eq!(linux.archive, ArchiveKind::TarXz);
        assert!(linux.url.ends_with("amd64-static.tar.xz"));

        let linux_arm = spec.artifact_for(HostPlatform::new(Platform::Linux, Arch::Aarch64));
        assert!(linux_arm.url.ends_with("arm64-static.tar.xz"));
    }

    #[test]
    fn test_yt_dlp_ships_bare_binaries() {
        let spec = yt_dlp();
        for os in [Platform::Windows, Platform::MacOs, Platform::Linux] {
            let artifact = spec.artifact_for(HostPlatform::new(os, Arch::X86_64));
            assert_eq!(artifact.archive, ArchiveKind::Bare);
        }
        assert!(spec
            .artifact_for(HostPlatform::new(Platform::Linux, Arch::Aarch64))
            .url
            .ends_with("yt-dlp_linux_aarch64"));
    }

    #[test]
    fn test_ffmpeg_installs_under_ffmpeg_bin() {
        assert_eq!(ffmpeg().relative_dir, PathBuf::from("ffmpeg").join("bin"));
        assert_eq!(ffmpeg().siblings, vec!["ffprobe".to_string()]);
    }
}
