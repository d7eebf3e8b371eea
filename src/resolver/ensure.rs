use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio::fs;

use crate::resolver::downloader::ArchiveFetcher;
use crate::resolver::error::{FailureReason, InstallationError};
use crate::resolver::extract::{self, Located};
use crate::resolver::platform::HostPlatform;
use crate::resolver::probe::{ProbeOutcome, SystemProbe};
use crate::resolver::resolution::ResolutionResult;
use crate::resolver::tool_spec::ToolSpec;
use crate::resolver::utils::install_file;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Finds a usable copy of an external tool, installing it under `base_dir` when needed.
///
/// A file already present at the expected install path is trusted as is; it
/// is never re-validated, so a changed download URL does not trigger a new
/// fetch while the old binary is in place. Two resolutions of the same tool
/// running at once may race on the install directory; callers serialize.
pub struct Resolver<F, P> {
    base_dir: PathBuf,
    host: HostPlatform,
    fetcher: F,
    probe: P,
    probe_timeout: Duration,
    staging_root: Option<PathBuf>,
}

impl<F: ArchiveFetcher, P: SystemProbe> Resolver<F, P> {
    pub fn new(base_dir: impl Into<PathBuf>, fetcher: F, probe: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            host: HostPlatform::current(),
            fetcher,
            probe,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            staging_root: None,
        }
    }

    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Where downloads are staged; the system temp directory by default.
    pub fn with_staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(dir.into());
        self
    }

    pub fn install_dir(&self, spec: &ToolSpec) -> PathBuf {
        self.base_dir.join(&spec.relative_dir)
    }

    pub fn expected_path(&self, spec: &ToolSpec) -> PathBuf {
        self.install_dir(spec).join(self.host.os.executable_name(&spec.binary_name))
    }

    pub async fn resolve(&self, spec: &ToolSpec) -> Result<ResolutionResult, InstallationError> {
        let expected = self.expected_path(spec);
        if expected.exists() {
            log::info!("Using {} from {:?}", spec.name, expected);
            return Ok(ResolutionResult::cached(expected));
        }

        match self.probe.probe(&spec.binary_name, &spec.probe_arg, self.probe_timeout).await {
            ProbeOutcome::Available => {
                log::info!("Using system {}", spec.name);
                return Ok(ResolutionResult::system(&spec.binary_name));
            }
            ProbeOutcome::TimedOut => {
                log::warn!(
                    "System {} did not answer within {:?}, ignoring it",
                    spec.name,
                    self.probe_timeout
                );
            }
            ProbeOutcome::Failed(code) => {
                log::warn!("System {} exited with status {:?}, ignoring it", spec.name, code);
            }
            ProbeOutcome::SpawnFailed => {
                log::debug!("{} is not on the search path", spec.name);
            }
        }

        log::info!("{} not found, installing it for {}...", spec.name, self.host);
        self.install(spec).await?;

        if expected.exists() {
            log::info!("Installed {} at {:?}", spec.name, expected);
            Ok(ResolutionResult::installed(expected))
        } else {
            log::error!("{} is still missing at {:?} after installation", spec.name, expected);
            Err(InstallationError::new(
                &spec.name,
                FailureReason::VerificationFailure,
                anyhow::anyhow!("{:?} does not exist after installation", expected),
            ))
        }
    }

    async fn install(&self, spec: &ToolSpec) -> Result<(), InstallationError> {
        let tool = spec.name.as_str();
        let fs_failure =
            |e: std::io::Error| InstallationError::new(tool, FailureReason::FilesystemFailure, e);

        let install_dir = self.install_dir(spec);
        fs::create_dir_all(&install_dir).await.map_err(fs_failure)?;

        let artifact = spec.artifact_for(self.host);
        // Dropping the guard removes the archive and everything extracted from it.
        let staging = self.staging_dir().map_err(fs_failure)?;
        let archive_path = staging
            .path()
            .join(format!("{}.{}", spec.binary_name, artifact.archive.file_extension()));

        self.fetcher
            .fetch(&artifact.url, &archive_path)
            .await
            .map_err(|e| InstallationError::new(tool, FailureReason::NetworkFailure, e))?;

        let located = self.extract(spec, &archive_path, &staging.path().join("extracted")).await?;

        let os = self.host.os;
        let binary_name = os.executable_name(&spec.binary_name);
        let copied = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            // The main binary goes last: its presence marks a finished install.
            // Sibling names already carry the platform suffix.
            for (name, path) in &located.siblings {
                let dest = install_file(path, &install_dir, name)?;
                log::info!("Installed {} to {:?}", name, dest);
            }
            install_file(&located.binary, &install_dir, &binary_name)?;
            Ok(())
        })
        .await
        .map_err(|e| InstallationError::new(tool, FailureReason::FilesystemFailure, e))?;
        copied.map_err(fs_failure)?;

        if let Err(e) = staging.close() {
            log::warn!("Failed to remove staging directory: {}", e);
        }
        Ok(())
    }

    async fn extract(
        &self,
        spec: &ToolSpec,
        archive: &Path,
        dest: &Path,
    ) -> Result<Located, InstallationError> {
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        let kind = spec.artifact_for(self.host).archive;
        let arch = self.host.arch;
        let binary = self.host.os.executable_name(&spec.binary_name);
        let siblings: Vec<String> =
            spec.siblings.iter().map(|s| self.host.os.executable_name(s)).collect();

        let located = tokio::task::spawn_blocking(move || -> anyhow::Result<Located> {
            extract::unpack(&archive, kind, &dest, &binary)?;
            extract::locate(&dest, &binary, &siblings, arch)
        })
        .await
        .map_err(|e| InstallationError::new(&spec.name, FailureReason::ExtractionFailure, e))?;

        located.map_err(|e| {
            log::error!("Failed to extract {}: {:#}", spec.name, e);
            InstallationError::new(&spec.name, FailureReason::ExtractionFailure, e)
        })
    }

    fn staging_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".videograb-staging-");
        match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }
}
