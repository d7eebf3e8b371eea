use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The archive could not be fetched.
    NetworkFailure,
    /// The archive could not be opened, or the binary is not in it.
    ExtractionFailure,
    /// Directory creation, copy or permission change failed.
    FilesystemFailure,
    /// Installation finished but the binary is still missing.
    VerificationFailure,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::NetworkFailure => "network failure",
            FailureReason::ExtractionFailure => "extraction failure",
            FailureReason::FilesystemFailure => "filesystem failure",
            FailureReason::VerificationFailure => "verification failure",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
#[error("failed to install {tool}: {reason}")]
pub struct InstallationError {
    pub tool: String,
    pub reason: FailureReason,
    #[source]
    pub source: anyhow::Error,
}

impl InstallationError {
    pub fn new(tool: &str, reason: FailureReason, source: impl Into<anyhow::Error>) -> Self {
        Self {
            tool: tool.to_string(),
            reason,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_tool_and_reason() {
        let cause = anyhow::anyhow!("HTTP status 404");
        let err = InstallationError::new("ffmpeg", FailureReason::NetworkFailure, cause);
        assert_eq!(err.to_string(), "failed to install ffmpeg: network failure");

        let chained = format!("{:#}", anyhow::Error::from(err));
        assert!(chained.contains("HTTP status 404"));
    }
}
