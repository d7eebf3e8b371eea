use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

pub const BASE_DIR_VAR: &str = "VIDEOGRAB_BASE_DIR";
pub const OUTPUT_DIR_VAR: &str = "VIDEOGRAB_OUTPUT_DIR";
pub const PROBE_TIMEOUT_VAR: &str = "VIDEOGRAB_PROBE_TIMEOUT_SECS";
pub const FETCH_TIMEOUT_VAR: &str = "VIDEOGRAB_FETCH_TIMEOUT_SECS";

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 600;

/// Directories searched for a `.env` file: next to the executable first, so a
/// portable copy carries its settings, then the working directory.
fn dotenv_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe().ok().and_then(|exe| exe.parent().map(PathBuf::from));
    exe_dir.into_iter().chain(std::env::current_dir().ok()).collect()
}

pub fn find_dotenv() -> Option<PathBuf> {
    dotenv_dirs().into_iter().map(|dir| dir.join(".env")).find(|path| path.is_file())
}

/// Loads the first `.env` found into the process environment and returns its
/// path. Variables already set in the environment win over the file.
pub fn load_environment() -> Result<Option<PathBuf>> {
    let Some(path) = find_dotenv() else {
        return Ok(None);
    };
    dotenv::from_path(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {:?}: {}", path, e))?;
    Ok(Some(path))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Tools are installed below this directory.
    pub base_dir: PathBuf,
    /// Offered as the default answer when asking where to save the video.
    pub output_dir: Option<PathBuf>,
    pub probe_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from a key lookup; empty values count as unset.
    pub fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_dir = match get(BASE_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_base_dir(),
        };

        Ok(Self {
            base_dir,
            output_dir: get(OUTPUT_DIR_VAR).map(PathBuf::from),
            probe_timeout: parse_secs(
                PROBE_TIMEOUT_VAR,
                get(PROBE_TIMEOUT_VAR),
                DEFAULT_PROBE_TIMEOUT_SECS,
            )?,
            fetch_timeout: parse_secs(
                FETCH_TIMEOUT_VAR,
                get(FETCH_TIMEOUT_VAR),
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?,
        })
    }
}

/// Next to the executable, like a portable install; falls back to the user's
/// data directory, then the working directory.
fn default_base_dir() -> PathBuf {
    let exe_dir = std::env::current_exe().ok().and_then(|exe| exe.parent().map(PathBuf::from));
    if let Some(exe_dir) = exe_dir {
        return exe_dir;
    }
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("videograb");
    }
    PathBuf::from(".")
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration> {
    let secs = match value {
        Some(raw) => raw.parse::<u64>().map_err(|e| {
            anyhow::anyhow!("{} must be a whole number of seconds, got {:?}: {}", key, raw, e)
        })?,
        None => default,
    };
    if secs == 0 {
        return Err(anyhow::anyhow!("{} must be greater than zero", key));
    }
    Ok(Duration::from_secs(secs))
}
