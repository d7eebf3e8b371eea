use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::resolver::ResolvedPath;
use crate::video::progress::parse_progress_line;

/// Runs yt-dlp for a single URL, muxing best video and audio into an mp4.
pub struct VideoFetcher {
    yt_dlp: ResolvedPath,
    ffmpeg: ResolvedPath,
    output_dir: PathBuf,
}

impl VideoFetcher {
    pub fn new(yt_dlp: ResolvedPath, ffmpeg: ResolvedPath, output_dir: PathBuf) -> Self {
        Self { yt_dlp, ffmpeg, output_dir }
    }

    fn command(&self, url: &str) -> Result<Command> {
        let output_template = self.output_dir.join("%(title)s.%(ext)s");

        let mut cmd = Command::new(self.yt_dlp.program());
        cmd.arg("--format")
            .arg("bestvideo+bestaudio/best")
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("--output")
            .arg(&output_template)
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--progress")
            .arg("--newline");

        // Only the child sees the ffmpeg directory; our own environment stays untouched.
        if let Some(ffmpeg_dir) = self.ffmpeg.bin_dir() {
            cmd.arg("--ffmpeg-location").arg(ffmpeg_dir);
            cmd.env("PATH", path_with(ffmpeg_dir)?);
        }

        cmd.arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }

    /// Downloads `url` and returns the path of the final file.
    pub async fn download_video_from_url(&self, url: &str) -> Result<PathBuf> {
        log::info!("Starting download of {} into {:?}", url, self.output_dir);

        let mut child = self.command(url)?.spawn().map_err(|e| {
            log::error!("Failed to start yt-dlp ({}): {:?}", self.yt_dlp, e);
            anyhow::anyhow!("Failed to start yt-dlp ({}): {}", self.yt_dlp, e)
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("yt-dlp stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("yt-dlp stderr not captured"))?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;

        let mut last_percentage = -1i64;
        let mut saved_path: Option<PathBuf> = None;
        let mut last_error: Option<String> = None;

        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_reader.next_line(), if stdout_open => {
                    match line {
                        Ok(Some(line)) => {
                            log::trace!("yt-dlp stdout: {}", line);
                            let is_progress = report_progress(&line, &mut last_percentage);
                            if !is_progress && !line.trim().is_empty() {
                                saved_path = Some(PathBuf::from(line.trim()));
                            }
                        }
                        _ => stdout_open = false,
                    }
                }
                line = stderr_reader.next_line(), if stderr_open => {
                    match line {
                        Ok(Some(line)) => {
                            log::trace!("yt-dlp stderr: {}", line);
                            if !report_progress(&line, &mut last_percentage) {
                                if line.starts_with("ERROR:") {
                                    log::error!("{}", line);
                                    last_error = Some(line);
                                } else if line.starts_with("WARNING:") {
                                    log::warn!("{}", line);
                                }
                            }
                        }
                        _ => stderr_open = false,
                    }
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            let reason = last_error.unwrap_or_else(|| format!("exit status {}", status));
            return Err(anyhow::anyhow!("yt-dlp failed: {}", reason));
        }

        match saved_path {
            Some(path) if path.exists() => {
                log::info!("Download completed: {:?}", path);
                Ok(path)
            }
            Some(path) => Err(anyhow::anyhow!(
                "yt-dlp reported {:?} but the file does not exist",
                path
            )),
            None => Err(anyhow::anyhow!("Downloaded file not found")),
        }
    }
}

/// Logs a progress line when the whole percentage advances. Returns false for
/// lines that are not progress.
fn report_progress(line: &str, last_percentage: &mut i64) -> bool {
    let Some(progress) = parse_progress_line(line) else {
        return false;
    };
    let whole = progress.percent as i64;
    if whole > *last_percentage {
        *last_percentage = whole;
        match progress.total_bytes {
            Some(total) => {
                let megabytes = total as f64 / 1_048_576.0;
                log::info!("Downloading: {:.1}% ({:.1} MB)", progress.percent, megabytes)
            }
            None => log::info!("Downloading: {:.1}%", progress.percent),
        }
    }
    true
}

/// The current `PATH` with `dir` in front.
fn path_with(dir: &Path) -> Result<OsString> {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    Ok(std::env::join_paths(paths)?)
}
