use std::sync::LazyLock;

use regex::Regex;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").unwrap());

static DOWNLOAD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\[download\]\s+(\d+(?:\.\d+)?)%",
        r"(?:\s+of\s+~?\s*(\d+(?:\.\d+)?)\s*([KMGT]?i?B))?",
    ))
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub percent: f64,
    pub total_bytes: Option<u64>,
}

/// Parses a yt-dlp `[download]` progress line.
pub fn parse_progress_line(line: &str) -> Option<Progress> {
    let clean_line = remove_ansi_codes(line);
    let caps = DOWNLOAD_LINE.captures(clean_line.trim_start())?;
    let percent = caps[1].parse::<f64>().ok()?;
    let total_bytes = match (caps.get(2), caps.get(3)) {
        (Some(number), Some(unit)) => parse_size(number.as_str(), unit.as_str()),
        _ => None,
    };
    Some(Progress { percent, total_bytes })
}

fn remove_ansi_codes(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").to_string()
}

fn parse_size(number: &str, unit: &str) -> Option<u64> {
    let value = number.parse::<f64>().ok()?;
    let multiplier: f64 = match unit.to_ascii_lowercase().as_str() {
        "b" => 1.0,
        "kib" => 1024.0,
        "kb" => 1000.0,
        "mib" => 1024.0 * 1024.0,
        "mb" => 1000.0 * 1000.0,
        "gib" => 1024.0 * 1024.0 * 1024.0,
        "gb" => 1000.0 * 1000.0 * 1000.0,
        "tib" => 1024.0_f64.powi(4),
        "tb" => 1000.0_f64.powi(4),
        _ => return None,
    };
    Some((value * multiplier) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_with_size() {
        let line = "[download]  42.5% of 10.00MiB at  1.21MiB/s ETA 00:04";
        let progress = parse_progress_line(line).unwrap();
        assert_eq!(progress.percent, 42.5);
        assert_eq!(progress.total_bytes, Some(10 * 1024 * 1024));
    }

    #[test]
    fn test_parse_progress_with_estimated_size() {
        let progress = parse_progress_line("[download]   3.0% of ~  2.50GiB at 5.00MiB/s").unwrap();
        assert_eq!(progress.percent, 3.0);
        assert_eq!(progress.total_bytes, Some((2.5 * 1024.0 * 1024.0 * 1024.0) as u64));
    }

    #[test]
    fn test_parse_progress_strips_ansi_codes() {
        let line = "\x1b[0;94m[download]\x1b[0m 100% of 512.00KiB";
        let progress = parse_progress_line(line).unwrap();
        assert_eq!(progress.percent, 100.0);
        assert_eq!(progress.total_bytes, Some(512 * 1024));
    }

    #[test]
    fn test_non_progress_lines_are_ignored() {
        assert_eq!(parse_progress_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_progress_line("[download] Destination: /tmp/video.f137.mp4"), None);
        assert_eq!(parse_progress_line("50% of something else"), None);
    }
}
