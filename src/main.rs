use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use videograb::config::{self, AppConfig};
use videograb::resolver::tool_spec::ToolSpec;
use videograb::resolver::{
    CommandProbe, HostPlatform, HttpFetcher, Platform, ResolutionResult, Resolver, tools,
};
use videograb::video::VideoFetcher;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let code = match run(&mut input).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    };

    // A console window opened by double-clicking closes as soon as we exit.
    if let Err(e) = prompt(&mut input, "\nPress Enter to exit...").await {
        log::debug!("Could not wait for Enter: {}", e);
    }
    code
}

async fn run<R: AsyncBufRead + Unpin>(input: &mut Lines<R>) -> Result<()> {
    let host = HostPlatform::current();
    log::info!("Video downloader starting on {}...", host);

    match config::load_environment() {
        Ok(Some(path)) => log::info!("Loaded environment variables from {:?}", path),
        Ok(None) => log::debug!("No .env file found. Using system environment variables."),
        Err(e) => {
            log::error!("Failed to load environment: {}", e);
            return Err(e);
        }
    }
    let config = AppConfig::from_env()?;
    log::debug!("Configuration: {:?}", config);

    let url = prompt(input, "Enter the video URL: ").await?;
    if url.is_empty() {
        return Err(anyhow::anyhow!("No video URL given"));
    }

    let default_output = config.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let answer = prompt(
        input,
        &format!(
            "Enter the folder path to save the video or press Enter for {}: ",
            default_output.display()
        ),
    )
    .await?;
    let output_dir = if answer.is_empty() {
        default_output
    } else {
        PathBuf::from(strip_quotes(&answer))
    };

    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let resolver = Resolver::new(&config.base_dir, fetcher, CommandProbe)
        .with_probe_timeout(config.probe_timeout);
    log::info!("Tools directory: {:?}", config.base_dir);

    let ffmpeg = resolve_or_explain(&resolver, &tools::ffmpeg(), host.os).await?;
    let yt_dlp = resolve_or_explain(&resolver, &tools::yt_dlp(), host.os).await?;
    println!("FFmpeg: {}", ffmpeg.path);
    println!("yt-dlp: {}", yt_dlp.path);

    if !output_dir.exists() {
        println!("Creating directory: {}", output_dir.display());
    }
    tokio::fs::create_dir_all(&output_dir).await?;
    let output_dir = output_dir.canonicalize()?;
    println!("Downloading video from: {}", url);
    println!("Saving to: {}", output_dir.display());

    let video_fetcher = VideoFetcher::new(yt_dlp.path, ffmpeg.path, output_dir);
    let saved = video_fetcher.download_video_from_url(&url).await?;
    println!("Download complete! Video saved to: {}", saved.display());

    Ok(())
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Asks `question` and returns the trimmed answer; end of input reads as empty.
async fn prompt<R: AsyncBufRead + Unpin>(input: &mut Lines<R>, question: &str) -> Result<String> {
    print!("{}", question);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.unwrap_or_default().trim().to_string())
}

/// Paths pasted from a file manager often arrive wrapped in double quotes.
fn strip_quotes(answer: &str) -> &str {
    answer
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(answer)
}

async fn resolve_or_explain(
    resolver: &Resolver<HttpFetcher, CommandProbe>,
    spec: &ToolSpec,
    os: Platform,
) -> Result<ResolutionResult> {
    match resolver.resolve(spec).await {
        Ok(resolution) => Ok(resolution),
        Err(e) => {
            log::error!("{}: {:#}", e, e.source);
            eprintln!("\nPlease install {} manually:", spec.name);
            for line in manual_install_hint(&spec.name, os) {
                eprintln!("  {}", line);
            }
            Err(e.into())
        }
    }
}

fn manual_install_hint(tool: &str, os: Platform) -> Vec<String> {
    match (tool, os) {
        ("yt-dlp", Platform::Windows) => vec!["Run: winget install yt-dlp".to_string()],
        ("yt-dlp", Platform::MacOs) => vec!["Run: brew install yt-dlp".to_string()],
        ("yt-dlp", Platform::Linux) => vec!["Run: python3 -m pip install -U yt-dlp".to_string()],
        (_, Platform::MacOs) => vec![format!("Run: brew install {}", tool)],
        (_, Platform::Linux) => vec![
            format!("Run: sudo apt install {}  (Ubuntu/Debian)", tool),
            format!("Or:  sudo dnf install {}  (Fedora/RHEL)", tool),
        ],
        (_, Platform::Windows) => vec!["Visit: https://ffmpeg.org/download.html".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"C:\\Users\\me\\Videos\""), "C:\\Users\\me\\Videos");
        assert_eq!(strip_quotes("/home/me/Videos"), "/home/me/Videos");
        assert_eq!(strip_quotes("\"unbalanced"), "\"unbalanced");
    }

    #[tokio::test]
    async fn test_prompt_trims_answers_and_reads_eof_as_empty() {
        let answers = b"  https://example.com/v/1  \n\"D:\\Videos\"\n";
        let mut input = BufReader::new(&answers[..]).lines();

        assert_eq!(prompt(&mut input, "url? ").await.unwrap(), "https://example.com/v/1");
        assert_eq!(prompt(&mut input, "dir? ").await.unwrap(), "\"D:\\Videos\"");
        assert_eq!(prompt(&mut input, "\nPress Enter to exit...").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_url_is_an_error() {
        let mut input = BufReader::new(&b"\n"[..]).lines();

        let err = run(&mut input).await.unwrap_err();

        assert!(err.to_string().contains("No video URL"));
    }

    #[test]
    fn test_manual_install_hints() {
        let mac = manual_install_hint("ffmpeg", Platform::MacOs);
        assert_eq!(mac, vec!["Run: brew install ffmpeg"]);
        assert!(manual_install_hint("ffmpeg", Platform::Linux)[0].contains("apt install ffmpeg"));
        assert!(manual_install_hint("ffmpeg", Platform::Windows)[0].contains("ffmpeg.org"));
        assert!(manual_install_hint("yt-dlp", Platform::Linux)[0].contains("pip install"));
    }
}
