//! Downloads a single video with yt-dlp, bootstrapping yt-dlp and ffmpeg
//! into a local tools directory when they are not already available.

pub mod config;
pub mod resolver;
pub mod video;
