pub mod fetcher;
pub mod progress;

pub use fetcher::VideoFetcher;
