pub mod downloader;
pub mod ensure;
pub mod error;
pub mod extract;
pub mod platform;
pub mod probe;
pub mod resolution;
pub mod tool_spec;
pub mod tools;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use downloader::HttpFetcher;
pub use ensure::Resolver;
pub use error::InstallationError;
pub use platform::{HostPlatform, Platform};
pub use probe::CommandProbe;
pub use resolution::{ResolutionResult, ResolvedPath};
