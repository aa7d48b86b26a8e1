//! Core download machinery: locating yt-dlp, running it, recovering its output

pub mod downloader;
pub mod locator;
pub mod output;
pub mod session;

pub use downloader::{DownloadOrchestrator, Subscription};
pub use locator::ExecutableLocator;
pub use output::OutputPatterns;
