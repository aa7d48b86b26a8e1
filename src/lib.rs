//! youdrop library
//!
//! Drives the bundled yt-dlp for the youdrop CLI: builds its arguments,
//! streams its output as progress events and moves the finished file into
//! place.

pub mod core;
pub mod error;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;

pub use crate::core::{DownloadOrchestrator, Subscription};
pub use crate::error::{ErrorCode, Result, YouDropError};
pub use crate::types::{
    DownloadOutcome, DownloadRequest, OutputKind, ProgressEvent, SessionEvent, SessionState,
    VideoQuality,
};
