//! Type definitions for youdrop
//!
//! Source of truth for all data structures.

use crate::error::{Result, YouDropError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================
// Request Types
// ============================================

/// What the downloader should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Merged video+audio, saved as mp4
    #[default]
    Video,
    /// Extracted audio, saved as mp3
    Audio,
}

impl OutputKind {
    /// File extension of the produced file, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    /// Name suggested for the saved file
    pub fn default_file_name(self) -> String {
        format!("video.{}", self.extension())
    }
}

/// Video quality, passed to yt-dlp as a format selector
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    #[default]
    Best,
    #[value(name = "720p")]
    #[serde(rename = "720p")]
    Upto720,
    #[value(name = "480p")]
    #[serde(rename = "480p")]
    Upto480,
    Worst,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 4] = [Self::Best, Self::Upto720, Self::Upto480, Self::Worst];

    /// yt-dlp `-f` selector
    pub fn format_selector(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::Upto720 => "best[height<=720]",
            Self::Upto480 => "best[height<=480]",
            Self::Worst => "worst",
        }
    }
}

/// One download, as submitted by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    source_url: String,
    output_kind: OutputKind,
    video_quality: VideoQuality,
    destination: PathBuf,
    overwrite: bool,
}

impl DownloadRequest {
    /// Validate and build a request.
    ///
    /// The URL must be non-empty and the destination absolute.
    pub fn new(
        source_url: &str,
        output_kind: OutputKind,
        video_quality: VideoQuality,
        destination: impl Into<PathBuf>,
    ) -> Result<Self> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(YouDropError::InvalidRequest("source URL is empty".into()));
        }

        let destination = destination.into();
        if !destination.is_absolute() {
            return Err(YouDropError::InvalidRequest(format!(
                "destination must be an absolute path: {}",
                destination.display()
            )));
        }

        Ok(Self {
            source_url: source_url.to_string(),
            output_kind,
            video_quality,
            destination,
            overwrite: false,
        })
    }

    /// Replace an existing destination, but only once a file was produced
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn output_kind(&self) -> OutputKind {
        self.output_kind
    }

    /// Only meaningful for [`OutputKind::Video`]
    pub fn video_quality(&self) -> VideoQuality {
        self.video_quality
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

// ============================================
// Session Types
// ============================================

/// Lifecycle of one download session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Resolving the executable, preparing the working dir, spawning
    Launching,
    /// Process running, output being consumed
    Streaming,
    /// Process exited, recovering the produced file
    Finalizing,
    Succeeded,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Emitted once per chunk of downloader output
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Chunk text with diagnostic lines removed
    pub text_delta: String,
    /// Latest known progress in [0, 1], `None` until a percentage was seen
    pub progress: Option<f64>,
}

/// Terminal result of a session
#[derive(Debug)]
pub enum DownloadOutcome {
    /// File saved at the destination
    Succeeded(PathBuf),
    Failed(YouDropError),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Everything a subscriber receives, in order
#[derive(Debug)]
pub enum SessionEvent {
    /// Log line produced by the orchestrator itself
    Notice(String),
    Progress(ProgressEvent),
    /// Always the last event
    Finished(DownloadOutcome),
}

// ============================================
// Selector Types
// ============================================

/// Item displayed in selector menu
#[derive(Debug, Clone)]
pub struct MenuItem<T> {
    /// Display text
    pub label: String,
    /// Underlying value
    pub value: T,
}

// ============================================
// Config Types
// ============================================

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output kind (video unless overridden)
    pub output_kind: OutputKind,
    /// Default video quality
    pub video_quality: VideoQuality,
    /// Where files are saved when no destination is given
    pub download_dir: String,
    /// Explicit yt-dlp path, skips resource lookup
    pub downloader_path: Option<String>,
    /// Fall back to PATH when yt-dlp is not bundled
    pub search_path: bool,
    /// Parent of per-session working directories (default: system temp dir)
    pub work_dir: Option<String>,
    /// Override for the progress percentage regex
    pub progress_pattern: Option<String>,
    /// Override for the diagnostic line regex
    pub diagnostic_pattern: Option<String>,
    /// Editor command (default: "nvim")
    pub editor: String,
    /// Open the file manager after a successful download
    pub reveal_after_download: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_kind: OutputKind::default(),
            video_quality: VideoQuality::default(),
            download_dir: String::new(), // Set at runtime to ~/Downloads
            downloader_path: None,
            search_path: true,
            work_dir: None,
            progress_pattern: None,
            diagnostic_pattern: None,
            editor: "nvim".into(),
            reveal_after_download: false,
        }
    }
}
