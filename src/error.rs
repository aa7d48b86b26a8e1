//! Error types for youdrop

use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds surfaced to callers alongside the human-readable detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Session errors
    ExecutableNotFound,
    LaunchError,
    SpawnError,
    NoOutputProduced,
    TempFileVanished,
    MoveError,

    // User errors
    InvalidRequest,
    InvalidConfig,

    // System errors
    FileError,
    ConfigParseError,
}

/// Main error type for youdrop
#[derive(Error, Debug)]
pub enum YouDropError {
    #[error("yt-dlp executable not found in packaged resources")]
    ExecutableNotFound,

    #[error("Failed to launch yt-dlp: {0}")]
    Launch(String),

    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    #[error("Download finished but no output file was produced")]
    NoOutputProduced,

    #[error("Temporary file disappeared before it could be moved: {}", .0.display())]
    TempFileVanished(PathBuf),

    #[error("Failed to move file to destination: {0}")]
    Move(String),

    #[error("Invalid download request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl YouDropError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ExecutableNotFound => ErrorCode::ExecutableNotFound,
            Self::Launch(_) => ErrorCode::LaunchError,
            Self::Spawn(_) => ErrorCode::SpawnError,
            Self::NoOutputProduced => ErrorCode::NoOutputProduced,
            Self::TempFileVanished(_) => ErrorCode::TempFileVanished,
            Self::Move(_) => ErrorCode::MoveError,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::File(_) => ErrorCode::FileError,
            Self::Json(_) => ErrorCode::ConfigParseError,
        }
    }
}

pub type Result<T> = std::result::Result<T, YouDropError>;
