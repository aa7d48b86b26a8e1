//! Path utilities for youdrop
//!
//! Respects XDG Base Directory Specification

use crate::error::Result;
use crate::types::OutputKind;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

const APP_NAME: &str = "youdrop";

/// Get config directory path
/// Respects XDG_CONFIG_HOME, defaults to ~/.config/youdrop
pub fn get_config_dir() -> String {
    let base = env::var("XDG_CONFIG_HOME")
        .unwrap_or_else(|_| {
            dirs::config_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| format!("{}/.config", env::var("HOME").unwrap_or_default()))
        });

    format!("{}/{}", base, APP_NAME)
}

/// Get config file path
pub fn get_config_path() -> String {
    format!("{}/config.json", get_config_dir())
}

/// Default download directory, ~/Downloads when the platform knows one
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Absolute save path for a download.
///
/// Without `requested` the file lands in `download_dir` under the default
/// name, as it does when `requested` names an existing directory. Relative
/// paths are resolved against `cwd`. A missing or other media extension is
/// replaced by the one `kind` produces; any other suffix is kept and the
/// extension appended (`talk.final` becomes `talk.final.mp4`).
pub fn resolve_destination(
    requested: Option<&Path>,
    download_dir: &Path,
    cwd: &Path,
    kind: OutputKind,
) -> PathBuf {
    let path = requested.unwrap_or(download_dir);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let path = if requested.is_none() || path.is_dir() {
        path.join(kind.default_file_name())
    } else {
        path
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(kind.extension()) => path,
        Some(ext) if !is_media_extension(ext) => {
            let mut name = path.clone().into_os_string();
            name.push(".");
            name.push(kind.extension());
            PathBuf::from(name)
        }
        _ => path.with_extension(kind.extension()),
    }
}

fn is_media_extension(ext: &str) -> bool {
    [OutputKind::Video, OutputKind::Audio]
        .iter()
        .any(|kind| ext.eq_ignore_ascii_case(kind.extension()))
}

/// Ensure a directory exists
pub async fn ensure_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Ensure all required app directories exist
pub async fn ensure_app_dirs() -> Result<()> {
    ensure_dir(&get_config_dir()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_defaults_to_download_dir() {
        let dest = resolve_destination(
            None,
            Path::new("/home/me/Downloads"),
            Path::new("/work"),
            OutputKind::Audio,
        );
        assert_eq!(dest, PathBuf::from("/home/me/Downloads/video.mp3"));
    }

    #[test]
    fn test_destination_relative_to_cwd() {
        let dest = resolve_destination(
            Some(Path::new("clips/talk.mp4")),
            Path::new("/home/me/Downloads"),
            Path::new("/work"),
            OutputKind::Video,
        );
        assert_eq!(dest, PathBuf::from("/work/clips/talk.mp4"));
    }

    #[test]
    fn test_destination_extension_forced() {
        let dest = resolve_destination(
            Some(Path::new("/music/song.mp4")),
            Path::new("/dl"),
            Path::new("/work"),
            OutputKind::Audio,
        );
        assert_eq!(dest, PathBuf::from("/music/song.mp3"));

        let dest = resolve_destination(
            Some(Path::new("/music/song")),
            Path::new("/dl"),
            Path::new("/work"),
            OutputKind::Audio,
        );
        assert_eq!(dest, PathBuf::from("/music/song.mp3"));
    }

    #[test]
    fn test_relative_download_dir_resolved() {
        let dest = resolve_destination(None, Path::new("dl"), Path::new("/work"), OutputKind::Video);
        assert_eq!(dest, PathBuf::from("/work/dl/video.mp4"));
    }

    #[test]
    fn test_destination_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = resolve_destination(
            Some(dir.path()),
            Path::new("/dl"),
            Path::new("/work"),
            OutputKind::Audio,
        );
        assert_eq!(dest, dir.path().join("video.mp3"));

        let cwd = tempfile::tempdir().unwrap();
        std::fs::create_dir(cwd.path().join("clips")).unwrap();
        let dest = resolve_destination(
            Some(Path::new("clips")),
            Path::new("/dl"),
            cwd.path(),
            OutputKind::Video,
        );
        assert_eq!(dest, cwd.path().join("clips").join("video.mp4"));
    }

    #[test]
    fn test_destination_keeps_other_suffix() {
        let dest = resolve_destination(
            Some(Path::new("/talks/talk.final")),
            Path::new("/dl"),
            Path::new("/work"),
            OutputKind::Video,
        );
        assert_eq!(dest, PathBuf::from("/talks/talk.final.mp4"));

        let dest = resolve_destination(
            Some(Path::new("/talks/talk.MP4")),
            Path::new("/dl"),
            Path::new("/work"),
            OutputKind::Video,
        );
        assert_eq!(dest, PathBuf::from("/talks/talk.MP4"));
    }
}
