//! Locating the bundled yt-dlp binary

use crate::error::{Result, YouDropError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the downloader on this platform
pub const EXECUTABLE_NAME: &str = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };

/// Where to look for the downloader, in order
#[derive(Debug, Clone)]
pub struct ExecutableLocator {
    /// Explicit path, when set nothing else is searched
    explicit: Option<PathBuf>,
    /// Packaged resource directories
    resource_dirs: Vec<PathBuf>,
    /// Fall back to a PATH lookup
    search_path: bool,
}

impl ExecutableLocator {
    /// Resources next to the running executable, then PATH
    pub fn bundled() -> Self {
        let resource_dirs = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .map(|dir| vec![dir.join("resources"), dir])
            .unwrap_or_default();

        Self {
            explicit: None,
            resource_dirs,
            search_path: true,
        }
    }

    /// Only ever use `path`
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
            resource_dirs: Vec::new(),
            search_path: false,
        }
    }

    /// Search the given resource directories only
    pub fn in_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            explicit: None,
            resource_dirs: dirs,
            search_path: false,
        }
    }

    pub fn with_path_search(mut self, enabled: bool) -> Self {
        self.search_path = enabled;
        self
    }

    /// Resolve the downloader binary
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.explicit {
            return if path.is_file() {
                Ok(path.clone())
            } else {
                debug!(path = %path.display(), "configured downloader missing");
                Err(YouDropError::ExecutableNotFound)
            };
        }

        let bundled = self
            .resource_dirs
            .iter()
            .map(|dir| dir.join(EXECUTABLE_NAME))
            .find(|candidate| candidate.is_file());
        if let Some(path) = bundled {
            return Ok(path);
        }

        if self.search_path
            && let Ok(path) = which::which(EXECUTABLE_NAME)
        {
            debug!(path = %path.display(), "using downloader from PATH");
            return Ok(path);
        }

        Err(YouDropError::ExecutableNotFound)
    }
}

impl Default for ExecutableLocator {
    fn default() -> Self {
        Self::bundled()
    }
}
