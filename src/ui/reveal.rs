//! "Show in file manager" for a saved download

use crate::error::{Result, YouDropError};
use std::path::Path;
use tokio::process::Command;

/// Program and arguments that reveal `path` on this platform
pub fn reveal_command(path: &Path) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("open", vec!["-R".into(), path.display().to_string()])
    } else if cfg!(windows) {
        ("explorer", vec![format!("/select,{}", path.display())])
    } else {
        // xdg-open cannot select a file, open its folder instead
        let dir = path.parent().unwrap_or(path);
        ("xdg-open", vec![dir.display().to_string()])
    }
}

/// Open the platform file manager at `path`
pub async fn reveal_in_file_manager(path: &Path) -> Result<()> {
    let (program, args) = reveal_command(path);
    Command::new(program)
        .args(&args)
        .spawn()
        .map_err(|e| YouDropError::Spawn(format!("Failed to start {}: {}", program, e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_opens_parent_folder() {
        let (program, args) = reveal_command(Path::new("/home/me/Downloads/video.mp4"));
        assert_eq!(program, "xdg-open");
        assert_eq!(args, ["/home/me/Downloads"]);
    }
}
