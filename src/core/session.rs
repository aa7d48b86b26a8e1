//! State of one in-flight download

use crate::core::output::OutputPatterns;
use crate::error::{Result, YouDropError};
use crate::types::{OutputKind, ProgressEvent, SessionState};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;
use tokio::fs;
use tracing::{debug, warn};

/// Transient state owned by a single `run`.
///
/// The working directory is removed when the session is dropped.
pub struct DownloadSession {
    working_dir: TempDir,
    log: String,
    progress: Option<f64>,
    state: SessionState,
}

impl DownloadSession {
    /// Create a session with a fresh, uniquely named working directory
    pub fn create(work_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(work_root).map_err(|e| {
            YouDropError::Launch(format!(
                "cannot create work directory {}: {}",
                work_root.display(),
                e
            ))
        })?;

        let working_dir = tempfile::Builder::new()
            .prefix("youdrop-")
            .tempdir_in(work_root)
            .map_err(|e| YouDropError::Launch(format!("cannot create working directory: {}", e)))?;

        Ok(Self {
            working_dir,
            log: String::new(),
            progress: None,
            state: SessionState::Idle,
        })
    }

    pub fn working_dir(&self) -> &Path {
        self.working_dir.path()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn progress(&self) -> Option<f64> {
        self.progress
    }

    /// Move forward in the lifecycle; terminal states are final
    pub fn transition(&mut self, next: SessionState) {
        if self.state.is_terminal() {
            warn!(from = ?self.state, to = ?next, "ignoring transition out of terminal state");
            return;
        }
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// Append an orchestrator notice to the log
    pub fn note(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Clean a chunk of output, record it and update progress
    pub fn ingest(&mut self, chunk: &str, patterns: &OutputPatterns) -> ProgressEvent {
        let cleaned = patterns.clean(chunk).into_owned();
        self.log.push_str(&cleaned);

        if let Some(fraction) = patterns.scan_progress(&cleaned) {
            self.progress = Some(fraction);
        }

        ProgressEvent {
            text_delta: cleaned,
            progress: self.progress,
        }
    }

    /// Pick the produced file and move it to `destination`.
    ///
    /// An existing destination is only replaced when `overwrite` is set, and
    /// only once an output file was found.
    pub async fn finalize(
        &self,
        kind: OutputKind,
        destination: &Path,
        overwrite: bool,
    ) -> Result<PathBuf> {
        let produced = select_output(self.working_dir(), kind)
            .await?
            .ok_or(YouDropError::NoOutputProduced)?;
        debug!(file = %produced.display(), "selected output file");

        move_selected(produced, destination, overwrite).await?;
        Ok(destination.to_path_buf())
    }
}

/// Newest regular file in `dir` with the extension of `kind`.
///
/// Ties on modification time go to the lexicographically smallest name.
pub async fn select_output(dir: &Path, kind: OutputKind) -> Result<Option<PathBuf>> {
    let suffix = format!(".{}", kind.extension());
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| YouDropError::Move(format!("cannot list {}: {}", dir.display(), e)))?;

    let mut best: Option<(SystemTime, String)> = None;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(&suffix) {
            continue;
        }

        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let newer = match best {
            None => true,
            Some((ref t, ref n)) => modified > *t || (modified == *t && name < *n),
        };
        if newer {
            best = Some((modified, name));
        }
    }

    Ok(best.map(|(_, name)| dir.join(name)))
}

/// Move the selected output to `destination`, checking it is still there
pub async fn move_selected(produced: PathBuf, destination: &Path, overwrite: bool) -> Result<()> {
    if !fs::try_exists(&produced).await.unwrap_or(false) {
        return Err(YouDropError::TempFileVanished(produced));
    }
    relocate(&produced, destination, overwrite).await
}

/// Move `from` to `to`; an existing `to` is replaced only with `overwrite`
async fn relocate(from: &Path, to: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && fs::try_exists(to).await.unwrap_or(false) {
        return Err(YouDropError::Move(format!(
            "destination already exists: {}",
            to.display()
        )));
    }

    // rename replaces an existing file atomically
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("rename crosses devices, copying instead");
            copy_then_remove(from, to).await
        }
        Err(e) => Err(YouDropError::Move(e.to_string())),
    }
}

async fn copy_then_remove(from: &Path, to: &Path) -> Result<()> {
    if let Err(e) = fs::copy(from, to).await {
        let _ = fs::remove_file(to).await;
        return Err(YouDropError::Move(e.to_string()));
    }
    fs::remove_file(from)
        .await
        .map_err(|e| YouDropError::Move(format!("copied but could not remove source: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, age: Duration) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_select_newest() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.mp4"), Duration::from_secs(60));
        touch(&dir.path().join("b.mp4"), Duration::from_secs(1));

        let picked = select_output(dir.path(), OutputKind::Video).await.unwrap();
        assert_eq!(picked, Some(dir.path().join("b.mp4")));
    }

    #[tokio::test]
    async fn test_select_ignores_other_kind() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("song.mp3"), Duration::from_secs(0));
        touch(&dir.path().join("clip.mp4.part"), Duration::from_secs(0));

        let picked = select_output(dir.path(), OutputKind::Video).await.unwrap();
        assert_eq!(picked, None);
        let picked = select_output(dir.path(), OutputKind::Audio).await.unwrap();
        assert_eq!(picked, Some(dir.path().join("song.mp3")));
    }

    #[tokio::test]
    async fn test_select_tie_breaks_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let stamp = SystemTime::now() - Duration::from_secs(10);
        for name in ["z.mp3", "m.mp3", "q.mp3"] {
            File::create(dir.path().join(name)).unwrap().set_modified(stamp).unwrap();
        }

        let picked = select_output(dir.path(), OutputKind::Audio).await.unwrap();
        assert_eq!(picked, Some(dir.path().join("m.mp3")));
    }

    #[tokio::test]
    async fn test_select_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let picked = select_output(dir.path(), OutputKind::Video).await.unwrap();
        assert_eq!(picked, None);
    }

    #[test]
    fn test_ingest_keeps_progress_without_match() {
        let root = tempfile::tempdir().unwrap();
        let mut session = DownloadSession::create(root.path()).unwrap();
        let patterns = OutputPatterns::default();

        let first = session.ingest("[download]  42.5% of 10MiB\n", &patterns);
        assert_eq!(first.progress, Some(0.425));

        let second = session.ingest("[Merger] Merging formats\n", &patterns);
        assert_eq!(second.progress, Some(0.425));
        assert_eq!(second.text_delta, "[Merger] Merging formats\n");
        assert_eq!(
            session.log(),
            "[download]  42.5% of 10MiB\n[Merger] Merging formats\n"
        );
    }

    #[test]
    fn test_ingest_filters_before_scanning() {
        let root = tempfile::tempdir().unwrap();
        let mut session = DownloadSession::create(root.path()).unwrap();
        let patterns = OutputPatterns::default();

        let event = session.ingest("[PYI-77:DEBUG] 99%\n", &patterns);
        assert_eq!(event.text_delta, "");
        assert_eq!(event.progress, None);
    }

    #[test]
    fn test_terminal_state_is_final() {
        let root = tempfile::tempdir().unwrap();
        let mut session = DownloadSession::create(root.path()).unwrap();
        session.transition(SessionState::Launching);
        session.transition(SessionState::Failed);
        session.transition(SessionState::Streaming);
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn test_working_dir_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let session = DownloadSession::create(root.path()).unwrap();
        let dir = session.working_dir().to_path_buf();
        assert!(dir.is_dir());
        drop(session);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_finalize_moves_file() {
        let root = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let session = DownloadSession::create(root.path()).unwrap();
        let produced = session.working_dir().join("Some Title.mp3");
        std::fs::write(&produced, b"ID3").unwrap();

        let dest = dest_dir.path().join("video.mp3");
        let saved = session.finalize(OutputKind::Audio, &dest, false).await.unwrap();

        assert_eq!(saved, dest);
        assert!(!produced.exists());
        assert_eq!(std::fs::read(&dest).unwrap(), b"ID3");
    }

    #[tokio::test]
    async fn test_finalize_refuses_existing_destination() {
        let root = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let session = DownloadSession::create(root.path()).unwrap();
        std::fs::write(session.working_dir().join("x.mp4"), b"new").unwrap();
        let dest = dest_dir.path().join("video.mp4");
        std::fs::write(&dest, b"old").unwrap();

        let err = session.finalize(OutputKind::Video, &dest, false).await.unwrap_err();
        assert!(matches!(err, YouDropError::Move(_)));
        assert_eq!(std::fs::read(&dest).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_finalize_without_output() {
        let root = tempfile::tempdir().unwrap();
        let session = DownloadSession::create(root.path()).unwrap();
        let err = session
            .finalize(OutputKind::Video, Path::new("/nonexistent/video.mp4"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, YouDropError::NoOutputProduced));
    }

    #[tokio::test]
    async fn test_finalize_overwrite_replaces_destination() {
        let root = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let session = DownloadSession::create(root.path()).unwrap();
        std::fs::write(session.working_dir().join("x.mp4"), b"new").unwrap();
        let dest = dest_dir.path().join("video.mp4");
        std::fs::write(&dest, b"old").unwrap();

        session.finalize(OutputKind::Video, &dest, true).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_finalize_without_output_keeps_destination() {
        let root = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let session = DownloadSession::create(root.path()).unwrap();
        let dest = dest_dir.path().join("video.mp4");
        std::fs::write(&dest, b"precious").unwrap();

        let err = session.finalize(OutputKind::Video, &dest, true).await.unwrap_err();
        assert!(matches!(err, YouDropError::NoOutputProduced));
        assert_eq!(std::fs::read(&dest).unwrap(), b"precious");
    }

    #[tokio::test]
    async fn test_move_selected_reports_vanished_file() {
        let root = tempfile::tempdir().unwrap();
        let produced = root.path().join("Gone.mp4");
        std::fs::write(&produced, b"x").unwrap();
        std::fs::remove_file(&produced).unwrap();
        let dest = root.path().join("video.mp4");

        let err = move_selected(produced.clone(), &dest, false).await.unwrap_err();
        match err {
            YouDropError::TempFileVanished(path) => assert_eq!(path, produced),
            other => panic!("expected TempFileVanished, got {other:?}"),
        }
        assert!(!dest.exists());
    }
}
