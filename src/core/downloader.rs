//! Downloader module - yt-dlp integration
//!
//! [`DownloadOrchestrator`] drives one yt-dlp process per request: it builds
//! the argument list, streams the merged stdout/stderr back to the caller as
//! [`SessionEvent`]s and, once the process is gone, moves the produced file
//! to the requested destination.
//!
//! Success is decided by the presence of an output file, never by the exit
//! code. There are no retries, no timeouts and no cancellation; a hung
//! downloader hangs its session.

use crate::core::locator::ExecutableLocator;
use crate::core::output::{ChunkDecoder, OutputPatterns};
use crate::core::session::DownloadSession;
use crate::error::{Result, YouDropError};
use crate::types::{
    Config, DownloadOutcome, DownloadRequest, OutputKind, SessionEvent, SessionState,
};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Runs downloads against the bundled yt-dlp
#[derive(Debug, Clone)]
pub struct DownloadOrchestrator {
    locator: ExecutableLocator,
    patterns: OutputPatterns,
    work_root: PathBuf,
}

impl DownloadOrchestrator {
    pub fn new() -> Self {
        Self {
            locator: ExecutableLocator::bundled(),
            patterns: OutputPatterns::default(),
            work_root: std::env::temp_dir(),
        }
    }

    /// Build from user configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let locator = match config.downloader_path.as_deref() {
            Some(path) if !path.is_empty() => ExecutableLocator::explicit(path),
            _ => ExecutableLocator::bundled().with_path_search(config.search_path),
        };

        let patterns = OutputPatterns::new(
            config.diagnostic_pattern.as_deref(),
            config.progress_pattern.as_deref(),
        )?;

        let work_root = config
            .work_dir
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            locator,
            patterns,
            work_root,
        })
    }

    pub fn with_locator(mut self, locator: ExecutableLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_patterns(mut self, patterns: OutputPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Directory under which each session creates its own working dir
    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = work_root.into();
        self
    }

    /// Resolve the yt-dlp binary
    pub fn locate_executable(&self) -> Result<PathBuf> {
        self.locator.locate()
    }

    /// yt-dlp arguments for `request`, writing into `working_dir`
    pub fn build_arguments(request: &DownloadRequest, working_dir: &Path) -> Vec<String> {
        // yt-dlp fills in title and extension itself
        let output_template = working_dir.join("%(title)s.%(ext)s");

        let mut args = vec![
            request.source_url().to_string(),
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
        ];

        match request.output_kind() {
            OutputKind::Video => args.extend([
                "-f".to_string(),
                request.video_quality().format_selector().to_string(),
                "--merge-output-format".to_string(),
                "mp4".to_string(),
            ]),
            OutputKind::Audio => args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                "mp3".to_string(),
            ]),
        }

        args
    }

    /// Run one download to completion.
    ///
    /// `on_event` receives notices and one [`SessionEvent::Progress`] per
    /// output chunk, in order. The terminal outcome is returned rather than
    /// passed to `on_event`.
    pub async fn run<F>(&self, request: &DownloadRequest, mut on_event: F) -> DownloadOutcome
    where
        F: FnMut(SessionEvent),
    {
        info!(url = request.source_url(), kind = ?request.output_kind(), "starting download");

        let mut session = match DownloadSession::create(&self.work_root) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "download failed before launch");
                return DownloadOutcome::Failed(e);
            }
        };

        match self.drive(&mut session, request, &mut on_event).await {
            Ok(saved) => {
                session.transition(SessionState::Succeeded);
                info!(path = %saved.display(), "download saved");
                DownloadOutcome::Succeeded(saved)
            }
            Err(e) => {
                session.transition(SessionState::Failed);
                warn!(error = %e, code = ?e.code(), "download failed");
                DownloadOutcome::Failed(e)
            }
        }
    }

    /// Start a download in the background and subscribe to its events
    pub fn submit(&self, request: DownloadRequest) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = self.clone();

        let task = tokio::spawn(async move {
            let events = tx.clone();
            let outcome = orchestrator
                .run(&request, move |event| {
                    let _ = events.send(event);
                })
                .await;
            let _ = tx.send(SessionEvent::Finished(outcome));
        });

        Subscription { events: rx, task }
    }

    async fn drive<F>(
        &self,
        session: &mut DownloadSession,
        request: &DownloadRequest,
        on_event: &mut F,
    ) -> Result<PathBuf>
    where
        F: FnMut(SessionEvent),
    {
        session.transition(SessionState::Launching);

        let executable = self.locate_executable()?;
        notify(session, on_event, format!("✅ yt-dlp found at {}", executable.display()));

        let args = Self::build_arguments(request, session.working_dir());
        notify(
            session,
            on_event,
            format!("👉 command: {} {}", executable.display(), args.join(" ")),
        );
        debug!(?args, "spawning yt-dlp");

        let mut child = Command::new(&executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| YouDropError::Spawn(format!("Failed to start yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| YouDropError::Launch("stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| YouDropError::Launch("stderr was not captured".into()))?;

        session.transition(SessionState::Streaming);

        // Both pipes feed one channel, so chunks come out in arrival order
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(stdout, tx.clone()));
        tokio::spawn(pump(stderr, tx));

        while let Some(chunk) = rx.recv().await {
            let event = session.ingest(&chunk, &self.patterns);
            on_event(SessionEvent::Progress(event));
        }

        match child.wait().await {
            Ok(status) => debug!(code = ?status.code(), "yt-dlp exited"),
            Err(e) => warn!(error = %e, "could not collect yt-dlp exit status"),
        }

        session.transition(SessionState::Finalizing);
        session
            .finalize(
                request.output_kind(),
                request.destination(),
                request.overwrite(),
            )
            .await
    }
}

impl Default for DownloadOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

fn notify<F>(session: &mut DownloadSession, on_event: &mut F, line: String)
where
    F: FnMut(SessionEvent),
{
    session.note(&line);
    on_event(SessionEvent::Notice(line));
}

/// Forward decoded output from one pipe until EOF
async fn pump<R>(mut reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = ChunkDecoder::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = decoder.decode(&buf[..n]);
                if !text.is_empty() && tx.send(text).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "reading yt-dlp output failed");
                break;
            }
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() {
        let _ = tx.send(rest);
    }
}

/// Events of one submitted download.
///
/// Yields notices and progress, then exactly one [`SessionEvent::Finished`].
/// Dropping the subscription aborts the download.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Next event, `None` after the outcome was delivered
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Skip remaining events and wait for the outcome
    pub async fn outcome(mut self) -> DownloadOutcome {
        while let Some(event) = self.next().await {
            if let SessionEvent::Finished(outcome) = event {
                return outcome;
            }
        }
        DownloadOutcome::Failed(YouDropError::Launch(
            "download task ended without an outcome".into(),
        ))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
