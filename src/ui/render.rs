//! Terminal rendering of session events

use crate::types::{DownloadOutcome, ProgressEvent, SessionEvent};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Progress bar plus a scrolling log above it
///
/// When the bar is hidden (stderr is not a terminal) log lines go to `out`
/// instead, since indicatif drops `println` on a hidden bar.
pub struct EventRenderer<W: Write = io::Stdout> {
    bar: ProgressBar,
    out: W,
    determinate: bool,
}

impl EventRenderer {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_message("Downloading...");
        bar.enable_steady_tick(Duration::from_millis(100));

        Self::with_output(bar, io::stdout())
    }
}

impl<W: Write> EventRenderer<W> {
    pub fn with_output(bar: ProgressBar, out: W) -> Self {
        Self {
            bar,
            out,
            determinate: false,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Render everything but the outcome; returns it once it arrives
    pub fn handle(&mut self, event: SessionEvent) -> Option<DownloadOutcome> {
        match event {
            SessionEvent::Notice(line) => {
                self.emit(line);
                None
            }
            SessionEvent::Progress(progress) => {
                self.progress(&progress);
                None
            }
            SessionEvent::Finished(outcome) => {
                self.bar.finish_and_clear();
                Some(outcome)
            }
        }
    }

    fn progress(&mut self, event: &ProgressEvent) {
        for line in event.text_delta.lines().filter(|l| !l.trim().is_empty()) {
            self.emit(format!("{}", line.dimmed()));
        }

        if let Some(fraction) = event.progress {
            if !self.determinate {
                self.bar.set_length(100);
                self.bar.set_style(bar_style());
                self.determinate = true;
            }
            self.bar.set_position(percent(fraction));
        }
    }

    fn emit(&mut self, line: String) {
        if self.bar.is_hidden() {
            let _ = writeln!(self.out, "{line}");
        } else {
            self.bar.println(line);
        }
    }
}

impl Default for EventRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Print the final status line
pub fn print_outcome(outcome: &DownloadOutcome) {
    match outcome {
        DownloadOutcome::Succeeded(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            println!("{} {}", "✓ Saved as".green(), name);
            println!("  {}", path.display().to_string().dimmed());
        }
        DownloadOutcome::Failed(e) => {
            eprintln!("{} {}", "‼️ Error:".red(), e);
            eprintln!("  {}", format!("[{:?}]", e.code()).dimmed());
        }
    }
}

pub fn print_located(path: &Path) {
    println!("{} {}", "Destination:".dimmed(), path.display());
}

fn percent(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u64
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_and_clamps() {
        assert_eq!(percent(0.426), 43);
        assert_eq!(percent(1.7), 100);
        assert_eq!(percent(-0.2), 0);
    }

    #[test]
    fn test_handle_returns_outcome_last() {
        let mut renderer = EventRenderer::new();
        assert!(renderer.handle(SessionEvent::Notice("hello".into())).is_none());
        assert!(renderer
            .handle(SessionEvent::Progress(ProgressEvent {
                text_delta: "[download]  10.0%\n".into(),
                progress: Some(0.1),
            }))
            .is_none());
        let outcome = renderer.handle(SessionEvent::Finished(DownloadOutcome::Succeeded(
            "/tmp/video.mp4".into(),
        )));
        assert!(outcome.is_some_and(|o| o.is_success()));
    }

    #[test]
    fn test_hidden_bar_still_prints_log() {
        let mut renderer = EventRenderer::with_output(ProgressBar::hidden(), Vec::<u8>::new());
        renderer.handle(SessionEvent::Notice("Located yt-dlp".into()));
        renderer.handle(SessionEvent::Progress(ProgressEvent {
            text_delta: "[youtube] abc: Downloading webpage\n\n".into(),
            progress: None,
        }));
        renderer.handle(SessionEvent::Finished(DownloadOutcome::Succeeded(
            "/tmp/video.mp4".into(),
        )));

        let printed = String::from_utf8(renderer.into_output()).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Located yt-dlp");
        assert!(lines[1].contains("[youtube] abc: Downloading webpage"));
    }
}
