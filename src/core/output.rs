//! Downloader output scraping
//!
//! yt-dlp has no stable machine-readable progress on its default output, so
//! progress and noise are recognised with two regexes. Both can be replaced
//! when a newer binary changes its format.

use crate::error::{Result, YouDropError};
use regex::Regex;

/// Lines printed by the PyInstaller bootloader of the bundled binary
pub const DEFAULT_DIAGNOSTIC_PATTERN: &str = r"(?m)^\[PYI-.*\n?";

/// First percentage in a chunk, e.g. `42.5%`
pub const DEFAULT_PROGRESS_PATTERN: &str = r"\d+(\.\d+)?%";

/// The two patterns applied to every output chunk
#[derive(Debug, Clone)]
pub struct OutputPatterns {
    diagnostic: Regex,
    progress: Regex,
}

impl OutputPatterns {
    /// Build from custom patterns, `None` keeps the default
    pub fn new(diagnostic: Option<&str>, progress: Option<&str>) -> Result<Self> {
        Ok(Self {
            diagnostic: compile(diagnostic.unwrap_or(DEFAULT_DIAGNOSTIC_PATTERN), "diagnostic")?,
            progress: compile(progress.unwrap_or(DEFAULT_PROGRESS_PATTERN), "progress")?,
        })
    }

    /// Remove diagnostic lines, leaving everything else untouched
    pub fn clean<'a>(&self, chunk: &'a str) -> std::borrow::Cow<'a, str> {
        self.diagnostic.replace_all(chunk, "")
    }

    /// Progress fraction in [0, 1] from the first percentage in `text`
    pub fn scan_progress(&self, text: &str) -> Option<f64> {
        let found = self.progress.find(text)?;
        let number = found.as_str().trim_end_matches('%');
        number
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| (v / 100.0).clamp(0.0, 1.0))
    }
}

impl Default for OutputPatterns {
    fn default() -> Self {
        Self {
            diagnostic: Regex::new(DEFAULT_DIAGNOSTIC_PATTERN).expect("Invalid regex"),
            progress: Regex::new(DEFAULT_PROGRESS_PATTERN).expect("Invalid regex"),
        }
    }
}

fn compile(pattern: &str, name: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| YouDropError::InvalidConfig(format!("bad {} pattern: {}", name, e)))
}

/// Decodes a byte stream chunk by chunk.
///
/// A UTF-8 sequence split across two reads is held back until the rest
/// arrives; genuinely invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let keep_from = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => {
                // Invalid bytes somewhere; only hold back an incomplete tail
                incomplete_tail_start(&self.pending)
            }
        };

        let rest = self.pending.split_off(keep_from);
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = rest;
        text
    }

    /// Whatever is left once the stream closed
    pub fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}

/// Start of a trailing, possibly incomplete multi-byte sequence
fn incomplete_tail_start(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=3.min(len) {
        let b = bytes[len - back];
        if b & 0xC0 == 0x80 {
            continue;
        }
        let needed = match b {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return len,
        };
        return if needed > back { len - back } else { len };
    }
    len
}
