//! youdrop - paste a link, pick a format, get a file
//!
//! Terminal front-end for the bundled yt-dlp: asks for whatever was not given
//! on the command line, shows progress while downloading and moves the result
//! to the chosen destination.

use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

use youdrop::storage::config;
use youdrop::ui::clipboard::{read_clipboard, url_from_clipboard};
use youdrop::ui::render::{print_located, print_outcome, EventRenderer};
use youdrop::ui::reveal::reveal_in_file_manager;
use youdrop::ui::selector::DialoguerSelector;
use youdrop::utils::paths::{ensure_app_dirs, resolve_destination};
use youdrop::{
    DownloadOrchestrator, DownloadOutcome, DownloadRequest, OutputKind, VideoQuality, YouDropError,
};

/// Paste a link, pick a format, get a file.
#[derive(Parser, Debug)]
#[command(name = "youdrop")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Video URL (prompted for when omitted)
    url: Option<String>,

    /// Take the URL from the clipboard
    #[arg(short, long, conflicts_with = "url")]
    paste: bool,

    /// Extract audio as MP3
    #[arg(long, conflicts_with = "video")]
    audio: bool,

    /// Download video as MP4
    #[arg(long)]
    video: bool,

    /// Video quality
    #[arg(short, long, value_enum)]
    quality: Option<VideoQuality>,

    /// Where to save the file (default: <download_dir>/video.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replace the destination without asking
    #[arg(short, long)]
    force: bool,

    /// Show the file in the file manager when done
    #[arg(long)]
    reveal: bool,

    /// Edit the configuration file
    #[arg(short, long)]
    edit: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "youdrop=debug" } else { "youdrop=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Ensure app directories exist
    ensure_app_dirs().await?;

    // Handle --edit flag
    if cli.edit {
        let cfg = config::load_config().await?;
        config::edit_config(&cfg.editor).await?;
        return Ok(());
    }

    let cfg = config::load_config().await?;
    let selector = DialoguerSelector::new();

    let pasted = if cli.paste {
        let url = url_from_clipboard(read_clipboard());
        if url.is_none() {
            eprintln!("{}", "Clipboard does not hold a link.".yellow());
        }
        url
    } else {
        None
    };

    // Without a URL, ask for everything
    let interactive = cli.url.is_none() && pasted.is_none();
    let url = match cli.url.or(pasted) {
        Some(url) => url,
        None => selector.prompt_url(url_from_clipboard(read_clipboard()))?,
    };

    let kind = if cli.audio {
        OutputKind::Audio
    } else if cli.video {
        OutputKind::Video
    } else if interactive {
        selector.select_kind().unwrap_or(cfg.output_kind)
    } else {
        cfg.output_kind
    };

    let quality = match cli.quality {
        Some(quality) => quality,
        None if interactive && kind == OutputKind::Video => {
            selector.select_quality().unwrap_or(cfg.video_quality)
        }
        None => cfg.video_quality,
    };

    let cwd = std::env::current_dir()?;
    let destination = resolve_destination(
        cli.output.as_deref(),
        Path::new(&cfg.download_dir),
        &cwd,
        kind,
    );

    // The old file is only replaced once a new one was produced
    let overwrite = destination.exists();
    if overwrite && !cli.force && !selector.confirm_replace(&destination) {
        println!("{}", "Nothing downloaded.".yellow());
        return Ok(());
    }

    let request =
        DownloadRequest::new(&url, kind, quality, destination.clone())?.with_overwrite(overwrite);
    let orchestrator = DownloadOrchestrator::from_config(&cfg)?;

    print_located(&destination);

    let mut renderer = EventRenderer::new();
    let mut subscription = orchestrator.submit(request);
    let mut outcome = None;
    while let Some(event) = subscription.next().await {
        if let Some(finished) = renderer.handle(event) {
            outcome = Some(finished);
            break;
        }
    }

    let outcome = outcome.unwrap_or_else(|| {
        DownloadOutcome::Failed(YouDropError::Launch(
            "download task ended without an outcome".into(),
        ))
    });
    print_outcome(&outcome);

    match outcome {
        DownloadOutcome::Succeeded(path) => {
            if (cli.reveal || cfg.reveal_after_download)
                && let Err(e) = reveal_in_file_manager(&path).await
            {
                eprintln!("{} {}", "Error:".red(), e);
            }
            Ok(())
        }
        DownloadOutcome::Failed(_) => std::process::exit(1),
    }
}
