//! Interactive prompts (dialoguer)

use crate::types::{MenuItem, OutputKind, VideoQuality};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::Path;

pub struct DialoguerSelector {
    theme: ColorfulTheme,
}

impl DialoguerSelector {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    pub fn select<T: Clone>(&self, items: &[MenuItem<T>], prompt: &str) -> Option<T> {
        if items.is_empty() {
            return None;
        }

        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();

        let selection = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()
            .ok()
            .flatten()?;

        items.get(selection).map(|item| item.value.clone())
    }

    /// Ask for the video link, pre-filled with `initial` (e.g. the clipboard)
    pub fn prompt_url(&self, initial: Option<String>) -> dialoguer::Result<String> {
        let mut input = Input::with_theme(&self.theme).with_prompt("Video URL");
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        input
            .validate_with(|input: &String| {
                if input.trim().is_empty() {
                    Err("Paste a link, e.g. https://www.youtube.com/watch?v=...")
                } else {
                    Ok(())
                }
            })
            .interact_text()
    }

    pub fn select_kind(&self) -> Option<OutputKind> {
        let items = [
            MenuItem {
                label: "MP4 (video)".into(),
                value: OutputKind::Video,
            },
            MenuItem {
                label: "MP3 (audio)".into(),
                value: OutputKind::Audio,
            },
        ];
        self.select(&items, "Format")
    }

    pub fn select_quality(&self) -> Option<VideoQuality> {
        let items: Vec<MenuItem<VideoQuality>> = VideoQuality::ALL
            .iter()
            .map(|q| MenuItem {
                label: q.format_selector().to_string(),
                value: *q,
            })
            .collect();
        self.select(&items, "Video quality")
    }

    /// Ask before replacing an existing file
    pub fn confirm_replace(&self, path: &Path) -> bool {
        Confirm::with_theme(&self.theme)
            .with_prompt(format!("{} already exists. Replace it?", path.display()))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

impl Default for DialoguerSelector {
    fn default() -> Self {
        Self::new()
    }
}
