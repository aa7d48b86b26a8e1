//! Pasting the video link from the system clipboard

/// Current clipboard text, `None` when there is no clipboard or no text
pub fn read_clipboard() -> Option<String> {
    let mut clipboard = arboard::Clipboard::new().ok()?;
    clipboard.get_text().ok()
}

/// The clipboard text if it looks like a single http(s) link
pub fn url_from_clipboard(text: Option<String>) -> Option<String> {
    let text = text?;
    let url = text.trim();
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    if url.starts_with("https://") || url.starts_with("http://") {
        Some(url.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_is_trimmed() {
        assert_eq!(
            url_from_clipboard(Some("  https://www.youtube.com/watch?v=abc\n".into())),
            Some("https://www.youtube.com/watch?v=abc".into())
        );
    }

    #[test]
    fn test_empty_clipboard() {
        assert_eq!(url_from_clipboard(None), None);
        assert_eq!(url_from_clipboard(Some("   ".into())), None);
    }

    #[test]
    fn test_non_link_text() {
        assert_eq!(url_from_clipboard(Some("grocery list".into())), None);
        assert_eq!(url_from_clipboard(Some("ftp://host/file".into())), None);
        assert_eq!(
            url_from_clipboard(Some("https://a.example https://b.example".into())),
            None
        );
    }
}
