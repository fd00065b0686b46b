//! Clipboard helpers for copying answers and bookmarks
//!
//! Uses `arboard` for cross-platform support. The clipboard is opened fresh
//! for each copy so no handle is held between key presses.

use anyhow::{Context, Result};
use arboard::Clipboard;

use crate::api::Source;
use crate::format;

/// Copy text to the system clipboard
///
/// Common failure cases: no display server (headless Linux), permission denied.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}

/// Plain-text rendition of an answer followed by its sources
pub fn with_sources(content: &str, sources: &[Source]) -> String {
    let mut text = content.trim_end().to_string();
    if sources.is_empty() {
        return text;
    }

    text.push_str("\n\nSources:");
    for (i, source) in sources.iter().enumerate() {
        text.push_str(&format!("\n{}. {}", i + 1, format::source_label(source)));
        if let Some(url) = format::source_url(source) {
            text.push_str(&format!(" <{}>", url));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SourceDetail;

    #[test]
    fn plain_answer_has_no_sources_section() {
        assert_eq!(with_sources("Use git.\n", &[]), "Use git.");
    }

    #[test]
    fn sources_are_numbered_with_urls() {
        let sources = vec![
            Source::Snippet("git docs".to_string()),
            Source::Detailed(SourceDetail {
                content: Some("reset".to_string()),
                url: Some("https://git-scm.com".to_string()),
                ..Default::default()
            }),
        ];
        assert_eq!(
            with_sources("Use git.", &sources),
            "Use git.\n\nSources:\n1. git docs\n2. reset <https://git-scm.com>"
        );
    }
}
