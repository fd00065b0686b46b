// Display formatting for answers, sources and timestamps
//
// Everything here is pure string work shared by the TUI views and the
// one-shot CLI commands.

use std::sync::OnceLock;

use chrono::{DateTime, Local, Utc};
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::Source;

/// Source snippets are cut to this many characters
pub const SOURCE_PREVIEW_CHARS: usize = 150;
/// History answers are cut to this many characters
pub const ANSWER_PREVIEW_CHARS: usize = 200;

/// Upper bound on formatting passes; real answers settle in two
const MAX_PASSES: usize = 16;

// ─────────────────────────────────────────────────────────────────────────────
// Answer formatter
// ─────────────────────────────────────────────────────────────────────────────

/// Reshapes assistant text for reading: drops the trailing references
/// section and puts bullets and numbered steps on their own paragraphs
pub struct AnswerFormatter {
    references: Regex,
    bullet_after_sentence: Regex,
    bullet_at_line_start: Regex,
    step_after_sentence: Regex,
    blank_lines: Regex,
}

impl AnswerFormatter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            references: Regex::new(r"(?i)📚\s*(?:참고|references|sources)\s*[:：]")?,
            // A bullet char followed by another bullet char is markdown
            // emphasis or a rule, not a list item
            bullet_after_sentence: Regex::new(r"([.!?])\s*([•\-*·])\s*([^\s•\-*·])")?,
            bullet_at_line_start: Regex::new(r"(?m)^([•\-*·])[ \t]*([^\s•\-*·])")?,
            step_after_sentence: Regex::new(
                r"([.!?])\s*(\d+[.)]\s*|\*{0,2}\d+단계[:：]|[Ss]tep \d+[:：])",
            )?,
            blank_lines: Regex::new(r"\n\s*\n")?,
        })
    }

    /// One pass of the pipeline
    fn apply(&self, text: &str) -> String {
        let body = match self.references.find(text) {
            Some(marker) => &text[..marker.start()],
            None => text,
        };
        let text = body.trim();
        let text = self
            .bullet_after_sentence
            .replace_all(text, "$1\n\n$2 $3");
        let text = self.bullet_at_line_start.replace_all(&text, "$1 $2");
        let text = self.step_after_sentence.replace_all(&text, "$1\n\n$2");
        let text = self.blank_lines.replace_all(&text, "\n\n");
        text.trim().to_string()
    }

    /// Run passes until the text stops changing, so the result is a fixed
    /// point: formatting it again returns it unchanged
    pub fn format(&self, text: &str) -> String {
        let mut current = self.apply(text);
        for _ in 1..MAX_PASSES {
            let next = self.apply(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

/// Format an assistant answer for display
pub fn format_answer(text: &str) -> String {
    static FORMATTER: OnceLock<Option<AnswerFormatter>> = OnceLock::new();
    let formatter = FORMATTER.get_or_init(|| match AnswerFormatter::new() {
        Ok(f) => Some(f),
        Err(e) => {
            tracing::error!("Answer formatter patterns failed to compile: {}", e);
            None
        }
    });
    match formatter {
        Some(f) => f.format(text),
        None => text.trim().to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Truncation
// ─────────────────────────────────────────────────────────────────────────────

/// Keep the first `max` characters, appending "..." when something was cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Fit `text` into `width` terminal columns, ending with "…" when cut
///
/// Uses display width, so CJK and emoji count as two columns.
pub fn truncate_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Collapse a multi-line string onto one line
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Sources
// ─────────────────────────────────────────────────────────────────────────────

/// Text shown for a source: snippet, content preview, chunk id, or "Source"
pub fn source_label(source: &Source) -> String {
    match source {
        Source::Snippet(text) => text.clone(),
        Source::Detailed(detail) => {
            if let Some(content) = detail.content.as_deref().filter(|c| !c.is_empty()) {
                return truncate_chars(content, SOURCE_PREVIEW_CHARS);
            }
            match &detail.chunk_id {
                Some(serde_json::Value::String(id)) if !id.is_empty() => id.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => "Source".to_string(),
            }
        }
    }
}

pub fn source_url(source: &Source) -> Option<&str> {
    match source {
        Source::Detailed(detail) => detail.url.as_deref().filter(|u| !u.is_empty()),
        Source::Snippet(_) => None,
    }
}

/// "(relevance: 87%)" for scored sources; a zero score is treated as unscored
pub fn relevance(source: &Source) -> Option<String> {
    match source {
        Source::Detailed(detail) => detail
            .score
            .filter(|s| *s > 0.0)
            .map(|s| format!("(relevance: {:.0}%)", s * 100.0)),
        Source::Snippet(_) => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Numbers and dates
// ─────────────────────────────────────────────────────────────────────────────

/// Percent change with an explicit sign when non-negative
pub fn signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}%", trim_float(value))
    } else {
        format!("{}%", trim_float(value))
    }
}

/// Drop a trailing ".0" so whole numbers print like integers
pub fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

pub fn local_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

pub fn local_datetime(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SourceDetail;

    const CORPUS: &[&str] = &[
        "",
        "   ",
        "Use git add. - stage files. - commit",
        "First do this! • then that? · and finally * this",
        "Install it. 1. Download 2. Unpack 3) Run",
        "Here is how.1단계: prepare. **2단계: build",
        "Try this. Step 1: clone. step 2: build",
        "Line one.\n\n\n\nLine two.\n  \n\nLine three.",
        "-no space bullet\n•tight\n*   wide",
        "Answer text.\n\n📚 References: doc one, doc two",
        "Answer.📚참고: 문서",
        "Bold after period. **Important** stuff. --- rule",
        "Version 1.2.3 is out. 2. Upgrade now.",
        "!.-?*·•",
        "Ends with bullet. -",
        "1. one\n2. two\n3. three",
        "Mixed. - a\n- b. 1) c",
    ];

    fn detail(content: Option<&str>, chunk_id: Option<serde_json::Value>) -> Source {
        Source::Detailed(SourceDetail {
            content: content.map(str::to_string),
            chunk_id,
            url: None,
            score: None,
        })
    }

    #[test]
    fn formats_bullets_after_sentences() {
        assert_eq!(
            format_answer("Use git add. - stage files. - commit"),
            "Use git add.\n\n- stage files.\n\n- commit"
        );
    }

    #[test]
    fn formatting_is_idempotent() {
        for input in CORPUS {
            let once = format_answer(input);
            let twice = format_answer(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn strips_references_section() {
        assert_eq!(
            format_answer("Answer text.\n\n📚 References: doc one"),
            "Answer text."
        );
        assert_eq!(format_answer("답변입니다. 📚 참고： 문서"), "답변입니다.");
        assert_eq!(format_answer("Done 📚 SOURCES : a"), "Done");
    }

    #[test]
    fn splits_numbered_steps() {
        assert_eq!(
            format_answer("Install it. 1. Download"),
            "Install it.\n\n1. Download"
        );
        assert_eq!(
            format_answer("Try this. Step 1: clone."),
            "Try this.\n\nStep 1: clone."
        );
        assert_eq!(
            format_answer("Ready. **1단계: 준비"),
            "Ready.\n\n**1단계: 준비"
        );
    }

    #[test]
    fn normalizes_line_start_bullets() {
        assert_eq!(
            format_answer("-tight\n•   wide"),
            "- tight\n• wide"
        );
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(format_answer("a\n\n\n\nb\n \n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn leaves_markdown_emphasis_alone() {
        assert_eq!(
            format_answer("Read this. **Important** part"),
            "Read this. **Important** part"
        );
        assert_eq!(
            format_answer("Read this. **Important**"),
            "Read this. **Important**"
        );
        assert_eq!(format_answer("Ends with bullet. -"), "Ends with bullet. -");
    }

    #[test]
    fn source_label_fallbacks() {
        assert_eq!(
            source_label(&Source::Snippet("plain".to_string())),
            "plain"
        );

        let long = "x".repeat(200);
        let label = source_label(&detail(Some(&long), None));
        assert_eq!(label.chars().count(), SOURCE_PREVIEW_CHARS + 3);
        assert!(label.ends_with("..."));

        assert_eq!(
            source_label(&detail(None, Some(serde_json::json!(42)))),
            "42"
        );
        assert_eq!(
            source_label(&detail(None, Some(serde_json::json!("c-1")))),
            "c-1"
        );
        assert_eq!(source_label(&detail(None, None)), "Source");
    }

    #[test]
    fn relevance_rounds_score() {
        let source = Source::Detailed(SourceDetail {
            score: Some(0.876),
            ..Default::default()
        });
        assert_eq!(relevance(&source).as_deref(), Some("(relevance: 88%)"));
        assert_eq!(relevance(&Source::Snippet("s".to_string())), None);
    }

    #[test]
    fn truncation_helpers() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
        assert_eq!(truncate_width("hello world", 6), "hello…");
        assert_eq!(truncate_width("한국어", 5), "한국…");
        assert_eq!(truncate_width("short", 10), "short");
        assert_eq!(single_line("a\n  b\tc"), "a b c");
    }

    #[test]
    fn signed_percent_shows_plus() {
        assert_eq!(signed_percent(12.5), "+12.5%");
        assert_eq!(signed_percent(0.0), "+0%");
        assert_eq!(signed_percent(-3.0), "-3%");
    }
}
