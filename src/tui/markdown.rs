// Markdown rendering for assistant answers
//
// Uses pulldown-cmark to parse markdown into styled segments, then flows
// them into width-limited ratatui Lines. Line counts are known up front so
// the chat view and detail modal can scroll precisely.
//
// Supports: headings, inline code, fenced code blocks, bold, italic,
// strikethrough, lists, blockquotes, tables, links, rules.

use crate::tui::theme::Theme;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Emphasis active on a run of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
}

/// A segment of parsed markdown with semantic meaning
#[derive(Debug, Clone, PartialEq)]
pub enum StyledSegment {
    Text { text: String, emphasis: Emphasis },
    /// `like this`
    InlineCode(String),
    CodeBlock { lang: Option<String>, code: String },
    /// Single newline in source, flows as a space
    SoftBreak,
    HardBreak,
    ParagraphEnd,
    Heading { level: u8, text: String },
    ListItemStart { ordered: bool, number: u64, depth: usize },
    ListItemEnd,
    BlockQuoteStart,
    BlockQuoteEnd,
    Rule,
    Link { text: String, url: String },
    TableRow { cells: Vec<String>, header: bool },
    TableEnd,
}

/// Parse markdown into styled segments
pub fn parse_markdown(markdown: &str) -> Vec<StyledSegment> {
    let mut segments = Vec::new();
    let mut emphasis = Emphasis::default();

    let mut heading: Option<(u8, String)> = None;
    let mut code_block: Option<(Option<String>, String)> = None;
    let mut link: Option<(String, String)> = None;
    // (ordered, next number) per nesting level
    let mut list_stack: Vec<(bool, u64)> = Vec::new();

    let mut in_table_head = false;
    let mut table_row: Option<Vec<String>> = None;
    let mut table_cell: Option<String> = None;

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Text(text) | Event::Code(text)
                if code_block.is_some()
                    || heading.is_some()
                    || link.is_some()
                    || table_cell.is_some() =>
            {
                if let Some((_, code)) = code_block.as_mut() {
                    code.push_str(&text);
                } else if let Some((_, content)) = heading.as_mut() {
                    content.push_str(&text);
                } else if let Some((content, _)) = link.as_mut() {
                    content.push_str(&text);
                } else if let Some(cell) = table_cell.as_mut() {
                    cell.push_str(&text);
                }
            }
            Event::Text(text) => segments.push(StyledSegment::Text {
                text: text.to_string(),
                emphasis,
            }),
            Event::Code(code) => segments.push(StyledSegment::InlineCode(code.to_string())),

            Event::Start(Tag::Heading { level, .. }) => {
                let level = match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    HeadingLevel::H3 => 3,
                    HeadingLevel::H4 => 4,
                    HeadingLevel::H5 => 5,
                    HeadingLevel::H6 => 6,
                };
                heading = Some((level, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = heading.take() {
                    segments.push(StyledSegment::Heading { level, text });
                }
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                code_block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = code_block.take() {
                    segments.push(StyledSegment::CodeBlock { lang, code });
                }
            }

            Event::End(TagEnd::Paragraph) => segments.push(StyledSegment::ParagraphEnd),
            Event::SoftBreak => {
                if let Some((_, content)) = heading.as_mut() {
                    content.push(' ');
                } else {
                    segments.push(StyledSegment::SoftBreak);
                }
            }
            Event::HardBreak => segments.push(StyledSegment::HardBreak),

            Event::Start(Tag::List(first)) => {
                list_stack.push((first.is_some(), first.unwrap_or(1)));
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
                if list_stack.is_empty() {
                    segments.push(StyledSegment::ParagraphEnd);
                }
            }
            Event::Start(Tag::Item) => {
                let depth = list_stack.len();
                if let Some((ordered, number)) = list_stack.last_mut() {
                    segments.push(StyledSegment::ListItemStart {
                        ordered: *ordered,
                        number: *number,
                        depth,
                    });
                    *number += 1;
                }
            }
            Event::End(TagEnd::Item) => segments.push(StyledSegment::ListItemEnd),

            Event::Start(Tag::Strong) => emphasis.bold = true,
            Event::End(TagEnd::Strong) => emphasis.bold = false,
            Event::Start(Tag::Emphasis) => emphasis.italic = true,
            Event::End(TagEnd::Emphasis) => emphasis.italic = false,
            Event::Start(Tag::Strikethrough) => emphasis.strike = true,
            Event::End(TagEnd::Strikethrough) => emphasis.strike = false,

            Event::Start(Tag::BlockQuote) => segments.push(StyledSegment::BlockQuoteStart),
            Event::End(TagEnd::BlockQuote) => segments.push(StyledSegment::BlockQuoteEnd),
            Event::Rule => segments.push(StyledSegment::Rule),

            Event::Start(Tag::Link { dest_url, .. }) => {
                link = Some((String::new(), dest_url.to_string()));
            }
            Event::End(TagEnd::Link) => {
                if let Some((text, url)) = link.take() {
                    segments.push(StyledSegment::Link { text, url });
                }
            }

            Event::Start(Tag::TableHead) => {
                in_table_head = true;
                table_row = Some(Vec::new());
            }
            Event::End(TagEnd::TableHead) => {
                in_table_head = false;
                if let Some(cells) = table_row.take() {
                    segments.push(StyledSegment::TableRow {
                        cells,
                        header: true,
                    });
                }
            }
            Event::Start(Tag::TableRow) => table_row = Some(Vec::new()),
            Event::End(TagEnd::TableRow) => {
                if let Some(cells) = table_row.take() {
                    segments.push(StyledSegment::TableRow {
                        cells,
                        header: in_table_head,
                    });
                }
            }
            Event::Start(Tag::TableCell) => table_cell = Some(String::new()),
            Event::End(TagEnd::TableCell) => {
                if let (Some(cell), Some(row)) = (table_cell.take(), table_row.as_mut()) {
                    row.push(cell);
                }
            }
            Event::End(TagEnd::Table) => segments.push(StyledSegment::TableEnd),

            // Raw HTML is shown as typed
            Event::Html(html) | Event::InlineHtml(html) => segments.push(StyledSegment::Text {
                text: html.to_string(),
                emphasis,
            }),

            _ => {}
        }
    }

    segments
}

/// Accumulates spans into lines no wider than `width`
struct Flow {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    current: usize,
    /// Repeated at the start of every line (blockquote bar)
    prefix: Option<Span<'static>>,
}

impl Flow {
    fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            lines: Vec::new(),
            spans: Vec::new(),
            current: 0,
            prefix: None,
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines
                .push(Line::from(std::mem::take(&mut self.spans)));
        }
        self.current = 0;
    }

    fn blank(&mut self) {
        self.flush();
        if !matches!(self.lines.last(), Some(line) if line.width() == 0) {
            self.lines.push(Line::from(""));
        }
    }

    fn start_line(&mut self) {
        if self.spans.is_empty() {
            if let Some(prefix) = self.prefix.clone() {
                self.current = prefix.content.width();
                self.spans.push(prefix);
            }
        }
    }

    fn push_fixed(&mut self, text: String, style: Style) {
        self.start_line();
        self.current += text.width();
        self.spans.push(Span::styled(text, style));
    }

    /// Word-wrap `text` into the flow
    fn push_text(&mut self, text: &str, style: Style) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.flush();
            }
            for piece in split_keep_spaces(part) {
                let is_space = piece.starts_with(' ');
                let piece_width = piece.width();
                if self.current + piece_width > self.width && self.current > 0 {
                    self.flush();
                    if is_space {
                        continue;
                    }
                }
                if is_space && self.spans.is_empty() {
                    continue;
                }
                self.start_line();
                if self.current + piece_width > self.width {
                    // Longer than a whole line: hard split
                    for chunk in split_width(piece, self.width.saturating_sub(self.current).max(1))
                    {
                        if self.current > 0 && self.current + chunk.width() > self.width {
                            self.flush();
                            self.start_line();
                        }
                        self.current += chunk.width();
                        self.spans.push(Span::styled(chunk, style));
                    }
                } else {
                    self.current += piece_width;
                    self.spans.push(Span::styled(piece.to_string(), style));
                }
            }
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while matches!(self.lines.last(), Some(line) if line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Split into alternating words and runs of spaces
fn split_keep_spaces(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, ch) in text.char_indices() {
        let space = ch == ' ';
        if in_space.is_some_and(|s| s != space) {
            pieces.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Break a word into chunks of at most `width` columns
fn split_width(word: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut current = 0;
    for ch in word.chars() {
        let w = ch.width().unwrap_or(0);
        if current + w > width && !chunk.is_empty() {
            chunks.push(std::mem::take(&mut chunk));
            current = 0;
        }
        chunk.push(ch);
        current += w;
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

fn emphasis_style(base: Style, emphasis: Emphasis) -> Style {
    let mut style = base;
    if emphasis.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if emphasis.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if emphasis.strike {
        style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
    }
    style
}

/// Convert segments into wrapped Lines
pub fn segments_to_lines(
    segments: &[StyledSegment],
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut flow = Flow::new(width);
    let base = Style::default().fg(theme.fg);

    for segment in segments {
        match segment {
            StyledSegment::Text { text, emphasis } => {
                flow.push_text(text, emphasis_style(base, *emphasis));
            }
            StyledSegment::InlineCode(code) => {
                flow.push_text(code, Style::default().fg(theme.code));
            }
            StyledSegment::CodeBlock { code, .. } => {
                flow.flush();
                for line in code.lines() {
                    flow.push_fixed(
                        format!("  {}", line),
                        Style::default().fg(theme.code).add_modifier(Modifier::DIM),
                    );
                    flow.flush();
                }
                flow.blank();
            }
            StyledSegment::SoftBreak => flow.push_text(" ", base),
            StyledSegment::HardBreak => flow.flush(),
            StyledSegment::ParagraphEnd => flow.blank(),
            StyledSegment::Heading { level, text } => {
                flow.flush();
                let color = match level {
                    1 => theme.title,
                    2 => theme.highlight,
                    _ => theme.assistant,
                };
                flow.push_text(text, Style::default().fg(color).add_modifier(Modifier::BOLD));
                flow.flush();
            }
            StyledSegment::ListItemStart {
                ordered,
                number,
                depth,
            } => {
                flow.flush();
                let indent = "  ".repeat(depth.saturating_sub(1));
                let marker = if *ordered {
                    format!("{}{}. ", indent, number)
                } else {
                    format!("{}• ", indent)
                };
                flow.push_fixed(marker, Style::default().fg(theme.border));
            }
            StyledSegment::ListItemEnd => flow.flush(),
            StyledSegment::BlockQuoteStart => {
                flow.flush();
                flow.prefix = Some(Span::styled("│ ", Style::default().fg(theme.border)));
            }
            StyledSegment::BlockQuoteEnd => {
                flow.flush();
                flow.prefix = None;
                flow.blank();
            }
            StyledSegment::Rule => {
                flow.flush();
                flow.push_fixed(
                    "─".repeat(width.saturating_sub(4).max(10)),
                    Style::default().fg(theme.border),
                );
                flow.flush();
            }
            StyledSegment::Link { text, url } => {
                let display = if text.is_empty() || text == url {
                    url.clone()
                } else {
                    format!("{} ({})", text, url)
                };
                flow.push_text(
                    &display,
                    Style::default()
                        .fg(theme.link)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            StyledSegment::TableRow { cells, header } => {
                flow.flush();
                let style = if *header {
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD)
                } else {
                    base
                };
                flow.push_fixed(format!("│ {} │", cells.join(" │ ")), style);
                flow.flush();
            }
            StyledSegment::TableEnd => flow.blank(),
        }
    }

    flow.finish()
}

/// Strip control characters that corrupt the terminal
///
/// Removes carriage returns, backspaces, ANSI escape sequences and other
/// ASCII control characters except tab and newline.
fn sanitize_for_tui(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\x1b' => {
                // ESC [ <params> <letter>
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\t' => result.push_str("    "),
            c if c.is_ascii_control() && c != '\n' => {}
            _ => result.push(ch),
        }
    }

    result
}

/// Parse markdown and convert directly to wrapped Lines
pub fn render_markdown(markdown: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let sanitized = sanitize_for_tui(markdown);
    segments_to_lines(&parse_markdown(&sanitized), width, theme)
}

/// Wrap plain text (user messages, previews) without markdown parsing
pub fn render_plain(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    let mut flow = Flow::new(width);
    flow.push_text(&sanitize_for_tui(text), style);
    flow.finish()
}
