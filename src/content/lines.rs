//! Logical lines: the block-level units the paginator moves between pages

use serde::{Deserialize, Serialize};

/// Type of list marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListMarker {
    Bullet,
    Numbered { ordinal: u32 },
}

impl ListMarker {
    /// Get the display string for this marker
    pub fn display(&self) -> String {
        match self {
            ListMarker::Bullet => "•".to_string(),
            ListMarker::Numbered { ordinal } => format!("{}.", ordinal),
        }
    }
}

/// The kind of block a logical line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockKind {
    /// Regular paragraph text
    #[default]
    Paragraph,
    /// Markdown heading with level (1-6)
    Heading { level: u8 },
    /// List item
    ListItem { indent_level: u8, marker: ListMarker },
    /// Block quote
    Quote,
    /// Fenced code block, kept whole
    CodeBlock,
}

impl BlockKind {
    /// Classify a single (non-fenced) markdown source line
    pub fn classify(line: &str) -> Self {
        let indent = line.len() - line.trim_start().len();
        let body = line.trim_start();

        let hashes = body.bytes().take_while(|&b| b == b'#').count();
        if (1..=6).contains(&hashes) && body[hashes..].starts_with(' ') {
            return BlockKind::Heading { level: hashes as u8 };
        }

        let indent_level = (indent / 2).min(u8::MAX as usize) as u8;
        if body.starts_with("- ") || body.starts_with("* ") || body.starts_with("+ ") {
            return BlockKind::ListItem {
                indent_level,
                marker: ListMarker::Bullet,
            };
        }

        let digits = body.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 && body[digits..].starts_with(". ") {
            if let Ok(ordinal) = body[..digits].parse() {
                return BlockKind::ListItem {
                    indent_level,
                    marker: ListMarker::Numbered { ordinal },
                };
            }
        }

        if body.starts_with('>') {
            return BlockKind::Quote;
        }

        BlockKind::Paragraph
    }

    /// Get the line height multiplier for this block kind
    pub fn line_height_multiplier(&self, heading_scale: f32) -> f32 {
        match self {
            BlockKind::Heading { level } => match level {
                1 => heading_scale,
                2 => 1.0 + (heading_scale - 1.0) * 0.75,
                3 => 1.0 + (heading_scale - 1.0) * 0.5,
                _ => 1.0 + (heading_scale - 1.0) * 0.25,
            },
            _ => 1.0,
        }
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading { .. })
    }

    /// Check if this is a list item
    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockKind::ListItem { .. })
    }
}

/// One block-level unit of topic text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalLine {
    pub text: String,
    pub kind: BlockKind,
    /// A blank line separated this line from the previous one in the source
    pub paragraph_break: bool,
}

impl LogicalLine {
    pub fn new(text: impl Into<String>, kind: BlockKind, paragraph_break: bool) -> Self {
        Self {
            text: text.into(),
            kind,
            paragraph_break,
        }
    }

    /// Plain paragraph line, handy for tests and benches
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(text, BlockKind::Paragraph, false)
    }
}

/// Join lines back into page text.
///
/// A line that followed a blank line in the source gets `\n\n` in front of
/// it, except at the top of a page.
pub fn join_lines(lines: &[LogicalLine]) -> String {
    let capacity = lines.iter().map(|l| l.text.len() + 2).sum();
    let mut out = String::with_capacity(capacity);
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push_str(if line.paragraph_break { "\n\n" } else { "\n" });
        }
        out.push_str(&line.text);
    }
    out
}

struct OpenFence<'a> {
    marker: &'a str,
    body: Vec<&'a str>,
    paragraph_break: bool,
}

/// Returns the fence run (e.g. "```" or "~~~~") if `line` opens a code fence
fn fence_marker(line: &str) -> Option<&str> {
    let body = line.trim_start();
    let first = body.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run = body.bytes().take_while(|&b| b == first as u8).count();
    (run >= 3).then(|| &body[..run])
}

/// Whether `line` closes a fence opened with `marker`: only the fence
/// character, at least as many as the opener, no info string
fn closes_fence(line: &str, marker: &str) -> bool {
    let body = line.trim();
    match marker.bytes().next() {
        Some(fence) => body.len() >= marker.len() && body.bytes().all(|b| b == fence),
        None => false,
    }
}

/// Split raw topic text into logical lines.
///
/// Blank lines separate lines but are not content. A fenced code block,
/// opening fence to closing fence inclusive, is a single logical line. An
/// unclosed fence runs to the end of the text.
pub fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending_break = false;
    let mut fence: Option<OpenFence<'_>> = None;

    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(open) = fence.as_mut() {
            open.body.push(line.trim_end());
            if closes_fence(line, open.marker) {
                if let Some(closed) = fence.take() {
                    lines.push(LogicalLine::new(
                        closed.body.join("\n"),
                        BlockKind::CodeBlock,
                        closed.paragraph_break,
                    ));
                }
            }
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            pending_break = !lines.is_empty();
            continue;
        }

        if let Some(marker) = fence_marker(line) {
            fence = Some(OpenFence {
                marker,
                body: vec![line],
                paragraph_break: pending_break,
            });
            pending_break = false;
            continue;
        }

        lines.push(LogicalLine::new(line, BlockKind::classify(line), pending_break));
        pending_break = false;
    }

    if let Some(open) = fence {
        lines.push(LogicalLine::new(
            open.body.join("\n"),
            BlockKind::CodeBlock,
            open.paragraph_break,
        ));
    }

    lines
}
