//! Greedy measurement-driven pagination
//!
//! Lines are appended to the current page one at a time and the joined text
//! is re-measured after each append. The first line that pushes the page
//! past its usable height moves to a fresh page. A line that is too tall on
//! its own becomes a page by itself, flagged as overflow; content is never
//! truncated.

mod cache;

pub use cache::{PaginationCache, PaginationResults, RefreshReport, TopicPagination};

use crate::content::{join_lines, logical_lines, LogicalLine};
use crate::measure::{Measurer, StyleProfile};
use crate::schedule::Viewport;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Size constraint a page's rendered content must fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBudget {
    pub width: f32,
    pub height: f32,
    /// Inner padding on every side
    pub padding: f32,
    /// Space kept free at the bottom for the page footer
    pub reserved_footer: f32,
}

impl PageBudget {
    pub fn new(width: f32, height: f32, padding: f32, reserved_footer: f32) -> Self {
        Self {
            width,
            height,
            padding,
            reserved_footer,
        }
    }

    /// Budget for one page of the flip view at the given viewport size
    pub fn for_viewport(viewport: Viewport, padding: f32, reserved_footer: f32) -> Self {
        Self::new(viewport.width, viewport.height, padding, reserved_footer)
    }

    /// Width text is laid out at
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.padding).max(1.0)
    }

    /// Height text may occupy before it overflows
    pub fn usable_height(&self) -> f32 {
        (self.height - self.padding - self.reserved_footer).max(0.0)
    }
}

/// One page of a topic
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page index within the topic (0-based)
    pub index: usize,
    /// Logical lines on this page, never empty
    pub lines: Vec<LogicalLine>,
    /// A single line taller than the budget
    pub overflow: bool,
}

impl Page {
    fn new(index: usize, lines: Vec<LogicalLine>, overflow: bool) -> Self {
        Self {
            index,
            lines,
            overflow,
        }
    }

    /// Page text as handed to the renderer
    pub fn text(&self) -> String {
        join_lines(&self.lines)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

fn overflow_page(pages: &mut Vec<Page>, lines: Vec<LogicalLine>, height: f32, budget: f32) {
    let chars = lines.iter().map(|l| l.text.chars().count()).sum();
    log::warn!(
        "page {} overflows: {}",
        pages.len() + 1,
        Error::OversizedLine {
            chars,
            height,
            budget
        }
    );
    pages.push(Page::new(pages.len(), lines, true));
}

/// Split logical lines into pages that fit `budget`.
///
/// Returns no pages for no lines. Fails only if the measurer does; partial
/// results are discarded in that case.
pub fn paginate<M: Measurer + ?Sized>(
    lines: &[LogicalLine],
    budget: &PageBudget,
    measurer: &mut M,
    style: &StyleProfile,
) -> Result<Vec<Page>> {
    let limit = budget.usable_height();
    let width = budget.content_width();

    let mut pages = Vec::new();
    let mut current: Vec<LogicalLine> = Vec::new();

    for line in lines {
        current.push(line.clone());
        let height = measurer.measure(&join_lines(&current), width, style)?;
        if height <= limit {
            continue;
        }

        if current.len() == 1 {
            // Alone and still too tall
            overflow_page(&mut pages, std::mem::take(&mut current), height, limit);
            continue;
        }

        if let Some(moved) = current.pop() {
            pages.push(Page::new(pages.len(), std::mem::take(&mut current), false));

            let alone = measurer.measure(&moved.text, width, style)?;
            if alone > limit {
                overflow_page(&mut pages, vec![moved], alone, limit);
            } else {
                current.push(moved);
            }
        }
    }

    if !current.is_empty() {
        pages.push(Page::new(pages.len(), current, false));
    }

    Ok(pages)
}

/// Split raw topic text into logical lines and paginate them
pub fn paginate_text<M: Measurer + ?Sized>(
    text: &str,
    budget: &PageBudget,
    measurer: &mut M,
    style: &StyleProfile,
) -> Result<Vec<Page>> {
    paginate(&logical_lines(text), budget, measurer, style)
}
