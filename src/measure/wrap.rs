//! Closed-form measurement by greedy word wrapping

use crate::content::BlockKind;
use crate::measure::font::{FontLibrary, FontMetrics};
use crate::measure::{Measurer, StyleProfile};
use crate::Result;
use unicode_linebreak::linebreaks;
use unicode_segmentation::UnicodeSegmentation;

/// Indentation width per list level
pub const INDENT_WIDTH: f32 = 24.0;

/// Estimates rendered height from per-character advances.
///
/// Each source line is wrapped at UAX #14 break opportunities; a segment
/// wider than the whole line is broken between grapheme clusters. Headings
/// use the style's heading scale, list items lose their indentation from the
/// available width.
#[derive(Debug, Clone, Default)]
pub struct MetricsMeasurer {
    fonts: FontLibrary,
}

impl MetricsMeasurer {
    pub fn new(fonts: FontLibrary) -> Self {
        Self { fonts }
    }

    /// Measurer with a single metrics table for every family
    pub fn with_metrics(metrics: FontMetrics) -> Self {
        Self::new(FontLibrary::new(metrics))
    }

    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }

    /// Number of rows `line` wraps into
    pub fn wrap_rows(
        &self,
        line: &str,
        max_width: f32,
        metrics: &FontMetrics,
        font_size: f32,
    ) -> usize {
        let width_of = |s: &str| -> f32 {
            s.graphemes(true)
                .map(|g| metrics.grapheme_width(g, font_size))
                .sum()
        };

        let mut rows = 1;
        let mut x: f32 = 0.0;
        let mut start = 0;

        for (end, _) in linebreaks(line) {
            let segment = &line[start..end];
            start = end;

            // Trailing spaces may hang past the edge
            let content = segment.trim_end();
            let content_width = width_of(content);
            let trailing_width = width_of(&segment[content.len()..]);

            if x > 0.0 && x + content_width > max_width {
                rows += 1;
                x = 0.0;
            }

            if content_width > max_width {
                // Emergency break inside the segment
                for grapheme in content.graphemes(true) {
                    let w = metrics.grapheme_width(grapheme, font_size);
                    if x > 0.0 && x + w > max_width {
                        rows += 1;
                        x = 0.0;
                    }
                    x += w;
                }
            } else {
                x += content_width;
            }
            x += trailing_width;
        }

        rows
    }
}

impl Measurer for MetricsMeasurer {
    fn measure(&mut self, text: &str, max_width: f32, style: &StyleProfile) -> Result<f32> {
        let metrics = self.fonts.get(&style.font_family);
        let mut height = 0.0;

        for line in text.split('\n') {
            if line.trim().is_empty() {
                height += style.paragraph_gap_px();
                continue;
            }

            let kind = BlockKind::classify(line);
            let multiplier = kind.line_height_multiplier(style.heading_scale);
            let width = match kind {
                BlockKind::ListItem { indent_level, .. } => {
                    (max_width - indent_level as f32 * INDENT_WIDTH).max(1.0)
                }
                _ => max_width,
            };

            let rows = self.wrap_rows(line, width, metrics, style.font_size * multiplier);
            height += rows as f32 * style.line_height_px() * multiplier;
        }

        Ok(height)
    }
}
