//! Fixed characters-per-line measurer

use crate::measure::{Measurer, StyleProfile};
use crate::{Error, Result};
use unicode_segmentation::UnicodeSegmentation;

/// Treats every grapheme as one cell of `char_width`.
///
/// A source line takes `ceil(graphemes / columns)` rows of `line_height`
/// (at least one); a blank line between paragraphs costs `paragraph_gap`.
/// The style profile is ignored. Deterministic, so it doubles as the test
/// fake for the paginator and assembler.
#[derive(Debug, Clone)]
pub struct GridMeasurer {
    pub char_width: f32,
    pub line_height: f32,
    pub paragraph_gap: f32,
    mounted: bool,
}

impl GridMeasurer {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
            paragraph_gap: 0.0,
            mounted: true,
        }
    }

    pub fn with_paragraph_gap(mut self, gap: f32) -> Self {
        self.paragraph_gap = gap;
        self
    }

    /// A measurer whose surface is not mounted yet
    pub fn unmounted(char_width: f32, line_height: f32) -> Self {
        Self {
            mounted: false,
            ..Self::new(char_width, line_height)
        }
    }

    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    /// Characters that fit on one row at `max_width`
    pub fn columns(&self, max_width: f32) -> usize {
        if self.char_width <= 0.0 {
            return usize::MAX;
        }
        ((max_width / self.char_width).floor() as usize).max(1)
    }
}

impl Measurer for GridMeasurer {
    fn measure(&mut self, text: &str, max_width: f32, _style: &StyleProfile) -> Result<f32> {
        if !self.mounted {
            return Err(Error::MeasurementUnavailable);
        }

        let columns = self.columns(max_width);
        let mut height = 0.0;
        for line in text.split('\n') {
            if line.trim().is_empty() {
                height += self.paragraph_gap;
                continue;
            }
            let cells = line.graphemes(true).count();
            let rows = cells.div_ceil(columns).max(1);
            height += rows as f32 * self.line_height;
        }
        Ok(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(m: &mut GridMeasurer, text: &str, width: f32) -> f32 {
        m.measure(text, width, &StyleProfile::default()).unwrap()
    }

    #[test]
    fn test_rows_per_line() {
        // 10 columns
        let mut m = GridMeasurer::new(10.0, 20.0);
        assert_eq!(measure(&mut m, "short", 100.0), 20.0);
        assert_eq!(measure(&mut m, "exactly 10", 100.0), 20.0);
        assert_eq!(measure(&mut m, "eleven char", 100.0), 40.0);
        assert_eq!(measure(&mut m, "a\nb", 100.0), 40.0);
    }

    #[test]
    fn test_paragraph_gap() {
        let mut m = GridMeasurer::new(10.0, 20.0).with_paragraph_gap(5.0);
        assert_eq!(measure(&mut m, "a\n\nb", 100.0), 45.0);
    }

    #[test]
    fn test_graphemes_not_bytes() {
        let mut m = GridMeasurer::new(10.0, 20.0);
        // 10 graphemes, 30 bytes
        let text = "e\u{301}".repeat(10);
        assert_eq!(measure(&mut m, &text, 100.0), 20.0);
    }

    #[test]
    fn test_unmounted() {
        let mut m = GridMeasurer::unmounted(10.0, 20.0);
        let err = m.measure("x", 100.0, &StyleProfile::default()).unwrap_err();
        assert!(matches!(err, Error::MeasurementUnavailable));
        m.set_mounted(true);
        assert_eq!(measure(&mut m, "x", 100.0), 20.0);
    }

    #[test]
    fn test_narrow_width_still_one_column() {
        let mut m = GridMeasurer::new(10.0, 20.0);
        assert_eq!(m.columns(3.0), 1);
        assert_eq!(measure(&mut m, "abc", 3.0), 60.0);
    }
}
