//! Text measurement behind a capability trait
//!
//! The browser backs [`Measurer`] with an off-screen styled element (see the
//! `wasm` bridge). Native code and tests use the closed-form measurers here.

mod cache;
pub mod font;
mod grid;
mod wrap;

pub use cache::CachedMeasurer;
pub use font::FontMetrics;
pub use grid::GridMeasurer;
pub use wrap::MetricsMeasurer;

use crate::paginate::PageBudget;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Reports the rendered height of text.
///
/// Implementations must be deterministic for identical inputs within one
/// session. `&mut self` keeps use of the single measurement surface
/// sequential.
pub trait Measurer {
    /// Rendered height of `text` laid out at `max_width`, in the page budget's units.
    ///
    /// Returns [`crate::Error::MeasurementUnavailable`] when the surface is
    /// not mounted; callers must not guess a height.
    fn measure(&mut self, text: &str, max_width: f32, style: &StyleProfile) -> Result<f32>;

    /// Prepare for a pass at the given page budget
    fn calibrate(&mut self, _budget: &PageBudget) -> Result<()> {
        Ok(())
    }
}

impl<M: Measurer + ?Sized> Measurer for &mut M {
    fn measure(&mut self, text: &str, max_width: f32, style: &StyleProfile) -> Result<f32> {
        (**self).measure(text, max_width, style)
    }

    fn calibrate(&mut self, budget: &PageBudget) -> Result<()> {
        (**self).calibrate(budget)
    }
}

impl<M: Measurer + ?Sized> Measurer for Box<M> {
    fn measure(&mut self, text: &str, max_width: f32, style: &StyleProfile) -> Result<f32> {
        (**self).measure(text, max_width, style)
    }

    fn calibrate(&mut self, budget: &PageBudget) -> Result<()> {
        (**self).calibrate(budget)
    }
}

/// Typographic settings a page is rendered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleProfile {
    pub font_family: String,
    /// Font size in px
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    /// Gap between paragraphs in em
    pub paragraph_spacing: f32,
    /// Line height multiplier for level-1 headings
    pub heading_scale: f32,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            font_family: "Georgia, serif".to_string(),
            font_size: 16.0,
            line_height: 1.5,
            paragraph_spacing: 0.75,
            heading_scale: 1.6,
        }
    }
}

impl StyleProfile {
    /// Line height in px
    pub fn line_height_px(&self) -> f32 {
        self.font_size * self.line_height
    }

    /// Paragraph gap in px
    pub fn paragraph_gap_px(&self) -> f32 {
        self.font_size * self.paragraph_spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_profile_px() {
        let style = StyleProfile::default();
        assert_eq!(style.line_height_px(), 24.0);
        assert_eq!(style.paragraph_gap_px(), 12.0);
    }

    #[test]
    fn test_style_profile_from_partial_json() {
        let style: StyleProfile = serde_json::from_str(r#"{"fontSize": 20}"#).unwrap();
        assert_eq!(style.font_size, 20.0);
        assert_eq!(style.line_height, 1.5);
    }

    #[test]
    fn test_measurer_through_box() {
        let mut boxed: Box<dyn Measurer> = Box::new(GridMeasurer::new(10.0, 20.0));
        let height = boxed
            .measure("abc", 100.0, &StyleProfile::default())
            .unwrap();
        assert_eq!(height, 20.0);
    }
}
