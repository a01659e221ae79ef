//! Font metrics for closed-form measurement

use rustc_hash::FxHashMap;

/// Per-character advance widths, measured at `size` px
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Font size the widths were measured at
    pub size: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 14px monospace: 8.41px advance
        Self::monospace(14.0, 8.41)
    }
}

impl FontMetrics {
    pub fn new(size: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            size,
            char_widths,
            default_width,
        }
    }

    /// Every character has the same advance
    pub fn monospace(size: f32, advance: f32) -> Self {
        Self {
            size,
            char_widths: vec![advance; 128],
            default_width: advance,
        }
    }

    /// Get width of a character at the measured size
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of a grapheme cluster at `font_size`
    pub fn grapheme_width(&self, grapheme: &str, font_size: f32) -> f32 {
        let scale = self.scale(font_size);
        if grapheme == "\t" {
            return self.default_width * 4.0 * scale;
        }
        if grapheme.chars().all(char::is_control) {
            return 0.0;
        }
        grapheme.chars().map(|c| self.width(c)).sum::<f32>() * scale
    }

    fn scale(&self, font_size: f32) -> f32 {
        if self.size > 0.0 {
            font_size / self.size
        } else {
            1.0
        }
    }
}

/// Metrics per font family, with a fallback for unknown families
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    fonts: FxHashMap<String, FontMetrics>,
    fallback: FontMetrics,
}

impl FontLibrary {
    pub fn new(fallback: FontMetrics) -> Self {
        Self {
            fonts: FxHashMap::default(),
            fallback,
        }
    }

    /// Set metrics for a family, replacing any previous entry
    pub fn set(&mut self, family: &str, metrics: FontMetrics) {
        self.fonts.insert(family.to_string(), metrics);
    }

    /// Get metrics for a family or the fallback
    pub fn get(&self, family: &str) -> &FontMetrics {
        self.fonts.get(family).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.fonts.contains_key(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_lookup() {
        let mut widths = vec![5.0; 128];
        widths['W' as usize] = 9.0;
        let metrics = FontMetrics::new(10.0, widths, 7.0);
        assert_eq!(metrics.width('W'), 9.0);
        assert_eq!(metrics.width('a'), 5.0);
        assert_eq!(metrics.width('é'), 7.0);
    }

    #[test]
    fn test_grapheme_width_scales() {
        let metrics = FontMetrics::monospace(10.0, 6.0);
        assert_eq!(metrics.grapheme_width("a", 20.0), 12.0);
        assert_eq!(metrics.grapheme_width("\t", 10.0), 24.0);
        assert_eq!(metrics.grapheme_width("\u{7}", 10.0), 0.0);
    }

    #[test]
    fn test_library_fallback() {
        let mut lib = FontLibrary::new(FontMetrics::monospace(10.0, 6.0));
        lib.set("Inter", FontMetrics::monospace(10.0, 5.0));
        assert_eq!(lib.get("Inter").default_width, 5.0);
        assert_eq!(lib.get("Comic Sans").default_width, 6.0);
        assert!(lib.contains("Inter"));
    }
}
