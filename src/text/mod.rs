//! # Text Measurement
//!
//! The layout engine never touches fonts directly. It asks a
//! [`TextMeasurer`] how big a run of text is and positions boxes from the
//! answer. Keeping this behind a trait lets tests lay out documents without
//! font files, and lets callers plug in real metrics (see
//! [`crate::font::MetricsMeasurer`]) when they have them.
//!
//! Positioning only needs a *stable* size, not a pixel-perfect one, so a
//! measurer must never fail. When it can't resolve a font it falls back to
//! [`estimate_text`], a proportional-width heuristic.

use serde::{Deserialize, Serialize};

/// Measures text for layout.
///
/// Measurers are shared by reference across layout runs, including runs on
/// other threads.
pub trait TextMeasurer: Send + Sync {
    /// Returns `(width, height)` of `text` set in the given font.
    ///
    /// `max_width <= 0` means unconstrained (no wrapping). Lines separated by
    /// `\n` are measured separately and their heights summed.
    fn measure_text(
        &self,
        text: &str,
        font_family: &str,
        font_size: f64,
        font_weight: &str,
        max_width: f64,
    ) -> (f64, f64);
}

/// Constants for the proportional-width text estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimateConfig {
    /// Average glyph advance as a fraction of the font size.
    pub char_width_ratio: f64,
    /// Line box height as a multiple of the font size.
    pub line_height_ratio: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

/// Estimate the size of `text` without any font data.
pub fn estimate_text(text: &str, font_size: f64, max_width: f64, config: &EstimateConfig) -> (f64, f64) {
    let char_width = font_size * config.char_width_ratio;
    measure_lines(text, font_size * config.line_height_ratio, max_width, |line| {
        line.chars().count() as f64 * char_width
    })
}

/// Shared line loop for all measurers: split on `\n`, wrap each line that
/// overflows `max_width` into `floor(width / max_width) + 1` visual lines,
/// and sum the heights. Returns `(widest line, total height)`.
pub(crate) fn measure_lines(
    text: &str,
    line_height: f64,
    max_width: f64,
    line_width: impl Fn(&str) -> f64,
) -> (f64, f64) {
    let mut widest = 0.0f64;
    let mut height = 0.0;

    for line in text.split('\n') {
        let w = line_width(line);
        if max_width > 0.0 && w > max_width {
            let wrapped = (w / max_width).floor() + 1.0;
            height += wrapped * line_height;
            widest = widest.max(max_width);
        } else {
            height += line_height;
            widest = widest.max(w);
        }
    }

    (widest, height)
}

/// A [`TextMeasurer`] that always estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatingMeasurer {
    config: EstimateConfig,
}

impl EstimatingMeasurer {
    pub fn new(config: EstimateConfig) -> Self {
        Self { config }
    }
}

impl TextMeasurer for EstimatingMeasurer {
    fn measure_text(
        &self,
        text: &str,
        _font_family: &str,
        font_size: f64,
        _font_weight: &str,
        max_width: f64,
    ) -> (f64, f64) {
        estimate_text(text, font_size, max_width, &self.config)
    }
}
