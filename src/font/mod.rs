//! # Font Metrics
//!
//! Real glyph advances for text measurement. Callers register TrueType /
//! OpenType data (however they obtained it) and hand a [`MetricsMeasurer`]
//! to the layout engine. Loading fonts from disk or the network is the
//! caller's job.
//!
//! Any family/weight that can't be resolved falls back to the estimate in
//! [`crate::text::estimate_text`], so measurement never fails.
//!
//! The same registry goes to the PDF writer, which embeds each face it draws
//! with so the page uses the widths layout measured.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::debug;

use crate::error::{PenError, Result};
use crate::text::{estimate_text, measure_lines, EstimateConfig, TextMeasurer};

/// Identifies one face in the registry.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontKey {
    /// Build a key from the string attributes used by .pen text nodes.
    pub fn from_attrs(family: &str, weight: &str, style: &str) -> Self {
        Self {
            family: family.to_string(),
            weight: parse_weight(weight),
            italic: matches!(style, "italic" | "oblique"),
        }
    }
}

/// Numeric weight for a .pen weight string (`"700"`, `"bold"`, `""`).
pub fn parse_weight(weight: &str) -> u32 {
    match weight.trim() {
        "bold" => 700,
        "" | "normal" | "regular" => 400,
        w => w.parse().unwrap_or(400),
    }
}

/// Metrics parsed from a TrueType/OpenType font via ttf-parser, plus the raw
/// font program for embedding.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub glyph_ids: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Font bounding box in font units: x_min, y_min, x_max, y_max.
    pub bbox: [i16; 4],
    pub data: Vec<u8>,
}

impl FontMetrics {
    /// Parse metrics from font data.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        // BMP is enough for the documents we lay out
        for code in 32u32..=0xFFFF {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                glyph_ids.insert(ch, glyph_id.0);
                if ch == ' ' {
                    default_advance = advance;
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        let bbox = face.global_bounding_box();

        Some(FontMetrics {
            units_per_em,
            advance_widths,
            glyph_ids,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            data: data.to_vec(),
        })
    }

    /// Glyph id for `ch`; 0 (`.notdef`) when the font has no glyph.
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.glyph_ids.get(&ch).copied().unwrap_or(0)
    }

    /// Scale a font-unit value to PDF glyph space (1000 units per em).
    pub fn to_pdf_units(&self, value: f64) -> f64 {
        value * 1000.0 / self.units_per_em as f64
    }

    /// Advance width of a character in pixels at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    pub fn string_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

#[cfg(test)]
impl FontMetrics {
    /// Two-glyph face: `i` (gid 1, 250 units) and `m` (gid 2, 750 units).
    pub(crate) fn synthetic() -> Self {
        let mut advance_widths = HashMap::new();
        advance_widths.insert('i', 250);
        advance_widths.insert('m', 750);
        let mut glyph_ids = HashMap::new();
        glyph_ids.insert('i', 1);
        glyph_ids.insert('m', 2);
        FontMetrics {
            units_per_em: 1000,
            advance_widths,
            glyph_ids,
            default_advance: 500,
            ascender: 800,
            descender: -200,
            bbox: [-50, -200, 900, 800],
            data: b"synthetic font program".to_vec(),
        }
    }
}

/// Registered faces keyed by family, weight and slant.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontMetrics>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font data under `family`/`weight`/`style`.
    pub fn register(&mut self, family: &str, weight: &str, style: &str, data: &[u8]) -> Result<()> {
        let metrics = FontMetrics::from_font_data(data).ok_or_else(|| {
            PenError::Font(format!(
                "could not parse font data for {family:?} ({weight} {style})"
            ))
        })?;
        self.fonts
            .insert(FontKey::from_attrs(family, weight, style), metrics);
        Ok(())
    }

    /// Look up a face, relaxing slant and then weight.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> Option<&FontMetrics> {
        self.resolve_face(family, weight, italic)
            .map(|(_, metrics)| metrics)
    }

    /// Like [`resolve`](Self::resolve), also returning the key of the face
    /// that matched.
    pub fn resolve_face(
        &self,
        family: &str,
        weight: u32,
        italic: bool,
    ) -> Option<(&FontKey, &FontMetrics)> {
        let snapped = if weight >= 600 { 700 } else { 400 };
        [
            (weight, italic),
            (weight, false),
            (snapped, italic),
            (snapped, false),
            (400, false),
        ]
        .into_iter()
        .find_map(|(weight, italic)| {
            self.fonts.get_key_value(&FontKey {
                family: family.to_string(),
                weight,
                italic,
            })
        })
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, key: FontKey, metrics: FontMetrics) {
        self.fonts.insert(key, metrics);
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// A [`TextMeasurer`] backed by registered font metrics.
///
/// Shareable across threads; the set of families already reported as
/// missing sits behind a mutex.
pub struct MetricsMeasurer<'a> {
    registry: &'a FontRegistry,
    estimate: EstimateConfig,
    reported: Mutex<HashSet<(String, u32)>>,
}

impl<'a> MetricsMeasurer<'a> {
    pub fn new(registry: &'a FontRegistry) -> Self {
        Self::with_estimate(registry, EstimateConfig::default())
    }

    pub fn with_estimate(registry: &'a FontRegistry, estimate: EstimateConfig) -> Self {
        Self {
            registry,
            estimate,
            reported: Mutex::new(HashSet::new()),
        }
    }

    pub fn registry(&self) -> &'a FontRegistry {
        self.registry
    }

    /// True the first time a missing family/weight is seen.
    fn first_miss(&self, family: &str, weight: u32) -> bool {
        match self.reported.lock() {
            Ok(mut reported) => reported.insert((family.to_string(), weight)),
            Err(poisoned) => poisoned.into_inner().insert((family.to_string(), weight)),
        }
    }
}

impl TextMeasurer for MetricsMeasurer<'_> {
    fn measure_text(
        &self,
        text: &str,
        font_family: &str,
        font_size: f64,
        font_weight: &str,
        max_width: f64,
    ) -> (f64, f64) {
        let weight = parse_weight(font_weight);
        match self.registry.resolve(font_family, weight, false) {
            Some(metrics) => measure_lines(
                text,
                font_size * self.estimate.line_height_ratio,
                max_width,
                |line| metrics.string_width(line, font_size),
            ),
            None => {
                if self.first_miss(font_family, weight) {
                    debug!("font {font_family:?} ({weight}) not registered, estimating text size");
                }
                estimate_text(text, font_size, max_width, &self.estimate)
            }
        }
    }
}
