//! # penpdf
//!
//! Lays out `.pen` design documents and writes them as PDF.
//!
//! A `.pen` file is a JSON tree of frames and text, one top-level frame per
//! page, with a table of named variables. The interesting part is the layout
//! engine: a single-axis subset of flexbox (fixed and fill sizing, gap,
//! justify, align, intrinsic sizing through text measurement) that turns the
//! tree into absolutely positioned boxes.
//!
//! ## Architecture
//!
//! ```text
//! JSON
//!   ↓
//! [model]    Document tree (serde)
//!   ↓
//! [resolve]  $variable references → literal colors
//!   ↓
//! [layout]   Flex layout, one Page per top-level frame
//!   ↓        (asks a [text] TextMeasurer for text sizes)
//! [pdf]      PDF bytes, embedding [font] faces and [image_loader] images
//! ```
//!
//! penpdf does no I/O. Fonts and images arrive as bytes the caller
//! registered in [`Assets`].
//!
//! The library never installs a logger; it emits records through `log`.

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod resolve;
pub mod style;
pub mod text;

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

pub use error::{PenError, Result};
pub use font::{FontRegistry, MetricsMeasurer};
pub use image_loader::ImageRegistry;
pub use layout::{LayoutBox, LayoutEngine, Page};
pub use model::{Document, Node};
pub use text::{EstimateConfig, EstimatingMeasurer, TextMeasurer};

use model::Variable;
use pdf::PdfWriter;

/// Options for [`render`] and [`render_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Comma-separated page names to keep. `None` or empty keeps all.
    pub pages: Option<String>,
    /// Compress PDF content streams.
    pub compress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pages: None,
            compress: true,
        }
    }
}

/// Parse `.pen` JSON into a [`Document`].
pub fn parse(json: &str) -> Result<Document> {
    Document::from_json(json)
}

/// Fonts and images supplied by the caller, keyed the way the document
/// refers to them.
#[derive(Debug, Default)]
pub struct Assets {
    pub fonts: FontRegistry,
    pub images: ImageRegistry,
}

/// Render a document to PDF bytes.
///
/// Resolves variables in place, applies the page filter, lays the pages out
/// with `measurer` (or the built-in estimate when `None`) and writes the PDF.
/// Text is set in Helvetica and image fills are skipped; use
/// [`render_with_assets`] to supply fonts and images.
pub fn render(
    document: &mut Document,
    options: &RenderOptions,
    measurer: Option<&dyn TextMeasurer>,
) -> Result<Vec<u8>> {
    run(document, options, measurer, PdfWriter::new())
}

/// Render a document, measuring and drawing text with the registered fonts
/// and drawing image fills from the registered images. Families that are
/// not registered are estimated and set in Helvetica.
pub fn render_with_assets(
    document: &mut Document,
    options: &RenderOptions,
    assets: &Assets,
) -> Result<Vec<u8>> {
    let measurer = MetricsMeasurer::new(&assets.fonts);
    let writer = PdfWriter::new()
        .with_fonts(&assets.fonts)
        .with_images(&assets.images);
    run(document, options, Some(&measurer), writer)
}

fn run(
    document: &mut Document,
    options: &RenderOptions,
    measurer: Option<&dyn TextMeasurer>,
    writer: PdfWriter<'_>,
) -> Result<Vec<u8>> {
    resolve::resolve(document)?;

    if let Some(names) = options.pages.as_deref().filter(|n| !n.trim().is_empty()) {
        document.retain_pages(names)?;
    }

    let pages = LayoutEngine::new().layout(document, measurer)?;
    let bytes = writer.with_compression(options.compress).write(&pages)?;

    info!("rendered {} page(s), {} bytes", pages.len(), bytes.len());
    Ok(bytes)
}

/// Parse `.pen` JSON and render it with the estimating measurer.
pub fn render_json(json: &str, options: &RenderOptions) -> Result<Vec<u8>> {
    let mut document = parse(json)?;
    render(&mut document, options, Some(&EstimatingMeasurer::default()))
}

/// Size and name of one top-level frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub name: String,
    pub width: f64,
    pub height: f64,
}

/// What a document contains, without laying it out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub version: String,
    pub pages: Vec<PageSummary>,
    pub variables: BTreeMap<String, Variable>,
    /// Distinct font families used by text nodes, sorted.
    pub fonts: Vec<String>,
}

/// Summarise a document. Top-level nodes that aren't frames are not pages
/// and are left out.
pub fn info(document: &Document) -> DocumentInfo {
    let pages = document
        .children
        .iter()
        .filter_map(Node::as_frame)
        .map(|frame| PageSummary {
            name: frame.name.clone(),
            width: frame.width.value(),
            height: frame.height.value(),
        })
        .collect();

    let mut fonts: Vec<String> = model::collect_font_refs(document)
        .into_iter()
        .map(|f| f.family)
        .collect();
    fonts.sort();
    fonts.dedup();

    DocumentInfo {
        version: document.version.clone(),
        pages,
        variables: document.variables.clone().unwrap_or_default(),
        fonts,
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidateReport {
    pub page_count: usize,
    pub variable_count: usize,
}

/// Check that every variable reference resolves. Resolves in place.
pub fn validate(document: &mut Document) -> Result<ValidateReport> {
    resolve::resolve(document)?;
    Ok(ValidateReport {
        page_count: document.children.len(),
        variable_count: document.variables.as_ref().map_or(0, BTreeMap::len),
    })
}
