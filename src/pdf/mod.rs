//! # PDF Writer
//!
//! Walks the laid-out box tree and writes a PDF 1.7 file by hand.
//!
//! ```text
//! %PDF-1.7
//! 1 0 obj Catalog          2 0 obj Pages
//! 3 0 obj Helvetica        4 0 obj Helvetica-Bold
//! n 0 obj ExtGState ...    (one per distinct alpha)
//! n 0 obj embedded fonts   (5 objects per face)
//! n 0 obj image XObjects   (plus an SMask for translucent pixels)
//! n 0 obj content stream, page dictionary (per page)
//! xref / trailer / %%EOF
//! ```
//!
//! What gets drawn:
//!
//! - Solid frame fills, with alpha through an ExtGState `/ca` and rounded
//!   corners approximated by Bézier arcs.
//! - Image frame fills, scaled to cover the box and centered, for URLs the
//!   caller registered in an [`ImageRegistry`]. Unregistered URLs are
//!   skipped with a warning.
//! - Clipping frames wrap their children in a clip path.
//! - Text lines. A family found in the writer's [`FontRegistry`] is
//!   embedded as a TrueType CID font and aligned with its real advances, so
//!   the page matches what [`crate::font::MetricsMeasurer`] measured during
//!   layout. Anything else is set in standard Helvetica with WinAnsi
//!   encoding and aligned by the estimate.
//!
//! Layout coordinates have the origin at the top-left with y growing down.
//! PDF user space starts bottom-left with y growing up, so every y is
//! flipped against the page height.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use log::{debug, warn};
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{PenError, Result};
use crate::font::{parse_weight, FontKey, FontMetrics, FontRegistry};
use crate::image_loader::{ImagePixelData, ImageRegistry, JpegColorSpace, LoadedImage};
use crate::layout::{LayoutBox, Page};
use crate::model::{Fill, Frame, Node, Text};
use crate::style::{Color, TextAlign};
use crate::text::EstimateConfig;

/// Object ids fixed by the writer.
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;

/// Fraction of the font size between the top of a Helvetica line and its
/// baseline.
const HELVETICA_ASCENT: f64 = 0.718;

/// Bézier control point distance for a quarter circle.
const KAPPA: f64 = 0.5522847498;

pub struct PdfWriter<'a> {
    compress: bool,
    estimate: EstimateConfig,
    fonts: Option<&'a FontRegistry>,
    images: Option<&'a ImageRegistry>,
}

impl Default for PdfWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered face that at least one text node is drawn with.
struct EmbeddedFont<'a> {
    key: &'a FontKey,
    metrics: &'a FontMetrics,
    used: BTreeSet<char>,
}

/// Resources collected while the content streams are written. Alphas
/// become `/GS{i}` ExtGStates, faces `/C{i}` fonts, images `/Im{i}`
/// XObjects.
#[derive(Default)]
struct Resources<'a> {
    alphas: Vec<u8>,
    fonts: Vec<EmbeddedFont<'a>>,
    images: Vec<(String, &'a LoadedImage)>,
}

impl<'a> Resources<'a> {
    /// Resource name for `alpha`, registering it on first use.
    fn alpha_name(&mut self, alpha: f64) -> String {
        let key = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        let index = match self.alphas.iter().position(|a| *a == key) {
            Some(i) => i,
            None => {
                self.alphas.push(key);
                self.alphas.len() - 1
            }
        };
        format!("GS{index}")
    }

    fn font_name(&mut self, key: &'a FontKey, metrics: &'a FontMetrics, text: &str) -> String {
        let index = match self.fonts.iter().position(|f| f.key == key) {
            Some(i) => i,
            None => {
                self.fonts.push(EmbeddedFont {
                    key,
                    metrics,
                    used: BTreeSet::new(),
                });
                self.fonts.len() - 1
            }
        };
        self.fonts[index].used.extend(text.chars().filter(|c| *c != '\n'));
        format!("C{index}")
    }

    fn image_name(&mut self, url: &str, image: &'a LoadedImage) -> String {
        let index = match self.images.iter().position(|(u, _)| u == url) {
            Some(i) => i,
            None => {
                self.images.push((url.to_string(), image));
                self.images.len() - 1
            }
        };
        format!("Im{index}")
    }
}

impl<'a> PdfWriter<'a> {
    pub fn new() -> Self {
        Self {
            compress: true,
            estimate: EstimateConfig::default(),
            fonts: None,
            images: None,
        }
    }

    /// Toggle zlib compression of content streams.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Ratios used to estimate Helvetica line widths for centered and
    /// right-aligned text.
    pub fn with_estimate(mut self, estimate: EstimateConfig) -> Self {
        self.estimate = estimate;
        self
    }

    /// Faces to embed for text whose family they match.
    pub fn with_fonts(mut self, fonts: &'a FontRegistry) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Decoded images for image fills, keyed by URL.
    pub fn with_images(mut self, images: &'a ImageRegistry) -> Self {
        self.images = Some(images);
        self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[Page<'_>]) -> Result<Vec<u8>> {
        // Content first, so every resource is known before the resource
        // dictionaries are written.
        let mut resources = Resources::default();
        let mut streams = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let mut stream = String::new();
            self.write_box(&mut stream, &page.root, page.height, &mut resources)
                .map_err(|e| match e {
                    PenError::Render(msg) => PenError::Render(format!("page {index}: {msg}")),
                    other => other,
                })?;
            streams.push(stream);
        }

        // objects[0] is the free-list head and never written
        let mut objects: Vec<Vec<u8>> = vec![Vec::new(); 5];
        objects[REGULAR_FONT_ID] = standard_font("Helvetica");
        objects[BOLD_FONT_ID] = standard_font("Helvetica-Bold");

        let mut state_refs = String::new();
        for (i, alpha) in resources.alphas.iter().enumerate() {
            let id = objects.len();
            let ca = *alpha as f64 / 255.0;
            objects.push(format!("<< /Type /ExtGState /ca {ca:.3} /CA {ca:.3} >>").into_bytes());
            let _ = write!(state_refs, "/GS{i} {id} 0 R ");
        }

        let mut font_refs = format!("/F0 {REGULAR_FONT_ID} 0 R /F1 {BOLD_FONT_ID} 0 R");
        for (i, font) in resources.fonts.iter().enumerate() {
            let id = write_embedded_font(&mut objects, font);
            let _ = write!(font_refs, " /C{i} {id} 0 R");
        }

        let mut image_refs = String::new();
        for (i, (_, image)) in resources.images.iter().enumerate() {
            let id = write_image_xobject(&mut objects, image);
            let _ = write!(image_refs, "/Im{i} {id} 0 R ");
        }

        let mut resource_dict = format!("/Font << {font_refs} >>");
        if !state_refs.is_empty() {
            let _ = write!(resource_dict, " /ExtGState << {} >>", state_refs.trim_end());
        }
        if !image_refs.is_empty() {
            let _ = write!(resource_dict, " /XObject << {} >>", image_refs.trim_end());
        }

        let mut page_ids = Vec::with_capacity(pages.len());
        for (page, stream) in pages.iter().zip(&streams) {
            let content_id = objects.len();
            objects.push(self.content_object(stream.as_bytes()));

            let page_id = objects.len();
            objects.push(
                format!(
                    "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {content_id} 0 R /Resources << {resource_dict} >> >>",
                    page.width, page.height
                )
                .into_bytes(),
            );
            page_ids.push(page_id);
        }

        objects[CATALOG_ID] = format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").into_bytes();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        objects[PAGES_ID] = format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            page_ids.len()
        )
        .into_bytes();

        let info_id = objects.len();
        objects.push(b"<< /Producer (penpdf) >>".to_vec());

        let bytes = serialize(&objects, info_id);
        debug!(
            "wrote {} page(s), {} object(s), {} embedded font(s), {} image(s), {} bytes",
            pages.len(),
            objects.len() - 1,
            resources.fonts.len(),
            resources.images.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn content_object(&self, content: &[u8]) -> Vec<u8> {
        if self.compress {
            stream_object("", &compress_to_vec_zlib(content, 6), true)
        } else {
            stream_object("", content, false)
        }
    }

    /// Draw one box and its subtree, depth first.
    fn write_box(
        &self,
        stream: &mut String,
        b: &LayoutBox<'_>,
        page_height: f64,
        resources: &mut Resources<'a>,
    ) -> Result<()> {
        match b.node {
            Node::Frame(frame) => {
                self.write_frame_fill(stream, b, frame, page_height, resources)?;

                let clip = frame.clip && !b.children.is_empty();
                if clip {
                    stream.push_str("q\n");
                    write_box_path(stream, b, frame.corner_radius, page_height);
                    stream.push_str("W n\n");
                }
                for child in &b.children {
                    self.write_box(stream, child, page_height, resources)?;
                }
                if clip {
                    stream.push_str("Q\n");
                }
                Ok(())
            }
            Node::Text(text) => self.write_text(stream, b, text, page_height, resources),
        }
    }

    fn write_frame_fill(
        &self,
        stream: &mut String,
        b: &LayoutBox<'_>,
        frame: &Frame,
        page_height: f64,
        resources: &mut Resources<'a>,
    ) -> Result<()> {
        if b.width <= 0.0 || b.height <= 0.0 {
            return Ok(());
        }
        match &frame.fill {
            None => Ok(()),
            Some(Fill::Image {
                url,
                opacity,
                enabled,
                ..
            }) => {
                if !*enabled {
                    return Ok(());
                }
                match self.images.and_then(|images| images.get(url)) {
                    Some(image) => {
                        let name = resources.image_name(url, image);
                        // 0 means unset
                        let state = (*opacity > 0.0 && *opacity < 1.0)
                            .then(|| resources.alpha_name(*opacity));
                        write_cover_image(stream, b, frame, image, &name, state.as_deref(), page_height);
                    }
                    None => warn!("frame {:?}: image {url:?} not registered, skipping", frame.id),
                }
                Ok(())
            }
            Some(Fill::Solid { color }) => {
                let color = parse_color(color, &frame.id)?;
                if color.a <= 0.0 {
                    return Ok(());
                }

                stream.push_str("q\n");
                if color.a < 1.0 {
                    let _ = writeln!(stream, "/{} gs", resources.alpha_name(color.a));
                }
                let (r, g, bl) = color.unit_rgb();
                let _ = writeln!(stream, "{r:.3} {g:.3} {bl:.3} rg");
                write_box_path(stream, b, frame.corner_radius, page_height);
                stream.push_str("f\nQ\n");
                Ok(())
            }
        }
    }

    fn write_text(
        &self,
        stream: &mut String,
        b: &LayoutBox<'_>,
        text: &Text,
        page_height: f64,
        resources: &mut Resources<'a>,
    ) -> Result<()> {
        if text.content.is_empty() {
            return Ok(());
        }

        let color = if text.fill.is_empty() {
            Color::BLACK
        } else {
            parse_color(&text.fill, &text.id)?
        };
        let italic = matches!(text.font_style.as_str(), "italic" | "oblique");
        let face = self.fonts.and_then(|fonts| {
            fonts.resolve_face(&text.font_family, parse_weight(&text.font_weight), italic)
        });

        let size = text.font_size;
        let (font, ascent) = match face {
            Some((key, metrics)) => (
                resources.font_name(key, metrics, &text.content),
                metrics.ascender as f64 / metrics.units_per_em as f64,
            ),
            None if is_bold(&text.font_weight) => ("F1".to_string(), HELVETICA_ASCENT),
            None => ("F0".to_string(), HELVETICA_ASCENT),
        };
        let line_height = size * if text.line_height > 0.0 { text.line_height } else { 1.2 };
        // Half-leading above the glyphs, then the ascent down to the baseline
        let baseline_offset = (line_height - size) / 2.0 + size * ascent;

        stream.push_str("q\n");
        if color.a < 1.0 {
            let _ = writeln!(stream, "/{} gs", resources.alpha_name(color.a));
        }
        let (r, g, bl) = color.unit_rgb();
        let _ = write!(stream, "BT\n/{font} {size:.1} Tf\n{r:.3} {g:.3} {bl:.3} rg\n");
        if text.letter_spacing != 0.0 {
            let _ = writeln!(stream, "{:.2} Tc", text.letter_spacing);
        }

        for (i, line) in text.content.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let (line_width, encoded) = match face {
                Some((_, metrics)) => (
                    metrics.string_width(line, size)
                        + line.chars().count() as f64 * text.letter_spacing,
                    encode_glyphs(line, metrics),
                ),
                None => (
                    self.line_width(line, size, text.letter_spacing),
                    format!("({})", encode_winansi(line)),
                ),
            };
            let x = match text.text_align {
                TextAlign::Left => b.x,
                TextAlign::Center => b.x + (b.width - line_width) / 2.0,
                TextAlign::Right => b.x + b.width - line_width,
            };
            let y = page_height - (b.y + i as f64 * line_height + baseline_offset);
            let _ = writeln!(stream, "1 0 0 1 {x:.2} {y:.2} Tm\n{encoded} Tj");
        }

        stream.push_str("ET\nQ\n");
        Ok(())
    }

    fn line_width(&self, line: &str, font_size: f64, letter_spacing: f64) -> f64 {
        let chars = line.chars().count() as f64;
        chars * font_size * self.estimate.char_width_ratio + chars * letter_spacing
    }
}

/// Draw `image` scaled to cover the box, centered. Overflow is only cut
/// off when the frame clips.
fn write_cover_image(
    stream: &mut String,
    b: &LayoutBox<'_>,
    frame: &Frame,
    image: &LoadedImage,
    name: &str,
    state: Option<&str>,
    page_height: f64,
) {
    if image.width_px == 0 || image.height_px == 0 {
        return;
    }
    let (iw, ih) = (image.width_px as f64, image.height_px as f64);
    let scale = (b.width / iw).max(b.height / ih);
    let (dw, dh) = (iw * scale, ih * scale);
    let dx = b.x - (dw - b.width) / 2.0;
    let dy = b.y - (dh - b.height) / 2.0;

    stream.push_str("q\n");
    if frame.clip {
        write_box_path(stream, b, frame.corner_radius, page_height);
        stream.push_str("W n\n");
    }
    if let Some(state) = state {
        let _ = writeln!(stream, "/{state} gs");
    }
    let _ = writeln!(
        stream,
        "{dw:.2} 0 0 {dh:.2} {dx:.2} {:.2} cm\n/{name} Do\nQ",
        page_height - dy - dh
    );
}

/// A stream object. `extra` goes into the dictionary after `/Length`.
fn stream_object(extra: &str, data: &[u8], flate: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 64);
    let filter = if flate { " /Filter /FlateDecode" } else { "" };
    let _ = write!(out, "<< /Length {}{extra}{filter} >>\nstream\n", data.len());
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

/// Append the image (and its SMask) and return the image's object id.
fn write_image_xobject(objects: &mut Vec<Vec<u8>>, image: &LoadedImage) -> usize {
    let (w, h) = (image.width_px, image.height_px);
    match &image.pixel_data {
        ImagePixelData::Jpeg { data, color_space } => {
            let color_space = match color_space {
                JpegColorSpace::DeviceRGB => "/DeviceRGB",
                JpegColorSpace::DeviceGray => "/DeviceGray",
            };
            let mut obj = Vec::with_capacity(data.len() + 160);
            let _ = write!(
                obj,
                "<< /Type /XObject /Subtype /Image /Width {w} /Height {h} \
                 /ColorSpace {color_space} /BitsPerComponent 8 /Filter /DCTDecode \
                 /Length {} >>\nstream\n",
                data.len()
            );
            obj.extend_from_slice(data);
            obj.extend_from_slice(b"\nendstream");
            objects.push(obj);
            objects.len() - 1
        }
        ImagePixelData::Decoded { rgb, alpha } => {
            let smask = alpha.as_ref().map(|alpha| {
                objects.push(stream_object(
                    &format!(
                        " /Type /XObject /Subtype /Image /Width {w} /Height {h} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8"
                    ),
                    &compress_to_vec_zlib(alpha, 6),
                    true,
                ));
                format!(" /SMask {} 0 R", objects.len() - 1)
            });
            objects.push(stream_object(
                &format!(
                    " /Type /XObject /Subtype /Image /Width {w} /Height {h} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8{}",
                    smask.unwrap_or_default()
                ),
                &compress_to_vec_zlib(rgb, 6),
                true,
            ));
            objects.len() - 1
        }
    }
}

/// Append the five objects of an embedded TrueType face (FontFile2,
/// FontDescriptor, CIDFontType2, ToUnicode, Type0) and return the id of
/// the Type0 font.
fn write_embedded_font(objects: &mut Vec<Vec<u8>>, font: &EmbeddedFont<'_>) -> usize {
    let metrics = font.metrics;
    let name = sanitize_font_name(font.key);
    let scaled = |v: i16| metrics.to_pdf_units(v as f64).round() as i32;

    let length1 = format!(" /Length1 {}", metrics.data.len());
    objects.push(stream_object(&length1, &compress_to_vec_zlib(&metrics.data, 6), true));
    let fontfile_id = objects.len() - 1;

    let [x_min, y_min, x_max, y_max] = metrics.bbox;
    objects.push(
        format!(
            "<< /Type /FontDescriptor /FontName /{name} /Flags 4 \
             /FontBBox [{} {} {} {}] /ItalicAngle {} /Ascent {} /Descent {} \
             /CapHeight {} /StemV {} /FontFile2 {fontfile_id} 0 R >>",
            scaled(x_min),
            scaled(y_min),
            scaled(x_max),
            scaled(y_max),
            if font.key.italic { -12 } else { 0 },
            scaled(metrics.ascender),
            scaled(metrics.descender),
            scaled(metrics.ascender),
            if font.key.weight >= 700 { 120 } else { 80 },
        )
        .into_bytes(),
    );
    let descriptor_id = objects.len() - 1;

    let glyphs = used_glyphs(font);
    objects.push(
        format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{name} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {descriptor_id} 0 R /DW {} /W {} /CIDToGIDMap /Identity >>",
            metrics.to_pdf_units(metrics.default_advance as f64).round() as u32,
            build_w_array(&glyphs),
        )
        .into_bytes(),
    );
    let cidfont_id = objects.len() - 1;

    let cmap = build_tounicode_cmap(&glyphs, &name);
    objects.push(stream_object("", &compress_to_vec_zlib(cmap.as_bytes(), 6), true));
    let tounicode_id = objects.len() - 1;

    objects.push(
        format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{name} /Encoding /Identity-H \
             /DescendantFonts [{cidfont_id} 0 R] /ToUnicode {tounicode_id} 0 R >>"
        )
        .into_bytes(),
    );
    objects.len() - 1
}

/// `(glyph id, char, width in 1/1000 em)` for every used char the face
/// has, ordered by glyph id.
fn used_glyphs(font: &EmbeddedFont<'_>) -> Vec<(u16, char, u32)> {
    let metrics = font.metrics;
    let mut glyphs: Vec<(u16, char, u32)> = font
        .used
        .iter()
        .filter_map(|&ch| {
            let gid = metrics.glyph_ids.get(&ch).copied()?;
            let advance = metrics.advance_widths.get(&ch).copied().unwrap_or(0);
            Some((gid, ch, metrics.to_pdf_units(advance as f64).round() as u32))
        })
        .collect();
    glyphs.sort_by_key(|(gid, ch, _)| (*gid, *ch));
    glyphs.dedup_by_key(|(gid, _, _)| *gid);
    glyphs
}

/// `/W` array with one `gid [width]` entry per glyph.
fn build_w_array(glyphs: &[(u16, char, u32)]) -> String {
    let mut out = String::from("[");
    for (gid, _, width) in glyphs {
        let _ = write!(out, " {gid} [{width}]");
    }
    out.push_str(" ]");
    out
}

/// ToUnicode CMap so text can be extracted and copied.
fn build_tounicode_cmap(glyphs: &[(u16, char, u32)], font_name: &str) -> String {
    let mut cmap = String::new();
    cmap.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
    cmap.push_str("/CIDSystemInfo\n<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    let _ = writeln!(cmap, "/CMapName /{font_name}-UTF16 def");
    cmap.push_str("/CMapType 2 def\n1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    // at most 100 entries per bfchar block
    for chunk in glyphs.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, ch, _) in chunk {
            let _ = writeln!(cmap, "<{gid:04X}> <{:04X}>", *ch as u32);
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

/// PDF name for an embedded face: the family without spaces or
/// punctuation, plus weight and slant suffixes.
fn sanitize_font_name(key: &FontKey) -> String {
    let mut name: String = key
        .family
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        name.push_str("CustomFont");
    }
    if key.weight >= 700 {
        name.push_str("-Bold");
    }
    if key.italic {
        name.push_str("-Italic");
    }
    name
}

/// Hex string of big-endian glyph ids for an Identity-H font.
fn encode_glyphs(line: &str, metrics: &FontMetrics) -> String {
    let mut out = String::with_capacity(line.len() * 4 + 2);
    out.push('<');
    for ch in line.chars() {
        let _ = write!(out, "{:04X}", metrics.glyph_id(ch));
    }
    out.push('>');
    out
}

fn standard_font(base: &str) -> Vec<u8> {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
        .into_bytes()
}

fn is_bold(weight: &str) -> bool {
    parse_weight(weight) >= 600
}

fn parse_color(hex: &str, node: &str) -> Result<Color> {
    Color::parse_hex(hex).map_err(|e| PenError::Render(format!("node {node:?}: {e}")))
}

/// Append the outline of `b` in PDF coordinates: a plain rectangle, or a
/// rounded one when `radius` is positive.
fn write_box_path(stream: &mut String, b: &LayoutBox<'_>, radius: f64, page_height: f64) {
    let (x, w, h) = (b.x, b.width, b.height);
    let y = page_height - b.y - h;

    let r = radius.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        let _ = writeln!(stream, "{x:.2} {y:.2} {w:.2} {h:.2} re");
        return;
    }

    let c = r * KAPPA;
    let (right, top) = (x + w, y + h);
    let _ = writeln!(stream, "{:.2} {y:.2} m", x + r);
    let _ = writeln!(stream, "{:.2} {y:.2} l", right - r);
    let _ = writeln!(
        stream,
        "{:.2} {y:.2} {right:.2} {:.2} {right:.2} {:.2} c",
        right - r + c,
        y + r - c,
        y + r
    );
    let _ = writeln!(stream, "{right:.2} {:.2} l", top - r);
    let _ = writeln!(
        stream,
        "{right:.2} {:.2} {:.2} {top:.2} {:.2} {top:.2} c",
        top - r + c,
        right - r + c,
        right - r
    );
    let _ = writeln!(stream, "{:.2} {top:.2} l", x + r);
    let _ = writeln!(
        stream,
        "{:.2} {top:.2} {x:.2} {:.2} {x:.2} {:.2} c",
        x + r - c,
        top - r + c,
        top - r
    );
    let _ = writeln!(stream, "{x:.2} {:.2} l", y + r);
    let _ = writeln!(
        stream,
        "{x:.2} {:.2} {:.2} {y:.2} {:.2} {y:.2} c",
        y + r - c,
        x + r - c,
        x + r
    );
    stream.push_str("h\n");
}

/// Encode a line as the body of a PDF literal string in WinAnsiEncoding.
/// Characters outside the encoding become `?`.
fn encode_winansi(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for ch in line.chars() {
        match to_winansi(ch).unwrap_or(b'?') {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            byte @ 0x20..=0x7E => out.push(byte as char),
            byte => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

/// Windows-1252 bytes 0x80..=0x9F and the code points they stand for.
const WINANSI_SPECIALS: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('•', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

fn to_winansi(ch: char) -> Option<u8> {
    match ch as u32 {
        cp @ (0x20..=0x7E | 0xA0..=0xFF) => Some(cp as u8),
        _ => WINANSI_SPECIALS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, byte)| *byte),
    }
}

/// Lay out objects, the xref table and the trailer.
fn serialize(objects: &[Vec<u8>], info_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets = vec![0usize; objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n");

    for (id, data) in objects.iter().enumerate().skip(1) {
        offsets[id] = output.len();
        let _ = write!(output, "{id} 0 obj\n");
        output.extend_from_slice(data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n0000000000 65535 f \n", objects.len());
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R /Info {info_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len()
    );

    output
}
