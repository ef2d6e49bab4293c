//! # Image Loading and Decoding
//!
//! Image fills name their picture by URL. penpdf never fetches anything:
//! callers register the bytes for each URL in an [`ImageRegistry`], and the
//! PDF writer draws the fills it finds there. `data:image/...;base64,` URLs
//! can be registered straight from the URL itself.
//!
//! JPEG bytes pass through untouched (PDF reads them with DCTDecode). PNG and
//! WebP are decoded to RGB with a separate alpha channel for the SMask.

use std::collections::HashMap;
use std::io::Cursor;

use base64::Engine;
use log::debug;

use crate::error::{PenError, Result};

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// Pixel data in a form the PDF writer consumes directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// RGB pixels plus an optional alpha channel.
    Decoded {
        /// width * height * 3 bytes
        rgb: Vec<u8>,
        /// width * height bytes, `None` if fully opaque
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Images keyed by the URL that image fills use.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    images: HashMap<String, LoadedImage>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data` and store it under `url`.
    pub fn register(&mut self, url: &str, data: &[u8]) -> Result<()> {
        let image = decode_image_bytes(data)
            .map_err(|e| PenError::Image(format!("{url}: {e}")))?;
        debug!(
            "registered image {url} ({}x{})",
            image.width_px, image.height_px
        );
        self.images.insert(url.to_string(), image);
        Ok(())
    }

    /// Register a `data:image/...;base64,` URL under itself.
    pub fn register_data_uri(&mut self, url: &str) -> Result<()> {
        let data = decode_data_uri(url).map_err(PenError::Image)?;
        self.register(url, &data)
    }

    pub fn get(&self, url: &str) -> Option<&LoadedImage> {
        self.images.get(url)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn decode_data_uri(url: &str) -> std::result::Result<Vec<u8>, String> {
    let Some(rest) = url.strip_prefix("data:image/") else {
        return Err("not an image data URI".to_string());
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
    if !header.ends_with(";base64") {
        return Err("data URI is not base64-encoded".to_string());
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| format!("base64 decode error: {e}"))
}

/// Detect the format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) || is_webp(data) {
        decode_raster(data)
    } else {
        Err("unsupported image format (expected JPEG, PNG or WebP)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47])
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {e}"))?
        .into_dimensions()
        .map_err(|e| format!("failed to read JPEG dimensions: {e}"))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        // length(2) precision(1) height(2) width(2) components(1)
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG / WebP: decode to RGBA, split into RGB + alpha.
fn decode_raster(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("format detection error: {e}"))?
        .decode()
        .map_err(|e| format!("failed to decode image: {e}"))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}
