//! # Style Values
//!
//! The .pen format stores layout and typography choices as free-form
//! strings (`"vertical"`, `"space-between"`, `"#1A1A2EFF"`). This module
//! turns them into closed Rust types. Unknown keywords fall back to the
//! default variant instead of failing, matching how design tools emit
//! documents: an empty or unrecognised value means "start".

use serde::{Deserialize, Serialize};

/// Main axis of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutAxis {
    #[default]
    Horizontal,
    Vertical,
}

impl From<String> for LayoutAxis {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&str> for LayoutAxis {
    fn from(s: &str) -> Self {
        match s {
            "vertical" => LayoutAxis::Vertical,
            _ => LayoutAxis::Horizontal,
        }
    }
}

impl From<LayoutAxis> for String {
    fn from(axis: LayoutAxis) -> Self {
        match axis {
            LayoutAxis::Horizontal => "horizontal",
            LayoutAxis::Vertical => "vertical",
        }
        .to_string()
    }
}

/// How children are distributed along the main axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JustifyContent {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

impl From<String> for JustifyContent {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&str> for JustifyContent {
    fn from(s: &str) -> Self {
        match s {
            "center" => JustifyContent::Center,
            "end" => JustifyContent::End,
            "space-between" => JustifyContent::SpaceBetween,
            _ => JustifyContent::Start,
        }
    }
}

impl From<JustifyContent> for String {
    fn from(j: JustifyContent) -> Self {
        match j {
            JustifyContent::Start => "start",
            JustifyContent::Center => "center",
            JustifyContent::End => "end",
            JustifyContent::SpaceBetween => "space-between",
        }
        .to_string()
    }
}

/// How children are placed along the cross axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlignItems {
    #[default]
    Start,
    Center,
    End,
}

impl From<String> for AlignItems {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&str> for AlignItems {
    fn from(s: &str) -> Self {
        match s {
            "center" => AlignItems::Center,
            "end" => AlignItems::End,
            _ => AlignItems::Start,
        }
    }
}

impl From<AlignItems> for String {
    fn from(a: AlignItems) -> Self {
        match a {
            AlignItems::Start => "start",
            AlignItems::Center => "center",
            AlignItems::End => "end",
        }
        .to_string()
    }
}

/// Horizontal alignment of text lines inside a text box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<String> for TextAlign {
    fn from(s: String) -> Self {
        match s.as_str() {
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

impl From<TextAlign> for String {
    fn from(a: TextAlign) -> Self {
        match a {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
        .to_string()
    }
}

/// An sRGB color with alpha, parsed from `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 to 1.0
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 1.0,
    };

    /// Parse a hex color string.
    pub fn parse_hex(hex: &str) -> Result<Self, String> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid hex color: {hex:?}"))?;

        let channel = |range: std::ops::Range<usize>, label: &str| -> Result<u8, String> {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| format!("invalid {label} in {hex:?}"))
        };

        match digits.len() {
            6 => Ok(Color {
                r: channel(0..2, "red")?,
                g: channel(2..4, "green")?,
                b: channel(4..6, "blue")?,
                a: 1.0,
            }),
            8 => Ok(Color {
                r: channel(0..2, "red")?,
                g: channel(2..4, "green")?,
                b: channel(4..6, "blue")?,
                a: channel(6..8, "alpha")? as f64 / 255.0,
            }),
            _ => Err(format!("invalid hex color length: {hex:?}")),
        }
    }

    /// Channels as PDF operands in 0.0..=1.0.
    pub fn unit_rgb(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}
