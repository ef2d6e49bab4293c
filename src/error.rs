//! Structured error types for the penpdf pipeline.
//!
//! Layout itself only fails on a structural problem (a page root that is not
//! a frame). Everything else comes from the adapters around it: JSON
//! parsing, variable resolution, page filtering, font and image registration
//! and PDF writing.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PenError>;

/// The unified error type returned by all public penpdf functions.
#[derive(Debug, Error)]
pub enum PenError {
    /// JSON input failed to parse as a valid .pen document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A top-level node is not a frame, so it cannot become a page.
    #[error("top-level node {id:?} must be a frame")]
    InvalidDocument { id: String },

    /// A `$name` reference points at a variable the document doesn't define.
    #[error("node {node:?}: undefined variable {name:?}")]
    UndefinedVariable { node: String, name: String },

    /// A `$name` reference points at a number variable where a color is needed.
    #[error("node {node:?}: variable {name:?} is not a string")]
    VariableNotString { node: String, name: String },

    /// The page filter matched nothing.
    #[error("no pages match filter {filter:?}")]
    NoPagesMatch { filter: String },

    /// A font could not be parsed or registered.
    #[error("Font error: {0}")]
    Font(String),

    /// Image bytes could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for PenError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the .pen schema. Check node types, dimensions and padding shapes.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the file truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        PenError::Parse { source: e, hint }
    }
}
