//! Structured error types for the report engine.
//!
//! Composition itself cannot fail. These cover the edges: parsing a request
//! envelope, reading files at the CLI boundary, and loading the map image
//! (which the composer absorbs).

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the JSON entry points and the CLI.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as a report request.
    #[error("failed to parse report request: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The request has no `generated_at` and the caller supplied no clock.
    #[error("report request has no generated_at timestamp")]
    MissingTimestamp,

    /// A file could not be read or written.
    #[error("I/O error accessing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report request schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}

/// Why a map image could not be placed.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data URI: missing comma")]
    InvalidDataUri,

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image data too short")]
    TooShort,

    #[error("unsupported image format (expected JPEG or PNG)")]
    UnsupportedFormat,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
