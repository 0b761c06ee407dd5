//! # Error Types
//!
//! This module defines error types used throughout the carta library.

use thiserror::Error;

/// Main error type for carta operations.
///
/// Fatal export failures surface as one of these variants; non-fatal
/// per-element problems are collected as warnings on the export output
/// instead (see [`crate::compose::ExportOutput`]).
#[derive(Debug, Error)]
pub enum CartaError {
    /// Template is structurally unusable (degenerate geometry, bad values).
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Template has no map element; export cannot proceed.
    #[error("Template has no map element")]
    MissingMapElement,

    /// No export area or view handle available for capture.
    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Image fetching or decoding error.
    #[error("Image error: {0}")]
    Image(String),

    /// Output encoding error (PDF, PNG, JPEG).
    #[error("Encoding error: {0}")]
    Encode(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
