// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for certscan

use thiserror::Error;

/// Result type alias for certscan operations
pub type Result<T> = std::result::Result<T, CertscanError>;

/// certscan error types
///
/// The inference engine itself never produces one of these; they come from
/// configuration, upload checks and the text recognition backends.
#[derive(Error, Debug)]
pub enum CertscanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Text recognition unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Unsupported file type: {name} (allowed: {allowed})")]
    UnsupportedFileType { name: String, allowed: String },

    #[error("File too large: {size} bytes (limit is {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl CertscanError {
    /// True for errors that reject an upload before any inference runs
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CertscanError::UnsupportedFileType { .. } | CertscanError::FileTooLarge { .. }
        )
    }
}
