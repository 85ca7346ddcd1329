// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Uploaded evidence files and the type/size check run before inference

use std::path::Path;

use crate::config::UploadConfig;
use crate::{CertscanError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "odt", "txt", "rtf", "ppt", "pptx"];

/// A file handed in with a submission
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an upload from disk, keeping only the file name part of the path
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    /// Lowercased extension, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Image by extension, or by content when the extension is absent or unknown
    pub fn is_image(&self) -> bool {
        if let Some(ext) = self.extension() {
            if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                return true;
            }
            if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
                return false;
            }
        }
        !self.bytes.is_empty() && image::guess_format(&self.bytes).is_ok()
    }
}

/// Accepted upload types and size limit
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check if this policy accepts the file's extension
    pub fn can_accept(&self, file_name: &str) -> bool {
        if let Some(ext) = Path::new(file_name).extension().and_then(|e| e.to_str()) {
            self.allowed_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        } else {
            false
        }
    }

    /// Reject unsupported types and oversized files
    pub fn validate(&self, upload: &Upload) -> Result<()> {
        if !self.can_accept(&upload.file_name) {
            return Err(CertscanError::UnsupportedFileType {
                name: upload.file_name.clone(),
                allowed: self.allowed_extensions.join(", "),
            });
        }
        if upload.size() > self.max_bytes {
            return Err(CertscanError::FileTooLarge {
                size: upload.size(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(&UploadConfig::default())
    }
}
