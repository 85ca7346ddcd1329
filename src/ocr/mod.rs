// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Text recognition backends for image uploads

pub mod ollama;
pub mod vision;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::GenericImageView;
use std::sync::Arc;
use tracing::debug;

use crate::config::{OcrConfig, OcrProvider};
use crate::Result;

/// An external image-to-text capability.
///
/// Implementations make a single attempt per call. `Ok(None)` means the
/// service answered but found no text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Name of this backend
    fn name(&self) -> &'static str;

    /// Extract text from an encoded image
    async fn recognize(&self, image: &[u8]) -> Result<Option<String>>;

    /// Check that the backend is reachable and usable
    async fn health_check(&self) -> Result<()>;
}

/// Build the recognizer selected in the configuration
pub fn build_recognizer(config: &OcrConfig) -> Result<Option<Arc<dyn TextRecognizer>>> {
    let recognizer: Option<Arc<dyn TextRecognizer>> = match config.provider {
        OcrProvider::GoogleVision => Some(Arc::new(vision::VisionClient::new(config)?)),
        OcrProvider::Ollama => Some(Arc::new(ollama::OllamaClient::new(config)?)),
        OcrProvider::None => None,
    };
    Ok(recognizer)
}

/// Shrink large images so the longest side is at most `max_dimension`.
///
/// Images already within bounds are returned untouched; resized ones are
/// re-encoded as JPEG.
pub fn prepare_image(data: &[u8], max_dimension: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let (width, height) = img.dimensions();

    if width <= max_dimension && height <= max_dimension {
        return Ok(data.to_vec());
    }

    let img = img.resize(max_dimension, max_dimension, image::imageops::FilterType::Triangle);
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    rgb.write_to(&mut cursor, image::ImageFormat::Jpeg)?;

    Ok(buffer)
}

/// Base64 payload for a recognition request, falling back to the raw bytes
pub fn encode_image(data: &[u8], max_dimension: u32) -> String {
    match prepare_image(data, max_dimension) {
        Ok(prepared) => general_purpose::STANDARD.encode(prepared),
        Err(e) => {
            debug!("Image preparation failed ({}), sending raw bytes", e);
            general_purpose::STANDARD.encode(data)
        }
    }
}

/// Normalize recognized text: blank output counts as no text
pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
