// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Google Cloud Vision text detection client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{encode_image, non_blank, TextRecognizer};
use crate::config::OcrConfig;
use crate::{CertscanError, Result};

/// Vision API client
pub struct VisionClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_dimension: u32,
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Deserialize, Default)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    description: Option<String>,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

impl VisionClient {
    /// Create a new Vision client
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // Normalize URL
        let base_url = config
            .endpoint()
            .trim_end_matches('/')
            .replace("/v1/images:annotate", "");

        Ok(Self {
            client,
            base_url,
            api_key: config.resolve_api_key(),
            max_dimension: config.max_dimension,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CertscanError::OcrUnavailable("Google API key not found".to_string()))
    }

    fn build_request(image_base64: String) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent { content: image_base64 },
                features: vec![Feature {
                    kind: "TEXT_DETECTION",
                    max_results: 1,
                }],
            }],
        }
    }
}

/// Full text of the first annotation of the first response
fn extract_text(response: AnnotateResponse) -> Result<Option<String>> {
    let Some(first) = response.responses.into_iter().next() else {
        return Ok(None);
    };
    if let Some(status) = first.error {
        return Err(CertscanError::Recognition(status.message));
    }
    Ok(first
        .text_annotations
        .into_iter()
        .next()
        .and_then(|a| a.description))
}

#[async_trait]
impl TextRecognizer for VisionClient {
    fn name(&self) -> &'static str {
        "google-vision"
    }

    async fn recognize(&self, image: &[u8]) -> Result<Option<String>> {
        let key = self.api_key()?;
        let url = format!("{}/v1/images:annotate", self.base_url);
        let request = Self::build_request(encode_image(image, self.max_dimension));

        debug!("Sending text detection request ({} bytes)", image.len());

        let response = self.client
            .post(&url)
            .query(&[("key", key)])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CertscanError::Recognition(format!(
                "Vision API error: {}",
                response.status()
            )));
        }

        let body: AnnotateResponse = response.json().await?;
        Ok(non_blank(extract_text(body)?))
    }

    async fn health_check(&self) -> Result<()> {
        let key = self.api_key()?;
        let url = format!("{}/v1/images:annotate", self.base_url);

        // An empty batch exercises the endpoint and the key without billing an image
        let response = self.client
            .post(&url)
            .query(&[("key", key)])
            .json(&AnnotateRequest { requests: Vec::new() })
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                CertscanError::OcrUnavailable(format!(
                    "Cannot connect to Vision API at {}: {}",
                    self.base_url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(CertscanError::OcrUnavailable(format!(
                "Vision API at {} returned status {}",
                self.base_url,
                response.status()
            )));
        }

        Ok(())
    }
}
