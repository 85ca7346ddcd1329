// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Text recognition through a local Ollama vision model

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{encode_image, non_blank, TextRecognizer};
use crate::config::OcrConfig;
use crate::{CertscanError, Result};

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    prompt: String,
    max_dimension: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    images: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // Normalize URL
        let base_url = config
            .endpoint()
            .trim_end_matches('/')
            .replace("/api/generate", "")
            .replace("/api/chat", "");

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            max_dimension: config.max_dimension,
        })
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                CertscanError::OcrUnavailable(format!(
                    "Cannot connect to Ollama at {}: {}",
                    self.base_url, e
                ))
            })?;

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl TextRecognizer for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn recognize(&self, image: &[u8]) -> Result<Option<String>> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt: &self.prompt,
            stream: false,
            images: vec![encode_image(image, self.max_dimension)],
        };

        debug!("Sending vision request to Ollama: model={}", self.model);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CertscanError::Recognition(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let result: GenerateResponse = response.json().await?;
        Ok(non_blank(Some(result.response)))
    }

    async fn health_check(&self) -> Result<()> {
        let models = self.list_models().await?;
        if models.iter().any(|m| m.starts_with(&self.model)) {
            Ok(())
        } else {
            Err(CertscanError::OcrUnavailable(format!(
                "Vision model '{}' not found. Available: {:?}",
                self.model, models
            )))
        }
    }
}
