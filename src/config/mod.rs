// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for certscan

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Text recognition backend
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Accepted upload types and sizes
    #[serde(default)]
    pub upload: UploadConfig,

    /// Form merge behaviour
    #[serde(default)]
    pub autofill: AutofillConfig,

    /// Web API settings
    #[serde(default)]
    pub web: WebConfig,
}

/// Which recognizer to inject into the autofill pipeline
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OcrProvider {
    GoogleVision,
    Ollama,
    None,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OcrConfig {
    #[serde(default = "default_provider")]
    pub provider: OcrProvider,
    /// Base URL of the recognition service; unset means the provider's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Inline API key; takes precedence over `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Vision model (Ollama only)
    #[serde(default = "default_vision_model")]
    pub model: String,
    /// Transcription prompt (Ollama only)
    #[serde(default = "default_ocr_prompt")]
    pub prompt: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Longest image side sent to the service
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// How inferred values treat fields the user already filled
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Only write fields that are still empty
    #[default]
    FillEmpty,
    /// Replace any field an inferred value exists for
    Overwrite,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AutofillConfig {
    #[serde(default)]
    pub overwrite: OverwritePolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

// Default value functions
fn default_provider() -> OcrProvider { OcrProvider::GoogleVision }
fn default_api_key_env() -> String { "GOOGLE_API_KEY".to_string() }
fn default_vision_model() -> String { "moondream".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_max_dimension() -> u32 { 1600 }
fn default_max_bytes() -> u64 { 5 * 1024 * 1024 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }

fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf", "jpg", "jpeg", "png"].into_iter().map(String::from).collect()
}

fn default_ocr_prompt() -> String {
    "Transcribe all text visible in this certificate image exactly as written. \
     Return ONLY the text.".to_string()
}

impl OcrProvider {
    /// Where the provider's service lives when no URL is configured
    pub fn default_url(self) -> Option<&'static str> {
        match self {
            OcrProvider::GoogleVision => Some("https://vision.googleapis.com"),
            OcrProvider::Ollama => Some("http://localhost:11434"),
            OcrProvider::None => None,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            model: default_vision_model(),
            prompt: default_ocr_prompt(),
            timeout_secs: default_timeout(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl OcrConfig {
    /// Configured URL, else the provider default
    pub fn endpoint(&self) -> &str {
        match self.url.as_deref() {
            Some(url) => url,
            None => self.provider.default_url().unwrap_or_default(),
        }
    }

    /// API key from the config file, else from the configured env var
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::CertscanError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.upload.allowed_extensions.is_empty() {
            return Err(crate::CertscanError::Config(
                "upload.allowed_extensions must not be empty".to_string(),
            ));
        }
        if self.upload.max_bytes == 0 {
            return Err(crate::CertscanError::Config(
                "upload.max_bytes must be greater than zero".to_string(),
            ));
        }
        if self.ocr.provider != OcrProvider::None && self.ocr.endpoint().trim().is_empty() {
            return Err(crate::CertscanError::Config("ocr.url must not be empty".to_string()));
        }
        if self.ocr.provider == OcrProvider::Ollama && self.ocr.endpoint().contains("googleapis.com") {
            return Err(crate::CertscanError::Config(format!(
                "ocr.url {} is a Google endpoint but ocr.provider is ollama",
                self.ocr.endpoint()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.ocr.provider, OcrProvider::GoogleVision);
        assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.autofill.overwrite, OverwritePolicy::FillEmpty);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certscan.json");
        std::fs::write(&path, r#"{"ocr": {"provider": "ollama", "url": "http://localhost:11434"},
            "autofill": {"overwrite": "overwrite"}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ocr.provider, OcrProvider::Ollama);
        assert_eq!(config.ocr.model, "moondream");
        assert_eq!(config.autofill.overwrite, OverwritePolicy::Overwrite);
        assert_eq!(config.web.port, 8080);
    }

    #[test]
    fn test_ollama_without_url_uses_local_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certscan.json");
        std::fs::write(&path, r#"{"ocr": {"provider": "ollama"}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ocr.endpoint(), "http://localhost:11434");
        assert_eq!(AppConfig::default().ocr.endpoint(), "https://vision.googleapis.com");
    }

    #[test]
    fn test_validate_rejects_provider_url_mismatch() {
        let mut config = AppConfig::default();
        config.ocr.provider = OcrProvider::Ollama;
        config.ocr.url = Some("https://vision.googleapis.com".to_string());
        assert!(matches!(config.validate(), Err(crate::CertscanError::Config(_))));

        config.ocr.url = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certscan.json");
        let mut config = AppConfig::default();
        config.web.port = 9000;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.web.port, 9000);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certscan.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(crate::CertscanError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = AppConfig::default();
        config.upload.allowed_extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inline_api_key_wins() {
        let config = OcrConfig {
            api_key: Some("inline".to_string()),
            api_key_env: "CERTSCAN_TEST_UNSET_KEY".to_string(),
            ..OcrConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("inline"));

        let config = OcrConfig {
            api_key: None,
            api_key_env: "CERTSCAN_TEST_UNSET_KEY".to_string(),
            ..OcrConfig::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }
}
