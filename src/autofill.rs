// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Upload auto-fill: choose a text source, infer details, merge into the form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{AppConfig, OverwritePolicy};
use crate::inference::{InferredDetails, RuleSet};
use crate::ocr::{self, TextRecognizer};
use crate::upload::{Upload, UploadPolicy};
use crate::Result;

/// Submission form fields the auto-fill writes to.
///
/// An empty string means the field is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    /// Receives the inferred year
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

/// Where the inferred details came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Ocr,
    FileName,
}

/// Details plus the text source they were inferred from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inference {
    pub source: TextSource,
    pub details: InferredDetails,
}

/// Informational status shown after an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Filled { fields: Vec<(String, String)> },
    NothingExtracted,
}

impl Notice {
    pub fn for_details(details: &InferredDetails) -> Self {
        if details.is_empty() {
            Notice::NothingExtracted
        } else {
            Notice::Filled {
                fields: details
                    .fields()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            }
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Filled { fields } => {
                let list: Vec<String> = fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "Auto-filled: {}", list.join(", "))
            }
            Notice::NothingExtracted => f.write_str("No details could be extracted"),
        }
    }
}

/// Result of auto-filling one upload
#[derive(Debug, Clone, Serialize)]
pub struct AutofillOutcome {
    pub source: TextSource,
    pub details: InferredDetails,
    pub form: FormState,
    /// Form fields that were actually written
    pub filled: Vec<&'static str>,
    pub notice: Notice,
    pub message: String,
}

/// Merge inferred details into the form and return the fields written
pub fn merge(form: &mut FormState, details: &InferredDetails, policy: OverwritePolicy) -> Vec<&'static str> {
    let organization = details.organization.map(|o| o.to_string());
    let category = details.category.map(|c| c.to_string());

    let assignments: [(&'static str, &mut String, Option<&str>); 4] = [
        ("organization", &mut form.organization, organization.as_deref()),
        ("title", &mut form.title, details.title.as_deref()),
        ("category", &mut form.category, category.as_deref()),
        ("duration", &mut form.duration, details.year.as_deref()),
    ];

    let mut filled = Vec::new();
    for (name, slot, value) in assignments {
        let Some(value) = value else { continue };
        if policy == OverwritePolicy::Overwrite || slot.trim().is_empty() {
            *slot = value.to_string();
            filled.push(name);
        }
    }
    filled
}

/// The auto-fill pipeline, with the text recognizer injected
#[derive(Clone)]
pub struct Autofill {
    rules: RuleSet,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    uploads: UploadPolicy,
    overwrite: OverwritePolicy,
}

impl Autofill {
    pub fn new(recognizer: Option<Arc<dyn TextRecognizer>>) -> Self {
        Self {
            rules: RuleSet::builtin(),
            recognizer,
            uploads: UploadPolicy::default(),
            overwrite: OverwritePolicy::default(),
        }
    }

    /// Build the pipeline described by the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let recognizer = ocr::build_recognizer(&config.ocr)?;
        Ok(Self::new(recognizer)
            .with_upload_policy(UploadPolicy::new(&config.upload))
            .with_overwrite(config.autofill.overwrite))
    }

    pub fn with_upload_policy(mut self, uploads: UploadPolicy) -> Self {
        self.uploads = uploads;
        self
    }

    pub fn with_overwrite(mut self, overwrite: OverwritePolicy) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Drop the recognizer; every upload is inferred from its file name
    pub fn without_ocr(mut self) -> Self {
        self.recognizer = None;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn recognizer_name(&self) -> Option<&'static str> {
        self.recognizer.as_ref().map(|r| r.name())
    }

    pub fn recognizer(&self) -> Option<&Arc<dyn TextRecognizer>> {
        self.recognizer.as_ref()
    }

    /// Infer details for an upload. Never fails: recognition problems fall
    /// back to the file name.
    pub async fn detect(&self, upload: &Upload) -> Inference {
        if let (true, Some(recognizer)) = (upload.is_image(), self.recognizer.as_ref()) {
            match recognizer.recognize(&upload.bytes).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    info!("Using {} text for {}", recognizer.name(), upload.file_name);
                    return Inference {
                        source: TextSource::Ocr,
                        details: self.rules.infer(&text),
                    };
                }
                Ok(_) => {
                    warn!("{} found no text in {}, using file name", recognizer.name(), upload.file_name);
                }
                Err(e) => {
                    warn!("{} failed for {}: {}, using file name", recognizer.name(), upload.file_name, e);
                }
            }
        }

        Inference {
            source: TextSource::FileName,
            details: self.rules.infer(&upload.file_name),
        }
    }

    /// Validate the upload, infer its details and merge them into `form`
    pub async fn autofill(&self, upload: &Upload, mut form: FormState) -> Result<AutofillOutcome> {
        self.uploads.validate(upload)?;

        let Inference { source, details } = self.detect(upload).await;
        let filled = merge(&mut form, &details, self.overwrite);
        let notice = Notice::for_details(&details);

        info!("{}: {}", upload.file_name, notice);

        Ok(AutofillOutcome {
            source,
            message: notice.to_string(),
            details,
            form,
            filled,
            notice,
        })
    }
}
