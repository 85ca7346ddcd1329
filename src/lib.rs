// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! certscan: metadata auto-fill for student achievement uploads
//!
//! Guesses organization, title, category and year for a submission from the
//! uploaded file's name or from text recognized in an uploaded image.

pub mod autofill;
pub mod config;
pub mod error;
pub mod inference;
pub mod ocr;
pub mod upload;
pub mod web;

pub use autofill::{Autofill, AutofillOutcome, FormState, Notice, TextSource};
pub use config::AppConfig;
pub use error::{CertscanError, Result};
pub use inference::{infer_from_text, Category, InferredDetails, Organization};
pub use upload::Upload;
