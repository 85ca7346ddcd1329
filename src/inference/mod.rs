// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Metadata inference from file names and recognized text
//!
//! A pure classifier: text goes in, a partial [`InferredDetails`] comes out.
//! Nothing here can fail.

pub mod rules;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use rules::{Apply, Category, Cue, Effect, Organization, Rule, Stage, BUILTIN_RULES};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"20[0-9]{2}").expect("static regex"));

/// Best-effort guess of submission attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl InferredDetails {
    /// True when no field was inferred
    pub fn is_empty(&self) -> bool {
        self.organization.is_none()
            && self.title.is_none()
            && self.category.is_none()
            && self.year.is_none()
    }

    /// Inferred fields as `(name, value)` pairs, in form order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(org) = self.organization {
            fields.push(("organization", org.to_string()));
        }
        if let Some(ref title) = self.title {
            fields.push(("title", title.clone()));
        }
        if let Some(category) = self.category {
            fields.push(("category", category.to_string()));
        }
        if let Some(ref year) = self.year {
            fields.push(("year", year.clone()));
        }
        fields
    }

    fn apply(&mut self, effect: &Effect) {
        match *effect {
            Effect::Organization { value, apply } => {
                if apply == Apply::Always || self.organization.is_none() {
                    self.organization = Some(value);
                }
            }
            Effect::Title { value, apply } => {
                if apply == Apply::Always || self.title.is_none() {
                    self.title = Some(value.to_string());
                }
            }
            Effect::Category { value, apply } => {
                if apply == Apply::Always || self.category.is_none() {
                    self.category = Some(value);
                }
            }
        }
    }
}

/// An ordered rule table
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    rules: &'static [Rule],
}

impl RuleSet {
    pub fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// The built-in provider/skill/cue table
    pub fn builtin() -> Self {
        Self::new(BUILTIN_RULES)
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Run every stage over `text` and return what was found
    pub fn infer(&self, text: &str) -> InferredDetails {
        let haystack = text.to_lowercase();
        let mut details = InferredDetails::default();

        for stage in [Stage::Organization, Stage::Skill, Stage::Cue] {
            for rule in self.rules.iter().filter(|r| r.stage == stage) {
                if !rule.cue.matches(&haystack) {
                    continue;
                }
                debug!("Rule '{}' matched", rule.name);
                for effect in rule.effects {
                    details.apply(effect);
                }
                if stage.is_exclusive() {
                    break;
                }
            }
        }

        details.year = extract_year(&haystack);
        details
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// First `20xx` token in the text
pub fn extract_year(text: &str) -> Option<String> {
    YEAR_RE.find(text).map(|m| m.as_str().to_string())
}

/// Infer submission metadata from a file name or recognized text
/// using the built-in rules.
pub fn infer_from_text(text: &str) -> InferredDetails {
    RuleSet::builtin().infer(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aws_certificate() {
        let d = infer_from_text("AWS Cloud Practitioner certificate 2023.pdf");
        assert_eq!(d.organization, Some(Organization::Aws));
        assert_eq!(d.category, Some(Category::Certification));
        assert_eq!(d.year.as_deref(), Some("2023"));
        assert_eq!(d.title, None);
    }

    #[test]
    fn test_python_test_keeps_language_title() {
        let d = infer_from_text("python_test_2022");
        assert_eq!(d.title.as_deref(), Some("Python Programming"));
        assert_eq!(d.category, Some(Category::Certification));
        assert_eq!(d.year.as_deref(), Some("2022"));
        assert_eq!(d.organization, None);
    }

    #[test]
    fn test_no_match_is_empty() {
        let d = infer_from_text("my_document.pdf");
        assert!(d.is_empty());
        assert_eq!(d, InferredDetails::default());
    }

    #[test]
    fn test_empty_input() {
        assert!(infer_from_text("").is_empty());
    }

    #[test]
    fn test_later_cue_overrides_earlier() {
        // "project" is evaluated after "certificate"
        let d = infer_from_text("project_certificate.pdf");
        assert_eq!(d.category, Some(Category::Project));
        let d = infer_from_text("certificate_of_internship.pdf");
        assert_eq!(d.category, Some(Category::Internship));
    }

    #[test]
    fn test_first_provider_wins() {
        let d = infer_from_text("Google and Microsoft joint badge");
        assert_eq!(d.organization, Some(Organization::Google));
        let d = infer_from_text("udemy course via coursera");
        assert_eq!(d.organization, Some(Organization::Coursera));
    }

    #[test]
    fn test_amazon_maps_to_aws() {
        let d = infer_from_text("Amazon Web Services badge");
        assert_eq!(d.organization, Some(Organization::Aws));
    }

    #[test]
    fn test_javascript_is_not_java() {
        let d = infer_from_text("JavaScript_Basics.png");
        assert_eq!(d.title.as_deref(), Some("JavaScript Programming"));
        let d = infer_from_text("java_se_11.png");
        assert_eq!(d.title.as_deref(), Some("Java Programming"));
    }

    #[test]
    fn test_codechef_implies_certification() {
        let d = infer_from_text("codechef_starters.pdf");
        assert_eq!(d.organization, Some(Organization::CodeChef));
        assert_eq!(d.category, Some(Category::Certification));
    }

    #[test]
    fn test_quiz_without_skill_sets_online_test() {
        let d = infer_from_text("HackerRank quiz.png");
        assert_eq!(d.organization, Some(Organization::HackerRank));
        assert_eq!(d.title.as_deref(), Some("Online Test"));
        assert_eq!(d.category, Some(Category::Certification));
    }

    #[test]
    fn test_fifty_days_overrides_title() {
        let d = infer_from_text("leetcode python 50 days badge");
        assert_eq!(d.organization, Some(Organization::LeetCode));
        assert_eq!(d.title.as_deref(), Some("50 Days Challenge"));
        assert_eq!(d.category, Some(Category::Certification));
    }

    #[test]
    fn test_workshop_and_hackathon() {
        assert_eq!(infer_from_text("ml_workshop.jpg").category, Some(Category::Workshop));
        assert_eq!(infer_from_text("smart india hackathon.png").category, Some(Category::Hackathon));
    }

    #[test]
    fn test_year_is_first_occurrence() {
        assert_eq!(extract_year("issued 2021 valid until 2024").as_deref(), Some("2021"));
        assert_eq!(extract_year("1999 and 1987"), None);
        assert_eq!(extract_year("id_120234").as_deref(), Some("2023"));
        // Only ASCII digits form a year
        assert_eq!(extract_year("issued 20\u{0662}\u{0663}"), None);
        assert_eq!(extract_year("20\u{0662}\u{0663} then 2021").as_deref(), Some("2021"));
        assert_eq!(infer_from_text("Certificate issued 20\u{0662}\u{0663}").year, None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(infer_from_text("TATA INTERNSHIP"), infer_from_text("tata internship"));
    }

    #[test]
    fn test_idempotent() {
        for text in ["AWS cert 2023", "python_test_2022", "", "project_certificate.pdf"] {
            assert_eq!(infer_from_text(text), infer_from_text(text));
        }
    }

    #[test]
    fn test_outputs_stay_in_range() {
        let inputs = [
            "AWS Cloud Practitioner certificate 2023.pdf",
            "python_test_2022",
            "my_document.pdf",
            "\u{0}\u{ffff}ÄÖÜ 20",
            "2019201820172016",
            "microsoft-internship-report-final-v2.docx",
            "!!!",
        ];
        let titles = [
            "Python Programming",
            "JavaScript Programming",
            "Java Programming",
            "Online Test",
            "50 Days Challenge",
        ];
        for text in inputs {
            let d = infer_from_text(text);
            if let Some(org) = d.organization {
                assert!(Organization::ALL.contains(&org));
            }
            if let Some(category) = d.category {
                assert!(Category::ALL.contains(&category));
            }
            if let Some(ref title) = d.title {
                assert!(titles.contains(&title.as_str()));
            }
            if let Some(ref year) = d.year {
                assert_eq!(year.len(), 4);
                assert!(year.starts_with("20"));
                assert!(year.chars().all(|c| c.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let d = infer_from_text("python_test_2022");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json, serde_json::json!({
            "title": "Python Programming",
            "category": "Certification",
            "year": "2022",
        }));
        assert_eq!(serde_json::to_string(&InferredDetails::default()).unwrap(), "{}");
    }

    #[test]
    fn test_fields_in_form_order() {
        let d = infer_from_text("AWS certificate 2023");
        let names: Vec<_> = d.fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["organization", "category", "year"]);
    }
}
