// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! The keyword rule table shared by the file-name and OCR paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known certificate/course providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organization {
    Google,
    Microsoft,
    #[serde(rename = "AWS")]
    Aws,
    CodeChef,
    HackerRank,
    LeetCode,
    Coursera,
    Udemy,
    #[serde(rename = "TATA")]
    Tata,
}

impl Organization {
    pub const ALL: [Organization; 9] = [
        Organization::Google,
        Organization::Microsoft,
        Organization::Aws,
        Organization::CodeChef,
        Organization::HackerRank,
        Organization::LeetCode,
        Organization::Coursera,
        Organization::Udemy,
        Organization::Tata,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Organization::Google => "Google",
            Organization::Microsoft => "Microsoft",
            Organization::Aws => "AWS",
            Organization::CodeChef => "CodeChef",
            Organization::HackerRank => "HackerRank",
            Organization::LeetCode => "LeetCode",
            Organization::Coursera => "Coursera",
            Organization::Udemy => "Udemy",
            Organization::Tata => "TATA",
        }
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission types accepted by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Certification,
    Internship,
    Project,
    Workshop,
    Hackathon,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Certification,
        Category::Internship,
        Category::Project,
        Category::Workshop,
        Category::Hackathon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Certification => "Certification",
            Category::Internship => "Internship",
            Category::Project => "Project",
            Category::Workshop => "Workshop",
            Category::Hackathon => "Hackathon",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation stage of a rule.
///
/// Stages run in declaration order. In an exclusive stage the first
/// matching rule applies and the rest of the stage is skipped; in the
/// cue stage every matching rule applies in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Organization,
    Skill,
    Cue,
}

impl Stage {
    pub fn is_exclusive(self) -> bool {
        matches!(self, Stage::Organization | Stage::Skill)
    }
}

/// Substring condition over the lowercased input
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "match", content = "keywords", rename_all = "snake_case")]
pub enum Cue {
    /// Any keyword present
    Any(&'static [&'static str]),
    /// Every keyword present
    All(&'static [&'static str]),
}

impl Cue {
    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Cue::Any(keywords) => keywords.iter().any(|k| haystack.contains(k)),
            Cue::All(keywords) => keywords.iter().all(|k| haystack.contains(k)),
        }
    }
}

/// Whether an assignment may replace a value set by an earlier rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Apply {
    Always,
    IfUnset,
}

/// One field assignment performed when a rule matches
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Effect {
    Organization { value: Organization, apply: Apply },
    Title { value: &'static str, apply: Apply },
    Category { value: Category, apply: Apply },
}

/// A single heuristic: when `cue` matches, apply `effects` in order
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Rule {
    pub name: &'static str,
    pub stage: Stage,
    pub cue: Cue,
    pub effects: &'static [Effect],
}

const fn org(value: Organization) -> Effect {
    Effect::Organization { value, apply: Apply::Always }
}

const fn title(value: &'static str, apply: Apply) -> Effect {
    Effect::Title { value, apply }
}

const fn category(value: Category, apply: Apply) -> Effect {
    Effect::Category { value, apply }
}

/// Built-in rules in evaluation order.
///
/// Within the cue stage the most specific rule comes last, since the last
/// matching `Always` assignment is the one that sticks.
pub static BUILTIN_RULES: &[Rule] = &[
    // Providers, first match wins
    Rule {
        name: "google",
        stage: Stage::Organization,
        cue: Cue::Any(&["google"]),
        effects: &[org(Organization::Google)],
    },
    Rule {
        name: "microsoft",
        stage: Stage::Organization,
        cue: Cue::Any(&["microsoft"]),
        effects: &[org(Organization::Microsoft)],
    },
    Rule {
        name: "aws",
        stage: Stage::Organization,
        cue: Cue::Any(&["aws", "amazon"]),
        effects: &[org(Organization::Aws)],
    },
    Rule {
        name: "codechef",
        stage: Stage::Organization,
        cue: Cue::Any(&["codechef"]),
        effects: &[
            org(Organization::CodeChef),
            category(Category::Certification, Apply::IfUnset),
        ],
    },
    Rule {
        name: "hackerrank",
        stage: Stage::Organization,
        cue: Cue::Any(&["hackerrank"]),
        effects: &[org(Organization::HackerRank)],
    },
    Rule {
        name: "leetcode",
        stage: Stage::Organization,
        cue: Cue::Any(&["leetcode"]),
        effects: &[org(Organization::LeetCode)],
    },
    Rule {
        name: "coursera",
        stage: Stage::Organization,
        cue: Cue::Any(&["coursera"]),
        effects: &[org(Organization::Coursera)],
    },
    Rule {
        name: "udemy",
        stage: Stage::Organization,
        cue: Cue::Any(&["udemy"]),
        effects: &[org(Organization::Udemy)],
    },
    Rule {
        name: "tata",
        stage: Stage::Organization,
        cue: Cue::Any(&["tata"]),
        effects: &[org(Organization::Tata)],
    },
    // Languages, first match wins; "javascript" must precede "java"
    Rule {
        name: "python",
        stage: Stage::Skill,
        cue: Cue::Any(&["python"]),
        effects: &[
            title("Python Programming", Apply::Always),
            category(Category::Certification, Apply::IfUnset),
        ],
    },
    Rule {
        name: "javascript",
        stage: Stage::Skill,
        cue: Cue::Any(&["javascript"]),
        effects: &[
            title("JavaScript Programming", Apply::Always),
            category(Category::Certification, Apply::IfUnset),
        ],
    },
    Rule {
        name: "java",
        stage: Stage::Skill,
        cue: Cue::Any(&["java"]),
        effects: &[
            title("Java Programming", Apply::Always),
            category(Category::Certification, Apply::IfUnset),
        ],
    },
    // Generic cues, every match applies, last one wins
    Rule {
        name: "online-test",
        stage: Stage::Cue,
        cue: Cue::Any(&["test", "quiz"]),
        effects: &[
            title("Online Test", Apply::IfUnset),
            category(Category::Certification, Apply::Always),
        ],
    },
    Rule {
        name: "skill",
        stage: Stage::Cue,
        cue: Cue::Any(&["skill"]),
        effects: &[category(Category::Certification, Apply::Always)],
    },
    Rule {
        name: "certificate",
        stage: Stage::Cue,
        cue: Cue::Any(&["certificate", "cert"]),
        effects: &[category(Category::Certification, Apply::Always)],
    },
    Rule {
        name: "workshop",
        stage: Stage::Cue,
        cue: Cue::Any(&["workshop"]),
        effects: &[category(Category::Workshop, Apply::Always)],
    },
    Rule {
        name: "hackathon",
        stage: Stage::Cue,
        cue: Cue::Any(&["hackathon"]),
        effects: &[category(Category::Hackathon, Apply::Always)],
    },
    Rule {
        name: "project",
        stage: Stage::Cue,
        cue: Cue::Any(&["project"]),
        effects: &[category(Category::Project, Apply::Always)],
    },
    Rule {
        name: "internship",
        stage: Stage::Cue,
        cue: Cue::Any(&["internship"]),
        effects: &[category(Category::Internship, Apply::Always)],
    },
    Rule {
        name: "fifty-days",
        stage: Stage::Cue,
        cue: Cue::All(&["50", "days"]),
        effects: &[
            title("50 Days Challenge", Apply::Always),
            category(Category::Certification, Apply::Always),
        ],
    },
];
