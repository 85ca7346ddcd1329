// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! certscan: metadata auto-fill for student achievement uploads
//!
//! Command-line front end over the inference engine and auto-fill pipeline.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use certscan::autofill::{Autofill, FormState};
use certscan::config::AppConfig;
use certscan::inference::{Effect, RuleSet};
use certscan::upload::Upload;
use certscan::{CertscanError, Result};

/// certscan CLI - guess submission details from uploads
#[derive(Parser, Debug)]
#[command(name = "certscan")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Guess certificate/submission details from file names and OCR text", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "certscan.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "jsonl"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Infer details from text (a file name or pasted OCR output)
    Infer {
        /// Text to classify
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Auto-fill details for uploaded files
    Scan {
        /// Files to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Never call the OCR backend
        #[arg(long)]
        no_ocr: bool,
    },

    /// Show the rule table in evaluation order
    Rules,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show OCR backend status
    Status,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "certscan.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Infer { text } => run_infer(text, &cli.format),
        Commands::Scan { paths, no_ocr } => run_scan(config, paths, no_ocr, &cli.format).await,
        Commands::Rules => run_rules(&cli.format),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Status => run_status(config).await,
    }
}

/// Print one JSON value per the output format
fn emit_json<T: serde::Serialize>(items: &[T], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(items)?),
        "jsonl" => {
            for item in items {
                println!("{}", serde_json::to_string(item)?);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Run the engine over literal text
fn run_infer(texts: Vec<String>, format: &str) -> Result<()> {
    let rules = RuleSet::builtin();
    let mut results = Vec::new();

    for text in texts {
        let details = rules.infer(&text);
        if format == "text" {
            println!("{}", text);
            if details.is_empty() {
                println!("  (nothing recognized)");
            }
            for (field, value) in details.fields() {
                println!("  {:<13} {}", field, value);
            }
        }
        results.push(serde_json::json!({ "text": text, "details": details }));
    }

    emit_json(&results, format)
}

/// Run the auto-fill pipeline over files on disk
async fn run_scan(config: AppConfig, paths: Vec<PathBuf>, no_ocr: bool, format: &str) -> Result<()> {
    let mut autofill = Autofill::from_config(&config)?;
    if no_ocr {
        autofill = autofill.without_ocr();
    }
    match autofill.recognizer_name() {
        Some(name) => info!("OCR backend: {}", name),
        None => info!("OCR disabled, using file names only"),
    }

    let mut results = Vec::new();
    let mut rejected = 0usize;

    for path in paths {
        let upload = match Upload::from_path(&path) {
            Ok(upload) => upload,
            Err(e) => {
                error!("Cannot read {}: {}", path.display(), e);
                rejected += 1;
                continue;
            }
        };

        match autofill.autofill(&upload, FormState::default()).await {
            Ok(outcome) => {
                if format == "text" {
                    println!("{} [{:?}]", path.display(), outcome.source);
                    println!("  {}", outcome.message);
                }
                results.push(serde_json::json!({
                    "path": path.to_string_lossy(),
                    "outcome": outcome,
                }));
            }
            Err(e) if e.is_rejection() => {
                warn!("Rejected {}: {}", path.display(), e);
                if format == "text" {
                    println!("{}\n  Rejected: {}", path.display(), e);
                }
                rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    emit_json(&results, format)?;

    if format == "text" {
        println!("\nScanned {} file(s), {} rejected", results.len(), rejected);
    }

    Ok(())
}

/// Print the rule table
fn run_rules(format: &str) -> Result<()> {
    let rules = RuleSet::builtin().rules();

    if format != "text" {
        return emit_json(rules, format);
    }

    for (i, rule) in rules.iter().enumerate() {
        let effects: Vec<String> = rule.effects.iter().map(describe_effect).collect();
        println!(
            "{:2}. [{:?}] {:<12} {:?} -> {}",
            i + 1,
            rule.stage,
            rule.name,
            rule.cue,
            effects.join(", ")
        );
    }
    Ok(())
}

fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::Organization { value, apply } => format!("organization={} ({:?})", value, apply),
        Effect::Title { value, apply } => format!("title=\"{}\" ({:?})", value, apply),
        Effect::Category { value, apply } => format!("category={} ({:?})", value, apply),
    }
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            if output.exists() {
                return Err(CertscanError::Config(format!(
                    "{} already exists",
                    output.display()
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  OCR provider: {:?}", config.ocr.provider);
            println!("  Allowed uploads: {:?}", config.upload.allowed_extensions);
            println!("  Overwrite policy: {:?}", config.autofill.overwrite);
        }
    }

    Ok(())
}

/// Run status check
async fn run_status(config: AppConfig) -> Result<()> {
    let autofill = Autofill::from_config(&config)?;

    println!("certscan v{} Status", env!("CARGO_PKG_VERSION"));
    println!("======================");

    match autofill.recognizer() {
        Some(recognizer) => match recognizer.health_check().await {
            Ok(()) => println!("OCR ({}): Available at {}", recognizer.name(), config.ocr.endpoint()),
            Err(e) => println!("OCR ({}): Error - {}", recognizer.name(), e),
        },
        None => println!("OCR: Disabled (file names only)"),
    }

    println!("\nRules: {}", autofill.rules().rules().len());
    println!("Upload limit: {} bytes", config.upload.max_bytes);

    Ok(())
}
