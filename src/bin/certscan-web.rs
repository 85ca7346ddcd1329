// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! certscan web API
//!
//! Standalone server exposing inference and upload auto-fill over HTTP.

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use certscan::autofill::Autofill;
use certscan::config::AppConfig;
use certscan::Result;

#[derive(Parser, Debug)]
#[command(name = "certscan-web")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "certscan auto-fill API server")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "certscan.json")]
    config: PathBuf,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve without an OCR backend
    #[arg(long)]
    no_ocr: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("certscan web API v{}", env!("CARGO_PKG_VERSION"));

    // Load config
    let mut config = AppConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }

    let mut autofill = Autofill::from_config(&config)?;
    if args.no_ocr {
        autofill = autofill.without_ocr();
    }

    match autofill.recognizer() {
        Some(recognizer) => {
            if let Err(e) = recognizer.health_check().await {
                warn!("OCR backend {} not ready ({}); image uploads will use file names", recognizer.name(), e);
            } else {
                info!("OCR backend: {}", recognizer.name());
            }
        }
        None => info!("OCR disabled"),
    }

    certscan::web::start_server(config, autofill).await
}
