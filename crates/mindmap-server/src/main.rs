//! Mindmap CLI
//!
//! `mindmap serve` starts the HTTP server; `mindmap extract` runs a single
//! extraction from a file or stdin.

use anyhow::Context;
use clap::Parser;
use mindmap_extractor::ExtractionRequest;
use mindmap_server::cli::{Cli, Command, ExtractArgs};
use mindmap_server::config::ServerConfig;
use mindmap_server::handlers::ErrorResponse;
use mindmap_server::{build_extractor, init_tracing, start_server};
use std::io::Read;
use std::process;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.load_config()?;

    match cli.command {
        Command::Serve(_) => {
            start_server(config).await?;
            Ok(0)
        }
        Command::Extract(args) => extract_once(config, args).await,
    }
}

async fn extract_once(config: ServerConfig, args: ExtractArgs) -> anyhow::Result<i32> {
    config.validate()?;

    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let extractor = build_extractor(&config.extractor)?;

    let (json, code) = match extractor.extract(ExtractionRequest::new(text)).await {
        Ok(outline) => (serde_json::to_value(&outline)?, 0),
        Err(e) => (serde_json::to_value(ErrorResponse::from(&e))?, 1),
    };

    let rendered = if args.compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    println!("{}", rendered);

    Ok(code)
}
