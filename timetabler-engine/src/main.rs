/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use timetabler_engine::boundary::{parse_request, solve_request};
use timetabler_engine::config::EngineConfigManager;
use timetabler_engine::contract::SolveResponse;
use timetabler_engine::solver::BackendKind;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Timetabler solver worker.
///
/// Reads one JSON solve request, writes one JSON response to stdout.
/// Logs go to stderr.
///
/// Example:
///   timetabler-worker --config engine.yaml < request.json > response.json
#[derive(Debug, Parser)]
#[command(
    name = "timetabler-worker",
    about = "Timetabler solver worker – one request in, one response out",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML engine configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Backend used when the request does not name one.
    #[arg(short = 'b', long = "backend", value_enum)]
    backend: Option<BackendKind>,

    /// Read the request from this file instead of stdin.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(response) => {
            if let Err(e) = write_response(&response) {
                error!("Failed to write response: {:#}", e);
                process::exit(2);
            }
            process::exit(if response.success { 0 } else { 1 });
        }
        Err(e) => {
            error!("Worker setup failed: {:#}", e);
            process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> Result<SolveResponse> {
    // ── Load engine configuration ─────────────────────────────────────────────
    let mut manager = EngineConfigManager::new();
    match &cli.config {
        Some(path) => manager.load_from_file(path)?,
        None => warn!("No engine configuration file provided, using defaults"),
    }
    let mut config = manager.into_config();
    if let Some(backend) = cli.backend {
        config.default_backend = backend;
    }

    // ── Read request ──────────────────────────────────────────────────────────
    let body = match &cli.input {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Cannot read request file: {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Cannot read request from stdin")?;
            buf
        }
    };
    info!(bytes = body.len(), "request received");

    // ── Solve ─────────────────────────────────────────────────────────────────
    Ok(match parse_request(&body) {
        Ok(request) => solve_request(request, &config, None),
        Err(e) => {
            warn!(error = %e, "unreadable request");
            SolveResponse::model_error(&e)
        }
    })
}

fn write_response(response: &SolveResponse) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, response).context("Cannot encode response")?;
    out.write_all(b"\n").context("Cannot write response")?;
    out.flush().context("Cannot flush stdout")?;
    Ok(())
}
