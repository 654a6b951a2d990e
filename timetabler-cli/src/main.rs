/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use timetabler_engine::boundary::{InProcessRunner, Runner, SubprocessRunner};
use timetabler_engine::config::EngineConfigManager;
use timetabler_engine::contract::{SolveRequest, SolveResponse};
use timetabler_engine::solver::BackendKind;

const WORKER_BINARY: &str = "timetabler-worker";

// ── CLI argument definition ───────────────────────────────────────────────────

/// Timetabler command-line client.
///
/// Example:
///   timetabler --request week.yaml --config engine.yaml --budget 30 --pretty
#[derive(Debug, Parser)]
#[command(
    name = "timetabler",
    about = "Timetabler – solve a school timetable request",
    long_about = None,
)]
struct Cli {
    /// Solve request file (`.json`, `.yaml` or `.yml`).
    #[arg(short = 'r', long = "request")]
    request: PathBuf,

    /// Solver worker executable; defaults to `timetabler-worker` next to this binary.
    #[arg(short = 'w', long = "worker", conflicts_with = "in_process")]
    worker: Option<PathBuf>,

    /// Solve inside this process instead of a worker process.
    #[arg(long = "in-process")]
    in_process: bool,

    /// Path to the YAML engine configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Time budget in seconds; overrides the request's value.
    #[arg(short = 'b', long = "budget")]
    budget: Option<f64>,

    /// Backend; overrides the request's value.
    #[arg(long = "backend", value_enum)]
    backend: Option<BackendKind>,

    /// Pretty-print the response.
    #[arg(long = "pretty", default_value_t = false)]
    pretty: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(response) => {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            };
            match rendered {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    error!("Failed to encode response: {}", e);
                    process::exit(2);
                }
            }
            process::exit(if response.success { 0 } else { 1 });
        }
        Err(e) => {
            error!("{:#}", e);
            process::exit(2);
        }
    }
}

async fn run(cli: &Cli) -> Result<SolveResponse> {
    // ── Load engine configuration ─────────────────────────────────────────────
    let mut manager = EngineConfigManager::new();
    if let Some(path) = &cli.config {
        manager.load_from_file(path)?;
    }
    let config = Arc::new(manager.into_config());

    // ── Load request ──────────────────────────────────────────────────────────
    let mut request = load_request(&cli.request)?;
    if cli.budget.is_some() {
        request.time_budget_seconds = cli.budget;
    }
    if cli.backend.is_some() {
        request.backend = cli.backend;
    }
    info!(
        request = %cli.request.display(),
        templates = request.problem.lesson_templates.len(),
        budget = ?request.time_budget_seconds,
        backend = ?request.backend,
        "request loaded"
    );

    // ── Pick runner ───────────────────────────────────────────────────────────
    let runner = if cli.in_process {
        Runner::InProcess(InProcessRunner::new(config))
    } else {
        match cli.worker.clone().or_else(sibling_worker) {
            Some(program) => {
                let mut args = Vec::new();
                if let Some(path) = &cli.config {
                    args.push("--config".to_string());
                    args.push(path.display().to_string());
                }
                info!(worker = %program.display(), "using solver worker process");
                Runner::Subprocess(SubprocessRunner::new(program, config).with_args(args))
            }
            None => {
                warn!("No {} found next to this binary, solving in-process", WORKER_BINARY);
                Runner::InProcess(InProcessRunner::new(config))
            }
        }
    };

    Ok(runner.run(request).await)
}

/// Parse a request file; the extension picks JSON or YAML.
fn load_request(path: &Path) -> Result<SolveRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open request file: {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML request: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON request: {}", path.display()))
    }
}

fn sibling_worker() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe
        .parent()?
        .join(format!("{WORKER_BINARY}{}", std::env::consts::EXE_SUFFIX));
    candidate.is_file().then_some(candidate)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn request_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const YAML_REQUEST: &str = r#"
term:
  days: [Monday]
  dailySlots:
    - { start: "08:00", end: "08:45" }
    - { start: "09:00", end: "09:45" }
    - { start: "10:00", end: "10:45" }
resources:
  - { id: T1, kind: teacher, name: Ms. Smith }
  - { id: G1, kind: group }
  - { id: R1, kind: classroom }
lessonTemplates:
  - { id: MATH, subject: Math, teacher: T1, group: G1, sessionsPerWeek: 2 }
timeBudgetSeconds: 5
"#;

    #[test]
    fn yaml_request_is_parsed() {
        let f = request_file(".yaml", YAML_REQUEST);
        let request = load_request(f.path()).unwrap();
        assert_eq!(request.problem.lesson_templates[0].sessions_per_week, 2);
        assert_eq!(request.time_budget_seconds, Some(5.0));
    }

    #[test]
    fn json_request_is_parsed() {
        let json = r#"{"term": {"days": ["Monday"], "dailySlots": [{"start": "08:00", "end": "08:45"}]},
                       "resources": [], "lessonTemplates": [], "debug": true}"#;
        let f = request_file(".json", json);
        let request = load_request(f.path()).unwrap();
        assert!(request.debug);
    }

    #[test]
    fn missing_request_file_is_an_error() {
        assert!(load_request(Path::new("/nonexistent/request.json")).is_err());
    }

    #[tokio::test]
    async fn in_process_run_solves_yaml_request() {
        let f = request_file(".yml", YAML_REQUEST);
        let cli = Cli::parse_from([
            "timetabler",
            "--request",
            f.path().to_str().unwrap(),
            "--in-process",
            "--budget",
            "2",
        ]);
        let response = run(&cli).await.unwrap();
        assert!(response.success);
        assert_eq!(response.assignments.len(), 2);
    }

    #[test]
    fn worker_and_in_process_conflict() {
        let parsed = Cli::try_parse_from([
            "timetabler",
            "--request",
            "r.json",
            "--worker",
            "w",
            "--in-process",
        ]);
        assert!(parsed.is_err());
    }
}
