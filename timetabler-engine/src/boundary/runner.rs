/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Runners isolate a CPU-bound solve from the async caller.
//!
//! | Runner | Isolation | Timeout action | Fault surface |
//! |---|---|---|---|
//! | [`InProcessRunner`] | `spawn_blocking` thread | set cancel flag | `worker_panicked` |
//! | [`SubprocessRunner`] | worker process, JSON over stdio | kill the child | spawn / write / wait / output faults |
//!
//! Both wait at most budget + `overhead_seconds` and answer `unknown` when
//! that ceiling passes.  Neither retries.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::error::truncate;
use super::{backend_for, ceiling, resolve_budget, solve_request, EngineFault};
use crate::config::EngineConfig;
use crate::contract::{SolveRequest, SolveResponse};
use crate::solver::BackendKind;

const CEILING_MESSAGE: &str = "solve exceeded its time ceiling and was stopped";

/// Either runner behind one call.
#[derive(Debug, Clone)]
pub enum Runner {
    InProcess(InProcessRunner),
    Subprocess(SubprocessRunner),
}

impl Runner {
    pub async fn run(&self, request: SolveRequest) -> SolveResponse {
        match self {
            Runner::InProcess(r) => r.run(request).await,
            Runner::Subprocess(r) => r.run(&request).await,
        }
    }
}

// ── In-process ────────────────────────────────────────────────────────────────

/// Solves on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct InProcessRunner {
    config: Arc<EngineConfig>,
}

impl InProcessRunner {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    pub async fn run(&self, request: SolveRequest) -> SolveResponse {
        let kind = backend_for(&request, &self.config);
        let limit = match resolve_budget(request.time_budget_seconds, kind, &self.config) {
            Ok(budget) => ceiling(budget, &self.config),
            Err(e) => return SolveResponse::model_error(&e),
        };

        let cancel = Arc::new(AtomicBool::new(false));
        let handle = tokio::task::spawn_blocking({
            let config = Arc::clone(&self.config);
            let cancel = Arc::clone(&cancel);
            move || solve_request(request, &config, Some(cancel))
        });

        match tokio::time::timeout(limit, handle).await {
            Ok(Ok(response)) => response,
            Ok(Err(join_error)) => {
                error!(error = %join_error, "solver thread failed");
                SolveResponse::engine_fault(&EngineFault::WorkerPanicked)
            }
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                warn!(ceiling_ms = limit.as_millis() as u64, "in-process solve cancelled");
                SolveResponse::unknown(CEILING_MESSAGE)
            }
        }
    }
}

// ── Subprocess ────────────────────────────────────────────────────────────────

/// Solves in a separate worker process (normally `timetabler-worker`).
///
/// The request goes to the child's stdin as JSON; the response is read from
/// its stdout.  Stderr is captured only for fault messages.
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    program: PathBuf,
    args: Vec<String>,
    config: Arc<EngineConfig>,
}

impl SubprocessRunner {
    pub fn new(program: impl Into<PathBuf>, config: Arc<EngineConfig>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            config,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub async fn run(&self, request: &SolveRequest) -> SolveResponse {
        match self.exchange(request).await {
            Ok(response) => response,
            Err(fault) => {
                error!(kind = ?fault.kind(), error = %fault, "solver worker fault");
                SolveResponse::engine_fault(&fault)
            }
        }
    }

    async fn exchange(&self, request: &SolveRequest) -> Result<SolveResponse, EngineFault> {
        let kind = backend_for(request, &self.config);
        let budget = match resolve_budget(request.time_budget_seconds, kind, &self.config) {
            Ok(budget) => budget,
            Err(e) => return Ok(SolveResponse::model_error(&e)),
        };
        let limit = ceiling(budget, &self.config);
        let input = serde_json::to_vec(&resolved(request, kind, budget))
            .map_err(EngineFault::InputEncode)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineFault::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        info!(
            program = %self.program.display(),
            pid = child.id(),
            bytes = input.len(),
            "solver worker started"
        );

        let stdin = child.stdin.take();
        let conversation = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await.map_err(EngineFault::InputWrite)?;
                stdin.shutdown().await.map_err(EngineFault::InputWrite)?;
            }
            child.wait_with_output().await.map_err(EngineFault::Wait)
        };

        match tokio::time::timeout(limit, conversation).await {
            Ok(result) => classify(result?),
            Err(_) => {
                // Dropping the future dropped the child, which kills it.
                warn!(ceiling_ms = limit.as_millis() as u64, "solver worker killed");
                Ok(SolveResponse::unknown(CEILING_MESSAGE))
            }
        }
    }
}

/// `request` with the backend and budget this side resolved, so the worker
/// searches under the same terms the ceiling was computed from.
fn resolved(request: &SolveRequest, kind: BackendKind, budget: Duration) -> SolveRequest {
    SolveRequest {
        backend: Some(kind),
        time_budget_seconds: Some(budget.as_secs_f64()),
        ..request.clone()
    }
}

/// Turn a finished worker's output into a response or a fault.
///
/// A parseable response is accepted whatever the exit code; the worker
/// exits non-zero for unsuccessful answers.
fn classify(output: Output) -> Result<SolveResponse, EngineFault> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let body = stdout.trim();

    if body.is_empty() {
        return Err(if output.status.success() {
            EngineFault::EmptyOutput {
                status: output.status,
                stderr,
            }
        } else {
            EngineFault::AbnormalExit {
                status: output.status,
                stderr,
            }
        });
    }

    match serde_json::from_str::<SolveResponse>(body) {
        Ok(response) => {
            debug!(status = ?response.status, exit = %output.status, "solver worker answered");
            Ok(response)
        }
        Err(source) => Err(EngineFault::MalformedOutput {
            source,
            preview: truncate(body, 200).to_string(),
        }),
    }
}
