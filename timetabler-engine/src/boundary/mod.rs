/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process boundary: one request in, one classified response out.
//!
//! ```text
//!  SolveRequest ──► resolve_budget ──► build_problem ──► compile ──► backend.solve ──► translate
//!                        │                  │                                              │
//!                        └── model_error ◄──┘                               SolveResponse ◄┘
//! ```
//!
//! [`solve_request`] runs the whole pipeline synchronously on the calling
//! thread and is what the worker binary executes.  The [`runner`] module
//! isolates it from an async caller, either on a blocking thread or in a
//! separate worker process, and enforces the time ceiling
//! (budget + `overhead_seconds`).

pub mod error;
pub mod runner;

pub use error::EngineFault;
pub use runner::{InProcessRunner, Runner, SubprocessRunner};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::compiler::{build_problem, compile, CompileOptions, ModelError};
use crate::config::EngineConfig;
use crate::contract::{SolveMeta, SolveRequest, SolveResponse};
use crate::solver::{create_backend, BackendKind, Deadline};
use crate::translate::translate;

/// Decode a request body.
///
/// # Errors
/// [`ModelError::InvalidRequest`] when the bytes are not a solve request.
pub fn parse_request(bytes: &[u8]) -> Result<SolveRequest, ModelError> {
    serde_json::from_slice(bytes).map_err(|e| ModelError::InvalidRequest(e.to_string()))
}

/// Backend that answers `request`.
pub fn backend_for(request: &SolveRequest, config: &EngineConfig) -> BackendKind {
    request.backend.unwrap_or(config.default_backend)
}

/// Search budget for `requested` seconds, falling back to the backend's
/// configured default.
///
/// # Errors
/// [`ModelError::InvalidTimeBudget`] unless the value is finite and positive.
pub fn resolve_budget(
    requested: Option<f64>,
    backend: BackendKind,
    config: &EngineConfig,
) -> Result<Duration, ModelError> {
    let secs = requested.unwrap_or_else(|| config.default_budget(backend));
    if !(secs.is_finite() && secs > 0.0) {
        return Err(ModelError::InvalidTimeBudget { value: secs });
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ModelError::InvalidTimeBudget { value: secs })
}

/// Wall-clock limit a runner grants one solve.
pub fn ceiling(budget: Duration, config: &EngineConfig) -> Duration {
    budget.saturating_add(config.overhead())
}

/// Validate, compile, search and translate `request`.  Never fails: every
/// outcome is a classified [`SolveResponse`].
///
/// `cancel` stops the search early when set; the answer is then `unknown`.
pub fn solve_request(
    request: SolveRequest,
    config: &EngineConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> SolveResponse {
    let started = Instant::now();
    let kind = backend_for(&request, config);

    let budget = match resolve_budget(request.time_budget_seconds, kind, config) {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "rejected solve request");
            return SolveResponse::model_error(&e);
        }
    };

    let SolveRequest {
        problem,
        debug,
        allow_partial,
        ..
    } = request;
    let problem = match build_problem(problem) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "rejected solve request");
            return SolveResponse::model_error(&e);
        }
    };

    let model = compile(
        &problem,
        &CompileOptions {
            max_consecutive_hard: config.max_consecutive_hard,
        },
    );

    let backend = create_backend(kind, config);
    let mut deadline = Deadline::new(budget);
    if let Some(flag) = cancel {
        deadline = deadline.with_cancel(flag);
    }

    info!(
        backend = backend.name(),
        sessions = problem.occurrences().len(),
        budget_ms = budget.as_millis() as u64,
        "solving"
    );
    let result = backend.solve(&model, &deadline);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(status = result.status_name(), elapsed_ms, "solve finished");

    translate(&problem, &model, &result, allow_partial).with_meta(SolveMeta {
        backend: kind,
        elapsed_ms,
        total_sessions: problem.occurrences().len(),
        variables: debug.then(|| model.variable_count()),
        candidates: debug.then(|| model.total_candidates()),
        soft_terms: debug.then(|| model.soft_term_count()),
    })
}
