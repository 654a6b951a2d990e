/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for failures of the solve worker itself.
//!
//! An [`EngineFault`] means the engine never produced a classified answer:
//! the worker could not be started, was fed nothing, died, or wrote
//! something that is not a response.  It is distinct from `infeasible` and
//! `unknown`, which are answers.  No fault is retried internally.
//!
//! | Variant | [`FaultKind`] | Raised by |
//! |---|---|---|
//! | `Spawn` | `spawn_failed` | subprocess runner |
//! | `InputEncode` | `input_encode_failed` | subprocess runner |
//! | `InputWrite` | `input_write_failed` | subprocess runner |
//! | `Wait` | `wait_failed` | subprocess runner |
//! | `EmptyOutput` | `empty_output` | subprocess runner |
//! | `MalformedOutput` | `malformed_output` | subprocess runner |
//! | `AbnormalExit` | `abnormal_exit` | subprocess runner |
//! | `WorkerPanicked` | `worker_panicked` | in-process runner |

use std::process::ExitStatus;

use thiserror::Error;

use crate::contract::FaultKind;

/// Why the worker produced no usable response.
#[derive(Debug, Error)]
pub enum EngineFault {
    #[error("failed to start solver worker '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode solve request: {0}")]
    InputEncode(#[source] serde_json::Error),

    #[error("failed to send request to solver worker: {0}")]
    InputWrite(#[source] std::io::Error),

    #[error("failed to collect solver worker output: {0}")]
    Wait(#[source] std::io::Error),

    /// Exit status was success but stdout was empty.
    #[error("solver worker exited with {status} without writing a response{}", stderr_suffix(.stderr))]
    EmptyOutput { status: ExitStatus, stderr: String },

    /// Stdout was not a valid response document.
    #[error("solver worker wrote an unreadable response ({source}): {preview}")]
    MalformedOutput {
        #[source]
        source: serde_json::Error,
        preview: String,
    },

    /// Killed by a signal or non-zero exit with no output.
    #[error("solver worker terminated abnormally ({status}){}", stderr_suffix(.stderr))]
    AbnormalExit { status: ExitStatus, stderr: String },

    #[error("solver worker thread panicked")]
    WorkerPanicked,
}

impl EngineFault {
    pub fn kind(&self) -> FaultKind {
        match self {
            EngineFault::Spawn { .. } => FaultKind::SpawnFailed,
            EngineFault::InputEncode(_) => FaultKind::InputEncodeFailed,
            EngineFault::InputWrite(_) => FaultKind::InputWriteFailed,
            EngineFault::Wait(_) => FaultKind::WaitFailed,
            EngineFault::EmptyOutput { .. } => FaultKind::EmptyOutput,
            EngineFault::MalformedOutput { .. } => FaultKind::MalformedOutput,
            EngineFault::AbnormalExit { .. } => FaultKind::AbnormalExit,
            EngineFault::WorkerPanicked => FaultKind::WorkerPanicked,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let tail = stderr.trim();
    if tail.is_empty() {
        String::new()
    } else {
        format!(": {}", truncate(tail, 500))
    }
}

/// At most `max` bytes of `s`, cut on a char boundary.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
