/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Wire contract between a caller and the engine.
//!
//! One JSON [`SolveRequest`] in, one JSON [`SolveResponse`] out.  Field names
//! are camelCase; enum values are snake_case.
//!
//! | `status` | `success` | Carries |
//! |---|---|---|
//! | `optimal` / `feasible` | `true` | `assignments`, `objectiveValue` |
//! | `infeasible` | `false` | `error`, `diagnostics` |
//! | `unknown` | `false` | `error`, partial `assignments` + `unassigned` when `allowPartial` |
//! | `model_error` | `false` | `error` |
//! | `engine_fault` | `false` | `error`, `fault` |

use serde::{Deserialize, Serialize};

use crate::boundary::EngineFault;
use crate::compiler::ModelError;
use crate::domain::{ClockTime, ProblemSpec};
use crate::solver::BackendKind;

// ── Request ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    #[serde(flatten)]
    pub problem: ProblemSpec,
    /// Wall-clock search budget; the backend's configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_seconds: Option<f64>,
    /// Adds model statistics to `meta`.
    #[serde(default)]
    pub debug: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    /// Return the best partial timetable when the budget runs out.
    #[serde(default)]
    pub allow_partial: bool,
}

impl SolveRequest {
    pub fn new(problem: ProblemSpec) -> Self {
        Self {
            problem,
            time_budget_seconds: None,
            debug: false,
            backend: None,
            allow_partial: false,
        }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
    ModelError,
    EngineFault,
}

/// Serializable class of an [`EngineFault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    SpawnFailed,
    InputEncodeFailed,
    InputWriteFailed,
    WaitFailed,
    EmptyOutput,
    MalformedOutput,
    AbnormalExit,
    WorkerPanicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    TeacherUnavailable,
    GroupUnavailable,
    OutsideStartWindow,
    PinnedSlotUnavailable,
    NoMatchingRoom,
    RoomUnavailable,
    ResourceOverloaded,
    ConflictingConstraints,
}

/// One human-readable explanation of infeasibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

/// One placed lesson occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledLesson {
    pub occurrence_id: String,
    pub template_id: String,
    pub subject: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub group_id: String,
    pub group_name: String,
    pub room_id: String,
    pub room_name: String,
    pub day: String,
    pub day_index: usize,
    pub start_slot: usize,
    pub slot_count: usize,
    pub start: ClockTime,
    pub end: ClockTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveMeta {
    pub backend: BackendKind,
    pub elapsed_ms: u64,
    pub total_sessions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_terms: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    pub success: bool,
    pub status: Status,
    #[serde(default)]
    pub assignments: Vec<ScheduledLesson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<FaultKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unassigned: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SolveMeta>,
}

impl SolveResponse {
    fn failure(status: Status, error: String) -> Self {
        Self {
            success: false,
            status,
            assignments: Vec::new(),
            objective_value: None,
            error: Some(error),
            fault: None,
            diagnostics: Vec::new(),
            unassigned: Vec::new(),
            meta: None,
        }
    }

    pub fn solved(status: Status, assignments: Vec<ScheduledLesson>, objective: u64) -> Self {
        Self {
            success: true,
            status,
            assignments,
            objective_value: Some(objective),
            error: None,
            fault: None,
            diagnostics: Vec::new(),
            unassigned: Vec::new(),
            meta: None,
        }
    }

    pub fn infeasible(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::failure(
                Status::Infeasible,
                "no timetable satisfies all hard constraints".to_string(),
            )
        }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::failure(Status::Unknown, reason.into())
    }

    pub fn model_error(err: &ModelError) -> Self {
        Self::failure(Status::ModelError, err.to_string())
    }

    pub fn engine_fault(fault: &EngineFault) -> Self {
        Self {
            fault: Some(fault.kind()),
            ..Self::failure(Status::EngineFault, fault.to_string())
        }
    }

    pub fn with_meta(mut self, meta: SolveMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}
