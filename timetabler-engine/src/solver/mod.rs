/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Solver engine: search a compiled [`Model`] within a time budget.
//!
//! Two interchangeable backends sit behind [`SolverBackend`]:
//!
//! | Backend | Strategy | Proves optimality | Default budget |
//! |---|---|---|---|
//! | [`BranchAndBound`] | DFS + forward checking + admissible bound | yes (exhausted search) | 60 s |
//! | [`LocalSearch`] | seeded greedy restarts + improvement moves | only when objective == root bound | 180 s |
//!
//! Both are stateless between calls: all search state is allocated inside
//! `solve()` and dropped on return, so one backend value can serve many
//! solves from many threads.
//!
//! # Result mapping
//! ```text
//!                     complete assignment?
//!                    yes                 no
//! search exhausted   Optimal             Infeasible
//! deadline hit       Feasible            Unknown { partial }
//! ```

pub mod branch_bound;
pub mod local_search;
pub mod objective;
pub(crate) mod state;

pub use branch_bound::BranchAndBound;
pub use local_search::LocalSearch;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::compiler::Model;
use crate::config::EngineConfig;

// ── Backend selection ─────────────────────────────────────────────────────────

/// Which search strategy answers a request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    BranchAndBound,
    LocalSearch,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::BranchAndBound => "branch_and_bound",
            BackendKind::LocalSearch => "local_search",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which branch-and-bound picks the next variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableOrder {
    /// Occurrence order as compiled.
    #[default]
    Compiled,
    /// Fewest currently feasible candidates first; ties by compiled order.
    FirstFail,
}

// ── Deadline ──────────────────────────────────────────────────────────────────

/// Wall-clock budget for one solve plus an optional external stop flag.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl Deadline {
    /// Budget counted from now.
    pub fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
            cancel: None,
        }
    }

    /// Also stop as soon as `flag` becomes `true`.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
            || self
                .cancel
                .as_ref()
                .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Chosen candidate index per variable; `None` = unassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub choices: Vec<Option<usize>>,
}

impl Assignment {
    pub fn is_complete(&self) -> bool {
        self.choices.iter().all(Option::is_some)
    }

    pub fn assigned_count(&self) -> usize {
        self.choices.iter().filter(|c| c.is_some()).count()
    }
}

/// Outcome of one backend run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// Complete assignment proven to minimise the objective.
    Optimal { assignment: Assignment, objective: u64 },
    /// Complete assignment without an optimality proof.
    Feasible { assignment: Assignment, objective: u64 },
    /// No complete assignment exists.
    Infeasible,
    /// Budget ran out before any complete assignment was found.
    Unknown { partial: Option<Assignment> },
}

impl SolveResult {
    pub fn status_name(&self) -> &'static str {
        match self {
            SolveResult::Optimal { .. } => "optimal",
            SolveResult::Feasible { .. } => "feasible",
            SolveResult::Infeasible => "infeasible",
            SolveResult::Unknown { .. } => "unknown",
        }
    }
}

// ── Backend trait ─────────────────────────────────────────────────────────────

/// A search strategy.  Never fails: every outcome is a [`SolveResult`].
pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model, deadline: &Deadline) -> SolveResult;
}

/// Build the backend for `kind` from engine configuration.
pub fn create_backend(kind: BackendKind, config: &EngineConfig) -> Box<dyn SolverBackend> {
    match kind {
        BackendKind::BranchAndBound => Box::new(BranchAndBound::new(
            config.branch_and_bound.variable_order,
        )),
        BackendKind::LocalSearch => Box::new(LocalSearch::new(config.local_search.seed)),
    }
}
