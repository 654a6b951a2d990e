/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetabler engine – constraint-based school timetable solver
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── domain/      – term grid, resources, lesson templates, constraints
//! ├── compiler/    – validation (ModelError) and expansion into a solver Model
//! ├── solver/      – branch-and-bound and local-search backends
//! ├── translate/   – SolveResult → response lessons + infeasibility diagnostics
//! ├── contract/    – JSON request / response types
//! ├── boundary/    – solve pipeline, in-process and subprocess runners
//! └── config/      – YAML engine configuration
//! ```
//!
//! # Example
//! ```rust,ignore
//! let config = EngineConfig::default();
//! let request: SolveRequest = serde_json::from_str(body)?;
//! let response = boundary::solve_request(request, &config, None);
//! ```

pub mod boundary;
pub mod compiler;
pub mod config;
pub mod contract;
pub mod domain;
pub mod solver;
pub mod translate;

pub use boundary::{solve_request, EngineFault, InProcessRunner, Runner, SubprocessRunner};
pub use compiler::ModelError;
pub use config::{EngineConfig, EngineConfigManager};
pub use contract::{SolveRequest, SolveResponse, Status};
pub use solver::BackendKind;
