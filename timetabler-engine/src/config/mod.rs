/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Engine configuration loading and management.
//!
//! The expected YAML structure is:
//! ```yaml
//! engine:
//!   default_backend: branch_and_bound   # or local_search
//!   overhead_seconds: 5
//!   max_consecutive_hard: false
//!   branch_and_bound:
//!     time_budget_seconds: 60
//!     variable_order: compiled          # or first_fail
//!   local_search:
//!     time_budget_seconds: 180
//!     seed: 42
//! ```
//!
//! Every key is optional; a missing key keeps its default.  Without a file
//! the defaults above apply.

use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::solver::{BackendKind, VariableOrder};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
struct EngineConfigFile {
    #[serde(default)]
    engine: EngineSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EngineSection {
    default_backend: BackendKind,
    overhead_seconds: f64,
    max_consecutive_hard: bool,
    branch_and_bound: BranchAndBoundSection,
    local_search: LocalSearchSection,
}

impl Default for EngineSection {
    fn default() -> Self {
        let d = EngineConfig::default();
        Self {
            default_backend: d.default_backend,
            overhead_seconds: d.overhead_seconds,
            max_consecutive_hard: d.max_consecutive_hard,
            branch_and_bound: BranchAndBoundSection {
                time_budget_seconds: d.branch_and_bound.time_budget_seconds,
                variable_order: d.branch_and_bound.variable_order,
            },
            local_search: LocalSearchSection {
                time_budget_seconds: d.local_search.time_budget_seconds,
                seed: d.local_search.seed,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BranchAndBoundSection {
    time_budget_seconds: f64,
    variable_order: VariableOrder,
}

impl Default for BranchAndBoundSection {
    fn default() -> Self {
        EngineSection::default().branch_and_bound
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LocalSearchSection {
    time_budget_seconds: f64,
    seed: u64,
}

impl Default for LocalSearchSection {
    fn default() -> Self {
        EngineSection::default().local_search
    }
}

// ── Public data structures ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BranchAndBoundConfig {
    /// Default budget when a request carries none.
    pub time_budget_seconds: f64,
    pub variable_order: VariableOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalSearchConfig {
    /// Default budget when a request carries none.
    pub time_budget_seconds: f64,
    pub seed: u64,
}

/// Settings shared by every solve of one engine process.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Backend used when a request does not name one.
    pub default_backend: BackendKind,
    /// Allowance on top of the solve budget before a runner gives up.
    pub overhead_seconds: f64,
    /// Strength of `maxConsecutiveSlots` constraints without a `hard` flag.
    pub max_consecutive_hard: bool,
    pub branch_and_bound: BranchAndBoundConfig,
    pub local_search: LocalSearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_backend: BackendKind::BranchAndBound,
            overhead_seconds: 5.0,
            max_consecutive_hard: false,
            branch_and_bound: BranchAndBoundConfig {
                time_budget_seconds: 60.0,
                variable_order: VariableOrder::Compiled,
            },
            local_search: LocalSearchConfig {
                time_budget_seconds: 180.0,
                seed: 42,
            },
        }
    }
}

impl EngineConfig {
    /// Configured default budget of `backend`.
    pub fn default_budget(&self, backend: BackendKind) -> f64 {
        match backend {
            BackendKind::BranchAndBound => self.branch_and_bound.time_budget_seconds,
            BackendKind::LocalSearch => self.local_search.time_budget_seconds,
        }
    }

    /// Overhead as a duration; zero when the value is not a usable number.
    pub fn overhead(&self) -> Duration {
        Duration::try_from_secs_f64(self.overhead_seconds).unwrap_or(Duration::ZERO)
    }

    fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        ensure!(
            positive(self.overhead_seconds),
            "overhead_seconds must be a positive number, got {}",
            self.overhead_seconds
        );
        ensure!(
            positive(self.branch_and_bound.time_budget_seconds),
            "branch_and_bound.time_budget_seconds must be a positive number, got {}",
            self.branch_and_bound.time_budget_seconds
        );
        ensure!(
            positive(self.local_search.time_budget_seconds),
            "local_search.time_budget_seconds must be a positive number, got {}",
            self.local_search.time_budget_seconds
        );
        Ok(())
    }
}

impl From<EngineSection> for EngineConfig {
    fn from(s: EngineSection) -> Self {
        Self {
            default_backend: s.default_backend,
            overhead_seconds: s.overhead_seconds,
            max_consecutive_hard: s.max_consecutive_hard,
            branch_and_bound: BranchAndBoundConfig {
                time_budget_seconds: s.branch_and_bound.time_budget_seconds,
                variable_order: s.branch_and_bound.variable_order,
            },
            local_search: LocalSearchConfig {
                time_budget_seconds: s.local_search.time_budget_seconds,
                seed: s.local_search.seed,
            },
        }
    }
}

// ── EngineConfigManager ───────────────────────────────────────────────────────

/// Loads and holds the engine configuration from a YAML file.
#[derive(Debug, Default)]
pub struct EngineConfigManager {
    config: EngineConfig,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl EngineConfigManager {
    /// Creates a manager holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and replaces the current configuration.
    ///
    /// On error the previous configuration is reset to defaults and
    /// [`is_loaded`](Self::is_loaded) reports `false`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is invalid or
    /// contains unknown keys, or a duration is not a positive number.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading engine configuration from: {}", path.display());

        self.config = EngineConfig::default();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: EngineConfigFile = if content.trim().is_empty() {
            EngineConfigFile::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?
        };

        let config = EngineConfig::from(file.engine);
        config
            .validate()
            .with_context(|| format!("Invalid engine configuration in {}", path.display()))?;

        debug!(?config, "engine configuration parsed");
        info!(
            default_backend = %config.default_backend,
            overhead_seconds = config.overhead_seconds,
            max_consecutive_hard = config.max_consecutive_hard,
            "Engine configuration loaded"
        );

        self.config = config;
        self.loaded = true;
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consume the manager, keeping only the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// Returns `true` after a successful call to [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
