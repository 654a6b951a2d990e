/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Domain model for one solve request.
//!
//! Two shapes model the two sides of validation:
//!
//! ```text
//! caller ──(JSON)──► ProblemSpec ──(compiler::build_problem)──► Problem ──► compiler::compile
//!                     ↑ as received                              ↑ validated, immutable
//! ```
//!
//! # Ownership model
//! A [`Problem`] is built once per request and owned by that request; nothing
//! mutates it while the solver runs and nothing outlives the call.  Resources
//! and templates are sorted by id so every index derived from them is stable
//! for identical input.

pub mod constraint;
pub mod lesson;
pub mod resource;
pub mod term;

pub use constraint::{Constraint, Strength};
pub use lesson::{occurrence_id, LessonOccurrence, LessonTemplate};
pub use resource::{Resource, ResourceKind, SlotRef};
pub use term::{ClockTime, DailySlot, DaySpec, SchoolDay, SlotMask, Term, TermSpec, TimeSlot};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── ProblemSpec ───────────────────────────────────────────────────────────────

/// Scheduling input exactly as the caller supplied it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSpec {
    pub term: TermSpec,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub lesson_templates: Vec<LessonTemplate>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

// ── Problem ───────────────────────────────────────────────────────────────────

/// Validated domain model.
///
/// Only [`compiler::build_problem`](crate::compiler::build_problem) creates
/// one, so every cross reference inside is known to resolve.
#[derive(Debug, Clone)]
pub struct Problem {
    pub(crate) term: Term,
    /// Sorted by id.
    pub(crate) resources: Vec<Resource>,
    /// Sorted by id.
    pub(crate) templates: Vec<LessonTemplate>,
    /// Template order, then ordinal.
    pub(crate) occurrences: Vec<LessonOccurrence>,
    pub(crate) constraints: Vec<Constraint>,
    /// Effective availability per resource (own mask ∩ availability windows).
    pub(crate) availability: Vec<SlotMask>,
    pub(crate) resource_index: HashMap<String, usize>,
    pub(crate) template_index: HashMap<String, usize>,
    pub(crate) occurrence_index: HashMap<String, usize>,
}

impl Problem {
    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn templates(&self) -> &[LessonTemplate] {
        &self.templates
    }

    pub fn occurrences(&self) -> &[LessonOccurrence] {
        &self.occurrences
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn resource_position(&self, id: &str) -> Option<usize> {
        self.resource_index.get(id).copied()
    }

    pub fn template_position(&self, id: &str) -> Option<usize> {
        self.template_index.get(id).copied()
    }

    pub fn occurrence_position(&self, id: &str) -> Option<usize> {
        self.occurrence_index.get(id).copied()
    }

    /// Effective availability mask of the resource at `index`.
    pub fn availability(&self, index: usize) -> &SlotMask {
        &self.availability[index]
    }

    /// Template that `occurrence` was expanded from.
    pub fn template_of(&self, occurrence: &LessonOccurrence) -> &LessonTemplate {
        &self.templates[occurrence.template]
    }

    /// Resource position of the template's teacher.
    pub fn teacher_of(&self, template: &LessonTemplate) -> usize {
        self.resource_index[&template.teacher]
    }

    /// Resource position of the template's group.
    pub fn group_of(&self, template: &LessonTemplate) -> usize {
        self.resource_index[&template.group]
    }
}
